//! Shared data model for the bizcard workspace.
//!
//! Used by the API server (`bizcard-api`), the database layer and the
//! client library so the wire format has one canonical definition.

pub mod api;
pub mod models;
pub mod policy;
pub mod role;
pub mod status;
pub mod url;

pub use models::{BusinessCard, CardField, CardFields, CardLink, CardSummary, LinkType, ThemeColors, UserWithRole, VisibleFields};
pub use role::{Capabilities, Role, Session, is_admin, is_super_admin};
pub use status::ConnectionStatus;
