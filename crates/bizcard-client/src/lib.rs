//! Client-side card logic: everything the card editor, share sheet and
//! admin views need apart from rendering.
//!
//! - [`store::CardStore`]: load/save against the API with a local JSON cache
//!   as fallback
//! - [`monitor::ConnectionMonitor`]: one-shot health probe
//! - [`share::ShareFlow`]: save-then-share via native share or clipboard
//! - [`export::QrExporter`]: QR code to PNG file
//! - [`admin::AdminUserTable`]: role-gated user table
//! - [`contact`]: `tel:`/`mailto:` links and vCard text
//!
//! Identity is always an explicit [`bizcard_types::Session`].

pub mod admin;
pub mod backend;
pub mod cache;
pub mod config;
pub mod contact;
pub mod error;
pub mod export;
pub mod monitor;
pub mod notice;
pub mod share;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{CardBackend, HttpBackend};
pub use cache::LocalCardCache;
pub use config::ClientConfig;
pub use error::ClientError;
pub use monitor::ConnectionMonitor;
pub use notice::{Notice, NoticeLevel};
pub use store::{CardStore, SaveOutcome};
