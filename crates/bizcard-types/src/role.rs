use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Account role. Closed set: anything else fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    #[serde(rename = "superadmin")]
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    /// Parse a stored role string; unknown strings yield `None`.
    pub fn parse(value: &str) -> Option<Role> {
        value.parse().ok()
    }

    /// Maximum number of cards the role may own. `None` means unlimited.
    pub fn card_limit(self) -> Option<usize> {
        match self {
            Role::User | Role::Admin => Some(1),
            Role::SuperAdmin => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "superadmin" | "super_admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Admin views are open to admins and superadmins. An absent role is never admin.
pub fn is_admin(role: Option<Role>) -> bool {
    match role {
        Some(Role::Admin | Role::SuperAdmin) => true,
        Some(Role::User) | None => false,
    }
}

pub fn is_super_admin(role: Option<Role>) -> bool {
    match role {
        Some(Role::SuperAdmin) => true,
        Some(Role::User | Role::Admin) | None => false,
    }
}

/// Capability flags derived from a role, consumed by views and handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub can_view_users: bool,
    pub can_change_roles: bool,
    pub card_limit: Option<usize>,
}

impl Capabilities {
    pub fn for_role(role: Option<Role>) -> Self {
        let admin = is_admin(role);
        let super_admin = is_super_admin(role);
        Self {
            is_admin: admin,
            is_super_admin: super_admin,
            can_view_users: admin,
            can_change_roles: super_admin,
            card_limit: role.unwrap_or_default().card_limit(),
        }
    }
}

/// Identity of the caller, passed explicitly to anything that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(Some(self.role))
    }

    pub fn is_admin(&self) -> bool {
        is_admin(Some(self.role))
    }

    pub fn is_super_admin(&self) -> bool {
        is_super_admin(Some(self.role))
    }
}
