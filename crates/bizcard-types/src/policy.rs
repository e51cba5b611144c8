use uuid::Uuid;

use crate::role::Role;

/// Result of the one-card-per-account check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateDecision {
    Allowed,
    /// Creation refused; the caller should offer to edit `existing` instead.
    Blocked { existing: Uuid },
}

impl CreateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, CreateDecision::Allowed)
    }
}

/// Decide whether an account holding `existing` cards may create another.
pub fn can_create_card(role: Role, existing: &[Uuid]) -> CreateDecision {
    match (role.card_limit(), existing.first()) {
        (Some(limit), Some(first)) if existing.len() >= limit => CreateDecision::Blocked { existing: *first },
        _ => CreateDecision::Allowed,
    }
}
