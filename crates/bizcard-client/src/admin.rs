use tracing::{info, warn};
use uuid::Uuid;

use bizcard_types::{Role, Session, UserWithRole};

use crate::backend::CardBackend;
use crate::error::ClientError;

/// Every account with its role and cards. Admin only.
#[derive(Debug, Clone, Default)]
pub struct AdminUserTable {
    rows: Vec<UserWithRole>,
}

impl AdminUserTable {
    pub async fn load<B: CardBackend>(backend: &B, session: &Session) -> Result<Self, ClientError> {
        if !session.capabilities().can_view_users {
            return Err(ClientError::Forbidden);
        }
        let rows = backend.list_users().await?;
        info!("Loaded {} accounts", rows.len());
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[UserWithRole] {
        &self.rows
    }

    pub fn total_cards(&self) -> usize {
        self.rows.iter().map(UserWithRole::card_count).sum()
    }

    /// Whether the role selector is offered for `row`. Superadmins only, and
    /// never on their own row.
    pub fn show_role_menu(&self, session: &Session, row: &UserWithRole) -> bool {
        session.capabilities().can_change_roles && row.id != session.user_id
    }

    /// Change a role. The visible row is updated optimistically and restored
    /// when the server refuses or cannot be reached.
    pub async fn update_role<B: CardBackend>(
        &mut self,
        backend: &B,
        session: &Session,
        user_id: Uuid,
        role: Role,
    ) -> Result<(), ClientError> {
        if !session.capabilities().can_change_roles || user_id == session.user_id {
            return Err(ClientError::Forbidden);
        }

        let previous = self.rows.iter_mut().find(|r| r.id == user_id).map(|row| {
            let previous = row.role;
            row.role = role;
            previous
        });

        if let Err(e) = backend.update_role(user_id, role).await {
            warn!("Role change for {} failed, restoring row: {}", user_id, e);
            if let (Some(previous), Some(row)) = (previous, self.rows.iter_mut().find(|r| r.id == user_id)) {
                row.role = previous;
            }
            return Err(e);
        }

        info!("{} set role of {} to {}", session.username, user_id, role);
        Ok(())
    }

    /// Pretty JSON of all rows, for download.
    pub fn export_json(&self) -> Result<Vec<u8>, ClientError> {
        Ok(serde_json::to_vec_pretty(&self.rows)?)
    }
}
