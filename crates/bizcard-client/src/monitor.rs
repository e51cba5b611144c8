use tokio::sync::OnceCell;
use tracing::{info, warn};

use bizcard_types::ConnectionStatus;

use crate::backend::CardBackend;
use crate::notice::Notice;

/// One-shot backend reachability check. The first `probe` decides the
/// status for the lifetime of the monitor; there is no polling.
#[derive(Debug, Default)]
pub struct ConnectionMonitor {
    status: OnceCell<ConnectionStatus>,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn probe<B: CardBackend>(&self, backend: &B) -> ConnectionStatus {
        *self
            .status
            .get_or_init(|| async {
                match backend.health().await {
                    Ok(()) => {
                        info!("Backend reachable");
                        ConnectionStatus::Connected
                    }
                    Err(e) => {
                        warn!("Backend unreachable, working from local cache: {}", e);
                        ConnectionStatus::Disconnected
                    }
                }
            })
            .await
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.get().copied().unwrap_or_default()
    }

    /// Passive banner shown while disconnected.
    pub fn banner(&self) -> Option<Notice> {
        self.status()
            .is_local_only()
            .then(|| Notice::warning("Offline: changes are saved on this device only."))
    }
}
