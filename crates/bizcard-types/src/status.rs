use serde::{Deserialize, Serialize};

/// Backend reachability as seen by one client process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(self) -> bool {
        self == ConnectionStatus::Connected
    }

    /// Only a probe that actually failed switches writes to local-only mode.
    pub fn is_local_only(self) -> bool {
        self == ConnectionStatus::Disconnected
    }
}
