use serde::{Deserialize, Serialize};

/// A managed remote browser instance as reported by the session provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSession {
    pub uuid: String,
    pub name: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_port: Option<u16>,
}

/// Remote session lifecycle state.
///
/// Unrecognized provider values deserialize as `Unknown` so a provider
/// upgrade cannot break status polling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Running,
    AutomationRunning,
    Stopped,
    #[serde(other)]
    Unknown,
}

impl SessionStatus {
    /// A session is usable for automation while running in either mode.
    pub fn is_active(self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::AutomationRunning)
    }
}
