use serde::{Deserialize, Serialize};

/// Configuration for a settlement engine instance.
///
/// Account fields hold full `acct:` URIs; they are validated when the
/// engine is constructed. Each test builds its own isolated config
/// rather than sharing process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Account that holds escrowed funds while payments are pending.
    pub escrow_account: String,
    /// Initial admin identity.
    pub admin: String,
    /// Account that receives fee proceeds.
    pub treasury: String,
    /// Fee rate in basis points (capped at 1000 = 10%).
    pub fee_rate_bps: u16,
    /// How long a pending escrow stays refund-locked (seconds).
    pub escrow_timeout_secs: i64,
    /// Whether the native coin is accepted at startup. Token assets are
    /// enabled by the admin at runtime.
    pub support_native: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            escrow_account: "acct:platform:escrow".into(),
            admin: "acct:platform:admin".into(),
            treasury: "acct:platform:treasury".into(),
            fee_rate_bps: 250,
            escrow_timeout_secs: 7 * 24 * 3600,
            support_native: true,
        }
    }
}
