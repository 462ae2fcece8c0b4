/// Errors from the underlying value-transfer primitive.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: u128, required: u128 },

    #[error("asset transfer rejected: {0}")]
    AssetTransferRejected(String),
}

/// Settlement-layer errors.
///
/// `TransferFailed` is the only condition that can abort a transition
/// after validation; the engine guarantees the record is unchanged so the
/// same transition can be retried. Everything else is rejected before any
/// mutation.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("payment already exists: {0}")]
    AlreadyExists(String),

    #[error("payment not found: {0}")]
    NotFound(String),

    #[error("unsupported asset: {0}")]
    UnsupportedAsset(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("policy violation: {0}")]
    PolicyViolation(String),

    #[error("escrow not expired: {payment_id} ({remaining_secs}s remaining)")]
    EscrowNotExpired {
        payment_id: String,
        remaining_secs: i64,
    },
}
