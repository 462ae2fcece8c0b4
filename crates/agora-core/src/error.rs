use crate::state_machine::EscrowState;

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: EscrowState,
        to: EscrowState,
    },

    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("validation failed: {0}")]
    ValidationError(String),
}
