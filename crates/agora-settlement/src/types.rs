use agora_core::state_machine::EscrowState;
use agora_core::types::{AccountId, AssetRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An escrow payment record.
///
/// Identified by a caller-supplied opaque id. Records are append-only:
/// they are never deleted, and once the state is terminal the record is
/// immutable. `fee_amount` is computed once at creation with the fee
/// rate in effect at that moment; later policy changes never touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowPayment {
    /// Caller-supplied unique payment id.
    pub id: String,
    /// The buyer (funds originator).
    pub buyer: AccountId,
    /// The seller (funds destination on completion).
    pub seller: AccountId,
    /// Gross amount held in escrow, in atomic units.
    pub amount: u128,
    /// Fee locked in at creation: `floor(amount * fee_rate_bps / 10000)`.
    pub fee_amount: u128,
    /// Asset the escrow is denominated in.
    pub asset: AssetRef,
    /// Current lifecycle state.
    pub state: EscrowState,
    /// When the escrow was created.
    pub created_at: DateTime<Utc>,
    /// When the escrow reached a terminal state, if it has.
    pub completed_at: Option<DateTime<Utc>>,
    /// Optional free-text note from the buyer.
    pub note: Option<String>,
}
