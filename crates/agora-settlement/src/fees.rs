//! Pure fee arithmetic.
//!
//! The fee rate is range-checked when the admin sets it (see
//! [`crate::policy`]); calculation trusts the stored rate.

use crate::error::SettlementError;

/// Basis-point denominator: 10000 bps = 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// A gross amount split into the seller's net and the platform fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    /// Amount released to the seller.
    pub net: u128,
    /// Amount retained for the treasury.
    pub fee: u128,
}

/// Split `amount` into net and fee using integer floor division:
/// `fee = floor(amount * rate_bps / 10000)`.
pub fn compute_fee(amount: u128, rate_bps: u16) -> Result<FeeSplit, SettlementError> {
    let fee = amount
        .checked_mul(rate_bps as u128)
        .ok_or_else(|| {
            SettlementError::InvalidAmount(format!("fee computation overflow for {}", amount))
        })?
        / BPS_DENOMINATOR;
    Ok(FeeSplit {
        net: amount - fee,
        fee,
    })
}

/// How a disputed escrow's gross amount is divided at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionSplit {
    /// Portion released to the seller, net of fee.
    pub seller_net: u128,
    /// Fee retained for the treasury, taken only from the seller portion.
    pub fee: u128,
    /// Portion refunded to the buyer, fee-free.
    pub buyer_refund: u128,
}

/// Divide a disputed escrow per the admin's `seller_share_bps` decision.
///
/// `fee_amount` is the fee locked in at creation time; the resolution
/// charges it pro rata on the released portion, so a full release
/// (10000 bps) behaves exactly like delivery confirmation and a full
/// refund (0 bps) charges nothing.
pub fn split_resolution(
    amount: u128,
    fee_amount: u128,
    seller_share_bps: u16,
) -> Result<ResolutionSplit, SettlementError> {
    if seller_share_bps as u128 > BPS_DENOMINATOR {
        return Err(SettlementError::PolicyViolation(format!(
            "seller share {} bps exceeds 10000",
            seller_share_bps
        )));
    }

    let share = seller_share_bps as u128;
    let seller_gross = amount
        .checked_mul(share)
        .ok_or_else(|| {
            SettlementError::InvalidAmount(format!("resolution split overflow for {}", amount))
        })?
        / BPS_DENOMINATOR;
    // fee_amount <= amount, so this cannot overflow where the line above did not.
    let fee = fee_amount * share / BPS_DENOMINATOR;

    Ok(ResolutionSplit {
        seller_net: seller_gross - fee,
        fee,
        buyer_refund: amount - seller_gross,
    })
}
