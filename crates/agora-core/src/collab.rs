//! Collaborator interfaces consumed by the settlement engine.
//!
//! The engine notifies a reputation collaborator when a transaction
//! finishes (completed or dispute-settled), and may ask a listing
//! collaborator for the authoritative seller and price of a catalog item
//! at payment-creation time.

use crate::types::{AccountId, AssetRef, TransactionOutcome};

/// Receives the outcome of every finished marketplace transaction.
pub trait ReputationSink: Send + Sync {
    /// Record that a transaction between `buyer` and `seller` finished
    /// with the given outcome.
    fn record_transaction_outcome(
        &self,
        buyer: &AccountId,
        seller: &AccountId,
        outcome: TransactionOutcome,
    );
}

/// A catalog listing, as reported by the listing collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// The seller offering this listing.
    pub seller: AccountId,
    /// Asking price in atomic units.
    pub price: u128,
    /// Asset the price is denominated in.
    pub asset: AssetRef,
}

/// Supplies authoritative seller/price data for catalog items.
pub trait ListingSource: Send + Sync {
    /// Look up a listing by its catalog id.
    fn listing(&self, listing_id: &str) -> Option<Listing>;
}
