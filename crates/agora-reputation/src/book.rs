use agora_core::collab::ReputationSink;
use agora_core::types::{AccountId, TransactionOutcome};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Weight of the clean-completion rate in the composite score.
const WEIGHT_SUCCESS_RATE: f64 = 0.7;
/// Weight of transaction volume in the composite score.
const WEIGHT_VOLUME: f64 = 0.3;

/// Transaction count at which the volume component saturates at 1.0.
const REFERENCE_VOLUME: f64 = 50.0;

/// Per-participant outcome counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Transactions that completed without a dispute.
    pub completed: u64,
    /// Transactions that went through dispute resolution.
    pub disputed: u64,
    /// Sum of the seller shares (in bps) across disputed transactions.
    /// Divided by `disputed`, this says how often disputes went the
    /// seller's way.
    pub disputed_share_sum_bps: u64,
}

impl ParticipantRecord {
    /// Total finished transactions.
    pub fn total(&self) -> u64 {
        self.completed + self.disputed
    }

    /// Fraction of transactions that finished without a dispute.
    /// Returns 1.0 for a participant with no history.
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 1.0;
        }
        self.completed as f64 / total as f64
    }

    /// Weighted composite reputation score in `[0.0, 1.0]`.
    ///
    /// Success rate dominates; volume rewards sustained activity and
    /// saturates at [`REFERENCE_VOLUME`] transactions.
    pub fn score(&self) -> f64 {
        let volume = (self.total() as f64 / REFERENCE_VOLUME).clamp(0.0, 1.0);
        let score = WEIGHT_SUCCESS_RATE * self.success_rate() + WEIGHT_VOLUME * volume;
        score.clamp(0.0, 1.0)
    }
}

/// Reputation bookkeeping for all marketplace participants.
///
/// Thread-safe: uses `DashMap` for concurrent access.
pub struct ReputationBook {
    records: DashMap<AccountId, ParticipantRecord>,
}

impl ReputationBook {
    /// Create a new, empty book.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Get a snapshot of a participant's record.
    pub fn get(&self, account: &AccountId) -> Option<ParticipantRecord> {
        self.records.get(account).map(|entry| entry.clone())
    }

    /// A participant's composite score. Unknown participants start at
    /// the no-history score.
    pub fn score(&self, account: &AccountId) -> f64 {
        self.records
            .get(account)
            .map(|entry| entry.score())
            .unwrap_or_else(|| ParticipantRecord::default().score())
    }

    /// Number of participants with recorded history.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the book has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn bump(&self, account: &AccountId, outcome: TransactionOutcome) {
        let mut record = self.records.entry(account.clone()).or_default();
        match outcome {
            TransactionOutcome::Delivered => record.completed += 1,
            TransactionOutcome::DisputeSettled { seller_share_bps } => {
                record.disputed += 1;
                record.disputed_share_sum_bps += seller_share_bps as u64;
            }
        }
    }
}

impl Default for ReputationBook {
    fn default() -> Self {
        Self::new()
    }
}

impl ReputationSink for ReputationBook {
    fn record_transaction_outcome(
        &self,
        buyer: &AccountId,
        seller: &AccountId,
        outcome: TransactionOutcome,
    ) {
        self.bump(buyer, outcome);
        self.bump(seller, outcome);
        tracing::debug!(buyer = %buyer, seller = %seller, outcome = %outcome, "outcome recorded");
    }
}
