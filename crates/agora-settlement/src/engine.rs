use std::sync::{Arc, RwLock};

use agora_core::collab::{ListingSource, ReputationSink};
use agora_core::config::EngineConfig;
use agora_core::state_machine::{EscrowEvent, EscrowState, EscrowStateMachine};
use agora_core::types::{AccountId, AssetRef, TransactionOutcome};
use chrono::Utc;

use crate::error::SettlementError;
use crate::fees::{compute_fee, split_resolution};
use crate::policy::AdminPolicy;
use crate::registry::EscrowRegistry;
use crate::traits::Ledger;
use crate::types::EscrowPayment;

/// Orchestrates the escrow payment lifecycle.
///
/// The engine owns the escrow registry and the admin policy, and leans
/// on a [`Ledger`] for the actual fund movement. Each transition runs
/// under the record's registry entry guard, so at most one transition is
/// in effect per payment id at a time; transitions on different ids
/// proceed independently.
///
/// A `TransferFailed` error is the only post-validation abort: the
/// record keeps its prior state and the same transition can be retried
/// once the underlying balance issue is fixed.
pub struct SettlementEngine {
    registry: EscrowRegistry,
    policy: RwLock<AdminPolicy>,
    ledger: Arc<dyn Ledger>,
    reputation: Arc<dyn ReputationSink>,
    listings: Option<Arc<dyn ListingSource>>,
    escrow_account: AccountId,
}

impl SettlementEngine {
    /// Build an engine from a config, a ledger, and a reputation sink.
    pub fn new(
        config: &EngineConfig,
        ledger: Arc<dyn Ledger>,
        reputation: Arc<dyn ReputationSink>,
    ) -> Result<Self, SettlementError> {
        let policy = AdminPolicy::from_config(config)?;
        let escrow_account = AccountId::new(config.escrow_account.clone())
            .map_err(|e| SettlementError::PolicyViolation(e.to_string()))?;

        Ok(Self {
            registry: EscrowRegistry::new(),
            policy: RwLock::new(policy),
            ledger,
            reputation,
            listings: None,
            escrow_account,
        })
    }

    /// Attach a listing collaborator for catalog-tied payments.
    pub fn with_listing_source(mut self, listings: Arc<dyn ListingSource>) -> Self {
        self.listings = Some(listings);
        self
    }

    /// The account that holds escrowed funds.
    pub fn escrow_account(&self) -> &AccountId {
        &self.escrow_account
    }

    // =====================================================================
    // Lifecycle transitions
    // =====================================================================

    /// Create a new escrow payment. The caller acts as the buyer.
    ///
    /// Validates the asset against the allow-list and the amount against
    /// zero/overflow, locks in the fee at the current rate, deposits the
    /// gross amount into the escrow account, and inserts a Pending
    /// record. On a failed deposit nothing is recorded.
    pub async fn create_payment(
        &self,
        caller: &AccountId,
        payment_id: &str,
        seller: &AccountId,
        amount: u128,
        asset: AssetRef,
        note: Option<String>,
    ) -> Result<(), SettlementError> {
        if payment_id.is_empty() {
            return Err(SettlementError::PolicyViolation(
                "empty payment id".to_string(),
            ));
        }
        if amount == 0 {
            return Err(SettlementError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        if caller == seller {
            return Err(SettlementError::PolicyViolation(
                "buyer and seller must differ".to_string(),
            ));
        }

        // Snapshot the fee rate now; later policy changes must never
        // touch this record.
        let fee_rate = {
            let policy = self.policy.read().unwrap();
            if !policy.is_asset_supported(&asset) {
                return Err(SettlementError::UnsupportedAsset(asset.to_string()));
            }
            policy.fee_rate_bps()
        };
        let split = compute_fee(amount, fee_rate)?;

        if self.registry.contains(payment_id) {
            return Err(SettlementError::AlreadyExists(payment_id.to_string()));
        }

        self.ledger
            .transfer(caller, &self.escrow_account, amount, &asset)
            .await?;

        let payment = EscrowPayment {
            id: payment_id.to_string(),
            buyer: caller.clone(),
            seller: seller.clone(),
            amount,
            fee_amount: split.fee,
            asset: asset.clone(),
            state: EscrowState::Pending,
            created_at: Utc::now(),
            completed_at: None,
            note,
        };

        if let Err(err) = self.registry.insert(payment) {
            // Lost a duplicate-id race after the deposit: return the funds.
            tracing::warn!(payment_id, "duplicate payment id after deposit, reversing");
            if let Err(reverse) = self
                .ledger
                .transfer(&self.escrow_account, caller, amount, &asset)
                .await
            {
                tracing::error!(payment_id, error = %reverse, "deposit reversal failed");
            }
            return Err(err);
        }

        tracing::info!(
            payment_id,
            buyer = %caller,
            seller = %seller,
            amount,
            fee = split.fee,
            "escrow created"
        );
        Ok(())
    }

    /// Create an escrow payment tied to a catalog listing.
    ///
    /// Seller, price, and asset come from the listing collaborator.
    pub async fn create_payment_for_listing(
        &self,
        caller: &AccountId,
        payment_id: &str,
        listing_id: &str,
        note: Option<String>,
    ) -> Result<(), SettlementError> {
        let listings = self.listings.as_ref().ok_or_else(|| {
            SettlementError::NotFound("no listing source configured".to_string())
        })?;
        let listing = listings
            .listing(listing_id)
            .ok_or_else(|| SettlementError::NotFound(format!("listing {}", listing_id)))?;

        self.create_payment(
            caller,
            payment_id,
            &listing.seller,
            listing.price,
            listing.asset,
            note,
        )
        .await
    }

    /// The buyer confirms delivery: pay `gross - fee` to the seller and
    /// the fee to the treasury, then mark the record Completed.
    pub async fn confirm_delivery(
        &self,
        caller: &AccountId,
        payment_id: &str,
    ) -> Result<(), SettlementError> {
        let treasury = self.policy.read().unwrap().treasury().clone();

        let mut entry = self
            .registry
            .get_mut(payment_id)
            .ok_or_else(|| SettlementError::NotFound(payment_id.to_string()))?;
        let record = entry.value_mut();

        if caller != &record.buyer {
            return Err(SettlementError::NotAuthorized(format!(
                "{} is not the buyer of {}",
                caller, payment_id
            )));
        }
        let next = EscrowStateMachine::transition(record.state, EscrowEvent::DeliveryConfirmed)
            .map_err(|_| {
                SettlementError::InvalidState(format!(
                    "cannot confirm delivery in state {}",
                    record.state
                ))
            })?;

        let buyer = record.buyer.clone();
        let seller = record.seller.clone();
        let asset = record.asset.clone();
        let net = record.amount - record.fee_amount;

        // The entry guard is held across the payout; a failure leaves
        // the record Pending for retry.
        self.pay_out(
            &[(seller.clone(), net), (treasury, record.fee_amount)],
            &asset,
        )
        .await?;

        record.state = next;
        record.completed_at = Some(Utc::now());
        drop(entry);

        self.reputation
            .record_transaction_outcome(&buyer, &seller, TransactionOutcome::Delivered);
        tracing::info!(payment_id, seller = %seller, net, "delivery confirmed, escrow completed");
        Ok(())
    }

    /// The buyer or seller raises a dispute, freezing the escrow until
    /// the admin resolves it. No funds move.
    pub fn raise_dispute(
        &self,
        caller: &AccountId,
        payment_id: &str,
    ) -> Result<(), SettlementError> {
        let mut entry = self
            .registry
            .get_mut(payment_id)
            .ok_or_else(|| SettlementError::NotFound(payment_id.to_string()))?;
        let record = entry.value_mut();

        if caller != &record.buyer && caller != &record.seller {
            return Err(SettlementError::NotAuthorized(format!(
                "{} is neither buyer nor seller of {}",
                caller, payment_id
            )));
        }
        let next = EscrowStateMachine::transition(record.state, EscrowEvent::DisputeRaised)
            .map_err(|_| {
                SettlementError::InvalidState(format!(
                    "cannot raise dispute in state {}",
                    record.state
                ))
            })?;

        record.state = next;
        tracing::info!(payment_id, raised_by = %caller, "dispute raised");
        Ok(())
    }

    /// The admin resolves an open dispute with a split decision.
    ///
    /// `seller_share_bps` of the gross amount goes to the seller (net of
    /// a pro-rata share of the locked-in fee); the rest is refunded
    /// fee-free to the buyer. `10000` behaves exactly like delivery
    /// confirmation; `0` like a full refund.
    pub async fn resolve_dispute(
        &self,
        caller: &AccountId,
        payment_id: &str,
        seller_share_bps: u16,
    ) -> Result<(), SettlementError> {
        let treasury = {
            let policy = self.policy.read().unwrap();
            policy.ensure_admin(caller)?;
            policy.treasury().clone()
        };

        let mut entry = self
            .registry
            .get_mut(payment_id)
            .ok_or_else(|| SettlementError::NotFound(payment_id.to_string()))?;
        let record = entry.value_mut();

        let next = EscrowStateMachine::transition(record.state, EscrowEvent::DisputeResolved)
            .map_err(|_| {
                SettlementError::InvalidState(format!(
                    "cannot resolve dispute in state {}",
                    record.state
                ))
            })?;
        let split = split_resolution(record.amount, record.fee_amount, seller_share_bps)?;

        let buyer = record.buyer.clone();
        let seller = record.seller.clone();
        let asset = record.asset.clone();

        self.pay_out(
            &[
                (seller.clone(), split.seller_net),
                (treasury, split.fee),
                (buyer.clone(), split.buyer_refund),
            ],
            &asset,
        )
        .await?;

        record.state = next;
        record.completed_at = Some(Utc::now());
        drop(entry);

        self.reputation.record_transaction_outcome(
            &buyer,
            &seller,
            TransactionOutcome::DisputeSettled { seller_share_bps },
        );
        tracing::info!(
            payment_id,
            seller_share_bps,
            seller_net = split.seller_net,
            buyer_refund = split.buyer_refund,
            "dispute resolved"
        );
        Ok(())
    }

    /// Refund a pending escrow whose timeout has elapsed.
    ///
    /// Callable by anyone: this is the backstop against a seller who
    /// never ships and a buyer who never confirms. A timely dispute
    /// takes the record out of Pending and blocks this path. The full
    /// gross amount goes back to the buyer; no fee is charged.
    pub async fn expire_refund(
        &self,
        caller: &AccountId,
        payment_id: &str,
    ) -> Result<(), SettlementError> {
        let timeout = self.policy.read().unwrap().escrow_timeout();

        let mut entry = self
            .registry
            .get_mut(payment_id)
            .ok_or_else(|| SettlementError::NotFound(payment_id.to_string()))?;
        let record = entry.value_mut();

        let next = EscrowStateMachine::transition(record.state, EscrowEvent::TimeoutExpired)
            .map_err(|_| {
                SettlementError::InvalidState(format!(
                    "cannot expire escrow in state {}",
                    record.state
                ))
            })?;

        let elapsed = Utc::now() - record.created_at;
        if elapsed < timeout {
            return Err(SettlementError::EscrowNotExpired {
                payment_id: payment_id.to_string(),
                remaining_secs: (timeout - elapsed).num_seconds(),
            });
        }

        let buyer = record.buyer.clone();
        let asset = record.asset.clone();

        self.pay_out(&[(buyer.clone(), record.amount)], &asset).await?;

        record.state = next;
        record.completed_at = Some(Utc::now());
        drop(entry);

        tracing::info!(payment_id, triggered_by = %caller, buyer = %buyer, "escrow expired, buyer refunded");
        Ok(())
    }

    /// Pay out of the escrow account in order, skipping zero legs.
    ///
    /// The ledger primitive is atomic per transfer only, so if a later
    /// leg fails the earlier legs are reversed before the error is
    /// returned, leaving the escrow account whole and the transition
    /// retryable.
    async fn pay_out(
        &self,
        legs: &[(AccountId, u128)],
        asset: &AssetRef,
    ) -> Result<(), SettlementError> {
        let mut done: Vec<(AccountId, u128)> = Vec::new();
        for (to, value) in legs {
            if *value == 0 {
                continue;
            }
            if let Err(err) = self
                .ledger
                .transfer(&self.escrow_account, to, *value, asset)
                .await
            {
                for (account, value) in done.iter().rev() {
                    if let Err(reverse) = self
                        .ledger
                        .transfer(account, &self.escrow_account, *value, asset)
                        .await
                    {
                        tracing::error!(
                            account = %account,
                            value,
                            error = %reverse,
                            "payout compensation failed"
                        );
                    }
                }
                return Err(err.into());
            }
            done.push((to.clone(), *value));
        }
        Ok(())
    }

    // =====================================================================
    // Read accessors
    // =====================================================================

    /// Get a snapshot of a payment record by its id.
    pub fn get_payment(&self, payment_id: &str) -> Option<EscrowPayment> {
        self.registry.get(payment_id)
    }

    /// Payment ids where `user` is the buyer.
    pub fn get_user_purchases(&self, user: &AccountId) -> Vec<String> {
        self.registry.user_purchases(user)
    }

    /// Payment ids where `user` is the seller.
    pub fn get_user_sales(&self, user: &AccountId) -> Vec<String> {
        self.registry.user_sales(user)
    }

    /// Number of payment records ever created.
    pub fn payment_count(&self) -> usize {
        self.registry.len()
    }

    // =====================================================================
    // Admin policy surface
    // =====================================================================

    /// The current admin identity.
    pub fn admin(&self) -> AccountId {
        self.policy.read().unwrap().admin().clone()
    }

    /// The current treasury account.
    pub fn treasury(&self) -> AccountId {
        self.policy.read().unwrap().treasury().clone()
    }

    /// The current fee rate in basis points.
    pub fn fee_rate_bps(&self) -> u16 {
        self.policy.read().unwrap().fee_rate_bps()
    }

    /// The current escrow timeout.
    pub fn escrow_timeout(&self) -> chrono::Duration {
        self.policy.read().unwrap().escrow_timeout()
    }

    /// Whether an asset is currently accepted for new escrows.
    pub fn is_asset_supported(&self, asset: &AssetRef) -> bool {
        self.policy.read().unwrap().is_asset_supported(asset)
    }

    /// Set the fee rate (admin only, capped at 10%).
    pub fn set_fee_rate(&self, caller: &AccountId, rate_bps: u16) -> Result<(), SettlementError> {
        self.policy.write().unwrap().set_fee_rate(caller, rate_bps)
    }

    /// Set the treasury account (admin only).
    pub fn set_treasury(
        &self,
        caller: &AccountId,
        treasury: AccountId,
    ) -> Result<(), SettlementError> {
        self.policy.write().unwrap().set_treasury(caller, treasury)
    }

    /// Set the escrow timeout (admin only).
    pub fn set_escrow_timeout(
        &self,
        caller: &AccountId,
        timeout: chrono::Duration,
    ) -> Result<(), SettlementError> {
        self.policy
            .write()
            .unwrap()
            .set_escrow_timeout(caller, timeout)
    }

    /// Enable or disable an asset for new escrows (admin only).
    pub fn set_asset_enabled(
        &self,
        caller: &AccountId,
        asset: AssetRef,
        enabled: bool,
    ) -> Result<(), SettlementError> {
        self.policy
            .write()
            .unwrap()
            .set_asset_enabled(caller, asset, enabled)
    }

    /// Hand the admin role to `new_admin`, effective immediately (admin only).
    pub fn transfer_admin(
        &self,
        caller: &AccountId,
        new_admin: AccountId,
    ) -> Result<(), SettlementError> {
        self.policy
            .write()
            .unwrap()
            .transfer_admin(caller, new_admin)
    }
}
