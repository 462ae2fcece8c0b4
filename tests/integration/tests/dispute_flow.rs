//! Integration test: dispute lifecycle and resolution splits.
//!
//! Covers the dispute-blocks-expiry edge case, the full range of
//! resolution splits, and the reputation impact of disputed
//! transactions.

use std::sync::Arc;

use agora_core::{AccountId, AssetRef, EngineConfig, EscrowState, TransactionOutcome};
use agora_reputation::ReputationBook;
use agora_settlement::adapters::InMemoryLedger;
use agora_settlement::{Ledger, SettlementEngine, SettlementError};

fn buyer() -> AccountId {
    AccountId::from_parts("user", "alice")
}

fn seller() -> AccountId {
    AccountId::from_parts("user", "bob")
}

fn admin() -> AccountId {
    AccountId::from_parts("platform", "admin")
}

fn treasury() -> AccountId {
    AccountId::from_parts("platform", "treasury")
}

fn create_market(
    buyer_funds: u128,
) -> (SettlementEngine, Arc<InMemoryLedger>, Arc<ReputationBook>) {
    let ledger = Arc::new(InMemoryLedger::new());
    let reputation = Arc::new(ReputationBook::new());
    ledger.credit(&buyer(), &AssetRef::Native, buyer_funds);

    let engine = SettlementEngine::new(
        &EngineConfig::default(),
        Arc::clone(&ledger) as Arc<dyn Ledger>,
        Arc::clone(&reputation) as _,
    )
    .unwrap();
    (engine, ledger, reputation)
}

// =========================================================================
// A timely dispute blocks the timeout refund
// =========================================================================

#[tokio::test]
async fn test_dispute_blocks_expiry_until_resolved() {
    let (engine, ledger, _) = create_market(1000);

    engine
        .create_payment(&buyer(), "d1", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();
    engine.raise_dispute(&buyer(), "d1").unwrap();

    // Timeout fully elapsed, but the record is Disputed, not Pending.
    engine
        .set_escrow_timeout(&admin(), chrono::Duration::zero())
        .unwrap();
    let result = engine.expire_refund(&seller(), "d1").await;
    assert!(matches!(result, Err(SettlementError::InvalidState(_))));
    assert_eq!(ledger.balance(engine.escrow_account(), &AssetRef::Native), 1000);

    // Only the admin's resolution releases the funds.
    engine.resolve_dispute(&admin(), "d1", 0).await.unwrap();
    assert_eq!(ledger.balance(&buyer(), &AssetRef::Native), 1000);
    assert_eq!(engine.get_payment("d1").unwrap().state, EscrowState::Resolved);

    // Resolved is terminal: the expiry backstop stays closed.
    let result = engine.expire_refund(&seller(), "d1").await;
    assert!(matches!(result, Err(SettlementError::InvalidState(_))));
}

// =========================================================================
// Resolution split spectrum
// =========================================================================

#[tokio::test]
async fn test_full_release_resolution_matches_confirm_economics() {
    let (engine, ledger, reputation) = create_market(1000);

    engine
        .create_payment(&buyer(), "d2", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();
    engine.raise_dispute(&seller(), "d2").unwrap();
    engine.resolve_dispute(&admin(), "d2", 10_000).await.unwrap();

    // Identical to confirm_delivery: 975 / 25, nothing back to the buyer.
    assert_eq!(ledger.balance(&seller(), &AssetRef::Native), 975);
    assert_eq!(ledger.balance(&treasury(), &AssetRef::Native), 25);
    assert_eq!(ledger.balance(&buyer(), &AssetRef::Native), 0);

    let record = reputation.get(&seller()).unwrap();
    assert_eq!(record.disputed, 1);
    assert_eq!(record.disputed_share_sum_bps, 10_000);
}

#[tokio::test]
async fn test_full_refund_resolution_charges_no_fee() {
    let (engine, ledger, reputation) = create_market(1000);

    engine
        .create_payment(&buyer(), "d3", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();
    engine.raise_dispute(&buyer(), "d3").unwrap();
    engine.resolve_dispute(&admin(), "d3", 0).await.unwrap();

    assert_eq!(ledger.balance(&buyer(), &AssetRef::Native), 1000);
    assert_eq!(ledger.balance(&seller(), &AssetRef::Native), 0);
    assert_eq!(ledger.balance(&treasury(), &AssetRef::Native), 0);

    let events_for_buyer = reputation.get(&buyer()).unwrap();
    assert_eq!(events_for_buyer.disputed, 1);
}

#[tokio::test]
async fn test_partial_resolution_split() {
    let (engine, ledger, _) = create_market(1000);

    engine
        .create_payment(&buyer(), "d4", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();
    engine.raise_dispute(&buyer(), "d4").unwrap();

    // 75% to the seller: gross 750, fee floor(25 * 0.75) = 18, net 732.
    engine.resolve_dispute(&admin(), "d4", 7500).await.unwrap();

    assert_eq!(ledger.balance(&seller(), &AssetRef::Native), 732);
    assert_eq!(ledger.balance(&treasury(), &AssetRef::Native), 18);
    assert_eq!(ledger.balance(&buyer(), &AssetRef::Native), 250);
    assert_eq!(ledger.balance(engine.escrow_account(), &AssetRef::Native), 0);
}

// =========================================================================
// Reputation impact over time
// =========================================================================

#[tokio::test]
async fn test_disputes_drag_down_reputation() {
    let (engine, _, reputation) = create_market(10_000);

    for i in 0..4 {
        let id = format!("clean-{}", i);
        engine
            .create_payment(&buyer(), &id, &seller(), 1000, AssetRef::Native, None)
            .await
            .unwrap();
        engine.confirm_delivery(&buyer(), &id).await.unwrap();
    }

    let clean_score = reputation.score(&seller());

    engine
        .create_payment(&buyer(), "bad", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();
    engine.raise_dispute(&buyer(), "bad").unwrap();
    engine.resolve_dispute(&admin(), "bad", 2500).await.unwrap();

    let after_dispute = reputation.score(&seller());
    assert!(after_dispute < clean_score);

    let record = reputation.get(&seller()).unwrap();
    assert_eq!(record.completed, 4);
    assert_eq!(record.disputed, 1);
    assert!((record.success_rate() - 0.8).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_outcome_kinds_are_distinguished() {
    let (engine, _, reputation) = create_market(2000);

    engine
        .create_payment(&buyer(), "ok", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();
    engine.confirm_delivery(&buyer(), "ok").await.unwrap();

    engine
        .create_payment(&buyer(), "contested", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();
    engine.raise_dispute(&seller(), "contested").unwrap();
    engine
        .resolve_dispute(&admin(), "contested", 5000)
        .await
        .unwrap();

    let record = reputation.get(&buyer()).unwrap();
    assert_eq!(record.completed, 1);
    assert_eq!(record.disputed, 1);

    // Display keeps the two kinds apart for logs and audits.
    assert_eq!(format!("{}", TransactionOutcome::Delivered), "Delivered");
    assert_eq!(
        format!(
            "{}",
            TransactionOutcome::DisputeSettled {
                seller_share_bps: 5000
            }
        ),
        "DisputeSettled(5000 bps)"
    );
}
