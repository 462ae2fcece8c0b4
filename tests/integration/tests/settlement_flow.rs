//! Integration test: the escrow settlement happy path across crates.
//!
//! Drives the settlement engine against the in-memory ledger and the
//! real reputation book, checking fund movement, fee accounting, and
//! record lifecycle end to end.

use std::sync::Arc;

use agora_core::{AccountId, AssetRef, EngineConfig, EscrowState};
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

/// Helper: engine wired to a funded in-memory ledger and a live
/// reputation book.
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
// Worked example "p1": 1000 at 250 bps → 975 to seller, 25 to treasury
// =========================================================================

#[tokio::test]
async fn test_p1_confirm_delivery_flow() {
    let (engine, ledger, reputation) = create_market(1000);

    engine
        .create_payment(&buyer(), "p1", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();

    let payment = engine.get_payment("p1").unwrap();
    assert_eq!(payment.state, EscrowState::Pending);
    assert_eq!(payment.fee_amount, 25);

    engine.confirm_delivery(&buyer(), "p1").await.unwrap();

    assert_eq!(ledger.balance(&seller(), &AssetRef::Native), 975);
    assert_eq!(ledger.balance(&treasury(), &AssetRef::Native), 25);
    assert_eq!(ledger.balance(&buyer(), &AssetRef::Native), 0);
    assert_eq!(engine.get_payment("p1").unwrap().state, EscrowState::Completed);

    // Second confirmation is rejected without side effects.
    let result = engine.confirm_delivery(&buyer(), "p1").await;
    assert!(matches!(result, Err(SettlementError::InvalidState(_))));
    assert_eq!(ledger.balance(&seller(), &AssetRef::Native), 975);

    // Both parties got a clean-completion mark.
    assert_eq!(reputation.get(&buyer()).unwrap().completed, 1);
    assert_eq!(reputation.get(&seller()).unwrap().completed, 1);
}

// =========================================================================
// Worked example "p2": timeout-gated refund
// =========================================================================

#[tokio::test]
async fn test_p2_expire_refund_flow() {
    let (engine, ledger, reputation) = create_market(500);

    engine
        .create_payment(&buyer(), "p2", &seller(), 500, AssetRef::Native, None)
        .await
        .unwrap();

    // Before the timeout elapses the refund is gated.
    let result = engine.expire_refund(&buyer(), "p2").await;
    assert!(matches!(
        result,
        Err(SettlementError::EscrowNotExpired { .. })
    ));

    // Shrink the timeout to zero; the same call now succeeds.
    engine
        .set_escrow_timeout(&admin(), chrono::Duration::zero())
        .unwrap();
    engine.expire_refund(&seller(), "p2").await.unwrap();

    assert_eq!(ledger.balance(&buyer(), &AssetRef::Native), 500);
    assert_eq!(ledger.balance(&treasury(), &AssetRef::Native), 0);
    assert_eq!(engine.get_payment("p2").unwrap().state, EscrowState::Refunded);

    // Expiry is not a reputation event.
    assert!(reputation.get(&buyer()).is_none());
    assert!(reputation.get(&seller()).is_none());
}

// =========================================================================
// Fee immutability and duplicate-id rejection
// =========================================================================

#[tokio::test]
async fn test_fee_locked_at_creation() {
    let (engine, ledger, _) = create_market(2000);

    engine
        .create_payment(&buyer(), "early", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();

    engine.set_fee_rate(&admin(), 1000).unwrap();

    engine
        .create_payment(&buyer(), "late", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();

    // The early escrow keeps its 250 bps fee; the late one pays 10%.
    assert_eq!(engine.get_payment("early").unwrap().fee_amount, 25);
    assert_eq!(engine.get_payment("late").unwrap().fee_amount, 100);

    engine.confirm_delivery(&buyer(), "early").await.unwrap();
    engine.confirm_delivery(&buyer(), "late").await.unwrap();

    assert_eq!(ledger.balance(&seller(), &AssetRef::Native), 975 + 900);
    assert_eq!(ledger.balance(&treasury(), &AssetRef::Native), 25 + 100);
}

#[tokio::test]
async fn test_duplicate_id_leaves_original_untouched() {
    let (engine, ledger, _) = create_market(5000);

    engine
        .create_payment(&buyer(), "dup", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();

    let result = engine
        .create_payment(&buyer(), "dup", &seller(), 2000, AssetRef::Native, None)
        .await;
    assert!(matches!(result, Err(SettlementError::AlreadyExists(_))));

    let payment = engine.get_payment("dup").unwrap();
    assert_eq!(payment.amount, 1000);
    assert_eq!(payment.state, EscrowState::Pending);
    // Buyer was charged exactly once.
    assert_eq!(ledger.balance(&buyer(), &AssetRef::Native), 4000);
}

// =========================================================================
// Ledger conservation across a mixed workload
// =========================================================================

#[tokio::test]
async fn test_total_supply_is_conserved() {
    let (engine, ledger, _) = create_market(10_000);

    engine
        .create_payment(&buyer(), "a", &seller(), 3000, AssetRef::Native, None)
        .await
        .unwrap();
    engine
        .create_payment(&buyer(), "b", &seller(), 2000, AssetRef::Native, None)
        .await
        .unwrap();
    engine
        .create_payment(&buyer(), "c", &seller(), 1000, AssetRef::Native, None)
        .await
        .unwrap();

    engine.confirm_delivery(&buyer(), "a").await.unwrap();
    engine.raise_dispute(&seller(), "b").unwrap();
    engine.resolve_dispute(&admin(), "b", 5000).await.unwrap();
    engine
        .set_escrow_timeout(&admin(), chrono::Duration::zero())
        .unwrap();
    engine.expire_refund(&buyer(), "c").await.unwrap();

    let total = ledger.balance(&buyer(), &AssetRef::Native)
        + ledger.balance(&seller(), &AssetRef::Native)
        + ledger.balance(&treasury(), &AssetRef::Native)
        + ledger.balance(engine.escrow_account(), &AssetRef::Native);
    assert_eq!(total, 10_000);
    // Every record is terminal, so nothing is left in escrow.
    assert_eq!(ledger.balance(engine.escrow_account(), &AssetRef::Native), 0);
}

#[tokio::test]
async fn test_purchase_and_sale_history() {
    let (engine, _, _) = create_market(600);

    for id in ["h1", "h2", "h3"] {
        engine
            .create_payment(&buyer(), id, &seller(), 200, AssetRef::Native, None)
            .await
            .unwrap();
    }

    assert_eq!(
        engine.get_user_purchases(&buyer()),
        vec!["h1".to_string(), "h2".to_string(), "h3".to_string()]
    );
    assert_eq!(
        engine.get_user_sales(&seller()),
        vec!["h1".to_string(), "h2".to_string(), "h3".to_string()]
    );
}
