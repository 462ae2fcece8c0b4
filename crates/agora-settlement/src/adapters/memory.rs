use agora_core::types::{AccountId, AssetRef};
use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::TransferError;
use crate::traits::Ledger;

/// In-memory ledger adapter.
///
/// Keeps per-account balances for every asset in a single process.
/// Useful for tests and for local settlement that does not touch an
/// external chain. A transfer debits the sender before crediting the
/// receiver; if the debit fails nothing moves.
pub struct InMemoryLedger {
    /// Balance tracker: (account URI, asset display) -> balance.
    balances: DashMap<String, u128>,
}

impl InMemoryLedger {
    /// Create a new ledger with all balances at zero.
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// Build a composite balance key from an account and asset.
    fn balance_key(account: &AccountId, asset: &AssetRef) -> String {
        format!("{}:{}", account.uri(), asset)
    }

    /// Get the current balance for an account + asset pair.
    pub fn balance(&self, account: &AccountId, asset: &AssetRef) -> u128 {
        let key = Self::balance_key(account, asset);
        self.balances.get(&key).map(|v| *v).unwrap_or(0)
    }

    /// Credit an account out of thin air. Test/bootstrap funding only.
    pub fn credit(&self, account: &AccountId, asset: &AssetRef, value: u128) {
        let key = Self::balance_key(account, asset);
        self.balances
            .entry(key)
            .and_modify(|b| *b = b.saturating_add(value))
            .or_insert(value);
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        value: u128,
        asset: &AssetRef,
    ) -> Result<(), TransferError> {
        if value == 0 {
            return Ok(());
        }
        if from == to {
            return Err(TransferError::AssetTransferRejected(
                "self-transfer".to_string(),
            ));
        }

        let from_key = Self::balance_key(from, asset);
        let to_key = Self::balance_key(to, asset);

        // Debit the sender; the entry guard makes the check-and-subtract atomic.
        {
            let mut entry =
                self.balances
                    .get_mut(&from_key)
                    .ok_or(TransferError::InsufficientBalance {
                        available: 0,
                        required: value,
                    })?;
            if *entry < value {
                return Err(TransferError::InsufficientBalance {
                    available: *entry,
                    required: value,
                });
            }
            *entry -= value;
        }

        // Credit the receiver. A u128 credit cannot overflow in practice
        // because total supply entered through saturating credits.
        self.balances
            .entry(to_key)
            .and_modify(|b| *b = b.saturating_add(value))
            .or_insert(value);

        tracing::debug!(from = %from, to = %to, value, asset = %asset, "ledger transfer");
        Ok(())
    }
}
