use agora_core::types::{AccountId, AssetRef};
use async_trait::async_trait;

use crate::error::TransferError;

/// Abstraction over the underlying value-transfer primitive.
///
/// Each implementation bridges the settlement engine to a concrete
/// balance store (native coin, token contract, in-memory test ledger).
/// A transfer is atomic: either the full value moves or nothing does.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Move `value` atomic units of `asset` from `from` to `to`.
    async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        value: u128,
        asset: &AssetRef,
    ) -> Result<(), TransferError>;
}
