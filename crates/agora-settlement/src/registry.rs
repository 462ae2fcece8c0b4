use agora_core::types::AccountId;
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;

use crate::error::SettlementError;
use crate::types::EscrowPayment;

/// Owner of all escrow payment records.
///
/// One record per payment id, never overwritten and never deleted.
/// Purchase and sale indexes are maintained inside the same insert, so a
/// record is visible through its id and both indexes at once.
///
/// Thread-safe: uses `DashMap`. Mutable access goes through
/// [`EscrowRegistry::get_mut`]; holding the returned guard for the whole
/// transition is what serializes concurrent attempts on the same id.
pub struct EscrowRegistry {
    escrows: DashMap<String, EscrowPayment>,
    purchases: DashMap<AccountId, Vec<String>>,
    sales: DashMap<AccountId, Vec<String>>,
}

impl EscrowRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            escrows: DashMap::new(),
            purchases: DashMap::new(),
            sales: DashMap::new(),
        }
    }

    /// Insert a freshly created record.
    ///
    /// Rejects duplicate ids with `AlreadyExists`, leaving the original
    /// record untouched.
    pub fn insert(&self, payment: EscrowPayment) -> Result<(), SettlementError> {
        let id = payment.id.clone();
        let buyer = payment.buyer.clone();
        let seller = payment.seller.clone();

        match self.escrows.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(SettlementError::AlreadyExists(id));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(payment);
            }
        }

        self.purchases.entry(buyer).or_default().push(id.clone());
        self.sales.entry(seller).or_default().push(id.clone());

        tracing::info!(payment_id = %id, "escrow record inserted");
        Ok(())
    }

    /// Whether a record exists for this id.
    pub fn contains(&self, payment_id: &str) -> bool {
        self.escrows.contains_key(payment_id)
    }

    /// Get a snapshot of a record by its id.
    pub fn get(&self, payment_id: &str) -> Option<EscrowPayment> {
        self.escrows.get(payment_id).map(|entry| entry.clone())
    }

    /// Get a mutable entry guard for a record.
    ///
    /// The guard locks out every other transition on the same id until
    /// it is dropped.
    pub(crate) fn get_mut(&self, payment_id: &str) -> Option<RefMut<'_, String, EscrowPayment>> {
        self.escrows.get_mut(payment_id)
    }

    /// Payment ids where `user` is the buyer, in creation order.
    pub fn user_purchases(&self, user: &AccountId) -> Vec<String> {
        self.purchases
            .get(user)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Payment ids where `user` is the seller, in creation order.
    pub fn user_sales(&self, user: &AccountId) -> Vec<String> {
        self.sales
            .get(user)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Get the number of tracked records.
    pub fn len(&self) -> usize {
        self.escrows.len()
    }

    /// Check if the registry has no records.
    pub fn is_empty(&self) -> bool {
        self.escrows.is_empty()
    }
}

impl Default for EscrowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
