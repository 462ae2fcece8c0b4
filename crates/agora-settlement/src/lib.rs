//! Agora Settlement Layer
//!
//! The escrow-based payment settlement engine for the marketplace:
//! payment lifecycle state transitions, fee computation, the admin
//! policy, and the ledger abstraction over the underlying value-transfer
//! primitive.

pub mod adapters;
pub mod engine;
pub mod error;
pub mod fees;
pub mod policy;
pub mod registry;
pub mod traits;
pub mod types;

pub use engine::SettlementEngine;
pub use error::{SettlementError, TransferError};
pub use fees::{compute_fee, split_resolution, FeeSplit, ResolutionSplit};
pub use policy::{AdminPolicy, MAX_FEE_RATE_BPS};
pub use registry::EscrowRegistry;
pub use traits::Ledger;
pub use types::EscrowPayment;
