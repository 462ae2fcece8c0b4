//! Agora core
//!
//! Shared vocabulary for the marketplace settlement layer: account and
//! asset identities, the escrow lifecycle state machine, and the
//! collaborator interfaces the settlement engine talks to.

pub mod collab;
pub mod config;
pub mod error;
pub mod state_machine;
pub mod types;

pub use collab::{Listing, ListingSource, ReputationSink};
pub use config::EngineConfig;
pub use error::CoreError;
pub use state_machine::{EscrowEvent, EscrowState, EscrowStateMachine};
pub use types::{AccountId, Amount, AssetRef, TransactionOutcome};
