//! Ledger adapter implementations.

pub mod memory;

pub use memory::InMemoryLedger;
