//! Agora reputation layer
//!
//! Tracks transaction outcomes per participant and derives a weighted
//! reputation score. The settlement engine feeds this through the
//! [`agora_core::collab::ReputationSink`] interface.

pub mod book;

pub use book::{ParticipantRecord, ReputationBook};
