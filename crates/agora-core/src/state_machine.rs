use std::fmt;

use crate::error::CoreError;

/// The states of an escrow payment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EscrowState {
    /// Funds are held; awaiting delivery confirmation, dispute, or timeout.
    Pending,
    /// The buyer confirmed delivery; funds released to the seller. Terminal.
    Completed,
    /// A party raised a dispute; only the admin can advance the record.
    Disputed,
    /// The admin resolved the dispute and funds were split. Terminal.
    Resolved,
    /// The escrow timed out and the buyer was refunded in full. Terminal.
    Refunded,
}

impl EscrowState {
    /// Whether this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Resolved | Self::Refunded)
    }
}

impl fmt::Display for EscrowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Completed => write!(f, "Completed"),
            Self::Disputed => write!(f, "Disputed"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Refunded => write!(f, "Refunded"),
        }
    }
}

/// Events that trigger escrow state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowEvent {
    /// The buyer confirmed delivery of the goods.
    DeliveryConfirmed,
    /// The buyer or seller raised a dispute.
    DisputeRaised,
    /// The admin resolved an open dispute.
    DisputeResolved,
    /// The escrow timeout elapsed without confirmation or dispute.
    TimeoutExpired,
}

/// Manages escrow state transitions.
///
/// Valid transitions:
/// - Pending → Completed (DeliveryConfirmed)
/// - Pending → Disputed (DisputeRaised)
/// - Pending → Refunded (TimeoutExpired)
/// - Disputed → Resolved (DisputeResolved)
///
/// Every state other than Disputed → Resolved is reached from Pending,
/// and no record re-enters a state it has exited.
pub struct EscrowStateMachine;

impl EscrowStateMachine {
    /// Attempt a state transition based on an event.
    /// Returns the new state on success, or an error for invalid transitions.
    pub fn transition(
        current: EscrowState,
        event: EscrowEvent,
    ) -> Result<EscrowState, CoreError> {
        let new_state = match (current, event) {
            (EscrowState::Pending, EscrowEvent::DeliveryConfirmed) => EscrowState::Completed,
            (EscrowState::Pending, EscrowEvent::DisputeRaised) => EscrowState::Disputed,
            (EscrowState::Pending, EscrowEvent::TimeoutExpired) => EscrowState::Refunded,
            (EscrowState::Disputed, EscrowEvent::DisputeResolved) => EscrowState::Resolved,

            // All other transitions are invalid
            _ => {
                let target = match event {
                    EscrowEvent::DeliveryConfirmed => EscrowState::Completed,
                    EscrowEvent::DisputeRaised => EscrowState::Disputed,
                    EscrowEvent::DisputeResolved => EscrowState::Resolved,
                    EscrowEvent::TimeoutExpired => EscrowState::Refunded,
                };
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    to: target,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "escrow state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: EscrowState, event: EscrowEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
