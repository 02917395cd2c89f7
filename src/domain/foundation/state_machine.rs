//! State machine trait for phase enums.
//!
//! Gives every lifecycle enum the same validated `transition_to` entry point,
//! so an illegal hop surfaces as an `InvalidStateTransition` domain error
//! instead of a silent assignment.

use super::{DomainError, ErrorCode};

/// Trait for enums that represent state machines.
///
/// Implementors list the legal edges; validated transitions come for free.
///
/// ```ignore
/// let next = SupportPhase::Bot.transition_to(SupportPhase::Transferring)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition from {:?} to {:?}", self, target),
            )
            .with_detail("from", format!("{:?}", self))
            .with_detail("to", format!("{:?}", target)))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
