// ABOUTME: Per-user launch session state machine from launch through outcome submission
// ABOUTME: Refuses duplicate grade postings while allowing the assessment page to re-display

//! Launch session state machine.
//!
//! The hosting layer stores one [`LaunchSession`] per web session and
//! drives it through the core operations; the core manages no timers or
//! expiry. `OutcomeSubmitted` is terminal for grade posting, but the
//! stored context stays readable so the assessment page can re-render.

use crate::errors::SessionError;
use crate::launch::context::LaunchContext;
use serde::{Deserialize, Serialize};

/// Discriminant of a [`LaunchSession`], for state assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No launch has been verified.
    Unauthenticated,
    /// A launch has been verified and its context stored.
    Launched,
    /// An outcome has been sent for the stored context.
    OutcomeSubmitted,
}

/// Holds a validated launch context across the start → take assessment →
/// submit flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum LaunchSession {
    /// Initial state; no context stored.
    #[default]
    Unauthenticated,
    /// A verified launch context is stored.
    Launched(LaunchContext),
    /// An outcome has been submitted for the stored context.
    OutcomeSubmitted(LaunchContext),
}

impl LaunchSession {
    /// Create a session in the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly verified launch context. A new launch resets the
    /// session, including a previously submitted outcome: the consumer
    /// has issued a new attempt.
    pub fn launch(&mut self, context: LaunchContext) {
        *self = Self::Launched(context);
    }

    /// The current state discriminant.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self {
            Self::Unauthenticated => SessionState::Unauthenticated,
            Self::Launched(_) => SessionState::Launched,
            Self::OutcomeSubmitted(_) => SessionState::OutcomeSubmitted,
        }
    }

    /// The stored launch context, readable after submission as well so
    /// the assessment page can re-display.
    #[must_use]
    pub fn context(&self) -> Option<&LaunchContext> {
        match self {
            Self::Unauthenticated => None,
            Self::Launched(context) | Self::OutcomeSubmitted(context) => Some(context),
        }
    }

    /// Whether an outcome may still be submitted for the stored launch.
    #[must_use]
    pub fn outcome_pending(&self) -> bool {
        matches!(self, Self::Launched(context) if context.supports_outcomes())
    }

    /// Record that an outcome has been sent for the stored context.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotLaunched`] when no launch context is stored.
    /// - [`SessionError::AlreadySubmitted`] when an outcome was already
    ///   recorded for this launch.
    pub fn mark_outcome_submitted(&mut self) -> Result<(), SessionError> {
        match std::mem::take(self) {
            Self::Unauthenticated => Err(SessionError::NotLaunched),
            Self::Launched(context) => {
                *self = Self::OutcomeSubmitted(context);
                Ok(())
            }
            submitted @ Self::OutcomeSubmitted(_) => {
                *self = submitted;
                Err(SessionError::AlreadySubmitted)
            }
        }
    }
}
