//! Cooperative deadline for `Initialize`.
//!
//! Checked between remote calls only; a statement already in flight is
//! never interrupted.

use std::time::{Duration, Instant};

use guardian_core::errors::{GuardianError, GuardianResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No deadline.
    pub fn none() -> Self {
        Self { at: None }
    }

    pub fn after(budget: Duration) -> Self {
        Self {
            at: Some(Instant::now() + budget),
        }
    }

    pub fn from_budget(budget: Option<Duration>) -> Self {
        budget.map_or_else(Self::none, Self::after)
    }

    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Fail with `DeadlineExceeded` if the budget is spent before `phase`.
    pub fn check(&self, phase: &str) -> GuardianResult<()> {
        if self.is_expired() {
            tracing::warn!(phase, "initialize deadline exceeded");
            return Err(GuardianError::DeadlineExceeded {
                phase: phase.to_string(),
            });
        }
        Ok(())
    }
}
