//! Cooperative cancellation and wall-clock budgets.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every reachable chain within the limits was examined.
    Exhausted,
    /// The result cap was reached.
    ResultLimit,
    /// The caller cancelled the search.
    Cancelled,
    /// The wall-clock deadline passed.
    DeadlineElapsed,
}

/// Budget checked once per search iteration (and once per graph job).
///
/// Clones share the cancellation token, so cancelling any clone stops
/// every search using it.
#[derive(Debug, Clone, Default)]
pub struct SearchBudget {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl SearchBudget {
    /// No deadline; only explicit cancellation stops the search.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Use an externally owned token, e.g. one tied to an editor request.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn and_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason to stop now, if any.
    pub fn check(&self) -> Option<StopReason> {
        if self.token.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(StopReason::DeadlineElapsed),
            _ => None,
        }
    }
}
