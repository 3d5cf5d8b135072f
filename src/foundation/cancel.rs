use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::foundation::error::{ReelError, ReelResult};

/// Cooperative cancellation signal for one job.
///
/// A token is cancelled once [`cancel`](Self::cancel) was called on any clone, or once its
/// deadline has passed. Long-running stages poll it and stop early.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Token that is only cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that cancels itself `limit` from now.
    pub fn with_deadline(limit: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(limit),
        }
    }

    /// Cancel this token and every clone of it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// `Err(ReelError::Timeout)` once cancelled.
    pub fn check(&self) -> ReelResult<()> {
        if self.is_cancelled() {
            return Err(ReelError::timeout("job cancelled"));
        }
        Ok(())
    }

    /// Time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/cancel.rs"]
mod tests;
