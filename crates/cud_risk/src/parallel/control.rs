//! Cooperative cancellation for long-running simulations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation flag plus optional deadline, checked at batch boundaries.
///
/// Clones share the flag, so a clone handed to another thread can stop a
/// running simulation.
///
/// # Examples
/// ```
/// use cud_risk::parallel::SimulationControl;
///
/// let control = SimulationControl::new();
/// let handle = control.clone();
/// assert!(!control.should_stop());
///
/// handle.cancel();
/// assert!(control.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SimulationControl {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl SimulationControl {
    /// Creates a control with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops starting new batches after `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stops starting new batches once `timeout` has elapsed from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a new batch must not be started.
    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
