//! Drag gesture tracking for pull-to-refresh.

use tracing::debug;

use crate::config::PullConfig;
use crate::driver::PullDriver;

/// Outcome of releasing the drag, handed to the refresh coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseEvent {
    /// Whether the pull had crossed the trigger threshold at release time.
    pub was_latched: bool,
}

/// Converts raw drag distances into a clamped pull offset and a latched
/// ready-to-refresh signal.
///
/// The latch flips at most once per monotonic crossing of the threshold:
/// it enters at exactly `threshold` while the pull is increasing and leaves
/// strictly below it, so values oscillating on one side of the threshold
/// never re-trigger it.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    threshold: f64,
    latched: bool,
}

impl GestureTracker {
    pub fn new(config: &PullConfig) -> Self {
        Self {
            threshold: config.threshold(),
            latched: false,
        }
    }

    #[inline]
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Process a drag move.
    ///
    /// `dy` is the cumulative downward drag distance since the gesture
    /// began. The clamped offset is written straight through the driver,
    /// preempting any running animation. Synchronous and non-blocking.
    pub fn on_move(&mut self, dy: f64, driver: &mut PullDriver) {
        driver.set_immediate(dy);
        let offset = driver.offset();

        if offset >= self.threshold && !self.latched {
            self.latched = true;
            debug!(offset, "pull latched");
        }
        if offset < self.threshold && self.latched {
            self.latched = false;
            debug!(offset, "pull unlatched");
        }
    }

    /// Read the latch at release time.
    ///
    /// No side effects beyond the handoff; the coordinator owns everything
    /// that follows.
    pub fn on_release(&self) -> ReleaseEvent {
        ReleaseEvent {
            was_latched: self.latched,
        }
    }
}
