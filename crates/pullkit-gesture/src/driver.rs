//! Pull offset animation driver.
//!
//! `PullDriver` is the only writer of the stored pull offset. During an
//! active drag the tracker submits immediate values; on release and on fetch
//! completion the coordinator submits animation requests. A new request
//! always replaces the one in flight, interpolating from whatever
//! intermediate value the previous animation had reached.

use std::time::{Duration, Instant};

use crate::config::PullConfig;
use crate::easing::EasingType;
use crate::timing::{is_complete, lerp, progress};

/// Timed transition toward a target offset.
#[derive(Debug, Clone)]
struct ActiveAnimation {
    start: Instant,
    from: f64,
    to: f64,
    duration: Duration,
}

/// Exclusive owner of the animated pull offset.
///
/// The stored offset is always within `[0, max_pull]`; out-of-range writes
/// are clamped before storage. Call [`PullDriver::tick`] every frame to
/// advance an active animation.
#[derive(Debug, Clone)]
pub struct PullDriver {
    offset: f64,
    max: f64,
    easing: EasingType,
    animation: Option<ActiveAnimation>,
}

impl PullDriver {
    pub fn new(config: &PullConfig) -> Self {
        Self {
            offset: 0.0,
            max: config.max_pull,
            easing: config.easing,
            animation: None,
        }
    }

    /// Current interpolated offset as of the last advance.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Final offset once the active animation (if any) completes.
    pub fn target(&self) -> f64 {
        self.animation
            .as_ref()
            .map(|a| a.to)
            .unwrap_or(self.offset)
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Write an offset with no transition, preempting any running animation.
    ///
    /// Used during an active drag, where the gesture dictates the offset
    /// directly frame by frame.
    pub fn set_immediate(&mut self, offset: f64) {
        self.animation = None;
        self.offset = offset.clamp(0.0, self.max);
    }

    /// Start a timed transition toward `target`.
    ///
    /// Replaces, never queues: calling this again before the prior
    /// transition finishes discards the prior target and interpolates from
    /// the current intermediate value toward the new one.
    pub fn animate_to(&mut self, target: f64, duration: Duration) {
        self.advance();

        let target = target.clamp(0.0, self.max);
        let from = self.offset;

        if from == target {
            self.animation = None;
            return;
        }

        self.animation = Some(ActiveAnimation {
            start: Instant::now(),
            from,
            to: target,
            duration,
        });
    }

    /// Advance the active animation by wall clock and return the offset.
    pub fn tick(&mut self) -> f64 {
        self.advance();
        self.offset
    }

    fn advance(&mut self) {
        if let Some(ref anim) = self.animation {
            if is_complete(anim.start, anim.duration) {
                self.offset = anim.to;
                self.animation = None;
            } else {
                let t = progress(anim.start, anim.duration);
                self.offset = lerp(anim.from, anim.to, self.easing.apply(t));
            }
        }
    }
}
