//! Tuning parameters for the pull gesture and its release animation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::EasingType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullConfig {
    /// Maximum pull distance in layout units
    #[serde(default = "default_max_pull")]
    pub max_pull: f64,
    /// Offset held while a refresh is in flight
    #[serde(default = "default_hold_offset")]
    pub hold_offset: f64,
    /// Release animation duration in milliseconds
    #[serde(default = "default_release_duration")]
    pub release_duration_ms: u64,
    /// Easing curve for release animations
    #[serde(default)]
    pub easing: EasingType,
    /// Animation tick interval in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            max_pull: default_max_pull(),
            hold_offset: default_hold_offset(),
            release_duration_ms: default_release_duration(),
            easing: EasingType::default(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

impl PullConfig {
    /// Pull distance at which a release starts triggering a refresh.
    ///
    /// Fixed at half the maximum pull. The latch enters at exactly this
    /// value while the pull is increasing and leaves strictly below it.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.max_pull / 2.0
    }

    #[inline]
    pub fn release_duration(&self) -> Duration {
        Duration::from_millis(self.release_duration_ms)
    }

    #[inline]
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

fn default_max_pull() -> f64 {
    120.0
}

fn default_hold_offset() -> f64 {
    60.0
}

fn default_release_duration() -> u64 {
    180
}

fn default_tick_rate() -> u64 {
    16
}
