pub mod config;
pub mod driver;
pub mod easing;
pub mod timing;
pub mod tracker;

pub use config::PullConfig;
pub use driver::PullDriver;
pub use easing::EasingType;
pub use tracker::{GestureTracker, ReleaseEvent};
