//! Touch input: bus sharing and edge detection
//!
//! The FT6336U itself is driven by the `ft6336u-driver` crate in the
//! firmware, which reduces each scan to an `Option<TouchPoint>`.

pub mod shared_i2c;
pub mod touch_tracker;

pub use shared_i2c::SharedI2cDevice;
pub use touch_tracker::TouchTracker;
