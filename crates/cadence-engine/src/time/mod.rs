//! Time subsystem.
//!
//! Frame pacing and measurement, independent of any windowing backend:
//! - `FramePacer` throttles a tick stream to a target rate with drift correction
//! - `FpsWindow` measures the achieved rate over rolling one-second windows
//! - `TickSource` abstracts the display-refresh signal the loop waits on

mod fps;
mod pacer;
mod tick;

pub use fps::FpsWindow;
pub use pacer::{interval_for, try_interval_for, FramePacer, FrameTiming};
pub use tick::{IntervalTicker, TickSource};
