//! Frame-pacing core.
//!
//! Defines the scheduler and the contracts it shares with surfaces and render
//! callbacks. Nothing here depends on a windowing backend; the runtime in
//! `window` adapts winit/wgpu to these types.

mod config;
mod ctx;
mod error;
mod scheduler;
mod surface;

pub use config::SchedulerConfig;
pub use ctx::{EventContext, FpsMetrics, FrameContext, LoopControl};
pub use error::{ConfigError, SchedulerError};
pub use scheduler::{FrameScheduler, RenderFn, ScheduleState, TickOutcome};
pub use surface::Surface;
