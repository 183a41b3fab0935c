//! Cadence engine crate.
//!
//! A frame-pacing scheduler that throttles a display-rate tick stream down to a
//! target frame rate, plus the winit/wgpu surface adapter that runs it in a window.

pub mod core;
pub mod coords;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod time;
pub mod window;
