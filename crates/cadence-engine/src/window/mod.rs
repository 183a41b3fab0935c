//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, wires them to a [`Canvas`](crate::device::Canvas)
//! and drives the frame scheduler from redraw requests.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
