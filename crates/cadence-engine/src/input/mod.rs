//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code translates platform events into `InputEvent`s, applies the
//! pointer ones to the surface's `PointerState` and forwards all of them to the
//! application's input handler.

pub(crate) mod platform;
mod state;
mod types;

pub use state::PointerState;
pub use types::{ButtonState, InputEvent, Key, MouseButton, PointerEvent};
