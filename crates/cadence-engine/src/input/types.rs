/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Platform-agnostic pointer events emitted by the runtime.
///
/// Coordinates are surface-local logical pixels, origin top-left.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    Moved { x: f32, y: f32 },

    Button { button: MouseButton, state: ButtonState },

    /// Pointer entered the surface.
    Entered,

    /// Pointer left the surface.
    Left,

    /// Surface lost input focus; any held buttons are considered released.
    FocusLost,
}

/// Logical key, after keyboard layout is applied.
///
/// Only keys a frame loop commonly binds are named; printable keys arrive as
/// `Character`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Key {
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Character(String),
    Unidentified,
}

/// Platform-agnostic input event delivered to runtime input handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),

    Key {
        key: Key,
        state: ButtonState,
        repeat: bool,
    },
}

impl InputEvent {
    /// True for the initial press of `key` (not auto-repeat).
    pub fn is_key_press(&self, key: &Key) -> bool {
        matches!(
            self,
            InputEvent::Key { key: k, state: ButtonState::Pressed, repeat: false } if k == key
        )
    }
}
