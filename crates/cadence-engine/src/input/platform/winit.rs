use ::winit::dpi::PhysicalPosition;
use ::winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use ::winit::keyboard::{Key as WinitKey, NamedKey};
use ::winit::window::Window;

use crate::input::{ButtonState, InputEvent, Key, MouseButton, PointerEvent};

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Returns `None` for events not represented by the input subsystem.
pub(crate) fn translate_window_event(window: &Window, event: &WindowEvent) -> Option<InputEvent> {
    if let WindowEvent::KeyboardInput { event, .. } = event {
        return Some(InputEvent::Key {
            key: map_key(&event.logical_key),
            state: map_state(event.state),
            repeat: event.repeat,
        });
    }

    translate_pointer_event(window, event).map(InputEvent::Pointer)
}

fn translate_pointer_event(window: &Window, event: &WindowEvent) -> Option<PointerEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical_f32(window, *position);
            Some(PointerEvent::Moved { x, y })
        }

        WindowEvent::CursorEntered { .. } => Some(PointerEvent::Entered),

        WindowEvent::CursorLeft { .. } => Some(PointerEvent::Left),

        WindowEvent::MouseInput { state, button, .. } => Some(PointerEvent::Button {
            button: map_mouse_button(*button),
            state: map_state(*state),
        }),

        WindowEvent::Focused(false) => Some(PointerEvent::FocusLost),

        _ => None,
    }
}

fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let scale = window.scale_factor();
    let logical = pos.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

fn map_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(named) => match named {
            NamedKey::Space => Key::Space,
            NamedKey::Enter => Key::Enter,
            NamedKey::Escape => Key::Escape,
            NamedKey::Tab => Key::Tab,
            NamedKey::Backspace => Key::Backspace,
            NamedKey::ArrowUp => Key::ArrowUp,
            NamedKey::ArrowDown => Key::ArrowDown,
            NamedKey::ArrowLeft => Key::ArrowLeft,
            NamedKey::ArrowRight => Key::ArrowRight,
            _ => Key::Unidentified,
        },
        WinitKey::Character(text) => Key::Character(text.as_str().to_owned()),
        _ => Key::Unidentified,
    }
}
