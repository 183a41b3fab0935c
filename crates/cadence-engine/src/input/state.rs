use std::collections::HashSet;

use crate::coords::Vec2;

use super::types::{ButtonState, MouseButton, PointerEvent};

/// Live pointer state for one surface.
///
/// Only the runtime mutates this (through [`apply_event`](Self::apply_event));
/// the scheduler and render callbacks read it as of the moment a frame fires.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Last known pointer position in surface-local logical pixels.
    ///
    /// Kept when the pointer leaves so callbacks can still see where it exited.
    pub position: Vec2,

    /// True while any mouse button is held.
    pub pressed: bool,

    /// True while the pointer is over the surface.
    pub hovering: bool,

    buttons_down: HashSet<MouseButton>,
}

impl PointerState {
    pub fn apply_event(&mut self, ev: PointerEvent) {
        match ev {
            PointerEvent::Moved { x, y } => {
                self.position = Vec2::new(x, y);
                // Some platforms deliver moves before (or without) an enter.
                self.hovering = true;
            }

            PointerEvent::Button { button, state } => match state {
                ButtonState::Pressed => {
                    self.buttons_down.insert(button);
                }
                ButtonState::Released => {
                    self.buttons_down.remove(&button);
                }
            },

            PointerEvent::Entered => self.hovering = true,

            PointerEvent::Left => self.hovering = false,

            // Avoids stuck buttons when focus changes mid-press.
            PointerEvent::FocusLost => self.buttons_down.clear(),
        }

        self.pressed = !self.buttons_down.is_empty();
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton) -> PointerEvent {
        PointerEvent::Button { button, state: ButtonState::Pressed }
    }

    fn release(button: MouseButton) -> PointerEvent {
        PointerEvent::Button { button, state: ButtonState::Released }
    }

    #[test]
    fn move_updates_position_and_hover() {
        let mut p = PointerState::default();
        p.apply_event(PointerEvent::Moved { x: 12.0, y: 34.5 });
        assert_eq!(p.position, Vec2::new(12.0, 34.5));
        assert!(p.hovering);
        assert!(!p.pressed);
    }

    #[test]
    fn leave_keeps_last_position() {
        let mut p = PointerState::default();
        p.apply_event(PointerEvent::Entered);
        p.apply_event(PointerEvent::Moved { x: 3.0, y: 4.0 });
        p.apply_event(PointerEvent::Left);
        assert!(!p.hovering);
        assert_eq!(p.position, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn pressed_tracks_any_held_button() {
        let mut p = PointerState::default();
        p.apply_event(press(MouseButton::Left));
        p.apply_event(press(MouseButton::Right));
        assert!(p.pressed);
        assert!(p.button_down(MouseButton::Right));

        p.apply_event(release(MouseButton::Left));
        assert!(p.pressed);

        p.apply_event(release(MouseButton::Right));
        assert!(!p.pressed);
    }

    #[test]
    fn release_without_press_is_harmless() {
        let mut p = PointerState::default();
        p.apply_event(release(MouseButton::Middle));
        assert!(!p.pressed);
    }

    #[test]
    fn focus_loss_releases_buttons() {
        let mut p = PointerState::default();
        p.apply_event(press(MouseButton::Left));
        p.apply_event(PointerEvent::FocusLost);
        assert!(!p.pressed);
        assert!(!p.button_down(MouseButton::Left));
    }
}
