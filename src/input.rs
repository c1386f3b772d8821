//! Translates winit keyboard, mouse and scroll events into scene input.

use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Pixels per scrolled line, matching what browsers report for a wheel notch.
pub const PIXELS_PER_LINE: f32 = 20.0;

/// Held movement keys, sampled by every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementIntents {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fast: bool,
}

/// Side effects the window has to carry out for an input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    None,
    CaptureCursor,
    ReleaseCursor,
    RestartCountdown,
}

#[derive(Debug, Default)]
pub struct InputState {
    pub intents: MovementIntents,
    control: bool,
    alt: bool,
    captured: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, code: KeyCode, state: ElementState) -> InputAction {
        let pressed = state.is_pressed();
        let intents = &mut self.intents;
        match code {
            KeyCode::KeyW => intents.forward = pressed,
            KeyCode::KeyS => intents.backward = pressed,
            KeyCode::KeyA => intents.left = pressed,
            KeyCode::KeyD => intents.right = pressed,
            KeyCode::Space => intents.up = pressed,
            KeyCode::ShiftLeft => intents.down = pressed,
            KeyCode::ControlLeft => self.control = pressed,
            KeyCode::AltLeft => self.alt = pressed,
            KeyCode::KeyR if pressed => return InputAction::RestartCountdown,
            KeyCode::Escape if pressed => return InputAction::ReleaseCursor,
            _ => {}
        }
        self.intents.fast = self.control || self.alt;
        InputAction::None
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) -> InputAction {
        if button == MouseButton::Left && state.is_pressed() && !self.captured {
            InputAction::CaptureCursor
        } else {
            InputAction::None
        }
    }

    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
    }

    /// Pointer motion turns the camera only while the cursor is captured.
    pub fn pointer_delta(&self, delta: (f64, f64)) -> Option<(f32, f32)> {
        self.captured.then_some((delta.0 as f32, delta.1 as f32))
    }

    /// Releases every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.intents = MovementIntents::default();
        self.control = false;
        self.alt = false;
    }
}

/// Scroll distance in pixels, positive when scrolling towards the user.
pub fn scroll_pixels(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(position) => -position.y as f32,
    }
}
