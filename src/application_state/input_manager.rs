//! # Input Manager
//!
//! Tracks the movement keys and the raw mouse motion between frames. The motion
//! delta resets to zero every time it is read, which stands in for re-centering
//! the cursor.
//!
//! Keys are sampled once per frame. A key pressed and released between two reads
//! would leave no trace in that sample, so presses are latched until the next read.

use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{ProcessedInputState, RawInputState};

/// Keys that drive the camera.
pub const MOVEMENT_KEYS: [KeyCode; 4] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
];

/// Manages the state of the tracked keys and the cursor delta.
#[derive(Debug)]
pub struct InputManager {
    keyboard_inputs_old: HashMap<KeyCode, bool>,
    keyboard_inputs_new: HashMap<KeyCode, bool>,
    /// Keys pressed since the last read
    keyboard_taps: HashSet<KeyCode>,
    mouse_delta: (f64, f64),
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a manager with every tracked key released.
    pub fn new() -> Self {
        let keyboard_inputs_old: HashMap<_, _> =
            MOVEMENT_KEYS.iter().map(|key| (*key, false)).collect();
        let keyboard_inputs_new = keyboard_inputs_old.clone();

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
            keyboard_taps: HashSet::new(),
            mouse_delta: (0.0, 0.0),
        }
    }

    /// Processes a window event. Untracked keys are ignored.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state,
                    physical_key: PhysicalKey::Code(key),
                    ..
                },
            ..
        } = event
        {
            self.set_key(*key, *state == ElementState::Pressed);
        }
    }

    /// Records the current up/down state of `key`.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = pressed;
            if pressed {
                self.keyboard_taps.insert(key);
            }
        }
    }

    /// Adds raw device motion to the pending delta.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        self.mouse_delta.0 += delta.0;
        self.mouse_delta.1 += delta.1;
    }

    /// Releases every key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        for state in self.keyboard_inputs_new.values_mut() {
            *state = false;
        }
        self.keyboard_taps.clear();
        self.mouse_delta = (0.0, 0.0);
    }

    /// Returns this frame's processed input and resets the per-frame state.
    ///
    /// A key that went down and back up since the last read reports `Pressed` for
    /// this one frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                let state = if !old_state && !new_state && self.keyboard_taps.contains(key) {
                    RawInputState::Pressed
                } else {
                    RawInputState::from_raw_states(old_state, new_state)
                };
                (*key, state)
            })
            .collect();
        let processed = ProcessedInputState {
            keyboard_states,
            mouse_delta: self.mouse_delta,
        };

        self.move_old_states();
        self.keyboard_taps.clear();
        self.mouse_delta = (0.0, 0.0);
        processed
    }

    fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }
    }
}
