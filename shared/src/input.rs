//! Logical control keys and the per-frame input snapshot

use bevy::prelude::*;

use crate::gestures::CadenceKey;
use crate::movement::MoveKeys;

/// Keys the locomotion core reacts to, independent of the physical binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    Jump,
    /// Held sprint modifier
    Sprint,
    /// Left cadence key
    HandLeft,
    /// Right cadence key
    HandRight,
}

impl ControlKey {
    pub fn cadence_key(self) -> Option<CadenceKey> {
        match self {
            ControlKey::HandLeft => Some(CadenceKey::Left),
            ControlKey::HandRight => Some(CadenceKey::Right),
            _ => None,
        }
    }
}

/// Held keys plus pointer motion not yet consumed by a frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub sprint_modifier: bool,
    pointer_delta: Vec2,
}

impl InputState {
    pub fn set(&mut self, key: ControlKey, down: bool) {
        match key {
            ControlKey::Forward => self.forward = down,
            ControlKey::Backward => self.backward = down,
            ControlKey::StrafeLeft => self.left = down,
            ControlKey::StrafeRight => self.right = down,
            ControlKey::Jump => self.jump = down,
            ControlKey::Sprint => self.sprint_modifier = down,
            ControlKey::HandLeft | ControlKey::HandRight => {}
        }
    }

    pub fn move_keys(&self) -> MoveKeys {
        MoveKeys {
            forward: self.forward,
            backward: self.backward,
            left: self.left,
            right: self.right,
        }
    }

    pub fn add_pointer(&mut self, dx: f32, dy: f32) {
        self.pointer_delta += Vec2::new(dx, dy);
    }

    /// Take the accumulated pointer delta, leaving zero behind.
    pub fn take_pointer(&mut self) -> Vec2 {
        std::mem::take(&mut self.pointer_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_delta_drains_once() {
        let mut input = InputState::default();
        input.add_pointer(3.0, -1.0);
        input.add_pointer(2.0, 4.0);
        assert_eq!(input.take_pointer(), Vec2::new(5.0, 3.0));
        assert_eq!(input.take_pointer(), Vec2::ZERO);
    }

    #[test]
    fn held_flags_follow_key_state() {
        let mut input = InputState::default();
        input.set(ControlKey::Forward, true);
        input.set(ControlKey::StrafeLeft, true);
        input.set(ControlKey::HandLeft, true);
        let keys = input.move_keys();
        assert!(keys.forward && keys.left && !keys.right && !keys.backward);
        input.set(ControlKey::Forward, false);
        assert!(!input.move_keys().forward);
    }
}
