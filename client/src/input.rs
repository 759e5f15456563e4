//! Host input layer: keyboard and mouse into the locomotion core
//!
//! `ButtonInput` only reports the initial press in `just_pressed`, so OS auto-repeat
//! never reaches the sprint tap detector.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use shared::{ControlKey, Locomotion};

/// Physical bindings. Several keys may drive the same control.
const BINDINGS: &[(KeyCode, ControlKey)] = &[
    (KeyCode::KeyW, ControlKey::Forward),
    (KeyCode::KeyS, ControlKey::Backward),
    (KeyCode::KeyA, ControlKey::StrafeLeft),
    (KeyCode::KeyD, ControlKey::StrafeRight),
    (KeyCode::Space, ControlKey::Jump),
    (KeyCode::ShiftLeft, ControlKey::Sprint),
    (KeyCode::ShiftRight, ControlKey::Sprint),
    (KeyCode::KeyQ, ControlKey::HandLeft),
    (KeyCode::KeyE, ControlKey::HandRight),
];

fn control_held(keyboard: &ButtonInput<KeyCode>, control: ControlKey) -> bool {
    BINDINGS
        .iter()
        .any(|(code, bound)| *bound == control && keyboard.pressed(*code))
}

/// Forward key transitions to the core. Runs in every state so releases are never lost.
pub fn forward_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut core: ResMut<Locomotion>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs_f64();
    for (code, control) in BINDINGS {
        if keyboard.just_pressed(*code) {
            core.key_down(*control, now);
        }
        if keyboard.just_released(*code) && !control_held(&keyboard, *control) {
            core.key_up(*control);
        }
    }
}

/// Accumulate raw mouse motion; the core drains it once per frame.
pub fn forward_mouse_motion(mut mouse_motion: MessageReader<MouseMotion>, mut core: ResMut<Locomotion>) {
    let mut delta = Vec2::ZERO;
    for motion in mouse_motion.read() {
        delta += motion.delta;
    }
    if delta != Vec2::ZERO {
        core.pointer_moved(delta.x, delta.y);
    }
}
