//! Desired horizontal velocity from held keys, heading and speed modifiers

use bevy::prelude::*;

use crate::settings::{CadenceSettings, SprintSettings};

/// Held movement keys, sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// 2D input vector: x = strafe (right positive), y = forward.
/// Normalized when nonzero so diagonals are not faster.
pub fn input_axes(keys: MoveKeys) -> Vec2 {
    let mut axes = Vec2::ZERO;
    if keys.forward {
        axes.y += 1.0;
    }
    if keys.backward {
        axes.y -= 1.0;
    }
    if keys.right {
        axes.x += 1.0;
    }
    if keys.left {
        axes.x -= 1.0;
    }
    if axes != Vec2::ZERO {
        axes = axes.normalize();
    }
    axes
}

/// Horizontal forward/right bases for a yaw angle.
/// In Bevy: +X right, +Y up, -Z forward.
pub fn yaw_basis(yaw: f32) -> (Vec3, Vec3) {
    let (sin, cos) = yaw.sin_cos();
    let forward = Vec3::new(-sin, 0.0, -cos);
    let right = Vec3::new(cos, 0.0, -sin);
    (forward, right)
}

/// Speed multiplier for this frame.
///
/// `sprint_intent` is modifier held or double-tap engaged; it only counts while
/// moving forward. `cadence_boost` is the boost fraction in [0, 1] and can only raise
/// the multiplier.
pub fn speed_multiplier(
    sprint_intent: bool,
    forward_held: bool,
    cadence_boost: f32,
    sprint: &SprintSettings,
    cadence: &CadenceSettings,
) -> f32 {
    if !(sprint_intent && forward_held) {
        return 1.0;
    }
    let mut multiplier = sprint.multiplier;
    if cadence.enabled {
        let t = cadence_boost.clamp(0.0, 1.0);
        let boosted = sprint.multiplier + (cadence.max_multiplier - sprint.multiplier) * t;
        multiplier = multiplier.max(boosted);
    }
    multiplier
}

/// World-space desired horizontal velocity.
pub fn desired_velocity(axes: Vec2, yaw: f32, move_speed: f32, multiplier: f32) -> Vec3 {
    let (forward, right) = yaw_basis(yaw);
    let speed = move_speed * multiplier;
    forward * (axes.y * speed) + right * (axes.x * speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn diagonal_input_is_normalized() {
        let axes = input_axes(MoveKeys {
            forward: true,
            right: true,
            ..default()
        });
        assert!((axes.length() - 1.0).abs() < 1e-6);
        assert!(axes.x > 0.0 && axes.y > 0.0);
    }

    #[test]
    fn opposing_keys_cancel() {
        let axes = input_axes(MoveKeys {
            forward: true,
            backward: true,
            ..default()
        });
        assert_eq!(axes, Vec2::ZERO);
    }

    #[test]
    fn basis_at_zero_yaw_faces_negative_z() {
        let (forward, right) = yaw_basis(0.0);
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
        assert!((right - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn right_is_forward_cross_up() {
        for yaw in [0.3f32, 1.7, -2.4] {
            let (forward, right) = yaw_basis(yaw);
            assert!((forward.cross(Vec3::Y) - right).length() < 1e-5);
        }
    }

    #[test]
    fn turning_left_walks_along_negative_x() {
        let v = desired_velocity(Vec2::new(0.0, 1.0), FRAC_PI_2, 7.0, 1.0);
        assert!((v - Vec3::new(-7.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn sprint_requires_forward() {
        let sprint = SprintSettings::default();
        let cadence = CadenceSettings::default();
        assert_eq!(speed_multiplier(true, false, 1.0, &sprint, &cadence), 1.0);
        assert_eq!(speed_multiplier(false, true, 1.0, &sprint, &cadence), 1.0);
        assert_eq!(speed_multiplier(true, true, 0.0, &sprint, &cadence), 2.5);
    }

    #[test]
    fn cadence_interpolates_toward_max() {
        let sprint = SprintSettings::default();
        let cadence = CadenceSettings::default();
        assert!((speed_multiplier(true, true, 0.5, &sprint, &cadence) - 2.75).abs() < 1e-6);
        assert!((speed_multiplier(true, true, 1.0, &sprint, &cadence) - 3.0).abs() < 1e-6);
        // Out-of-range fractions are clamped
        assert!((speed_multiplier(true, true, 4.0, &sprint, &cadence) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn cadence_never_lowers_sprint() {
        let sprint = SprintSettings {
            multiplier: 3.5,
            ..default()
        };
        let cadence = CadenceSettings::default();
        assert_eq!(speed_multiplier(true, true, 1.0, &sprint, &cadence), 3.5);
    }
}
