//! Player state owned by the movement integrator

use bevy::prelude::*;

use crate::look::LookAngles;
use crate::settings::LocomotionSettings;

/// Kinematic state of the first-person player.
///
/// `position` is the eye position; the feet sit `eye_height` below it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    /// Horizontal velocity (y is always 0)
    pub velocity: Vec3,
    /// Vertical speed (m/s, up positive)
    pub vertical_speed: f32,
    pub grounded: bool,
    /// Grounded state at the end of the previous step (landing detection)
    pub was_grounded: bool,
    /// Set on jump, cleared on landing
    pub jump_locked: bool,
    pub look: LookAngles,
}

impl PlayerState {
    pub fn spawn(settings: &LocomotionSettings) -> Self {
        Self {
            position: settings.spawn_position(),
            velocity: Vec3::ZERO,
            vertical_speed: 0.0,
            grounded: true,
            was_grounded: true,
            jump_locked: false,
            look: LookAngles::default(),
        }
    }

    pub fn horizontal_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }
}
