//! Camera feel: sprint FOV widening and head bob

use crate::settings::{MovementSettings, ViewSettings};

/// Horizontal speed above which the player counts as moving (m/s).
pub const MOVING_SPEED: f32 = 0.1;

/// FOV changes smaller than this (degrees) are not applied.
pub const FOV_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewFeel {
    /// Current vertical FOV (degrees)
    pub fov: f32,
    bob_phase: f32,
    /// Vertical camera offset from head bob (meters)
    pub bob_offset: f32,
}

impl ViewFeel {
    pub fn new(settings: &ViewSettings) -> Self {
        Self {
            fov: settings.base_fov,
            bob_phase: 0.0,
            bob_offset: 0.0,
        }
    }

    /// Ease the FOV toward sprint or base. Returns true if the FOV changed.
    pub fn update_fov(&mut self, sprint_active: bool, settings: &ViewSettings, dt: f32) -> bool {
        let target = if sprint_active {
            settings.sprint_fov
        } else {
            settings.base_fov
        };
        let alpha = 1.0 - (-settings.fov_smoothing * dt).exp();
        let next = self.fov + (target - self.fov) * alpha;
        if (next - self.fov).abs() > FOV_EPSILON {
            self.fov = next;
            return true;
        }
        false
    }

    pub fn update_bob(
        &mut self,
        grounded: bool,
        horizontal_speed: f32,
        view: &ViewSettings,
        movement: &MovementSettings,
        dt: f32,
    ) {
        if grounded && horizontal_speed > MOVING_SPEED {
            let speed_ratio = (horizontal_speed / movement.move_speed).max(0.25);
            self.bob_phase += view.bob_frequency * speed_ratio * dt * std::f32::consts::TAU;
            self.bob_offset = self.bob_phase.sin() * view.bob_intensity;
        } else {
            let settle = (dt * 10.0).min(1.0);
            self.bob_offset -= self.bob_offset * settle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fov_widens_while_sprinting_and_returns() {
        let settings = ViewSettings::default();
        let mut view = ViewFeel::new(&settings);
        for _ in 0..120 {
            view.update_fov(true, &settings, 1.0 / 60.0);
        }
        assert!((view.fov - settings.sprint_fov).abs() < 0.1);
        for _ in 0..120 {
            view.update_fov(false, &settings, 1.0 / 60.0);
        }
        assert!((view.fov - settings.base_fov).abs() < 0.1);
    }

    #[test]
    fn tiny_fov_changes_are_skipped() {
        let settings = ViewSettings::default();
        let mut view = ViewFeel::new(&settings);
        view.fov = settings.base_fov + 0.005;
        assert!(!view.update_fov(false, &settings, 1.0 / 60.0));
        assert_eq!(view.fov, settings.base_fov + 0.005);
    }

    #[test]
    fn bob_stays_within_intensity_and_settles() {
        let view_settings = ViewSettings::default();
        let movement = MovementSettings::default();
        let mut view = ViewFeel::new(&view_settings);
        for _ in 0..50 {
            view.update_bob(true, 7.0, &view_settings, &movement, 1.0 / 60.0);
            assert!(view.bob_offset.abs() <= view_settings.bob_intensity + 1e-6);
        }
        for _ in 0..120 {
            view.update_bob(false, 7.0, &view_settings, &movement, 1.0 / 60.0);
        }
        assert!(view.bob_offset.abs() < 1e-4);
    }
}
