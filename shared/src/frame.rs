//! Frame orchestration for the locomotion core.
//!
//! Input callbacks write into the core through `key_down`/`key_up`/`pointer_moved`.
//! Once per displayed frame `advance` clamps delta-time, updates look, and (when the
//! frame is active) runs gestures, the integrator, camera feel and adaptive
//! resolution in a fixed order. The result is a render-ready `FramePose`.

use bevy::prelude::*;

use crate::gestures::{CadenceGesture, GestureEvent, JumpBuffer, SprintGesture};
use crate::input::{ControlKey, InputState};
use crate::look::LookController;
use crate::movement::{desired_velocity, input_axes, speed_multiplier};
use crate::performance::{ResolutionController, ScaleChange};
use crate::physics::{step_character, StepOutcome};
use crate::player::PlayerState;
use crate::props::ObstacleField;
use crate::settings::LocomotionSettings;
use crate::terrain::WorldTerrain;
use crate::view::{ViewFeel, MOVING_SPEED};

/// Seconds between speed readout refreshes (~10 Hz).
pub const HUD_INTERVAL: f32 = 0.1;

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePose {
    /// Camera position including head bob
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view (degrees)
    pub fov: f32,
    pub resolution_scale: f32,
    /// Set on frames where the resolution scale changed
    pub resolution_change: Option<ScaleChange>,
    /// Horizontal speed, set when the readout is due
    pub hud_speed: Option<f32>,
    pub grounded: bool,
    pub step: StepOutcome,
}

impl FramePose {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

/// The whole locomotion core, stepped once per displayed frame.
#[derive(Resource)]
pub struct Locomotion {
    settings: LocomotionSettings,
    terrain: WorldTerrain,
    obstacles: ObstacleField,
    look: LookController,
    input: InputState,
    sprint: SprintGesture,
    cadence: CadenceGesture,
    jump_buffer: JumpBuffer,
    player: PlayerState,
    view: ViewFeel,
    resolution: ResolutionController,
    hud_accum: f32,
    events: Vec<GestureEvent>,
}

impl Locomotion {
    pub fn new(settings: LocomotionSettings, terrain: WorldTerrain, obstacles: ObstacleField) -> Self {
        Self {
            look: LookController::new(&settings.look),
            player: PlayerState::spawn(&settings),
            view: ViewFeel::new(&settings.view),
            resolution: ResolutionController::new(&settings.performance),
            input: InputState::default(),
            sprint: SprintGesture::default(),
            cadence: CadenceGesture::default(),
            jump_buffer: JumpBuffer::default(),
            hud_accum: 0.0,
            events: Vec::new(),
            settings,
            terrain,
            obstacles,
        }
    }

    pub fn settings(&self) -> &LocomotionSettings {
        &self.settings
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn terrain(&self) -> &WorldTerrain {
        &self.terrain
    }

    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn sprint(&self) -> &SprintGesture {
        &self.sprint
    }

    pub fn resolution_scale(&self) -> f32 {
        self.resolution.scale()
    }

    /// Initial key press. Auto-repeat presses must not be reported here.
    pub fn key_down(&mut self, key: ControlKey, now: f64) {
        self.input.set(key, true);
        match key {
            ControlKey::Forward => {
                if self.sprint.press(now, &self.settings.sprint) {
                    debug!("Sprint engaged (double tap)");
                    self.events.push(GestureEvent::SprintEngaged);
                }
            }
            ControlKey::Jump => self.jump_buffer.arm(&self.settings.jump),
            ControlKey::HandLeft | ControlKey::HandRight => {
                if let Some(hand) = key.cadence_key() {
                    self.events.push(GestureEvent::HandTap(hand));
                    if self.cadence.press(hand, now, &self.settings.cadence) {
                        self.events.push(GestureEvent::Alternation);
                    }
                }
            }
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: ControlKey) {
        self.input.set(key, false);
        if key == ControlKey::Forward {
            if self.sprint.release(&self.settings.sprint) {
                debug!("Sprint ended (forward released)");
                self.events.push(GestureEvent::SprintEnded);
            }
            self.cadence.reset();
        }
    }

    /// Raw pointer motion in pixels.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        self.input.add_pointer(dx, dy);
    }

    /// Gesture triggers since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GestureEvent> {
        std::mem::take(&mut self.events)
    }

    fn pose(&self, step: StepOutcome) -> FramePose {
        FramePose {
            eye: self.player.position + Vec3::Y * self.view.bob_offset,
            yaw: self.player.look.yaw,
            pitch: self.player.look.pitch,
            fov: self.view.fov,
            resolution_scale: self.resolution.scale(),
            resolution_change: None,
            hud_speed: None,
            grounded: self.player.grounded,
            step,
        }
    }

    /// Run one displayed frame.
    ///
    /// `raw_dt` is the wall-clock frame time, `now` the host clock in seconds.
    /// Inactive frames only update look smoothing; pointer motion received while
    /// inactive is discarded.
    pub fn advance(&mut self, raw_dt: f32, now: f64, active: bool) -> FramePose {
        let dt = raw_dt.clamp(0.0, self.settings.performance.max_frame_time);

        self.jump_buffer.tick(dt);

        let pointer = self.input.take_pointer();
        if active {
            self.look
                .apply_pointer(&mut self.player.look, pointer.x, pointer.y);
        }
        self.look.update(&mut self.player.look, dt);

        if !active {
            return self.pose(StepOutcome::default());
        }

        // --- Desired velocity ---
        let keys = self.input.move_keys();
        let axes = input_axes(keys);
        let sprint_intent = self.input.sprint_modifier || self.sprint.is_sprinting();
        let cadence_boost = if self.settings.cadence.enabled && sprint_intent && keys.forward {
            self.cadence.boost(now, &self.settings.cadence)
        } else {
            0.0
        };
        let multiplier = speed_multiplier(
            sprint_intent,
            keys.forward,
            cadence_boost,
            &self.settings.sprint,
            &self.settings.cadence,
        );
        let desired = desired_velocity(
            axes,
            self.player.look.yaw,
            self.settings.movement.move_speed,
            multiplier,
        );

        // --- Physics ---
        let step = step_character(
            &mut self.player,
            desired,
            self.input.jump,
            &mut self.jump_buffer,
            &mut self.terrain,
            self.obstacles.as_slice(),
            &self.settings,
            dt,
        );

        // --- Sprint termination ---
        let horizontal_speed = self.player.horizontal_speed();
        let sprint_active = sprint_intent && keys.forward && horizontal_speed > MOVING_SPEED;
        if !keys.forward || (!self.input.sprint_modifier && !self.sprint.is_sprinting()) {
            if self.sprint.disengage(&self.settings.sprint) {
                debug!("Sprint ended (intent lost)");
                self.events.push(GestureEvent::SprintEnded);
            }
            self.cadence.reset();
        }

        // --- Camera feel ---
        self.view
            .update_fov(sprint_active, &self.settings.view, dt);
        self.view.update_bob(
            self.player.grounded,
            horizontal_speed,
            &self.settings.view,
            &self.settings.movement,
            dt,
        );

        // --- Timers ---
        self.sprint.tick(now, dt, &self.settings.sprint);

        let resolution_change = self
            .resolution
            .record_frame(dt, &self.settings.performance);

        self.hud_accum += dt;
        let hud_speed = if self.hud_accum >= HUD_INTERVAL {
            self.hud_accum = 0.0;
            Some(horizontal_speed)
        } else {
            None
        };

        FramePose {
            resolution_change,
            hud_speed,
            ..self.pose(step)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gestures::{CadenceKey, SprintState};
    use crate::props::Obstacle;

    const DT: f32 = 1.0 / 60.0;

    fn flat_core() -> Locomotion {
        let mut settings = LocomotionSettings::default();
        settings.terrain.height = 0.0;
        settings.body.spawn_position = [0.0, settings.body.eye_height, 0.0];
        let terrain = WorldTerrain::new(&settings.terrain);
        Locomotion::new(settings, terrain, ObstacleField::default())
    }

    /// Step `frames` frames starting at `start`, returning the clock afterwards.
    fn run(core: &mut Locomotion, start: f64, frames: usize) -> f64 {
        let mut now = start;
        for _ in 0..frames {
            now += DT as f64;
            core.advance(DT, now, true);
        }
        now
    }

    #[test]
    fn holding_forward_for_one_second_walks_seven_meters() {
        let mut core = flat_core();
        core.key_down(ControlKey::Forward, 0.0);
        run(&mut core, 0.0, 60);

        let position = core.player().position;
        assert!((position.z + 7.0).abs() < 0.05, "z = {}", position.z);
        assert!(position.x.abs() < 1e-4);
        assert!(core.player().grounded);
    }

    #[test]
    fn delta_time_is_clamped() {
        let mut core = flat_core();
        core.key_down(ControlKey::Forward, 0.0);
        core.advance(1.0, 1.0, true);
        let max_dt = core.settings().performance.max_frame_time;
        assert!((core.player().position.z + 7.0 * max_dt).abs() < 1e-4);
    }

    #[test]
    fn inactive_frames_skip_the_simulation() {
        let mut core = flat_core();
        core.key_down(ControlKey::Forward, 0.0);
        core.pointer_moved(200.0, 0.0);
        let before = core.player().clone();
        let pose = core.advance(DT, DT as f64, false);

        assert_eq!(core.player().position, before.position);
        assert_eq!(core.player().look.yaw_target, 0.0);
        assert_eq!(pose.hud_speed, None);
        assert_eq!(pose.resolution_change, None);

        // Pointer motion from the inactive frame is not replayed later
        core.advance(DT, 2.0 * DT as f64, true);
        assert_eq!(core.player().look.yaw_target, 0.0);
    }

    #[test]
    fn pointer_motion_turns_the_view() {
        let mut core = flat_core();
        core.pointer_moved(100.0, 0.0);
        let pose = core.advance(DT, DT as f64, true);
        let expected = -100.0 * core.settings().look.sensitivity;
        assert!((pose.yaw - expected).abs() < 1e-6);
    }

    #[test]
    fn double_tap_sprints_and_widens_fov() {
        let mut core = flat_core();
        core.key_down(ControlKey::Forward, 0.0);
        core.key_up(ControlKey::Forward);
        core.key_down(ControlKey::Forward, 0.15);
        assert_eq!(core.sprint().state(), SprintState::Sprinting);
        assert!(core.drain_events().contains(&GestureEvent::SprintEngaged));

        let pose = core.advance(DT, 0.15 + DT as f64, true);
        let expected = core.settings().movement.move_speed * core.settings().sprint.multiplier;
        assert!((core.player().horizontal_speed() - expected).abs() < 1e-4);
        assert!(pose.fov > core.settings().view.base_fov);

        core.key_up(ControlKey::Forward);
        assert_eq!(core.sprint().state(), SprintState::Cooldown);
        assert_eq!(core.drain_events(), vec![GestureEvent::SprintEnded]);
    }

    #[test]
    fn cadence_raises_sprint_speed_to_max() {
        let mut core = flat_core();
        core.key_down(ControlKey::Forward, 0.0);
        core.key_down(ControlKey::Sprint, 0.0);

        // Six alternations per second: one press every 10 frames
        let mut now = 0.0;
        let mut hand = ControlKey::HandLeft;
        for i in 0..8 {
            core.key_down(hand, now);
            core.key_up(hand);
            hand = if hand == ControlKey::HandLeft {
                ControlKey::HandRight
            } else {
                ControlKey::HandLeft
            };
            if i < 7 {
                now = run(&mut core, now, 10);
            }
        }
        run(&mut core, now, 1);

        let settings = core.settings();
        let expected = settings.movement.move_speed * settings.cadence.max_multiplier;
        assert!((core.player().horizontal_speed() - expected).abs() < 1e-3);

        let events = core.drain_events();
        assert!(events.contains(&GestureEvent::HandTap(CadenceKey::Left)));
        assert!(events.contains(&GestureEvent::HandTap(CadenceKey::Right)));
        assert!(events.iter().filter(|e| **e == GestureEvent::Alternation).count() >= 6);
    }

    #[test]
    fn releasing_forward_clears_cadence() {
        let mut core = flat_core();
        core.key_down(ControlKey::Sprint, 0.0);
        core.key_down(ControlKey::Forward, 0.0);
        core.key_down(ControlKey::HandLeft, 0.0);
        core.key_down(ControlKey::HandRight, 0.2);
        core.key_up(ControlKey::Forward);
        core.key_down(ControlKey::Forward, 0.3);
        core.advance(DT, 0.3 + DT as f64, true);
        let expected = core.settings().movement.move_speed * core.settings().sprint.multiplier;
        assert!((core.player().horizontal_speed() - expected).abs() < 1e-4);
    }

    #[test]
    fn jump_press_before_landing_is_buffered() {
        let mut core = flat_core();
        core.key_down(ControlKey::Jump, 0.0);
        core.key_up(ControlKey::Jump);
        let mut now = 0.0;
        let first = {
            now += DT as f64;
            core.advance(DT, now, true)
        };
        assert!(first.step.jumped);

        // Fall back down, pressing jump shortly before touchdown
        let mut jumped_again = false;
        for _ in 0..120 {
            now += DT as f64;
            if !core.player().grounded && core.player().vertical_speed < -7.0 {
                core.key_down(ControlKey::Jump, now);
                core.key_up(ControlKey::Jump);
            }
            let pose = core.advance(DT, now, true);
            if pose.step.jumped {
                jumped_again = true;
                break;
            }
        }
        assert!(jumped_again);
    }

    #[test]
    fn trunks_block_the_path() {
        let mut settings = LocomotionSettings::default();
        settings.terrain.height = 0.0;
        settings.body.spawn_position = [0.0, settings.body.eye_height, 0.0];
        let terrain = WorldTerrain::new(&settings.terrain);
        let obstacles = ObstacleField::new(vec![Obstacle::new(0.0, -3.0, 0.4)]);
        let radius = settings.body.radius;
        let mut core = Locomotion::new(settings, terrain, obstacles);

        core.key_down(ControlKey::Forward, 0.0);
        run(&mut core, 0.0, 120);
        let position = core.player().position;
        let dist = Vec2::new(position.x, position.z + 3.0).length();
        assert!(dist >= radius + 0.4 - 1e-4);
        assert!(position.z > -3.0);
    }

    #[test]
    fn hud_speed_updates_at_ten_hertz() {
        let mut core = flat_core();
        let mut now = 0.0;
        let mut updates = 0;
        for _ in 0..60 {
            now += DT as f64;
            if core.advance(DT, now, true).hud_speed.is_some() {
                updates += 1;
            }
        }
        // Float accumulation may stretch an interval to seven frames
        assert!((8..=10).contains(&updates));
    }
}
