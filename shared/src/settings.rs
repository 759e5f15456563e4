//! Locomotion settings
//!
//! One immutable structure built at startup and handed to every component.
//! Defaults reproduce the tuned feel of the demo; a RON file can override any field.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Ground/air movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// Target walking speed (m/s)
    pub move_speed: f32,
    /// Approach rate toward desired velocity on the ground (1/s)
    pub acceleration: f32,
    /// Velocity decay on the ground with no input (1/s)
    pub damping: f32,
    /// Approach rate while airborne (1/s)
    pub air_acceleration: f32,
    /// Velocity decay while airborne with no input (1/s)
    pub air_damping: f32,
    /// Snap to desired velocity on the ground instead of easing
    pub crisp_movement: bool,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            move_speed: 7.0,
            acceleration: 12.0,
            damping: 6.0,
            air_acceleration: 4.0,
            air_damping: 1.5,
            crisp_movement: true,
        }
    }
}

/// Mouse look tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookSettings {
    /// Radians per pixel of pointer motion
    pub sensitivity: f32,
    /// Pitch is clamped to +/- this many radians
    pub pitch_limit: f32,
    /// Apply aim instantly (no smoothing)
    pub low_latency_aim: bool,
    /// Exponential approach rate when smoothing (1/s)
    pub smoothing: f32,
}

impl Default for LookSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.0025,
            pitch_limit: std::f32::consts::FRAC_PI_2 - 0.05,
            low_latency_aim: true,
            smoothing: 18.0,
        }
    }
}

/// Vertical physics: gravity, jumping, landing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpSettings {
    /// Downward acceleration (m/s^2, positive)
    pub gravity: f32,
    /// Initial upward speed of a jump (m/s)
    pub jump_speed: f32,
    /// How long an early jump press stays armed (seconds)
    pub buffer_time: f32,
    /// Fraction of downward speed returned on a bounce (0..1)
    pub bounce_restitution: f32,
    /// Minimum downward speed that bounces instead of landing (m/s)
    pub bounce_threshold: f32,
}

impl Default for JumpSettings {
    fn default() -> Self {
        Self {
            gravity: 26.0,
            jump_speed: 8.0,
            buffer_time: 0.12,
            bounce_restitution: 0.65,
            bounce_threshold: 0.5,
        }
    }
}

/// Sprint modifier and double-tap detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintSettings {
    /// Speed multiplier while sprinting
    pub multiplier: f32,
    /// Max time between the two taps of a double-tap (seconds)
    pub double_tap_window: f32,
    /// Retrigger suppression after a sprint ends (seconds)
    pub cooldown: f32,
}

impl Default for SprintSettings {
    fn default() -> Self {
        Self {
            multiplier: 2.5,
            double_tap_window: 0.35,
            cooldown: 0.15,
        }
    }
}

/// Alternating-key cadence boost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceSettings {
    pub enabled: bool,
    /// Total speed multiplier at full cadence
    pub max_multiplier: f32,
    /// Sliding window used to measure the alternation rate (seconds)
    pub window: f32,
    /// Alternations per second that reach the max multiplier
    pub target_rate: f32,
    /// Presses closer together than this are ignored (seconds)
    pub min_interval: f32,
    /// Presses further apart than this are ignored (seconds)
    pub max_interval: f32,
}

impl Default for CadenceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_multiplier: 3.0,
            window: 1.0,
            target_rate: 6.0,
            min_interval: 0.06,
            max_interval: 0.45,
        }
    }
}

/// Camera feel handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Vertical field of view at rest (degrees)
    pub base_fov: f32,
    /// Vertical field of view while sprinting (degrees)
    pub sprint_fov: f32,
    /// Easing rate toward the target FOV (1/s)
    pub fov_smoothing: f32,
    /// Vertical head bob amplitude (meters)
    pub bob_intensity: f32,
    /// Head bob frequency at base speed (Hz)
    pub bob_frequency: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            base_fov: 75.0,
            sprint_fov: 94.0,
            fov_smoothing: 8.0,
            bob_intensity: 0.03,
            bob_frequency: 10.0,
        }
    }
}

/// Frame pacing and adaptive resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    /// Largest delta-time fed to the simulation (seconds)
    pub max_frame_time: f32,
    pub dynamic_resolution: bool,
    pub initial_resolution_scale: f32,
    pub min_resolution_scale: f32,
    pub max_resolution_scale: f32,
    pub target_fps: f32,
    pub resolution_adjust_step: f32,
    /// Seconds between resolution adjustments
    pub resolution_adjust_interval: f32,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            max_frame_time: 0.033,
            dynamic_resolution: true,
            initial_resolution_scale: 0.95,
            min_resolution_scale: 0.45,
            max_resolution_scale: 1.0,
            target_fps: 60.0,
            resolution_adjust_step: 0.06,
            resolution_adjust_interval: 0.25,
        }
    }
}

/// Height field noise parameters. Same values + seed = same terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    pub seed: u32,
    /// World units -> noise space
    pub scale: f64,
    /// Max height variation either side of zero (meters)
    pub height: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Side length of the ground mesh (meters)
    pub size: f32,
    /// Ground mesh grid resolution
    pub segments: u32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: 4242,
            scale: 0.003,
            height: 18.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            size: 1000.0,
            segments: 96,
        }
    }
}

/// Tree scattering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationSettings {
    pub tree_count: u32,
    pub max_tries: u32,
    /// Reject spots whose terrain normal.y is below this (too steep)
    pub slope_min_normal_y: f32,
    pub seed: u64,
}

impl Default for VegetationSettings {
    fn default() -> Self {
        Self {
            tree_count: 120,
            max_tries: 2000,
            slope_min_normal_y: 0.9,
            seed: 5678,
        }
    }
}

/// Player body dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySettings {
    /// Horizontal collision radius against trunks (meters)
    pub radius: f32,
    /// Camera height above the terrain when standing (meters)
    pub eye_height: f32,
    pub spawn_position: [f32; 3],
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            radius: 0.35,
            eye_height: 1.6,
            spawn_position: [0.0, 1.601, 5.0],
        }
    }
}

/// Every tunable of the locomotion core.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionSettings {
    pub movement: MovementSettings,
    pub look: LookSettings,
    pub jump: JumpSettings,
    pub sprint: SprintSettings,
    pub cadence: CadenceSettings,
    pub view: ViewSettings,
    pub performance: PerformanceSettings,
    pub terrain: TerrainSettings,
    pub vegetation: VegetationSettings,
    pub body: BodySettings,
}

impl LocomotionSettings {
    /// Parse settings from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, String> {
        let settings: Self =
            ron::from_str(text).map_err(|e| format!("Failed to parse settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a RON settings file.
    pub fn load_ron(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_ron_str(&text)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        let finite = [
            ("movement.move_speed", self.movement.move_speed),
            ("movement.acceleration", self.movement.acceleration),
            ("movement.damping", self.movement.damping),
            ("movement.air_acceleration", self.movement.air_acceleration),
            ("movement.air_damping", self.movement.air_damping),
            ("look.sensitivity", self.look.sensitivity),
            ("look.smoothing", self.look.smoothing),
            ("jump.gravity", self.jump.gravity),
            ("jump.jump_speed", self.jump.jump_speed),
            ("sprint.multiplier", self.sprint.multiplier),
            ("cadence.max_multiplier", self.cadence.max_multiplier),
            ("view.fov_smoothing", self.view.fov_smoothing),
        ];
        for (name, value) in finite {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a finite non-negative number (got {})", name, value));
            }
        }

        if !(0.0..=std::f32::consts::FRAC_PI_2).contains(&self.look.pitch_limit) {
            return Err(format!(
                "look.pitch_limit must be within [0, pi/2] (got {})",
                self.look.pitch_limit
            ));
        }
        if !(0.0..=1.0).contains(&self.jump.bounce_restitution) {
            return Err(format!(
                "jump.bounce_restitution must be within [0, 1] (got {})",
                self.jump.bounce_restitution
            ));
        }
        if self.cadence.window <= 0.0 || self.cadence.target_rate <= 0.0 {
            return Err("cadence.window and cadence.target_rate must be positive".to_string());
        }
        if self.cadence.min_interval > self.cadence.max_interval {
            return Err(format!(
                "cadence.min_interval ({}) exceeds cadence.max_interval ({})",
                self.cadence.min_interval, self.cadence.max_interval
            ));
        }
        if self.performance.max_frame_time <= 0.0 || self.performance.target_fps <= 0.0 {
            return Err("performance.max_frame_time and performance.target_fps must be positive".to_string());
        }
        if self.performance.min_resolution_scale > self.performance.max_resolution_scale
            || self.performance.min_resolution_scale <= 0.0
        {
            return Err(format!(
                "resolution scale range [{}, {}] is invalid",
                self.performance.min_resolution_scale, self.performance.max_resolution_scale
            ));
        }
        let positive = [
            ("terrain.size", f64::from(self.terrain.size)),
            ("terrain.scale", self.terrain.scale),
            ("terrain.lacunarity", self.terrain.lacunarity),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be a finite positive number (got {})", name, value));
            }
        }
        for (name, value) in [
            ("terrain.height", self.terrain.height),
            ("terrain.persistence", self.terrain.persistence),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a finite non-negative number (got {})", name, value));
            }
        }
        if !(-1.0..=1.0).contains(&self.vegetation.slope_min_normal_y) {
            return Err(format!(
                "vegetation.slope_min_normal_y must be within [-1, 1] (got {})",
                self.vegetation.slope_min_normal_y
            ));
        }
        if self.terrain.octaves == 0 {
            return Err("terrain.octaves must be at least 1".to_string());
        }
        if self.terrain.segments == 0 {
            return Err("terrain.segments must be at least 1".to_string());
        }
        Ok(())
    }

    /// Player spawn point as a vector.
    pub fn spawn_position(&self) -> Vec3 {
        Vec3::from_array(self.body.spawn_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(LocomotionSettings::default().validate().is_ok());
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let text = "(movement: (move_speed: 9.0), terrain: (seed: 7))";
        let settings = LocomotionSettings::from_ron_str(text).unwrap();
        assert_eq!(settings.movement.move_speed, 9.0);
        assert_eq!(settings.movement.acceleration, 12.0);
        assert_eq!(settings.terrain.seed, 7);
        assert_eq!(settings.terrain.octaves, 5);
    }

    #[test]
    fn rejects_inverted_cadence_interval() {
        let text = "(cadence: (min_interval: 0.5, max_interval: 0.1))";
        let err = LocomotionSettings::from_ron_str(text).unwrap_err();
        assert!(err.contains("cadence.min_interval"));
    }

    #[test]
    fn rejects_zero_octaves() {
        let mut settings = LocomotionSettings::default();
        settings.terrain.octaves = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn shipped_settings_file_matches_defaults() {
        let text = include_str!("../../assets/settings.ron");
        let settings = LocomotionSettings::from_ron_str(text).unwrap();
        assert_eq!(settings, LocomotionSettings::default());
    }

    #[test]
    fn rejects_negative_terrain_size() {
        let err = LocomotionSettings::from_ron_str("(terrain: (size: -10.0))").unwrap_err();
        assert!(err.contains("terrain.size"));
    }

    #[test]
    fn rejects_non_finite_terrain_scale() {
        let mut settings = LocomotionSettings::default();
        settings.terrain.scale = f64::NAN;
        assert!(settings.validate().unwrap_err().contains("terrain.scale"));
        settings.terrain.scale = 0.0;
        assert!(settings.validate().unwrap_err().contains("terrain.scale"));
    }

    #[test]
    fn rejects_bad_terrain_shape() {
        let mut settings = LocomotionSettings::default();
        settings.terrain.height = -1.0;
        assert!(settings.validate().unwrap_err().contains("terrain.height"));

        let mut settings = LocomotionSettings::default();
        settings.terrain.persistence = f64::INFINITY;
        assert!(settings.validate().unwrap_err().contains("terrain.persistence"));

        let mut settings = LocomotionSettings::default();
        settings.terrain.lacunarity = 0.0;
        assert!(settings.validate().unwrap_err().contains("terrain.lacunarity"));
    }

    #[test]
    fn rejects_out_of_range_slope_limit() {
        let mut settings = LocomotionSettings::default();
        settings.vegetation.slope_min_normal_y = 1.5;
        assert!(settings.validate().unwrap_err().contains("slope_min_normal_y"));
        settings.vegetation.slope_min_normal_y = f32::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(LocomotionSettings::from_ron_str("(movement: ").is_err());
    }
}
