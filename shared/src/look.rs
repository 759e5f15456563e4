//! Mouse look: pointer deltas -> yaw/pitch targets -> current angles

use crate::settings::LookSettings;

/// Current and target view angles (radians).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookAngles {
    pub yaw: f32,
    pub pitch: f32,
    pub yaw_target: f32,
    pub pitch_target: f32,
}

/// How current angles follow their targets. Fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookMode {
    /// Snap to target every frame
    Instant,
    /// Exponential approach at `rate` (1/s)
    Smoothed { rate: f32 },
}

#[derive(Debug, Clone)]
pub struct LookController {
    sensitivity: f32,
    pitch_limit: f32,
    mode: LookMode,
}

impl LookController {
    pub fn new(settings: &LookSettings) -> Self {
        let mode = if settings.low_latency_aim {
            LookMode::Instant
        } else {
            LookMode::Smoothed {
                rate: settings.smoothing,
            }
        };
        Self {
            sensitivity: settings.sensitivity,
            pitch_limit: settings.pitch_limit,
            mode,
        }
    }

    pub fn mode(&self) -> LookMode {
        self.mode
    }

    /// Fold a pointer delta (pixels) into the targets.
    /// +X motion turns right (yaw decreases), +Y motion pitches down.
    pub fn apply_pointer(&self, angles: &mut LookAngles, dx: f32, dy: f32) {
        angles.yaw_target -= dx * self.sensitivity;
        angles.pitch_target -= dy * self.sensitivity;
        angles.pitch_target = angles
            .pitch_target
            .clamp(-self.pitch_limit, self.pitch_limit);
    }

    /// Advance current angles toward targets.
    pub fn update(&self, angles: &mut LookAngles, dt: f32) {
        match self.mode {
            LookMode::Instant => {
                angles.yaw = angles.yaw_target;
                angles.pitch = angles.pitch_target;
            }
            LookMode::Smoothed { rate } => {
                let alpha = 1.0 - (-rate * dt).exp();
                angles.yaw += (angles.yaw_target - angles.yaw) * alpha;
                angles.pitch += (angles.pitch_target - angles.pitch) * alpha;
            }
        }
    }
}
