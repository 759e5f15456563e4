//! Adaptive resolution: trade render resolution for a steady frame rate.
//!
//! Frame times are averaged over a fixed interval. Below 92% of the target FPS the
//! scale drops one step; above 108% it rises one step. The deadband between keeps
//! the scale from oscillating.

use bevy::prelude::*;

use crate::settings::PerformanceSettings;

/// Average FPS below `target * LOW_WATERMARK` lowers the scale.
pub const LOW_WATERMARK: f32 = 0.92;
/// Average FPS above `target * HIGH_WATERMARK` raises the scale.
pub const HIGH_WATERMARK: f32 = 1.08;
/// Smallest scale change worth applying.
pub const MIN_SCALE_CHANGE: f32 = 0.01;

/// A resolution change for the renderer to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleChange {
    pub old: f32,
    pub new: f32,
    pub measured_fps: f32,
}

/// Current resolution scale plus the rolling measurement window.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionController {
    scale: f32,
    frame_time_accum: f32,
    frames: u32,
    since_adjust: f32,
}

impl ResolutionController {
    pub fn new(settings: &PerformanceSettings) -> Self {
        Self {
            scale: settings
                .initial_resolution_scale
                .clamp(settings.min_resolution_scale, settings.max_resolution_scale),
            frame_time_accum: 0.0,
            frames: 0,
            since_adjust: 0.0,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Feed one frame's (clamped) delta-time.
    pub fn record_frame(&mut self, dt: f32, settings: &PerformanceSettings) -> Option<ScaleChange> {
        if !settings.dynamic_resolution {
            return None;
        }
        self.frame_time_accum += dt;
        self.frames += 1;
        self.since_adjust += dt;

        if self.since_adjust < settings.resolution_adjust_interval || self.frame_time_accum <= 0.0 {
            return None;
        }

        let measured_fps = self.frames as f32 / self.frame_time_accum;
        let target = settings.target_fps;
        let step = settings.resolution_adjust_step;
        let mut next = self.scale;
        if measured_fps < target * LOW_WATERMARK {
            next = (self.scale - step).max(settings.min_resolution_scale);
        } else if measured_fps > target * HIGH_WATERMARK {
            next = (self.scale + step).min(settings.max_resolution_scale);
        }

        self.frame_time_accum = 0.0;
        self.frames = 0;
        self.since_adjust = 0.0;

        if (next - self.scale).abs() < MIN_SCALE_CHANGE {
            return None;
        }
        let change = ScaleChange {
            old: self.scale,
            new: next,
            measured_fps,
        };
        self.scale = next;
        debug!(
            "Resolution scale {:.2} -> {:.2} ({:.1} fps)",
            change.old, change.new, measured_fps
        );
        Some(change)
    }
}
