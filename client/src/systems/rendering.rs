//! Rendering systems
//!
//! Camera, lights and fog setup, plus the resolution-scale actuator. The
//! actuator sizes the camera's main pass, leaving the window itself alone.

use bevy::camera::MainPassResolutionOverride;
use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use shared::{Locomotion, LocomotionSettings};

use super::locomotion::CurrentPose;

/// Night-blue sky, also used as the fog color so distant terrain fades out.
const SKY_COLOR: Color = Color::srgb(0.043, 0.059, 0.086);

// =============================================================================
// SETUP
// =============================================================================

/// One-time rendering setup. The camera starts at the initial resolution scale.
pub fn setup_rendering(
    mut commands: Commands,
    settings: Res<LocomotionSettings>,
    core: Res<Locomotion>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    commands.insert_resource(ClearColor(SKY_COLOR));

    let camera = commands
        .spawn((
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection {
                fov: settings.view.base_fov.to_radians(),
                near: 0.1,
                far: 180.0,
                ..default()
            }),
            DistanceFog {
                color: SKY_COLOR,
                falloff: FogFalloff::Linear {
                    start: 40.0,
                    end: 180.0,
                },
                ..default()
            },
            Transform::from_translation(settings.spawn_position()),
        ))
        .id();
    if let Some(window) = windows.single().ok().filter(|w| w.physical_width() > 0) {
        let target = scaled_resolution(window.physical_size(), core.resolution_scale());
        commands
            .entity(camera)
            .insert(MainPassResolutionOverride(target));
        info!(
            "Main pass starts at {}x{} ({:.0}%)",
            target.x,
            target.y,
            core.resolution_scale() * 100.0
        );
    }

    commands.spawn((
        DirectionalLight {
            illuminance: 6_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(50.0, 100.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Sky/ground fill (greenish bounce from the grass)
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.75, 0.85, 0.75),
        brightness: 600.0,
        affects_lightmapped_meshes: true,
    });

    info!("Client rendering initialized");
}

// =============================================================================
// ADAPTIVE RESOLUTION
// =============================================================================

/// Main-pass size for a window of `physical` pixels at `scale`, never below 1x1.
pub fn scaled_resolution(physical: UVec2, scale: f32) -> UVec2 {
    let scale = scale.clamp(0.0, 1.0);
    UVec2::new(
        ((physical.x as f32 * scale).round() as u32).clamp(1, physical.x.max(1)),
        ((physical.y as f32 * scale).round() as u32).clamp(1, physical.y.max(1)),
    )
}

/// Keep the camera's main pass at the core's resolution scale of the window.
///
/// Reconciled every frame so window resizes are picked up as well as scale changes.
pub fn apply_resolution_scale(
    mut commands: Commands,
    core: Res<Locomotion>,
    pose: Res<CurrentPose>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(Entity, Option<&MainPassResolutionOverride>), With<Camera3d>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, current)) = cameras.single() else {
        return;
    };
    let physical = window.physical_size();
    if physical.x == 0 || physical.y == 0 {
        return;
    }

    let target = scaled_resolution(physical, core.resolution_scale());
    if current.map(|o| o.0) == Some(target) {
        return;
    }
    commands
        .entity(camera)
        .insert(MainPassResolutionOverride(target));

    if let Some(change) = pose.0.and_then(|p| p.resolution_change) {
        debug!(
            "Main pass {}x{} ({:.0}%) at {:.1} fps",
            target.x,
            target.y,
            change.new * 100.0,
            change.measured_fps
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_keeps_window_size() {
        let size = UVec2::new(1280, 720);
        assert_eq!(scaled_resolution(size, 1.0), size);
    }

    #[test]
    fn scale_shrinks_both_axes() {
        assert_eq!(
            scaled_resolution(UVec2::new(1280, 720), 0.45),
            UVec2::new(576, 324)
        );
        assert_eq!(
            scaled_resolution(UVec2::new(1920, 1080), 0.95),
            UVec2::new(1824, 1026)
        );
    }

    #[test]
    fn tiny_windows_stay_renderable() {
        assert_eq!(scaled_resolution(UVec2::new(1, 1), 0.45), UVec2::new(1, 1));
    }
}
