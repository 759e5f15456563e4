//! First-person camera driven by the core's frame pose

use bevy::prelude::*;

use crate::systems::CurrentPose;

/// Place the camera at the eye with the core's yaw/pitch. No extra smoothing:
/// look smoothing (if any) already happened in the core.
pub fn update_camera(
    pose: Res<CurrentPose>,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
) {
    let Some(pose) = pose.0 else {
        return;
    };
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };
    camera_transform.translation = pose.eye;
    camera_transform.rotation = pose.rotation();
}

/// Apply the eased field of view (core works in degrees).
pub fn update_camera_fov(
    pose: Res<CurrentPose>,
    mut camera_query: Query<&mut Projection, With<Camera3d>>,
) {
    let Some(pose) = pose.0 else {
        return;
    };
    let Ok(mut projection) = camera_query.single_mut() else {
        return;
    };
    let Projection::Perspective(ref mut persp) = *projection else {
        return;
    };

    let fov = pose.fov.to_radians();
    if persp.fov != fov {
        persp.fov = fov;
    }
}
