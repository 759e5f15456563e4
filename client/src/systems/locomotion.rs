//! Per-frame step of the locomotion core

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use shared::{FramePose, GestureEvent, Locomotion};

use crate::states::GameState;

/// Pose produced by the most recent core step; `None` before the first frame.
#[derive(Resource, Default)]
pub struct CurrentPose(pub Option<FramePose>);

/// Run the core once for this displayed frame.
///
/// The frame is active only while Playing with a focused window; otherwise the
/// core skips simulation and the camera keeps its last pose.
pub fn step_locomotion(
    mut core: ResMut<Locomotion>,
    mut pose: ResMut<CurrentPose>,
    mut gestures: MessageWriter<GestureEvent>,
    state: Res<State<GameState>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    time: Res<Time>,
) {
    let focused = windows.single().map(|w| w.focused).unwrap_or(false);
    let active = *state.get() == GameState::Playing && focused;

    let frame = core.advance(time.delta_secs(), time.elapsed_secs_f64(), active);

    for event in core.drain_events() {
        gestures.write(event);
    }
    pose.0 = Some(frame);
}
