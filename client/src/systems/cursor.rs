//! Pointer lock management

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};

/// Entering gameplay: lock and hide the cursor.
pub fn grab_cursor(
    windows: Query<Entity, With<PrimaryWindow>>,
    mut cursor_opts: Query<&mut CursorOptions>,
) {
    let Ok(window_entity) = windows.single() else {
        return;
    };
    if let Ok(mut cursor) = cursor_opts.get_mut(window_entity) {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
        info!("Pointer locked");
    } else {
        warn!("Primary window has no cursor options; pointer lock unavailable");
    }
}

/// Leaving gameplay: free the cursor.
pub fn release_cursor(
    windows: Query<Entity, With<PrimaryWindow>>,
    mut cursor_opts: Query<&mut CursorOptions>,
) {
    if let Ok(window_entity) = windows.single() {
        if let Ok(mut cursor) = cursor_opts.get_mut(window_entity) {
            cursor.grab_mode = CursorGrabMode::None;
            cursor.visible = true;
            info!("Pointer released");
        }
    }
}

/// Whether the primary window supports pointer capture at all.
pub fn pointer_lock_supported(
    windows: &Query<Entity, With<PrimaryWindow>>,
    cursor_opts: &Query<&CursorOptions>,
) -> bool {
    windows
        .single()
        .map(|window_entity| cursor_opts.get(window_entity).is_ok())
        .unwrap_or(false)
}
