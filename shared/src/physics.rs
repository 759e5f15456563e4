//! Character physics for the first-person player.
//!
//! - Ground/air velocity blending toward a desired velocity
//! - Sliding collision against static trunk cylinders
//! - Gravity, buffered jumps, bounce-or-land against the height field
//!
//! Variable timestep: callers clamp `dt` before stepping.

use bevy::prelude::*;

use crate::gestures::JumpBuffer;
use crate::player::PlayerState;
use crate::props::Obstacle;
use crate::settings::LocomotionSettings;
use crate::terrain::WorldTerrain;

/// Ground speed^2 below which a coasting player is stopped outright.
pub const STOP_SPEED_SQ: f32 = 1e-6;

/// Air speed^2 below which a coasting player is stopped (anti-drift).
pub const AIR_STOP_SPEED_SQ: f32 = 1e-4;

/// Stand-in separation when the player sits exactly on an obstacle axis.
pub const MIN_SEPARATION: f32 = 0.0001;

/// What happened during one step, for event emission and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub jumped: bool,
    pub landed: bool,
    pub bounced: bool,
}

/// Move horizontal velocity toward `desired`.
pub fn blend_velocity(
    velocity: &mut Vec3,
    desired: Vec3,
    grounded: bool,
    settings: &LocomotionSettings,
    dt: f32,
) {
    let movement = &settings.movement;
    if desired.length_squared() > 0.0 {
        if grounded && movement.crisp_movement {
            *velocity = desired;
        } else {
            let accel = if grounded {
                movement.acceleration
            } else {
                movement.air_acceleration
            };
            let alpha = 1.0 - (-accel * dt).exp();
            *velocity += (desired - *velocity) * alpha;
        }
    } else {
        let damping = if grounded {
            movement.damping
        } else {
            movement.air_damping
        };
        let alpha = 1.0 - (-damping * dt).exp();
        *velocity *= 1.0 - alpha;
        if velocity.length_squared() < STOP_SPEED_SQ {
            *velocity = Vec3::ZERO;
        }
    }

    if !grounded && desired.length_squared() == 0.0 && velocity.length_squared() < AIR_STOP_SPEED_SQ {
        *velocity = Vec3::ZERO;
    }
}

/// Push the player out of every overlapping cylinder and cancel inward velocity.
pub fn resolve_obstacles(
    position: &mut Vec3,
    velocity: &mut Vec3,
    player_radius: f32,
    obstacles: &[Obstacle],
) {
    for obstacle in obstacles {
        let dx = position.x - obstacle.center.x;
        let dz = position.z - obstacle.center.y;
        let min_dist = player_radius + obstacle.radius;
        let d2 = dx * dx + dz * dz;
        if d2 >= min_dist * min_dist {
            continue;
        }

        let mut d = d2.sqrt();
        if d == 0.0 {
            d = MIN_SEPARATION;
        }
        let (nx, nz) = (dx / d, dz / d);
        let push = min_dist - d;
        position.x += nx * push;
        position.z += nz * push;

        // Slide: drop only the component heading into the trunk
        let vn = velocity.x * nx + velocity.z * nz;
        if vn < 0.0 {
            velocity.x -= vn * nx;
            velocity.z -= vn * nz;
        }
    }
}

fn start_jump(player: &mut PlayerState, buffer: &mut JumpBuffer, settings: &LocomotionSettings) {
    player.vertical_speed = settings.jump.jump_speed;
    player.grounded = false;
    player.jump_locked = true;
    buffer.consume();
}

/// Step the player one frame.
///
/// - Blends horizontal velocity toward `desired` (ground or air gains)
/// - Integrates horizontal position and resolves trunk collisions
/// - Jumps when requested (`jump_held` or an armed buffer) and allowed
/// - Applies gravity and settles against the terrain: jump, bounce, or land
/// - Re-arms jumping on landing, and takes a still-pending jump immediately
#[allow(clippy::too_many_arguments)]
pub fn step_character(
    player: &mut PlayerState,
    desired: Vec3,
    jump_held: bool,
    jump_buffer: &mut JumpBuffer,
    terrain: &mut WorldTerrain,
    obstacles: &[Obstacle],
    settings: &LocomotionSettings,
    dt: f32,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    // --- Horizontal ---
    blend_velocity(&mut player.velocity, desired, player.grounded, settings, dt);
    player.position += player.velocity * dt;
    resolve_obstacles(
        &mut player.position,
        &mut player.velocity,
        settings.body.radius,
        obstacles,
    );

    // --- Jump ---
    let ground_y =
        terrain.height_cached(player.position.x, player.position.z) + settings.body.eye_height;
    let jump_requested = |buffer: &JumpBuffer| jump_held || buffer.is_armed();

    if jump_requested(jump_buffer) && player.grounded && !player.jump_locked {
        start_jump(player, jump_buffer, settings);
        outcome.jumped = true;
    }

    // --- Gravity + integrate ---
    player.vertical_speed -= settings.jump.gravity * dt;
    player.position.y += player.vertical_speed * dt;

    // --- Ground contact ---
    if player.position.y <= ground_y {
        player.position.y = ground_y;
        if jump_requested(jump_buffer) && !outcome.jumped {
            // Pressed right at touchdown
            start_jump(player, jump_buffer, settings);
            outcome.jumped = true;
        } else if player.vertical_speed < -settings.jump.bounce_threshold {
            player.vertical_speed = -player.vertical_speed * settings.jump.bounce_restitution;
            player.grounded = false;
            outcome.bounced = true;
        } else {
            player.vertical_speed = 0.0;
            player.grounded = true;
        }
    }

    // --- Landing ---
    if player.grounded && !player.was_grounded {
        player.jump_locked = false;
        outcome.landed = true;
        if !outcome.jumped && jump_requested(jump_buffer) {
            start_jump(player, jump_buffer, settings);
            outcome.jumped = true;
        }
    }
    player.was_grounded = player.grounded;

    outcome
}
