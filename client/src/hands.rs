//! First-person hand props that reach out on each cadence tap
//!
//! Idle -> Extending -> Hold -> Retracting -> Idle, one machine per hand.

use bevy::prelude::*;
use shared::{CadenceKey, GestureEvent};

use crate::states::GameState;
use crate::systems::setup_rendering;

const EXTEND_TIME: f32 = 0.12;
const HOLD_TIME: f32 = 0.08;
const RETRACT_TIME: f32 = 0.16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPhase {
    Idle,
    Extending,
    Hold,
    Retracting,
}

/// Animation state for one hand. `blend` is 0 at the base pose, 1 at full reach.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct HandAnimation {
    pub phase: HandPhase,
    timer: f32,
    pub blend: f32,
}

impl Default for HandAnimation {
    fn default() -> Self {
        Self {
            phase: HandPhase::Idle,
            timer: 0.0,
            blend: 0.0,
        }
    }
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

impl HandAnimation {
    /// Start a reach. Ignored while already extending or holding.
    pub fn trigger(&mut self) {
        if matches!(self.phase, HandPhase::Idle | HandPhase::Retracting) {
            self.phase = HandPhase::Extending;
            self.timer = 0.0;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.phase != HandPhase::Idle
    }

    pub fn update(&mut self, dt: f32) {
        match self.phase {
            HandPhase::Idle => {}
            HandPhase::Extending => {
                self.timer += dt;
                let t = (self.timer / EXTEND_TIME).min(1.0);
                self.blend = smoothstep(t);
                if t >= 1.0 {
                    self.phase = HandPhase::Hold;
                    self.timer = 0.0;
                }
            }
            HandPhase::Hold => {
                self.timer += dt;
                if self.timer >= HOLD_TIME {
                    self.phase = HandPhase::Retracting;
                    self.timer = 0.0;
                }
            }
            HandPhase::Retracting => {
                self.timer += dt;
                let t = (self.timer / RETRACT_TIME).min(1.0);
                self.blend = 1.0 - smoothstep(t);
                if t >= 1.0 {
                    self.phase = HandPhase::Idle;
                    self.timer = 0.0;
                    self.blend = 0.0;
                }
            }
        }
    }
}

/// Rest and reach poses, in camera space.
#[derive(Component, Debug, Clone, Copy)]
pub struct Hand {
    pub side: CadenceKey,
    base: Transform,
    reach: Transform,
}

impl Hand {
    fn new(side: CadenceKey) -> Self {
        let sign = match side {
            CadenceKey::Left => -1.0,
            CadenceKey::Right => 1.0,
        };
        Self {
            side,
            base: Transform::from_xyz(0.25 * sign, -0.2, -0.5)
                .with_rotation(Quat::from_euler(EulerRot::XYZ, 0.0, -0.15 * sign, 0.0)),
            reach: Transform::from_xyz(0.4 * sign, -0.1, -0.2)
                .with_rotation(Quat::from_euler(EulerRot::XYZ, -0.6, -0.25 * sign, 0.0)),
        }
    }

    fn pose(&self, blend: f32) -> Transform {
        Transform {
            translation: self.base.translation.lerp(self.reach.translation, blend),
            rotation: self.base.rotation.slerp(self.reach.rotation, blend),
            scale: Vec3::ONE,
        }
    }
}

pub struct HandsPlugin;

impl Plugin for HandsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hands.after(setup_rendering));
        app.add_systems(
            Update,
            (trigger_hands, animate_hands)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
    }
}

fn spawn_hands(
    mut commands: Commands,
    camera: Query<Entity, With<Camera3d>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Ok(camera) = camera.single() else {
        warn!("No camera to attach hands to");
        return;
    };
    let mesh = meshes.add(Cuboid::new(0.16, 0.1, 0.25));

    for (side, color) in [
        (CadenceKey::Left, Color::srgb(0.61, 0.64, 0.69)),
        (CadenceKey::Right, Color::srgb(0.8, 0.84, 0.88)),
    ] {
        let hand = Hand::new(side);
        let entity = commands
            .spawn((
                hand,
                HandAnimation::default(),
                Mesh3d(mesh.clone()),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: color,
                    ..default()
                })),
                hand.pose(0.0),
                Visibility::Hidden,
            ))
            .id();
        commands.entity(camera).add_child(entity);
    }
}

fn trigger_hands(mut gestures: MessageReader<GestureEvent>, mut hands: Query<(&Hand, &mut HandAnimation)>) {
    for event in gestures.read() {
        let GestureEvent::HandTap(side) = event else {
            continue;
        };
        for (hand, mut animation) in hands.iter_mut() {
            if hand.side == *side {
                animation.trigger();
            }
        }
    }
}

fn animate_hands(
    time: Res<Time>,
    mut hands: Query<(&Hand, &mut HandAnimation, &mut Transform, &mut Visibility)>,
) {
    let dt = time.delta_secs();
    for (hand, mut animation, mut transform, mut visibility) in hands.iter_mut() {
        if animation.phase == HandPhase::Idle {
            continue;
        }
        animation.update(dt);
        *transform = hand.pose(animation.blend);
        *visibility = if animation.is_visible() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(animation: &mut HandAnimation, seconds: f32) {
        let dt = 0.01;
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            animation.update(dt);
        }
    }

    #[test]
    fn full_cycle_returns_to_idle() {
        let mut animation = HandAnimation::default();
        animation.trigger();
        assert_eq!(animation.phase, HandPhase::Extending);
        assert!(animation.is_visible());

        run(&mut animation, 0.13);
        assert_eq!(animation.phase, HandPhase::Hold);
        assert_eq!(animation.blend, 1.0);

        run(&mut animation, 0.09);
        assert_eq!(animation.phase, HandPhase::Retracting);

        run(&mut animation, 0.2);
        assert_eq!(animation.phase, HandPhase::Idle);
        assert_eq!(animation.blend, 0.0);
        assert!(!animation.is_visible());
    }

    #[test]
    fn extending_eases_in_and_out() {
        let mut animation = HandAnimation::default();
        animation.trigger();
        animation.update(EXTEND_TIME * 0.5);
        assert!((animation.blend - 0.5).abs() < 1e-5);
    }

    #[test]
    fn retrigger_while_retracting_restarts() {
        let mut animation = HandAnimation::default();
        animation.trigger();
        run(&mut animation, 0.25);
        assert_eq!(animation.phase, HandPhase::Retracting);
        animation.trigger();
        assert_eq!(animation.phase, HandPhase::Extending);
    }

    #[test]
    fn trigger_during_hold_is_ignored() {
        let mut animation = HandAnimation::default();
        animation.trigger();
        run(&mut animation, 0.15);
        assert_eq!(animation.phase, HandPhase::Hold);
        animation.trigger();
        assert_eq!(animation.phase, HandPhase::Hold);
    }
}
