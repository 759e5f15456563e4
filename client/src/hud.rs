//! Gameplay overlay: horizontal speed readout and a center dot
//!
//! The speed text only changes when the core publishes a HUD sample (every 0.1 s).

use bevy::prelude::*;

use crate::states::GameState;
use crate::systems::CurrentPose;
use crate::ui::styles::{TEXT_COLOR, TEXT_MUTED};

/// Root node of the overlay
#[derive(Component)]
pub struct Hud;

#[derive(Component)]
struct SpeedText;

#[derive(Component)]
struct ResolutionText;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), spawn_hud);
        app.add_systems(OnExit(GameState::Playing), despawn_hud);
        app.add_systems(
            Update,
            update_hud
                .after(crate::systems::step_locomotion)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

pub fn format_speed(speed: f32) -> String {
    format!("Speed: {:.2} m/s", speed)
}

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Hud,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            // Never block the pointer
            Pickable::IGNORE,
        ))
        .with_children(|parent| {
            parent.spawn((
                Node {
                    width: Val::Px(4.0),
                    height: Val::Px(4.0),
                    ..default()
                },
                BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.8)),
                BorderRadius::all(Val::Px(2.0)),
            ));

            parent
                .spawn(Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(16.0),
                    top: Val::Px(12.0),
                    flex_direction: FlexDirection::Column,
                    ..default()
                })
                .with_children(|panel| {
                    panel.spawn((
                        SpeedText,
                        Text::new(format_speed(0.0)),
                        TextFont {
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(TEXT_COLOR),
                    ));
                    panel.spawn((
                        ResolutionText,
                        Text::new(""),
                        TextFont {
                            font_size: 13.0,
                            ..default()
                        },
                        TextColor(TEXT_MUTED),
                    ));
                });
        });
}

fn despawn_hud(mut commands: Commands, query: Query<Entity, With<Hud>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

fn update_hud(
    pose: Res<CurrentPose>,
    mut speed_text: Query<&mut Text, (With<SpeedText>, Without<ResolutionText>)>,
    mut resolution_text: Query<&mut Text, (With<ResolutionText>, Without<SpeedText>)>,
) {
    let Some(frame) = pose.0.as_ref() else {
        return;
    };

    if let Some(speed) = frame.hud_speed {
        for mut text in speed_text.iter_mut() {
            **text = format_speed(speed);
        }
    }

    if frame.resolution_change.is_some() || resolution_text.iter().any(|t| t.is_empty()) {
        for mut text in resolution_text.iter_mut() {
            **text = format!("Render scale: {:.0}%", frame.resolution_scale * 100.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_has_two_decimals() {
        assert_eq!(format_speed(7.0), "Speed: 7.00 m/s");
        assert_eq!(format_speed(17.5), "Speed: 17.50 m/s");
    }
}
