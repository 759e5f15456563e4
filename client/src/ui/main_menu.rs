//! Start overlay
//!
//! Shown at launch and whenever the player leaves gameplay with Escape. Start
//! captures the pointer; if the window cannot capture it, Start is disabled.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::window::{CursorOptions, PrimaryWindow};

use super::styles::*;
use crate::states::GameState;
use crate::systems::pointer_lock_supported;

const POINTER_LOCK_UNSUPPORTED: &str = "Pointer lock not supported on this platform.";

const CONTROLS_HINT: &str = "WASD move  |  Mouse look  |  Space jump\n\
     Double-tap W or hold Shift to sprint  |  Alternate Q / E while sprinting to run faster\n\
     Esc returns here";

pub struct MainMenuPlugin;

impl Plugin for MainMenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::MainMenu), spawn_main_menu);
        app.add_systems(OnExit(GameState::MainMenu), despawn_main_menu);
        app.add_systems(
            Update,
            (button_interactions, handle_menu_actions).run_if(in_state(GameState::MainMenu)),
        );
        app.add_systems(Update, leave_gameplay.run_if(in_state(GameState::Playing)));
    }
}

/// Marker for the main menu root
#[derive(Component)]
struct MainMenuRoot;

/// Status line under the buttons
#[derive(Component)]
struct StatusText;

/// Button that ignores presses and keeps its dimmed look
#[derive(Component)]
struct Disabled;

#[derive(Component, Clone, Copy)]
enum MenuButton {
    Start,
    Exit,
}

fn spawn_main_menu(
    mut commands: Commands,
    windows: Query<Entity, With<PrimaryWindow>>,
    cursor_opts: Query<&CursorOptions>,
) {
    let supported = pointer_lock_supported(&windows, &cursor_opts);
    if !supported {
        warn!("{}", POINTER_LOCK_UNSUPPORTED);
    }

    commands
        .spawn((
            MainMenuRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(MENU_BACKGROUND.with_alpha(0.85)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("EXPLORER"),
                title_text_style(),
                TextColor(ACCENT_COLOR),
                Node {
                    margin: UiRect::bottom(Val::Px(32.0)),
                    ..default()
                },
            ));

            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    padding: UiRect::all(Val::Px(10.0)),
                    ..default()
                })
                .with_children(|buttons| {
                    spawn_button(buttons, "START", MenuButton::Start, !supported);
                    spawn_button(buttons, "EXIT", MenuButton::Exit, false);
                });

            let (status, color) = if supported {
                ("Click Start to capture the pointer.", TEXT_MUTED)
            } else {
                (POINTER_LOCK_UNSUPPORTED, WARNING_COLOR)
            };
            parent.spawn((
                StatusText,
                Text::new(status),
                hint_text_style(),
                TextColor(color),
                Node {
                    margin: UiRect::top(Val::Px(12.0)),
                    ..default()
                },
            ));

            parent.spawn((
                Text::new(CONTROLS_HINT),
                hint_text_style(),
                TextColor(TEXT_MUTED),
                TextLayout::new_with_justify(Justify::Center),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(24.0),
                    ..default()
                },
            ));
        });
}

fn spawn_button(
    parent: &mut bevy::ecs::hierarchy::ChildSpawnerCommands<'_>,
    text: &str,
    action: MenuButton,
    disabled: bool,
) {
    let (background, text_color) = if disabled {
        (BUTTON_DISABLED, TEXT_MUTED)
    } else {
        (BUTTON_NORMAL, TEXT_COLOR)
    };

    let mut button = parent.spawn((
        Button,
        action,
        button_style(),
        BackgroundColor(background),
        BorderColor::from(BUTTON_BORDER),
        BorderRadius::all(Val::Px(6.0)),
    ));
    if disabled {
        button.insert(Disabled);
    }
    button.with_children(|btn| {
        btn.spawn((Text::new(text), button_text_style(), TextColor(text_color)));
    });
}

fn despawn_main_menu(mut commands: Commands, query: Query<Entity, With<MainMenuRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

fn button_interactions(
    mut buttons: Query<
        (&Interaction, &mut BackgroundColor, &mut BorderColor),
        (Changed<Interaction>, With<Button>, Without<Disabled>),
    >,
) {
    for (interaction, mut bg_color, mut border_color) in buttons.iter_mut() {
        match interaction {
            Interaction::Pressed => {
                *bg_color = BackgroundColor(BUTTON_PRESSED);
                *border_color = BorderColor::from(ACCENT_COLOR);
            }
            Interaction::Hovered => {
                *bg_color = BackgroundColor(BUTTON_HOVERED);
                *border_color = BorderColor::from(ACCENT_COLOR);
            }
            Interaction::None => {
                *bg_color = BackgroundColor(BUTTON_NORMAL);
                *border_color = BorderColor::from(BUTTON_BORDER);
            }
        };
    }
}

fn handle_menu_actions(
    buttons: Query<(&Interaction, &MenuButton, Has<Disabled>), Changed<Interaction>>,
    mut status: Query<&mut Text, With<StatusText>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit_writer: MessageWriter<AppExit>,
) {
    for (interaction, action, disabled) in buttons.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match action {
            MenuButton::Start if disabled => {
                for mut text in status.iter_mut() {
                    **text = POINTER_LOCK_UNSUPPORTED.to_string();
                }
            }
            MenuButton::Start => {
                info!("Start pressed - entering gameplay");
                next_state.set(GameState::Playing);
            }
            MenuButton::Exit => {
                info!("Exit pressed - quitting");
                exit_writer.write(AppExit::Success);
            }
        }
    }
}

/// Escape releases the pointer and brings the overlay back.
fn leave_gameplay(keyboard: Res<ButtonInput<KeyCode>>, mut next_state: ResMut<NextState<GameState>>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        info!("Escape pressed - returning to menu");
        next_state.set(GameState::MainMenu);
    }
}
