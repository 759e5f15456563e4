//! Explorer client - hosts the locomotion core, renders the world and handles input
//!
//! Bevy 0.17

mod camera;
mod hands;
mod hud;
mod input;
mod props;
mod states;
mod systems;
mod terrain;
mod ui;

use std::path::PathBuf;

use bevy::prelude::*;
use bevy::window::WindowResolution;
use shared::{
    props::scatter_trees, GestureEvent, Locomotion, LocomotionSettings, ObstacleField,
    WorldTerrain, SETTINGS_ENV, SETTINGS_PATH,
};
use states::GameState;

/// Trees placed at startup; the renderer builds meshes from these.
#[derive(Resource, Default)]
pub struct Forest(pub Vec<shared::TreeSpawn>);

/// Settings file location: env override, else the default path.
fn settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(SETTINGS_PATH))
}

fn load_settings() -> LocomotionSettings {
    let path = settings_path();
    if !path.exists() {
        info!("No settings file at {:?}, using defaults", path);
        return LocomotionSettings::default();
    }
    match LocomotionSettings::load_ron(&path) {
        Ok(settings) => {
            info!("Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            warn!("{}; falling back to default settings", e);
            LocomotionSettings::default()
        }
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Explorer".to_string(),
            resolution: WindowResolution::new(1280, 720),
            ..default()
        }),
        ..default()
    }));

    let settings = load_settings();

    // World generation: terrain first, trees sample it
    let terrain = WorldTerrain::new(&settings.terrain);
    info!(
        "Generating world: terrain seed {}, {} octaves",
        terrain.generator.seed(),
        settings.terrain.octaves
    );
    let trees = scatter_trees(&terrain.generator, &settings.terrain, &settings.vegetation);
    let obstacles = ObstacleField::from_trees(&trees);

    app.insert_resource(Locomotion::new(settings.clone(), terrain, obstacles));
    app.insert_resource(Forest(trees));
    app.insert_resource(settings);

    app.init_state::<GameState>();
    app.add_message::<GestureEvent>();
    app.init_resource::<systems::CurrentPose>();

    app.add_plugins(terrain::TerrainPlugin);
    app.add_plugins(props::PropsPlugin);
    app.add_plugins(hands::HandsPlugin);
    app.add_plugins(hud::HudPlugin);
    app.add_plugins(ui::MainMenuPlugin);

    app.add_systems(Startup, systems::setup_rendering);

    app.add_systems(OnEnter(GameState::Playing), systems::grab_cursor);
    app.add_systems(OnExit(GameState::Playing), systems::release_cursor);

    // ORDER MATTERS: input -> core step -> camera/renderer outputs.
    // The core runs in every state; it only simulates while Playing.
    app.add_systems(
        Update,
        (
            (input::forward_keyboard_input, input::forward_mouse_motion),
            systems::step_locomotion,
            (
                camera::update_camera,
                camera::update_camera_fov,
                systems::apply_resolution_scale,
            ),
        )
            .chain(),
    );

    app.run();
}
