//! Locomotion core for the terrain explorer.
//!
//! Everything here runs without a window: the client feeds input events in and
//! reads a `FramePose` out once per displayed frame.

pub mod frame;
pub mod gestures;
pub mod input;
pub mod look;
pub mod movement;
pub mod performance;
pub mod physics;
pub mod player;
pub mod props;
pub mod settings;
pub mod terrain;
pub mod view;

pub use frame::{FramePose, Locomotion};
pub use gestures::{CadenceKey, GestureEvent};
pub use input::ControlKey;
pub use props::{ObstacleField, TreeSpawn};
pub use settings::LocomotionSettings;
pub use terrain::WorldTerrain;

/// Default location of the settings file, relative to the working directory.
pub const SETTINGS_PATH: &str = "assets/settings.ron";

/// Environment variable overriding `SETTINGS_PATH`.
pub const SETTINGS_ENV: &str = "EXPLORER_SETTINGS";
