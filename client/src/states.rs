//! Game state machine

use bevy::prelude::*;

/// Main game states
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Start overlay; the core is idle and the cursor is free
    #[default]
    MainMenu,
    /// Pointer locked, locomotion running
    Playing,
}
