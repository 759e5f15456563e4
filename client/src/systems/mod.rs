//! Client-side systems
//!
//! Organized into submodules for maintainability.

mod cursor;
mod locomotion;
mod rendering;

// Re-export everything for easy access from main.rs
pub use cursor::*;
pub use locomotion::*;
pub use rendering::*;
