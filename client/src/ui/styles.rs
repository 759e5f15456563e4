//! Shared UI styles - dusk forest palette

use bevy::prelude::*;

/// Dark background for menus, same as the sky
pub const MENU_BACKGROUND: Color = Color::srgb(0.043, 0.059, 0.086);

/// Button colors
pub const BUTTON_NORMAL: Color = Color::srgb(0.08, 0.11, 0.13);
pub const BUTTON_HOVERED: Color = Color::srgb(0.12, 0.18, 0.17);
pub const BUTTON_PRESSED: Color = Color::srgb(0.18, 0.32, 0.24);
pub const BUTTON_DISABLED: Color = Color::srgb(0.06, 0.07, 0.08);

pub const BUTTON_BORDER: Color = Color::srgb(0.2, 0.28, 0.26);

/// Accent color - moss green
pub const ACCENT_COLOR: Color = Color::srgb(0.45, 0.72, 0.45);

/// Warnings in the status line
pub const WARNING_COLOR: Color = Color::srgb(0.9, 0.55, 0.3);

/// Text colors
pub const TEXT_COLOR: Color = Color::srgb(0.88, 0.91, 0.92);
pub const TEXT_MUTED: Color = Color::srgb(0.46, 0.52, 0.55);

/// Standard button style
pub fn button_style() -> Node {
    Node {
        width: Val::Px(280.0),
        height: Val::Px(55.0),
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        margin: UiRect::all(Val::Px(8.0)),
        border: UiRect::all(Val::Px(2.0)),
        ..default()
    }
}

pub fn button_text_style() -> TextFont {
    TextFont {
        font_size: 22.0,
        ..default()
    }
}

pub fn title_text_style() -> TextFont {
    TextFont {
        font_size: 64.0,
        ..default()
    }
}

pub fn hint_text_style() -> TextFont {
    TextFont {
        font_size: 15.0,
        ..default()
    }
}
