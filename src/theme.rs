//! Centralized theme and styling for the TUI
//!
//! Single source of truth for the colors and styles of the menu screen.
//!
//! # Usage
//! ```rust
//! use camconfig::theme::{Colors, Styles};
//! use ratatui::style::Style;
//!
//! let style = Style::default().fg(Colors::PRIMARY);
//! let title_style = Styles::title();
//! ```

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette for the application
pub struct Colors;

impl Colors {
    /// Panel background
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    pub const FG_PRIMARY: Color = Color::White;

    /// Spacers, page captions
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Borders, titles
    pub const PRIMARY: Color = Color::Cyan;

    pub const WARNING: Color = Color::Yellow;

    /// Selected item highlight
    pub const SELECTED_BG: Color = Color::Yellow;

    /// Selected item text (for contrast on yellow bg)
    pub const SELECTED_FG: Color = Color::Black;

    pub const UNSELECTED: Color = Color::Gray;

    /// Keybinding hints
    pub const NAV_HINT: Color = Color::DarkGray;
}

// =============================================================================
// STYLES
// =============================================================================

/// Pre-built styles
pub struct Styles;

impl Styles {
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    /// Main title style (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::PRIMARY)
    }

    pub fn panel_bg() -> Style {
        Style::default().bg(Colors::BG_PRIMARY)
    }

    /// Highlighted menu row
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn unselected() -> Style {
        Style::default().fg(Colors::UNSELECTED)
    }

    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::NAV_HINT)
    }
}

// =============================================================================
// UI TEXT
// =============================================================================

/// Fixed strings of the menu screen
pub struct UiText;

impl UiText {
    pub const APP_TITLE: &'static str = " Camera Configuration ";

    pub const NAV_HINTS: &'static str =
        "↑/↓ move  ←/→ page  Enter/Space select  Esc back  Ctrl-C quit";

    pub const PRESS_ANY_KEY: &'static str = "Press any key to continue";
}
