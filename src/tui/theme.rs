//! Theme definitions for the TUI
//!
//! This module provides colorblind-safe themes for both dark and light terminals.
//! The default is "dark" but users can configure "light" via config file or env var.

use ratatui::style::Color;

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => ThemeName::Light,
            _ => ThemeName::Dark,
        }
    }
}

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,

    // Base colors
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    // Status colors (colorblind-safe)
    pub ok: Color,
    pub warn: Color,
    pub error: Color,

    // Table cells
    pub host: Color,
    pub services: Color,
    pub link: Color,

    // UI elements
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub input_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create a dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,

            fg: Color::White,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            // Blue-ish positive, orange warning, distinct brightness levels
            ok: Color::Rgb(0, 200, 0),
            warn: Color::Rgb(255, 180, 0),
            error: Color::Rgb(255, 80, 80),

            host: Color::White,
            services: Color::Rgb(80, 160, 255),
            link: Color::Cyan,

            selected_bg: Color::Rgb(60, 60, 80),
            selected_fg: Color::White,
            header_bg: Color::Rgb(40, 80, 120),
            header_fg: Color::White,
            input_bg: Color::Rgb(30, 30, 40),
        }
    }

    /// Create a light theme
    /// Uses darker, more saturated colors for visibility on light backgrounds
    pub fn light() -> Self {
        Self {
            name: ThemeName::Light,

            fg: Color::Black,
            muted: Color::Rgb(100, 100, 100),
            border: Color::Rgb(120, 120, 120),
            border_focused: Color::Rgb(0, 100, 180),

            ok: Color::Rgb(0, 140, 0),
            warn: Color::Rgb(200, 120, 0),
            error: Color::Rgb(200, 0, 0),

            host: Color::Black,
            services: Color::Rgb(0, 80, 180),
            link: Color::Rgb(0, 100, 180),

            selected_bg: Color::Rgb(200, 220, 255),
            selected_fg: Color::Black,
            header_bg: Color::Rgb(180, 200, 230),
            header_fg: Color::Black,
            input_bg: Color::Rgb(235, 235, 235),
        }
    }

    /// Create theme from name string
    pub fn from_name(name: &str) -> Self {
        match ThemeName::parse(name) {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    /// Color for a toast or status message
    pub fn status_color(&self, success: bool) -> Color {
        if success { self.ok } else { self.error }
    }
}
