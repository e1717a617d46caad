//! Color theme and styling definitions using ratatui colors
//!
//! Styles for the three row tiers, the match overlay and the list chrome.

use ratatui::style::{Color, Modifier, Style};

/// Color theme for terminal UI elements
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub normal_title: Style,
    pub normal_desc: Style,

    pub selected_title: Style,
    pub selected_desc: Style,
    /// Left bar drawn in front of the selected row
    pub selected_border: Style,

    /// "Type to search" tier
    pub dimmed_title: Style,
    pub dimmed_desc: Style,

    /// Patched over the tier style for matched characters
    pub filter_match: Style,

    pub title_bar: Style,
    pub filter_prompt: Style,
    pub filter_cursor: Style,
    pub status: Style,
    pub status_alert: Style,
    pub pagination_active: Style,
    pub pagination_inactive: Style,
    pub help: Style,
}

impl Default for ColorTheme {
    fn default() -> Self {
        let purple = Color::Rgb(0xAD, 0x58, 0xB4);
        Self {
            normal_title: Style::default().fg(Color::Rgb(0xDD, 0xDD, 0xDD)),
            normal_desc: Style::default().fg(Color::Rgb(0x77, 0x77, 0x77)),
            selected_title: Style::default().fg(Color::Rgb(0xEE, 0x6F, 0xF8)),
            selected_desc: Style::default().fg(purple),
            selected_border: Style::default().fg(purple),
            dimmed_title: Style::default().fg(Color::Rgb(0x77, 0x77, 0x77)),
            dimmed_desc: Style::default().fg(Color::Rgb(0x4D, 0x4D, 0x4D)),
            filter_match: Style::default().add_modifier(Modifier::UNDERLINED),
            title_bar: Style::default()
                .fg(Color::Rgb(0xFF, 0xFD, 0xF5))
                .bg(Color::Rgb(0x5A, 0x56, 0xE0)),
            filter_prompt: Style::default().fg(Color::Rgb(0xEC, 0xFD, 0x65)),
            filter_cursor: Style::default().fg(Color::Rgb(0xEE, 0x6F, 0xF8)),
            status: Style::default().fg(Color::Rgb(0x77, 0x77, 0x77)),
            status_alert: Style::default().fg(Color::Red),
            pagination_active: Style::default().fg(Color::Rgb(0x84, 0x7A, 0x85)),
            pagination_inactive: Style::default().fg(Color::Rgb(0x3C, 0x3C, 0x3C)),
            help: Style::default().fg(Color::Rgb(0x62, 0x62, 0x62)),
        }
    }
}

impl ColorTheme {
    /// Theme that relies on modifiers only, for `NO_COLOR` terminals
    pub fn monochrome() -> Self {
        let plain = Style::default();
        let dim = Style::default().add_modifier(Modifier::DIM);
        Self {
            normal_title: plain,
            normal_desc: dim,
            selected_title: Style::default().add_modifier(Modifier::BOLD),
            selected_desc: plain,
            selected_border: Style::default().add_modifier(Modifier::BOLD),
            dimmed_title: dim,
            dimmed_desc: dim,
            filter_match: Style::default().add_modifier(Modifier::UNDERLINED),
            title_bar: Style::default().add_modifier(Modifier::REVERSED),
            filter_prompt: Style::default().add_modifier(Modifier::BOLD),
            filter_cursor: plain,
            status: dim,
            status_alert: Style::default().add_modifier(Modifier::BOLD),
            pagination_active: Style::default().add_modifier(Modifier::BOLD),
            pagination_inactive: dim,
            help: dim,
        }
    }

    /// Pick the monochrome theme when the `NO_COLOR` convention asks for it.
    pub fn from_env() -> Self {
        match std::env::var_os("NO_COLOR") {
            Some(value) if !value.is_empty() => Self::monochrome(),
            _ => Self::default(),
        }
    }
}
