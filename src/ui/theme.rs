//! Colour palette and text styles used across the UI.
//!
//! Page colours are plain RGB so a partly revealed element can be drawn by
//! blending toward the background.

use ratatui::style::{Color, Modifier, Style};

pub type Rgb = (u8, u8, u8);

/// Central theme: change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── page ───────────────────────────────────────────────────
    pub const BACKGROUND: Rgb = (18, 18, 24);
    pub const TEXT: Rgb = (226, 226, 232);
    pub const HEADING: Rgb = (255, 196, 0);
    pub const CARD_BORDER: Rgb = (96, 104, 128);
    pub const OPEN: Rgb = (80, 200, 120);
    pub const CLOSED: Rgb = (230, 90, 90);

    /// `color` drawn at `opacity` over the page background.
    pub fn fade(color: Rgb, opacity: f64) -> Color {
        let a = opacity.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (bg as f64 + (fg as f64 - bg as f64) * a).round() as u8;
        let bg = Self::BACKGROUND;
        Color::Rgb(mix(color.0, bg.0), mix(color.1, bg.1), mix(color.2, bg.2))
    }

    pub fn page_style() -> Style {
        let (r, g, b) = Self::BACKGROUND;
        Style::default().bg(Color::Rgb(r, g, b))
    }

    pub fn heading_style(opacity: f64) -> Style {
        Style::default()
            .fg(Self::fade(Self::HEADING, opacity))
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_style(opacity: f64) -> Style {
        Style::default().fg(Self::fade(Self::TEXT, opacity))
    }

    pub fn card_border_style(opacity: f64) -> Style {
        Style::default().fg(Self::fade(Self::CARD_BORDER, opacity))
    }

    pub fn store_status_style(is_open: bool, opacity: f64) -> Style {
        let color = if is_open { Self::OPEN } else { Self::CLOSED };
        Style::default()
            .fg(Self::fade(color, opacity))
            .add_modifier(Modifier::ITALIC)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
