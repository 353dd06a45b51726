//! Terminal detection.
//!
//! Decides whether highlights can be painted with color, and how wide the
//! legend may be.

use std::io::IsTerminal;

use crate::color::ColorSystem;

struct TermSettings {
    no_color: Option<String>,
    force_color: Option<String>,
    colorterm: Option<String>,
    term: Option<String>,
}

fn read_term_settings() -> TermSettings {
    TermSettings {
        no_color: std::env::var("NO_COLOR").ok(),
        force_color: std::env::var("FORCE_COLOR").ok(),
        colorterm: std::env::var("COLORTERM").ok(),
        term: std::env::var("TERM").ok(),
    }
}

/// Get the terminal width in cells.
///
/// Returns a default of 80 if the width cannot be determined.
#[must_use]
pub fn get_terminal_width() -> usize {
    crossterm::terminal::size().map_or(80, |(w, _)| usize::from(w))
}

fn force_color_forces_terminal(force_color: Option<&str>) -> bool {
    force_color
        .map(str::trim)
        .is_some_and(|value| !value.is_empty() && value != "0")
}

/// Detect the color system supported by stdout.
///
/// - `NO_COLOR` (non-empty): no color
/// - `COLORTERM=truecolor` or `24bit`: 24-bit color
/// - `TERM` suffix `-256color` / `-kitty`: 256 colors
/// - `TERM=dumb` or `TERM=unknown`: no color
/// - Otherwise: standard 16 colors when writing to a terminal
#[must_use]
pub fn detect_color_system() -> Option<ColorSystem> {
    let env = read_term_settings();
    let is_tty = force_color_forces_terminal(env.force_color.as_deref())
        || std::io::stdout().is_terminal();
    detect_color_system_with(&env, is_tty)
}

fn detect_color_system_with(env: &TermSettings, is_tty: bool) -> Option<ColorSystem> {
    if env.no_color.as_deref().is_some_and(|value| !value.is_empty()) {
        return None;
    }
    if !is_tty {
        return None;
    }

    if let Some(colorterm) = env.colorterm.as_deref() {
        let colorterm = colorterm.trim().to_lowercase();
        if colorterm == "truecolor" || colorterm == "24bit" {
            return Some(ColorSystem::TrueColor);
        }
    }

    let term = env
        .term
        .as_deref()
        .map(|value| value.trim().to_lowercase())
        .unwrap_or_default();
    if term == "dumb" || term == "unknown" {
        return None;
    }
    match term.rsplit('-').next().unwrap_or("") {
        "kitty" | "256color" => Some(ColorSystem::EightBit),
        _ => Some(ColorSystem::Standard),
    }
}
