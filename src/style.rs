//! Visual styles for terminal and HTML output.
//!
//! A `Style` carries the colors and text attributes applied to a run of
//! text. Highlight styles are built from the category table (see
//! [`crate::category`]); the logger uses parsed styles such as `"bold red"`
//! for its level badges.

use bitflags::bitflags;
use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{LazyLock, Mutex};

use crate::color::{Color, ColorParseError, ColorSystem};
use crate::sync::lock_recover;

bitflags! {
    /// Text attribute flags, one per SGR code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attributes: u8 {
        const BOLD      = 1 << 0;
        const DIM       = 1 << 1;
        const ITALIC    = 1 << 2;
        const UNDERLINE = 1 << 3;
        const REVERSE   = 1 << 4;
        const STRIKE    = 1 << 5;
    }
}

/// Attribute flag, style-string keyword, SGR code.
const ATTRIBUTE_TABLE: [(Attributes, &str, u8); 6] = [
    (Attributes::BOLD, "bold", 1),
    (Attributes::DIM, "dim", 2),
    (Attributes::ITALIC, "italic", 3),
    (Attributes::UNDERLINE, "underline", 4),
    (Attributes::REVERSE, "reverse", 7),
    (Attributes::STRIKE, "strike", 9),
];

/// Colors and attributes for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub color: Option<Color>,
    pub bgcolor: Option<Color>,
    pub attributes: Attributes,
}

impl Style {
    /// A style that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when rendering with this style leaves text untouched.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.color.is_none() && self.bgcolor.is_none() && self.attributes.is_empty()
    }

    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn bgcolor(mut self, color: Color) -> Self {
        self.bgcolor = Some(color);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.attributes |= Attributes::BOLD;
        self
    }

    #[must_use]
    pub fn dim(mut self) -> Self {
        self.attributes |= Attributes::DIM;
        self
    }

    /// SGR parameter list for this style, colors downgraded to `color_system`.
    #[must_use]
    pub fn sgr(&self, color_system: ColorSystem) -> String {
        let attributes = ATTRIBUTE_TABLE
            .iter()
            .filter(|(flag, _, _)| self.attributes.contains(*flag))
            .map(|(_, _, code)| code.to_string());
        let colors = [(self.color, true), (self.bgcolor, false)]
            .into_iter()
            .filter_map(|(color, foreground)| {
                color.map(|c| c.downgrade(color_system).sgr(foreground))
            });
        attributes.chain(colors).collect::<Vec<_>>().join(";")
    }

    /// Wrap `text` in the escape sequence for this style and a reset.
    #[must_use]
    pub fn render(&self, text: &str, color_system: ColorSystem) -> String {
        if self.is_plain() {
            return text.to_string();
        }
        format!("\x1b[{}m{text}\x1b[0m", self.sgr(color_system))
    }

    /// Inline CSS declarations for this style.
    ///
    /// Only colors and attributes are emitted; layout properties belong to
    /// the caller.
    #[must_use]
    pub fn css(&self) -> String {
        let mut rules = Vec::new();
        if let Some(bgcolor) = self.bgcolor.filter(|c| !c.is_default()) {
            rules.push(format!("background: {}", bgcolor.triplet().hex()));
        }
        if let Some(color) = self.color.filter(|c| !c.is_default()) {
            rules.push(format!("color: {}", color.triplet().hex()));
        }
        for (flag, rule) in [
            (Attributes::BOLD, "font-weight: bold"),
            (Attributes::ITALIC, "font-style: italic"),
            (Attributes::UNDERLINE, "text-decoration: underline"),
        ] {
            if self.attributes.contains(flag) {
                rules.push(rule.to_string());
            }
        }
        rules.join("; ")
    }

    /// Parse a style string such as `"bold black on #ffd166"` (cached).
    ///
    /// Words are attribute keywords, a foreground color, or `on` followed by
    /// a background color. `""` and `"none"` give the plain style.
    ///
    /// # Errors
    ///
    /// Returns `StyleParseError` for unknown words or bad colors.
    pub fn parse(style: &str) -> Result<Self, StyleParseError> {
        static CACHE: LazyLock<Mutex<LruCache<String, Style>>> =
            LazyLock::new(|| Mutex::new(LruCache::new(NonZeroUsize::MIN.saturating_add(31))));

        let normalized = style.trim().to_lowercase();
        if let Some(cached) = lock_recover(&CACHE).get(&normalized) {
            return Ok(*cached);
        }

        let parsed = Self::parse_uncached(&normalized)?;
        lock_recover(&CACHE).put(normalized, parsed);
        Ok(parsed)
    }

    fn parse_uncached(style: &str) -> Result<Self, StyleParseError> {
        let mut parsed = Self::new();
        if style == "none" {
            return Ok(parsed);
        }

        let mut words = style.split_whitespace();
        while let Some(word) = words.next() {
            if word == "on" {
                let color = words.next().ok_or(StyleParseError::MissingBackground)?;
                parsed.bgcolor = Some(Color::parse(color)?);
            } else if let Some(flag) = attribute_named(word) {
                parsed.attributes |= flag;
            } else {
                let color = Color::parse(word)
                    .map_err(|_| StyleParseError::UnknownWord(word.to_string()))?;
                parsed.color = Some(color);
            }
        }
        Ok(parsed)
    }
}

fn attribute_named(word: &str) -> Option<Attributes> {
    ATTRIBUTE_TABLE
        .iter()
        .find(|(_, name, _)| *name == word)
        .map(|(flag, _, _)| *flag)
}

/// Error type for style parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleParseError {
    /// `on` was the last word.
    MissingBackground,
    UnknownWord(String),
    Color(ColorParseError),
}

impl fmt::Display for StyleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBackground => write!(f, "'on' requires a color"),
            Self::UnknownWord(s) => write!(f, "Unknown style word: {s}"),
            Self::Color(e) => write!(f, "Color error: {e}"),
        }
    }
}

impl std::error::Error for StyleParseError {}

impl From<ColorParseError> for StyleParseError {
    fn from(err: ColorParseError) -> Self {
        Self::Color(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTriplet;

    #[test]
    fn test_plain_style_renders_text_unchanged() {
        let style = Style::parse("none").unwrap();
        assert!(style.is_plain());
        assert_eq!(style, Style::parse("").unwrap());
        assert_eq!(style.render("text", ColorSystem::TrueColor), "text");
    }

    #[test]
    fn test_render_truecolor_background() {
        let style = Style::new()
            .color(Color::Ansi(0))
            .bgcolor(Color::Rgb(ColorTriplet::new(0x9b, 0xf6, 0xff)));
        assert_eq!(
            style.render("Troponin", ColorSystem::TrueColor),
            "\x1b[30;48;2;155;246;255mTroponin\x1b[0m"
        );
    }

    #[test]
    fn test_attributes_come_before_colors() {
        let style = Style::parse("red italic bold").unwrap();
        assert_eq!(style.sgr(ColorSystem::Standard), "1;3;31");
    }

    #[test]
    fn test_parse_combined() {
        let style = Style::parse("bold black on #ffd166").unwrap();
        assert_eq!(style.attributes, Attributes::BOLD);
        assert_eq!(style.color, Some(Color::Ansi(0)));
        assert_eq!(style.bgcolor, Some(Color::Rgb(ColorTriplet::new(0xff, 0xd1, 0x66))));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Style::parse("on"), Err(StyleParseError::MissingBackground));
        assert_eq!(
            Style::parse("sparkly"),
            Err(StyleParseError::UnknownWord("sparkly".to_string()))
        );
        assert!(matches!(Style::parse("on #12"), Err(StyleParseError::Color(_))));
    }

    #[test]
    fn test_css_declarations() {
        let style = Style::new()
            .color(Color::Ansi(0))
            .bgcolor(Color::Rgb(ColorTriplet::new(0x44, 0x44, 0x44)))
            .bold();
        assert_eq!(
            style.css(),
            "background: #444444; color: #000000; font-weight: bold"
        );
    }
}
