//! Colors for highlight backgrounds and terminal output.
//!
//! Category swatches are 24-bit [`ColorTriplet`]s. On a terminal they are
//! wrapped in a [`Color`] and downgraded to the capability reported by
//! [`ColorSystem`]: 16 ANSI colors, the 256-color palette, or true color.
//!
//! # Examples
//!
//! ```
//! use doctalk::color::{Color, ColorSystem};
//!
//! let diagnosis = Color::parse("#ffd166").unwrap();
//! let eight_bit = diagnosis.downgrade(ColorSystem::EightBit);
//! assert!(eight_bit.sgr(false).starts_with("48;5;"));
//! ```

use lru::LruCache;
use serde::{Serialize, Serializer};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{LazyLock, Mutex};

use crate::sync::lock_recover;

/// RGB color triplet with values 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorTriplet {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorTriplet {
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// CSS hex form, `#rrggbb`.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    fn channels(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

// Triplets travel as CSS hex strings in JSON output.
impl Serialize for ColorTriplet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

/// Terminal color capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSystem {
    /// 16 ANSI colors.
    #[default]
    Standard,
    /// 256-color palette.
    EightBit,
    /// 24-bit RGB.
    TrueColor,
}

/// A terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's own foreground or background.
    #[default]
    Default,
    /// Palette entry: 0-15 are the ANSI colors, 16-255 the extended palette.
    Ansi(u8),
    /// 24-bit color.
    Rgb(ColorTriplet),
}

impl Color {
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// RGB value of this color. The terminal default reads as black.
    #[must_use]
    pub fn triplet(self) -> ColorTriplet {
        match self {
            Self::Default => ColorTriplet::default(),
            Self::Ansi(number) => palette_triplet(number),
            Self::Rgb(triplet) => triplet,
        }
    }

    /// SGR parameters selecting this color, joined with `;`.
    ///
    /// `foreground` picks between the 3x (text) and 4x (background) families.
    #[must_use]
    pub fn sgr(self, foreground: bool) -> String {
        let base: u8 = if foreground { 30 } else { 40 };
        match self {
            Self::Default => (base + 9).to_string(),
            Self::Ansi(number @ 0..=7) => (base + number).to_string(),
            Self::Ansi(number @ 8..=15) => (base + 60 + number - 8).to_string(),
            Self::Ansi(number) => format!("{};5;{number}", base + 8),
            Self::Rgb(ColorTriplet { red, green, blue }) => {
                format!("{};2;{red};{green};{blue}", base + 8)
            }
        }
    }

    /// Nearest equivalent that `system` can display.
    #[must_use]
    pub fn downgrade(self, system: ColorSystem) -> Self {
        match (self, system) {
            (Self::Rgb(triplet), ColorSystem::EightBit) => Self::Ansi(rgb_to_eight_bit(triplet)),
            (Self::Rgb(_), ColorSystem::Standard) => Self::Ansi(rgb_to_standard(self.triplet())),
            (Self::Ansi(number), ColorSystem::Standard) if number > 15 => {
                Self::Ansi(rgb_to_standard(self.triplet()))
            }
            _ => self,
        }
    }

    /// Parse a color name (cached).
    ///
    /// Accepts `default`, the sixteen ANSI names (`red`, `bright_blue`,
    /// `grey`) and hex (`#ff0000`, `#f00`). Case and surrounding whitespace
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ColorParseError` for anything else.
    pub fn parse(color: &str) -> Result<Self, ColorParseError> {
        static CACHE: LazyLock<Mutex<LruCache<String, Color>>> =
            LazyLock::new(|| Mutex::new(LruCache::new(NonZeroUsize::MIN.saturating_add(127))));

        let normalized = color.trim().to_lowercase();
        if let Some(cached) = lock_recover(&CACHE).get(&normalized) {
            return Ok(*cached);
        }

        let parsed = Self::parse_uncached(&normalized)?;
        lock_recover(&CACHE).put(normalized, parsed);
        Ok(parsed)
    }

    fn parse_uncached(color: &str) -> Result<Self, ColorParseError> {
        if color.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if color == "default" {
            return Ok(Self::Default);
        }
        if let Some(digits) = color.strip_prefix('#') {
            return parse_hex(digits)
                .map(Self::Rgb)
                .ok_or_else(|| ColorParseError::InvalidHex(color.to_string()));
        }
        ANSI_NAMES
            .iter()
            .find(|(name, _)| *name == color)
            .map(|&(_, number)| Self::Ansi(number))
            .ok_or_else(|| ColorParseError::UnknownColor(color.to_string()))
    }
}

/// Parse `rrggbb` or the `rgb` shorthand.
fn parse_hex(digits: &str) -> Option<ColorTriplet> {
    let nibbles: Vec<u8> = digits
        .chars()
        .map(|c| c.to_digit(16).and_then(|d| u8::try_from(d).ok()))
        .collect::<Option<_>>()?;
    match nibbles[..] {
        [r1, r2, g1, g2, b1, b2] => Some(ColorTriplet::new((r1 << 4) | r2, (g1 << 4) | g2, (b1 << 4) | b2)),
        [r, g, b] => Some(ColorTriplet::new(r * 17, g * 17, b * 17)),
        _ => None,
    }
}

/// Error type for color parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    Empty,
    InvalidHex(String),
    UnknownColor(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty color string"),
            Self::InvalidHex(s) => write!(f, "Invalid hex color: {s}"),
            Self::UnknownColor(s) => write!(f, "Unknown color: {s}"),
        }
    }
}

impl std::error::Error for ColorParseError {}

// ============================================================================
// Palettes
// ============================================================================

/// Reference RGB values of the sixteen ANSI colors.
pub const STANDARD_PALETTE: [ColorTriplet; 16] = [
    ColorTriplet::new(0, 0, 0),
    ColorTriplet::new(170, 0, 0),
    ColorTriplet::new(0, 170, 0),
    ColorTriplet::new(170, 85, 0),
    ColorTriplet::new(0, 0, 170),
    ColorTriplet::new(170, 0, 170),
    ColorTriplet::new(0, 170, 170),
    ColorTriplet::new(170, 170, 170),
    ColorTriplet::new(85, 85, 85),
    ColorTriplet::new(255, 85, 85),
    ColorTriplet::new(85, 255, 85),
    ColorTriplet::new(255, 255, 85),
    ColorTriplet::new(85, 85, 255),
    ColorTriplet::new(255, 85, 255),
    ColorTriplet::new(85, 255, 255),
    ColorTriplet::new(255, 255, 255),
];

/// Channel levels of the 6x6x6 cube at palette entries 16-231.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

const ANSI_NAMES: [(&str, u8); 18] = [
    ("black", 0),
    ("red", 1),
    ("green", 2),
    ("yellow", 3),
    ("blue", 4),
    ("magenta", 5),
    ("cyan", 6),
    ("white", 7),
    ("bright_black", 8),
    ("grey", 8),
    ("gray", 8),
    ("bright_red", 9),
    ("bright_green", 10),
    ("bright_yellow", 11),
    ("bright_blue", 12),
    ("bright_magenta", 13),
    ("bright_cyan", 14),
    ("bright_white", 15),
];

/// RGB value of a 256-color palette entry.
fn palette_triplet(number: u8) -> ColorTriplet {
    match number {
        0..=15 => STANDARD_PALETTE[usize::from(number)],
        16..=231 => {
            let index = number - 16;
            let level = |i: u8| CUBE_LEVELS[usize::from(i)];
            ColorTriplet::new(level(index / 36), level(index / 6 % 6), level(index % 6))
        }
        _ => {
            let gray = 8 + (number - 232) * 10;
            ColorTriplet::new(gray, gray, gray)
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Nearest 256-color palette entry.
///
/// Near-neutral colors go to the grayscale ramp (232-255), everything else
/// to the color cube.
#[must_use]
pub fn rgb_to_eight_bit(triplet: ColorTriplet) -> u8 {
    let channels = triplet.channels();
    let spread = channels.iter().max().copied().unwrap_or(0) - channels.iter().min().copied().unwrap_or(0);

    if spread < 16 {
        let level = channels.iter().map(|&c| u16::from(c)).sum::<u16>() / 3;
        return match level {
            0..=3 => 16,
            244..=u16::MAX => 231,
            _ => 232 + u8::try_from((level - 3) / 10).map_or(23, |step| step.min(23)),
        };
    }

    let [red, green, blue] = channels.map(nearest_cube_level);
    16 + 36 * red + 6 * green + blue
}

fn nearest_cube_level(value: u8) -> u8 {
    (0u8..6)
        .min_by_key(|&i| CUBE_LEVELS[usize::from(i)].abs_diff(value))
        .unwrap_or(0)
}

/// Nearest of the sixteen ANSI colors.
#[must_use]
pub fn rgb_to_standard(triplet: ColorTriplet) -> u8 {
    (0u8..)
        .zip(STANDARD_PALETTE)
        .min_by_key(|&(_, candidate)| color_distance(triplet, candidate))
        .map_or(0, |(number, _)| number)
}

/// Red-weighted ("redmean") squared distance between two colors.
fn color_distance(a: ColorTriplet, b: ColorTriplet) -> u32 {
    let red_mean = u32::midpoint(u32::from(a.red), u32::from(b.red));
    let [dr, dg, db] = [
        a.red.abs_diff(b.red),
        a.green.abs_diff(b.green),
        a.blue.abs_diff(b.blue),
    ]
    .map(|d| u32::from(d) * u32::from(d));

    (((512 + red_mean) * dr) >> 8) + 4 * dg + (((767 - red_mean) * db) >> 8)
}
