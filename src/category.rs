//! Entity categories and their highlight styles.
//!
//! The detect API tags every span with one of six categories. Each category
//! maps to a fixed background swatch; anything else (an unknown tag, or no
//! tag at all) gets [`DEFAULT_STYLE`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::color::{Color, ColorTriplet};
use crate::style::Style;

/// Clinical entity category reported by the detect API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Diagnosis,
    Procedure,
    Medication,
    Test,
    Anatomy,
    Measurement,
}

/// Colors used to paint a highlighted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryStyle {
    pub background: ColorTriplet,
    pub foreground: ColorTriplet,
}

const INK: ColorTriplet = ColorTriplet::new(0, 0, 0);

impl CategoryStyle {
    const fn swatch(red: u8, green: u8, blue: u8) -> Self {
        Self {
            background: ColorTriplet::new(red, green, blue),
            foreground: INK,
        }
    }

    /// Terminal style for this swatch.
    #[must_use]
    pub fn to_style(&self) -> Style {
        Style::new()
            .color(Color::Rgb(self.foreground))
            .bgcolor(Color::Rgb(self.background))
    }
}

/// Style for spans whose category is missing or unrecognized.
pub const DEFAULT_STYLE: CategoryStyle = CategoryStyle::swatch(0x44, 0x44, 0x44);

/// Category to swatch table, in legend order.
const CATEGORY_STYLES: [(Category, CategoryStyle); 6] = [
    (Category::Diagnosis, CategoryStyle::swatch(0xff, 0xd1, 0x66)),
    (Category::Procedure, CategoryStyle::swatch(0xa0, 0xc4, 0xff)),
    (Category::Medication, CategoryStyle::swatch(0xbd, 0xb2, 0xff)),
    (Category::Test, CategoryStyle::swatch(0x9b, 0xf6, 0xff)),
    (Category::Anatomy, CategoryStyle::swatch(0xca, 0xff, 0xbf)),
    (Category::Measurement, CategoryStyle::swatch(0xff, 0xad, 0xad)),
];

impl Category {
    /// Every category, in legend order.
    pub const ALL: [Category; 6] = [
        Self::Diagnosis,
        Self::Procedure,
        Self::Medication,
        Self::Test,
        Self::Anatomy,
        Self::Measurement,
    ];

    /// Wire name of the category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Diagnosis => "diagnosis",
            Self::Procedure => "procedure",
            Self::Medication => "medication",
            Self::Test => "test",
            Self::Anatomy => "anatomy",
            Self::Measurement => "measurement",
        }
    }

    /// Look up a category by its exact wire name.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Highlight style for this category.
    #[must_use]
    pub fn style(self) -> CategoryStyle {
        CATEGORY_STYLES
            .iter()
            .find(|(category, _)| *category == self)
            .map_or(DEFAULT_STYLE, |(_, style)| *style)
    }
}

/// Resolve a raw category tag to its style, falling back to [`DEFAULT_STYLE`].
#[must_use]
pub fn style_for(label: Option<&str>) -> CategoryStyle {
    label
        .and_then(Category::from_label)
        .map_or(DEFAULT_STYLE, Category::style)
}

/// Legend entries: each category with its swatch.
pub fn legend() -> impl Iterator<Item = (Category, CategoryStyle)> {
    CATEGORY_STYLES.into_iter()
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_category() {
        for category in Category::ALL {
            assert_ne!(category.style(), DEFAULT_STYLE, "{category} has no swatch");
        }
        assert_eq!(legend().count(), Category::ALL.len());
    }

    #[test]
    fn test_known_swatches() {
        assert_eq!(Category::Test.style().background.hex(), "#9bf6ff");
        assert_eq!(Category::Diagnosis.style().background.hex(), "#ffd166");
        assert_eq!(Category::Measurement.style().foreground.hex(), "#000000");
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(Category::from_label("anatomy"), Some(Category::Anatomy));
        assert_eq!(Category::from_label("Anatomy"), None);
        assert_eq!(Category::from_label(" test"), None);
        assert!("dosage".parse::<Category>().is_err());
    }

    #[test]
    fn test_style_for_falls_back_to_default() {
        assert_eq!(style_for(None), DEFAULT_STYLE);
        assert_eq!(style_for(Some("x")), DEFAULT_STYLE);
        assert_eq!(style_for(Some("procedure")), Category::Procedure.style());
        assert_eq!(DEFAULT_STYLE.background.hex(), "#444444");
    }

    #[test]
    fn test_label_round_trips_through_serde() {
        let json = serde_json::to_string(&Category::Medication).unwrap();
        assert_eq!(json, "\"medication\"");
    }
}
