//! Segment - the atomic rendering unit.
//!
//! Rendering turns a text and its spans into a left-to-right sequence of
//! segments. A segment borrows a slice of the original text and is either
//! plain or highlighted; concatenating every segment's text gives back the
//! original text.

use std::fmt;

use serde::Serialize;

use crate::category::{Category, CategoryStyle};

/// Display attributes of a highlighted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    /// Recognized category, `None` when the span's tag was missing or unknown.
    pub category: Option<Category>,
    /// Swatch colors.
    #[serde(flatten)]
    pub style: CategoryStyle,
    /// Hover text; may be empty.
    pub tooltip: String,
}

/// A contiguous run of rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment<'a> {
    /// The text content, borrowed from the rendered text.
    pub text: &'a str,
    /// Highlight attributes (None = plain text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
}

impl<'a> Segment<'a> {
    /// Create a plain segment.
    #[must_use]
    pub const fn plain(text: &'a str) -> Self {
        Self {
            text,
            highlight: None,
        }
    }

    /// Create a highlighted segment.
    #[must_use]
    pub const fn highlighted(text: &'a str, highlight: Highlight) -> Self {
        Self {
            text,
            highlight: Some(highlight),
        }
    }

    /// Check if this segment is highlighted.
    #[must_use]
    pub const fn is_highlight(&self) -> bool {
        self.highlight.is_some()
    }

    /// Check if this segment is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

// ============================================================================
// Segment Operations
// ============================================================================

/// Concatenate the text of all segments.
#[must_use]
pub fn plain_text(segments: &[Segment<'_>]) -> String {
    segments.iter().map(|s| s.text).collect()
}

/// Iterate over the highlighted segments only.
pub fn highlights<'s, 'a>(
    segments: &'s [Segment<'a>],
) -> impl Iterator<Item = (&'a str, &'s Highlight)> + 's {
    segments
        .iter()
        .filter_map(|s| s.highlight.as_ref().map(|h| (s.text, h)))
}
