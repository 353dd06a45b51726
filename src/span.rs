//! Annotation spans returned by the detect API.
//!
//! Spans come from an external service and are treated as untrusted:
//! offsets may be negative, past the end of the text, reversed, or not
//! integers at all. Decoding never fails as a whole. A span element that
//! cannot be read is dropped, and a readable span is checked against the text
//! it annotates by [`is_valid`] / [`Span::clamp`] at render time.
//!
//! Offsets index the text's characters (Unicode scalar values), both ends
//! inclusive.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::category::{Category, CategoryStyle, style_for};
use crate::tooltip::TooltipFields;

/// A candidate annotation over a character range of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// First character, inclusive.
    #[serde(deserialize_with = "integral_offset")]
    pub start: i64,
    /// Last character, inclusive.
    #[serde(deserialize_with = "integral_offset")]
    pub end: i64,
    /// Raw category tag; see [`Category`] for the recognized set.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Normalized concept name.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    /// The concept was detected but is stated as absent.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub negated: bool,
    /// Plain-language explanation.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// Character range of a span after clamping to the text, `end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedRange {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a span over `start..=end` with a category tag.
    #[must_use]
    pub fn new(start: i64, end: i64, category: impl Into<String>) -> Self {
        Self {
            start,
            end,
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Set the canonical concept name.
    #[must_use]
    pub fn canonical(mut self, canonical: impl Into<String>) -> Self {
        self.canonical = Some(canonical.into());
        self
    }

    /// Set the definition.
    #[must_use]
    pub fn definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    /// Mark the concept as negated.
    #[must_use]
    pub fn negated(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    /// Raw length used to order spans that share a start offset.
    #[must_use]
    pub const fn extent(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// Recognized category, if any.
    #[must_use]
    pub fn category_kind(&self) -> Option<Category> {
        self.category.as_deref().and_then(Category::from_label)
    }

    /// Highlight style, falling back to the default swatch.
    #[must_use]
    pub fn style(&self) -> CategoryStyle {
        style_for(self.category.as_deref())
    }

    /// Borrow the fields that make up the tooltip.
    #[must_use]
    pub fn tooltip_fields(&self) -> TooltipFields<'_> {
        TooltipFields {
            canonical: self.canonical.as_deref(),
            category: self.category.as_deref(),
            negated: self.negated,
            definition: self.definition.as_deref(),
        }
    }

    /// Clamp the span to a text of `text_len` characters.
    ///
    /// `start` is raised to 0 and `end` lowered to the last character.
    /// Returns `None` when nothing usable remains: the text is empty,
    /// `start > end`, or `start` lies past the end of the text.
    #[must_use]
    pub fn clamp(&self, text_len: usize) -> Option<ClampedRange> {
        let last = i64::try_from(text_len).ok()?.checked_sub(1)?;
        let start = self.start.max(0);
        let end = self.end.min(last);
        if start > end || start > last {
            return None;
        }
        Some(ClampedRange {
            start: usize::try_from(start).ok()?,
            end: usize::try_from(end).ok()?,
        })
    }
}

/// Whether a span can be rendered against a text of `text_len` characters.
#[must_use]
pub fn is_valid(span: &Span, text_len: usize) -> bool {
    span.clamp(text_len).is_some()
}

/// Extract spans from a detect response body.
///
/// Anything other than an object with a `spans` array yields no spans.
/// Array elements that are not readable spans are dropped one by one.
#[must_use]
pub fn spans_from_value(body: &Value) -> Vec<Span> {
    let Some(items) = body.get("spans").and_then(Value::as_array) else {
        log::debug!("detect response has no spans array; treating as empty");
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match Span::deserialize(item) {
            Ok(span) => Some(span),
            Err(err) => {
                log::trace!("dropping span #{index}: {err}");
                None
            }
        })
        .collect()
}

/// Convert a JSON number to an offset if it holds an integer.
///
/// Integral floats such as `3.0` are accepted; `NaN`, fractions and
/// non-numbers are not.
#[must_use]
pub fn offset_from_value(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let n = value.as_f64()?;
    if !n.is_finite() || n.fract() != 0.0 {
        return None;
    }
    #[expect(clippy::cast_possible_truncation, reason = "saturating cast of an integral value")]
    let n = n as i64;
    Some(n)
}

fn integral_offset<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    offset_from_value(&value)
        .ok_or_else(|| de::Error::custom(format!("offset is not an integer: {value}")))
}

// Wrong-typed metadata degrades to "absent" instead of rejecting the span.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}
