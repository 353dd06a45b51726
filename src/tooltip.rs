//! Hover text for highlighted spans.

use smallvec::SmallVec;

/// The optional span metadata that feeds a tooltip.
///
/// Empty strings count as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TooltipFields<'a> {
    pub canonical: Option<&'a str>,
    pub category: Option<&'a str>,
    pub negated: bool,
    pub definition: Option<&'a str>,
}

/// Marker appended for concepts detected as clinically absent.
pub const NEGATED_MARKER: &str = "[not present]";

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Build the tooltip: `canonical (category) [not present] \u{2014} definition`.
///
/// Missing parts are skipped without leaving separators behind, so a span
/// with no metadata yields an empty string.
#[must_use]
pub fn format_tooltip(fields: &TooltipFields<'_>) -> String {
    let mut parts: SmallVec<[String; 4]> = SmallVec::new();
    if let Some(canonical) = present(fields.canonical) {
        parts.push(canonical.to_string());
    }
    if let Some(category) = present(fields.category) {
        parts.push(format!("({category})"));
    }
    if fields.negated {
        parts.push(NEGATED_MARKER.to_string());
    }
    if let Some(definition) = present(fields.definition) {
        parts.push(format!("\u{2014} {definition}"));
    }
    parts.join(" ")
}
