//! Span-to-segment rendering.
//!
//! [`render`] lays a set of untrusted spans over a text and produces a
//! gap-filled, non-overlapping sequence of plain and highlighted segments.
//! It never fails: spans that cannot be placed are skipped.

use crate::segment::{Highlight, Segment};
use crate::span::Span;
use crate::tooltip::format_tooltip;

/// Render `text` with the given spans highlighted.
///
/// Spans are placed in order of `start`; at equal starts the longer span
/// goes first. A span that begins inside an already highlighted region is
/// dropped whole, never split. Offsets are clamped to the text and spans
/// rejected by [`crate::span::is_valid`] are skipped.
///
/// Concatenating the returned segments reproduces `text` exactly.
///
/// # Examples
///
/// ```
/// use doctalk::render::render;
/// use doctalk::span::Span;
///
/// let text = "Troponin was checked.";
/// let segments = render(text, &[Span::new(0, 7, "test")]);
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].text, "Troponin");
/// assert_eq!(segments[1].text, " was checked.");
/// ```
#[must_use]
pub fn render<'a>(text: &'a str, spans: &[Span]) -> Vec<Segment<'a>> {
    if text.is_empty() {
        return Vec::new();
    }
    if spans.is_empty() {
        return vec![Segment::plain(text)];
    }

    // Byte offset of every character, plus the end of the text
    let mut byte_indices: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let length = byte_indices.len();
    byte_indices.push(text.len());
    let slice = |start: usize, end: usize| char_slice(text, &byte_indices, start, end);

    let mut ordered: Vec<&Span> = spans.iter().collect();
    ordered.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.extent().cmp(&a.extent()))
    });

    let mut result = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;

    for span in ordered {
        let Some(range) = span.clamp(length) else {
            log::trace!("skipping span {}..={}: outside text", span.start, span.end);
            continue;
        };
        if range.start < cursor {
            log::trace!(
                "skipping span {}..={}: overlaps highlight ending at {}",
                span.start,
                span.end,
                cursor - 1
            );
            continue;
        }

        if cursor < range.start {
            result.push(Segment::plain(slice(cursor, range.start)));
        }

        let highlight = Highlight {
            category: span.category_kind(),
            style: span.style(),
            tooltip: format_tooltip(&span.tooltip_fields()),
        };
        result.push(Segment::highlighted(slice(range.start, range.end + 1), highlight));
        cursor = range.end + 1;
    }

    if cursor < length {
        result.push(Segment::plain(slice(cursor, length)));
    }

    result
}

/// Slice `text` between two character positions.
fn char_slice<'a>(text: &'a str, byte_indices: &[usize], start: usize, end: usize) -> &'a str {
    &text[byte_indices[start]..byte_indices[end]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, DEFAULT_STYLE};
    use crate::segment::plain_text;

    fn texts<'a>(segments: &[Segment<'a>]) -> Vec<(&'a str, bool)> {
        segments.iter().map(|s| (s.text, s.is_highlight())).collect()
    }

    #[test]
    fn test_empty_text() {
        assert!(render("", &[Span::new(0, 3, "test")]).is_empty());
        assert!(render("", &[]).is_empty());
    }

    #[test]
    fn test_no_spans() {
        assert_eq!(render("hello", &[]), vec![Segment::plain("hello")]);
    }

    #[test]
    fn test_single_span_with_tail() {
        let segments = render("Troponin was checked.", &[Span::new(0, 7, "test")]);
        assert_eq!(texts(&segments), vec![("Troponin", true), (" was checked.", false)]);
        let highlight = segments[0].highlight.as_ref().unwrap();
        assert_eq!(highlight.category, Some(Category::Test));
        assert_eq!(highlight.style, Category::Test.style());
        assert_eq!(highlight.tooltip, "(test)");
    }

    #[test]
    fn test_end_offset_is_inclusive() {
        let segments = render("Troponin was checked.", &[Span::new(0, 8, "test")]);
        assert_eq!(texts(&segments), vec![("Troponin ", true), ("was checked.", false)]);
    }

    #[test]
    fn test_end_clamped_with_unknown_category() {
        let segments = render("abc", &[Span::new(1, 5, "x")]);
        assert_eq!(texts(&segments), vec![("a", false), ("bc", true)]);
        let highlight = segments[1].highlight.as_ref().unwrap();
        assert_eq!(highlight.category, None);
        assert_eq!(highlight.style, DEFAULT_STYLE);
    }

    #[test]
    fn test_unsorted_spans_with_gaps() {
        let text = "BP 120/80, HR 72";
        let spans = [Span::new(11, 12, "measurement"), Span::new(0, 1, "measurement")];
        let segments = render(text, &spans);
        assert_eq!(
            texts(&segments),
            vec![("BP", true), (" 120/80, ", false), ("HR", true), (" 72", false)]
        );
    }

    #[test]
    fn test_longer_span_wins_tie() {
        let text = "blood pressure was recorded";
        let spans = [Span::new(0, 4, "anatomy"), Span::new(0, 13, "measurement")];
        let segments = render(text, &spans);
        assert_eq!(
            texts(&segments),
            vec![("blood pressure", true), (" was recorded", false)]
        );
        assert_eq!(
            segments[0].highlight.as_ref().unwrap().category,
            Some(Category::Measurement)
        );
    }

    #[test]
    fn test_overlapping_span_dropped_whole() {
        let text = "chest pain radiating";
        let spans = [Span::new(0, 9, "diagnosis"), Span::new(6, 19, "diagnosis")];
        let segments = render(text, &spans);
        assert_eq!(texts(&segments), vec![("chest pain", true), (" radiating", false)]);
    }

    #[test]
    fn test_adjacent_spans_both_render() {
        let segments = render("abcd", &[Span::new(0, 1, "test"), Span::new(2, 3, "test")]);
        assert_eq!(texts(&segments), vec![("ab", true), ("cd", true)]);
    }

    #[test]
    fn test_invalid_spans_do_not_disturb_others() {
        let text = "aspirin daily";
        let spans = [
            Span::new(5, 2, "medication"),
            Span::new(0, 6, "medication"),
            Span::new(40, 50, "medication"),
            Span::new(-3, -1, "medication"),
        ];
        let segments = render(text, &spans);
        assert_eq!(texts(&segments), vec![("aspirin", true), (" daily", false)]);
    }

    #[test]
    fn test_negative_start_clamped() {
        let segments = render("ECG normal", &[Span::new(-2, 2, "test")]);
        assert_eq!(texts(&segments), vec![("ECG", true), (" normal", false)]);
    }

    #[test]
    fn test_multibyte_offsets_are_characters() {
        let text = "Pt café: naïve héma";
        let spans = [Span::new(3, 6, "x"), Span::new(9, 13, "x")];
        let segments = render(text, &spans);
        assert_eq!(
            texts(&segments),
            vec![
                ("Pt ", false),
                ("café", true),
                (": ", false),
                ("naïve", true),
                (" héma", false)
            ]
        );
        assert_eq!(plain_text(&segments), text);
    }

    #[test]
    fn test_tooltip_carries_metadata() {
        let span = Span::new(0, 2, "diagnosis")
            .canonical("Myocardial infarction")
            .negated(true)
            .definition("Heart attack");
        let segments = render("MI ruled out", &[span]);
        assert_eq!(
            segments[0].highlight.as_ref().unwrap().tooltip,
            "Myocardial infarction (diagnosis) [not present] \u{2014} Heart attack"
        );
    }
}
