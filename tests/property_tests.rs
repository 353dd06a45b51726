//! Property-based tests for doctalk rendering.
//!
//! Uses proptest to check the rendering invariants against arbitrary text
//! and arbitrary (often invalid) spans.

use proptest::prelude::*;

use doctalk::category::Category;
use doctalk::render::render;
use doctalk::segment::{Segment, plain_text};
use doctalk::span::Span;
use doctalk::tooltip::{TooltipFields, format_tooltip};

// ============================================================================
// Custom Strategies
// ============================================================================

const CATEGORIES: [&str; 8] = [
    "diagnosis",
    "procedure",
    "medication",
    "test",
    "anatomy",
    "measurement",
    "vital",
    "",
];

/// Text mixing ASCII, accented letters, CJK and emoji.
fn note_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,/éïö中文😀\n]{0,60}"
}

/// A span whose offsets range slightly outside `0..len`.
fn loose_span(len: i64) -> impl Strategy<Value = Span> {
    (
        -5i64..len + 5,
        -5i64..len + 5,
        0usize..CATEGORIES.len(),
        any::<bool>(),
    )
        .prop_map(|(start, end, category, negated)| {
            Span::new(start, end, CATEGORIES[category]).negated(negated)
        })
}

fn text_and_spans() -> impl Strategy<Value = (String, Vec<Span>)> {
    note_text().prop_flat_map(|text| {
        let len = i64::try_from(text.chars().count()).unwrap_or(0);
        (Just(text), prop::collection::vec(loose_span(len), 0..12))
    })
}

/// Text of two or more characters with a short and a long span sharing a start.
///
/// The short span ends before the last character, so the two clamp to
/// different ranges; the long one may run past the end of the text.
fn shared_start_pair() -> impl Strategy<Value = (String, Span, Span)> {
    note_text()
        .prop_filter("need two characters", |text| text.chars().count() >= 2)
        .prop_flat_map(|text| {
            let len = i64::try_from(text.chars().count()).unwrap_or(2);
            (Just(text), 0..len - 1, Just(len))
        })
        .prop_flat_map(|(text, start, len)| (Just(text), Just(start), start..len - 1, Just(len)))
        .prop_flat_map(|(text, start, short_end, len)| {
            (Just(text), Just(start), Just(short_end), short_end + 1..len + 5)
        })
        .prop_map(|(text, start, short_end, long_end)| {
            (
                text,
                Span::new(start, short_end, "test"),
                Span::new(start, long_end, "anatomy"),
            )
        })
}

/// Character offset of every segment, in order.
fn segment_ranges(segments: &[Segment<'_>]) -> Vec<(usize, usize, bool)> {
    let mut offset = 0;
    segments
        .iter()
        .map(|segment| {
            let len = segment.text.chars().count();
            let range = (offset, offset + len, segment.is_highlight());
            offset += len;
            range
        })
        .collect()
}

// ============================================================================
// Rendering Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Concatenating all segments reproduces the text.
    #[test]
    fn render_preserves_text((text, spans) in text_and_spans()) {
        let segments = render(&text, &spans);
        prop_assert_eq!(plain_text(&segments), text);
    }

    /// No segment is empty.
    #[test]
    fn render_emits_no_empty_segments((text, spans) in text_and_spans()) {
        let segments = render(&text, &spans);
        prop_assert!(segments.iter().all(|s| !s.is_empty()));
    }

    /// Two plain segments are never adjacent.
    #[test]
    fn render_merges_plain_runs((text, spans) in text_and_spans()) {
        let segments = render(&text, &spans);
        for pair in segments.windows(2) {
            prop_assert!(pair[0].is_highlight() || pair[1].is_highlight());
        }
    }

    /// Every highlight covers exactly its clamped span range.
    #[test]
    fn highlights_match_a_valid_span((text, spans) in text_and_spans()) {
        let len = text.chars().count();
        let segments = render(&text, &spans);
        for (start, end, highlighted) in segment_ranges(&segments) {
            if !highlighted {
                continue;
            }
            let matched = spans.iter().filter_map(|s| s.clamp(len)).any(|range| {
                range.start == start && range.end + 1 == end
            });
            prop_assert!(matched, "highlight {start}..{end} has no source span");
        }
    }

    /// Of two spans with the same start, the longer one is drawn, whatever
    /// their input order.
    #[test]
    fn longer_span_wins_shared_start((text, short, long) in shared_start_pair()) {
        let len = text.chars().count();
        let expected = long.clamp(len).unwrap();
        for spans in [vec![short.clone(), long.clone()], vec![long.clone(), short.clone()]] {
            let segments = render(&text, &spans);
            let highlighted: Vec<_> = segment_ranges(&segments)
                .into_iter()
                .filter(|(_, _, highlighted)| *highlighted)
                .collect();
            prop_assert_eq!(highlighted, vec![(expected.start, expected.end + 1, true)]);
            let highlight = segments.iter().find_map(|s| s.highlight.as_ref()).unwrap();
            prop_assert_eq!(highlight.category, Some(Category::Anatomy));
        }
    }

    /// Highlighted ranges are disjoint and in text order.
    #[test]
    fn highlights_never_overlap((text, spans) in text_and_spans()) {
        let highlighted: Vec<(usize, usize)> = segment_ranges(&render(&text, &spans))
            .into_iter()
            .filter(|(_, _, highlighted)| *highlighted)
            .map(|(start, end, _)| (start, end))
            .collect();
        for (i, a) in highlighted.iter().enumerate() {
            for b in &highlighted[i + 1..] {
                prop_assert!(a.1 <= b.0, "{a:?} overlaps {b:?}");
            }
        }
    }

    /// A valid span is left out only when it overlaps a drawn highlight.
    #[test]
    fn only_overlapping_spans_are_dropped((text, spans) in text_and_spans()) {
        let len = text.chars().count();
        let highlighted: Vec<(usize, usize)> = segment_ranges(&render(&text, &spans))
            .into_iter()
            .filter(|(_, _, highlighted)| *highlighted)
            .map(|(start, end, _)| (start, end))
            .collect();
        for range in spans.iter().filter_map(|s| s.clamp(len)) {
            let (start, end) = (range.start, range.end + 1);
            let touched = highlighted.iter().any(|&(h_start, h_end)| h_start < end && start < h_end);
            prop_assert!(touched, "span {start}..{end} vanished without an overlap");
        }
    }

    /// The number of highlights never exceeds the number of spans.
    #[test]
    fn highlight_count_bounded((text, spans) in text_and_spans()) {
        let segments = render(&text, &spans);
        let highlights = segments.iter().filter(|s| s.is_highlight()).count();
        prop_assert!(highlights <= spans.len());
    }

    /// Span order in the input does not change the output.
    #[test]
    fn render_ignores_input_order((text, spans) in text_and_spans()) {
        // Reordering only matters between spans with distinct (start, extent)
        // keys; ties keep input order, so compare against a stable re-sort.
        let mut sorted = spans.clone();
        sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.extent().cmp(&a.extent())));
        prop_assert_eq!(render(&text, &spans), render(&text, &sorted));
    }

    /// Rendering with no spans yields at most one plain segment.
    #[test]
    fn render_without_spans(text in note_text()) {
        let segments = render(&text, &[]);
        if text.is_empty() {
            prop_assert!(segments.is_empty());
        } else {
            prop_assert_eq!(segments, vec![Segment::plain(&text)]);
        }
    }

    /// Missing tooltip parts leave no separators behind.
    #[test]
    fn tooltip_has_no_stray_separators(
        canonical in prop::option::of("[a-zA-Z]{0,12}"),
        category in prop::option::of("[a-z]{0,10}"),
        negated in any::<bool>(),
        definition in prop::option::of("[a-zA-Z]{0,20}"),
    ) {
        let tooltip = format_tooltip(&TooltipFields {
            canonical: canonical.as_deref(),
            category: category.as_deref(),
            negated,
            definition: definition.as_deref(),
        });
        prop_assert!(!tooltip.starts_with(' '));
        prop_assert!(!tooltip.ends_with(' '));
        prop_assert!(!tooltip.contains("  "));
        prop_assert!(!tooltip.contains("()"));
        prop_assert_eq!(negated, tooltip.contains("[not present]"));
    }
}
