//! Unicode character cell width calculations.
//!
//! Terminal output (the legend in particular) is laid out in cells, not
//! characters: CJK characters and some emoji take two cells.

use std::num::NonZeroUsize;
use std::sync::{LazyLock, Mutex};

use lru::LruCache;
use unicode_width::UnicodeWidthChar;

use crate::sync::lock_recover;

/// Minimum string length to cache (shorter strings have minimal overhead).
const CACHE_MIN_LEN: usize = 8;

static CELL_LEN_CACHE: LazyLock<Mutex<LruCache<String, usize>>> =
    LazyLock::new(|| Mutex::new(LruCache::new(NonZeroUsize::MIN.saturating_add(255))));

/// Get the cell width of a single character.
///
/// Control characters have 0 width.
#[must_use]
pub fn get_character_cell_size(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Get the total cell width of a string (cached for longer strings).
#[must_use]
pub fn cell_len(text: &str) -> usize {
    if text.len() < CACHE_MIN_LEN {
        return text.chars().map(get_character_cell_size).sum();
    }

    if let Some(&cached) = lock_recover(&CELL_LEN_CACHE).get(text) {
        return cached;
    }

    let width = text.chars().map(get_character_cell_size).sum();
    lock_recover(&CELL_LEN_CACHE).put(text.to_string(), width);
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        assert_eq!(cell_len("anatomy"), 7);
        assert_eq!(cell_len("measurement"), 11);
    }

    #[test]
    fn test_wide_chars() {
        assert_eq!(get_character_cell_size('日'), 2);
        assert_eq!(cell_len("日本語のメモ"), 12);
    }

    #[test]
    fn test_control_chars_zero_width() {
        assert_eq!(get_character_cell_size('\x1b'), 0);
    }
}
