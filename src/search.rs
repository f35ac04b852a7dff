//! Locale-aware substring search
//!
//! Used by trigger matching, by static suggestion filtering, and by
//! suggestion lists that highlight the matched part of a display string.
//!
//! Both strings are folded character by character (optional canonical
//! decomposition with combining marks removed, optional lowercasing) and the
//! search runs on the folded forms. A position map records, for every folded
//! character, the index of the haystack character it came from, so a hit can
//! be reported in the haystack's own character offsets even though folding
//! changed its length.

use icu_normalizer::DecomposingNormalizerBorrowed;
use icu_properties::props::GeneralCategory;
use icu_properties::CodePointMapData;
use std::ops::Range;

use crate::string_utils::char_len;

// ─────────────────────────────────────────────────────────────────────────────
// Folding
// ─────────────────────────────────────────────────────────────────────────────

/// A string reduced to its comparable form plus the origin of every char.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Folded {
    chars: Vec<char>,
    /// `origins[i]` is the index of the source char that produced `chars[i]`
    origins: Vec<usize>,
}

/// Whether `c` is a nonspacing combining mark (General_Category = Mn).
pub fn is_combining_mark(c: char) -> bool {
    CodePointMapData::<GeneralCategory>::new().get(c) == GeneralCategory::NonspacingMark
}

/// Base letter of an accented letter (`'é'` → `'e'`), or `None` when `c`
/// does not decompose into an ASCII letter followed by combining marks.
pub fn base_letter(c: char) -> Option<char> {
    let nfd = DecomposingNormalizerBorrowed::new_nfd();
    let mut parts = nfd.normalize_iter(std::iter::once(c));
    let base = parts.next()?;
    let mut has_mark = false;
    for part in parts {
        if !is_combining_mark(part) {
            return None;
        }
        has_mark = true;
    }
    (has_mark && base.is_ascii_alphabetic()).then_some(base)
}

fn fold(s: &str, ignore_accents: bool, case_insensitive: bool) -> Folded {
    let nfd = DecomposingNormalizerBorrowed::new_nfd();
    let mut folded = Folded::default();

    let push = |c: char, origin: usize, folded: &mut Folded| {
        if case_insensitive {
            for lower in c.to_lowercase() {
                folded.chars.push(lower);
                folded.origins.push(origin);
            }
        } else {
            folded.chars.push(c);
            folded.origins.push(origin);
        }
    };

    for (origin, c) in s.chars().enumerate() {
        if ignore_accents {
            for part in nfd.normalize_iter(std::iter::once(c)) {
                if !is_combining_mark(part) {
                    push(part, origin, &mut folded);
                }
            }
        } else {
            push(c, origin, &mut folded);
        }
    }

    folded
}

fn find_folded(haystack: &Folded, needle: &Folded) -> Option<usize> {
    if needle.chars.is_empty() {
        return Some(0);
    }
    haystack
        .chars
        .windows(needle.chars.len())
        .position(|window| window == needle.chars.as_slice())
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Find `needle` in `haystack`, returning the character index of the first hit.
///
/// With `case_insensitive` both strings are lowercased; with `ignore_accents`
/// both are canonically decomposed and stripped of combining marks first.
/// An empty needle matches at 0.
///
/// # Example
/// ```ignore
/// assert_eq!(get_substring_index("Curaçao", "cao", true, true), Some(4));
/// ```
pub fn get_substring_index(
    haystack: &str,
    needle: &str,
    ignore_accents: bool,
    case_insensitive: bool,
) -> Option<usize> {
    let folded_haystack = fold(haystack, ignore_accents, case_insensitive);
    let folded_needle = fold(needle, ignore_accents, case_insensitive);

    let pos = find_folded(&folded_haystack, &folded_needle)?;
    Some(folded_haystack.origins.get(pos).copied().unwrap_or(0))
}

/// Character range of `query` inside `display`, case-insensitively.
///
/// The range is expressed in the original `display` string and covers
/// every source character that contributed to the match, including trailing
/// combining marks. Suggestion lists use it to split a display string into
/// before/match/after parts.
pub fn highlight_match(display: &str, query: &str, ignore_accents: bool) -> Option<Range<usize>> {
    let folded_display = fold(display, ignore_accents, true);
    let folded_query = fold(query, ignore_accents, true);

    let pos = find_folded(&folded_display, &folded_query)?;
    let total = char_len(display);
    if folded_query.chars.is_empty() {
        return Some(0..0);
    }

    let start = folded_display.origins[pos];
    let last = pos + folded_query.chars.len() - 1;
    let end = match folded_display.origins.get(last + 1) {
        Some(&next) => next.max(folded_display.origins[last] + 1),
        None => total,
    };
    Some(start..end)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // Default (case-insensitive) mode
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_case_insensitive_literal_search() {
        assert_eq!(get_substring_index("Walter White", "white", false, true), Some(7));
        assert_eq!(get_substring_index("Walter White", "WAL", false, true), Some(0));
        assert_eq!(get_substring_index("Walter White", "jesse", false, true), None);
    }

    #[test]
    fn test_case_sensitive_search() {
        assert_eq!(get_substring_index("Walter White", "white", false, false), None);
        assert_eq!(get_substring_index("Walter White", "White", false, false), Some(7));
    }

    #[test]
    fn test_accents_are_significant_without_flag() {
        assert_eq!(get_substring_index("Curaçao", "cao", false, true), None);
        assert_eq!(get_substring_index("Curaçao", "çao", false, true), Some(4));
    }

    #[test]
    fn test_empty_needle_matches_at_start() {
        assert_eq!(get_substring_index("anything", "", false, true), Some(0));
        assert_eq!(get_substring_index("", "", true, true), Some(0));
        assert_eq!(get_substring_index("", "a", true, true), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accent-insensitive mode
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_accent_insensitive_search() {
        assert_eq!(get_substring_index("Curaçao", "cao", true, true), Some(4));
    }

    #[test]
    fn test_accent_insensitive_needle_with_accents() {
        assert_eq!(get_substring_index("Jose Maria", "josé", true, true), Some(0));
        assert_eq!(get_substring_index("Crème brûlée", "brulee", true, true), Some(6));
    }

    #[test]
    fn test_decomposed_input_maps_back_to_original_offsets() {
        // 'e' + COMBINING ACUTE ACCENT occupies two chars in the haystack
        let haystack = "ae\u{301}b";
        assert_eq!(get_substring_index(haystack, "b", true, true), Some(3));
        assert_eq!(get_substring_index(haystack, "eb", true, true), Some(1));
    }

    #[test]
    fn test_multibyte_characters_are_not_split() {
        let haystack = "🎉 Ñandú";
        assert_eq!(get_substring_index(haystack, "nandu", true, true), Some(2));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_base_letter() {
        assert_eq!(base_letter('é'), Some('e'));
        assert_eq!(base_letter('Ç'), Some('C'));
        assert_eq!(base_letter('e'), None);
        assert_eq!(base_letter('ø'), None); // no canonical decomposition
    }

    #[test]
    fn test_is_combining_mark() {
        assert!(is_combining_mark('\u{301}'));
        assert!(!is_combining_mark('a'));
    }

    #[test]
    fn test_highlight_match_ranges() {
        assert_eq!(highlight_match("Walter White", "whi", false), Some(7..10));
        assert_eq!(highlight_match("Curaçao", "cao", true), Some(4..7));
        assert_eq!(highlight_match("Curaçao", "cao", false), None);
        // trailing combining mark belongs to the match
        assert_eq!(highlight_match("cafe\u{301}s", "cafe", true), Some(0..5));
    }
}
