//! Character-index string utilities
//!
//! Every offset in the public API of this crate is a character index (a
//! count of `char`s), because that is what editing surfaces report for caret
//! positions and because a character index can never land inside a
//! multi-byte UTF-8 sequence. Rust strings are sliced by byte, so this module
//! converts between the two and slices by character range.
//!
//! # Example
//! ```ignore
//! use crate::string_utils::char_slice;
//!
//! let text = "Hei på deg";
//! assert_eq!(char_slice(text, 4, 6), "på");
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Character Boundary Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the largest byte index `<= index` on a UTF-8 character boundary.
///
/// Indices past the end clamp to the string length.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

// ─────────────────────────────────────────────────────────────────────────────
// Index Conversion Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Number of characters in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Convert a character index to a byte index.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Convert a byte index to a character index.
///
/// A byte index in the middle of a character counts up to (but not
/// including) that character.
pub fn byte_index_to_char_index(s: &str, byte_index: usize) -> usize {
    let byte_index = floor_char_boundary(s, byte_index);
    char_len(&s[..byte_index])
}

// ─────────────────────────────────────────────────────────────────────────────
// Character-Range Slicing
// ─────────────────────────────────────────────────────────────────────────────

/// Slice `s` by the character range `start..end`.
///
/// Both bounds clamp to the string; an inverted range yields `""`.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let start_byte = char_index_to_byte_index(s, start);
    let end_byte = char_index_to_byte_index(s, end);
    &s[start_byte..end_byte]
}

/// Slice `s` from character `start` to the end.
pub fn char_slice_from(s: &str, start: usize) -> &str {
    &s[char_index_to_byte_index(s, start)..]
}

/// Slice `s` from the beginning up to character `end`.
pub fn char_slice_to(s: &str, end: usize) -> &str {
    &s[..char_index_to_byte_index(s, end)]
}

/// Tracks a byte offset and the matching character offset while scanning a
/// string left to right, so repeated conversions stay linear overall.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCursor {
    /// Current byte offset
    pub byte: usize,
    /// Characters before `byte`
    pub char: usize,
}

impl CharCursor {
    /// Move forward to byte offset `to` (must be a char boundary `>= self.byte`)
    /// and return the character index there.
    pub fn advance_to(&mut self, s: &str, to: usize) -> usize {
        if to > self.byte {
            self.char += char_len(&s[self.byte..to]);
            self.byte = to;
        }
        self.char
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
