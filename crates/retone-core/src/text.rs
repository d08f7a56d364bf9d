//! UTF-16 offset helpers.
//!
//! The DOM reports `selectionStart`/`selectionEnd` in UTF-16 code units, while
//! Rust strings are UTF-8. Everything that slices a control's value goes
//! through these helpers so offsets never land inside a code point.

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 offset into a byte offset into `s`.
///
/// Offsets past the end clamp to `s.len()`. An offset that falls between the
/// two halves of a surrogate pair rounds down to the start of that char.
pub fn utf16_to_byte(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte_idx, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return byte_idx;
        }
        units = next;
    }
    s.len()
}

/// Slice `s` by UTF-16 offsets. `start > end` yields an empty slice.
pub fn slice_utf16(s: &str, start: usize, end: usize) -> &str {
    let start_byte = utf16_to_byte(s, start);
    let end_byte = utf16_to_byte(s, end).max(start_byte);
    &s[start_byte..end_byte]
}

/// Result of splicing text into a control value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    /// The new control value.
    pub value: String,
    /// Caret position after the inserted text, in UTF-16 units.
    pub caret: usize,
}

/// Replace the UTF-16 range `start..end` of `value` with `insert`.
///
/// Computes `value[..start] + insert + value[end..]` with the caret placed
/// right after the inserted text.
pub fn splice_utf16(value: &str, start: usize, end: usize, insert: &str) -> Splice {
    let start_byte = utf16_to_byte(value, start);
    let end_byte = utf16_to_byte(value, end).max(start_byte);
    let before = &value[..start_byte];
    let after = &value[end_byte..];

    let mut out = String::with_capacity(before.len() + insert.len() + after.len());
    out.push_str(before);
    out.push_str(insert);
    out.push_str(after);

    Splice {
        value: out,
        caret: utf16_len(before) + utf16_len(insert),
    }
}

/// Truncate to `max_units` UTF-16 code units, appending an ellipsis when
/// cut. A surrogate pair straddling the limit is dropped whole.
pub fn truncate_snippet(text: &str, max_units: usize) -> String {
    if utf16_len(text) <= max_units {
        return text.to_string();
    }
    format!("{}…", &text[..utf16_to_byte(text, max_units)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len("hello"), 5);
        // emoji is a surrogate pair in UTF-16
        assert_eq!(utf16_len("hi 🌍"), 5);
    }

    #[test]
    fn test_slice_ascii() {
        assert_eq!(slice_utf16("hello world", 0, 5), "hello");
        assert_eq!(slice_utf16("hello world", 6, 11), "world");
        assert_eq!(slice_utf16("hello world", 6, 100), "world");
        assert_eq!(slice_utf16("hello world", 8, 3), "");
    }

    #[test]
    fn test_slice_astral() {
        let s = "a🌍b";
        assert_eq!(slice_utf16(s, 1, 3), "🌍");
        assert_eq!(slice_utf16(s, 3, 4), "b");
        // offset inside the pair rounds down
        assert_eq!(slice_utf16(s, 2, 4), "🌍b");
    }

    #[test]
    fn test_splice_hello_world() {
        let splice = splice_utf16("hello world", 0, 11, "hi world");
        assert_eq!(splice.value, "hi world");
        assert_eq!(splice.caret, 8);
    }

    #[test]
    fn test_splice_middle() {
        let splice = splice_utf16("one two three", 4, 7, "2");
        assert_eq!(splice.value, "one 2 three");
        assert_eq!(splice.caret, 5);
    }

    #[test]
    fn test_splice_all_offsets() {
        let value = "abcdef";
        for s in 0..=value.len() {
            for e in s..=value.len() {
                let splice = splice_utf16(value, s, e, "XY");
                assert_eq!(splice.value, format!("{}XY{}", &value[..s], &value[e..]));
                assert_eq!(splice.caret, s + 2);
            }
        }
    }

    #[test]
    fn test_splice_caret_counts_utf16() {
        let splice = splice_utf16("x", 0, 1, "🌍");
        assert_eq!(splice.value, "🌍");
        assert_eq!(splice.caret, 2);
    }

    #[test]
    fn test_truncate_snippet() {
        assert_eq!(truncate_snippet("short", 160), "short");
        let long = "a".repeat(200);
        let snippet = truncate_snippet(&long, 160);
        assert_eq!(snippet.chars().count(), 161);
        assert!(snippet.ends_with('…'));
        assert_eq!(truncate_snippet(&"b".repeat(160), 160), "b".repeat(160));
    }

    #[test]
    fn test_truncate_snippet_counts_utf16() {
        // 80 emoji are 160 UTF-16 units: fits exactly
        let emoji = "🌍".repeat(80);
        assert_eq!(truncate_snippet(&emoji, 160), emoji);

        // 81 emoji overflow; the cut keeps 80 whole pairs
        let snippet = truncate_snippet(&"🌍".repeat(81), 160);
        assert_eq!(snippet, format!("{}…", "🌍".repeat(80)));

        // a pair straddling the limit is dropped whole
        let mixed = format!("a{}", "🌍".repeat(80));
        assert_eq!(truncate_snippet(&mixed, 160), format!("a{}…", "🌍".repeat(79)));
    }
}
