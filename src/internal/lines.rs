//! Newline-preserving line views.
//!
//! A line is the maximal substring ending in `\n`; the final line may omit
//! the terminator. Lines keep their terminator so per-line codepoint counts
//! sum to the codepoint count of the whole text, which keeps the applier's
//! cursor arithmetic consistent with the differ's output.

use memchr::memchr_iter;

/// Split `text` into borrowed newline-preserving lines.
///
/// The empty string has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    for nl in memchr_iter(b'\n', text.as_bytes()) {
        // '\n' is ASCII, so nl + 1 is a char boundary
        lines.push(&text[start..=nl]);
        start = nl + 1;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Number of newline-preserving lines in `text`.
pub fn line_count(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    let terminators = memchr_iter(b'\n', text.as_bytes()).count();
    if text.ends_with('\n') {
        terminators
    } else {
        terminators + 1
    }
}

#[cfg(test)]
mod tests {
    use super::{line_count, split_lines};

    /// Lines keep their terminator; the last line may omit it.
    #[test]
    fn split_preserves_terminators() {
        assert_eq!(split_lines("a\nb\nc\n"), vec!["a\n", "b\n", "c\n"]);
        assert_eq!(split_lines("a\nb"), vec!["a\n", "b"]);
        assert_eq!(split_lines("one line"), vec!["one line"]);
        assert!(split_lines("").is_empty());
    }

    /// Blank lines and bare newlines are lines of their own.
    #[test]
    fn split_keeps_blank_lines() {
        assert_eq!(split_lines("\n"), vec!["\n"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a\n", "\n", "b\n"]);
    }

    /// Reassembling the lines yields the original text.
    #[test]
    fn split_is_lossless() {
        for text in ["", "x", "x\n", "a\nbb\n\nccc", "日本\n語"] {
            assert_eq!(split_lines(text).concat(), text);
        }
    }

    /// Counting matches splitting without allocating.
    #[test]
    fn count_matches_split() {
        for text in ["", "x", "x\n", "a\nb", "a\nb\n", "\n\n"] {
            assert_eq!(line_count(text), split_lines(text).len(), "{text:?}");
        }
    }
}
