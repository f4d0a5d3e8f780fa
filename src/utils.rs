//! Codepoint-indexed helpers shared by the differs, the applier and the
//! metadata context capture.
//!
//! Every count in this crate is a Unicode scalar value count, never a byte
//! count and never a grapheme cluster count. These helpers translate between
//! codepoint counts and byte offsets so callers can slice `&str` without
//! walking a string twice.

/// Number of codepoints in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset reached by advancing `count` codepoints from `byte_pos`.
///
/// `byte_pos` must lie on a char boundary. Returns `None` when fewer than
/// `count` codepoints remain.
pub fn advance_chars(text: &str, byte_pos: usize, count: usize) -> Option<usize> {
    let mut remaining = count;
    let mut end = byte_pos;
    for ch in text[byte_pos..].chars() {
        if remaining == 0 {
            break;
        }
        end += ch.len_utf8();
        remaining -= 1;
    }
    (remaining == 0).then_some(end)
}

/// Leading slice of at most `count` codepoints.
pub fn take_chars(text: &str, count: usize) -> &str {
    match advance_chars(text, 0, count) {
        Some(end) => &text[..end],
        None => text,
    }
}

/// Trailing slice of at most `count` codepoints.
pub fn take_last_chars(text: &str, count: usize) -> &str {
    let mut start = text.len();
    let mut taken = 0;
    for ch in text.chars().rev() {
        if taken == count {
            break;
        }
        start -= ch.len_utf8();
        taken += 1;
    }
    &text[start..]
}
