//! Applies an operation sequence to a source string, rebuilding the
//! destination.
//!
//! The cursor walks the source by codepoint. Strict mode requires the
//! operations to consume the source exactly; truncated mode stops at the
//! first operation that would overrun and tolerates unconsumed residue,
//! which is what the section locator relies on when a delta built from an
//! excerpt meets a shorter or longer window.

use crate::{
    errors::DeltaError,
    internal::op::DiffOp,
    utils::{advance_chars, char_len},
};

/// Apply `ops` to `source`.
///
/// Fast paths: an empty sequence returns the source unchanged, and the
/// canonical full-rewrite shape `[Delete(|source|), Insert(s)]` returns `s`
/// without walking the source.
pub fn apply_ops(
    source: &str,
    ops: &[DiffOp],
    allow_truncated: bool,
) -> Result<String, DeltaError> {
    if ops.is_empty() {
        return Ok(source.to_string());
    }
    if let [DiffOp::Delete(count), DiffOp::Insert(text)] = ops
        && *count == char_len(source)
    {
        return Ok(text.clone());
    }

    let mut result = String::with_capacity(source.len());
    let mut cursor = 0; // byte offset, always on a char boundary
    let mut remaining = char_len(source);

    for op in ops {
        match op {
            DiffOp::Retain(count) => {
                let Some(end) = bounded_advance(source, cursor, *count, remaining) else {
                    if allow_truncated {
                        return Ok(result);
                    }
                    return Err(DeltaError::InvalidRetain {
                        count: *count,
                        remaining,
                    });
                };
                result.push_str(&source[cursor..end]);
                cursor = end;
                remaining -= count;
            }
            DiffOp::Delete(count) => {
                let Some(end) = bounded_advance(source, cursor, *count, remaining) else {
                    if allow_truncated {
                        return Ok(result);
                    }
                    return Err(DeltaError::InvalidDelete {
                        count: *count,
                        remaining,
                    });
                };
                cursor = end;
                remaining -= count;
            }
            DiffOp::Insert(text) => result.push_str(text),
        }
    }

    if remaining > 0 && !allow_truncated {
        return Err(DeltaError::IncompleteApplication {
            unconsumed: remaining,
        });
    }
    Ok(result)
}

fn bounded_advance(
    source: &str,
    cursor: usize,
    count: usize,
    remaining: usize,
) -> Option<usize> {
    if count > remaining {
        return None;
    }
    advance_chars(source, cursor, count)
}

#[cfg(test)]
mod tests {
    use super::apply_ops;
    use crate::{errors::DeltaError, internal::op::DiffOp};

    fn retain(n: usize) -> DiffOp {
        DiffOp::Retain(n)
    }
    fn delete(n: usize) -> DiffOp {
        DiffOp::Delete(n)
    }
    fn insert(s: &str) -> DiffOp {
        DiffOp::Insert(s.to_string())
    }

    /// A retain/delete/insert/retain script rebuilds the destination.
    #[test]
    fn applies_mixed_script() {
        let ops = vec![retain(7), delete(5), insert("Swift"), retain(1)];
        assert_eq!(
            apply_ops("Hello, world!", &ops, false).unwrap(),
            "Hello, Swift!"
        );
    }

    /// Empty operation sequences return the source unchanged.
    #[test]
    fn empty_ops_fast_path() {
        assert_eq!(apply_ops("anything", &[], false).unwrap(), "anything");
        assert_eq!(apply_ops("", &[], false).unwrap(), "");
    }

    /// The full-rewrite shape skips the source walk.
    #[test]
    fn full_rewrite_fast_path() {
        let ops = vec![delete(4), insert("wxyz")];
        assert_eq!(apply_ops("abcd", &ops, false).unwrap(), "wxyz");
    }

    /// Counts are codepoints: multi-byte source slices stay intact.
    #[test]
    fn applies_codepoint_counts() {
        let ops = vec![retain(2), delete(1), insert("話")];
        assert_eq!(apply_ops("日本語", &ops, false).unwrap(), "日本話");
    }

    /// Strict mode rejects a retain that overruns the source.
    #[test]
    fn strict_rejects_overrun_retain() {
        let err = apply_ops("ab", &[retain(5)], false).unwrap_err();
        assert_eq!(
            err,
            DeltaError::InvalidRetain {
                count: 5,
                remaining: 2
            }
        );
    }

    /// Strict mode rejects a delete that overruns the source.
    #[test]
    fn strict_rejects_overrun_delete() {
        let err = apply_ops("ab", &[retain(1), delete(4)], false).unwrap_err();
        assert_eq!(
            err,
            DeltaError::InvalidDelete {
                count: 4,
                remaining: 1
            }
        );
    }

    /// Strict mode rejects unconsumed source residue.
    #[test]
    fn strict_rejects_residue() {
        let err = apply_ops("abcdef", &[retain(2)], false).unwrap_err();
        assert_eq!(err, DeltaError::IncompleteApplication { unconsumed: 4 });
    }

    /// Truncated mode returns what was built when an operation overruns.
    #[test]
    fn truncated_stops_at_overrun() {
        let ops = vec![retain(2), insert("X"), retain(10), insert("tail")];
        assert_eq!(apply_ops("abc", &ops, true).unwrap(), "abX");
    }

    /// Truncated mode tolerates residue.
    #[test]
    fn truncated_tolerates_residue() {
        let ops = vec![retain(2), insert("X")];
        assert_eq!(apply_ops("abcdef", &ops, true).unwrap(), "abX");
    }
}
