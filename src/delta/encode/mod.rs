//! Edit-script generation: the prefix/suffix fast differ and the line-level
//! semantic differ. Both emit canonical operation sequences through
//! [`OpBuilder`], so adjacent same-kind operations are already coalesced.

use crate::{
    internal::{
        analysis::common_regions,
        lcs,
        lines::split_lines,
        op::{DiffOp, OpBuilder},
    },
    utils::char_len,
};

/// Single-pass prefix/suffix differ.
///
/// Emits at most `Retain(prefix), Delete(mid), Insert(mid), Retain(suffix)`,
/// omitting zero-length pieces.
pub(crate) fn fast_ops(source: &str, destination: &str) -> Vec<DiffOp> {
    if source.is_empty() && destination.is_empty() {
        return Vec::new();
    }
    if source.is_empty() {
        return vec![DiffOp::Insert(destination.to_string())];
    }
    if destination.is_empty() {
        return vec![DiffOp::Delete(char_len(source))];
    }
    if source == destination {
        return vec![DiffOp::Retain(char_len(source))];
    }

    let regions = common_regions(source, destination);
    let mut builder = OpBuilder::new();
    builder.retain(regions.prefix_chars);
    builder.delete(regions.source_chars - regions.prefix_chars - regions.suffix_chars);
    builder.insert(&destination[regions.prefix_bytes..regions.destination_suffix_start]);
    builder.retain(regions.suffix_chars);
    builder.build()
}

/// Line-level differ.
///
/// Splits both sides into newline-preserving lines, aligns them with a
/// common-subsequence strategy and emits one operation per line. Counts
/// include the line terminator, so the sum of retains and deletes equals the
/// source codepoint count.
pub(crate) fn semantic_ops(source: &str, destination: &str) -> Vec<DiffOp> {
    let old = split_lines(source);
    let new = split_lines(destination);

    let mut builder = OpBuilder::new();
    let (mut i, mut j) = (0, 0);
    for (oi, nj) in lcs::align(&old, &new) {
        while i < oi {
            builder.delete(char_len(old[i]));
            i += 1;
        }
        while j < nj {
            builder.insert(new[j]);
            j += 1;
        }
        builder.retain(char_len(old[oi]));
        i = oi + 1;
        j = nj + 1;
    }
    while i < old.len() {
        builder.delete(char_len(old[i]));
        i += 1;
    }
    while j < new.len() {
        builder.insert(new[j]);
        j += 1;
    }
    builder.build()
}
