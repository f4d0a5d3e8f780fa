//! Line-sequence alignment.
//!
//! Produces the matched pairs of a common subsequence between two line
//! sequences. Strategy is routed by input shape, but every route yields a
//! valid alignment (pairs strictly increasing on both sides) and is
//! deterministic for fixed inputs:
//!
//! - common line prefix/suffix trimming, which short-circuits near-identical
//!   inputs entirely;
//! - a classic DP table for small and medium middles;
//! - patience anchoring over lines unique to both sides, recursing between
//!   anchors;
//! - Myers via `similar` for large middles without unique anchors.

use ahash::AHashMap;
use similar::{Algorithm, ChangeTag, TextDiff};

/// Cap on `m * n` cells before the DP table is abandoned for patience/Myers.
const DP_CELL_LIMIT: usize = 1 << 20;

/// Compute matched `(source_index, destination_index)` pairs forming a
/// common subsequence of the two line sequences.
pub fn align(old: &[&str], new: &[&str]) -> Vec<(usize, usize)> {
    // Near-identical sequences collapse to a handful of middle lines here.
    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut pairs: Vec<(usize, usize)> = (0..prefix).map(|i| (i, i)).collect();
    if !old_mid.is_empty() && !new_mid.is_empty() {
        pairs.extend(
            align_middle(old_mid, new_mid)
                .into_iter()
                .map(|(i, j)| (i + prefix, j + prefix)),
        );
    }
    for k in 0..suffix {
        pairs.push((old.len() - suffix + k, new.len() - suffix + k));
    }
    pairs
}

fn align_middle(old: &[&str], new: &[&str]) -> Vec<(usize, usize)> {
    if old.len().saturating_mul(new.len()) <= DP_CELL_LIMIT {
        return align_dp(old, new);
    }
    let anchors = unique_anchors(old, new);
    if anchors.is_empty() {
        return align_myers(old, new);
    }
    let chain = longest_increasing(&anchors);

    let mut pairs = Vec::with_capacity(chain.len());
    let (mut i, mut j) = (0, 0);
    for &(o, n) in &chain {
        if o > i && n > j {
            pairs.extend(
                align_middle(&old[i..o], &new[j..n])
                    .into_iter()
                    .map(|(a, b)| (a + i, b + j)),
            );
        }
        pairs.push((o, n));
        i = o + 1;
        j = n + 1;
    }
    if i < old.len() && j < new.len() {
        pairs.extend(
            align_middle(&old[i..], &new[j..])
                .into_iter()
                .map(|(a, b)| (a + i, b + j)),
        );
    }
    pairs
}

/// Classic LCS table over line slices, O(m·n) cells.
///
/// Backtracking is deterministic: a match is always taken when the lines are
/// equal, and on tied table values a source advance (delete) is preferred
/// over a destination advance (insert).
fn align_dp(old: &[&str], new: &[&str]) -> Vec<(usize, usize)> {
    let (m, n) = (old.len(), new.len());
    let width = n + 1;
    // table[i * width + j] = LCS length of old[i..] vs new[j..]
    let mut table = vec![0u32; (m + 1) * width];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            table[i * width + j] = if old[i] == new[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(table[0] as usize);
    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if old[i] == new[j] {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

/// Candidate pairs of lines occurring exactly once on each side, ordered by
/// destination index.
fn unique_anchors(old: &[&str], new: &[&str]) -> Vec<(usize, usize)> {
    #[derive(Default)]
    struct Occurrences {
        old_count: usize,
        old_index: usize,
        new_count: usize,
    }

    let mut table: AHashMap<&str, Occurrences> =
        AHashMap::with_capacity(old.len() + new.len());
    for (i, &line) in old.iter().enumerate() {
        let entry = table.entry(line).or_default();
        entry.old_count += 1;
        entry.old_index = i;
    }
    for line in new.iter() {
        if let Some(entry) = table.get_mut(line) {
            entry.new_count += 1;
        }
    }

    let mut anchors = Vec::new();
    for (j, line) in new.iter().enumerate() {
        if let Some(entry) = table.get(line)
            && entry.old_count == 1
            && entry.new_count == 1
        {
            anchors.push((entry.old_index, j));
        }
    }
    anchors
}

/// Longest strictly-increasing subsequence of the anchors' source indices,
/// extracted by patience sort with back-pointers.
fn longest_increasing(anchors: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut pile_tops: Vec<usize> = Vec::new();
    let mut back: Vec<Option<usize>> = vec![None; anchors.len()];
    for (k, &(o, _)) in anchors.iter().enumerate() {
        let pile = pile_tops.partition_point(|&top| anchors[top].0 < o);
        if pile > 0 {
            back[k] = Some(pile_tops[pile - 1]);
        }
        if pile == pile_tops.len() {
            pile_tops.push(k);
        } else {
            pile_tops[pile] = k;
        }
    }

    let mut chain = Vec::new();
    let mut cursor = pile_tops.last().copied();
    while let Some(k) = cursor {
        chain.push(anchors[k]);
        cursor = back[k];
    }
    chain.reverse();
    chain
}

/// Myers alignment over line slices via `similar`, the same strategy used
/// for whole-file line diffs.
fn align_myers(old: &[&str], new: &[&str]) -> Vec<(usize, usize)> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_slices(old, new);

    let mut pairs = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                pairs.push((i, j));
                i += 1;
                j += 1;
            }
            ChangeTag::Delete => i += 1,
            ChangeTag::Insert => j += 1,
        }
    }
    pairs
}
