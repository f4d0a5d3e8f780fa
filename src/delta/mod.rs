//! Delta generation, application and verification.
//!
//! A [`TextDelta`] is an ordered operation sequence plus optional
//! [`DiffMetadata`]. Generation routes between the fast prefix/suffix
//! differ and the semantic line differ; the semantic path validates its own
//! output by applying it and falls back to the fast differ on mismatch, so
//! generation never fails. Application is strict by default, tolerant of
//! truncated sources on request, and "smart" application decides on its own
//! whether the delta targets the whole document or a section of it.

pub mod decode;
pub mod encode;
pub mod locate;
pub mod wire;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::DiffOptions,
    errors::DeltaError,
    hash::compute_delta_hash,
    internal::{
        analysis::similarity,
        lines::{line_count, split_lines},
        meta::{
            ApplicationType, DiffAlgorithm, DiffMetadata, leading_context, trailing_context,
        },
        op::DiffOp,
    },
    utils::char_len,
};
use decode::apply_ops;
use locate::{
    DEFAULT_WINDOW_LINES, detect_application_type, locate_section, requires_truncated_handling,
    splice_section,
};

/// Inputs no longer than this always take the fast differ.
const TINY_INPUT_CHARS: usize = 32;
/// Upper bound for the near-identical fast-differ shortcut.
const SHORT_INPUT_CHARS: usize = 256;
/// Below this similarity the input is a rewrite; prefix/suffix is enough.
const REWRITE_SIMILARITY: f64 = 0.10;
/// At or above this similarity short inputs skip the line alignment.
const NEAR_IDENTICAL_SIMILARITY: f64 = 0.95;

/// An edit script transforming one string into another, with optional
/// metadata for locating, verifying and undoing the transformation.
///
/// Immutable after generation; applying a delta never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDelta {
    /// Ordered operations, canonical: no zero-length operations, kinds never
    /// repeat adjacently.
    #[serde(rename = "ops")]
    pub operations: Vec<DiffOp>,
    /// Generation metadata, absent for bare deltas.
    #[serde(rename = "meta", skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<DiffMetadata>,
}

impl TextDelta {
    /// A delta over bare operations, without metadata.
    pub fn from_ops(operations: Vec<DiffOp>) -> Self {
        Self {
            operations,
            metadata: None,
        }
    }

    /// Codepoints of source the operations consume.
    pub fn source_span(&self) -> usize {
        self.operations.iter().map(|op| op.source_span()).sum()
    }

    /// Codepoints of output the operations produce.
    pub fn output_span(&self) -> usize {
        self.operations.iter().map(|op| op.output_span()).sum()
    }

    /// True when applying the delta returns the source unchanged.
    pub fn is_identity(&self) -> bool {
        self.operations
            .iter()
            .all(|op| matches!(op, DiffOp::Retain(_)))
    }

    /// Per-kind codepoint totals of the operation sequence.
    pub fn stats(&self) -> DeltaStats {
        let mut stats = DeltaStats::default();
        for op in &self.operations {
            match op {
                DiffOp::Retain(n) => stats.retained += n,
                DiffOp::Delete(n) => stats.deleted += n,
                DiffOp::Insert(text) => {
                    stats.inserted += char_len(text);
                    stats.insert_ops += 1;
                }
            }
        }
        stats.operation_count = self.operations.len();
        stats
    }
}

/// Codepoint totals of a delta's operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeltaStats {
    /// Codepoints copied from the source.
    pub retained: usize,
    /// Codepoints dropped from the source.
    pub deleted: usize,
    /// Codepoints introduced by inserts.
    pub inserted: usize,
    /// Number of insert operations.
    pub insert_ops: usize,
    /// Total operations in the sequence.
    pub operation_count: usize,
}

impl DeltaStats {
    /// Codepoints touched by the delta.
    pub fn changed(&self) -> usize {
        self.deleted + self.inserted
    }
}

/// Generate a delta with default options: auto-selected differ, metadata
/// attached.
pub fn create_diff(source: &str, destination: &str) -> TextDelta {
    create_diff_with(source, destination, &DiffOptions::default())
}

/// Generate a delta.
///
/// Runs the requested differ, or picks one from the input shape when the
/// options leave the algorithm open. A semantic run is validated by
/// applying its output; on mismatch the fast differ takes over and the
/// metadata records the algorithm that actually produced the operations.
pub fn create_diff_with(source: &str, destination: &str, options: &DiffOptions) -> TextDelta {
    let started = Instant::now();
    let requested = options
        .algorithm
        .unwrap_or_else(|| select_algorithm(source, destination));

    let (operations, used) = match requested {
        DiffAlgorithm::Fast => (encode::fast_ops(source, destination), DiffAlgorithm::Fast),
        DiffAlgorithm::Semantic => {
            let ops = encode::semantic_ops(source, destination);
            match apply_ops(source, &ops, false) {
                Ok(applied) if applied == destination => (ops, DiffAlgorithm::Semantic),
                _ => {
                    debug!("semantic differ failed self-validation, falling back to fast");
                    (encode::fast_ops(source, destination), DiffAlgorithm::Fast)
                }
            }
        }
    };

    let mut delta = TextDelta {
        operations,
        metadata: None,
    };
    if options.include_metadata {
        let preceding_context = leading_context(source);
        let following_context = trailing_context(source);
        let application_type = detect_application_type(
            options.source_start_line,
            preceding_context.as_deref(),
            following_context.as_deref(),
            Some(source),
        );
        delta.metadata = Some(DiffMetadata {
            source_start_line: options.source_start_line,
            source_total_lines: Some(line_count(source)),
            preceding_context,
            following_context,
            source_content: Some(source.to_string()),
            destination_content: Some(destination.to_string()),
            algorithm_used: Some(used),
            diff_hash: None,
            application_type: Some(application_type),
            generation_time_ms: Some(started.elapsed().as_millis() as u64),
        });
        if let Ok(hash) = compute_delta_hash(&delta)
            && let Some(meta) = delta.metadata.as_mut()
        {
            meta.diff_hash = Some(hash.to_hex());
        }
    }
    delta
}

fn select_algorithm(source: &str, destination: &str) -> DiffAlgorithm {
    let longest = char_len(source).max(char_len(destination));
    if longest <= TINY_INPUT_CHARS {
        return DiffAlgorithm::Fast;
    }
    let rate = similarity(source, destination);
    if rate < REWRITE_SIMILARITY {
        return DiffAlgorithm::Fast;
    }
    if rate >= NEAR_IDENTICAL_SIMILARITY && longest <= SHORT_INPUT_CHARS {
        return DiffAlgorithm::Fast;
    }
    DiffAlgorithm::Semantic
}

/// Apply a delta to `source`.
///
/// Strict mode requires the operations to consume the source exactly;
/// `allow_truncated` tolerates overruns and residue.
pub fn apply_delta(
    source: &str,
    delta: &TextDelta,
    allow_truncated: bool,
) -> Result<String, DeltaError> {
    apply_ops(source, &delta.operations, allow_truncated)
}

/// Apply a delta, deciding from its metadata whether `source` is the
/// document the delta was generated from or a larger document containing
/// the excerpt.
///
/// Excerpt deltas go through the section locator; when no section clears
/// the confidence floor the delta is applied strictly and any strict error
/// propagates unchanged. When the source matches the stored snapshot
/// exactly, the result is verified against the stored destination.
pub fn apply_smart(source: &str, delta: &TextDelta) -> Result<String, DeltaError> {
    let Some(meta) = &delta.metadata else {
        return apply_ops(source, &delta.operations, false);
    };
    let stored = meta.source_content.as_deref();
    let truncated_type =
        meta.application_type == Some(ApplicationType::RequiresTruncatedSource);

    if requires_truncated_handling(source, stored) || (stored.is_none() && truncated_type) {
        return apply_to_section(source, delta, meta);
    }
    match stored {
        Some(snapshot) if snapshot == source => {
            let result = apply_ops(source, &delta.operations, false)?;
            if let Some(expected) = &meta.destination_content
                && result != *expected
            {
                return Err(DeltaError::VerificationFailed {
                    expected: expected.clone(),
                    actual: result,
                });
            }
            Ok(result)
        }
        // the stored source contains the provided one: patch what we have
        Some(_) => apply_ops(source, &delta.operations, true),
        None => apply_ops(source, &delta.operations, false),
    }
}

fn apply_to_section(
    source: &str,
    delta: &TextDelta,
    meta: &DiffMetadata,
) -> Result<String, DeltaError> {
    let lines = split_lines(source);
    let preceding = meta.preceding_context.as_deref().unwrap_or("");
    let following = meta.following_context.as_deref();
    let window_lines = meta.source_total_lines.unwrap_or(DEFAULT_WINDOW_LINES);

    match locate_section(&lines, preceding, following, window_lines) {
        Some(section) => {
            let window_text: String = lines[section.start..section.end].concat();
            let patched = apply_ops(&window_text, &delta.operations, true)?;
            Ok(splice_section(&lines, &section, &window_text, patched))
        }
        None => {
            debug!("no section located, falling back to strict application");
            apply_ops(source, &delta.operations, false)
        }
    }
}

/// Check a delta against its own metadata.
///
/// Recomputes the integrity hash when one is stored and re-applies the
/// operations to the stored source when both snapshots are stored. Returns
/// `Ok(false)` when a check fails or when the delta carries nothing
/// verifiable.
pub fn verify_delta(delta: &TextDelta) -> Result<bool, DeltaError> {
    let Some(meta) = &delta.metadata else {
        return Ok(false);
    };

    let mut verified = false;
    if let Some(stored_hash) = &meta.diff_hash {
        let recomputed = compute_delta_hash(delta)?;
        if recomputed.to_hex() != *stored_hash {
            return Ok(false);
        }
        verified = true;
    }
    if let (Some(source), Some(destination)) = (&meta.source_content, &meta.destination_content)
    {
        match apply_ops(source, &delta.operations, false) {
            Ok(applied) if applied == *destination => verified = true,
            _ => return Ok(false),
        }
    }
    Ok(verified)
}

/// Synthesize the inverse delta from the stored snapshots.
///
/// Re-diffs destination against source with the algorithm that produced the
/// original, regenerating metadata (including a fresh hash). Returns `None`
/// when either snapshot is missing; guessing an inverse without them is not
/// supported.
pub fn undo_delta(delta: &TextDelta) -> Option<TextDelta> {
    let meta = delta.metadata.as_ref()?;
    let source = meta.source_content.as_deref()?;
    let destination = meta.destination_content.as_deref()?;

    let options = DiffOptions {
        algorithm: meta.algorithm_used,
        include_metadata: true,
        source_start_line: None,
    };
    Some(create_diff_with(destination, source, &options))
}

/// Generate a delta and return its base64 envelope.
pub fn create_base64_delta(
    source: &str,
    destination: &str,
    options: &DiffOptions,
) -> Result<String, DeltaError> {
    wire::encode_base64(&create_diff_with(source, destination, options))
}

/// Decode a base64 envelope and apply it to `source`.
pub fn apply_base64_delta(
    source: &str,
    encoded: &str,
    allow_truncated: bool,
) -> Result<String, DeltaError> {
    apply_delta(source, &wire::decode_base64(encoded)?, allow_truncated)
}

/// Decode a base64 envelope and apply it with smart section handling.
pub fn apply_base64_smart(source: &str, encoded: &str) -> Result<String, DeltaError> {
    apply_smart(source, &wire::decode_base64(encoded)?)
}
