//! Metadata attached to a generated delta: source snapshots, excerpt
//! contexts, the algorithm actually used, the application type and the
//! integrity hash.
//!
//! Wire keys are compact three-letter tags so encoded deltas stay small.
//! Absent fields are omitted entirely.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::{take_chars, take_last_chars};

/// Codepoints of leading/trailing source captured as locator context.
pub const CONTEXT_CHARS: usize = 30;

/// Which differ produced an operation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// Prefix/suffix differ: at most four operations, O(n) time.
    Fast,
    /// Line-level differ backed by a common-subsequence alignment.
    Semantic,
}

impl fmt::Display for DiffAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffAlgorithm::Fast => f.write_str("fast"),
            DiffAlgorithm::Semantic => f.write_str("semantic"),
        }
    }
}

/// What kind of source a delta expects at application time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationType {
    /// The delta applies to the entire document it was generated from.
    RequiresFullSource,
    /// The delta was generated from an excerpt; applying it to a larger
    /// document goes through the section locator.
    RequiresTruncatedSource,
}

impl fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationType::RequiresFullSource => f.write_str("requires-full-source"),
            ApplicationType::RequiresTruncatedSource => f.write_str("requires-truncated-source"),
        }
    }
}

/// Optional metadata carried next to the operation sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffMetadata {
    /// 0-based line of the excerpt in its origin document.
    #[serde(rename = "str", skip_serializing_if = "Option::is_none", default)]
    pub source_start_line: Option<usize>,

    /// Line count of the source the delta was generated from.
    #[serde(rename = "cnt", skip_serializing_if = "Option::is_none", default)]
    pub source_total_lines: Option<usize>,

    /// Up to [`CONTEXT_CHARS`] leading codepoints of the source.
    #[serde(rename = "pre", skip_serializing_if = "Option::is_none", default)]
    pub preceding_context: Option<String>,

    /// Up to [`CONTEXT_CHARS`] trailing codepoints of the source.
    #[serde(rename = "fol", skip_serializing_if = "Option::is_none", default)]
    pub following_context: Option<String>,

    /// Exact source the delta was generated from.
    #[serde(rename = "src", skip_serializing_if = "Option::is_none", default)]
    pub source_content: Option<String>,

    /// Exact destination the delta produces.
    #[serde(rename = "dst", skip_serializing_if = "Option::is_none", default)]
    pub destination_content: Option<String>,

    /// Differ that actually produced the operations.
    #[serde(rename = "alg", skip_serializing_if = "Option::is_none", default)]
    pub algorithm_used: Option<DiffAlgorithm>,

    /// Lowercase hex SHA-256 over the canonical encoding without this field
    /// or the timing field.
    #[serde(rename = "hsh", skip_serializing_if = "Option::is_none", default)]
    pub diff_hash: Option<String>,

    /// Source shape this delta expects at application time.
    #[serde(rename = "app", skip_serializing_if = "Option::is_none", default)]
    pub application_type: Option<ApplicationType>,

    /// Generation wall time in milliseconds. Instrumentation only; excluded
    /// from determinism guarantees and from the integrity hash.
    #[serde(rename = "tim", skip_serializing_if = "Option::is_none", default)]
    pub generation_time_ms: Option<u64>,
}

/// Leading locator context of a source, `None` when the source is empty.
pub(crate) fn leading_context(source: &str) -> Option<String> {
    (!source.is_empty()).then(|| take_chars(source, CONTEXT_CHARS).to_string())
}

/// Trailing locator context of a source, `None` when the source is empty.
pub(crate) fn trailing_context(source: &str) -> Option<String> {
    (!source.is_empty()).then(|| take_last_chars(source, CONTEXT_CHARS).to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        ApplicationType, CONTEXT_CHARS, DiffAlgorithm, DiffMetadata, leading_context,
        trailing_context,
    };

    /// Enum tags match the wire contract.
    #[test]
    fn enum_wire_tags() {
        assert_eq!(
            serde_json::to_string(&DiffAlgorithm::Semantic).unwrap(),
            "\"semantic\""
        );
        assert_eq!(
            serde_json::to_string(&ApplicationType::RequiresTruncatedSource).unwrap(),
            "\"requires-truncated-source\""
        );
    }

    /// Absent fields are omitted; present fields use the compact keys.
    #[test]
    fn metadata_compact_keys() {
        let meta = DiffMetadata {
            source_total_lines: Some(2),
            preceding_context: Some("foo".to_string()),
            algorithm_used: Some(DiffAlgorithm::Fast),
            ..Default::default()
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"cnt":2,"pre":"foo","alg":"fast"}"#);
        let back: DiffMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    /// Contexts are capped at 30 codepoints and absent for empty sources.
    #[test]
    fn context_capture() {
        assert_eq!(leading_context(""), None);
        assert_eq!(trailing_context(""), None);
        assert_eq!(leading_context("short"), Some("short".to_string()));

        let long: String = ('a'..='z').chain('a'..='z').collect();
        let lead = leading_context(&long).unwrap();
        let trail = trailing_context(&long).unwrap();
        assert_eq!(lead.chars().count(), CONTEXT_CHARS);
        assert_eq!(trail.chars().count(), CONTEXT_CHARS);
        assert!(long.starts_with(&lead));
        assert!(long.ends_with(&trail));
    }
}
