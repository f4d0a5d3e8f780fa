//! Per-call generation options.

use serde::{Deserialize, Serialize};

use crate::internal::meta::DiffAlgorithm;

/// Options for delta generation. Plain data; every call receives its own
/// copy and nothing is stored globally.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DiffOptions {
    /// Differ to run. `None` selects one from the input shape: tiny inputs,
    /// near-identical short inputs and full rewrites go to the fast differ,
    /// everything else to the semantic differ.
    pub algorithm: Option<DiffAlgorithm>,
    /// Attach [`crate::DiffMetadata`] (snapshots, contexts, hash) to the
    /// result.
    pub include_metadata: bool,
    /// 0-based line at which the source excerpt starts in its origin
    /// document, when the caller knows it.
    pub source_start_line: Option<usize>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            algorithm: None,
            include_metadata: true,
            source_start_line: None,
        }
    }
}

impl DiffOptions {
    /// Options pinned to a specific differ.
    pub fn with_algorithm(algorithm: DiffAlgorithm) -> Self {
        Self {
            algorithm: Some(algorithm),
            ..Self::default()
        }
    }

    /// Options producing a bare operation sequence without metadata.
    pub fn bare() -> Self {
        Self {
            include_metadata: false,
            ..Self::default()
        }
    }
}
