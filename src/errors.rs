//! Error types for the Text-Delta crate.
//!
//! This module defines a unified error enumeration used across delta
//! generation, application, serialization and verification. It integrates
//! with `thiserror` to provide rich `Display` implementations.
//!
//! Notes:
//! - Each variant carries the contextual counts or payloads needed to report
//!   the failure without re-running the operation.
//! - The library never panics on malformed input; every failure surfaces as
//!   one of these variants.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Unified error enumeration for the Text-Delta library.
///
/// - Used across generation, strict/truncated application, wire
///   encode/decode and verification.
/// - Implements `std::error::Error` via `thiserror`.
pub enum DeltaError {
    /// A retain would overrun the source cursor in strict mode.
    #[error("Cannot retain {count} codepoints, only {remaining} remain in the source.")]
    InvalidRetain { count: usize, remaining: usize },

    /// A delete would overrun the source cursor in strict mode.
    #[error("Cannot delete {count} codepoints, only {remaining} remain in the source.")]
    InvalidDelete { count: usize, remaining: usize },

    /// Strict-mode application finished with source residue.
    #[error("Application left {unconsumed} source codepoints unconsumed.")]
    IncompleteApplication { unconsumed: usize },

    /// The delta could not be serialized to its canonical form.
    #[error("Failed to encode delta: {0}")]
    EncodingFailed(String),

    /// The canonical form or its base64 envelope could not be parsed.
    #[error("Failed to decode delta: {0}")]
    DecodingFailed(String),

    /// The applied result did not match the stored destination snapshot.
    #[error("Verification failed: applied result does not match the stored destination.")]
    VerificationFailed { expected: String, actual: String },

    /// A malformed operation was detected before execution.
    #[error("Invalid delta: {0}")]
    InvalidDiff(String),
}
