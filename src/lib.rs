//! Text-Delta is a library for generating, applying and transporting
//! multi-line text deltas.
//!
//! A delta is an ordered sequence of retain/delete/insert operations over
//! codepoints, optionally carrying metadata: source and destination
//! snapshots, excerpt contexts, the generating algorithm, an application
//! type and a SHA-256 integrity hash. Deltas can be applied strictly,
//! applied to truncated sources, or applied "smartly" to a larger document
//! by locating the best-matching section for a delta that was generated
//! from an excerpt. Deltas serialize to a compact JSON form wrapped in a
//! base64 envelope, can be verified against their metadata, and can be
//! inverted for undo.
//!
//! ```
//! use text_delta::{apply_delta, apply_smart, create_diff};
//!
//! let delta = create_diff("Hello, world!", "Hello, Rust!");
//! assert_eq!(apply_delta("Hello, world!", &delta, false).unwrap(), "Hello, Rust!");
//!
//! // generated from an excerpt, applied to the containing document
//! let delta = create_diff("foo\nbar\n", "foo\nBAZ\n");
//! let patched = apply_smart("A\nB\nfoo\nbar\nC\n", &delta).unwrap();
//! assert_eq!(patched, "A\nB\nfoo\nBAZ\nC\n");
//! ```

pub mod config;
pub mod delta;
pub mod errors;
pub mod hash;
pub mod internal;
pub mod utils;

pub use config::DiffOptions;
pub use delta::{
    DeltaStats, TextDelta, apply_base64_delta, apply_base64_smart, apply_delta, apply_smart,
    create_base64_delta, create_diff, create_diff_with, undo_delta, verify_delta,
    wire::{decode_base64, decode_json, encode_base64, encode_json},
};
pub use delta::locate::requires_truncated_handling;
pub use errors::DeltaError;
pub use hash::{IntegrityHash, compute_delta_hash};
pub use internal::{
    analysis::similarity,
    meta::{ApplicationType, DiffAlgorithm, DiffMetadata},
    op::{DiffOp, OpBuilder},
};
