//! Canonical wire form of a delta and its base64 envelope.
//!
//! The canonical bytes are the compact-key JSON of the delta (operations as
//! single-key objects, metadata under three-letter keys, absent fields
//! omitted). Field order follows the struct definitions, so encoding is
//! deterministic and the same bytes feed both transport and integrity
//! hashing. The envelope is standard base64 over those bytes.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{delta::TextDelta, errors::DeltaError, internal::op::DiffOp};

/// Serialize a delta to its canonical JSON bytes.
pub fn encode_json(delta: &TextDelta) -> Result<Vec<u8>, DeltaError> {
    serde_json::to_vec(delta).map_err(|e| DeltaError::EncodingFailed(e.to_string()))
}

/// Parse a delta from canonical JSON bytes and validate its operations.
pub fn decode_json(bytes: &[u8]) -> Result<TextDelta, DeltaError> {
    let delta: TextDelta =
        serde_json::from_slice(bytes).map_err(|e| DeltaError::DecodingFailed(e.to_string()))?;
    validate_ops(&delta.operations)?;
    Ok(delta)
}

/// Serialize a delta to its base64 envelope.
pub fn encode_base64(delta: &TextDelta) -> Result<String, DeltaError> {
    Ok(STANDARD.encode(encode_json(delta)?))
}

/// Parse a delta from its base64 envelope.
pub fn decode_base64(encoded: &str) -> Result<TextDelta, DeltaError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| DeltaError::DecodingFailed(e.to_string()))?;
    decode_json(&bytes)
}

/// Reject operation sequences that cannot come from a well-formed delta.
///
/// Negative counts and multi-entry objects are already rejected while
/// parsing; what remains is the canonical-form contract: no zero-length
/// operations and no two adjacent operations of the same kind.
fn validate_ops(ops: &[DiffOp]) -> Result<(), DeltaError> {
    for op in ops {
        if op.is_empty() {
            return Err(DeltaError::InvalidDiff(
                "zero-length operation".to_string(),
            ));
        }
    }
    if ops.windows(2).any(|pair| pair[0].kind() == pair[1].kind()) {
        return Err(DeltaError::InvalidDiff(
            "adjacent operations of the same kind".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_base64, decode_json, encode_base64, encode_json};
    use crate::{
        delta::TextDelta,
        errors::DeltaError,
        internal::{meta::DiffMetadata, op::DiffOp},
    };

    fn sample() -> TextDelta {
        TextDelta {
            operations: vec![
                DiffOp::Retain(7),
                DiffOp::Delete(5),
                DiffOp::Insert("Swift".to_string()),
                DiffOp::Retain(1),
            ],
            metadata: None,
        }
    }

    /// The canonical JSON uses single-key operation objects.
    #[test]
    fn canonical_json_shape() {
        let json = String::from_utf8(encode_json(&sample()).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"ops":[{"=":7},{"-":5},{"+":"Swift"},{"=":1}]}"#
        );
    }

    /// Metadata lands under "meta" with compact keys.
    #[test]
    fn canonical_json_with_metadata() {
        let delta = TextDelta {
            operations: vec![DiffOp::Retain(1)],
            metadata: Some(DiffMetadata {
                source_total_lines: Some(1),
                ..Default::default()
            }),
        };
        let json = String::from_utf8(encode_json(&delta).unwrap()).unwrap();
        assert_eq!(json, r#"{"ops":[{"=":1}],"meta":{"cnt":1}}"#);
    }

    /// decode(encode(d)) == d, through JSON and through base64.
    #[test]
    fn round_trips() {
        let delta = sample();
        let json = encode_json(&delta).unwrap();
        assert_eq!(decode_json(&json).unwrap(), delta);
        let b64 = encode_base64(&delta).unwrap();
        assert_eq!(decode_base64(&b64).unwrap(), delta);
    }

    /// Envelope decoding surfaces malformed base64 and malformed JSON.
    #[test]
    fn decode_failures() {
        assert!(matches!(
            decode_base64("%%% not base64 %%%"),
            Err(DeltaError::DecodingFailed(_))
        ));
        assert!(matches!(
            decode_json(b"{\"ops\":[{\"?\":1}]}"),
            Err(DeltaError::DecodingFailed(_))
        ));
    }

    /// Non-canonical sequences are rejected before execution.
    #[test]
    fn rejects_non_canonical_ops() {
        assert!(matches!(
            decode_json(b"{\"ops\":[{\"=\":0}]}"),
            Err(DeltaError::InvalidDiff(_))
        ));
        assert!(matches!(
            decode_json(b"{\"ops\":[{\"=\":1},{\"=\":2}]}"),
            Err(DeltaError::InvalidDiff(_))
        ));
    }
}
