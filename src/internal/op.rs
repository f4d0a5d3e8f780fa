//! The edit operation model: a three-variant tagged union plus a streaming
//! builder that coalesces adjacent operations of the same kind.
//!
//! Wire form is a single-key object per operation: `{"=": n}` retains `n`
//! codepoints, `{"-": n}` deletes `n` codepoints, `{"+": "text"}` inserts a
//! literal. Counts are codepoint counts, not bytes.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::utils::char_len;

/// A single edit operation over the source codepoint stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp {
    /// Copy the next `n` codepoints of the source to the output.
    Retain(usize),
    /// Skip the next `n` codepoints of the source.
    Delete(usize),
    /// Emit a literal string without consuming source.
    Insert(String),
}

impl DiffOp {
    /// Codepoints of source this operation consumes.
    pub fn source_span(&self) -> usize {
        match self {
            DiffOp::Retain(n) | DiffOp::Delete(n) => *n,
            DiffOp::Insert(_) => 0,
        }
    }

    /// Codepoints of output this operation produces.
    pub fn output_span(&self) -> usize {
        match self {
            DiffOp::Retain(n) => *n,
            DiffOp::Delete(_) => 0,
            DiffOp::Insert(text) => char_len(text),
        }
    }

    /// Discriminant used for canonical-form checks.
    pub(crate) fn kind(&self) -> OpKind {
        match self {
            DiffOp::Retain(_) => OpKind::Retain,
            DiffOp::Delete(_) => OpKind::Delete,
            DiffOp::Insert(_) => OpKind::Insert,
        }
    }

    /// True for `Retain(0)`, `Delete(0)` and `Insert("")`.
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            DiffOp::Retain(n) | DiffOp::Delete(n) => *n == 0,
            DiffOp::Insert(text) => text.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpKind {
    Retain,
    Delete,
    Insert,
}

const RETAIN_TAG: &str = "=";
const INSERT_TAG: &str = "+";
const DELETE_TAG: &str = "-";

impl Serialize for DiffOp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            DiffOp::Retain(n) => map.serialize_entry(RETAIN_TAG, &(*n as u64))?,
            DiffOp::Delete(n) => map.serialize_entry(DELETE_TAG, &(*n as u64))?,
            DiffOp::Insert(text) => map.serialize_entry(INSERT_TAG, text)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DiffOp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OpVisitor;

        impl<'de> Visitor<'de> for OpVisitor {
            type Value = DiffOp;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an operation object with exactly one of \"=\", \"-\", \"+\"")
            }

            fn visit_map<A>(self, mut map: A) -> Result<DiffOp, A::Error>
            where
                A: MapAccess<'de>,
            {
                let tag: String = map
                    .next_key()?
                    .ok_or_else(|| de::Error::custom("empty operation object"))?;
                let op = match tag.as_str() {
                    RETAIN_TAG => DiffOp::Retain(read_count(&mut map)?),
                    DELETE_TAG => DiffOp::Delete(read_count(&mut map)?),
                    INSERT_TAG => DiffOp::Insert(map.next_value()?),
                    other => {
                        return Err(de::Error::custom(format!(
                            "unknown operation tag `{other}`"
                        )));
                    }
                };
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom(
                        "operation object must hold exactly one entry",
                    ));
                }
                Ok(op)
            }
        }

        fn read_count<'de, A>(map: &mut A) -> Result<usize, A::Error>
        where
            A: MapAccess<'de>,
        {
            let count: u64 = map.next_value()?;
            usize::try_from(count)
                .map_err(|_| de::Error::custom(format!("operation count {count} overflows")))
        }

        deserializer.deserialize_map(OpVisitor)
    }
}

/// Streaming builder that emits a canonical operation sequence: no
/// zero-length operations, and no two adjacent operations of the same kind.
///
/// At most one accumulator is live at a time; adding an operation of a
/// different kind flushes the others first, so same-kind runs coalesce
/// without intermediate allocations.
#[derive(Debug, Default)]
pub struct OpBuilder {
    pending_retain: usize,
    pending_delete: usize,
    pending_insert: String,
    ops: Vec<DiffOp>,
}

impl OpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a retain of `count` codepoints.
    pub fn retain(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.flush_delete();
        self.flush_insert();
        self.pending_retain += count;
    }

    /// Accumulate a delete of `count` codepoints.
    pub fn delete(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.flush_retain();
        self.flush_insert();
        self.pending_delete += count;
    }

    /// Accumulate an insert of `text`.
    pub fn insert(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.flush_retain();
        self.flush_delete();
        self.pending_insert.push_str(text);
    }

    /// Flush the remaining accumulator and return the sequence.
    pub fn build(mut self) -> Vec<DiffOp> {
        self.flush_retain();
        self.flush_delete();
        self.flush_insert();
        self.ops
    }

    fn flush_retain(&mut self) {
        if self.pending_retain > 0 {
            self.ops.push(DiffOp::Retain(self.pending_retain));
            self.pending_retain = 0;
        }
    }

    fn flush_delete(&mut self) {
        if self.pending_delete > 0 {
            self.ops.push(DiffOp::Delete(self.pending_delete));
            self.pending_delete = 0;
        }
    }

    fn flush_insert(&mut self) {
        if !self.pending_insert.is_empty() {
            self.ops
                .push(DiffOp::Insert(std::mem::take(&mut self.pending_insert)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DiffOp, OpBuilder};

    /// Adjacent same-kind operations coalesce into one.
    #[test]
    fn builder_coalesces_same_kind() {
        let mut builder = OpBuilder::new();
        builder.retain(2);
        builder.retain(3);
        builder.insert("ab");
        builder.insert("cd");
        builder.delete(1);
        builder.delete(1);
        assert_eq!(
            builder.build(),
            vec![
                DiffOp::Retain(5),
                DiffOp::Insert("abcd".to_string()),
                DiffOp::Delete(2),
            ]
        );
    }

    /// Zero-length additions are dropped without flushing anything.
    #[test]
    fn builder_ignores_empty_ops() {
        let mut builder = OpBuilder::new();
        builder.retain(1);
        builder.delete(0);
        builder.insert("");
        builder.retain(1);
        assert_eq!(builder.build(), vec![DiffOp::Retain(2)]);
    }

    /// Kinds strictly alternate in the built sequence.
    #[test]
    fn builder_output_is_canonical() {
        let mut builder = OpBuilder::new();
        builder.retain(1);
        builder.delete(2);
        builder.insert("x");
        builder.retain(4);
        builder.delete(1);
        let ops = builder.build();
        assert!(ops.iter().all(|op| !op.is_empty()));
        assert!(ops.windows(2).all(|w| w[0].kind() != w[1].kind()));
    }

    /// Wire form is a single-key object per operation.
    #[test]
    fn op_serde_round_trip() {
        let ops = vec![
            DiffOp::Retain(7),
            DiffOp::Delete(5),
            DiffOp::Insert("Swift".to_string()),
        ];
        let json = serde_json::to_string(&ops).unwrap();
        assert_eq!(json, r#"[{"=":7},{"-":5},{"+":"Swift"}]"#);
        let back: Vec<DiffOp> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ops);
    }

    /// Unknown tags and multi-entry objects are rejected.
    #[test]
    fn op_deserialize_rejects_malformed() {
        assert!(serde_json::from_str::<DiffOp>(r#"{"?":1}"#).is_err());
        assert!(serde_json::from_str::<DiffOp>(r#"{}"#).is_err());
        assert!(serde_json::from_str::<DiffOp>(r#"{"=":1,"-":2}"#).is_err());
        assert!(serde_json::from_str::<DiffOp>(r#"{"=":-3}"#).is_err());
    }

    /// Source/output spans follow the operation kind.
    #[test]
    fn op_spans() {
        assert_eq!(DiffOp::Retain(4).source_span(), 4);
        assert_eq!(DiffOp::Retain(4).output_span(), 4);
        assert_eq!(DiffOp::Delete(4).source_span(), 4);
        assert_eq!(DiffOp::Delete(4).output_span(), 0);
        let insert = DiffOp::Insert("日本語".to_string());
        assert_eq!(insert.source_span(), 0);
        assert_eq!(insert.output_span(), 3);
    }
}
