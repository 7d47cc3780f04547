use crate::{
    criterion::{LowerBound, RangeCriterion, UpperBound, ValueCriterion},
    entity::{EntityCriteria, EntityCriterion, FieldCriterion},
    query::Query,
    value::{Value, ValueSet},
};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

///
/// QueryFingerprint
///
/// SHA-256 over a tagged, length-prefixed encoding of a query. Two queries
/// share a fingerprint exactly when they are structurally equal, field order
/// included.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QueryFingerprint([u8; 32]);

impl QueryFingerprint {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl Serialize for QueryFingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

/// Compute the stable fingerprint of `query`.
#[must_use]
pub fn fingerprint(query: &Query) -> QueryFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(b"queryfp:v1");
    write_str(&mut hasher, query.entity());
    hash_criteria(&mut hasher, query.criteria());

    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);

    QueryFingerprint(out)
}

fn hash_criteria(hasher: &mut Sha256, criteria: &EntityCriteria) {
    write_tag(hasher, 0x10);
    write_len_u32(hasher, criteria.alternatives().len());
    for alternative in criteria.alternatives() {
        hash_entity(hasher, alternative);
    }
}

fn hash_entity(hasher: &mut Sha256, criterion: &EntityCriterion) {
    write_tag(hasher, 0x11);
    write_len_u32(hasher, criterion.len());
    for (name, field) in criterion.fields() {
        write_str(hasher, name);
        match field {
            FieldCriterion::Value(value) => {
                write_tag(hasher, 0x12);
                hash_value_criterion(hasher, value);
            }
            FieldCriterion::Entity(nested) => {
                write_tag(hasher, 0x13);
                hash_criteria(hasher, nested);
            }
        }
    }
}

fn hash_value_criterion(hasher: &mut Sha256, criterion: &ValueCriterion) {
    match criterion {
        ValueCriterion::Equals(set) => {
            write_tag(hasher, 0x21);
            write_set(hasher, set);
        }
        ValueCriterion::NotEquals(set) => {
            write_tag(hasher, 0x22);
            write_set(hasher, set);
        }
        ValueCriterion::InRange(range) => {
            write_tag(hasher, 0x23);
            write_range(hasher, range);
        }
        ValueCriterion::And(items) => {
            write_tag(hasher, 0x24);
            write_len_u32(hasher, items.len());
            for item in items {
                hash_value_criterion(hasher, item);
            }
        }
        ValueCriterion::Or(items) => {
            write_tag(hasher, 0x25);
            write_len_u32(hasher, items.len());
            for item in items {
                hash_value_criterion(hasher, item);
            }
        }
    }
}

fn write_range(hasher: &mut Sha256, range: &RangeCriterion) {
    match range.from() {
        None => write_tag(hasher, 0x00),
        Some(LowerBound { value, inclusive }) => {
            write_tag(hasher, if *inclusive { 0x01 } else { 0x02 });
            write_value(hasher, value);
        }
    }
    match range.to() {
        None => write_tag(hasher, 0x00),
        Some(UpperBound { value, inclusive }) => {
            write_tag(hasher, if *inclusive { 0x01 } else { 0x02 });
            write_value(hasher, value);
        }
    }
}

fn write_set(hasher: &mut Sha256, set: &ValueSet) {
    write_len_u32(hasher, set.len());
    for value in set {
        write_value(hasher, value);
    }
}

///
/// Encode one value with its kind tag into the hash stream.
///

fn write_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Bool(v) => {
            write_tag(hasher, 0x31);
            write_tag(hasher, u8::from(*v));
        }
        Value::Number(v) => {
            write_tag(hasher, 0x32);
            hasher.update(v.to_be_bytes());
        }
        Value::Text(v) => {
            write_tag(hasher, 0x33);
            write_str(hasher, v);
        }
        Value::Null => write_tag(hasher, 0x34),
        Value::Undefined => write_tag(hasher, 0x35),
    }
}

///
/// Encode one string with length prefix into the hash stream.
///

fn write_str(hasher: &mut Sha256, value: &str) {
    write_len_u32(hasher, value.len());
    hasher.update(value.as_bytes());
}

/// Encode a platform-sized length as u32 with deterministic saturation.
fn write_len_u32(hasher: &mut Sha256, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}
