//! Scalar values carried by concrete criteria.
//!
//! Values are totally ordered: canonical rank first (boolean, number, string,
//! null, undefined), then natural order inside a rank. Every value set in the
//! crate is ordered this way, which keeps renderings and reductions
//! deterministic.

mod number;
mod set;


pub use number::{Number, NumberError};
pub use set::ValueSet;

use serde::{Deserialize, Serialize};
use sieve_primitives::PrimitiveKind;
use std::fmt;

///
/// Value
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    #[serde(rename = "boolean")]
    Bool(bool),
    #[serde(rename = "number")]
    Number(Number),
    #[serde(rename = "string")]
    Text(String),
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "undefined")]
    Undefined,
}

impl Value {
    /// Build a number value, rejecting non-finite input.
    #[must_use]
    pub fn number(v: f64) -> Option<Self> {
        Number::try_new(v).map(Self::Number)
    }

    #[must_use]
    pub fn text(v: impl Into<String>) -> Self {
        Self::Text(v.into())
    }

    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Number(_) => PrimitiveKind::Number,
            Self::Text(_) => PrimitiveKind::Text,
            Self::Null => PrimitiveKind::Null,
            Self::Undefined => PrimitiveKind::Undefined,
        }
    }

    /// Canonical rank used as the first ordering key.
    #[must_use]
    pub const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
            Self::Null => 3,
            Self::Undefined => 4,
        }
    }

    /// Whether two values can meet in an interval comparison.
    #[must_use]
    pub fn is_comparable_with(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.kind().supports_ordering()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "\"{v}\""),
            Self::Null => f.write_str("null"),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(Number::from(v))
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
