//! Module: criterion
//! Responsibility: value-level predicates and their subtract/invert algebra.
//! Does not own: field composition (see `entity`) or capability shapes.
//! Boundary: every operation is pure; results are new criteria.

mod invert;
mod model;
mod range;
mod reduce;

#[cfg(test)]
mod tests;

pub use model::ValueCriterion;
pub use range::{LowerBound, RangeCriterion, UpperBound};
pub use reduce::subtract;

pub(crate) use model::write_joined;
pub(crate) use reduce::push_unique;

use serde::Serialize;
use sieve_primitives::PrimitiveKind;
use thiserror::Error as ThisError;

///
/// Reduction
///
/// Outcome of subtracting a covered criterion from a target.
///
/// `Unchanged` means no overlap was found and the target must be issued as is.
/// `Residual` holds the fragments still open; an empty residual means the
/// target is fully covered.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "residual", rename_all = "snake_case")]
pub enum Reduction<T> {
    Unchanged,
    Residual(Vec<T>),
}

impl<T> Reduction<T> {
    #[must_use]
    pub const fn covered() -> Self {
        Self::Residual(Vec::new())
    }

    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    #[must_use]
    pub const fn is_covered(&self) -> bool {
        matches!(self, Self::Residual(fragments) if fragments.is_empty())
    }

    #[must_use]
    pub fn residual(&self) -> Option<&[T]> {
        match self {
            Self::Unchanged => None,
            Self::Residual(fragments) => Some(fragments),
        }
    }

    /// Fragments still open, falling back to `original` when unchanged.
    #[must_use]
    pub fn into_open(self, original: impl FnOnce() -> Vec<T>) -> Vec<T> {
        match self {
            Self::Unchanged => original(),
            Self::Residual(fragments) => fragments,
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Reduction<U> {
        match self {
            Self::Unchanged => Reduction::Unchanged,
            Self::Residual(fragments) => Reduction::Residual(fragments.into_iter().map(f).collect()),
        }
    }
}

///
/// CriterionError
///
/// Construction and composition failures for concrete criteria.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CriterionError {
    #[error("value set for '{op}' must not be empty")]
    EmptyValueSet { op: &'static str },

    #[error("range must declare at least one bound")]
    UnboundedRange,

    #[error("range bounds have different kinds: {from} and {to}")]
    RangeKindMismatch {
        from: PrimitiveKind,
        to: PrimitiveKind,
    },

    #[error("range over non-orderable kind {kind}")]
    UnorderableRange { kind: PrimitiveKind },

    #[error("empty range {range}")]
    EmptyRange { range: String },

    #[error("duplicate field '{field}' in entity criterion")]
    DuplicateField { field: String },

    #[error("field '{field}' is a value criterion on one side and a nested entity criterion on the other")]
    FieldKindMismatch { field: String },
}
