//! Crate-level error aggregate and its classification.
//!
//! Each module owns its own error enum; `Error` only wraps them so callers
//! crossing module boundaries can propagate with `?` and branch on
//! [`ErrorClass`]. A candidate that does not match, or a reduction that finds
//! no overlap, is never an error.

use crate::{
    criterion::CriterionError,
    query::DispatchError,
    schema::{SchemaError, ValidateError},
    shape::ShapeError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error(transparent)]
    Criterion(#[from] CriterionError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Criterion(err) => criterion_class(err),
            Self::Shape(err) => shape_class(err),
            Self::Schema(_) | Self::Validate(_) => ErrorClass::InvalidInput,
            Self::Dispatch(DispatchError::Shape(err)) => shape_class(err),
            Self::Dispatch(DispatchError::DuplicateSource { .. }) => ErrorClass::InvalidInput,
        }
    }

    /// Message prefixed with its class label.
    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {}", self.class(), self)
    }
}

const fn criterion_class(err: &CriterionError) -> ErrorClass {
    match err {
        CriterionError::FieldKindMismatch { .. } => ErrorClass::InvariantViolation,
        CriterionError::EmptyValueSet { .. }
        | CriterionError::UnboundedRange
        | CriterionError::RangeKindMismatch { .. }
        | CriterionError::UnorderableRange { .. }
        | CriterionError::EmptyRange { .. }
        | CriterionError::DuplicateField { .. } => ErrorClass::InvalidInput,
    }
}

const fn shape_class(err: &ShapeError) -> ErrorClass {
    match err {
        ShapeError::NotImplemented { .. } => ErrorClass::NotImplemented,
        ShapeError::FlattenLimit { .. } => ErrorClass::Unsupported,
        ShapeError::DuplicateField { .. }
        | ShapeError::OverlappingField { .. }
        | ShapeError::EmptyField { .. }
        | ShapeError::UnknownKind { .. }
        | ShapeError::UnorderableRange { .. }
        | ShapeError::Schema(_) => ErrorClass::InvalidInput,
    }
}

///
/// ErrorClass
/// Error taxonomy for caller-side branching.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Inputs that each look valid disagree with one another.
    InvariantViolation,
    /// Valid input beyond a configured limit.
    Unsupported,
    NotImplemented,
    InvalidInput,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvariantViolation => "invariant_violation",
            Self::Unsupported => "unsupported",
            Self::NotImplemented => "not_implemented",
            Self::InvalidInput => "invalid_input",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
