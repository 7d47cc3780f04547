//! Module: shape
//! Responsibility: value-free capability shapes and the reshape split.
//! Does not own: concrete value algebra (see `criterion`, `entity`).
//! Boundary: shapes are built once from a schema and never mutated.

mod build;
mod model;
mod reshape;

#[cfg(test)]
mod tests;

pub use build::{Capability, EntityShapeBuilder};
pub use model::{CriterionShape, EntityShape, KindSet};
pub use reshape::{
    ReshapeConfig, Reshaped, ReshapedCriteria, ReshapedValue, reshape, reshape_criteria,
    reshape_criterion, reshape_with, shape_of, shape_of_entity,
};

use crate::schema::SchemaError;
use sieve_primitives::PrimitiveKind;
use thiserror::Error as ThisError;

///
/// ShapeError
///
/// Shape construction failures and reshape branches that fail loudly.
/// A candidate that simply does not match is not an error.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ShapeError {
    #[error("duplicate field '{field}' in entity shape")]
    DuplicateField { field: String },

    #[error("field '{field}' is both required and optional")]
    OverlappingField { field: String },

    #[error("field '{field}' declares no shapes")]
    EmptyField { field: String },

    #[error("unknown primitive kind '{label}'")]
    UnknownKind { label: String },

    #[error("field '{field}' of kind {kind} cannot answer ranges")]
    UnorderableRange { field: String, kind: PrimitiveKind },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("reshape of {what} is not implemented")]
    NotImplemented { what: &'static str },

    #[error("reshape expands into {count} alternatives, limit is {limit}")]
    FlattenLimit { count: usize, limit: usize },
}
