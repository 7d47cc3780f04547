//! Core predicate algebra for sieve: values, value and entity criteria,
//! capability shapes and the reshape split, and query reduction and
//! dispatch planning on top of them.

mod fields;

// public exports are one module level down
pub mod criterion;
pub mod entity;
pub mod error;
pub mod obs;
pub mod query;
pub mod schema;
pub mod shape;
pub mod value;

pub use error::{Error, ErrorClass};
pub use sieve_primitives::{PrimitiveKind, RangeKind};

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or registries are re-exported here.
///

pub mod prelude {
    pub use crate::{
        PrimitiveKind, RangeKind,
        criterion::{Reduction, ValueCriterion},
        entity::{EntityCriteria, EntityCriterion, FieldCriterion},
        query::Query,
        shape::{CriterionShape, EntityShape},
        value::Value,
    };
}
