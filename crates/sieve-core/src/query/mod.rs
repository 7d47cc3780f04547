//! Module: query
//! Responsibility: entity-scoped queries, their reduction against earlier
//! queries, and dispatch planning across registered sources.
//! Does not own: value or entity algebra (see `criterion`, `entity`), or
//! the reshape split itself (see `shape`).
//! Boundary: `reduce_queries` and `fingerprint` are pure; `QueryHistory` and
//! `SourceRegistry` hold state and report to a `TraceSink`.

mod dispatch;
mod fingerprint;
mod history;
mod reduce;

#[cfg(test)]
mod tests;

pub use dispatch::{Assignment, DispatchConfig, DispatchError, DispatchPlan, Source, SourceRegistry};
pub use fingerprint::{QueryFingerprint, fingerprint};
pub use history::{HistoryConfig, QueryHistory};
pub use reduce::reduce_queries;

use crate::entity::{EntityCriteria, EntityCriterion};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Query
///
/// Criteria over one named entity.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Query {
    entity: String,
    criteria: EntityCriteria,
}

impl Query {
    #[must_use]
    pub fn new(entity: impl Into<String>, criteria: impl Into<EntityCriteria>) -> Self {
        Self {
            entity: entity.into(),
            criteria: criteria.into(),
        }
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub const fn criteria(&self) -> &EntityCriteria {
        &self.criteria
    }

    /// Same entity, different criteria.
    #[must_use]
    pub fn with_criteria(&self, criteria: impl Into<EntityCriteria>) -> Self {
        Self::new(self.entity.clone(), criteria)
    }

    /// Same entity, criteria rebuilt from alternatives.
    #[must_use]
    pub fn with_alternatives(&self, alternatives: Vec<EntityCriterion>) -> Self {
        self.with_criteria(EntityCriteria::new(alternatives))
    }

    #[must_use]
    pub fn into_parts(self) -> (String, EntityCriteria) {
        (self.entity, self.criteria)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity, self.criteria)
    }
}
