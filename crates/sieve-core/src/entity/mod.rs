//! Module: entity
//! Responsibility: field conjunctions over value criteria and their alternatives.
//! Does not own: value-level subtraction rules (see `criterion`).
//! Boundary: field names are opaque here; schema checks live in `schema::validate`.

mod reduce;


pub use reduce::{subtract_criteria, subtract_entity};

use crate::{
    criterion::{CriterionError, Reduction, ValueCriterion, write_joined},
    fields::FieldList,
};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// FieldCriterion
///
/// Criterion attached to one field: a value predicate, or nested criteria
/// over a related entity.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldCriterion {
    Value(ValueCriterion),
    Entity(EntityCriteria),
}

impl FieldCriterion {
    #[must_use]
    pub const fn as_value(&self) -> Option<&ValueCriterion> {
        match self {
            Self::Value(criterion) => Some(criterion),
            Self::Entity(_) => None,
        }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&EntityCriteria> {
        match self {
            Self::Value(_) => None,
            Self::Entity(criteria) => Some(criteria),
        }
    }
}

impl From<ValueCriterion> for FieldCriterion {
    fn from(criterion: ValueCriterion) -> Self {
        Self::Value(criterion)
    }
}

impl From<EntityCriteria> for FieldCriterion {
    fn from(criteria: EntityCriteria) -> Self {
        Self::Entity(criteria)
    }
}

impl From<EntityCriterion> for FieldCriterion {
    fn from(criterion: EntityCriterion) -> Self {
        Self::Entity(EntityCriteria::from(criterion))
    }
}

impl fmt::Display for FieldCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(criterion) => write!(f, "{criterion}"),
            Self::Entity(criteria) => write!(f, "{criteria}"),
        }
    }
}

///
/// EntityCriterion
///
/// Conjunction of field criteria. Fields keep insertion order and names are
/// unique; a field that is not listed is unconstrained.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(
    try_from = "FieldList<FieldCriterion>",
    into = "FieldList<FieldCriterion>"
)]
pub struct EntityCriterion {
    fields: Vec<(String, FieldCriterion)>,
}

impl EntityCriterion {
    /// The empty conjunction, matching every entity.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn from_fields<K, C>(
        fields: impl IntoIterator<Item = (K, C)>,
    ) -> Result<Self, CriterionError>
    where
        K: Into<String>,
        C: Into<FieldCriterion>,
    {
        let mut out = Self::new();
        for (name, criterion) in fields {
            out.insert(name, criterion)?;
        }

        Ok(out)
    }

    /// Builder form of [`Self::insert`].
    pub fn with(
        mut self,
        name: impl Into<String>,
        criterion: impl Into<FieldCriterion>,
    ) -> Result<Self, CriterionError> {
        self.insert(name, criterion)?;
        Ok(self)
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        criterion: impl Into<FieldCriterion>,
    ) -> Result<(), CriterionError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(CriterionError::DuplicateField { field: name });
        }

        self.fields.push((name, criterion.into()));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldCriterion> {
        self.fields
            .iter()
            .find_map(|(field, criterion)| (field == name).then_some(criterion))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldCriterion)> {
        self.fields
            .iter()
            .map(|(name, criterion)| (name.as_str(), criterion))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy with `name` set to `criterion`, in place when present, appended otherwise.
    #[must_use]
    pub fn with_replaced(&self, name: &str, criterion: FieldCriterion) -> Self {
        let mut fields = self.fields.clone();
        match fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => *slot = criterion,
            None => fields.push((name.to_string(), criterion)),
        }

        Self { fields }
    }

    /// Copy with `name` removed.
    #[must_use]
    pub fn without(&self, name: &str) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(field, _)| field != name)
                .cloned()
                .collect(),
        }
    }

    /// The part of `target` this conjunction does not cover.
    pub fn reduce(&self, target: &Self) -> Result<Reduction<Self>, CriterionError> {
        subtract_entity(self, target)
    }
}

impl fmt::Display for EntityCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str("{}");
        }

        f.write_str("{ ")?;
        for (i, (name, criterion)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {criterion}")?;
        }
        f.write_str(" }")
    }
}

impl TryFrom<FieldList<FieldCriterion>> for EntityCriterion {
    type Error = CriterionError;

    fn try_from(wire: FieldList<FieldCriterion>) -> Result<Self, Self::Error> {
        Self::from_fields(wire.0)
    }
}

impl From<EntityCriterion> for FieldList<FieldCriterion> {
    fn from(criterion: EntityCriterion) -> Self {
        Self(criterion.fields)
    }
}

///
/// EntityCriteria
///
/// Alternatives of entity conjunctions; at least one must hold. No
/// alternatives at all matches nothing.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntityCriteria {
    alternatives: Vec<EntityCriterion>,
}

impl EntityCriteria {
    #[must_use]
    pub const fn new(alternatives: Vec<EntityCriterion>) -> Self {
        Self { alternatives }
    }

    #[must_use]
    pub fn alternatives(&self) -> &[EntityCriterion] {
        &self.alternatives
    }

    #[must_use]
    pub fn into_alternatives(self) -> Vec<EntityCriterion> {
        self.alternatives
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// The part of `target` none of these alternatives cover.
    pub fn reduce(&self, target: &Self) -> Result<Reduction<EntityCriterion>, CriterionError> {
        subtract_criteria(self, target)
    }
}

impl From<EntityCriterion> for EntityCriteria {
    fn from(criterion: EntityCriterion) -> Self {
        Self::new(vec![criterion])
    }
}

impl FromIterator<EntityCriterion> for EntityCriteria {
    fn from_iter<I: IntoIterator<Item = EntityCriterion>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for EntityCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alternatives.as_slice() {
            [] => f.write_str("false"),
            [single] => write!(f, "{single}"),
            many => write_joined(f, many, " | "),
        }
    }
}
