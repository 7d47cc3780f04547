use crate::{
    criterion::{CriterionError, RangeCriterion},
    value::{Value, ValueSet},
};
use serde::{Deserialize, Serialize};
use sieve_primitives::PrimitiveKind;
use std::{collections::BTreeSet, fmt};

///
/// ValueCriterion
///
/// Predicate over a single scalar value. Leaves are value sets and
/// intervals; `And`/`Or` compose leaves over the same field.
///
/// `And([])` is the always-true sentinel and `Or([])` the always-false one.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(
    tag = "type",
    content = "of",
    rename_all = "snake_case",
    try_from = "ValueCriterionWire"
)]
pub enum ValueCriterion {
    Equals(ValueSet),
    NotEquals(ValueSet),
    InRange(RangeCriterion),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl ValueCriterion {
    /// Match any of `values`.
    pub fn equals<V: Into<Value>>(
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, CriterionError> {
        let set: ValueSet = values.into_iter().collect();
        if set.is_empty() {
            return Err(CriterionError::EmptyValueSet { op: "equals" });
        }

        Ok(Self::Equals(set))
    }

    /// Match anything outside `values`.
    pub fn not_equals<V: Into<Value>>(
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, CriterionError> {
        let set: ValueSet = values.into_iter().collect();
        if set.is_empty() {
            return Err(CriterionError::EmptyValueSet { op: "not_equals" });
        }

        Ok(Self::NotEquals(set))
    }

    #[must_use]
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::Equals(ValueSet::single(value))
    }

    #[must_use]
    pub fn ne(value: impl Into<Value>) -> Self {
        Self::NotEquals(ValueSet::single(value))
    }

    /// `{null, undefined}`: the values no range admits.
    #[must_use]
    pub fn nullish() -> Self {
        Self::Equals([Value::Null, Value::Undefined].into_iter().collect())
    }

    #[must_use]
    pub const fn range(range: RangeCriterion) -> Self {
        Self::InRange(range)
    }

    #[must_use]
    pub const fn and(items: Vec<Self>) -> Self {
        Self::And(items)
    }

    #[must_use]
    pub const fn or(items: Vec<Self>) -> Self {
        Self::Or(items)
    }

    /// Collapse a fragment list into one criterion (`Or` when several).
    #[must_use]
    pub fn any_of(mut fragments: Vec<Self>) -> Self {
        if fragments.len() == 1 {
            fragments.remove(0)
        } else {
            Self::Or(fragments)
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        !matches!(self, Self::And(_) | Self::Or(_))
    }

    /// Primitive kinds of every literal referenced by this criterion.
    #[must_use]
    pub fn kinds(&self) -> BTreeSet<PrimitiveKind> {
        let mut out = BTreeSet::new();
        self.collect_kinds(&mut out);
        out
    }

    /// Whether `value` satisfies this criterion.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Equals(set) => set.contains(value),
            Self::NotEquals(set) => !set.contains(value),
            Self::InRange(range) => range.contains(value),
            Self::And(items) => items.iter().all(|item| item.matches(value)),
            Self::Or(items) => items.iter().any(|item| item.matches(value)),
        }
    }

    fn collect_kinds(&self, out: &mut BTreeSet<PrimitiveKind>) {
        match self {
            Self::Equals(set) | Self::NotEquals(set) => out.extend(set.kinds()),
            Self::InRange(range) => {
                out.insert(range.kind());
            }
            Self::And(items) | Self::Or(items) => {
                for item in items {
                    item.collect_kinds(out);
                }
            }
        }
    }
}

impl From<RangeCriterion> for ValueCriterion {
    fn from(range: RangeCriterion) -> Self {
        Self::InRange(range)
    }
}

impl fmt::Display for ValueCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(set) => write_set(f, set),
            Self::NotEquals(set) => {
                f.write_str("!")?;
                write_set(f, set)
            }
            Self::InRange(range) => write!(f, "{range}"),
            Self::And(items) if items.is_empty() => f.write_str("true"),
            Self::Or(items) if items.is_empty() => f.write_str("false"),
            Self::And(items) => write_joined(f, items, " & "),
            Self::Or(items) => write_joined(f, items, " | "),
        }
    }
}

///
/// ValueCriterionWire
/// Unvalidated wire form; value sets go through the checked constructors.
///

#[derive(Deserialize)]
#[serde(tag = "type", content = "of", rename_all = "snake_case")]
enum ValueCriterionWire {
    Equals(ValueSet),
    NotEquals(ValueSet),
    InRange(RangeCriterion),
    And(Vec<ValueCriterion>),
    Or(Vec<ValueCriterion>),
}

impl TryFrom<ValueCriterionWire> for ValueCriterion {
    type Error = CriterionError;

    fn try_from(wire: ValueCriterionWire) -> Result<Self, Self::Error> {
        Ok(match wire {
            ValueCriterionWire::Equals(set) => Self::equals(set)?,
            ValueCriterionWire::NotEquals(set) => Self::not_equals(set)?,
            ValueCriterionWire::InRange(range) => Self::InRange(range),
            ValueCriterionWire::And(items) => Self::And(items),
            ValueCriterionWire::Or(items) => Self::Or(items),
        })
    }
}

fn write_set(f: &mut fmt::Formatter<'_>, set: &ValueSet) -> fmt::Result {
    match set.as_single() {
        Some(value) => write!(f, "{value}"),
        None => write!(f, "{set}"),
    }
}

pub(crate) fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(")")
}
