use crate::value::Value;
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use sieve_primitives::PrimitiveKind;
use std::{collections::BTreeSet, fmt};

///
/// ValueSet
///
/// Deduplicated, canonically ordered set of values.
///

#[derive(
    Clone, Debug, Default, Deref, Deserialize, Eq, Hash, IntoIterator, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct ValueSet(#[into_iterator(owned, ref)] BTreeSet<Value>);

impl ValueSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    #[must_use]
    pub fn single(value: impl Into<Value>) -> Self {
        Self(BTreeSet::from([value.into()]))
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Primitive kinds present in the set, in registry order.
    #[must_use]
    pub fn kinds(&self) -> BTreeSet<PrimitiveKind> {
        self.0.iter().map(Value::kind).collect()
    }

    /// Split into (values matching `keep`, the rest), preserving order.
    #[must_use]
    pub fn partition(&self, mut keep: impl FnMut(&Value) -> bool) -> (Self, Self) {
        let (kept, rest): (BTreeSet<_>, BTreeSet<_>) =
            self.0.iter().cloned().partition(|value| keep(value));

        (Self(kept), Self(rest))
    }

    /// The only member, if the set holds exactly one value.
    #[must_use]
    pub fn as_single(&self) -> Option<&Value> {
        if self.0.len() == 1 {
            self.0.first()
        } else {
            None
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for ValueSet {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("}")
    }
}
