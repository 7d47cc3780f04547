use crate::{criterion::CriterionError, value::Value};
use serde::{Deserialize, Serialize};
use sieve_primitives::{PrimitiveKind, RangeKind};
use std::{cmp::Ordering, fmt};

///
/// LowerBound
///
/// `≥ value` when inclusive, `> value` otherwise.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct LowerBound {
    pub value: Value,
    pub inclusive: bool,
}

impl LowerBound {
    #[must_use]
    pub fn inclusive(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            inclusive: true,
        }
    }

    #[must_use]
    pub fn exclusive(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            inclusive: false,
        }
    }

    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        if !self.value.is_comparable_with(value) {
            return false;
        }

        match value.cmp(&self.value) {
            Ordering::Greater => true,
            Ordering::Equal => self.inclusive,
            Ordering::Less => false,
        }
    }

    /// The upper bound of everything this bound excludes (`≥v` → `<v`, `>v` → `≤v`).
    #[must_use]
    pub fn flip(&self) -> UpperBound {
        UpperBound {
            value: self.value.clone(),
            inclusive: !self.inclusive,
        }
    }
}

///
/// UpperBound
///
/// `≤ value` when inclusive, `< value` otherwise.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct UpperBound {
    pub value: Value,
    pub inclusive: bool,
}

impl UpperBound {
    #[must_use]
    pub fn inclusive(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            inclusive: true,
        }
    }

    #[must_use]
    pub fn exclusive(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            inclusive: false,
        }
    }

    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        if !self.value.is_comparable_with(value) {
            return false;
        }

        match value.cmp(&self.value) {
            Ordering::Less => true,
            Ordering::Equal => self.inclusive,
            Ordering::Greater => false,
        }
    }

    /// The lower bound of everything this bound excludes (`≤v` → `>v`, `<v` → `≥v`).
    #[must_use]
    pub fn flip(&self) -> LowerBound {
        LowerBound {
            value: self.value.clone(),
            inclusive: !self.inclusive,
        }
    }
}

///
/// RangeCriterion
///
/// Interval over one orderable primitive kind. A missing bound is unbounded
/// on that side; at least one bound is always present and the interval is
/// never empty.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "RangeParts", into = "RangeParts")]
pub struct RangeCriterion {
    from: Option<LowerBound>,
    to: Option<UpperBound>,
}

impl RangeCriterion {
    pub fn new(from: Option<LowerBound>, to: Option<UpperBound>) -> Result<Self, CriterionError> {
        let kind = match (&from, &to) {
            (None, None) => return Err(CriterionError::UnboundedRange),
            (Some(lower), None) => lower.value.kind(),
            (None, Some(upper)) => upper.value.kind(),
            (Some(lower), Some(upper)) => {
                let (from_kind, to_kind) = (lower.value.kind(), upper.value.kind());
                if from_kind != to_kind {
                    return Err(CriterionError::RangeKindMismatch {
                        from: from_kind,
                        to: to_kind,
                    });
                }
                from_kind
            }
        };

        if !kind.supports_ordering() {
            return Err(CriterionError::UnorderableRange { kind });
        }

        let range = Self { from, to };
        if !range.is_non_empty() {
            return Err(CriterionError::EmptyRange {
                range: range.to_string(),
            });
        }

        Ok(range)
    }

    /// `[from, to]`
    pub fn closed(from: impl Into<Value>, to: impl Into<Value>) -> Result<Self, CriterionError> {
        Self::new(
            Some(LowerBound::inclusive(from)),
            Some(UpperBound::inclusive(to)),
        )
    }

    /// `(from, to)`
    pub fn open(from: impl Into<Value>, to: impl Into<Value>) -> Result<Self, CriterionError> {
        Self::new(
            Some(LowerBound::exclusive(from)),
            Some(UpperBound::exclusive(to)),
        )
    }

    pub fn at_least(from: impl Into<Value>) -> Result<Self, CriterionError> {
        Self::new(Some(LowerBound::inclusive(from)), None)
    }

    pub fn greater_than(from: impl Into<Value>) -> Result<Self, CriterionError> {
        Self::new(Some(LowerBound::exclusive(from)), None)
    }

    pub fn at_most(to: impl Into<Value>) -> Result<Self, CriterionError> {
        Self::new(None, Some(UpperBound::inclusive(to)))
    }

    pub fn less_than(to: impl Into<Value>) -> Result<Self, CriterionError> {
        Self::new(None, Some(UpperBound::exclusive(to)))
    }

    #[must_use]
    pub const fn from(&self) -> Option<&LowerBound> {
        self.from.as_ref()
    }

    #[must_use]
    pub const fn to(&self) -> Option<&UpperBound> {
        self.to.as_ref()
    }

    /// The kind every bound of this range shares.
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        self.from
            .as_ref()
            .map(|lower| lower.value.kind())
            .or_else(|| self.to.as_ref().map(|upper| upper.value.kind()))
            .unwrap_or(PrimitiveKind::Undefined)
    }

    #[must_use]
    pub fn range_kind(&self) -> Option<RangeKind> {
        self.kind().range_kind()
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        value.kind() == self.kind()
            && self.from.as_ref().is_none_or(|lower| lower.admits(value))
            && self.to.as_ref().is_none_or(|upper| upper.admits(value))
    }

    /// Whether every value of `other` is also in `self`.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && lower_reaches(self.from.as_ref(), other.from.as_ref())
            && upper_reaches(self.to.as_ref(), other.to.as_ref())
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        if self.kind() != other.kind() {
            return false;
        }

        let from = tighter_lower(self.from.as_ref(), other.from.as_ref());
        let to = tighter_upper(self.to.as_ref(), other.to.as_ref());

        interval_non_empty(from, to)
    }

    /// Build an interval that may turn out empty; `None` when it is.
    #[must_use]
    pub(crate) fn slice(from: Option<LowerBound>, to: Option<UpperBound>) -> Option<Self> {
        if from.is_none() && to.is_none() {
            return None;
        }

        let range = Self { from, to };
        range.is_non_empty().then_some(range)
    }

    /// Complement as up to two half-bounded ranges.
    #[must_use]
    pub fn invert(&self) -> Vec<Self> {
        let mut out = Vec::with_capacity(2);

        if let Some(lower) = &self.from {
            out.push(Self {
                from: None,
                to: Some(lower.flip()),
            });
        }
        if let Some(upper) = &self.to {
            out.push(Self {
                from: Some(upper.flip()),
                to: None,
            });
        }

        out
    }

    /// Subtract `covering` from `self`, returning the uncovered slices.
    /// Callers check overlap and containment first.
    #[must_use]
    pub(crate) fn slices_outside(&self, covering: &Self) -> Vec<Self> {
        let mut out = Vec::with_capacity(2);

        // slice of self before covering starts
        if let Some(cut) = &covering.from {
            let upper = tighter_upper(self.to.as_ref(), Some(&cut.flip())).cloned();
            if let Some(slice) = Self::slice(self.from.clone(), upper) {
                out.push(slice);
            }
        }

        // slice of self after covering ends
        if let Some(cut) = &covering.to {
            let lower = tighter_lower(self.from.as_ref(), Some(&cut.flip())).cloned();
            if let Some(slice) = Self::slice(lower, self.to.clone()) {
                out.push(slice);
            }
        }

        out
    }

    /// Tighten inclusive bounds whose value appears in `points`.
    /// Returns `None` when nothing changed.
    #[must_use]
    pub(crate) fn exclude_bound_points(
        &self,
        mut is_excluded: impl FnMut(&Value) -> bool,
    ) -> Option<Option<Self>> {
        let mut changed = false;

        let from = self.from.clone().map(|mut lower| {
            if lower.inclusive && is_excluded(&lower.value) {
                lower.inclusive = false;
                changed = true;
            }
            lower
        });
        let to = self.to.clone().map(|mut upper| {
            if upper.inclusive && is_excluded(&upper.value) {
                upper.inclusive = false;
                changed = true;
            }
            upper
        });

        changed.then(|| Self::slice(from, to))
    }

    fn is_non_empty(&self) -> bool {
        interval_non_empty(self.from.as_ref(), self.to.as_ref())
    }
}

impl fmt::Display for RangeCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(lower) if lower.inclusive => write!(f, "[{}", lower.value)?,
            Some(lower) => write!(f, "({}", lower.value)?,
            None => f.write_str("(-inf")?,
        }
        f.write_str(", ")?;
        match &self.to {
            Some(upper) if upper.inclusive => write!(f, "{}]", upper.value),
            Some(upper) => write!(f, "{})", upper.value),
            None => f.write_str("+inf)"),
        }
    }
}

///
/// RangeParts
/// Unvalidated wire form; deserialization goes through `RangeCriterion::new`.
///

#[derive(Deserialize, Serialize)]
struct RangeParts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<LowerBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<UpperBound>,
}

impl TryFrom<RangeParts> for RangeCriterion {
    type Error = CriterionError;

    fn try_from(parts: RangeParts) -> Result<Self, Self::Error> {
        Self::new(parts.from, parts.to)
    }
}

impl From<RangeCriterion> for RangeParts {
    fn from(range: RangeCriterion) -> Self {
        Self {
            from: range.from,
            to: range.to,
        }
    }
}

// Whether a range starting at `outer` admits everything above `inner`.
fn lower_reaches(outer: Option<&LowerBound>, inner: Option<&LowerBound>) -> bool {
    match (outer, inner) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(outer), Some(inner)) => match outer.value.cmp(&inner.value) {
            Ordering::Less => true,
            Ordering::Equal => outer.inclusive || !inner.inclusive,
            Ordering::Greater => false,
        },
    }
}

// Whether a range ending at `outer` admits everything below `inner`.
fn upper_reaches(outer: Option<&UpperBound>, inner: Option<&UpperBound>) -> bool {
    match (outer, inner) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(outer), Some(inner)) => match outer.value.cmp(&inner.value) {
            Ordering::Greater => true,
            Ordering::Equal => outer.inclusive || !inner.inclusive,
            Ordering::Less => false,
        },
    }
}

fn tighter_lower<'a>(
    left: Option<&'a LowerBound>,
    right: Option<&'a LowerBound>,
) -> Option<&'a LowerBound> {
    match (left, right) {
        (None, other) | (other, None) => other,
        (Some(left), Some(right)) => {
            if lower_reaches(Some(left), Some(right)) {
                Some(right)
            } else {
                Some(left)
            }
        }
    }
}

fn tighter_upper<'a>(
    left: Option<&'a UpperBound>,
    right: Option<&'a UpperBound>,
) -> Option<&'a UpperBound> {
    match (left, right) {
        (None, other) | (other, None) => other,
        (Some(left), Some(right)) => {
            if upper_reaches(Some(left), Some(right)) {
                Some(right)
            } else {
                Some(left)
            }
        }
    }
}

// Both orderable kinds are treated as dense: only a closed single point survives
// equal bounds.
fn interval_non_empty(from: Option<&LowerBound>, to: Option<&UpperBound>) -> bool {
    let (Some(lower), Some(upper)) = (from, to) else {
        return true;
    };

    match lower.value.cmp(&upper.value) {
        Ordering::Less => true,
        Ordering::Equal => lower.inclusive && upper.inclusive,
        Ordering::Greater => false,
    }
}
