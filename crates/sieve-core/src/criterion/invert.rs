use crate::criterion::ValueCriterion;

impl ValueCriterion {
    ///
    /// Logical complement as a union of criteria.
    ///
    /// The complement is exact over the values a field can hold: its own
    /// primitive kind plus `null` and `undefined`. Ranges never admit the
    /// nullish values, so a range complement always carries them.
    ///
    /// An empty result is the empty complement: `self` admits every value.
    ///
    #[must_use]
    pub fn invert(&self) -> Vec<Self> {
        match self {
            Self::Equals(set) => vec![Self::NotEquals(set.clone())],
            Self::NotEquals(set) => vec![Self::Equals(set.clone())],
            Self::InRange(range) => {
                let mut out: Vec<_> = range.invert().into_iter().map(Self::InRange).collect();
                out.push(Self::nullish());
                out
            }

            // ¬(a ∪ b) = ¬a ∩ ¬b
            Self::Or(items) => vec![Self::And(
                items.iter().map(|item| Self::any_of(item.invert())).collect(),
            )],

            // ¬(a ∩ b) = ¬a ∪ ¬b
            Self::And(items) => items.iter().flat_map(Self::invert).collect(),
        }
    }
}
