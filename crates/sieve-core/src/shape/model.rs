use crate::{criterion::write_joined, fields::FieldList, shape::ShapeError};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use sieve_primitives::{PrimitiveKind, RangeKind};
use std::{collections::BTreeSet, fmt};

///
/// KindSet
///
/// Primitive kinds a value-set shape accepts, in registry order.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct KindSet(BTreeSet<PrimitiveKind>);

impl KindSet {
    #[must_use]
    pub fn single(kind: PrimitiveKind) -> Self {
        Self(BTreeSet::from([kind]))
    }

    #[must_use]
    pub fn contains(&self, kind: PrimitiveKind) -> bool {
        self.0.contains(&kind)
    }

    #[must_use]
    pub fn contains_all(&self, kinds: &BTreeSet<PrimitiveKind>) -> bool {
        kinds.is_subset(&self.0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).copied().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = PrimitiveKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<PrimitiveKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = PrimitiveKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<PrimitiveKind> for KindSet {
    fn from(kind: PrimitiveKind) -> Self {
        Self::single(kind)
    }
}

impl<const N: usize> From<[PrimitiveKind; N]> for KindSet {
    fn from(kinds: [PrimitiveKind; N]) -> Self {
        kinds.into_iter().collect()
    }
}

impl TryFrom<Vec<String>> for KindSet {
    type Error = ShapeError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        labels
            .into_iter()
            .map(|label| PrimitiveKind::from_label(&label).ok_or(ShapeError::UnknownKind { label }))
            .collect()
    }
}

impl From<KindSet> for Vec<String> {
    fn from(kinds: KindSet) -> Self {
        kinds.iter().map(|kind| kind.label().to_string()).collect()
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{kind}")?;
        }

        Ok(())
    }
}

///
/// CriterionShape
///
/// Value-free description of the predicates a side can express or answer,
/// tagged by primitive kind instead of carrying literals.
///
/// `Equals` is a single-value match and `InArray` a match against a value
/// set; `NotEquals` and `NotInArray` are their complements.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "CriterionShapeWire", into = "CriterionShapeWire")]
pub enum CriterionShape {
    Equals(KindSet),
    NotEquals(KindSet),
    InArray(KindSet),
    NotInArray(KindSet),
    InRange(RangeKind),
    Entity(EntityShape),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl CriterionShape {
    #[must_use]
    pub fn eq(kinds: impl Into<KindSet>) -> Self {
        Self::Equals(kinds.into())
    }

    #[must_use]
    pub fn ne(kinds: impl Into<KindSet>) -> Self {
        Self::NotEquals(kinds.into())
    }

    #[must_use]
    pub fn in_array(kinds: impl Into<KindSet>) -> Self {
        Self::InArray(kinds.into())
    }

    #[must_use]
    pub fn not_in_array(kinds: impl Into<KindSet>) -> Self {
        Self::NotInArray(kinds.into())
    }

    #[must_use]
    pub const fn range(kind: RangeKind) -> Self {
        Self::InRange(kind)
    }

    /// Collapse shapes into one (`Or` when several).
    #[must_use]
    pub fn any_of(mut shapes: Vec<Self>) -> Self {
        if shapes.len() == 1 {
            shapes.remove(0)
        } else {
            Self::Or(shapes)
        }
    }
}

impl From<EntityShape> for CriterionShape {
    fn from(shape: EntityShape) -> Self {
        Self::Entity(shape)
    }
}

impl fmt::Display for CriterionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(kinds) => write!(f, "eq({kinds})"),
            Self::NotEquals(kinds) => write!(f, "ne({kinds})"),
            Self::InArray(kinds) => write!(f, "in({kinds})"),
            Self::NotInArray(kinds) => write!(f, "nin({kinds})"),
            Self::InRange(kind) => write!(f, "range({kind})"),
            Self::Entity(shape) => write!(f, "{shape}"),
            Self::And(items) => write_joined(f, items, " & "),
            Self::Or(items) => write_joined(f, items, " | "),
        }
    }
}

///
/// CriterionShapeWire
/// Tagged wire form; range kinds travel as their primitive label.
///

#[derive(Deserialize, Serialize)]
#[serde(tag = "type", content = "of", rename_all = "snake_case")]
enum CriterionShapeWire {
    Equals(KindSet),
    NotEquals(KindSet),
    InArray(KindSet),
    NotInArray(KindSet),
    InRange(RangeKindLabel),
    Entity(EntityShape),
    And(Vec<CriterionShape>),
    Or(Vec<CriterionShape>),
}

impl From<CriterionShapeWire> for CriterionShape {
    fn from(wire: CriterionShapeWire) -> Self {
        match wire {
            CriterionShapeWire::Equals(kinds) => Self::Equals(kinds),
            CriterionShapeWire::NotEquals(kinds) => Self::NotEquals(kinds),
            CriterionShapeWire::InArray(kinds) => Self::InArray(kinds),
            CriterionShapeWire::NotInArray(kinds) => Self::NotInArray(kinds),
            CriterionShapeWire::InRange(RangeKindLabel(kind)) => Self::InRange(kind),
            CriterionShapeWire::Entity(shape) => Self::Entity(shape),
            CriterionShapeWire::And(items) => Self::And(items),
            CriterionShapeWire::Or(items) => Self::Or(items),
        }
    }
}

impl From<CriterionShape> for CriterionShapeWire {
    fn from(shape: CriterionShape) -> Self {
        match shape {
            CriterionShape::Equals(kinds) => Self::Equals(kinds),
            CriterionShape::NotEquals(kinds) => Self::NotEquals(kinds),
            CriterionShape::InArray(kinds) => Self::InArray(kinds),
            CriterionShape::NotInArray(kinds) => Self::NotInArray(kinds),
            CriterionShape::InRange(kind) => Self::InRange(RangeKindLabel(kind)),
            CriterionShape::Entity(shape) => Self::Entity(shape),
            CriterionShape::And(items) => Self::And(items),
            CriterionShape::Or(items) => Self::Or(items),
        }
    }
}

struct RangeKindLabel(RangeKind);

impl Serialize for RangeKindLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.primitive().label())
    }
}

impl<'de> Deserialize<'de> for RangeKindLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;

        PrimitiveKind::from_label(&label)
            .and_then(PrimitiveKind::range_kind)
            .map(Self)
            .ok_or_else(|| de::Error::custom(format!("'{label}' is not a range kind")))
    }
}

///
/// EntityShape
///
/// Field-level capability of an entity: `required` fields must be
/// constrained, `optional` ones may be. Each field lists the alternative
/// shapes it accepts. The two key sets are disjoint.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "EntityShapeWire", into = "EntityShapeWire")]
pub struct EntityShape {
    required: Vec<(String, Vec<CriterionShape>)>,
    optional: Vec<(String, Vec<CriterionShape>)>,
}

impl EntityShape {
    pub fn new<K>(
        required: impl IntoIterator<Item = (K, Vec<CriterionShape>)>,
        optional: impl IntoIterator<Item = (K, Vec<CriterionShape>)>,
    ) -> Result<Self, ShapeError>
    where
        K: Into<String>,
    {
        let required = collect_fields(required)?;
        let optional = collect_fields(optional)?;

        if let Some((field, _)) = optional
            .iter()
            .find(|(name, _)| required.iter().any(|(other, _)| other == name))
        {
            return Err(ShapeError::OverlappingField {
                field: field.clone(),
            });
        }

        Ok(Self { required, optional })
    }

    /// Shape with required fields only.
    pub fn required_only<K>(
        required: impl IntoIterator<Item = (K, Vec<CriterionShape>)>,
    ) -> Result<Self, ShapeError>
    where
        K: Into<String>,
    {
        Self::new(required, Vec::<(K, Vec<CriterionShape>)>::new())
    }

    pub fn required(&self) -> impl Iterator<Item = (&str, &[CriterionShape])> {
        self.required
            .iter()
            .map(|(name, shapes)| (name.as_str(), shapes.as_slice()))
    }

    pub fn optional(&self) -> impl Iterator<Item = (&str, &[CriterionShape])> {
        self.optional
            .iter()
            .map(|(name, shapes)| (name.as_str(), shapes.as_slice()))
    }

    /// Every field, required ones first, with its requiredness.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[CriterionShape], bool)> {
        self.required()
            .map(|(name, shapes)| (name, shapes, true))
            .chain(self.optional().map(|(name, shapes)| (name, shapes, false)))
    }

    #[must_use]
    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|(name, _)| name == field)
    }

    /// Shapes declared for `field`, required or optional.
    #[must_use]
    pub fn declared(&self, field: &str) -> Option<&[CriterionShape]> {
        self.required
            .iter()
            .chain(&self.optional)
            .find_map(|(name, shapes)| (name == field).then_some(shapes.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }

    // Internal constructor for shapes assembled from already-checked parts.
    pub(crate) const fn from_parts(
        required: Vec<(String, Vec<CriterionShape>)>,
        optional: Vec<(String, Vec<CriterionShape>)>,
    ) -> Self {
        Self { required, optional }
    }

    /// Copy where `field` is required and declares only `shape`.
    #[must_use]
    pub(crate) fn with_required_field(&self, field: &str, shape: CriterionShape) -> Self {
        let mut required: Vec<_> = self
            .required
            .iter()
            .map(|(name, shapes)| {
                if name == field {
                    (name.clone(), vec![shape.clone()])
                } else {
                    (name.clone(), shapes.clone())
                }
            })
            .collect();
        let optional = self
            .optional
            .iter()
            .filter(|(name, _)| name != field)
            .cloned()
            .collect();
        if !self.is_required(field) {
            required.push((field.to_string(), vec![shape]));
        }

        Self { required, optional }
    }
}

impl fmt::Display for EntityShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }

        f.write_str("{ ")?;
        for (i, (name, shapes, required)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let marker = if required { "" } else { "?" };
            write!(f, "{name}{marker}: ")?;
            for (j, shape) in shapes.iter().enumerate() {
                if j > 0 {
                    f.write_str(" | ")?;
                }
                write!(f, "{shape}")?;
            }
        }
        f.write_str(" }")
    }
}

fn collect_fields<K: Into<String>>(
    fields: impl IntoIterator<Item = (K, Vec<CriterionShape>)>,
) -> Result<Vec<(String, Vec<CriterionShape>)>, ShapeError> {
    let mut out: Vec<(String, Vec<CriterionShape>)> = Vec::new();

    for (name, shapes) in fields {
        let name = name.into();
        if out.iter().any(|(seen, _)| *seen == name) {
            return Err(ShapeError::DuplicateField { field: name });
        }
        if shapes.is_empty() {
            return Err(ShapeError::EmptyField { field: name });
        }
        out.push((name, shapes));
    }

    Ok(out)
}

///
/// EntityShapeWire
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EntityShapeWire {
    #[serde(default)]
    required: FieldList<Vec<CriterionShape>>,
    #[serde(default)]
    optional: FieldList<Vec<CriterionShape>>,
}

impl TryFrom<EntityShapeWire> for EntityShape {
    type Error = ShapeError;

    fn try_from(wire: EntityShapeWire) -> Result<Self, Self::Error> {
        Self::new(wire.required.0, wire.optional.0)
    }
}

impl From<EntityShape> for EntityShapeWire {
    fn from(shape: EntityShape) -> Self {
        Self {
            required: FieldList(shape.required),
            optional: FieldList(shape.optional),
        }
    }
}
