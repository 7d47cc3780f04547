use crate::{
    schema::Schema,
    shape::{CriterionShape, EntityShape, KindSet, ShapeError},
};
use serde::{Deserialize, Serialize};
use sieve_primitives::PrimitiveKind;
use std::fmt;

///
/// Capability
///
/// Predicate family a source can answer on one primitive field.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Equals,
    NotEquals,
    InArray,
    NotInArray,
    InRange,
}

impl Capability {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::InArray => "in_array",
            Self::NotInArray => "not_in_array",
            Self::InRange => "in_range",
        }
    }

    fn shape_for(self, field: &str, kind: PrimitiveKind) -> Result<CriterionShape, ShapeError> {
        let kinds = KindSet::single(kind);

        Ok(match self {
            Self::Equals => CriterionShape::Equals(kinds),
            Self::NotEquals => CriterionShape::NotEquals(kinds),
            Self::InArray => CriterionShape::InArray(kinds),
            Self::NotInArray => CriterionShape::NotInArray(kinds),
            Self::InRange => {
                let range_kind = kind.range_kind().ok_or_else(|| ShapeError::UnorderableRange {
                    field: field.to_string(),
                    kind,
                })?;
                CriterionShape::InRange(range_kind)
            }
        })
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// EntityShapeBuilder
///
/// Derives an `EntityShape` from schema field metadata. Field kinds come from
/// the schema; callers only say which predicate families each field answers.
/// The first error is kept and reported by `build`.
///

#[derive(Debug)]
pub struct EntityShapeBuilder<'a> {
    schema: &'a Schema,
    required: Vec<(String, Vec<CriterionShape>)>,
    optional: Vec<(String, Vec<CriterionShape>)>,
    error: Option<ShapeError>,
}

impl<'a> EntityShapeBuilder<'a> {
    #[must_use]
    pub const fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            required: Vec::new(),
            optional: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn required(self, field: &str, capabilities: &[Capability]) -> Self {
        self.primitive(field, capabilities, true)
    }

    #[must_use]
    pub fn optional(self, field: &str, capabilities: &[Capability]) -> Self {
        self.primitive(field, capabilities, false)
    }

    /// Required relation field; `nested` configures the related entity's shape.
    #[must_use]
    pub fn required_relation(
        self,
        field: &str,
        nested: impl FnOnce(EntityShapeBuilder<'a>) -> EntityShapeBuilder<'a>,
    ) -> Self {
        self.relation(field, nested, true)
    }

    #[must_use]
    pub fn optional_relation(
        self,
        field: &str,
        nested: impl FnOnce(EntityShapeBuilder<'a>) -> EntityShapeBuilder<'a>,
    ) -> Self {
        self.relation(field, nested, false)
    }

    pub fn build(self) -> Result<EntityShape, ShapeError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        EntityShape::new(self.required, self.optional)
    }

    fn primitive(mut self, field: &str, capabilities: &[Capability], required: bool) -> Self {
        if self.error.is_some() {
            return self;
        }

        let shapes = self
            .schema
            .primitive_kind(field)
            .map_err(ShapeError::from)
            .and_then(|kind| {
                capabilities
                    .iter()
                    .map(|capability| capability.shape_for(field, kind))
                    .collect::<Result<Vec<_>, _>>()
            });

        match shapes {
            Ok(shapes) => self.push(field, shapes, required),
            Err(err) => self.error = Some(err),
        }

        self
    }

    fn relation(
        mut self,
        field: &str,
        nested: impl FnOnce(EntityShapeBuilder<'a>) -> EntityShapeBuilder<'a>,
        required: bool,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }

        let shape = self
            .schema
            .relation(field)
            .map_err(ShapeError::from)
            .and_then(|related| nested(EntityShapeBuilder::new(related)).build());

        match shape {
            Ok(shape) => self.push(field, vec![CriterionShape::Entity(shape)], required),
            Err(err) => self.error = Some(err),
        }

        self
    }

    fn push(&mut self, field: &str, shapes: Vec<CriterionShape>, required: bool) {
        let target = if required {
            &mut self.required
        } else {
            &mut self.optional
        };
        target.push((field.to_string(), shapes));
    }
}
