//! Module: schema
//! Responsibility: the entity schema contract consumed by shape building and validation.
//! Does not own: how schemas are declared or registered by the host application.
//! Boundary: schemas are immutable once built and shared by `Arc`.

mod validate;


pub use validate::{ValidateError, validate};

use sieve_primitives::PrimitiveKind;
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// FieldType
///
/// Declared type of one schema field.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldType {
    Primitive(PrimitiveKind),
    Relation(Arc<Schema>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::Relation(schema) => write!(f, "relation<{}>", schema.name()),
        }
    }
}

///
/// Schema
///
/// Named entity type with ordered, uniquely named fields.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<(String, FieldType)>,
}

impl Schema {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields
            .iter()
            .find_map(|(field, ty)| (field == name).then_some(ty))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    /// Primitive kind of a scalar field.
    pub fn primitive_kind(&self, field: &str) -> Result<PrimitiveKind, SchemaError> {
        match self.field(field) {
            Some(FieldType::Primitive(kind)) => Ok(*kind),
            Some(FieldType::Relation(_)) => Err(SchemaError::NotPrimitive {
                schema: self.name.clone(),
                field: field.to_string(),
            }),
            None => Err(self.unknown(field)),
        }
    }

    /// Schema on the other side of a relation field.
    pub fn relation(&self, field: &str) -> Result<&Arc<Self>, SchemaError> {
        match self.field(field) {
            Some(FieldType::Relation(schema)) => Ok(schema),
            Some(FieldType::Primitive(_)) => Err(SchemaError::NotRelation {
                schema: self.name.clone(),
                field: field.to_string(),
            }),
            None => Err(self.unknown(field)),
        }
    }

    fn unknown(&self, field: &str) -> SchemaError {
        SchemaError::UnknownField {
            schema: self.name.clone(),
            field: field.to_string(),
        }
    }
}

///
/// SchemaBuilder
///

#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<(String, FieldType)>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn primitive(mut self, field: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.fields.push((field.into(), FieldType::Primitive(kind)));
        self
    }

    #[must_use]
    pub fn relation(mut self, field: impl Into<String>, schema: Arc<Schema>) -> Self {
        self.fields.push((field.into(), FieldType::Relation(schema)));
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        for (i, (field, ty)) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|(seen, _)| seen == field) {
                return Err(SchemaError::DuplicateField {
                    schema: self.name,
                    field: field.clone(),
                });
            }

            if let FieldType::Primitive(kind) = ty
                && kind.is_nullish()
            {
                return Err(SchemaError::NullishField {
                    schema: self.name,
                    field: field.clone(),
                    kind: *kind,
                });
            }
        }

        Ok(Schema {
            name: self.name,
            fields: self.fields,
        })
    }
}

///
/// SchemaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("schema '{schema}' has no field '{field}'")]
    UnknownField { schema: String, field: String },

    #[error("schema '{schema}' declares field '{field}' twice")]
    DuplicateField { schema: String, field: String },

    #[error("field '{schema}.{field}' is a relation, not a primitive")]
    NotPrimitive { schema: String, field: String },

    #[error("field '{schema}.{field}' is a primitive, not a relation")]
    NotRelation { schema: String, field: String },

    #[error("field '{schema}.{field}' cannot be declared as {kind}")]
    NullishField {
        schema: String,
        field: String,
        kind: PrimitiveKind,
    },
}
