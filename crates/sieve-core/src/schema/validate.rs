use crate::{
    criterion::ValueCriterion,
    entity::{EntityCriteria, EntityCriterion, FieldCriterion},
    schema::{FieldType, Schema},
};
use sieve_primitives::PrimitiveKind;
use thiserror::Error as ThisError;

///
/// ValidateError
///
/// A criterion that does not fit the schema it is issued against.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidateError {
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("invalid literal for field '{field}': expected {expected}, found {found}")]
    InvalidLiteral {
        field: String,
        expected: PrimitiveKind,
        found: PrimitiveKind,
    },

    #[error("operator {op} is not valid for field '{field}'")]
    InvalidOperator { field: String, op: &'static str },

    #[error("field '{field}' is a relation and needs nested criteria")]
    ExpectedNested { field: String },

    #[error("field '{field}' is a primitive and needs a value criterion")]
    ExpectedValue { field: String },
}

/// Check every alternative of `criteria` against `schema`, recursing into
/// nested criteria with the related schema.
pub fn validate(schema: &Schema, criteria: &EntityCriteria) -> Result<(), ValidateError> {
    criteria
        .alternatives()
        .iter()
        .try_for_each(|criterion| validate_entity(schema, criterion))
}

fn validate_entity(schema: &Schema, criterion: &EntityCriterion) -> Result<(), ValidateError> {
    for (field, field_criterion) in criterion.fields() {
        let Some(field_type) = schema.field(field) else {
            return Err(ValidateError::UnknownField {
                field: field.to_string(),
            });
        };

        match (field_type, field_criterion) {
            (FieldType::Primitive(kind), FieldCriterion::Value(value)) => {
                validate_value(field, *kind, value)?;
            }
            (FieldType::Relation(related), FieldCriterion::Entity(nested)) => {
                validate(related, nested)?;
            }
            (FieldType::Relation(_), FieldCriterion::Value(_)) => {
                return Err(ValidateError::ExpectedNested {
                    field: field.to_string(),
                });
            }
            (FieldType::Primitive(_), FieldCriterion::Entity(_)) => {
                return Err(ValidateError::ExpectedValue {
                    field: field.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn validate_value(
    field: &str,
    kind: PrimitiveKind,
    criterion: &ValueCriterion,
) -> Result<(), ValidateError> {
    match criterion {
        ValueCriterion::Equals(set) | ValueCriterion::NotEquals(set) => {
            // null and undefined are admissible for every field
            for found in set.kinds() {
                if found != kind && !found.is_nullish() {
                    return Err(ValidateError::InvalidLiteral {
                        field: field.to_string(),
                        expected: kind,
                        found,
                    });
                }
            }

            Ok(())
        }
        ValueCriterion::InRange(range) => {
            if !kind.supports_ordering() {
                return Err(ValidateError::InvalidOperator {
                    field: field.to_string(),
                    op: "in_range",
                });
            }
            if range.kind() != kind {
                return Err(ValidateError::InvalidLiteral {
                    field: field.to_string(),
                    expected: kind,
                    found: range.kind(),
                });
            }

            Ok(())
        }
        ValueCriterion::And(items) | ValueCriterion::Or(items) => items
            .iter()
            .try_for_each(|item| validate_value(field, kind, item)),
    }
}
