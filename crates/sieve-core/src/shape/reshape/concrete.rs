use crate::{
    criterion::ValueCriterion,
    entity::{EntityCriteria, EntityCriterion, FieldCriterion},
    shape::{CriterionShape, EntityShape, KindSet, ReshapeConfig, ShapeError},
};
use serde::Serialize;

///
/// ReshapedValue
///
/// Concrete split of a value criterion. `accepted` lists the alternatives the
/// candidate answers one by one; `open` is what no candidate took.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ReshapedValue {
    accepted: Vec<ValueCriterion>,
    open: Option<ValueCriterion>,
    flatten_count: usize,
}

impl ReshapedValue {
    #[must_use]
    pub fn accepted(&self) -> &[ValueCriterion] {
        &self.accepted
    }

    #[must_use]
    pub const fn open(&self) -> Option<&ValueCriterion> {
        self.open.as_ref()
    }

    #[must_use]
    pub const fn flatten_count(&self) -> usize {
        self.flatten_count
    }

    fn full(criterion: ValueCriterion) -> Self {
        Self {
            accepted: vec![criterion],
            open: None,
            flatten_count: 0,
        }
    }
}

///
/// ReshapedCriteria
///
/// Concrete split of entity criteria into the alternatives a source answers
/// and the criteria left open.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ReshapedCriteria {
    accepted: EntityCriteria,
    open: Option<EntityCriteria>,
    flatten_count: usize,
}

impl ReshapedCriteria {
    #[must_use]
    pub const fn accepted(&self) -> &EntityCriteria {
        &self.accepted
    }

    #[must_use]
    pub const fn open(&self) -> Option<&EntityCriteria> {
        self.open.as_ref()
    }

    #[must_use]
    pub const fn flatten_count(&self) -> usize {
        self.flatten_count
    }

    #[must_use]
    pub fn into_parts(self) -> (EntityCriteria, Option<EntityCriteria>) {
        (self.accepted, self.open)
    }
}

/// Split a concrete value criterion by the first matching candidate shape.
pub fn reshape_criterion(
    what: &ValueCriterion,
    by: &[CriterionShape],
    config: &ReshapeConfig,
) -> Result<Option<ReshapedValue>, ShapeError> {
    let Some(reshaped) = value_list(what, by)? else {
        return Ok(None);
    };
    config.check(reshaped.flatten_count)?;

    Ok(Some(reshaped))
}

/// Split concrete entity criteria by the first matching candidate shape.
///
/// Multi-value sets on fields whose candidate only takes single values are
/// flattened, and the accepted alternatives are the cross product of every
/// field's accepted values.
pub fn reshape_criteria(
    what: &EntityCriteria,
    by: &[CriterionShape],
    config: &ReshapeConfig,
) -> Result<Option<ReshapedCriteria>, ShapeError> {
    let Some(reshaped) = criteria_list(what, by, config)? else {
        return Ok(None);
    };
    config.check(reshaped.flatten_count)?;

    Ok(Some(reshaped))
}

/// The narrowest shape able to express `criterion`.
#[must_use]
pub fn shape_of(criterion: &ValueCriterion) -> Option<CriterionShape> {
    let shape = match criterion {
        ValueCriterion::Equals(set) => {
            let kinds: KindSet = set.kinds().into_iter().collect();
            if set.len() == 1 {
                CriterionShape::Equals(kinds)
            } else {
                CriterionShape::InArray(kinds)
            }
        }
        ValueCriterion::NotEquals(set) => {
            let kinds: KindSet = set.kinds().into_iter().collect();
            if set.len() == 1 {
                CriterionShape::NotEquals(kinds)
            } else {
                CriterionShape::NotInArray(kinds)
            }
        }
        ValueCriterion::InRange(range) => CriterionShape::InRange(range.range_kind()?),
        ValueCriterion::And(items) => {
            CriterionShape::And(items.iter().map(shape_of).collect::<Option<_>>()?)
        }
        ValueCriterion::Or(items) => {
            CriterionShape::Or(items.iter().map(shape_of).collect::<Option<_>>()?)
        }
    };

    Some(shape)
}

/// Entity shape requiring every field `criterion` constrains.
#[must_use]
pub fn shape_of_entity(criterion: &EntityCriterion) -> Option<EntityShape> {
    let required = criterion
        .fields()
        .map(|(field, field_criterion)| {
            let shapes = match field_criterion {
                FieldCriterion::Value(value) => vec![shape_of(value)?],
                FieldCriterion::Entity(nested) => nested
                    .alternatives()
                    .iter()
                    .map(|alternative| shape_of_entity(alternative).map(CriterionShape::Entity))
                    .collect::<Option<Vec<_>>>()?,
            };
            Some((field, shapes))
        })
        .collect::<Option<Vec<_>>>()?;

    EntityShape::required_only(required).ok()
}

// ---- value criteria ----------------------------------------------------

fn value_list(
    what: &ValueCriterion,
    by: &[CriterionShape],
) -> Result<Option<ReshapedValue>, ShapeError> {
    match what {
        ValueCriterion::And(_) => Err(ShapeError::NotImplemented {
            what: "and criterion",
        }),
        ValueCriterion::Or(items) => value_alternatives(items, by),
        _ => {
            for candidate in by {
                if let Some(reshaped) = value_by(what, candidate)? {
                    return Ok(Some(reshaped));
                }
            }

            Ok(None)
        }
    }
}

fn value_by(
    what: &ValueCriterion,
    candidate: &CriterionShape,
) -> Result<Option<ReshapedValue>, ShapeError> {
    let reshaped = match (candidate, what) {
        (CriterionShape::And(_), _) => {
            return Err(ShapeError::NotImplemented {
                what: "and-shape candidate",
            });
        }
        (CriterionShape::Or(alternatives), _) => return value_list(what, alternatives),

        // one alternative per accepted value
        (CriterionShape::Equals(kinds), ValueCriterion::Equals(set)) => {
            let (accepted, rest) = set.partition(|value| kinds.contains(value.kind()));
            if accepted.is_empty() {
                None
            } else {
                let accepted: Vec<_> = if accepted.len() == 1 {
                    vec![ValueCriterion::Equals(accepted)]
                } else {
                    accepted.iter().cloned().map(ValueCriterion::eq).collect()
                };
                let flatten_count = if accepted.len() > 1 { accepted.len() } else { 0 };

                Some(ReshapedValue {
                    accepted,
                    open: (!rest.is_empty()).then_some(ValueCriterion::Equals(rest)),
                    flatten_count,
                })
            }
        }

        (CriterionShape::InArray(kinds), ValueCriterion::Equals(set)) => {
            let (accepted, rest) = set.partition(|value| kinds.contains(value.kind()));
            (!accepted.is_empty()).then(|| ReshapedValue {
                accepted: vec![ValueCriterion::Equals(accepted)],
                open: (!rest.is_empty()).then_some(ValueCriterion::Equals(rest)),
                flatten_count: 0,
            })
        }

        // exclusions are all-or-nothing: a partial exclusion would admit too much
        (CriterionShape::NotEquals(kinds), ValueCriterion::NotEquals(set)) => {
            (set.len() == 1 && kinds.contains_all(&set.kinds()))
                .then(|| ReshapedValue::full(what.clone()))
        }
        (CriterionShape::NotInArray(kinds), ValueCriterion::NotEquals(set)) => {
            kinds
                .contains_all(&set.kinds())
                .then(|| ReshapedValue::full(what.clone()))
        }

        (CriterionShape::InRange(kind), ValueCriterion::InRange(range)) => {
            (range.range_kind() == Some(*kind)).then(|| ReshapedValue::full(what.clone()))
        }

        _ => None,
    };

    Ok(reshaped)
}

fn value_alternatives(
    items: &[ValueCriterion],
    by: &[CriterionShape],
) -> Result<Option<ReshapedValue>, ShapeError> {
    for (index, item) in items.iter().enumerate() {
        let Some(primary) = value_list(item, by)? else {
            continue;
        };

        let mut open: Vec<_> = primary.open.into_iter().collect();
        open.extend(
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, other)| other.clone()),
        );

        return Ok(Some(ReshapedValue {
            accepted: primary.accepted,
            open: (!open.is_empty()).then(|| ValueCriterion::any_of(open)),
            flatten_count: primary.flatten_count,
        }));
    }

    Ok(None)
}

// ---- entity criteria ---------------------------------------------------

fn criteria_list(
    what: &EntityCriteria,
    by: &[CriterionShape],
    config: &ReshapeConfig,
) -> Result<Option<ReshapedCriteria>, ShapeError> {
    let alternatives = what.alternatives();

    for (index, alternative) in alternatives.iter().enumerate() {
        let Some(primary) = entity_list(alternative, by, config)? else {
            continue;
        };

        let mut open = primary.open;
        open.extend(
            alternatives
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, other)| other.clone()),
        );

        return Ok(Some(ReshapedCriteria {
            accepted: EntityCriteria::new(primary.accepted),
            open: (!open.is_empty()).then(|| EntityCriteria::new(open)),
            flatten_count: primary.flatten_count,
        }));
    }

    Ok(None)
}

struct EntitySplit {
    accepted: Vec<EntityCriterion>,
    open: Vec<EntityCriterion>,
    flatten_count: usize,
}

fn entity_list(
    what: &EntityCriterion,
    by: &[CriterionShape],
    config: &ReshapeConfig,
) -> Result<Option<EntitySplit>, ShapeError> {
    for candidate in by {
        let split = match candidate {
            CriterionShape::Entity(shape) => entity_by(what, shape, config)?,
            CriterionShape::Or(alternatives) => entity_list(what, alternatives, config)?,
            CriterionShape::And(_) => {
                return Err(ShapeError::NotImplemented {
                    what: "and-shape candidate",
                });
            }
            _ => None,
        };

        if split.is_some() {
            return Ok(split);
        }
    }

    Ok(None)
}

fn entity_by(
    what: &EntityCriterion,
    by: &EntityShape,
    config: &ReshapeConfig,
) -> Result<Option<EntitySplit>, ShapeError> {
    if by.required().any(|(field, _)| what.get(field).is_none()) {
        return Ok(None);
    }

    let mut per_field: Vec<(&str, Vec<FieldCriterion>)> = Vec::with_capacity(what.len());
    let mut leftovers: Vec<(&str, FieldCriterion)> = Vec::new();
    let mut nested_flatten = 0;

    for (field, criterion) in what.fields() {
        // a constrained field the candidate cannot filter on
        let Some(candidates) = by.declared(field) else {
            return Ok(None);
        };

        match criterion {
            FieldCriterion::Value(value) => {
                let Some(reshaped) = value_list(value, candidates)? else {
                    return Ok(None);
                };
                per_field.push((
                    field,
                    reshaped.accepted.into_iter().map(FieldCriterion::Value).collect(),
                ));
                if let Some(open) = reshaped.open {
                    leftovers.push((field, FieldCriterion::Value(open)));
                }
            }
            FieldCriterion::Entity(nested) => {
                let Some(reshaped) = criteria_list(nested, candidates, config)? else {
                    return Ok(None);
                };
                nested_flatten += reshaped.flatten_count;
                per_field.push((field, vec![FieldCriterion::Entity(reshaped.accepted)]));
                if let Some(open) = reshaped.open {
                    leftovers.push((field, FieldCriterion::Entity(open)));
                }
            }
        }
    }

    let count = per_field
        .iter()
        .fold(1_usize, |acc, (_, alternatives)| acc.saturating_mul(alternatives.len()));
    config.check(count)?;

    let mut accepted = vec![EntityCriterion::new()];
    for (field, alternatives) in &per_field {
        accepted = accepted
            .iter()
            .flat_map(|partial| {
                alternatives
                    .iter()
                    .map(|alternative| partial.with_replaced(field, alternative.clone()))
            })
            .collect();
    }

    let open = leftovers
        .into_iter()
        .map(|(field, leftover)| what.with_replaced(field, leftover))
        .collect();
    let flattened = if count > 1 { count } else { 0 };

    Ok(Some(EntitySplit {
        accepted,
        open,
        flatten_count: flattened + nested_flatten,
    }))
}
