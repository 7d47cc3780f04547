//! Module: shape::reshape
//! Responsibility: split a shape (or a concrete criterion) into the part a
//! candidate list answers and the open remainder.
//! Does not own: choosing sources or recursing on the open part (see `query::dispatch`).
//! Boundary: candidates are tried in order and the first match wins.

mod concrete;

pub use concrete::{
    ReshapedCriteria, ReshapedValue, reshape_criteria, reshape_criterion, shape_of,
    shape_of_entity,
};

use crate::shape::{CriterionShape, EntityShape, KindSet, ShapeError};
use serde::Serialize;

///
/// ReshapeConfig
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReshapeConfig {
    /// Upper bound on the alternatives a single match may expand into.
    pub max_flatten: usize,
}

impl ReshapeConfig {
    pub const DEFAULT_MAX_FLATTEN: usize = 256;

    pub(crate) const fn check(&self, count: usize) -> Result<(), ShapeError> {
        if count > self.max_flatten {
            return Err(ShapeError::FlattenLimit {
                count,
                limit: self.max_flatten,
            });
        }

        Ok(())
    }
}

impl Default for ReshapeConfig {
    fn default() -> Self {
        Self {
            max_flatten: Self::DEFAULT_MAX_FLATTEN,
        }
    }
}

///
/// Reshaped
///
/// Result of a shape-level reshape. `reshaped` is expressible by the matched
/// candidate, `open` is what it left over, and `flatten_count` records how
/// many set-to-scalar demotions the match needed.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Reshaped {
    reshaped: CriterionShape,
    open: Option<CriterionShape>,
    flatten_count: usize,
}

impl Reshaped {
    #[must_use]
    pub const fn reshaped(&self) -> &CriterionShape {
        &self.reshaped
    }

    #[must_use]
    pub const fn open(&self) -> Option<&CriterionShape> {
        self.open.as_ref()
    }

    #[must_use]
    pub const fn flatten_count(&self) -> usize {
        self.flatten_count
    }

    fn full(reshaped: CriterionShape) -> Self {
        Self {
            reshaped,
            open: None,
            flatten_count: 0,
        }
    }
}

/// Reshape `what` by the first matching candidate of `by`, with default limits.
///
/// `Ok(None)` means no candidate matched.
pub fn reshape(what: &CriterionShape, by: &[CriterionShape]) -> Result<Option<Reshaped>, ShapeError> {
    reshape_with(what, by, &ReshapeConfig::default())
}

pub fn reshape_with(
    what: &CriterionShape,
    by: &[CriterionShape],
    config: &ReshapeConfig,
) -> Result<Option<Reshaped>, ShapeError> {
    let Some(reshaped) = reshape_list(what, by)? else {
        return Ok(None);
    };
    config.check(reshaped.flatten_count)?;

    Ok(Some(reshaped))
}

fn reshape_list(what: &CriterionShape, by: &[CriterionShape]) -> Result<Option<Reshaped>, ShapeError> {
    match what {
        CriterionShape::And(_) => Err(ShapeError::NotImplemented {
            what: "and-shape input",
        }),
        CriterionShape::Or(alternatives) => reshape_alternatives(alternatives, by),
        _ => {
            for candidate in by {
                if let Some(reshaped) = reshape_by(what, candidate)? {
                    return Ok(Some(reshaped));
                }
            }

            Ok(None)
        }
    }
}

fn reshape_by(what: &CriterionShape, candidate: &CriterionShape) -> Result<Option<Reshaped>, ShapeError> {
    use CriterionShape as S;

    let reshaped = match (candidate, what) {
        (S::And(_), _) => {
            return Err(ShapeError::NotImplemented {
                what: "and-shape candidate",
            });
        }
        (S::Or(alternatives), _) => return reshape_list(what, alternatives),

        (S::Equals(by), S::Equals(kinds)) => split_kinds(kinds, by, S::Equals, S::Equals, 0),
        // set demoted to per-value matches
        (S::Equals(by), S::InArray(kinds)) => split_kinds(kinds, by, S::Equals, S::InArray, 1),

        (S::InArray(by), S::InArray(kinds)) => split_kinds(kinds, by, S::InArray, S::InArray, 0),
        (S::InArray(by), S::Equals(kinds)) => split_kinds(kinds, by, S::InArray, S::Equals, 0),

        (S::NotEquals(by), S::NotEquals(kinds)) => {
            split_kinds(kinds, by, S::NotEquals, S::NotEquals, 0)
        }
        (S::NotEquals(by), S::NotInArray(kinds)) => {
            split_kinds(kinds, by, S::NotEquals, S::NotInArray, 1)
        }

        (S::NotInArray(by), S::NotInArray(kinds)) => {
            split_kinds(kinds, by, S::NotInArray, S::NotInArray, 0)
        }
        (S::NotInArray(by), S::NotEquals(kinds)) => {
            split_kinds(kinds, by, S::NotInArray, S::NotEquals, 0)
        }

        (S::InRange(by), S::InRange(kind)) if by == kind => Some(Reshaped::full(what.clone())),

        (S::Entity(by), S::Entity(shape)) => reshape_entity(shape, by)?,

        _ => None,
    };

    Ok(reshaped)
}

fn split_kinds(
    what: &KindSet,
    by: &KindSet,
    matched: fn(KindSet) -> CriterionShape,
    leftover: fn(KindSet) -> CriterionShape,
    flatten_count: usize,
) -> Option<Reshaped> {
    let overlap = what.intersection(by);
    if overlap.is_empty() {
        return None;
    }
    let rest = what.difference(by);

    Some(Reshaped {
        reshaped: matched(overlap),
        open: (!rest.is_empty()).then(|| leftover(rest)),
        flatten_count,
    })
}

// First alternative that matches is the primary; all others stay open.
fn reshape_alternatives(
    alternatives: &[CriterionShape],
    by: &[CriterionShape],
) -> Result<Option<Reshaped>, ShapeError> {
    for (index, alternative) in alternatives.iter().enumerate() {
        let Some(primary) = reshape_list(alternative, by)? else {
            continue;
        };

        let mut open: Vec<_> = primary.open.into_iter().collect();
        open.extend(
            alternatives
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, other)| other.clone()),
        );

        return Ok(Some(Reshaped {
            reshaped: primary.reshaped,
            open: (!open.is_empty()).then(|| CriterionShape::any_of(open)),
            flatten_count: primary.flatten_count,
        }));
    }

    Ok(None)
}

fn reshape_entity(what: &EntityShape, by: &EntityShape) -> Result<Option<Reshaped>, ShapeError> {
    // the candidate may only insist on fields the input always constrains
    if by.required().any(|(field, _)| !what.is_required(field)) {
        return Ok(None);
    }
    // and must be able to answer every field the input always constrains
    if what.required().any(|(field, _)| by.declared(field).is_none()) {
        return Ok(None);
    }

    let mut required = Vec::new();
    let mut optional = Vec::new();
    let mut leftovers = Vec::new();
    let mut flatten_count = 0;

    for (field, shapes, is_required) in what.fields() {
        // only optional fields get here undeclared; they stay open as they are
        let Some(candidates) = by.declared(field) else {
            leftovers.push((field, CriterionShape::any_of(shapes.to_vec())));
            continue;
        };

        let mut accepted = Vec::new();
        let mut left = Vec::new();
        for shape in shapes {
            match reshape_list(shape, candidates)? {
                Some(reshaped) => {
                    flatten_count += reshaped.flatten_count;
                    accepted.push(reshaped.reshaped);
                    left.extend(reshaped.open);
                }
                None => left.push(shape.clone()),
            }
        }

        if accepted.is_empty() {
            if is_required {
                return Ok(None);
            }
            leftovers.push((field, CriterionShape::any_of(left)));
            continue;
        }

        if !left.is_empty() {
            leftovers.push((field, CriterionShape::any_of(left)));
        }
        if is_required {
            required.push((field.to_string(), accepted));
        } else {
            optional.push((field.to_string(), accepted));
        }
    }

    let open: Vec<_> = leftovers
        .into_iter()
        .map(|(field, leftover)| CriterionShape::Entity(what.with_required_field(field, leftover)))
        .collect();

    Ok(Some(Reshaped {
        reshaped: CriterionShape::Entity(EntityShape::from_parts(required, optional)),
        open: (!open.is_empty()).then(|| CriterionShape::any_of(open)),
        flatten_count,
    }))
}
