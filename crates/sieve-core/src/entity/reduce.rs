use crate::{
    criterion::{CriterionError, Reduction, ValueCriterion, push_unique, subtract},
    entity::{EntityCriteria, EntityCriterion, FieldCriterion},
};

///
/// Subtract one entity conjunction from another.
///
/// The uncovered part of `target` is the union, over every field `k` that
/// `covered` constrains, of `target` with `k` narrowed to `target.k \ covered.k`.
/// Fields fully covered contribute nothing; a field with no overlap leaves
/// the whole conjunction `Unchanged`.
///
/// A field constrained by `covered` but absent from `target` is
/// unconstrained there, so its residual is the complement of `covered.k`.
///
pub fn subtract_entity(
    covered: &EntityCriterion,
    target: &EntityCriterion,
) -> Result<Reduction<EntityCriterion>, CriterionError> {
    if covered == target {
        return Ok(Reduction::covered());
    }

    let mut alternatives = Vec::new();

    for (name, covering) in covered.fields() {
        let Some(residual) = subtract_field(name, covering, target.get(name))? else {
            return Ok(Reduction::Unchanged);
        };

        if let Some(residual) = residual {
            alternatives.push(target.with_replaced(name, residual));
        }
    }

    Ok(Reduction::Residual(alternatives))
}

///
/// Subtract entity criteria from entity criteria.
///
/// Every alternative of `target` is folded through every alternative of
/// `covered`; fragments untouched by one alternative are carried to the next.
///
pub fn subtract_criteria(
    covered: &EntityCriteria,
    target: &EntityCriteria,
) -> Result<Reduction<EntityCriterion>, CriterionError> {
    if covered == target || target.is_empty() {
        return Ok(Reduction::covered());
    }

    let mut reduced = false;
    let mut open = target.alternatives().to_vec();

    for alternative in covered.alternatives() {
        let mut next = Vec::with_capacity(open.len());
        for fragment in open {
            match subtract_entity(alternative, &fragment)? {
                Reduction::Unchanged => push_unique(&mut next, fragment),
                Reduction::Residual(fragments) => {
                    reduced = true;
                    for fragment in fragments {
                        push_unique(&mut next, fragment);
                    }
                }
            }
        }

        open = next;
        if open.is_empty() {
            break;
        }
    }

    Ok(if reduced {
        Reduction::Residual(open)
    } else {
        Reduction::Unchanged
    })
}

// Outer None: no overlap on this field. Inner None: field fully covered.
fn subtract_field(
    name: &str,
    covering: &FieldCriterion,
    target: Option<&FieldCriterion>,
) -> Result<Option<Option<FieldCriterion>>, CriterionError> {
    let residual: Option<FieldCriterion> = match (covering, target) {
        (FieldCriterion::Value(covering), None) => {
            let complement = covering.invert();
            (!complement.is_empty()).then(|| ValueCriterion::any_of(complement).into())
        }

        // no known complement for nested criteria
        (FieldCriterion::Entity(_), None) => return Ok(None),

        (FieldCriterion::Value(covering), Some(FieldCriterion::Value(target))) => {
            match subtract(covering, target) {
                Reduction::Unchanged => return Ok(None),
                Reduction::Residual(fragments) if fragments.is_empty() => None,
                Reduction::Residual(fragments) => Some(ValueCriterion::any_of(fragments).into()),
            }
        }

        (FieldCriterion::Entity(covering), Some(FieldCriterion::Entity(target))) => {
            match subtract_criteria(covering, target)? {
                Reduction::Unchanged => return Ok(None),
                Reduction::Residual(fragments) if fragments.is_empty() => None,
                Reduction::Residual(fragments) => Some(EntityCriteria::new(fragments).into()),
            }
        }

        (FieldCriterion::Value(_), Some(FieldCriterion::Entity(_)))
        | (FieldCriterion::Entity(_), Some(FieldCriterion::Value(_))) => {
            return Err(CriterionError::FieldKindMismatch {
                field: name.to_string(),
            });
        }
    };

    Ok(Some(residual))
}
