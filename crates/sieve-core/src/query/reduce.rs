use crate::{
    criterion::{CriterionError, Reduction, push_unique},
    entity::{EntityCriterion, subtract_entity},
    query::Query,
};

///
/// Reduce `incoming` by every earlier query of the same entity.
///
/// Every alternative of `incoming` is folded through every alternative of
/// every earlier query; fragments one query leaves untouched are carried to
/// the next. `Unchanged` when nothing reduced anything, so the original can
/// be issued as is. Otherwise the residual lists the alternatives still to
/// fetch, and an empty residual means `incoming` is already answered.
/// Criteria with no alternatives match nothing and are always answered.
///
pub fn reduce_queries<'a>(
    history: impl IntoIterator<Item = &'a Query>,
    incoming: &Query,
) -> Result<Reduction<EntityCriterion>, CriterionError> {
    if incoming.criteria().is_empty() {
        return Ok(Reduction::covered());
    }

    let mut reduced = false;
    let mut open = incoming.criteria().alternatives().to_vec();

    for earlier in history {
        if open.is_empty() {
            break;
        }
        if earlier.entity() != incoming.entity() {
            continue;
        }

        for covering in earlier.criteria().alternatives() {
            let mut next = Vec::with_capacity(open.len());
            for fragment in open {
                match subtract_entity(covering, &fragment)? {
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
    }

    Ok(if reduced {
        Reduction::Residual(open)
    } else {
        Reduction::Unchanged
    })
}
