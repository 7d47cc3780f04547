use crate::criterion::{RangeCriterion, Reduction, ValueCriterion};

///
/// Subtract `covered` from `target`.
///
/// The result is `target \ covered`: the part of `target` that `covered`
/// does not already satisfy.
///
/// - `Unchanged`: no rule found any overlap
/// - `Residual([])`: `target` is fully covered
/// - `Residual(fragments)`: the union of `fragments` is the uncovered part
///
#[must_use]
pub fn subtract(covered: &ValueCriterion, target: &ValueCriterion) -> Reduction<ValueCriterion> {
    if covered == target {
        return Reduction::covered();
    }

    match (covered, target) {
        // sentinels
        (ValueCriterion::And(items), _) if items.is_empty() => Reduction::covered(),
        (ValueCriterion::Or(items), _) if items.is_empty() => Reduction::Unchanged,
        (_, ValueCriterion::Or(items)) if items.is_empty() => Reduction::covered(),
        (_, ValueCriterion::And(items)) if items.is_empty() => Reduction::Residual(covered.invert()),

        // combinators
        (_, ValueCriterion::Or(items)) => subtract_from_alternatives(covered, items),
        (ValueCriterion::Or(alternatives), _) => subtract_alternatives(alternatives, target),
        (ValueCriterion::And(conjuncts), _) => subtract_conjuncts(conjuncts, target),
        (_, ValueCriterion::And(conjuncts)) => subtract_from_conjuncts(covered, conjuncts),

        _ => subtract_leaf(covered, target),
    }
}

impl ValueCriterion {
    /// Method form of [`subtract`]: the part of `target` not covered by `self`.
    #[must_use]
    pub fn reduce(&self, target: &Self) -> Reduction<Self> {
        subtract(self, target)
    }
}

// Each alternative of the target is reduced on its own; untouched ones stay.
fn subtract_from_alternatives(
    covered: &ValueCriterion,
    items: &[ValueCriterion],
) -> Reduction<ValueCriterion> {
    let mut reduced = false;
    let mut out = Vec::with_capacity(items.len());

    for item in items {
        match subtract(covered, item) {
            Reduction::Unchanged => push_unique(&mut out, item.clone()),
            Reduction::Residual(fragments) => {
                reduced = true;
                for fragment in fragments {
                    push_unique(&mut out, fragment);
                }
            }
        }
    }

    if reduced {
        Reduction::Residual(out)
    } else {
        Reduction::Unchanged
    }
}

// target \ (a1 ∪ a2 ∪ ...) = ((target \ a1) \ a2) ...
fn subtract_alternatives(
    alternatives: &[ValueCriterion],
    target: &ValueCriterion,
) -> Reduction<ValueCriterion> {
    let mut reduced = false;
    let mut open = vec![target.clone()];

    for alternative in alternatives {
        let mut next = Vec::with_capacity(open.len());
        for fragment in open {
            match subtract(alternative, &fragment) {
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

    if reduced {
        Reduction::Residual(open)
    } else {
        Reduction::Unchanged
    }
}

// target \ (a1 ∩ a2 ∩ ...) = (target \ a1) ∪ (target \ a2) ...
// A single untouched conjunct leaves the whole target untouched.
fn subtract_conjuncts(
    conjuncts: &[ValueCriterion],
    target: &ValueCriterion,
) -> Reduction<ValueCriterion> {
    let mut out = Vec::new();

    for conjunct in conjuncts {
        match subtract(conjunct, target) {
            Reduction::Unchanged => return Reduction::Unchanged,
            Reduction::Residual(fragments) => {
                for fragment in fragments {
                    push_unique(&mut out, fragment);
                }
            }
        }
    }

    Reduction::Residual(out)
}

// (c1 ∩ c2 ∩ ...) \ a = (c_i \ a) ∩ rest, for any conjunct c_i.
fn subtract_from_conjuncts(
    covered: &ValueCriterion,
    conjuncts: &[ValueCriterion],
) -> Reduction<ValueCriterion> {
    let reductions: Vec<_> = conjuncts
        .iter()
        .map(|conjunct| subtract(covered, conjunct))
        .collect();

    if reductions.iter().any(Reduction::is_covered) {
        return Reduction::covered();
    }

    let Some((index, fragments)) = reductions
        .into_iter()
        .enumerate()
        .find_map(|(i, reduction)| match reduction {
            Reduction::Unchanged => None,
            Reduction::Residual(fragments) => Some((i, fragments)),
        })
    else {
        return Reduction::Unchanged;
    };

    let mut items = conjuncts.to_vec();
    items[index] = ValueCriterion::any_of(fragments);

    Reduction::Residual(vec![ValueCriterion::And(items)])
}

fn subtract_leaf(covered: &ValueCriterion, target: &ValueCriterion) -> Reduction<ValueCriterion> {
    match (covered, target) {
        (ValueCriterion::Equals(covered), ValueCriterion::Equals(target)) => {
            if covered.is_disjoint(target) {
                Reduction::Unchanged
            } else if target.is_subset(covered) {
                Reduction::covered()
            } else {
                Reduction::Residual(vec![ValueCriterion::Equals(target.difference(covered))])
            }
        }

        // target admits everything outside its set; covered takes its own values away
        (ValueCriterion::Equals(covered), ValueCriterion::NotEquals(target)) => {
            if covered.is_subset(target) {
                Reduction::Unchanged
            } else {
                Reduction::Residual(vec![ValueCriterion::NotEquals(target.union(covered))])
            }
        }

        // only the target values that covered excludes stay open
        (ValueCriterion::NotEquals(covered), ValueCriterion::Equals(target)) => {
            let open = target.intersection(covered);
            if open.len() == target.len() {
                Reduction::Unchanged
            } else if open.is_empty() {
                Reduction::covered()
            } else {
                Reduction::Residual(vec![ValueCriterion::Equals(open)])
            }
        }

        // values covered additionally excludes become concretely open
        (ValueCriterion::NotEquals(covered), ValueCriterion::NotEquals(target)) => {
            let open = covered.difference(target);
            if open.is_empty() {
                Reduction::covered()
            } else {
                Reduction::Residual(vec![ValueCriterion::Equals(open)])
            }
        }

        (ValueCriterion::InRange(covered), ValueCriterion::InRange(target)) => {
            subtract_range(covered, target)
        }

        (ValueCriterion::Equals(points), ValueCriterion::InRange(target)) => {
            match target.exclude_bound_points(|value| points.contains(value)) {
                None => Reduction::Unchanged,
                Some(None) => Reduction::covered(),
                Some(Some(tightened)) => Reduction::Residual(vec![ValueCriterion::InRange(tightened)]),
            }
        }

        (ValueCriterion::InRange(covered), ValueCriterion::Equals(target)) => {
            let (inside, outside) = target.partition(|value| covered.contains(value));
            if inside.is_empty() {
                Reduction::Unchanged
            } else if outside.is_empty() {
                Reduction::covered()
            } else {
                Reduction::Residual(vec![ValueCriterion::Equals(outside)])
            }
        }

        // covered admits everything but its points; only those inside target stay open
        (ValueCriterion::NotEquals(points), ValueCriterion::InRange(target)) => {
            let (inside, _) = points.partition(|value| target.contains(value));
            if inside.is_empty() {
                Reduction::covered()
            } else {
                Reduction::Residual(vec![ValueCriterion::Equals(inside)])
            }
        }

        _ => Reduction::Unchanged,
    }
}

fn subtract_range(covered: &RangeCriterion, target: &RangeCriterion) -> Reduction<ValueCriterion> {
    if !covered.intersects(target) {
        return Reduction::Unchanged;
    }
    if covered.covers(target) {
        return Reduction::covered();
    }

    Reduction::Residual(
        target
            .slices_outside(covered)
            .into_iter()
            .map(ValueCriterion::InRange)
            .collect(),
    )
}

pub(crate) fn push_unique<T: PartialEq>(out: &mut Vec<T>, item: T) {
    if !out.contains(&item) {
        out.push(item);
    }
}
