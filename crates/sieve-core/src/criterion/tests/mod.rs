
use crate::{
    criterion::{RangeCriterion, Reduction, ValueCriterion},
    value::Value,
};

// ---- helpers -----------------------------------------------------------

pub(super) fn n(x: f64) -> Value {
    Value::number(x).expect("finite number")
}

pub(super) fn eq(values: &[i32]) -> ValueCriterion {
    ValueCriterion::equals(values.iter().copied()).expect("non-empty set")
}

pub(super) fn ne(values: &[i32]) -> ValueCriterion {
    ValueCriterion::not_equals(values.iter().copied()).expect("non-empty set")
}

pub(super) fn closed(from: i32, to: i32) -> ValueCriterion {
    RangeCriterion::closed(from, to).expect("valid range").into()
}

pub(super) fn open(from: i32, to: i32) -> ValueCriterion {
    RangeCriterion::open(from, to).expect("valid range").into()
}

/// Render a reduction as its fragments' canonical text, or `unchanged`.
pub(super) fn render(reduction: &Reduction<ValueCriterion>) -> Vec<String> {
    match reduction {
        Reduction::Unchanged => vec!["unchanged".to_string()],
        Reduction::Residual(fragments) => fragments.iter().map(ToString::to_string).collect(),
    }
}
