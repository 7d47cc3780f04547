
use crate::{
    criterion::{RangeCriterion, Reduction, ValueCriterion},
    entity::{EntityCriteria, EntityCriterion},
    obs::EventCounters,
    query::*,
    shape::{CriterionShape, EntityShape, ReshapeConfig},
};
use sieve_primitives::PrimitiveKind;
use std::sync::Arc;

// ---- helpers -----------------------------------------------------------

fn post(fields: Vec<(&str, ValueCriterion)>) -> Query {
    Query::new("post", EntityCriterion::from_fields(fields).expect("criterion"))
}

fn post_any(alternatives: Vec<Vec<(&str, ValueCriterion)>>) -> Query {
    let criteria: EntityCriteria = alternatives
        .into_iter()
        .map(|fields| EntityCriterion::from_fields(fields).expect("criterion"))
        .collect();
    Query::new("post", criteria)
}

fn set(values: &[i32]) -> ValueCriterion {
    ValueCriterion::equals(values.iter().copied()).expect("non-empty set")
}

fn range(from: i32, to: i32) -> ValueCriterion {
    RangeCriterion::closed(from, to).expect("range").into()
}

fn residual(reduction: &Reduction<EntityCriterion>) -> Option<Vec<String>> {
    reduction
        .residual()
        .map(|fragments| fragments.iter().map(ToString::to_string).collect())
}

// ---- reduce_queries ----------------------------------------------------

#[test]
fn overlapping_range_leaves_the_tail() {
    let history = [post(vec![("foo", range(1, 7))])];
    let incoming = post(vec![("foo", range(5, 10))]);

    let reduction = reduce_queries(&history, &incoming).expect("reduce");
    assert_eq!(residual(&reduction), Some(vec!["{ foo: (7, 10] }".to_string()]));
}

#[test]
fn other_entities_never_reduce() {
    let history = [Query::new(
        "user",
        EntityCriterion::from_fields([("foo", set(&[1, 2]))]).expect("criterion"),
    )];
    let incoming = post(vec![("foo", set(&[1, 2]))]);

    assert_eq!(reduce_queries(&history, &incoming), Ok(Reduction::Unchanged));
}

#[test]
fn history_entries_fold_in_order() {
    let history = [post(vec![("foo", set(&[1, 2]))]), post(vec![("foo", set(&[3]))])];
    let incoming = post(vec![("foo", set(&[1, 2, 3, 4]))]);

    let reduction = reduce_queries(&history, &incoming).expect("reduce");
    assert_eq!(residual(&reduction), Some(vec!["{ foo: 4 }".to_string()]));
}

#[test]
fn fully_answered_query_leaves_nothing() {
    let history = [post(vec![("foo", range(0, 10))])];
    let incoming = post(vec![("foo", set(&[2, 3])), ("bar", ValueCriterion::eq("x"))]);

    assert!(reduce_queries(&history, &incoming).expect("reduce").is_covered());
}

#[test]
fn untouched_alternatives_are_kept() {
    let history = [post(vec![("foo", set(&[1, 2]))])];
    let incoming = post_any(vec![vec![("foo", set(&[1]))], vec![("foo", set(&[5]))]]);

    let reduction = reduce_queries(&history, &incoming).expect("reduce");
    assert_eq!(residual(&reduction), Some(vec!["{ foo: 5 }".to_string()]));
}

#[test]
fn empty_history_changes_nothing() {
    let history: [Query; 0] = [];
    let incoming = post(vec![("foo", set(&[1]))]);

    assert_eq!(reduce_queries(&history, &incoming), Ok(Reduction::Unchanged));
}

// ---- fingerprint -------------------------------------------------------

#[test]
fn fingerprint_is_structural() {
    let a = post(vec![("foo", set(&[1])), ("bar", ValueCriterion::eq("x"))]);
    let same = post(vec![("foo", set(&[1])), ("bar", ValueCriterion::eq("x"))]);
    let reordered = post(vec![("bar", ValueCriterion::eq("x")), ("foo", set(&[1]))]);
    let text = post(vec![("foo", ValueCriterion::eq("1")), ("bar", ValueCriterion::eq("x"))]);
    let other_entity = Query::new("user", a.criteria().clone());

    assert_eq!(fingerprint(&a), fingerprint(&same));
    assert_ne!(fingerprint(&a), fingerprint(&reordered));
    assert_ne!(fingerprint(&a), fingerprint(&text));
    assert_ne!(fingerprint(&a), fingerprint(&other_entity));
}

#[test]
fn fingerprint_renders_as_lowercase_hex() {
    let hex = fingerprint(&post(vec![("foo", range(1, 2))])).to_string();

    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));

    let json = serde_json::to_value(fingerprint(&post(vec![]))).expect("serialize");
    assert_eq!(json.as_str().map(str::len), Some(64));
}

// ---- history -----------------------------------------------------------

#[test]
fn exact_repeat_is_answered_by_fingerprint() {
    let counters = Arc::new(EventCounters::new());
    let mut history = QueryHistory::default().with_sink(counters.clone());
    let query = post(vec![("foo", set(&[1, 2]))]);

    history.record(query.clone());
    history.record(query.clone());
    assert_eq!(history.len(), 1);

    assert!(history.reduce(&query).expect("reduce").is_covered());
    assert_eq!(counters.report().counters.exact_repeats, 1);
}

#[test]
fn oldest_entries_are_evicted() {
    let counters = Arc::new(EventCounters::new());
    let mut history =
        QueryHistory::new(HistoryConfig { capacity: 2 }).with_sink(counters.clone());

    for value in 1..=3 {
        history.record(post(vec![("foo", ValueCriterion::eq(value))]));
    }

    let kept: Vec<_> = history.queries().map(ToString::to_string).collect();
    assert_eq!(kept, vec!["post { foo: 2 }", "post { foo: 3 }"]);
    assert_eq!(counters.report().counters.history_evictions, 1);

    let evicted = post(vec![("foo", ValueCriterion::eq(1))]);
    assert!(!history.contains(&evicted));
    assert_eq!(history.reduce(&evicted), Ok(Reduction::Unchanged));
}

#[test]
fn issue_records_only_what_is_left() {
    let counters = Arc::new(EventCounters::new());
    let mut history = QueryHistory::default().with_sink(counters.clone());

    let first = post(vec![("foo", set(&[1, 2]))]);
    assert_eq!(history.issue(&first), Ok(Some(first.clone())));

    let widened = post(vec![("foo", set(&[1, 2, 3]))]);
    let remainder = history.issue(&widened).expect("issue").expect("remainder");
    assert_eq!(remainder.to_string(), "post { foo: 3 }");

    let answered = post(vec![("foo", set(&[2, 3]))]);
    assert_eq!(history.issue(&answered), Ok(None));
    assert_eq!(history.len(), 2);

    let report = counters.report().counters;
    assert_eq!(
        (report.reduce_unchanged, report.reduce_partial, report.reduce_covered),
        (1, 1, 1)
    );
}

// ---- dispatch ----------------------------------------------------------

fn registry(dispatch: DispatchConfig) -> SourceRegistry {
    let by_id = EntityShape::required_only([("id", vec![CriterionShape::eq(PrimitiveKind::Number)])])
        .expect("shape");
    let by_title =
        EntityShape::required_only([("title", vec![CriterionShape::in_array(PrimitiveKind::Text)])])
            .expect("shape");

    let mut registry = SourceRegistry::new(dispatch, ReshapeConfig::default());
    registry.register("post", Source::new("by_id", by_id)).expect("register");
    registry
        .register("post", Source::new("by_title", by_title))
        .expect("register");
    registry
}

fn mixed_query() -> Query {
    post_any(vec![
        vec![("id", set(&[1, 2]))],
        vec![("title", ValueCriterion::eq("a"))],
    ])
}

fn assigned(plan: &DispatchPlan) -> Vec<(String, String)> {
    plan.assignments
        .iter()
        .map(|assignment| (assignment.source.clone(), assignment.criteria.to_string()))
        .collect()
}

#[test]
fn plan_assigns_each_part_to_the_first_accepting_source() {
    let counters = Arc::new(EventCounters::new());
    let registry = registry(DispatchConfig::default()).with_sink(counters.clone());

    let plan = registry.plan(&mixed_query()).expect("plan");
    assert_eq!(
        assigned(&plan),
        vec![
            ("by_id".to_string(), "({ id: 1 } | { id: 2 })".to_string()),
            ("by_title".to_string(), "{ title: \"a\" }".to_string()),
        ]
    );
    assert!(plan.is_resolved());
    assert_eq!(plan.assignments[0].flatten_count, 2);

    let report = counters.report().counters;
    assert_eq!(
        (report.reshape_attempts, report.reshape_matches, report.flattened),
        (3, 2, 2)
    );
    assert_eq!((report.dispatches, report.assignments), (1, 2));
}

#[test]
fn plan_stops_at_max_depth() {
    let plan = registry(DispatchConfig { max_depth: 1 })
        .plan(&mixed_query())
        .expect("plan");

    assert_eq!(plan.assignments.len(), 1);
    assert_eq!(
        plan.unresolved.as_ref().map(ToString::to_string),
        Some("{ title: \"a\" }".to_string())
    );
}

#[test]
fn fields_no_source_filters_on_stay_unresolved() {
    let query = post(vec![("body", ValueCriterion::eq("x"))]);
    let plan = registry(DispatchConfig::default()).plan(&query).expect("plan");

    assert!(plan.assignments.is_empty());
    assert_eq!(plan.unresolved, Some(query.criteria().clone()));
    assert_eq!(plan.to_string(), "post\n  unresolved: { body: \"x\" }\n");
}

#[test]
fn unknown_entity_is_entirely_unresolved() {
    let query = Query::new(
        "comment",
        EntityCriterion::from_fields([("id", ValueCriterion::eq(1))]).expect("criterion"),
    );
    let plan = registry(DispatchConfig::default()).plan(&query).expect("plan");

    assert!(plan.assignments.is_empty());
    assert!(!plan.is_resolved());
}

#[test]
fn duplicate_source_names_are_rejected() {
    let mut registry = registry(DispatchConfig::default());
    let err = registry
        .register("post", Source::new("by_id", EntityShape::default()))
        .expect_err("duplicate");

    assert_eq!(
        err,
        DispatchError::DuplicateSource {
            entity: "post".to_string(),
            source_name: "by_id".to_string(),
        }
    );
}
