use super::{plan, reduce, reshape};
use sieve::{
    ErrorClass,
    config::SieveConfig,
    core::{
        query::{Query, Source, fingerprint},
        shape::{EntityShape, ShapeError},
    },
};
use std::collections::BTreeMap;

const BY_ID: &str = r#"{ "required": { "id": [{ "type": "equals", "of": ["number"] }] } }"#;
const BY_TITLE: &str = r#"{ "required": { "title": [{ "type": "in_array", "of": ["string"] }] } }"#;

fn ids(values: &[u32]) -> Query {
    let values: Vec<_> = values
        .iter()
        .map(|value| format!(r#"{{ "kind": "number", "value": {value} }}"#))
        .collect();
    let json = format!(
        r#"{{ "entity": "post", "criteria": [{{ "id": {{ "type": "equals", "of": [{}] }} }}] }}"#,
        values.join(", ")
    );

    serde_json::from_str(&json).expect("query")
}

fn shape(json: &str) -> EntityShape {
    serde_json::from_str(json).expect("shape")
}

fn catalog() -> BTreeMap<String, Vec<Source>> {
    BTreeMap::from([(
        "post".to_string(),
        vec![
            Source::new("by_title", shape(BY_TITLE)),
            Source::new("by_id", shape(BY_ID)),
        ],
    )])
}

#[test]
fn reduce_prints_the_residual() {
    let config = SieveConfig::default();
    let query = ids(&[1, 2, 3]);

    let reduction = reduce::reduce(&config, vec![ids(&[1, 2])], &query).expect("reduce");

    assert_eq!(reduce::render(&query, &reduction), "post { id: 3 }\n");
}

#[test]
fn reduce_reports_covered_and_unchanged() {
    let config = SieveConfig::default();
    let query = ids(&[1]);

    let covered = reduce::reduce(&config, vec![ids(&[1, 2])], &query).expect("reduce");
    assert_eq!(reduce::render(&query, &covered), "covered\n");

    let unchanged = reduce::reduce(&config, Vec::new(), &query).expect("reduce");
    assert!(unchanged.is_unchanged());
    assert_eq!(
        reduce::render(&query, &unchanged),
        format!("unchanged: {query}\n")
    );
}

#[test]
fn reduce_respects_history_capacity() {
    let config = SieveConfig::from_toml_str("[history]\ncapacity = 1\n").expect("config");
    let query = ids(&[1]);

    // the covering query is evicted by the later one
    let reduction =
        reduce::reduce(&config, vec![ids(&[1]), ids(&[9])], &query).expect("reduce");

    assert!(reduction.is_unchanged());
}

#[test]
fn reshape_prints_accepted_and_flatten_count() {
    let reshaped = reshape::reshape(&SieveConfig::default(), &ids(&[1, 2]), shape(BY_ID))
        .expect("reshape");

    assert_eq!(
        reshape::render(reshaped.as_ref()),
        "accepted: ({ id: 1 } | { id: 2 })\nflatten: 2\n"
    );
}

#[test]
fn reshape_without_match_says_so() {
    let reshaped = reshape::reshape(&SieveConfig::default(), &ids(&[1]), shape(BY_TITLE))
        .expect("reshape");

    assert_eq!(reshaped, None);
    assert_eq!(reshape::render(None), "no match\n");
}

#[test]
fn plan_skips_sources_that_cannot_answer() {
    let plan = plan::plan(&SieveConfig::default(), catalog(), &ids(&[4])).expect("plan");

    assert_eq!(plan.to_string(), "post\n  by_id: { id: 4 }\n");
}

#[test]
fn plan_honors_configured_flatten_limit() {
    let config = SieveConfig::from_toml_str("[reshape]\nmax_flatten = 1\n").expect("config");

    let err = plan::plan(&config, catalog(), &ids(&[1, 2])).expect_err("limit");

    assert_eq!(
        err,
        sieve::Error::Dispatch(ShapeError::FlattenLimit { count: 2, limit: 1 }.into())
    );
    assert_eq!(err.class(), ErrorClass::Unsupported);
}

#[test]
fn fingerprint_report_serializes_hex() {
    let query = ids(&[1, 2]);
    let report = super::fingerprint::FingerprintReport {
        entity: query.entity(),
        fingerprint: fingerprint(&query),
    };

    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["entity"], "post");
    assert_eq!(json["fingerprint"].as_str().map(str::len), Some(64));
    assert_eq!(json["fingerprint"], fingerprint(&ids(&[1, 2])).as_hex());
}
