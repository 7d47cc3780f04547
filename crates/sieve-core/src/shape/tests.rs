use super::*;
use crate::{
    criterion::{RangeCriterion, ValueCriterion},
    entity::{EntityCriteria, EntityCriterion},
    schema::{Schema, SchemaError},
    value::Value,
};
use sieve_primitives::RangeKind;
use std::sync::Arc;

const NUMBER: PrimitiveKind = PrimitiveKind::Number;
const TEXT: PrimitiveKind = PrimitiveKind::Text;

// ---- helpers -----------------------------------------------------------

fn entity_shape(required: Vec<(&str, CriterionShape)>) -> CriterionShape {
    EntityShape::required_only(required.into_iter().map(|(field, shape)| (field, vec![shape])))
        .expect("entity shape")
        .into()
}

fn parts(reshaped: &Reshaped) -> (String, Option<String>, usize) {
    (
        reshaped.reshaped().to_string(),
        reshaped.open().map(ToString::to_string),
        reshaped.flatten_count(),
    )
}

fn reshape_parts(what: &CriterionShape, by: &[CriterionShape]) -> Option<(String, Option<String>, usize)> {
    reshape(what, by).expect("reshape").as_ref().map(parts)
}

fn number_set(values: &[i32]) -> ValueCriterion {
    ValueCriterion::equals(values.iter().copied()).expect("non-empty set")
}

// ---- model -------------------------------------------------------------

#[test]
fn canonical_text_for_shapes() {
    assert_eq!(CriterionShape::eq(NUMBER).to_string(), "eq(number)");
    assert_eq!(CriterionShape::ne(NUMBER).to_string(), "ne(number)");
    assert_eq!(
        CriterionShape::in_array([NUMBER, TEXT]).to_string(),
        "in(number | string)"
    );
    assert_eq!(CriterionShape::not_in_array(TEXT).to_string(), "nin(string)");
    assert_eq!(CriterionShape::range(RangeKind::Number).to_string(), "range(number)");

    let shape = EntityShape::new(
        [("foo", vec![CriterionShape::eq(NUMBER)])],
        [("bar", vec![CriterionShape::in_array(TEXT)])],
    )
    .expect("shape");
    assert_eq!(shape.to_string(), "{ foo: eq(number), bar?: in(string) }");

    let or = CriterionShape::Or(vec![CriterionShape::eq(NUMBER), CriterionShape::eq(TEXT)]);
    assert_eq!(or.to_string(), "(eq(number) | eq(string))");
}

#[test]
fn entity_shape_rejects_overlapping_duplicate_and_empty_fields() {
    let overlap = EntityShape::new(
        [("foo", vec![CriterionShape::eq(NUMBER)])],
        [("foo", vec![CriterionShape::eq(TEXT)])],
    );
    assert_eq!(
        overlap,
        Err(ShapeError::OverlappingField {
            field: "foo".to_string()
        })
    );

    let duplicate = EntityShape::required_only([
        ("foo", vec![CriterionShape::eq(NUMBER)]),
        ("foo", vec![CriterionShape::eq(TEXT)]),
    ]);
    assert!(matches!(duplicate, Err(ShapeError::DuplicateField { .. })));

    let empty = EntityShape::required_only([("foo", Vec::new())]);
    assert!(matches!(empty, Err(ShapeError::EmptyField { .. })));
}

#[test]
fn shapes_round_trip_through_json() {
    let shape = CriterionShape::from(
        EntityShape::new(
            [(
                "foo",
                vec![CriterionShape::eq(NUMBER), CriterionShape::range(RangeKind::Number)],
            )],
            [("bar", vec![CriterionShape::in_array([NUMBER, TEXT])])],
        )
        .expect("shape"),
    );
    let json = serde_json::to_string(&shape).expect("serialize");
    let back: CriterionShape = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, shape);

    let range = CriterionShape::range(RangeKind::Text);
    let json = serde_json::to_string(&range).expect("serialize");
    assert_eq!(json, r#"{"type":"in_range","of":"string"}"#);
    assert_eq!(serde_json::from_str::<CriterionShape>(&json).expect("deserialize"), range);

    let bad_kind = r#"{"type":"equals","of":["decimal"]}"#;
    assert!(serde_json::from_str::<CriterionShape>(bad_kind).is_err());

    let bad_range = r#"{"type":"in_range","of":"boolean"}"#;
    assert!(serde_json::from_str::<CriterionShape>(bad_range).is_err());

    let overlapping = r#"{"type":"entity","of":{"required":{"a":[{"type":"equals","of":["number"]}]},"optional":{"a":[{"type":"equals","of":["number"]}]}}}"#;
    assert!(serde_json::from_str::<CriterionShape>(overlapping).is_err());
}

// ---- builder -----------------------------------------------------------

fn post_schema() -> Schema {
    let user = Schema::builder("user")
        .primitive("name", TEXT)
        .primitive("active", PrimitiveKind::Bool)
        .build()
        .expect("user");

    Schema::builder("post")
        .primitive("id", NUMBER)
        .primitive("title", TEXT)
        .relation("author", Arc::new(user))
        .build()
        .expect("post")
}

#[test]
fn builder_derives_kinds_from_schema() {
    let schema = post_schema();
    let shape = EntityShapeBuilder::new(&schema)
        .required("id", &[Capability::Equals, Capability::InArray])
        .optional("title", &[Capability::InRange])
        .optional_relation("author", |author| {
            author.required("name", &[Capability::Equals])
        })
        .build()
        .expect("shape");

    assert_eq!(
        shape.to_string(),
        "{ id: eq(number) | in(number), title?: range(string), author?: { name: eq(string) } }"
    );
}

#[test]
fn builder_reports_first_error() {
    let schema = post_schema();

    let unknown = EntityShapeBuilder::new(&schema)
        .required("missing", &[Capability::Equals])
        .required("id", &[Capability::Equals])
        .build();
    assert_eq!(
        unknown,
        Err(ShapeError::Schema(SchemaError::UnknownField {
            schema: "post".to_string(),
            field: "missing".to_string(),
        }))
    );

    let relation_as_primitive = EntityShapeBuilder::new(&schema)
        .required("author", &[Capability::Equals])
        .build();
    assert!(matches!(
        relation_as_primitive,
        Err(ShapeError::Schema(SchemaError::NotPrimitive { .. }))
    ));

    let range_on_bool = EntityShapeBuilder::new(&schema)
        .required_relation("author", |author| {
            author.required("active", &[Capability::InRange])
        })
        .build();
    assert_eq!(
        range_on_bool,
        Err(ShapeError::UnorderableRange {
            field: "active".to_string(),
            kind: PrimitiveKind::Bool,
        })
    );
}

// ---- shape reshape -----------------------------------------------------

#[test]
fn equals_by_equals_matches_fully() {
    assert_eq!(
        reshape_parts(&CriterionShape::eq(NUMBER), &[CriterionShape::eq(NUMBER)]),
        Some(("eq(number)".to_string(), None, 0))
    );
}

#[test]
fn in_array_by_equals_is_demoted_and_split() {
    assert_eq!(
        reshape_parts(
            &CriterionShape::in_array([NUMBER, TEXT]),
            &[CriterionShape::eq(NUMBER)]
        ),
        Some(("eq(number)".to_string(), Some("in(string)".to_string()), 1))
    );
}

#[test]
fn equals_by_in_array_is_promoted() {
    assert_eq!(
        reshape_parts(
            &CriterionShape::eq([NUMBER, TEXT]),
            &[CriterionShape::in_array(TEXT)]
        ),
        Some(("in(string)".to_string(), Some("eq(number)".to_string()), 0))
    );
}

#[test]
fn exclusions_mirror_inclusions() {
    assert_eq!(
        reshape_parts(
            &CriterionShape::not_in_array([NUMBER, TEXT]),
            &[CriterionShape::ne(NUMBER)]
        ),
        Some(("ne(number)".to_string(), Some("nin(string)".to_string()), 1))
    );
    assert_eq!(
        reshape_parts(&CriterionShape::ne(TEXT), &[CriterionShape::not_in_array(TEXT)]),
        Some(("nin(string)".to_string(), None, 0))
    );
}

#[test]
fn ranges_need_the_identical_kind() {
    let number = CriterionShape::range(RangeKind::Number);

    assert!(reshape_parts(&number, &[CriterionShape::range(RangeKind::Text)]).is_none());
    assert!(reshape_parts(&number, &[CriterionShape::eq(NUMBER)]).is_none());
    assert_eq!(
        reshape_parts(&number, &[number.clone()]),
        Some(("range(number)".to_string(), None, 0))
    );
}

#[test]
fn first_matching_candidate_wins() {
    let by = [CriterionShape::in_array(NUMBER), CriterionShape::eq(NUMBER)];

    assert_eq!(
        reshape_parts(&CriterionShape::in_array(NUMBER), &by),
        Some(("in(number)".to_string(), None, 0))
    );
}

#[test]
fn or_candidate_is_tried_through_its_alternatives() {
    let by = [CriterionShape::Or(vec![
        CriterionShape::eq(TEXT),
        CriterionShape::eq(NUMBER),
    ])];

    assert_eq!(
        reshape_parts(&CriterionShape::eq(NUMBER), &by),
        Some(("eq(number)".to_string(), None, 0))
    );
}

#[test]
fn or_input_is_first_match() {
    let what = CriterionShape::Or(vec![
        CriterionShape::range(RangeKind::Number),
        CriterionShape::eq(TEXT),
        CriterionShape::eq(NUMBER),
    ]);
    let by = [CriterionShape::eq(TEXT), CriterionShape::eq(NUMBER)];

    assert_eq!(
        reshape_parts(&what, &by),
        Some((
            "eq(string)".to_string(),
            Some("(range(number) | eq(number))".to_string()),
            0
        ))
    );
}

#[test]
fn and_shapes_fail_loudly() {
    let and = CriterionShape::And(vec![CriterionShape::eq(NUMBER)]);

    assert_eq!(
        reshape(&and, &[CriterionShape::eq(NUMBER)]),
        Err(ShapeError::NotImplemented {
            what: "and-shape input"
        })
    );
    assert_eq!(
        reshape(&CriterionShape::eq(NUMBER), &[and]),
        Err(ShapeError::NotImplemented {
            what: "and-shape candidate"
        })
    );
}

#[test]
fn entity_candidate_requiring_undeclared_field_does_not_match() {
    let what = entity_shape(vec![("foo", CriterionShape::eq(NUMBER))]);
    let by = entity_shape(vec![
        ("foo", CriterionShape::eq(NUMBER)),
        ("bar", CriterionShape::eq(NUMBER)),
    ]);

    assert!(reshape_parts(&what, &[by]).is_none());
}

#[test]
fn entity_input_field_unknown_to_candidate_does_not_match() {
    let what = entity_shape(vec![
        ("foo", CriterionShape::eq(NUMBER)),
        ("bar", CriterionShape::eq(NUMBER)),
    ]);
    let by = entity_shape(vec![("foo", CriterionShape::eq(NUMBER))]);

    assert!(reshape_parts(&what, &[by]).is_none());
}

#[test]
fn entity_fields_split_into_reshaped_and_open() {
    let what = entity_shape(vec![
        ("foo", CriterionShape::in_array([NUMBER, TEXT])),
        ("bar", CriterionShape::eq(NUMBER)),
    ]);
    let by = entity_shape(vec![
        ("foo", CriterionShape::eq(NUMBER)),
        ("bar", CriterionShape::eq(NUMBER)),
    ]);

    assert_eq!(
        reshape_parts(&what, &[by]),
        Some((
            "{ foo: eq(number), bar: eq(number) }".to_string(),
            Some("{ foo: in(string), bar: eq(number) }".to_string()),
            1
        ))
    );
}

#[test]
fn optional_fields_the_candidate_cannot_answer_stay_open() {
    let what: CriterionShape = EntityShape::new(
        [("foo", vec![CriterionShape::eq(NUMBER)])],
        [("bar", vec![CriterionShape::eq(TEXT)])],
    )
    .expect("shape")
    .into();
    let by = entity_shape(vec![("foo", CriterionShape::eq(NUMBER))]);

    assert_eq!(
        reshape_parts(&what, &[by]),
        Some((
            "{ foo: eq(number) }".to_string(),
            Some("{ foo: eq(number), bar: eq(string) }".to_string()),
            0
        ))
    );
}

#[test]
fn unmatched_optional_field_is_kept_in_open() {
    let what: CriterionShape = EntityShape::new(
        [("foo", vec![CriterionShape::eq(NUMBER)])],
        [("bar", vec![CriterionShape::range(RangeKind::Number)])],
    )
    .expect("shape")
    .into();
    let by: CriterionShape = EntityShape::new(
        [("foo", vec![CriterionShape::eq(NUMBER)])],
        [("bar", vec![CriterionShape::eq(NUMBER)])],
    )
    .expect("shape")
    .into();

    assert_eq!(
        reshape_parts(&what, &[by]),
        Some((
            "{ foo: eq(number) }".to_string(),
            Some("{ foo: eq(number), bar: range(number) }".to_string()),
            0
        ))
    );
}

#[test]
fn partly_matched_optional_field_leaves_its_rest_open() {
    let what: CriterionShape = EntityShape::new(
        [("foo", vec![CriterionShape::eq(NUMBER)])],
        [("bar", vec![CriterionShape::in_array([NUMBER, TEXT])])],
    )
    .expect("shape")
    .into();
    let by: CriterionShape = EntityShape::new(
        [("foo", vec![CriterionShape::eq(NUMBER)])],
        [("bar", vec![CriterionShape::in_array(NUMBER)])],
    )
    .expect("shape")
    .into();

    assert_eq!(
        reshape_parts(&what, &[by]),
        Some((
            "{ foo: eq(number), bar?: in(number) }".to_string(),
            Some("{ foo: eq(number), bar: in(string) }".to_string()),
            0
        ))
    );
}

#[test]
fn flatten_limit_is_enforced() {
    let what = CriterionShape::in_array([NUMBER, TEXT]);
    let strict = ReshapeConfig { max_flatten: 0 };

    assert_eq!(
        reshape_with(&what, &[CriterionShape::eq(NUMBER)], &strict),
        Err(ShapeError::FlattenLimit { count: 1, limit: 0 })
    );
}

// ---- concrete reshape --------------------------------------------------

#[test]
fn in_array_keeps_accepted_values_as_one_set() {
    let what = ValueCriterion::equals([
        Value::from(1),
        Value::from(2),
        Value::from(3),
        Value::text("foo"),
        Value::Undefined,
        Value::Null,
    ])
    .expect("set");

    let reshaped = reshape_criterion(
        &what,
        &[CriterionShape::in_array(NUMBER)],
        &ReshapeConfig::default(),
    )
    .expect("reshape")
    .expect("match");

    // Older fixtures pad string sets (`{ "foo", null, undefined }`) but not
    // numeric ones (`{1, 2, 3}`). Sets of any kind share the unpadded layout.
    let accepted: Vec<_> = reshaped.accepted().iter().map(ToString::to_string).collect();
    assert_eq!(accepted, vec!["{1, 2, 3}"]);
    assert_eq!(
        reshaped.open().map(ToString::to_string),
        Some("{\"foo\", null, undefined}".to_string())
    );
    assert_eq!(reshaped.flatten_count(), 0);
}

#[test]
fn equals_shape_flattens_value_sets() {
    let reshaped = reshape_criterion(
        &number_set(&[1, 2, 3]),
        &[CriterionShape::eq(NUMBER)],
        &ReshapeConfig::default(),
    )
    .expect("reshape")
    .expect("match");

    let accepted: Vec<_> = reshaped.accepted().iter().map(ToString::to_string).collect();
    assert_eq!(accepted, vec!["1", "2", "3"]);
    assert_eq!(reshaped.open(), None);
    assert_eq!(reshaped.flatten_count(), 3);
}

#[test]
fn exclusions_need_every_kind_accepted() {
    let config = ReshapeConfig::default();
    let pair = ValueCriterion::not_equals([1, 2]).expect("set");

    assert!(
        reshape_criterion(&pair, &[CriterionShape::ne(NUMBER)], &config)
            .expect("reshape")
            .is_none()
    );
    assert!(
        reshape_criterion(&pair, &[CriterionShape::not_in_array(NUMBER)], &config)
            .expect("reshape")
            .is_some()
    );

    let mixed = ValueCriterion::not_equals([Value::from(1), Value::text("a")]).expect("set");
    assert!(
        reshape_criterion(&mixed, &[CriterionShape::not_in_array(NUMBER)], &config)
            .expect("reshape")
            .is_none()
    );
}

#[test]
fn concrete_or_is_first_match() {
    let what = ValueCriterion::or(vec![
        ValueCriterion::eq("a"),
        ValueCriterion::from(RangeCriterion::closed(1, 7).expect("range")),
    ]);

    let reshaped = reshape_criterion(
        &what,
        &[CriterionShape::range(RangeKind::Number)],
        &ReshapeConfig::default(),
    )
    .expect("reshape")
    .expect("match");

    let accepted: Vec<_> = reshaped.accepted().iter().map(ToString::to_string).collect();
    assert_eq!(accepted, vec!["[1, 7]"]);
    assert_eq!(reshaped.open().map(ToString::to_string), Some("\"a\"".to_string()));
}

#[test]
fn entity_value_sets_expand_into_cross_product() {
    let what = EntityCriteria::from(
        EntityCriterion::from_fields([("foo", number_set(&[1, 2])), ("bar", number_set(&[4, 5]))])
            .expect("criterion"),
    );
    let by = entity_shape(vec![
        ("foo", CriterionShape::eq(NUMBER)),
        ("bar", CriterionShape::eq(NUMBER)),
    ]);

    let reshaped = reshape_criteria(&what, &[by], &ReshapeConfig::default())
        .expect("reshape")
        .expect("match");

    let accepted: Vec<_> = reshaped
        .accepted()
        .alternatives()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        accepted,
        vec![
            "{ foo: 1, bar: 4 }",
            "{ foo: 1, bar: 5 }",
            "{ foo: 2, bar: 4 }",
            "{ foo: 2, bar: 5 }",
        ]
    );
    assert_eq!(reshaped.open(), None);
    assert_eq!(reshaped.flatten_count(), 4);
}

#[test]
fn entity_leftovers_keep_other_fields() {
    let what = EntityCriteria::from(
        EntityCriterion::from_fields([
            (
                "foo",
                ValueCriterion::equals([Value::from(1), Value::text("x")]).expect("set"),
            ),
            ("bar", ValueCriterion::eq(4)),
        ])
        .expect("criterion"),
    );
    let by = entity_shape(vec![
        ("foo", CriterionShape::in_array(NUMBER)),
        ("bar", CriterionShape::eq(NUMBER)),
    ]);

    let reshaped = reshape_criteria(&what, &[by], &ReshapeConfig::default())
        .expect("reshape")
        .expect("match");

    assert_eq!(reshaped.accepted().to_string(), "{ foo: 1, bar: 4 }");
    assert_eq!(
        reshaped.open().map(ToString::to_string),
        Some("{ foo: \"x\", bar: 4 }".to_string())
    );
}

#[test]
fn entity_cross_product_respects_flatten_limit() {
    let what = EntityCriteria::from(
        EntityCriterion::from_fields([("foo", number_set(&[1, 2])), ("bar", number_set(&[4, 5]))])
            .expect("criterion"),
    );
    let by = entity_shape(vec![
        ("foo", CriterionShape::eq(NUMBER)),
        ("bar", CriterionShape::eq(NUMBER)),
    ]);

    assert_eq!(
        reshape_criteria(&what, &[by], &ReshapeConfig { max_flatten: 3 }),
        Err(ShapeError::FlattenLimit { count: 4, limit: 3 })
    );
}

#[test]
fn entity_missing_required_field_does_not_match() {
    let what = EntityCriteria::from(
        EntityCriterion::from_fields([("foo", ValueCriterion::eq(1))]).expect("criterion"),
    );
    let by = entity_shape(vec![
        ("foo", CriterionShape::eq(NUMBER)),
        ("bar", CriterionShape::eq(NUMBER)),
    ]);

    assert_eq!(
        reshape_criteria(&what, &[by], &ReshapeConfig::default()),
        Ok(None)
    );
}

#[test]
fn shape_of_derives_the_narrowest_shape() {
    let shape = |criterion: &ValueCriterion| shape_of(criterion).map(|s| s.to_string());

    assert_eq!(shape(&ValueCriterion::eq(1)), Some("eq(number)".to_string()));
    assert_eq!(
        shape(&ValueCriterion::equals([Value::from(1), Value::text("a")]).expect("set")),
        Some("in(number | string)".to_string())
    );
    assert_eq!(shape(&ValueCriterion::ne("a")), Some("ne(string)".to_string()));
    assert_eq!(
        shape(&ValueCriterion::not_equals([1, 2]).expect("set")),
        Some("nin(number)".to_string())
    );
    assert_eq!(
        shape(&RangeCriterion::at_least("m").expect("range").into()),
        Some("range(string)".to_string())
    );

    let criterion = EntityCriterion::from_fields([("foo", ValueCriterion::eq(1))])
        .and_then(|c| c.with("bar", number_set(&[4, 5])))
        .expect("criterion");
    assert_eq!(
        shape_of_entity(&criterion).map(|s| s.to_string()),
        Some("{ foo: eq(number), bar: in(number) }".to_string())
    );
}
