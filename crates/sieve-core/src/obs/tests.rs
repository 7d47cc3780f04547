use super::*;
use crate::criterion::Reduction;

#[test]
fn outcome_follows_reduction() {
    assert_eq!(ReduceOutcome::of(&Reduction::<u8>::Unchanged), ReduceOutcome::Unchanged);
    assert_eq!(ReduceOutcome::of(&Reduction::<u8>::covered()), ReduceOutcome::Covered);
    assert_eq!(
        ReduceOutcome::of(&Reduction::Residual(vec![1_u8])),
        ReduceOutcome::Partial
    );
}

#[test]
fn counters_aggregate_totals_and_entities() {
    let counters = EventCounters::new();

    counters.on_event(AlgebraEvent::Reduce {
        entity: "post",
        outcome: ReduceOutcome::Partial,
    });
    counters.on_event(AlgebraEvent::Reduce {
        entity: "post",
        outcome: ReduceOutcome::Repeat,
    });
    counters.on_event(AlgebraEvent::Reshape {
        entity: "user",
        source: "users",
        matched: true,
        flatten_count: 3,
    });
    counters.on_event(AlgebraEvent::Reshape {
        entity: "user",
        source: "cache",
        matched: false,
        flatten_count: 0,
    });
    counters.on_event(AlgebraEvent::Dispatch {
        entity: "user",
        assignments: 2,
        unresolved: 1,
    });
    counters.on_event(AlgebraEvent::HistoryEvict { entity: "post" });

    let report = counters.report();
    assert_eq!(
        report.counters,
        EventState {
            reduce_calls: 2,
            reduce_partial: 1,
            exact_repeats: 1,
            reshape_attempts: 2,
            reshape_matches: 1,
            flattened: 3,
            dispatches: 1,
            assignments: 2,
            unresolved: 1,
            history_evictions: 1,
            ..EventState::default()
        }
    );

    let entities: Vec<_> = report
        .entity_counters
        .iter()
        .map(|summary| (summary.entity.as_str(), summary.reduce_calls, summary.dispatches))
        .collect();
    assert_eq!(entities, vec![("post", 2, 0), ("user", 0, 1)]);

    counters.reset();
    assert_eq!(counters.report(), EventReport::default());
}

#[test]
fn report_serializes_to_json() {
    let counters = EventCounters::new();
    counters.on_event(AlgebraEvent::HistoryEvict { entity: "post" });

    let json = serde_json::to_value(counters.report()).expect("serialize");
    assert_eq!(json["counters"]["history_evictions"], 1);
    assert_eq!(json["entity_counters"][0]["entity"], "post");
}
