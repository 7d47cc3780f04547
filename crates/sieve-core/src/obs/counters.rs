use crate::obs::{AlgebraEvent, ReduceOutcome, TraceSink};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

///
/// EventState
///
/// Process-wide counters. All increments saturate.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventState {
    pub reduce_calls: u64,
    pub reduce_unchanged: u64,
    pub reduce_partial: u64,
    pub reduce_covered: u64,
    pub exact_repeats: u64,
    pub reshape_attempts: u64,
    pub reshape_matches: u64,
    pub flattened: u64,
    pub dispatches: u64,
    pub assignments: u64,
    pub unresolved: u64,
    pub history_evictions: u64,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub reduce_calls: u64,
    pub reshape_matches: u64,
    pub dispatches: u64,
    pub unresolved: u64,
}

///
/// EventReport
/// Snapshot of the counters, with per-entity rows in entity name order.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub counters: EventState,
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EventCounters
///
/// In-memory sink counting every event it receives.
///

#[derive(Debug, Default)]
pub struct EventCounters {
    state: Mutex<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    totals: EventState,
    entities: BTreeMap<String, EntitySummary>,
}

impl EventCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn report(&self) -> EventReport {
        let state = self.lock();

        EventReport {
            counters: state.totals.clone(),
            entity_counters: state.entities.values().cloned().collect(),
        }
    }

    pub fn reset(&self) {
        *self.lock() = Counters::default();
    }

    // counters stay usable after a panicking writer
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TraceSink for EventCounters {
    fn on_event(&self, event: AlgebraEvent<'_>) {
        let mut state = self.lock();
        let Counters { totals, entities } = &mut *state;

        let entity = entities
            .entry(event.entity().to_string())
            .or_insert_with(|| EntitySummary {
                entity: event.entity().to_string(),
                ..EntitySummary::default()
            });

        match event {
            AlgebraEvent::Reduce { outcome, .. } => {
                totals.reduce_calls = totals.reduce_calls.saturating_add(1);
                entity.reduce_calls = entity.reduce_calls.saturating_add(1);

                let counter = match outcome {
                    ReduceOutcome::Unchanged => &mut totals.reduce_unchanged,
                    ReduceOutcome::Partial => &mut totals.reduce_partial,
                    ReduceOutcome::Covered => &mut totals.reduce_covered,
                    ReduceOutcome::Repeat => &mut totals.exact_repeats,
                };
                *counter = counter.saturating_add(1);
            }

            AlgebraEvent::Reshape {
                matched,
                flatten_count,
                ..
            } => {
                totals.reshape_attempts = totals.reshape_attempts.saturating_add(1);
                if matched {
                    totals.reshape_matches = totals.reshape_matches.saturating_add(1);
                    entity.reshape_matches = entity.reshape_matches.saturating_add(1);
                }
                totals.flattened = totals.flattened.saturating_add(to_u64(flatten_count));
            }

            AlgebraEvent::Dispatch {
                assignments,
                unresolved,
                ..
            } => {
                totals.dispatches = totals.dispatches.saturating_add(1);
                totals.assignments = totals.assignments.saturating_add(to_u64(assignments));
                totals.unresolved = totals.unresolved.saturating_add(to_u64(unresolved));
                entity.dispatches = entity.dispatches.saturating_add(1);
                entity.unresolved = entity.unresolved.saturating_add(to_u64(unresolved));
            }

            AlgebraEvent::HistoryEvict { .. } => {
                totals.history_evictions = totals.history_evictions.saturating_add(1);
            }
        }
    }
}

fn to_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}
