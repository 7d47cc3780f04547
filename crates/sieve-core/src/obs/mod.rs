//! Observability: algebra event sink boundary.
//!
//! Pure algebra functions emit nothing. Only the stateful collaborators
//! (`QueryHistory`, `SourceRegistry`) report events, and only through an
//! injected `TraceSink`.

mod counters;
mod sink;

#[cfg(test)]
mod tests;

pub use counters::{EntitySummary, EventCounters, EventReport, EventState};
pub use sink::{AlgebraEvent, NoopSink, ReduceOutcome, TraceSink};
