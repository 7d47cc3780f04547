use crate::{
    criterion::{CriterionError, Reduction},
    entity::EntityCriterion,
    obs::{AlgebraEvent, NoopSink, ReduceOutcome, TraceSink},
    query::{Query, QueryFingerprint, fingerprint, reduce_queries},
};
use std::{collections::VecDeque, fmt, sync::Arc};

///
/// HistoryConfig
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HistoryConfig {
    /// Most queries kept; the oldest is evicted first.
    pub capacity: usize,
}

impl HistoryConfig {
    pub const DEFAULT_CAPACITY: usize = 1024;
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
        }
    }
}

///
/// QueryHistory
///
/// Bounded record of issued queries. Incoming queries are reduced against
/// every recorded one; an exact repeat is recognised by fingerprint alone.
///

pub struct QueryHistory {
    config: HistoryConfig,
    entries: VecDeque<(QueryFingerprint, Query)>,
    sink: Arc<dyn TraceSink>,
}

impl QueryHistory {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            entries: VecDeque::new(),
            sink: Arc::new(NoopSink),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &HistoryConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded queries, oldest first.
    pub fn queries(&self) -> impl Iterator<Item = &Query> {
        self.entries.iter().map(|(_, query)| query)
    }

    #[must_use]
    pub fn contains(&self, query: &Query) -> bool {
        self.position(&fingerprint(query)).is_some()
    }

    /// The part of `query` no recorded query answers.
    pub fn reduce(&self, query: &Query) -> Result<Reduction<EntityCriterion>, CriterionError> {
        if self.contains(query) {
            self.emit_reduce(query, ReduceOutcome::Repeat);
            return Ok(Reduction::covered());
        }

        let reduction = reduce_queries(self.queries(), query)?;
        self.emit_reduce(query, ReduceOutcome::of(&reduction));

        Ok(reduction)
    }

    /// Record `query` as issued. Exact repeats are not stored twice.
    pub fn record(&mut self, query: Query) {
        let fingerprint = fingerprint(&query);
        if self.position(&fingerprint).is_some() {
            return;
        }

        self.entries.push_back((fingerprint, query));
        while self.entries.len() > self.config.capacity {
            let Some((_, evicted)) = self.entries.pop_front() else {
                break;
            };
            self.sink.on_event(AlgebraEvent::HistoryEvict {
                entity: evicted.entity(),
            });
        }
    }

    /// Reduce `query`, record what is left, and return it.
    ///
    /// `None` means the history already answers `query` in full.
    pub fn issue(&mut self, query: &Query) -> Result<Option<Query>, CriterionError> {
        let remainder = match self.reduce(query)? {
            Reduction::Unchanged => query.clone(),
            Reduction::Residual(fragments) if fragments.is_empty() => return Ok(None),
            Reduction::Residual(fragments) => query.with_alternatives(fragments),
        };
        self.record(remainder.clone());

        Ok(Some(remainder))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, fingerprint: &QueryFingerprint) -> Option<usize> {
        self.entries.iter().position(|(seen, _)| seen == fingerprint)
    }

    fn emit_reduce(&self, query: &Query, outcome: ReduceOutcome) {
        self.sink.on_event(AlgebraEvent::Reduce {
            entity: query.entity(),
            outcome,
        });
    }
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl fmt::Debug for QueryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryHistory")
            .field("config", &self.config)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}
