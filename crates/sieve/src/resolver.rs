use crate::{
    Error,
    config::SieveConfig,
    core::{
        criterion::Reduction,
        obs::{NoopSink, TraceSink},
        query::{DispatchPlan, Query, QueryHistory, Source, SourceRegistry},
    },
};
use std::sync::Arc;

///
/// Resolution
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// Earlier queries already fetched everything asked for.
    Answered,
    /// What is left after reduction, split across sources.
    Dispatch(DispatchPlan),
}

///
/// Resolver
///
/// Reduces each incoming query by the queries already dispatched, plans the
/// rest across registered sources, and records what was assigned. Parts no
/// source accepted are not recorded, so a later query can try them again.
///

#[derive(Debug)]
pub struct Resolver {
    history: QueryHistory,
    registry: SourceRegistry,
}

impl Resolver {
    #[must_use]
    pub fn new(config: &SieveConfig) -> Self {
        Self::with_sink(config, Arc::new(NoopSink))
    }

    #[must_use]
    pub fn with_sink(config: &SieveConfig, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            history: QueryHistory::new(config.history_config()).with_sink(Arc::clone(&sink)),
            registry: SourceRegistry::new(config.dispatch_config(), config.reshape_config())
                .with_sink(sink),
        }
    }

    pub fn register(&mut self, entity: impl Into<String>, source: Source) -> Result<(), Error> {
        self.registry.register(entity, source)?;

        Ok(())
    }

    pub fn resolve(&mut self, query: &Query) -> Result<Resolution, Error> {
        let remainder = match self.history.reduce(query)? {
            Reduction::Unchanged => query.clone(),
            Reduction::Residual(fragments) if fragments.is_empty() => {
                return Ok(Resolution::Answered);
            }
            Reduction::Residual(fragments) => query.with_alternatives(fragments),
        };

        let plan = self.registry.plan(&remainder)?;
        for assignment in &plan.assignments {
            self.history
                .record(remainder.with_criteria(assignment.criteria.clone()));
        }

        Ok(Resolution::Dispatch(plan))
    }

    #[must_use]
    pub const fn history(&self) -> &QueryHistory {
        &self.history
    }

    #[must_use]
    pub const fn registry(&self) -> &SourceRegistry {
        &self.registry
    }
}
