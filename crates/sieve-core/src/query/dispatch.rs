use crate::{
    entity::EntityCriteria,
    obs::{AlgebraEvent, NoopSink, TraceSink},
    query::Query,
    shape::{
        CriterionShape, EntityShape, ReshapeConfig, ReshapedCriteria, ShapeError, reshape_criteria,
    },
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// DispatchConfig
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DispatchConfig {
    /// Most reshape rounds one query may take before the rest is unresolved.
    pub max_depth: usize,
}

impl DispatchConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 8;
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

///
/// DispatchError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DispatchError {
    #[error("source '{source_name}' is already registered for entity '{entity}'")]
    DuplicateSource { entity: String, source_name: String },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

///
/// Source
///
/// A named data source and the entity shape it can filter on.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Source {
    pub name: String,
    pub shape: EntityShape,
}

impl Source {
    #[must_use]
    pub fn new(name: impl Into<String>, shape: EntityShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

///
/// Assignment
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Assignment {
    pub source: String,
    pub criteria: EntityCriteria,
    pub flatten_count: usize,
}

///
/// DispatchPlan
///
/// Which source answers which part of a query. `unresolved` is what no
/// registered source accepted within the depth limit.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DispatchPlan {
    pub entity: String,
    pub assignments: Vec<Assignment>,
    pub unresolved: Option<EntityCriteria>,
}

impl DispatchPlan {
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.unresolved.is_none()
    }
}

impl fmt::Display for DispatchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.entity)?;
        for assignment in &self.assignments {
            writeln!(f, "  {}: {}", assignment.source, assignment.criteria)?;
        }
        if let Some(unresolved) = &self.unresolved {
            writeln!(f, "  unresolved: {unresolved}")?;
        }

        Ok(())
    }
}

///
/// SourceRegistry
///
/// Ordered sources per entity. Planning reshapes a query against each source
/// in registration order; the first source that accepts part of it gets that
/// part, and the open remainder starts over from the first source.
///

pub struct SourceRegistry {
    sources: BTreeMap<String, Vec<Source>>,
    dispatch: DispatchConfig,
    reshape: ReshapeConfig,
    sink: Arc<dyn TraceSink>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new(dispatch: DispatchConfig, reshape: ReshapeConfig) -> Self {
        Self {
            sources: BTreeMap::new(),
            dispatch,
            reshape,
            sink: Arc::new(NoopSink),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Register every source of a catalog, entity by entity.
    pub fn with_catalog(
        mut self,
        catalog: BTreeMap<String, Vec<Source>>,
    ) -> Result<Self, DispatchError> {
        for (entity, sources) in catalog {
            for source in sources {
                self.register(entity.clone(), source)?;
            }
        }

        Ok(self)
    }

    pub fn register(&mut self, entity: impl Into<String>, source: Source) -> Result<(), DispatchError> {
        let entity = entity.into();
        let registered = self.sources.entry(entity.clone()).or_default();
        if registered.iter().any(|existing| existing.name == source.name) {
            return Err(DispatchError::DuplicateSource {
                entity,
                source_name: source.name,
            });
        }
        registered.push(source);

        Ok(())
    }

    /// Sources registered for `entity`, in order.
    #[must_use]
    pub fn sources(&self, entity: &str) -> &[Source] {
        self.sources.get(entity).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn plan(&self, query: &Query) -> Result<DispatchPlan, DispatchError> {
        let entity = query.entity();
        let sources = self.sources(entity);

        let mut assignments = Vec::new();
        let mut open = (!query.criteria().is_empty()).then(|| query.criteria().clone());

        for _ in 0..self.dispatch.max_depth {
            let Some(criteria) = open.take() else {
                break;
            };

            match self.first_accepting(entity, sources, &criteria)? {
                Some((source, reshaped)) => {
                    let flatten_count = reshaped.flatten_count();
                    let (accepted, rest) = reshaped.into_parts();
                    assignments.push(Assignment {
                        source: source.name.clone(),
                        criteria: accepted,
                        flatten_count,
                    });
                    open = rest;
                }
                None => {
                    open = Some(criteria);
                    break;
                }
            }
        }

        self.sink.on_event(AlgebraEvent::Dispatch {
            entity,
            assignments: assignments.len(),
            unresolved: open.as_ref().map_or(0, |rest| rest.alternatives().len()),
        });

        Ok(DispatchPlan {
            entity: entity.to_string(),
            assignments,
            unresolved: open,
        })
    }

    fn first_accepting<'s>(
        &self,
        entity: &str,
        sources: &'s [Source],
        criteria: &EntityCriteria,
    ) -> Result<Option<(&'s Source, ReshapedCriteria)>, DispatchError> {
        for source in sources {
            let candidate = [CriterionShape::Entity(source.shape.clone())];
            let reshaped = reshape_criteria(criteria, &candidate, &self.reshape)?;

            self.sink.on_event(AlgebraEvent::Reshape {
                entity,
                source: &source.name,
                matched: reshaped.is_some(),
                flatten_count: reshaped.as_ref().map_or(0, |r| r.flatten_count()),
            });

            if let Some(reshaped) = reshaped {
                return Ok(Some((source, reshaped)));
            }
        }

        Ok(None)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new(DispatchConfig::default(), ReshapeConfig::default())
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.sources)
            .field("dispatch", &self.dispatch)
            .field("reshape", &self.reshape)
            .finish_non_exhaustive()
    }
}
