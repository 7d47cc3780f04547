use crate::criterion::Reduction;
use std::fmt;

///
/// TraceSink
///
/// Receives algebra events. Sinks must not affect resolution semantics.
///

pub trait TraceSink: Send + Sync {
    fn on_event(&self, event: AlgebraEvent<'_>);
}

///
/// NoopSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {
    fn on_event(&self, _event: AlgebraEvent<'_>) {}
}

///
/// ReduceOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReduceOutcome {
    Unchanged,
    Partial,
    Covered,
    /// Fingerprint of an already recorded query.
    Repeat,
}

impl ReduceOutcome {
    #[must_use]
    pub const fn of<T>(reduction: &Reduction<T>) -> Self {
        match reduction {
            Reduction::Unchanged => Self::Unchanged,
            Reduction::Residual(fragments) if fragments.is_empty() => Self::Covered,
            Reduction::Residual(_) => Self::Partial,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Partial => "partial",
            Self::Covered => "covered",
            Self::Repeat => "repeat",
        }
    }
}

impl fmt::Display for ReduceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// AlgebraEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlgebraEvent<'a> {
    Reduce {
        entity: &'a str,
        outcome: ReduceOutcome,
    },
    Reshape {
        entity: &'a str,
        source: &'a str,
        matched: bool,
        flatten_count: usize,
    },
    Dispatch {
        entity: &'a str,
        assignments: usize,
        unresolved: usize,
    },
    HistoryEvict {
        entity: &'a str,
    },
}

impl AlgebraEvent<'_> {
    #[must_use]
    pub const fn entity(&self) -> &str {
        match self {
            Self::Reduce { entity, .. }
            | Self::Reshape { entity, .. }
            | Self::Dispatch { entity, .. }
            | Self::HistoryEvict { entity } => *entity,
        }
    }
}
