use crate::support::{exit_with, print_json, read_json_or_exit};
use sieve::{
    Error,
    config::SieveConfig,
    core::{
        criterion::Reduction,
        entity::EntityCriterion,
        query::{Query, QueryHistory},
    },
};
use std::path::Path;

pub fn run(config: &SieveConfig, history: &Path, query: &Path, json_output: bool) {
    let issued: Vec<Query> = read_json_or_exit(history);
    let query: Query = read_json_or_exit(query);

    let reduction =
        reduce(config, issued, &query).unwrap_or_else(|e| exit_with(e.display_with_class()));

    if json_output {
        print_json(&reduction);
    } else {
        print!("{}", render(&query, &reduction));
    }
}

/// Replay `issued` into a history sized by `config`, then reduce `query`.
pub fn reduce(
    config: &SieveConfig,
    issued: Vec<Query>,
    query: &Query,
) -> Result<Reduction<EntityCriterion>, Error> {
    let mut history = QueryHistory::new(config.history_config());
    for past in issued {
        history.record(past);
    }

    Ok(history.reduce(query)?)
}

pub fn render(query: &Query, reduction: &Reduction<EntityCriterion>) -> String {
    match reduction {
        Reduction::Unchanged => format!("unchanged: {query}\n"),
        Reduction::Residual(fragments) if fragments.is_empty() => "covered\n".to_string(),
        Reduction::Residual(fragments) => fragments
            .iter()
            .map(|fragment| format!("{} {fragment}\n", query.entity()))
            .collect(),
    }
}
