use crate::support::{exit_with, print_json, read_json_or_exit};
use sieve::{
    Error,
    config::SieveConfig,
    core::query::{DispatchPlan, Query, Source, SourceRegistry},
};
use std::{collections::BTreeMap, path::Path};

pub fn run(config: &SieveConfig, sources: &Path, query: &Path, json_output: bool) {
    let catalog: BTreeMap<String, Vec<Source>> = read_json_or_exit(sources);
    let query: Query = read_json_or_exit(query);

    let plan = plan(config, catalog, &query).unwrap_or_else(|e| exit_with(e.display_with_class()));

    if json_output {
        print_json(&plan);
    } else {
        print!("{plan}");
    }
}

pub fn plan(
    config: &SieveConfig,
    catalog: BTreeMap<String, Vec<Source>>,
    query: &Query,
) -> Result<DispatchPlan, Error> {
    let registry = SourceRegistry::new(config.dispatch_config(), config.reshape_config())
        .with_catalog(catalog)?;

    Ok(registry.plan(query)?)
}
