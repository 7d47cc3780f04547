use crate::support::{exit_with, print_json, read_json_or_exit};
use sieve::{
    Error,
    config::SieveConfig,
    core::{
        query::Query,
        shape::{CriterionShape, EntityShape, ReshapedCriteria, reshape_criteria},
    },
};
use std::path::Path;

pub fn run(config: &SieveConfig, query: &Path, shape: &Path, json_output: bool) {
    let query: Query = read_json_or_exit(query);
    let shape: EntityShape = read_json_or_exit(shape);

    let reshaped =
        reshape(config, &query, shape).unwrap_or_else(|e| exit_with(e.display_with_class()));

    if json_output {
        print_json(&reshaped);
    } else {
        print!("{}", render(reshaped.as_ref()));
    }
}

pub fn reshape(
    config: &SieveConfig,
    query: &Query,
    shape: EntityShape,
) -> Result<Option<ReshapedCriteria>, Error> {
    let by = [CriterionShape::Entity(shape)];

    Ok(reshape_criteria(
        query.criteria(),
        &by,
        &config.reshape_config(),
    )?)
}

pub fn render(reshaped: Option<&ReshapedCriteria>) -> String {
    let Some(reshaped) = reshaped else {
        return "no match\n".to_string();
    };

    let mut out = format!("accepted: {}\n", reshaped.accepted());
    if let Some(open) = reshaped.open() {
        out.push_str(&format!("open: {open}\n"));
    }
    out.push_str(&format!("flatten: {}\n", reshaped.flatten_count()));

    out
}
