use crate::support::{print_json, read_json_or_exit};
use serde::Serialize;
use sieve::core::query::{Query, QueryFingerprint, fingerprint};
use std::path::Path;

///
/// FingerprintReport
///

#[derive(Debug, Serialize)]
pub struct FingerprintReport<'a> {
    pub entity: &'a str,
    pub fingerprint: QueryFingerprint,
}

pub fn run(query: &Path, json_output: bool) {
    let query: Query = read_json_or_exit(query);
    let report = FingerprintReport {
        entity: query.entity(),
        fingerprint: fingerprint(&query),
    };

    if json_output {
        print_json(&report);
    } else {
        println!("{}", report.fingerprint);
    }
}
