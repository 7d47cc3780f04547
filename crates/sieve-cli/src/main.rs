//! Sieve CLI: the `sieve` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let config = support::load_config_or_exit(cli.config.as_deref());

    match cli.command {
        Commands::Reduce { history, query } => {
            commands::reduce::run(&config, &history, &query, cli.json);
        }

        Commands::Reshape { query, shape } => {
            commands::reshape::run(&config, &query, &shape, cli.json);
        }

        Commands::Plan { sources, query } => {
            commands::plan::run(&config, &sources, &query, cli.json);
        }

        Commands::Fingerprint { query } => commands::fingerprint::run(&query, cli.json),
    }
}
