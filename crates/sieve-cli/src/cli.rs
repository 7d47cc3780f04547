use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "sieve",
    about = "Sieve: reduce, reshape, and dispatch entity queries against partial sources",
    version
)]
pub struct Cli {
    /// Path to a sieve.toml overriding the default limits
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Subtract previously issued queries from a new one
    Reduce {
        /// JSON array of queries already issued, oldest first
        #[arg(long)]
        history: PathBuf,

        /// JSON query to reduce
        #[arg(long)]
        query: PathBuf,
    },

    /// Split a query into the part one source shape answers and the rest
    Reshape {
        /// JSON query to split
        #[arg(long)]
        query: PathBuf,

        /// JSON entity shape of the source
        #[arg(long)]
        shape: PathBuf,
    },

    /// Assign a query to the sources of a catalog
    Plan {
        /// JSON catalog: entity name to an ordered list of sources
        #[arg(long)]
        sources: PathBuf,

        /// JSON query to plan
        #[arg(long)]
        query: PathBuf,
    },

    /// Print the stable fingerprint of a query
    Fingerprint {
        /// JSON query to fingerprint
        #[arg(long)]
        query: PathBuf,
    },
}
