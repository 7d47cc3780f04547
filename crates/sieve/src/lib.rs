//! ## Crate layout
//! - `core`: values, value and entity criteria, shapes, reshape, and query
//!   reduction and dispatch planning.
//! - `config`: `sieve.toml` loading.
//!
//! [`Resolver`] ties a query history and a source registry together behind
//! one configuration; the `prelude` carries the vocabulary needed to use it.

pub use sieve_config as config;
pub use sieve_core as core;

mod resolver;

pub use crate::core::{Error, ErrorClass};
pub use resolver::{Resolution, Resolver};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::{
        Resolution, Resolver,
        core::{
            query::{DispatchPlan, Source},
            schema::Schema,
            shape::{Capability, EntityShapeBuilder},
        },
    };
    pub use serde::{Deserialize, Serialize};
}
