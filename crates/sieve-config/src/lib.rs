//! `sieve.toml` loading.
//!
//! Every key is optional and falls back to the core defaults. Unknown keys
//! and zero limits are rejected. The sections convert into the plain config
//! structs `sieve-core` consumes.


use serde::{Deserialize, Serialize};
use sieve_core::{
    query::{DispatchConfig, HistoryConfig},
    shape::ReshapeConfig,
};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Conventional file name looked up by callers.
pub const CONFIG_FILE_NAME: &str = "sieve.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config key '{key}' must be greater than zero")]
    Zero { key: &'static str },
}

///
/// SieveConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SieveConfig {
    pub reshape: ReshapeSection,
    pub dispatch: DispatchSection,
    pub history: HistorySection,
}

impl SieveConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    /// Load `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("reshape.max_flatten", self.reshape.max_flatten),
            ("dispatch.max_depth", self.dispatch.max_depth),
            ("history.capacity", self.history.capacity),
        ];

        match limits.into_iter().find(|(_, value)| *value == 0) {
            Some((key, _)) => Err(ConfigError::Zero { key }),
            None => Ok(()),
        }
    }

    #[must_use]
    pub const fn reshape_config(&self) -> ReshapeConfig {
        ReshapeConfig {
            max_flatten: self.reshape.max_flatten,
        }
    }

    #[must_use]
    pub const fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            max_depth: self.dispatch.max_depth,
        }
    }

    #[must_use]
    pub const fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            capacity: self.history.capacity,
        }
    }
}

///
/// ReshapeSection
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReshapeSection {
    /// Most alternatives one reshape match may expand into.
    pub max_flatten: usize,
}

impl Default for ReshapeSection {
    fn default() -> Self {
        Self {
            max_flatten: ReshapeConfig::DEFAULT_MAX_FLATTEN,
        }
    }
}

///
/// DispatchSection
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchSection {
    /// Most reshape rounds per query.
    pub max_depth: usize,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            max_depth: DispatchConfig::DEFAULT_MAX_DEPTH,
        }
    }
}

///
/// HistorySection
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistorySection {
    pub capacity: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            capacity: HistoryConfig::DEFAULT_CAPACITY,
        }
    }
}
