//! Configuration file handling.
//!
//! Settings come from an optional `solar-panda.toml`; command-line flags
//! override individual fields afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::Granularity;
use crate::data::filter::CountrySelection;
use crate::data::loader::LoaderConfig;
use crate::data::model::Country;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "solar-panda.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where and how measurement files are read.
    #[serde(default)]
    pub data: LoaderConfig,

    /// Initial dashboard selection.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Countries selected at start-up.
    #[serde(default = "default_countries")]
    pub countries: Vec<Country>,

    #[serde(default)]
    pub granularity: Granularity,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            countries: default_countries(),
            granularity: Granularity::default(),
        }
    }
}

fn default_countries() -> Vec<Country> {
    Country::ALL.to_vec()
}

impl DashboardConfig {
    pub fn selection(&self) -> CountrySelection {
        self.countries.iter().copied().collect()
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `path` if given, else [`DEFAULT_CONFIG_FILE`] when present,
    /// else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            log::debug!("using config file {}", fallback.display());
            Self::load(fallback)
        } else {
            Ok(Self::default())
        }
    }
}
