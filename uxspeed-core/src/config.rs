use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::params::Overrides;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario {path}: {source}")]
    Read { source: io::Error, path: PathBuf },
    #[error("invalid scenario {path}: {source}")]
    Invalid {
        source: toml::de::Error,
        path: PathBuf,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A named set of parameter overrides stored as TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Overrides,
}

impl ScenarioConfig {
    pub fn overrides(&self) -> &Overrides {
        &self.parameters
    }

    pub fn into_overrides(self) -> Overrides {
        self.parameters
    }
}

pub fn load_scenario_config<P: AsRef<Path>>(path: P) -> ConfigResult<ScenarioConfig> {
    load_toml(path)
}

fn load_toml<T, P>(path: P) -> ConfigResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        source,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Invalid {
        source,
        path: path.to_path_buf(),
    })
}
