//! Configuration snapshot: which commands are exposed, how they are grouped,
//! which permission guards them, and the process catalog backing them.
//!
//! The snapshot is loaded once at startup and passed explicitly to whoever
//! needs it; nothing here is read from global state after loading.

use std::{
    collections::HashSet,
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use consoleport_types::CommandDefinition;
use dirs_next::config_dir;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{CommandMap, expand_tilde};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "CONSOLEPORT_CONFIG_PATH";

/// Environment variable that receives the `env` option value by default.
pub const DEFAULT_ENVIRONMENT_VARIABLE: &str = "APP_ENV";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("command '{name}' is declared more than once in the catalog")]
    DuplicateCommand { name: String },
}

/// A catalog command: its definition plus how to launch it as a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub definition: CommandDefinition,
    /// Executable to launch.
    pub program: String,
    /// Fixed arguments placed before the translated parameters.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Group name to the command identifiers listed under it.
    #[serde(default)]
    pub groups: IndexMap<String, Vec<String>>,
    /// Command identifier to the permission guarding it.
    #[serde(default)]
    pub permissions: IndexMap<String, String>,
    #[serde(default)]
    pub commands: Vec<CatalogEntry>,
    /// Bearer token to the abilities granted to its holder.
    #[serde(default)]
    pub callers: IndexMap<String, Vec<String>>,
    #[serde(default = "default_environment_variable")]
    pub environment_variable: String,
}

fn default_environment_variable() -> String {
    DEFAULT_ENVIRONMENT_VARIABLE.to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            groups: IndexMap::new(),
            permissions: IndexMap::new(),
            commands: Vec::new(),
            callers: IndexMap::new(),
            environment_variable: default_environment_variable(),
        }
    }
}

impl BridgeConfig {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Otherwise the default location is used,
    /// and a missing default file yields an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_path(path);
        }
        let path = default_config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no config file found; using defaults");
            return Ok(Self::default());
        }
        Self::from_path(&path)
    }

    /// Reads a JSON (`.json`) or YAML (anything else) configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        let config = if is_json { Self::from_json(&content)? } else { Self::from_yaml(&content)? };
        debug!(
            path = %path.display(),
            groups = config.groups.len(),
            commands = config.commands.len(),
            "loaded config"
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.commands {
            if !seen.insert(entry.definition.name.as_str()) {
                return Err(ConfigError::DuplicateCommand {
                    name: entry.definition.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Catalog definitions keyed by identifier, in catalog order.
    pub fn definitions(&self) -> CommandMap {
        self.commands
            .iter()
            .map(|entry| (entry.definition.name.clone(), Arc::new(entry.definition.clone())))
            .collect()
    }

    /// The permission guarding `identifier`, if one is configured.
    pub fn permission_for(&self, identifier: &str) -> Option<&str> {
        self.permissions.get(identifier).map(String::as_str)
    }

    /// Abilities granted to the holder of `token`; empty for unknown tokens.
    pub fn abilities_for_token(&self, token: &str) -> &[String] {
        self.callers.get(token).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Get the default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("consoleport")
        .join("config.json")
}
