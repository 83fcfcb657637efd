//! Configuration for building a [`Registry`].
//!
//! Configuration comes from a YAML file, from environment variables, or from CLI flags layered
//! on top of either. Unknown keys in a file are rejected.
//!
//! ```yaml
//! environment: production
//! loader:
//!   module_paths: [/etc/macrodex/modules]
//!   environments:
//!     staging: [/etc/macrodex/staging]
//!   namespace: macros
//!   extension: yaml
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::macros::{FsLoader, Registry};
use crate::{err_msg, Environment, MacroError};

/// Names a configuration file to load.
pub const CONFIG_VAR: &str = "MACRODEX_CONFIG";
/// Search path list (platform path separator) appended to `loader.module_paths`.
pub const PATH_VAR: &str = "MACRODEX_PATH";
/// Overrides `environment`.
pub const ENVIRONMENT_VAR: &str = "MACRODEX_ENVIRONMENT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of the default environment. Unset means the host has none.
    pub environment: Option<String>,
    pub loader: LoaderConfig,
}

/// Where the filesystem loader looks for definition files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Roots searched for every environment; `loadall` loads them into the root environment.
    pub module_paths: Vec<PathBuf>,
    /// Roots searched only for the named environment, before `module_paths`.
    pub environments: BTreeMap<String, Vec<PathBuf>>,
    /// Directory under each root that holds the macro namespace.
    pub namespace: String,
    /// File extension of definition files, without the dot.
    pub extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            module_paths: Vec::new(),
            environments: BTreeMap::new(),
            namespace: "macros".to_string(),
            extension: "yaml".to_string(),
        }
    }
}

impl Config {
    /// Reads a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, MacroError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            err_msg!(General, "Failed to read config file '{}'", path.display()).with_source(e)
        })?;
        serde_yaml::from_str(&source).map_err(|e| {
            err_msg!(General, "Failed to parse config file '{}'", path.display()).with_source(e)
        })
    }

    /// Builds configuration from the process environment.
    ///
    /// `MACRODEX_CONFIG` names a file to start from (a broken file is logged and ignored),
    /// `MACRODEX_PATH` appends module paths, and `MACRODEX_ENVIRONMENT` sets the default
    /// environment.
    pub fn from_env() -> Config {
        let mut config = match std::env::var_os(CONFIG_VAR) {
            Some(path) => Config::from_file(&path).unwrap_or_else(|e| {
                warn!("ignoring {}: {}", CONFIG_VAR, e);
                Config::default()
            }),
            None => Config::default(),
        };
        if let Some(paths) = std::env::var_os(PATH_VAR) {
            config
                .loader
                .module_paths
                .extend(std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
        }
        if let Ok(env) = std::env::var(ENVIRONMENT_VAR) {
            if !env.is_empty() {
                config.environment = Some(env);
            }
        }
        config
    }

    pub fn default_environment(&self) -> Option<Environment> {
        self.environment.as_deref().map(Environment::new)
    }

    /// Builds a registry backed by a filesystem loader over the configured roots.
    pub fn build_registry(&self) -> Registry {
        let mut builder = Registry::builder().loader(FsLoader::new(self.loader.clone()));
        if let Some(env) = self.default_environment() {
            builder = builder.default_environment(env);
        }
        builder.build()
    }
}
