//! Layered settings for the client and the `mhconfig-watch` binary.
//!
//! Sources, lowest priority first:
//! 1. Default values (hardcoded)
//! 2. `config/mhconfig.toml` when present
//! 3. Explicit settings file (argument, or `MHCONFIG_CONFIG_PATH`)
//! 4. Environment variables `MHCONFIG__<SECTION>__<FIELD>` (highest priority)

mod cache;
mod client;
mod tls;
pub use cache::*;
pub use client::*;
pub use tls::*;


//---
use std::env;
use std::path::PathBuf;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::CONFIG_PATH_ENV;
use crate::constants::DEFAULT_CONFIG_FILE;
use crate::constants::ENV_PREFIX;
use crate::ConfigKey;
use crate::Error;
use crate::NamespaceKey;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    /// Connection to the configuration service
    #[serde(default)]
    pub client: ClientConfig,
    /// Local cache and background loops
    #[serde(default)]
    pub cache: CacheConfig,
    /// Log output of the binary
    #[serde(default)]
    pub log: LogConfig,
    /// Documents the binary watches
    #[serde(default)]
    pub watches: Vec<WatchTarget>,
}

/// Where the binary writes its logs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogConfig {
    /// Log directory, stdout when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_log_file_name")]
    pub file_name: String,
}

/// One document to watch
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub root_path: String,
    #[serde(default)]
    pub overrides: Vec<String>,
    pub document: String,
    #[serde(default)]
    pub flavors: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_name: default_log_file_name(),
        }
    }
}

fn default_log_file_name() -> String {
    "mhconfig-watch.log".into()
}

impl WatchTarget {
    pub fn namespace_key(&self) -> NamespaceKey {
        NamespaceKey::new(self.root_path.clone(), self.overrides.clone())
    }

    pub fn config_key(&self) -> ConfigKey {
        ConfigKey::new(self.document.clone(), self.flavors.clone())
    }
}

impl Settings {
    /// Loads and validates settings.
    ///
    /// # Arguments
    /// * `config_path` - Optional settings file, takes precedence over `MHCONFIG_CONFIG_PATH`
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));

        let explicit = config_path.map(str::to_owned).or_else(|| env::var(CONFIG_PATH_ENV).ok());
        if let Some(path) = explicit {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.client.validate()?;
        self.cache.validate()?;

        for target in &self.watches {
            if target.root_path.is_empty() || target.document.is_empty() {
                return Err(Error::Config(ConfigError::Message(format!(
                    "watch target {target:?} needs a root_path and a document"
                ))));
            }
        }
        Ok(())
    }
}
