use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::network::RequestOptions;
use crate::Error;
use crate::LogLevel;
use crate::Result;

/// Local cache sizing and background loop timing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Distinct values kept by checksum before the sweep trims the index
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Period of the cleanup sweep in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_in_secs: u64,

    /// Idle time after which a subscription without watchers is dropped
    #[serde(default = "default_inactivity_threshold")]
    pub inactivity_threshold_in_secs: u64,

    /// Pause before reopening a broken watch stream
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_in_ms: u64,

    /// Lowest severity of diagnostics the server attaches to replies
    #[serde(default)]
    pub log_level: LogLevel,

    /// Ask the server for the source position of every value node.
    /// Applies to reads and subscriptions alike, since both share the cache.
    #[serde(default)]
    pub with_position: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            cleanup_interval_in_secs: default_cleanup_interval(),
            inactivity_threshold_in_secs: default_inactivity_threshold(),
            retry_backoff_in_ms: default_retry_backoff(),
            log_level: LogLevel::default(),
            with_position: false,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::Config(ConfigError::Message("cache capacity must be > 0".into())));
        }
        if self.cleanup_interval_in_secs == 0 {
            return Err(Error::Config(ConfigError::Message(
                "cleanup interval must be > 0".into(),
            )));
        }
        if self.inactivity_threshold_in_secs == 0 {
            return Err(Error::Config(ConfigError::Message(
                "inactivity threshold must be > 0".into(),
            )));
        }
        if self.retry_backoff_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message("retry backoff must be > 0".into())));
        }
        Ok(())
    }

    pub(crate) fn request_options(&self) -> RequestOptions {
        RequestOptions {
            log_level: self.log_level,
            with_position: self.with_position,
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_in_secs)
    }

    pub fn inactivity_threshold(&self) -> Duration {
        Duration::from_secs(self.inactivity_threshold_in_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_in_ms)
    }
}

fn default_capacity() -> usize {
    1000
}
fn default_cleanup_interval() -> u64 {
    60
}
fn default_inactivity_threshold() -> u64 {
    60
}
fn default_retry_backoff() -> u64 {
    1000
}
