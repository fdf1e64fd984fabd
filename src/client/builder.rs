use std::time::Duration;

use super::Client;
use crate::CacheConfig;
use crate::ClientConfig;
use crate::GrpcTransport;
use crate::LogLevel;
use crate::Result;
use crate::Settings;

pub struct ClientBuilder {
    config: ClientConfig,
    cache: CacheConfig,
}

impl ClientBuilder {
    /// Create a new builder with default config and the given server address
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                endpoint: endpoint.into(),
                ..ClientConfig::default()
            },
            cache: CacheConfig::default(),
        }
    }

    /// Builder initialized from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            config: settings.client.clone(),
            cache: settings.cache.clone(),
        }
    }

    /// Set connection timeout (default: 1s)
    pub fn connect_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.config.connect_timeout_in_ms = timeout.as_millis() as u64;
        self
    }

    /// Set timeout of unary calls (default: 3s)
    pub fn request_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.config.request_timeout_in_ms = timeout.as_millis() as u64;
        self
    }

    /// Enable/disable gzip compression (default: disabled)
    pub fn enable_compression(
        mut self,
        enable: bool,
    ) -> Self {
        self.config.enable_compression = enable;
        self
    }

    pub fn auth_token(
        mut self,
        token: impl Into<String>,
    ) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    /// Distinct cached values kept by checksum (default: 1000)
    pub fn capacity(
        mut self,
        capacity: usize,
    ) -> Self {
        self.cache.capacity = capacity;
        self
    }

    /// Pause before reopening a failed watch stream (default: 1s)
    pub fn retry_backoff(
        mut self,
        backoff: Duration,
    ) -> Self {
        self.cache.retry_backoff_in_ms = backoff.as_millis() as u64;
        self
    }

    /// Diagnostics the server should attach to replies (default: errors only)
    pub fn log_level(
        mut self,
        level: LogLevel,
    ) -> Self {
        self.cache.log_level = level;
        self
    }

    /// Ask the server for the source position of every value node
    /// (default: off). See [`SpecificConfig::positions`](crate::SpecificConfig::positions).
    pub fn with_position(
        mut self,
        enabled: bool,
    ) -> Self {
        self.cache.with_position = enabled;
        self
    }

    /// Completely replaces the connection configuration, discarding earlier
    /// calls to the individual setters.
    pub fn set_config(
        mut self,
        config: ClientConfig,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn set_cache_config(
        mut self,
        cache: CacheConfig,
    ) -> Self {
        self.cache = cache;
        self
    }

    /// Connects to the server and starts the client
    pub async fn build(self) -> Result<Client> {
        self.config.validate()?;
        self.cache.validate()?;
        let transport = GrpcTransport::connect(&self.config).await?;
        Client::new(transport, self.cache)
    }

    /// Starts the client without waiting for the server. The watch loop keeps
    /// retrying until the server becomes reachable.
    pub fn build_lazy(self) -> Result<Client> {
        self.config.validate()?;
        self.cache.validate()?;
        let transport = GrpcTransport::connect_lazy(&self.config)?;
        Client::new(transport, self.cache)
    }
}
