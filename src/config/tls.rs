use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TlsConfig {
    /// Enables TLS towards the server
    /// Default: false (plain text)
    #[serde(default)]
    pub enable_tls: bool,

    /// PEM root certificate used to verify the server.
    /// Default: none (system roots)
    #[serde(default)]
    pub ca_certificate_path: Option<String>,

    /// Name expected in the server certificate when it differs from the endpoint host
    #[serde(default)]
    pub domain_name: Option<String>,
}

impl TlsConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.enable_tls && (self.ca_certificate_path.is_some() || self.domain_name.is_some()) {
            return Err(Error::Config(ConfigError::Message(
                "TLS options are set but TLS is disabled".into(),
            )));
        }
        Ok(())
    }
}
