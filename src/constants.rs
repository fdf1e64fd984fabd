// -
// Cache

/// Fraction of the capacity kept after an overflowing checksum index is trimmed
pub(crate) const CHECKSUM_INDEX_TRIM_RATIO: f64 = 0.75;

// -
// Wire protocol

/// Deepest container nesting accepted from the server
pub(crate) const MAX_ELEMENT_DEPTH: usize = 128;

/// gRPC metadata key carrying the auth token
pub(crate) const AUTH_TOKEN_METADATA_KEY: &str = "mhconfig-auth-token";

// -
// Settings

/// Settings file looked up relative to the working directory
pub(crate) const DEFAULT_CONFIG_FILE: &str = "config/mhconfig";

/// Environment variable naming an extra settings file
pub(crate) const CONFIG_PATH_ENV: &str = "MHCONFIG_CONFIG_PATH";

/// Prefix of settings overrides, e.g. `MHCONFIG__CLIENT__ENDPOINT`
pub(crate) const ENV_PREFIX: &str = "MHCONFIG";
