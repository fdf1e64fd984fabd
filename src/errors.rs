//! Client Error Hierarchy
//!
//! Errors are grouped by where they originate: the transport, the payload
//! decoder, the consistency contract of pinned reads, and local settings.
//! Transport churn on the watch stream is never surfaced through these types;
//! watchers only observe a terminal `Removed` notification.

use config::ConfigError;
use tokio::task::JoinError;

use crate::VersionKey;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Stream or call broken, endpoint unusable
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Malformed configuration payload
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The server answered a pinned read with a different version.
    /// Never retried: substituting a version would break the caller's snapshot.
    #[error("Consistency broken: requested {requested}, server returned {received}")]
    ConsistencyViolation {
        requested: VersionKey,
        received: VersionKey,
    },

    /// Settings loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The client was closed and no longer accepts requests
    #[error("Client is closed")]
    ClientClosed,

    /// Unrecoverable failures
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Malformed endpoint address
    #[error("Invalid URI format: {0}")]
    InvalidURI(String),

    /// Auth token that can not be carried as gRPC metadata
    #[error("Invalid request metadata: {0}")]
    InvalidMetadata(String),

    /// TLS material could not be loaded
    #[error("TLS setup failed: {0}")]
    TlsSetup(String),

    /// gRPC transport layer errors
    #[error(transparent)]
    TonicError(#[from] Box<tonic::transport::Error>),

    /// gRPC status code errors
    #[error(transparent)]
    TonicStatusError(#[from] Box<tonic::Status>),

    /// The server ended the watch stream
    #[error("Watch stream closed by peer")]
    StreamClosed,

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

/// Failures while turning a flattened element tree into a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Unknown value type {value_type} at element {index}")]
    UnknownValueType { index: usize, value_type: i32 },

    #[error("Unknown key type {key_type} at element {index}")]
    UnknownKeyType { index: usize, key_type: i32 },

    #[error("Map entry at element {index} has no string key")]
    MissingKey { index: usize },

    #[error("Duplicated map key {key:?} at element {index}")]
    DuplicateKey { index: usize, key: String },

    #[error("Element {index} is out of range, payload holds {len} elements")]
    OutOfRange { index: usize, len: usize },

    #[error("Element {index} is nested deeper than {max_depth} levels")]
    TooDeep { index: usize, max_depth: usize },
}

impl From<tonic::transport::Error> for Error {
    fn from(e: tonic::transport::Error) -> Self {
        Error::Network(NetworkError::TonicError(Box::new(e)))
    }
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        Error::Network(NetworkError::TonicStatusError(Box::new(status)))
    }
}

impl From<JoinError> for Error {
    fn from(e: JoinError) -> Self {
        Error::Network(NetworkError::TaskFailed(e))
    }
}
