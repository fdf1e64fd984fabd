use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::stream::BoxStream;

use crate::proto;
use crate::proto::trace_response;
use crate::Log;
use crate::ReplyStatus;
use crate::Source;
use crate::Result;
use crate::SpecificConfig;
use crate::VersionKey;

/// Result of [`Client::get`](crate::Client::get)
#[derive(Debug, Clone)]
pub struct GetReply {
    pub status: ReplyStatus,
    pub version: VersionKey,
    /// Set when `status` is OK
    pub config: Option<Arc<SpecificConfig>>,
    /// Server diagnostics, empty when served from the cache
    pub logs: Vec<Log>,
    /// Files referenced by `logs`, by source id
    pub sources: HashMap<u32, Source>,
}

impl GetReply {
    pub(crate) fn cached(
        version: VersionKey,
        config: Arc<SpecificConfig>,
    ) -> Self {
        Self {
            status: ReplyStatus::Ok,
            version,
            config: Some(config),
            logs: Vec::new(),
            sources: HashMap::new(),
        }
    }
}

/// Result of [`Client::update`](crate::Client::update)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReply {
    pub status: ReplyStatus,
    /// Namespace version after the reload
    pub version: VersionKey,
}

/// What the server did with a traced document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceStatus {
    /// A value was sent to a reader or a watcher
    ReturnedElements,
    Error,
    AddedWatcher,
    /// A watcher subscribed again to a document it already watched
    ExistingWatcher,
    RemovedWatcher,
}

impl fmt::Display for TraceStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            TraceStatus::ReturnedElements => "RETURNED_ELEMENTS",
            TraceStatus::Error => "ERROR",
            TraceStatus::AddedWatcher => "ADDED_WATCHER",
            TraceStatus::ExistingWatcher => "EXISTING_WATCHER",
            TraceStatus::RemovedWatcher => "REMOVED_WATCHER",
        };
        f.write_str(name)
    }
}

impl From<trace_response::Status> for TraceStatus {
    fn from(status: trace_response::Status) -> Self {
        match status {
            trace_response::Status::ReturnedElements => TraceStatus::ReturnedElements,
            trace_response::Status::Error => TraceStatus::Error,
            trace_response::Status::AddedWatcher => TraceStatus::AddedWatcher,
            trace_response::Status::ExistingWatcher => TraceStatus::ExistingWatcher,
            trace_response::Status::RemovedWatcher => TraceStatus::RemovedWatcher,
        }
    }
}

/// One server-side event on a traced document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub status: TraceStatus,
    pub version: VersionKey,
    pub overrides: Vec<String>,
    pub flavors: Vec<String>,
    pub document: String,
    /// Address of the client the event concerns
    pub peer: String,
}

impl From<proto::TraceResponse> for TraceEvent {
    fn from(response: proto::TraceResponse) -> Self {
        let status = trace_response::Status::try_from(response.status)
            .map(TraceStatus::from)
            .unwrap_or(TraceStatus::Error);
        Self {
            status,
            version: VersionKey::new(response.namespace_id, response.version),
            overrides: response.overrides,
            flavors: response.flavors,
            document: response.document,
            peer: response.peer,
        }
    }
}

/// Events returned by [`Client::trace`](crate::Client::trace)
pub type TraceStream = BoxStream<'static, Result<TraceEvent>>;
