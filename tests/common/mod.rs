//! In-memory configuration service used by the integration tests.
//!
//! Holds a single namespace whose version moves forward on every publish and
//! keeps the history of each document, so reads pinned to an older version
//! can be answered until that history is forgotten.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use mhconfig_client::flatten_element;
use mhconfig_client::proto;
use mhconfig_client::proto::get_response;
use mhconfig_client::proto::trace_response;
use mhconfig_client::proto::update_response;
use mhconfig_client::proto::watch_response;
use mhconfig_client::CacheConfig;
use mhconfig_client::ConfigTransport;
use mhconfig_client::Element;
use mhconfig_client::NetworkError;
use mhconfig_client::Result;
use mhconfig_client::TraceResponseStream;
use mhconfig_client::WatchRequestStream;
use mhconfig_client::WatchResponseStream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tonic::async_trait;

pub const NAMESPACE_ID: u64 = 11;

pub const WAIT: Duration = Duration::from_secs(5);

type ReplySender = mpsc::UnboundedSender<Result<proto::WatchResponse>>;

type TraceSender = mpsc::UnboundedSender<Result<proto::TraceResponse>>;

#[derive(Default)]
struct ServerState {
    version: u32,
    /// Oldest version still served to pinned reads
    oldest_version: u32,
    documents: HashMap<String, BTreeMap<u32, Element>>,
    /// Live streams by connection number
    streams: HashMap<usize, ReplySender>,
    /// Document watched by `(connection, uid)`
    subscriptions: HashMap<(usize, u32), String>,
    connections: usize,
    updates: Vec<proto::UpdateRequest>,
    /// Open trace streams with the document they follow
    tracers: Vec<(String, TraceSender)>,
}

impl ServerState {
    fn value_at(
        &self,
        document: &str,
        version: u32,
    ) -> Option<&Element> {
        self.documents
            .get(document)?
            .range(..=version)
            .next_back()
            .map(|(_, value)| value)
    }

    fn watch_reply(
        &self,
        uid: u32,
        document: &str,
    ) -> proto::WatchResponse {
        match self.value_at(document, self.version) {
            Some(value) => proto::WatchResponse {
                uid,
                status: watch_response::Status::Ok as i32,
                namespace_id: NAMESPACE_ID,
                version: self.version,
                checksum: checksum(value),
                elements: flatten_element(value),
                ..Default::default()
            },
            None => proto::WatchResponse {
                uid,
                status: watch_response::Status::Error as i32,
                namespace_id: NAMESPACE_ID,
                version: self.version,
                ..Default::default()
            },
        }
    }

    fn handle_request(
        &mut self,
        connection: usize,
        request: proto::WatchRequest,
    ) {
        if request.remove {
            if let Some(document) = self.subscriptions.remove(&(connection, request.uid)) {
                self.emit_trace(trace_response::Status::RemovedWatcher, &document, self.version);
            }
            return;
        }
        let reply = self.watch_reply(request.uid, &request.document);
        let status = if self.subscriptions.contains_key(&(connection, request.uid)) {
            trace_response::Status::ExistingWatcher
        } else {
            trace_response::Status::AddedWatcher
        };
        self.emit_trace(status, &request.document, self.version);
        self.emit_trace(trace_response::Status::ReturnedElements, &request.document, reply.version);
        self.subscriptions
            .insert((connection, request.uid), request.document);
        if let Some(stream) = self.streams.get(&connection) {
            let _ = stream.send(Ok(reply));
        }
    }

    fn emit_trace(
        &mut self,
        status: trace_response::Status,
        document: &str,
        version: u32,
    ) {
        let event = proto::TraceResponse {
            status: status as i32,
            namespace_id: NAMESPACE_ID,
            version,
            document: document.to_string(),
            peer: "in-memory".to_string(),
            ..Default::default()
        };
        self.tracers
            .retain(|(traced, tracer)| traced != document || tracer.send(Ok(event.clone())).is_ok());
    }
}

fn checksum(value: &Element) -> Vec<u8> {
    let mut hasher = DefaultHasher::new();
    value.to_string().hash(&mut hasher);
    hasher.finish().to_be_bytes().to_vec()
}

#[derive(Clone, Default)]
pub struct InMemoryServer {
    state: Arc<Mutex<ServerState>>,
}

impl InMemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a new namespace version where `document` holds `value`.
    /// Every subscriber of `document` is notified.
    pub fn publish(
        &self,
        document: &str,
        value: Element,
    ) -> u32 {
        let mut state = self.state.lock();
        state.version += 1;
        let version = state.version;
        state
            .documents
            .entry(document.to_string())
            .or_default()
            .insert(version, value);

        let targets: Vec<(usize, u32)> = state
            .subscriptions
            .iter()
            .filter(|(_, watched)| watched.as_str() == document)
            .map(|(target, _)| *target)
            .collect();
        for (connection, uid) in targets {
            let reply = state.watch_reply(uid, document);
            state.emit_trace(trace_response::Status::ReturnedElements, document, version);
            if let Some(stream) = state.streams.get(&connection) {
                let _ = stream.send(Ok(reply));
            }
        }
        version
    }

    /// Stops serving versions older than `version` to pinned reads
    pub fn forget_before(
        &self,
        version: u32,
    ) {
        self.state.lock().oldest_version = version;
    }

    /// Fails every open watch stream
    pub fn disconnect_all(&self) {
        let mut state = self.state.lock();
        for (_, stream) in state.streams.drain() {
            let _ = stream.send(Err(NetworkError::StreamClosed.into()));
        }
        state.subscriptions.clear();
    }

    pub fn connections(&self) -> usize {
        self.state.lock().connections
    }

    pub fn num_subscriptions(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    pub fn updates(&self) -> Vec<proto::UpdateRequest> {
        self.state.lock().updates.clone()
    }
}

#[async_trait]
impl ConfigTransport for InMemoryServer {
    async fn get(
        &self,
        request: proto::GetRequest,
    ) -> Result<proto::GetResponse> {
        let mut state = self.state.lock();
        let version = if request.version == 0 {
            state.version
        } else {
            request.version
        };
        if version > state.version || version < state.oldest_version {
            return Ok(proto::GetResponse {
                status: get_response::Status::InvalidVersion as i32,
                namespace_id: NAMESPACE_ID,
                version: state.version,
                ..Default::default()
            });
        }

        let response = match state.value_at(&request.document, version) {
            Some(value) => proto::GetResponse {
                status: get_response::Status::Ok as i32,
                namespace_id: NAMESPACE_ID,
                version,
                checksum: checksum(value),
                elements: flatten_element(value),
                ..Default::default()
            },
            None => proto::GetResponse {
                status: get_response::Status::Error as i32,
                namespace_id: NAMESPACE_ID,
                version,
                ..Default::default()
            },
        };
        let status = if response.status == get_response::Status::Ok as i32 {
            trace_response::Status::ReturnedElements
        } else {
            trace_response::Status::Error
        };
        state.emit_trace(status, &request.document, version);
        Ok(response)
    }

    async fn update(
        &self,
        request: proto::UpdateRequest,
    ) -> Result<proto::UpdateResponse> {
        let mut state = self.state.lock();
        state.updates.push(request);
        Ok(proto::UpdateResponse {
            status: update_response::Status::Ok as i32,
            namespace_id: NAMESPACE_ID,
            version: state.version,
        })
    }

    async fn watch(
        &self,
        mut requests: WatchRequestStream,
    ) -> Result<WatchResponseStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = {
            let mut state = self.state.lock();
            state.connections += 1;
            let connection = state.connections;
            state.streams.insert(connection, tx);
            connection
        };

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(request) = requests.next().await {
                state.lock().handle_request(connection, request);
            }
        });

        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn trace(
        &self,
        request: proto::TraceRequest,
    ) -> Result<TraceResponseStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().tracers.push((request.document, tx));
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

/// Loops quiet enough to leave the scenario in control
pub fn cache_config() -> CacheConfig {
    CacheConfig {
        retry_backoff_in_ms: 20,
        cleanup_interval_in_secs: 3600,
        inactivity_threshold_in_secs: 3600,
        ..CacheConfig::default()
    }
}

pub fn map(entries: &[(&str, i64)]) -> Element {
    Element::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Element::Int(*v)))
            .collect(),
    )
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within {WAIT:?}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
