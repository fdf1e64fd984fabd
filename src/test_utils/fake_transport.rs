use std::collections::VecDeque;
use std::sync::Arc;

use futures::stream;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tonic::async_trait;

use crate::network::TraceResponseStream;
use crate::network::WatchRequestStream;
use crate::network::WatchResponseStream;
use crate::proto::GetRequest;
use crate::proto::GetResponse;
use crate::proto::TraceRequest;
use crate::proto::TraceResponse;
use crate::proto::UpdateRequest;
use crate::proto::UpdateResponse;
use crate::proto::WatchRequest;
use crate::proto::WatchResponse;
use crate::ConfigTransport;
use crate::Error;
use crate::NetworkError;
use crate::Result;

#[derive(Default)]
struct FakeState {
    /// Watch streams opened so far
    connections: usize,
    /// Every outbound request, across all streams
    outbound: Vec<WatchRequest>,
    /// Sender of the live stream, if any
    replies: Option<mpsc::UnboundedSender<Result<WatchResponse>>>,
    get_requests: Vec<GetRequest>,
    get_responses: VecDeque<Result<GetResponse>>,
    trace_requests: Vec<TraceRequest>,
    /// Replayed by the next trace stream
    trace_events: Vec<Result<TraceResponse>>,
}

/// Scriptable in-memory transport.
///
/// Tests push replies into the live watch stream, break it, and inspect what
/// the client sent.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connections(&self) -> usize {
        self.state.lock().connections
    }

    pub(crate) fn outbound(&self) -> Vec<WatchRequest> {
        self.state.lock().outbound.clone()
    }

    pub(crate) fn get_requests(&self) -> Vec<GetRequest> {
        self.state.lock().get_requests.clone()
    }

    pub(crate) fn push_get_response(
        &self,
        response: Result<GetResponse>,
    ) {
        self.state.lock().get_responses.push_back(response);
    }

    pub(crate) fn trace_requests(&self) -> Vec<TraceRequest> {
        self.state.lock().trace_requests.clone()
    }

    pub(crate) fn push_trace_event(
        &self,
        event: Result<TraceResponse>,
    ) {
        self.state.lock().trace_events.push(event);
    }

    /// Delivers a reply on the live stream. Returns false without one.
    pub(crate) fn reply(
        &self,
        reply: WatchResponse,
    ) -> bool {
        match &self.state.lock().replies {
            Some(tx) => tx.send(Ok(reply)).is_ok(),
            None => false,
        }
    }

    /// Fails the live stream with a transport error
    pub(crate) fn break_stream(&self) {
        if let Some(tx) = self.state.lock().replies.take() {
            let _ = tx.send(Err(NetworkError::StreamClosed.into()));
        }
    }
}

#[async_trait]
impl ConfigTransport for FakeTransport {
    async fn get(
        &self,
        request: GetRequest,
    ) -> Result<GetResponse> {
        let mut state = self.state.lock();
        state.get_requests.push(request);
        state
            .get_responses
            .pop_front()
            .unwrap_or_else(|| Err(Error::Fatal("no canned get response".into())))
    }

    async fn update(
        &self,
        _request: UpdateRequest,
    ) -> Result<UpdateResponse> {
        Ok(UpdateResponse::default())
    }

    async fn watch(
        &self,
        mut requests: WatchRequestStream,
    ) -> Result<WatchResponseStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut state = self.state.lock();
            state.connections += 1;
            state.replies = Some(tx);
        }

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(request) = requests.next().await {
                state.lock().outbound.push(request);
            }
        });

        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn trace(
        &self,
        request: TraceRequest,
    ) -> Result<TraceResponseStream> {
        let mut state = self.state.lock();
        state.trace_requests.push(request);
        let events = std::mem::take(&mut state.trace_events);
        Ok(stream::iter(events).boxed())
    }
}
