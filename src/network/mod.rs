//! Transport seam between the client runtime and the configuration service.
//!
//! [`ConfigTransport`] is the only place the runtime touches the wire. The
//! production implementation is [`GrpcTransport`]; tests plug in mocks or an
//! in-memory server.

mod command;
mod grpc_transport;

pub(crate) use command::*;
pub use grpc_transport::*;


#[cfg(test)]
use mockall::automock;
use futures::stream::BoxStream;
use tonic::async_trait;

use crate::proto::GetRequest;
use crate::proto::GetResponse;
use crate::proto::TraceRequest;
use crate::proto::TraceResponse;
use crate::proto::UpdateRequest;
use crate::proto::UpdateResponse;
use crate::proto::WatchRequest;
use crate::proto::WatchResponse;
use crate::Result;

/// Outbound half of a watch stream
pub type WatchRequestStream = BoxStream<'static, WatchRequest>;

/// Inbound half of a watch stream. Any `Err` ends the stream attempt.
pub type WatchResponseStream = BoxStream<'static, Result<WatchResponse>>;

/// Server-side events on one traced document
pub type TraceResponseStream = BoxStream<'static, Result<TraceResponse>>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigTransport: Send + Sync + 'static {
    /// Point in time read of one document.
    ///
    /// A `version` of zero asks for the latest version.
    async fn get(
        &self,
        request: GetRequest,
    ) -> Result<GetResponse>;

    /// Asks the server to reload files of a namespace
    async fn update(
        &self,
        request: UpdateRequest,
    ) -> Result<UpdateResponse>;

    /// Opens the multiplexed subscription stream.
    ///
    /// `requests` is drained for as long as the stream lives; the returned
    /// stream yields replies tagged with the subscription id they belong to.
    async fn watch(
        &self,
        requests: WatchRequestStream,
    ) -> Result<WatchResponseStream>;

    /// Opens a stream of what the server does with one document, for as
    /// long as the returned stream is polled.
    async fn trace(
        &self,
        request: TraceRequest,
    ) -> Result<TraceResponseStream>;
}
