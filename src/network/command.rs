use std::sync::Arc;

use futures::stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use super::WatchRequestStream;
use crate::proto;
use crate::ConfigKey;
use crate::LogLevel;
use crate::NamespaceKey;

/// Instruction for the watch worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WatchCommand {
    Subscribe {
        subscription_id: u32,
        namespace: NamespaceKey,
        key: ConfigKey,
    },
    Unsubscribe {
        subscription_id: u32,
    },
}

/// Per-client knobs copied into every subscription request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RequestOptions {
    pub(crate) log_level: LogLevel,
    pub(crate) with_position: bool,
}

/// A command tagged with the cache generation it was issued under
#[derive(Debug)]
pub(crate) struct StampedCommand {
    pub(crate) generation: u64,
    pub(crate) command: WatchCommand,
}

impl WatchCommand {
    pub(crate) fn subscription_id(&self) -> u32 {
        match self {
            WatchCommand::Subscribe { subscription_id, .. } => *subscription_id,
            WatchCommand::Unsubscribe { subscription_id } => *subscription_id,
        }
    }

    pub(crate) fn into_request(
        self,
        options: RequestOptions,
    ) -> proto::WatchRequest {
        let log_level = proto::LogLevel::from(options.log_level) as i32;
        match self {
            WatchCommand::Subscribe {
                subscription_id,
                namespace,
                key,
            } => proto::WatchRequest {
                uid: subscription_id,
                remove: false,
                root_path: namespace.root_path,
                overrides: namespace.overrides,
                flavors: key.flavors,
                document: key.document,
                log_level,
                with_position: options.with_position,
            },
            WatchCommand::Unsubscribe { subscription_id } => proto::WatchRequest {
                uid: subscription_id,
                remove: true,
                log_level,
                ..Default::default()
            },
        }
    }
}

/// Reads the generation the cache is currently at
pub(crate) type GenerationFn = Arc<dyn Fn() -> u64 + Send + Sync>;

/// FIFO of commands shared by the API, the cleanup sweep and the watch worker.
///
/// Producers never block. A single stream attempt at a time drains it through
/// [`CommandQueue::outbound_stream`].
#[derive(Clone)]
pub(crate) struct CommandQueue {
    tx: mpsc::UnboundedSender<StampedCommand>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<StampedCommand>>>,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    pub(crate) fn push(
        &self,
        generation: u64,
        command: WatchCommand,
    ) {
        trace!(generation, ?command, "[CommandQueue] push");
        // The receiver lives as long as `self`, sending can not fail.
        let _ = self.tx.send(StampedCommand { generation, command });
    }

    /// Turns the queue into the outbound side of one stream attempt.
    ///
    /// Commands stamped with a generation older than the current one are
    /// dropped. The stream ends once `cancel` fires, releasing the queue for
    /// the next attempt.
    pub(crate) fn outbound_stream(
        &self,
        cancel: CancellationToken,
        current_generation: GenerationFn,
        options: RequestOptions,
    ) -> WatchRequestStream {
        let state = (self.rx.clone(), cancel, current_generation);
        stream::unfold(state, move |(rx, cancel, current_generation)| async move {
            loop {
                let next = {
                    let mut receiver = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return None,
                        receiver = rx.lock() => receiver,
                    };
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        stamped = receiver.recv() => stamped,
                    }
                };
                let stamped = next?;

                let generation = current_generation();
                if stamped.generation != generation {
                    debug!(
                        subscription_id = stamped.command.subscription_id(),
                        stale = stamped.generation,
                        generation,
                        "[CommandQueue] dropping command from a previous stream"
                    );
                    continue;
                }
                let request = stamped.command.into_request(options);
                return Some((request, (rx, cancel, current_generation)));
            }
        })
        .boxed()
    }
}
