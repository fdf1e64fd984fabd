//! Owner of the multiplexed watch stream.
//!
//! One stream attempt at a time drains the command queue as outbound requests
//! and dispatches replies by subscription id. When an attempt fails the cache
//! is reset, every watcher gets a terminal `Removed` event, and a new attempt
//! starts after a fixed backoff.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::ClientInner;
use crate::cache::dispatch;
use crate::decode_logs;
use crate::network::GenerationFn;
use crate::network::WatchCommand;
use crate::proto;
use crate::proto::watch_response;
use crate::ConfigTransport;
use crate::Error;
use crate::NetworkError;
use crate::ReplyStatus;
use crate::VersionKey;

/// How a stream attempt ended
#[derive(Debug)]
pub(crate) enum StreamOutcome {
    Shutdown,
    Failed(Error),
}

pub(crate) struct WatchLoop<T> {
    inner: Arc<ClientInner<T>>,
    shutdown_signal: watch::Receiver<()>,
    backoff: Duration,
}

impl<T: ConfigTransport> WatchLoop<T> {
    pub(crate) fn new(
        inner: Arc<ClientInner<T>>,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        let backoff = inner.config.retry_backoff();
        Self {
            inner,
            shutdown_signal,
            backoff,
        }
    }

    pub(crate) async fn run(mut self) {
        let mut attempt: u64 = 0;
        loop {
            if self.inner.is_closed() {
                break;
            }
            attempt += 1;

            let cancel = CancellationToken::new();
            let outcome = self.run_stream(cancel.clone()).await;
            // Releases the command queue held by the outbound side.
            cancel.cancel();

            match outcome {
                StreamOutcome::Shutdown => break,
                StreamOutcome::Failed(e) => {
                    warn!(attempt, backoff = ?self.backoff, "[WatchLoop] stream failed: {e}");

                    let notifications = self.inner.context.lock().reset();
                    dispatch(notifications);

                    tokio::select! {
                        biased;
                        _ = self.shutdown_signal.changed() => break,
                        _ = sleep(self.backoff) => {}
                    }
                }
            }
        }
        info!("[WatchLoop] stopped");
    }

    /// Runs one stream attempt until it fails or shutdown is signaled
    pub(crate) async fn run_stream(
        &mut self,
        cancel: CancellationToken,
    ) -> StreamOutcome {
        let generation: GenerationFn = {
            let inner = self.inner.clone();
            Arc::new(move || inner.current_generation())
        };
        let outbound = self
            .inner
            .commands
            .outbound_stream(cancel, generation, self.inner.config.request_options());

        let opened = tokio::select! {
            biased;
            _ = self.shutdown_signal.changed() => return StreamOutcome::Shutdown,
            opened = self.inner.transport.watch(outbound) => opened,
        };
        let mut inbound = match opened {
            Ok(inbound) => inbound,
            Err(e) => return StreamOutcome::Failed(e),
        };
        info!("[WatchLoop] stream opened");

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_signal.changed() => {
                    debug!("[WatchLoop] shutdown signal received");
                    return StreamOutcome::Shutdown;
                }
                reply = inbound.next() => match reply {
                    Some(Ok(reply)) => self.handle_reply(reply),
                    Some(Err(e)) => return StreamOutcome::Failed(e),
                    None => return StreamOutcome::Failed(NetworkError::StreamClosed.into()),
                },
            }
        }
    }

    /// Applies one reply to the cache and fires the resulting notifications
    /// once the lock is released.
    pub(crate) fn handle_reply(
        &self,
        reply: proto::WatchResponse,
    ) {
        let subscription_id = reply.uid;
        let status = match watch_response::Status::try_from(reply.status) {
            Ok(status) => ReplyStatus::from(status),
            Err(_) => {
                warn!(subscription_id, status = reply.status, "[WatchLoop] unknown reply status");
                ReplyStatus::Error
            }
        };
        trace!(
            subscription_id,
            %status,
            namespace_id = reply.namespace_id,
            version = reply.version,
            "[WatchLoop] reply"
        );

        for log in decode_logs(&reply.logs) {
            log.emit("WatchLoop:server");
        }

        let notifications = {
            let mut context = self.inner.context.lock();
            let generation = context.generation();
            let Some((namespace, key)) = context
                .subscription(subscription_id)
                .map(|(namespace, key)| (namespace.clone(), key.clone()))
            else {
                debug!(subscription_id, "[WatchLoop] reply for an unknown subscription");
                return;
            };

            match status {
                ReplyStatus::Removed => {
                    let still_active = match context.config_by_id_mut(subscription_id) {
                        Some(config) => {
                            config.touch();
                            config.is_active()
                        }
                        None => false,
                    };
                    if still_active {
                        debug!(subscription_id, "[WatchLoop] removed by the server, subscribing again");
                        self.inner.commands.push(
                            generation,
                            WatchCommand::Subscribe {
                                subscription_id,
                                namespace,
                                key,
                            },
                        );
                    } else {
                        context.remove_subscription(subscription_id);
                    }
                    Vec::new()
                }
                ReplyStatus::Ok => {
                    let version = VersionKey::new(reply.namespace_id, reply.version);
                    let decoded =
                        context.resolve_specific_config(&reply.checksum, || self.inner.decode_payload(&reply.elements));
                    match decoded {
                        Ok(specific) => {
                            context
                                .get_namespace_ctx(&namespace)
                                .insert_version(version, key, specific.clone());
                            match context.config_by_id_mut(subscription_id) {
                                Some(config) => {
                                    config.touch();
                                    config.update(version, specific)
                                }
                                None => Vec::new(),
                            }
                        }
                        Err(e) => {
                            error!(subscription_id, %version, "[WatchLoop] malformed payload: {e}");
                            match context.config_by_id_mut(subscription_id) {
                                Some(config) => config.update_status(ReplyStatus::Error),
                                None => Vec::new(),
                            }
                        }
                    }
                }
                status => match context.config_by_id_mut(subscription_id) {
                    Some(config) => {
                        config.touch();
                        config.update_status(status)
                    }
                    None => Vec::new(),
                },
            }
        };

        dispatch(notifications);
    }
}
