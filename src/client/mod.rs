//! Public client API.
//!
//! - [`Client`] - watch/unwatch, cache-first reads and reload triggers
//! - [`ClientBuilder`] - configurable construction over gRPC
//! - [`Session`] - reads pinned to one namespace version
//!
//! Two background tasks run per client: the watch loop, which owns the single
//! multiplexed stream, and the cleanup loop, which sweeps idle state.
//!
//! # Basic Usage
//! ```no_run
//! use std::sync::Arc;
//! use mhconfig_client::{Client, ConfigKey, NamespaceKey, WatchEvent};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let client = Client::builder("http://127.0.0.1:2222").build().await.unwrap();
//!     let namespace = NamespaceKey::new("/srv/config", ["prod"]);
//!
//!     let (subscription_id, callback_id) = client
//!         .watch(
//!             &namespace,
//!             &ConfigKey::document("database"),
//!             Some(Arc::new(|event: &WatchEvent| println!("{:?}", event.status))),
//!         )
//!         .unwrap();
//!
//!     let reply = client.get(&namespace, &ConfigKey::document("cache"), None).await.unwrap();
//!     println!("{} {:?}", reply.version, reply.config.map(|c| c.value().to_string()));
//!
//!     client.unwatch(subscription_id, callback_id.unwrap());
//!     client.close().await.unwrap();
//! }
//! ```

mod builder;
mod cleanup_loop;
mod reply;
mod session;
mod watch_loop;

pub use builder::*;
pub use reply::*;
pub use session::*;


use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;

use self::cleanup_loop::CleanupLoop;
use self::watch_loop::WatchLoop;
use crate::cache::dispatch;
use crate::cache::Notification;
use crate::decode_elements;
use crate::decode_elements_with_positions;
use crate::decode_logs;
use crate::decode_sources;
use crate::network::CommandQueue;
use crate::network::WatchCommand;
use crate::proto;
use crate::CacheConfig;
use crate::ConfigKey;
use crate::ConfigTransport;
use crate::Context;
use crate::DecodeError;
use crate::Element;
use crate::Error;
use crate::GrpcTransport;
use crate::NamespaceKey;
use crate::PositionTree;
use crate::ReplyStatus;
use crate::Result;
use crate::VersionKey;
use crate::WatchCallback;

/// Entry point of the configuration client.
///
/// Created through [`Client::builder`] for gRPC, or [`Client::new`] over any
/// [`ConfigTransport`]. Must be closed with [`Client::close`] to deliver the
/// final `Removed` notifications; dropping it only stops the workers.
pub struct Client<T: ConfigTransport = GrpcTransport> {
    inner: Arc<ClientInner<T>>,
    shutdown_tx: watch::Sender<()>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

/// State shared by the API, the workers and sessions
pub(crate) struct ClientInner<T> {
    pub(crate) transport: Arc<T>,
    pub(crate) context: Mutex<Context>,
    pub(crate) commands: CommandQueue,
    pub(crate) config: CacheConfig,
    closed: AtomicBool,
}

impl Client<GrpcTransport> {
    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }
}

impl<T: ConfigTransport> Client<T> {
    /// Starts the client over `transport`. Must be called inside a tokio runtime.
    ///
    /// Fails with [`Error::Config`] when `config` does not validate.
    pub fn new(
        transport: T,
        config: CacheConfig,
    ) -> Result<Self> {
        Self::with_shared_transport(Arc::new(transport), config)
    }

    pub fn with_shared_transport(
        transport: Arc<T>,
        config: CacheConfig,
    ) -> Result<Self> {
        config.validate()?;
        let inner = Arc::new(ClientInner::new(transport, config));
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let watch_loop = WatchLoop::new(inner.clone(), shutdown_rx.clone());
        let cleanup_loop = CleanupLoop::new(inner.clone(), shutdown_rx);
        let workers = vec![tokio::spawn(watch_loop.run()), tokio::spawn(cleanup_loop.run())];

        debug!("[Client] started");
        Ok(Self {
            inner,
            shutdown_tx,
            workers: Mutex::new(workers),
        })
    }

    /// Registers interest in a document.
    ///
    /// Returns the subscription id and, when a callback was given, its id for
    /// [`Client::unwatch`]. If a value is already cached the callback runs with
    /// it before this method returns; otherwise it runs on first arrival. The
    /// server is contacted only the first time a document is watched.
    pub fn watch(
        &self,
        namespace: &NamespaceKey,
        key: &ConfigKey,
        callback: Option<WatchCallback>,
    ) -> Result<(u32, Option<u32>)> {
        self.inner.ensure_open()?;

        let (subscription_id, callback_id, initial) = {
            let mut context = self.inner.context.lock();
            let generation = context.generation();
            let (is_new, config) = context.get_or_make_config(namespace, key);
            config.touch();
            let subscription_id = config.subscription_id();

            let (callback_id, initial) = match callback {
                Some(callback) => {
                    let initial = config.current_event().map(|event| Notification {
                        callback: callback.clone(),
                        event,
                    });
                    (Some(config.add_callback(callback)), initial)
                }
                None => (None, None),
            };

            if is_new {
                self.inner.commands.push(
                    generation,
                    WatchCommand::Subscribe {
                        subscription_id,
                        namespace: namespace.clone(),
                        key: key.clone(),
                    },
                );
            }
            (subscription_id, callback_id, initial)
        };

        if let Some(notification) = initial {
            notification.fire();
        }
        Ok((subscription_id, callback_id))
    }

    /// Removes one callback, returning whether it existed.
    ///
    /// The subscription itself stays until the cleanup sweep finds it idle.
    pub fn unwatch(
        &self,
        subscription_id: u32,
        callback_id: u32,
    ) -> bool {
        let mut context = self.inner.context.lock();
        match context.config_by_id_mut(subscription_id) {
            Some(config) => config.remove_callback(callback_id),
            None => false,
        }
    }

    /// Cache-first read of one document.
    ///
    /// With `version` unset, the latest value of a live subscription is
    /// returned; with it set, only that exact version is acceptable and a
    /// different answer from the server is an [`Error::ConsistencyViolation`].
    pub async fn get(
        &self,
        namespace: &NamespaceKey,
        key: &ConfigKey,
        version: Option<VersionKey>,
    ) -> Result<GetReply> {
        self.inner.get(namespace, key, version).await
    }

    /// Asks the server to reload `relative_paths` of `root_path`, or the
    /// whole namespace when `None`.
    pub async fn update(
        &self,
        root_path: &str,
        relative_paths: Option<Vec<String>>,
    ) -> Result<UpdateReply> {
        self.inner.ensure_open()?;
        let request = proto::UpdateRequest {
            root_path: root_path.to_string(),
            reload: relative_paths.is_none(),
            relative_paths: relative_paths.unwrap_or_default(),
        };
        let response = self.inner.transport.update(request).await?;
        let status = proto::update_response::Status::try_from(response.status)
            .map(ReplyStatus::from)
            .unwrap_or(ReplyStatus::Error);
        Ok(UpdateReply {
            status,
            version: VersionKey::new(response.namespace_id, response.version),
        })
    }

    /// Follows what the server does with one document: values returned to
    /// readers and watchers added or removed, whichever client they belong
    /// to. Events flow until the stream is dropped or the server ends it.
    pub async fn trace(
        &self,
        namespace: &NamespaceKey,
        key: &ConfigKey,
    ) -> Result<TraceStream> {
        self.inner.ensure_open()?;
        let request = proto::TraceRequest {
            root_path: namespace.root_path.clone(),
            overrides: namespace.overrides.clone(),
            flavors: key.flavors.clone(),
            document: key.document.clone(),
        };
        debug!(%namespace, %key, "[Client:trace] opening trace stream");
        let events = self.inner.transport.trace(request).await?;
        Ok(events.map(|event| event.map(TraceEvent::from)).boxed())
    }

    /// Opens a consistent read handle on `namespace`
    pub fn new_session(
        &self,
        namespace: NamespaceKey,
    ) -> Session<T> {
        Session::new(self.inner.clone(), namespace)
    }

    /// Read access to the cache, mostly for diagnostics
    pub fn with_context<R>(
        &self,
        f: impl FnOnce(&Context) -> R,
    ) -> R {
        f(&self.inner.context.lock())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Stops both workers, waits for them and deactivates every
    /// subscription. Watchers receive one final `Removed` event.
    pub async fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("[Client:close] shutting down");
        let _ = self.shutdown_tx.send(());

        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            worker.await?;
        }

        let notifications = self.inner.context.lock().reset();
        dispatch(notifications);
        Ok(())
    }
}

impl<T: ConfigTransport> Drop for Client<T> {
    fn drop(&mut self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }
}

impl<T: ConfigTransport> ClientInner<T> {
    pub(crate) fn new(
        transport: Arc<T>,
        config: CacheConfig,
    ) -> Self {
        Self {
            transport,
            context: Mutex::new(Context::new(config.capacity)),
            commands: CommandQueue::new(),
            config,
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ClientClosed);
        }
        Ok(())
    }

    pub(crate) fn current_generation(&self) -> u64 {
        self.context.lock().generation()
    }

    /// Decodes a reply payload, with positions when the client asks for them
    pub(crate) fn decode_payload(
        &self,
        elements: &[proto::Element],
    ) -> std::result::Result<(Element, PositionTree), DecodeError> {
        if self.config.with_position {
            decode_elements_with_positions(elements)
        } else {
            decode_elements(elements).map(|value| (value, PositionTree::default()))
        }
    }

    fn cached(
        &self,
        namespace: &NamespaceKey,
        key: &ConfigKey,
        version: Option<VersionKey>,
    ) -> Option<GetReply> {
        let mut context = self.context.lock();
        let namespace_ctx = context.namespace_mut(namespace)?;
        match version {
            None => {
                let config = namespace_ctx.config_mut(key)?;
                if config.status() != Some(ReplyStatus::Ok) {
                    return None;
                }
                let (version, specific) = config.latest()?;
                let reply = GetReply::cached(version, specific.clone());
                config.touch();
                Some(reply)
            }
            Some(version) => {
                let specific = namespace_ctx.touch_specific_config(&version, key)?;
                Some(GetReply::cached(version, specific))
            }
        }
    }

    pub(crate) async fn get(
        &self,
        namespace: &NamespaceKey,
        key: &ConfigKey,
        version: Option<VersionKey>,
    ) -> Result<GetReply> {
        self.ensure_open()?;
        if let Some(reply) = self.cached(namespace, key, version) {
            return Ok(reply);
        }

        let request = proto::GetRequest {
            root_path: namespace.root_path.clone(),
            overrides: namespace.overrides.clone(),
            flavors: key.flavors.clone(),
            document: key.document.clone(),
            version: version.map_or(0, |v| v.version),
            log_level: proto::LogLevel::from(self.config.log_level) as i32,
            with_position: self.config.with_position,
        };
        debug!(%namespace, %key, ?version, "[Client:get] cache miss, asking the server");
        let response = self.transport.get(request).await?;

        let status = proto::get_response::Status::try_from(response.status)
            .map(ReplyStatus::from)
            .unwrap_or(ReplyStatus::Error);
        let received = VersionKey::new(response.namespace_id, response.version);

        if let Some(requested) = version {
            let mismatch = status.is_ok() && received != requested;
            if mismatch || status == ReplyStatus::InvalidVersion {
                return Err(Error::ConsistencyViolation { requested, received });
            }
        }

        let logs = decode_logs(&response.logs);
        let sources = decode_sources(&response.sources);
        if !status.is_ok() {
            return Ok(GetReply {
                status,
                version: received,
                config: None,
                logs,
                sources,
            });
        }

        let specific = {
            let mut context = self.context.lock();
            let specific =
                context.resolve_specific_config(&response.checksum, || self.decode_payload(&response.elements))?;
            context
                .get_namespace_ctx(namespace)
                .insert_version(received, key.clone(), specific.clone());
            specific
        };

        Ok(GetReply {
            status,
            version: received,
            config: Some(specific),
            logs,
            sources,
        })
    }
}
