use std::collections::HashMap;
use std::sync::Arc;

use super::ClientInner;
use crate::ConfigKey;
use crate::ConfigTransport;
use crate::GrpcTransport;
use crate::NamespaceKey;
use crate::ReplyStatus;
use crate::Result;
use crate::SpecificConfig;
use crate::VersionKey;

/// Consistent read handle on one namespace.
///
/// The first successful read pins the namespace version; every later read
/// asks for that exact version, so all documents read through one session
/// come from the same snapshot. A server that can no longer serve the pinned
/// version makes [`Session::get`] fail with a consistency violation.
pub struct Session<T: ConfigTransport = GrpcTransport> {
    inner: Arc<ClientInner<T>>,
    namespace: NamespaceKey,
    version: Option<VersionKey>,
    configs: HashMap<ConfigKey, Arc<SpecificConfig>>,
}

impl<T: ConfigTransport> Session<T> {
    pub(crate) fn new(
        inner: Arc<ClientInner<T>>,
        namespace: NamespaceKey,
    ) -> Self {
        Self {
            inner,
            namespace,
            version: None,
            configs: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &NamespaceKey {
        &self.namespace
    }

    /// Pinned version, `None` before the first successful read
    pub fn version(&self) -> Option<VersionKey> {
        self.version
    }

    pub async fn get(
        &mut self,
        key: &ConfigKey,
    ) -> Result<(ReplyStatus, Option<Arc<SpecificConfig>>)> {
        if let Some(config) = self.configs.get(key) {
            return Ok((ReplyStatus::Ok, Some(config.clone())));
        }

        let reply = self.inner.get(&self.namespace, key, self.version).await?;
        if reply.status.is_ok() {
            self.version.get_or_insert(reply.version);
            if let Some(config) = &reply.config {
                self.configs.insert(key.clone(), config.clone());
            }
        }
        Ok((reply.status, reply.config))
    }
}
