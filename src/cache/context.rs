use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;
use tracing::trace;

use super::Config;
use super::ConfigKey;
use super::NamespaceContext;
use super::NamespaceKey;
use super::Notification;
use super::SpecificConfig;
use crate::constants::CHECKSUM_INDEX_TRIM_RATIO;
use crate::DecodeError;
use crate::Element;
use crate::PositionTree;

/// Process-wide cache state, owned by one client and guarded by its lock.
pub struct Context {
    namespaces: HashMap<NamespaceKey, NamespaceContext>,
    by_subscription: HashMap<u32, (NamespaceKey, ConfigKey)>,
    by_checksum: HashMap<Vec<u8>, Arc<SpecificConfig>>,
    next_subscription_id: u32,
    /// Bumped on every reset; commands issued under an older generation are stale.
    generation: u64,
    capacity: usize,
}

impl Context {
    pub fn new(capacity: usize) -> Self {
        Self {
            namespaces: HashMap::new(),
            by_subscription: HashMap::new(),
            by_checksum: HashMap::new(),
            next_subscription_id: 0,
            generation: 0,
            capacity,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_namespaces(&self) -> usize {
        self.namespaces.len()
    }

    pub fn num_subscriptions(&self) -> usize {
        self.by_subscription.len()
    }

    pub fn num_specific_configs(&self) -> usize {
        self.by_checksum.len()
    }

    pub fn next_subscription_id(&self) -> u32 {
        self.next_subscription_id
    }

    pub fn namespace(
        &self,
        key: &NamespaceKey,
    ) -> Option<&NamespaceContext> {
        self.namespaces.get(key)
    }

    pub(crate) fn namespace_mut(
        &mut self,
        key: &NamespaceKey,
    ) -> Option<&mut NamespaceContext> {
        self.namespaces.get_mut(key)
    }

    /// Returns the namespace context, creating it on first use
    pub(crate) fn get_namespace_ctx(
        &mut self,
        key: &NamespaceKey,
    ) -> &mut NamespaceContext {
        self.namespaces
            .entry(key.clone())
            .or_insert_with(|| NamespaceContext::new(key.clone()))
    }

    /// Returns the subscription record for `(namespace, key)`, allocating a
    /// fresh subscription id when it does not exist yet.
    pub(crate) fn get_or_make_config(
        &mut self,
        namespace: &NamespaceKey,
        key: &ConfigKey,
    ) -> (bool, &mut Config) {
        let Context {
            namespaces,
            by_subscription,
            next_subscription_id,
            ..
        } = self;

        let namespace_ctx = namespaces
            .entry(namespace.clone())
            .or_insert_with(|| NamespaceContext::new(namespace.clone()));

        namespace_ctx.get_or_insert_config(key, || {
            let subscription_id = *next_subscription_id;
            *next_subscription_id = next_subscription_id.wrapping_add(1);
            by_subscription.insert(subscription_id, (namespace.clone(), key.clone()));
            trace!(subscription_id, %namespace, %key, "[Context] new subscription");
            Config::new(key.clone(), subscription_id)
        })
    }

    /// Owner of a subscription id
    pub fn subscription(
        &self,
        subscription_id: u32,
    ) -> Option<(&NamespaceKey, &ConfigKey)> {
        self.by_subscription
            .get(&subscription_id)
            .map(|(namespace, key)| (namespace, key))
    }

    pub fn config_by_id(
        &self,
        subscription_id: u32,
    ) -> Option<&Config> {
        let (namespace, key) = self.by_subscription.get(&subscription_id)?;
        self.namespaces.get(namespace)?.config(key)
    }

    pub(crate) fn config_by_id_mut(
        &mut self,
        subscription_id: u32,
    ) -> Option<&mut Config> {
        let (namespace, key) = self.by_subscription.get(&subscription_id)?;
        self.namespaces.get_mut(namespace)?.config_mut(key)
    }

    /// Forgets a subscription id without touching its record
    pub(crate) fn remove_subscription(
        &mut self,
        subscription_id: u32,
    ) -> bool {
        self.by_subscription.remove(&subscription_id).is_some()
    }

    /// Returns the shared value for `checksum`, decoding it only the first
    /// time the checksum is seen.
    pub(crate) fn resolve_specific_config(
        &mut self,
        checksum: &[u8],
        decode: impl FnOnce() -> Result<(Element, PositionTree), DecodeError>,
    ) -> Result<Arc<SpecificConfig>, DecodeError> {
        if let Some(specific) = self.by_checksum.get(checksum) {
            specific.touch();
            return Ok(specific.clone());
        }
        let (value, positions) = decode()?;
        let specific = Arc::new(SpecificConfig::new(value, checksum.to_vec()).with_positions(positions));
        self.by_checksum.insert(checksum.to_vec(), specific.clone());
        Ok(specific)
    }

    pub fn specific_config_by_checksum(
        &self,
        checksum: &[u8],
    ) -> Option<&Arc<SpecificConfig>> {
        self.by_checksum.get(checksum)
    }

    /// Deactivates every subscription and clears all indices.
    ///
    /// Returns the `Removed` notifications for the remaining watchers.
    pub(crate) fn reset(&mut self) -> Vec<Notification> {
        let notifications: Vec<Notification> = self
            .namespaces
            .values_mut()
            .flat_map(NamespaceContext::deactivate_all)
            .collect();

        self.namespaces.clear();
        self.by_subscription.clear();
        self.by_checksum.clear();
        self.next_subscription_id = 0;
        self.generation += 1;

        debug!(
            generation = self.generation,
            watchers = notifications.len(),
            "[Context:reset] cache cleared"
        );
        notifications
    }

    /// Sweeps idle state touched before `timelimit`.
    ///
    /// Idle subscriptions without watchers are removed and their ids returned
    /// so the server side can be released. The checksum index is trimmed to a
    /// fraction of the capacity when it overflows, least recently touched
    /// first. Version entries are pruned once their checksum is gone or they
    /// were not read since `timelimit`, except the version each remaining
    /// subscription currently holds.
    pub(crate) fn cleanup(
        &mut self,
        timelimit: Instant,
    ) -> Vec<u32> {
        let mut removed = Vec::new();
        for namespace_ctx in self.namespaces.values_mut() {
            removed.extend(namespace_ctx.remove_idle_configs(timelimit));
        }
        for subscription_id in &removed {
            self.by_subscription.remove(subscription_id);
        }

        let evicted = self.trim_checksum_index();

        let by_checksum = &self.by_checksum;
        let mut pruned = 0;
        for namespace_ctx in self.namespaces.values_mut() {
            pruned += namespace_ctx.prune_versions(|specific, last_touch| {
                by_checksum.contains_key(specific.checksum()) && last_touch >= timelimit
            });
        }

        if !removed.is_empty() || evicted > 0 || pruned > 0 {
            debug!(
                removed = removed.len(),
                evicted,
                pruned,
                remaining = self.by_checksum.len(),
                "[Context:cleanup] sweep done"
            );
        }
        removed
    }

    fn trim_checksum_index(&mut self) -> usize {
        if self.by_checksum.len() <= self.capacity {
            return 0;
        }
        let target = (self.capacity as f64 * CHECKSUM_INDEX_TRIM_RATIO) as usize;
        let excess = self.by_checksum.len() - target;

        let mut by_age: Vec<(Instant, Vec<u8>)> = self
            .by_checksum
            .iter()
            .map(|(checksum, specific)| (specific.last_touch(), checksum.clone()))
            .collect();
        by_age.sort_unstable_by_key(|(touched, _)| *touched);

        for (_, checksum) in by_age.into_iter().take(excess) {
            self.by_checksum.remove(&checksum);
        }
        excess
    }
}
