use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use super::Config;
use super::ConfigKey;
use super::NamespaceKey;
use super::Notification;
use super::SpecificConfig;
use super::VersionKey;

/// Per-namespace indices. Created lazily, dropped only by a context reset.
pub struct NamespaceContext {
    key: NamespaceKey,
    configs: HashMap<ConfigKey, Config>,
    versions: HashMap<(VersionKey, ConfigKey), VersionEntry>,
}

/// Value of a document at one version, with the last time it was stored or read
struct VersionEntry {
    specific: Arc<SpecificConfig>,
    last_touch: Instant,
}

impl NamespaceContext {
    pub(crate) fn new(key: NamespaceKey) -> Self {
        Self {
            key,
            configs: HashMap::new(),
            versions: HashMap::new(),
        }
    }

    pub fn key(&self) -> &NamespaceKey {
        &self.key
    }

    pub fn config(
        &self,
        key: &ConfigKey,
    ) -> Option<&Config> {
        self.configs.get(key)
    }

    pub(crate) fn config_mut(
        &mut self,
        key: &ConfigKey,
    ) -> Option<&mut Config> {
        self.configs.get_mut(key)
    }

    pub fn num_configs(&self) -> usize {
        self.configs.len()
    }

    /// Returns the record for `key`, building it with `make` when missing
    pub(crate) fn get_or_insert_config(
        &mut self,
        key: &ConfigKey,
        make: impl FnOnce() -> Config,
    ) -> (bool, &mut Config) {
        match self.configs.entry(key.clone()) {
            Entry::Occupied(entry) => (false, entry.into_mut()),
            Entry::Vacant(entry) => (true, entry.insert(make())),
        }
    }

    /// Value of document `key` at exactly `version`
    pub fn specific_config(
        &self,
        version: &VersionKey,
        key: &ConfigKey,
    ) -> Option<&Arc<SpecificConfig>> {
        self.versions
            .get(&(*version, key.clone()))
            .map(|entry| &entry.specific)
    }

    /// Like [`NamespaceContext::specific_config`], refreshing the entry and
    /// its value so the sweep keeps them.
    pub(crate) fn touch_specific_config(
        &mut self,
        version: &VersionKey,
        key: &ConfigKey,
    ) -> Option<Arc<SpecificConfig>> {
        let entry = self.versions.get_mut(&(*version, key.clone()))?;
        let now = Instant::now();
        entry.last_touch = now;
        entry.specific.touch_at(now);
        Some(entry.specific.clone())
    }

    pub(crate) fn insert_version(
        &mut self,
        version: VersionKey,
        key: ConfigKey,
        specific: Arc<SpecificConfig>,
    ) {
        self.versions.insert(
            (version, key),
            VersionEntry {
                specific,
                last_touch: Instant::now(),
            },
        );
    }

    pub fn num_versions(&self) -> usize {
        self.versions.len()
    }

    /// Removes records idle since before `timelimit` that nobody listens to.
    /// Returns their subscription ids.
    pub(crate) fn remove_idle_configs(
        &mut self,
        timelimit: Instant,
    ) -> Vec<u32> {
        let mut removed = Vec::new();
        self.configs.retain(|_, config| {
            if config.num_callbacks() > 0 || config.last_touch() >= timelimit {
                return true;
            }
            // No callbacks left, nothing to notify.
            let _ = config.deactivate();
            removed.push(config.subscription_id());
            false
        });
        removed
    }

    /// Drops version entries rejected by `keep`, given the value and the
    /// entry's last touch. The latest version of every record is always kept.
    /// Returns how many entries were dropped.
    pub(crate) fn prune_versions(
        &mut self,
        mut keep: impl FnMut(&SpecificConfig, Instant) -> bool,
    ) -> usize {
        let held: HashSet<(VersionKey, &ConfigKey)> = self
            .configs
            .iter()
            .filter_map(|(key, config)| config.latest().map(|(version, _)| (version, key)))
            .collect();

        let before = self.versions.len();
        self.versions.retain(|(version, key), entry| {
            held.contains(&(*version, key)) || keep(&entry.specific, entry.last_touch)
        });
        before - self.versions.len()
    }

    /// Deactivates every record, returning the watcher notifications
    pub(crate) fn deactivate_all(&mut self) -> Vec<Notification> {
        self.configs.values_mut().flat_map(Config::deactivate).collect()
    }
}
