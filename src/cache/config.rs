use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::trace;

use super::ConfigKey;
use super::Notification;
use super::ReplyStatus;
use super::SpecificConfig;
use super::VersionKey;
use super::WatchCallback;
use super::WatchEvent;

/// Lifecycle of a subscription record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigState {
    /// Registered, no reply yet
    Pending,
    /// At least one reply applied
    Active,
    /// Terminal
    Deactivated,
}

/// Subscription record for one document of one namespace.
///
/// Mutated only while the client's context lock is held; state transitions
/// hand back the [`Notification`]s to fire once the lock is released.
pub struct Config {
    key: ConfigKey,
    subscription_id: u32,
    state: ConfigState,
    status: Option<ReplyStatus>,
    latest: Option<(VersionKey, Arc<SpecificConfig>)>,
    callbacks: HashMap<u32, WatchCallback>,
    next_callback_id: u32,
    last_touch: Instant,
}

impl Config {
    pub(crate) fn new(
        key: ConfigKey,
        subscription_id: u32,
    ) -> Self {
        Self {
            key,
            subscription_id,
            state: ConfigState::Pending,
            status: None,
            latest: None,
            callbacks: HashMap::new(),
            next_callback_id: 0,
            last_touch: Instant::now(),
        }
    }

    pub fn key(&self) -> &ConfigKey {
        &self.key
    }

    pub fn subscription_id(&self) -> u32 {
        self.subscription_id
    }

    pub fn state(&self) -> ConfigState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != ConfigState::Deactivated
    }

    /// Status of the last applied reply
    pub fn status(&self) -> Option<ReplyStatus> {
        self.status
    }

    pub fn latest(&self) -> Option<(VersionKey, &Arc<SpecificConfig>)> {
        self.latest.as_ref().map(|(version, specific)| (*version, specific))
    }

    pub fn num_callbacks(&self) -> usize {
        self.callbacks.len()
    }

    pub fn last_touch(&self) -> Instant {
        self.last_touch
    }

    pub(crate) fn touch(&mut self) {
        self.touch_at(Instant::now());
    }

    pub(crate) fn touch_at(
        &mut self,
        at: Instant,
    ) {
        self.last_touch = at;
        if let Some((_, specific)) = &self.latest {
            specific.touch_at(at);
        }
    }

    /// Snapshot handed to watchers, `None` until the first reply arrives
    pub fn current_event(&self) -> Option<WatchEvent> {
        self.status.map(|status| self.event(status))
    }

    pub(crate) fn add_callback(
        &mut self,
        callback: WatchCallback,
    ) -> u32 {
        let id = self.next_callback_id;
        self.next_callback_id = self.next_callback_id.wrapping_add(1);
        self.callbacks.insert(id, callback);
        id
    }

    pub(crate) fn remove_callback(
        &mut self,
        callback_id: u32,
    ) -> bool {
        self.callbacks.remove(&callback_id).is_some()
    }

    /// Applies a successful reply.
    ///
    /// Replies that do not supersede the held version are ignored. Watchers
    /// are notified only when the status or the checksum changed.
    pub(crate) fn update(
        &mut self,
        version: VersionKey,
        specific: Arc<SpecificConfig>,
    ) -> Vec<Notification> {
        if self.state == ConfigState::Deactivated {
            return Vec::new();
        }
        if let Some((current, _)) = &self.latest {
            if !version.supersedes(current) {
                trace!(
                    subscription_id = self.subscription_id,
                    %current,
                    incoming = %version,
                    "[Config:update] stale version ignored"
                );
                return Vec::new();
            }
        }

        let checksum_changed = self
            .latest
            .as_ref()
            .map_or(true, |(_, held)| held.checksum() != specific.checksum());
        let status_changed = self.status != Some(ReplyStatus::Ok);

        self.latest = Some((version, specific));
        self.state = ConfigState::Active;
        self.status = Some(ReplyStatus::Ok);

        if checksum_changed || status_changed {
            self.notifications(ReplyStatus::Ok)
        } else {
            Vec::new()
        }
    }

    /// Applies a non successful reply. The held value, if any, is kept.
    pub(crate) fn update_status(
        &mut self,
        status: ReplyStatus,
    ) -> Vec<Notification> {
        if self.state == ConfigState::Deactivated {
            return Vec::new();
        }
        let changed = self.status != Some(status);
        self.state = ConfigState::Active;
        self.status = Some(status);

        if changed {
            self.notifications(status)
        } else {
            Vec::new()
        }
    }

    /// Moves to the terminal state. Every remaining watcher gets one
    /// `Removed` event and is dropped.
    pub(crate) fn deactivate(&mut self) -> Vec<Notification> {
        if self.state == ConfigState::Deactivated {
            return Vec::new();
        }
        self.state = ConfigState::Deactivated;
        let event = self.event(ReplyStatus::Removed);
        self.callbacks
            .drain()
            .map(|(_, callback)| Notification {
                callback,
                event: event.clone(),
            })
            .collect()
    }

    fn event(
        &self,
        status: ReplyStatus,
    ) -> WatchEvent {
        WatchEvent {
            subscription_id: self.subscription_id,
            status,
            version: self.latest.as_ref().map(|(version, _)| *version),
            config: self.latest.as_ref().map(|(_, specific)| specific.clone()),
        }
    }

    fn notifications(
        &self,
        status: ReplyStatus,
    ) -> Vec<Notification> {
        let event = self.event(status);
        self.callbacks
            .values()
            .map(|callback| Notification {
                callback: callback.clone(),
                event: event.clone(),
            })
            .collect()
    }
}
