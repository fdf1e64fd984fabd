use std::fmt;
use std::sync::Arc;

use super::SpecificConfig;
use super::VersionKey;
use crate::proto;

/// Status reported by the server for a read or a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyStatus {
    Ok,
    Error,
    InvalidVersion,
    RefGraphIsNotDag,
    UidInUse,
    UnknownUid,
    /// The subscription no longer exists, either on the server or locally
    Removed,
    PermissionDenied,
    InvalidArgument,
}

impl ReplyStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ReplyStatus::Ok)
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            ReplyStatus::Ok => "OK",
            ReplyStatus::Error => "ERROR",
            ReplyStatus::InvalidVersion => "INVALID_VERSION",
            ReplyStatus::RefGraphIsNotDag => "REF_GRAPH_IS_NOT_DAG",
            ReplyStatus::UidInUse => "UID_IN_USE",
            ReplyStatus::UnknownUid => "UNKNOWN_UID",
            ReplyStatus::Removed => "REMOVED",
            ReplyStatus::PermissionDenied => "PERMISSION_DENIED",
            ReplyStatus::InvalidArgument => "INVALID_ARGUMENT",
        };
        f.write_str(name)
    }
}

impl From<proto::watch_response::Status> for ReplyStatus {
    fn from(status: proto::watch_response::Status) -> Self {
        use proto::watch_response::Status;
        match status {
            Status::Ok => ReplyStatus::Ok,
            Status::Error => ReplyStatus::Error,
            Status::InvalidVersion => ReplyStatus::InvalidVersion,
            Status::RefGraphIsNotDag => ReplyStatus::RefGraphIsNotDag,
            Status::UidInUse => ReplyStatus::UidInUse,
            Status::UnknownUid => ReplyStatus::UnknownUid,
            Status::Removed => ReplyStatus::Removed,
            Status::PermissionDenied => ReplyStatus::PermissionDenied,
            Status::InvalidArgument => ReplyStatus::InvalidArgument,
        }
    }
}

impl From<proto::get_response::Status> for ReplyStatus {
    fn from(status: proto::get_response::Status) -> Self {
        use proto::get_response::Status;
        match status {
            Status::Ok => ReplyStatus::Ok,
            Status::Error => ReplyStatus::Error,
            Status::InvalidVersion => ReplyStatus::InvalidVersion,
            Status::RefGraphIsNotDag => ReplyStatus::RefGraphIsNotDag,
            Status::PermissionDenied => ReplyStatus::PermissionDenied,
            Status::InvalidArgument => ReplyStatus::InvalidArgument,
        }
    }
}

impl From<proto::update_response::Status> for ReplyStatus {
    fn from(status: proto::update_response::Status) -> Self {
        match status {
            proto::update_response::Status::Ok => ReplyStatus::Ok,
            proto::update_response::Status::Error => ReplyStatus::Error,
        }
    }
}

/// What a watcher observes on every change
#[derive(Debug, Clone)]
pub struct WatchEvent {
    pub subscription_id: u32,
    pub status: ReplyStatus,
    /// Latest accepted version, if any reply carried one
    pub version: Option<VersionKey>,
    pub config: Option<Arc<SpecificConfig>>,
}

/// Watcher callback.
///
/// Invoked from the watch worker or from the caller of `watch`, never while
/// the client's internal lock is held, so it may call back into the client.
pub type WatchCallback = Arc<dyn Fn(&WatchEvent) + Send + Sync>;

/// A callback invocation computed under the lock and fired after releasing it
pub(crate) struct Notification {
    pub(crate) callback: WatchCallback,
    pub(crate) event: WatchEvent,
}

impl Notification {
    pub(crate) fn fire(self) {
        (self.callback)(&self.event);
    }
}

pub(crate) fn dispatch(notifications: Vec<Notification>) {
    for notification in notifications {
        notification.fire();
    }
}
