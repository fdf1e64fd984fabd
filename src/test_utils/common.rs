use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::flatten_element;
use crate::proto;
use crate::proto::watch_response;
use crate::CacheConfig;
use crate::Element;
use crate::NamespaceKey;
use crate::WatchCallback;
use crate::WatchEvent;

pub(crate) fn test_namespace() -> NamespaceKey {
    NamespaceKey::new("/srv/config", ["test"])
}

/// Cache settings with loops slow enough to stay out of the way of a test
pub(crate) fn test_cache_config() -> CacheConfig {
    CacheConfig {
        retry_backoff_in_ms: 20,
        cleanup_interval_in_secs: 3600,
        inactivity_threshold_in_secs: 3600,
        ..CacheConfig::default()
    }
}

/// `{key: value, ...}` with integer values
pub(crate) fn int_map(entries: &[(&str, i64)]) -> Element {
    Element::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Element::Int(*v)))
            .collect::<BTreeMap<_, _>>(),
    )
}

pub(crate) fn ok_watch_reply(
    uid: u32,
    namespace_id: u64,
    version: u32,
    checksum: &[u8],
    value: &Element,
) -> proto::WatchResponse {
    proto::WatchResponse {
        uid,
        status: watch_response::Status::Ok as i32,
        namespace_id,
        version,
        checksum: checksum.to_vec(),
        elements: flatten_element(value),
        ..Default::default()
    }
}

pub(crate) fn status_watch_reply(
    uid: u32,
    status: watch_response::Status,
) -> proto::WatchResponse {
    proto::WatchResponse {
        uid,
        status: status as i32,
        ..Default::default()
    }
}

pub(crate) fn ok_get_response(
    namespace_id: u64,
    version: u32,
    checksum: &[u8],
    value: &Element,
) -> proto::GetResponse {
    proto::GetResponse {
        status: proto::get_response::Status::Ok as i32,
        namespace_id,
        version,
        checksum: checksum.to_vec(),
        elements: flatten_element(value),
        ..Default::default()
    }
}

/// Callback recording every event it receives
pub(crate) fn recording_callback() -> (WatchCallback, Arc<Mutex<Vec<WatchEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let callback: WatchCallback = Arc::new(move |event: &WatchEvent| sink.lock().push(event.clone()));
    (callback, events)
}

/// Polls `condition` until it holds, panicking after `timeout`
pub(crate) async fn wait_until(
    timeout: Duration,
    mut condition: impl FnMut() -> bool,
) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
