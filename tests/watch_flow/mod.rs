use std::sync::Arc;

use futures::StreamExt;
use mhconfig_client::Client;
use mhconfig_client::ConfigKey;
use mhconfig_client::NamespaceKey;
use mhconfig_client::ReplyStatus;
use mhconfig_client::TraceStatus;
use mhconfig_client::VersionKey;
use mhconfig_client::WatchCallback;
use mhconfig_client::WatchEvent;
use parking_lot::Mutex;
use tracing_test::traced_test;

use crate::common::cache_config;
use crate::common::map;
use crate::common::wait_until;
use crate::common::InMemoryServer;
use crate::common::NAMESPACE_ID;
use crate::common::WAIT;

fn namespace() -> NamespaceKey {
    NamespaceKey::new("/srv/config", ["prod"])
}

fn recorder() -> (WatchCallback, Arc<Mutex<Vec<WatchEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let callback: WatchCallback = Arc::new(move |event: &WatchEvent| sink.lock().push(event.clone()));
    (callback, events)
}

#[tokio::test]
#[traced_test]
async fn test_watch_follows_published_versions() {
    let server = InMemoryServer::new();
    server.publish("database", map(&[("port", 5432)]));
    let client = Client::new(server.clone(), cache_config()).unwrap();
    let key = ConfigKey::document("database");
    let (callback, events) = recorder();

    client.watch(&namespace(), &key, Some(callback)).unwrap();
    wait_until(|| events.lock().len() == 1).await;
    assert_eq!(events.lock()[0].version, Some(VersionKey::new(NAMESPACE_ID, 1)));
    assert_eq!(
        events.lock()[0].config.as_ref().unwrap().value().get("port").and_then(|p| p.as_i64()),
        Some(5432)
    );

    server.publish("cache", map(&[("ttl", 60)]));
    let latest = server.publish("database", map(&[("port", 6432)]));
    wait_until(|| events.lock().len() == 2).await;
    assert_eq!(events.lock()[1].version, Some(VersionKey::new(NAMESPACE_ID, latest)));

    let reply = client.get(&namespace(), &key, None).await.unwrap();
    assert_eq!(reply.status, ReplyStatus::Ok);
    assert_eq!(reply.version, VersionKey::new(NAMESPACE_ID, latest));

    client.close().await.unwrap();
    let events = events.lock();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].status, ReplyStatus::Removed);
}

#[tokio::test]
#[traced_test]
async fn test_watchers_recover_by_watching_again_after_disconnect() {
    let server = InMemoryServer::new();
    server.publish("database", map(&[("port", 5432)]));
    let client = Client::new(server.clone(), cache_config()).unwrap();
    let key = ConfigKey::document("database");
    let (callback, events) = recorder();

    client.watch(&namespace(), &key, Some(callback)).unwrap();
    wait_until(|| events.lock().len() == 1).await;

    server.disconnect_all();
    wait_until(|| events.lock().len() == 2).await;
    assert_eq!(events.lock()[1].status, ReplyStatus::Removed);
    wait_until(|| server.connections() == 2).await;
    assert_eq!(client.with_context(|c| c.num_subscriptions()), 0);

    let (callback, again) = recorder();
    client.watch(&namespace(), &key, Some(callback)).unwrap();
    wait_until(|| again.lock().len() == 1).await;
    assert_eq!(again.lock()[0].status, ReplyStatus::Ok);
    assert_eq!(server.num_subscriptions(), 1);

    client.close().await.unwrap();
    // The first watcher already got its terminal event
    assert_eq!(events.lock().len(), 2);
}

#[tokio::test]
#[traced_test]
async fn test_idle_subscriptions_are_dropped_on_both_sides() {
    let server = InMemoryServer::new();
    server.publish("database", map(&[("port", 5432)]));
    let mut config = cache_config();
    config.cleanup_interval_in_secs = 1;
    config.inactivity_threshold_in_secs = 1;
    let client = Client::new(server.clone(), config).unwrap();

    client.watch(&namespace(), &ConfigKey::document("database"), None).unwrap();
    wait_until(|| server.num_subscriptions() == 1).await;

    wait_until(|| server.num_subscriptions() == 0).await;
    assert_eq!(client.with_context(|c| c.num_subscriptions()), 0);
    client.close().await.unwrap();
}

#[tokio::test]
#[traced_test]
async fn test_get_without_subscription_asks_the_server() {
    let server = InMemoryServer::new();
    let version = server.publish("database", map(&[("port", 5432)]));
    let client = Client::new(server.clone(), cache_config()).unwrap();

    let reply = client
        .get(&namespace(), &ConfigKey::document("database"), None)
        .await
        .unwrap();
    assert_eq!(reply.status, ReplyStatus::Ok);
    assert_eq!(reply.version, VersionKey::new(NAMESPACE_ID, version));

    let missing = client
        .get(&namespace(), &ConfigKey::document("missing"), None)
        .await
        .unwrap();
    assert_eq!(missing.status, ReplyStatus::Error);
    assert!(missing.config.is_none());
    client.close().await.unwrap();
}

#[tokio::test]
#[traced_test]
async fn test_update_requests_reload() {
    let server = InMemoryServer::new();
    let client = Client::new(server.clone(), cache_config()).unwrap();

    let reply = client.update("/srv/config", None).await.unwrap();
    assert_eq!(reply.status, ReplyStatus::Ok);

    client
        .update("/srv/config", Some(vec!["database.yaml".to_string()]))
        .await
        .unwrap();

    let updates = server.updates();
    assert_eq!(updates.len(), 2);
    assert!(updates[0].reload);
    assert!(!updates[1].reload);
    assert_eq!(updates[1].relative_paths, vec!["database.yaml".to_string()]);
    client.close().await.unwrap();
}

#[tokio::test]
#[traced_test]
async fn test_trace_reports_watchers_and_returned_values() {
    let server = InMemoryServer::new();
    server.publish("database", map(&[("port", 5432)]));
    let client = Client::new(server.clone(), cache_config()).unwrap();
    let key = ConfigKey::document("database");
    let mut trace = client.trace(&namespace(), &key).await.unwrap();

    let (callback, events) = recorder();
    client.watch(&namespace(), &key, Some(callback)).unwrap();
    wait_until(|| events.lock().len() == 1).await;
    let latest = server.publish("database", map(&[("port", 6432)]));
    server.publish("cache", map(&[("ttl", 60)]));

    let mut seen = Vec::new();
    for _ in 0..3 {
        let event = tokio::time::timeout(WAIT, trace.next())
            .await
            .expect("trace event")
            .expect("open stream")
            .unwrap();
        assert_eq!(event.document, "database");
        seen.push((event.status, event.version.version));
    }
    assert_eq!(
        seen,
        vec![
            (TraceStatus::AddedWatcher, 1),
            (TraceStatus::ReturnedElements, 1),
            (TraceStatus::ReturnedElements, latest),
        ]
    );
    client.close().await.unwrap();
}
