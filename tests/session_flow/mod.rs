use mhconfig_client::Client;
use mhconfig_client::ConfigKey;
use mhconfig_client::Error;
use mhconfig_client::NamespaceKey;
use mhconfig_client::ReplyStatus;
use mhconfig_client::VersionKey;
use tracing_test::traced_test;

use crate::common::cache_config;
use crate::common::map;
use crate::common::InMemoryServer;
use crate::common::NAMESPACE_ID;

fn namespace() -> NamespaceKey {
    NamespaceKey::new("/srv/config", ["prod"])
}

#[tokio::test]
#[traced_test]
async fn test_session_reads_one_snapshot() {
    let server = InMemoryServer::new();
    server.publish("frontend", map(&[("replicas", 2)]));
    let snapshot = server.publish("backend", map(&[("replicas", 4)]));
    let client = Client::new(server.clone(), cache_config()).unwrap();

    let mut session = client.new_session(namespace());
    let (status, frontend) = session.get(&ConfigKey::document("frontend")).await.unwrap();
    assert_eq!(status, ReplyStatus::Ok);
    assert_eq!(frontend.unwrap().value(), &map(&[("replicas", 2)]));
    assert_eq!(session.version(), Some(VersionKey::new(NAMESPACE_ID, snapshot)));

    server.publish("frontend", map(&[("replicas", 3)]));
    server.publish("backend", map(&[("replicas", 8)]));

    let (_, backend) = session.get(&ConfigKey::document("backend")).await.unwrap();
    assert_eq!(backend.unwrap().value(), &map(&[("replicas", 4)]));

    let mut fresh = client.new_session(namespace());
    let (_, backend) = fresh.get(&ConfigKey::document("backend")).await.unwrap();
    assert_eq!(backend.unwrap().value(), &map(&[("replicas", 8)]));
    client.close().await.unwrap();
}

#[tokio::test]
#[traced_test]
async fn test_session_fails_once_snapshot_is_gone() {
    let server = InMemoryServer::new();
    server.publish("frontend", map(&[("replicas", 2)]));
    let snapshot = server.publish("backend", map(&[("replicas", 4)]));
    let client = Client::new(server.clone(), cache_config()).unwrap();

    let mut session = client.new_session(namespace());
    session.get(&ConfigKey::document("frontend")).await.unwrap();

    let latest = server.publish("frontend", map(&[("replicas", 3)]));
    server.forget_before(latest);

    match session.get(&ConfigKey::document("backend")).await {
        Err(Error::ConsistencyViolation { requested, received }) => {
            assert_eq!(requested, VersionKey::new(NAMESPACE_ID, snapshot));
            assert_eq!(received, VersionKey::new(NAMESPACE_ID, latest));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    client.close().await.unwrap();
}
