mod common;

use common::{RecordingTransport, edge_client};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use syncservice_client::{StatusCode, SyncServiceClient, UpdatesPoller};
use tokio::sync::{mpsc, watch};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn object(id: &str) -> serde_json::Value {
    json!({"objectID": id, "objectType": "send-file"})
}

async fn updates_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/objects/send-file"))
        .and(query_param("received", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([object("f1")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/objects/send-file"))
        .and(query_param("received", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([object("f2")])))
        .mount(&server)
        .await;
    server
}

// ── Single polls ────────────────────────────────────────────────

#[tokio::test]
async fn first_poll_includes_received_objects() {
    let server = updates_server().await;
    let mut poller = UpdatesPoller::new(edge_client(&server), "send-file", Duration::from_secs(1));
    assert_eq!(poller.object_type(), "send-file");

    let first = poller.poll_once().await.unwrap();
    assert_eq!(first[0].object_id, "f1");

    let second = poller.poll_once().await.unwrap();
    assert_eq!(second[0].object_id, "f2");
}

#[tokio::test]
async fn empty_result_still_counts_as_first_poll() {
    let transport = RecordingTransport::answering(StatusCode::NOT_FOUND, "");
    let client = SyncServiceClient::with_transport("", transport.clone());
    let mut poller = UpdatesPoller::new(client, "send-file", Duration::from_secs(1));

    assert!(poller.poll_once().await.unwrap().is_empty());
    assert!(poller.poll_once().await.unwrap().is_empty());

    let flags: Vec<String> = transport
        .requests()
        .into_iter()
        .map(|r| r.query[0].1.clone())
        .collect();
    assert_eq!(flags, vec!["true", "false"]);
}

#[tokio::test]
async fn failed_poll_keeps_asking_for_everything() {
    let transport = RecordingTransport::answering(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let client = SyncServiceClient::with_transport("", transport.clone());
    let mut poller = UpdatesPoller::new(client, "send-file", Duration::from_secs(1));

    assert!(poller.poll_once().await.is_err());
    assert!(poller.poll_once().await.is_err());

    for request in transport.requests() {
        assert_eq!(request.query, vec![("received", "true".to_string())]);
    }
}

// ── Background loop ─────────────────────────────────────────────

#[tokio::test]
async fn run_forwards_updates_until_shutdown() {
    let server = updates_server().await;
    let poller = UpdatesPoller::new(edge_client(&server), "send-file", Duration::from_millis(20));
    let (tx, mut rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(poller.run(tx, shutdown_rx));

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.object_id, "f1");
    assert_eq!(second.object_id, "f2");

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("poller did not stop")
        .unwrap();
}

#[tokio::test]
async fn run_stops_when_receiver_is_dropped() {
    let server = updates_server().await;
    let poller = UpdatesPoller::new(edge_client(&server), "send-file", Duration::from_millis(20));
    let (tx, rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    drop(rx);
    tokio::time::timeout(Duration::from_secs(5), poller.run(tx, shutdown_rx))
        .await
        .expect("poller did not stop");
}
