mod common;

use bytes::Bytes;
use common::{RecordingTransport, edge_client, init_tracing};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use pretty_assertions::assert_eq;
use std::time::Duration;
use syncservice_client::{
    AddressingMode, ClientConfig, ClientError, DEFAULT_URL, HttpTransport, Method, RequestBody,
    RequestBuilder, StatusCode, SyncServiceClient, Transport, TransportRequest,
};
use wiremock::matchers::{any, basic_auth, body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Config ──────────────────────────────────────────────────────

#[test]
fn config_defaults() {
    let cfg = ClientConfig::default();
    assert_eq!(cfg.url, DEFAULT_URL);
    assert!(cfg.is_edge());
    assert!(cfg.app_key.is_none());
    assert!(cfg.interceptor.is_none());
    assert!(cfg.validate().is_ok());
}

#[test]
fn config_deserializes_with_defaults() {
    let cfg: ClientConfig = serde_json::from_str(
        r#"{"org_id": "org1", "app_key": "k", "app_secret": "s", "read_timeout_millis": 0}"#,
    )
    .unwrap();
    assert_eq!(cfg.url, DEFAULT_URL);
    assert_eq!(cfg.org_id, "org1");
    assert!(!cfg.is_edge());
    assert!(cfg.validate().is_ok());
}

#[test]
fn negative_timeouts_are_rejected() {
    for cfg in [
        ClientConfig {
            connect_timeout_millis: Some(-1),
            ..Default::default()
        },
        ClientConfig {
            read_timeout_millis: Some(-5),
            ..Default::default()
        },
        ClientConfig {
            write_timeout_millis: Some(-100),
            ..Default::default()
        },
    ] {
        let err = SyncServiceClient::new(cfg).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)), "{err}");
    }
}

#[test]
fn zero_timeouts_are_accepted() {
    let cfg = ClientConfig {
        connect_timeout_millis: Some(0),
        read_timeout_millis: Some(0),
        write_timeout_millis: Some(0),
        ..Default::default()
    };
    assert!(SyncServiceClient::new(cfg).is_ok());
}

#[test]
fn bad_urls_are_rejected() {
    for url in ["", "not a url", "ftp://example.com", "localhost:8080"] {
        let err = SyncServiceClient::new(ClientConfig::edge(url)).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)), "{url}: {err}");
    }
}

#[test]
fn half_credential_pair_is_rejected() {
    let cfg = ClientConfig {
        app_secret: Some("secret".into()),
        ..Default::default()
    };
    assert!(matches!(cfg.validate(), Err(ClientError::Config(_))));
}

#[test]
fn garbage_ca_certificate_is_config_error() {
    let cfg = ClientConfig {
        ca_certificate_pem: Some("-----BEGIN CERTIFICATE-----\nnope\n-----END CERTIFICATE-----\n".into()),
        ..Default::default()
    };
    assert!(matches!(
        SyncServiceClient::new(cfg),
        Err(ClientError::Config(_))
    ));
}

#[test]
fn mode_follows_org_id() {
    let edge = SyncServiceClient::new(ClientConfig::edge(DEFAULT_URL)).unwrap();
    assert_eq!(edge.mode(), &AddressingMode::Edge);
    assert_eq!(edge.org_id(), "");

    let hub = SyncServiceClient::new(ClientConfig::hub(DEFAULT_URL, "org1")).unwrap();
    assert_eq!(hub.org_id(), "org1");
    assert!(format!("{hub:?}").contains("org1"));
}

// ── Transport failures ──────────────────────────────────────────

#[tokio::test]
async fn connection_refused_is_transport_error() {
    init_tracing();
    let client = SyncServiceClient::new(ClientConfig::edge("http://127.0.0.1:1")).unwrap();

    let err = client.get_status("send-file", "f1").await.unwrap_err();
    assert!(err.is_transport(), "{err}");
    assert!(!err.is_domain());
    assert_eq!(err.status(), None);

    let err = client.list_destinations().await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn transport_failure_is_attempted_once() {
    init_tracing();
    let transport = RecordingTransport::failing("connection reset");
    let client = SyncServiceClient::with_transport("org1", transport.clone());

    let err = client.delete_object("send-file", "f1").await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(transport.attempts(), 1);

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.path, "/api/v1/objects/org1/send-file/f1");
}

#[tokio::test]
async fn server_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = edge_client(&server).resend().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn custom_transport_sees_query_parameters() {
    let transport = RecordingTransport::answering(StatusCode::OK, "[]");
    let client = SyncServiceClient::with_transport("", transport.clone());

    client.list_updated_objects("send-file", true).await.unwrap();
    assert_eq!(
        transport.requests()[0].query,
        vec![("received", "true".to_string())]
    );
}

// ── Timeouts ────────────────────────────────────────────────────

#[tokio::test]
async fn read_timeout_surfaces_as_transport_timeout() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/objects/send-file/f1/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("pending")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let cfg = ClientConfig {
        read_timeout_millis: Some(200),
        ..ClientConfig::edge(server.uri())
    };
    let client = SyncServiceClient::new(cfg).unwrap();

    let err = client.get_status("send-file", "f1").await.unwrap_err();
    assert!(err.is_transport(), "{err}");
    match &err {
        ClientError::Transport(e) => assert!(e.is_timeout(), "{e}"),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn write_timeout_does_not_limit_waiting_for_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/objects/send-file/f1/data"))
        .and(body_bytes(b"0123456789".to_vec()))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_millis(600)))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = ClientConfig {
        write_timeout_millis: Some(200),
        ..ClientConfig::edge(server.uri())
    };
    let client = SyncServiceClient::new(cfg).unwrap();

    client
        .put_payload("send-file", "f1", &b"0123456789"[..])
        .await
        .unwrap();
}

#[tokio::test]
async fn stalled_upload_surfaces_as_transport_timeout() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let cfg = ClientConfig {
        write_timeout_millis: Some(200),
        ..ClientConfig::edge(server.uri())
    };
    let transport = HttpTransport::from_config(&cfg).unwrap();

    let first = stream::once(async { Ok::<_, std::io::Error>(Bytes::from("first chunk")) });
    let stalled = stream::once(async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<_, std::io::Error>(Bytes::from("never sent"))
    });
    let request = TransportRequest {
        method: Method::PUT,
        path: "/api/v1/objects/send-file/f1/data".to_string(),
        query: Vec::new(),
        body: RequestBody::Stream(first.chain(stalled).boxed()),
    };

    let outcome = tokio::time::timeout(Duration::from_secs(3), transport.execute(request))
        .await
        .expect("upload was not cut off");
    let err = outcome.unwrap_err();
    assert!(err.is_timeout(), "{err}");
}

// ── Authentication and interceptor ──────────────────────────────

#[tokio::test]
async fn credentials_are_sent_as_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/destinations"))
        .and(basic_auth("app-key", "app-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = ClientConfig::edge(server.uri()).with_credentials("app-key", "app-secret");
    let client = SyncServiceClient::new(cfg).unwrap();
    assert!(client.list_destinations().await.unwrap().is_empty());
}

#[tokio::test]
async fn interceptor_runs_on_every_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .and(header("x-trace-id", "abc123"))
        .and(basic_auth("k", "s"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pending"))
        .expect(2)
        .mount(&server)
        .await;

    let cfg = ClientConfig::edge(server.uri())
        .with_credentials("k", "s")
        .with_interceptor(|req: RequestBuilder| req.header("x-trace-id", "abc123"));
    let client = SyncServiceClient::new(cfg).unwrap();

    assert_eq!(client.get_status("send-file", "f1").await.unwrap(), "pending");
    client.resend().await.unwrap();
}

// ── Concurrency ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cloned_clients_run_in_parallel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("received", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(16)
        .mount(&server)
        .await;

    let client = edge_client(&server);
    let tasks = (0..16).map(|i| {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .list_updated_objects(&format!("type-{i}"), false)
                .await
        })
    });

    for result in join_all(tasks).await {
        assert!(result.unwrap().unwrap().is_empty());
    }
}
