#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use syncservice_client::{
    ClientConfig, Method, StatusCode, SyncServiceClient, Transport, TransportError,
    TransportRequest, TransportResponse,
};
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

/// Routes client logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn edge_client(server: &MockServer) -> SyncServiceClient {
    SyncServiceClient::new(ClientConfig::edge(server.uri())).unwrap()
}

pub fn hub_client(server: &MockServer, org_id: &str) -> SyncServiceClient {
    SyncServiceClient::new(ClientConfig::hub(server.uri(), org_id)).unwrap()
}

/// What a [`RecordingTransport`] saw for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

/// Transport that records every request and answers with a fixed outcome.
pub struct RecordingTransport {
    outcome: Result<(StatusCode, &'static str), &'static str>,
    requests: Mutex<Vec<Recorded>>,
}

impl RecordingTransport {
    pub fn answering(status: StatusCode, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok((status, body)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &'static str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(reason),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(Recorded {
            method: request.method,
            path: request.path,
            query: request.query,
        });
        match self.outcome {
            Ok((status, body)) => Ok(TransportResponse::from_bytes(status, body)),
            Err(reason) => Err(TransportError::Unavailable(reason.to_string())),
        }
    }
}
