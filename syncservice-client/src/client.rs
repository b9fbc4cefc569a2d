//! Client facade.

use crate::config::ClientConfig;
use crate::endpoint::{AddressingMode, Endpoint, EndpointResolver};
use crate::error::ClientResult;
use crate::response::{Classified, RequestContext, classify};
use crate::transport::{HttpTransport, RequestBody, Transport, TransportRequest};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for one sync service node.
///
/// The addressing mode is fixed at construction. Cloning is cheap and clones
/// share the underlying connection pool, so one client can serve many tasks.
/// Every call is a single request with no retries.
#[derive(Clone)]
pub struct SyncServiceClient {
    resolver: EndpointResolver,
    transport: Arc<dyn Transport>,
}

impl SyncServiceClient {
    /// Validates `config` and builds an HTTP client from it.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)?;
        info!(
            "sync service client for {} ({})",
            transport.base_url(),
            if config.is_edge() { "edge" } else { "hub" }
        );
        Ok(Self {
            resolver: EndpointResolver::for_org(&config.org_id),
            transport: Arc::new(transport),
        })
    }

    /// Builds a client on top of a custom transport.
    pub fn with_transport(org_id: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            resolver: EndpointResolver::for_org(org_id),
            transport,
        }
    }

    /// Organization this client acts for, empty for an edge client.
    pub fn org_id(&self) -> &str {
        self.resolver.mode().org_id()
    }

    pub fn mode(&self) -> &AddressingMode {
        self.resolver.mode()
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Performs one exchange for `endpoint` and classifies the outcome.
    pub(crate) async fn send(
        &self,
        endpoint: Endpoint<'_>,
        query: Vec<(&'static str, String)>,
        body: RequestBody,
    ) -> ClientResult<(RequestContext, Classified)> {
        let ctx = RequestContext::new(&endpoint, self.resolver.mode());
        let request = TransportRequest {
            method: endpoint.method(),
            path: self.resolver.path(&endpoint),
            query,
            body,
        };
        debug!("{} {} ({})", request.method, request.path, ctx.operation);

        let outcome = self.transport.execute(request).await;
        let classified = classify(&ctx, outcome).await?;
        Ok((ctx, classified))
    }

    /// Serializes `value` as the JSON body of a request for `endpoint`.
    pub(crate) fn json_body<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint<'_>,
        value: &T,
    ) -> ClientResult<RequestBody> {
        RequestBody::json(value)
            .map_err(|e| RequestContext::new(endpoint, self.resolver.mode()).transport_failure(e))
    }
}

impl fmt::Debug for SyncServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncServiceClient")
            .field("mode", self.resolver.mode())
            .finish_non_exhaustive()
    }
}
