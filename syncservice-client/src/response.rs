//! Response classification.
//!
//! Every exchange ends up as exactly one of:
//! - success, with the body still unread ([`Classified::Success`]),
//! - an empty result, for a 404 on an endpoint where that means "nothing yet"
//!   ([`Classified::Empty`]),
//! - [`ClientError::Domain`] for any other non-success status,
//! - [`ClientError::Transport`] when the exchange itself failed.

use crate::endpoint::{AddressingMode, Endpoint};
use crate::error::{ClientError, ClientResult, TransportError};
use crate::transport::{ResponseStream, TransportResponse};
use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

const UNKNOWN_ERROR_BODY: &str = "Unknown";

/// Diagnostic context for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub operation: &'static str,
    pub scope: String,
    pub not_found_is_empty: bool,
}

impl RequestContext {
    pub fn new(endpoint: &Endpoint<'_>, mode: &AddressingMode) -> Self {
        Self {
            operation: endpoint.operation_name(),
            scope: endpoint.scope(mode),
            not_found_is_empty: endpoint.not_found_is_empty(),
        }
    }

    /// Logs a transport failure and converts it into the client error.
    pub fn transport_failure(&self, err: impl Into<TransportError>) -> ClientError {
        let err = err.into();
        error!(
            operation = self.operation,
            scope = %self.scope,
            "transport failure: {}",
            err
        );
        ClientError::Transport(err)
    }
}

/// A classified exchange that did not fail.
#[derive(Debug)]
pub enum Classified {
    Success(TransportResponse),
    Empty,
}

/// Classifies the outcome of one exchange.
pub async fn classify(
    ctx: &RequestContext,
    outcome: Result<TransportResponse, TransportError>,
) -> ClientResult<Classified> {
    let response = outcome.map_err(|e| ctx.transport_failure(e))?;
    let status = response.status();

    if status.is_success() {
        return Ok(Classified::Success(response));
    }

    if status == StatusCode::NOT_FOUND && ctx.not_found_is_empty {
        debug!(operation = ctx.operation, scope = %ctx.scope, "not found, returning empty result");
        return Ok(Classified::Empty);
    }

    // The body is best-effort context; the status already decides the outcome.
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| UNKNOWN_ERROR_BODY.to_string());

    debug!(
        operation = ctx.operation,
        scope = %ctx.scope,
        status = status.as_u16(),
        "service returned an error"
    );

    Err(ClientError::Domain {
        operation: ctx.operation,
        scope: ctx.scope.clone(),
        status: status.as_u16(),
        message,
    })
}

impl Classified {
    /// Decodes a JSON array. Empty results, empty bodies and `null` all give
    /// an empty list.
    pub async fn into_list<T: DeserializeOwned>(self, ctx: &RequestContext) -> ClientResult<Vec<T>> {
        let items: Option<Option<Vec<T>>> = self.into_json(ctx).await?;
        Ok(items.flatten().unwrap_or_default())
    }

    /// Decodes a JSON document, `None` for an empty result or empty body.
    pub async fn into_json<T: DeserializeOwned>(self, ctx: &RequestContext) -> ClientResult<Option<T>> {
        let body = match self.into_bytes(ctx).await? {
            Some(body) if !body.is_empty() => body,
            _ => return Ok(None),
        };
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| ctx.transport_failure(e))
    }

    /// Reads the body as text; an empty result gives an empty string.
    pub async fn into_text(self, ctx: &RequestContext) -> ClientResult<String> {
        Ok(self
            .into_bytes(ctx)
            .await?
            .map(|body| String::from_utf8_lossy(&body).into_owned())
            .unwrap_or_default())
    }

    /// Drains the body, discarding it. Used by calls with no result value.
    pub async fn into_unit(self, ctx: &RequestContext) -> ClientResult<()> {
        self.into_bytes(ctx).await.map(|_| ())
    }

    pub async fn into_bytes(self, ctx: &RequestContext) -> ClientResult<Option<Bytes>> {
        match self {
            Classified::Success(response) => response
                .bytes()
                .await
                .map(Some)
                .map_err(|e| ctx.transport_failure(e)),
            Classified::Empty => Ok(None),
        }
    }

    pub fn into_stream(self) -> Option<ResponseStream> {
        match self {
            Classified::Success(response) => Some(response.into_stream()),
            Classified::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(not_found_is_empty: bool) -> RequestContext {
        RequestContext {
            operation: "get object status",
            scope: "org:t:i".to_string(),
            not_found_is_empty,
        }
    }

    #[tokio::test]
    async fn success_passes_body_through() {
        let outcome = Ok(TransportResponse::from_bytes(StatusCode::OK, "pending"));
        let classified = classify(&ctx(true), outcome).await.unwrap();
        assert_eq!(classified.into_text(&ctx(true)).await.unwrap(), "pending");
    }

    #[tokio::test]
    async fn not_found_is_empty_only_when_allowed() {
        let outcome = Ok(TransportResponse::from_bytes(StatusCode::NOT_FOUND, "missing"));
        assert!(matches!(
            classify(&ctx(true), outcome).await.unwrap(),
            Classified::Empty
        ));

        let outcome = Ok(TransportResponse::from_bytes(StatusCode::NOT_FOUND, "missing"));
        let err = classify(&ctx(false), outcome).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn domain_error_carries_context_and_body() {
        let outcome = Ok(TransportResponse::from_bytes(
            StatusCode::INTERNAL_SERVER_ERROR,
            "database unavailable",
        ));
        let err = classify(&ctx(true), outcome).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("get object status"));
        assert!(msg.contains("org:t:i"));
        assert!(msg.contains("500"));
        assert!(msg.contains("database unavailable"));
    }

    #[tokio::test]
    async fn transport_failure_is_not_domain() {
        let outcome = Err(TransportError::Unavailable("connection reset".into()));
        let err = classify(&ctx(true), outcome).await.unwrap_err();
        assert!(err.is_transport());
        assert!(!err.is_domain());
    }

    #[tokio::test]
    async fn null_and_empty_bodies_decode_to_empty_list() {
        for body in ["", "null", "[]"] {
            let classified = Classified::Success(TransportResponse::from_bytes(StatusCode::OK, body));
            let items: Vec<String> = classified.into_list(&ctx(true)).await.unwrap();
            assert!(items.is_empty(), "body {body:?}");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_transport_error() {
        let classified = Classified::Success(TransportResponse::from_bytes(StatusCode::OK, "{oops"));
        let err = classified.into_list::<String>(&ctx(true)).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Decode(_))));
    }
}
