//! Sync service client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures of the transport itself, before or while reading a response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP transport failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Raised by custom [`Transport`](crate::Transport) implementations.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    /// Returns true if the failure was a timeout, including a stalled upload.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_timeout() || has_timed_out_source(e),
            TransportError::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }

    /// Returns true if no connection could be established.
    pub fn is_connect(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_connect(),
            TransportError::Io(e) => e.kind() == std::io::ErrorKind::ConnectionRefused,
            _ => false,
        }
    }
}

fn has_timed_out_source(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = err.source();
    }
    false
}

/// Errors returned by [`SyncServiceClient`](crate::SyncServiceClient).
///
/// A "not found" answer to a read-style call is not an error: those calls
/// return an empty collection, an empty string or `None` instead.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid client configuration. Only produced while building a client.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The caller's arguments violate a request invariant. Nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with a non-success status.
    #[error("{operation} failed for [{scope}] with HTTP {status}: {message}")]
    Domain {
        operation: &'static str,
        scope: String,
        status: u16,
        message: String,
    },
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, ClientError::Domain { .. })
    }

    /// HTTP status of a domain error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Domain { status, .. } => Some(*status),
            _ => None,
        }
    }
}
