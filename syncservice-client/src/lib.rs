//! Async client for the edge sync service.
//!
//! A [`SyncServiceClient`] talks to one node, either a local edge node or the
//! hub on behalf of an organization. It provides:
//! - Object lifecycle calls (metadata, payload, status, transitions, webhooks)
//! - Destination and object ACL management
//! - An [`UpdatesPoller`] for callers that want updates pushed to a channel
//!
//! Each call is one HTTP exchange. Results fall into success, an empty result
//! (a 404 on a read where that means "nothing yet"), a [`ClientError::Domain`]
//! carrying the service's status and message, or a [`ClientError::Transport`].

mod acl;
mod client;
mod config;
mod endpoint;
mod error;
mod objects;
mod poller;
mod response;
mod transport;

pub use client::SyncServiceClient;
pub use config::{ClientConfig, DEFAULT_URL, Interceptor};
pub use endpoint::{API_ROOT, AddressingMode, Endpoint, EndpointResolver};
pub use error::{ClientError, ClientResult, TransportError};
pub use poller::UpdatesPoller;
pub use reqwest::{Method, RequestBuilder, StatusCode};
pub use response::{Classified, RequestContext, classify};
pub use transport::{
    BasicAuth, HttpTransport, RequestBody, RequestDecorator, ResponseStream, Transport,
    TransportRequest, TransportResponse, UploadStream,
};

pub use syncservice_types::{
    AclAction, AclBulkRequest, AclType, DeliveryStatus, Destination, DestinationStatus,
    ObjectMetadata, ObjectOperation, ObjectPayload, ObjectStatus, WebhookAction, WebhookRequest,
};
