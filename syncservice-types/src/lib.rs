//! Wire data model for the edge sync service.
//!
//! This crate defines the JSON shapes exchanged with a sync service node:
//! - Object metadata (the unit of synchronization, keyed by type and ID)
//! - Destination snapshots and per-destination delivery status
//! - ACL types and the small request payloads used by mutating calls
//!
//! Everything here is plain data. Addressing, dispatch and response handling
//! live in `syncservice-client`.

mod acl;
mod destination;
mod metadata;
mod operation;
mod status;

pub use acl::{AclAction, AclBulkRequest, AclType};
pub use destination::Destination;
pub use metadata::{ObjectMetadata, ObjectPayload};
pub use operation::{ObjectOperation, WebhookAction, WebhookRequest};
pub use status::{DeliveryStatus, DestinationStatus, ObjectStatus};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when interpreting wire values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unknown delivery status: {0}")]
    UnknownStatus(String),

    #[error("unknown ACL type: {0}")]
    UnknownAclType(String),

    #[error("unknown object operation: {0}")]
    UnknownOperation(String),
}
