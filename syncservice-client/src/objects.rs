//! Object lifecycle operations.
//!
//! Objects are keyed by `(object_type, object_id)`. Metadata and payload are
//! written by separate calls; neither depends on the other having happened.

use crate::client::SyncServiceClient;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, ClientResult};
use crate::response::RequestContext;
use crate::transport::RequestBody;
use bytes::Bytes;
use futures::TryStreamExt;
use std::path::Path;
use syncservice_types::{
    Destination, DestinationStatus, ObjectMetadata, ObjectOperation, ObjectPayload, ObjectStatus,
    WebhookAction, WebhookRequest,
};
use tokio::io::{AsyncWrite, AsyncWriteExt};

impl SyncServiceClient {
    // ── Listing ─────────────────────────────────────────────────────

    /// Destinations known to the node.
    pub async fn list_destinations(&self) -> ClientResult<Vec<Destination>> {
        let (ctx, classified) = self
            .send(Endpoint::ListDestinations, Vec::new(), RequestBody::Empty)
            .await?;
        classified.into_list(&ctx).await
    }

    /// Objects addressed to one destination, with their delivery status.
    pub async fn list_objects_at_destination(
        &self,
        destination_type: &str,
        destination_id: &str,
    ) -> ClientResult<Vec<ObjectStatus>> {
        let endpoint = Endpoint::ListDestinationObjects {
            destination_type,
            destination_id,
        };
        let (ctx, classified) = self.send(endpoint, Vec::new(), RequestBody::Empty).await?;
        classified.into_list(&ctx).await
    }

    /// Objects of `object_type` that changed.
    ///
    /// With `received == false` only objects not yet marked received are
    /// returned; `true` includes those too.
    pub async fn list_updated_objects(
        &self,
        object_type: &str,
        received: bool,
    ) -> ClientResult<Vec<ObjectMetadata>> {
        let endpoint = Endpoint::ListUpdatedObjects { object_type };
        let query = vec![("received", received.to_string())];
        let (ctx, classified) = self.send(endpoint, query, RequestBody::Empty).await?;
        classified.into_list(&ctx).await
    }

    // ── Metadata ────────────────────────────────────────────────────

    /// Reads an object's metadata. `None` if the object does not exist.
    pub async fn get_metadata(
        &self,
        object_type: &str,
        object_id: &str,
    ) -> ClientResult<Option<ObjectMetadata>> {
        let endpoint = Endpoint::GetObject {
            object_type,
            object_id,
        };
        let (ctx, classified) = self.send(endpoint, Vec::new(), RequestBody::Empty).await?;
        classified.into_json(&ctx).await
    }

    /// Creates the object or replaces its metadata.
    pub async fn put_metadata(&self, metadata: &ObjectMetadata) -> ClientResult<()> {
        metadata
            .validate_for_update()
            .map_err(ClientError::InvalidRequest)?;

        let (object_type, object_id) = metadata.key();
        let endpoint = Endpoint::PutObject {
            object_type,
            object_id,
        };
        let body = self.json_body(&endpoint, &ObjectPayload::new(metadata))?;
        let (ctx, classified) = self.send(endpoint, Vec::new(), body).await?;
        classified.into_unit(&ctx).await
    }

    // ── Payload ─────────────────────────────────────────────────────

    /// Uploads an object's payload from memory.
    pub async fn put_payload(
        &self,
        object_type: &str,
        object_id: &str,
        payload: impl Into<Bytes>,
    ) -> ClientResult<()> {
        let endpoint = Endpoint::PutObjectData {
            object_type,
            object_id,
        };
        let body = RequestBody::Bytes(payload.into());
        let (ctx, classified) = self.send(endpoint, Vec::new(), body).await?;
        classified.into_unit(&ctx).await
    }

    /// Uploads an object's payload, streaming it from a file.
    pub async fn put_payload_from_file(
        &self,
        object_type: &str,
        object_id: &str,
        path: impl AsRef<Path>,
    ) -> ClientResult<()> {
        let endpoint = Endpoint::PutObjectData {
            object_type,
            object_id,
        };
        let file = tokio::fs::File::open(path.as_ref()).await.map_err(|e| {
            RequestContext::new(&endpoint, self.mode()).transport_failure(e)
        })?;
        let (ctx, classified) = self
            .send(endpoint, Vec::new(), RequestBody::file(file))
            .await?;
        classified.into_unit(&ctx).await
    }

    /// Downloads an object's payload into memory.
    ///
    /// A missing object is a [`ClientError::Domain`] with status 404.
    pub async fn fetch_payload(&self, object_type: &str, object_id: &str) -> ClientResult<Bytes> {
        let endpoint = Endpoint::GetObjectData {
            object_type,
            object_id,
        };
        let (ctx, classified) = self.send(endpoint, Vec::new(), RequestBody::Empty).await?;
        Ok(classified.into_bytes(&ctx).await?.unwrap_or_default())
    }

    /// Streams an object's payload into `sink`, returning the bytes copied.
    ///
    /// The response body is released whichever way this returns. A failing
    /// sink surfaces as a transport I/O error.
    pub async fn fetch_payload_to<W>(
        &self,
        object_type: &str,
        object_id: &str,
        sink: &mut W,
    ) -> ClientResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let endpoint = Endpoint::GetObjectData {
            object_type,
            object_id,
        };
        let (ctx, classified) = self.send(endpoint, Vec::new(), RequestBody::Empty).await?;
        let Some(mut body) = classified.into_stream() else {
            return Ok(0);
        };

        let mut copied = 0u64;
        while let Some(chunk) = body.try_next().await.map_err(|e| ctx.transport_failure(e))? {
            sink.write_all(&chunk)
                .await
                .map_err(|e| ctx.transport_failure(e))?;
            copied += chunk.len() as u64;
        }
        sink.flush().await.map_err(|e| ctx.transport_failure(e))?;
        Ok(copied)
    }

    // ── Status ──────────────────────────────────────────────────────

    /// Delivery status as reported by the node, e.g. `"pending"`.
    ///
    /// Empty if the object is unknown.
    pub async fn get_status(&self, object_type: &str, object_id: &str) -> ClientResult<String> {
        let endpoint = Endpoint::GetObjectStatus {
            object_type,
            object_id,
        };
        let (ctx, classified) = self.send(endpoint, Vec::new(), RequestBody::Empty).await?;
        Ok(classified.into_text(&ctx).await?.trim().to_string())
    }

    /// Per-destination delivery status of one object.
    pub async fn list_object_destinations(
        &self,
        object_type: &str,
        object_id: &str,
    ) -> ClientResult<Vec<DestinationStatus>> {
        let endpoint = Endpoint::GetObjectDestinations {
            object_type,
            object_id,
        };
        let (ctx, classified) = self.send(endpoint, Vec::new(), RequestBody::Empty).await?;
        classified.into_list(&ctx).await
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    pub async fn delete_object(&self, object_type: &str, object_id: &str) -> ClientResult<()> {
        let endpoint = Endpoint::DeleteObject {
            object_type,
            object_id,
        };
        let (ctx, classified) = self.send(endpoint, Vec::new(), RequestBody::Empty).await?;
        classified.into_unit(&ctx).await
    }

    /// Applies a lifecycle transition to an object.
    pub async fn transition(
        &self,
        object_type: &str,
        object_id: &str,
        operation: ObjectOperation,
    ) -> ClientResult<()> {
        let endpoint = Endpoint::ObjectOperation {
            object_type,
            object_id,
            operation,
        };
        let (ctx, classified) = self.send(endpoint, Vec::new(), RequestBody::Empty).await?;
        classified.into_unit(&ctx).await
    }

    /// Activates an object that was created inactive.
    pub async fn activate_object(&self, object_type: &str, object_id: &str) -> ClientResult<()> {
        self.transition(object_type, object_id, ObjectOperation::Activate)
            .await
    }

    pub async fn mark_object_consumed(&self, object_type: &str, object_id: &str) -> ClientResult<()> {
        self.transition(object_type, object_id, ObjectOperation::Consumed)
            .await
    }

    /// Acknowledges that an object's deletion was seen.
    pub async fn mark_object_deleted(&self, object_type: &str, object_id: &str) -> ClientResult<()> {
        self.transition(object_type, object_id, ObjectOperation::Deleted)
            .await
    }

    pub async fn mark_object_received(&self, object_type: &str, object_id: &str) -> ClientResult<()> {
        self.transition(object_type, object_id, ObjectOperation::Received)
            .await
    }

    // ── Webhooks & resend ───────────────────────────────────────────

    /// Asks the node to call `url` when objects of `object_type` change.
    pub async fn register_webhook(&self, object_type: &str, url: &str) -> ClientResult<()> {
        self.manage_webhook(object_type, WebhookAction::Register, url)
            .await
    }

    pub async fn delete_webhook(&self, object_type: &str, url: &str) -> ClientResult<()> {
        self.manage_webhook(object_type, WebhookAction::Delete, url)
            .await
    }

    async fn manage_webhook(
        &self,
        object_type: &str,
        action: WebhookAction,
        url: &str,
    ) -> ClientResult<()> {
        let endpoint = Endpoint::ManageWebhook { object_type };
        let request = WebhookRequest {
            action,
            url: url.to_string(),
        };
        let body = self.json_body(&endpoint, &request)?;
        let (ctx, classified) = self.send(endpoint, Vec::new(), body).await?;
        classified.into_unit(&ctx).await
    }

    /// Asks the node to resend every object addressed to it.
    pub async fn resend(&self) -> ClientResult<()> {
        let (ctx, classified) = self
            .send(Endpoint::Resend, Vec::new(), RequestBody::Empty)
            .await?;
        classified.into_unit(&ctx).await
    }
}
