//! Object metadata, the unit of synchronization.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Number of consumers the service assumes when `consumers` is not set.
pub const DEFAULT_EXPECTED_CONSUMERS: u32 = 1;

/// Metadata describing one synchronizable object.
///
/// `object_type` + `object_id` form the object's key within an organization.
/// Every other field is optional and is left out of the JSON when unset.
///
/// `origin_id`, `origin_type`, `deleted` and `instance_id` are assigned by the
/// service. They are read from responses but never written into requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    #[serde(rename = "objectID", default)]
    pub object_id: String,

    #[serde(default)]
    pub object_type: String,

    #[serde(rename = "destinationID", skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_type: Option<String>,

    /// Explicit recipients as `type:id` pairs. Excludes `destination_id` and
    /// `destination_type`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destinations_list: Option<Vec<String>>,

    #[serde(rename = "destinationOrgID", skip_serializing_if = "Option::is_none")]
    pub destination_org_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// RFC3339 timestamp after which the service deletes the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,

    /// RFC3339 timestamp at which an inactive object becomes deliverable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_not_send: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_data: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_only: Option<bool>,

    /// Delete the object once every listed destination has consumed it.
    #[serde(rename = "autodelete", skip_serializing_if = "Option::is_none")]
    pub auto_delete: Option<bool>,

    #[serde(rename = "consumers", skip_serializing_if = "Option::is_none")]
    pub expected_consumers: Option<u32>,

    /// Location the payload can be fetched from instead of the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_data_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_data_uri: Option<String>,

    #[serde(rename = "originID", default, skip_serializing)]
    pub origin_id: Option<String>,

    #[serde(default, skip_serializing)]
    pub origin_type: Option<String>,

    #[serde(default, skip_serializing)]
    pub deleted: Option<bool>,

    /// Monotonic revision marker assigned by the service.
    #[serde(rename = "instanceID", default, skip_serializing)]
    pub instance_id: Option<i64>,
}

impl ObjectMetadata {
    /// Creates metadata for the object keyed by `object_type` and `object_id`.
    #[must_use]
    pub fn new(object_type: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            object_id: object_id.into(),
            ..Default::default()
        }
    }

    /// Addresses a single destination (or every destination of a type when
    /// `destination_id` is empty).
    #[must_use]
    pub fn with_destination(
        mut self,
        destination_type: impl Into<String>,
        destination_id: impl Into<String>,
    ) -> Self {
        self.destination_type = Some(destination_type.into());
        self.destination_id = Some(destination_id.into());
        self
    }

    /// Addresses an explicit list of `type:id` destinations.
    #[must_use]
    pub fn with_destinations_list<I, S>(mut self, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.destinations_list = Some(destinations.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_expiration(mut self, expiration: DateTime<FixedOffset>) -> Self {
        self.expiration = Some(expiration.to_rfc3339());
        self
    }

    #[must_use]
    pub fn with_activation_time(mut self, activation_time: DateTime<FixedOffset>) -> Self {
        self.activation_time = Some(activation_time.to_rfc3339());
        self
    }

    /// Returns `(object_type, object_id)`.
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.object_type, &self.object_id)
    }

    /// Number of consumers the service expects, applying its default.
    #[must_use]
    pub fn expected_consumers(&self) -> u32 {
        self.expected_consumers.unwrap_or(DEFAULT_EXPECTED_CONSUMERS)
    }

    /// Whether the service reported this object as a deletion tombstone.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }

    /// Parses `expiration`, if present.
    pub fn expiration_time(&self) -> Result<Option<DateTime<FixedOffset>>> {
        parse_timestamp(self.expiration.as_deref())
    }

    /// Parses `activation_time`, if present.
    pub fn activation_time(&self) -> Result<Option<DateTime<FixedOffset>>> {
        parse_timestamp(self.activation_time.as_deref())
    }

    /// Checks the invariants a create/update request must satisfy.
    ///
    /// The key must be present and a destinations list cannot be combined
    /// with a discrete destination.
    pub fn validate_for_update(&self) -> std::result::Result<(), String> {
        if self.object_type.is_empty() || self.object_id.is_empty() {
            return Err("objectType and objectID must both be set".to_string());
        }
        let has_discrete = self.destination_id.is_some() || self.destination_type.is_some();
        if self.destinations_list.is_some() && has_discrete {
            return Err(
                "destinationsList cannot be combined with destinationID or destinationType"
                    .to_string(),
            );
        }
        Ok(())
    }
}

fn parse_timestamp(value: Option<&str>) -> Result<Option<DateTime<FixedOffset>>> {
    match value {
        None | Some("") => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(Some)
            .map_err(|source| Error::InvalidTimestamp {
                value: raw.to_string(),
                source,
            }),
    }
}

/// Request body for creating or replacing an object's metadata.
#[derive(Debug, Serialize)]
pub struct ObjectPayload<'a> {
    pub meta: &'a ObjectMetadata,
}

impl<'a> ObjectPayload<'a> {
    pub fn new(meta: &'a ObjectMetadata) -> Self {
        Self { meta }
    }
}
