//! Delivery status reported per object and per destination.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery state of an object at one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Delivering,
    Delivered,
    Consumed,
    /// The destination sent back a feedback error.
    Error,
    Deleted,
}

impl DeliveryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivering => "delivering",
            Self::Delivered => "delivered",
            Self::Consumed => "consumed",
            Self::Error => "error",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "delivering" => Ok(Self::Delivering),
            "delivered" => Ok(Self::Delivered),
            "consumed" => Ok(Self::Consumed),
            "error" => Ok(Self::Error),
            "deleted" => Ok(Self::Deleted),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// Status of one object bound for a particular destination.
///
/// `status` is kept as the raw wire string; older services report values
/// outside [`DeliveryStatus`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStatus {
    #[serde(rename = "orgID", default)]
    pub org_id: String,

    #[serde(rename = "objectType", default)]
    pub object_type: String,

    #[serde(rename = "objectID", default)]
    pub object_id: String,

    #[serde(default)]
    pub status: String,
}

impl ObjectStatus {
    /// Typed view of `status`, `None` when the value is not recognised.
    #[must_use]
    pub fn delivery_status(&self) -> Option<DeliveryStatus> {
        self.status.parse().ok()
    }
}

/// Status of an object as seen from one of its destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationStatus {
    #[serde(default)]
    pub destination_type: String,

    #[serde(rename = "destinationID", default)]
    pub destination_id: String,

    #[serde(default)]
    pub status: String,

    /// Feedback message, set when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DestinationStatus {
    #[must_use]
    pub fn delivery_status(&self) -> Option<DeliveryStatus> {
        self.status.parse().ok()
    }
}
