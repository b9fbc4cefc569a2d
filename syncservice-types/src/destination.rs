use serde::{Deserialize, Serialize};

/// A registered edge node, as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(rename = "destinationOrgID", default)]
    pub destination_org_id: String,

    #[serde(default)]
    pub destination_type: String,

    #[serde(rename = "destinationID", default)]
    pub destination_id: String,

    /// Transport the node uses to talk to the hub (for example `mqtt` or `http`).
    #[serde(default)]
    pub communication: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code_version: String,
}

impl Destination {
    /// Returns the `type:id` form used in `destinationsList`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.destination_type, self.destination_id)
    }
}
