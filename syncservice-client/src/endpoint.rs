//! Resource addressing for edge and hub clients.
//!
//! Every operation maps to one path under [`API_ROOT`]. A hub client inserts
//! its organization as the first segment after the resource root; an edge
//! client leaves it out. ACL resources always lead with the ACL type, so the
//! organization comes second there.
//!
//! | Endpoint | Edge | Hub |
//! |---|---|---|
//! | destinations | `/destinations` | `/destinations/{org}` |
//! | objects at destination | `/destinations/{dt}/{di}/objects` | `/destinations/{org}/{dt}/{di}/objects` |
//! | object type | `/objects/{t}` | `/objects/{org}/{t}` |
//! | object | `/objects/{t}/{i}[/{suffix}]` | `/objects/{org}/{t}/{i}[/{suffix}]` |
//! | resend | `/resend` | `/resend` |
//! | ACL | `/security/{acl}[/{key}]` | `/security/{acl}/{org}[/{key}]` |

use reqwest::Method;
use syncservice_types::{AclType, ObjectOperation};

/// Version prefix shared by every resource.
pub const API_ROOT: &str = "/api/v1";

/// How a client addresses the service, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressingMode {
    /// Talking to a local edge node; the organization is implicit.
    Edge,
    /// Talking to the hub on behalf of an organization.
    Hub { org_id: String },
}

impl AddressingMode {
    /// Empty organization means edge mode.
    pub fn from_org_id(org_id: &str) -> Self {
        if org_id.is_empty() {
            AddressingMode::Edge
        } else {
            AddressingMode::Hub {
                org_id: org_id.to_string(),
            }
        }
    }

    /// Organization identifier, empty in edge mode.
    pub fn org_id(&self) -> &str {
        match self {
            AddressingMode::Edge => "",
            AddressingMode::Hub { org_id } => org_id,
        }
    }

    pub fn is_edge(&self) -> bool {
        matches!(self, AddressingMode::Edge)
    }
}

/// One client operation together with its path parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    ListDestinations,
    ListDestinationObjects {
        destination_type: &'a str,
        destination_id: &'a str,
    },
    /// Takes a `received` query parameter.
    ListUpdatedObjects { object_type: &'a str },
    GetObject { object_type: &'a str, object_id: &'a str },
    PutObject { object_type: &'a str, object_id: &'a str },
    DeleteObject { object_type: &'a str, object_id: &'a str },
    GetObjectData { object_type: &'a str, object_id: &'a str },
    PutObjectData { object_type: &'a str, object_id: &'a str },
    GetObjectDestinations { object_type: &'a str, object_id: &'a str },
    GetObjectStatus { object_type: &'a str, object_id: &'a str },
    ObjectOperation {
        object_type: &'a str,
        object_id: &'a str,
        operation: ObjectOperation,
    },
    /// Register or delete a webhook; the action travels in the body.
    ManageWebhook { object_type: &'a str },
    Resend,
    UpdateAcl { acl_type: AclType, key: &'a str },
    /// An empty key addresses the list of all ACL names.
    RetrieveAcl { acl_type: AclType, key: &'a str },
    RetrieveAllAcls { acl_type: AclType },
}

impl Endpoint<'_> {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::ListDestinations
            | Endpoint::ListDestinationObjects { .. }
            | Endpoint::ListUpdatedObjects { .. }
            | Endpoint::GetObject { .. }
            | Endpoint::GetObjectData { .. }
            | Endpoint::GetObjectDestinations { .. }
            | Endpoint::GetObjectStatus { .. }
            | Endpoint::RetrieveAcl { .. }
            | Endpoint::RetrieveAllAcls { .. } => Method::GET,
            Endpoint::PutObject { .. }
            | Endpoint::PutObjectData { .. }
            | Endpoint::ObjectOperation { .. }
            | Endpoint::ManageWebhook { .. }
            | Endpoint::UpdateAcl { .. } => Method::PUT,
            Endpoint::DeleteObject { .. } => Method::DELETE,
            Endpoint::Resend => Method::POST,
        }
    }

    /// Whether a 404 from this endpoint means "nothing there yet".
    ///
    /// Only reads that return a collection or an optional value qualify.
    /// Payload download and every mutating call treat 404 as a failure.
    pub fn not_found_is_empty(&self) -> bool {
        matches!(
            self,
            Endpoint::ListDestinations
                | Endpoint::ListDestinationObjects { .. }
                | Endpoint::ListUpdatedObjects { .. }
                | Endpoint::GetObject { .. }
                | Endpoint::GetObjectDestinations { .. }
                | Endpoint::GetObjectStatus { .. }
                | Endpoint::RetrieveAcl { .. }
                | Endpoint::RetrieveAllAcls { .. }
        )
    }

    /// Human-readable operation name used in error messages and logs.
    pub fn operation_name(&self) -> &'static str {
        match self {
            Endpoint::ListDestinations => "list destinations",
            Endpoint::ListDestinationObjects { .. } => "list objects at destination",
            Endpoint::ListUpdatedObjects { .. } => "list updated objects",
            Endpoint::GetObject { .. } => "get object metadata",
            Endpoint::PutObject { .. } => "update object",
            Endpoint::DeleteObject { .. } => "delete object",
            Endpoint::GetObjectData { .. } => "fetch object data",
            Endpoint::PutObjectData { .. } => "update object data",
            Endpoint::GetObjectDestinations { .. } => "get object destinations",
            Endpoint::GetObjectStatus { .. } => "get object status",
            Endpoint::ObjectOperation { operation, .. } => match operation {
                ObjectOperation::Activate => "activate object",
                ObjectOperation::Consumed => "mark object consumed",
                ObjectOperation::Deleted => "mark object deleted",
                ObjectOperation::Received => "mark object received",
            },
            Endpoint::ManageWebhook { .. } => "manage webhook",
            Endpoint::Resend => "request resend",
            Endpoint::UpdateAcl { .. } => "update ACL",
            Endpoint::RetrieveAcl { .. } => "retrieve ACL",
            Endpoint::RetrieveAllAcls { .. } => "retrieve ACL names",
        }
    }

    /// `org:type:id`-style context for diagnostics.
    pub fn scope(&self, mode: &AddressingMode) -> String {
        let params: Vec<&str> = match *self {
            Endpoint::ListDestinations | Endpoint::Resend => vec![],
            Endpoint::ListDestinationObjects {
                destination_type,
                destination_id,
            } => vec![destination_type, destination_id],
            Endpoint::ListUpdatedObjects { object_type }
            | Endpoint::ManageWebhook { object_type } => vec![object_type],
            Endpoint::GetObject { object_type, object_id }
            | Endpoint::PutObject { object_type, object_id }
            | Endpoint::DeleteObject { object_type, object_id }
            | Endpoint::GetObjectData { object_type, object_id }
            | Endpoint::PutObjectData { object_type, object_id }
            | Endpoint::GetObjectDestinations { object_type, object_id }
            | Endpoint::GetObjectStatus { object_type, object_id }
            | Endpoint::ObjectOperation {
                object_type,
                object_id,
                ..
            } => vec![object_type, object_id],
            Endpoint::UpdateAcl { acl_type, key } | Endpoint::RetrieveAcl { acl_type, key } => {
                vec![acl_type.as_str(), key]
            }
            Endpoint::RetrieveAllAcls { acl_type } => vec![acl_type.as_str()],
        };

        std::iter::once(mode.org_id())
            .chain(params)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Maps endpoints to paths for one addressing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    mode: AddressingMode,
}

impl EndpointResolver {
    pub fn new(mode: AddressingMode) -> Self {
        Self { mode }
    }

    pub fn for_org(org_id: &str) -> Self {
        Self::new(AddressingMode::from_org_id(org_id))
    }

    pub fn mode(&self) -> &AddressingMode {
        &self.mode
    }

    /// Resolves `endpoint` to its path. Pure; never touches the network.
    pub fn path(&self, endpoint: &Endpoint<'_>) -> String {
        match *endpoint {
            Endpoint::ListDestinations => self.destinations().finish(),
            Endpoint::ListDestinationObjects {
                destination_type,
                destination_id,
            } => self
                .destinations()
                .param(destination_type)
                .param(destination_id)
                .literal("objects")
                .finish(),
            Endpoint::ListUpdatedObjects { object_type }
            | Endpoint::ManageWebhook { object_type } => self.objects().param(object_type).finish(),
            Endpoint::GetObject { object_type, object_id }
            | Endpoint::PutObject { object_type, object_id }
            | Endpoint::DeleteObject { object_type, object_id } => {
                self.object(object_type, object_id).finish()
            }
            Endpoint::GetObjectData { object_type, object_id }
            | Endpoint::PutObjectData { object_type, object_id } => {
                self.object(object_type, object_id).literal("data").finish()
            }
            Endpoint::GetObjectDestinations { object_type, object_id } => self
                .object(object_type, object_id)
                .literal("destinations")
                .finish(),
            Endpoint::GetObjectStatus { object_type, object_id } => {
                self.object(object_type, object_id).literal("status").finish()
            }
            Endpoint::ObjectOperation {
                object_type,
                object_id,
                operation,
            } => self
                .object(object_type, object_id)
                .literal(operation.as_str())
                .finish(),
            Endpoint::Resend => PathBuilder::new().literal("resend").finish(),
            Endpoint::UpdateAcl { acl_type, key } | Endpoint::RetrieveAcl { acl_type, key } => {
                self.security(acl_type).param_if_present(key).finish()
            }
            Endpoint::RetrieveAllAcls { acl_type } => self.security(acl_type).finish(),
        }
    }

    fn destinations(&self) -> PathBuilder {
        PathBuilder::new().literal("destinations").org(&self.mode)
    }

    fn objects(&self) -> PathBuilder {
        PathBuilder::new().literal("objects").org(&self.mode)
    }

    fn object(&self, object_type: &str, object_id: &str) -> PathBuilder {
        self.objects().param(object_type).param(object_id)
    }

    fn security(&self, acl_type: AclType) -> PathBuilder {
        PathBuilder::new()
            .literal("security")
            .literal(acl_type.as_str())
            .org(&self.mode)
    }
}

struct PathBuilder(String);

impl PathBuilder {
    fn new() -> Self {
        Self(API_ROOT.to_string())
    }

    fn literal(mut self, segment: &str) -> Self {
        self.0.push('/');
        self.0.push_str(segment);
        self
    }

    fn param(mut self, value: &str) -> Self {
        self.0.push('/');
        self.0.push_str(&urlencoding::encode(value));
        self
    }

    fn param_if_present(self, value: &str) -> Self {
        if value.is_empty() { self } else { self.param(value) }
    }

    fn org(self, mode: &AddressingMode) -> Self {
        match mode {
            AddressingMode::Edge => self,
            AddressingMode::Hub { org_id } => self.param(org_id),
        }
    }

    fn finish(self) -> String {
        self.0
    }
}
