//! Access-control list types.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace an ACL protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclType {
    /// ACL keyed by destination type.
    Destinations,
    /// ACL keyed by object type.
    Objects,
}

impl AclType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Destinations => "destinations",
            Self::Objects => "objects",
        }
    }
}

impl fmt::Display for AclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "destinations" => Ok(Self::Destinations),
            "objects" => Ok(Self::Objects),
            other => Err(Error::UnknownAclType(other.to_string())),
        }
    }
}

/// Bulk membership change applied to one ACL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    Add,
    Remove,
}

impl AclAction {
    #[must_use]
    pub const fn from_add(add: bool) -> Self {
        if add { Self::Add } else { Self::Remove }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for AclAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for `PUT /security/...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclBulkRequest {
    pub action: AclAction,
    pub usernames: Vec<String>,
}

impl AclBulkRequest {
    pub fn new<I, S>(action: AclAction, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action,
            usernames: usernames.into_iter().map(Into::into).collect(),
        }
    }
}
