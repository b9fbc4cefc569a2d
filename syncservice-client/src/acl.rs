//! Access control list operations.
//!
//! Each ACL guards either a destination type or an object type and lists the
//! usernames allowed to use it.

use crate::client::SyncServiceClient;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, ClientResult};
use crate::transport::RequestBody;
use syncservice_types::{AclAction, AclBulkRequest, AclType};

impl SyncServiceClient {
    /// Adds (`add == true`) or removes usernames on the ACL for `key`.
    pub async fn modify_acl<I, S>(
        &self,
        add: bool,
        acl_type: AclType,
        key: &str,
        usernames: I,
    ) -> ClientResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if key.is_empty() {
            return Err(ClientError::InvalidRequest(format!(
                "{acl_type} ACL key must not be empty"
            )));
        }

        let endpoint = Endpoint::UpdateAcl { acl_type, key };
        let request = AclBulkRequest::new(AclAction::from_add(add), usernames);
        let body = self.json_body(&endpoint, &request)?;
        let (ctx, classified) = self.send(endpoint, Vec::new(), body).await?;
        classified.into_unit(&ctx).await
    }

    /// Usernames on the ACL for `key`. An empty key lists the ACL names instead.
    pub async fn retrieve_acl(&self, acl_type: AclType, key: &str) -> ClientResult<Vec<String>> {
        let endpoint = if key.is_empty() {
            Endpoint::RetrieveAllAcls { acl_type }
        } else {
            Endpoint::RetrieveAcl { acl_type, key }
        };
        let (ctx, classified) = self.send(endpoint, Vec::new(), RequestBody::Empty).await?;
        classified.into_list(&ctx).await
    }

    /// Keys of every ACL of `acl_type`.
    pub async fn retrieve_all_acl_names(&self, acl_type: AclType) -> ClientResult<Vec<String>> {
        self.retrieve_acl(acl_type, "").await
    }

    // ── Destination ACLs ────────────────────────────────────────────

    pub async fn add_users_to_destination_acl<I, S>(
        &self,
        destination_type: &str,
        usernames: I,
    ) -> ClientResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modify_acl(true, AclType::Destinations, destination_type, usernames)
            .await
    }

    pub async fn remove_users_from_destination_acl<I, S>(
        &self,
        destination_type: &str,
        usernames: I,
    ) -> ClientResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modify_acl(false, AclType::Destinations, destination_type, usernames)
            .await
    }

    pub async fn retrieve_destination_acl(&self, destination_type: &str) -> ClientResult<Vec<String>> {
        self.retrieve_acl(AclType::Destinations, destination_type)
            .await
    }

    pub async fn retrieve_all_destination_acls(&self) -> ClientResult<Vec<String>> {
        self.retrieve_all_acl_names(AclType::Destinations).await
    }

    // ── Object ACLs ─────────────────────────────────────────────────

    pub async fn add_users_to_object_acl<I, S>(&self, object_type: &str, usernames: I) -> ClientResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modify_acl(true, AclType::Objects, object_type, usernames)
            .await
    }

    pub async fn remove_users_from_object_acl<I, S>(
        &self,
        object_type: &str,
        usernames: I,
    ) -> ClientResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modify_acl(false, AclType::Objects, object_type, usernames)
            .await
    }

    pub async fn retrieve_object_acl(&self, object_type: &str) -> ClientResult<Vec<String>> {
        self.retrieve_acl(AclType::Objects, object_type).await
    }

    pub async fn retrieve_all_object_acls(&self) -> ClientResult<Vec<String>> {
        self.retrieve_all_acl_names(AclType::Objects).await
    }
}
