//! RDS operations the lifecycle provider needs
//!
//! The provider only talks to RDS through [`GlobalClusterApi`], so a live SDK
//! binding and the in-memory executor are interchangeable.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("throttled: {0}")]
    Throttled(String),
}

impl ApiError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Throttled(_) | ApiError::InvalidState(_))
    }
}

/// A regional database cluster
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDescription {
    pub identifier: String,
    pub arn: String,
    pub region: String,
    pub engine: String,
    pub engine_version: String,
    pub status: String,
    /// Global cluster this cluster belongs to, if any
    pub global_cluster_identifier: Option<String>,
    /// Identifiers of the cluster's instances
    pub instances: Vec<String>,
}

/// One regional cluster inside a global cluster
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalClusterMember {
    pub db_cluster_arn: String,
    pub db_cluster_identifier: String,
    pub region: String,
    pub is_writer: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalClusterDescription {
    pub identifier: String,
    pub arn: String,
    pub engine: String,
    pub engine_version: String,
    pub members: Vec<GlobalClusterMember>,
}

impl GlobalClusterDescription {
    /// The primary member
    pub fn writer(&self) -> Option<&GlobalClusterMember> {
        self.members.iter().find(|m| m.is_writer)
    }

    pub fn secondaries(&self) -> impl Iterator<Item = &GlobalClusterMember> {
        self.members.iter().filter(|m| !m.is_writer)
    }

    pub fn member_in(&self, region: &str) -> Option<&GlobalClusterMember> {
        self.members.iter().find(|m| m.region == region)
    }

    pub fn has_member(&self, cluster_arn: &str) -> bool {
        self.members.iter().any(|m| m.db_cluster_arn == cluster_arn)
    }
}

/// Create a regional cluster as a secondary of a global cluster
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecondaryClusterRequest {
    pub identifier: String,
    pub region: String,
    pub global_cluster_identifier: String,
    pub engine: String,
    pub engine_version: String,
    pub db_subnet_group_name: String,
}

/// Create one instance in a regional cluster
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceRequest {
    pub identifier: String,
    pub cluster_identifier: String,
    pub region: String,
    pub instance_class: String,
    pub engine: String,
}

/// RDS operations used to promote and attach regional clusters
///
/// Describe calls return `Ok(None)` for missing resources; mutating calls
/// fail with [`ApiError::NotFound`] instead.
pub trait GlobalClusterApi: Send + Sync {
    fn describe_cluster(
        &self,
        region: &str,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<ClusterDescription>, ApiError>> + Send;

    fn describe_global_cluster(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<GlobalClusterDescription>, ApiError>> + Send;

    /// Create a global cluster with `source` as its primary
    fn create_global_cluster(
        &self,
        identifier: &str,
        source: &ClusterDescription,
    ) -> impl Future<Output = Result<GlobalClusterDescription, ApiError>> + Send;

    fn create_secondary_cluster(
        &self,
        request: &SecondaryClusterRequest,
    ) -> impl Future<Output = Result<ClusterDescription, ApiError>> + Send;

    fn create_instance(
        &self,
        request: &InstanceRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Detach a member; the cluster keeps running as a standalone cluster
    fn remove_from_global_cluster(
        &self,
        global_cluster_identifier: &str,
        cluster_arn: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete a global cluster that has no members left
    fn delete_global_cluster(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
