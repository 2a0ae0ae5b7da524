//! In-process executor for [`GlobalClusterApi`]
//!
//! Keeps regional and global clusters in memory with the same preconditions
//! RDS enforces. Used for dry runs of a deployment and in tests; every
//! mutating call is recorded so idempotency can be observed.

use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::RwLock;

use crate::provider::api::{
    ApiError, ClusterDescription, GlobalClusterApi, GlobalClusterDescription, GlobalClusterMember,
    InstanceRequest, SecondaryClusterRequest,
};

/// A mutating call that reached the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    CreateGlobalCluster { identifier: String },
    CreateSecondaryCluster { identifier: String, region: String },
    CreateInstance { identifier: String, region: String },
    RemoveFromGlobalCluster { global: String, cluster_arn: String },
    DeleteGlobalCluster { identifier: String },
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Keyed by (region, identifier)
    clusters: BTreeMap<(String, String), ClusterDescription>,
    global_clusters: BTreeMap<String, GlobalClusterDescription>,
    rejected_versions: BTreeSet<String>,
    calls: Vec<ApiCall>,
}

#[derive(Debug)]
pub struct InMemoryGlobalClusterApi {
    account: String,
    state: RwLock<MemoryState>,
}

impl Default for InMemoryGlobalClusterApi {
    fn default() -> Self {
        Self::new("123456789012")
    }
}

impl InMemoryGlobalClusterApi {
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            state: RwLock::new(MemoryState::default()),
        }
    }

    /// Register a standalone regional cluster, as a stack deployment would
    pub async fn add_cluster(
        &self,
        region: &str,
        identifier: &str,
        engine: &str,
        engine_version: &str,
    ) -> ClusterDescription {
        let cluster = ClusterDescription {
            identifier: identifier.to_string(),
            arn: self.cluster_arn(region, identifier),
            region: region.to_string(),
            engine: engine.to_string(),
            engine_version: engine_version.to_string(),
            status: "available".to_string(),
            global_cluster_identifier: None,
            instances: Vec::new(),
        };
        self.state
            .write()
            .await
            .clusters
            .insert((region.to_string(), identifier.to_string()), cluster.clone());
        cluster
    }

    /// Make global cluster creation fail for an engine version
    pub async fn reject_engine_version(&self, engine_version: &str) {
        self.state
            .write()
            .await
            .rejected_versions
            .insert(engine_version.to_string());
    }

    /// Mutating calls so far, oldest first
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn clusters(&self) -> Vec<ClusterDescription> {
        self.state.read().await.clusters.values().cloned().collect()
    }

    fn cluster_arn(&self, region: &str, identifier: &str) -> String {
        format!("arn:aws:rds:{region}:{}:cluster:{identifier}", self.account)
    }

    fn global_cluster_arn(&self, identifier: &str) -> String {
        format!("arn:aws:rds::{}:global-cluster:{identifier}", self.account)
    }
}

impl GlobalClusterApi for InMemoryGlobalClusterApi {
    async fn describe_cluster(
        &self,
        region: &str,
        identifier: &str,
    ) -> Result<Option<ClusterDescription>, ApiError> {
        let state = self.state.read().await;
        Ok(state
            .clusters
            .get(&(region.to_string(), identifier.to_string()))
            .cloned())
    }

    async fn describe_global_cluster(
        &self,
        identifier: &str,
    ) -> Result<Option<GlobalClusterDescription>, ApiError> {
        Ok(self.state.read().await.global_clusters.get(identifier).cloned())
    }

    async fn create_global_cluster(
        &self,
        identifier: &str,
        source: &ClusterDescription,
    ) -> Result<GlobalClusterDescription, ApiError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.calls.push(ApiCall::CreateGlobalCluster {
            identifier: identifier.to_string(),
        });

        if state.global_clusters.contains_key(identifier) {
            return Err(ApiError::AlreadyExists(format!("global cluster {identifier}")));
        }
        if state.rejected_versions.contains(&source.engine_version) {
            return Err(ApiError::Rejected(format!(
                "engine version {} does not support global databases",
                source.engine_version
            )));
        }

        let key = (source.region.clone(), source.identifier.clone());
        let cluster = state
            .clusters
            .get_mut(&key)
            .ok_or_else(|| ApiError::NotFound(format!("cluster {}", source.identifier)))?;
        if let Some(existing) = &cluster.global_cluster_identifier {
            return Err(ApiError::InvalidState(format!(
                "cluster {} is already a member of {existing}",
                cluster.identifier
            )));
        }
        cluster.global_cluster_identifier = Some(identifier.to_string());

        let global = GlobalClusterDescription {
            identifier: identifier.to_string(),
            arn: self.global_cluster_arn(identifier),
            engine: cluster.engine.clone(),
            engine_version: cluster.engine_version.clone(),
            members: vec![GlobalClusterMember {
                db_cluster_arn: cluster.arn.clone(),
                db_cluster_identifier: cluster.identifier.clone(),
                region: cluster.region.clone(),
                is_writer: true,
            }],
        };
        state
            .global_clusters
            .insert(identifier.to_string(), global.clone());
        Ok(global)
    }

    async fn create_secondary_cluster(
        &self,
        request: &SecondaryClusterRequest,
    ) -> Result<ClusterDescription, ApiError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.calls.push(ApiCall::CreateSecondaryCluster {
            identifier: request.identifier.clone(),
            region: request.region.clone(),
        });

        let key = (request.region.clone(), request.identifier.clone());
        if state.clusters.contains_key(&key) {
            return Err(ApiError::AlreadyExists(format!(
                "cluster {} in {}",
                request.identifier, request.region
            )));
        }

        let cluster = ClusterDescription {
            identifier: request.identifier.clone(),
            arn: self.cluster_arn(&request.region, &request.identifier),
            region: request.region.clone(),
            engine: request.engine.clone(),
            engine_version: request.engine_version.clone(),
            status: "available".to_string(),
            global_cluster_identifier: Some(request.global_cluster_identifier.clone()),
            instances: Vec::new(),
        };

        let global = state
            .global_clusters
            .get_mut(&request.global_cluster_identifier)
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "global cluster {}",
                    request.global_cluster_identifier
                ))
            })?;
        if global.engine != request.engine || global.engine_version != request.engine_version {
            return Err(ApiError::InvalidState(format!(
                "global cluster {} runs {} {}",
                global.identifier, global.engine, global.engine_version
            )));
        }
        global.members.push(GlobalClusterMember {
            db_cluster_arn: cluster.arn.clone(),
            db_cluster_identifier: cluster.identifier.clone(),
            region: cluster.region.clone(),
            is_writer: false,
        });

        state.clusters.insert(key, cluster.clone());
        Ok(cluster)
    }

    async fn create_instance(&self, request: &InstanceRequest) -> Result<(), ApiError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.calls.push(ApiCall::CreateInstance {
            identifier: request.identifier.clone(),
            region: request.region.clone(),
        });

        let key = (request.region.clone(), request.cluster_identifier.clone());
        let cluster = state.clusters.get_mut(&key).ok_or_else(|| {
            ApiError::NotFound(format!(
                "cluster {} in {}",
                request.cluster_identifier, request.region
            ))
        })?;
        if cluster.instances.contains(&request.identifier) {
            return Err(ApiError::AlreadyExists(format!(
                "instance {}",
                request.identifier
            )));
        }
        cluster.instances.push(request.identifier.clone());
        Ok(())
    }

    async fn remove_from_global_cluster(
        &self,
        global_cluster_identifier: &str,
        cluster_arn: &str,
    ) -> Result<(), ApiError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.calls.push(ApiCall::RemoveFromGlobalCluster {
            global: global_cluster_identifier.to_string(),
            cluster_arn: cluster_arn.to_string(),
        });

        let global = state
            .global_clusters
            .get_mut(global_cluster_identifier)
            .ok_or_else(|| {
                ApiError::NotFound(format!("global cluster {global_cluster_identifier}"))
            })?;
        let before = global.members.len();
        global.members.retain(|m| m.db_cluster_arn != cluster_arn);
        if global.members.len() == before {
            return Err(ApiError::NotFound(format!(
                "{cluster_arn} is not a member of {global_cluster_identifier}"
            )));
        }

        if let Some(cluster) = state.clusters.values_mut().find(|c| c.arn == cluster_arn) {
            cluster.global_cluster_identifier = None;
        }
        Ok(())
    }

    async fn delete_global_cluster(&self, identifier: &str) -> Result<(), ApiError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.calls.push(ApiCall::DeleteGlobalCluster {
            identifier: identifier.to_string(),
        });

        match state.global_clusters.get(identifier) {
            None => Err(ApiError::NotFound(format!("global cluster {identifier}"))),
            Some(global) if !global.members.is_empty() => Err(ApiError::InvalidState(format!(
                "global cluster {identifier} still has {} members",
                global.members.len()
            ))),
            Some(_) => {
                state.global_clusters.remove(identifier);
                Ok(())
            }
        }
    }
}
