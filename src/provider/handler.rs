//! Custom resource request handling
//!
//! Each request is inspected before any mutating call, so re-sending the same
//! request is a no-op once its effect is in place. Failures are reported in
//! the response and never retried or rolled back here.

use std::collections::BTreeMap;

use tracing::{error, info, warn};

use crate::provider::api::{
    ClusterDescription, GlobalClusterApi, GlobalClusterDescription, InstanceRequest,
    SecondaryClusterRequest,
};
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::event::{CustomResourceRequest, CustomResourceResponse, RequestType};
use crate::provider::task::{AttachTask, LifecycleTask, UpgradeTask};
use crate::resources::cluster::instance_identifier;

/// Successful outcome of a request
#[derive(Debug, Clone, PartialEq, Eq)]
struct Outcome {
    physical_resource_id: String,
    data: BTreeMap<String, String>,
}

/// Executes lifecycle tasks against a [`GlobalClusterApi`]
#[derive(Debug)]
pub struct LifecycleProvider<A> {
    api: A,
}

impl<A: GlobalClusterApi> LifecycleProvider<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Handle one custom resource request
    pub async fn handle(&self, request: &CustomResourceRequest) -> CustomResourceResponse {
        match self.execute(request).await {
            Ok(outcome) => {
                info!(
                    request_type = %request.request_type,
                    resource_type = %request.resource_type,
                    logical_id = %request.logical_resource_id,
                    physical_id = %outcome.physical_resource_id,
                    "Lifecycle request succeeded"
                );
                CustomResourceResponse::success(request, outcome.physical_resource_id, outcome.data)
            }
            Err(e) => {
                error!(
                    request_type = %request.request_type,
                    resource_type = %request.resource_type,
                    logical_id = %request.logical_resource_id,
                    retryable = e.is_retryable(),
                    error = %e,
                    "Lifecycle request failed"
                );
                CustomResourceResponse::failed(request, e.to_string())
            }
        }
    }

    async fn execute(&self, request: &CustomResourceRequest) -> ProviderResult<Outcome> {
        let task =
            match LifecycleTask::from_properties(&request.resource_type, &request.resource_properties) {
                Ok(task) => task,
                // A resource whose create never parsed has nothing to clean up
                Err(ProviderError::InvalidProperties(e))
                    if request.request_type == RequestType::Delete =>
                {
                    warn!(error = %e, "Deleting resource with unreadable properties");
                    return Ok(Outcome {
                        physical_resource_id: request
                            .physical_resource_id
                            .clone()
                            .unwrap_or_else(|| request.logical_resource_id.clone()),
                        data: BTreeMap::new(),
                    });
                }
                Err(e) => return Err(e),
            };

        info!(
            request_type = %request.request_type,
            task = %task.idempotency_key(),
            "Handling lifecycle request"
        );

        match (request.request_type, task) {
            (RequestType::Create | RequestType::Update, LifecycleTask::Upgrade(task)) => {
                self.upgrade(&task).await
            }
            (RequestType::Create | RequestType::Update, LifecycleTask::Attach(task)) => {
                self.attach(&task).await
            }
            (RequestType::Delete, LifecycleTask::Upgrade(task)) => {
                self.delete_global_cluster(&task).await
            }
            (RequestType::Delete, LifecycleTask::Attach(task)) => self.detach(&task).await,
        }
    }

    /// Promote the source cluster into a new global cluster
    async fn upgrade(&self, task: &UpgradeTask) -> ProviderResult<Outcome> {
        let source = self
            .api
            .describe_cluster(&task.source_region, &task.source_db_cluster_identifier)
            .await?
            .ok_or_else(|| ProviderError::SourceClusterNotFound {
                identifier: task.source_db_cluster_identifier.clone(),
                region: task.source_region.clone(),
            })?;

        check_engine(
            &format!("cluster {}", source.identifier),
            &task.engine,
            &task.engine_version,
            &source.engine,
            &source.engine_version,
        )?;

        let existing = self
            .api
            .describe_global_cluster(&task.global_cluster_identifier)
            .await?;

        match existing {
            Some(global) => match global.writer() {
                Some(writer) if writer.db_cluster_arn == source.arn => {
                    info!(
                        global_cluster = %global.identifier,
                        "Cluster is already the primary of the global cluster"
                    );
                }
                Some(writer) => {
                    return Err(ProviderError::Conflict(format!(
                        "global cluster {} already has primary {}",
                        global.identifier, writer.db_cluster_identifier
                    )));
                }
                None => {
                    return Err(ProviderError::Conflict(format!(
                        "global cluster {} exists without a primary",
                        global.identifier
                    )));
                }
            },
            None => {
                if let Some(other) = &source.global_cluster_identifier {
                    return Err(ProviderError::Conflict(format!(
                        "cluster {} already belongs to global cluster {other}",
                        source.identifier
                    )));
                }
                self.api
                    .create_global_cluster(&task.global_cluster_identifier, &source)
                    .await?;
                info!(
                    global_cluster = %task.global_cluster_identifier,
                    source = %source.identifier,
                    "Created global cluster"
                );
            }
        }

        Ok(Outcome {
            physical_resource_id: task.global_cluster_identifier.clone(),
            data: BTreeMap::from([
                (
                    "GlobalClusterIdentifier".to_string(),
                    task.global_cluster_identifier.clone(),
                ),
                ("SourceDBClusterArn".to_string(), source.arn),
            ]),
        })
    }

    /// Create the secondary cluster (and any missing instances) in the target region
    async fn attach(&self, task: &AttachTask) -> ProviderResult<Outcome> {
        let global = self.require_global_cluster(&task.global_cluster_identifier).await?;

        check_engine(
            &format!("global cluster {}", global.identifier),
            &global.engine,
            &global.engine_version,
            &task.engine,
            &task.engine_version,
        )?;

        if let Some(member) = global.member_in(&task.region)
            && member.db_cluster_identifier != task.db_cluster_identifier
        {
            return Err(ProviderError::Conflict(if member.is_writer {
                format!(
                    "region {} hosts the primary of global cluster {}",
                    task.region, global.identifier
                )
            } else {
                format!(
                    "global cluster {} already has cluster {} in {}",
                    global.identifier, member.db_cluster_identifier, task.region
                )
            }));
        }

        let cluster = match self
            .api
            .describe_cluster(&task.region, &task.db_cluster_identifier)
            .await?
        {
            Some(cluster)
                if cluster.global_cluster_identifier.as_deref()
                    == Some(task.global_cluster_identifier.as_str()) =>
            {
                info!(
                    cluster = %cluster.identifier,
                    region = %task.region,
                    "Cluster is already a member of the global cluster"
                );
                cluster
            }
            Some(cluster) => {
                return Err(ProviderError::Conflict(format!(
                    "cluster {} already exists in {} outside global cluster {}",
                    cluster.identifier, task.region, task.global_cluster_identifier
                )));
            }
            None => {
                let cluster = self
                    .api
                    .create_secondary_cluster(&SecondaryClusterRequest {
                        identifier: task.db_cluster_identifier.clone(),
                        region: task.region.clone(),
                        global_cluster_identifier: task.global_cluster_identifier.clone(),
                        engine: task.engine.clone(),
                        engine_version: task.engine_version.clone(),
                        db_subnet_group_name: task.db_subnet_group_name.clone(),
                    })
                    .await?;
                info!(
                    cluster = %cluster.identifier,
                    region = %task.region,
                    global_cluster = %task.global_cluster_identifier,
                    "Created secondary cluster"
                );
                cluster
            }
        };

        self.ensure_instances(task, &cluster).await?;

        Ok(Outcome {
            physical_resource_id: cluster.identifier.clone(),
            data: BTreeMap::from([
                ("DBClusterArn".to_string(), cluster.arn),
                ("DBClusterIdentifier".to_string(), cluster.identifier),
                (
                    "GlobalClusterIdentifier".to_string(),
                    task.global_cluster_identifier.clone(),
                ),
            ]),
        })
    }

    async fn ensure_instances(
        &self,
        task: &AttachTask,
        cluster: &ClusterDescription,
    ) -> ProviderResult<()> {
        for ordinal in 1..=task.instance_count {
            let identifier = instance_identifier(&cluster.identifier, ordinal);
            if cluster.instances.contains(&identifier) {
                continue;
            }
            self.api
                .create_instance(&InstanceRequest {
                    identifier,
                    cluster_identifier: cluster.identifier.clone(),
                    region: task.region.clone(),
                    instance_class: task.db_instance_class.clone(),
                    engine: task.engine.clone(),
                })
                .await?;
        }
        Ok(())
    }

    /// Detach the secondary; the standalone cluster is left for the operator
    async fn detach(&self, task: &AttachTask) -> ProviderResult<Outcome> {
        let outcome = Outcome {
            physical_resource_id: task.db_cluster_identifier.clone(),
            data: BTreeMap::new(),
        };

        let Some(global) = self
            .api
            .describe_global_cluster(&task.global_cluster_identifier)
            .await?
        else {
            return Ok(outcome);
        };
        let Some(cluster) = self
            .api
            .describe_cluster(&task.region, &task.db_cluster_identifier)
            .await?
        else {
            return Ok(outcome);
        };

        if global.has_member(&cluster.arn) {
            self.api
                .remove_from_global_cluster(&global.identifier, &cluster.arn)
                .await?;
            warn!(
                cluster = %cluster.identifier,
                region = %task.region,
                "Detached secondary cluster; it keeps running as a standalone cluster"
            );
        }
        Ok(outcome)
    }

    /// Remove the primary and delete the global cluster
    async fn delete_global_cluster(&self, task: &UpgradeTask) -> ProviderResult<Outcome> {
        let outcome = Outcome {
            physical_resource_id: task.global_cluster_identifier.clone(),
            data: BTreeMap::new(),
        };

        let Some(global) = self
            .api
            .describe_global_cluster(&task.global_cluster_identifier)
            .await?
        else {
            return Ok(outcome);
        };

        let secondaries = global.secondaries().count();
        if secondaries > 0 {
            return Err(ProviderError::Conflict(format!(
                "global cluster {} still has {secondaries} secondary clusters",
                global.identifier
            )));
        }

        if let Some(writer) = global.writer() {
            self.api
                .remove_from_global_cluster(&global.identifier, &writer.db_cluster_arn)
                .await?;
        }
        self.api.delete_global_cluster(&global.identifier).await?;
        info!(global_cluster = %global.identifier, "Deleted global cluster");
        Ok(outcome)
    }

    async fn require_global_cluster(&self, identifier: &str) -> ProviderResult<GlobalClusterDescription> {
        self.api
            .describe_global_cluster(identifier)
            .await?
            .ok_or_else(|| ProviderError::GlobalClusterNotFound(identifier.to_string()))
    }
}

fn check_engine(
    context: &str,
    expected_engine: &str,
    expected_version: &str,
    actual_engine: &str,
    actual_version: &str,
) -> ProviderResult<()> {
    if expected_engine == actual_engine && expected_version == actual_version {
        return Ok(());
    }
    Err(ProviderError::EngineMismatch {
        context: context.to_string(),
        expected: format!("{expected_engine} {expected_version}"),
        actual: format!("{actual_engine} {actual_version}"),
    })
}
