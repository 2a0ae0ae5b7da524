//! Aurora cluster and instance generation

use serde::Serialize;
use serde_json::Value;

use crate::orchestrator::error::Result;
use crate::props::{ClusterEngine, InstanceType};
use crate::resources::common::{Tag, standard_tags, suffixed_name};
use crate::template::intrinsic::reference;
use crate::template::{DeletionPolicy, Resource};

/// Inputs for the primary regional cluster
#[derive(Debug, Clone)]
pub struct ClusterDefinition<'a> {
    pub construct_id: &'a str,
    pub identifier: &'a str,
    pub engine: &'a ClusterEngine,
    pub database_name: &'a str,
    pub master_username: Value,
    pub master_password: Value,
    pub parameter_group_name: Value,
    pub subnet_group_name: Value,
    pub security_group_ids: Vec<Value>,
    pub deletion_protection: bool,
    pub storage_encrypted: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DbClusterProperties<'a> {
    #[serde(rename = "DBClusterIdentifier")]
    identifier: &'a str,
    engine: &'static str,
    engine_version: &'a str,
    database_name: &'a str,
    master_username: Value,
    master_user_password: Value,
    #[serde(rename = "DBClusterParameterGroupName")]
    parameter_group_name: Value,
    #[serde(rename = "DBSubnetGroupName")]
    subnet_group_name: Value,
    vpc_security_group_ids: Vec<Value>,
    deletion_protection: bool,
    storage_encrypted: bool,
    copy_tags_to_snapshot: bool,
    tags: Vec<Tag>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DbInstanceProperties {
    #[serde(rename = "DBClusterIdentifier")]
    cluster_identifier: Value,
    #[serde(rename = "DBInstanceIdentifier")]
    instance_identifier: String,
    #[serde(rename = "DBInstanceClass")]
    instance_class: &'static str,
    engine: &'static str,
    #[serde(rename = "DBSubnetGroupName")]
    subnet_group_name: Value,
    publicly_accessible: bool,
    tags: Vec<Tag>,
}

/// Generate the regional database cluster
///
/// Clusters are snapshotted rather than dropped when removed from the template.
pub fn generate_db_cluster(def: &ClusterDefinition<'_>) -> Result<Resource> {
    let resource = Resource::new(
        "AWS::RDS::DBCluster",
        &DbClusterProperties {
            identifier: def.identifier,
            engine: def.engine.engine_name(),
            engine_version: &def.engine.version,
            database_name: def.database_name,
            master_username: def.master_username.clone(),
            master_user_password: def.master_password.clone(),
            parameter_group_name: def.parameter_group_name.clone(),
            subnet_group_name: def.subnet_group_name.clone(),
            vpc_security_group_ids: def.security_group_ids.clone(),
            deletion_protection: def.deletion_protection,
            storage_encrypted: def.storage_encrypted,
            copy_tags_to_snapshot: true,
            tags: standard_tags(def.construct_id),
        },
    )?;
    Ok(resource.with_deletion_policy(DeletionPolicy::Snapshot))
}

/// Inputs shared by every instance of a cluster
#[derive(Debug, Clone)]
pub struct InstanceDefinition<'a> {
    pub construct_id: &'a str,
    pub cluster_logical_id: &'a str,
    pub cluster_identifier: &'a str,
    pub engine: &'a ClusterEngine,
    pub instance_type: InstanceType,
    pub subnet_group_name: Value,
    /// Must come from the same resolved visibility as the subnet group
    pub publicly_accessible: bool,
}

/// Generate the `ordinal`th instance (1-based) of the cluster
pub fn generate_db_instance(def: &InstanceDefinition<'_>, ordinal: u32) -> Result<Resource> {
    Ok(Resource::new(
        "AWS::RDS::DBInstance",
        &DbInstanceProperties {
            cluster_identifier: reference(def.cluster_logical_id),
            instance_identifier: instance_identifier(def.cluster_identifier, ordinal),
            instance_class: def.instance_type.as_str(),
            engine: def.engine.engine_name(),
            subnet_group_name: def.subnet_group_name.clone(),
            publicly_accessible: def.publicly_accessible,
            tags: standard_tags(def.construct_id),
        },
    )?
    .depends_on([def.cluster_logical_id]))
}

/// Identifier of the `ordinal`th instance (1-based) of a cluster
pub fn instance_identifier(cluster_identifier: &str, ordinal: u32) -> String {
    suffixed_name(cluster_identifier, &format!("-instance{ordinal}"))
}
