//! Lifecycle task descriptions
//!
//! A task is what the declaring side hands to the external executor: the
//! inputs of one promote/attach action plus the key that makes re-running it
//! safe. Tasks travel as custom resource properties, so the field names are
//! the property names.

use serde::{Deserialize, Deserializer, Serialize};

use crate::provider::error::{ProviderError, ProviderResult};

/// Resource type of the "upgrade to global" custom resource
pub const UPGRADE_RESOURCE_TYPE: &str = "Custom::UpgradeGlobalClusterProvider";

/// Resource type of the "add regional cluster" custom resource
pub const ATTACH_RESOURCE_TYPE: &str = "Custom::addRegionalClusterProvider";

/// Promote a standalone regional cluster into a new global cluster
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UpgradeTask {
    pub global_cluster_identifier: String,

    #[serde(rename = "SourceDBClusterIdentifier")]
    pub source_db_cluster_identifier: String,

    pub source_region: String,

    pub engine: String,

    pub engine_version: String,
}

/// Create a regional cluster in another region as a secondary of a global cluster
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AttachTask {
    pub global_cluster_identifier: String,

    #[serde(rename = "DBClusterIdentifier")]
    pub db_cluster_identifier: String,

    pub region: String,

    #[serde(rename = "DBSubnetGroupName")]
    pub db_subnet_group_name: String,

    pub engine: String,

    pub engine_version: String,

    #[serde(rename = "DBInstanceClass")]
    pub db_instance_class: String,

    /// CloudFormation passes every custom resource property as a string
    #[serde(deserialize_with = "u32_from_string_or_number")]
    pub instance_count: u32,
}

/// A lifecycle action handed to the external executor
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleTask {
    Upgrade(UpgradeTask),
    Attach(AttachTask),
}

impl LifecycleTask {
    /// Parse a task from a custom resource's type and properties
    ///
    /// Properties the task does not know about (such as `ServiceToken`) are
    /// ignored.
    pub fn from_properties(resource_type: &str, properties: &serde_json::Value) -> ProviderResult<Self> {
        match resource_type {
            UPGRADE_RESOURCE_TYPE => Ok(LifecycleTask::Upgrade(
                serde_json::from_value(properties.clone())
                    .map_err(ProviderError::InvalidProperties)?,
            )),
            ATTACH_RESOURCE_TYPE => Ok(LifecycleTask::Attach(
                serde_json::from_value(properties.clone())
                    .map_err(ProviderError::InvalidProperties)?,
            )),
            other => Err(ProviderError::UnsupportedResourceType(other.to_string())),
        }
    }

    pub fn resource_type(&self) -> &'static str {
        match self {
            LifecycleTask::Upgrade(_) => UPGRADE_RESOURCE_TYPE,
            LifecycleTask::Attach(_) => ATTACH_RESOURCE_TYPE,
        }
    }

    /// Key under which re-running the task is a no-op
    pub fn idempotency_key(&self) -> String {
        match self {
            LifecycleTask::Upgrade(task) => format!(
                "upgrade:{}:{}",
                task.source_region, task.source_db_cluster_identifier
            ),
            LifecycleTask::Attach(task) => format!(
                "attach:{}:{}:{}",
                task.global_cluster_identifier, task.region, task.db_cluster_identifier
            ),
        }
    }

    pub fn global_cluster_identifier(&self) -> &str {
        match self {
            LifecycleTask::Upgrade(task) => &task.global_cluster_identifier,
            LifecycleTask::Attach(task) => &task.global_cluster_identifier,
        }
    }
}

fn u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
