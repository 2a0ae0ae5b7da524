use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::props::engine::{ClusterEngine, InstanceType};
use crate::props::network::{SubnetType, VpcSpec};

/// Default master username
pub const DEFAULT_USERNAME: &str = "sysadmin";

/// Default name of the database created in the cluster
pub const DEFAULT_DATABASE_NAME: &str = "globaldatabase";

/// Default server time zone
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Configuration of the primary regional cluster
///
/// Every field is optional; an empty object builds a private Aurora MySQL
/// cluster with a generated password.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAuroraMasterProps {
    /// Network for the cluster (a new VPC is declared when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<VpcSpec>,

    /// Subnet visibility for the database (inferred from the VPC when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_type: Option<SubnetType>,

    /// Instance class of every cluster instance
    #[serde(default)]
    pub instance_type: InstanceType,

    /// Number of instances in the cluster
    #[serde(default = "default_instances")]
    pub instances: u32,

    /// Engine and version
    #[serde(default)]
    pub engine: ClusterEngine,

    /// Caller-owned cluster parameter group; when set, `parameters` is ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_group: Option<ParameterGroupSource>,

    /// Parameters merged over the defaults of a construct-owned parameter group
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,

    /// Master username (default "sysadmin")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_user_name: Option<String>,

    /// Master password; a managed secret is generated when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rds_password: Option<String>,

    /// Database created in the cluster (default "globaldatabase")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_database_name: Option<String>,

    /// Server time zone (default "UTC")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    #[serde(default)]
    pub deletion_protection: bool,

    #[serde(default = "default_storage_encrypted")]
    pub storage_encrypted: bool,
}

fn default_instances() -> u32 {
    2
}

fn default_storage_encrypted() -> bool {
    true
}

impl GlobalAuroraMasterProps {
    /// Props with every default applied (same as an empty JSON object)
    pub fn new() -> Self {
        Self {
            instances: default_instances(),
            storage_encrypted: default_storage_encrypted(),
            ..Default::default()
        }
    }
}

/// A cluster parameter group owned by the caller
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ParameterGroupSource {
    /// Reference a parameter group that already exists by name
    Existing { name: String },
    /// Declare this exact parameter group
    Custom(ParameterGroupSpec),
}

/// Full definition of a cluster parameter group
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterGroupSpec {
    /// Parameter group family (derived from the engine when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// Options for a secondary regional cluster
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegionalClusterOptions {
    /// Target region code
    pub region: String,

    /// Subnet group prepared in the target region
    pub db_subnet_group_name: String,

    /// Engine override (defaults to the primary's engine)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<ClusterEngine>,

    /// Instance class override (defaults to the primary's)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<InstanceType>,

    /// Instance count override (defaults to the primary's)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,

    /// Explicit cluster identifier (derived from the primary when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_cluster_identifier: Option<String>,
}

impl RegionalClusterOptions {
    pub fn new(region: &str, db_subnet_group_name: &str) -> Self {
        Self {
            region: region.to_string(),
            db_subnet_group_name: db_subnet_group_name.to_string(),
            engine: None,
            instance_type: None,
            instances: None,
            db_cluster_identifier: None,
        }
    }
}
