use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::props::network::{SubnetType, VpcSpec};

/// Configuration of the prerequisites for a secondary region
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAuroraSlaveInfraProps {
    /// Network for the secondary cluster (a new VPC is declared when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<VpcSpec>,

    /// Subnet visibility for the database (private unless the VPC is all public)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_type: Option<SubnetType>,

    /// Explicit subnet group name, so other stacks can refer to it before deploy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_group_name: Option<String>,
}
