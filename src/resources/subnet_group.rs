use serde::Serialize;
use serde_json::Value;

use crate::orchestrator::error::Result;
use crate::props::SubnetType;
use crate::resources::common::{Tag, standard_tags};
use crate::template::Resource;

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DbSubnetGroupProperties {
    #[serde(rename = "DBSubnetGroupDescription")]
    description: String,

    #[serde(rename = "DBSubnetGroupName", skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    subnet_ids: Vec<Value>,
    tags: Vec<Tag>,
}

/// Description recorded on a database subnet group of the given visibility
pub fn subnet_group_description(subnet_type: SubnetType) -> String {
    format!("{subnet_type} Subnets for database")
}

/// Generate the database subnet group over the selected subnets
pub fn generate_subnet_group(
    construct_id: &str,
    subnet_type: SubnetType,
    subnet_ids: Vec<Value>,
    name: Option<&str>,
) -> Result<Resource> {
    Ok(Resource::new(
        "AWS::RDS::DBSubnetGroup",
        &DbSubnetGroupProperties {
            description: subnet_group_description(subnet_type),
            name: name.map(str::to_string),
            subnet_ids,
            tags: standard_tags(construct_id),
        },
    )?)
}
