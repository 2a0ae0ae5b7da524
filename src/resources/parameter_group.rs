use std::collections::BTreeMap;

use serde::Serialize;

use crate::orchestrator::error::Result;
use crate::resources::common::{Tag, standard_tags};
use crate::template::Resource;

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct ClusterParameterGroupProperties<'a> {
    description: &'a str,
    family: &'a str,
    parameters: &'a BTreeMap<String, String>,
    tags: Vec<Tag>,
}

/// Generate a cluster parameter group
pub fn generate_cluster_parameter_group(
    construct_id: &str,
    family: &str,
    description: &str,
    parameters: &BTreeMap<String, String>,
) -> Result<Resource> {
    Ok(Resource::new(
        "AWS::RDS::DBClusterParameterGroup",
        &ClusterParameterGroupProperties {
            description,
            family,
            parameters,
            tags: standard_tags(construct_id),
        },
    )?)
}
