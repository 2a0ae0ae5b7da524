//! Lifecycle provider and custom resource generation
//!
//! The promote/attach actions run in a Lambda function outside the declaring
//! process. The stack declares the function once, then one custom resource
//! per lifecycle task; the task's fields become the resource's properties.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::orchestrator::error::{Error, Result};
use crate::provider::{ATTACH_RESOURCE_TYPE, AttachTask, UPGRADE_RESOURCE_TYPE, UpgradeTask};
use crate::resources::common::{Tag, child_path, logical_id, standard_tags};
use crate::template::intrinsic::{get_att, reference, sub};
use crate::template::{Declarations, Parameter, Resource};

/// Template parameter naming the bucket that holds the provider bundle
pub const CODE_BUCKET_PARAMETER: &str = "GlobalClusterProviderCodeBucket";

/// Template parameter naming the provider bundle's object key
pub const CODE_KEY_PARAMETER: &str = "GlobalClusterProviderCodeKey";

/// Attribute of the upgrade resource holding the global cluster identifier
pub const GLOBAL_CLUSTER_ATTRIBUTE: &str = "GlobalClusterIdentifier";

/// Creating secondaries and their instances can take most of the Lambda limit
const PROVIDER_TIMEOUT_SECONDS: u32 = 900;

const PROVIDER_ACTIONS: &[&str] = &[
    "rds:CreateGlobalCluster",
    "rds:DeleteGlobalCluster",
    "rds:DescribeGlobalClusters",
    "rds:RemoveFromGlobalCluster",
    "rds:CreateDBCluster",
    "rds:DescribeDBClusters",
    "rds:CreateDBInstance",
    "rds:DescribeDBInstances",
    "rds:AddTagsToResource",
];

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct RoleProperties {
    assume_role_policy_document: Value,
    managed_policy_arns: Vec<Value>,
    policies: Vec<Value>,
    tags: Vec<Tag>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct FunctionProperties {
    description: &'static str,
    runtime: &'static str,
    handler: &'static str,
    architectures: Vec<&'static str>,
    code: FunctionCode,
    role: Value,
    timeout: u32,
    tags: Vec<Tag>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct FunctionCode {
    s3_bucket: Value,
    s3_key: Value,
}

/// Result of declaring the lifecycle provider
#[derive(Debug)]
pub struct ProviderDeclaration {
    pub function_logical_id: String,
    pub role_logical_id: String,
    /// `ServiceToken` every lifecycle custom resource points at
    pub service_token: Value,
    pub declarations: Declarations,
}

/// Generate the provider function, its execution role and code parameters
pub fn generate_provider(construct_id: &str, path: &[&str]) -> Result<ProviderDeclaration> {
    let provider_path = child_path(path, "GlobalClusterProvider");
    let role_logical_id = logical_id(&child_path(&provider_path, "Role"));
    let function_logical_id = logical_id(&child_path(&provider_path, "Function"));

    let mut declarations = Declarations::new();
    declarations.parameter(
        CODE_BUCKET_PARAMETER,
        Parameter {
            type_: "String".to_string(),
            description: Some("S3 bucket holding the global cluster provider bundle".to_string()),
            default: None,
        },
    );
    declarations.parameter(
        CODE_KEY_PARAMETER,
        Parameter {
            type_: "String".to_string(),
            description: Some("S3 key of the global cluster provider bundle".to_string()),
            default: None,
        },
    );

    declarations.resource(
        role_logical_id.clone(),
        Resource::new(
            "AWS::IAM::Role",
            &RoleProperties {
                assume_role_policy_document: json!({
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": "lambda.amazonaws.com" },
                        "Action": "sts:AssumeRole"
                    }]
                }),
                managed_policy_arns: vec![sub(
                    "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole",
                )],
                policies: vec![json!({
                    "PolicyName": "GlobalClusterLifecycle",
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Action": PROVIDER_ACTIONS,
                            "Resource": "*"
                        }]
                    }
                })],
                tags: standard_tags(construct_id),
            },
        )?,
    );

    declarations.resource(
        function_logical_id.clone(),
        Resource::new(
            "AWS::Lambda::Function",
            &FunctionProperties {
                description: "Promotes regional Aurora clusters and attaches secondaries",
                runtime: "provided.al2023",
                handler: "bootstrap",
                architectures: vec!["arm64"],
                code: FunctionCode {
                    s3_bucket: reference(CODE_BUCKET_PARAMETER),
                    s3_key: reference(CODE_KEY_PARAMETER),
                },
                role: get_att(&role_logical_id, "Arn"),
                timeout: PROVIDER_TIMEOUT_SECONDS,
                tags: standard_tags(construct_id),
            },
        )?
        .depends_on([role_logical_id.as_str()]),
    );

    Ok(ProviderDeclaration {
        service_token: get_att(&function_logical_id, "Arn"),
        function_logical_id,
        role_logical_id,
        declarations,
    })
}

/// Generate the "upgrade to global" custom resource
pub fn generate_upgrade_resource(
    task: &UpgradeTask,
    service_token: Value,
    depends_on: &[String],
) -> Result<Resource> {
    let properties = task_properties(task, service_token)?;
    Ok(Resource::new(UPGRADE_RESOURCE_TYPE, &properties)?.depends_on(depends_on.iter().cloned()))
}

/// Generate the "add regional cluster" custom resource
///
/// The global cluster identifier is read from the upgrade resource, so the
/// attach can never run before the promotion has produced it.
pub fn generate_attach_resource(
    task: &AttachTask,
    service_token: Value,
    upgrade_logical_id: &str,
) -> Result<Resource> {
    let mut properties = task_properties(task, service_token)?;
    properties.insert(
        GLOBAL_CLUSTER_ATTRIBUTE.to_string(),
        get_att(upgrade_logical_id, GLOBAL_CLUSTER_ATTRIBUTE),
    );
    Ok(Resource::new(ATTACH_RESOURCE_TYPE, &properties)?.depends_on([upgrade_logical_id]))
}

fn task_properties<T: Serialize>(task: &T, service_token: Value) -> Result<Map<String, Value>> {
    match serde_json::to_value(task)? {
        Value::Object(mut properties) => {
            properties.insert("ServiceToken".to_string(), service_token);
            Ok(properties)
        }
        other => Err(Error::InvalidConfig(format!(
            "lifecycle task serialized to a non-object: {other}"
        ))),
    }
}
