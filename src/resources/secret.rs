use serde::Serialize;
use serde_json::Value;

use crate::orchestrator::error::Result;
use crate::resources::common::{Tag, standard_tags};
use crate::template::Resource;
use crate::template::intrinsic::reference;

/// Characters RDS does not accept in a master password
pub const EXCLUDED_PASSWORD_CHARACTERS: &str = " %+~`#$&*()|[]{}:;<>?!'/@\"\\";

/// Length of generated master passwords
pub const GENERATED_PASSWORD_LENGTH: u32 = 30;

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SecretProperties {
    description: String,
    generate_secret_string: GenerateSecretString,
    tags: Vec<Tag>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct GenerateSecretString {
    secret_string_template: String,
    generate_string_key: &'static str,
    password_length: u32,
    exclude_characters: &'static str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SecretTargetAttachmentProperties {
    secret_id: Value,
    target_id: Value,
    target_type: &'static str,
}

/// Generate the managed credentials secret
///
/// Secrets Manager generates the password at deploy time; the username is
/// fixed in the secret template.
pub fn generate_database_secret(construct_id: &str, username: &str) -> Result<Resource> {
    let template = serde_json::to_string(&serde_json::json!({ "username": username }))?;

    Ok(Resource::new(
        "AWS::SecretsManager::Secret",
        &SecretProperties {
            description: format!("Generated by global-aurora-rds for {construct_id}"),
            generate_secret_string: GenerateSecretString {
                secret_string_template: template,
                generate_string_key: "password",
                password_length: GENERATED_PASSWORD_LENGTH,
                exclude_characters: EXCLUDED_PASSWORD_CHARACTERS,
            },
            tags: standard_tags(construct_id),
        },
    )?)
}

/// Attach the secret to the cluster so it also records host and port
pub fn generate_secret_attachment(secret_logical_id: &str, cluster_logical_id: &str) -> Result<Resource> {
    Ok(Resource::new(
        "AWS::SecretsManager::SecretTargetAttachment",
        &SecretTargetAttachmentProperties {
            secret_id: reference(secret_logical_id),
            target_id: reference(cluster_logical_id),
            target_type: "AWS::RDS::DBCluster",
        },
    )?)
}
