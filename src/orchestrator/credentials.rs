//! Credential resolution
//!
//! Turns the sparse username/password/database/time zone props into the
//! values the cluster is declared with. Without a password, a managed secret
//! is declared and the credentials become dynamic references into it.

use serde_json::Value;

use crate::orchestrator::error::Result;
use crate::props::{
    DEFAULT_DATABASE_NAME, DEFAULT_TIME_ZONE, DEFAULT_USERNAME, GlobalAuroraMasterProps,
};
use crate::resources::common::{child_path, logical_id};
use crate::resources::secret::{generate_database_secret, generate_secret_attachment};
use crate::template::Declarations;
use crate::template::intrinsic::secret_field;

/// Where the master password comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordSource {
    /// Supplied by the caller and written into the template as is
    Literal(String),
    /// Generated by Secrets Manager at deploy time
    ManagedSecret { secret_logical_id: String },
}

/// Effective credentials of the primary cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSet {
    pub username: String,
    pub password: PasswordSource,
    pub database_name: String,
    pub time_zone: String,
}

impl CredentialSet {
    /// Value for the cluster's `MasterUsername`
    pub fn username_value(&self) -> Value {
        match &self.password {
            PasswordSource::Literal(_) => Value::String(self.username.clone()),
            PasswordSource::ManagedSecret { secret_logical_id } => {
                secret_field(secret_logical_id, "username")
            }
        }
    }

    /// Value for the cluster's `MasterUserPassword`
    pub fn password_value(&self) -> Value {
        match &self.password {
            PasswordSource::Literal(password) => Value::String(password.clone()),
            PasswordSource::ManagedSecret { secret_logical_id } => {
                secret_field(secret_logical_id, "password")
            }
        }
    }

    pub fn secret_logical_id(&self) -> Option<&str> {
        match &self.password {
            PasswordSource::ManagedSecret { secret_logical_id } => Some(secret_logical_id),
            PasswordSource::Literal(_) => None,
        }
    }
}

/// Resolved credentials plus the declarations they need
#[derive(Debug)]
pub struct ResolvedCredentials {
    pub credentials: CredentialSet,
    pub declarations: Declarations,
}

/// Resolve credentials for the cluster declared as `cluster_logical_id`
///
/// The secret attachment is only declared with a managed secret; it needs
/// the cluster's logical id to record host and port in the secret.
pub fn resolve_credentials(
    construct_id: &str,
    path: &[&str],
    props: &GlobalAuroraMasterProps,
    cluster_logical_id: &str,
) -> Result<ResolvedCredentials> {
    let username = props
        .db_user_name
        .clone()
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
    let database_name = props
        .default_database_name
        .clone()
        .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());
    let time_zone = props
        .time_zone
        .clone()
        .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());

    let mut declarations = Declarations::new();
    let password = match &props.rds_password {
        Some(password) => PasswordSource::Literal(password.clone()),
        None => {
            let secret_logical_id = logical_id(&child_path(path, "RDSClusterSecret"));
            declarations.resource(
                secret_logical_id.clone(),
                generate_database_secret(construct_id, &username)?,
            );
            declarations.resource(
                logical_id(&child_path(path, "RDSClusterSecretAttachment")),
                generate_secret_attachment(&secret_logical_id, cluster_logical_id)?,
            );
            tracing::debug!(secret = %secret_logical_id, "Declaring managed master secret");
            PasswordSource::ManagedSecret { secret_logical_id }
        }
    };

    Ok(ResolvedCredentials {
        credentials: CredentialSet {
            username,
            password,
            database_name,
            time_zone,
        },
        declarations,
    })
}
