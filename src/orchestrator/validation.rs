//! Validation of build-time props
//!
//! Every check runs before anything is declared, so a rejected build leaves
//! the stack untouched. The rules mirror what RDS itself accepts:
//! - master username and database name shape
//! - literal master password length and characters
//! - instance count per cluster
//! - server time zone for the engine
//! - explicit cluster identifiers

use crate::orchestrator::error::{Error, Result};
use crate::props::time_zone::is_supported_time_zone;
use crate::props::{GlobalAuroraMasterProps, RegionalClusterOptions};
use crate::resources::common::MAX_IDENTIFIER_LENGTH;

/// Minimum number of instances in a regional cluster
pub const MIN_INSTANCES: u32 = 1;

/// Maximum number of instances in a regional cluster (one writer, 15 readers)
pub const MAX_INSTANCES: u32 = 16;

pub const MAX_USERNAME_LENGTH: usize = 16;

pub const MAX_DATABASE_NAME_LENGTH: usize = 64;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters RDS rejects in a literal master password
const FORBIDDEN_PASSWORD_CHARACTERS: &[char] = &['/', '"', '@', ' '];

/// Validate the props of a primary regional cluster
pub fn validate_master_props(props: &GlobalAuroraMasterProps) -> Result<()> {
    validate_instances(props.instances)?;
    if let Some(username) = &props.db_user_name {
        validate_identifier("master username", username, MAX_USERNAME_LENGTH)?;
    }
    if let Some(database) = &props.default_database_name {
        validate_identifier("database name", database, MAX_DATABASE_NAME_LENGTH)?;
    }
    if let Some(password) = &props.rds_password {
        validate_password(password)?;
    }
    if let Some(time_zone) = &props.time_zone {
        if time_zone.trim().is_empty() {
            return Err(Error::ValidationError(
                "time zone must not be empty".to_string(),
            ));
        }
        if !is_supported_time_zone(props.engine.kind, time_zone) {
            return Err(Error::ValidationError(format!(
                "time zone {time_zone:?} is not supported by {}",
                props.engine.kind
            )));
        }
    }
    Ok(())
}

/// Validate the options of a secondary regional cluster
pub fn validate_regional_options(options: &RegionalClusterOptions) -> Result<()> {
    if options.db_subnet_group_name.trim().is_empty() {
        return Err(Error::ValidationError(format!(
            "a subnet group name is required to attach a cluster in {}",
            options.region
        )));
    }
    if let Some(instances) = options.instances {
        validate_instances(instances)?;
    }
    if let Some(identifier) = &options.db_cluster_identifier {
        validate_cluster_identifier(identifier)?;
    }
    Ok(())
}

/// RDS cluster identifiers: a lowercase letter, then lowercase letters,
/// digits and single hyphens, not ending in a hyphen
pub fn validate_cluster_identifier(identifier: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(Error::ValidationError(format!(
            "cluster identifier {identifier:?} {reason}"
        )))
    };
    if identifier.is_empty() || identifier.len() > MAX_IDENTIFIER_LENGTH {
        return invalid(&format!("must be 1 to {MAX_IDENTIFIER_LENGTH} characters"));
    }
    if !identifier.starts_with(|c: char| c.is_ascii_lowercase()) {
        return invalid("must start with a lowercase letter");
    }
    if !identifier
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return invalid("may only contain lowercase letters, digits and hyphens");
    }
    if identifier.ends_with('-') || identifier.contains("--") {
        return invalid("must not end with a hyphen or contain two in a row");
    }
    Ok(())
}

/// Validate instance count
pub fn validate_instances(instances: u32) -> Result<()> {
    if instances < MIN_INSTANCES {
        return Err(Error::ValidationError(format!(
            "instance count {} is below minimum {}",
            instances, MIN_INSTANCES
        )));
    }

    if instances > MAX_INSTANCES {
        return Err(Error::ValidationError(format!(
            "instance count {} exceeds maximum {}",
            instances, MAX_INSTANCES
        )));
    }

    Ok(())
}

/// Usernames and database names: a letter, then letters, digits or `_`
fn validate_identifier(what: &str, value: &str, max_len: usize) -> Result<()> {
    if value.is_empty() || value.len() > max_len {
        return Err(Error::ValidationError(format!(
            "{what} must be 1 to {max_len} characters: {value:?}"
        )));
    }
    if !value.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(Error::ValidationError(format!(
            "{what} must start with a letter: {value:?}"
        )));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::ValidationError(format!(
            "{what} may only contain letters, digits and underscores: {value:?}"
        )));
    }
    Ok(())
}

/// The password itself never appears in the error message
fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(Error::ValidationError(format!(
            "master password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.contains(FORBIDDEN_PASSWORD_CHARACTERS) {
        return Err(Error::ValidationError(
            "master password must not contain '/', '\"', '@' or spaces".to_string(),
        ));
    }
    Ok(())
}
