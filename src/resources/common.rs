//! Common utilities for resource generation
//!
//! This module provides shared functions and constants used across
//! all resource generators to ensure consistency and reduce duplication.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Tool name recorded on every tagged resource
pub const MANAGED_BY: &str = "global-aurora-rds";

/// Tag key carrying the construct id that declared a resource
pub const CONSTRUCT_TAG: &str = "global-aurora-rds:construct";

/// Generate a stable logical id from a construct path
///
/// The path components are concatenated (non-alphanumeric characters
/// removed) and suffixed with the first 8 hex digits of a SHA-256 over the
/// `/`-joined path, so that `["A", "BC"]` and `["AB", "C"]` never collide.
pub fn logical_id(path: &[&str]) -> String {
    let readable: String = path
        .iter()
        .flat_map(|c| c.chars())
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let digest = Sha256::digest(path.join("/").as_bytes());
    let suffix = hex::encode_upper(&digest[..4]);
    format!("{readable}{suffix}")
}

/// Extend a construct path with one more component
pub fn child_path<'a>(path: &[&'a str], name: &'a str) -> Vec<&'a str> {
    let mut child = path.to_vec();
    child.push(name);
    child
}

/// Longest RDS cluster, global cluster or instance identifier
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Turn an arbitrary name into a valid RDS identifier
///
/// RDS identifiers are lowercase letters, digits and single hyphens, start
/// with a letter, do not end with a hyphen, and are at most 63 characters.
pub fn physical_name(parts: &[&str]) -> String {
    let mut name = String::new();
    for c in parts.join("-").chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.is_empty() && !name.ends_with('-') {
            name.push('-');
        }
    }

    if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        name.insert_str(0, "db-");
    }
    name.truncate(MAX_IDENTIFIER_LENGTH);
    while name.ends_with('-') {
        name.pop();
    }
    name
}

/// Append `suffix` to an RDS identifier, shortening the base to stay in bounds
pub fn suffixed_name(base: &str, suffix: &str) -> String {
    let mut name = base.to_string();
    name.truncate(MAX_IDENTIFIER_LENGTH.saturating_sub(suffix.len()));
    while name.ends_with('-') {
        name.pop();
    }
    name.push_str(suffix);
    name
}

/// A resource tag
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Generate standard tags for every resource a construct declares
pub fn standard_tags(construct_id: &str) -> Vec<Tag> {
    vec![
        Tag::new(CONSTRUCT_TAG, construct_id),
        Tag::new("managed-by", MANAGED_BY),
    ]
}

/// Standard tags plus a `Name` tag
pub fn named_tags(construct_id: &str, name: &str) -> Vec<Tag> {
    let mut tags = vec![Tag::new("Name", name)];
    tags.extend(standard_tags(construct_id));
    tags
}
