use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Template format version emitted in every rendered template
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// A single declared resource
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub properties: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,
}

impl Resource {
    /// Create a resource from any serializable property struct
    pub fn new<P: Serialize>(type_: &str, properties: &P) -> serde_json::Result<Self> {
        Ok(Self {
            type_: type_.to_string(),
            properties: serde_json::to_value(properties)?,
            depends_on: Vec::new(),
            deletion_policy: None,
        })
    }

    pub fn depends_on<I, S>(mut self, logical_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(logical_ids.into_iter().map(Into::into));
        self
    }

    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = Some(policy);
        self
    }

    /// Look up a top-level property
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// What CloudFormation does with a resource when it leaves the template
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
}

/// A stack output
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub value: Value,
}

/// A template parameter supplied at deploy time
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A batch of declarations applied to a stack in one step
///
/// Resolvers and generators collect into a batch first so that a failed
/// build never leaves a partially declared stack.
#[derive(Clone, Debug, Default)]
pub struct Declarations {
    pub parameters: Vec<(String, Parameter)>,
    pub resources: Vec<(String, Resource)>,
    pub outputs: Vec<(String, Output)>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(&mut self, logical_id: impl Into<String>, resource: Resource) {
        self.resources.push((logical_id.into(), resource));
    }

    pub fn output(&mut self, logical_id: impl Into<String>, output: Output) {
        self.outputs.push((logical_id.into(), output));
    }

    pub fn parameter(&mut self, logical_id: impl Into<String>, parameter: Parameter) {
        self.parameters.push((logical_id.into(), parameter));
    }

    /// Move everything from `other` into this batch
    pub fn extend(&mut self, other: Declarations) {
        self.parameters.extend(other.parameters);
        self.resources.extend(other.resources);
        self.outputs.extend(other.outputs);
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.resources.is_empty() && self.outputs.is_empty()
    }
}

/// Rendered CloudFormation template document
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Parameters", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,

    #[serde(rename = "Resources", default)]
    pub resources: BTreeMap<String, Resource>,

    #[serde(rename = "Outputs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}
