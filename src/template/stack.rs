use std::collections::{BTreeMap, BTreeSet};

use crate::orchestrator::error::{Error, Result};
use crate::template::resource::{
    Declarations, Output, Parameter, Resource, TEMPLATE_FORMAT_VERSION, Template,
};

/// Account and region a stack deploys into
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    pub account: Option<String>,
    pub region: String,
}

impl Environment {
    pub fn new(account: Option<&str>, region: &str) -> Self {
        Self {
            account: account.map(str::to_string),
            region: region.to_string(),
        }
    }
}

/// One deployable unit: the declarations destined for a single account/region
#[derive(Clone, Debug)]
pub struct Stack {
    name: String,
    env: Environment,
    description: Option<String>,
    parameters: BTreeMap<String, Parameter>,
    resources: BTreeMap<String, Resource>,
    outputs: BTreeMap<String, Output>,
}

impl Stack {
    pub fn new(name: &str, env: Environment) -> Self {
        Self {
            name: name.to_string(),
            env,
            description: None,
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.env.region
    }

    pub fn account(&self) -> Option<&str> {
        self.env.account.as_deref()
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Apply a batch of declarations
    ///
    /// Either every declaration is added or none is: logical ids are checked
    /// against the stack and within the batch before anything is inserted.
    /// A parameter that is already declared with an identical definition is
    /// shared rather than rejected.
    pub fn apply(&mut self, declarations: Declarations) -> Result<()> {
        let mut seen = BTreeSet::new();

        for (id, parameter) in &declarations.parameters {
            if let Some(existing) = self.parameters.get(id)
                && existing != parameter
            {
                return Err(Error::DuplicateLogicalId(id.clone()));
            }
            if !seen.insert(id.as_str()) {
                return Err(Error::DuplicateLogicalId(id.clone()));
            }
        }

        for (id, _) in &declarations.resources {
            if self.resources.contains_key(id)
                || self.parameters.contains_key(id)
                || !seen.insert(id.as_str())
            {
                return Err(Error::DuplicateLogicalId(id.clone()));
            }
        }

        let mut output_ids = BTreeSet::new();
        for (id, _) in &declarations.outputs {
            if self.outputs.contains_key(id) || !output_ids.insert(id.as_str()) {
                return Err(Error::DuplicateLogicalId(id.clone()));
            }
        }

        tracing::debug!(
            stack = %self.name,
            resources = declarations.resources.len(),
            outputs = declarations.outputs.len(),
            "Applying declarations"
        );

        self.parameters.extend(declarations.parameters);
        self.resources.extend(declarations.resources);
        self.outputs.extend(declarations.outputs);
        Ok(())
    }

    /// Declare a single resource
    pub fn add_resource(&mut self, logical_id: &str, resource: Resource) -> Result<()> {
        let mut declarations = Declarations::new();
        declarations.resource(logical_id, resource);
        self.apply(declarations)
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// All resources of a given CloudFormation type, ordered by logical id
    pub fn resources_of_type<'a>(
        &'a self,
        type_: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Resource)> + 'a {
        self.resources().filter(move |(_, r)| r.type_ == type_)
    }

    pub fn output(&self, logical_id: &str) -> Option<&Output> {
        self.outputs.get(logical_id)
    }

    pub fn parameter(&self, logical_id: &str) -> Option<&Parameter> {
        self.parameters.get(logical_id)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.outputs.is_empty() && self.parameters.is_empty()
    }

    /// Render the stack as a template document
    pub fn to_template(&self) -> Template {
        Template {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            resources: self.resources.clone(),
            outputs: self.outputs.clone(),
        }
    }

    /// Render the stack as pretty-printed template JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_template())?)
    }
}
