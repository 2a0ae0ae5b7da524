//! Cluster parameter group resolution

use std::collections::BTreeMap;

use serde_json::Value;

use crate::orchestrator::error::{Error, Result};
use crate::props::{ClusterEngine, GlobalAuroraMasterProps, ParameterGroupSource};
use crate::resources::common::{child_path, logical_id};
use crate::resources::parameter_group::generate_cluster_parameter_group;
use crate::template::Declarations;
use crate::template::intrinsic::reference;

/// The parameter group the cluster ends up using
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedParameterGroup {
    /// A group that already exists, referenced by name
    Existing { name: String },
    /// A group declared in the stack
    Declared {
        logical_id: String,
        family: String,
        parameters: BTreeMap<String, String>,
        /// False when the caller supplied the full definition
        owned: bool,
    },
}

impl ResolvedParameterGroup {
    /// Value for the cluster's `DBClusterParameterGroupName`
    pub fn name_value(&self) -> Value {
        match self {
            ResolvedParameterGroup::Existing { name } => Value::String(name.clone()),
            ResolvedParameterGroup::Declared { logical_id, .. } => reference(logical_id),
        }
    }

    /// Declared parameters (unknown for an existing group)
    pub fn parameters(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ResolvedParameterGroup::Existing { .. } => None,
            ResolvedParameterGroup::Declared { parameters, .. } => Some(parameters),
        }
    }
}

#[derive(Debug)]
pub struct ResolvedParameters {
    pub group: ResolvedParameterGroup,
    pub declarations: Declarations,
}

/// Parameters every construct-owned group starts from
pub fn default_parameters(engine: &ClusterEngine, time_zone: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(
        engine.kind.time_zone_parameter().to_string(),
        time_zone.to_string(),
    )])
}

/// Overlay `overrides` on `defaults`; override keys win, other defaults stay
pub fn merge_parameters(
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Resolve the cluster parameter group
///
/// A caller-owned group is used exactly as supplied and `parameters` is
/// ignored. Otherwise a group is declared from the engine defaults overlaid
/// by `parameters`.
pub fn resolve_parameter_group(
    construct_id: &str,
    path: &[&str],
    props: &GlobalAuroraMasterProps,
    time_zone: &str,
) -> Result<ResolvedParameters> {
    let engine_family = props.engine.parameter_group_family()?;
    let group_logical_id = logical_id(&child_path(path, "ClusterParameterGroup"));
    let mut declarations = Declarations::new();

    if props.parameter_group.is_some() && !props.parameters.is_empty() {
        tracing::warn!(
            ignored = ?props.parameters.keys().collect::<Vec<_>>(),
            "Parameter overrides are ignored when a parameter group is supplied"
        );
    }

    let group = match &props.parameter_group {
        Some(ParameterGroupSource::Existing { name }) => {
            if name.trim().is_empty() {
                return Err(Error::ValidationError(
                    "existing parameter group name must not be empty".to_string(),
                ));
            }
            ResolvedParameterGroup::Existing { name: name.clone() }
        }
        Some(ParameterGroupSource::Custom(spec)) => {
            let family = spec.family.clone().unwrap_or_else(|| engine_family.clone());
            if family != engine_family {
                return Err(Error::ValidationError(format!(
                    "parameter group family {family} does not match engine family {engine_family}"
                )));
            }
            let description = spec
                .description
                .clone()
                .unwrap_or_else(|| format!("{family} cluster parameters for {construct_id}"));
            declarations.resource(
                group_logical_id.clone(),
                generate_cluster_parameter_group(
                    construct_id,
                    &family,
                    &description,
                    &spec.parameters,
                )?,
            );
            ResolvedParameterGroup::Declared {
                logical_id: group_logical_id,
                family,
                parameters: spec.parameters.clone(),
                owned: false,
            }
        }
        None => {
            let parameters = merge_parameters(
                &default_parameters(&props.engine, time_zone),
                &props.parameters,
            );
            let description = format!("{engine_family} cluster parameters for {construct_id}");
            declarations.resource(
                group_logical_id.clone(),
                generate_cluster_parameter_group(
                    construct_id,
                    &engine_family,
                    &description,
                    &parameters,
                )?,
            );
            ResolvedParameterGroup::Declared {
                logical_id: group_logical_id,
                family: engine_family,
                parameters,
                owned: true,
            }
        }
    };

    Ok(ResolvedParameters {
        group,
        declarations,
    })
}
