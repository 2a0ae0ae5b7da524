//! Prerequisites of a secondary region
//!
//! A secondary region only needs a network and a database subnet group
//! before a regional cluster can be attached there. No cluster is declared.

use tracing::info;

use crate::orchestrator::context::Context;
use crate::orchestrator::error::Result;
use crate::orchestrator::network::resolve_network;
use crate::props::{GlobalAuroraSlaveInfraProps, SubnetType};
use crate::resources::common::{child_path, logical_id};
use crate::resources::subnet_group::generate_subnet_group;
use crate::template::intrinsic::reference;
use crate::template::{Declarations, Output, Stack};

/// Network and subnet group prepared in a secondary region
#[derive(Debug, Clone)]
pub struct GlobalAuroraSlaveInfra {
    region: String,
    subnet_type: SubnetType,
    subnet_group_logical_id: String,
    subnet_group_name: Option<String>,
}

impl GlobalAuroraSlaveInfra {
    /// Declare the secondary prerequisites with the default region table
    pub fn build(stack: &mut Stack, id: &str, props: &GlobalAuroraSlaveInfraProps) -> Result<Self> {
        Self::build_with(&Context::default(), stack, id, props)
    }

    pub fn build_with(
        ctx: &Context,
        stack: &mut Stack,
        id: &str,
        props: &GlobalAuroraSlaveInfraProps,
    ) -> Result<Self> {
        ctx.regions.ensure_supported(stack.region())?;

        let path = [id];
        let network = resolve_network(id, &path, props.vpc.as_ref(), props.subnet_type)?;
        let subnet_group_logical_id = logical_id(&child_path(&path, "SubnetGroup"));

        let mut declarations = Declarations::new();
        declarations.resource(
            subnet_group_logical_id.clone(),
            generate_subnet_group(
                id,
                network.subnet_type,
                network.subnet_ids,
                props.subnet_group_name.as_deref(),
            )?,
        );
        declarations.extend(network.declarations);
        declarations.output(
            logical_id(&child_path(&path, "SubnetGroupName")),
            Output {
                description: Some("Database subnet group for the secondary cluster".to_string()),
                value: reference(&subnet_group_logical_id),
            },
        );

        stack.apply(declarations)?;

        info!(
            stack = %stack.name(),
            region = %stack.region(),
            subnet_type = %network.subnet_type,
            "Declared secondary region infrastructure"
        );

        Ok(Self {
            region: stack.region().to_string(),
            subnet_type: network.subnet_type,
            subnet_group_logical_id,
            subnet_group_name: props.subnet_group_name.clone(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn subnet_type(&self) -> SubnetType {
        self.subnet_type
    }

    pub fn subnet_group_logical_id(&self) -> &str {
        &self.subnet_group_logical_id
    }

    /// Explicit subnet group name, when one was requested
    pub fn subnet_group_name(&self) -> Option<&str> {
        self.subnet_group_name.as_deref()
    }
}
