//! Primary regional cluster and its promotion to a global database
//!
//! [`GlobalAuroraMaster::build`] is the only way to obtain a master, so a
//! regional cluster can never be attached to a global database that was not
//! declared first. Each call checks the region table and validates its input
//! before touching the stack, and applies its declarations in one batch.

use serde_json::Value;
use tracing::{info, warn};

use crate::orchestrator::context::Context;
use crate::orchestrator::credentials::{CredentialSet, resolve_credentials};
use crate::orchestrator::error::{Error, Result};
use crate::orchestrator::network::resolve_network;
use crate::orchestrator::parameter_group::{ResolvedParameterGroup, resolve_parameter_group};
use crate::orchestrator::state_machine::{
    GlobalClusterEvent, GlobalClusterPhase, GlobalClusterStateMachine, TransitionResult,
};
use crate::orchestrator::validation::{validate_master_props, validate_regional_options};
use crate::props::{
    ClusterEngine, GlobalAuroraMasterProps, InstanceType, RegionalClusterOptions, SubnetType,
};
use crate::provider::{AttachTask, UpgradeTask};
use crate::resources::cluster::{
    ClusterDefinition, InstanceDefinition, generate_db_cluster, generate_db_instance,
};
use crate::resources::common::{child_path, logical_id, physical_name, suffixed_name};
use crate::resources::custom_resource::{
    GLOBAL_CLUSTER_ATTRIBUTE, generate_attach_resource, generate_provider,
    generate_upgrade_resource,
};
use crate::resources::network::{generate_security_group, security_group_id};
use crate::resources::subnet_group::generate_subnet_group;
use crate::template::intrinsic::{get_att, reference};
use crate::template::{Declarations, Output, Stack};

/// A secondary regional cluster registered for attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionalClusterRecord {
    pub region: String,
    pub db_cluster_identifier: String,
    pub db_subnet_group_name: String,
    pub engine: ClusterEngine,
    pub instance_type: InstanceType,
    pub instances: u32,
    /// Logical id of the "add regional cluster" custom resource
    pub custom_resource_logical_id: String,
}

/// The primary regional cluster of a global database
#[derive(Debug, Clone)]
pub struct GlobalAuroraMaster {
    ctx: Context,
    id: String,
    stack_name: String,
    region: String,
    cluster_logical_id: String,
    cluster_identifier: String,
    global_cluster_identifier: String,
    engine: ClusterEngine,
    instance_type: InstanceType,
    instances: u32,
    subnet_type: SubnetType,
    credentials: CredentialSet,
    parameter_group: ResolvedParameterGroup,
    upgrade_logical_id: String,
    service_token: Value,
    state: GlobalClusterStateMachine,
    regional_clusters: Vec<RegionalClusterRecord>,
}

impl GlobalAuroraMaster {
    /// Declare the primary cluster with the default region table
    pub fn build(stack: &mut Stack, id: &str, props: &GlobalAuroraMasterProps) -> Result<Self> {
        Self::build_with(&Context::default(), stack, id, props)
    }

    /// Declare the primary cluster and register its promotion
    ///
    /// On success the master is `Global(1)`. On failure nothing has been added
    /// to `stack`.
    pub fn build_with(
        ctx: &Context,
        stack: &mut Stack,
        id: &str,
        props: &GlobalAuroraMasterProps,
    ) -> Result<Self> {
        ctx.regions.ensure_supported(stack.region())?;
        validate_master_props(props)?;

        let path = [id];
        let mut declarations = Declarations::new();

        let network = resolve_network(id, &path, props.vpc.as_ref(), props.subnet_type)?;
        let subnet_type = network.subnet_type;

        let cluster_logical_id = logical_id(&child_path(&path, "RDSCluster"));
        let credentials = resolve_credentials(id, &path, props, &cluster_logical_id)?;
        let parameters =
            resolve_parameter_group(id, &path, props, &credentials.credentials.time_zone)?;

        let security_group_logical_id = logical_id(&child_path(&path, "SecurityGroup"));
        let subnet_group_logical_id = logical_id(&child_path(&path, "SubnetGroup"));

        declarations.resource(
            security_group_logical_id.clone(),
            generate_security_group(id, network.vpc_id.clone())?,
        );
        declarations.resource(
            subnet_group_logical_id.clone(),
            generate_subnet_group(id, subnet_type, network.subnet_ids.clone(), None)?,
        );
        declarations.extend(network.declarations);
        declarations.extend(parameters.declarations);
        declarations.extend(credentials.declarations);

        let credentials = credentials.credentials;
        let cluster_identifier = physical_name(&[stack.name(), id]);
        let global_cluster_identifier = suffixed_name(&cluster_identifier, "-global");

        declarations.resource(
            cluster_logical_id.clone(),
            generate_db_cluster(&ClusterDefinition {
                construct_id: id,
                identifier: &cluster_identifier,
                engine: &props.engine,
                database_name: &credentials.database_name,
                master_username: credentials.username_value(),
                master_password: credentials.password_value(),
                parameter_group_name: parameters.group.name_value(),
                subnet_group_name: reference(&subnet_group_logical_id),
                security_group_ids: vec![security_group_id(&security_group_logical_id)],
                deletion_protection: props.deletion_protection,
                storage_encrypted: props.storage_encrypted,
            })?,
        );

        let instance = InstanceDefinition {
            construct_id: id,
            cluster_logical_id: &cluster_logical_id,
            cluster_identifier: &cluster_identifier,
            engine: &props.engine,
            instance_type: props.instance_type,
            subnet_group_name: reference(&subnet_group_logical_id),
            publicly_accessible: subnet_type.is_public(),
        };
        let mut instance_logical_ids = Vec::new();
        for ordinal in 1..=props.instances {
            let name = format!("Instance{ordinal}");
            let instance_logical_id = logical_id(&child_path(&path, &name));
            declarations.resource(
                instance_logical_id.clone(),
                generate_db_instance(&instance, ordinal)?,
            );
            instance_logical_ids.push(instance_logical_id);
        }

        let provider = generate_provider(id, &path)?;
        declarations.extend(provider.declarations);

        let upgrade_logical_id = logical_id(&child_path(&path, "UpgradeGlobalCluster"));
        let upgrade = UpgradeTask {
            global_cluster_identifier: global_cluster_identifier.clone(),
            source_db_cluster_identifier: cluster_identifier.clone(),
            source_region: stack.region().to_string(),
            engine: props.engine.engine_name().to_string(),
            engine_version: props.engine.version.clone(),
        };
        declarations.resource(
            upgrade_logical_id.clone(),
            generate_upgrade_resource(
                &upgrade,
                provider.service_token.clone(),
                &instance_logical_ids,
            )?,
        );

        declarations.output(
            logical_id(&child_path(&path, "ClusterIdentifier")),
            Output {
                description: Some("Identifier of the primary regional cluster".to_string()),
                value: reference(&cluster_logical_id),
            },
        );
        declarations.output(
            logical_id(&child_path(&path, "GlobalClusterIdentifier")),
            Output {
                description: Some("Identifier of the global cluster".to_string()),
                value: get_att(&upgrade_logical_id, GLOBAL_CLUSTER_ATTRIBUTE),
            },
        );
        if let Some(secret) = credentials.secret_logical_id() {
            declarations.output(
                logical_id(&child_path(&path, "SecretArn")),
                Output {
                    description: Some("Secret holding the master credentials".to_string()),
                    value: reference(secret),
                },
            );
        }

        stack.apply(declarations)?;

        let mut state = GlobalClusterStateMachine::new();
        state.apply(GlobalClusterEvent::MasterDeclared)?;
        state.apply(GlobalClusterEvent::UpgradeRegistered)?;

        info!(
            stack = %stack.name(),
            region = %stack.region(),
            cluster = %cluster_identifier,
            global_cluster = %global_cluster_identifier,
            engine = %props.engine,
            instances = props.instances,
            subnet_type = %subnet_type,
            "Declared primary cluster"
        );

        Ok(Self {
            ctx: ctx.clone(),
            id: id.to_string(),
            stack_name: stack.name().to_string(),
            region: stack.region().to_string(),
            cluster_logical_id,
            cluster_identifier,
            global_cluster_identifier,
            engine: props.engine.clone(),
            instance_type: props.instance_type,
            instances: props.instances,
            subnet_type,
            credentials,
            parameter_group: parameters.group,
            upgrade_logical_id,
            service_token: provider.service_token,
            state,
            regional_clusters: Vec::new(),
        })
    }

    /// Register a secondary regional cluster in `options.region`
    ///
    /// The "add regional cluster" resource is declared in the stack that owns
    /// the upgrade resource; it creates the cluster in the target region
    /// through the subnet group prepared there.
    pub fn add_regional_cluster(
        &mut self,
        stack: &mut Stack,
        id: &str,
        options: &RegionalClusterOptions,
    ) -> Result<RegionalClusterRecord> {
        let region = options.region.as_str();
        self.ctx.regions.ensure_supported(region)?;

        if let TransitionResult::InvalidTransition { current, event } =
            self.state.transition(GlobalClusterEvent::RegionalClusterAttached)
        {
            return Err(Error::InvalidTransition {
                phase: current,
                event,
            });
        }

        validate_regional_options(options)?;

        if stack.name() != self.stack_name {
            return Err(Error::InvalidConfig(format!(
                "regional clusters must be added to stack {}, which owns the global cluster (got {})",
                self.stack_name,
                stack.name()
            )));
        }
        if region == self.region {
            return Err(Error::InvalidConfig(format!(
                "region {region} already hosts the primary cluster"
            )));
        }
        if self.regional_clusters.iter().any(|c| c.region == region) {
            return Err(Error::InvalidConfig(format!(
                "region {region} already has a regional cluster"
            )));
        }

        let engine = options.engine.clone().unwrap_or_else(|| self.engine.clone());
        if engine != self.engine {
            warn!(
                region = %region,
                primary = %self.engine,
                secondary = %engine,
                "Secondary engine differs from the primary; the attach will fail at deploy time"
            );
        }
        let instance_type = options.instance_type.unwrap_or(self.instance_type);
        let instances = options.instances.unwrap_or(self.instances);
        let db_cluster_identifier = options
            .db_cluster_identifier
            .clone()
            .unwrap_or_else(|| physical_name(&[self.cluster_identifier.as_str(), region]));

        let task = AttachTask {
            global_cluster_identifier: self.global_cluster_identifier.clone(),
            db_cluster_identifier: db_cluster_identifier.clone(),
            region: region.to_string(),
            db_subnet_group_name: options.db_subnet_group_name.clone(),
            engine: engine.engine_name().to_string(),
            engine_version: engine.version.clone(),
            db_instance_class: instance_type.as_str().to_string(),
            instance_count: instances,
        };

        let custom_resource_logical_id = logical_id(&[self.id.as_str(), id]);
        stack.add_resource(
            &custom_resource_logical_id,
            generate_attach_resource(
                &task,
                self.service_token.clone(),
                &self.upgrade_logical_id,
            )?,
        )?;

        let phase = self.state.apply(GlobalClusterEvent::RegionalClusterAttached)?;
        let record = RegionalClusterRecord {
            region: region.to_string(),
            db_cluster_identifier,
            db_subnet_group_name: options.db_subnet_group_name.clone(),
            engine,
            instance_type,
            instances,
            custom_resource_logical_id,
        };
        self.regional_clusters.push(record.clone());

        info!(
            global_cluster = %self.global_cluster_identifier,
            region = %record.region,
            cluster = %record.db_cluster_identifier,
            phase = %phase,
            "Registered regional cluster"
        );
        Ok(record)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    /// Region of the primary cluster
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn cluster_logical_id(&self) -> &str {
        &self.cluster_logical_id
    }

    pub fn cluster_identifier(&self) -> &str {
        &self.cluster_identifier
    }

    pub fn global_cluster_identifier(&self) -> &str {
        &self.global_cluster_identifier
    }

    /// Logical id of the "upgrade to global" custom resource
    pub fn upgrade_logical_id(&self) -> &str {
        &self.upgrade_logical_id
    }

    pub fn engine(&self) -> &ClusterEngine {
        &self.engine
    }

    pub fn subnet_type(&self) -> SubnetType {
        self.subnet_type
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn parameter_group(&self) -> &ResolvedParameterGroup {
        &self.parameter_group
    }

    pub fn phase(&self) -> GlobalClusterPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &GlobalClusterStateMachine {
        &self.state
    }

    /// Secondary clusters registered so far, in call order
    pub fn regional_clusters(&self) -> &[RegionalClusterRecord] {
        &self.regional_clusters
    }
}
