//! Deployment file and whole-topology synthesis
//!
//! A deployment file names the primary stack and every secondary stack.
//! Synthesis validates all of it up front, then runs the usual sequence:
//! build the master, build each secondary's infrastructure, attach each
//! secondary to the master.
//!
//! The primary stack's attach resources create clusters in the subnet groups
//! the secondary stacks declare, so every secondary stack has to be deployed
//! before the primary. [`Synthesized::stacks`] is in that order.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::orchestrator::error::{Error, Result};
use crate::orchestrator::{Context, GlobalAuroraMaster, GlobalAuroraSlaveInfra};
use crate::props::{
    ClusterEngine, GlobalAuroraMasterProps, GlobalAuroraSlaveInfraProps, InstanceType,
    RegionalClusterOptions,
};
use crate::resources::common::physical_name;
use crate::template::{Environment, Stack};

/// Environment variable that supplies a default account id
pub const ACCOUNT_ENV_VAR: &str = "AWS_ACCOUNT_ID";

/// Construct id of the primary cluster when the file does not name one
pub const DEFAULT_MASTER_ID: &str = "GlobalAuroraRDS";

/// Construct id of secondary infrastructure when the file does not name one
pub const DEFAULT_SLAVE_ID: &str = "GlobalAuroraRDSSlave";

/// A global database topology
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub master: MasterDeployment,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondaries: Vec<SecondaryDeployment>,
}

/// The stack holding the primary cluster
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MasterDeployment {
    pub stack_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    pub region: String,

    #[serde(default = "default_master_id")]
    pub id: String,

    #[serde(default = "GlobalAuroraMasterProps::new")]
    pub props: GlobalAuroraMasterProps,
}

/// A stack preparing one secondary region
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryDeployment {
    pub stack_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    pub region: String,

    #[serde(default = "default_slave_id")]
    pub id: String,

    #[serde(default)]
    pub infra: GlobalAuroraSlaveInfraProps,

    #[serde(default)]
    pub cluster: SecondaryClusterConfig,
}

/// Overrides for the regional cluster attached in a secondary region
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryClusterConfig {
    /// Construct id of the attach resource (derived from the region when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<ClusterEngine>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<InstanceType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_cluster_identifier: Option<String>,
}

fn default_master_id() -> String {
    DEFAULT_MASTER_ID.to_string()
}

fn default_slave_id() -> String {
    DEFAULT_SLAVE_ID.to_string()
}

impl SecondaryDeployment {
    /// Name of the subnet group the regional cluster is created in
    ///
    /// The attach resource lives in the primary stack, so the group needs a
    /// name that is known before either stack is deployed.
    pub fn subnet_group_name(&self) -> String {
        self.infra
            .subnet_group_name
            .clone()
            .unwrap_or_else(|| physical_name(&[self.stack_name.as_str(), self.id.as_str(), "subnets"]))
    }

    fn attach_id(&self) -> String {
        self.cluster
            .id
            .clone()
            .unwrap_or_else(|| format!("{}RegionalCluster", self.region))
    }

    fn regional_options(&self) -> RegionalClusterOptions {
        RegionalClusterOptions {
            region: self.region.clone(),
            db_subnet_group_name: self.subnet_group_name(),
            engine: self.cluster.engine.clone(),
            instance_type: self.cluster.instance_type,
            instances: self.cluster.instances,
            db_cluster_identifier: self.cluster.db_cluster_identifier.clone(),
        }
    }
}

impl DeploymentConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Fill in the account of every stack that does not name one
    pub fn with_default_account(mut self, account: Option<&str>) -> Self {
        let Some(account) = account else {
            if self.master.account.is_none() {
                warn!(
                    "No account configured and {} is not set; templates are account-agnostic",
                    ACCOUNT_ENV_VAR
                );
            }
            return self;
        };

        self.master.account.get_or_insert_with(|| account.to_string());
        for secondary in &mut self.secondaries {
            secondary.account.get_or_insert_with(|| account.to_string());
        }
        self
    }

    /// Check every region and name before anything is built
    pub fn validate(&self, ctx: &Context) -> Result<()> {
        ctx.regions.ensure_supported(&self.master.region)?;
        for secondary in &self.secondaries {
            ctx.regions.ensure_supported(&secondary.region)?;
        }

        let mut stack_names = BTreeSet::from([self.master.stack_name.as_str()]);
        let mut regions = BTreeSet::from([self.master.region.as_str()]);
        for secondary in &self.secondaries {
            if !stack_names.insert(secondary.stack_name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "stack name {} is used more than once",
                    secondary.stack_name
                )));
            }
            if !regions.insert(secondary.region.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "region {} already hosts a cluster of this global database",
                    secondary.region
                )));
            }
        }
        Ok(())
    }

    /// Build every stack of the topology
    pub fn synthesize(&self, ctx: &Context) -> Result<Synthesized> {
        self.validate(ctx)?;

        let master_cfg = &self.master;
        let mut master_stack = Stack::new(
            &master_cfg.stack_name,
            Environment::new(master_cfg.account.as_deref(), &master_cfg.region),
        )
        .with_description("Aurora global database primary region");
        let mut master =
            GlobalAuroraMaster::build_with(ctx, &mut master_stack, &master_cfg.id, &master_cfg.props)?;

        let mut secondary_stacks = Vec::with_capacity(self.secondaries.len());
        for secondary in &self.secondaries {
            let mut stack = Stack::new(
                &secondary.stack_name,
                Environment::new(secondary.account.as_deref(), &secondary.region),
            )
            .with_description("Aurora global database secondary region");

            let mut infra = secondary.infra.clone();
            infra.subnet_group_name = Some(secondary.subnet_group_name());
            GlobalAuroraSlaveInfra::build_with(ctx, &mut stack, &secondary.id, &infra)?;

            master.add_regional_cluster(
                &mut master_stack,
                &secondary.attach_id(),
                &secondary.regional_options(),
            )?;
            secondary_stacks.push(stack);
        }

        info!(
            global_cluster = %master.global_cluster_identifier(),
            phase = %master.phase(),
            stacks = secondary_stacks.len() + 1,
            "Synthesized global database"
        );

        let mut stacks = secondary_stacks;
        stacks.push(master_stack);
        Ok(Synthesized { stacks, master })
    }
}

/// Stacks of a synthesized topology
#[derive(Debug)]
pub struct Synthesized {
    /// Deploy order: secondary stacks as listed in the file, then the primary
    pub stacks: Vec<Stack>,
    pub master: GlobalAuroraMaster,
}

impl Synthesized {
    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name() == name)
    }

    /// The stack holding the primary cluster and the lifecycle resources
    pub fn primary_stack(&self) -> Option<&Stack> {
        self.stack(self.master.stack_name())
    }

    /// Stacks that prepare secondary regions, in deploy order
    pub fn secondary_stacks(&self) -> impl Iterator<Item = &Stack> {
        let primary = self.master.stack_name();
        self.stacks.iter().filter(move |s| s.name() != primary)
    }

    /// Write one `<stack>.template.json` per stack into `dir`
    ///
    /// Paths are returned in deploy order.
    pub fn write_templates(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.stacks.len());
        for (order, stack) in self.stacks.iter().enumerate() {
            let path = dir.join(format!("{}.template.json", stack.name()));
            std::fs::write(&path, stack.to_json()?)?;
            info!(
                stack = %stack.name(),
                deploy_order = order + 1,
                path = %path.display(),
                "Wrote template"
            );
            written.push(path);
        }
        Ok(written)
    }
}
