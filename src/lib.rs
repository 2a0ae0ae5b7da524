//! Multi-region Aurora global databases declared as CloudFormation stacks
//!
//! [`GlobalAuroraMaster`] declares the primary regional cluster and the task
//! that promotes it to a global cluster, [`GlobalAuroraSlaveInfra`] prepares
//! a secondary region, and [`GlobalAuroraMaster::add_regional_cluster`]
//! attaches a regional cluster there. The promote/attach tasks are executed at
//! deploy time by the [`provider`].

pub mod deployment;
pub mod orchestrator;
pub mod props;
pub mod provider;
pub mod region;
pub mod resources;
pub mod template;

pub use deployment::{DeploymentConfig, Synthesized};
pub use orchestrator::{
    Context, Error, GlobalAuroraMaster, GlobalAuroraSlaveInfra, GlobalClusterEvent,
    GlobalClusterPhase, RegionalClusterRecord, Result,
};
pub use props::{
    ClusterEngine, GlobalAuroraMasterProps, GlobalAuroraSlaveInfraProps, InstanceType,
    RegionalClusterOptions, SubnetType, VpcConfig, VpcSpec,
};
pub use region::{GLOBAL_DATABASE_REGIONS, RegionCapabilityTable};
pub use template::{Environment, Stack};
