//! Network and subnet visibility resolution
//!
//! Shared by the primary and the secondary regions so both pick subnets the
//! same way.

use serde_json::Value;

use crate::orchestrator::error::{Error, Result};
use crate::props::{SubnetType, VpcConfig, VpcSpec};
use crate::resources::network::generate_vpc;
use crate::template::Declarations;
use crate::template::intrinsic::reference;

/// The network a regional cluster is placed in
#[derive(Debug)]
pub struct ResolvedNetwork {
    pub vpc_id: Value,
    /// Visibility of the database subnets; also decides `PubliclyAccessible`
    pub subnet_type: SubnetType,
    /// Subnets of the resolved visibility
    pub subnet_ids: Vec<Value>,
    pub declarations: Declarations,
}

/// Pick the database subnet visibility
///
/// An explicit request wins; otherwise public only when the VPC has nothing
/// but public subnets.
pub fn resolve_subnet_type(vpc: &VpcSpec, requested: Option<SubnetType>) -> Result<SubnetType> {
    let subnet_type = match requested {
        Some(subnet_type) => subnet_type,
        None if vpc.is_entirely_public() => SubnetType::Public,
        None => SubnetType::Private,
    };

    if !vpc.has_subnets(subnet_type) {
        return Err(Error::InvalidConfig(format!(
            "the VPC has no {subnet_type} subnets for the database"
        )));
    }
    Ok(subnet_type)
}

/// Resolve the network, declaring a new VPC unless one is imported
///
/// With no VPC at all the default VPC (`10.109.0.0/16`, two AZs, public and
/// private subnets) is declared and the database goes in private subnets.
pub fn resolve_network(
    construct_id: &str,
    path: &[&str],
    vpc: Option<&VpcSpec>,
    requested: Option<SubnetType>,
) -> Result<ResolvedNetwork> {
    let default_vpc = VpcSpec::New(VpcConfig::default());
    let vpc = vpc.unwrap_or(&default_vpc);
    let subnet_type = resolve_subnet_type(vpc, requested)?;

    let network = match vpc {
        VpcSpec::New(config) => {
            let declared = generate_vpc(construct_id, path, config)?;
            let selected = match subnet_type {
                SubnetType::Public => &declared.public_subnet_ids,
                SubnetType::Private => &declared.private_subnet_ids,
            };
            ResolvedNetwork {
                vpc_id: reference(&declared.vpc_logical_id),
                subnet_type,
                subnet_ids: selected.iter().map(|id| reference(id)).collect(),
                declarations: declared.declarations,
            }
        }
        VpcSpec::Imported(imported) => {
            let selected = match subnet_type {
                SubnetType::Public => &imported.public_subnet_ids,
                SubnetType::Private => &imported.private_subnet_ids,
            };
            ResolvedNetwork {
                vpc_id: Value::String(imported.vpc_id.clone()),
                subnet_type,
                subnet_ids: selected.iter().cloned().map(Value::String).collect(),
                declarations: Declarations::new(),
            }
        }
    };

    tracing::debug!(
        construct = %construct_id,
        subnet_type = %network.subnet_type,
        subnets = network.subnet_ids.len(),
        "Resolved network"
    );
    Ok(network)
}
