//! VPC, subnet and security group generation

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use serde::Serialize;
use serde_json::Value;

use crate::orchestrator::error::{Error, Result};
use crate::props::{SubnetType, VpcConfig};
use crate::resources::common::{Tag, child_path, logical_id, named_tags, standard_tags};
use crate::template::intrinsic::{availability_zone, get_att, reference};
use crate::template::{Declarations, Resource};

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct VpcProperties {
    cidr_block: String,
    enable_dns_hostnames: bool,
    enable_dns_support: bool,
    instance_tenancy: &'static str,
    tags: Vec<Tag>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SubnetProperties {
    vpc_id: Value,
    cidr_block: String,
    availability_zone: Value,
    map_public_ip_on_launch: bool,
    tags: Vec<Tag>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct GatewayAttachmentProperties {
    vpc_id: Value,
    internet_gateway_id: Value,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SecurityGroupProperties {
    group_description: String,
    vpc_id: Value,
    security_group_egress: Vec<EgressRule>,
    tags: Vec<Tag>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct EgressRule {
    cidr_ip: &'static str,
    description: &'static str,
    ip_protocol: &'static str,
}

/// Result of declaring a VPC
#[derive(Debug)]
pub struct VpcDeclaration {
    pub vpc_logical_id: String,
    pub public_subnet_ids: Vec<String>,
    pub private_subnet_ids: Vec<String>,
    pub declarations: Declarations,
}

/// Generate a VPC with one subnet per configuration per availability zone
///
/// An internet gateway and its attachment are only declared when at least
/// one subnet is public. Route tables and NAT are left to the network owner.
pub fn generate_vpc(construct_id: &str, path: &[&str], config: &VpcConfig) -> Result<VpcDeclaration> {
    if config.max_azs == 0 {
        return Err(Error::InvalidConfig("maxAzs must be at least 1".to_string()));
    }
    if config.subnet_configuration.is_empty() {
        return Err(Error::InvalidConfig(
            "a VPC needs at least one subnet configuration".to_string(),
        ));
    }

    let masks: Vec<u8> = config
        .subnet_configuration
        .iter()
        .flat_map(|s| std::iter::repeat_n(s.cidr_mask, usize::from(config.max_azs)))
        .collect();
    let cidrs = allocate_subnet_cidrs(&config.cidr, &masks)?;

    let vpc_path = child_path(path, "Vpc");
    let vpc_logical_id = logical_id(&vpc_path);
    let mut declarations = Declarations::new();

    declarations.resource(
        vpc_logical_id.clone(),
        Resource::new(
            "AWS::EC2::VPC",
            &VpcProperties {
                cidr_block: config.cidr.clone(),
                enable_dns_hostnames: config.enable_dns_hostnames,
                enable_dns_support: config.enable_dns_support,
                instance_tenancy: "default",
                tags: named_tags(construct_id, &vpc_path.join("/")),
            },
        )?,
    );

    let mut public_subnet_ids = Vec::new();
    let mut private_subnet_ids = Vec::new();
    let mut cidrs = cidrs.into_iter();

    for subnet in &config.subnet_configuration {
        for az in 0..usize::from(config.max_azs) {
            let name = format!("{}Subnet{}", subnet.name, az + 1);
            let subnet_path = child_path(&vpc_path, &name);
            let subnet_id = logical_id(&subnet_path);
            let cidr_block = cidrs
                .next()
                .ok_or_else(|| Error::InvalidConfig("subnet allocation mismatch".to_string()))?;

            let mut tags = named_tags(construct_id, &subnet_path.join("/"));
            tags.push(Tag::new("subnet-type", &subnet.subnet_type.to_string()));

            declarations.resource(
                subnet_id.clone(),
                Resource::new(
                    "AWS::EC2::Subnet",
                    &SubnetProperties {
                        vpc_id: reference(&vpc_logical_id),
                        cidr_block,
                        availability_zone: availability_zone(az),
                        map_public_ip_on_launch: subnet.subnet_type.is_public(),
                        tags,
                    },
                )?,
            );

            match subnet.subnet_type {
                SubnetType::Public => public_subnet_ids.push(subnet_id),
                SubnetType::Private => private_subnet_ids.push(subnet_id),
            }
        }
    }

    if !public_subnet_ids.is_empty() {
        let igw_id = logical_id(&child_path(&vpc_path, "IGW"));
        declarations.resource(
            igw_id.clone(),
            Resource::new(
                "AWS::EC2::InternetGateway",
                &serde_json::json!({ "Tags": standard_tags(construct_id) }),
            )?,
        );
        declarations.resource(
            logical_id(&child_path(&vpc_path, "VPCGW")),
            Resource::new(
                "AWS::EC2::VPCGatewayAttachment",
                &GatewayAttachmentProperties {
                    vpc_id: reference(&vpc_logical_id),
                    internet_gateway_id: reference(&igw_id),
                },
            )?,
        );
    }

    Ok(VpcDeclaration {
        vpc_logical_id,
        public_subnet_ids,
        private_subnet_ids,
        declarations,
    })
}

/// Generate the security group attached to the database cluster
pub fn generate_security_group(construct_id: &str, vpc_id: Value) -> Result<Resource> {
    Ok(Resource::new(
        "AWS::EC2::SecurityGroup",
        &SecurityGroupProperties {
            group_description: "RDS security group".to_string(),
            vpc_id,
            security_group_egress: vec![EgressRule {
                cidr_ip: "0.0.0.0/0",
                description: "Allow all outbound traffic by default",
                ip_protocol: "-1",
            }],
            tags: standard_tags(construct_id),
        },
    )?)
}

/// `{"Fn::GetAtt": [sg, "GroupId"]}`
pub fn security_group_id(logical_id: &str) -> Value {
    get_att(logical_id, "GroupId")
}

/// Parse an IPv4 CIDR block, rejecting host bits
pub fn parse_cidr(cidr: &str) -> Result<Ipv4Net> {
    let net: Ipv4Net = cidr
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("invalid IPv4 CIDR block: {cidr}")))?;
    if net != net.trunc() {
        return Err(Error::InvalidConfig(format!(
            "CIDR block {cidr} has host bits set"
        )));
    }
    Ok(net)
}

/// Carve subnets with the given prefix lengths out of a VPC CIDR, in order
///
/// Each block is aligned to its own size; blocks never overlap. Fails when a
/// mask is shorter than the VPC prefix or the range runs out.
pub fn allocate_subnet_cidrs(vpc_cidr: &str, masks: &[u8]) -> Result<Vec<String>> {
    let vpc = parse_cidr(vpc_cidr)?;
    let prefix = vpc.prefix_len();

    let mut cursor = u64::from(u32::from(vpc.network()));
    let mut blocks = Vec::with_capacity(masks.len());

    for &mask in masks {
        if mask < prefix || mask > 28 {
            return Err(Error::InvalidConfig(format!(
                "subnet mask /{mask} must be between /{prefix} and /28 for VPC {vpc_cidr}"
            )));
        }
        let size = 1u64 << (32 - u32::from(mask));
        let aligned = cursor.div_ceil(size) * size;
        let subnet = u32::try_from(aligned)
            .ok()
            .map(|addr| Ipv4Net::new(Ipv4Addr::from(addr), mask))
            .transpose()?
            .filter(|subnet| vpc.contains(subnet))
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "VPC {vpc_cidr} has no room left for a /{mask} subnet"
                ))
            })?;

        blocks.push(subnet.to_string());
        cursor = aligned + size;
    }

    Ok(blocks)
}
