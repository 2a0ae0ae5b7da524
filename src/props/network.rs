use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default CIDR for a VPC declared on the caller's behalf
pub const DEFAULT_VPC_CIDR: &str = "10.109.0.0/16";

/// Subnet visibility
#[derive(Serialize, Deserialize, Clone, Copy, Debug, JsonSchema, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubnetType {
    /// Routable from the internet; instances receive a public address
    Public,
    /// Not routable from the internet
    #[default]
    Private,
}

impl SubnetType {
    pub fn is_public(&self) -> bool {
        matches!(self, SubnetType::Public)
    }
}

impl std::fmt::Display for SubnetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubnetType::Public => write!(f, "Public"),
            SubnetType::Private => write!(f, "Private"),
        }
    }
}

/// Network used by a regional cluster
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VpcSpec {
    /// Declare a new VPC in the same stack
    New(VpcConfig),
    /// Reference a VPC that already exists
    Imported(ImportedVpc),
}

/// Shape of a VPC declared in the stack
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VpcConfig {
    /// IPv4 CIDR block of the VPC
    #[serde(default = "default_cidr")]
    pub cidr: String,

    /// Number of availability zones to spread subnets over
    #[serde(default = "default_max_azs")]
    pub max_azs: u8,

    #[serde(default = "default_true")]
    pub enable_dns_hostnames: bool,

    #[serde(default = "default_true")]
    pub enable_dns_support: bool,

    /// Subnet groups; one subnet per entry per availability zone
    #[serde(default = "default_subnet_configuration")]
    pub subnet_configuration: Vec<SubnetConfiguration>,
}

fn default_cidr() -> String {
    DEFAULT_VPC_CIDR.to_string()
}

fn default_max_azs() -> u8 {
    2
}

fn default_true() -> bool {
    true
}

fn default_subnet_configuration() -> Vec<SubnetConfiguration> {
    vec![
        SubnetConfiguration::new("Public", SubnetType::Public, 24),
        SubnetConfiguration::new("Private", SubnetType::Private, 24),
    ]
}

impl Default for VpcConfig {
    fn default() -> Self {
        Self {
            cidr: default_cidr(),
            max_azs: default_max_azs(),
            enable_dns_hostnames: true,
            enable_dns_support: true,
            subnet_configuration: default_subnet_configuration(),
        }
    }
}

impl VpcConfig {
    /// A VPC whose subnets are all public
    pub fn public_only(cidr: &str, max_azs: u8, cidr_mask: u8) -> Self {
        Self {
            cidr: cidr.to_string(),
            max_azs,
            subnet_configuration: vec![SubnetConfiguration::new(
                "PublicVPC",
                SubnetType::Public,
                cidr_mask,
            )],
            ..Default::default()
        }
    }
}

/// One named group of subnets inside a declared VPC
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubnetConfiguration {
    pub name: String,
    pub subnet_type: SubnetType,
    /// Prefix length of each subnet (e.g., 24 for a /24)
    pub cidr_mask: u8,
}

impl SubnetConfiguration {
    pub fn new(name: &str, subnet_type: SubnetType, cidr_mask: u8) -> Self {
        Self {
            name: name.to_string(),
            subnet_type,
            cidr_mask,
        }
    }
}

/// Identifiers of an existing VPC and its subnets
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportedVpc {
    pub vpc_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_subnet_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_subnet_ids: Vec<String>,
}

impl VpcSpec {
    /// Whether the network has subnets of the given visibility
    pub fn has_subnets(&self, subnet_type: SubnetType) -> bool {
        match self {
            VpcSpec::New(config) => config
                .subnet_configuration
                .iter()
                .any(|s| s.subnet_type == subnet_type),
            VpcSpec::Imported(vpc) => match subnet_type {
                SubnetType::Public => !vpc.public_subnet_ids.is_empty(),
                SubnetType::Private => !vpc.private_subnet_ids.is_empty(),
            },
        }
    }

    /// True when every subnet of the network is public
    pub fn is_entirely_public(&self) -> bool {
        self.has_subnets(SubnetType::Public) && !self.has_subnets(SubnetType::Private)
    }
}
