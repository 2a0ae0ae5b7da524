//! Unit tests for network resolution and subnet allocation

use global_aurora_rds::Error;
use global_aurora_rds::orchestrator::network::{resolve_network, resolve_subnet_type};
use global_aurora_rds::props::{SubnetConfiguration, SubnetType, VpcConfig, VpcSpec};
use global_aurora_rds::resources::network::{allocate_subnet_cidrs, parse_cidr};
use serde_json::json;

use crate::common::*;

mod subnet_type_tests {
    use super::*;

    #[test]
    fn test_default_vpc_is_private() {
        let vpc = VpcSpec::New(VpcConfig::default());
        assert_eq!(resolve_subnet_type(&vpc, None).unwrap(), SubnetType::Private);
    }

    #[test]
    fn test_all_public_vpc_is_public() {
        assert_eq!(
            resolve_subnet_type(&public_vpc(), None).unwrap(),
            SubnetType::Public
        );
    }

    #[test]
    fn test_explicit_request_wins() {
        let vpc = VpcSpec::New(VpcConfig::default());
        assert_eq!(
            resolve_subnet_type(&vpc, Some(SubnetType::Public)).unwrap(),
            SubnetType::Public
        );
    }

    #[test]
    fn test_private_request_on_public_vpc() {
        let err = resolve_subnet_type(&public_vpc(), Some(SubnetType::Private)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_imported_mixed_vpc_is_private() {
        let vpc = imported_vpc(&["subnet-pub"], &["subnet-priv"]);
        assert_eq!(resolve_subnet_type(&vpc, None).unwrap(), SubnetType::Private);
    }
}

mod resolve_network_tests {
    use super::*;

    #[test]
    fn test_imported_subnets_are_literal_ids() {
        let vpc = imported_vpc(&["subnet-pub"], &["subnet-priv"]);
        let network = resolve_network(MASTER_ID, &[MASTER_ID], Some(&vpc), None).unwrap();

        assert_eq!(network.vpc_id, json!("vpc-0123456789abcdef0"));
        assert_eq!(network.subnet_ids, vec![json!("subnet-priv")]);
        assert!(network.declarations.is_empty());
    }

    #[test]
    fn test_new_vpc_subnets_are_references() {
        let network = resolve_network(MASTER_ID, &[MASTER_ID], Some(&public_vpc()), None).unwrap();
        assert_eq!(network.subnet_type, SubnetType::Public);
        assert_eq!(network.subnet_ids.len(), 3);
        assert!(network.subnet_ids.iter().all(|id| id.get("Ref").is_some()));
    }

    #[test]
    fn test_internet_gateway_only_with_public_subnets() {
        let private_only = VpcSpec::New(VpcConfig {
            subnet_configuration: vec![SubnetConfiguration::new(
                "Private",
                SubnetType::Private,
                24,
            )],
            ..Default::default()
        });
        let network = resolve_network(MASTER_ID, &[MASTER_ID], Some(&private_only), None).unwrap();
        assert!(
            network
                .declarations
                .resources
                .iter()
                .all(|(_, r)| r.type_ != "AWS::EC2::InternetGateway")
        );

        let network = resolve_network(MASTER_ID, &[MASTER_ID], Some(&public_vpc()), None).unwrap();
        assert!(
            network
                .declarations
                .resources
                .iter()
                .any(|(_, r)| r.type_ == "AWS::EC2::InternetGateway")
        );
    }

    #[test]
    fn test_zero_azs_rejected() {
        let vpc = VpcSpec::New(VpcConfig {
            max_azs: 0,
            ..Default::default()
        });
        assert!(resolve_network(MASTER_ID, &[MASTER_ID], Some(&vpc), None).is_err());
    }
}

mod cidr_tests {
    use super::*;

    #[test]
    fn test_parse_cidr() {
        let net = parse_cidr("10.109.0.0/16").unwrap();
        assert_eq!(net.network().to_string(), "10.109.0.0");
        assert_eq!(net.prefix_len(), 16);
    }

    #[test]
    fn test_parse_cidr_rejects_host_bits() {
        assert!(parse_cidr("10.109.1.0/16").is_err());
        assert!(parse_cidr("10.109.0.0").is_err());
        assert!(parse_cidr("10.109.0.0/33").is_err());
    }

    #[test]
    fn test_mixed_masks_are_aligned() {
        let blocks = allocate_subnet_cidrs("10.0.0.0/16", &[26, 24]).unwrap();
        assert_eq!(blocks, vec!["10.0.0.0/26", "10.0.1.0/24"]);
    }

    #[test]
    fn test_vpc_runs_out_of_room() {
        let err = allocate_subnet_cidrs("10.0.0.0/24", &[25, 25, 25]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_blocks_fill_the_vpc_exactly() {
        let blocks = allocate_subnet_cidrs("10.0.0.0/16", &[18, 18, 18, 18]).unwrap();
        assert_eq!(
            blocks,
            vec!["10.0.0.0/18", "10.0.64.0/18", "10.0.128.0/18", "10.0.192.0/18"]
        );
        assert!(allocate_subnet_cidrs("10.0.0.0/16", &[18, 18, 18, 18, 28]).is_err());
    }

    #[test]
    fn test_mask_shorter_than_vpc_rejected() {
        let err = allocate_subnet_cidrs("10.0.0.0/24", &[23]).unwrap_err();
        assert!(err.to_string().contains("/23"));
    }
}
