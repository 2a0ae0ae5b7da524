//! Unit tests for secondary region infrastructure

use global_aurora_rds::props::{GlobalAuroraSlaveInfraProps, SubnetType, VpcConfig, VpcSpec};
use global_aurora_rds::{Error, GlobalAuroraSlaveInfra};
use serde_json::json;

use crate::common::*;

const SLAVE_ID: &str = "GlobalAuroraRDS";

mod slave_infra_tests {
    use super::*;

    #[test]
    fn test_default_declares_vpc() {
        let mut stack = test_stack(TEST_STACK);
        GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &default_slave_props()).unwrap();

        let vpc = single_resource(&stack, "AWS::EC2::VPC");
        assert_eq!(vpc.properties["CidrBlock"], "10.109.0.0/16");
        assert_eq!(resources_of_type(&stack, "AWS::EC2::Subnet").len(), 4);
    }

    #[test]
    fn test_caller_vpc_config() {
        let mut stack = test_stack(TEST_STACK);
        let props = GlobalAuroraSlaveInfraProps {
            vpc: Some(VpcSpec::New(VpcConfig {
                cidr: "10.110.0.0/16".to_string(),
                max_azs: 3,
                ..Default::default()
            })),
            ..Default::default()
        };
        GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &props).unwrap();

        let vpc = single_resource(&stack, "AWS::EC2::VPC");
        assert_eq!(vpc.properties["CidrBlock"], "10.110.0.0/16");
        assert_eq!(vpc.properties["EnableDnsHostnames"], true);
        assert_eq!(resources_of_type(&stack, "AWS::EC2::Subnet").len(), 6);
    }

    #[test]
    fn test_default_private_subnet_group() {
        let mut stack = test_stack(TEST_STACK);
        let infra =
            GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &default_slave_props()).unwrap();

        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBSubnetGroup",
            &json!({ "DBSubnetGroupDescription": "Private Subnets for database" }),
        );
        assert_eq!(infra.subnet_type(), SubnetType::Private);
        assert!(resources_of_type(&stack, "AWS::RDS::DBCluster").is_empty());
    }

    #[test]
    fn test_public_subnet_group() {
        let mut stack = test_stack(TEST_STACK);
        let props = GlobalAuroraSlaveInfraProps {
            subnet_type: Some(SubnetType::Public),
            ..Default::default()
        };
        GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &props).unwrap();

        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBSubnetGroup",
            &json!({ "DBSubnetGroupDescription": "Public Subnets for database" }),
        );
    }

    #[test]
    fn test_subnet_group_covers_selected_subnets_only() {
        let mut stack = test_stack(TEST_STACK);
        let infra =
            GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &default_slave_props()).unwrap();

        let group = stack.resource(infra.subnet_group_logical_id()).unwrap();
        let ids = group.properties["SubnetIds"].as_array().unwrap();
        assert_eq!(ids.len(), 2);
        for id in ids {
            let logical_id = id["Ref"].as_str().unwrap();
            let subnet = stack.resource(logical_id).unwrap();
            assert_eq!(subnet.properties["MapPublicIpOnLaunch"], false);
        }
    }

    #[test]
    fn test_explicit_subnet_group_name() {
        let mut stack = test_stack(TEST_STACK);
        let props = GlobalAuroraSlaveInfraProps {
            subnet_group_name: Some("secondary-db-subnets".to_string()),
            ..Default::default()
        };
        let infra = GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &props).unwrap();

        assert_eq!(infra.subnet_group_name(), Some("secondary-db-subnets"));
        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBSubnetGroup",
            &json!({ "DBSubnetGroupName": "secondary-db-subnets" }),
        );
    }

    #[test]
    fn test_imported_vpc_declares_no_network() {
        let mut stack = test_stack(TEST_STACK);
        let props = GlobalAuroraSlaveInfraProps {
            vpc: Some(imported_vpc(&[], &["subnet-a", "subnet-b"])),
            ..Default::default()
        };
        GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &props).unwrap();

        assert!(resources_of_type(&stack, "AWS::EC2::VPC").is_empty());
        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBSubnetGroup",
            &json!({ "SubnetIds": ["subnet-a", "subnet-b"] }),
        );
    }

    #[test]
    fn test_subnet_group_name_output() {
        let mut stack = test_stack(TEST_STACK);
        let infra =
            GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &default_slave_props()).unwrap();
        let template = stack.to_template();
        assert!(
            template
                .outputs
                .values()
                .any(|o| o.value == json!({ "Ref": infra.subnet_group_logical_id() }))
        );
    }

    #[test]
    fn test_unsupported_region() {
        let mut stack = test_stack_in(TEST_STACK, UNSUPPORTED_REGION);
        let err = GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &default_slave_props())
            .unwrap_err();
        assert!(matches!(err, Error::RegionNotSupported(ref r) if r == UNSUPPORTED_REGION));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_public_request_without_public_subnets() {
        let mut stack = test_stack(TEST_STACK);
        let props = GlobalAuroraSlaveInfraProps {
            vpc: Some(imported_vpc(&[], &["subnet-a"])),
            subnet_type: Some(SubnetType::Public),
            ..Default::default()
        };
        let err = GlobalAuroraSlaveInfra::build(&mut stack, SLAVE_ID, &props).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(stack.is_empty());
    }
}
