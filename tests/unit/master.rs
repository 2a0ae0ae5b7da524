//! Unit tests for the primary cluster and regional cluster registration

use global_aurora_rds::props::{GlobalAuroraMasterProps, InstanceType, RegionalClusterOptions};
use global_aurora_rds::provider::{ATTACH_RESOURCE_TYPE, UPGRADE_RESOURCE_TYPE};
use global_aurora_rds::resources::MAX_IDENTIFIER_LENGTH;
use global_aurora_rds::resources::cluster::instance_identifier;
use global_aurora_rds::resources::custom_resource::{CODE_BUCKET_PARAMETER, CODE_KEY_PARAMETER};
use global_aurora_rds::{
    Context, Error, GlobalAuroraMaster, GlobalClusterPhase, RegionCapabilityTable, Stack,
};
use serde_json::json;

use crate::common::*;

fn build_default_master() -> (Stack, GlobalAuroraMaster) {
    let mut stack = test_stack(TEST_STACK);
    let master = GlobalAuroraMaster::build(&mut stack, MASTER_ID, &default_master_props()).unwrap();
    (stack, master)
}

fn postgres_props() -> GlobalAuroraMasterProps {
    MasterPropsBuilder::new()
        .with_instance_type(InstanceType::R5Large)
        .with_password("1qaz2wsx")
        .with_postgres("11.7")
        .build()
}

mod build_tests {
    use super::*;

    #[test]
    fn test_default_master_declares_cluster() {
        let (stack, master) = build_default_master();

        assert_eq!(resources_of_type(&stack, "AWS::RDS::DBCluster").len(), 1);
        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBClusterParameterGroup",
            &json!({
                "Family": "aurora-mysql5.7",
                "Parameters": { "time_zone": "UTC" }
            }),
        );
        assert_all_resource_properties(
            &stack,
            "AWS::RDS::DBInstance",
            &json!({ "PubliclyAccessible": false }),
        );
        assert_eq!(master.phase(), GlobalClusterPhase::Global { regions: 1 });
    }

    #[test]
    fn test_default_instance_count_and_class() {
        let (stack, master) = build_default_master();
        let instances = resources_of_type(&stack, "AWS::RDS::DBInstance");
        assert_eq!(instances.len(), 2);

        let cluster_id = master.cluster_identifier();
        for (ordinal, instance) in [1, 2].iter().zip(&instances) {
            assert_eq!(instance.properties["DBInstanceClass"], "db.r5.large");
            assert_eq!(
                instance.properties["DBInstanceIdentifier"],
                format!("{cluster_id}-instance{ordinal}")
            );
        }
    }

    #[test]
    fn test_identifiers_derive_from_stack_and_id() {
        let (_, master) = build_default_master();
        assert_eq!(master.cluster_identifier(), "testing-stack-globalaurorards");
        assert_eq!(
            master.global_cluster_identifier(),
            "testing-stack-globalaurorards-global"
        );
        assert_eq!(master.region(), TEST_REGION);
        assert_eq!(master.stack_name(), TEST_STACK);
    }

    #[test]
    fn test_public_vpc_makes_instances_public() {
        let mut stack = test_stack(TEST_STACK);
        let props = MasterPropsBuilder::new().with_vpc(public_vpc()).build();
        let master = GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap();

        assert_has_resource_properties(
            &stack,
            "AWS::EC2::Subnet",
            &json!({ "MapPublicIpOnLaunch": true }),
        );
        assert_all_resource_properties(
            &stack,
            "AWS::RDS::DBInstance",
            &json!({ "PubliclyAccessible": true }),
        );
        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBSubnetGroup",
            &json!({ "DBSubnetGroupDescription": "Public Subnets for database" }),
        );
        assert!(master.subnet_type().is_public());
    }

    #[test]
    fn test_parameters_override_time_zone() {
        let mut stack = test_stack(TEST_STACK);
        let props = MasterPropsBuilder::new()
            .with_parameter("time_zone", "Asia/Taipei")
            .build();
        GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap();

        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBClusterParameterGroup",
            &json!({ "Parameters": { "time_zone": "Asia/Taipei" } }),
        );
    }

    #[test]
    fn test_time_zone_prop() {
        let mut stack = test_stack(TEST_STACK);
        let props = MasterPropsBuilder::new().with_time_zone("Asia/Taipei").build();
        GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap();

        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBClusterParameterGroup",
            &json!({ "Parameters": { "time_zone": "Asia/Taipei" } }),
        );
    }

    #[test]
    fn test_literal_credentials() {
        let mut stack = test_stack(TEST_STACK);
        let props = MasterPropsBuilder::new()
            .with_username("superuser")
            .with_database_name("superdb")
            .with_password("1qaz2wsx")
            .build();
        let master = GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap();

        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBCluster",
            &json!({
                "Engine": "aurora-mysql",
                "DatabaseName": "superdb",
                "EngineVersion": "5.7.mysql_aurora.2.07.1",
                "MasterUsername": "superuser",
                "MasterUserPassword": "1qaz2wsx"
            }),
        );
        assert!(resources_of_type(&stack, "AWS::SecretsManager::Secret").is_empty());
        assert!(master.credentials().secret_logical_id().is_none());
    }

    #[test]
    fn test_missing_password_uses_managed_secret() {
        let mut stack = test_stack(TEST_STACK);
        let props = MasterPropsBuilder::new().with_database_name("superdb").build();
        let master = GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap();

        let secret_ids = logical_ids_of_type(&stack, "AWS::SecretsManager::Secret");
        assert_eq!(secret_ids.len(), 1);
        let secret = &secret_ids[0];
        assert!(secret.starts_with("GlobalAuroraRDSRDSClusterSecret"));
        assert_eq!(master.credentials().secret_logical_id(), Some(secret.as_str()));

        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBCluster",
            &json!({
                "Engine": "aurora-mysql",
                "DatabaseName": "superdb",
                "EngineVersion": "5.7.mysql_aurora.2.07.1",
                "MasterUsername": {
                    "Fn::Join": ["", [
                        "{{resolve:secretsmanager:",
                        { "Ref": secret },
                        ":SecretString:username::}}"
                    ]]
                },
                "MasterUserPassword": {
                    "Fn::Join": ["", [
                        "{{resolve:secretsmanager:",
                        { "Ref": secret },
                        ":SecretString:password::}}"
                    ]]
                }
            }),
        );
        assert_eq!(
            resources_of_type(&stack, "AWS::SecretsManager::SecretTargetAttachment").len(),
            1
        );
    }

    #[test]
    fn test_postgres_with_custom_parameter_group() {
        let mut stack = test_stack(TEST_STACK);
        let props = MasterPropsBuilder::new()
            .with_password("1qaz2wsx")
            .with_postgres("11.7")
            .with_custom_parameter_group(&[("rds.force_ssl", "1"), ("timezone", "UTC+8")])
            .build();
        GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap();

        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBCluster",
            &json!({
                "Engine": "aurora-postgresql",
                "DatabaseName": "globaldatabase",
                "MasterUsername": "sysadmin",
                "MasterUserPassword": "1qaz2wsx"
            }),
        );
        let group = single_resource(&stack, "AWS::RDS::DBClusterParameterGroup");
        assert_eq!(
            group.properties["Parameters"],
            json!({ "rds.force_ssl": "1", "timezone": "UTC+8" })
        );
        assert_eq!(group.properties["Family"], "aurora-postgresql11");
    }

    #[test]
    fn test_existing_parameter_group_is_referenced_by_name() {
        let mut stack = test_stack(TEST_STACK);
        let props = MasterPropsBuilder::new()
            .with_existing_parameter_group("shared-aurora-params")
            .build();
        GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap();

        assert!(resources_of_type(&stack, "AWS::RDS::DBClusterParameterGroup").is_empty());
        assert_has_resource_properties(
            &stack,
            "AWS::RDS::DBCluster",
            &json!({ "DBClusterParameterGroupName": "shared-aurora-params" }),
        );
    }

    #[test]
    fn test_upgrade_resource_declared() {
        let mut stack = test_stack(TEST_STACK);
        let master = GlobalAuroraMaster::build(&mut stack, MASTER_ID, &postgres_props()).unwrap();

        let upgrade = single_resource(&stack, UPGRADE_RESOURCE_TYPE);
        assert_eq!(
            upgrade.properties["GlobalClusterIdentifier"],
            master.global_cluster_identifier()
        );
        assert_eq!(
            upgrade.properties["SourceDBClusterIdentifier"],
            master.cluster_identifier()
        );
        assert_eq!(upgrade.properties["SourceRegion"], TEST_REGION);
        assert_eq!(upgrade.properties["Engine"], "aurora-postgresql");
        assert_eq!(upgrade.properties["EngineVersion"], "11.7");
        assert!(upgrade.properties.get("ServiceToken").is_some());

        // The promotion waits for every instance of the primary
        let instances = logical_ids_of_type(&stack, "AWS::RDS::DBInstance");
        assert_eq!(upgrade.depends_on, instances);
    }

    #[test]
    fn test_provider_function_and_code_parameters() {
        let (stack, _) = build_default_master();
        let function = single_resource(&stack, "AWS::Lambda::Function");
        assert_eq!(function.properties["Runtime"], "provided.al2023");
        assert_eq!(function.properties["Handler"], "bootstrap");
        assert_eq!(
            function.properties["Code"],
            json!({
                "S3Bucket": { "Ref": CODE_BUCKET_PARAMETER },
                "S3Key": { "Ref": CODE_KEY_PARAMETER }
            })
        );
        assert!(stack.parameter(CODE_BUCKET_PARAMETER).is_some());
        assert!(stack.parameter(CODE_KEY_PARAMETER).is_some());
        assert_eq!(resources_of_type(&stack, "AWS::IAM::Role").len(), 1);
    }

    #[test]
    fn test_global_cluster_output_reads_upgrade_attribute() {
        let (stack, master) = build_default_master();
        let template = stack.to_template();
        let output = template
            .outputs
            .values()
            .find(|o| o.value.get("Fn::GetAtt").is_some())
            .unwrap();
        assert_eq!(
            output.value,
            json!({ "Fn::GetAtt": [master.upgrade_logical_id(), "GlobalClusterIdentifier"] })
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let (first, _) = build_default_master();
        let (second, _) = build_default_master();
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_identifiers_fit_rds_limits_for_long_stack_names() {
        let mut stack = test_stack("global-database-production-primary-stack-for-orders-service");
        let props = MasterPropsBuilder::new().with_instances(3).build();
        let mut master = GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap();

        assert_eq!(master.cluster_identifier().len(), MAX_IDENTIFIER_LENGTH);
        assert!(master.global_cluster_identifier().len() <= MAX_IDENTIFIER_LENGTH);
        assert!(master.global_cluster_identifier().ends_with("-global"));

        let instance_ids: Vec<String> = resources_of_type(&stack, "AWS::RDS::DBInstance")
            .iter()
            .map(|r| r.properties["DBInstanceIdentifier"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(instance_ids.len(), 3);
        for id in &instance_ids {
            assert!(id.len() <= MAX_IDENTIFIER_LENGTH, "{id} is too long");
            assert!(!id.contains("--"));
        }

        let record = master
            .add_regional_cluster(
                &mut stack,
                "Secondary",
                &RegionalClusterOptions::new(SECONDARY_REGION, "subnets"),
            )
            .unwrap();
        assert!(record.db_cluster_identifier.len() <= MAX_IDENTIFIER_LENGTH);
        assert!(instance_identifier(&record.db_cluster_identifier, 16).len() <= MAX_IDENTIFIER_LENGTH);
    }
}

mod region_tests {
    use super::*;

    #[test]
    fn test_unsupported_region_fails_without_declaring() {
        let mut stack = test_stack_in(TEST_STACK, UNSUPPORTED_REGION);
        let err = GlobalAuroraMaster::build(&mut stack, MASTER_ID, &postgres_props()).unwrap_err();

        assert!(matches!(err, Error::RegionNotSupported(ref r) if r == UNSUPPORTED_REGION));
        assert!(err.to_string().contains(UNSUPPORTED_REGION));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_custom_region_table() {
        let ctx = Context::new(RegionCapabilityTable::new([UNSUPPORTED_REGION]));
        let mut stack = test_stack_in(TEST_STACK, UNSUPPORTED_REGION);
        assert!(
            GlobalAuroraMaster::build_with(&ctx, &mut stack, MASTER_ID, &default_master_props())
                .is_ok()
        );

        let mut stack = test_stack(TEST_STACK);
        assert!(
            GlobalAuroraMaster::build_with(&ctx, &mut stack, MASTER_ID, &default_master_props())
                .is_err()
        );
    }

    #[test]
    fn test_invalid_props_leave_stack_empty() {
        let mut stack = test_stack(TEST_STACK);
        let props = MasterPropsBuilder::new().with_instances(0).build();
        let err = GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_second_master_with_same_id_is_rejected() {
        let (mut stack, _) = build_default_master();
        let before = stack.resources().count();
        let err =
            GlobalAuroraMaster::build(&mut stack, MASTER_ID, &default_master_props()).unwrap_err();
        assert!(matches!(err, Error::DuplicateLogicalId(_)));
        assert_eq!(stack.resources().count(), before);
    }
}

mod regional_cluster_tests {
    use super::*;

    #[test]
    fn test_add_regional_cluster() {
        let mut stack = test_stack(TEST_STACK);
        let mut master =
            GlobalAuroraMaster::build(&mut stack, MASTER_ID, &postgres_props()).unwrap();

        let record = master
            .add_regional_cluster(
                &mut stack,
                "regional",
                &RegionalClusterOptions::new(SECONDARY_REGION, "mock-db-subnet-group-name"),
            )
            .unwrap();

        assert_eq!(resources_of_type(&stack, UPGRADE_RESOURCE_TYPE).len(), 1);
        let attach = single_resource(&stack, ATTACH_RESOURCE_TYPE);
        assert_eq!(attach.properties["Region"], SECONDARY_REGION);
        assert_eq!(
            attach.properties["DBSubnetGroupName"],
            "mock-db-subnet-group-name"
        );
        assert_eq!(attach.properties["Engine"], "aurora-postgresql");
        assert_eq!(attach.properties["EngineVersion"], "11.7");
        assert_eq!(attach.properties["DBInstanceClass"], "db.r5.large");
        assert_eq!(attach.properties["InstanceCount"], 2);
        assert_eq!(
            attach.properties["GlobalClusterIdentifier"],
            json!({ "Fn::GetAtt": [master.upgrade_logical_id(), "GlobalClusterIdentifier"] })
        );
        assert_eq!(attach.depends_on, vec![master.upgrade_logical_id().to_string()]);

        assert_eq!(record.region, SECONDARY_REGION);
        assert_eq!(
            record.db_cluster_identifier,
            "testing-stack-globalaurorards-ap-southeast-1"
        );
        assert_eq!(master.phase(), GlobalClusterPhase::Global { regions: 2 });
        assert_eq!(master.regional_clusters(), &[record]);
    }

    #[test]
    fn test_overrides_apply_to_secondary_only() {
        let (mut stack, mut master) = build_default_master();
        let mut options = RegionalClusterOptions::new(SECONDARY_REGION, "subnets");
        options.instance_type = Some(InstanceType::R5Xlarge);
        options.instances = Some(1);
        options.db_cluster_identifier = Some("tokyo-dr".to_string());

        let record = master
            .add_regional_cluster(&mut stack, "regional", &options)
            .unwrap();
        assert_eq!(record.instance_type, InstanceType::R5Xlarge);
        assert_eq!(record.instances, 1);
        assert_eq!(record.db_cluster_identifier, "tokyo-dr");

        let attach = single_resource(&stack, ATTACH_RESOURCE_TYPE);
        assert_eq!(attach.properties["DBInstanceClass"], "db.r5.xlarge");
        assert_eq!(attach.properties["InstanceCount"], 1);
    }

    #[test]
    fn test_several_regions() {
        let (mut stack, mut master) = build_default_master();
        for (i, region) in ["us-east-1", "eu-west-1", "ap-southeast-2"].iter().enumerate() {
            master
                .add_regional_cluster(
                    &mut stack,
                    &format!("regional{i}"),
                    &RegionalClusterOptions::new(region, "subnets"),
                )
                .unwrap();
        }
        assert_eq!(resources_of_type(&stack, ATTACH_RESOURCE_TYPE).len(), 3);
        assert_eq!(master.phase(), GlobalClusterPhase::Global { regions: 4 });
        assert_eq!(master.state().history().len(), 5);
    }

    #[test]
    fn test_unsupported_target_region() {
        let (mut stack, mut master) = build_default_master();
        let before = stack.resources().count();
        let err = master
            .add_regional_cluster(
                &mut stack,
                "regional",
                &RegionalClusterOptions::new(UNSUPPORTED_REGION, "subnets"),
            )
            .unwrap_err();

        assert!(matches!(err, Error::RegionNotSupported(ref r) if r == UNSUPPORTED_REGION));
        assert_eq!(stack.resources().count(), before);
        assert_eq!(master.phase(), GlobalClusterPhase::Global { regions: 1 });
    }

    #[test]
    fn test_primary_region_rejected() {
        let (mut stack, mut master) = build_default_master();
        let err = master
            .add_regional_cluster(
                &mut stack,
                "regional",
                &RegionalClusterOptions::new(TEST_REGION, "subnets"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_duplicate_region_rejected() {
        let (mut stack, mut master) = build_default_master();
        let options = RegionalClusterOptions::new(SECONDARY_REGION, "subnets");
        master
            .add_regional_cluster(&mut stack, "first", &options)
            .unwrap();
        let err = master
            .add_regional_cluster(&mut stack, "second", &options)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(master.regional_clusters().len(), 1);
    }

    #[test]
    fn test_other_stack_rejected() {
        let (_, mut master) = build_default_master();
        let mut other = test_stack("other-stack");
        let err = master
            .add_regional_cluster(
                &mut other,
                "regional",
                &RegionalClusterOptions::new(SECONDARY_REGION, "subnets"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(other.is_empty());
    }

    #[test]
    fn test_empty_subnet_group_name_rejected() {
        let (mut stack, mut master) = build_default_master();
        let err = master
            .add_regional_cluster(
                &mut stack,
                "regional",
                &RegionalClusterOptions::new(SECONDARY_REGION, " "),
            )
            .unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
        assert!(err.is_usage_error());
    }
}
