//! Unit tests for credential resolution

use global_aurora_rds::GlobalAuroraMaster;
use global_aurora_rds::orchestrator::credentials::resolve_credentials;
use global_aurora_rds::orchestrator::{CredentialSet, PasswordSource};
use global_aurora_rds::props::{DEFAULT_DATABASE_NAME, DEFAULT_TIME_ZONE, DEFAULT_USERNAME};
use global_aurora_rds::template::intrinsic::is_intrinsic;
use serde_json::json;

use crate::common::*;

const PATH: &[&str] = &[MASTER_ID];

mod credential_tests {
    use super::*;

    #[test]
    fn test_defaults_with_literal_password() {
        let props = MasterPropsBuilder::new().with_password("1qaz2wsx").build();
        let resolved = resolve_credentials(MASTER_ID, PATH, &props, "Cluster").unwrap();

        assert_eq!(
            resolved.credentials,
            CredentialSet {
                username: DEFAULT_USERNAME.to_string(),
                password: PasswordSource::Literal("1qaz2wsx".to_string()),
                database_name: DEFAULT_DATABASE_NAME.to_string(),
                time_zone: DEFAULT_TIME_ZONE.to_string(),
            }
        );
        assert!(resolved.declarations.is_empty());
        assert!(!is_intrinsic(&resolved.credentials.password_value()));
        assert_eq!(resolved.credentials.username_value(), json!("sysadmin"));
        assert_eq!(resolved.credentials.password_value(), json!("1qaz2wsx"));
    }

    #[test]
    fn test_managed_secret() {
        let props = MasterPropsBuilder::new().with_username("superuser").build();
        let resolved = resolve_credentials(MASTER_ID, PATH, &props, "Cluster").unwrap();

        let secret = resolved.credentials.secret_logical_id().unwrap().to_string();
        assert_eq!(resolved.declarations.resources.len(), 2);

        let (_, secret_resource) = &resolved.declarations.resources[0];
        assert_eq!(secret_resource.type_, "AWS::SecretsManager::Secret");
        let template = secret_resource.properties["GenerateSecretString"]["SecretStringTemplate"]
            .as_str()
            .unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(template).unwrap(),
            json!({ "username": "superuser" })
        );

        let (_, attachment) = &resolved.declarations.resources[1];
        assert_eq!(attachment.properties["TargetId"], json!({ "Ref": "Cluster" }));
        assert_eq!(attachment.properties["SecretId"], json!({ "Ref": secret }));

        assert_eq!(
            resolved.credentials.password_value(),
            json!({ "Fn::Join": ["", [
                "{{resolve:secretsmanager:",
                { "Ref": secret },
                ":SecretString:password::}}"
            ]] })
        );
    }

    #[test]
    fn test_username_still_recorded_with_secret() {
        let props = MasterPropsBuilder::new().with_username("superuser").build();
        let resolved = resolve_credentials(MASTER_ID, PATH, &props, "Cluster").unwrap();
        assert_eq!(resolved.credentials.username, "superuser");
    }

    #[test]
    fn test_time_zone_override() {
        let props = MasterPropsBuilder::new()
            .with_password("1qaz2wsx")
            .with_time_zone("Asia/Taipei")
            .build();
        let resolved = resolve_credentials(MASTER_ID, PATH, &props, "Cluster").unwrap();
        assert_eq!(resolved.credentials.time_zone, "Asia/Taipei");
    }

    #[test]
    fn test_managed_credentials_never_literal_in_cluster() {
        let mut stack = test_stack(TEST_STACK);
        GlobalAuroraMaster::build(&mut stack, MASTER_ID, &default_master_props()).unwrap();

        let cluster = single_resource(&stack, "AWS::RDS::DBCluster");
        assert!(is_intrinsic(&cluster.properties["MasterUsername"]));
        assert!(is_intrinsic(&cluster.properties["MasterUserPassword"]));
    }

    #[test]
    fn test_literal_credentials_in_cluster() {
        let mut stack = test_stack(TEST_STACK);
        let props = MasterPropsBuilder::new().with_password("1qaz2wsx").build();
        GlobalAuroraMaster::build(&mut stack, MASTER_ID, &props).unwrap();

        let cluster = single_resource(&stack, "AWS::RDS::DBCluster");
        assert!(!is_intrinsic(&cluster.properties["MasterUsername"]));
        assert_eq!(cluster.properties["MasterUserPassword"], json!("1qaz2wsx"));
    }
}
