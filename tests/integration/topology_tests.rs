//! End-to-end: synthesize a topology, then deploy its lifecycle resources

use global_aurora_rds::provider::{
    ATTACH_RESOURCE_TYPE, GlobalClusterApi, InMemoryGlobalClusterApi, LifecycleProvider,
    RequestType, UPGRADE_RESOURCE_TYPE,
};
use global_aurora_rds::{Context, DeploymentConfig, Stack};

use crate::common::*;

const TOPOLOGY: &str = r#"{
    "master": { "stackName": "primary", "region": "us-east-1" },
    "secondaries": [
        { "stackName": "ireland", "region": "eu-west-1" },
        { "stackName": "tokyo", "region": "ap-northeast-1", "cluster": { "instances": 1 } }
    ]
}"#;

/// Run every lifecycle resource of the primary stack, upgrade first
///
/// Returns the global cluster identifier reported by the upgrade.
async fn deploy_lifecycle(
    provider: &LifecycleProvider<InMemoryGlobalClusterApi>,
    stack: &Stack,
    request_type: RequestType,
) -> String {
    let (upgrade_id, upgrade) = stack.resources_of_type(UPGRADE_RESOURCE_TYPE).next().unwrap();
    let request = custom_resource_request(
        request_type,
        UPGRADE_RESOURCE_TYPE,
        upgrade_id,
        deployed_properties(upgrade, &[]),
    );
    let response = provider.handle(&request).await;
    assert!(response.is_success(), "{:?}", response.reason);
    let global = response.data["GlobalClusterIdentifier"].clone();

    for (attach_id, attach) in stack.resources_of_type(ATTACH_RESOURCE_TYPE) {
        let request = custom_resource_request(
            request_type,
            ATTACH_RESOURCE_TYPE,
            attach_id,
            deployed_properties(attach, &[("GlobalClusterIdentifier", global.as_str())]),
        );
        let response = provider.handle(&request).await;
        assert!(response.is_success(), "{attach_id}: {:?}", response.reason);
    }
    global
}

#[tokio::test]
async fn test_deploy_synthesized_topology() {
    let synthesized = DeploymentConfig::from_json(TOPOLOGY)
        .unwrap()
        .synthesize(&Context::default())
        .unwrap();
    let master = &synthesized.master;
    let primary = synthesized.stack("primary").unwrap();

    // CloudFormation creates the primary cluster before the upgrade runs
    let api = InMemoryGlobalClusterApi::new(TEST_ACCOUNT);
    api.add_cluster(
        master.region(),
        master.cluster_identifier(),
        master.engine().engine_name(),
        &master.engine().version,
    )
    .await;
    let provider = LifecycleProvider::new(api);

    let global_id = deploy_lifecycle(&provider, primary, RequestType::Create).await;
    assert_eq!(global_id, master.global_cluster_identifier());

    let global = provider
        .api()
        .describe_global_cluster(&global_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(global.members.len(), 3);
    assert_eq!(
        global.writer().unwrap().db_cluster_identifier,
        master.cluster_identifier()
    );
    for record in master.regional_clusters() {
        let member = global.member_in(&record.region).unwrap();
        assert_eq!(member.db_cluster_identifier, record.db_cluster_identifier);
        assert!(!member.is_writer);

        let cluster = provider
            .api()
            .describe_cluster(&record.region, &record.db_cluster_identifier)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cluster.instances.len() as u32, record.instances);
        assert_eq!(cluster.engine_version, master.engine().version);
    }

    // A stack update re-sends every request; nothing changes
    let calls = provider.api().calls().await;
    deploy_lifecycle(&provider, primary, RequestType::Update).await;
    assert_eq!(provider.api().calls().await, calls);
}

#[test]
fn test_secondary_stacks_are_independent_of_the_provider() {
    let synthesized = DeploymentConfig::from_json(TOPOLOGY)
        .unwrap()
        .synthesize(&Context::default())
        .unwrap();

    for stack in synthesized.secondary_stacks() {
        assert!(stack.resources_of_type(UPGRADE_RESOURCE_TYPE).next().is_none());
        assert!(stack.resources_of_type("AWS::Lambda::Function").next().is_none());
        assert!(stack.parameter("GlobalClusterProviderCodeBucket").is_none());
    }
}
