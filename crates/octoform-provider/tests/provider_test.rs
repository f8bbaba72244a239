mod common;

use common::client;
use octoform_core::{GlobalState, ResourceConfig, ResourceSet};
use octoform_provider::octopus_provider;
use serde_json::json;

#[tokio::test]
async fn test_apply_and_refresh_lifecycle() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "Id": "Lifecycles-7",
        "Name": "Default",
        "Description": "",
        "SpaceId": "Spaces-1",
        "Phases": [],
        "ReleaseRetentionPolicy": {"QuantityToKeep": 0, "ShouldKeepForever": true, "Unit": "Days"},
        "TentacleRetentionPolicy": {"QuantityToKeep": 0, "ShouldKeepForever": true, "Unit": "Days"}
    })
    .to_string();
    server
        .mock("POST", "/api/Spaces-1/lifecycles")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(&body)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/Spaces-1/lifecycles/Lifecycles-7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(&body)
        .create_async()
        .await;

    let provider = octopus_provider(client(&server));
    let mut desired = ResourceSet::new();
    desired
        .add(ResourceConfig::new(
            "octopusdeploy_lifecycle",
            "default",
            json!({"name": "Default"}),
        ))
        .unwrap();

    assert!(!provider.validate(&desired).has_errors());

    let mut state = GlobalState::new();
    let plan = provider.plan(&desired, &state).unwrap();
    assert_eq!(plan.summary().create, 1);

    let result = provider.apply(&plan, &desired, &mut state).await;
    assert!(result.is_success(), "{:?}", result.failed);
    assert_eq!(
        state.get_resource("octopusdeploy_lifecycle.default").unwrap().id,
        "Lifecycles-7"
    );

    let diags = provider.refresh(&mut state).await;
    assert!(diags.is_empty(), "{}", diags);
    get.assert_async().await;

    let plan = provider.plan(&desired, &state).unwrap();
    assert!(!plan.has_changes, "{:?}", plan.actions);
}

#[test]
fn test_validate_reports_missing_required_attribute() {
    let server = mockito::Server::new();
    let provider = octopus_provider(client(&server));
    let mut desired = ResourceSet::new();
    desired
        .add(ResourceConfig::new(
            "octopusdeploy_project_deployment_target_trigger",
            "redeploy",
            json!({"name": "Redeploy"}),
        ))
        .unwrap();

    let diags = provider.validate(&desired);
    assert!(diags.has_errors());
    assert!(
        diags
            .iter()
            .any(|d| d.attribute.as_deref()
                == Some("octopusdeploy_project_deployment_target_trigger.redeploy.project_id"))
    );
}
