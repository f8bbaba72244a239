mod common;

use common::{client, config};
use mockito::Matcher;
use octoform_core::{Attributes, Resource, ResourceData};
use octoform_provider::{Field, LifecycleResource};
use serde_json::json;

fn lifecycle_body() -> String {
    json!({
        "Id": "Lifecycles-1",
        "Name": "Default",
        "Description": "Standard rollout",
        "SpaceId": "Spaces-1",
        "Phases": [{
            "Id": "Phases-1",
            "Name": "Dev",
            "AutomaticDeploymentTargets": ["Environments-1"],
            "OptionalDeploymentTargets": [],
            "MinimumEnvironmentsBeforePromotion": 0,
            "IsOptionalPhase": false
        }],
        "ReleaseRetentionPolicy": {"QuantityToKeep": 5, "ShouldKeepForever": false, "Unit": "Items"},
        "TentacleRetentionPolicy": {"QuantityToKeep": 0, "ShouldKeepForever": true, "Unit": "Days"}
    })
    .to_string()
}

#[tokio::test]
async fn test_create_flattens_server_view() {
    let mut server = mockito::Server::new_async().await;
    let add = server
        .mock("POST", "/api/Spaces-1/lifecycles")
        .match_body(Matcher::PartialJson(json!({
            "Name": "Default",
            "ReleaseRetentionPolicy": {"QuantityToKeep": 5, "Unit": "Items"}
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(lifecycle_body())
        .create_async()
        .await;

    let resource = LifecycleResource::new(client(&server));
    let mut data = config(
        &resource,
        json!({
            "name": "Default",
            "description": "Standard rollout",
            "release_retention_policy": [{"quantity_to_keep": 5, "unit": "Items"}],
            "phase": [{"name": "Dev", "automatic_deployment_targets": ["Environments-1"]}]
        }),
    );

    resource.create(&mut data).await.unwrap();

    assert_eq!(data.id(), "Lifecycles-1");
    let phases = data.get_blocks(Field::Phase).unwrap();
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].get_string(Field::Id).unwrap(), "Phases-1");

    let tentacle = data.get_block(Field::TentacleRetentionPolicy).unwrap().unwrap();
    assert!(tentacle.get_bool(Field::ShouldKeepForever).unwrap());
    add.assert_async().await;
}

#[tokio::test]
async fn test_create_rejects_unknown_retention_unit() {
    let mut server = mockito::Server::new_async().await;
    let add = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let resource = LifecycleResource::new(client(&server));
    let mut data = config(
        &resource,
        json!({
            "name": "Default",
            "release_retention_policy": [{"quantity_to_keep": 5, "unit": "Weeks"}]
        }),
    );

    let diags = resource.create(&mut data).await.unwrap_err();
    assert!(diags.to_string().contains("Weeks"));
    add.assert_async().await;
}

#[tokio::test]
async fn test_read_drops_missing_lifecycle() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/Spaces-1/lifecycles/Lifecycles-9")
        .with_status(404)
        .create_async()
        .await;

    let resource = LifecycleResource::new(client(&server));
    let mut data = ResourceData::default().with_id("Lifecycles-9");

    resource.read(&mut data).await.unwrap();
    assert!(!data.has_id());
}

#[tokio::test]
async fn test_update_puts_by_id() {
    let mut server = mockito::Server::new_async().await;
    let update = server
        .mock("PUT", "/api/Spaces-1/lifecycles/Lifecycles-1")
        .match_body(Matcher::PartialJson(json!({"Id": "Lifecycles-1", "Name": "Default"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(lifecycle_body())
        .create_async()
        .await;

    let resource = LifecycleResource::new(client(&server));
    let mut data = config(&resource, json!({"name": "Default"})).with_id("Lifecycles-1");

    resource.update(&mut data).await.unwrap();

    assert_eq!(data.get_string(Field::Description).unwrap(), "Standard rollout");
    update.assert_async().await;
}

#[tokio::test]
async fn test_delete_removes_lifecycle() {
    let mut server = mockito::Server::new_async().await;
    let delete = server
        .mock("DELETE", "/api/Spaces-1/lifecycles/Lifecycles-1")
        .with_status(200)
        .create_async()
        .await;

    let resource = LifecycleResource::new(client(&server));
    let mut data = ResourceData::default().with_id("Lifecycles-1");

    resource.delete(&mut data).await.unwrap();

    assert!(!data.has_id());
    delete.assert_async().await;
}
