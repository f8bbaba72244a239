mod common;

use common::{client, config, database_project, vcs_project};
use mockito::Matcher;
use octoform_core::{Attributes, Resource};
use octoform_provider::{DeploymentProcessResource, Field};
use serde_json::json;

const VCS_PROCESS_PATH: &str = "/api/Spaces-1/projects/Projects-123/main/deploymentprocesses";

fn vcs_process(version: i64) -> String {
    json!({
        "Id": "deploymentprocess-Projects-123",
        "ProjectId": "Projects-123",
        "SpaceId": "Spaces-1",
        "Version": version,
        "Steps": [],
        "Links": {"Self": VCS_PROCESS_PATH}
    })
    .to_string()
}

#[tokio::test]
async fn test_create_on_version_controlled_project_uses_composite_id() {
    let mut server = mockito::Server::new_async().await;
    let project = server
        .mock("GET", "/api/Spaces-1/projects/Projects-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_project())
        .create_async()
        .await;
    let current = server
        .mock("GET", VCS_PROCESS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_process(2))
        .create_async()
        .await;
    let update = server
        .mock("PUT", VCS_PROCESS_PATH)
        .match_body(Matcher::PartialJson(json!({
            "Id": "deploymentprocess-Projects-123",
            "ProjectId": "Projects-123",
            "Version": 2
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "Id": "deploymentprocess-Projects-123",
                "ProjectId": "Projects-123",
                "SpaceId": "Spaces-1",
                "Version": 3,
                "Steps": [{
                    "Id": "Steps-1",
                    "Name": "Hello",
                    "Condition": "Success",
                    "StartTrigger": "StartAfterPrevious",
                    "PackageRequirement": "LetOctopusDecide",
                    "Properties": {"Octopus.Action.TargetRoles": "web"},
                    "Actions": [{
                        "Id": "Actions-1",
                        "Name": "Say hello",
                        "ActionType": "Octopus.Script",
                        "Properties": {"Octopus.Action.Script.ScriptBody": "echo hello"}
                    }]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = config(
        &resource,
        json!({
            "project_id": "Projects-123",
            "branch": "main",
            "step": [{
                "name": "Hello",
                "target_roles": ["web"],
                "action": [{
                    "name": "Say hello",
                    "action_type": "Octopus.Script",
                    "properties": {"Octopus.Action.Script.ScriptBody": "echo hello"}
                }]
            }]
        }),
    );

    resource.create(&mut data).await.unwrap();

    assert_eq!(data.id(), "deploymentprocess-Projects-123-main");
    assert_eq!(data.get_int(Field::Version).unwrap(), 3);
    assert_eq!(data.get_string(Field::Branch).unwrap(), "main");

    let steps = data.get_blocks(Field::Step).unwrap();
    assert_eq!(steps[0].get_string(Field::Id).unwrap(), "Steps-1");
    assert_eq!(
        steps[0].get_string_list(Field::TargetRoles).unwrap(),
        vec!["web"]
    );

    project.assert_async().await;
    current.assert_async().await;
    update.assert_async().await;
}

#[tokio::test]
async fn test_create_without_branch_uses_default_branch() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_project())
        .create_async()
        .await;
    server
        .mock("GET", VCS_PROCESS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_process(1))
        .create_async()
        .await;
    server
        .mock("PUT", VCS_PROCESS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_process(2))
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = config(&resource, json!({"project_id": "Projects-123"}));

    resource.create(&mut data).await.unwrap();
    assert_eq!(data.id(), "deploymentprocess-Projects-123-main");
}

#[tokio::test]
async fn test_create_on_database_project_uses_server_id() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(database_project())
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"Id": "deploymentprocess-Projects-1", "ProjectId": "Projects-1", "Version": 7}"#)
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-1")
        .match_body(Matcher::PartialJson(json!({"Version": 7})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"Id": "deploymentprocess-Projects-1", "ProjectId": "Projects-1", "Version": 8}"#)
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = config(&resource, json!({"project_id": "Projects-1"}));

    resource.create(&mut data).await.unwrap();

    assert_eq!(data.id(), "deploymentprocess-Projects-1");
    assert_eq!(data.get_int(Field::Version).unwrap(), 8);
    update.assert_async().await;
}

#[tokio::test]
async fn test_update_rejects_branch_change() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-123-main",
        )
        .with_status(404)
        .with_body(r#"{"ErrorMessage": "not found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_project())
        .create_async()
        .await;
    let put = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = config(
        &resource,
        json!({"project_id": "Projects-123", "branch": "feature"}),
    )
    .with_id("deploymentprocess-Projects-123-main");

    let diags = resource.update(&mut data).await.unwrap_err();

    assert!(
        diags
            .to_string()
            .contains("you cannot change a deployment processes branch")
    );
    assert_eq!(data.id(), "deploymentprocess-Projects-123-main");
    put.assert_async().await;
}

#[tokio::test]
async fn test_update_through_project_and_branch() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-123-main",
        )
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_project())
        .create_async()
        .await;
    server
        .mock("GET", VCS_PROCESS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_process(4))
        .create_async()
        .await;
    let update = server
        .mock("PUT", VCS_PROCESS_PATH)
        .match_body(Matcher::PartialJson(json!({
            "Id": "deploymentprocess-Projects-123",
            "Version": 4
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_process(5))
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = config(&resource, json!({"project_id": "Projects-123"}))
        .with_id("deploymentprocess-Projects-123-main");

    resource.update(&mut data).await.unwrap();

    assert_eq!(data.id(), "deploymentprocess-Projects-123-main");
    assert_eq!(data.get_string(Field::Branch).unwrap(), "main");
    assert_eq!(data.get_int(Field::Version).unwrap(), 5);
    update.assert_async().await;
}

#[tokio::test]
async fn test_read_drops_missing_process() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-123-main",
        )
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_project())
        .create_async()
        .await;
    server
        .mock("GET", VCS_PROCESS_PATH)
        .with_status(404)
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = octoform_core::ResourceData::default()
        .with_id("deploymentprocess-Projects-123-main");

    resource.read(&mut data).await.unwrap();
    assert!(!data.has_id());
}

#[tokio::test]
async fn test_read_drops_process_of_missing_project() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-123-main",
        )
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-123")
        .with_status(404)
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = octoform_core::ResourceData::default()
        .with_id("deploymentprocess-Projects-123-main");

    resource.read(&mut data).await.unwrap();
    assert!(!data.has_id());
}

#[tokio::test]
async fn test_read_reports_project_lookup_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-123-main",
        )
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-123")
        .with_status(401)
        .with_body(r#"{"ErrorMessage": "You must be logged in to request this resource."}"#)
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = octoform_core::ResourceData::default()
        .with_id("deploymentprocess-Projects-123-main");

    let diags = resource.read(&mut data).await.unwrap_err();
    assert!(diags.has_errors());
    assert!(data.has_id());
}

#[tokio::test]
async fn test_delete_empties_process_without_removing_it() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-123-main",
        )
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_project())
        .create_async()
        .await;
    server
        .mock("GET", VCS_PROCESS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "Id": "deploymentprocess-Projects-123",
                "ProjectId": "Projects-123",
                "Version": 9,
                "Steps": [{"Id": "Steps-1", "Name": "Hello"}],
                "Links": {"Self": VCS_PROCESS_PATH}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let emptied = server
        .mock("PUT", VCS_PROCESS_PATH)
        .match_body(Matcher::PartialJson(json!({"Version": 9, "Steps": []})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_process(10))
        .create_async()
        .await;
    let removed = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = octoform_core::ResourceData::default()
        .with_id("deploymentprocess-Projects-123-main");

    resource.delete(&mut data).await.unwrap();

    assert!(!data.has_id());
    emptied.assert_async().await;
    removed.assert_async().await;
}

fn feature_project() -> String {
    json!({
        "Id": "Projects-7",
        "Name": "Checkout",
        "SpaceId": "Spaces-1",
        "PersistenceSettings": {"Type": "VersionControlled", "DefaultBranch": "main"}
    })
    .to_string()
}

fn process_at(path: &str, version: i64) -> String {
    json!({
        "Id": "deploymentprocess-Projects-7",
        "ProjectId": "Projects-7",
        "SpaceId": "Spaces-1",
        "Version": version,
        "Steps": [],
        "Links": {"Self": path}
    })
    .to_string()
}

#[tokio::test]
async fn test_update_keeps_hyphenated_branch() {
    const PATH: &str = "/api/Spaces-1/projects/Projects-7/feature-login/deploymentprocesses";

    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-7-feature-login",
        )
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(feature_project())
        .create_async()
        .await;
    server
        .mock("GET", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(process_at(PATH, 3))
        .create_async()
        .await;
    let update = server
        .mock("PUT", PATH)
        .match_body(Matcher::PartialJson(json!({"Version": 3})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(process_at(PATH, 4))
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = config(
        &resource,
        json!({"project_id": "Projects-7", "branch": "feature-login"}),
    )
    .with_id("deploymentprocess-Projects-7-feature-login");

    resource.update(&mut data).await.unwrap();

    assert_eq!(data.id(), "deploymentprocess-Projects-7-feature-login");
    assert_eq!(data.get_string(Field::Branch).unwrap(), "feature-login");
    assert_eq!(data.get_int(Field::Version).unwrap(), 4);
    update.assert_async().await;
}

#[tokio::test]
async fn test_read_keeps_branch_with_slash() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/api/Spaces-1/deploymentprocesses/".to_string()),
        )
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(feature_project())
        .create_async()
        .await;
    let by_branch = server
        .mock(
            "GET",
            Matcher::Regex(
                r"^/api/Spaces-1/projects/Projects-7/release(%2F|/)1\.0/deploymentprocesses$"
                    .to_string(),
            ),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(process_at(
            "/api/Spaces-1/projects/Projects-7/release%2F1.0/deploymentprocesses",
            6,
        ))
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = octoform_core::ResourceData::default()
        .with_id("deploymentprocess-Projects-7-release/1.0");

    resource.read(&mut data).await.unwrap();

    assert_eq!(data.id(), "deploymentprocess-Projects-7-release/1.0");
    assert_eq!(data.get_string(Field::Branch).unwrap(), "release/1.0");
    assert_eq!(data.get_int(Field::Version).unwrap(), 6);
    by_branch.assert_async().await;
}

#[tokio::test]
async fn test_update_moves_server_id_to_composite_id() {
    const PATH: &str = "/api/Spaces-1/projects/Projects-123/develop/deploymentprocesses";

    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-123",
        )
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/Spaces-1/projects/Projects-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vcs_project())
        .create_async()
        .await;
    server
        .mock("GET", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(process_at(PATH, 1))
        .create_async()
        .await;
    let update = server
        .mock("PUT", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(process_at(PATH, 2))
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = config(
        &resource,
        json!({"project_id": "Projects-123", "branch": "develop"}),
    )
    .with_id("deploymentprocess-Projects-123");

    resource.update(&mut data).await.unwrap();

    assert_eq!(data.id(), "deploymentprocess-Projects-123-develop");
    assert_eq!(data.get_string(Field::Branch).unwrap(), "develop");
    update.assert_async().await;
}

#[tokio::test]
async fn test_read_by_server_id_keeps_configured_branch() {
    let mut server = mockito::Server::new_async().await;
    let direct = server
        .mock(
            "GET",
            "/api/Spaces-1/deploymentprocesses/deploymentprocess-Projects-1",
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "Id": "deploymentprocess-Projects-1",
                "ProjectId": "Projects-1",
                "SpaceId": "Spaces-1",
                "Version": 12,
                "Steps": [{
                    "Id": "Steps-1",
                    "Name": "Hello",
                    "Actions": [{"Id": "Actions-1", "Name": "Say hello", "ActionType": "Octopus.Script"}]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let project = server
        .mock("GET", Matcher::Regex(r"^/api/Spaces-1/projects/".to_string()))
        .expect(0)
        .create_async()
        .await;

    let resource = DeploymentProcessResource::new(client(&server));
    let mut data = config(
        &resource,
        json!({"project_id": "Projects-1", "branch": "main"}),
    )
    .with_id("deploymentprocess-Projects-1");

    resource.read(&mut data).await.unwrap();

    assert_eq!(data.id(), "deploymentprocess-Projects-1");
    assert_eq!(data.get_string(Field::Branch).unwrap(), "main");
    assert_eq!(data.get_int(Field::Version).unwrap(), 12);
    let steps = data.get_blocks(Field::Step).unwrap();
    assert_eq!(steps[0].get_string(Field::Name).unwrap(), "Hello");
    direct.assert_async().await;
    project.assert_async().await;
}
