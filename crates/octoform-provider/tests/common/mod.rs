use octoform_client::{ClientConfig, OctopusClient};
use octoform_core::{Resource, ResourceData};
use serde_json::Value;
use std::sync::Arc;

pub const API_KEY: &str = "API-TESTKEY";

pub fn client(server: &mockito::Server) -> Arc<OctopusClient> {
    Arc::new(
        OctopusClient::new(ClientConfig::new(server.url(), API_KEY).with_space_id("Spaces-1"))
            .unwrap(),
    )
}

/// Configuration with schema defaults applied, as the runtime hands it over
pub fn config<R: Resource>(resource: &R, value: Value) -> ResourceData {
    let mut values = value.as_object().cloned().unwrap();
    resource.schema().apply_defaults(&mut values);
    ResourceData::new(values)
}

#[allow(dead_code)]
pub fn vcs_project() -> String {
    serde_json::json!({
        "Id": "Projects-123",
        "Name": "Web",
        "SpaceId": "Spaces-1",
        "DeploymentProcessId": "deploymentprocess-Projects-123",
        "PersistenceSettings": {"Type": "VersionControlled", "DefaultBranch": "main"}
    })
    .to_string()
}

#[allow(dead_code)]
pub fn database_project() -> String {
    serde_json::json!({
        "Id": "Projects-1",
        "Name": "Api",
        "SpaceId": "Spaces-1",
        "DeploymentProcessId": "deploymentprocess-Projects-1",
        "PersistenceSettings": {"Type": "Database"}
    })
    .to_string()
}
