//! Provider registration

use crate::deployment_process::{self, DeploymentProcessResource};
use crate::lifecycle::{self, LifecycleResource};
use crate::project_trigger::{self, ProjectDeploymentTargetTriggerResource};
use octoform_client::OctopusClient;
use octoform_core::{Provider, Schema};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PROVIDER_NAME: &str = "octopusdeploy";

/// Provider serving every Octopus Deploy resource through `client`
pub fn octopus_provider(client: Arc<OctopusClient>) -> Provider {
    Provider::new(PROVIDER_NAME)
        .with_resource(DeploymentProcessResource::new(client.clone()))
        .with_resource(ProjectDeploymentTargetTriggerResource::new(client.clone()))
        .with_resource(LifecycleResource::new(client))
}

/// Schemas of every resource type, available without a client
pub fn resource_schemas() -> BTreeMap<&'static str, Schema> {
    BTreeMap::from([
        (deployment_process::RESOURCE_TYPE, deployment_process::schema()),
        (project_trigger::RESOURCE_TYPE, project_trigger::schema()),
        (lifecycle::RESOURCE_TYPE, lifecycle::schema()),
    ])
}
