//! Project triggers service

use crate::client::{OctopusClient, encode_segment};
use crate::error::Result;
use crate::Links;
use serde::{Deserialize, Serialize};

/// Rule that acts on a project when deployment targets change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectTrigger {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
    pub filter: TriggerFilter,
    pub action: TriggerAction,
    #[serde(default)]
    pub links: Links,
}

impl ProjectTrigger {
    /// Auto-deploy trigger fired by deployment target events
    pub fn deployment_target(
        name: impl Into<String>,
        project_id: impl Into<String>,
        should_redeploy: bool,
    ) -> Self {
        Self {
            name: name.into(),
            project_id: project_id.into(),
            filter: TriggerFilter::machine(),
            action: TriggerAction::auto_deploy(should_redeploy),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TriggerFilter {
    pub filter_type: String,
    #[serde(default, rename = "EnvironmentIds")]
    pub environment_ids: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub event_groups: Vec<String>,
    #[serde(default)]
    pub event_categories: Vec<String>,
}

impl TriggerFilter {
    pub fn machine() -> Self {
        Self {
            filter_type: "MachineFilter".to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TriggerAction {
    pub action_type: String,
    #[serde(default)]
    pub should_redeploy_when_machine_has_been_deployed_to: bool,
}

impl TriggerAction {
    pub fn auto_deploy(should_redeploy: bool) -> Self {
        Self {
            action_type: "AutoDeploy".to_string(),
            should_redeploy_when_machine_has_been_deployed_to: should_redeploy,
        }
    }
}

pub struct ProjectTriggers<'a> {
    client: &'a OctopusClient,
}

impl<'a> ProjectTriggers<'a> {
    pub(crate) fn new(client: &'a OctopusClient) -> Self {
        Self { client }
    }

    fn collection(&self) -> String {
        self.client.space_path("projecttriggers")
    }

    fn member(&self, id: &str) -> String {
        format!("{}/{}", self.collection(), encode_segment(id))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<ProjectTrigger> {
        self.client.get(&self.member(id)).await
    }

    pub async fn add(&self, trigger: &ProjectTrigger) -> Result<ProjectTrigger> {
        tracing::debug!("Adding project trigger {}", trigger.name);
        self.client.post(&self.collection(), trigger).await
    }

    pub async fn update(&self, trigger: &ProjectTrigger) -> Result<ProjectTrigger> {
        tracing::debug!("Updating project trigger {}", trigger.id);
        self.client.put(&self.member(&trigger.id), trigger).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        tracing::debug!("Deleting project trigger {}", id);
        self.client.delete(&self.member(id)).await
    }
}
