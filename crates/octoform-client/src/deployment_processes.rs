//! Deployment processes service
//!
//! A project owns exactly one deployment process. Database-backed projects
//! reference it by ID; version-controlled projects keep one per git ref,
//! addressed through the project.

use crate::client::{OctopusClient, encode_segment};
use crate::error::{ClientError, Result};
use crate::projects::Project;
use crate::Links;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deployment process of a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentProcess {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub last_snapshot_id: Option<String>,
    #[serde(default)]
    pub steps: Vec<DeploymentStep>,
    #[serde(default)]
    pub links: Links,

    /// Git ref the process was fetched from; not part of the wire format
    #[serde(skip)]
    pub branch: String,
}

impl DeploymentProcess {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    /// A copy carrying only identity and concurrency metadata, with no steps
    pub fn emptied(&self) -> Self {
        Self {
            id: self.id.clone(),
            space_id: self.space_id.clone(),
            project_id: self.project_id.clone(),
            version: self.version,
            links: self.links.clone(),
            branch: self.branch.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentStep {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub start_trigger: String,
    #[serde(default)]
    pub package_requirement: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub actions: Vec<DeploymentAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentAction {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub action_type: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub worker_pool_id: Option<String>,
    #[serde(default)]
    pub environments: Vec<String>,
    #[serde(default)]
    pub excluded_environments: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub tenant_tags: Vec<String>,
    #[serde(default)]
    pub packages: Vec<PackageReference>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageReference {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub package_id: String,
    #[serde(default)]
    pub feed_id: String,
    #[serde(default)]
    pub acquisition_location: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Property bag value; sensitive values are never returned in clear text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Sensitive(SensitiveValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SensitiveValue {
    pub has_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl PropertyValue {
    /// Clear-text value, if the server disclosed one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(value) => Some(value),
            PropertyValue::Sensitive(value) => value.new_value.as_deref(),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

pub struct DeploymentProcesses<'a> {
    client: &'a OctopusClient,
}

impl<'a> DeploymentProcesses<'a> {
    pub(crate) fn new(client: &'a OctopusClient) -> Self {
        Self { client }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<DeploymentProcess> {
        tracing::debug!("Fetching deployment process {}", id);
        let path = self
            .client
            .space_path(&format!("deploymentprocesses/{}", encode_segment(id)));
        self.client.get(&path).await
    }

    /// Fetch the process of a project at a git ref
    ///
    /// Database-backed projects, or an empty ref, resolve through the
    /// project's deployment process ID.
    pub async fn get(&self, project: &Project, git_ref: &str) -> Result<DeploymentProcess> {
        if !project.is_version_controlled() || git_ref.is_empty() {
            let id = project
                .deployment_process_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| {
                    ClientError::NotFound(format!(
                        "project {} has no deployment process",
                        project.id
                    ))
                })?;
            return self.get_by_id(id).await;
        }

        tracing::debug!(
            "Fetching deployment process of {} at {}",
            project.id,
            git_ref
        );
        let path = self.client.space_path(&format!(
            "projects/{}/{}/deploymentprocesses",
            encode_segment(&project.id),
            encode_segment(git_ref)
        ));
        let mut process: DeploymentProcess = self.client.get(&path).await?;
        process.branch = git_ref.to_string();
        Ok(process)
    }

    /// Overwrite a process; the server keeps the entity and bumps its version
    pub async fn update(&self, process: &DeploymentProcess) -> Result<DeploymentProcess> {
        let path = match process.links.get("Self") {
            Some(link) => link.clone(),
            None => self.client.space_path(&format!(
                "deploymentprocesses/{}",
                encode_segment(&process.id)
            )),
        };
        tracing::debug!("Updating deployment process {} via {}", process.id, path);

        let mut updated: DeploymentProcess = self.client.put(&path, process).await?;
        updated.branch = process.branch.clone();
        Ok(updated)
    }
}
