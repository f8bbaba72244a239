//! `octopusdeploy_deployment_process` resource
//!
//! A project always owns a deployment process, so "create" overwrites the
//! existing one and "delete" empties it. Identifiers come in two forms,
//! see [`ProcessId`].

use crate::deployment_step::{expand_steps, flatten_steps, step_schema};
use crate::error::ResourceError;
use crate::fields::Field;
use crate::identifier::ProcessId;
use async_trait::async_trait;
use octoform_client::{DeploymentProcess, OctopusClient, Project};
use octoform_core::{
    Attribute, Attributes, CrudResult, Resource, ResourceData, Result, Schema,
};
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "octopusdeploy_deployment_process";

pub fn schema() -> Schema {
    Schema::new()
        .with_description("This resource manages deployment processes in Octopus Deploy.")
        .with_attribute(Attribute::string(Field::Id).computed())
        .with_attribute(
            Attribute::string(Field::Branch)
                .optional_computed()
                .with_description(
                    "The branch name associated with this deployment process (i.e. `main`). \
                     This value is optional and only applies to associated projects that are \
                     stored in version control.",
                ),
        )
        .with_attribute(Attribute::string(Field::LastSnapshotId))
        .with_attribute(
            Attribute::string(Field::ProjectId)
                .required()
                .with_description("The project ID associated with this deployment process."),
        )
        .with_attribute(
            Attribute::string(Field::SpaceId)
                .optional_computed()
                .with_description("The space ID associated with this resource."),
        )
        .with_attribute(Attribute::block(Field::Step, step_schema()))
        .with_attribute(
            Attribute::int(Field::Version)
                .optional_computed()
                .with_description("The version number of this deployment process."),
        )
}

/// Build the API payload from configuration
pub fn expand_deployment_process(data: &ResourceData) -> Result<DeploymentProcess> {
    let mut process = DeploymentProcess::new(data.require_string(Field::ProjectId)?);
    process.id = data.id().to_string();
    process.branch = data.get_string(Field::Branch)?;
    process.space_id = data.get_optional_string(Field::SpaceId)?;
    process.last_snapshot_id = data.get_optional_string(Field::LastSnapshotId)?;
    process.version = data.get_int(Field::Version)?;
    process.steps = expand_steps(&data.get_blocks(Field::Step)?)?;
    Ok(process)
}

/// Record the server's view of a process
pub fn set_deployment_process(data: &mut ResourceData, process: &DeploymentProcess) -> Result<()> {
    data.set(Field::Branch, &process.branch)?;
    data.set(Field::LastSnapshotId, &process.last_snapshot_id)?;
    data.set(Field::ProjectId, &process.project_id)?;
    data.set(Field::SpaceId, &process.space_id)?;
    data.set(Field::Version, process.version)?;
    data.set(Field::Step, flatten_steps(&process.steps))?;
    Ok(())
}

pub struct DeploymentProcessResource {
    client: Arc<OctopusClient>,
}

impl DeploymentProcessResource {
    pub fn new(client: Arc<OctopusClient>) -> Self {
        Self { client }
    }

    /// Branch to operate on: configured, else the one in the identifier,
    /// else the project's default branch
    fn effective_branch(configured: &str, id: &ProcessId, project: &Project) -> String {
        if !configured.is_empty() {
            return configured.to_string();
        }
        id.git_ref()
            .or_else(|| project.default_branch())
            .unwrap_or_default()
            .to_string()
    }

    /// Locate a process through its project when the ID is not a server ID
    async fn resolve_by_project(
        &self,
        id: &ProcessId,
    ) -> std::result::Result<DeploymentProcess, ResourceError> {
        let project_id = id
            .project_id()
            .ok_or_else(|| ResourceError::UnresolvableId(id.to_string()))?;
        let project = self.client.projects().get_by_id(project_id).await?;
        let git_ref = id.git_ref().unwrap_or_default();
        Ok(self
            .client
            .deployment_processes()
            .get(&project, git_ref)
            .await?)
    }
}

#[async_trait]
impl Resource for DeploymentProcessResource {
    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> CrudResult {
        let mut process = expand_deployment_process(data)?;
        tracing::info!("creating deployment process for {}", process.project_id);

        let project = self
            .client
            .projects()
            .get_by_id(&process.project_id)
            .await?;
        let version_controlled = project.is_version_controlled();
        if version_controlled && process.branch.is_empty() {
            process.branch = project.default_branch().unwrap_or_default().to_string();
        }

        let current = self
            .client
            .deployment_processes()
            .get(&project, &process.branch)
            .await?;

        process.id = current.id;
        process.links = current.links;
        process.version = current.version;

        let created = self.client.deployment_processes().update(&process).await?;
        set_deployment_process(data, &created)?;

        let id = if version_controlled {
            ProcessId::version_controlled(&project.id, &process.branch)
        } else {
            ProcessId::Simple(created.id.clone())
        };
        data.set_id(id.to_string());

        tracing::info!("deployment process created ({})", data.id());
        Ok(())
    }

    async fn read(&self, data: &mut ResourceData) -> CrudResult {
        let raw_id = data.id().to_string();
        tracing::info!("reading deployment process ({})", raw_id);

        let processes = self.client.deployment_processes();
        match processes.get_by_id(&raw_id).await {
            Ok(mut process) => {
                // Server IDs do not carry the branch
                if process.branch.is_empty() {
                    process.branch = data.get_string(Field::Branch)?;
                }
                set_deployment_process(data, &process)?;
                tracing::info!("deployment process read ({})", raw_id);
                return Ok(());
            }
            Err(e) => tracing::debug!("direct lookup of {} failed: {}", raw_id, e),
        }

        let id = ProcessId::parse(&raw_id);
        let Some(project_id) = id.project_id() else {
            tracing::warn!("deployment process ({}) not found; removing from state", raw_id);
            data.clear_id();
            return Ok(());
        };

        let project = match self.client.projects().get_by_id(project_id).await {
            Ok(project) => project,
            Err(e) if e.is_not_found() => {
                tracing::warn!("project ({}) not found; removing deployment process from state", project_id);
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let git_ref = id.git_ref().unwrap_or_default();
        match processes.get(&project, git_ref).await {
            Ok(process) => {
                set_deployment_process(data, &process)?;
                tracing::info!("deployment process read ({})", raw_id);
            }
            Err(e) => {
                tracing::warn!(
                    "deployment process ({}) not found ({}); removing from state",
                    raw_id,
                    e
                );
                data.clear_id();
            }
        }
        Ok(())
    }

    async fn update(&self, data: &mut ResourceData) -> CrudResult {
        let mut process = expand_deployment_process(data)?;
        let raw_id = data.id().to_string();
        tracing::info!("updating deployment process ({})", raw_id);

        let processes = self.client.deployment_processes();
        let current = match processes.get_by_id(&raw_id).await {
            Ok(current) => current,
            Err(e) => {
                tracing::debug!("direct lookup of {} failed: {}", raw_id, e);

                let id = ProcessId::parse(&raw_id);
                let project_id = id
                    .project_id()
                    .ok_or_else(|| ResourceError::UnresolvableId(raw_id.clone()))?;
                let project = self.client.projects().get_by_id(project_id).await?;

                let requested = process.branch.clone();
                process.branch = Self::effective_branch(&requested, &id, &project);

                // No recoverable ref means the process is being converted, not moved
                if let Some(git_ref) = id.git_ref() {
                    if process.branch != git_ref {
                        return Err(ResourceError::BranchChanged {
                            current: git_ref.to_string(),
                            requested: process.branch.clone(),
                        }
                        .into());
                    }
                }

                if project.is_version_controlled() {
                    data.set_id(ProcessId::version_controlled(project_id, &process.branch).to_string());
                }

                processes.get(&project, &process.branch).await?
            }
        };

        process.id = current.id;
        process.links = current.links;
        process.version = current.version;

        let updated = processes.update(&process).await?;
        set_deployment_process(data, &updated)?;

        tracing::info!("deployment process updated ({})", data.id());
        Ok(())
    }

    async fn delete(&self, data: &mut ResourceData) -> CrudResult {
        let raw_id = data.id().to_string();
        tracing::info!("deleting deployment process ({})", raw_id);

        let processes = self.client.deployment_processes();
        let current = match processes.get_by_id(&raw_id).await {
            Ok(current) => current,
            Err(e) => {
                tracing::debug!("direct lookup of {} failed: {}", raw_id, e);
                self.resolve_by_project(&ProcessId::parse(&raw_id)).await?
            }
        };

        processes.update(&current.emptied()).await?;
        data.clear_id();

        tracing::info!("deployment process deleted");
        Ok(())
    }
}
