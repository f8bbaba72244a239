//! `octopusdeploy_project_deployment_target_trigger` resource

use crate::error::ResourceError;
use crate::fields::Field;
use async_trait::async_trait;
use octoform_client::{OctopusClient, ProjectTrigger};
use octoform_core::{Attribute, Attributes, CrudResult, Resource, ResourceData, Schema};
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "octopusdeploy_project_deployment_target_trigger";

pub const EVENT_GROUPS: &[&str] = &[
    "Machine",
    "MachineCritical",
    "MachineAvailableForDeployment",
    "MachineUnavailableForDeployment",
    "MachineHealthChanged",
];

pub const EVENT_CATEGORIES: &[&str] = &[
    "MachineCleanupFailed",
    "MachineAdded",
    "MachineDeploymentRelatedPropertyWasUpdated",
    "MachineDisabled",
    "MachineEnabled",
    "MachineHealthy",
    "MachineUnavailable",
    "MachineUnhealthy",
    "MachineHasWarnings",
];

pub fn schema() -> Schema {
    Schema::new()
        .with_description(
            "This resource manages project triggers that redeploy when deployment targets change.",
        )
        .with_attribute(Attribute::string(Field::Id).computed())
        .with_attribute(
            Attribute::string(Field::Name)
                .required()
                .with_description("The name of this trigger."),
        )
        .with_attribute(
            Attribute::string(Field::ProjectId)
                .required()
                .with_description("The ID of the project to attach the trigger."),
        )
        .with_attribute(
            Attribute::bool(Field::ShouldRedeploy)
                .with_default(false)
                .with_description(
                    "Enable to re-deploy to the deployment targets even if they are already \
                     up-to-date with the current deployment.",
                ),
        )
        .with_attribute(
            Attribute::string_list(Field::EventGroups)
                .with_description("Apply event group filters to restrict which deployment targets will actually cause the trigger to fire, and consequently, which deployment targets will be automatically deployed to."),
        )
        .with_attribute(
            Attribute::string_list(Field::EventCategories)
                .with_description("Apply event category filters to restrict which deployment targets will actually cause the trigger to fire, and consequently, which deployment targets will be automatically deployed to."),
        )
        .with_attribute(
            Attribute::string_list(Field::Roles)
                .with_description("Apply event role filters to restrict which deployment targets will actually cause the trigger to fire, and consequently, which deployment targets will be automatically deployed to."),
        )
        .with_attribute(
            Attribute::string_list(Field::EnvironmentIds)
                .with_description("Apply environment id filters to restrict which deployment targets will actually cause the trigger to fire, and consequently, which deployment targets will be automatically deployed to."),
        )
}

/// Every value must be in `allowed`; the first offender is reported
fn check_all_in(
    attribute: Field,
    values: &[String],
    allowed: &'static [&'static str],
) -> std::result::Result<(), ResourceError> {
    match values.iter().find(|v| !allowed.contains(&v.as_str())) {
        Some(invalid) => Err(ResourceError::InvalidValue {
            attribute: attribute.key(),
            value: invalid.clone(),
            allowed,
        }),
        None => Ok(()),
    }
}

/// Build the API payload, rejecting unknown event groups and categories
pub fn build_project_deployment_target_trigger(
    data: &ResourceData,
) -> std::result::Result<ProjectTrigger, ResourceError> {
    let mut trigger = ProjectTrigger::deployment_target(
        data.get_string(Field::Name)?,
        data.get_string(Field::ProjectId)?,
        data.get_bool(Field::ShouldRedeploy)?,
    );

    let event_groups = data.get_string_list(Field::EventGroups)?;
    check_all_in(Field::EventGroups, &event_groups, EVENT_GROUPS)?;
    trigger.filter.event_groups = event_groups;

    let event_categories = data.get_string_list(Field::EventCategories)?;
    check_all_in(Field::EventCategories, &event_categories, EVENT_CATEGORIES)?;
    trigger.filter.event_categories = event_categories;

    trigger.filter.roles = data.get_string_list(Field::Roles)?;
    trigger.filter.environment_ids = data.get_string_list(Field::EnvironmentIds)?;

    Ok(trigger)
}

fn set_project_trigger(
    data: &mut ResourceData,
    trigger: &ProjectTrigger,
) -> octoform_core::Result<()> {
    data.set(Field::EnvironmentIds, &trigger.filter.environment_ids)?;
    data.set(Field::EventGroups, &trigger.filter.event_groups)?;
    data.set(Field::EventCategories, &trigger.filter.event_categories)?;
    data.set(Field::Name, &trigger.name)?;
    data.set(Field::ProjectId, &trigger.project_id)?;
    data.set(Field::Roles, &trigger.filter.roles)?;
    data.set(
        Field::ShouldRedeploy,
        trigger.action.should_redeploy_when_machine_has_been_deployed_to,
    )?;
    Ok(())
}

pub struct ProjectDeploymentTargetTriggerResource {
    client: Arc<OctopusClient>,
}

impl ProjectDeploymentTargetTriggerResource {
    pub fn new(client: Arc<OctopusClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ProjectDeploymentTargetTriggerResource {
    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> CrudResult {
        let trigger = build_project_deployment_target_trigger(data)?;
        tracing::info!("creating project trigger {}", trigger.name);

        let created = self.client.project_triggers().add(&trigger).await?;
        if created.id.is_empty() {
            tracing::warn!("project trigger {} was created without an ID", trigger.name);
        } else {
            data.set_id(created.id);
        }
        Ok(())
    }

    async fn read(&self, data: &mut ResourceData) -> CrudResult {
        let trigger = match self.client.project_triggers().get_by_id(data.id()).await {
            Ok(trigger) => trigger,
            Err(e) if e.is_not_found() => {
                tracing::warn!("project trigger ({}) not found; removing from state", data.id());
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        set_project_trigger(data, &trigger)?;
        tracing::debug!("project trigger read ({})", data.id());
        Ok(())
    }

    async fn update(&self, data: &mut ResourceData) -> CrudResult {
        let mut trigger = build_project_deployment_target_trigger(data)?;
        trigger.id = data.id().to_string();
        tracing::info!("updating project trigger ({})", trigger.id);

        let updated = self.client.project_triggers().update(&trigger).await?;
        data.set_id(updated.id);
        Ok(())
    }

    async fn delete(&self, data: &mut ResourceData) -> CrudResult {
        tracing::info!("deleting project trigger ({})", data.id());
        self.client.project_triggers().delete_by_id(data.id()).await?;
        data.clear_id();
        Ok(())
    }
}
