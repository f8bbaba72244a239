//! Deployment step and action blocks of a deployment process
//!
//! Some typed attributes live in the server's property bag. They are merged
//! into `Properties` on expand and lifted back out on flatten.

use crate::fields::Field;
use octoform_client::{DeploymentAction, DeploymentStep, PackageReference, PropertyValue};
use octoform_core::{Attribute, Attributes, Block, Result, Schema};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

pub const TARGET_ROLES_PROPERTY: &str = "Octopus.Action.TargetRoles";
pub const MAX_PARALLELISM_PROPERTY: &str = "Octopus.Action.MaxParallelism";
pub const RUN_ON_SERVER_PROPERTY: &str = "Octopus.Action.RunOnServer";

const CONDITIONS: &[&str] = &["Success", "Failure", "Always", "Variable"];
const START_TRIGGERS: &[&str] = &["StartAfterPrevious", "StartWithPrevious"];
const PACKAGE_REQUIREMENTS: &[&str] = &[
    "LetOctopusDecide",
    "BeforePackageAcquisition",
    "AfterPackageAcquisition",
];
const ACQUISITION_LOCATIONS: &[&str] = &["Server", "ExecutionTarget", "NotAcquired"];

pub fn step_schema() -> Schema {
    Schema::new()
        .with_attribute(Attribute::string(Field::Id).computed())
        .with_attribute(
            Attribute::string(Field::Name)
                .required()
                .with_description("The name of this step."),
        )
        .with_attribute(
            Attribute::string_list(Field::TargetRoles)
                .with_description("The roles that this step runs against."),
        )
        .with_attribute(
            Attribute::string(Field::Condition)
                .with_default("Success")
                .with_allowed_values(CONDITIONS),
        )
        .with_attribute(
            Attribute::string(Field::StartTrigger)
                .with_default("StartAfterPrevious")
                .with_allowed_values(START_TRIGGERS),
        )
        .with_attribute(
            Attribute::string(Field::PackageRequirement)
                .with_default("LetOctopusDecide")
                .with_allowed_values(PACKAGE_REQUIREMENTS),
        )
        .with_attribute(
            Attribute::string(Field::WindowSize)
                .with_description("The maximum number of targets to deploy to simultaneously."),
        )
        .with_attribute(Attribute::string_map(Field::Properties))
        .with_attribute(Attribute::block(Field::Action, action_schema()))
}

fn action_schema() -> Schema {
    Schema::new()
        .with_attribute(Attribute::string(Field::Id).computed())
        .with_attribute(Attribute::string(Field::Name).required())
        .with_attribute(
            Attribute::string(Field::ActionType)
                .required()
                .with_description("The type of action (e.g. Octopus.Script)."),
        )
        .with_attribute(Attribute::bool(Field::IsDisabled).with_default(false))
        .with_attribute(Attribute::bool(Field::IsRequired).with_default(false))
        .with_attribute(
            Attribute::bool(Field::RunOnServer)
                .with_default(false)
                .with_description("Whether this action runs on the server or a worker."),
        )
        .with_attribute(Attribute::string(Field::WorkerPoolId))
        .with_attribute(Attribute::string_list(Field::Environments))
        .with_attribute(Attribute::string_list(Field::ExcludedEnvironments))
        .with_attribute(Attribute::string_list(Field::Channels))
        .with_attribute(Attribute::string_list(Field::TenantTags))
        .with_attribute(Attribute::string_map(Field::Properties))
        .with_attribute(Attribute::block(Field::Package, package_schema()))
}

fn package_schema() -> Schema {
    Schema::new()
        .with_attribute(Attribute::string(Field::Name))
        .with_attribute(Attribute::string(Field::PackageId).required())
        .with_attribute(Attribute::string(Field::FeedId).with_default("feeds-builtin"))
        .with_attribute(
            Attribute::string(Field::AcquisitionLocation)
                .with_default("Server")
                .with_allowed_values(ACQUISITION_LOCATIONS),
        )
        .with_attribute(Attribute::string_map(Field::Properties))
}

fn property_bag(block: &Block<'_>) -> Result<BTreeMap<String, PropertyValue>> {
    Ok(block
        .get_string_map(Field::Properties)?
        .into_iter()
        .map(|(k, v)| (k, PropertyValue::Text(v)))
        .collect())
}

pub fn expand_steps(blocks: &[Block<'_>]) -> Result<Vec<DeploymentStep>> {
    blocks.iter().map(expand_step).collect()
}

fn expand_step(block: &Block<'_>) -> Result<DeploymentStep> {
    let mut properties = property_bag(block)?;

    let target_roles = block.get_string_list(Field::TargetRoles)?;
    if !target_roles.is_empty() {
        properties.insert(
            TARGET_ROLES_PROPERTY.to_string(),
            target_roles.join(",").into(),
        );
    }
    if let Some(window_size) = block.get_optional_string(Field::WindowSize)? {
        properties.insert(MAX_PARALLELISM_PROPERTY.to_string(), window_size.into());
    }

    let actions = block
        .get_blocks(Field::Action)?
        .iter()
        .map(expand_action)
        .collect::<Result<Vec<_>>>()?;

    Ok(DeploymentStep {
        id: block.get_string(Field::Id)?,
        name: block.get_string(Field::Name)?,
        condition: block.get_string(Field::Condition)?,
        start_trigger: block.get_string(Field::StartTrigger)?,
        package_requirement: block.get_string(Field::PackageRequirement)?,
        properties,
        actions,
    })
}

fn expand_action(block: &Block<'_>) -> Result<DeploymentAction> {
    let mut properties = property_bag(block)?;
    if block.get_bool(Field::RunOnServer)? {
        properties.insert(RUN_ON_SERVER_PROPERTY.to_string(), "true".into());
    }

    let packages = block
        .get_blocks(Field::Package)?
        .iter()
        .map(expand_package)
        .collect::<Result<Vec<_>>>()?;

    Ok(DeploymentAction {
        id: block.get_string(Field::Id)?,
        name: block.get_string(Field::Name)?,
        action_type: block.get_string(Field::ActionType)?,
        is_disabled: block.get_bool(Field::IsDisabled)?,
        is_required: block.get_bool(Field::IsRequired)?,
        worker_pool_id: block.get_optional_string(Field::WorkerPoolId)?,
        environments: block.get_string_list(Field::Environments)?,
        excluded_environments: block.get_string_list(Field::ExcludedEnvironments)?,
        channels: block.get_string_list(Field::Channels)?,
        tenant_tags: block.get_string_list(Field::TenantTags)?,
        packages,
        properties,
    })
}

fn expand_package(block: &Block<'_>) -> Result<PackageReference> {
    Ok(PackageReference {
        id: String::new(),
        name: block.get_string(Field::Name)?,
        package_id: block.get_string(Field::PackageId)?,
        feed_id: block.get_string(Field::FeedId)?,
        acquisition_location: block.get_string(Field::AcquisitionLocation)?,
        properties: block.get_string_map(Field::Properties)?,
    })
}

/// Clear-text properties minus the lifted keys; sensitive values are dropped
fn flatten_properties(
    properties: &BTreeMap<String, PropertyValue>,
    lifted: &[&str],
) -> Map<String, Value> {
    properties
        .iter()
        .filter(|(k, _)| !lifted.contains(&k.as_str()))
        .filter_map(|(k, v)| match v {
            PropertyValue::Text(text) => Some((k.clone(), Value::String(text.clone()))),
            PropertyValue::Sensitive(_) => None,
        })
        .collect()
}

pub fn flatten_steps(steps: &[DeploymentStep]) -> Value {
    Value::Array(steps.iter().map(flatten_step).collect())
}

fn flatten_step(step: &DeploymentStep) -> Value {
    let target_roles: Vec<&str> = step
        .properties
        .get(TARGET_ROLES_PROPERTY)
        .and_then(PropertyValue::as_text)
        .map(|roles| {
            roles
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let mut flattened = json!({
        (Field::Id.key()): step.id,
        (Field::Name.key()): step.name,
        (Field::Condition.key()): step.condition,
        (Field::StartTrigger.key()): step.start_trigger,
        (Field::PackageRequirement.key()): step.package_requirement,
        (Field::TargetRoles.key()): target_roles,
        (Field::Properties.key()): flatten_properties(
            &step.properties,
            &[TARGET_ROLES_PROPERTY, MAX_PARALLELISM_PROPERTY],
        ),
        (Field::Action.key()): step.actions.iter().map(flatten_action).collect::<Vec<_>>(),
    });

    if let Some(window_size) = step
        .properties
        .get(MAX_PARALLELISM_PROPERTY)
        .and_then(PropertyValue::as_text)
    {
        flattened[Field::WindowSize.key()] = json!(window_size);
    }

    flattened
}

fn flatten_action(action: &DeploymentAction) -> Value {
    let run_on_server = action
        .properties
        .get(RUN_ON_SERVER_PROPERTY)
        .and_then(PropertyValue::as_text)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    let mut flattened = json!({
        (Field::Id.key()): action.id,
        (Field::Name.key()): action.name,
        (Field::ActionType.key()): action.action_type,
        (Field::IsDisabled.key()): action.is_disabled,
        (Field::IsRequired.key()): action.is_required,
        (Field::RunOnServer.key()): run_on_server,
        (Field::Environments.key()): action.environments,
        (Field::ExcludedEnvironments.key()): action.excluded_environments,
        (Field::Channels.key()): action.channels,
        (Field::TenantTags.key()): action.tenant_tags,
        (Field::Properties.key()): flatten_properties(&action.properties, &[RUN_ON_SERVER_PROPERTY]),
        (Field::Package.key()): action.packages.iter().map(flatten_package).collect::<Vec<_>>(),
    });

    if let Some(worker_pool_id) = action.worker_pool_id.as_deref().filter(|id| !id.is_empty()) {
        flattened[Field::WorkerPoolId.key()] = json!(worker_pool_id);
    }

    flattened
}

fn flatten_package(package: &PackageReference) -> Value {
    json!({
        (Field::Name.key()): package.name,
        (Field::PackageId.key()): package.package_id,
        (Field::FeedId.key()): package.feed_id,
        (Field::AcquisitionLocation.key()): package.acquisition_location,
        (Field::Properties.key()): package.properties,
    })
}
