//! `octopusdeploy_lifecycle` resource

use crate::fields::Field;
use async_trait::async_trait;
use octoform_client::{Lifecycle, OctopusClient, Phase, RetentionPeriod, RetentionUnit};
use octoform_core::{
    Attribute, Attributes, Block, CrudResult, ProviderError, Resource, ResourceData, Result,
    Schema,
};
use serde_json::{Value, json};
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "octopusdeploy_lifecycle";

fn retention_period_schema() -> Schema {
    Schema::new()
        .with_attribute(
            Attribute::int(Field::QuantityToKeep)
                .with_default(30)
                .with_description("The number of days/releases to keep. If 0 all are kept."),
        )
        .with_attribute(Attribute::bool(Field::ShouldKeepForever).with_default(false))
        .with_attribute(
            Attribute::string(Field::Unit)
                .with_default(RetentionUnit::Days.as_str())
                .with_allowed_values(&[RetentionUnit::Days.as_str(), RetentionUnit::Items.as_str()])
                .with_description("The unit of quantity_to_keep."),
        )
}

fn phase_schema() -> Schema {
    Schema::new()
        .with_attribute(
            Attribute::string_list(Field::AutomaticDeploymentTargets).with_description(
                "Environment IDs in this phase that a release is automatically deployed to when it is eligible for this phase",
            ),
        )
        .with_attribute(Attribute::string(Field::Id).computed())
        .with_attribute(Attribute::string(Field::Name).required())
        .with_attribute(
            Attribute::int(Field::MinimumEnvironmentsBeforePromotion)
                .with_default(0)
                .with_description(
                    "The number of units required before a release can enter the next phase. If 0, all environments are required.",
                ),
        )
        .with_attribute(
            Attribute::bool(Field::IsOptionalPhase)
                .with_default(false)
                .with_description(
                    "If false a release must be deployed to this phase before it can be deployed to the next phase.",
                ),
        )
        .with_attribute(
            Attribute::string_list(Field::OptionalDeploymentTargets).with_description(
                "Environment IDs in this phase that a release can be deployed to, but is not automatically deployed to",
            ),
        )
        .with_attribute(
            Attribute::block(Field::ReleaseRetentionPolicy, retention_period_schema()).max_items(1),
        )
        .with_attribute(
            Attribute::block(Field::TentacleRetentionPolicy, retention_period_schema())
                .max_items(1),
        )
}

pub fn schema() -> Schema {
    Schema::new()
        .with_description("This resource manages lifecycles in Octopus Deploy.")
        .with_attribute(Attribute::string(Field::Id).computed())
        .with_attribute(Attribute::string(Field::Description))
        .with_attribute(Attribute::string(Field::Name).required())
        .with_attribute(Attribute::block(Field::Phase, phase_schema()))
        .with_attribute(
            Attribute::block(Field::ReleaseRetentionPolicy, retention_period_schema()).max_items(1),
        )
        .with_attribute(
            Attribute::block(Field::TentacleRetentionPolicy, retention_period_schema())
                .max_items(1),
        )
}

fn to_i32(key: Field, value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| ProviderError::InvalidValue {
        key: key.to_string(),
        message: format!("{} is out of range", value),
    })
}

/// Retention block under `field`, if one is declared
fn get_retention_period<A: Attributes>(attrs: &A, field: Field) -> Result<Option<RetentionPeriod>> {
    let Some(block) = attrs.get_block(field)? else {
        return Ok(None);
    };

    let unit = block.get_string(Field::Unit)?;
    let unit = if unit.is_empty() {
        RetentionUnit::default()
    } else {
        unit.parse::<RetentionUnit>()
            .map_err(|message| ProviderError::InvalidValue {
                key: format!("{}.0.{}", field, Field::Unit),
                message,
            })?
    };

    Ok(Some(RetentionPeriod {
        quantity_to_keep: to_i32(Field::QuantityToKeep, block.get_int(Field::QuantityToKeep)?)?,
        should_keep_forever: block.get_bool(Field::ShouldKeepForever)?,
        unit,
    }))
}

fn build_phase(block: &Block<'_>) -> Result<Phase> {
    Ok(Phase {
        id: block.get_string(Field::Id)?,
        name: block.get_string(Field::Name)?,
        automatic_deployment_targets: block.get_string_list(Field::AutomaticDeploymentTargets)?,
        optional_deployment_targets: block.get_string_list(Field::OptionalDeploymentTargets)?,
        minimum_environments_before_promotion: to_i32(
            Field::MinimumEnvironmentsBeforePromotion,
            block.get_int(Field::MinimumEnvironmentsBeforePromotion)?,
        )?,
        is_optional_phase: block.get_bool(Field::IsOptionalPhase)?,
        release_retention_policy: get_retention_period(block, Field::ReleaseRetentionPolicy)?,
        tentacle_retention_policy: get_retention_period(block, Field::TentacleRetentionPolicy)?,
    })
}

/// Build the API payload from configuration
pub fn build_lifecycle(data: &ResourceData) -> Result<Lifecycle> {
    let mut lifecycle = Lifecycle::new(data.get_string(Field::Name)?);
    lifecycle.description = data.get_string(Field::Description)?;

    if let Some(policy) = get_retention_period(data, Field::ReleaseRetentionPolicy)? {
        lifecycle.release_retention_policy = policy;
    }
    if let Some(policy) = get_retention_period(data, Field::TentacleRetentionPolicy)? {
        lifecycle.tentacle_retention_policy = policy;
    }

    lifecycle.phases = data
        .get_blocks(Field::Phase)?
        .iter()
        .map(build_phase)
        .collect::<Result<Vec<_>>>()?;

    Ok(lifecycle)
}

fn flatten_retention_period(period: &RetentionPeriod) -> Value {
    json!([{
        (Field::Unit.key()): period.unit.as_str(),
        (Field::QuantityToKeep.key()): period.quantity_to_keep,
        (Field::ShouldKeepForever.key()): period.should_keep_forever,
    }])
}

fn flatten_phase(phase: &Phase) -> Value {
    let mut flattened = json!({
        (Field::AutomaticDeploymentTargets.key()): phase.automatic_deployment_targets,
        (Field::Id.key()): phase.id,
        (Field::IsOptionalPhase.key()): phase.is_optional_phase,
        (Field::MinimumEnvironmentsBeforePromotion.key()): phase.minimum_environments_before_promotion,
        (Field::Name.key()): phase.name,
        (Field::OptionalDeploymentTargets.key()): phase.optional_deployment_targets,
    });

    if let Some(period) = &phase.release_retention_policy {
        flattened[Field::ReleaseRetentionPolicy.key()] = flatten_retention_period(period);
    }
    if let Some(period) = &phase.tentacle_retention_policy {
        flattened[Field::TentacleRetentionPolicy.key()] = flatten_retention_period(period);
    }

    flattened
}

/// Record the server's view of a lifecycle, every phase included
pub fn flatten_lifecycle(data: &mut ResourceData, lifecycle: &Lifecycle) -> Result<()> {
    data.set(Field::Description, &lifecycle.description)?;
    data.set(Field::Name, &lifecycle.name)?;
    data.set(
        Field::Phase,
        lifecycle.phases.iter().map(flatten_phase).collect::<Vec<_>>(),
    )?;
    data.set(
        Field::ReleaseRetentionPolicy,
        flatten_retention_period(&lifecycle.release_retention_policy),
    )?;
    data.set(
        Field::TentacleRetentionPolicy,
        flatten_retention_period(&lifecycle.tentacle_retention_policy),
    )?;
    data.set_id(lifecycle.id.clone());
    Ok(())
}

pub struct LifecycleResource {
    client: Arc<OctopusClient>,
}

impl LifecycleResource {
    pub fn new(client: Arc<OctopusClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for LifecycleResource {
    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> CrudResult {
        let lifecycle = build_lifecycle(data)?;
        tracing::info!("creating lifecycle {}", lifecycle.name);

        let created = self.client.lifecycles().add(&lifecycle).await?;
        flatten_lifecycle(data, &created)?;

        tracing::info!("lifecycle created ({})", data.id());
        Ok(())
    }

    async fn read(&self, data: &mut ResourceData) -> CrudResult {
        let lifecycle = match self.client.lifecycles().get_by_id(data.id()).await {
            Ok(lifecycle) => lifecycle,
            Err(e) if e.is_not_found() => {
                tracing::warn!("lifecycle ({}) not found; removing from state", data.id());
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        flatten_lifecycle(data, &lifecycle)?;
        Ok(())
    }

    async fn update(&self, data: &mut ResourceData) -> CrudResult {
        let mut lifecycle = build_lifecycle(data)?;
        lifecycle.id = data.id().to_string();
        tracing::info!("updating lifecycle ({})", lifecycle.id);

        let updated = self.client.lifecycles().update(&lifecycle).await?;
        flatten_lifecycle(data, &updated)?;
        Ok(())
    }

    async fn delete(&self, data: &mut ResourceData) -> CrudResult {
        tracing::info!("deleting lifecycle ({})", data.id());
        self.client.lifecycles().delete_by_id(data.id()).await?;
        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(value: Value) -> ResourceData {
        let mut values = value.as_object().cloned().unwrap();
        schema().apply_defaults(&mut values);
        ResourceData::new(values)
    }

    #[test]
    fn test_build_defaults_to_keep_forever() {
        let lifecycle = build_lifecycle(&data(json!({"name": "Default"}))).unwrap();
        assert_eq!(lifecycle.release_retention_policy, RetentionPeriod::keep_forever());
        assert_eq!(lifecycle.tentacle_retention_policy, RetentionPeriod::keep_forever());
        assert!(lifecycle.phases.is_empty());
    }

    #[test]
    fn test_build_phases_and_retention() {
        let lifecycle = build_lifecycle(&data(json!({
            "name": "Default",
            "description": "Standard rollout",
            "release_retention_policy": [{"quantity_to_keep": 5, "unit": "Items"}],
            "tentacle_retention_policy": [{"should_keep_forever": true, "quantity_to_keep": 0}],
            "phase": [
                {"name": "Dev", "automatic_deployment_targets": ["Environments-1"]},
                {"name": "Prod", "is_optional_phase": true, "minimum_environments_before_promotion": 1}
            ]
        })))
        .unwrap();

        assert_eq!(lifecycle.description, "Standard rollout");
        assert_eq!(
            lifecycle.release_retention_policy,
            RetentionPeriod::new(5, RetentionUnit::Items)
        );
        assert!(lifecycle.tentacle_retention_policy.should_keep_forever);
        assert_eq!(lifecycle.tentacle_retention_policy.unit, RetentionUnit::Days);

        assert_eq!(lifecycle.phases.len(), 2);
        let dev = &lifecycle.phases[0];
        assert_eq!(dev.automatic_deployment_targets, vec!["Environments-1"]);
        assert!(dev.optional_deployment_targets.is_empty());
        assert_eq!(dev.minimum_environments_before_promotion, 0);
        assert!(lifecycle.phases[1].is_optional_phase);
        assert_eq!(lifecycle.phases[1].minimum_environments_before_promotion, 1);
    }

    #[test]
    fn test_build_rejects_unknown_unit() {
        let err = build_lifecycle(&ResourceData::new(
            json!({"name": "X", "release_retention_policy": [{"unit": "Weeks"}]})
                .as_object()
                .cloned()
                .unwrap(),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("release_retention_policy.0.unit"));
    }

    #[test]
    fn test_flatten_keeps_every_phase() {
        let mut lifecycle = Lifecycle::new("Default");
        lifecycle.id = "Lifecycles-1".to_string();
        for name in ["Dev", "Test", "Prod"] {
            lifecycle.phases.push(Phase {
                name: name.to_string(),
                ..Default::default()
            });
        }
        lifecycle.phases[2].release_retention_policy =
            Some(RetentionPeriod::new(3, RetentionUnit::Items));

        let mut data = ResourceData::default();
        flatten_lifecycle(&mut data, &lifecycle).unwrap();

        assert_eq!(data.id(), "Lifecycles-1");
        let phases = data.get_blocks(Field::Phase).unwrap();
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[2].get_string(Field::Name).unwrap(), "Prod");
        let retention = phases[2]
            .get_block(Field::ReleaseRetentionPolicy)
            .unwrap()
            .unwrap();
        assert_eq!(retention.get_int(Field::QuantityToKeep).unwrap(), 3);
        assert_eq!(retention.get_string(Field::Unit).unwrap(), "Items");

        let release = data.get_block(Field::ReleaseRetentionPolicy).unwrap().unwrap();
        assert!(release.get_bool(Field::ShouldKeepForever).unwrap());
    }
}
