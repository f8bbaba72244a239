//! Plan/apply runtime
//!
//! Drives the CRUD handlers of registered resources: validates configuration,
//! refreshes state from the server, computes a plan by diffing configuration
//! against state and applies it one action at a time.

use crate::action::{Action, ActionType, ApplyResult, Plan};
use crate::data::ResourceData;
use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::provider::{CrudResult, Provider, ResourceConfig, ResourceSet, parse_address};
use crate::state::{GlobalState, ResourceState};
use serde_json::{Map, Value};

impl Provider {
    /// Check every declared resource against its schema
    pub fn validate(&self, desired: &ResourceSet) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for config in desired.iter() {
            let address = config.address();
            let schema = match self.resource(&config.resource_type) {
                Ok(resource) => resource.schema(),
                Err(e) => {
                    diags.extend(Diagnostics::from(e).scoped(&address));
                    continue;
                }
            };
            match config_values(config) {
                Ok(values) => diags.extend(schema.validate(&values).scoped(&address)),
                Err(e) => diags.extend(Diagnostics::from(e).scoped(&address)),
            }
        }

        diags
    }

    /// Configuration of one instance with schema defaults filled in
    pub fn prepare(&self, config: &ResourceConfig) -> Result<ResourceData> {
        let schema = self.resource(&config.resource_type)?.schema();
        let mut values = config_values(config)?;
        schema.apply_defaults(&mut values);
        Ok(ResourceData::new(values))
    }

    /// Re-read every resource in state; vanished entities are dropped
    pub async fn refresh(&self, state: &mut GlobalState) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let addresses: Vec<String> = state.resources.keys().cloned().collect();

        for address in addresses {
            let Some(current) = state.get_resource(&address).cloned() else {
                continue;
            };
            let resource = match self.resource(&current.resource_type) {
                Ok(resource) => resource,
                Err(e) => {
                    diags.extend(Diagnostics::from(e).scoped(&address));
                    continue;
                }
            };

            let mut data = ResourceData::new(current.attributes).with_id(current.id);
            match resource.read(&mut data).await {
                Ok(()) if data.has_id() => {
                    if let Some(entry) = state.resources.get_mut(&address) {
                        let id = data.id().to_string();
                        entry.refresh(id, data.into_values());
                    }
                }
                Ok(()) => {
                    tracing::warn!("{} no longer exists, removing it from state", address);
                    state.remove_resource(&address);
                }
                Err(d) => diags.extend(d.scoped(&address)),
            }
        }

        diags
    }

    /// Diff the desired configuration against state
    pub fn plan(&self, desired: &ResourceSet, state: &GlobalState) -> Result<Plan> {
        let mut actions = Vec::new();

        for config in desired.iter() {
            let address = config.address();
            let data = self.prepare(config)?;
            let action_type = match state.get_resource(&address) {
                None => ActionType::Create,
                Some(current) if object_contains(&current.attributes, data.values()) => {
                    ActionType::NoOp
                }
                Some(_) => ActionType::Update,
            };
            actions.push(Action::new(action_type, &config.resource_type, address));
        }

        for (address, current) in &state.resources {
            if desired.get(address).is_none() {
                actions.push(Action::new(
                    ActionType::Delete,
                    &current.resource_type,
                    address.clone(),
                ));
            }
        }

        Ok(Plan::new(actions))
    }

    /// Execute a plan, recording every outcome in `state`
    pub async fn apply(
        &self,
        plan: &Plan,
        desired: &ResourceSet,
        state: &mut GlobalState,
    ) -> ApplyResult {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if action.action_type == ActionType::NoOp {
                continue;
            }

            tracing::info!("{}", action.description);
            match self.apply_action(action, desired, state).await {
                Ok(message) => result.add_success(action.id.clone(), message),
                Err(diags) => {
                    tracing::error!("{} failed: {}", action.address, diags);
                    result.add_failure(action.id.clone(), diags.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    /// Delete every resource held in state
    pub async fn destroy(&self, state: &mut GlobalState) -> ApplyResult {
        let plan = self.destroy_plan(state);
        self.apply(&plan, &ResourceSet::new(), state).await
    }

    pub fn destroy_plan(&self, state: &GlobalState) -> Plan {
        Plan::new(
            state
                .resources
                .iter()
                .map(|(address, r)| Action::new(ActionType::Delete, &r.resource_type, address.clone()))
                .collect(),
        )
    }

    /// Bring an existing remote entity under management
    pub async fn import(&self, address: &str, id: &str, state: &mut GlobalState) -> CrudResult {
        let (resource_type, _) = parse_address(address)?;
        if state.get_resource(address).is_some() {
            return Err(Diagnostics::error(format!(
                "{} is already managed; remove it from state before importing",
                address
            )));
        }

        let resource = self.resource(resource_type)?;
        let mut data = ResourceData::default().with_id(id);
        resource.import(&mut data).await?;

        if !data.has_id() {
            return Err(Diagnostics::error(format!(
                "Cannot import non-existent remote object {} ({})",
                address, id
            )));
        }

        let id = data.id().to_string();
        state.set_resource(
            address.to_string(),
            ResourceState::new(id, resource_type).with_attributes(data.into_values()),
        );
        tracing::info!("{} imported", address);
        Ok(())
    }

    async fn apply_action(
        &self,
        action: &Action,
        desired: &ResourceSet,
        state: &mut GlobalState,
    ) -> std::result::Result<String, Diagnostics> {
        let resource = self.resource(&action.resource_type)?;
        let address = action.address.as_str();

        match action.action_type {
            ActionType::Create => {
                let config = desired
                    .get(address)
                    .ok_or_else(|| ProviderError::ResourceNotFound(address.to_string()))?;
                let mut data = self.prepare(config)?;
                resource.create(&mut data).await?;

                if !data.has_id() {
                    return Err(Diagnostics::error(format!(
                        "{} was created but the server returned no identifier",
                        address
                    )));
                }
                let id = data.id().to_string();
                state.set_resource(
                    address.to_string(),
                    ResourceState::new(id.clone(), &action.resource_type)
                        .with_attributes(data.into_values()),
                );
                Ok(format!("{} created ({})", address, id))
            }
            ActionType::Update => {
                let config = desired
                    .get(address)
                    .ok_or_else(|| ProviderError::ResourceNotFound(address.to_string()))?;
                let current_id = state
                    .get_resource(address)
                    .map(|r| r.id.clone())
                    .ok_or_else(|| ProviderError::ResourceNotFound(address.to_string()))?;

                let mut data = self.prepare(config)?.with_id(current_id);
                resource.update(&mut data).await?;

                if !data.has_id() {
                    state.remove_resource(address);
                    return Ok(format!("{} no longer exists", address));
                }
                let id = data.id().to_string();
                if let Some(entry) = state.resources.get_mut(address) {
                    entry.refresh(id.clone(), data.into_values());
                }
                Ok(format!("{} updated ({})", address, id))
            }
            ActionType::Delete => {
                let current = state
                    .get_resource(address)
                    .cloned()
                    .ok_or_else(|| ProviderError::ResourceNotFound(address.to_string()))?;

                let mut data = ResourceData::new(current.attributes).with_id(current.id);
                resource.delete(&mut data).await?;
                state.remove_resource(address);
                Ok(format!("{} destroyed", address))
            }
            ActionType::NoOp => Ok(String::new()),
        }
    }
}

fn config_values(config: &ResourceConfig) -> Result<Map<String, Value>> {
    match &config.config {
        Value::Object(values) => Ok(values.clone()),
        Value::Null => Ok(Map::new()),
        _ => Err(ProviderError::InvalidValue {
            key: config.address(),
            message: "resource configuration must be a block".to_string(),
        }),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        _ => false,
    }
}

/// Whether every configured value is reflected in `state`.
/// Keys only present in state (server-assigned fields) are ignored.
fn object_contains(state: &Map<String, Value>, config: &Map<String, Value>) -> bool {
    config.iter().all(|(key, wanted)| match state.get(key) {
        Some(actual) => value_contains(actual, wanted),
        None => is_empty_value(wanted),
    })
}

fn value_contains(actual: &Value, wanted: &Value) -> bool {
    match (actual, wanted) {
        (_, Value::Null) => true,
        (Value::Object(actual), Value::Object(wanted)) => object_contains(actual, wanted),
        (Value::Array(actual), Value::Array(wanted)) => {
            actual.len() == wanted.len()
                && actual.iter().zip(wanted).all(|(a, w)| value_contains(a, w))
        }
        _ => actual == wanted,
    }
}
