//! Resource trait and provider registry

use crate::data::ResourceData;
use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::schema::Schema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outcome of a CRUD handler
pub type CrudResult = std::result::Result<(), Diagnostics>;

/// A managed resource type
///
/// Every handler receives the configuration accessor for one resource
/// instance. On success the identifier of `data` tells the runtime what
/// happened: a non-empty ID is persisted, an empty ID removes the instance
/// from state.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name (e.g., "octopusdeploy_lifecycle")
    fn type_name(&self) -> &'static str;

    /// Shape of the resource block
    fn schema(&self) -> Schema;

    async fn create(&self, data: &mut ResourceData) -> CrudResult;

    async fn read(&self, data: &mut ResourceData) -> CrudResult;

    async fn update(&self, data: &mut ResourceData) -> CrudResult;

    async fn delete(&self, data: &mut ResourceData) -> CrudResult;

    /// Adopt an existing remote entity; `data` carries only the ID
    async fn import(&self, data: &mut ResourceData) -> CrudResult {
        self.read(data).await
    }
}

/// Declared configuration of one resource instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "octopusdeploy_lifecycle")
    pub resource_type: String,

    /// Instance name, unique per type
    pub name: String,

    /// Attribute values
    pub config: serde_json::Value,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            config,
        }
    }

    /// Get the resource address (`<type>.<name>`)
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

/// Split an address into resource type and instance name
pub fn parse_address(address: &str) -> Result<(&str, &str)> {
    address
        .split_once('.')
        .filter(|(t, n)| !t.is_empty() && !n.is_empty())
        .ok_or_else(|| ProviderError::InvalidValue {
            key: "address".to_string(),
            message: format!("expected <type>.<name>, got {}", address),
        })
}

/// Set of resources to be managed, keyed by address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource; addresses must be unique
    pub fn add(&mut self, resource: ResourceConfig) -> Result<()> {
        let address = resource.address();
        if self.resources.contains_key(&address) {
            return Err(ProviderError::InvalidValue {
                key: address,
                message: "resource declared more than once".to_string(),
            });
        }
        self.resources.insert(address, resource);
        Ok(())
    }

    pub fn get(&self, address: &str) -> Option<&ResourceConfig> {
        self.resources.get(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn by_type(&self, resource_type: &str) -> Vec<&ResourceConfig> {
        self.resources
            .values()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }
}

/// Registry of the resource types a provider serves
pub struct Provider {
    name: String,
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: BTreeMap::new(),
        }
    }

    pub fn with_resource<R: Resource + 'static>(mut self, resource: R) -> Self {
        self.resources.insert(resource.type_name(), Arc::new(resource));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource(&self, resource_type: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .get(resource_type)
            .cloned()
            .ok_or_else(|| ProviderError::ResourceTypeNotFound(resource_type.to_string()))
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    pub fn schema(&self, resource_type: &str) -> Option<Schema> {
        self.resources.get(resource_type).map(|r| r.schema())
    }

    pub fn schemas(&self) -> BTreeMap<&'static str, Schema> {
        self.resources
            .iter()
            .map(|(name, r)| (*name, r.schema()))
            .collect()
    }
}
