//! Typed access to resource configuration and state

use crate::error::{ProviderError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn mismatch(key: &str, expected: &'static str) -> ProviderError {
    ProviderError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

/// Typed getters over a JSON attribute object
///
/// Absent and `null` values yield the zero value of the requested type; a
/// value of the wrong type is an error rather than a silent default.
pub trait Attributes {
    /// Raw attribute value, if present
    fn raw(&self, key: &str) -> Option<&Value>;

    fn value(&self, key: impl AsRef<str>) -> Option<&Value> {
        self.raw(key.as_ref()).filter(|v| !v.is_null())
    }

    fn get_str(&self, key: impl AsRef<str>) -> Result<Option<&str>> {
        let key = key.as_ref();
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(mismatch(key, "a string")),
        }
    }

    fn get_string(&self, key: impl AsRef<str>) -> Result<String> {
        Ok(self.get_str(key)?.unwrap_or_default().to_string())
    }

    /// `Some` only when the value is set and non-empty
    fn get_optional_string(&self, key: impl AsRef<str>) -> Result<Option<String>> {
        Ok(self
            .get_str(key)?
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }

    fn require_string(&self, key: impl AsRef<str>) -> Result<String> {
        let key = key.as_ref();
        self.get_optional_string(key)?
            .ok_or_else(|| ProviderError::MissingAttribute(key.to_string()))
    }

    fn get_bool(&self, key: impl AsRef<str>) -> Result<bool> {
        let key = key.as_ref();
        match self.value(key) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(mismatch(key, "a boolean")),
        }
    }

    fn get_int(&self, key: impl AsRef<str>) -> Result<i64> {
        let key = key.as_ref();
        match self.value(key) {
            None => Ok(0),
            Some(v) => v.as_i64().ok_or_else(|| mismatch(key, "an integer")),
        }
    }

    fn get_string_list(&self, key: impl AsRef<str>) -> Result<Vec<String>> {
        let key = key.as_ref();
        match self.value(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| mismatch(key, "a list of strings"))
                })
                .collect(),
            Some(_) => Err(mismatch(key, "a list of strings")),
        }
    }

    fn get_string_map(&self, key: impl AsRef<str>) -> Result<BTreeMap<String, String>> {
        let key = key.as_ref();
        match self.value(key) {
            None => Ok(BTreeMap::new()),
            Some(Value::Object(entries)) => entries
                .iter()
                .map(|(k, v)| {
                    v.as_str()
                        .map(|s| (k.clone(), s.to_string()))
                        .ok_or_else(|| mismatch(key, "a map of strings"))
                })
                .collect(),
            Some(_) => Err(mismatch(key, "a map of strings")),
        }
    }

    /// All nested blocks under `key`, in declaration order
    fn get_blocks(&self, key: impl AsRef<str>) -> Result<Vec<Block<'_>>> {
        let key = key.as_ref();
        match self.value(key) {
            None => Ok(Vec::new()),
            Some(Value::Object(values)) => Ok(vec![Block::new(values)]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(values) => Ok(Block::new(values)),
                    _ => Err(mismatch(key, "a block")),
                })
                .collect(),
            Some(_) => Err(mismatch(key, "a block")),
        }
    }

    /// First nested block under `key` (for single-item blocks)
    fn get_block(&self, key: impl AsRef<str>) -> Result<Option<Block<'_>>> {
        Ok(self.get_blocks(key)?.into_iter().next())
    }
}

/// Borrowed view of one nested block
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    values: &'a Map<String, Value>,
}

impl<'a> Block<'a> {
    pub fn new(values: &'a Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &'a Map<String, Value> {
        self.values
    }
}

impl Attributes for Block<'_> {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Configuration accessor handed to CRUD handlers
///
/// Holds the identifier of the remote entity (empty when the resource does
/// not exist yet or has been removed) and the attribute values. Handlers read
/// the desired configuration through [`Attributes`] and write the flattened
/// remote state back with [`ResourceData::set`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: String,
    values: Map<String, Value>,
}

impl ResourceData {
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            values,
        }
    }

    /// Build from a JSON configuration object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self::new(values)),
            Value::Null => Ok(Self::default()),
            _ => Err(ProviderError::InvalidValue {
                key: "configuration".to_string(),
                message: "expected an object".to_string(),
            }),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Mark the remote entity as gone; the runtime drops it from state
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    /// Store a flattened attribute value
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Serialize) -> Result<()> {
        self.values
            .insert(key.as_ref().to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }
}

impl Attributes for ResourceData {
    fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> ResourceData {
        ResourceData::from_value(value).unwrap()
    }

    #[test]
    fn test_zero_values_for_absent_attributes() {
        let d = data(json!({"description": null}));
        assert_eq!(d.get_string("name").unwrap(), "");
        assert_eq!(d.get_string("description").unwrap(), "");
        assert!(!d.get_bool("is_optional_phase").unwrap());
        assert_eq!(d.get_int("quantity_to_keep").unwrap(), 0);
        assert!(d.get_string_list("roles").unwrap().is_empty());
        assert!(d.get_blocks("phase").unwrap().is_empty());
        assert!(d.get_optional_string("name").unwrap().is_none());
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let d = data(json!({"name": true, "roles": ["web", 1], "version": "3"}));

        let err = d.get_string("name").unwrap_err();
        assert!(matches!(err, ProviderError::TypeMismatch { ref key, .. } if key == "name"));
        assert!(d.get_string_list("roles").is_err());
        assert!(d.get_int("version").is_err());
        assert!(d.get_bool("version").is_err());
    }

    #[test]
    fn test_require_string() {
        let d = data(json!({"name": "", "project_id": "Projects-1"}));
        assert!(matches!(
            d.require_string("name"),
            Err(ProviderError::MissingAttribute(_))
        ));
        assert_eq!(d.require_string("project_id").unwrap(), "Projects-1");
    }

    #[test]
    fn test_nested_blocks() {
        let d = data(json!({
            "phase": [
                {"name": "Dev", "automatic_deployment_targets": ["Environments-1"]},
                {"name": "Prod", "retention": {"unit": "Items"}}
            ]
        }));

        let phases = d.get_blocks("phase").unwrap();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].get_string("name").unwrap(), "Dev");
        assert_eq!(
            phases[0].get_string_list("automatic_deployment_targets").unwrap(),
            vec!["Environments-1".to_string()]
        );

        let retention = phases[1].get_block("retention").unwrap().unwrap();
        assert_eq!(retention.get_string("unit").unwrap(), "Items");
    }

    #[test]
    fn test_string_map() {
        let d = data(json!({"properties": {"a": "1", "b": "2"}}));
        let map = d.get_string_map("properties").unwrap();
        assert_eq!(map.get("a").map(String::as_str), Some("1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_set_and_clear_id() {
        let mut d = ResourceData::default();
        assert!(!d.has_id());

        d.set_id("Lifecycles-1");
        d.set("name", "Default").unwrap();
        d.set("phase", vec![json!({"name": "Dev"})]).unwrap();
        assert_eq!(d.id(), "Lifecycles-1");
        assert_eq!(d.get_string("name").unwrap(), "Default");
        assert_eq!(d.get_blocks("phase").unwrap().len(), 1);

        d.clear_id();
        assert!(!d.has_id());
    }
}
