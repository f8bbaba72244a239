//! KDL configuration parser
//!
//! ```kdl
//! provider {
//!     address "https://octopus.example.com"
//!     space_id "Spaces-1"
//! }
//!
//! resource "octopusdeploy_lifecycle" "default" {
//!     name "Default"
//!     phase {
//!         name "Dev"
//!         automatic_deployment_targets "Environments-1" "Environments-2"
//!     }
//!     release_retention_policy { quantity_to_keep 10; unit "Items" }
//! }
//! ```
//!
//! Resource bodies are decoded against the resource schema: scalars take
//! the first argument, lists take every argument, maps take child nodes
//! (or `key="value"` properties) and nested blocks may repeat.

use crate::error::{ConfigError, Result};
use crate::settings::ProviderSettings;
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use octoform_core::{AttributeKind, ResourceConfig, ResourceSet, Schema};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parsed configuration file
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub provider: ProviderSettings,
    pub resources: ResourceSet,
}

/// Parse a configuration file
pub fn parse_config_file<P: AsRef<Path>>(
    path: P,
    schemas: &BTreeMap<&'static str, Schema>,
) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::debug!("Parsing configuration {}", path.display());
    parse_config_str(&content, schemas)
}

/// Parse configuration from a KDL string
pub fn parse_config_str(
    content: &str,
    schemas: &BTreeMap<&'static str, Schema>,
) -> Result<Config> {
    let doc: KdlDocument = content.parse()?;
    let mut config = Config::default();

    for node in doc.nodes() {
        match node.name().value() {
            "provider" => {
                config.provider = parse_provider(node)?;
            }
            "resource" => {
                let resource = parse_resource(node, schemas)?;
                config.resources.add(resource)?;
            }
            other => {
                return Err(ConfigError::InvalidConfig(format!(
                    "unexpected top-level node '{}'",
                    other
                )));
            }
        }
    }

    tracing::debug!("Parsed {} resources", config.resources.len());
    Ok(config)
}

/// Parse the provider block
fn parse_provider(node: &KdlNode) -> Result<ProviderSettings> {
    let mut settings = ProviderSettings::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let value = first_string(child);
            match child.name().value() {
                "address" => settings.address = value,
                "api_key" | "api-key" => settings.api_key = value,
                "space_id" | "space-id" => settings.space_id = value,
                other => {
                    return Err(ConfigError::InvalidConfig(format!(
                        "unknown provider setting '{}'",
                        other
                    )));
                }
            }
        }
    }

    Ok(settings)
}

/// Parse a `resource "<type>" "<name>" { ... }` node
fn parse_resource(
    node: &KdlNode,
    schemas: &BTreeMap<&'static str, Schema>,
) -> Result<ResourceConfig> {
    let mut args = arguments(node).filter_map(|v| v.as_string());
    let (resource_type, name) = match (args.next(), args.next()) {
        (Some(t), Some(n)) => (t, n),
        _ => {
            return Err(ConfigError::InvalidConfig(
                "resource requires a type and a name".to_string(),
            ));
        }
    };

    let schema = schemas
        .get(resource_type)
        .ok_or_else(|| ConfigError::UnknownResourceType(resource_type.to_string()))?;

    let values = decode_block(node.children(), schema)?;
    Ok(ResourceConfig::new(
        resource_type,
        name,
        Value::Object(values),
    ))
}

/// Decode the body of a block against its schema
fn decode_block(body: Option<&KdlDocument>, schema: &Schema) -> Result<Map<String, Value>> {
    let mut values = Map::new();
    let Some(body) = body else {
        return Ok(values);
    };

    for child in body.nodes() {
        let key = child.name().value();
        let kind = schema.attribute(key).map(|a| &a.kind);

        match kind {
            Some(AttributeKind::Block { schema, .. }) => {
                let block = decode_block(child.children(), schema)?;
                let entry = values
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(blocks) = entry {
                    blocks.push(Value::Object(block));
                }
            }
            Some(AttributeKind::StringList) => {
                let items: Vec<Value> = arguments(child).map(to_json).collect();
                let entry = values
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(list) = entry {
                    list.extend(items);
                }
            }
            Some(AttributeKind::StringMap) => {
                let map = decode_map(child);
                let entry = values
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(existing) = entry {
                    existing.extend(map);
                }
            }
            // Scalars; unknown keys are kept so validation can report them
            _ => {
                let value = arguments(child).next().map(to_json).unwrap_or(Value::Null);
                if values.insert(key.to_string(), value).is_some() {
                    return Err(ConfigError::InvalidConfig(format!(
                        "attribute '{}' is set more than once",
                        key
                    )));
                }
            }
        }
    }

    Ok(values)
}

/// `properties { key "value" }` or `properties key="value"`
fn decode_map(node: &KdlNode) -> Map<String, Value> {
    let mut map = Map::new();

    for entry in node.entries() {
        if let Some(name) = entry.name() {
            map.insert(
                name.value().to_string(),
                Value::String(to_plain_string(entry.value())),
            );
        }
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let value = arguments(child)
                .next()
                .map(to_plain_string)
                .unwrap_or_default();
            map.insert(child.name().value().to_string(), Value::String(value));
        }
    }

    map
}

/// Positional arguments of a node
fn arguments(node: &KdlNode) -> impl Iterator<Item = &KdlValue> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(KdlEntry::value)
}

fn first_string(node: &KdlNode) -> Option<String> {
    arguments(node)
        .next()
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn to_json(value: &KdlValue) -> Value {
    if let Some(s) = value.as_string() {
        Value::String(s.to_string())
    } else if let Some(i) = value.as_integer() {
        i64::try_from(i)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(i.to_string()))
    } else if let Some(b) = value.as_bool() {
        Value::Bool(b)
    } else if matches!(value, KdlValue::Null) {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

fn to_plain_string(value: &KdlValue) -> String {
    match to_json(value) {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
