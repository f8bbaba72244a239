//! Resource schema descriptors
//!
//! A [`Schema`] declares the shape of one resource block: attribute names,
//! kinds, presence (required/optional/computed), defaults and permitted
//! values. Schemas drive configuration decoding, validation and default
//! filling before any CRUD handler runs.

use crate::diagnostics::{Diagnostic, Diagnostics};
use serde::Serialize;
use serde_json::{Map, Value};

/// Whether an attribute is user-supplied, server-supplied or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    /// Set by the server only
    Computed,
    /// May be configured; filled in by the server when absent
    OptionalComputed,
}

/// Value kind of an attribute
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    Bool,
    Int,
    StringList,
    StringMap,
    /// Repeated nested block
    Block {
        schema: Schema,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
}

impl AttributeKind {
    fn expected(&self) -> &'static str {
        match self {
            AttributeKind::String => "a string",
            AttributeKind::Bool => "a boolean",
            AttributeKind::Int => "an integer",
            AttributeKind::StringList => "a list of strings",
            AttributeKind::StringMap => "a map of strings",
            AttributeKind::Block { .. } => "a block",
        }
    }
}

/// A single attribute descriptor
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub key: String,
    pub kind: AttributeKind,
    pub presence: Presence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Permitted values for strings (or each element of a string list)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

impl Attribute {
    pub fn new(key: impl AsRef<str>, kind: AttributeKind) -> Self {
        Self {
            key: key.as_ref().to_string(),
            kind,
            presence: Presence::Optional,
            default: None,
            description: None,
            allowed_values: Vec::new(),
        }
    }

    pub fn string(key: impl AsRef<str>) -> Self {
        Self::new(key, AttributeKind::String)
    }

    pub fn bool(key: impl AsRef<str>) -> Self {
        Self::new(key, AttributeKind::Bool)
    }

    pub fn int(key: impl AsRef<str>) -> Self {
        Self::new(key, AttributeKind::Int)
    }

    pub fn string_list(key: impl AsRef<str>) -> Self {
        Self::new(key, AttributeKind::StringList)
    }

    pub fn string_map(key: impl AsRef<str>) -> Self {
        Self::new(key, AttributeKind::StringMap)
    }

    pub fn block(key: impl AsRef<str>, schema: Schema) -> Self {
        Self::new(
            key,
            AttributeKind::Block {
                schema,
                max_items: None,
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_allowed_values(mut self, values: &[&str]) -> Self {
        self.allowed_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Limit a block attribute to `max` entries. No effect on other kinds.
    pub fn max_items(mut self, max: usize) -> Self {
        if let AttributeKind::Block { max_items, .. } = &mut self.kind {
            *max_items = Some(max);
        }
        self
    }

    /// Nested schema of a block attribute
    pub fn block_schema(&self) -> Option<&Schema> {
        match &self.kind {
            AttributeKind::Block { schema, .. } => Some(schema),
            _ => None,
        }
    }

    fn check_allowed(&self, value: &str, path: &str, diags: &mut Diagnostics) {
        if !self.allowed_values.is_empty() && !self.allowed_values.iter().any(|v| v == value) {
            diags.push(
                Diagnostic::error(format!(
                    "expected {} to be one of {:?}, got {}",
                    self.key, self.allowed_values, value
                ))
                .with_attribute(path),
            );
        }
    }

    fn validate(&self, value: &Value, path: &str, diags: &mut Diagnostics) {
        let mismatch = || {
            Diagnostic::error(format!("Attribute {} must be {}", self.key, self.kind.expected()))
                .with_attribute(path)
        };

        match (&self.kind, value) {
            (AttributeKind::String, Value::String(s)) => self.check_allowed(s, path, diags),
            (AttributeKind::Bool, Value::Bool(_)) => {}
            (AttributeKind::Int, Value::Number(n)) if n.is_i64() => {}
            (AttributeKind::StringList, Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::String(s) => self.check_allowed(s, path, diags),
                        _ => diags.push(mismatch()),
                    }
                }
            }
            (AttributeKind::StringMap, Value::Object(entries)) => {
                if entries.values().any(|v| !v.is_string()) {
                    diags.push(mismatch());
                }
            }
            (AttributeKind::Block { schema, max_items }, Value::Array(blocks)) => {
                if let Some(max) = max_items
                    && blocks.len() > *max
                {
                    diags.push(
                        Diagnostic::error(format!(
                            "Too many {} blocks: at most {} allowed, got {}",
                            self.key,
                            max,
                            blocks.len()
                        ))
                        .with_attribute(path),
                    );
                }
                for (i, block) in blocks.iter().enumerate() {
                    match block {
                        Value::Object(values) => {
                            schema.validate_at(values, &format!("{}.{}", path, i), diags)
                        }
                        _ => diags.push(mismatch()),
                    }
                }
            }
            _ => diags.push(mismatch()),
        }
    }
}

/// Shape of a resource (or of a nested block)
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.key == key)
    }

    /// Validate a configuration object against this schema
    pub fn validate(&self, values: &Map<String, Value>) -> Diagnostics {
        let mut diags = Diagnostics::new();
        self.validate_at(values, "", &mut diags);
        diags
    }

    fn validate_at(&self, values: &Map<String, Value>, prefix: &str, diags: &mut Diagnostics) {
        let path = |key: &str| {
            if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", prefix, key)
            }
        };

        for key in values.keys() {
            if self.attribute(key).is_none() {
                diags.push(
                    Diagnostic::error(format!("An argument named {} is not expected here", key))
                        .with_attribute(path(key)),
                );
            }
        }

        for attribute in &self.attributes {
            let value = values.get(&attribute.key).filter(|v| !v.is_null());
            match (attribute.presence, value) {
                (Presence::Required, None) => diags.push(
                    Diagnostic::error(format!(
                        "The argument {} is required, but no definition was found",
                        attribute.key
                    ))
                    .with_attribute(path(&attribute.key)),
                ),
                (Presence::Computed, Some(_)) => diags.push(
                    Diagnostic::error(format!(
                        "{} is computed by the server and cannot be configured",
                        attribute.key
                    ))
                    .with_attribute(path(&attribute.key)),
                ),
                (_, Some(value)) => attribute.validate(value, &path(&attribute.key), diags),
                (_, None) => {}
            }
        }
    }

    /// Fill in declared defaults for absent attributes, recursing into blocks
    pub fn apply_defaults(&self, values: &mut Map<String, Value>) {
        for attribute in &self.attributes {
            let absent = values.get(&attribute.key).is_none_or(Value::is_null);
            if absent {
                if let Some(default) = &attribute.default {
                    values.insert(attribute.key.clone(), default.clone());
                }
                continue;
            }

            if let (Some(schema), Some(Value::Array(blocks))) =
                (attribute.block_schema(), values.get_mut(&attribute.key))
            {
                for block in blocks.iter_mut() {
                    if let Value::Object(block_values) = block {
                        schema.apply_defaults(block_values);
                    }
                }
            }
        }
    }
}
