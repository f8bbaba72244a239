//! Lifecycles service

use crate::client::{OctopusClient, encode_segment};
use crate::error::Result;
use crate::Links;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered phases a release moves through, plus retention rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Lifecycle {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub release_retention_policy: RetentionPeriod,
    #[serde(default)]
    pub tentacle_retention_policy: RetentionPeriod,
    #[serde(default)]
    pub links: Links,
}

impl Lifecycle {
    /// New lifecycle that keeps everything forever
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            space_id: None,
            phases: Vec::new(),
            release_retention_policy: RetentionPeriod::keep_forever(),
            tentacle_retention_policy: RetentionPeriod::keep_forever(),
            links: Links::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Phase {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub automatic_deployment_targets: Vec<String>,
    #[serde(default)]
    pub optional_deployment_targets: Vec<String>,
    #[serde(default)]
    pub minimum_environments_before_promotion: i32,
    #[serde(default)]
    pub is_optional_phase: bool,
    #[serde(default)]
    pub release_retention_policy: Option<RetentionPeriod>,
    #[serde(default)]
    pub tentacle_retention_policy: Option<RetentionPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RetentionPeriod {
    pub quantity_to_keep: i32,
    pub should_keep_forever: bool,
    pub unit: RetentionUnit,
}

impl RetentionPeriod {
    pub fn new(quantity_to_keep: i32, unit: RetentionUnit) -> Self {
        Self {
            quantity_to_keep,
            should_keep_forever: false,
            unit,
        }
    }

    pub fn keep_forever() -> Self {
        Self {
            quantity_to_keep: 0,
            should_keep_forever: true,
            unit: RetentionUnit::Days,
        }
    }
}

impl Default for RetentionPeriod {
    fn default() -> Self {
        Self::keep_forever()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionUnit {
    #[default]
    Days,
    Items,
}

impl RetentionUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionUnit::Days => "Days",
            RetentionUnit::Items => "Items",
        }
    }
}

impl fmt::Display for RetentionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RetentionUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Days" => Ok(RetentionUnit::Days),
            "Items" => Ok(RetentionUnit::Items),
            other => Err(format!("unknown retention unit: {}", other)),
        }
    }
}

pub struct Lifecycles<'a> {
    client: &'a OctopusClient,
}

impl<'a> Lifecycles<'a> {
    pub(crate) fn new(client: &'a OctopusClient) -> Self {
        Self { client }
    }

    fn collection(&self) -> String {
        self.client.space_path("lifecycles")
    }

    fn member(&self, id: &str) -> String {
        format!("{}/{}", self.collection(), encode_segment(id))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Lifecycle> {
        self.client.get(&self.member(id)).await
    }

    pub async fn add(&self, lifecycle: &Lifecycle) -> Result<Lifecycle> {
        tracing::debug!("Adding lifecycle {}", lifecycle.name);
        self.client.post(&self.collection(), lifecycle).await
    }

    pub async fn update(&self, lifecycle: &Lifecycle) -> Result<Lifecycle> {
        tracing::debug!("Updating lifecycle {}", lifecycle.id);
        self.client.put(&self.member(&lifecycle.id), lifecycle).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        tracing::debug!("Deleting lifecycle {}", id);
        self.client.delete(&self.member(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_new_lifecycle_keeps_forever() {
        let lifecycle = Lifecycle::new("Default");
        assert!(lifecycle.release_retention_policy.should_keep_forever);
        assert_eq!(lifecycle.tentacle_retention_policy.quantity_to_keep, 0);
    }

    #[test]
    fn test_retention_unit_parse() {
        assert_eq!("Items".parse::<RetentionUnit>(), Ok(RetentionUnit::Items));
        assert!("Weeks".parse::<RetentionUnit>().is_err());
    }

    #[tokio::test]
    async fn test_add_and_update() {
        let mut server = mockito::Server::new_async().await;
        let add = server
            .mock("POST", "/api/Spaces-1/lifecycles")
            .match_body(Matcher::PartialJson(json!({
                "Name": "Default",
                "Phases": [{"Name": "Dev", "AutomaticDeploymentTargets": ["Environments-1"]}],
                "ReleaseRetentionPolicy": {"QuantityToKeep": 10, "Unit": "Items"}
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "Id": "Lifecycles-1",
                    "Name": "Default",
                    "Phases": [{"Id": "phase-1", "Name": "Dev", "AutomaticDeploymentTargets": ["Environments-1"]}],
                    "ReleaseRetentionPolicy": {"QuantityToKeep": 10, "ShouldKeepForever": false, "Unit": "Items"},
                    "TentacleRetentionPolicy": {"QuantityToKeep": 0, "ShouldKeepForever": true, "Unit": "Days"}
                })
                .to_string(),
            )
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/api/Spaces-1/lifecycles/Lifecycles-1")
            .match_body(Matcher::PartialJson(json!({"Id": "Lifecycles-1"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"Id": "Lifecycles-1", "Name": "Renamed"}"#)
            .create_async()
            .await;

        let client = client(&server);
        let mut lifecycle = Lifecycle::new("Default");
        lifecycle.release_retention_policy = RetentionPeriod::new(10, RetentionUnit::Items);
        lifecycle.phases.push(Phase {
            name: "Dev".to_string(),
            automatic_deployment_targets: vec!["Environments-1".to_string()],
            ..Default::default()
        });

        let mut created = client.lifecycles().add(&lifecycle).await.unwrap();
        assert_eq!(created.id, "Lifecycles-1");
        assert_eq!(created.phases[0].id, "phase-1");
        assert_eq!(created.release_retention_policy.unit, RetentionUnit::Items);

        created.name = "Renamed".to_string();
        let updated = client.lifecycles().update(&created).await.unwrap();
        assert_eq!(updated.name, "Renamed");

        add.assert_async().await;
        update.assert_async().await;
    }
}
