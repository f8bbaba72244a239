//! Projects service

use crate::client::{OctopusClient, encode_segment};
use crate::error::Result;
use crate::Links;
use serde::{Deserialize, Serialize};

/// A project, as far as the provider needs it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub deployment_process_id: Option<String>,
    #[serde(default)]
    pub lifecycle_id: Option<String>,
    #[serde(default)]
    pub persistence_settings: Option<PersistenceSettings>,
    #[serde(default)]
    pub links: Links,
}

impl Project {
    pub fn is_version_controlled(&self) -> bool {
        matches!(
            self.persistence_settings,
            Some(PersistenceSettings {
                kind: PersistenceKind::VersionControlled,
                ..
            })
        )
    }

    /// Default branch of a version-controlled project
    pub fn default_branch(&self) -> Option<&str> {
        self.persistence_settings
            .as_ref()
            .and_then(|s| s.default_branch.as_deref())
            .filter(|b| !b.is_empty())
    }
}

/// Where a project stores its configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersistenceSettings {
    #[serde(rename = "Type")]
    pub kind: PersistenceKind,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceKind {
    Database,
    VersionControlled,
    #[serde(other)]
    Unknown,
}

pub struct Projects<'a> {
    client: &'a OctopusClient,
}

impl<'a> Projects<'a> {
    pub(crate) fn new(client: &'a OctopusClient) -> Self {
        Self { client }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Project> {
        tracing::debug!("Fetching project {}", id);
        let path = self
            .client
            .space_path(&format!("projects/{}", encode_segment(id)));
        self.client.get(&path).await
    }
}
