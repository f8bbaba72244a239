//! Octopus Deploy REST API client
//!
//! Covers the entities octoform manages: projects (read only), deployment
//! processes, project triggers and lifecycles.

pub mod client;
pub mod deployment_processes;
pub mod error;
pub mod lifecycles;
pub mod project_triggers;
pub mod projects;

use std::collections::BTreeMap;

/// Hypermedia links returned with every entity
pub type Links = BTreeMap<String, String>;

pub use client::{ClientConfig, OctopusClient};
pub use deployment_processes::{
    DeploymentAction, DeploymentProcess, DeploymentProcesses, DeploymentStep, PackageReference,
    PropertyValue, SensitiveValue,
};
pub use error::{ClientError, Result};
pub use lifecycles::{Lifecycle, Lifecycles, Phase, RetentionPeriod, RetentionUnit};
pub use project_triggers::{ProjectTrigger, ProjectTriggers, TriggerAction, TriggerFilter};
pub use projects::{PersistenceKind, PersistenceSettings, Project, Projects};
