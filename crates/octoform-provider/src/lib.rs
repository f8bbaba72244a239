//! Octopus Deploy resources for octoform
//!
//! - `octopusdeploy_deployment_process`
//! - `octopusdeploy_project_deployment_target_trigger`
//! - `octopusdeploy_lifecycle`
//!
//! Each resource translates its configuration block into an API payload,
//! calls the server through [`octoform_client::OctopusClient`] and
//! flattens the response back into state.

pub mod deployment_process;
pub mod deployment_step;
pub mod error;
pub mod fields;
pub mod identifier;
pub mod lifecycle;
pub mod project_trigger;
pub mod provider;

pub use deployment_process::DeploymentProcessResource;
pub use error::{ResourceError, Result};
pub use fields::Field;
pub use identifier::ProcessId;
pub use lifecycle::LifecycleResource;
pub use project_trigger::ProjectDeploymentTargetTriggerResource;
pub use provider::{PROVIDER_NAME, octopus_provider, resource_schemas};
