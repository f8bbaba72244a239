//! octoform core
//!
//! Resource framework shared by the octoform provider and CLI.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  octoform CLI                   │
//! │        (validate / plan / apply / import)       │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 octoform-core                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   Provider registry + plan/apply runner  │   │
//! │  │   trait Resource { create, read, ... }   │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐ ┌──────────────┐ ┌─────────┐  │
//! │  │    Schema    │ │ ResourceData │ │  State  │  │
//! │  └──────────────┘ └──────────────┘ └─────────┘  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │  octoform-provider (deployment process,         │
//! │  project trigger, lifecycle resources)          │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod provider;
pub mod runner;
pub mod schema;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use data::{Attributes, Block, ResourceData};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ProviderError, Result};
pub use provider::{CrudResult, Provider, Resource, ResourceConfig, ResourceSet, parse_address};
pub use schema::{Attribute, AttributeKind, Presence, Schema};
pub use state::{GlobalState, ResourceState, StateLock, StateManager};
