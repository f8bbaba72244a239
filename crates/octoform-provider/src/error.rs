//! Resource handler error types

use octoform_client::ClientError;
use octoform_core::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error(
        "you cannot change a deployment processes branch. instead create a new resource with the new branch and, if required, destroy the previous one"
    )]
    BranchChanged { current: String, requested: String },

    #[error("Invalid value for {attribute}. {value} not in [{}]", .allowed.join(" "))]
    InvalidValue {
        attribute: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("No project ID can be recovered from identifier {0}")]
    UnresolvableId(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, ResourceError>;
