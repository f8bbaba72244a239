use octoform_core::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    ConfigDirNotFound,

    #[error(
        "Configuration file not found. Looked in:\n\
        - current directory: octoform.local.kdl, octoform.kdl\n\
        - ./.octoform/ directory\n\
        - ~/.config/octoform/octoform.kdl\n\
        Set OCTOFORM_CONFIG_PATH to point at a file directly"
    )]
    ConfigFileNotFound,

    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported resource type: {0}")]
    UnknownResourceType(String),

    #[error("Missing provider setting {setting}: set it in the provider block or via {env}")]
    MissingSetting {
        setting: &'static str,
        env: &'static str,
    },

    #[error(transparent)]
    Resource(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
