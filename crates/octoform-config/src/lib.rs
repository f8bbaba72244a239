//! octoform configuration
//!
//! Locates the configuration file, parses its KDL content against the
//! provider's resource schemas and resolves the provider connection
//! settings.

pub mod error;
pub mod parser;
pub mod settings;

pub use error::*;
pub use parser::{Config, parse_config_file, parse_config_str};
pub use settings::{ProviderSettings, ResolvedSettings};

use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "OCTOFORM_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["octoform.local.kdl", "octoform.kdl"];

/// Get the user-level configuration directory (`~/.config/octoform`)
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("octoform"))
}

/// Find the octoform configuration file
///
/// Search order:
/// 1. `OCTOFORM_CONFIG_PATH` (direct path)
/// 2. current directory: octoform.local.kdl, octoform.kdl
/// 3. `./.octoform/`, same order
/// 4. `~/.config/octoform/octoform.kdl`
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "{} points to {}, which does not exist",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let local_dir = current_dir.join(".octoform");
    if local_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = local_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Ok(dir) = config_dir() {
        let global = dir.join("octoform.kdl");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}
