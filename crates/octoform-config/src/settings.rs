//! Provider connection settings
//!
//! Values from the `provider` block win over the environment.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

pub const ADDRESS_ENV: &str = "OCTOPUS_URL";
pub const API_KEY_ENV: &str = "OCTOPUS_APIKEY";
pub const SPACE_ID_ENV: &str = "OCTOPUS_SPACE_ID";

/// Settings as declared; any of them may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub address: Option<String>,
    pub api_key: Option<String>,
    pub space_id: Option<String>,
}

/// Settings ready to open a client with
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub address: String,
    pub api_key: String,
    pub space_id: Option<String>,
}

impl ProviderSettings {
    /// Read settings from `OCTOPUS_URL`, `OCTOPUS_APIKEY`, `OCTOPUS_SPACE_ID`
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            address: var(ADDRESS_ENV),
            api_key: var(API_KEY_ENV),
            space_id: var(SPACE_ID_ENV),
        }
    }

    /// Fill unset values from `fallback`
    pub fn or(self, fallback: ProviderSettings) -> Self {
        Self {
            address: self.address.or(fallback.address),
            api_key: self.api_key.or(fallback.api_key),
            space_id: self.space_id.or(fallback.space_id),
        }
    }

    /// Merge with the environment and require address and API key
    pub fn resolve(self) -> Result<ResolvedSettings> {
        let merged = self.or(Self::from_env());

        let address = merged.address.ok_or(ConfigError::MissingSetting {
            setting: "address",
            env: ADDRESS_ENV,
        })?;
        let api_key = merged.api_key.ok_or(ConfigError::MissingSetting {
            setting: "api_key",
            env: API_KEY_ENV,
        })?;

        Ok(ResolvedSettings {
            address,
            api_key,
            space_id: merged.space_id,
        })
    }
}
