use anyhow::Context;
use colored::Colorize;
use octoform_client::{ClientConfig, OctopusClient};
use octoform_config::Config;
use octoform_core::{Diagnostics, Plan, Provider, ResourceSet, StateLock, StateManager};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Locate and parse the configuration file
pub fn load_config(path: Option<&Path>) -> anyhow::Result<(PathBuf, Config)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => octoform_config::find_config_file()?,
    };
    let config = octoform_config::parse_config_file(&path, &octoform_provider::resource_schemas())
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::info!(
        "loaded {} resources from {}",
        config.resources.len(),
        path.display()
    );
    Ok((path, config))
}

/// Schema diagnostics for every declared resource
pub fn validate(resources: &ResourceSet) -> Diagnostics {
    let schemas = octoform_provider::resource_schemas();
    let mut diags = Diagnostics::new();

    for resource in resources.iter() {
        let address = resource.address();
        match schemas.get(resource.resource_type.as_str()) {
            Some(schema) => {
                let values = resource.config.as_object().cloned().unwrap_or_default();
                diags.extend(schema.validate(&values).scoped(&address));
            }
            None => diags.extend(
                Diagnostics::error(format!(
                    "Resource type not supported: {}",
                    resource.resource_type
                ))
                .scoped(&address),
            ),
        }
    }

    diags
}

/// Connect to the server named in the provider settings
pub fn connect(config: &Config) -> anyhow::Result<Provider> {
    let settings = config.provider.clone().resolve()?;
    let mut client_config = ClientConfig::new(settings.address, settings.api_key);
    if let Some(space_id) = settings.space_id {
        client_config = client_config.with_space_id(space_id);
    }
    let client = OctopusClient::new(client_config)?;
    tracing::info!("connected to {}", client.address());
    Ok(octoform_provider::octopus_provider(Arc::new(client)))
}

/// State lives next to the working directory
pub async fn open_state() -> anyhow::Result<(StateManager, StateLock)> {
    let manager = StateManager::new(std::env::current_dir()?);
    let lock = manager.acquire_lock().await?;
    Ok((manager, lock))
}

pub fn print_diagnostics(diags: &Diagnostics) {
    for diagnostic in diags.iter() {
        let line = diagnostic.to_string();
        if diagnostic.is_error() {
            eprintln!("{} {}", "✗".red(), line);
        } else {
            eprintln!("{} {}", "!".yellow(), line);
        }
    }
}

pub fn print_plan(plan: &Plan) {
    for action in &plan.actions {
        let marker = match action.action_type {
            octoform_core::ActionType::Create => "+".green(),
            octoform_core::ActionType::Update => "~".yellow(),
            octoform_core::ActionType::Delete => "-".red(),
            octoform_core::ActionType::NoOp => continue,
        };
        println!("  {} {}", marker, action.address);
    }
    println!();
    println!("Plan: {}", plan.summary().to_string().bold());
}

/// Ask for confirmation on the terminal
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N]: ", prompt);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
