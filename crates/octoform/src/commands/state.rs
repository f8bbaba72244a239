use colored::Colorize;
use octoform_core::StateManager;

pub async fn handle(address: Option<&str>) -> anyhow::Result<()> {
    let manager = StateManager::new(std::env::current_dir()?);
    let state = manager.load().await?;

    if let Some(address) = address {
        let resource = state
            .get_resource(address)
            .ok_or_else(|| anyhow::anyhow!("{} is not in state", address))?;
        println!("{}", serde_json::to_string_pretty(resource)?);
        return Ok(());
    }

    if state.resources.is_empty() {
        println!("No resources in state.");
        return Ok(());
    }

    for (address, resource) in &state.resources {
        println!("{} ({})", address.cyan(), resource.id);
    }
    Ok(())
}
