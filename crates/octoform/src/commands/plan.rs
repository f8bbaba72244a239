use crate::utils;
use colored::Colorize;
use std::path::Path;

pub async fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    let (_, config) = utils::load_config(config)?;

    let diags = utils::validate(&config.resources);
    utils::print_diagnostics(&diags);
    if diags.has_errors() {
        anyhow::bail!("configuration is invalid");
    }

    let provider = utils::connect(&config)?;
    let (manager, lock) = utils::open_state().await?;
    let mut state = manager.load().await?;

    println!("{}", "Refreshing state...".blue());
    let diags = provider.refresh(&mut state).await;
    utils::print_diagnostics(&diags);

    let plan = provider.plan(&config.resources, &state)?;
    lock.release().await?;

    if !plan.has_changes {
        println!("{}", "No changes. Remote objects match the configuration.".green());
        return Ok(());
    }
    utils::print_plan(&plan);

    Ok(())
}
