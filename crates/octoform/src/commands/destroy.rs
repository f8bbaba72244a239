use crate::utils;
use colored::Colorize;
use std::path::Path;

pub async fn handle(config: Option<&Path>, yes: bool) -> anyhow::Result<()> {
    let (_, config) = utils::load_config(config)?;
    let provider = utils::connect(&config)?;
    let (manager, lock) = utils::open_state().await?;
    let mut state = manager.load().await?;

    let plan = provider.destroy_plan(&state);
    if !plan.has_changes {
        lock.release().await?;
        println!("{}", "Nothing to destroy.".green());
        return Ok(());
    }
    utils::print_plan(&plan);

    if !yes && !utils::confirm("Destroy all managed resources?")? {
        lock.release().await?;
        println!("{}", "Destroy cancelled.".yellow());
        return Ok(());
    }

    let result = provider.destroy(&mut state).await;
    manager.save(&mut state).await?;
    lock.release().await?;

    for failure in &result.failed {
        eprintln!(
            "{} {}: {}",
            "✗".red(),
            failure.action_id,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }
    if !result.is_success() {
        anyhow::bail!("{} resources could not be destroyed", result.failed.len());
    }

    println!(
        "{} ({} resources destroyed)",
        "Destroy complete".green().bold(),
        result.succeeded.len()
    );
    Ok(())
}
