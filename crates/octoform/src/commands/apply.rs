use crate::utils;
use colored::Colorize;
use std::path::Path;

pub async fn handle(config: Option<&Path>, yes: bool) -> anyhow::Result<()> {
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
    if diags.has_errors() {
        anyhow::bail!("failed to refresh state");
    }

    let plan = provider.plan(&config.resources, &state)?;
    if !plan.has_changes {
        // Refresh may still have dropped vanished resources
        manager.save(&mut state).await?;
        lock.release().await?;
        println!("{}", "No changes. Remote objects match the configuration.".green());
        return Ok(());
    }
    utils::print_plan(&plan);

    if !yes && !utils::confirm("Apply these changes?")? {
        lock.release().await?;
        println!("{}", "Apply cancelled.".yellow());
        return Ok(());
    }

    let result = provider.apply(&plan, &config.resources, &mut state).await;
    manager.save(&mut state).await?;
    lock.release().await?;

    for success in &result.succeeded {
        println!("{} {}", "✓".green(), success.message);
    }
    for failure in &result.failed {
        eprintln!(
            "{} {}: {}",
            "✗".red(),
            failure.action_id,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    if !result.is_success() {
        anyhow::bail!(
            "{} of {} changes failed",
            result.failed.len(),
            result.failed.len() + result.succeeded.len()
        );
    }

    println!();
    println!(
        "{} ({} changes in {}ms)",
        "Apply complete".green().bold(),
        result.succeeded.len(),
        result.duration_ms
    );
    Ok(())
}
