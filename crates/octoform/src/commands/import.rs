use crate::utils;
use colored::Colorize;
use std::path::Path;

pub async fn handle(config: Option<&Path>, address: &str, id: &str) -> anyhow::Result<()> {
    let (_, config) = utils::load_config(config)?;
    let provider = utils::connect(&config)?;
    let (manager, lock) = utils::open_state().await?;
    let mut state = manager.load().await?;

    if let Err(diags) = provider.import(address, id, &mut state).await {
        lock.release().await?;
        utils::print_diagnostics(&diags);
        anyhow::bail!("import of {} failed", address);
    }

    manager.save(&mut state).await?;
    lock.release().await?;

    println!("{} {} imported ({})", "✓".green(), address.cyan(), id);
    if config.resources.get(address).is_none() {
        println!(
            "{}",
            "  The resource is not declared in the configuration; the next apply will destroy it."
                .yellow()
        );
    }
    Ok(())
}
