use crate::utils;
use colored::Colorize;
use std::path::Path;

pub fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "Validating configuration...".blue());

    let (path, config) = match utils::load_config(config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Configuration error".red().bold());
            eprintln!("  {:#}", e);
            std::process::exit(1);
        }
    };
    println!("Configuration: {}", path.display().to_string().cyan());

    let diags = utils::validate(&config.resources);
    if diags.has_errors() {
        eprintln!();
        eprintln!("{}", "✗ Configuration is invalid".red().bold());
        utils::print_diagnostics(&diags);
        std::process::exit(1);
    }
    utils::print_diagnostics(&diags);

    println!("{}", "✓ Configuration is valid".green().bold());
    println!();
    println!("Resources: {}", config.resources.len());
    for resource in config.resources.iter() {
        println!("  - {}", resource.address().cyan());
    }

    Ok(())
}
