mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "octoform")]
#[command(about = "Declarative Octopus Deploy configuration in KDL", long_about = None)]
struct Cli {
    /// Configuration file (default: octoform.kdl discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the configuration against the resource schemas
    Validate,
    /// Show the changes apply would make
    Plan,
    /// Create, update and delete resources to match the configuration
    Apply {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every managed resource
    Destroy {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Bring an existing remote entity under management
    Import {
        /// Resource address (<type>.<name>)
        address: String,
        /// Remote identifier
        id: String,
    },
    /// Show managed resources
    State {
        /// Resource address to show in full
        address: Option<String>,
    },
    /// Print resource schemas as JSON
    Schema {
        /// Resource type (all types when omitted)
        resource_type: Option<String>,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Validate => commands::validate::handle(config)?,
        Commands::Plan => commands::plan::handle(config).await?,
        Commands::Apply { yes } => commands::apply::handle(config, yes).await?,
        Commands::Destroy { yes } => commands::destroy::handle(config, yes).await?,
        Commands::Import { address, id } => {
            commands::import::handle(config, &address, &id).await?
        }
        Commands::State { address } => commands::state::handle(address.as_deref()).await?,
        Commands::Schema { resource_type } => commands::schema::handle(resource_type.as_deref())?,
        Commands::Version => {
            println!("octoform {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
