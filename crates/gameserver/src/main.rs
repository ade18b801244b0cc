mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gameserver")]
#[command(about = "Deploy a game server VM to Azure", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Override a config value (repeatable), e.g. -c servicePort=8080
    #[arg(short = 'c', long = "config", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resources a deployment would create
    Preview {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Create the resource group, network and VM
    Up {
        #[command(flatten)]
        config: ConfigArgs,
        /// Apply without stopping at the plan
        #[arg(short, long)]
        yes: bool,
        /// Record what would be submitted instead of calling Azure
        #[arg(long)]
        dry_run: bool,
        /// Print the SSH private key instead of a mask
        #[arg(long)]
        show_secrets: bool,
        /// Also copy the SSH private key to this file (mode 0600)
        #[arg(long, value_name = "PATH")]
        key_out: Option<PathBuf>,
        /// Azure subscription to deploy into (default: the az CLI's current one)
        #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
        subscription: Option<String>,
    },
    /// Show the outputs of the last deployment
    Outputs {
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// Include the stored SSH private key
        #[arg(long)]
        show_secrets: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries plans and outputs; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match cli.command {
        Commands::Preview { config } => {
            let loaded = commands::load_config(&config.overrides)?;
            commands::preview::handle(&loaded).await?;
        }
        Commands::Up {
            config,
            yes,
            dry_run,
            show_secrets,
            key_out,
            subscription,
        } => {
            let loaded = commands::load_config(&config.overrides)?;
            commands::up::handle(
                &loaded,
                commands::up::UpOptions {
                    yes,
                    dry_run,
                    show_secrets,
                    key_out,
                    subscription,
                },
            )
            .await?;
        }
        Commands::Outputs { json, show_secrets } => {
            commands::outputs::handle(json, show_secrets).await?;
        }
        Commands::Version => {
            println!("gameserver {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
