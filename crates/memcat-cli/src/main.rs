use std::path::PathBuf;

use clap::{Parser, Subcommand};
use memcat::Categorizer;
use memcat::config::Config;
use memcat_cli::commands::{CategorizeCommand, ConfigCommand, HealthCommand};
use memcat_cli::error::CliResult;
use memcat_cli::output::OutputFormat;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "memcat")]
#[command(about = "memcat - Tag memories with topic categories using a local LLM")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(long, short = 'c', global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Categorize one or more memories")]
    Categorize(CategorizeCommand),

    #[clap(about = "Check that the inference backend is reachable")]
    Health(HealthCommand),

    #[clap(about = "Configuration commands")]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,memcat=info"));

    // stdout carries command output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let config = Config::load(cli.config.as_deref())?.with_env_overrides();
    tracing::debug!("Resolved config: {:?}", config);

    match &cli.command {
        Command::Categorize(cmd) => {
            let categorizer = Categorizer::from_config(&config)?;
            cmd.execute(&categorizer, format).await
        }
        Command::Health(cmd) => cmd.execute(&config, format).await,
        Command::Config(cmd) => cmd.execute(&config, cli.config.as_deref(), format).await,
    }
}
