//! Pipekit CLI
//!
//! Local testing of platform pipelines: run a pipeline against numbered run
//! directories, in a virtual environment or inside its Docker image, and
//! inspect past runs.

mod commands;
mod config;

use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use config::Config;
use pipekit_runner::RunError;
use pipekit_runner::config::{ENV_API_TOKEN, ENV_ENVIRONMENT, ENV_HOST, ENV_ORGANIZATION};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pipekit")]
#[command(about = "Test platform pipelines locally", long_about = None)]
struct Cli {
    /// Organization to work in
    #[arg(long, global = true, env = ENV_ORGANIZATION)]
    organization: Option<String>,

    /// Platform environment (PROD, STAGING or LOCAL)
    #[arg(long = "env", global = true, env = ENV_ENVIRONMENT)]
    environment: Option<String>,

    /// Platform host, overriding the environment's default
    #[arg(long, global = true, env = ENV_HOST)]
    host: Option<String>,

    /// API token
    #[arg(long, global = true, env = ENV_API_TOKEN, hide_env_values = true)]
    api_token: Option<String>,

    /// Directory searched for pipelines
    #[arg(long, global = true, env = "PIPEKIT_SEARCH_PATH", default_value = ".")]
    search_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipekit=info,pipekit_runner=info,pipekit_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        search_path: cli.search_path,
        organization: cli.organization,
        environment: cli.environment,
        host: cli.host,
        api_token: cli.api_token,
    };

    if let Err(e) = handle_command(cli.command, &config).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(exit_code(&e));
    }
}

/// Exit status for a failed command; a failed pipeline keeps its own code
fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<RunError>()
        .map_or(1, RunError::exit_code)
}
