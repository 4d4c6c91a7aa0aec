//! Command handlers module
//!
//! This module contains all CLI command implementations.

mod runs;
mod smoke;
mod test;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use pipekit_runner::config::EnvConfig;
use pipekit_runner::connector::HttpConnector;
use pipekit_runner::pipeline::PipelineConfig;
use pipekit_runner::process::ProcessRunner;
use pipekit_runner::prompt::TerminalPrompter;
use pipekit_runner::service::{Orchestrator, RunOutcome, TestOptions};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a pipeline locally in its virtual environment
    Test(TestArgs),

    /// Run a pipeline inside its Docker image
    SmokeTest(smoke::SmokeTestArgs),

    /// Inspect the run directories of a pipeline
    Runs {
        #[command(subcommand)]
        command: runs::RunsCommands,
    },
}

/// Arguments shared by `test` and `smoke-test`
#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    /// Pipeline name (directory holding a config.toml)
    pub pipeline: String,

    /// Write into the latest run directory and offer its config again
    #[arg(long)]
    pub reuse_dir: bool,

    /// Use this run config instead of prompting
    #[arg(long)]
    pub run_config_file: Option<PathBuf>,

    /// Delete an existing output dataset version without asking
    #[arg(long)]
    pub override_outputs: bool,
}

impl TestArgs {
    pub fn options(&self) -> TestOptions {
        TestOptions {
            reuse_dir: self.reuse_dir,
            config_file: self.run_config_file.clone(),
            override_outputs: self.override_outputs,
        }
    }
}

/// Handle CLI commands
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Test(args) => test::handle_test_command(args, config).await,
        Commands::SmokeTest(args) => smoke::handle_smoke_test_command(args, config).await,
        Commands::Runs { command } => runs::handle_runs_command(command, config).await,
    }
}

/// Runs the orchestrator with the terminal prompter and reports the outcome
async fn run_pipeline(
    pipeline: &PipelineConfig,
    env: &EnvConfig,
    runner: &dyn ProcessRunner,
    options: &TestOptions,
) -> Result<RunOutcome> {
    println!(
        "{} {} ({} runner, {})",
        "Testing pipeline".cyan().bold(),
        pipeline.name().bold(),
        runner.name(),
        env.environment
    );

    let connector = HttpConnector::new();
    let mut prompter = TerminalPrompter::new();
    let mut orchestrator = Orchestrator::new(pipeline, env, &connector, runner, &mut prompter);
    let outcome = orchestrator.run(options).await?;

    print_outcome(pipeline, &outcome)?;
    Ok(outcome)
}

fn print_outcome(pipeline: &PipelineConfig, outcome: &RunOutcome) -> Result<()> {
    println!(
        "{}",
        format!(
            "✓ Pipeline '{}' finished in {}",
            pipeline.name(),
            outcome.run_dir.name()
        )
        .green()
        .bold()
    );
    println!(
        "  {}: {}",
        "Config".bold(),
        outcome.run_dir.config_path().display()
    );
    let summary = serde_json::to_string_pretty(&outcome.config.io_summary())?;
    println!("{}", summary.dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn test_parse_test_flags() {
        let cli = TestCli::try_parse_from([
            "pipekit",
            "test",
            "resize",
            "--reuse-dir",
            "--run-config-file",
            "cfg.toml",
        ])
        .unwrap();

        let Commands::Test(args) = cli.command else {
            panic!("expected test command");
        };
        let options = args.options();
        assert_eq!(args.pipeline, "resize");
        assert!(options.reuse_dir);
        assert_eq!(options.config_file, Some(PathBuf::from("cfg.toml")));
        assert!(!options.override_outputs);
    }

    #[test]
    fn test_parse_smoke_test_flags() {
        let cli =
            TestCli::try_parse_from(["pipekit", "smoke-test", "resize", "--gpu", "--override-outputs"])
                .unwrap();

        let Commands::SmokeTest(args) = cli.command else {
            panic!("expected smoke-test command");
        };
        assert!(args.gpu);
        assert!(args.test.options().override_outputs);
    }

    #[test]
    fn test_pipeline_name_is_required() {
        assert!(TestCli::try_parse_from(["pipekit", "test"]).is_err());
    }
}
