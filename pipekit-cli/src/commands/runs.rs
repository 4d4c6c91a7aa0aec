//! Run directory inspection commands

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use pipekit_runner::runs::{RunManager, load_run_config};

use crate::config::Config;

#[derive(Subcommand)]
pub enum RunsCommands {
    /// List the run directories of a pipeline
    List {
        /// Pipeline name
        pipeline: String,
    },

    /// Show the inputs and outputs recorded for a run
    Show {
        /// Pipeline name
        pipeline: String,

        /// Run index (defaults to the latest run with a config)
        #[arg(long)]
        run: Option<u32>,
    },
}

/// Handle runs commands
///
/// # Arguments
/// * `command` - The runs subcommand to execute
/// * `config` - CLI configuration
pub async fn handle_runs_command(command: RunsCommands, config: &Config) -> Result<()> {
    match command {
        RunsCommands::List { pipeline } => list_runs(config, &pipeline),
        RunsCommands::Show { pipeline, run } => show_run(config, &pipeline, run),
    }
}

fn list_runs(config: &Config, name: &str) -> Result<()> {
    let pipeline = config.find_pipeline(name)?;
    let manager = RunManager::new(pipeline.dir());
    let runs = manager.run_dirs()?;

    if runs.is_empty() {
        println!("{}", "No runs found".yellow());
        return Ok(());
    }

    println!("{}", format!("Runs of '{}':", pipeline.name()).bold());
    for run in &runs {
        let status = if run.has_config() {
            "config".green()
        } else {
            "no config".dimmed()
        };
        println!("  {:<8} {}", run.name().cyan(), status);
    }
    Ok(())
}

fn show_run(config: &Config, name: &str, index: Option<u32>) -> Result<()> {
    let pipeline = config.find_pipeline(name)?;
    let manager = RunManager::new(pipeline.dir());

    let config_path = match index {
        Some(index) => match manager.run_dir(index)? {
            Some(run) => run.config_path(),
            None => bail!("Run {} not found for pipeline '{}'", index, pipeline.name()),
        },
        None => match manager.latest_run_config_path()? {
            Some(path) => path,
            None => bail!("No run with a config for pipeline '{}'", pipeline.name()),
        },
    };

    let run_config = load_run_config(&config_path)?;
    println!("{} {}", "Config:".bold(), config_path.display());
    if let Some(job_type) = run_config.job_type() {
        println!("{} {}", "Job type:".bold(), job_type.to_string().cyan());
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&run_config.io_summary())?
    );
    Ok(())
}
