//! Local test command

use anyhow::{Context, Result};
use pipekit_runner::process::VenvRunner;

use super::{TestArgs, run_pipeline};
use crate::config::Config;

/// Runs a pipeline with the interpreter of its virtual environment
///
/// The current directory is exported as PYTHONPATH so pipelines can import
/// shared code from the repository root.
pub async fn handle_test_command(args: TestArgs, config: &Config) -> Result<()> {
    let pipeline = config.find_pipeline(&args.pipeline)?;
    let env = config.env_config()?;
    let python_path = std::env::current_dir().context("Failed to read current directory")?;
    let runner = VenvRunner::new(python_path);

    run_pipeline(&pipeline, &env, &runner, &args.options()).await?;
    Ok(())
}
