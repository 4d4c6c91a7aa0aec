//! Docker smoke test command

use anyhow::{Result, anyhow, bail};
use clap::Args;
use colored::*;
use pipekit_runner::process::{DockerRunner, check_nvidia_runtime};

use super::{TestArgs, run_pipeline};
use crate::config::Config;

#[derive(Args, Debug, Clone)]
pub struct SmokeTestArgs {
    #[command(flatten)]
    pub test: TestArgs,

    /// Request GPU access for the container
    #[arg(long)]
    pub gpu: bool,
}

/// Runs a pipeline inside the image named by its `[docker]` section
pub async fn handle_smoke_test_command(args: SmokeTestArgs, config: &Config) -> Result<()> {
    let pipeline = config.find_pipeline(&args.test.pipeline)?;
    let image = pipeline.docker_image().ok_or_else(|| {
        anyhow!(
            "Pipeline '{}' has no [docker] image_name in {}",
            pipeline.name(),
            pipeline.config_path().display()
        )
    })?;
    let env = config.env_config()?;

    // Fail before prompting or allocating a run directory.
    if args.gpu && !check_nvidia_runtime().await {
        bail!("GPU requested but Docker has no NVIDIA runtime (install nvidia-container-toolkit)");
    }

    println!("{} {}", "Image:".bold(), image.cyan());
    let runner = DockerRunner::new(image, args.gpu);
    run_pipeline(&pipeline, &env, &runner, &args.test.options()).await?;
    Ok(())
}
