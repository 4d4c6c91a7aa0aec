//! External process execution
//!
//! Runs a pipeline script for a test invocation:
//! - `VenvRunner`: inside a uv-managed virtual environment next to the pipeline
//! - `DockerRunner`: inside the pipeline's Docker image (smoke test)
//!
//! The pipeline's own output is streamed to the terminal. Setup commands are
//! captured and logged at debug level.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, RunError};

/// Mount point of the pipeline directory inside smoke test containers
const CONTAINER_WORKSPACE: &str = "/workspace";

/// Everything needed to launch one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub pipeline_dir: PathBuf,
    pub script: PathBuf,
    pub requirements: Option<PathBuf>,
    pub run_config_path: PathBuf,
    pub working_dir: PathBuf,
    /// Variables added to the child's environment
    pub env: BTreeMap<String, String>,
}

/// Executes a pipeline run to completion
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Short name for logs ("venv", "docker")
    fn name(&self) -> &'static str;

    /// Runs the pipeline and waits for it to exit
    ///
    /// # Returns
    /// `RunError::ProcessFailed` carrying the exit code when the pipeline
    /// exits non-zero
    async fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Command line of a local pipeline run
pub fn build_pipeline_command(python: &str, script: &str, run_config: &str) -> Vec<String> {
    vec![
        python.to_string(),
        script.to_string(),
        "--config-file".to_string(),
        run_config.to_string(),
        "--mode".to_string(),
        "local".to_string(),
    ]
}

// =============================================================================
// Virtual environment
// =============================================================================

/// Runs pipelines with the interpreter of `<pipeline_dir>/.venv`
#[derive(Debug, Clone)]
pub struct VenvRunner {
    /// Value of PYTHONPATH for the pipeline process
    python_path: PathBuf,
}

impl VenvRunner {
    pub fn new(python_path: impl Into<PathBuf>) -> Self {
        Self {
            python_path: python_path.into(),
        }
    }

    /// Creates the virtual environment if needed and installs requirements
    ///
    /// # Returns
    /// Path of the environment's python interpreter
    async fn prepare(&self, invocation: &Invocation) -> Result<PathBuf> {
        let venv = invocation.pipeline_dir.join(".venv");

        if !venv.exists() {
            info!("Creating virtual environment in {}", venv.display());
            capture_command("uv", &["venv".to_string()], &invocation.pipeline_dir).await?;
        }

        let python = venv_python(&venv);
        if let Some(requirements) = &invocation.requirements {
            info!("Installing dependencies from {}", requirements.display());
            let args = vec![
                "pip".to_string(),
                "install".to_string(),
                "--python".to_string(),
                python.to_string_lossy().into_owned(),
                "-r".to_string(),
                requirements.to_string_lossy().into_owned(),
            ];
            capture_command("uv", &args, &invocation.pipeline_dir).await?;
        } else {
            debug!("No requirements file declared, skipping dependency install");
        }

        Ok(python)
    }
}

#[async_trait]
impl ProcessRunner for VenvRunner {
    fn name(&self) -> &'static str {
        "venv"
    }

    async fn run(&self, invocation: &Invocation) -> Result<()> {
        let python = self.prepare(invocation).await?;

        let command = build_pipeline_command(
            &python.to_string_lossy(),
            &invocation.script.to_string_lossy(),
            &invocation.run_config_path.to_string_lossy(),
        );

        let mut env = invocation.env.clone();
        env.insert(
            "PYTHONPATH".to_string(),
            self.python_path.to_string_lossy().into_owned(),
        );

        info!(
            "Running pipeline with working_dir={} and PYTHONPATH={}",
            invocation.working_dir.display(),
            self.python_path.display()
        );
        stream_command(&command[0], &command[1..], &invocation.working_dir, &env).await
    }
}

/// Interpreter path inside a virtual environment
pub fn venv_python(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}

// =============================================================================
// Docker smoke test
// =============================================================================

/// Runs pipelines inside the pipeline's Docker image
#[derive(Debug, Clone)]
pub struct DockerRunner {
    image: String,
    use_gpu: bool,
}

impl DockerRunner {
    pub fn new(image: impl Into<String>, use_gpu: bool) -> Self {
        Self {
            image: image.into(),
            use_gpu,
        }
    }

    /// Arguments of the `docker run` call for an invocation
    ///
    /// The pipeline directory is mounted at `/workspace`; the script and
    /// run config paths are rewritten to their container locations.
    pub fn docker_args(&self, invocation: &Invocation, container_name: &str) -> Result<Vec<String>> {
        let script = container_path(&invocation.pipeline_dir, &invocation.script)?;
        let run_config = container_path(&invocation.pipeline_dir, &invocation.run_config_path)?;

        let mut args: Vec<String> = vec![
            "run".into(),
            "--rm".into(),
            "--shm-size".into(),
            "8g".into(),
            "--name".into(),
            container_name.into(),
        ];
        if self.use_gpu {
            args.extend(["--gpus".into(), "all".into()]);
        }
        args.extend([
            "-v".into(),
            format!("{}:{}", invocation.pipeline_dir.display(), CONTAINER_WORKSPACE),
            "-w".into(),
            CONTAINER_WORKSPACE.into(),
        ]);

        let mut env = invocation.env.clone();
        env.insert("DEBUG".to_string(), "True".to_string());
        for (key, value) in &env {
            args.extend(["-e".into(), format!("{}={}", key, value)]);
        }

        args.push(self.image.clone());
        args.extend(build_pipeline_command("python", &script, &run_config));
        Ok(args)
    }
}

#[async_trait]
impl ProcessRunner for DockerRunner {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn run(&self, invocation: &Invocation) -> Result<()> {
        if self.use_gpu && !check_nvidia_runtime().await {
            return Err(RunError::Env(
                "GPU requested but the NVIDIA runtime is not available in Docker \
                 (install nvidia-container-toolkit and configure the docker runtime)"
                    .to_string(),
            ));
        }

        let container_name = format!("pipekit-smoke-{}", Uuid::new_v4().simple());
        let args = self.docker_args(invocation, &container_name)?;

        info!(
            "Launching smoke test container {} from image {}",
            container_name, self.image
        );
        stream_command("docker", &args, &invocation.pipeline_dir, &BTreeMap::new()).await
    }
}

/// Checks whether Docker has the NVIDIA runtime registered
pub async fn check_nvidia_runtime() -> bool {
    let output = match Command::new("docker").arg("info").output().await {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            warn!(
                "docker info failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return false;
        }
        Err(e) => {
            warn!("Failed to execute 'docker info'. Is docker installed? {}", e);
            return false;
        }
    };

    has_nvidia_runtime(&String::from_utf8_lossy(&output.stdout))
}

/// Looks for `nvidia` on the `Runtimes:` line of `docker info` output
pub fn has_nvidia_runtime(docker_info: &str) -> bool {
    docker_info
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("Runtimes:"))
        .any(|line| line.contains("nvidia"))
}

fn container_path(pipeline_dir: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(pipeline_dir)
        .map_err(|_| RunError::InvalidPipelineConfig {
            path: path.to_path_buf(),
            message: format!(
                "must be inside the pipeline directory {} to be visible in the container",
                pipeline_dir.display()
            ),
        })?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(format!("{}/{}", CONTAINER_WORKSPACE, parts.join("/")))
}

// =============================================================================
// Command helpers
// =============================================================================

/// Runs a setup command, capturing its output
async fn capture_command(program: &str, args: &[String], cwd: &Path) -> Result<String> {
    debug!("Executing {} {:?} in {}", program, args, cwd.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .await
        .map_err(|source| RunError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !stdout.trim().is_empty() {
        debug!("{} stdout: {}", program, stdout.trim());
    }
    if !stderr.trim().is_empty() {
        debug!("{} stderr: {}", program, stderr.trim());
    }

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        warn!(
            "Command failed: {} {:?} exit_code={} stderr='{}'",
            program,
            args,
            code,
            stderr.trim()
        );
        return Err(RunError::ProcessFailed {
            program: program.to_string(),
            code,
        });
    }

    Ok(stdout)
}

/// Runs a command with inherited stdio and waits for it to exit
pub async fn stream_command(
    program: &str,
    args: &[String],
    cwd: &Path,
    env: &BTreeMap<String, String>,
) -> Result<()> {
    debug!("Executing {} {:?} in {}", program, args, cwd.display());

    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(env)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| RunError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        return Err(RunError::ProcessFailed {
            program: program.to_string(),
            code,
        });
    }

    Ok(())
}
