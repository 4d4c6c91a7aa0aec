//! Test run orchestration
//!
//! Sequences one local test invocation of a pipeline:
//!
//! 1. choose the run directory (reuse the latest, or allocate a new one)
//! 2. choose the run config (explicit file, latest config, or prompts)
//! 3. resolve auth host and organization, connect to the platform
//! 4. merge the pipeline's default parameters
//! 5. check the output name (dataset-creation jobs) and enrich inputs
//! 6. persist, execute, enrich outputs, persist again
//!
//! A failed execution returns immediately; the config on disk then holds the
//! pre-execution state.

use chrono::Utc;
use pipekit_core::{Direction, EntityRef, JobType, RunConfig, Slot};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::EnvConfig;
use crate::connector::Connector;
use crate::error::{Result, RunError};
use crate::pipeline::PipelineConfig;
use crate::process::{Invocation, ProcessRunner};
use crate::prompt::Prompter;
use crate::runs::{RunDirectory, RunManager, load_run_config};
use crate::service::collect::strategy_for;
use crate::service::enrich::{enrich_output_metadata_after_run, enrich_run_config_with_metadata};
use crate::service::merge::merge_with_default_parameters;
use crate::service::outputs::check_output_dataset_version;

/// Options of a test invocation
#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    /// Write into the latest run directory instead of allocating a new one
    pub reuse_dir: bool,
    /// Use this run config instead of the stored or prompted one
    pub config_file: Option<PathBuf>,
    /// Delete conflicting output resources without asking
    pub override_outputs: bool,
}

/// Result of a completed test invocation
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_dir: RunDirectory,
    pub config: RunConfig,
}

/// Drives a test invocation against its collaborators
pub struct Orchestrator<'a> {
    pipeline: &'a PipelineConfig,
    env: &'a EnvConfig,
    connector: &'a dyn Connector,
    runner: &'a dyn ProcessRunner,
    prompter: &'a mut dyn Prompter,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        pipeline: &'a PipelineConfig,
        env: &'a EnvConfig,
        connector: &'a dyn Connector,
        runner: &'a dyn ProcessRunner,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            pipeline,
            env,
            connector,
            runner,
            prompter,
        }
    }

    /// Runs one test invocation
    pub async fn run(&mut self, options: &TestOptions) -> Result<RunOutcome> {
        // Configuration problems surface before runs/ is touched.
        let job_type = self.pipeline.job_type()?;
        let script = self.pipeline.script_path("pipeline_script")?;
        if let Some(path) = &options.config_file {
            if !path.is_file() {
                return Err(RunError::ConfigFileNotFound(path.clone()));
            }
        }

        let manager = RunManager::new(self.pipeline.dir());
        let run_dir = self.choose_dir(&manager, options)?;
        info!(
            "Testing pipeline '{}' ({}) in {}",
            self.pipeline.name(),
            job_type,
            run_dir.path.display()
        );

        let mut config = self.choose_config(&manager, options, job_type)?;
        if config.job_type().is_none() {
            config.set_job_type(job_type);
        }
        config.set_working_dir(&run_dir.path);
        config.set_started_at(Utc::now());

        let env = self.resolve_env(&mut config);
        let platform = self.connector.connect(&env).await?;

        let defaults = self.pipeline.extract_default_parameters();
        merge_with_default_parameters(&mut config, &defaults, job_type.parameters_key());

        if job_type == JobType::DatasetVersionCreation {
            self.check_output_name(platform.as_ref(), &mut config, options.override_outputs)
                .await?;
        }
        enrich_run_config_with_metadata(platform.as_ref(), &mut config).await;

        let run_config_path = manager.save_run_config(&run_dir, &config)?;

        let invocation = Invocation {
            pipeline_dir: self.pipeline.dir().to_path_buf(),
            script,
            requirements: self.pipeline.requirements_path(),
            run_config_path,
            working_dir: run_dir.path.clone(),
            env: process_env(&env, &config),
        };
        info!("Executing {} with the {} runner", run_dir.name(), self.runner.name());
        self.runner.run(&invocation).await?;

        if job_type.produces_named_output() {
            enrich_output_metadata_after_run(platform.as_ref(), &mut config).await;
        }
        manager.save_run_config(&run_dir, &config)?;

        Ok(RunOutcome { run_dir, config })
    }

    fn choose_dir(&self, manager: &RunManager, options: &TestOptions) -> Result<RunDirectory> {
        if options.reuse_dir {
            if let Some(latest) = manager.latest_run_dir()? {
                debug!("Reusing run directory {}", latest.name());
                return Ok(latest);
            }
            debug!("No run directory to reuse, allocating a new one");
        }
        manager.next_run_dir()
    }

    fn choose_config(
        &mut self,
        manager: &RunManager,
        options: &TestOptions,
        job_type: JobType,
    ) -> Result<RunConfig> {
        if let Some(path) = &options.config_file {
            info!("Using run config {}", path.display());
            return load_run_config(path);
        }

        let stored = manager.latest_run_config()?;
        let strategy = strategy_for(job_type, self.pipeline.name());

        match stored {
            Some(stored) if options.reuse_dir => {
                let summary = summarize(&stored);
                if self
                    .prompter
                    .confirm(&format!("Reuse previous config? {}", summary), true)?
                {
                    return Ok(stored);
                }
                strategy.collect(&stored, &mut *self.prompter)
            }
            Some(stored) => strategy.collect(&stored, &mut *self.prompter),
            None => strategy.collect(&RunConfig::new(), &mut *self.prompter),
        }
    }

    /// Fills `auth` from the environment and returns the effective environment
    ///
    /// A host already pinned in the config wins over the invocation's host.
    fn resolve_env(&self, config: &mut RunConfig) -> EnvConfig {
        let mut env = match config.auth_host() {
            Some(host) => self.env.with_host(host),
            None => {
                config.set_auth_host(self.env.host.clone());
                self.env.clone()
            }
        };

        match config.organization_name() {
            Some(organization) => env.organization_name = organization.to_string(),
            None => config.set_organization_name(env.organization_name.clone()),
        }

        env
    }

    /// Settles the output dataset version name before the first persist
    ///
    /// Platform fields left over from an earlier run describe a version that
    /// this run has not created yet, so only the chosen name (and any other
    /// hand-written keys) remain in the slot.
    async fn check_output_name(
        &mut self,
        platform: &dyn pipekit_client::Platform,
        config: &mut RunConfig,
        override_outputs: bool,
    ) -> Result<()> {
        let Some(name) = config
            .output(Slot::DatasetVersion)
            .and_then(|output| output.name().map(str::to_string))
        else {
            return Ok(());
        };
        config.remove_reference_fields(
            Direction::Output,
            Slot::DatasetVersion,
            &EntityRef::RESOLVED_FIELDS,
        );

        let Some(input_id) = config.input_id(Slot::DatasetVersion) else {
            return Ok(());
        };
        let chosen =
            check_output_dataset_version(platform, &mut *self.prompter, &input_id, &name, override_outputs)
                .await?;
        if chosen != name {
            config.merge_reference(
                Direction::Output,
                Slot::DatasetVersion,
                &EntityRef::with_name(chosen),
            );
        }
        Ok(())
    }
}

/// Environment of the pipeline process
fn process_env(env: &EnvConfig, config: &RunConfig) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::from([
        ("api_token".to_string(), env.api_token.clone()),
        ("organization_name".to_string(), env.organization_name.clone()),
        ("host".to_string(), env.host.clone()),
    ]);
    if let Some(experiment_id) = config
        .output(Slot::Experiment)
        .and_then(|r| r.id().map(str::to_string))
    {
        vars.insert("experiment_id".to_string(), experiment_id);
    }
    vars
}

/// One-line `section=value` summary of a config's inputs and outputs
fn summarize(config: &RunConfig) -> String {
    config
        .io_summary()
        .iter()
        .filter_map(|(direction, refs)| {
            let refs = refs.as_table()?;
            let items: Vec<String> = refs
                .iter()
                .filter_map(|(slot, value)| {
                    let reference = EntityRef::from_table(value.as_table()?);
                    let label = reference.name().or(reference.id())?.to_string();
                    Some(format!("{}.{}={}", direction, slot, label))
                })
                .collect();
            (!items.is_empty()).then(|| items.join(" / "))
        })
        .collect::<Vec<_>>()
        .join(" / ")
}
