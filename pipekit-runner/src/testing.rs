//! In-memory collaborators for tests

use async_trait::async_trait;
use pipekit_client::{ClientError, Connection, Platform};
use pipekit_core::domain::entity::{Dataset, DatasetVersion, Datalake, Experiment, ModelVersion};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::EnvConfig;
use crate::connector::Connector;
use crate::error::{Result, RunError};
use crate::pipeline::PIPELINE_CONFIG_FILE;
use crate::process::{Invocation, ProcessRunner};
use crate::prompt::{Prompter, parse_confirmation, resolve_input};

/// Writes `<root>/<relative>/config.toml` for a pipeline of type `job_type`
///
/// `extra` is appended verbatim to the generated file.
pub fn write_pipeline(root: &Path, relative: &str, job_type: &str, extra: &str) -> PathBuf {
    let dir = root.join(relative);
    fs::create_dir_all(&dir).unwrap();
    let name = dir.file_name().unwrap().to_string_lossy().into_owned();
    let config = format!(
        "[metadata]\nname = \"{}\"\ntype = \"{}\"\n\n[execution]\npipeline_script = \"pipeline.py\"\nrequirements_file = \"requirements.txt\"\n\n{}",
        name, job_type, extra
    );
    fs::write(dir.join(PIPELINE_CONFIG_FILE), config).unwrap();
    dir
}

// =============================================================================
// Platform
// =============================================================================

pub struct MockPlatform {
    connection: Connection,
    datasets: HashMap<String, Dataset>,
    dataset_versions: Mutex<Vec<DatasetVersion>>,
    model_versions: HashMap<String, ModelVersion>,
    datalakes: HashMap<String, Datalake>,
    experiments: HashMap<String, Experiment>,
    deleted: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            connection: Connection::new("https://platform.test", "org_1"),
            datasets: HashMap::new(),
            dataset_versions: Mutex::new(Vec::new()),
            model_versions: HashMap::new(),
            datalakes: HashMap::new(),
            experiments: HashMap::new(),
            deleted: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_dataset(mut self, id: &str, name: &str) -> Self {
        self.datasets.insert(
            id.to_string(),
            Dataset {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_dataset_version(self, id: &str, origin_id: &str, name: &str, version: &str) -> Self {
        self.add_dataset_version(id, origin_id, name, version);
        self
    }

    /// Adds a dataset version after construction (e.g. from a runner hook)
    pub fn add_dataset_version(&self, id: &str, origin_id: &str, name: &str, version: &str) {
        self.dataset_versions.lock().unwrap().push(DatasetVersion {
            id: id.to_string(),
            origin_id: origin_id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            created_at: None,
        });
    }

    pub fn with_model_version(mut self, id: &str, origin_id: &str, origin_name: &str, name: &str) -> Self {
        self.model_versions.insert(
            id.to_string(),
            ModelVersion {
                id: id.to_string(),
                origin_id: origin_id.to_string(),
                name: name.to_string(),
                origin_name: origin_name.to_string(),
            },
        );
        self
    }

    pub fn with_datalake(mut self, id: &str, name: &str) -> Self {
        self.datalakes.insert(
            id.to_string(),
            Datalake {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_experiment(mut self, id: &str, name: &str, project_name: Option<&str>) -> Self {
        self.experiments.insert(
            id.to_string(),
            Experiment {
                id: id.to_string(),
                name: name.to_string(),
                project_name: project_name.map(str::to_string),
            },
        );
        self
    }

    /// Ids passed to `delete_dataset_version`
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Number of platform calls made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn found<T: Clone>(entity: Option<&T>, what: &str, id: &str) -> pipekit_client::Result<T> {
    entity
        .cloned()
        .ok_or_else(|| ClientError::NotFound(format!("{} {}", what, id)))
}

#[async_trait]
impl Platform for MockPlatform {
    fn connection(&self) -> &Connection {
        &self.connection
    }

    async fn get_dataset(&self, dataset_id: &str) -> pipekit_client::Result<Dataset> {
        self.record_call();
        found(self.datasets.get(dataset_id), "dataset", dataset_id)
    }

    async fn get_dataset_version(&self, version_id: &str) -> pipekit_client::Result<DatasetVersion> {
        self.record_call();
        let versions = self.dataset_versions.lock().unwrap();
        found(
            versions.iter().find(|v| v.id == version_id),
            "dataset version",
            version_id,
        )
    }

    async fn find_dataset_version(
        &self,
        dataset_id: &str,
        version: &str,
    ) -> pipekit_client::Result<DatasetVersion> {
        self.record_call();
        let versions = self.dataset_versions.lock().unwrap();
        found(
            versions
                .iter()
                .find(|v| v.origin_id == dataset_id && v.version == version),
            "dataset version",
            version,
        )
    }

    async fn delete_dataset_version(&self, version_id: &str) -> pipekit_client::Result<()> {
        self.record_call();
        let mut versions = self.dataset_versions.lock().unwrap();
        let before = versions.len();
        versions.retain(|v| v.id != version_id);
        if versions.len() == before {
            return Err(ClientError::NotFound(format!("dataset version {}", version_id)));
        }
        self.deleted.lock().unwrap().push(version_id.to_string());
        Ok(())
    }

    async fn get_model_version(&self, version_id: &str) -> pipekit_client::Result<ModelVersion> {
        self.record_call();
        found(self.model_versions.get(version_id), "model version", version_id)
    }

    async fn get_datalake(&self, datalake_id: &str) -> pipekit_client::Result<Datalake> {
        self.record_call();
        found(self.datalakes.get(datalake_id), "datalake", datalake_id)
    }

    async fn get_experiment(&self, experiment_id: &str) -> pipekit_client::Result<Experiment> {
        self.record_call();
        found(self.experiments.get(experiment_id), "experiment", experiment_id)
    }
}

/// Hands out a fixed platform and remembers the environment it was asked for
pub struct StaticConnector {
    platform: Arc<MockPlatform>,
    connected: Mutex<Option<EnvConfig>>,
}

impl StaticConnector {
    pub fn new(platform: Arc<MockPlatform>) -> Self {
        Self {
            platform,
            connected: Mutex::new(None),
        }
    }

    pub fn connected_with(&self) -> Option<EnvConfig> {
        self.connected.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for StaticConnector {
    async fn connect(&self, env: &EnvConfig) -> Result<Arc<dyn Platform>> {
        *self.connected.lock().unwrap() = Some(env.clone());
        Ok(self.platform.clone())
    }
}

// =============================================================================
// Prompts
// =============================================================================

/// Answers questions from a fixed queue
///
/// An empty answer selects the question's default. Running out of answers
/// is an error.
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Labels of the questions asked so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    fn next(&mut self, label: &str) -> Result<String> {
        self.asked.push(label.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| RunError::Prompt(format!("no scripted answer for '{}'", label)))
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next(label)?;
        Ok(resolve_input(&answer, default))
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        let answer = self.next(label)?;
        parse_confirmation(&answer, default)
            .ok_or_else(|| RunError::Prompt(format!("'{}' is not a yes/no answer", answer)))
    }
}

// =============================================================================
// Process runner
// =============================================================================

type RunHook = Box<dyn Fn(&Invocation) + Send + Sync>;

/// Records invocations instead of launching processes
pub struct RecordingRunner {
    invocations: Mutex<Vec<Invocation>>,
    exit_code: Option<i32>,
    hook: Option<RunHook>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
            exit_code: None,
            hook: None,
        }
    }

    /// A runner whose process exits with `code`
    pub fn failing(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::new()
        }
    }

    /// Runs `hook` on every invocation, standing in for the process' side effects
    pub fn on_run(mut self, hook: impl Fn(&Invocation) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn run(&self, invocation: &Invocation) -> Result<()> {
        self.invocations.lock().unwrap().push(invocation.clone());
        if let Some(hook) = &self.hook {
            hook(invocation);
        }
        match self.exit_code {
            Some(code) => Err(RunError::ProcessFailed {
                program: "pipeline".to_string(),
                code,
            }),
            None => Ok(()),
        }
    }
}
