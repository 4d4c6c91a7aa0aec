//! Static pipeline configuration
//!
//! Every pipeline directory carries a `config.toml` describing the pipeline:
//!
//! ```toml
//! [metadata]
//! name = "resize"
//! type = "DATASET_VERSION_CREATION"
//!
//! [execution]
//! pipeline_script = "pipeline.py"
//! requirements_file = "requirements.txt"
//!
//! [docker]
//! image_name = "acme/resize"
//! image_tag = "1.0"
//!
//! [parameters]
//! size = 640
//! ```
//!
//! This file is read-only from the run lifecycle's point of view.

use pipekit_core::JobType;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, RunError};

pub const PIPELINE_CONFIG_FILE: &str = "config.toml";

/// Directories never descended into while searching for a pipeline
const SKIPPED_DIRS: [&str; 4] = ["runs", "node_modules", "target", "__pycache__"];

/// A pipeline's static configuration and location
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    name: String,
    dir: PathBuf,
    config: Table,
}

impl PipelineConfig {
    /// Locates a pipeline by directory name under `search_path` and loads it
    ///
    /// The first directory (in file name order) named `name` that contains a
    /// `config.toml` wins.
    ///
    /// # Arguments
    /// * `name` - The pipeline (directory) name
    /// * `search_path` - Root of the search, usually the current directory
    pub fn find(name: &str, search_path: &Path) -> Result<Self> {
        let walker = WalkDir::new(search_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && !SKIPPED_DIRS.iter().any(|skipped| *skipped == file_name)
            });

        for entry in walker.filter_map(|e| e.ok()) {
            if entry.file_type().is_dir()
                && entry.file_name().to_string_lossy() == name
                && entry.path().join(PIPELINE_CONFIG_FILE).is_file()
            {
                debug!("Found pipeline '{}' at {}", name, entry.path().display());
                return Self::load(entry.path());
            }
        }

        Err(RunError::PipelineNotFound {
            name: name.to_string(),
            search_path: search_path.to_path_buf(),
        })
    }

    /// Loads the pipeline located at `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(PIPELINE_CONFIG_FILE);
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !config_path.is_file() {
            return Err(RunError::PipelineNotFound {
                name,
                search_path: dir.to_path_buf(),
            });
        }

        let content =
            fs::read_to_string(&config_path).map_err(|e| RunError::io(&config_path, e))?;
        let config: Table = toml::from_str(&content).map_err(|source| RunError::MalformedConfig {
            path: config_path.clone(),
            source,
        })?;

        Ok(Self {
            name,
            dir: dir.to_path_buf(),
            config,
        })
    }

    /// Pipeline name: `metadata.name`, or the directory name
    pub fn name(&self) -> &str {
        self.get_str("metadata", "name").unwrap_or(&self.name)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(PIPELINE_CONFIG_FILE)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.config.get(section)?.as_table()?.get(key)
    }

    pub fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key)?.as_str().filter(|s| !s.trim().is_empty())
    }

    /// Pipeline type from `metadata.type`
    pub fn job_type(&self) -> Result<JobType> {
        let raw = self
            .get_str("metadata", "type")
            .ok_or_else(|| self.invalid("missing metadata.type"))?;
        raw.parse().map_err(|e| self.invalid(format!("{}", e)))
    }

    /// Absolute path of a script declared in the `[execution]` section
    ///
    /// # Arguments
    /// * `key` - Key in `[execution]`, e.g. "pipeline_script"
    pub fn script_path(&self, key: &str) -> Result<PathBuf> {
        self.get_str("execution", key)
            .map(|script| self.dir.join(script))
            .ok_or_else(|| self.invalid(format!("missing execution.{}", key)))
    }

    /// Path of the requirements file, if one is declared
    pub fn requirements_path(&self) -> Option<PathBuf> {
        self.get_str("execution", "requirements_file")
            .map(|file| self.dir.join(file))
    }

    /// Docker image reference `name:tag` (tag defaults to "latest")
    pub fn docker_image(&self) -> Option<String> {
        let name = self.get_str("docker", "image_name")?;
        let tag = self.get_str("docker", "image_tag").unwrap_or("latest");
        Some(format!("{}:{}", name, tag))
    }

    /// The pipeline's declared default parameters
    ///
    /// Read from `[parameters]`, falling back to `[hyperparameters]`; empty
    /// when neither is declared.
    pub fn extract_default_parameters(&self) -> Table {
        ["parameters", "hyperparameters"]
            .into_iter()
            .find_map(|section| self.config.get(section).and_then(Value::as_table))
            .cloned()
            .unwrap_or_default()
    }

    fn invalid(&self, message: impl Into<String>) -> RunError {
        RunError::InvalidPipelineConfig {
            path: self.config_path(),
            message: message.into(),
        }
    }
}
