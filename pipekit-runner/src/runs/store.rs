//! Run config persistence

use pipekit_core::RunConfig;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, RunError};
use crate::runs::allocator::{RunDirectory, RunManager};

pub const RUN_CONFIG_FILE: &str = "run_config.toml";

/// Loads and parses a run config file
///
/// A parse failure is returned as `MalformedConfig`; there is no fallback to
/// an empty document.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RunError::ConfigFileNotFound(path.to_path_buf()),
        _ => RunError::io(path, e),
    })?;

    toml::from_str(&content).map_err(|source| RunError::MalformedConfig {
        path: path.to_path_buf(),
        source,
    })
}

impl RunManager {
    /// Writes `config` to the run directory, replacing any previous content
    pub fn save_run_config(&self, run_dir: &RunDirectory, config: &RunConfig) -> Result<PathBuf> {
        let path = run_dir.config_path();
        let content = toml::to_string_pretty(config)?;
        fs::write(&path, content).map_err(|e| RunError::io(&path, e))?;

        debug!("Saved run config to {}", path.display());
        Ok(path)
    }

    /// Config file of the highest-indexed run that has one
    pub fn latest_run_config_path(&self) -> Result<Option<PathBuf>> {
        Ok(self
            .run_dirs()?
            .into_iter()
            .rev()
            .find(RunDirectory::has_config)
            .map(|run| run.config_path()))
    }

    /// Loads the config found by [`RunManager::latest_run_config_path`]
    pub fn latest_run_config(&self) -> Result<Option<RunConfig>> {
        self.latest_run_config_path()?
            .map(|path| load_run_config(&path))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipekit_core::{EntityRef, Slot};
    use tempfile::TempDir;

    fn sample_config() -> RunConfig {
        toml::from_str(
            r#"
            [job]
            type = "PRE_ANNOTATION"

            [input.dataset_version]
            id = "ds_1"
            name = "train"

            [parameters]
            threshold = 0.5
            labels = ["cat", "dog"]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_save_then_load_reproduces_config() {
        let dir = TempDir::new().unwrap();
        let manager = RunManager::new(dir.path());
        let run = manager.next_run_dir().unwrap();
        let config = sample_config();

        let path = manager.save_run_config(&run, &config).unwrap();
        assert_eq!(path, dir.path().join("runs/run1/run_config.toml"));
        assert_eq!(load_run_config(&path).unwrap(), config);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let manager = RunManager::new(dir.path());
        let run = manager.next_run_dir().unwrap();

        manager.save_run_config(&run, &sample_config()).unwrap();
        let mut smaller = RunConfig::new();
        smaller.set_input(Slot::Datalake, &EntityRef::with_id("dl_1"));
        manager.save_run_config(&run, &smaller).unwrap();

        assert_eq!(manager.latest_run_config().unwrap(), Some(smaller));
    }

    #[test]
    fn test_latest_config_skips_runs_without_config() {
        let dir = TempDir::new().unwrap();
        let manager = RunManager::new(dir.path());
        for index in [1, 3, 7, 8] {
            fs::create_dir_all(dir.path().join(format!("runs/run{}", index))).unwrap();
        }
        for index in [1, 3, 7] {
            let run = manager.run_dir(index).unwrap().unwrap();
            manager.save_run_config(&run, &sample_config()).unwrap();
        }
        // Make run1 the most recently modified file; ordering must stay numeric.
        let run1 = manager.run_dir(1).unwrap().unwrap();
        manager.save_run_config(&run1, &RunConfig::new()).unwrap();

        assert_eq!(
            manager.latest_run_config_path().unwrap(),
            Some(dir.path().join("runs/run7/run_config.toml"))
        );
        assert_eq!(manager.latest_run_dir().unwrap().unwrap().index, 8);
    }

    #[test]
    fn test_malformed_latest_config_propagates() {
        let dir = TempDir::new().unwrap();
        let manager = RunManager::new(dir.path());
        let run = manager.next_run_dir().unwrap();
        fs::write(run.config_path(), "[input\nid = ").unwrap();

        let err = manager.latest_run_config().unwrap_err();
        assert!(matches!(err, RunError::MalformedConfig { path, .. } if path == run.config_path()));
    }

    #[test]
    fn test_no_config_yet() {
        let dir = TempDir::new().unwrap();
        let manager = RunManager::new(dir.path());
        manager.next_run_dir().unwrap();
        assert_eq!(manager.latest_run_config().unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = load_run_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, RunError::ConfigFileNotFound(_)));
    }
}
