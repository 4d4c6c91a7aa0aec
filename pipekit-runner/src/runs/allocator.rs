//! Run directory allocation

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, RunError};
use crate::runs::store::RUN_CONFIG_FILE;

pub const RUNS_DIR: &str = "runs";

/// Highest index ever allocated, kept next to the run directories
const LAST_INDEX_FILE: &str = ".last_index";

/// One execution attempt of a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    pub index: u32,
    pub path: PathBuf,
}

impl RunDirectory {
    /// Directory name, e.g. "run3"
    pub fn name(&self) -> String {
        format!("run{}", self.index)
    }

    /// Location of this run's config file
    pub fn config_path(&self) -> PathBuf {
        self.path.join(RUN_CONFIG_FILE)
    }

    pub fn has_config(&self) -> bool {
        self.config_path().is_file()
    }
}

/// Manages the `runs/` folder of a single pipeline
#[derive(Debug, Clone)]
pub struct RunManager {
    runs_dir: PathBuf,
}

impl RunManager {
    /// Creates a manager for `<pipeline_dir>/runs`
    ///
    /// Nothing is created on disk until a run directory is allocated.
    pub fn new(pipeline_dir: &Path) -> Self {
        Self {
            runs_dir: pipeline_dir.join(RUNS_DIR),
        }
    }

    pub fn runs_dir(&self) -> &Path {
        &self.runs_dir
    }

    /// All run directories, ordered by index
    ///
    /// Entries whose name is not `run` followed by a positive integer, and
    /// entries that are not directories, are ignored.
    pub fn run_dirs(&self) -> Result<Vec<RunDirectory>> {
        let entries = match fs::read_dir(&self.runs_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RunError::io(&self.runs_dir, e)),
        };

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RunError::io(&self.runs_dir, e))?;
            let Some(index) = parse_run_index(&entry.file_name().to_string_lossy()) else {
                continue;
            };
            if entry.path().is_dir() {
                runs.push(RunDirectory {
                    index,
                    path: entry.path(),
                });
            }
        }

        runs.sort_by_key(|run| run.index);
        Ok(runs)
    }

    /// Run directory with the highest index, if any
    pub fn latest_run_dir(&self) -> Result<Option<RunDirectory>> {
        Ok(self.run_dirs()?.pop())
    }

    /// Run directory with the given index, if it exists
    pub fn run_dir(&self, index: u32) -> Result<Option<RunDirectory>> {
        Ok(self.run_dirs()?.into_iter().find(|run| run.index == index))
    }

    /// Allocates and creates the next run directory
    ///
    /// The index is one past the highest index either present on disk or
    /// previously allocated, so numbers are not reused after a deletion.
    /// Fails with `RunDirExists` if the target directory appears between
    /// the scan and its creation.
    pub fn next_run_dir(&self) -> Result<RunDirectory> {
        let scanned = self.run_dirs()?.last().map_or(0, |run| run.index);
        let recorded = self.read_last_index();
        let index = scanned
            .max(recorded)
            .checked_add(1)
            .ok_or_else(|| RunError::RunIndexExhausted(self.runs_dir.clone()))?;

        fs::create_dir_all(&self.runs_dir).map_err(|e| RunError::io(&self.runs_dir, e))?;

        let path = self.runs_dir.join(format!("run{}", index));
        match fs::create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(RunError::RunDirExists(path));
            }
            Err(e) => return Err(RunError::io(&path, e)),
        }

        let marker = self.runs_dir.join(LAST_INDEX_FILE);
        fs::write(&marker, index.to_string()).map_err(|e| RunError::io(&marker, e))?;

        debug!("Allocated run directory {}", path.display());
        Ok(RunDirectory { index, path })
    }

    fn read_last_index(&self) -> u32 {
        let marker = self.runs_dir.join(LAST_INDEX_FILE);
        let Ok(content) = fs::read_to_string(&marker) else {
            return 0;
        };
        match content.trim().parse() {
            Ok(index) => index,
            Err(_) => {
                warn!(
                    "Ignoring malformed run index marker {}: '{}'",
                    marker.display(),
                    content.trim()
                );
                0
            }
        }
    }
}

/// Parses `run<N>` into `N`
///
/// `N` must be a positive integer written without leading zeros.
fn parse_run_index(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("run")?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
