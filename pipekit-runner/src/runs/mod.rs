//! Run directories and the run configs stored in them
//!
//! Layout: `<pipeline_dir>/runs/run<N>/run_config.toml`, where `N` is a
//! positive integer without leading zeros that only ever grows.

mod allocator;
mod store;

pub use allocator::{RUNS_DIR, RunDirectory, RunManager};
pub use store::{RUN_CONFIG_FILE, load_run_config};
