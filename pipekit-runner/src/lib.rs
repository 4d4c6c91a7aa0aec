//! Pipekit Runner
//!
//! The run-configuration lifecycle for local pipeline tests:
//!
//! - `runs`: numbered run directories and the `run_config.toml` stored in each
//! - `service`: parameter merging, platform enrichment, interactive collection
//!   and the orchestrator that sequences a whole test invocation
//! - `process`: the external process runners (virtual env, Docker smoke test)
//! - `pipeline` / `config`: static pipeline configuration and environment

pub mod config;
pub mod connector;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod prompt;
pub mod runs;
pub mod service;

#[cfg(test)]
mod testing;

pub use error::{Result, RunError};
