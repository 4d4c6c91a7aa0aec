//! Service layer
//!
//! The steps of a test invocation. Each step is usable on its own; the
//! orchestrator sequences them.

pub mod collect;
pub mod enrich;
pub mod merge;
pub mod orchestrator;
pub mod outputs;

pub use collect::{CollectStrategy, strategy_for};
pub use enrich::{enrich_output_metadata_after_run, enrich_run_config_with_metadata};
pub use merge::merge_with_default_parameters;
pub use orchestrator::{Orchestrator, RunOutcome, TestOptions};
pub use outputs::check_output_dataset_version;
