//! Default parameter merging

use pipekit_core::RunConfig;
use toml::{Table, Value};
use tracing::warn;

/// Layers a run's parameters over the pipeline defaults
///
/// The result under `run_config[parameters_key]` is the key union of both
/// maps, with run values winning on conflict. `default_parameters` is only
/// read. Values are copied as-is; no type checks are made.
///
/// # Returns
/// The same `run_config`, for chaining
pub fn merge_with_default_parameters<'a>(
    run_config: &'a mut RunConfig,
    default_parameters: &Table,
    parameters_key: &str,
) -> &'a mut RunConfig {
    let mut merged = default_parameters.clone();

    match run_config.as_table().get(parameters_key) {
        Some(Value::Table(overrides)) => {
            for (key, value) in overrides {
                merged.insert(key.clone(), value.clone());
            }
        }
        Some(other) => warn!(
            "Run config '{}' is a {}, not a table; replacing it with the defaults",
            parameters_key,
            other.type_str()
        ),
        None => {}
    }

    run_config
        .as_table_mut()
        .insert(parameters_key.to_string(), Value::Table(merged));
    run_config
}
