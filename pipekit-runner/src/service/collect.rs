//! Interactive construction of a run config
//!
//! One strategy per job type, chosen once from the pipeline's type. Every
//! question offers the value from a previously stored config as its default,
//! and the returned config always carries `job.type`.

use pipekit_core::{EntityRef, JobType, RunConfig, Slot};
use toml::Value;
use tracing::warn;

use crate::error::Result;
use crate::prompt::Prompter;

/// Builds a run config by asking the user
pub trait CollectStrategy: Send + Sync {
    /// # Arguments
    /// * `stored` - Previous config whose values are offered as defaults
    /// * `prompter` - Where the answers come from
    fn collect(&self, stored: &RunConfig, prompter: &mut dyn Prompter) -> Result<RunConfig>;
}

/// Returns the strategy for a job type
pub fn strategy_for(job_type: JobType, pipeline_name: &str) -> Box<dyn CollectStrategy> {
    match job_type {
        JobType::DatasetVersionCreation => Box::new(DatasetVersionCreationPrompts {
            pipeline_name: pipeline_name.to_string(),
        }),
        JobType::PreAnnotation => Box::new(PreAnnotationPrompts),
        JobType::DataAutoTagging => Box::new(DataAutoTaggingPrompts),
        JobType::ModelConversion | JobType::ModelCompression => {
            Box::new(ModelVersionPrompts { job_type })
        }
        JobType::Training => Box::new(TrainingPrompts),
    }
}

// =============================================================================
// Strategies
// =============================================================================

struct DatasetVersionCreationPrompts {
    pipeline_name: String,
}

impl CollectStrategy for DatasetVersionCreationPrompts {
    fn collect(&self, stored: &RunConfig, prompter: &mut dyn Prompter) -> Result<RunConfig> {
        let mut config = seed(stored, JobType::DatasetVersionCreation);

        let input_id = ask_input_id(prompter, stored, Slot::DatasetVersion, "Input dataset version ID")?;
        config.set_input(Slot::DatasetVersion, &EntityRef::with_id(input_id));

        let default_name = stored
            .output(Slot::DatasetVersion)
            .and_then(|r| r.name().map(str::to_string))
            .unwrap_or_else(|| format!("processed_{}", self.pipeline_name));
        let output_name = prompter.input("Output dataset version name", Some(&default_name))?;
        config.set_output(Slot::DatasetVersion, &EntityRef::with_name(output_name));

        Ok(config)
    }
}

struct PreAnnotationPrompts;

impl CollectStrategy for PreAnnotationPrompts {
    fn collect(&self, stored: &RunConfig, prompter: &mut dyn Prompter) -> Result<RunConfig> {
        let mut config = seed(stored, JobType::PreAnnotation);

        let dataset_id = ask_input_id(prompter, stored, Slot::DatasetVersion, "Input dataset version ID")?;
        let model_id = ask_input_id(prompter, stored, Slot::ModelVersion, "Model version ID")?;
        config.set_input(Slot::DatasetVersion, &EntityRef::with_id(dataset_id));
        config.set_input(Slot::ModelVersion, &EntityRef::with_id(model_id));

        Ok(config)
    }
}

struct DataAutoTaggingPrompts;

impl CollectStrategy for DataAutoTaggingPrompts {
    fn collect(&self, stored: &RunConfig, prompter: &mut dyn Prompter) -> Result<RunConfig> {
        let mut config = seed(stored, JobType::DataAutoTagging);

        let datalake_id = ask_input_id(prompter, stored, Slot::Datalake, "Input datalake ID")?;
        let model_id = ask_input_id(prompter, stored, Slot::ModelVersion, "Model version ID")?;
        let stored_output = stored
            .output(Slot::Datalake)
            .and_then(|r| r.id().map(str::to_string));
        let output_id = prompter.input("Output datalake ID", stored_output.as_deref())?;

        config.set_input(Slot::Datalake, &EntityRef::with_id(datalake_id));
        config.set_input(Slot::ModelVersion, &EntityRef::with_id(model_id));
        config.set_output(Slot::Datalake, &EntityRef::with_id(output_id));

        let tags = prompter.input(
            "Tags to use (comma-separated)",
            stored.get_str("parameters", "tags_list"),
        )?;
        config.set_str("parameters", "tags_list", tags);

        let offset = ask_integer(prompter, stored, "Offset", "offset", 0)?;
        let limit = ask_integer(prompter, stored, "Limit", "limit", 100)?;
        let run_parameters = config.section_mut("run_parameters");
        run_parameters.insert("offset".to_string(), Value::Integer(offset));
        run_parameters.insert("limit".to_string(), Value::Integer(limit));

        Ok(config)
    }
}

struct ModelVersionPrompts {
    job_type: JobType,
}

impl CollectStrategy for ModelVersionPrompts {
    fn collect(&self, stored: &RunConfig, prompter: &mut dyn Prompter) -> Result<RunConfig> {
        let mut config = seed(stored, self.job_type);

        let model_id = ask_input_id(prompter, stored, Slot::ModelVersion, "Model version ID")?;
        config.set_input(Slot::ModelVersion, &EntityRef::with_id(model_id));

        Ok(config)
    }
}

struct TrainingPrompts;

impl CollectStrategy for TrainingPrompts {
    fn collect(&self, stored: &RunConfig, prompter: &mut dyn Prompter) -> Result<RunConfig> {
        let mut config = seed(stored, JobType::Training);

        let stored_experiment = stored
            .output(Slot::Experiment)
            .or_else(|| stored.input(Slot::Experiment))
            .and_then(|r| r.id().map(str::to_string));
        let experiment_id = prompter.input("Experiment ID", stored_experiment.as_deref())?;
        config.set_output(Slot::Experiment, &EntityRef::with_id(experiment_id));

        let train_id = ask_input_id(prompter, stored, Slot::TrainDatasetVersion, "Train dataset version ID")?;
        config.set_input(Slot::TrainDatasetVersion, &EntityRef::with_id(train_id));

        let optional = [
            (Slot::TestDatasetVersion, "Test dataset version ID (optional)"),
            (Slot::ValidationDatasetVersion, "Validation dataset version ID (optional)"),
            (Slot::ModelVersion, "Base model version ID (optional)"),
        ];
        for (slot, label) in optional {
            let id = ask_input_id(prompter, stored, slot, label)?;
            if !id.is_empty() {
                config.set_input(slot, &EntityRef::with_id(id));
            }
        }

        Ok(config)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Starting point of a collected config
///
/// Keeps the stored `auth` and parameter sections so re-collecting does not
/// discard them, and sets `job.type`.
fn seed(stored: &RunConfig, job_type: JobType) -> RunConfig {
    let mut config = RunConfig::new();
    for key in ["auth", job_type.parameters_key()] {
        if let Some(section) = stored.section(key) {
            config
                .as_table_mut()
                .insert(key.to_string(), Value::Table(section.clone()));
        }
    }
    config.set_job_type(job_type);
    config
}

fn ask_input_id(
    prompter: &mut dyn Prompter,
    stored: &RunConfig,
    slot: Slot,
    label: &str,
) -> Result<String> {
    let default = stored.input_id(slot);
    prompter.input(label, default.as_deref())
}

fn ask_integer(
    prompter: &mut dyn Prompter,
    stored: &RunConfig,
    label: &str,
    key: &str,
    fallback: i64,
) -> Result<i64> {
    let default = stored
        .section("run_parameters")
        .and_then(|section| section.get(key))
        .and_then(|value| match value {
            Value::Integer(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(fallback)
        .to_string();

    loop {
        let answer = prompter.input(label, Some(&default))?;
        match answer.trim().parse() {
            Ok(value) => return Ok(value),
            Err(_) => warn!("'{}' is not an integer", answer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPrompter;

    fn collect(job_type: JobType, stored: &RunConfig, answers: &[&str]) -> RunConfig {
        let mut prompter = ScriptedPrompter::new(answers.iter().copied());
        strategy_for(job_type, "resize")
            .collect(stored, &mut prompter)
            .unwrap()
    }

    #[test]
    fn test_dataset_version_creation() {
        let config = collect(JobType::DatasetVersionCreation, &RunConfig::new(), &["ds_1", ""]);

        assert_eq!(config.job_type(), Some(JobType::DatasetVersionCreation));
        assert_eq!(config.input_id(Slot::DatasetVersion).as_deref(), Some("ds_1"));
        assert_eq!(
            config.output(Slot::DatasetVersion).unwrap().name(),
            Some("processed_resize")
        );
    }

    #[test]
    fn test_stored_values_are_defaults() {
        let stored: RunConfig = toml::from_str(
            r#"
            [auth]
            host = "https://staging.picsellia.com"

            [input.dataset_version]
            id = "ds_old"
            name = "train"

            [input.model_version]
            id = "mv_old"

            [parameters]
            threshold = 0.4
            "#,
        )
        .unwrap();

        let config = collect(JobType::PreAnnotation, &stored, &["", "mv_new"]);

        assert_eq!(config.input(Slot::DatasetVersion).unwrap(), EntityRef::with_id("ds_old"));
        assert_eq!(config.input_id(Slot::ModelVersion).as_deref(), Some("mv_new"));
        assert_eq!(config.auth_host(), Some("https://staging.picsellia.com"));
        assert!(config.parameters("parameters").unwrap().contains_key("threshold"));
    }

    #[test]
    fn test_data_auto_tagging() {
        let config = collect(
            JobType::DataAutoTagging,
            &RunConfig::new(),
            &["dl_in", "mv_1", "dl_out", "cat,dog", "", "abc", "50"],
        );

        assert_eq!(config.input_id(Slot::Datalake).as_deref(), Some("dl_in"));
        assert_eq!(config.output(Slot::Datalake).unwrap().id(), Some("dl_out"));
        assert_eq!(config.get_str("parameters", "tags_list"), Some("cat,dog"));
        let run_parameters = config.section("run_parameters").unwrap();
        assert_eq!(run_parameters["offset"].as_integer(), Some(0));
        assert_eq!(run_parameters["limit"].as_integer(), Some(50));
    }

    #[test]
    fn test_model_conversion_keeps_its_type() {
        let config = collect(JobType::ModelCompression, &RunConfig::new(), &["mv_1"]);
        assert_eq!(config.job_type(), Some(JobType::ModelCompression));
        assert_eq!(config.input_id(Slot::ModelVersion).as_deref(), Some("mv_1"));
    }

    #[test]
    fn test_training_optional_slots() {
        let config = collect(
            JobType::Training,
            &RunConfig::new(),
            &["exp_1", "ds_train", "", "ds_val", ""],
        );

        assert_eq!(config.output(Slot::Experiment).unwrap().id(), Some("exp_1"));
        assert_eq!(config.input_id(Slot::TrainDatasetVersion).as_deref(), Some("ds_train"));
        assert_eq!(config.input(Slot::TestDatasetVersion), None);
        assert_eq!(config.input_id(Slot::ValidationDatasetVersion).as_deref(), Some("ds_val"));
        assert_eq!(config.input(Slot::ModelVersion), None);
    }
}
