//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::reference::Slot;

/// Kind of work a pipeline performs on the platform
///
/// Read once from the pipeline's static configuration (`metadata.type`) or a
/// run config (`job.type`); every type-specific behavior (prompts, parameter
/// section, output enrichment) dispatches on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    DatasetVersionCreation,
    PreAnnotation,
    DataAutoTagging,
    ModelConversion,
    ModelCompression,
    Training,
}

impl JobType {
    pub const ALL: [JobType; 6] = [
        JobType::DatasetVersionCreation,
        JobType::PreAnnotation,
        JobType::DataAutoTagging,
        JobType::ModelConversion,
        JobType::ModelCompression,
        JobType::Training,
    ];

    /// Wire name, as written in `config.toml` and `run_config.toml`
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::DatasetVersionCreation => "DATASET_VERSION_CREATION",
            JobType::PreAnnotation => "PRE_ANNOTATION",
            JobType::DataAutoTagging => "DATA_AUTO_TAGGING",
            JobType::ModelConversion => "MODEL_CONVERSION",
            JobType::ModelCompression => "MODEL_COMPRESSION",
            JobType::Training => "TRAINING",
        }
    }

    /// Run config section holding the pipeline parameters
    pub fn parameters_key(&self) -> &'static str {
        match self {
            JobType::Training => "hyperparameters",
            _ => "parameters",
        }
    }

    /// Input slots this job type may reference
    pub fn input_slots(&self) -> &'static [Slot] {
        match self {
            JobType::DatasetVersionCreation => &[Slot::DatasetVersion],
            JobType::PreAnnotation => &[Slot::DatasetVersion, Slot::ModelVersion],
            JobType::DataAutoTagging => &[Slot::Datalake, Slot::ModelVersion],
            JobType::ModelConversion | JobType::ModelCompression => &[Slot::ModelVersion],
            JobType::Training => &[
                Slot::TrainDatasetVersion,
                Slot::TestDatasetVersion,
                Slot::ValidationDatasetVersion,
                Slot::ModelVersion,
                Slot::Experiment,
            ],
        }
    }

    /// Whether the job creates a named platform resource that only exists
    /// once the process has completed
    pub fn produces_named_output(&self) -> bool {
        matches!(self, JobType::DatasetVersionCreation)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown job type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownJobType(pub String);

impl fmt::Display for UnknownJobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pipeline type '{}'", self.0)
    }
}

impl std::error::Error for UnknownJobType {}

impl FromStr for JobType {
    type Err = UnknownJobType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        JobType::ALL
            .into_iter()
            .find(|job| job.as_str() == normalized)
            .ok_or_else(|| UnknownJobType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_type() {
        assert_eq!(
            "DATASET_VERSION_CREATION".parse::<JobType>().unwrap(),
            JobType::DatasetVersionCreation
        );
        assert_eq!("training".parse::<JobType>().unwrap(), JobType::Training);
        assert!("SOMETHING_ELSE".parse::<JobType>().is_err());
    }

    #[test]
    fn test_parameters_key() {
        assert_eq!(JobType::Training.parameters_key(), "hyperparameters");
        assert_eq!(JobType::PreAnnotation.parameters_key(), "parameters");
    }

    #[test]
    fn test_only_dataset_creation_produces_named_output() {
        let producing: Vec<_> = JobType::ALL
            .into_iter()
            .filter(|job| job.produces_named_output())
            .collect();
        assert_eq!(producing, vec![JobType::DatasetVersionCreation]);
    }
}
