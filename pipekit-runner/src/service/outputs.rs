//! Output name conflict check for dataset-creation runs

use pipekit_client::{ClientError, Platform};
use pipekit_core::domain::entity::DatasetVersion;
use tracing::{info, warn};

use crate::error::Result;
use crate::prompt::Prompter;

/// Makes sure the output dataset version name is free before a run
///
/// When a version named `output_name` already exists on the input's parent
/// dataset it is deleted if `override_outputs` is set. Otherwise the user
/// picks between deleting it and choosing another name.
///
/// Lookup failures keep `output_name` and only log a warning. A failed
/// deletion is returned as an error.
///
/// # Returns
/// The output name to use for the run
pub async fn check_output_dataset_version(
    platform: &dyn Platform,
    prompter: &mut dyn Prompter,
    input_version_id: &str,
    output_name: &str,
    override_outputs: bool,
) -> Result<String> {
    let existing = match find_existing(platform, input_version_id, output_name).await {
        Ok(Some(existing)) => existing,
        Ok(None) => return Ok(output_name.to_string()),
        Err(e) => {
            warn!(
                "Could not check whether dataset version '{}' already exists: {}",
                output_name, e
            );
            return Ok(output_name.to_string());
        }
    };

    let overwrite = override_outputs
        || prompter.confirm(
            &format!(
                "A dataset version named '{}' already exists. Overwrite?",
                output_name
            ),
            false,
        )?;

    if overwrite {
        info!(
            "Deleting existing dataset version '{}' ({})",
            output_name, existing.id
        );
        platform.delete_dataset_version(&existing.id).await?;
        return Ok(output_name.to_string());
    }

    prompter.input(
        "Enter a new output dataset version name",
        Some(&format!("{}_new", output_name)),
    )
}

async fn find_existing(
    platform: &dyn Platform,
    input_version_id: &str,
    output_name: &str,
) -> std::result::Result<Option<DatasetVersion>, ClientError> {
    let input = platform.get_dataset_version(input_version_id).await?;
    match platform
        .find_dataset_version(&input.origin_id, output_name)
        .await
    {
        Ok(existing) => Ok(Some(existing)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlatform, ScriptedPrompter};

    fn platform() -> MockPlatform {
        MockPlatform::new()
            .with_dataset("d1", "cats")
            .with_dataset_version("ds_1", "d1", "cats", "train")
            .with_dataset_version("ds_2", "d1", "cats", "processed")
    }

    #[tokio::test]
    async fn test_free_name_is_kept() {
        let platform = platform();
        let mut prompter = ScriptedPrompter::new(Vec::<&str>::new());

        let name = check_output_dataset_version(&platform, &mut prompter, "ds_1", "fresh", false)
            .await
            .unwrap();

        assert_eq!(name, "fresh");
        assert!(prompter.asked().is_empty());
    }

    #[tokio::test]
    async fn test_override_deletes_without_asking() {
        let platform = platform();
        let mut prompter = ScriptedPrompter::new(Vec::<&str>::new());

        let name = check_output_dataset_version(&platform, &mut prompter, "ds_1", "processed", true)
            .await
            .unwrap();

        assert_eq!(name, "processed");
        assert_eq!(platform.deleted(), vec!["ds_2".to_string()]);
        assert!(prompter.asked().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_overwrite_deletes() {
        let platform = platform();
        let mut prompter = ScriptedPrompter::new(["y"]);

        let name = check_output_dataset_version(&platform, &mut prompter, "ds_1", "processed", false)
            .await
            .unwrap();

        assert_eq!(name, "processed");
        assert_eq!(platform.deleted(), vec!["ds_2".to_string()]);
    }

    #[tokio::test]
    async fn test_declined_overwrite_asks_for_new_name() {
        let platform = platform();
        // Decline, then accept the suggested default.
        let mut prompter = ScriptedPrompter::new(["n", ""]);

        let name = check_output_dataset_version(&platform, &mut prompter, "ds_1", "processed", false)
            .await
            .unwrap();

        assert_eq!(name, "processed_new");
        assert!(platform.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_keeps_name() {
        let platform = MockPlatform::new();
        let mut prompter = ScriptedPrompter::new(Vec::<&str>::new());

        let name = check_output_dataset_version(&platform, &mut prompter, "ds_404", "processed", false)
            .await
            .unwrap();

        assert_eq!(name, "processed");
    }
}
