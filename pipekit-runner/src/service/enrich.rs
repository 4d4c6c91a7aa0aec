//! Platform enrichment of run config references
//!
//! Raw ids under `input.*` / `output.*` are resolved against the platform and
//! `{id, name, origin_name, url}` are merged into their tables; other keys
//! written by hand stay. Input ids are never re-derived: they are copied from
//! the config, not from the lookup result.
//!
//! Lookup failures are logged and leave the reference as it was.

use pipekit_client::{ClientError, Platform};
use pipekit_core::{Direction, EntityKind, EntityRef, JobType, RunConfig, Slot};
use tracing::{debug, warn};

const DEFAULT_MODEL_VISIBILITY: &str = "private";

/// Resolves the declared references before a run
///
/// Visits every known slot under `input`, plus `output.experiment` (the
/// experiment exists before a training run starts).
pub async fn enrich_run_config_with_metadata(platform: &dyn Platform, run_config: &mut RunConfig) {
    let targets = Slot::ALL
        .into_iter()
        .map(|slot| (Direction::Input, slot))
        .chain(std::iter::once((Direction::Output, Slot::Experiment)));

    for (direction, slot) in targets {
        let Some(current) = run_config.reference(direction, slot) else {
            continue;
        };
        let Some(id) = current.id().map(str::to_string) else {
            continue;
        };

        match resolve(platform, slot.kind(), &id, &current).await {
            Ok(resolved) => {
                debug!("Resolved {}.{} = {}", direction.key(), slot.key(), id);
                run_config.merge_reference(direction, slot, &resolved);
            }
            Err(e) => warn!(
                "Could not resolve {}.{} metadata for id {}: {}",
                direction.key(),
                slot.key(),
                id,
                e
            ),
        }
    }
}

/// Resolves the dataset version created by a dataset-creation run
///
/// The output only carries the name chosen before the run; its id is found by
/// looking the name up on the input dataset version's parent dataset. Does
/// nothing for other job types or when the name or input id is missing.
pub async fn enrich_output_metadata_after_run(platform: &dyn Platform, run_config: &mut RunConfig) {
    if run_config.job_type() != Some(JobType::DatasetVersionCreation) {
        return;
    }
    let Some(output) = run_config.output(Slot::DatasetVersion) else {
        return;
    };
    let Some(output_name) = output.name().map(str::to_string) else {
        return;
    };
    let Some(input_id) = run_config.input_id(Slot::DatasetVersion) else {
        warn!("Cannot resolve output dataset version '{}': no input dataset version id", output_name);
        return;
    };

    let lookup = async {
        let input = platform.get_dataset_version(&input_id).await?;
        let dataset = platform.get_dataset(&input.origin_id).await?;
        let created = platform.find_dataset_version(&dataset.id, &output_name).await?;
        Ok::<_, ClientError>((dataset, created))
    };

    match lookup.await {
        Ok((dataset, created)) => {
            let resolved = EntityRef {
                url: Some(platform.connection().dataset_version_url(&created)),
                id: Some(created.id),
                version_name: Some(created.version),
                origin_name: Some(dataset.name),
                ..EntityRef::default()
            };
            run_config.merge_reference(Direction::Output, Slot::DatasetVersion, &resolved);
        }
        Err(e) => warn!(
            "Could not fetch output dataset version '{}' metadata: {}",
            output_name, e
        ),
    }
}

async fn resolve(
    platform: &dyn Platform,
    kind: EntityKind,
    id: &str,
    current: &EntityRef,
) -> Result<EntityRef, ClientError> {
    let connection = platform.connection();

    let resolved = match kind {
        EntityKind::DatasetVersion => {
            let version = platform.get_dataset_version(id).await?;
            EntityRef {
                name: Some(version.version.clone()),
                origin_name: Some(version.name.clone()),
                url: Some(connection.dataset_version_url(&version)),
                ..EntityRef::with_id(id)
            }
        }
        EntityKind::ModelVersion => {
            let version = platform.get_model_version(id).await?;
            EntityRef {
                name: Some(version.name.clone()),
                origin_name: Some(version.origin_name.clone()),
                url: Some(connection.model_version_url(&version)),
                visibility: Some(
                    current
                        .visibility
                        .clone()
                        .unwrap_or_else(|| DEFAULT_MODEL_VISIBILITY.to_string()),
                ),
                ..EntityRef::with_id(id)
            }
        }
        EntityKind::Datalake => {
            let datalake = platform.get_datalake(id).await?;
            EntityRef {
                name: Some(datalake.name),
                url: Some(connection.datalake_url(id)),
                ..EntityRef::with_id(id)
            }
        }
        EntityKind::Experiment => {
            let experiment = platform.get_experiment(id).await?;
            EntityRef {
                name: Some(experiment.name),
                origin_name: experiment.project_name,
                url: Some(connection.experiment_url(id)),
                ..EntityRef::with_id(id)
            }
        }
    };

    Ok(resolved)
}
