//! Run configuration document
//!
//! A run config is persisted as a free-form TOML document so that users can
//! hand-edit it between runs. In memory it is wrapped in [`RunConfig`], which
//! exposes typed accessors for the sections the CLI understands:
//!
//! - `auth`: `host`, `organization_name`
//! - `job`: `type`
//! - `input` / `output`: entity references keyed by [`Slot`]
//! - `parameters` / `hyperparameters`: flat parameter maps
//! - `run`: ephemeral per-run fields (`working_dir`, `started_at`)
//!
//! Everything else is carried through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use toml::{Table, Value};

use crate::domain::job::JobType;
use crate::domain::reference::{EntityRef, Slot};

/// Which side of the run a reference belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn key(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

/// A run configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunConfig(Table);

impl RunConfig {
    pub fn new() -> Self {
        Self(Table::new())
    }

    pub fn from_table(table: Table) -> Self {
        Self(table)
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn as_table_mut(&mut self) -> &mut Table {
        &mut self.0
    }

    pub fn into_table(self) -> Table {
        self.0
    }

    /// Returns a top-level section if present and a table
    pub fn section(&self, name: &str) -> Option<&Table> {
        self.0.get(name).and_then(Value::as_table)
    }

    /// Returns a top-level section, creating it if absent
    ///
    /// A non-table value under `name` is replaced by an empty table.
    pub fn section_mut(&mut self, name: &str) -> &mut Table {
        if !matches!(self.0.get(name), Some(Value::Table(_))) {
            self.0.insert(name.to_string(), Value::Table(Table::new()));
        }
        match self.0.get_mut(name) {
            Some(Value::Table(table)) => table,
            _ => unreachable!("section '{name}' was just inserted as a table"),
        }
    }

    pub fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)?.as_str()
    }

    pub fn set_str(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.section_mut(section)
            .insert(key.to_string(), Value::String(value.into()));
    }

    // =============================================================================
    // Job
    // =============================================================================

    /// Job type from `job.type`, falling back to `metadata.type`
    ///
    /// Returns `None` when absent or unknown.
    pub fn job_type(&self) -> Option<JobType> {
        self.get_str("job", "type")
            .or_else(|| self.get_str("metadata", "type"))
            .and_then(|raw| raw.parse().ok())
    }

    pub fn set_job_type(&mut self, job_type: JobType) {
        self.set_str("job", "type", job_type.as_str());
    }

    // =============================================================================
    // References
    // =============================================================================

    /// Reads the reference stored at `<direction>.<slot>`
    pub fn reference(&self, direction: Direction, slot: Slot) -> Option<EntityRef> {
        self.section(direction.key())?
            .get(slot.key())?
            .as_table()
            .map(EntityRef::from_table)
    }

    /// Replaces the reference stored at `<direction>.<slot>`
    pub fn set_reference(&mut self, direction: Direction, slot: Slot, reference: &EntityRef) {
        self.section_mut(direction.key())
            .insert(slot.key().to_string(), Value::Table(reference.to_table()));
    }

    /// Writes the fields present in `reference` into `<direction>.<slot>`
    ///
    /// Other keys of the stored table are kept, so hand-written entries
    /// survive. A non-table value at the slot is replaced.
    pub fn merge_reference(&mut self, direction: Direction, slot: Slot, reference: &EntityRef) {
        self.reference_table_mut(direction, slot)
            .extend(reference.to_table());
    }

    /// Removes `keys` from the table at `<direction>.<slot>`, if present
    pub fn remove_reference_fields(&mut self, direction: Direction, slot: Slot, keys: &[&str]) {
        let table = self
            .0
            .get_mut(direction.key())
            .and_then(Value::as_table_mut)
            .and_then(|section| section.get_mut(slot.key()))
            .and_then(Value::as_table_mut);
        if let Some(table) = table {
            for key in keys {
                table.remove(*key);
            }
        }
    }

    fn reference_table_mut(&mut self, direction: Direction, slot: Slot) -> &mut Table {
        let section = self.section_mut(direction.key());
        if !matches!(section.get(slot.key()), Some(Value::Table(_))) {
            section.insert(slot.key().to_string(), Value::Table(Table::new()));
        }
        match section.get_mut(slot.key()) {
            Some(Value::Table(table)) => table,
            _ => unreachable!("slot '{}' was just inserted as a table", slot.key()),
        }
    }

    pub fn input(&self, slot: Slot) -> Option<EntityRef> {
        self.reference(Direction::Input, slot)
    }

    pub fn output(&self, slot: Slot) -> Option<EntityRef> {
        self.reference(Direction::Output, slot)
    }

    pub fn set_input(&mut self, slot: Slot, reference: &EntityRef) {
        self.set_reference(Direction::Input, slot, reference);
    }

    pub fn set_output(&mut self, slot: Slot, reference: &EntityRef) {
        self.set_reference(Direction::Output, slot, reference);
    }

    /// Shortcut for the id of an input reference
    pub fn input_id(&self, slot: Slot) -> Option<String> {
        self.input(slot).and_then(|r| r.id().map(str::to_string))
    }

    // =============================================================================
    // Auth
    // =============================================================================

    pub fn auth_host(&self) -> Option<&str> {
        self.get_str("auth", "host").filter(|h| !h.trim().is_empty())
    }

    pub fn set_auth_host(&mut self, host: impl Into<String>) {
        self.set_str("auth", "host", host);
    }

    pub fn organization_name(&self) -> Option<&str> {
        self.get_str("auth", "organization_name")
            .filter(|o| !o.trim().is_empty())
    }

    pub fn set_organization_name(&mut self, organization: impl Into<String>) {
        self.set_str("auth", "organization_name", organization);
    }

    // =============================================================================
    // Parameters
    // =============================================================================

    pub fn parameters(&self, key: &str) -> Option<&Table> {
        self.section(key)
    }

    // =============================================================================
    // Run (ephemeral)
    // =============================================================================

    pub fn working_dir(&self) -> Option<&str> {
        self.get_str("run", "working_dir")
    }

    pub fn set_working_dir(&mut self, dir: &Path) {
        self.set_str("run", "working_dir", dir.to_string_lossy());
    }

    pub fn set_started_at(&mut self, at: DateTime<Utc>) {
        self.set_str("run", "started_at", at.to_rfc3339());
    }

    /// The `input` and `output` sections, for display
    pub fn io_summary(&self) -> Table {
        let mut summary = Table::new();
        for direction in [Direction::Input, Direction::Output] {
            let section = self.section(direction.key()).cloned().unwrap_or_default();
            summary.insert(direction.key().to_string(), Value::Table(section));
        }
        summary
    }
}

impl From<Table> for RunConfig {
    fn from(table: Table) -> Self {
        Self(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> RunConfig {
        toml::from_str(source).unwrap()
    }

    #[test]
    fn test_job_type_prefers_job_section() {
        let config = parse(
            r#"
            [job]
            type = "PRE_ANNOTATION"

            [metadata]
            type = "TRAINING"
            "#,
        );
        assert_eq!(config.job_type(), Some(JobType::PreAnnotation));
    }

    #[test]
    fn test_job_type_falls_back_to_metadata() {
        let config = parse("[metadata]\ntype = \"TRAINING\"\n");
        assert_eq!(config.job_type(), Some(JobType::Training));
    }

    #[test]
    fn test_reference_accessors() {
        let mut config = parse(
            r#"
            [input.dataset_version]
            id = "ds_1"
            "#,
        );
        assert_eq!(config.input_id(Slot::DatasetVersion), Some("ds_1".to_string()));
        assert_eq!(config.input(Slot::ModelVersion), None);

        config.set_output(Slot::DatasetVersion, &EntityRef::with_name("processed"));
        let output = config.output(Slot::DatasetVersion).unwrap();
        assert_eq!(output.name(), Some("processed"));
        assert_eq!(output.id(), None);
    }

    #[test]
    fn test_merge_reference_keeps_other_keys() {
        let mut config = parse(
            r#"
            [output.dataset_version]
            name = "processed"
            id = "ds_old"
            description = "resized to 640"
            "#,
        );

        config.merge_reference(
            Direction::Output,
            Slot::DatasetVersion,
            &EntityRef::with_id("ds_new"),
        );
        let table = &config.section("output").unwrap()["dataset_version"];
        assert_eq!(table["id"].as_str(), Some("ds_new"));
        assert_eq!(table["name"].as_str(), Some("processed"));
        assert_eq!(table["description"].as_str(), Some("resized to 640"));

        config.remove_reference_fields(Direction::Output, Slot::DatasetVersion, &["id", "url"]);
        let output = config.output(Slot::DatasetVersion).unwrap();
        assert_eq!(output.id(), None);
        assert_eq!(output.name(), Some("processed"));
    }

    #[test]
    fn test_section_mut_replaces_scalar() {
        let mut config = parse("run = \"oops\"\n");
        config.set_working_dir(Path::new("/tmp/runs/run1"));
        assert_eq!(config.working_dir(), Some("/tmp/runs/run1"));
    }

    #[test]
    fn test_unknown_sections_survive_round_trip() {
        let source = r#"
            [custom]
            nested = { a = 1 }
            "#;
        let config = parse(source);
        let serialized = toml::to_string(&config).unwrap();
        assert_eq!(parse(&serialized), config);
    }

    #[test]
    fn test_io_summary_contains_both_sections() {
        let config = parse("[input.datalake]\nid = \"dl\"\n");
        let summary = config.io_summary();
        assert!(summary["input"].as_table().unwrap().contains_key("datalake"));
        assert!(summary["output"].as_table().unwrap().is_empty());
    }
}
