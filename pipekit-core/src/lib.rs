//! Pipekit Core
//!
//! Core types shared by the pipekit crates.
//!
//! This crate contains:
//! - Domain types: job types, entity references, run configs, platform entities
//! - DTOs: request shapes sent to the platform

pub mod domain;
pub mod dto;

pub use domain::job::JobType;
pub use domain::reference::{EntityKind, EntityRef, Slot};
pub use domain::run_config::{Direction, RunConfig};
