//! Core domain types
//!
//! This module contains the structures shared between the platform client
//! (entities it returns) and the run lifecycle (run configs and the
//! references they embed).

pub mod entity;
pub mod job;
pub mod reference;
pub mod run_config;
