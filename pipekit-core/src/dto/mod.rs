//! Data Transfer Objects for platform requests
//!
//! Request bodies and query shapes sent to the platform API.

pub mod dataset;
