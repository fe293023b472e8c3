//! # evodash
//!
//! Library half of the evodash binary. Exposes the CLI, configuration and
//! dashboard modules so integration tests can drive them directly.

pub mod cli;
pub mod config;
pub mod dashboard;
