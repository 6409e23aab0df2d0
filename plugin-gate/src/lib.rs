//! plugin-gate library
//!
//! This module exports the components of the `plugin-gate` binary for testing
//! purposes.

pub mod check;
pub mod cli;
pub mod config;
pub mod inventory;
pub mod report;
pub mod telemetry;
