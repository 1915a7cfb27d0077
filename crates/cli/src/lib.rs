//! Command-line front end for the reference integrity engine.
//!
//! The binary wires the corpus scanner, extractor, validator, fixer and
//! registry into three subcommands (`validate`, `fix`, `migrate`); this
//! library half exposes the configuration layer and the run pipeline so
//! integration tests can drive full runs without spawning a process.

pub mod config;
pub mod pipeline;

pub use config::{scan_options, FileConfig};
pub use pipeline::{run_migration, run_timestamp, run_validation, MigrationRun, RunOptions, RunOutput};
