//! Static verification gate for generated source artefacts.
//!
//! The library behind the `vetting` binary: configuration file loading,
//! report rendering and the command implementations. The checkers and the
//! pipeline themselves live in `vetting_suite` and the crates it
//! aggregates.

pub mod cli;
pub mod commands;
pub mod config;
pub mod report;

pub use config::{CONFIG_FILE_NAME, ConfigError, load_config, load_config_with};
pub use report::{render_human, render_json};
