//! Checker registry and pipeline assembly.
//!
//! This crate knows every checker the workspace ships, assembles them into
//! a [`CheckerPipeline`] from a [`SuiteConfig`], and runs the pipeline over
//! an artefact. Consumers that want a custom mix can also build a pipeline
//! by hand from any [`vetting_common::Checker`] implementations.

mod checkers;
mod config;
mod pipeline;

pub use checkers::{
    CheckerDescriptor, CheckerKind, SUITE_CHECKERS, UnknownChecker, suite_checker_names,
};
pub use config::{SuiteConfig, SuiteError, build_pipeline};
pub use pipeline::{CheckerPipeline, Deadline, PIPELINE_NAME};
