//! Core orchestration for quberneeds deployments.
//!
//! This crate ties together manifest parsing and toolchain backends into the
//! `Orchestrator`: refresh repositories, resolve every chart into its own
//! working directory, collect cross-chart exports, run the install or delete
//! workflow once per manifest environment, and clean up afterwards.

pub mod cleanup;
pub mod exports;
pub mod interrupt;
pub mod orchestrator;
pub mod resolver;
pub mod workflow;

pub use cleanup::cleanup;
pub use exports::{collect_exports, export_var_name, EXPORTS_DIR};
pub use interrupt::{install_signal_handler, shutdown_requested};
pub use orchestrator::{Orchestrator, RunReport};
pub use resolver::{resolve_bundles, ResolvedBundle};
pub use workflow::{Mode, Workflow, WorkflowReport, NAMESPACE_SENTINEL};

pub use quberneeds_schema::ManifestError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("{0}")]
    Runtime(#[from] quberneeds_runtime::RuntimeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("interrupted, leaving working directories in place")]
    Interrupted,
}

impl CoreError {
    /// Exit code of the external command that failed, passed through
    /// verbatim. `None` for failures that did not come from a command.
    pub fn command_exit_code(&self) -> Option<i32> {
        match self {
            Self::Runtime(e) => e.exit_code(),
            _ => None,
        }
    }
}
