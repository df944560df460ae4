//! Toolchain backends for quberneeds.
//!
//! This crate implements the execution layer: the pluggable `Toolchain` trait
//! covering every external collaborator (repository refresh, chart fetch,
//! release apply/remove, namespace teardown), the real helm/helmfile/kubectl
//! implementation, a recording mock, toolchain configuration, and
//! prerequisite checking.

pub mod config;
pub mod helm;
pub mod mock;
pub mod prereq;
pub mod process;
pub mod toolchain;

pub use config::ToolchainConfig;
pub use prereq::{check_prereqs, format_missing, MissingPrereq};
pub use toolchain::{select_toolchain, Toolchain};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("toolchain I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("`{command}` exited with status {code}")]
    CommandFailed { command: String, code: i32 },
    #[error("toolchain '{0}' is not available")]
    ToolchainUnavailable(String),
    #[error("invalid toolchain config: {0}")]
    Config(String),
}

impl RuntimeError {
    /// The exit code of the failed external command, if this error came
    /// from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}
