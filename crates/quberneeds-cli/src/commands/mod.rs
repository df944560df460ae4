pub mod completions;
pub mod deploy;

use quberneeds_core::CoreError;
use quberneeds_runtime::{RuntimeError, ToolchainConfig};
use std::path::PathBuf;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 1;
pub const EXIT_INTERRUPTED: u8 = 130;

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub toolchain: String,
    pub config: Option<PathBuf>,
}

impl Settings {
    pub fn load_config(&self) -> Result<ToolchainConfig, CommandError> {
        let loaded = match &self.config {
            Some(path) => ToolchainConfig::load(path),
            None => ToolchainConfig::load_default(),
        };
        loaded.map_err(|e| CommandError::new(format!("toolchain config: {e}"), EXIT_FAILURE))
    }
}

/// A failed command: the message printed to stderr and the process exit code.
#[derive(Debug)]
pub struct CommandError {
    pub message: String,
    pub code: u8,
}

impl CommandError {
    pub fn new(message: impl Into<String>, code: u8) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        let code = exit_code_for(&err);
        Self::new(err.to_string(), code)
    }
}

impl From<RuntimeError> for CommandError {
    fn from(err: RuntimeError) -> Self {
        CoreError::from(err).into()
    }
}

/// The process exit code for a failed run. A failed external command's code
/// is passed through unchanged.
pub fn exit_code_for(err: &CoreError) -> u8 {
    if let Some(code) = err.command_exit_code() {
        return match u8::try_from(code) {
            Ok(0) | Err(_) => EXIT_FAILURE,
            Ok(code) => code,
        };
    }
    match err {
        CoreError::Interrupted => EXIT_INTERRUPTED,
        _ => EXIT_FAILURE,
    }
}
