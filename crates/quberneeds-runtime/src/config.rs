use crate::RuntimeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which binaries to invoke and how charts name their deployment descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    pub helm: String,
    pub helmfile: String,
    pub kubectl: String,
    pub descriptor: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            helm: "helm".to_owned(),
            helmfile: "helmfile".to_owned(),
            kubectl: "kubectl".to_owned(),
            descriptor: "helmfile.yaml".to_owned(),
        }
    }
}

impl ToolchainConfig {
    /// Load config from `~/.config/quberneeds/toolchain.json`, falling back
    /// to defaults when the file does not exist.
    pub fn load_default() -> Result<Self, RuntimeError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| RuntimeError::Config(format!("{}: {e}", path.display())))
    }
}

fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/quberneeds/toolchain.json"))
}
