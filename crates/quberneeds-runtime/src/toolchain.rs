use crate::config::ToolchainConfig;
use crate::RuntimeError;
use quberneeds_schema::{ChartSpec, Environment};
use std::path::{Path, PathBuf};

/// The external collaborators the orchestrator drives.
///
/// Every call blocks until the underlying command exits and reports only
/// success or the command's exit code. `env` is layered on top of the
/// environment the command would otherwise inherit.
pub trait Toolchain: Send + Sync {
    fn name(&self) -> &str;

    /// File name of the deployment descriptor inside a chart root.
    fn descriptor_name(&self) -> &str;

    /// Refresh the local repository index so version constraints resolve
    /// against current metadata.
    fn update_repositories(&self, env: &Environment) -> Result<(), RuntimeError>;

    /// Fetch `chart` and unpack it into `dest`. The chart lands in
    /// `dest/<chart name>`.
    fn fetch_chart(
        &self,
        chart: &ChartSpec,
        dest: &Path,
        env: &Environment,
    ) -> Result<(), RuntimeError>;

    /// Apply the releases described by `descriptor`. With `dry_run` the
    /// release engine validates without touching the cluster.
    fn apply_chart(
        &self,
        descriptor: &Path,
        dry_run: bool,
        env: &Environment,
    ) -> Result<(), RuntimeError>;

    /// Remove and purge the releases described by `descriptor`.
    fn remove_chart(&self, descriptor: &Path, env: &Environment) -> Result<(), RuntimeError>;

    fn delete_namespace(&self, namespace: &str, env: &Environment) -> Result<(), RuntimeError>;

    fn descriptor_path(&self, chart_root: &Path) -> PathBuf {
        chart_root.join(self.descriptor_name())
    }
}

pub fn select_toolchain(
    name: &str,
    config: ToolchainConfig,
) -> Result<Box<dyn Toolchain>, RuntimeError> {
    match name {
        "helm" => Ok(Box::new(crate::helm::HelmToolchain::new(config))),
        "mock" => Ok(Box::new(crate::mock::MockToolchain::with_descriptor(
            config.descriptor,
        ))),
        other => Err(RuntimeError::ToolchainUnavailable(other.to_owned())),
    }
}
