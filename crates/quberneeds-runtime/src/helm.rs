use crate::config::ToolchainConfig;
use crate::process;
use crate::toolchain::Toolchain;
use crate::RuntimeError;
use quberneeds_schema::{ChartSpec, Environment};
use std::ffi::OsString;
use std::path::Path;

/// Drives `helm` for repositories and fetching, `helmfile` for releases, and
/// `kubectl` for namespace teardown.
pub struct HelmToolchain {
    config: ToolchainConfig,
}

impl HelmToolchain {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }
}

pub(crate) fn fetch_args(chart: &ChartSpec, dest: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "fetch".into(),
        chart.name.clone().into(),
        "--untar".into(),
        "--untardir".into(),
        dest.into(),
    ];
    if let Some(version) = chart.pinned_version() {
        args.push("--version".into());
        args.push(version.into());
    }
    args
}

pub(crate) fn apply_args(descriptor: &Path, dry_run: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-f".into(), descriptor.into(), "charts".into()];
    if dry_run {
        args.push("--args".into());
        args.push("--dry-run".into());
    }
    args
}

pub(crate) fn remove_args(descriptor: &Path) -> Vec<OsString> {
    vec![
        "-f".into(),
        descriptor.into(),
        "delete".into(),
        "--purge".into(),
    ]
}

impl Toolchain for HelmToolchain {
    fn name(&self) -> &'static str {
        "helm"
    }

    fn descriptor_name(&self) -> &str {
        &self.config.descriptor
    }

    fn update_repositories(&self, env: &Environment) -> Result<(), RuntimeError> {
        process::run(&self.config.helm, ["repo", "update"], env)
    }

    fn fetch_chart(
        &self,
        chart: &ChartSpec,
        dest: &Path,
        env: &Environment,
    ) -> Result<(), RuntimeError> {
        process::run(&self.config.helm, fetch_args(chart, dest), env)
    }

    fn apply_chart(
        &self,
        descriptor: &Path,
        dry_run: bool,
        env: &Environment,
    ) -> Result<(), RuntimeError> {
        process::run(&self.config.helmfile, apply_args(descriptor, dry_run), env)
    }

    fn remove_chart(&self, descriptor: &Path, env: &Environment) -> Result<(), RuntimeError> {
        process::run(&self.config.helmfile, remove_args(descriptor), env)
    }

    fn delete_namespace(&self, namespace: &str, env: &Environment) -> Result<(), RuntimeError> {
        process::run(&self.config.kubectl, ["delete", "namespace", namespace], env)
    }
}
