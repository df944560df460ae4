use crate::cleanup::cleanup;
use crate::exports::collect_exports;
use crate::resolver::{resolve_bundles, ResolvedBundle};
use crate::workflow::{Mode, Workflow, WorkflowReport};
use crate::CoreError;
use quberneeds_runtime::Toolchain;
use quberneeds_schema::{parse_manifest_file, EnvMap, Environment, Manifest};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Central coordinator for a deployment run.
///
/// Owns the toolchain and walks a manifest through repository refresh,
/// chart resolution, export collection, the install or delete workflow, and
/// working-directory cleanup. Any failure returns immediately and skips
/// cleanup so the fetched charts stay available for inspection.
pub struct Orchestrator {
    toolchain: Box<dyn Toolchain>,
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    pub bundles: Vec<ResolvedBundle>,
    pub exports: EnvMap,
    pub workflow: WorkflowReport,
}

impl Orchestrator {
    pub fn new(toolchain: Box<dyn Toolchain>) -> Self {
        Self { toolchain }
    }

    pub fn toolchain(&self) -> &dyn Toolchain {
        self.toolchain.as_ref()
    }

    /// Load the manifest at `manifest_path` and run it.
    pub fn run_file(&self, manifest_path: &Path, mode: Mode) -> Result<RunReport, CoreError> {
        info!("{mode} from {}", manifest_path.display());
        let manifest = parse_manifest_file(manifest_path)?;
        self.run(&manifest, mode)
    }

    pub fn run(&self, manifest: &Manifest, mode: Mode) -> Result<RunReport, CoreError> {
        let toolchain = self.toolchain();
        debug!(
            "{} chart(s), {} environment(s), toolchain {}",
            manifest.charts.len(),
            manifest.envs.len(),
            toolchain.name()
        );

        let initial = Environment::new();
        toolchain.update_repositories(&initial)?;

        let bundles = resolve_bundles(toolchain, &manifest.charts, &initial)?;

        let exports = collect_exports(&bundles)?;
        if !exports.is_empty() {
            info!("collected {} export(s)", exports.len());
        }
        let base = initial.layered(&exports);

        let workflow = Workflow::new(toolchain, &bundles).run(mode, &manifest.envs, base)?;

        cleanup(&bundles)?;

        Ok(RunReport {
            mode,
            bundles,
            exports,
            workflow,
        })
    }
}
