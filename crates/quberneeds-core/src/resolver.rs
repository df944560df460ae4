use crate::exports::EXPORTS_DIR;
use crate::CoreError;
use quberneeds_runtime::Toolchain;
use quberneeds_schema::{ChartSpec, Environment, ManifestError};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

const WORKDIR_PREFIX: &str = "quberneeds-";

/// A chart fetched into its own working directory.
///
/// The working directory is created for this chart alone and is only ever
/// removed by [`cleanup`](crate::cleanup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBundle {
    pub chart: ChartSpec,
    pub workdir: PathBuf,
    pub root: PathBuf,
}

impl ResolvedBundle {
    pub fn descriptor(&self, toolchain: &dyn Toolchain) -> PathBuf {
        toolchain.descriptor_path(&self.root)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join(EXPORTS_DIR)
    }
}

/// Fetch every chart, in order, into a fresh temporary directory.
///
/// On failure the directories created so far, including the one the failed
/// fetch was writing into, are left on disk.
pub fn resolve_bundles(
    toolchain: &dyn Toolchain,
    charts: &[ChartSpec],
    env: &Environment,
) -> Result<Vec<ResolvedBundle>, CoreError> {
    let mut bundles = Vec::with_capacity(charts.len());
    for chart in charts {
        if crate::shutdown_requested() {
            return Err(CoreError::Interrupted);
        }
        bundles.push(resolve_bundle(toolchain, chart, env)?);
    }
    Ok(bundles)
}

fn resolve_bundle(
    toolchain: &dyn Toolchain,
    chart: &ChartSpec,
    env: &Environment,
) -> Result<ResolvedBundle, CoreError> {
    if !chart.is_well_formed() {
        return Err(ManifestError::InvalidChartName(chart.name.clone()).into());
    }

    let workdir = tempfile::Builder::new()
        .prefix(WORKDIR_PREFIX)
        .tempdir()?
        .keep();
    debug!("created working directory {}", workdir.display());

    println!(
        "Fetching chart {} {}",
        chart.name,
        chart.pinned_version().unwrap_or_default()
    );
    info!("fetching {chart} into {}", workdir.display());
    toolchain.fetch_chart(chart, &workdir, env)?;

    let root = workdir.join(chart.chart_name().unwrap_or_default());
    Ok(ResolvedBundle {
        chart: chart.clone(),
        workdir,
        root,
    })
}
