use super::{CommandError, Settings, EXIT_FAILURE, EXIT_SUCCESS};
use console::Style;
use quberneeds_core::{Mode, Orchestrator, RunReport};
use quberneeds_runtime::{check_prereqs, format_missing, select_toolchain};
use std::path::Path;
use tracing::debug;

pub fn run(settings: &Settings, manifest: &Path, mode: Mode) -> Result<u8, CommandError> {
    let config = settings.load_config()?;

    if settings.toolchain == "helm"
        && std::env::var("QUBERNEEDS_SKIP_PREREQS").as_deref() != Ok("1")
    {
        let missing = check_prereqs(&config, mode == Mode::Delete);
        if !missing.is_empty() {
            return Err(CommandError::new(format_missing(&missing), EXIT_FAILURE));
        }
    }

    debug!("toolchain {} with {config:?}", settings.toolchain);
    let toolchain = select_toolchain(&settings.toolchain, config)?;
    let orchestrator = Orchestrator::new(toolchain);
    let report = orchestrator.run_file(manifest, mode)?;

    println!("\n{}", summary(&report));
    Ok(EXIT_SUCCESS)
}

fn summary(report: &RunReport) -> String {
    let ok = Style::new().green().bold();
    let charts = report.bundles.len();
    let envs = report.workflow.iterations;
    let line = match report.mode {
        Mode::Install => format!("deployed {charts} chart(s) to {envs} environment(s)"),
        Mode::Delete => {
            let namespaces = &report.workflow.namespace_deletes;
            if namespaces.is_empty() {
                format!("deleted {charts} chart(s) from {envs} environment(s)")
            } else {
                format!(
                    "deleted {charts} chart(s) from {envs} environment(s), namespaces: {}",
                    namespaces.join(", ")
                )
            }
        }
    };
    format!("{} {line}", ok.apply_to("✓"))
}
