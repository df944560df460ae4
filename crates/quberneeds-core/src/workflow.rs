use crate::resolver::ResolvedBundle;
use crate::CoreError;
use quberneeds_runtime::Toolchain;
use quberneeds_schema::{EnvMap, Environment};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Environment key whose value names the namespace to delete in
/// [`Mode::Delete`].
pub const NAMESPACE_SENTINEL: &str = "TENANT_ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Install,
    Delete,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => f.write_str("install"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// What a workflow run did, counted per external action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowReport {
    pub iterations: usize,
    pub dry_runs: usize,
    pub deploys: usize,
    pub chart_deletes: usize,
    pub namespace_deletes: Vec<String>,
}

/// Drives install or delete across all resolved bundles, once per manifest
/// environment. Bundles are borrowed; the workflow never removes them.
pub struct Workflow<'a> {
    toolchain: &'a dyn Toolchain,
    bundles: &'a [ResolvedBundle],
}

impl<'a> Workflow<'a> {
    pub fn new(toolchain: &'a dyn Toolchain, bundles: &'a [ResolvedBundle]) -> Self {
        Self { toolchain, bundles }
    }

    /// Run every environment in order, starting from `base`.
    ///
    /// Each mapping is layered onto the environment left by the previous
    /// iteration. The first failing command ends the run.
    pub fn run(
        &self,
        mode: Mode,
        envs: &[EnvMap],
        base: Environment,
    ) -> Result<WorkflowReport, CoreError> {
        let mut report = WorkflowReport::default();
        let mut env = base;

        for mapping in envs {
            env.apply(mapping);
            report.iterations += 1;

            match mode {
                Mode::Delete => self.delete(mapping, &env, &mut report)?,
                Mode::Install => self.install(mapping, &env, &mut report)?,
            }
        }

        info!(
            "{mode} finished: {} environment(s), {} bundle(s)",
            report.iterations,
            self.bundles.len()
        );
        Ok(report)
    }

    fn delete(
        &self,
        mapping: &EnvMap,
        env: &Environment,
        report: &mut WorkflowReport,
    ) -> Result<(), CoreError> {
        println!("\nPerforming delete for: {}", describe(mapping));
        for bundle in self.bundles {
            checkpoint()?;
            debug!("removing {}", bundle.chart.name);
            self.toolchain
                .remove_chart(&bundle.descriptor(self.toolchain), env)?;
            report.chart_deletes += 1;
        }

        if let Some(namespace) = mapping.get(NAMESPACE_SENTINEL) {
            checkpoint()?;
            info!("deleting namespace {namespace}");
            self.toolchain.delete_namespace(namespace, env)?;
            report.namespace_deletes.push(namespace.clone());
        }
        Ok(())
    }

    fn install(
        &self,
        mapping: &EnvMap,
        env: &Environment,
        report: &mut WorkflowReport,
    ) -> Result<(), CoreError> {
        println!("\nPerforming dry-run for: {}", describe(mapping));
        for bundle in self.bundles {
            checkpoint()?;
            debug!("dry-run {}", bundle.chart.name);
            self.toolchain
                .apply_chart(&bundle.descriptor(self.toolchain), true, env)?;
            report.dry_runs += 1;
        }

        println!("\nDeploying for: {}", describe(mapping));
        for bundle in self.bundles {
            checkpoint()?;
            debug!("deploying {}", bundle.chart.name);
            self.toolchain
                .apply_chart(&bundle.descriptor(self.toolchain), false, env)?;
            report.deploys += 1;
        }
        Ok(())
    }
}

fn checkpoint() -> Result<(), CoreError> {
    if crate::shutdown_requested() {
        Err(CoreError::Interrupted)
    } else {
        Ok(())
    }
}

fn describe(mapping: &EnvMap) -> String {
    let pairs: Vec<String> = mapping.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{{{}}}", pairs.join(", "))
}
