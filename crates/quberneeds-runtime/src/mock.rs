use crate::toolchain::Toolchain;
use crate::RuntimeError;
use quberneeds_schema::{ChartSpec, Environment};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// What kind of toolchain operation a [`Call`] was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Update,
    Fetch,
    DryRun,
    Deploy,
    Remove,
    DeleteNamespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Update,
    Fetch {
        chart: String,
        version: Option<String>,
        dest: PathBuf,
    },
    Apply {
        descriptor: PathBuf,
        dry_run: bool,
    },
    Remove {
        descriptor: PathBuf,
    },
    DeleteNamespace {
        namespace: String,
    },
}

impl Call {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::Update => CallKind::Update,
            Self::Fetch { .. } => CallKind::Fetch,
            Self::Apply { dry_run: true, .. } => CallKind::DryRun,
            Self::Apply { dry_run: false, .. } => CallKind::Deploy,
            Self::Remove { .. } => CallKind::Remove,
            Self::DeleteNamespace { .. } => CallKind::DeleteNamespace,
        }
    }

    /// Text a failure rule can match against: the chart identifier, the
    /// descriptor path, or the namespace.
    fn subject(&self) -> String {
        match self {
            Self::Update => String::new(),
            Self::Fetch { chart, .. } => chart.clone(),
            Self::Apply { descriptor, .. } | Self::Remove { descriptor } => {
                descriptor.to_string_lossy().into_owned()
            }
            Self::DeleteNamespace { namespace } => namespace.clone(),
        }
    }
}

/// A call together with the environment it was made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub call: Call,
    pub env: Environment,
}

struct Failure {
    kind: CallKind,
    subject: Option<String>,
    code: i32,
}

/// A toolchain that records every call instead of spawning processes.
///
/// Fetching creates `dest/<chart name>` with an empty descriptor and any
/// export files staged with [`with_exports`](Self::with_exports), so the
/// rest of the pipeline sees a real chart layout on disk. Failures are
/// injected per call kind, optionally restricted to calls whose subject
/// contains a given string.
pub struct MockToolchain {
    descriptor: String,
    calls: Mutex<Vec<RecordedCall>>,
    exports: HashMap<String, Vec<(String, String)>>,
    failures: Vec<Failure>,
}

impl Default for MockToolchain {
    fn default() -> Self {
        Self::with_descriptor("helmfile.yaml")
    }
}

impl MockToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_descriptor(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            calls: Mutex::new(Vec::new()),
            exports: HashMap::new(),
            failures: Vec::new(),
        }
    }

    /// Stage `exports/<file>` contents for `chart` (full identifier).
    #[must_use]
    pub fn with_exports(mut self, chart: &str, files: &[(&str, &str)]) -> Self {
        self.exports.insert(
            chart.to_owned(),
            files
                .iter()
                .map(|(name, content)| ((*name).to_owned(), (*content).to_owned()))
                .collect(),
        );
        self
    }

    /// Make every call of `kind` fail with `code`.
    #[must_use]
    pub fn fail_on(mut self, kind: CallKind, code: i32) -> Self {
        self.failures.push(Failure {
            kind,
            subject: None,
            code,
        });
        self
    }

    /// Make calls of `kind` whose subject contains `needle` fail with `code`.
    #[must_use]
    pub fn fail_on_matching(mut self, kind: CallKind, needle: &str, code: i32) -> Self {
        self.failures.push(Failure {
            kind,
            subject: Some(needle.to_owned()),
            code,
        });
        self
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.recorded().into_iter().map(|r| r.call).collect()
    }

    pub fn kinds(&self) -> Vec<CallKind> {
        self.recorded().iter().map(|r| r.call.kind()).collect()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    fn record(&self, call: Call, env: &Environment) -> Result<(), RuntimeError> {
        let kind = call.kind();
        let subject = call.subject();
        let rendered = format!("mock {kind:?} {subject}");

        let mut calls = self
            .calls
            .lock()
            .map_err(|e| RuntimeError::Config(format!("mutex poisoned: {e}")))?;
        calls.push(RecordedCall {
            call,
            env: env.clone(),
        });

        let failure = self.failures.iter().find(|f| {
            f.kind == kind
                && f.subject
                    .as_deref()
                    .is_none_or(|needle| subject.contains(needle))
        });
        match failure {
            Some(f) => Err(RuntimeError::CommandFailed {
                command: rendered,
                code: f.code,
            }),
            None => Ok(()),
        }
    }

    fn unpack(&self, chart: &ChartSpec, dest: &Path) -> Result<(), RuntimeError> {
        let Some(chart_name) = chart.chart_name() else {
            return Ok(());
        };
        let root = dest.join(chart_name);
        std::fs::create_dir_all(&root)?;
        std::fs::write(root.join(&self.descriptor), format!("# mock {}\n", chart.name))?;

        if let Some(files) = self.exports.get(&chart.name) {
            let exports = root.join("exports");
            std::fs::create_dir_all(&exports)?;
            for (name, content) in files {
                std::fs::write(exports.join(name), content)?;
            }
        }
        Ok(())
    }
}

impl Toolchain for MockToolchain {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn descriptor_name(&self) -> &str {
        &self.descriptor
    }

    fn update_repositories(&self, env: &Environment) -> Result<(), RuntimeError> {
        self.record(Call::Update, env)
    }

    fn fetch_chart(
        &self,
        chart: &ChartSpec,
        dest: &Path,
        env: &Environment,
    ) -> Result<(), RuntimeError> {
        self.record(
            Call::Fetch {
                chart: chart.name.clone(),
                version: chart.pinned_version().map(str::to_owned),
                dest: dest.to_path_buf(),
            },
            env,
        )?;
        self.unpack(chart, dest)
    }

    fn apply_chart(
        &self,
        descriptor: &Path,
        dry_run: bool,
        env: &Environment,
    ) -> Result<(), RuntimeError> {
        self.record(
            Call::Apply {
                descriptor: descriptor.to_path_buf(),
                dry_run,
            },
            env,
        )
    }

    fn remove_chart(&self, descriptor: &Path, env: &Environment) -> Result<(), RuntimeError> {
        self.record(
            Call::Remove {
                descriptor: descriptor.to_path_buf(),
            },
            env,
        )
    }

    fn delete_namespace(&self, namespace: &str, env: &Environment) -> Result<(), RuntimeError> {
        self.record(
            Call::DeleteNamespace {
                namespace: namespace.to_owned(),
            },
            env,
        )
    }
}
