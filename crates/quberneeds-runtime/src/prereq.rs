use crate::config::ToolchainConfig;
use std::fmt;
use std::path::Path;
use std::process::Command;

/// A missing prerequisite with actionable install instructions.
#[derive(Debug)]
pub struct MissingPrereq {
    pub name: String,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

impl fmt::Display for MissingPrereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: {} (install: {})",
            self.name, self.purpose, self.install_hint
        )
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn command_exists(name: &str) -> bool {
    if name.contains('/') {
        return is_executable(Path::new(name));
    }
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check the binaries the configured toolchain needs. `kubectl` is only
/// required when namespaces may be torn down.
/// Returns a list of missing items. Empty list means all prerequisites are met.
pub fn check_prereqs(config: &ToolchainConfig, needs_kubectl: bool) -> Vec<MissingPrereq> {
    let mut missing = Vec::new();

    if !command_exists(&config.helm) {
        missing.push(MissingPrereq {
            name: config.helm.clone(),
            purpose: "repository refresh and chart fetching",
            install_hint: "https://helm.sh/docs/intro/install/",
        });
    }

    if !command_exists(&config.helmfile) {
        missing.push(MissingPrereq {
            name: config.helmfile.clone(),
            purpose: "applying and removing chart releases",
            install_hint: "https://github.com/helmfile/helmfile#installation",
        });
    }

    if needs_kubectl && !command_exists(&config.kubectl) {
        missing.push(MissingPrereq {
            name: config.kubectl.clone(),
            purpose: "namespace teardown",
            install_hint: "https://kubernetes.io/docs/tasks/tools/",
        });
    }

    missing
}

/// Format a list of missing prerequisites into a user-friendly error message.
pub fn format_missing(missing: &[MissingPrereq]) -> String {
    use std::fmt::Write as _;
    let mut msg = String::from("missing prerequisites:\n");
    for m in missing {
        let _ = writeln!(msg, "{m}");
    }
    msg.push_str("\nquberneeds drives these tools to deploy charts.");
    msg
}
