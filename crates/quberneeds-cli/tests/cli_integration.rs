//! CLI subprocess integration tests.
//!
//! These tests invoke the `quberneeds` binary against fake `helm`,
//! `helmfile`, and `kubectl` scripts placed first on `PATH`. Each script
//! appends its arguments (and the variables the workflow sets) to a log file
//! so the tests can check exactly which commands ran, in which order, and
//! with which environment.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const HELM: &str = r#"#!/bin/sh
echo "helm $*" >> "$QN_LOG"
if [ "$1" = "fetch" ]; then
  if [ -n "$QN_FETCH_EXIT" ]; then exit "$QN_FETCH_EXIT"; fi
  chart="${2#*/}"
  mkdir -p "$5/$chart"
  : > "$5/$chart/helmfile.yaml"
  if [ -n "$QN_EXPORT_DB" ]; then
    mkdir -p "$5/$chart/exports"
    printf '%s' "$QN_EXPORT_DB" > "$5/$chart/exports/db.txt"
  fi
fi
exit 0
"#;

const HELMFILE: &str = r#"#!/bin/sh
echo "helmfile $* | X=$X DB=$DB" >> "$QN_LOG"
if [ -n "$QN_INTERRUPT" ]; then
  kill -INT "$PPID"
  sleep 1
fi
case "$*" in
  *--dry-run*) exit "${QN_DRY_RUN_EXIT:-0}" ;;
esac
exit 0
"#;

const KUBECTL: &str = r#"#!/bin/sh
echo "kubectl $*" >> "$QN_LOG"
exit 0
"#;

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::create_dir_all(dir.path().join("tmp")).unwrap();
        std::fs::create_dir_all(dir.path().join("home")).unwrap();
        for (name, body) in [("helm", HELM), ("helmfile", HELMFILE), ("kubectl", KUBECTL)] {
            let path = bin.join(name);
            std::fs::write(&path, body).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn log_path(&self) -> PathBuf {
        self.path().join("calls.log")
    }

    fn tmp(&self) -> PathBuf {
        self.path().join("tmp")
    }

    fn write_manifest(&self, content: &str) -> PathBuf {
        let path = self.path().join("deploy.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_quberneeds"));
        let path = format!(
            "{}:{}",
            self.path().join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        cmd.env("PATH", path)
            .env("HOME", self.path().join("home"))
            .env("TMPDIR", self.tmp())
            .env("QN_LOG", self.log_path())
            .env("QUBERNEEDS_SKIP_PREREQS", "1")
            .env_remove("X")
            .env_remove("DB")
            .env_remove("TENANT_ID");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().unwrap()
    }

    fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    fn workdirs(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.tmp())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with("quberneeds-"))
            })
            .collect()
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn cli_version_exits_zero() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--version"]);
    assert!(output.status.success(), "quberneeds --version must exit 0");
    assert!(String::from_utf8_lossy(&output.stdout).contains("quberneeds"));
}

#[test]
fn cli_help_lists_modes() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("install"));
    assert!(stdout.contains("delete"));
}

#[test]
fn cli_missing_arguments_is_usage_error() {
    let sandbox = Sandbox::new();
    assert_eq!(sandbox.run(&[]).status.code(), Some(1));
    assert_eq!(sandbox.run(&["install"]).status.code(), Some(1));
    assert!(sandbox.calls().is_empty());
}

#[test]
fn cli_unknown_mode_is_usage_error() {
    let sandbox = Sandbox::new();
    let manifest = sandbox.write_manifest(r#"{"charts":{"repo/a":""},"env":{}}"#);
    let output = sandbox.run(&["upgrade", &manifest.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(sandbox.calls().is_empty());
}

#[test]
fn cli_missing_manifest_fails_before_any_command() {
    let sandbox = Sandbox::new();
    let missing = sandbox.path().join("nope.json");
    let output = sandbox.run(&["install", &missing.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to read manifest"));
    assert!(sandbox.calls().is_empty());
}

#[test]
fn cli_malformed_manifest_fails() {
    let sandbox = Sandbox::new();
    let manifest = sandbox.write_manifest(r#"{"env":{"X":"1"}}"#);
    let output = sandbox.run(&["install", &manifest.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("charts"));
    assert!(sandbox.calls().is_empty());
}

#[test]
fn cli_install_single_env() {
    let sandbox = Sandbox::new();
    let manifest = sandbox.write_manifest(r#"{"charts":{"repo/a":""},"env":{"X":"1"}}"#);

    let output = sandbox.run(&["install", &manifest.to_string_lossy()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let calls = sandbox.calls();
    assert_eq!(calls.len(), 4, "{calls:#?}");
    assert_eq!(calls[0], "helm repo update");
    assert!(calls[1].starts_with("helm fetch repo/a --untar --untardir "));
    assert!(!calls[1].contains("--version"));
    assert!(calls[2].contains("/a/helmfile.yaml charts --args --dry-run | X=1"));
    assert!(calls[3].ends_with("/a/helmfile.yaml charts | X=1 DB="));
    assert!(sandbox.workdirs().is_empty(), "working directory must be removed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fetching chart repo/a"));
    assert!(stdout.contains("Performing dry-run for: {X=1}"));
    assert!(stdout.contains("Deploying for: {X=1}"));
}

#[test]
fn cli_install_two_envs_pinned_version() {
    let sandbox = Sandbox::new();
    let manifest = sandbox
        .write_manifest(r#"{"charts":{"repo/a":"2.0"},"envs":[{"X":"1"},{"X":"2"}]}"#);

    let output = sandbox.run(&["install", &manifest.to_string_lossy()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let calls = sandbox.calls();
    let fetches: Vec<_> = calls.iter().filter(|c| c.starts_with("helm fetch")).collect();
    assert_eq!(fetches.len(), 1);
    assert!(fetches[0].ends_with("--version 2.0"));

    let helmfile: Vec<_> = calls.iter().filter(|c| c.starts_with("helmfile")).collect();
    assert_eq!(helmfile.len(), 4);
    assert!(helmfile[0].contains("--dry-run | X=1"));
    assert!(helmfile[1].ends_with("charts | X=1 DB="));
    assert!(helmfile[2].contains("--dry-run | X=2"));
    assert!(helmfile[3].ends_with("charts | X=2 DB="));
    assert!(sandbox.workdirs().is_empty());
}

#[test]
fn cli_delete_tears_down_namespace_after_charts() {
    let sandbox = Sandbox::new();
    let manifest = sandbox.write_manifest(
        r#"{"charts":{"repo/a":"2.0"},"envs":[{"X":"1","TENANT_ID":"acme"},{"X":"2","TENANT_ID":"acme"}]}"#,
    );

    let output = sandbox.run(&["delete", &manifest.to_string_lossy()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let calls: Vec<_> = sandbox
        .calls()
        .into_iter()
        .filter(|c| !c.starts_with("helm "))
        .collect();
    assert_eq!(calls.len(), 4, "{calls:#?}");
    assert!(calls[0].contains("/a/helmfile.yaml delete --purge | X=1"));
    assert_eq!(calls[1], "kubectl delete namespace acme");
    assert!(calls[2].contains("/a/helmfile.yaml delete --purge | X=2"));
    assert_eq!(calls[3], "kubectl delete namespace acme");
    assert!(sandbox.workdirs().is_empty());
}

#[test]
fn cli_delete_without_tenant_skips_namespace() {
    let sandbox = Sandbox::new();
    let manifest = sandbox.write_manifest(r#"{"charts":{"repo/a":""},"env":{"X":"1"}}"#);

    let output = sandbox.run(&["delete", &manifest.to_string_lossy()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!sandbox.calls().iter().any(|c| c.starts_with("kubectl")));
}

#[test]
fn cli_fetch_failure_propagates_exit_code() {
    let sandbox = Sandbox::new();
    let manifest = sandbox.write_manifest(r#"{"charts":{"repo/a":""},"env":{"X":"1"}}"#);

    let output = sandbox
        .command()
        .env("QN_FETCH_EXIT", "3")
        .args(["install", &manifest.to_string_lossy()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let calls = sandbox.calls();
    assert_eq!(calls.len(), 2, "{calls:#?}");
    assert!(!calls.iter().any(|c| c.starts_with("helmfile")));
    assert_eq!(
        sandbox.workdirs().len(),
        1,
        "working directory must be left for inspection"
    );
}

#[test]
fn cli_dry_run_failure_blocks_deploy() {
    let sandbox = Sandbox::new();
    let manifest =
        sandbox.write_manifest(r#"{"charts":{"repo/a":"","repo/b":""},"env":{"X":"1"}}"#);

    let output = sandbox
        .command()
        .env("QN_DRY_RUN_EXIT", "4")
        .args(["install", &manifest.to_string_lossy()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    let helmfile: Vec<_> = sandbox
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("helmfile"))
        .collect();
    assert_eq!(helmfile.len(), 1);
    assert!(helmfile[0].contains("--dry-run"));
    assert_eq!(sandbox.workdirs().len(), 2);
}

#[test]
fn cli_interrupt_stops_before_next_command() {
    let sandbox = Sandbox::new();
    let manifest =
        sandbox.write_manifest(r#"{"charts":{"repo/a":"","repo/b":""},"env":{"X":"1"}}"#);

    let output = sandbox
        .command()
        .env("QN_INTERRUPT", "1")
        .args(["install", &manifest.to_string_lossy()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(130), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("interrupted"));
    let helmfile: Vec<_> = sandbox
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("helmfile"))
        .collect();
    assert_eq!(helmfile.len(), 1);
    assert!(helmfile[0].contains("--dry-run"));
    assert_eq!(sandbox.workdirs().len(), 2);
}

#[test]
fn cli_exports_reach_release_engine() {
    let sandbox = Sandbox::new();
    let manifest =
        sandbox.write_manifest(r#"{"charts":{"repo/a":"","repo/b":""},"env":{"X":"1"}}"#);

    let output = sandbox
        .command()
        .env("QN_EXPORT_DB", "host1")
        .args(["install", &manifest.to_string_lossy()])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let helmfile: Vec<_> = sandbox
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("helmfile"))
        .collect();
    assert_eq!(helmfile.len(), 4);
    for call in &helmfile {
        assert!(call.ends_with("DB=host1,host1"), "{call}");
    }
}

#[test]
fn cli_missing_prerequisites_fail_early() {
    let sandbox = Sandbox::new();
    let manifest = sandbox.write_manifest(r#"{"charts":{"repo/a":""},"env":{}}"#);
    let config = sandbox.path().join("toolchain.json");
    std::fs::write(&config, r#"{"helmfile": "/nonexistent/helmfile"}"#).unwrap();

    let output = sandbox
        .command()
        .env_remove("QUBERNEEDS_SKIP_PREREQS")
        .args([
            "--config",
            &config.to_string_lossy(),
            "install",
            &manifest.to_string_lossy(),
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("missing prerequisites"));
    assert!(sandbox.calls().is_empty());
}

#[test]
fn cli_mock_toolchain_spawns_nothing() {
    let sandbox = Sandbox::new();
    let manifest = sandbox.write_manifest(r#"{"charts":{"repo/a":""},"env":{"X":"1"}}"#);

    let output = sandbox.run(&["--toolchain", "mock", "install", &manifest.to_string_lossy()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(sandbox.calls().is_empty());
    assert!(sandbox.workdirs().is_empty());
}

#[test]
fn cli_completions_generate() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("quberneeds"));
}
