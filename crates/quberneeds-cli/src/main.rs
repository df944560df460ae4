mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{Settings, EXIT_SUCCESS, EXIT_USAGE};
use quberneeds_core::{install_signal_handler, Mode};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "quberneeds",
    version,
    about = "Install or tear down a manifest of helm charts across environments"
)]
struct Cli {
    /// Toolchain to drive: `helm` runs helm/helmfile/kubectl, `mock` only records.
    #[arg(long, default_value = "helm", global = true)]
    toolchain: String,

    /// Toolchain config file (default: ~/.config/quberneeds/toolchain.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every chart, then dry-run and deploy it for each environment.
    Install {
        /// Path to the manifest (JSON, or TOML with a .toml extension).
        manifest: PathBuf,
    },
    /// Delete every chart for each environment, and its TENANT_ID namespace.
    Delete {
        /// Path to the manifest (JSON, or TOML with a .toml extension).
        manifest: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("QUBERNEEDS_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    install_signal_handler();

    let settings = Settings {
        toolchain: cli.toolchain,
        config: cli.config,
    };

    let result = match cli.command {
        Commands::Install { manifest } => {
            commands::deploy::run(&settings, &manifest, Mode::Install)
        }
        Commands::Delete { manifest } => {
            commands::deploy::run(&settings, &manifest, Mode::Delete)
        }
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {}", err.message);
            ExitCode::from(err.code)
        }
    }
}
