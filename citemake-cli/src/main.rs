//! citemake CLI: download, sample and clean the LA parking-citation dataset.

mod commands;

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// citemake: prepare parking-citation data for car-make prediction
#[derive(Parser, Debug)]
#[command(name = "citemake", version, about, long_about = None)]
pub(crate) struct Cli {
    /// Project directory (holds data/, references/ and .env)
    #[arg(short = 'C', long, default_value = ".")]
    project: PathBuf,

    /// Configuration file path (replaces <project>/citemake.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Commands {
    /// Create the data directories and an empty .env
    Init,
    /// Download the raw dataset, sample it and clean the sample
    Data,
    /// Download the raw dataset into the raw data directory
    Download {
        /// Override the configured source URL
        #[arg(long)]
        url: Option<String>,
        /// Copy a local export instead of downloading
        #[arg(long, conflicts_with = "url")]
        from_file: Option<PathBuf>,
    },
    /// Sample the raw dataset into the interim directory
    Sample {
        /// Fraction of rows to keep, in (0, 1] (default from config, 0.1)
        #[arg(short, long)]
        frac: Option<f64>,
        /// Also clean the sample into the processed directory
        #[arg(long)]
        clean: bool,
        /// Raw file to sample (default: RAW_DATA_FILEPATH from .env)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Clean a sampled file into the processed directory
    Clean {
        /// Sampled CSV to clean
        file: PathBuf,
    },
    /// List datasets recorded in the manifest
    Datasets {
        /// Only show one stage (raw, interim, external, processed)
        #[arg(short, long)]
        stage: Option<String>,
        /// Show the newest dataset with this name
        #[arg(short, long, conflicts_with = "stage")]
        name: Option<String>,
        /// Drop entries whose file no longer exists
        #[arg(long)]
        prune: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Write a default citemake.toml into the project directory
    Init,
    /// Show the effective configuration
    Show,
}

/// Load the nearest `.env` at or above `project` into the process environment.
///
/// Returns the file found and the load result, or `None` when there is none.
fn load_project_env(project: &Path) -> Option<(PathBuf, Result<(), dotenvy::Error>)> {
    let env_file = citemake_core::env_file::find_env_file(project)?;
    let result = dotenvy::from_path(&env_file);
    Some((env_file, result))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `init` may target a directory that does not exist yet.
    let project = match cli.project.canonicalize() {
        Ok(p) => p,
        Err(_) => std::path::absolute(&cli.project)?,
    };

    // Load the project's .env (or the nearest one above it) so CITEMAKE_*
    // overrides and RUST_LOG apply before config and logging are set up.
    // A parse failure is reported once the subscriber is installed.
    let env_load = load_project_env(&project);

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "citemake", "citemake")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "citemake.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    if let Some((path, Err(e))) = &env_load {
        tracing::warn!(path = %path.display(), error = %e, "Could not load .env file");
    }

    commands::handle_command(cli.command, &project, cli.config.as_deref(), cli.quiet).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_project_env_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sub");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".env"), "CITEMAKE_TEST_BROKEN='a\\'b'\n").unwrap();

        let (path, result) = load_project_env(&nested).unwrap();
        assert_eq!(path, dir.path().join(".env"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_project_env_without_file() {
        let dir = TempDir::new().unwrap();
        // Only meaningful when no .env sits above the temp directory.
        if citemake_core::env_file::find_env_file(dir.path()).is_none() {
            assert!(load_project_env(dir.path()).is_none());
        }
    }
}
