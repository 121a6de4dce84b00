//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use citemake_core::config::{CitemakeConfig, ConfigOverrides, PROJECT_CONFIG_FILE, load_config};
use citemake_data::{FileSource, Pipeline, Stage};
use std::path::Path;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    project: &Path,
    config_path: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, project, config_path),
        Commands::Init => handle_init(open_pipeline(project, config_path)?, quiet),
        Commands::Data => handle_data(open_pipeline(project, config_path)?, quiet).await,
        Commands::Download { url, from_file } => {
            let overrides = ConfigOverrides {
                source_url: url,
                ..Default::default()
            };
            let config = load(project, config_path, &overrides)?;
            handle_download(Pipeline::new(config, project), from_file.as_deref(), quiet).await
        }
        Commands::Sample {
            frac,
            clean,
            input,
            seed,
        } => {
            let overrides = ConfigOverrides {
                sample_seed: seed,
                ..Default::default()
            };
            let config = load(project, config_path, &overrides)?;
            let frac = frac.unwrap_or(config.sample.default_frac);
            handle_sample(
                Pipeline::new(config, project),
                input.as_deref(),
                frac,
                clean,
                quiet,
            )
        }
        Commands::Clean { file } => handle_clean(open_pipeline(project, config_path)?, &file, quiet),
        Commands::Datasets { stage, name, prune } => {
            let pipeline = open_pipeline(project, config_path)?;
            if prune {
                let pruned = pipeline.prune_manifest()?;
                if !quiet {
                    println!("Pruned {} manifest entries", pruned.len());
                }
            }
            match name {
                Some(name) => handle_dataset_show(pipeline, &name),
                None => {
                    let stage = stage.map(|s| s.parse::<Stage>()).transpose()?;
                    handle_datasets(pipeline, stage)
                }
            }
        }
    }
}

fn load(
    project: &Path,
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<CitemakeConfig> {
    let config = load_config(Some(project), config_path, overrides)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    tracing::debug!(project = %project.display(), source = %config.source.url, "Loaded configuration");
    Ok(config)
}

fn open_pipeline(project: &Path, config_path: Option<&Path>) -> anyhow::Result<Pipeline> {
    let config = load(project, config_path, &ConfigOverrides::default())?;
    Ok(Pipeline::new(config, project))
}

fn handle_config(
    action: ConfigAction,
    project: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            std::fs::create_dir_all(project)?;
            let config_path = project.join(PROJECT_CONFIG_FILE);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = toml::to_string_pretty(&CitemakeConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(Some(project), config_path, &ConfigOverrides::default())
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

fn handle_init(pipeline: Pipeline, quiet: bool) -> anyhow::Result<()> {
    let report = pipeline.init()?;
    if quiet {
        return Ok(());
    }
    if report.is_noop() {
        println!("Project layout already in place at {}", pipeline.project_dir().display());
        return Ok(());
    }
    for dir in &report.created_dirs {
        println!("Created {}", dir.display());
    }
    if report.created_env_file {
        println!("Created {}", pipeline.env_file().display());
    }
    Ok(())
}

async fn handle_data(pipeline: Pipeline, quiet: bool) -> anyhow::Result<()> {
    let run = pipeline.run_data().await?;
    if !quiet {
        println!("Raw:       {} ({} bytes)", run.download.path.display(), run.download.bytes);
        println!(
            "Sample:    {} ({} of {} rows)",
            run.sample.path.display(),
            run.sample.rows_kept,
            run.sample.rows_read
        );
        println!(
            "Processed: {} ({} rows)",
            run.clean.path.display(),
            run.clean.report.rows_out
        );
    }
    Ok(())
}

async fn handle_download(
    pipeline: Pipeline,
    from_file: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    let outcome = match from_file {
        Some(path) => pipeline.download_from(&FileSource::new(path)).await?,
        None => pipeline.run_download().await?,
    };
    if !quiet {
        println!(
            "Downloaded {} bytes to {}",
            outcome.bytes,
            outcome.path.display()
        );
    }
    Ok(())
}

fn handle_sample(
    pipeline: Pipeline,
    input: Option<&Path>,
    frac: f64,
    clean: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let run = pipeline.run_sample(input, frac, clean)?;
    if quiet {
        return Ok(());
    }
    println!(
        "Sample:    {} ({} of {} rows)",
        run.sample.path.display(),
        run.sample.rows_kept,
        run.sample.rows_read
    );
    if let Some(cleaned) = run.clean {
        println!(
            "Processed: {} ({} rows)",
            cleaned.path.display(),
            cleaned.report.rows_out
        );
    }
    Ok(())
}

fn handle_clean(pipeline: Pipeline, file: &Path, quiet: bool) -> anyhow::Result<()> {
    let outcome = pipeline.run_clean(file)?;
    if !quiet {
        let r = &outcome.report;
        println!("Processed: {}", outcome.path.display());
        println!(
            "  rows {} -> {} (dropped {}), makes normalized {}, codes swapped {}, descriptions fixed {}",
            r.rows_in,
            r.rows_out,
            r.rows_dropped,
            r.makes_normalized,
            r.codes_swapped,
            r.descriptions_canonicalized
        );
    }
    Ok(())
}

fn handle_datasets(pipeline: Pipeline, stage: Option<Stage>) -> anyhow::Result<()> {
    let registry = pipeline.registry()?;
    let mut entries: Vec<_> = registry
        .list()
        .iter()
        .filter(|e| stage.is_none_or(|s| e.stage == s))
        .collect();
    if entries.is_empty() {
        println!("No datasets recorded in {}", pipeline.manifest_path().display());
        return Ok(());
    }
    entries.sort_by_key(|e| e.created_at);

    println!(
        "{:<10} {:<40} {:>10} {:<12} {}",
        "STAGE", "NAME", "ROWS", "HASH", "CREATED"
    );
    for entry in entries {
        let rows = entry
            .row_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<40} {:>10} {:<12} {}",
            entry.stage,
            entry.name,
            rows,
            &entry.hash[..entry.hash.len().min(12)],
            entry.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn handle_dataset_show(pipeline: Pipeline, name: &str) -> anyhow::Result<()> {
    let registry = pipeline.registry()?;
    let entry = registry
        .find_by_name(name)
        .ok_or_else(|| anyhow::anyhow!("No dataset named '{}' in the manifest", name))?;

    println!("Name:     {}", entry.name);
    println!("Id:       {}", entry.id);
    println!("Stage:    {}", entry.stage);
    println!("Path:     {}", entry.path.display());
    println!("SHA-256:  {}", entry.hash);
    if let Some(rows) = entry.row_count {
        println!("Rows:     {}", rows);
    }
    if let Some(parent) = entry.parent.as_deref().and_then(|id| registry.find(id)) {
        println!("Parent:   {} ({})", parent.name, parent.id);
    }
    println!("Created:  {}", entry.created_at.to_rfc3339());
    println!("Lineage:  {}", entry.lineage.step_names().join(" -> "));
    if !entry.lineage.verify_integrity() {
        println!("WARNING: lineage hash chain does not verify");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sample_flags() {
        let cli = Cli::try_parse_from([
            "citemake", "-C", "/proj", "sample", "--frac", "0.25", "--clean", "--seed", "9",
        ])
        .unwrap();
        assert_eq!(cli.project, std::path::PathBuf::from("/proj"));
        match cli.command {
            Commands::Sample {
                frac,
                clean,
                input,
                seed,
            } => {
                assert_eq!(frac, Some(0.25));
                assert!(clean);
                assert!(input.is_none());
                assert_eq!(seed, Some(9));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_download_url_and_file_conflict() {
        let result = Cli::try_parse_from([
            "citemake",
            "download",
            "--url",
            "http://x",
            "--from-file",
            "a.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["citemake"]).is_err());
    }

    #[tokio::test]
    async fn test_init_creates_layout() {
        let dir = TempDir::new().unwrap();
        handle_command(Commands::Init, dir.path(), None, true)
            .await
            .unwrap();
        assert!(dir.path().join("data/raw/.gitkeep").exists());
        assert!(dir.path().join(".env").exists());
    }

    #[tokio::test]
    async fn test_config_init_writes_loadable_file() {
        let dir = TempDir::new().unwrap();
        handle_command(
            Commands::Config {
                action: ConfigAction::Init,
            },
            dir.path(),
            None,
            true,
        )
        .await
        .unwrap();

        let path = dir.path().join(PROJECT_CONFIG_FILE);
        assert!(path.exists());
        let config = load_config(Some(dir.path()), None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.sample.default_frac, 0.1);
    }

    #[tokio::test]
    async fn test_download_from_file_then_sample_and_clean() {
        let dir = TempDir::new().unwrap();
        let export = dir.path().join("export.csv");
        std::fs::write(
            &export,
            "Make,Violation code,Violation Description\nTOYOTA,000,8069BS\nHOND,8069A,x\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("references")).unwrap();
        std::fs::write(
            dir.path().join("references/make.csv"),
            "make,alias\nTOYT,TOYOTA\n",
        )
        .unwrap();

        handle_command(
            Commands::Download {
                url: None,
                from_file: Some(export),
            },
            dir.path(),
            None,
            true,
        )
        .await
        .unwrap();
        handle_command(
            Commands::Sample {
                frac: Some(1.0),
                clean: true,
                input: None,
                seed: None,
            },
            dir.path(),
            None,
            true,
        )
        .await
        .unwrap();

        let processed: Vec<_> = std::fs::read_dir(dir.path().join("data/processed"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with("_processed_10samp.csv"))
            .collect();
        assert_eq!(processed.len(), 1);

        handle_command(
            Commands::Datasets {
                stage: Some("processed".into()),
                name: None,
                prune: false,
            },
            dir.path(),
            None,
            true,
        )
        .await
        .unwrap();

        let raw_name = std::fs::read_dir(dir.path().join("data/raw"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .find(|n| n.ends_with("_raw.csv"))
            .unwrap();
        handle_command(
            Commands::Datasets {
                stage: None,
                name: Some(raw_name.trim_end_matches(".csv").to_string()),
                prune: false,
            },
            dir.path(),
            None,
            true,
        )
        .await
        .unwrap();

        std::fs::remove_file(dir.path().join("data/processed").join(&processed[0])).unwrap();
        handle_command(
            Commands::Datasets {
                stage: None,
                name: None,
                prune: true,
            },
            dir.path(),
            None,
            true,
        )
        .await
        .unwrap();
        let pipeline = Pipeline::new(CitemakeConfig::default(), dir.path());
        assert_eq!(pipeline.registry().unwrap().list().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_dataset_name_is_error() {
        let dir = TempDir::new().unwrap();
        let err = handle_command(
            Commands::Datasets {
                stage: None,
                name: Some("nope".into()),
                prune: false,
            },
            dir.path(),
            None,
            true,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("No dataset named"));
    }

    #[tokio::test]
    async fn test_unknown_stage_is_error() {
        let dir = TempDir::new().unwrap();
        let err = handle_command(
            Commands::Datasets {
                stage: Some("cooked".into()),
                name: None,
                prune: false,
            },
            dir.path(),
            None,
            true,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unknown stage"));
    }
}
