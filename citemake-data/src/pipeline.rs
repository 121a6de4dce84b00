//! End-to-end orchestration: download → sample → clean, with every output
//! registered in the dataset manifest.

use crate::aliases::{MakeAliases, ViolationTable};
use crate::clean::{CleanOutcome, clean};
use crate::lineage::{DataLineage, PipelineStep, StepRecord};
use crate::manifest::{DatasetEntry, DatasetRegistry, Stage, StageReport};
use crate::sample::{SampleOptions, SampleOutcome, create_sample, validate_frac};
use crate::source::{DownloadOutcome, HttpSource, RawSource, download_raw};
use citemake_core::config::CitemakeConfig;
use citemake_core::env_file::{RAW_DATA_FILEPATH, get_key};
use citemake_core::error::{CitemakeError, Result};
use citemake_core::layout::{LayoutReport, ensure_layout};
use std::path::{Path, PathBuf};

/// Outputs of a `sample` run.
#[derive(Debug, Clone)]
pub struct SampleRun {
    pub sample: SampleOutcome,
    pub clean: Option<CleanOutcome>,
}

/// Outputs of a full `data` run.
#[derive(Debug, Clone)]
pub struct DataRun {
    pub download: DownloadOutcome,
    pub sample: SampleOutcome,
    pub clean: CleanOutcome,
}

/// The dataset pipeline for one project directory.
pub struct Pipeline {
    config: CitemakeConfig,
    project_dir: PathBuf,
}

impl Pipeline {
    pub fn new(config: CitemakeConfig, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            project_dir: project_dir.into(),
        }
    }

    pub fn config(&self) -> &CitemakeConfig {
        &self.config
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Resolve a configured or user-supplied path against the project
    /// directory. The result is absolute even for a relative project dir.
    fn resolve(&self, path: &Path) -> PathBuf {
        let path = self.config.paths.resolve(&self.project_dir, path);
        std::path::absolute(&path).unwrap_or(path)
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.raw_dir)
    }

    pub fn interim_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.interim_dir)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.processed_dir)
    }

    pub fn env_file(&self) -> PathBuf {
        self.resolve(&self.config.paths.env_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.config.paths.manifest)
    }

    /// Create the data directories and `.env`.
    pub fn init(&self) -> Result<LayoutReport> {
        ensure_layout(&self.project_dir, &self.config.paths)
    }

    pub fn registry(&self) -> Result<DatasetRegistry> {
        DatasetRegistry::load(&self.manifest_path())
    }

    /// Drop manifest entries whose file no longer exists.
    pub fn prune_manifest(&self) -> Result<Vec<DatasetEntry>> {
        let path = self.manifest_path();
        let mut registry = DatasetRegistry::load(&path)?;
        let missing: Vec<DatasetEntry> = registry
            .list()
            .iter()
            .filter(|e| !e.path.exists())
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(missing);
        }
        for entry in &missing {
            registry.remove(&entry.id);
            tracing::info!(name = %entry.name, path = %entry.path.display(), "Pruned manifest entry");
        }
        registry.save(&path)?;
        Ok(missing)
    }

    fn register(&self, entry: DatasetEntry) -> Result<()> {
        let path = self.manifest_path();
        let mut registry = DatasetRegistry::load(&path)?;
        registry.add(entry);
        registry.save(&path)
    }

    /// Load the make alias table and the violation table (built-in plus overrides).
    pub fn load_tables(&self) -> Result<(MakeAliases, ViolationTable)> {
        let makes = MakeAliases::load(&self.resolve(&self.config.clean.make_aliases))?;
        let mut violations = ViolationTable::builtin();
        if let Some(extra) = &self.config.clean.violation_aliases {
            let added = violations.extend_from_csv(&self.resolve(extra))?;
            tracing::debug!(added, "Extended violation table");
        }
        Ok((makes, violations))
    }

    /// Download the raw export from the configured URL.
    pub async fn run_download(&self) -> Result<DownloadOutcome> {
        let source = HttpSource::from_config(&self.config.source)?;
        self.download_from(&source).await
    }

    /// Download the raw export from `source` and register it.
    pub async fn download_from(&self, source: &dyn RawSource) -> Result<DownloadOutcome> {
        self.init()?;
        let env_file = self.env_file();
        let outcome = download_raw(source, &self.raw_dir(), Some(&env_file)).await?;

        let id = uuid::Uuid::new_v4().to_string();
        let mut lineage = DataLineage::new(&id, &outcome.source.location);
        lineage.add_step(StepRecord::new(
            PipelineStep::Download {
                location: outcome.source.location.clone(),
            },
            None,
            None,
        ));
        let entry = DatasetEntry::for_file(id, Stage::Raw, &outcome.path, lineage, None)?
            .with_report(StageReport::Download {
                bytes: outcome.bytes,
            });
        self.register(entry)?;
        Ok(outcome)
    }

    /// Locate the raw file to sample when none is named explicitly.
    ///
    /// Looks at `RAW_DATA_FILEPATH` in the project `.env`, then in the process
    /// environment, then at the newest raw entry of the manifest.
    pub fn resolve_raw_target(&self) -> Result<PathBuf> {
        if let Some(path) = get_key(&self.env_file(), RAW_DATA_FILEPATH)? {
            if !path.is_empty() {
                return Ok(self.resolve(Path::new(&path)));
            }
        }
        if let Ok(path) = std::env::var(RAW_DATA_FILEPATH) {
            if !path.is_empty() {
                return Ok(self.resolve(Path::new(&path)));
            }
        }
        if let Some(entry) = self.registry()?.latest_by_stage(Stage::Raw) {
            return Ok(entry.path.clone());
        }
        Err(CitemakeError::not_found(format!(
            "no raw dataset: {RAW_DATA_FILEPATH} is unset and the manifest has no raw entry; run `citemake download` first"
        )))
    }

    /// Sample `target` (or the resolved raw file) into the interim directory
    /// and, when `then_clean` is set, clean the sample into the processed directory.
    pub fn run_sample(
        &self,
        target: Option<&Path>,
        frac: f64,
        then_clean: bool,
    ) -> Result<SampleRun> {
        validate_frac(frac)?;
        let target = match target {
            Some(t) => self.resolve(t),
            None => self.resolve_raw_target()?,
        };
        // Fail on a missing alias table before spending time on the sample.
        let tables = if then_clean {
            Some(self.load_tables()?)
        } else {
            None
        };

        let sample = self.sample_file(&target, frac)?;
        let cleaned = match tables {
            Some((makes, violations)) => Some(self.clean_file(&sample.path, &makes, &violations)?),
            None => None,
        };
        Ok(SampleRun {
            sample,
            clean: cleaned,
        })
    }

    /// Clean an existing sampled file into the processed directory.
    pub fn run_clean(&self, target: &Path) -> Result<CleanOutcome> {
        let (makes, violations) = self.load_tables()?;
        self.clean_file(&self.resolve(target), &makes, &violations)
    }

    /// Download, sample at the configured default fraction, and clean.
    pub async fn run_data(&self) -> Result<DataRun> {
        let source = HttpSource::from_config(&self.config.source)?;
        self.run_data_from(&source).await
    }

    /// [`Pipeline::run_data`] against an arbitrary source.
    pub async fn run_data_from(&self, source: &dyn RawSource) -> Result<DataRun> {
        let frac = self.config.sample.default_frac;
        validate_frac(frac)?;
        let (makes, violations) = self.load_tables()?;

        let download = self.download_from(source).await?;
        let sample = self.sample_file(&download.path, frac)?;
        let clean = self.clean_file(&sample.path, &makes, &violations)?;
        Ok(DataRun {
            download,
            sample,
            clean,
        })
    }

    fn sample_file(&self, target: &Path, frac: f64) -> Result<SampleOutcome> {
        let options = SampleOptions::new(frac).with_seed(self.config.sample.seed);
        let outcome = create_sample(target, &self.interim_dir(), &options)?;

        let path = self.manifest_path();
        let mut registry = DatasetRegistry::load(&path)?;
        let parent = registry.find_by_path(target).cloned();
        if let Some(parent) = &parent {
            if parent.row_count.is_none() {
                registry.set_row_count(&parent.id, outcome.rows_read);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut lineage = match &parent {
            Some(p) => DataLineage::derive(&p.lineage, &id),
            None => DataLineage::new(&id, &target.display().to_string()),
        };
        lineage.add_step(StepRecord::new(
            PipelineStep::Sample {
                input: target.to_path_buf(),
                frac,
                seed: options.seed,
            },
            Some(outcome.rows_read),
            Some(outcome.rows_kept),
        ));
        let entry = DatasetEntry::for_file(
            id,
            Stage::Interim,
            &outcome.path,
            lineage,
            Some(outcome.rows_kept),
        )?
        .with_parent(parent.map(|p| p.id))
        .with_report(StageReport::Sample {
            rows_read: outcome.rows_read,
            rows_kept: outcome.rows_kept,
        });
        registry.add(entry);
        registry.save(&path)?;
        Ok(outcome)
    }

    fn clean_file(
        &self,
        target: &Path,
        makes: &MakeAliases,
        violations: &ViolationTable,
    ) -> Result<CleanOutcome> {
        let outcome = clean(target, &self.processed_dir(), makes, violations)?;

        let parent = self.registry()?.find_by_path(target).cloned();
        let id = uuid::Uuid::new_v4().to_string();
        let mut lineage = match &parent {
            Some(p) => DataLineage::derive(&p.lineage, &id),
            None => DataLineage::new(&id, &target.display().to_string()),
        };
        lineage.add_step(StepRecord::new(
            PipelineStep::Clean {
                input: target.to_path_buf(),
                make_aliases: makes.len(),
                violation_codes: violations.len(),
            },
            Some(outcome.report.rows_in),
            Some(outcome.report.rows_out),
        ));
        let entry = DatasetEntry::for_file(
            id,
            Stage::Processed,
            &outcome.path,
            lineage,
            Some(outcome.report.rows_out),
        )?
        .with_parent(parent.map(|p| p.id))
        .with_report(StageReport::Clean(outcome.report.clone()));
        self.register(entry)?;
        Ok(outcome)
    }
}
