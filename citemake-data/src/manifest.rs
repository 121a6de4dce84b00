//! Dataset manifest: every file the pipeline produced, with hash and lineage.

use crate::clean::CleanReport;
use crate::lineage::DataLineage;
use chrono::{DateTime, Utc};
use citemake_core::error::{CitemakeError, Result};
use citemake_core::persistence::{atomic_write_json, load_json};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where a dataset sits in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Raw,
    Interim,
    External,
    Processed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Interim => "interim",
            Self::External => "external",
            Self::Processed => "processed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CitemakeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "interim" => Ok(Self::Interim),
            "external" => Ok(Self::External),
            "processed" => Ok(Self::Processed),
            other => Err(CitemakeError::invalid_input(format!(
                "unknown stage {other:?} (expected raw, interim, external or processed)"
            ))),
        }
    }
}

/// Per-stage statistics stored alongside a manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageReport {
    Download { bytes: u64 },
    Sample { rows_read: usize, rows_kept: usize },
    Clean(CleanReport),
}

/// A registered dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub id: String,
    pub name: String,
    pub stage: Stage,
    pub path: PathBuf,
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub lineage: DataLineage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<StageReport>,
    pub created_at: DateTime<Utc>,
}

impl DatasetEntry {
    /// Build an entry for a file on disk, hashing its contents.
    pub fn for_file(
        id: String,
        stage: Stage,
        path: &Path,
        lineage: DataLineage,
        row_count: Option<usize>,
    ) -> Result<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            id,
            name,
            stage,
            path: absolute_path(path),
            hash: hash_file(path)?,
            row_count,
            parent: None,
            lineage,
            report: None,
            created_at: Utc::now(),
        })
    }

    pub fn with_parent(mut self, parent: Option<String>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_report(mut self, report: StageReport) -> Self {
        self.report = Some(report);
        self
    }
}

/// Registry of all produced datasets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetRegistry {
    pub datasets: Vec<DatasetEntry>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self {
            datasets: Vec::new(),
        }
    }

    /// Load the registry from a JSON file; a missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(load_json(path)?.unwrap_or_default())
    }

    /// Save the registry to a JSON file (atomic write).
    pub fn save(&self, path: &Path) -> Result<()> {
        atomic_write_json(path, self)?;
        Ok(())
    }

    /// Add an entry. An existing entry for the same path is replaced.
    pub fn add(&mut self, entry: DatasetEntry) {
        let path = absolute_path(&entry.path);
        self.datasets.retain(|d| absolute_path(&d.path) != path);
        self.datasets.push(entry);
    }

    pub fn find(&self, id: &str) -> Option<&DatasetEntry> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// Find a dataset by name, newest first.
    pub fn find_by_name(&self, name: &str) -> Option<&DatasetEntry> {
        self.datasets
            .iter()
            .filter(|d| d.name == name)
            .max_by_key(|d| d.created_at)
    }

    /// Find a dataset by file path. Relative paths are taken against the
    /// current directory before comparing.
    pub fn find_by_path(&self, path: &Path) -> Option<&DatasetEntry> {
        let path = absolute_path(path);
        self.datasets.iter().find(|d| absolute_path(&d.path) == path)
    }

    /// Most recently created dataset of a stage.
    pub fn latest_by_stage(&self, stage: Stage) -> Option<&DatasetEntry> {
        self.datasets
            .iter()
            .filter(|d| d.stage == stage)
            .max_by_key(|d| d.created_at)
    }

    pub fn by_stage(&self, stage: Stage) -> impl Iterator<Item = &DatasetEntry> {
        self.datasets.iter().filter(move |d| d.stage == stage)
    }

    pub fn list(&self) -> &[DatasetEntry] {
        &self.datasets
    }

    /// Fill in a row count learned after registration (raw files are only
    /// counted when they are first sampled).
    pub fn set_row_count(&mut self, id: &str, rows: usize) -> bool {
        match self.datasets.iter_mut().find(|d| d.id == id) {
            Some(entry) => {
                entry.row_count = Some(rows);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let len = self.datasets.len();
        self.datasets.retain(|d| d.id != id);
        self.datasets.len() < len
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// SHA-256 of a file, streamed in chunks.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
