//! Lineage of a produced dataset: which steps made it, from what.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// One step of the download → sample → clean chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineStep {
    Download {
        location: String,
    },
    Sample {
        input: PathBuf,
        frac: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
    Clean {
        input: PathBuf,
        make_aliases: usize,
        violation_codes: usize,
    },
}

impl PipelineStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Download { .. } => "download",
            Self::Sample { .. } => "sample",
            Self::Clean { .. } => "clean",
        }
    }
}

/// Record of a step applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: PipelineStep,
    pub applied_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_before: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_after: Option<usize>,
}

impl StepRecord {
    pub fn new(step: PipelineStep, rows_before: Option<usize>, rows_after: Option<usize>) -> Self {
        Self {
            step,
            applied_at: Utc::now(),
            rows_before,
            rows_after,
        }
    }
}

/// Full lineage record for a dataset, with a hash chain over its steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataLineage {
    pub dataset_id: String,
    pub source_location: String,
    pub steps: Vec<StepRecord>,
    pub created_at: DateTime<Utc>,
    pub hash_chain: Vec<String>,
}

impl DataLineage {
    pub fn new(dataset_id: &str, source_location: &str) -> Self {
        Self {
            dataset_id: dataset_id.to_string(),
            source_location: source_location.to_string(),
            steps: Vec::new(),
            created_at: Utc::now(),
            hash_chain: vec![initial_hash(dataset_id, source_location)],
        }
    }

    /// Continue a parent's lineage under a new dataset id.
    ///
    /// The parent's steps are carried over and the chain is rebuilt from the
    /// new id, so the child verifies on its own.
    pub fn derive(parent: &DataLineage, dataset_id: &str) -> Self {
        let mut lineage = Self::new(dataset_id, &parent.source_location);
        for record in &parent.steps {
            lineage.add_step(record.clone());
        }
        lineage
    }

    /// Add a step record and extend the hash chain.
    pub fn add_step(&mut self, record: StepRecord) {
        let prev_hash = self.hash_chain.last().cloned().unwrap_or_default();
        self.hash_chain.push(chain_hash(&prev_hash, &record.step));
        self.steps.push(record);
    }

    /// Names of the applied steps, oldest first.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|r| r.step.name()).collect()
    }

    /// Verify the integrity of the hash chain.
    pub fn verify_integrity(&self) -> bool {
        if self.hash_chain.len() != self.steps.len() + 1 {
            return false;
        }
        if self.hash_chain[0] != initial_hash(&self.dataset_id, &self.source_location) {
            return false;
        }
        self.steps
            .iter()
            .enumerate()
            .all(|(i, record)| self.hash_chain[i + 1] == chain_hash(&self.hash_chain[i], &record.step))
    }
}

fn initial_hash(dataset_id: &str, source_location: &str) -> String {
    compute_hash(&format!("{dataset_id}:{source_location}"))
}

fn chain_hash(prev: &str, step: &PipelineStep) -> String {
    let step_json = serde_json::to_string(step).unwrap_or_default();
    compute_hash(&format!("{prev}:{step_json}"))
}

fn compute_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn download() -> StepRecord {
        StepRecord::new(
            PipelineStep::Download {
                location: "https://example.org/rows.csv".into(),
            },
            None,
            None,
        )
    }

    #[test]
    fn test_lineage_creation() {
        let lineage = DataLineage::new("ds-001", "https://example.org/rows.csv");
        assert!(lineage.steps.is_empty());
        assert_eq!(lineage.hash_chain.len(), 1);
        assert!(lineage.verify_integrity());
    }

    #[test]
    fn test_lineage_with_steps() {
        let mut lineage = DataLineage::new("ds-001", "https://example.org/rows.csv");
        lineage.add_step(download());
        lineage.add_step(StepRecord::new(
            PipelineStep::Sample {
                input: "data/raw/2024-01-01_raw.csv".into(),
                frac: 0.1,
                seed: Some(7),
            },
            Some(100),
            Some(9),
        ));
        assert_eq!(lineage.step_names(), vec!["download", "sample"]);
        assert_eq!(lineage.hash_chain.len(), 3);
        assert!(lineage.verify_integrity());
    }

    #[test]
    fn test_tampered_lineage_fails() {
        let mut lineage = DataLineage::new("ds-001", "src");
        lineage.add_step(download());
        lineage.steps[0].step = PipelineStep::Download {
            location: "elsewhere".into(),
        };
        assert!(!lineage.verify_integrity());
    }

    #[test]
    fn test_derive_keeps_steps_and_verifies() {
        let mut parent = DataLineage::new("raw-1", "src");
        parent.add_step(download());

        let child = DataLineage::derive(&parent, "sample-1");
        assert_eq!(child.dataset_id, "sample-1");
        assert_eq!(child.step_names(), vec!["download"]);
        assert_ne!(child.hash_chain[0], parent.hash_chain[0]);
        assert!(child.verify_integrity());
    }
}
