//! Project directory layout.

use crate::config::PathsConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Subdirectories of the data directory, one per dataset stage.
pub const DATA_STAGES: [&str; 4] = ["raw", "interim", "external", "processed"];

/// What [`ensure_layout`] had to create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutReport {
    pub created_dirs: Vec<PathBuf>,
    pub created_env_file: bool,
}

impl LayoutReport {
    pub fn is_noop(&self) -> bool {
        self.created_dirs.is_empty() && !self.created_env_file
    }
}

/// Create the data directory tree and an empty `.env` if they are missing.
///
/// Each newly created stage directory gets an empty `.gitkeep` so the tree
/// survives in version control. Existing directories are left untouched.
pub fn ensure_layout(project_dir: &Path, paths: &PathsConfig) -> Result<LayoutReport> {
    let mut report = LayoutReport::default();

    let data_dir = paths.resolve(project_dir, &paths.data_dir);
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        report.created_dirs.push(data_dir.clone());
    }

    let mut stage_dirs: Vec<PathBuf> = DATA_STAGES.iter().map(|s| data_dir.join(s)).collect();
    for configured in [&paths.raw_dir, &paths.interim_dir, &paths.processed_dir] {
        let dir = paths.resolve(project_dir, configured);
        if !stage_dirs.contains(&dir) {
            stage_dirs.push(dir);
        }
    }

    for dir in stage_dirs {
        if dir.exists() {
            continue;
        }
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(".gitkeep"), b"")?;
        tracing::debug!(dir = %dir.display(), "Created data directory");
        report.created_dirs.push(dir);
    }

    let env_file = paths.resolve(project_dir, &paths.env_file);
    if !env_file.exists() {
        if let Some(parent) = env_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&env_file, b"")?;
        report.created_env_file = true;
    }

    Ok(report)
}
