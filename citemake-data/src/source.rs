//! Raw dataset sources and the download step.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use citemake_core::config::SourceConfig;
use citemake_core::env_file::{RAW_DATA_FILEPATH, set_key};
use citemake_core::error::{CitemakeError, Result};
use citemake_core::persistence::{commit_partial, partial_path};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Information about a raw source for lineage tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub source_type: String,
    pub location: String,
}

/// Somewhere the raw citation CSV can be fetched from.
#[async_trait]
pub trait RawSource: Send + Sync {
    /// Write the full raw CSV to `dest`, returning the number of bytes written.
    async fn fetch(&self, dest: &Path) -> Result<u64>;

    /// Describe this source for lineage tracking.
    fn source_info(&self) -> SourceInfo;
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// The open-data portal's CSV export, fetched over HTTP(S).
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Self::new(
            config.url.clone(),
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )
    }
}

#[async_trait]
impl RawSource for HttpSource {
    async fn fetch(&self, dest: &Path) -> Result<u64> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CitemakeError::download(format!(
                "GET {} failed with status {status}",
                self.url
            )));
        }
        if let Some(len) = response.content_length() {
            tracing::debug!(bytes = len, "Response size announced");
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }

    fn source_info(&self) -> SourceInfo {
        SourceInfo {
            source_type: "http".to_string(),
            location: self.url.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// A raw export already on disk, e.g. fetched by hand.
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RawSource for FileSource {
    async fn fetch(&self, dest: &Path) -> Result<u64> {
        if !self.path.is_file() {
            return Err(CitemakeError::not_found(format!(
                "raw source file {}",
                self.path.display()
            )));
        }
        Ok(tokio::fs::copy(&self.path, dest).await?)
    }

    fn source_info(&self) -> SourceInfo {
        SourceInfo {
            source_type: "file".to_string(),
            location: self.path.display().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// download_raw
// ---------------------------------------------------------------------------

/// Result of a download.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    pub bytes: u64,
    pub source: SourceInfo,
}

/// `{YYYY-MM-DD}_raw.csv`
pub fn raw_file_name(date: NaiveDate) -> String {
    format!("{}_raw.csv", date.format("%Y-%m-%d"))
}

/// Download the raw dataset into `raw_dir` as `{today}_raw.csv`.
///
/// When `env_file` is given, `RAW_DATA_FILEPATH` is set there to the
/// absolute path of the new file.
pub async fn download_raw(
    source: &dyn RawSource,
    raw_dir: &Path,
    env_file: Option<&Path>,
) -> Result<DownloadOutcome> {
    download_raw_dated(source, raw_dir, env_file, Local::now().date_naive()).await
}

/// [`download_raw`] with an explicit date for the file name.
pub async fn download_raw_dated(
    source: &dyn RawSource,
    raw_dir: &Path,
    env_file: Option<&Path>,
    date: NaiveDate,
) -> Result<DownloadOutcome> {
    tokio::fs::create_dir_all(raw_dir).await?;
    let target = std::path::absolute(raw_dir.join(raw_file_name(date)))?;
    let tmp = partial_path(&target);
    let info = source.source_info();

    tracing::info!(
        source = %info.location,
        target = %target.display(),
        "Downloading raw dataset, this will take a few minutes"
    );

    let bytes = match source.fetch(&tmp).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
    };
    commit_partial(&tmp, &target)?;

    tracing::info!(bytes, path = %target.display(), "Finished downloading raw dataset");

    if let Some(env_file) = env_file {
        set_key(env_file, RAW_DATA_FILEPATH, &target.to_string_lossy())?;
    }

    Ok(DownloadOutcome {
        path: target,
        bytes,
        source: info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingSource;

    #[async_trait]
    impl RawSource for FailingSource {
        async fn fetch(&self, dest: &Path) -> Result<u64> {
            tokio::fs::write(dest, b"Make,Violation code\nTOYT,").await?;
            Err(CitemakeError::download("connection reset"))
        }

        fn source_info(&self) -> SourceInfo {
            SourceInfo {
                source_type: "test".into(),
                location: "nowhere".into(),
            }
        }
    }

    #[test]
    fn test_raw_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(raw_file_name(date), "2024-03-07_raw.csv");
    }

    #[tokio::test]
    async fn test_file_source_download_sets_env() {
        let dir = TempDir::new().unwrap();
        let export = dir.path().join("export.csv");
        std::fs::write(&export, "Make\nTOYT\n").unwrap();
        let env = dir.path().join(".env");
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let outcome = download_raw_dated(
            &FileSource::new(&export),
            &dir.path().join("data/raw"),
            Some(&env),
            date,
        )
        .await
        .unwrap();

        assert!(outcome.path.ends_with("data/raw/2024-01-02_raw.csv"));
        assert_eq!(outcome.bytes, 10);
        assert_eq!(outcome.source.source_type, "file");
        let recorded = citemake_core::env_file::get_key(&env, RAW_DATA_FILEPATH)
            .unwrap()
            .unwrap();
        assert_eq!(PathBuf::from(recorded), outcome.path);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let raw_dir = dir.path().join("raw");
        let env = dir.path().join(".env");
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let err = download_raw_dated(&FailingSource, &raw_dir, Some(&env), date)
            .await
            .unwrap_err();
        assert!(matches!(err, CitemakeError::Download(_)));
        assert_eq!(std::fs::read_dir(&raw_dir).unwrap().count(), 0);
        assert!(!env.exists());
    }

    #[tokio::test]
    async fn test_missing_file_source() {
        let dir = TempDir::new().unwrap();
        let err = FileSource::new(dir.path().join("nope.csv"))
            .fetch(&dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, CitemakeError::NotFound(_)));
    }
}
