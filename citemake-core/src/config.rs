//! Configuration for citemake.
//!
//! Values are layered with figment, lowest priority first:
//! built-in defaults, the user-level `config.toml`, the project-level
//! `citemake.toml` (or an explicit file), `CITEMAKE_*` environment variables
//! and finally explicit overrides from the command line.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project-level configuration file.
pub const PROJECT_CONFIG_FILE: &str = "citemake.toml";

/// Default export URL of the Los Angeles parking-citation dataset.
pub const DEFAULT_SOURCE_URL: &str =
    "https://data.lacity.org/api/views/wjz9-h9np/rows.csv?accessType=DOWNLOAD";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitemakeConfig {
    /// Where the raw citation export is fetched from.
    #[serde(default)]
    pub source: SourceConfig,
    /// Project-relative locations of data and bookkeeping files.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Sampling defaults.
    #[serde(default)]
    pub sample: SampleConfig,
    /// Cleaning inputs.
    #[serde(default)]
    pub clean: CleanConfig,
}

/// Upstream data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// CSV export URL.
    #[serde(default = "default_source_url")]
    pub url: String,
    /// Whole-request timeout in seconds. The export is several GB.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent header sent with the download request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_user_agent() -> String {
    format!("citemake/{}", env!("CARGO_PKG_VERSION"))
}

/// Project-relative paths. Absolute paths are used as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_interim_dir")]
    pub interim_dir: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            raw_dir: default_raw_dir(),
            interim_dir: default_interim_dir(),
            processed_dir: default_processed_dir(),
            env_file: default_env_file(),
            manifest: default_manifest(),
        }
    }
}

impl PathsConfig {
    /// Resolve one of the configured paths against the project directory.
    pub fn resolve(&self, project_dir: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_dir.join(path)
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_interim_dir() -> PathBuf {
    PathBuf::from("data/interim")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_env_file() -> PathBuf {
    PathBuf::from(".env")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("data/manifest.json")
}

/// Sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Fraction used by `citemake data` and by `sample` when `--frac` is omitted.
    #[serde(default = "default_frac")]
    pub default_frac: f64,
    /// Fixed RNG seed. Unset means a fresh random sample each run.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            default_frac: default_frac(),
            seed: None,
        }
    }
}

fn default_frac() -> f64 {
    0.1
}

/// Cleaning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Make alias table (`make,alias` with comma-separated aliases).
    #[serde(default = "default_make_aliases")]
    pub make_aliases: PathBuf,
    /// Extra `code,description` rows layered over the built-in violation table.
    #[serde(default)]
    pub violation_aliases: Option<PathBuf>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            make_aliases: default_make_aliases(),
            violation_aliases: None,
        }
    }
}

fn default_make_aliases() -> PathBuf {
    PathBuf::from("references/make.csv")
}

/// User-level config file location (`~/.config/citemake/config.toml` on Linux).
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "citemake", "citemake")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Command-line values that take precedence over every other layer.
///
/// Only the fields that are set are merged, so an unset override never
/// masks a value from a config file or the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub source_url: Option<String>,
    pub sample_seed: Option<u64>,
}

impl ConfigOverrides {
    fn merge_into(&self, mut figment: Figment) -> Figment {
        if let Some(url) = &self.source_url {
            figment = figment.merge(Serialized::default("source.url", url));
        }
        if let Some(seed) = self.sample_seed {
            figment = figment.merge(Serialized::default("sample.seed", seed));
        }
        figment
    }
}

/// Load configuration with layered sources.
///
/// `explicit` replaces the project-level `citemake.toml` when given and must exist.
pub fn load_config(
    project_dir: Option<&Path>,
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<CitemakeConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(CitemakeConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Box::new(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))));
            }
            figment = figment.merge(Toml::file(path));
        }
        None => {
            if let Some(dir) = project_dir {
                let project_config = dir.join(PROJECT_CONFIG_FILE);
                if project_config.exists() {
                    figment = figment.merge(Toml::file(&project_config));
                }
            }
        }
    }

    // CITEMAKE_SAMPLE__SEED, CITEMAKE_SOURCE__URL, ...
    figment = figment.merge(Env::prefixed("CITEMAKE_").split("__"));

    overrides.merge_into(figment).extract().map_err(Box::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CitemakeConfig::default();
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.sample.default_frac, 0.1);
        assert!(config.sample.seed.is_none());
        assert_eq!(config.paths.raw_dir, PathBuf::from("data/raw"));
        assert_eq!(config.clean.make_aliases, PathBuf::from("references/make.csv"));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = CitemakeConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: CitemakeConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.source.timeout_secs, config.source.timeout_secs);
        assert_eq!(parsed.paths.manifest, config.paths.manifest);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let parsed: CitemakeConfig = toml::from_str("[sample]\nseed = 7\n").unwrap();
        assert_eq!(parsed.sample.seed, Some(7));
        assert_eq!(parsed.sample.default_frac, 0.1);
        assert_eq!(parsed.source.url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_project_config_is_merged() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "[sample]\ndefault_frac = 0.25\n",
        )
        .unwrap();
        let config = load_config(Some(dir.path()), None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.sample.default_frac, 0.25);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(None, Some(&missing), &ConfigOverrides::default()).is_err());
    }

    // figment::Jail runs each closure in a fresh temp directory and restores
    // the environment afterwards. XDG_CONFIG_HOME points the user-level
    // config lookup into the jail.

    #[test]
    fn test_env_overrides_project_file() {
        figment::Jail::expect_with(|jail| {
            let xdg = jail.directory().join("xdg");
            jail.set_env("XDG_CONFIG_HOME", xdg.display());
            jail.create_file(
                PROJECT_CONFIG_FILE,
                "[sample]\nseed = 1\ndefault_frac = 0.5\n[source]\nurl = \"http://project\"\n",
            )?;
            jail.set_env("CITEMAKE_SAMPLE__SEED", "42");
            jail.set_env("CITEMAKE_SOURCE__URL", "http://env");

            let config = load_config(Some(jail.directory()), None, &ConfigOverrides::default())
                .map_err(|e| *e)?;
            assert_eq!(config.sample.seed, Some(42));
            assert_eq!(config.source.url, "http://env");
            // Untouched by the environment, so the project file still wins.
            assert_eq!(config.sample.default_frac, 0.5);
            Ok(())
        });
    }

    #[test]
    fn test_project_file_overrides_user_file() {
        figment::Jail::expect_with(|jail| {
            let xdg = jail.directory().join("xdg");
            jail.set_env("XDG_CONFIG_HOME", xdg.display());
            std::fs::create_dir_all(xdg.join("citemake"))
                .map_err(|e| e.to_string())?;
            jail.create_file(
                "xdg/citemake/config.toml",
                "[sample]\ndefault_frac = 0.3\nseed = 5\n",
            )?;
            jail.create_file(PROJECT_CONFIG_FILE, "[sample]\ndefault_frac = 0.6\n")?;

            let config = load_config(Some(jail.directory()), None, &ConfigOverrides::default())
                .map_err(|e| *e)?;
            assert_eq!(config.sample.default_frac, 0.6);
            assert_eq!(config.sample.seed, Some(5));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_replaces_project_file() {
        figment::Jail::expect_with(|jail| {
            let xdg = jail.directory().join("xdg");
            jail.set_env("XDG_CONFIG_HOME", xdg.display());
            jail.create_file(
                PROJECT_CONFIG_FILE,
                "[sample]\nseed = 1\n[source]\nurl = \"http://project\"\n",
            )?;
            jail.create_file("other.toml", "[sample]\ndefault_frac = 0.2\n")?;

            let explicit = jail.directory().join("other.toml");
            let config = load_config(
                Some(jail.directory()),
                Some(&explicit),
                &ConfigOverrides::default(),
            )
            .map_err(|e| *e)?;
            assert_eq!(config.sample.default_frac, 0.2);
            // Nothing from the project file leaks through.
            assert_eq!(config.sample.seed, None);
            assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
            Ok(())
        });
    }

    #[test]
    fn test_overrides_beat_env_and_only_touch_set_fields() {
        figment::Jail::expect_with(|jail| {
            let xdg = jail.directory().join("xdg");
            jail.set_env("XDG_CONFIG_HOME", xdg.display());
            jail.create_file(PROJECT_CONFIG_FILE, "[sample]\ndefault_frac = 0.5\n")?;
            jail.set_env("CITEMAKE_SAMPLE__SEED", "42");
            jail.set_env("CITEMAKE_SOURCE__URL", "http://env");

            let overrides = ConfigOverrides {
                source_url: Some("http://cli".into()),
                sample_seed: None,
            };
            let config =
                load_config(Some(jail.directory()), None, &overrides).map_err(|e| *e)?;
            assert_eq!(config.source.url, "http://cli");
            assert_eq!(config.sample.seed, Some(42));
            assert_eq!(config.sample.default_frac, 0.5);

            let overrides = ConfigOverrides {
                source_url: None,
                sample_seed: Some(7),
            };
            let config =
                load_config(Some(jail.directory()), None, &overrides).map_err(|e| *e)?;
            assert_eq!(config.sample.seed, Some(7));
            assert_eq!(config.source.url, "http://env");
            Ok(())
        });
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let paths = PathsConfig::default();
        let project = Path::new("/work/proj");
        assert_eq!(
            paths.resolve(project, &paths.raw_dir),
            PathBuf::from("/work/proj/data/raw")
        );
        assert_eq!(
            paths.resolve(project, Path::new("/abs/x.csv")),
            PathBuf::from("/abs/x.csv")
        );
    }
}
