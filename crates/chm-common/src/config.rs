//! ---
//! chm_section: "01-core-functionality"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Application configuration loading and validation."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use crate::logging::LogFormat;

fn default_days() -> u32 {
    7
}

fn default_model_name() -> String {
    "gemini-1.5-flash-8b-latest".to_owned()
}

fn default_model_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_owned()
}

fn default_model_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_owned()
}

fn default_secrets_path() -> PathBuf {
    PathBuf::from("configs/secrets.toml")
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Primary configuration object for the chiller health monitor.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Ordered chiller identifiers. The first entry anchors fleet-level views.
    pub chillers: Vec<String>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "CHM_CONFIG";

    /// Load configuration from disk, respecting the `CHM_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Parse a single configuration file. `.json` files use the legacy
    /// `{"chillers": [...]}` layout, everything else is read as TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str::<AppConfig>(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?,
            _ => toml::from_str::<AppConfig>(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.chillers.is_empty() {
            return Err(anyhow!("configuration must contain at least one chiller"));
        }
        let mut seen = HashSet::new();
        for chiller in &self.chillers {
            if chiller.trim().is_empty() {
                return Err(anyhow!("chiller identifiers must not be blank"));
            }
            if !seen.insert(chiller.as_str()) {
                return Err(anyhow!("chiller '{}' is declared more than once", chiller));
            }
        }
        self.simulation.validate()?;
        self.model.validate()?;
        Ok(())
    }

    /// Chiller that anchors fleet-level explanations.
    pub fn anchor_chiller(&self) -> Option<&str> {
        self.chillers.first().map(String::as_str)
    }

    /// Stable SHA-256 over everything that influences generated telemetry.
    ///
    /// Used as the snapshot cache key so all views within a session share one
    /// dataset.
    pub fn simulation_fingerprint(&self) -> Result<String> {
        #[derive(Serialize)]
        struct FingerprintInput<'a> {
            chillers: &'a [String],
            simulation: &'a SimulationConfig,
        }

        let serialised = serde_json::to_vec(&FingerprintInput {
            chillers: &self.chillers,
            simulation: &self.simulation,
        })
        .with_context(|| "failed to serialise configuration for fingerprinting")?;
        let mut hasher = Sha256::new();
        hasher.update(&serialised);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Length of the simulated window in days.
    #[serde(default = "default_days")]
    pub days: u32,
    /// Fixed seed for reproducible sessions. Entropy-seeded when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl SimulationConfig {
    fn validate(&self) -> Result<()> {
        if self.days == 0 {
            return Err(anyhow!("simulation.days must be at least 1"));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            random_seed: None,
        }
    }
}

/// Remote text-generation model settings.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
    /// Environment variable consulted when the secrets file has no key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_secrets_path")]
    pub secrets_path: PathBuf,
}

impl ModelConfig {
    fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(anyhow!("model.model_name must not be empty"));
        }
        Url::parse(&self.endpoint)
            .with_context(|| format!("model.endpoint '{}' is not a valid URL", self.endpoint))?;
        if self.timeout.is_zero() {
            return Err(anyhow!("model.timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            endpoint: default_model_endpoint(),
            timeout: default_model_timeout(),
            api_key_env: default_api_key_env(),
            secrets_path: default_secrets_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}
