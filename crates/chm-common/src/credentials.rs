//! ---
//! chm_section: "01-core-functionality"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Layered credential lookup for the remote model API key."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
//! Credentials are looked up once at startup: the secrets file first, then the
//! process environment. A store that fails to load is skipped with a warning
//! and the next layer is consulted.
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ModelConfig;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("unable to read secrets file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid secrets file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// API key wrapper that never prints its value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Where a resolved credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub key: ApiKey,
    pub source: String,
}

/// A single layer in the credential lookup chain.
pub trait SecretStore: Send + Sync {
    /// Return the secret stored under `name`, `Ok(None)` when absent.
    fn get(&self, name: &str) -> Result<Option<String>, SecretError>;

    /// Short human-readable label used in logs.
    fn describe(&self) -> String;
}

/// Flat TOML secrets file (`GOOGLE_API_KEY = "..."`). A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct TomlSecretStore {
    path: PathBuf,
}

impl TomlSecretStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SecretStore for TomlSecretStore {
    fn get(&self, name: &str) -> Result<Option<String>, SecretError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| SecretError::Io {
            path: self.path.clone(),
            source,
        })?;
        let table: toml::Table = toml::from_str(&raw).map_err(|source| SecretError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(table
            .get(name)
            .and_then(|value| value.as_str())
            .map(str::to_owned))
    }

    fn describe(&self) -> String {
        format!("secrets file {}", self.path.display())
    }
}

/// Process environment lookup.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSecretStore;

impl SecretStore for EnvironmentSecretStore {
    fn get(&self, name: &str) -> Result<Option<String>, SecretError> {
        Ok(std::env::var(name).ok())
    }

    fn describe(&self) -> String {
        "environment".to_owned()
    }
}

/// Ordered chain of secret stores; the first non-blank value wins.
pub struct LayeredSecrets {
    layers: Vec<Box<dyn SecretStore>>,
}

impl LayeredSecrets {
    pub fn new(layers: Vec<Box<dyn SecretStore>>) -> Self {
        Self { layers }
    }

    /// Secrets file from the model configuration, then the environment.
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(vec![
            Box::new(TomlSecretStore::new(&config.secrets_path)),
            Box::new(EnvironmentSecretStore),
        ])
    }

    pub fn resolve(&self, name: &str) -> Option<Credential> {
        for layer in &self.layers {
            match layer.get(name) {
                Ok(Some(value)) if !value.trim().is_empty() => {
                    debug!(secret = name, source = %layer.describe(), "credential resolved");
                    return Some(Credential {
                        key: ApiKey::new(value.trim()),
                        source: layer.describe(),
                    });
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(secret = name, source = %layer.describe(), error = %err, "secret store unavailable, trying next layer");
                }
            }
        }
        None
    }
}

impl fmt::Debug for LayeredSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.layers.iter().map(|layer| layer.describe()))
            .finish()
    }
}
