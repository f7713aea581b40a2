//! ---
//! chm_section: "01-core-functionality"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Shared primitives for the chiller health monitor workspace."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
//! Configuration loading, credential resolution and tracing bootstrap consumed
//! across the workspace.

pub mod config;
pub mod credentials;
pub mod logging;

pub use config::{AppConfig, LoadedAppConfig, LoggingConfig, ModelConfig, SimulationConfig};
pub use credentials::{
    ApiKey, Credential, EnvironmentSecretStore, LayeredSecrets, SecretError, SecretStore,
    TomlSecretStore,
};
pub use logging::{init_tracing, LogFormat};
