//! ---
//! chm_section: "21-explanations"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Startup resolution of remote model settings."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use std::time::Duration;

use anyhow::{Context, Result};
use chm_common::config::ModelConfig;
use chm_common::credentials::{Credential, LayeredSecrets};
use tracing::info;
use url::Url;

/// Remote model settings resolved once per process and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model_name: String,
    pub endpoint: Url,
    pub timeout: Duration,
    /// Name the credential is looked up under, kept for diagnostics.
    pub credential_name: String,
    pub credential: Option<Credential>,
}

impl ModelSettings {
    /// Resolve against the secrets file and environment named in `config`.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Self::resolve(config, &LayeredSecrets::from_config(config))
    }

    /// Resolve with an explicit secret chain. A missing credential is not an
    /// error; it is reported once here and every explanation goes offline.
    pub fn resolve(config: &ModelConfig, secrets: &LayeredSecrets) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("invalid model endpoint {}", config.endpoint))?;
        let credential = secrets.resolve(&config.api_key_env);
        match &credential {
            Some(found) => info!(
                model = %config.model_name,
                credential_source = %found.source,
                "remote model explanations enabled"
            ),
            None => info!(
                credential = %config.api_key_env,
                "{} not configured, will use offline rule-based explanation instead",
                config.api_key_env
            ),
        }
        Ok(Self {
            model_name: config.model_name.clone(),
            endpoint,
            timeout: config.timeout,
            credential_name: config.api_key_env.clone(),
            credential,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chm_common::credentials::{SecretError, SecretStore};

    struct OneSecret(Option<&'static str>);

    impl SecretStore for OneSecret {
        fn get(&self, _name: &str) -> Result<Option<String>, SecretError> {
            Ok(self.0.map(str::to_owned))
        }

        fn describe(&self) -> String {
            "fixture".into()
        }
    }

    #[test]
    fn resolves_credential_and_model() {
        let config = ModelConfig::default();
        let secrets = LayeredSecrets::new(vec![Box::new(OneSecret(Some("k-123")))]);
        let settings = ModelSettings::resolve(&config, &secrets).unwrap();
        assert!(settings.has_credential());
        assert_eq!(settings.model_name, "gemini-1.5-flash-8b-latest");
        assert_eq!(settings.endpoint.host_str(), Some("generativelanguage.googleapis.com"));
    }

    #[test]
    fn missing_credential_is_not_fatal() {
        let config = ModelConfig::default();
        let secrets = LayeredSecrets::new(vec![Box::new(OneSecret(None))]);
        let settings = ModelSettings::resolve(&config, &secrets).unwrap();
        assert!(!settings.has_credential());
        assert_eq!(settings.credential_name, "GOOGLE_API_KEY");
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let config = ModelConfig {
            endpoint: "not a url".into(),
            ..Default::default()
        };
        let secrets = LayeredSecrets::new(Vec::new());
        assert!(ModelSettings::resolve(&config, &secrets).is_err());
    }
}
