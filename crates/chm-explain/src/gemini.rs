//! ---
//! chm_section: "21-explanations"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Google Generative Language REST client."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use async_trait::async_trait;
use chm_common::credentials::ApiKey;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::errors::{classify_status, RemoteError};
use crate::remote::ModelClient;
use crate::settings::ModelSettings;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// `generateContent` client for one model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    model: String,
    key: ApiKey,
}

impl GeminiClient {
    /// Build a client from resolved settings. Fails with
    /// [`RemoteError::MissingCredential`] when no key was found.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self, RemoteError> {
        let credential = settings
            .credential
            .as_ref()
            .ok_or_else(|| RemoteError::MissingCredential(settings.credential_name.clone()))?;
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            model: settings.model_name.clone(),
            key: credential.key.clone(),
        })
    }

    pub fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.as_str().trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<Value, RemoteError> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self
            .http
            .post(self.request_url())
            .header(API_KEY_HEADER, self.key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        debug!(model = %self.model, status = status.as_u16(), bytes = text.len(), "model responded");
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|err| RemoteError::MalformedResponse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chm_common::credentials::Credential;
    use std::time::Duration;

    fn settings(endpoint: &str, key: Option<&str>) -> ModelSettings {
        ModelSettings {
            model_name: "gemini-1.5-flash-8b-latest".into(),
            endpoint: Url::parse(endpoint).unwrap(),
            timeout: Duration::from_secs(5),
            credential_name: "GOOGLE_API_KEY".into(),
            credential: key.map(|key| Credential {
                key: ApiKey::new(key),
                source: "test".into(),
            }),
        }
    }

    #[test]
    fn request_url_targets_generate_content() {
        let client = GeminiClient::from_settings(&settings(
            "https://generativelanguage.googleapis.com",
            Some("k"),
        ))
        .unwrap();
        assert_eq!(
            client.request_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-8b-latest:generateContent"
        );
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let err = GeminiClient::from_settings(&settings("http://127.0.0.1:9", None)).unwrap_err();
        assert_eq!(err, RemoteError::MissingCredential("GOOGLE_API_KEY".into()));
        assert_eq!(err.to_string(), "GOOGLE_API_KEY not configured");
    }
}
