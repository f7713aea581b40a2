//! ---
//! chm_section: "21-explanations"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Remote model seam and response normalisation."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use async_trait::async_trait;
use serde_json::Value;

use crate::errors::RemoteError;

/// Text-in, JSON-out boundary to a hosted text-generation model.
#[async_trait]
pub trait ModelClient: Send + Sync + 'static {
    /// Identifier of the model requests are sent to.
    fn model_name(&self) -> &str;

    /// Send `prompt` and return the raw response document.
    async fn generate(&self, prompt: &str) -> Result<Value, RemoteError>;
}

/// Result of one remote attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    Success(String),
    Failure(RemoteError),
}

/// Call `client` once and fold the result into a [`RemoteOutcome`].
pub async fn attempt(client: &dyn ModelClient, prompt: &str) -> RemoteOutcome {
    match client.generate(prompt).await {
        Ok(response) => RemoteOutcome::Success(normalize_response(&response)),
        Err(err) => RemoteOutcome::Failure(err),
    }
}

/// Turn any response document into display text.
///
/// Candidate text parts are concatenated and trimmed; a response without usable
/// text (blocked prompt, empty candidates) becomes its JSON rendering.
pub fn normalize_response(response: &Value) -> String {
    let text: String = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        response.to_string()
    } else {
        trimmed.to_owned()
    }
}
