//! ---
//! chm_section: "21-explanations"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Failure taxonomy for the remote model call."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use serde_json::Value;
use thiserror::Error;

/// Every way the remote explanation can fail. All of them route to the offline explainer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("{0} not configured")]
    MissingCredential(String),
    #[error("remote model client not included in this build")]
    ClientUnavailable,
    #[error("authentication rejected (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },
    #[error("quota exhausted or rate limited (HTTP {status}): {message}")]
    QuotaExceeded { status: u16, message: String },
    #[error("remote model returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl RemoteError {
    /// Configuration problems, as opposed to failures of an attempted call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RemoteError::MissingCredential(_) | RemoteError::ClientUnavailable
        )
    }
}

/// Map a non-success HTTP status and body to a [`RemoteError`].
///
/// Google reports an invalid key as HTTP 400 with reason `API_KEY_INVALID`,
/// which is classified as an authentication failure.
pub fn classify_status(status: u16, body: &str) -> RemoteError {
    let message = error_message(body);
    match status {
        401 | 403 => RemoteError::Authentication { status, message },
        429 => RemoteError::QuotaExceeded { status, message },
        400 if body.contains("API_KEY_INVALID") || body.contains("API key not valid") => {
            RemoteError::Authentication { status, message }
        }
        _ => RemoteError::Http { status, message },
    }
}

/// `error.message` from a Google API error body, or the trimmed raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_owned())
}
