//! ---
//! chm_section: "21-explanations"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Remote-first explanation with offline fallback."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
//! [`Explainer::explain`] never fails. When the remote model is not configured
//! or the call goes wrong, the caller receives the offline report together
//! with a notice naming the reason.
use std::fmt;
use std::sync::Arc;

use chm_logging::{chm_debug, chm_warn, log_system_event, LogContext, SystemEventOutcome};
use chm_sim::dataset::TelemetryDataset;
use serde::Serialize;

use crate::errors::RemoteError;
use crate::offline::explain_offline;
use crate::prompt::build_prompt;
use crate::remote::{attempt, ModelClient, RemoteOutcome};
use crate::settings::ModelSettings;

/// Which path produced an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExplanationSource {
    Remote { model: String },
    Offline,
}

/// Explanation text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
    /// Present when the offline path was taken because the remote one failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl Explanation {
    pub fn is_offline(&self) -> bool {
        self.source == ExplanationSource::Offline
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(notice) = &self.notice {
            writeln!(f, "{notice}")?;
            writeln!(f)?;
        }
        f.write_str(&self.text)
    }
}

/// Human-readable notice shown alongside a fallback explanation.
pub fn fallback_notice(reason: &RemoteError) -> String {
    format!("Using offline explanation (remote model unavailable: {reason})")
}

enum Backend {
    Remote(Arc<dyn ModelClient>),
    Unavailable(RemoteError),
}

/// Answers operator questions about one chiller's telemetry.
pub struct Explainer {
    backend: Backend,
}

impl fmt::Debug for Explainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.backend {
            Backend::Remote(client) => f
                .debug_struct("Explainer")
                .field("model", &client.model_name())
                .finish(),
            Backend::Unavailable(reason) => f
                .debug_struct("Explainer")
                .field("offline", &reason.to_string())
                .finish(),
        }
    }
}

impl Explainer {
    /// Always answer offline, citing `reason`.
    pub fn offline(reason: RemoteError) -> Self {
        Self {
            backend: Backend::Unavailable(reason),
        }
    }

    pub fn with_client(client: Arc<dyn ModelClient>) -> Self {
        Self {
            backend: Backend::Remote(client),
        }
    }

    /// Remote-backed when the build includes the model client and a
    /// credential was resolved, offline otherwise.
    pub fn from_settings(settings: &ModelSettings) -> Self {
        match remote_client(settings) {
            Ok(client) => Self::with_client(client),
            Err(reason) => Self::offline(reason),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::Remote(_))
    }

    /// Produce an explanation for `query` about `chiller`.
    pub async fn explain(
        &self,
        query: &str,
        dataset: &TelemetryDataset,
        chiller: &str,
    ) -> Explanation {
        let ctx = LogContext::new().with_chiller(chiller);
        let reason = match &self.backend {
            Backend::Remote(client) => {
                let prompt = build_prompt(query, dataset, chiller);
                chm_debug!(
                    context = ctx.with_source(client.model_name()),
                    "sending prompt of {} bytes",
                    prompt.len()
                );
                match attempt(client.as_ref(), &prompt).await {
                    RemoteOutcome::Success(text) => {
                        let model = client.model_name().to_owned();
                        log_system_event(
                            Some(&ctx.with_source(&model)),
                            "explanation",
                            "remote explanation generated",
                            SystemEventOutcome::Success,
                        );
                        return Explanation {
                            text,
                            source: ExplanationSource::Remote { model },
                            notice: None,
                        };
                    }
                    RemoteOutcome::Failure(reason) => reason,
                }
            }
            Backend::Unavailable(reason) => reason.clone(),
        };

        let notice = fallback_notice(&reason);
        chm_warn!(context = ctx, "{notice}");
        log_system_event(
            Some(&ctx.with_source("offline")),
            "explanation",
            "fell back to offline explanation",
            SystemEventOutcome::Degraded,
        );
        Explanation {
            text: explain_offline(query, dataset, chiller),
            source: ExplanationSource::Offline,
            notice: Some(notice),
        }
    }
}

#[cfg(feature = "gemini")]
fn remote_client(settings: &ModelSettings) -> Result<Arc<dyn ModelClient>, RemoteError> {
    let client = crate::gemini::GeminiClient::from_settings(settings)?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "gemini"))]
fn remote_client(_settings: &ModelSettings) -> Result<Arc<dyn ModelClient>, RemoteError> {
    Err(RemoteError::ClientUnavailable)
}
