//! ---
//! chm_section: "21-explanations"
//! chm_subsection: "crate-root"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Explanation engine for chiller telemetry."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
//! Offline rule-based explanations, prompt assembly, and a remote model
//! client with automatic fallback.
pub mod errors;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod offline;
pub mod orchestrator;
pub mod prompt;
pub mod remote;
pub mod settings;

pub use errors::RemoteError;
#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
pub use offline::explain_offline;
pub use orchestrator::{fallback_notice, Explainer, Explanation, ExplanationSource};
pub use prompt::build_prompt;
pub use remote::{attempt, normalize_response, ModelClient, RemoteOutcome};
pub use settings::ModelSettings;
