//! ---
//! chm_section: "03-logging"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Structured logging context and lifecycle events."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Logging context shared by the simulation and explanation crates.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for tests and tools.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogContext<'a> {
    /// Chiller the event refers to.
    pub chiller: Option<&'a str>,
    /// Dashboard view that triggered the event.
    pub view: Option<&'a str>,
    /// Explanation source (`remote` or `offline`).
    pub source: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a chiller identifier.
    pub fn with_chiller(mut self, chiller: &'a str) -> Self {
        self.chiller = Some(chiller);
        self
    }

    /// Attach a dashboard view name.
    pub fn with_view(mut self, view: &'a str) -> Self {
        self.view = Some(view);
        self
    }

    /// Attach the explanation source.
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }
}

/// Outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed as requested.
    Success,
    /// The operation completed through a fallback path.
    Degraded,
    /// The operation failed.
    Fault,
}

impl SystemEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Degraded => "degraded",
            SystemEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized system event.
pub fn log_system_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let ctx = context.copied().unwrap_or_default();
    let chiller = ctx.chiller.unwrap_or("");
    let view = ctx.view.unwrap_or("");
    let source = ctx.source.unwrap_or("");
    // `tracing::event!` needs a const level, hence one arm per outcome.
    match outcome {
        SystemEventOutcome::Success => tracing::info!(
            event,
            outcome = outcome.as_str(),
            chiller,
            view,
            source,
            message = %message
        ),
        SystemEventOutcome::Degraded => tracing::warn!(
            event,
            outcome = outcome.as_str(),
            chiller,
            view,
            source,
            message = %message
        ),
        SystemEventOutcome::Fault => tracing::error!(
            event,
            outcome = outcome.as_str(),
            chiller,
            view,
            source,
            message = %message
        ),
    }
}
