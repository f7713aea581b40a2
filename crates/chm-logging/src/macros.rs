//! ---
//! chm_section: "03-logging"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Context-enriched logging macros."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
/// Emit an informational log enriched with chiller context.
#[macro_export]
macro_rules! chm_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::INFO,
            chiller = ctx.chiller.unwrap_or(""),
            view = ctx.view.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::chm_info!(context = $crate::LogContext::default(), $($arg)+)
    }};
}

/// Emit a warning enriched with chiller context.
#[macro_export]
macro_rules! chm_warn {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::WARN,
            chiller = ctx.chiller.unwrap_or(""),
            view = ctx.view.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::chm_warn!(context = $crate::LogContext::default(), $($arg)+)
    }};
}

/// Emit a debug log enriched with chiller context.
#[macro_export]
macro_rules! chm_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::DEBUG,
            chiller = ctx.chiller.unwrap_or(""),
            view = ctx.view.unwrap_or(""),
            source = ctx.source.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::chm_debug!(context = $crate::LogContext::default(), $($arg)+)
    }};
}
