//! Logging integration for sout.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-render spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info", "warn",
/// "error"). In debug mode a pretty, human-readable format is used; otherwise
/// a structured JSON format is used. Logs go to stderr so they never mix with
/// rendered output.
///
/// Calling this more than once is harmless: later calls are ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one top-level render call.
///
/// # Examples
///
/// ```
/// use sout_core::logging::render_span;
///
/// let span = render_span("letter.sout");
/// let _guard = span.enter();
/// tracing::info!("rendering");
/// ```
pub fn render_span(template: &str) -> tracing::Span {
    tracing::info_span!("render", template = template)
}
