//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! - LOG_LEVEL controls the filter, e.g. "debug" or "info,progress=debug,training=warn".
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//! - Targets: `progress` (topics, quiz attempts, ranking), `training`
//!   (practice records), `trainer` (startup, config, store).
//!
//! Tower HTTP TraceLayer adds per-request spans on top of these events.

use tracing_subscriber::EnvFilter;

/// Used when LOG_LEVEL is unset or invalid.
const DEFAULT_DIRECTIVES: &str = "info,progress=debug,training=debug,trainer=debug,tower_http=info,axum=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_filter(raw: Option<&str>) -> EnvFilter {
    raw.filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn init_tracing() {
    let level = std::env::var("LOG_LEVEL").ok();
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level.as_deref()))
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // json and pretty builders are different types.
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    tracing::debug!(target: "trainer", ?format, "Tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_defaults_to_pretty() {
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some("text")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
    }

    #[test]
    fn invalid_or_blank_filters_fall_back_to_defaults() {
        assert_eq!(env_filter(None).to_string(), EnvFilter::new(DEFAULT_DIRECTIVES).to_string());
        assert_eq!(env_filter(Some("  ")).to_string(), EnvFilter::new(DEFAULT_DIRECTIVES).to_string());
        assert_eq!(env_filter(Some("progress=loud")).to_string(), EnvFilter::new(DEFAULT_DIRECTIVES).to_string());
        assert_eq!(env_filter(Some("warn")).to_string(), EnvFilter::new("warn").to_string());
    }
}
