// Log filter shared by the binary and tests.
// ureq logs full request URLs at debug, and the Telegram URL embeds the bot token,
// so its targets are capped at info whatever RUST_LOG asks for.

use tracing_subscriber::EnvFilter;

const URL_LOGGING_TARGETS: &[&str] = &["ureq"];

/// Directive string for `rust_log` (default `info`) with ureq directives replaced by the cap.
pub fn filter_directives(rust_log: Option<&str>) -> String {
    rust_log
        .unwrap_or("info")
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .filter(|d| !URL_LOGGING_TARGETS.iter().any(|t| d.starts_with(t)))
        .map(str::to_string)
        .chain(URL_LOGGING_TARGETS.iter().map(|t| format!("{}=info", t)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Filter for `rust_log`; an unparsable value falls back to `info`.
pub fn filter_for(rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::try_new(filter_directives(rust_log))
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(None)))
}

/// Filter from `RUST_LOG`.
pub fn env_filter() -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_for(rust_log.as_deref())
}
