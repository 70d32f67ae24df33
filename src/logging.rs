// ==========================================
// Logging bootstrap
// ==========================================
// tracing + tracing-subscriber, level from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting the output format ("json" or text).
pub const LOG_FORMAT_ENV: &str = "TECNOVA_LOG_FORMAT";

/// Initialises the global subscriber.
///
/// # Environment
/// - RUST_LOG: filter directive (default: info),
///   e.g. `RUST_LOG=debug` or `RUST_LOG=tecnova_pos::importer=trace`
/// - TECNOVA_LOG_FORMAT=json: one JSON object per line
///
/// # Example
/// ```no_run
/// use tecnova_pos::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(true)
            .init();
    }
}

/// Test-friendly subscriber: debug level, captured by the test harness.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
