// ==========================================
// Logging setup
// ==========================================
// tracing + tracing-subscriber; level from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Install the process-wide subscriber
///
/// # Environment
/// - RUST_LOG: filter directive (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=sponsorship_import=trace
///
/// # Example
/// ```no_run
/// use sponsorship_import::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    install(filter);
}

/// Install with an explicit default level; RUST_LOG still wins when set
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    install(filter);
}

fn install(filter: EnvFilter) {
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Debug-level logging captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
