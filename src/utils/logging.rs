use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "ATMENTION_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Installs the stderr tracing subscriber.
///
/// `verbose` raises the crate's own events to debug unless `ATMENTION_LOG`
/// says otherwise. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "warn,atmention=debug"
    } else {
        DEFAULT_FILTER
    };
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
