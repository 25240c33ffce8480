use tracing_subscriber::EnvFilter;

/// Initialise logging for hosts that do not bring their own subscriber.
/// With `verbose` the default level is `debug` and `RUST_LOG` may override
/// it; without it the level is pinned to `info` so a stray environment
/// variable cannot flood the output. Safe to call more than once.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
