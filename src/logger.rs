use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--quiet` = error only,
/// `--verbose` = debug and up, default = info and up.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_env_filter(filter)
        .init();
}

fn default_level(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}
