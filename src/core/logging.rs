use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Route tracing events to stderr so they never mix with rendered output.
/// `RUST_LOG` wins over the verbosity flag when set.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "navi=debug" } else { "navi=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .without_time(),
        )
        .try_init();

    tracing::debug!(verbose, "logging initialized");
}
