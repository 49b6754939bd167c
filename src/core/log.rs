use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Sets up the global subscriber. `RUST_LOG` wins over `verbose` when set;
/// otherwise `verbose` turns on debug output for this crate only.
pub fn init_logging(verbose: bool) {
    let directive = if verbose { "fxledger=debug" } else { "off" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(filter)
        .init();
}
