use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr so JSON printed on stdout stays parseable.
///
/// `RUST_LOG` takes precedence over `level` when it is set.
pub fn init_logging(level: &str) {
    let default_filter = format!("rentbuy={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let initialized = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init();

    if let Err(e) = initialized {
        eprintln!("Warning: logging already initialized: {e}");
    }
}
