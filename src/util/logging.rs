//! Tracing subscriber setup shared by embedders and tests.

/// Install a global `tracing` subscriber driven by `RUST_LOG`.
///
/// `debug` raises the default directive from INFO to DEBUG. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .try_init();
}
