use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a plain stderr subscriber, one line per event. `RUST_LOG`
/// overrides the default `info` filter.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .without_time(),
        )
        .init();
}
