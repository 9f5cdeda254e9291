use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Structured JSON logging, `RUST_LOG`-configurable, `INFO` by default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(cfg!(debug_assertions))
        .json()
        .init();
}
