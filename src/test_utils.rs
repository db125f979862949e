use tracing_subscriber::EnvFilter;

/// Routes library logs to the test harness; `RUST_LOG` overrides the level.
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
