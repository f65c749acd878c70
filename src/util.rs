static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install the fmt subscriber once, honoring `RUST_LOG` (default `info`).
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Size the global rayon pool once; later calls are no-ops.
pub fn configure_parallelism(threads: Option<usize>) {
    if let Some(n) = threads {
        if n > 0 {
            rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok();
        }
    }
}
