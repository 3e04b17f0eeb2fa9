//! Logging utilities
//!
//! The library only emits `log` records; binaries embedding it choose the
//! output. This installs `env_logger`, which honours `RUST_LOG`.

/// Installs `env_logger` once. Later calls are no-ops.
pub fn setup_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}

/// Logger for tests: output is captured by the test harness.
pub fn setup_test_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_is_idempotent() {
        setup_test_logging();
        setup_logging();
        setup_test_logging();
        log::debug!("logger installed");
    }
}
