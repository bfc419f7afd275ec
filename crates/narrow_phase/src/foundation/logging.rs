//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`.
///
/// Safe to call more than once; later calls report that a logger is
/// already installed instead of panicking.
pub fn init() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_default_env().try_init()
}

/// Initialize logging for unit tests (output captured by the test harness).
#[cfg(test)]
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
