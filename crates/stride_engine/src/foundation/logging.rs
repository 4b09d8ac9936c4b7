//! Logging setup and re-exported macros

pub use log::{debug, error, info, trace, warn};

/// Initialize the global logger from the `RUST_LOG` environment variable.
///
/// Call once at startup, before the first simulation tick. Panics if a
/// logger is already installed; use [`try_init`] where that can happen.
pub fn init() {
    env_logger::init();
}

/// Fallible logger initialization for tests and embedders that cannot
/// guarantee a single call site.
pub fn try_init() -> Result<(), log::SetLoggerError> {
    env_logger::try_init()
}
