//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Default filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Initialize the logging system
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Initialize the logging system with a fallback filter
///
/// `RUST_LOG` still takes precedence when present.
pub fn init_with_filter(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("Logger already initialized");
    }
}
