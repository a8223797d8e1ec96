//! Logging setup and plain-message helpers
//!
//! The engine emits `tracing` events under the `propkit_engine` target.
//! [`init`] installs a formatting subscriber honouring `RUST_LOG`; the
//! helpers below forward a message at the matching level.

use tracing_subscriber::EnvFilter;

/// Directive applied on top of `RUST_LOG`
pub const DEFAULT_DIRECTIVE: &str = "propkit_engine=info";

/// Install the global fmt subscriber
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    let filter = match DEFAULT_DIRECTIVE.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

/// Log a debug message
pub fn debug(message: &str) {
    tracing::debug!("{}", message);
}

/// Log an info message
pub fn info(message: &str) {
    tracing::info!("{}", message);
}

/// Log a warning message
pub fn warn(message: &str) {
    tracing::warn!("{}", message);
}

/// Log an error message
pub fn error(message: &str) {
    tracing::error!("{}", message);
}
