//! Error handling for the region locator.
//!
//! The steady-state surface of the locator (wrap, scan, get, query, clear) is
//! total and never returns an error. Errors only exist at the edges of the
//! lifecycle:
//!
//! | Variant | Raised by | Meaning |
//! |---------|-----------|---------|
//! | `InvalidConfig` | `LocatorConfig::validate`, `LocatorConfig::from_env` | Bad configuration value |
//! | `NoRuntime` | `Locator::start` | Started outside a tokio runtime |
//! | `ConsumerFailed` | `Locator::shutdown` | Background consumer panicked or was aborted |

mod locator_error;

pub use locator_error::LocatorError;

/// Result alias used by the fallible lifecycle operations.
pub type LocatorResult<T> = Result<T, LocatorError>;
