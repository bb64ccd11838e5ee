//! Locator configuration.
//!
//! Use the builder methods to customize a config, or [`LocatorConfig::from_env`]
//! to overlay environment overrides on the defaults.
//!
//! ```ignore
//! use region_locator::LocatorConfig;
//!
//! let config = LocatorConfig::default().with_queue_capacity(512);
//! ```

use tokio::sync::Semaphore;

use crate::error::{LocatorError, LocatorResult};

/// Default bound of the observation queue between scanner and consumer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 200;

/// Default token base. The first interned region gets `DEFAULT_TOKEN_BASE + 1`.
pub const DEFAULT_TOKEN_BASE: u64 = 500;

/// Largest accepted token base.
pub const MAX_TOKEN_BASE: u64 = u64::MAX / 2;

/// Environment variable overriding [`LocatorConfig::queue_capacity`].
pub const ENV_QUEUE_CAPACITY: &str = "REGION_LOCATOR_QUEUE_CAPACITY";

/// Environment variable overriding [`LocatorConfig::token_base`].
pub const ENV_TOKEN_BASE: &str = "REGION_LOCATOR_TOKEN_BASE";

/// Configuration for a [`Locator`](crate::Locator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Maximum number of pending observations. Scans drop observations once full.
    pub queue_capacity: usize,
    /// Tokens are allocated starting right after this value. Keeping it high
    /// keeps markers clear of the `ESC 7` / `ESC 8` cursor escapes.
    pub token_base: u64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            token_base: DEFAULT_TOKEN_BASE,
        }
    }
}

impl LocatorConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the observation queue bound.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the token base.
    pub fn with_token_base(mut self, base: u64) -> Self {
        self.token_base = base;
        self
    }

    /// Defaults overlaid with `REGION_LOCATOR_*` environment variables.
    pub fn from_env() -> LocatorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> LocatorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_QUEUE_CAPACITY) {
            config.queue_capacity = raw.trim().parse().map_err(|e| {
                LocatorError::invalid_config("queue_capacity", format!("{raw:?}: {e}"))
            })?;
        }

        if let Some(raw) = lookup(ENV_TOKEN_BASE) {
            config.token_base = raw.trim().parse().map_err(|e| {
                LocatorError::invalid_config("token_base", format!("{raw:?}: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> LocatorResult<()> {
        if self.queue_capacity == 0 {
            return Err(LocatorError::invalid_config(
                "queue_capacity",
                "must be greater than zero",
            ));
        }

        if self.queue_capacity > Semaphore::MAX_PERMITS {
            return Err(LocatorError::invalid_config(
                "queue_capacity",
                format!("must be at most {}", Semaphore::MAX_PERMITS),
            ));
        }

        // Half the token space stays free for allocation.
        if self.token_base > MAX_TOKEN_BASE {
            return Err(LocatorError::invalid_config(
                "token_base",
                format!("must be at most {MAX_TOKEN_BASE}"),
            ));
        }

        Ok(())
    }
}
