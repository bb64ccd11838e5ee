//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! let locator = common::start_locator();
//! let clean = locator.scan(&common::frame(&["header", &locator.wrap("tab", "[x]")]));
//! locator.flush().await;
//! ```

#![allow(dead_code)]

use region_locator::{Locator, LocatorConfig};

/// Start a locator with the default configuration.
///
/// Must be called inside a tokio runtime.
pub fn start_locator() -> Locator {
    Locator::start(LocatorConfig::default()).expect("default config should start")
}

/// Start a locator with a small observation queue.
pub fn start_locator_with_capacity(capacity: usize) -> Locator {
    let config = LocatorConfig::default().with_queue_capacity(capacity);
    Locator::start(config).expect("config should start")
}

/// Join rendered lines into a frame.
pub fn frame(lines: &[&str]) -> String {
    lines.join("\n")
}

/// Scan `frame` and wait for its coordinates to land in the store.
pub async fn scan_and_flush(locator: &Locator, frame: &str) -> String {
    let clean = locator.scan(frame);
    locator.flush().await;
    clean
}
