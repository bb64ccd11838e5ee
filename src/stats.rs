//! Counters for diagnosing a saturated observation queue.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time copy of the locator counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocatorStats {
    pub frames_scanned: u64,
    pub observations_published: u64,
    /// Observations lost to a full (or closed) queue.
    pub observations_dropped: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Stats {
    frames_scanned: AtomicU64,
    observations_published: AtomicU64,
    observations_dropped: AtomicU64,
}

impl Stats {
    pub(crate) fn frame_scanned(&self) {
        self.frames_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn published(&self) {
        self.observations_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped(&self) {
        self.observations_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> LocatorStats {
        LocatorStats {
            frames_scanned: self.frames_scanned.load(Ordering::Relaxed),
            observations_published: self.observations_published.load(Ordering::Relaxed),
            observations_dropped: self.observations_dropped.load(Ordering::Relaxed),
        }
    }
}
