//! Last known area of every region.
//!
//! Written only by the consumer task, read by anyone. Each entry holds the
//! most recent observation per role; older ones are overwritten, never kept.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::area::{Area, Coord, Role};

#[derive(Debug, Default)]
pub struct CoordinateStore {
    areas: RwLock<HashMap<Arc<str>, Area>>,
}

impl CoordinateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert one half of a region's area.
    pub fn record(&self, name: Arc<str>, role: Role, coord: Coord) {
        self.write().entry(name).or_default().set(role, coord);
    }

    /// Best known area for `name`, [`Area::UNKNOWN`] if never observed.
    pub fn get(&self, name: &str) -> Area {
        self.read().get(name).copied().unwrap_or_default()
    }

    /// Remove the stored area. Returns false if there was none.
    pub fn clear(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// Copy of every stored area, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, Area)> {
        let mut entries: Vec<_> = self
            .read()
            .iter()
            .map(|(name, area)| (name.to_string(), *area))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Arc<str>, Area>> {
        self.areas.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Arc<str>, Area>> {
        self.areas.write().unwrap_or_else(PoisonError::into_inner)
    }
}
