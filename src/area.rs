//! Coordinates and areas recovered from scanned frames.

use crossterm::event::MouseEvent;
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

use crate::query;

/// A cell position in a scanned frame, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    /// Line breaks preceding the marker.
    pub row: u16,
    /// Display width between the last line break and the marker.
    pub column: u16,
}

impl Coord {
    pub const fn new(row: u16, column: u16) -> Self {
        Self { row, column }
    }
}

/// Which half of a region a marker delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Start,
    End,
}

/// Last known bounds of a region.
///
/// Either half may be missing: a region that has never been scanned has
/// neither, a region tagged with [`Locator::mark`](crate::Locator::mark) only
/// ever gets a start. Bounds tests require both halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Area {
    start: Option<Coord>,
    end: Option<Coord>,
}

impl Area {
    /// The area of a region that has not been observed.
    pub const UNKNOWN: Area = Area {
        start: None,
        end: None,
    };

    /// A fully known area.
    pub const fn new(start: Coord, end: Coord) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// An area with only its start observed.
    pub const fn start_only(start: Coord) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn start(&self) -> Option<Coord> {
        self.start
    }

    pub fn end(&self) -> Option<Coord> {
        self.end
    }

    /// True once both the start and the end have been observed.
    pub fn is_known(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// True for a known area whose end precedes its start.
    pub fn is_degenerate(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start.column > end.column || start.row > end.row,
            _ => false,
        }
    }

    pub(crate) fn set(&mut self, role: Role, coord: Coord) {
        match role {
            Role::Start => self.start = Some(coord),
            Role::End => self.end = Some(coord),
        }
    }

    /// See [`query::in_bounds`].
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        query::in_bounds(self, x, y)
    }

    /// See [`query::local_position`].
    pub fn local_position(&self, x: u16, y: u16) -> Option<(i32, i32)> {
        query::local_position(self, x, y)
    }

    /// See [`query::contains_sized`].
    pub fn contains_sized(&self, width: u16, height: u16, x: u16, y: u16) -> bool {
        query::contains_sized(self, width, height, x, y)
    }

    /// Bounds test against a crossterm mouse event.
    pub fn contains_mouse(&self, event: &MouseEvent) -> bool {
        let pointer = query::Pointer::from(event);
        self.in_bounds(pointer.x, pointer.y)
    }

    /// Columns covered by a known area.
    pub fn width(&self) -> Option<u16> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if !self.is_degenerate() => Some(end.column - start.column),
            _ => None,
        }
    }

    /// Rows covered by a known area, counting the end row.
    pub fn height(&self) -> Option<u16> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if !self.is_degenerate() => {
                Some((end.row - start.row).saturating_add(1))
            }
            _ => None,
        }
    }

    /// The area as a ratatui `Rect`, if known and well formed.
    pub fn to_rect(&self) -> Option<Rect> {
        let start = self.start?;
        Some(Rect::new(
            start.column,
            start.row,
            self.width()?,
            self.height()?,
        ))
    }
}
