//! Bounds testing and coordinate translation for pointer events.
//!
//! Pure functions over an [`Area`]. They never trigger a scan and never
//! touch shared state, so they are safe to call from any event handler.

use crossterm::event::MouseEvent;

use crate::area::Area;

/// An absolute pointer position in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pointer {
    pub x: u16,
    pub y: u16,
}

impl Pointer {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl From<&MouseEvent> for Pointer {
    fn from(event: &MouseEvent) -> Self {
        Self::new(event.column, event.row)
    }
}

impl From<MouseEvent> for Pointer {
    fn from(event: MouseEvent) -> Self {
        Self::from(&event)
    }
}

impl From<(u16, u16)> for Pointer {
    fn from((x, y): (u16, u16)) -> Self {
        Self::new(x, y)
    }
}

/// Whether the pointer at `(x, y)` falls inside `area`.
///
/// Columns are half-open, `start.column <= x < end.column`. Rows include the
/// end row, `start.row <= y <= end.row`, since the end marker sits right after
/// the last cell of the region's last line. Unknown and degenerate areas
/// contain nothing.
pub fn in_bounds(area: &Area, x: u16, y: u16) -> bool {
    let (Some(start), Some(end)) = (area.start(), area.end()) else {
        return false;
    };

    if area.is_degenerate() {
        return false;
    }

    x >= start.column && x < end.column && y >= start.row && y <= end.row
}

/// Translate an absolute pointer position into one relative to the area's start.
///
/// Only the start needs to be known. The result is negative on an axis where
/// the pointer lies before the start.
pub fn local_position(area: &Area, x: u16, y: u16) -> Option<(i32, i32)> {
    let start = area.start()?;
    Some((
        i32::from(x) - i32::from(start.column),
        i32::from(y) - i32::from(start.row),
    ))
}

/// Bounds test for regions that know their own size.
///
/// Uses only the start coordinate, so it works for start-only marks. The box
/// spans `width` columns and `height` rows from the start.
pub fn contains_sized(area: &Area, width: u16, height: u16, x: u16, y: u16) -> bool {
    let Some(start) = area.start() else {
        return false;
    };

    let (x, y) = (u32::from(x), u32::from(y));
    let (col, row) = (u32::from(start.column), u32::from(start.row));

    x >= col && x < col + u32::from(width) && y >= row && y < row + u32::from(height)
}
