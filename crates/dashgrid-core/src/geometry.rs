//! Lattice geometry primitives.
//!
//! Grid coordinates are 1-based: `(col, row) = (1, 1)` is the top-left cell.
//! Occupancy is half-open on both axes, so an item at column 1 with width 2
//! covers columns 1 and 2 and its exclusive right edge is column 3.

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Top-left lattice cell of an item, 1-based on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub col: u32,
    pub row: u32,
}

impl GridPosition {
    /// Create a position without validating it. Zero coordinates are caught
    /// at the engine's operation boundary via [`GridPosition::validate`].
    #[inline]
    #[must_use]
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Reject positions outside the 1-based lattice.
    pub fn validate(self) -> Result<Self, GridError> {
        if self.col == 0 || self.row == 0 {
            return Err(GridError::InvalidPosition {
                col: self.col,
                row: self.row,
            });
        }
        Ok(self)
    }
}

impl Default for GridPosition {
    fn default() -> Self {
        Self { col: 1, row: 1 }
    }
}

/// Item extent in cells: `x` columns wide, `y` rows tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub x: u32,
    pub y: u32,
}

impl GridSize {
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Reject degenerate sizes; every item occupies at least one cell.
    pub fn validate(self) -> Result<Self, GridError> {
        if self.x == 0 || self.y == 0 {
            return Err(GridError::InvalidSize {
                x: self.x,
                y: self.y,
            });
        }
        Ok(self)
    }

    /// Per-axis floor against a configured minimum size.
    #[inline]
    #[must_use]
    pub fn max_per_axis(self, floor: GridSize) -> Self {
        Self {
            x: self.x.max(floor.x),
            y: self.y.max(floor.y),
        }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self { x: 1, y: 1 }
    }
}

/// A placed rectangle on the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub pos: GridPosition,
    pub size: GridSize,
}

impl CellRect {
    #[inline]
    #[must_use]
    pub const fn new(pos: GridPosition, size: GridSize) -> Self {
        Self { pos, size }
    }

    /// First column to the right of the rect (exclusive edge).
    #[inline]
    #[must_use]
    pub const fn right_col(&self) -> u32 {
        self.pos.col.saturating_add(self.size.x)
    }

    /// First row below the rect (exclusive edge).
    #[inline]
    #[must_use]
    pub const fn bottom_row(&self) -> u32 {
        self.pos.row.saturating_add(self.size.y)
    }

    /// Last column covered by the rect (inclusive).
    #[inline]
    #[must_use]
    pub const fn last_col(&self) -> u32 {
        self.pos.col.saturating_add(self.size.x - 1)
    }

    /// Last row covered by the rect (inclusive).
    #[inline]
    #[must_use]
    pub const fn last_row(&self) -> u32 {
        self.pos.row.saturating_add(self.size.y - 1)
    }

    /// Half-open interval overlap on both axes.
    #[must_use]
    pub fn overlaps(&self, other: CellRect) -> bool {
        let cols = self.pos.col < other.right_col() && other.pos.col < self.right_col();
        let rows = self.pos.row < other.bottom_row() && other.pos.row < self.bottom_row();
        cols && rows
    }

    /// Whether a single cell falls inside the rect.
    #[must_use]
    pub fn contains_cell(&self, col: u32, row: u32) -> bool {
        col >= self.pos.col && col < self.right_col() && row >= self.pos.row && row < self.bottom_row()
    }
}

/// A point in host pixel space.
///
/// The engine never interprets pixels itself; hosts pass a pixel-to-grid
/// conversion closure alongside any pixel-space query.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(col: u32, row: u32, x: u32, y: u32) -> CellRect {
        CellRect::new(GridPosition::new(col, row), GridSize::new(x, y))
    }

    #[test]
    fn edges_are_half_open() {
        let r = rect(1, 1, 2, 3);
        assert_eq!(r.right_col(), 3);
        assert_eq!(r.bottom_row(), 4);
        assert_eq!(r.last_col(), 2);
        assert_eq!(r.last_row(), 3);
    }

    #[test]
    fn adjacent_rects_do_not_overlap() {
        let a = rect(1, 1, 2, 2);
        let touching_right = rect(3, 1, 2, 2);
        let touching_below = rect(1, 3, 2, 2);
        assert!(!a.overlaps(touching_right));
        assert!(!a.overlaps(touching_below));
    }

    #[test]
    fn partial_overlap_detected() {
        let a = rect(1, 1, 3, 3);
        let b = rect(3, 3, 3, 3);
        assert!(a.overlaps(b));
        assert!(b.overlaps(a));
    }

    #[test]
    fn containment_counts_as_overlap() {
        let outer = rect(1, 1, 4, 4);
        let inner = rect(2, 2, 1, 1);
        assert!(outer.overlaps(inner));
        assert!(inner.overlaps(outer));
    }

    #[test]
    fn contains_cell_respects_edges() {
        let r = rect(2, 2, 2, 2);
        assert!(r.contains_cell(2, 2));
        assert!(r.contains_cell(3, 3));
        assert!(!r.contains_cell(4, 3));
        assert!(!r.contains_cell(3, 4));
        assert!(!r.contains_cell(1, 2));
    }

    #[test]
    fn validation_rejects_zero() {
        assert!(GridPosition::new(0, 1).validate().is_err());
        assert!(GridPosition::new(1, 0).validate().is_err());
        assert!(GridPosition::new(1, 1).validate().is_ok());
        assert!(GridSize::new(0, 2).validate().is_err());
        assert!(GridSize::new(2, 2).validate().is_ok());
    }

    #[test]
    fn size_floor_applies_per_axis() {
        let floored = GridSize::new(1, 5).max_per_axis(GridSize::new(2, 2));
        assert_eq!(floored, GridSize::new(2, 5));
    }
}
