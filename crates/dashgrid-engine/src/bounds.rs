//! Bounds predicates and clamps.
//!
//! All functions are pure; `0` means an unbounded axis. The clamp helpers
//! nudge a rect toward legality rather than rejecting it: a position pushed
//! off the column bound is pulled back to the last fitting column and moved
//! one row onward so directional searches continue on the next lane, and a
//! size clamped on one axis grows by one cell on the other to keep roughly
//! the same area under the pointer during an interactive resize.

use dashgrid_core::{GridPosition, GridSize};

/// `pos + size` fits the column bound. `relax_first_col` admits oversized
/// rects parked at column 1, used when re-validating items after a bound
/// shrink.
#[inline]
#[must_use]
pub fn fits_cols(pos: GridPosition, size: GridSize, max_cols: u32, relax_first_col: bool) -> bool {
    max_cols == 0
        || (relax_first_col && pos.col == 1)
        || pos.col.saturating_add(size.x).saturating_sub(1) <= max_cols
}

/// Row-axis counterpart of [`fits_cols`].
#[inline]
#[must_use]
pub fn fits_rows(pos: GridPosition, size: GridSize, max_rows: u32, relax_first_row: bool) -> bool {
    max_rows == 0
        || (relax_first_row && pos.row == 1)
        || pos.row.saturating_add(size.y).saturating_sub(1) <= max_rows
}

/// Both axes of [`fits_cols`]/[`fits_rows`].
#[inline]
#[must_use]
pub fn fits_bounds(
    pos: GridPosition,
    size: GridSize,
    max_cols: u32,
    max_rows: u32,
    relax: bool,
) -> bool {
    fits_cols(pos, size, max_cols, relax) && fits_rows(pos, size, max_rows, relax)
}

/// Pull an overflowing position back inside the column bound and advance to
/// the next row.
#[must_use]
pub fn clamp_pos_to_cols(mut pos: GridPosition, size: GridSize, max_cols: u32) -> GridPosition {
    if !fits_cols(pos, size, max_cols, false) {
        pos.col = max_cols.saturating_sub(size.x - 1).max(1);
        pos.row = pos.row.saturating_add(1);
    }
    pos
}

/// Row-axis counterpart of [`clamp_pos_to_cols`]: advances the column.
#[must_use]
pub fn clamp_pos_to_rows(mut pos: GridPosition, size: GridSize, max_rows: u32) -> GridPosition {
    if !fits_rows(pos, size, max_rows, false) {
        pos.row = max_rows.saturating_sub(size.y - 1).max(1);
        pos.col = pos.col.saturating_add(1);
    }
    pos
}

/// Shrink an overflowing width to the column bound, growing height by one.
#[must_use]
pub fn clamp_size_to_cols(pos: GridPosition, mut size: GridSize, max_cols: u32) -> GridSize {
    if !fits_cols(pos, size, max_cols, false) {
        size.x = max_cols.saturating_sub(pos.col - 1).max(1);
        size.y = size.y.saturating_add(1);
    }
    size
}

/// Row-axis counterpart of [`clamp_size_to_cols`].
#[must_use]
pub fn clamp_size_to_rows(pos: GridPosition, mut size: GridSize, max_rows: u32) -> GridSize {
    if !fits_rows(pos, size, max_rows, false) {
        size.y = max_rows.saturating_sub(pos.row - 1).max(1);
        size.x = size.x.saturating_add(1);
    }
    size
}
