//! Position resolution: directional first-fit search for a free rect.
//!
//! Given a desired rect that collides, the resolver scans the lattice lane
//! by lane (columns for a vertical fix, rows for a horizontal one) and
//! accepts the first gap large enough. The scan runs in two phases: the
//! first keeps candidates inside the occupied extent (or the hard row/col
//! bound when one is set) so sideways space fills before the grid grows;
//! when the orthogonal axis is unbounded, a second phase accepts the slot
//! past the end of the starting lane. A fully bounded search that finds
//! nothing returns the last scanned position as a best effort, leaving the
//! accept-or-grow decision to the caller.

use dashgrid_core::{Axis, CellRect, GridPosition, GridSize};
use tracing::trace;

use crate::grid::GridModel;

impl GridModel {
    /// Resolve `(pos, size)` to the nearest free position.
    ///
    /// Fast path: the position comes back unchanged when nothing collides.
    pub(crate) fn fix_grid_position(&mut self, pos: GridPosition, size: GridSize) -> GridPosition {
        if !self.has_collision(CellRect::new(pos, size)) {
            return pos;
        }
        let resolved = match self.config.item_fix_axis() {
            Axis::Vertical => self.fix_position_vertical(pos, size),
            Axis::Horizontal => self.fix_position_horizontal(pos, size),
        };
        trace!(
            from = ?(pos.col, pos.row),
            to = ?(resolved.col, resolved.row),
            "resolved colliding position"
        );
        resolved
    }

    fn fix_position_vertical(&self, pos: GridPosition, size: GridSize) -> GridPosition {
        let row_limit = if self.config.max_rows > 0 {
            self.config.max_rows
        } else {
            self.occupied_rows()
        };
        let col_limit = if self.config.max_cols > 0 {
            self.config.max_cols.saturating_sub(size.x - 1).max(1)
        } else {
            // Without a column bound the lane cursor inherits the row
            // limit, so an unbounded scan still terminates.
            row_limit.max(pos.col)
        };

        let mut cursor = pos;
        while cursor.col <= col_limit {
            match self.scan_column(cursor, size, Some(row_limit)) {
                Ok(found) => return found,
                Err(advance) => {
                    cursor.col = advance.max(cursor.col + 1);
                    cursor.row = 1;
                }
            }
        }

        if self.config.max_rows == 0 {
            // Rows grow freely: fall back to the slot under the starting
            // lane's stack instead of spilling across the column bound.
            if let Ok(found) = self.scan_column(pos, size, None) {
                return found;
            }
        }
        cursor
    }

    /// Walk one column lane looking for a gap of height `size.y`.
    ///
    /// `Ok` carries the accepted position; `Err` carries the next column to
    /// try (minimum of the blockers' offsets, in the moving rect's width).
    fn scan_column(
        &self,
        cursor: GridPosition,
        size: GridSize,
        row_limit: Option<u32>,
    ) -> Result<GridPosition, u32> {
        let probe = CellRect::new(cursor, size);
        let path = self.items_in_vertical_path(probe, cursor.row);
        let mut next_row = cursor.row;
        for item in &path {
            if item.pos.row >= next_row.saturating_add(size.y) {
                return Ok(GridPosition::new(cursor.col, next_row));
            }
            next_row = next_row.max(item.rect().bottom_row());
        }
        match row_limit {
            Some(limit) if next_row.saturating_add(size.y).saturating_sub(1) > limit => Err(path
                .iter()
                .map(|item| item.pos.col.saturating_add(size.x))
                .min()
                .unwrap_or(0)),
            _ => Ok(GridPosition::new(cursor.col, next_row)),
        }
    }

    fn fix_position_horizontal(&self, pos: GridPosition, size: GridSize) -> GridPosition {
        let col_limit = if self.config.max_cols > 0 {
            self.config.max_cols
        } else {
            self.occupied_cols()
        };
        let row_limit = if self.config.max_rows > 0 {
            self.config.max_rows.saturating_sub(size.y - 1).max(1)
        } else {
            col_limit.max(pos.row)
        };

        let mut cursor = pos;
        while cursor.row <= row_limit {
            match self.scan_row(cursor, size, Some(col_limit)) {
                Ok(found) => return found,
                Err(advance) => {
                    cursor.row = advance.max(cursor.row + 1);
                    cursor.col = 1;
                }
            }
        }

        if self.config.max_cols == 0 {
            if let Ok(found) = self.scan_row(pos, size, None) {
                return found;
            }
        }
        cursor
    }

    /// Row-lane counterpart of [`Self::scan_column`].
    fn scan_row(
        &self,
        cursor: GridPosition,
        size: GridSize,
        col_limit: Option<u32>,
    ) -> Result<GridPosition, u32> {
        let probe = CellRect::new(cursor, size);
        let path = self.items_in_horizontal_path(probe, cursor.col);
        let mut next_col = cursor.col;
        for item in &path {
            if item.pos.col >= next_col.saturating_add(size.x) {
                return Ok(GridPosition::new(next_col, cursor.row));
            }
            next_col = next_col.max(item.rect().right_col());
        }
        match col_limit {
            Some(limit) if next_col.saturating_add(size.x).saturating_sub(1) > limit => Err(path
                .iter()
                .map(|item| item.pos.row.saturating_add(size.y))
                .min()
                .unwrap_or(0)),
            _ => Ok(GridPosition::new(next_col, cursor.row)),
        }
    }

    pub(crate) fn occupied_rows(&self) -> u32 {
        self.placed_items()
            .map(|item| item.rect().last_row())
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn occupied_cols(&self) -> u32 {
        self.placed_items()
            .map(|item| item.rect().last_col())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use dashgrid_core::{CascadeDirection, GridConfig, ItemSpec};

    use super::*;

    fn pos(col: u32, row: u32) -> GridPosition {
        GridPosition::new(col, row)
    }

    fn size(x: u32, y: u32) -> GridSize {
        GridSize::new(x, y)
    }

    fn grid_with(max_cols: u32, max_rows: u32) -> GridModel {
        GridModel::new(GridConfig {
            max_cols,
            max_rows,
            cascade: CascadeDirection::Off,
            ..GridConfig::default()
        })
    }

    fn fill(grid: &mut GridModel, cells: &[(u32, u32)]) {
        for (col, row) in cells {
            grid.add_item(
                ItemSpec::new(pos(*col, *row), size(1, 1)).with_id(format!("c{col}x{row}")),
            )
            .unwrap();
        }
    }

    #[test]
    fn non_colliding_position_is_returned_unchanged() {
        let mut grid = grid_with(0, 0);
        fill(&mut grid, &[(1, 1)]);
        assert_eq!(grid.fix_grid_position(pos(5, 5), size(2, 2)), pos(5, 5));
    }

    #[test]
    fn four_by_four_grid_places_two_by_two_in_only_remaining_corner() {
        // Every cell occupied except the (3,3)-(4,4) square.
        let mut grid = grid_with(4, 0);
        let mut cells = Vec::new();
        for row in 1..=4u32 {
            for col in 1..=4u32 {
                if col >= 3 && row >= 3 {
                    continue;
                }
                cells.push((col, row));
            }
        }
        fill(&mut grid, &cells);
        assert_eq!(grid.fix_grid_position(pos(1, 1), size(2, 2)), pos(3, 3));
    }

    #[test]
    fn gap_between_stacked_items_is_taken_first() {
        let mut grid = grid_with(0, 0);
        grid.add_item(ItemSpec::new(pos(1, 1), size(1, 1)).with_id("top"))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(1, 4), size(1, 1)).with_id("bottom"))
            .unwrap();
        assert_eq!(grid.fix_grid_position(pos(1, 1), size(1, 2)), pos(1, 2));
    }

    #[test]
    fn bounded_columns_overflow_goes_below_the_stack() {
        let mut grid = grid_with(1, 0);
        fill(&mut grid, &[(1, 1)]);
        assert_eq!(grid.fix_grid_position(pos(1, 1), size(1, 1)), pos(1, 2));
    }

    #[test]
    fn unbounded_grid_prefers_an_empty_neighboring_column() {
        let mut grid = grid_with(0, 0);
        fill(&mut grid, &[(1, 1), (1, 2), (1, 3), (1, 4)]);
        assert_eq!(grid.fix_grid_position(pos(1, 1), size(1, 1)), pos(2, 1));
    }

    #[test]
    fn horizontal_fix_scans_by_row() {
        let mut grid = GridModel::new(GridConfig {
            max_rows: 2,
            cascade: CascadeDirection::Left,
            ..GridConfig::default()
        });
        grid.add_item(ItemSpec::new(pos(1, 1), size(2, 1)).with_id("a"))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(1, 2), size(1, 1)).with_id("b"))
            .unwrap();
        // Row 1 is exhausted out to the occupied extent, so the scan drops
        // to row 2 and settles beside b.
        assert_eq!(grid.fix_grid_position(pos(1, 1), size(1, 1)), pos(2, 2));
    }
}
