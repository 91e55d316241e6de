//! Cascade compaction and its deferred scheduler.
//!
//! The compactor slides every non-fixed item as far as possible toward the
//! configured edge. Items are processed in sorted order (row-major for a
//! vertical cascade, column-major for a horizontal one) against a running
//! per-lane frontier, which makes the pass deterministic and idempotent:
//! re-running it on a stable grid moves nothing.
//!
//! Mutations do not compact synchronously. They raise a pending flag via
//! [`GridModel::trigger_cascade`]; the host drives [`GridModel::settle`]
//! once per scheduling tick, so a burst of changes (a drag in progress, a
//! batch of adds) collapses into one pass. Triggers issued while a pass is
//! pending join it; a [`CascadeTicket`] lets callers observe when their
//! trigger has been covered.

use rustc_hash::FxHashMap;
use tracing::debug;

use dashgrid_core::{CellRect, GridError, GridPosition, GridSize, ItemId};

use crate::bounds;
use crate::events::{GridEvent, MoveCause};
use crate::grid::GridModel;

/// Coalesces cascade requests into at most one outstanding pass.
#[derive(Debug, Default)]
pub(crate) struct CascadeScheduler {
    pending: bool,
    generation: u64,
}

/// Handle for one cascade trigger; resolved when the pending pass it joined
/// has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeTicket {
    generation: u64,
}

impl GridModel {
    /// Request a deferred compaction pass.
    ///
    /// At most one pass is outstanding: triggering while one is pending
    /// joins it instead of queueing a second.
    pub fn trigger_cascade(&mut self) -> CascadeTicket {
        self.scheduler.pending = true;
        CascadeTicket {
            generation: self.scheduler.generation,
        }
    }

    #[must_use]
    pub fn has_pending_cascade(&self) -> bool {
        self.scheduler.pending
    }

    /// Whether the pass a ticket joined has run.
    #[must_use]
    pub fn is_settled(&self, ticket: CascadeTicket) -> bool {
        self.scheduler.generation > ticket.generation
    }

    /// Run the pending compaction pass, if any. Returns whether a pass ran.
    ///
    /// The pass reads the grid as it is now, not as it was at trigger time.
    /// A mid-interaction settle treats the active item's rect as the
    /// obstacle, exactly as an anchored cascade would.
    pub fn settle(&mut self) -> bool {
        if !self.scheduler.pending {
            return false;
        }
        self.scheduler.pending = false;
        self.scheduler.generation += 1;
        if self.destroyed {
            return false;
        }
        self.cascade_grid(None);
        self.update_extent();
        self.push_event(GridEvent::CascadeSettled);
        true
    }

    /// Run a compaction pass synchronously, optionally anchored at an
    /// obstacle rect.
    ///
    /// Supplying a position without a size (or the reverse) is malformed
    /// input.
    pub fn run_cascade(
        &mut self,
        pos: Option<GridPosition>,
        size: Option<GridSize>,
    ) -> Result<(), GridError> {
        self.ensure_live()?;
        let obstacle = match (pos, size) {
            (Some(pos), Some(size)) => Some(CellRect::new(pos, size)),
            (None, None) => None,
            _ => return Err(GridError::ObstacleMismatch),
        };
        self.cascade_grid(obstacle);
        self.update_extent();
        Ok(())
    }

    /// Compact every non-fixed item toward the cascade edge.
    ///
    /// `obstacle` biases the pass around a transient rect (an item being
    /// dragged or resized): items sharing its lanes that cannot fit on the
    /// near side are pushed past its far edge. When no obstacle is given
    /// and an interaction is active, the active item's rect is used.
    pub(crate) fn cascade_grid(&mut self, obstacle: Option<CellRect>) {
        if self.destroyed || self.config.allow_overlap {
            return;
        }
        let Some(axis) = self.config.cascade.axis() else {
            return;
        };
        let obstacle = obstacle.or_else(|| self.active_obstacle());
        match axis {
            dashgrid_core::Axis::Vertical => self.cascade_vertical(obstacle),
            dashgrid_core::Axis::Horizontal => self.cascade_horizontal(obstacle),
        }
    }

    fn cascade_vertical(&mut self, obstacle: Option<CellRect>) {
        let mut order: Vec<ItemId> = self.placed.iter().cloned().collect();
        order.sort_by_key(|id| {
            self.items
                .get(id)
                .map_or((u32::MAX, u32::MAX), |item| (item.pos.row, item.pos.col))
        });

        // Next free row per column; columns absent from the map are free
        // from row 1.
        let mut frontier: FxHashMap<u32, u32> = FxHashMap::default();
        let mut moved = 0usize;

        for id in order {
            let Some(item) = self.items.get(&id) else {
                continue;
            };
            let (pos, size, fixed) = (item.pos, item.size, item.fixed);

            if fixed {
                continue;
            }

            let mut target_row = (pos.col..pos.col.saturating_add(size.x))
                .map(|col| frontier.get(&col).copied().unwrap_or(1))
                .max()
                .unwrap_or(1);

            if let Some(ob) = obstacle {
                let shares_columns =
                    pos.col < ob.right_col() && pos.col.saturating_add(size.x) > ob.pos.col;
                if shares_columns {
                    let room_above = ob
                        .pos
                        .row
                        .checked_sub(target_row)
                        .is_some_and(|gap| size.y <= gap);
                    if !room_above {
                        target_row = target_row.max(ob.bottom_row());
                    }
                }
            }

            // Fixed items never move, so candidates step over them instead
            // of relying on the frontier.
            loop {
                let probe = CellRect::new(GridPosition::new(pos.col, target_row), size);
                match self.fixed_blocker_bottom(probe) {
                    Some(bottom) if bottom > target_row => target_row = bottom,
                    _ => break,
                }
            }

            let new_pos = GridPosition::new(pos.col, target_row);
            let mut final_row = pos.row;
            if target_row != pos.row
                && bounds::fits_rows(new_pos, size, self.config.max_rows, false)
            {
                self.detach(&id);
                if let Some(item) = self.items.get_mut(&id) {
                    item.pos = new_pos;
                }
                // Re-attach through the fixer: an obstacle push can land on
                // an item later in the order.
                self.attach(&id);
                self.push_event(GridEvent::ItemMoved {
                    id: id.clone(),
                    from: pos,
                    to: new_pos,
                    cause: MoveCause::Cascade,
                });
                final_row = target_row;
                moved += 1;
            }

            for col in pos.col..pos.col.saturating_add(size.x) {
                let lane = frontier.entry(col).or_insert(1);
                *lane = (*lane).max(final_row.saturating_add(size.y));
            }
        }

        if moved > 0 {
            debug!(moved, "vertical cascade pass relocated items");
        }
    }

    fn cascade_horizontal(&mut self, obstacle: Option<CellRect>) {
        let mut order: Vec<ItemId> = self.placed.iter().cloned().collect();
        order.sort_by_key(|id| {
            self.items
                .get(id)
                .map_or((u32::MAX, u32::MAX), |item| (item.pos.col, item.pos.row))
        });

        let mut frontier: FxHashMap<u32, u32> = FxHashMap::default();
        let mut moved = 0usize;

        for id in order {
            let Some(item) = self.items.get(&id) else {
                continue;
            };
            let (pos, size, fixed) = (item.pos, item.size, item.fixed);

            if fixed {
                continue;
            }

            let mut target_col = (pos.row..pos.row.saturating_add(size.y))
                .map(|row| frontier.get(&row).copied().unwrap_or(1))
                .max()
                .unwrap_or(1);

            if let Some(ob) = obstacle {
                let shares_rows =
                    pos.row < ob.bottom_row() && pos.row.saturating_add(size.y) > ob.pos.row;
                if shares_rows {
                    let room_beside = ob
                        .pos
                        .col
                        .checked_sub(target_col)
                        .is_some_and(|gap| size.x <= gap);
                    if !room_beside {
                        target_col = target_col.max(ob.right_col());
                    }
                }
            }

            loop {
                let probe = CellRect::new(GridPosition::new(target_col, pos.row), size);
                match self.fixed_blocker_right(probe) {
                    Some(right) if right > target_col => target_col = right,
                    _ => break,
                }
            }

            let new_pos = GridPosition::new(target_col, pos.row);
            let mut final_col = pos.col;
            if target_col != pos.col
                && bounds::fits_cols(new_pos, size, self.config.max_cols, false)
            {
                self.detach(&id);
                if let Some(item) = self.items.get_mut(&id) {
                    item.pos = new_pos;
                }
                self.attach(&id);
                self.push_event(GridEvent::ItemMoved {
                    id: id.clone(),
                    from: pos,
                    to: new_pos,
                    cause: MoveCause::Cascade,
                });
                final_col = target_col;
                moved += 1;
            }

            for row in pos.row..pos.row.saturating_add(size.y) {
                let lane = frontier.entry(row).or_insert(1);
                *lane = (*lane).max(final_col.saturating_add(size.x));
            }
        }

        if moved > 0 {
            debug!(moved, "horizontal cascade pass relocated items");
        }
    }

    fn fixed_blocker_bottom(&self, probe: CellRect) -> Option<u32> {
        self.placed_items()
            .filter(|item| item.fixed && item.rect().overlaps(probe))
            .map(|item| item.rect().bottom_row())
            .max()
    }

    fn fixed_blocker_right(&self, probe: CellRect) -> Option<u32> {
        self.placed_items()
            .filter(|item| item.fixed && item.rect().overlaps(probe))
            .map(|item| item.rect().right_col())
            .max()
    }
}

#[cfg(test)]
mod tests {
    use dashgrid_core::{CascadeDirection, GridConfig, GridPosition, GridSize, ItemSpec};

    use super::*;

    fn pos(col: u32, row: u32) -> GridPosition {
        GridPosition::new(col, row)
    }

    fn size(x: u32, y: u32) -> GridSize {
        GridSize::new(x, y)
    }

    fn row_of(grid: &GridModel, id: &str) -> u32 {
        grid.get_item_position(&ItemId::from(id)).unwrap().row
    }

    fn col_of(grid: &GridModel, id: &str) -> u32 {
        grid.get_item_position(&ItemId::from(id)).unwrap().col
    }

    #[test]
    fn cascade_up_packs_in_row_order() {
        let mut grid = GridModel::new(GridConfig {
            prefer_new: true,
            ..GridConfig::default()
        });
        grid.add_item(ItemSpec::new(pos(1, 5), size(1, 1)).with_id("five"))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(1, 3), size(1, 1)).with_id("three"))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(1, 8), size(1, 1)).with_id("eight"))
            .unwrap();

        assert!(grid.settle());
        assert_eq!(row_of(&grid, "three"), 1);
        assert_eq!(row_of(&grid, "five"), 2);
        assert_eq!(row_of(&grid, "eight"), 3);
    }

    #[test]
    fn cascade_left_packs_in_column_order() {
        let mut grid = GridModel::new(GridConfig {
            cascade: CascadeDirection::Left,
            prefer_new: true,
            ..GridConfig::default()
        });
        grid.add_item(ItemSpec::new(pos(6, 1), size(1, 1)).with_id("far"))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(3, 1), size(1, 1)).with_id("near"))
            .unwrap();

        assert!(grid.settle());
        assert_eq!(col_of(&grid, "near"), 1);
        assert_eq!(col_of(&grid, "far"), 2);
    }

    #[test]
    fn cascade_is_idempotent() {
        let mut grid = GridModel::new(GridConfig::default());
        for (i, (col, row)) in [(1, 4), (2, 2), (1, 7), (3, 3)].iter().enumerate() {
            grid.add_item(
                ItemSpec::new(pos(*col, *row), size(1, 2)).with_id(format!("i{i}")),
            )
            .unwrap();
        }
        grid.settle();
        grid.drain_events();

        grid.cascade_grid(None);
        let second_pass_moves = grid
            .drain_events()
            .iter()
            .filter(|event| matches!(event, GridEvent::ItemMoved { .. }))
            .count();
        assert_eq!(second_pass_moves, 0);
    }

    #[test]
    fn fixed_items_hold_their_row_and_are_stepped_over() {
        let mut grid = GridModel::new(GridConfig {
            prefer_new: true,
            ..GridConfig::default()
        });
        grid.add_item(ItemSpec::new(pos(1, 3), size(1, 2)).with_id("anchor").fixed(true))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(1, 6), size(1, 1)).with_id("one"))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(1, 8), size(1, 1)).with_id("two"))
            .unwrap();

        grid.settle();
        assert_eq!(row_of(&grid, "anchor"), 3);
        // First drifter slots above the anchor; the second cannot and lands
        // below it.
        assert_eq!(row_of(&grid, "one"), 1);
        assert_eq!(row_of(&grid, "two"), 2);
    }

    #[test]
    fn obstacle_blocks_items_that_cannot_fit_above_it() {
        let mut grid = GridModel::new(GridConfig {
            prefer_new: true,
            ..GridConfig::default()
        });
        grid.add_item(ItemSpec::new(pos(1, 6), size(1, 3)).with_id("tall"))
            .unwrap();
        // Obstacle occupies (1,2)-(1,3): a 3-high item has no room above.
        grid.run_cascade(Some(pos(1, 2)), Some(size(1, 2)))
            .unwrap();
        assert_eq!(row_of(&grid, "tall"), 4);

        // A short item fits above the same obstacle.
        grid.add_item(ItemSpec::new(pos(2, 6), size(1, 1)).with_id("short"))
            .unwrap();
        grid.run_cascade(Some(pos(2, 2)), Some(size(1, 2)))
            .unwrap();
        assert_eq!(row_of(&grid, "short"), 1);
    }

    #[test]
    fn half_specified_obstacle_is_rejected() {
        let mut grid = GridModel::new(GridConfig::default());
        assert_eq!(
            grid.run_cascade(Some(pos(1, 1)), None),
            Err(GridError::ObstacleMismatch)
        );
    }

    #[test]
    fn triggers_coalesce_into_one_pass() {
        let mut grid = GridModel::new(GridConfig::default());
        let first = grid.trigger_cascade();
        let second = grid.trigger_cascade();
        assert!(grid.has_pending_cascade());
        assert!(!grid.is_settled(first));

        assert!(grid.settle());
        assert!(grid.is_settled(first));
        assert!(grid.is_settled(second));
        assert!(!grid.settle());

        let third = grid.trigger_cascade();
        assert!(!grid.is_settled(third));
        assert!(grid.settle());
        assert!(grid.is_settled(third));
    }

    #[test]
    fn settle_on_a_destroyed_grid_runs_nothing() {
        let mut grid = GridModel::new(GridConfig::default());
        grid.add_item(ItemSpec::new(pos(1, 4), size(1, 1)).with_id("a"))
            .unwrap();
        grid.destroy();
        assert!(!grid.settle());
        assert_eq!(row_of(&grid, "a"), 4);
    }
}
