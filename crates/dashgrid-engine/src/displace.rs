//! Collision displacement: clearing a rect's slot by pushing neighbors.
//!
//! An incoming rect that must occupy its cells evicts every collider to the
//! far side of itself along the collision-fix axis; each eviction may
//! collide in turn, so settlement is transitive. Instead of mutual
//! recursion this runs an explicit LIFO of rects pending settlement: a rect
//! with colliders is re-queued beneath them, which reproduces the two-phase
//! settle where the initiating rect is re-checked after its evictees land.
//!
//! Termination: every displacement moves the evicted item strictly past the
//! offending rect's far edge, and the fallback for a bounded axis wraps
//! onto fresh lanes past the rect on the other axis, so no displacement
//! cycle exists while at most one axis is bounded.

use dashgrid_core::{Axis, CellRect, GridPosition, ItemId};
use tracing::trace;

use crate::bounds;
use crate::events::{GridEvent, MoveCause};
use crate::grid::GridModel;

impl GridModel {
    /// Displace every placed item colliding with `rect` until the slot is
    /// clear.
    ///
    /// On return `rect` has zero collisions. The rect's own item, if any,
    /// must be detached by the caller.
    pub(crate) fn fix_grid_collisions(&mut self, rect: CellRect) {
        let axis = self.config.collision_fix_axis();
        let mut pending: Vec<(CellRect, Option<ItemId>)> = vec![(rect, None)];

        while let Some((rect, owner)) = pending.pop() {
            let collisions = self.find_collisions_excluding(rect, owner.as_ref());
            if collisions.is_empty() {
                continue;
            }
            // Evictees may land back in this rect's way; check it again
            // after they settle.
            pending.push((rect, owner));

            for id in collisions.into_iter().rev() {
                let Some(item) = self.items.get(&id) else {
                    continue;
                };
                let (from, size) = (item.pos, item.size);
                let target = match axis {
                    Axis::Vertical => {
                        let mut target = GridPosition::new(from.col, rect.bottom_row());
                        if !bounds::fits_rows(target, size, self.config.max_rows, false) {
                            target = GridPosition::new(rect.right_col(), 1);
                        }
                        target
                    }
                    Axis::Horizontal => {
                        let mut target = GridPosition::new(rect.right_col(), from.row);
                        if !bounds::fits_cols(target, size, self.config.max_cols, false) {
                            target = GridPosition::new(1, rect.bottom_row());
                        }
                        target
                    }
                };

                trace!(id = %id, from = ?(from.col, from.row), to = ?(target.col, target.row), "displaced colliding item");
                self.detach(&id);
                if let Some(item) = self.items.get_mut(&id) {
                    item.pos = target;
                }
                self.placed.insert(id.clone());
                self.push_event(GridEvent::ItemMoved {
                    id: id.clone(),
                    from,
                    to: target,
                    cause: MoveCause::Displaced,
                });
                pending.push((CellRect::new(target, size), Some(id)));
            }
        }
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

    fn quiet_grid() -> GridModel {
        GridModel::new(GridConfig {
            cascade: CascadeDirection::Off,
            ..GridConfig::default()
        })
    }

    #[test]
    fn single_collider_is_pushed_past_the_rect() {
        let mut grid = quiet_grid();
        grid.add_item(ItemSpec::new(pos(1, 2), size(1, 1)).with_id("victim"))
            .unwrap();
        grid.fix_grid_collisions(CellRect::new(pos(1, 1), size(2, 2)));
        assert_eq!(
            grid.get_item_position(&ItemId::from("victim")).unwrap(),
            pos(1, 3)
        );
    }

    #[test]
    fn displacement_chains_transitively() {
        let mut grid = quiet_grid();
        grid.add_item(ItemSpec::new(pos(1, 2), size(1, 1)).with_id("first"))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(1, 3), size(1, 1)).with_id("second"))
            .unwrap();
        let rect = CellRect::new(pos(1, 1), size(1, 2));
        grid.fix_grid_collisions(rect);

        assert!(grid.find_collisions(rect).is_empty());
        let first = grid.get_item_position(&ItemId::from("first")).unwrap();
        let second = grid.get_item_position(&ItemId::from("second")).unwrap();
        assert_eq!(first, pos(1, 3));
        assert_eq!(second, pos(1, 4));
    }

    #[test]
    fn bounded_rows_wrap_displacement_onto_the_next_column() {
        let mut grid = GridModel::new(GridConfig {
            max_rows: 2,
            cascade: CascadeDirection::Off,
            ..GridConfig::default()
        });
        grid.add_item(ItemSpec::new(pos(1, 2), size(1, 1)).with_id("victim"))
            .unwrap();
        grid.fix_grid_collisions(CellRect::new(pos(1, 1), size(2, 2)));
        assert_eq!(
            grid.get_item_position(&ItemId::from("victim")).unwrap(),
            pos(3, 1)
        );
    }

    #[test]
    fn horizontal_fix_pushes_across_columns() {
        let mut grid = GridModel::new(GridConfig {
            cascade: CascadeDirection::Left,
            ..GridConfig::default()
        });
        grid.add_item(ItemSpec::new(pos(2, 1), size(1, 1)).with_id("victim"))
            .unwrap();
        // Detached probe occupying (1,1)-(2,1).
        grid.fix_grid_collisions(CellRect::new(pos(1, 1), size(2, 1)));
        assert_eq!(
            grid.get_item_position(&ItemId::from("victim")).unwrap(),
            pos(3, 1)
        );
    }

    #[test]
    fn initiating_rect_is_clear_on_return() {
        let mut grid = quiet_grid();
        for row in 1..=4u32 {
            grid.add_item(ItemSpec::new(pos(1, row), size(2, 1)).with_id(format!("r{row}")))
                .unwrap();
        }
        let rect = CellRect::new(pos(1, 2), size(2, 2));
        grid.fix_grid_collisions(rect);
        assert!(grid.find_collisions(rect).is_empty());
    }
}
