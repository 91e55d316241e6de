//! Collision detection over the placed set.
//!
//! Overlap tests are half-open on both axes: two rects collide when their
//! `[col, col + x)` and `[row, row + y)` intervals both intersect. Scans
//! walk the placed set in id order so results are deterministic, and prune
//! any id that no longer resolves in the item map.

use tracing::warn;

use dashgrid_core::{CellRect, GridItem, ItemId};

use crate::grid::GridModel;

impl GridModel {
    /// Ids of placed items overlapping `rect`, excluding `exclude`.
    ///
    /// Returns nothing when overlap is globally allowed. A stale id in the
    /// placed set is a recovered condition, not a fatal one: it is dropped
    /// with a diagnostic and the scan continues.
    pub(crate) fn find_collisions_excluding(
        &mut self,
        rect: CellRect,
        exclude: Option<&ItemId>,
    ) -> Vec<ItemId> {
        if self.config.allow_overlap {
            return Vec::new();
        }

        let mut hits = Vec::new();
        let mut stale = Vec::new();
        for id in &self.placed {
            if Some(id) == exclude {
                continue;
            }
            match self.items.get(id) {
                Some(item) if item.rect().overlaps(rect) => hits.push(id.clone()),
                Some(_) => {}
                None => stale.push(id.clone()),
            }
        }
        for id in stale {
            warn!(id = %id, "pruned stale id from the placed set");
            self.placed.remove(&id);
        }
        hits
    }

    pub(crate) fn find_collisions(&mut self, rect: CellRect) -> Vec<ItemId> {
        self.find_collisions_excluding(rect, None)
    }

    pub(crate) fn has_collision(&mut self, rect: CellRect) -> bool {
        !self.find_collisions(rect).is_empty()
    }

    pub(crate) fn has_collision_excluding(
        &mut self,
        rect: CellRect,
        exclude: Option<&ItemId>,
    ) -> bool {
        !self.find_collisions_excluding(rect, exclude).is_empty()
    }

    /// Placed items whose column span intersects `rect`'s and whose extent
    /// reaches `from_row` or below, sorted by row then column.
    ///
    /// This is the directional search lane for a vertical position scan:
    /// everything at or under `from_row` inside the column band, with no
    /// lower cap.
    pub(crate) fn items_in_vertical_path(&self, rect: CellRect, from_row: u32) -> Vec<GridItem> {
        let mut path: Vec<GridItem> = self
            .placed_items()
            .filter(|item| {
                let r = item.rect();
                r.last_row() >= from_row
                    && r.pos.col <= rect.last_col()
                    && r.last_col() >= rect.pos.col
            })
            .cloned()
            .collect();
        path.sort_by(|a, b| {
            (a.pos.row, a.pos.col, &a.id).cmp(&(b.pos.row, b.pos.col, &b.id))
        });
        path
    }

    /// Row-band counterpart of [`Self::items_in_vertical_path`], sorted by
    /// column then row.
    pub(crate) fn items_in_horizontal_path(&self, rect: CellRect, from_col: u32) -> Vec<GridItem> {
        let mut path: Vec<GridItem> = self
            .placed_items()
            .filter(|item| {
                let r = item.rect();
                r.last_col() >= from_col
                    && r.pos.row <= rect.last_row()
                    && r.last_row() >= rect.pos.row
            })
            .cloned()
            .collect();
        path.sort_by(|a, b| {
            (a.pos.col, a.pos.row, &a.id).cmp(&(b.pos.col, b.pos.row, &b.id))
        });
        path
    }
}
