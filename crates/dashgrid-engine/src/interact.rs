//! Interactive drag and resize sessions.
//!
//! At most one session is active at a time; drag and resize are mutually
//! exclusive. The active item is detached from the placed set for the
//! duration of the session, and its live rect acts as the cascade obstacle
//! so other items flow around it. Cancelling restores the geometry captured
//! at session start.

use dashgrid_core::{CellRect, GridError, GridPosition, GridSize, ItemId};

use crate::bounds;
use crate::events::{GridEvent, MoveCause};
use crate::grid::GridModel;

/// Geometry snapshot taken when a session starts, for cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) id: ItemId,
    pub(crate) entry_pos: GridPosition,
    pub(crate) entry_size: GridSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Interaction {
    #[default]
    Idle,
    Dragging(Session),
    Resizing(Session),
}

impl GridModel {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging(_))
    }

    #[must_use]
    pub fn is_resizing(&self) -> bool {
        matches!(self.interaction, Interaction::Resizing(_))
    }

    /// Item owning the active session, if any.
    #[must_use]
    pub fn active_item(&self) -> Option<&ItemId> {
        match &self.interaction {
            Interaction::Idle => None,
            Interaction::Dragging(session) | Interaction::Resizing(session) => Some(&session.id),
        }
    }

    /// Live rect of the active session's item, used to bias cascade passes.
    pub(crate) fn active_obstacle(&self) -> Option<CellRect> {
        self.active_item()
            .and_then(|id| self.items.get(id))
            .map(|item| item.rect())
    }

    /// Start dragging an item. The item leaves the placed set until the
    /// session ends.
    pub fn begin_drag(&mut self, id: &ItemId) -> Result<(), GridError> {
        let session = self.begin_session(id)?;
        self.interaction = Interaction::Dragging(session);
        self.push_event(GridEvent::DragStarted { id: id.clone() });
        Ok(())
    }

    /// Move the dragged item to a new cell.
    ///
    /// The target is clamped to the grid bounds. Nothing happens unless the
    /// cell actually changes; when it does and a cascade direction is
    /// active, neighbors are displaced out of the way and compacted around
    /// the dragged rect immediately.
    pub fn drag_to(&mut self, pos: GridPosition) -> Result<(), GridError> {
        self.ensure_live()?;
        let Interaction::Dragging(session) = &self.interaction else {
            return Err(GridError::NoActiveInteraction);
        };
        let id = session.id.clone();
        let pos = pos.validate()?;
        let (current, size) = match self.items.get(&id) {
            Some(item) => (item.pos, item.size),
            None => return Err(GridError::UnknownItem { id }),
        };

        let mut target = bounds::clamp_pos_to_cols(pos, size, self.config.max_cols);
        if !bounds::fits_rows(target, size, self.config.max_rows, false) {
            target = bounds::clamp_pos_to_rows(target, size, self.config.max_rows);
        }
        if target == current {
            return Ok(());
        }

        if let Some(item) = self.items.get_mut(&id) {
            item.pos = target;
        }
        if !self.config.cascade.is_off() {
            let rect = CellRect::new(target, size);
            self.fix_grid_collisions(rect);
            self.cascade_grid(Some(rect));
        }
        self.push_event(GridEvent::ItemMoved {
            id,
            from: current,
            to: target,
            cause: MoveCause::Direct,
        });
        Ok(())
    }

    /// Finish the drag session, re-attaching the item where it stands.
    pub fn end_drag(&mut self) -> Result<ItemId, GridError> {
        self.ensure_live()?;
        let Interaction::Dragging(session) = std::mem::take(&mut self.interaction) else {
            return Err(GridError::NoActiveInteraction);
        };
        self.finish_session(&session.id);
        self.push_event(GridEvent::DragEnded {
            id: session.id.clone(),
        });
        self.trigger_cascade();
        Ok(session.id)
    }

    /// Start resizing an item. The item leaves the placed set until the
    /// session ends.
    pub fn begin_resize(&mut self, id: &ItemId) -> Result<(), GridError> {
        let session = self.begin_session(id)?;
        self.interaction = Interaction::Resizing(session);
        self.push_event(GridEvent::ResizeStarted { id: id.clone() });
        Ok(())
    }

    /// Resize the active item to a new cell size.
    ///
    /// The size is floored to the configured minimum and clamped to the
    /// bounds at the item's position; collisions and cascade are handled as
    /// in [`Self::drag_to`].
    pub fn resize_to(&mut self, size: GridSize) -> Result<(), GridError> {
        self.ensure_live()?;
        let Interaction::Resizing(session) = &self.interaction else {
            return Err(GridError::NoActiveInteraction);
        };
        let id = session.id.clone();
        let size = size.validate()?.max_per_axis(self.config.min_size);
        let (pos, current) = match self.items.get(&id) {
            Some(item) => (item.pos, item.size),
            None => return Err(GridError::UnknownItem { id }),
        };

        let mut target = bounds::clamp_size_to_cols(pos, size, self.config.max_cols);
        target = bounds::clamp_size_to_rows(pos, target, self.config.max_rows);
        if target == current {
            return Ok(());
        }

        if let Some(item) = self.items.get_mut(&id) {
            item.size = target;
        }
        if !self.config.cascade.is_off() {
            let rect = CellRect::new(pos, target);
            self.fix_grid_collisions(rect);
            self.cascade_grid(Some(rect));
        }
        self.push_event(GridEvent::ItemResized {
            id,
            from: current,
            to: target,
        });
        Ok(())
    }

    /// Finish the resize session, re-attaching the item at its new size.
    pub fn end_resize(&mut self) -> Result<ItemId, GridError> {
        self.ensure_live()?;
        let Interaction::Resizing(session) = std::mem::take(&mut self.interaction) else {
            return Err(GridError::NoActiveInteraction);
        };
        self.finish_session(&session.id);
        self.push_event(GridEvent::ResizeEnded {
            id: session.id.clone(),
        });
        self.trigger_cascade();
        Ok(session.id)
    }

    /// Abort the active session, restoring the geometry captured at its
    /// start.
    ///
    /// Works on a destroyed grid too, so hosts can unwind an in-flight
    /// interaction during teardown.
    pub fn cancel_interaction(&mut self) -> Result<ItemId, GridError> {
        let session = match std::mem::take(&mut self.interaction) {
            Interaction::Idle => return Err(GridError::NoActiveInteraction),
            Interaction::Dragging(session) | Interaction::Resizing(session) => session,
        };
        if let Some(item) = self.items.get_mut(&session.id) {
            item.pos = session.entry_pos;
            item.size = session.entry_size;
        }
        self.finish_session(&session.id);
        self.push_event(GridEvent::InteractionCanceled {
            id: session.id.clone(),
        });
        Ok(session.id)
    }

    fn begin_session(&mut self, id: &ItemId) -> Result<Session, GridError> {
        self.ensure_live()?;
        if !matches!(self.interaction, Interaction::Idle) {
            return Err(GridError::InteractionActive);
        }
        let (entry_pos, entry_size) = match self.items.get(id) {
            Some(item) => (item.pos, item.size),
            None => return Err(GridError::UnknownItem { id: id.clone() }),
        };
        self.detach(id);
        if self.config.allow_overlap {
            let z = self.next_z();
            if let Some(item) = self.items.get_mut(id) {
                item.z_order = z;
            }
        }
        Ok(Session {
            id: id.clone(),
            entry_pos,
            entry_size,
        })
    }

    fn finish_session(&mut self, id: &ItemId) {
        self.attach(id);
        self.cascade_grid(None);
        self.update_extent();
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

    #[test]
    fn sessions_are_mutually_exclusive() {
        let mut grid = GridModel::new(GridConfig::default());
        let a = grid.add_item(ItemSpec::new(pos(1, 1), size(1, 1))).unwrap();
        let b = grid.add_item(ItemSpec::new(pos(3, 1), size(1, 1))).unwrap();

        grid.begin_drag(&a).unwrap();
        assert_eq!(grid.begin_drag(&b), Err(GridError::InteractionActive));
        assert_eq!(grid.begin_resize(&b), Err(GridError::InteractionActive));
        assert_eq!(grid.resize_to(size(2, 2)), Err(GridError::NoActiveInteraction));
        assert_eq!(grid.active_item(), Some(&a));

        grid.end_drag().unwrap();
        assert!(grid.begin_resize(&b).is_ok());
    }

    #[test]
    fn dragged_item_leaves_the_placed_set_until_drop() {
        let mut grid = GridModel::new(GridConfig::default());
        let id = grid.add_item(ItemSpec::new(pos(1, 1), size(1, 1))).unwrap();

        grid.begin_drag(&id).unwrap();
        assert!(!grid.is_placed(&id));
        grid.drag_to(pos(4, 2)).unwrap();
        assert_eq!(grid.get_item_position(&id).unwrap(), pos(4, 2));

        grid.end_drag().unwrap();
        assert!(grid.is_placed(&id));
    }

    #[test]
    fn drag_displaces_neighbors_and_compacts_around_the_obstacle() {
        let mut grid = GridModel::new(GridConfig {
            prefer_new: true,
            ..GridConfig::default()
        });
        let mover = grid
            .add_item(ItemSpec::new(pos(1, 1), size(2, 2)).with_id("mover"))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(1, 3), size(2, 2)).with_id("under"))
            .unwrap();
        grid.settle();

        grid.begin_drag(&mover).unwrap();
        grid.drag_to(pos(1, 3)).unwrap();
        // The dragged rect owns (1,3)-(2,4); the incumbent is pushed out
        // and then compacts into the free rows above the obstacle.
        let under = grid
            .get_item_position(&ItemId::from("under"))
            .unwrap();
        assert_eq!(under, pos(1, 1));
        assert!(
            grid.find_collisions_excluding(
                CellRect::new(pos(1, 3), size(2, 2)),
                Some(&mover)
            )
            .is_empty()
        );
        grid.end_drag().unwrap();
        assert_eq!(grid.get_item_position(&mover).unwrap(), pos(1, 3));
    }

    #[test]
    fn cancel_restores_entry_geometry() {
        let mut grid = GridModel::new(GridConfig::default());
        let id = grid.add_item(ItemSpec::new(pos(2, 2), size(2, 2))).unwrap();
        grid.settle();
        let before = grid.get_item_position(&id).unwrap();

        grid.begin_drag(&id).unwrap();
        grid.drag_to(pos(6, 6)).unwrap();
        let returned = grid.cancel_interaction().unwrap();
        assert_eq!(returned, id);
        assert_eq!(grid.get_item_position(&id).unwrap(), before);
        assert_eq!(grid.get_item_size(&id).unwrap(), size(2, 2));
        assert!(grid.is_placed(&id));
        assert!(!grid.is_dragging());
    }

    #[test]
    fn resize_grows_and_pushes_neighbors() {
        let mut grid = GridModel::new(GridConfig {
            prefer_new: true,
            ..GridConfig::default()
        });
        let top = grid
            .add_item(ItemSpec::new(pos(1, 1), size(1, 1)).with_id("top"))
            .unwrap();
        grid.add_item(ItemSpec::new(pos(1, 2), size(1, 1)).with_id("below"))
            .unwrap();
        grid.settle();

        grid.begin_resize(&top).unwrap();
        grid.resize_to(size(1, 2)).unwrap();
        grid.end_resize().unwrap();
        grid.settle();

        assert_eq!(grid.get_item_size(&top).unwrap(), size(1, 2));
        assert_eq!(
            grid.get_item_position(&ItemId::from("below")).unwrap(),
            pos(1, 3)
        );
    }

    #[test]
    fn cancel_still_works_after_teardown() {
        let mut grid = GridModel::new(GridConfig::default());
        let id = grid.add_item(ItemSpec::new(pos(2, 2), size(1, 1))).unwrap();
        grid.settle();
        let entry = grid.get_item_position(&id).unwrap();

        grid.begin_drag(&id).unwrap();
        grid.drag_to(pos(5, 5)).unwrap();
        grid.destroy();
        grid.drain_events();

        let returned = grid.cancel_interaction().unwrap();
        assert_eq!(returned, id);
        assert_eq!(grid.get_item_position(&id).unwrap(), entry);
        assert!(grid.is_placed(&id));
        assert!(!grid.is_dragging());
        // No compaction pass runs on a destroyed grid.
        let moves = grid
            .drain_events()
            .iter()
            .filter(|event| matches!(event, GridEvent::ItemMoved { .. }))
            .count();
        assert_eq!(moves, 0);
    }

    #[test]
    fn drag_to_same_cell_is_a_no_op() {
        let mut grid = GridModel::new(GridConfig::default());
        let id = grid.add_item(ItemSpec::new(pos(2, 1), size(1, 1))).unwrap();
        grid.settle();
        grid.drain_events();

        grid.begin_drag(&id).unwrap();
        grid.drag_to(pos(2, 1)).unwrap();
        let moves = grid
            .drain_events()
            .iter()
            .filter(|event| matches!(event, GridEvent::ItemMoved { .. }))
            .count();
        assert_eq!(moves, 0);
    }

    #[test]
    fn overlap_mode_bumps_stacking_order_on_session_start() {
        let mut grid = GridModel::new(GridConfig {
            allow_overlap: true,
            cascade: CascadeDirection::Off,
            ..GridConfig::default()
        });
        let a = grid.add_item(ItemSpec::new(pos(1, 1), size(2, 2))).unwrap();
        let b = grid.add_item(ItemSpec::new(pos(1, 1), size(2, 2))).unwrap();

        grid.begin_drag(&a).unwrap();
        grid.end_drag().unwrap();
        let a_z = grid.item(&a).unwrap().z_order;
        let b_z = grid.item(&b).unwrap().z_order;
        assert!(a_z > b_z);

        grid.begin_resize(&b).unwrap();
        grid.end_resize().unwrap();
        assert!(grid.item(&b).unwrap().z_order > a_z);
    }
}
