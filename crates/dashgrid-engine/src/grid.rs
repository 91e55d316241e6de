//! Grid registry: authoritative item bookkeeping and operation orchestration.
//!
//! [`GridModel`] owns the item map, the placed set, and the configuration,
//! and sequences the collision/resolution/cascade machinery for every
//! mutation. All state is exclusively owned; mutation is driven by a single
//! input-handling path, so there are no interior locks.
//!
//! # Invariants
//!
//! 1. With overlap disallowed, no two placed items overlap between
//!    operations (pending cascades may still compact further).
//! 2. Every id in the placed set resolves in the item map; stale ids are
//!    pruned during collision scans.
//! 3. At most one bounded axis after configuration sanitizing.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use dashgrid_core::{
    CascadeDirection, CellRect, GridConfig, GridError, GridItem, GridPosition, GridSize, ItemId,
    ItemSpec, PixelPoint, UidGenerator,
};

use crate::bounds;
use crate::cascade::CascadeScheduler;
use crate::events::{GridEvent, MoveCause};
use crate::interact::Interaction;

/// One grid instance: items, placement state, and configuration.
#[derive(Debug)]
pub struct GridModel {
    pub(crate) config: GridConfig,
    pub(crate) items: FxHashMap<ItemId, GridItem>,
    /// Items currently occupying lattice cells. Ordered so collision scans
    /// and displacement are deterministic.
    pub(crate) placed: BTreeSet<ItemId>,
    pub(crate) uid: UidGenerator,
    pub(crate) last_z: u64,
    pub(crate) extent: (u32, u32),
    pub(crate) events: VecDeque<GridEvent>,
    pub(crate) scheduler: CascadeScheduler,
    pub(crate) interaction: Interaction,
    pub(crate) destroyed: bool,
}

impl Default for GridModel {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl GridModel {
    #[must_use]
    pub fn new(mut config: GridConfig) -> Self {
        Self::sanitize(&mut config);
        Self {
            config,
            items: FxHashMap::default(),
            placed: BTreeSet::new(),
            uid: UidGenerator::new(),
            last_z: 0,
            extent: (0, 0),
            events: VecDeque::new(),
            scheduler: CascadeScheduler::default(),
            interaction: Interaction::Idle,
            destroyed: false,
        }
    }

    /// Active (sanitized) configuration.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Reconcile a new configuration against the active one.
    ///
    /// Only concerns whose fields actually changed are re-applied: a bounds
    /// change reflows out-of-bounds items, any change re-attaches placed
    /// items and re-runs cascade.
    pub fn apply_config(&mut self, mut new: GridConfig) -> Result<(), GridError> {
        self.ensure_live()?;
        Self::sanitize(&mut new);
        let diff = self.config.diff(&new);
        if diff.is_empty() {
            return Ok(());
        }
        debug!(?diff, "reconciling grid configuration");
        self.config = new;
        if diff.bounds {
            self.reflow_after_bounds_change();
        }
        let ids: Vec<ItemId> = self.placed.iter().cloned().collect();
        self.placed.clear();
        for id in ids {
            self.attach(&id);
        }
        self.cascade_grid(None);
        self.update_extent();
        self.trigger_cascade();
        Ok(())
    }

    /// Add an item to the grid.
    ///
    /// The size is floored to the configured minimum. Unless `prefer_new`
    /// is set, a colliding requested position is resolved to the nearest
    /// free slot before insertion. A missing or already-taken id is
    /// (re)generated.
    pub fn add_item(&mut self, spec: ItemSpec) -> Result<ItemId, GridError> {
        self.ensure_live()?;
        let pos = spec.pos.validate()?;
        let size = spec.size.validate()?.max_per_axis(self.config.min_size);
        let mut pos = bounds::clamp_pos_to_cols(pos, size, self.config.max_cols);
        if !bounds::fits_rows(pos, size, self.config.max_rows, false) {
            pos = bounds::clamp_pos_to_rows(pos, size, self.config.max_rows);
        }
        let pos = if self.config.prefer_new {
            pos
        } else {
            self.fix_grid_position(pos, size)
        };

        let id = match spec.id {
            Some(id) if !self.items.contains_key(&id) => id,
            Some(taken) => {
                let fresh = self.mint_id();
                debug!(taken = %taken, fresh = %fresh, "item id already in use; regenerated");
                fresh
            }
            None => self.mint_id(),
        };

        self.items.insert(
            id.clone(),
            GridItem {
                id: id.clone(),
                pos,
                size,
                fixed: spec.fixed,
                z_order: 0,
            },
        );
        self.attach(&id);
        self.update_extent();
        self.push_event(GridEvent::ItemAdded { id: id.clone() });
        self.trigger_cascade();
        Ok(id)
    }

    /// Remove an item from the grid.
    ///
    /// Permitted after teardown so hosts can release items during their own
    /// destruction; the follow-up cascade is skipped in that case.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<(), GridError> {
        if !self.items.contains_key(id) {
            return Err(GridError::UnknownItem { id: id.clone() });
        }
        self.detach(id);
        self.items.remove(id);
        self.push_event(GridEvent::ItemRemoved { id: id.clone() });
        if self.destroyed {
            return Ok(());
        }
        self.update_extent();
        self.trigger_cascade();
        Ok(())
    }

    /// Move an item to a new position, displacing colliding neighbors.
    ///
    /// The target is clamped to the grid bounds first. The cascade pass run
    /// here is anchored at the moved rect so compaction flows around it
    /// instead of re-displacing it.
    pub fn move_item(&mut self, id: &ItemId, pos: GridPosition) -> Result<(), GridError> {
        self.ensure_live()?;
        let pos = pos.validate()?;
        let (from, size) = {
            let item = self
                .items
                .get(id)
                .ok_or_else(|| GridError::UnknownItem { id: id.clone() })?;
            (item.pos, item.size)
        };

        let mut target = bounds::clamp_pos_to_cols(pos, size, self.config.max_cols);
        if !bounds::fits_rows(target, size, self.config.max_rows, false) {
            target = bounds::clamp_pos_to_rows(target, size, self.config.max_rows);
        }
        if target == from {
            return Ok(());
        }

        self.detach(id);
        if let Some(item) = self.items.get_mut(id) {
            item.pos = target;
        }
        let rect = CellRect::new(target, size);
        self.fix_grid_collisions(rect);
        self.cascade_grid(Some(rect));
        self.attach(id);
        self.push_event(GridEvent::ItemMoved {
            id: id.clone(),
            from,
            to: target,
            cause: MoveCause::Direct,
        });
        self.update_extent();
        self.trigger_cascade();
        Ok(())
    }

    /// Resize an item in place, displacing colliding neighbors.
    ///
    /// The size is floored to the configured minimum and clamped to the
    /// grid bounds at the item's position.
    pub fn resize_item(&mut self, id: &ItemId, size: GridSize) -> Result<(), GridError> {
        self.ensure_live()?;
        let size = size.validate()?.max_per_axis(self.config.min_size);
        let (pos, old) = {
            let item = self
                .items
                .get(id)
                .ok_or_else(|| GridError::UnknownItem { id: id.clone() })?;
            (item.pos, item.size)
        };

        let mut target = bounds::clamp_size_to_cols(pos, size, self.config.max_cols);
        target = bounds::clamp_size_to_rows(pos, target, self.config.max_rows);
        if target == old {
            return Ok(());
        }

        self.detach(id);
        if let Some(item) = self.items.get_mut(id) {
            item.size = target;
        }
        let rect = CellRect::new(pos, target);
        self.fix_grid_collisions(rect);
        self.cascade_grid(Some(rect));
        self.attach(id);
        self.push_event(GridEvent::ItemResized {
            id: id.clone(),
            from: old,
            to: target,
        });
        self.update_extent();
        self.trigger_cascade();
        Ok(())
    }

    /// Change the grid bounds (`0` = unbounded), reflowing items that no
    /// longer fit.
    pub fn set_bounds(&mut self, max_cols: u32, max_rows: u32) -> Result<(), GridError> {
        self.ensure_live()?;
        let mut next = self.config.clone();
        next.max_cols = max_cols;
        next.max_rows = max_rows;
        Self::sanitize(&mut next);
        if next.max_cols == self.config.max_cols && next.max_rows == self.config.max_rows {
            return Ok(());
        }
        self.config = next;
        self.reflow_after_bounds_change();
        self.cascade_grid(None);
        self.update_extent();
        self.trigger_cascade();
        Ok(())
    }

    /// Change the cascade direction and re-pack immediately.
    pub fn set_cascade_direction(&mut self, cascade: CascadeDirection) -> Result<(), GridError> {
        self.ensure_live()?;
        if self.config.cascade == cascade {
            return Ok(());
        }
        self.config.cascade = cascade;
        if self.config.overlap_conflicts() {
            warn!(?cascade, "overlap disabled: a cascade direction is active");
            self.config.allow_overlap = false;
        }
        if self.config.resolve_bound_conflict() {
            debug!(
                max_cols = self.config.max_cols,
                max_rows = self.config.max_rows,
                "dropped orthogonal bound; only one axis may be bounded"
            );
        }
        self.cascade_grid(None);
        self.update_extent();
        Ok(())
    }

    #[must_use]
    pub fn get_item_position(&self, id: &ItemId) -> Option<GridPosition> {
        self.items.get(id).map(|item| item.pos)
    }

    #[must_use]
    pub fn get_item_size(&self, id: &ItemId) -> Option<GridSize> {
        self.items.get(id).map(|item| item.size)
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&GridItem> {
        self.items.get(id)
    }

    /// Whether the item currently occupies lattice cells.
    #[must_use]
    pub fn is_placed(&self, id: &ItemId) -> bool {
        self.placed.contains(id)
    }

    /// Placed items in deterministic id order.
    pub fn placed_items(&self) -> impl Iterator<Item = &GridItem> {
        self.placed.iter().filter_map(|id| self.items.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum occupied `(col, row)`, `(0, 0)` when nothing is placed.
    #[must_use]
    pub fn extent(&self) -> (u32, u32) {
        self.extent
    }

    /// Find the placed item covering a pixel position.
    ///
    /// The host supplies the pixel-to-grid conversion; containment is
    /// evaluated on lattice cells.
    pub fn query_item_at<F>(&self, point: PixelPoint, to_grid: F) -> Option<&GridItem>
    where
        F: Fn(PixelPoint) -> GridPosition,
    {
        let cell = to_grid(point);
        self.placed_items()
            .find(|item| item.rect().contains_cell(cell.col, cell.row))
    }

    /// Tear the grid down. Placement operations fail afterwards; item
    /// removal stays permitted for host-side cleanup.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn ensure_live(&self) -> Result<(), GridError> {
        if self.destroyed {
            return Err(GridError::Destroyed);
        }
        Ok(())
    }

    /// Insert an item into the placed set, displacing anything in its way.
    ///
    /// The item must not already be in the placed set: collision scans rely
    /// on the probe rect being detached.
    pub(crate) fn attach(&mut self, id: &ItemId) {
        let Some(item) = self.items.get(id) else {
            return;
        };
        let rect = item.rect();
        if self.has_collision(rect) {
            self.fix_grid_collisions(rect);
        }
        if self.config.allow_overlap {
            let z = self.next_z();
            if let Some(item) = self.items.get_mut(id) {
                item.z_order = z;
            }
        }
        self.placed.insert(id.clone());
    }

    pub(crate) fn detach(&mut self, id: &ItemId) {
        self.placed.remove(id);
    }

    pub(crate) fn next_z(&mut self) -> u64 {
        self.last_z += 1;
        self.last_z
    }

    pub(crate) fn mint_id(&mut self) -> ItemId {
        let items = &self.items;
        self.uid.next_unique(|candidate| items.contains_key(candidate))
    }

    /// Re-validate every placed item after a bounds change: clamp oversized
    /// items to the new bound and re-resolve anything colliding or out of
    /// bounds.
    pub(crate) fn reflow_after_bounds_change(&mut self) {
        let ids: Vec<ItemId> = self.placed.iter().cloned().collect();
        for id in ids {
            let Some(item) = self.items.get(&id) else {
                continue;
            };
            let pos = item.pos;
            let mut size = item.size;
            let rect = item.rect();

            let size_ok = (self.config.max_cols == 0 || size.x <= self.config.max_cols)
                && (self.config.max_rows == 0 || size.y <= self.config.max_rows);
            let placed_ok = !self.has_collision_excluding(rect, Some(&id))
                && bounds::fits_bounds(pos, size, self.config.max_cols, self.config.max_rows, false);
            if size_ok && placed_ok {
                continue;
            }

            self.detach(&id);

            if self.config.max_cols > 0 && size.x > self.config.max_cols {
                size.x = self.config.max_cols;
            } else if self.config.max_rows > 0 && size.y > self.config.max_rows {
                size.y = self.config.max_rows;
            }
            if let Some(item) = self.items.get_mut(&id) {
                if item.size != size {
                    let from = item.size;
                    item.size = size;
                    self.push_event(GridEvent::ItemResized {
                        id: id.clone(),
                        from,
                        to: size,
                    });
                }
            }

            // Pull the position back inside the new bounds before resolving
            // so a non-colliding stray does not slip through the resolver's
            // fast path.
            let mut target = bounds::clamp_pos_to_cols(pos, size, self.config.max_cols);
            if !bounds::fits_rows(target, size, self.config.max_rows, false) {
                target = bounds::clamp_pos_to_rows(target, size, self.config.max_rows);
            }
            let rect = CellRect::new(target, size);
            if self.has_collision(rect)
                || !bounds::fits_bounds(target, size, self.config.max_cols, self.config.max_rows, true)
            {
                target = self.fix_grid_position(target, size);
            }
            if target != pos {
                if let Some(item) = self.items.get_mut(&id) {
                    item.pos = target;
                }
                self.push_event(GridEvent::ItemMoved {
                    id: id.clone(),
                    from: pos,
                    to: target,
                    cause: MoveCause::Displaced,
                });
            }

            self.attach(&id);
        }
    }

    pub(crate) fn update_extent(&mut self) {
        let mut cols = 0;
        let mut rows = 0;
        for item in self.placed_items() {
            cols = cols.max(item.rect().last_col());
            rows = rows.max(item.rect().last_row());
        }
        if (cols, rows) != self.extent {
            self.extent = (cols, rows);
            self.push_event(GridEvent::ExtentChanged { cols, rows });
        }
    }

    fn sanitize(config: &mut GridConfig) {
        config.min_size.x = config.min_size.x.max(1);
        config.min_size.y = config.min_size.y.max(1);
        if config.overlap_conflicts() {
            warn!(
                cascade = ?config.cascade,
                "overlap disabled: a cascade direction is active"
            );
            config.allow_overlap = false;
        }
        if config.resolve_bound_conflict() {
            debug!(
                max_cols = config.max_cols,
                max_rows = config.max_rows,
                "dropped orthogonal bound; only one axis may be bounded"
            );
        }
    }
}
