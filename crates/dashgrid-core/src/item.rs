//! Item identity and placement records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{CellRect, GridPosition, GridSize};

/// Stable identifier for a grid item.
///
/// Hosts may supply their own ids; the engine generates one when absent and
/// regenerates on a clash with an existing item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Monotonic id generator.
///
/// Ids are never reused within one generator; uniqueness against a live
/// registry is re-checked by the caller through the `exists` probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UidGenerator {
    counter: u64,
}

impl UidGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next id in sequence.
    pub fn mint(&mut self) -> ItemId {
        self.counter = self.counter.wrapping_add(1);
        ItemId(format!("item-{}", self.counter))
    }

    /// Mint ids until one does not collide with an existing key.
    pub fn next_unique<F>(&mut self, exists: F) -> ItemId
    where
        F: Fn(&ItemId) -> bool,
    {
        loop {
            let id = self.mint();
            if !exists(&id) {
                return id;
            }
        }
    }
}

/// A tracked item: identity plus lattice placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridItem {
    pub id: ItemId,
    pub pos: GridPosition,
    pub size: GridSize,
    /// Fixed items never move during cascade compaction but still collide.
    pub fixed: bool,
    /// Visual stacking order, bumped when overlap is allowed. Irrelevant to
    /// placement.
    pub z_order: u64,
}

impl GridItem {
    /// The cells this item occupies.
    #[inline]
    #[must_use]
    pub fn rect(&self) -> CellRect {
        CellRect::new(self.pos, self.size)
    }
}

/// Host-facing description of an item to add to a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Desired id; generated when `None`, regenerated when already taken.
    pub id: Option<ItemId>,
    pub pos: GridPosition,
    pub size: GridSize,
    pub fixed: bool,
}

impl ItemSpec {
    #[must_use]
    pub fn new(pos: GridPosition, size: GridSize) -> Self {
        Self {
            id: None,
            pos,
            size,
            fixed: false,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }
}
