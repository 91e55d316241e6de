//! Typed grid configuration and field-level change detection.
//!
//! The configuration is an explicit struct reconciled by diffing: callers
//! hand the engine a whole [`GridConfig`], the engine computes a
//! [`ConfigDiff`] against the active one and reacts only to the concerns
//! that actually changed.

use serde::{Deserialize, Serialize};

use crate::geometry::GridSize;

/// Edge toward which cascade compaction packs items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeDirection {
    #[default]
    Up,
    Down,
    Left,
    Right,
    Off,
}

impl CascadeDirection {
    /// Axis the cascade compacts along, `None` when cascade is off.
    ///
    /// `Up`/`Down` (and `Left`/`Right`) share an axis: both pack toward the
    /// origin in grid space, and the host flips the pixel mapping for the
    /// far-edge variants.
    #[must_use]
    pub const fn axis(self) -> Option<Axis> {
        match self {
            Self::Up | Self::Down => Some(Axis::Vertical),
            Self::Left | Self::Right => Some(Axis::Horizontal),
            Self::Off => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_off(self) -> bool {
        matches!(self, Self::Off)
    }
}

/// Resolved displacement/search axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Configured axis for position fixing and collision displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixDirection {
    Vertical,
    Horizontal,
    /// Derive the axis from the active cascade direction.
    #[default]
    FromCascade,
}

impl FixDirection {
    /// Resolve to a concrete axis. `FromCascade` follows the cascade axis
    /// and falls back to vertical when cascade is off.
    #[must_use]
    pub fn resolve(self, cascade: CascadeDirection) -> Axis {
        match self {
            Self::Vertical => Axis::Vertical,
            Self::Horizontal => Axis::Horizontal,
            Self::FromCascade => cascade.axis().unwrap_or(Axis::Vertical),
        }
    }
}

/// Full configuration surface of one grid instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Maximum columns, `0` = unbounded.
    pub max_cols: u32,
    /// Maximum rows, `0` = unbounded.
    pub max_rows: u32,
    pub cascade: CascadeDirection,
    /// Allow items to share cells. Mutually exclusive with an active
    /// cascade; cascade wins.
    pub allow_overlap: bool,
    /// Axis used when resolving a colliding item's own position.
    pub item_fix: FixDirection,
    /// Axis used when displacing neighbors out of an incoming rect.
    pub collision_fix: FixDirection,
    /// Keep a new item's requested position instead of resolving it first.
    pub prefer_new: bool,
    /// Minimum item extent in cells.
    pub min_size: GridSize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_cols: 0,
            max_rows: 0,
            cascade: CascadeDirection::Up,
            allow_overlap: false,
            item_fix: FixDirection::FromCascade,
            collision_fix: FixDirection::FromCascade,
            prefer_new: false,
            min_size: GridSize::new(1, 1),
        }
    }
}

impl GridConfig {
    /// Whether overlap is requested alongside an active cascade direction.
    #[must_use]
    pub fn overlap_conflicts(&self) -> bool {
        self.allow_overlap && !self.cascade.is_off()
    }

    /// Enforce the one-bounded-axis rule.
    ///
    /// When both `max_cols` and `max_rows` are positive, the cascade
    /// direction decides which to drop: horizontal cascade zeroes
    /// `max_cols`, everything else zeroes `max_rows`. A bound on the
    /// packing axis would make compaction and displacement fight over the
    /// same cells.
    ///
    /// Returns `true` when a bound was zeroed.
    pub fn resolve_bound_conflict(&mut self) -> bool {
        if self.max_cols == 0 || self.max_rows == 0 {
            return false;
        }
        match self.cascade.axis() {
            Some(Axis::Horizontal) => self.max_cols = 0,
            _ => self.max_rows = 0,
        }
        true
    }

    /// Concrete axis for resolving a new/moved item's position.
    #[must_use]
    pub fn item_fix_axis(&self) -> Axis {
        self.item_fix.resolve(self.cascade)
    }

    /// Concrete axis for displacing colliding neighbors.
    #[must_use]
    pub fn collision_fix_axis(&self) -> Axis {
        self.collision_fix.resolve(self.cascade)
    }

    /// Field-group change flags between two configurations.
    #[must_use]
    pub fn diff(&self, other: &GridConfig) -> ConfigDiff {
        ConfigDiff {
            bounds: self.max_cols != other.max_cols || self.max_rows != other.max_rows,
            cascade: self.cascade != other.cascade,
            overlap: self.allow_overlap != other.allow_overlap,
            fix: self.item_fix != other.item_fix || self.collision_fix != other.collision_fix,
            prefer_new: self.prefer_new != other.prefer_new,
            min_size: self.min_size != other.min_size,
        }
    }
}

/// Which configuration concerns changed between two [`GridConfig`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigDiff {
    pub bounds: bool,
    pub cascade: bool,
    pub overlap: bool,
    pub fix: bool,
    pub prefer_new: bool,
    pub min_size: bool,
}

impl ConfigDiff {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.bounds || self.cascade || self.overlap || self.fix || self.prefer_new || self.min_size)
    }
}
