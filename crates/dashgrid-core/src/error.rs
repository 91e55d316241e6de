//! Engine error type.
//!
//! Only contract violations surface as errors. Recoverable conditions (an
//! overlap request alongside an active cascade, a stale id in the placed
//! set) are handled in place with a diagnostic and never abort an
//! operation.

use thiserror::Error;

use crate::item::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Positions are 1-based; a zero column or row is malformed input.
    #[error("grid position ({col}, {row}) is outside the 1-based lattice")]
    InvalidPosition { col: u32, row: u32 },

    /// Items occupy at least one cell on each axis.
    #[error("grid size {x}x{y} must be at least one cell per axis")]
    InvalidSize { x: u32, y: u32 },

    /// An anchored cascade needs both the obstacle position and size, or
    /// neither.
    #[error("cascade obstacle requires both a position and a size, or neither")]
    ObstacleMismatch,

    /// The referenced item is not tracked by this grid.
    #[error("no item with id `{id}` is tracked by this grid")]
    UnknownItem { id: ItemId },

    /// A drag or resize session is already active; sessions are mutually
    /// exclusive.
    #[error("an interactive drag or resize session is already active")]
    InteractionActive,

    /// The operation needs an active drag/resize session.
    #[error("no interactive drag or resize session is active")]
    NoActiveInteraction,

    /// The grid was torn down; placement operations are disabled.
    #[error("grid has been destroyed")]
    Destroyed,
}
