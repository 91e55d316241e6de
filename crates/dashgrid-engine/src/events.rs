//! Host-facing event notifications.
//!
//! Mutations queue events instead of invoking callbacks so the single
//! input-handling path stays re-entrancy free; hosts drain the queue after
//! each operation or settle.

use serde::{Deserialize, Serialize};

use dashgrid_core::{GridPosition, GridSize, ItemId};

use crate::grid::GridModel;

/// Why an item's position changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveCause {
    /// Host-requested move.
    Direct,
    /// Relocated by a cascade compaction pass.
    Cascade,
    /// Pushed aside to make room for an incoming rect.
    Displaced,
}

/// Notification emitted by grid mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GridEvent {
    ItemAdded {
        id: ItemId,
    },
    ItemRemoved {
        id: ItemId,
    },
    ItemMoved {
        id: ItemId,
        from: GridPosition,
        to: GridPosition,
        cause: MoveCause,
    },
    ItemResized {
        id: ItemId,
        from: GridSize,
        to: GridSize,
    },
    /// A deferred cascade pass ran; every trigger that joined the pending
    /// pass is settled by this one event.
    CascadeSettled,
    ExtentChanged {
        cols: u32,
        rows: u32,
    },
    DragStarted {
        id: ItemId,
    },
    DragEnded {
        id: ItemId,
    },
    ResizeStarted {
        id: ItemId,
    },
    ResizeEnded {
        id: ItemId,
    },
    InteractionCanceled {
        id: ItemId,
    },
}

impl GridModel {
    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain(..).collect()
    }

    /// Number of queued events.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn push_event(&mut self, event: GridEvent) {
        self.events.push_back(event);
    }
}
