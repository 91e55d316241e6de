#![forbid(unsafe_code)]

//! Grid layout engine: interactive placement on an integer cell lattice.
//!
//! [`GridModel`] tracks items by id, detects collisions with half-open
//! rectangle overlap, resolves colliding placements with a directional
//! first-fit scan, displaces neighbors when a rect must claim its slot, and
//! compacts the layout toward a configured edge ("cascade"). Compaction is
//! deferred and coalesced: mutations raise a pending flag and the host
//! drives [`GridModel::settle`] once per scheduling tick, so bursts of
//! changes produce one pass.
//!
//! The engine works purely in grid-cell coordinates. Hosts supply pixel
//! conversions at the boundary ([`GridModel::query_item_at`]) and render
//! from the state reported through [`GridModel::drain_events`].

pub mod bounds;

mod cascade;
mod collision;
mod displace;
mod events;
mod grid;
mod interact;
mod resolve;

pub use cascade::CascadeTicket;
pub use events::{GridEvent, MoveCause};
pub use grid::GridModel;

pub use dashgrid_core::{
    Axis, CascadeDirection, CellRect, ConfigDiff, FixDirection, GridConfig, GridError, GridItem,
    GridPosition, GridSize, ItemId, ItemSpec, PixelPoint, UidGenerator,
};
