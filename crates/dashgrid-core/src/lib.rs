#![forbid(unsafe_code)]

//! Core model types for the dashgrid layout engine.
//!
//! This crate is deliberately free of any placement logic: it defines the
//! integer lattice primitives ([`GridPosition`], [`GridSize`], [`CellRect`]),
//! the item records tracked by a grid ([`ItemId`], [`GridItem`]), and the
//! typed configuration surface ([`GridConfig`]) shared between the engine and
//! host adapters. The engine crate (`dashgrid-engine`) consumes these types
//! and owns all mutation.

pub mod config;
pub mod error;
pub mod geometry;
pub mod item;

pub use config::{Axis, CascadeDirection, ConfigDiff, FixDirection, GridConfig};
pub use error::GridError;
pub use geometry::{CellRect, GridPosition, GridSize, PixelPoint};
pub use item::{GridItem, ItemId, ItemSpec, UidGenerator};
