//! 8-neighbor terrain autotile classifier
//!
//! Packs the occupancy of the eight cells around a tile into a bitmask and
//! maps it to one of the 13 terrain pieces of a [`Brush`](quickpaint_core::Brush).
//!
//! # Example
//!
//! ```rust
//! use quickpaint_autotile::{classify, neighbors};
//! use quickpaint_core::TerrainLabel;
//!
//! assert_eq!(classify(neighbors::TOP), TerrainLabel::Top);
//! assert_eq!(classify(0xFF), TerrainLabel::Center);
//! ```

pub mod bitmask;
pub mod classify;

pub use bitmask::{calculate_bitmask, neighbors, NeighborFlags};
pub use classify::{auto_tile, classify, classify_neighbors};

// Re-export quickpaint_core
pub use quickpaint_core;
