//! Core data types for the quickpaint terrain engine
//!
//! This crate holds the plain data shared by the painting and fill engines:
//! grid positions, terrain and slope labels, brushes and object placements.
//! It has no knowledge of any host editor.
//!
//! # Example
//!
//! ```rust
//! use quickpaint_core::{Brush, TerrainLabel};
//!
//! let mut brush = Brush::new("Grassland", vec!["Pa1_grass.*".to_string()]);
//! brush.set_terrain_tile(TerrainLabel::Top, 5);
//!
//! assert!(brush.matches_tileset("Pa1_grass_day"));
//! assert_eq!(brush.terrain_tile(TerrainLabel::Top), Some(5));
//! ```

mod brush;
mod label;
mod placement;
mod position;

pub use brush::{Brush, BrushError, BrushMode, TilesetCategory, TilesetSlot, MAX_TILE_ID};
pub use label::{
    SlopeCategory, SlopeLabel, SlopeSide, SlopeSize, TerrainLabel, TileLabel, SLOPE_HEIGHT,
};
pub use placement::{merge_columns, merge_runs, ObjectPlacement};
pub use position::{Axis, Position, TileId, TileKey, TileSnapshot, MAX_LAYER};
