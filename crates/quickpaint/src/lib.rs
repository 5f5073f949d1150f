//! Quickpaint terrain painting
//!
//! Umbrella crate re-exporting the quickpaint workspace:
//!
//! - [`quickpaint_core`]: positions, labels, brushes and placements
//! - [`quickpaint_autotile`]: the 8-neighbor terrain classifier
//! - [`quickpaint_engine`]: the stroke painting engine
//! - `quickpaint_fill`: the zone flood fill (feature `fill`, on by default)
//!
//! ```rust
//! use quickpaint::prelude::*;
//!
//! let mut brush = Brush::new("Cave", vec![]);
//! brush.set_terrain_tile(TerrainLabel::Bottom, 3);
//!
//! let mut engine = PaintingEngine::default();
//! engine.set_brush(brush);
//! engine.start_painting(Position::new(5, 0));
//! engine.update_painting(Position::new(2, 0));
//! let placements = engine.finish_painting(None);
//! assert_eq!(placements[0].width, 4);
//! ```

pub use quickpaint_autotile;
pub use quickpaint_core;
pub use quickpaint_engine;
#[cfg(feature = "fill")]
pub use quickpaint_fill;

/// The types most hosts need
pub mod prelude {
    pub use quickpaint_core::{
        Brush, BrushError, ObjectPlacement, Position, SlopeLabel, TerrainLabel, TileKey, TileLabel,
        TileSnapshot,
    };
    pub use quickpaint_engine::{EngineConfig, PaintObserver, PaintingEngine, PaintingMode, Shape};
    #[cfg(feature = "fill")]
    pub use quickpaint_fill::{
        FillConfig, FillEngine, FillHost, FillObserver, FillResult, FillState, ZoneBounds,
    };
}
