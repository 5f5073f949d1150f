//! Stroke-based terrain painting
//!
//! A stroke is a sequence of pointer positions. The engine turns it into a
//! simple 4-connected path, labels every cell with the terrain piece it
//! depicts (edges, outer and inner corners, slopes) and emits merged object
//! placements for the host editor.
//!
//! Two painting modes are available:
//!
//! - **Deferred** (default): the labelled outline is previewed while the
//!   stroke grows, and placements are emitted when it finishes.
//! - **Immediate**: each cell is auto-tiled from its neighbors and emitted
//!   at once.
//!
//! The [`shapes`] module adds plain tools next to strokes: auto-tiled
//! rectangles and ellipses, single-tile lines and an eraser.
//!
//! # Example
//!
//! ```rust
//! use quickpaint_engine::PaintingEngine;
//! use quickpaint_core::{Brush, Position, TerrainLabel};
//!
//! let mut brush = Brush::new("Grassland", vec![]);
//! brush.set_terrain_tile(TerrainLabel::Top, 5);
//!
//! let mut engine = PaintingEngine::default();
//! engine.set_brush(brush);
//! engine.start_painting(Position::new(0, 0));
//! engine.update_painting(Position::new(2, 0));
//!
//! let placements = engine.finish_painting(None);
//! assert_eq!(placements.len(), 1);
//! assert_eq!(placements[0].width, 3);
//! ```

pub mod config;
pub mod direction;
pub mod engine;
pub mod finalize;
pub mod outline;
pub mod path;
pub mod session;
pub mod shapes;
pub mod slope;

pub use config::{EngineConfig, PaintingMode, PaintingState, DEFAULT_LAYER, MAX_LAYER};
pub use direction::{PaintingDirection, StrokeDirection};
pub use engine::{PaintObserver, PaintingEngine};
pub use finalize::{LabeledPlacement, StrokeContext, TerrainEdits};
pub use outline::{resolve_outline, Edge, Outline};
pub use path::{build_valid_path, PathState, DEFAULT_DAMPENING, MAX_DAMPENING};
pub use session::PaintingSession;
pub use shapes::{ellipse, interpolate, line, rectangle, Shape};
pub use slope::{SlopeMode, SlopePreview, SlopeSegment};

// Re-export quickpaint_core
pub use quickpaint_core;
