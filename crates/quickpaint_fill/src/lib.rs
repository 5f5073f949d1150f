//! Zone-bounded flood fill for quickpaint
//!
//! Fills the empty, 4-connected area around a click inside a rectangular
//! zone supplied by the host. Fills larger than
//! [`MAX_FILL_AREA`](config::MAX_FILL_AREA) stop and wait for confirmation.
//! Complete in-zone fills spill a few tiles past every zone edge they touch
//! (overpaint) so terrain bleeds cleanly across zone borders.
//!
//! # Example
//!
//! ```rust
//! use quickpaint_fill::{FillEngine, FillHost, FillState, ZoneBounds};
//!
//! struct Room;
//!
//! impl FillHost for Room {
//!     fn zone_bounds(&self, _x: i32, _y: i32) -> Option<ZoneBounds> {
//!         Some(ZoneBounds::new(0, 0, 8, 4))
//!     }
//!
//!     fn is_tile_occupied(&self, x: i32, _y: i32, _layer: u32) -> bool {
//!         x == 4
//!     }
//! }
//!
//! let mut engine = FillEngine::default();
//! engine.set_fill_object(0, 12, 1);
//! let result = engine.start_fill(&Room, 1, 1, false);
//!
//! assert_eq!(engine.state(), FillState::Preview);
//! assert!(result.count() > 16);
//! let confirmed = engine.confirm_fill();
//! let placements = engine.placements_for(confirmed);
//! assert!(!placements.is_empty());
//! ```

pub mod config;
pub mod engine;
pub mod flood;

pub use config::{FillConfig, MAX_FILL_AREA, OUTSIDE_ZONE_RADIUS, OVERPAINT_SIZE};
pub use engine::{FillEngine, FillHost, FillObserver, FillResult, FillState};
pub use flood::{add_overpaint, flood_fill, FloodOutcome, ZoneBounds};

// Re-export quickpaint_core
pub use quickpaint_core;
