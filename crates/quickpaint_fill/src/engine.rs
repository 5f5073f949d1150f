//! Fill state machine
//!
//! ```text
//! Idle ──start_fill──▶ Preview ─────────────confirm_fill──▶ Idle
//!   │                     ▲
//!   └─(limit hit)─▶ WaitingConfirm ─continue_fill─┘
//! ```
//!
//! A fill that starts outside every zone, or on an occupied tile, stays
//! `Idle`. An outside-zone fill that hits the limit is cancelled instead of
//! waiting for confirmation.

use crate::config::FillConfig;
use crate::flood::{add_overpaint, flood_fill, ZoneBounds};
use quickpaint_core::{merge_columns, ObjectPlacement, Position, TileId, MAX_LAYER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Level queries a fill needs from the host
pub trait FillHost {
    /// Zone containing the tile, if any
    fn zone_bounds(&self, x: i32, y: i32) -> Option<ZoneBounds>;

    /// Is the tile taken by an object the fill must flow around?
    fn is_tile_occupied(&self, x: i32, y: i32, layer: u32) -> bool;
}

/// Receives fill notifications. Every method has an empty default.
pub trait FillObserver {
    fn on_preview_updated(&mut self, _positions: &[Position]) {}

    fn on_confirmed(&mut self, _positions: &[Position]) {}

    fn on_cancelled(&mut self) {}

    /// The fill stopped at the area limit with `count` cells
    fn on_warning(&mut self, _count: usize) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillState {
    #[default]
    Idle,
    /// Complete fill shown to the user
    Preview,
    /// Fill stopped at the limit; needs continue or cancel
    WaitingConfirm,
    Confirmed,
}

/// Outcome of a fill operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillResult {
    pub positions: BTreeSet<Position>,
    pub exceeded_limit: bool,
    /// The click was outside every zone and outside fills were not allowed
    pub outside_zone: bool,
    pub interrupted: bool,
}

impl FillResult {
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    fn outside() -> Self {
        Self {
            outside_zone: true,
            ..Self::default()
        }
    }
}

/// Zone-bounded flood fill with a confirmation step for large areas
pub struct FillEngine {
    config: FillConfig,
    state: FillState,
    positions: BTreeSet<Position>,
    fill_object: Option<(u32, TileId)>,
    layer: u32,
    zone: Option<ZoneBounds>,
    start: Option<Position>,
    outside_zone_fill: bool,
    observers: Vec<Box<dyn FillObserver>>,
}

impl Default for FillEngine {
    fn default() -> Self {
        Self::new(FillConfig::default())
    }
}

impl FillEngine {
    pub fn new(config: FillConfig) -> Self {
        Self {
            config: config.clamped(),
            state: FillState::Idle,
            positions: BTreeSet::new(),
            fill_object: None,
            layer: 1,
            zone: None,
            start: None,
            outside_zone_fill: false,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> FillState {
        self.state
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Cells of the current preview
    pub fn fill_positions(&self) -> &BTreeSet<Position> {
        &self.positions
    }

    pub fn layer(&self) -> u32 {
        self.layer
    }

    /// Object to fill with and the layer to place it on
    pub fn set_fill_object(&mut self, tileset: u32, object_id: TileId, layer: u32) {
        self.fill_object = Some((tileset, object_id));
        self.set_layer(layer);
    }

    /// Layer used for occupancy checks and placements, clamped to `0..=MAX_LAYER`
    pub fn set_layer(&mut self, layer: u32) {
        self.layer = layer.min(MAX_LAYER);
    }

    pub fn add_observer(&mut self, observer: Box<dyn FillObserver>) {
        self.observers.push(observer);
    }

    /// Compute the fill area for a click at `(x, y)`.
    ///
    /// `allow_outside_zone` lets clicks outside every zone fill within a
    /// box around the click, without overpaint.
    pub fn start_fill(
        &mut self,
        host: &impl FillHost,
        x: i32,
        y: i32,
        allow_outside_zone: bool,
    ) -> FillResult {
        self.positions.clear();
        self.outside_zone_fill = false;
        self.state = FillState::Idle;

        let start = Position::new(x, y);
        let zone = match host.zone_bounds(x, y) {
            Some(zone) => zone,
            None if allow_outside_zone => {
                self.outside_zone_fill = true;
                ZoneBounds::around(start, self.config.outside_zone_radius)
            }
            None => {
                debug!(x, y, "fill outside every zone refused");
                return FillResult::outside();
            }
        };

        if host.is_tile_occupied(x, y, self.layer) {
            debug!(x, y, "fill started on an occupied tile");
            return FillResult::default();
        }

        self.zone = Some(zone);
        self.start = Some(start);

        let layer = self.layer;
        let outcome = flood_fill(start, zone, Some(self.config.max_area), |pos| {
            !host.is_tile_occupied(pos.x, pos.y, layer)
        });
        self.positions = outcome.positions;
        if self.positions.is_empty() {
            return FillResult::default();
        }

        if outcome.interrupted {
            if self.outside_zone_fill {
                warn!(
                    x,
                    y,
                    cells = self.positions.len(),
                    "outside-zone fill cancelled at the area limit"
                );
                self.positions.clear();
                self.notify(|observer| observer.on_cancelled());
                return FillResult {
                    exceeded_limit: true,
                    interrupted: true,
                    ..FillResult::default()
                };
            }

            self.state = FillState::WaitingConfirm;
            let count = self.positions.len();
            info!(x, y, cells = count, "fill reached the area limit; waiting for confirmation");
            self.emit_preview();
            self.notify(|observer| observer.on_warning(count));
            return FillResult {
                positions: self.positions.clone(),
                exceeded_limit: true,
                outside_zone: false,
                interrupted: true,
            };
        }

        if !self.outside_zone_fill {
            self.positions = add_overpaint(&self.positions, zone, self.config.overpaint_size);
        }
        self.state = FillState::Preview;
        info!(
            x,
            y,
            cells = self.positions.len(),
            outside_zone = self.outside_zone_fill,
            "fill previewed"
        );
        self.emit_preview();

        FillResult {
            positions: self.positions.clone(),
            ..FillResult::default()
        }
    }

    /// Finish a fill held at the limit, without any cap
    pub fn continue_fill(&mut self, host: &impl FillHost) -> FillResult {
        if self.state != FillState::WaitingConfirm {
            return FillResult::default();
        }
        let (Some(zone), Some(start)) = (self.zone, self.start) else {
            return FillResult::default();
        };

        let layer = self.layer;
        let outcome = flood_fill(start, zone, None, |pos| {
            !host.is_tile_occupied(pos.x, pos.y, layer)
        });
        self.positions = add_overpaint(&outcome.positions, zone, self.config.overpaint_size);

        if !self.positions.is_empty() {
            self.state = FillState::Preview;
            info!(cells = self.positions.len(), "fill continued past the area limit");
            self.emit_preview();
        }

        FillResult {
            positions: self.positions.clone(),
            ..FillResult::default()
        }
    }

    /// Accept the preview. Returns the filled cells and resets to `Idle`.
    pub fn confirm_fill(&mut self) -> Vec<Position> {
        if !matches!(self.state, FillState::Preview | FillState::WaitingConfirm) {
            return Vec::new();
        }

        self.state = FillState::Confirmed;
        let positions: Vec<Position> = std::mem::take(&mut self.positions).into_iter().collect();
        info!(cells = positions.len(), "fill confirmed");
        self.notify(|observer| observer.on_confirmed(&positions));

        self.state = FillState::Idle;
        positions
    }

    pub fn cancel_fill(&mut self) {
        self.positions.clear();
        self.state = FillState::Idle;
        debug!("fill cancelled");
        self.notify(|observer| observer.on_cancelled());
        self.notify(|observer| observer.on_preview_updated(&[]));
    }

    /// Column-merged placements for the current preview
    pub fn fill_placements(&self) -> Vec<ObjectPlacement> {
        self.placements_for(self.positions.iter().copied())
    }

    /// Column-merged placements for any set of cells, e.g. a confirmed fill.
    ///
    /// Empty when no fill object is set.
    pub fn placements_for(
        &self,
        positions: impl IntoIterator<Item = Position>,
    ) -> Vec<ObjectPlacement> {
        match self.fill_object {
            Some((tileset, object_id)) => merge_columns(positions, object_id, tileset, self.layer),
            None => Vec::new(),
        }
    }

    fn emit_preview(&mut self) {
        let positions: Vec<Position> = self.positions.iter().copied().collect();
        self.notify(|observer| observer.on_preview_updated(&positions));
    }

    fn notify(&mut self, mut event: impl FnMut(&mut Box<dyn FillObserver>)) {
        for observer in self.observers.iter_mut() {
            event(observer);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
