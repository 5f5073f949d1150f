//! Per-stroke painting session

use crate::direction::{PaintingDirection, StrokeDirection};
use crate::finalize::LabeledPlacement;
use crate::outline::Outline;
use crate::path::PathState;
use crate::slope::{SlopeMode, SlopeSegment};
use quickpaint_core::{Position, TileKey, TileSnapshot};
use std::collections::HashSet;
use uuid::Uuid;

/// Everything the engine tracks while a stroke is in progress
#[derive(Debug, Clone, Default)]
pub struct PaintingSession {
    /// Identifies the stroke in logs
    pub id: Uuid,
    pub start: Option<Position>,
    pub current: Option<Position>,
    pub last: Option<Position>,
    /// Accepted stroke cells, in order
    pub path: Vec<Position>,
    /// Tiles emitted so far in immediate mode
    pub pending_placements: Vec<LabeledPlacement>,
    pub outline: Outline,
    /// Occupancy snapshot; survives [`reset`](Self::reset)
    pub existing_tiles: TileSnapshot,
    pub placed_tiles: HashSet<TileKey>,
    pub initial_direction: Option<StrokeDirection>,
    pub painting_direction: PaintingDirection,
    pub path_state: PathState,
    pub committed_slopes: Vec<SlopeSegment>,
    pub slope_mode: SlopeMode,
    /// Path indices where the stroke jumped to a slope exit
    pub slope_joins: HashSet<usize>,
}

impl PaintingSession {
    /// Clear the stroke, keeping the occupancy snapshot
    pub fn reset(&mut self) {
        let existing_tiles = std::mem::take(&mut self.existing_tiles);
        *self = Self {
            existing_tiles,
            ..Self::default()
        };
    }

    /// Committed slopes plus the slope-mode preview
    pub fn slope_segments(&self) -> Vec<SlopeSegment> {
        let mut segments = self.committed_slopes.clone();
        if self.slope_mode.active {
            segments.extend(self.slope_mode.preview.map(|preview| preview.segment()));
        }
        segments
    }

    /// Cells the path walker may not enter
    pub fn blocked_cells(&self) -> HashSet<Position> {
        self.committed_slopes.iter().flat_map(SlopeSegment::footprint).collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
