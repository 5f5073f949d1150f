//! Painting engine
//!
//! Drives a stroke from pointer input to placements. The host feeds pointer
//! positions through [`PaintingEngine::start_painting`],
//! [`PaintingEngine::update_painting`] and
//! [`PaintingEngine::finish_painting`], and receives tiles through the
//! returned placements and any registered [`PaintObserver`]s.

use crate::config::{EngineConfig, PaintingMode, PaintingState, MAX_LAYER};
use crate::direction::{PaintingDirection, StrokeDirection};
use crate::finalize::{
    collect_adjacent_existing, finalize_outline, remerge, terrain_aware_modifications,
    LabeledPlacement, StrokeContext,
};
use crate::outline::resolve_outline;
use crate::path::{build_valid_path, MAX_DAMPENING};
use crate::session::PaintingSession;
use crate::shapes::{auto_tile_shape, erase, interpolate, single_tile, Shape};
use crate::slope::{exit_anchor, exit_direction, preview_toward, suggest_default};
use quickpaint_autotile::{auto_tile, classify_neighbors, neighbors, NeighborFlags};
use quickpaint_core::{
    Axis, Brush, ObjectPlacement, Position, SlopeLabel, TileId, TileKey, TileLabel, TileSnapshot,
};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Receives engine output as it happens.
///
/// Every method has an empty default, so observers implement only what they need.
pub trait PaintObserver {
    /// A tile was placed, or an immediate-mode tile was re-tiled
    fn on_place_object(&mut self, _placement: &ObjectPlacement) {}

    /// The deferred outline changed
    fn on_outline_updated(&mut self, _outline: &[Position]) {}

    /// A stroke ended with these placements
    fn on_painting_finished(&mut self, _placements: &[ObjectPlacement]) {}
}

/// Stroke-based terrain painter
pub struct PaintingEngine {
    config: EngineConfig,
    state: PaintingState,
    brush: Option<Brush>,
    session: PaintingSession,
    object_database: TileSnapshot,
    database_refreshed: bool,
    empty_slope_regions: HashSet<TileKey>,
    pending_terrain_deletes: Vec<TileKey>,
    pending_merge_deletes: Vec<TileKey>,
    observers: Vec<Box<dyn PaintObserver>>,
}

impl Default for PaintingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PaintingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.clamped(),
            state: PaintingState::Idle,
            brush: None,
            session: PaintingSession::default(),
            object_database: TileSnapshot::new(),
            database_refreshed: false,
            empty_slope_regions: HashSet::new(),
            pending_terrain_deletes: Vec::new(),
            pending_merge_deletes: Vec::new(),
            observers: Vec::new(),
        }
    }

    // ─── Configuration ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_brush(&mut self, brush: Brush) {
        debug!(brush = %brush.name, "brush selected");
        self.brush = Some(brush);
    }

    pub fn brush(&self) -> Option<&Brush> {
        self.brush.as_ref()
    }

    /// Target layer, clamped to `0..=MAX_LAYER`
    pub fn set_layer(&mut self, layer: u32) {
        self.config.layer = layer.min(MAX_LAYER);
    }

    pub fn layer(&self) -> u32 {
        self.config.layer
    }

    pub fn set_mode(&mut self, mode: PaintingMode) {
        self.config.mode = mode;
    }

    pub fn mode(&self) -> PaintingMode {
        self.config.mode
    }

    /// Dampening factor, clamped to 0..=5
    pub fn set_dampening_factor(&mut self, factor: u8) {
        self.config.dampening_factor = factor.min(MAX_DAMPENING);
    }

    pub fn dampening_factor(&self) -> u8 {
        self.config.dampening_factor
    }

    pub fn add_observer(&mut self, observer: Box<dyn PaintObserver>) {
        self.observers.push(observer);
    }

    // ─── Host level data ─────────────────────────────────────────────────────

    /// Replace the host's object database; the next stroke snapshots it
    pub fn update_object_database(&mut self, database: TileSnapshot) {
        debug!(objects = database.len(), "object database updated");
        self.object_database = database;
        self.database_refreshed = true;
    }

    pub fn add_to_object_database(&mut self, key: TileKey, tile: TileId) {
        self.object_database.insert(key, tile);
        self.session.existing_tiles.insert(key, tile);
    }

    pub fn remove_from_object_database(&mut self, key: TileKey) {
        self.object_database.remove(&key);
        self.session.existing_tiles.remove(&key);
    }

    /// Cells inside already-placed slopes; deferred strokes never paint there
    pub fn set_empty_slope_regions(&mut self, regions: HashSet<TileKey>) {
        self.empty_slope_regions = regions;
    }

    pub fn is_in_empty_slope_region(&self, key: TileKey) -> bool {
        self.empty_slope_regions.contains(&key)
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> PaintingState {
        self.state
    }

    pub fn is_painting(&self) -> bool {
        self.state != PaintingState::Idle
    }

    pub fn session(&self) -> &PaintingSession {
        &self.session
    }

    pub fn path(&self) -> &[Position] {
        &self.session.path
    }

    pub fn outline(&self) -> &[Position] {
        self.session.outline.positions()
    }

    /// Outline cells with the label each will be painted with
    pub fn outline_with_types(&self) -> Vec<(Position, TileLabel)> {
        self.session.outline.iter().collect()
    }

    /// Tiles emitted so far by an immediate-mode stroke
    pub fn pending_placements(&self) -> Vec<ObjectPlacement> {
        self.session.pending_placements.iter().map(|p| p.placement).collect()
    }

    /// Existing objects to delete before applying the last stroke's merged runs
    pub fn pending_merge_deletes(&self) -> &[TileKey] {
        &self.pending_merge_deletes
    }

    /// Existing border pieces made redundant by the last stroke
    pub fn pending_terrain_deletes(&self) -> &[TileKey] {
        &self.pending_terrain_deletes
    }

    pub fn is_slope_mode_active(&self) -> bool {
        self.session.slope_mode.active
    }

    // ─── Strokes ─────────────────────────────────────────────────────────────

    /// Begin a stroke at `pos`. Fails when no brush is selected.
    pub fn start_painting(&mut self, pos: Position) -> bool {
        let Some(brush) = &self.brush else {
            debug!("no brush selected; stroke ignored");
            return false;
        };

        self.session.reset();
        self.session.id = Uuid::new_v4();
        if self.database_refreshed {
            self.session.existing_tiles = self.object_database.clone();
            self.database_refreshed = false;
        }
        self.pending_terrain_deletes.clear();
        self.pending_merge_deletes.clear();

        self.session.start = Some(pos);
        self.session.current = Some(pos);
        self.session.last = Some(pos);
        self.session.path.push(pos);

        self.state = match self.config.mode {
            PaintingMode::Immediate => PaintingState::PaintingImmediate,
            PaintingMode::Deferred => PaintingState::PaintingDeferred,
        };
        info!(
            session = %self.session.id,
            brush = %brush.name,
            x = pos.x,
            y = pos.y,
            mode = ?self.config.mode,
            "stroke started"
        );

        match self.state {
            PaintingState::PaintingImmediate => self.paint_cell(pos),
            _ => self.update_outline(),
        }
        true
    }

    /// Feed a pointer position. Returns `false` if nothing was accepted.
    pub fn update_painting(&mut self, pos: Position) -> bool {
        if self.state == PaintingState::Idle || self.brush.is_none() {
            return false;
        }
        if self.session.current == Some(pos) {
            return false;
        }
        self.session.last = self.session.current;
        self.session.current = Some(pos);

        if self.session.initial_direction.is_none() {
            if let Some(start) = self.session.start {
                if let Some(direction) = StrokeDirection::initial(start, pos) {
                    self.session.initial_direction = Some(direction);
                    self.session.painting_direction = PaintingDirection::for_stroke(direction);
                    debug!(session = %self.session.id, ?direction, "stroke direction fixed");
                }
            }
        }

        if self.session.slope_mode.active {
            self.update_slope_preview(pos);
            return true;
        }

        let blocked = self.session.blocked_cells();
        let added = build_valid_path(
            &self.session.path,
            pos,
            &mut self.session.path_state,
            self.config.dampening_factor,
            &blocked,
        );
        if added.is_empty() {
            return true;
        }
        self.session.path.extend(added.iter().copied());

        match self.state {
            PaintingState::PaintingImmediate => {
                for cell in added {
                    self.paint_cell(cell);
                }
            }
            _ => self.update_outline(),
        }
        true
    }

    /// End the stroke, optionally feeding one last position.
    ///
    /// Returns the final merged placements. Deletions the host must apply
    /// first are available from [`pending_terrain_deletes`](Self::pending_terrain_deletes)
    /// and [`pending_merge_deletes`](Self::pending_merge_deletes).
    pub fn finish_painting(&mut self, pos: Option<Position>) -> Vec<ObjectPlacement> {
        if self.state == PaintingState::Idle {
            return Vec::new();
        }
        if let Some(pos) = pos {
            self.update_painting(pos);
        }
        let Some(brush) = &self.brush else {
            self.state = PaintingState::Idle;
            return Vec::new();
        };

        let ctx = StrokeContext {
            brush,
            tileset: brush.tileset_index(),
            layer: self.config.layer,
        };
        let session = &mut self.session;

        let mut placements: Vec<LabeledPlacement> = match self.state {
            PaintingState::PaintingDeferred => finalize_outline(
                &session.outline,
                &ctx,
                &mut session.placed_tiles,
                &mut session.existing_tiles,
                &self.empty_slope_regions,
            ),
            _ => session.pending_placements.clone(),
        };

        let edits = terrain_aware_modifications(
            &mut session.outline,
            &session.path,
            &session.existing_tiles,
            &self.object_database,
            &ctx,
        );
        placements.extend(edits.placements);

        let (adjacent, merge_deletes) =
            collect_adjacent_existing(&placements, &self.object_database, &ctx);
        placements.extend(adjacent);

        let result = remerge(placements, &ctx);
        self.pending_terrain_deletes = edits.deletes;
        self.pending_merge_deletes = merge_deletes;

        info!(
            session = %session.id,
            cells = session.path.len(),
            placements = result.len(),
            terrain_deletes = self.pending_terrain_deletes.len(),
            merge_deletes = self.pending_merge_deletes.len(),
            "stroke finished"
        );

        for observer in self.observers.iter_mut() {
            observer.on_painting_finished(&result);
        }
        self.state = PaintingState::Idle;
        result
    }

    /// Abandon the stroke without emitting anything
    pub fn cancel_painting(&mut self) {
        if self.state == PaintingState::Idle {
            return;
        }
        info!(session = %self.session.id, "stroke cancelled");
        self.session.reset();
        self.state = PaintingState::Idle;
        for observer in self.observers.iter_mut() {
            observer.on_outline_updated(&[]);
        }
    }

    // ─── Slope mode ──────────────────────────────────────────────────────────

    /// Enter or leave slope mode. Returns whether slope mode is now active.
    ///
    /// Leaving after committing slopes reconnects the stroke at the last
    /// slope's exit and forces the next move to continue in the slope's
    /// direction.
    pub fn toggle_slope_mode(&mut self) -> bool {
        if self.state == PaintingState::Idle {
            return false;
        }
        let Some(brush) = &self.brush else {
            return false;
        };

        let session = &mut self.session;
        if !session.slope_mode.active {
            let path = &session.path;
            let direction = match path.len() {
                0 | 1 => None,
                n => StrokeDirection::of_step(path[n - 2], path[n - 1]),
            }
            .or(session.initial_direction);
            let anchor = path.last().copied();

            session.slope_mode.active = true;
            session.slope_mode.anchor = anchor;
            session.slope_mode.entry_path_len = path.len();
            session.slope_mode.direction = direction;
            session.slope_mode.committed = 0;
            session.slope_mode.preview = match (anchor, direction) {
                (Some(anchor), Some(direction)) => suggest_default(anchor, direction, brush),
                _ => None,
            };
            debug!(session = %session.id, ?direction, "slope mode entered");
        } else {
            let mode = std::mem::take(&mut session.slope_mode);
            let exit = session
                .committed_slopes
                .last()
                .filter(|_| mode.committed > 0)
                .map(|slope| exit_direction(slope.label.category));

            if let (Some(exit), Some(anchor)) = (exit, mode.anchor) {
                session.path.truncate(mode.entry_path_len);
                if !session.path.contains(&anchor) {
                    session.slope_joins.insert(session.path.len());
                    session.path.push(anchor);
                }
                session.path_state.exit_constraint = Some(exit);
                session.path_state.primary_axis = Some(Axis::Horizontal);
                session.path_state.pending_turns = 0;
            }
            debug!(session = %session.id, slopes = mode.committed, "slope mode left");
        }

        self.update_outline();
        self.session.slope_mode.active
    }

    /// Point the slope preview at `pos`
    pub fn update_slope_preview(&mut self, pos: Position) {
        let Some(brush) = &self.brush else {
            return;
        };
        let mode = &mut self.session.slope_mode;
        if !mode.active {
            return;
        }
        let (Some(anchor), Some(direction)) = (mode.anchor, mode.direction) else {
            return;
        };
        mode.preview = preview_toward(anchor, pos, direction, brush);
        self.update_outline();
    }

    /// Commit the previewed slope and move the anchor to its exit
    pub fn commit_slope(&mut self) -> bool {
        let Some(brush) = &self.brush else {
            return false;
        };
        let session = &mut self.session;
        if !session.slope_mode.active {
            return false;
        }
        let Some(preview) = session.slope_mode.preview else {
            return false;
        };
        if !brush.is_slope_enabled(preview.label) {
            return false;
        }

        session.committed_slopes.push(preview.segment());
        session.slope_mode.committed += 1;

        let anchor = exit_anchor(preview.origin, preview.label);
        session.slope_mode.anchor = Some(anchor);
        session.slope_mode.preview = session
            .slope_mode
            .direction
            .and_then(|direction| suggest_default(anchor, direction, brush));
        info!(
            session = %session.id,
            slope = %preview.label,
            x = preview.origin.x,
            y = preview.origin.y,
            "slope committed"
        );

        self.update_outline();
        true
    }

    /// Place a single slope outside any stroke
    pub fn paint_slope(&mut self, pos: Position, label: SlopeLabel) -> Option<ObjectPlacement> {
        let brush = self.brush.as_ref()?;
        let tile = brush.slope_tile(label)?;
        let layer = self.config.layer;
        let (width, height) = label.footprint();
        let placement = ObjectPlacement::new(
            brush.tileset_index(),
            tile,
            layer,
            pos,
            width as u32,
            height as u32,
        );

        debug!(slope = %label, x = pos.x, y = pos.y, "slope painted");
        self.record_placed(&[placement]);
        Some(placement)
    }

    // ─── Plain tools ─────────────────────────────────────────────────────────

    /// Fill the shape spanned by `start` and `end`, auto-tiled as a whole
    pub fn paint_shape(
        &mut self,
        shape: Shape,
        start: Position,
        end: Position,
    ) -> Vec<ObjectPlacement> {
        let Some(brush) = &self.brush else {
            return Vec::new();
        };
        let ctx = StrokeContext {
            brush,
            tileset: brush.tileset_index(),
            layer: self.config.layer,
        };
        let cells = shape.cells(start, end);
        let placements = auto_tile_shape(&cells, &self.session.existing_tiles, &ctx);
        debug!(?shape, cells = cells.len(), placements = placements.len(), "shape painted");

        self.record_placed(&placements);
        placements
    }

    /// Lay `tile` along the line through `points`, ignoring labels
    pub fn paint_single_tile(&mut self, points: &[Position], tile: TileId) -> Vec<ObjectPlacement> {
        let Some(brush) = &self.brush else {
            return Vec::new();
        };
        let placements =
            single_tile(interpolate(points), tile, brush.tileset_index(), self.config.layer);
        debug!(tile, placements = placements.len(), "single tile painted");

        self.record_placed(&placements);
        placements
    }

    /// Clear every cell on the line through `points`; returns the keys to delete
    pub fn erase_stroke(&mut self, points: &[Position]) -> Vec<TileKey> {
        let keys = erase(interpolate(points), self.config.layer);
        self.forget(&keys);
        keys
    }

    /// Clear every cell of a shape; returns the keys to delete
    pub fn erase_shape(&mut self, shape: Shape, start: Position, end: Position) -> Vec<TileKey> {
        let keys = erase(shape.cells(start, end), self.config.layer);
        self.forget(&keys);
        keys
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    /// Recompute the deferred outline and tell observers
    fn update_outline(&mut self) {
        if self.state != PaintingState::PaintingDeferred {
            return;
        }
        let session = &mut self.session;
        let slopes = session.slope_segments();
        session.outline = resolve_outline(
            &session.path,
            session.initial_direction,
            &slopes,
            &session.slope_joins,
        );

        let positions = session.outline.positions();
        for observer in self.observers.iter_mut() {
            observer.on_outline_updated(positions);
        }
    }

    /// Mark placed objects as occupied and tell observers
    fn record_placed(&mut self, placements: &[ObjectPlacement]) {
        for placement in placements {
            for cell in placement.cells() {
                let key = cell.on_layer(placement.layer);
                self.session.existing_tiles.insert(key, placement.object_id);
                self.session.placed_tiles.insert(key);
            }
            for observer in self.observers.iter_mut() {
                observer.on_place_object(placement);
            }
        }
    }

    fn forget(&mut self, keys: &[TileKey]) {
        for key in keys {
            self.remove_from_object_database(*key);
            self.session.placed_tiles.remove(key);
        }
        debug!(cells = keys.len(), "cells erased");
    }

    /// Auto-tile and emit one immediate-mode cell
    fn paint_cell(&mut self, pos: Position) {
        let Some(brush) = &self.brush else {
            return;
        };
        let layer = self.config.layer;
        let key = pos.on_layer(layer);
        let session = &mut self.session;
        if session.placed_tiles.contains(&key) {
            return;
        }
        session.placed_tiles.insert(key);

        let flags = NeighborFlags::from_snapshot(&session.existing_tiles, pos, layer);
        let label = classify_neighbors(&flags);
        if !session.painting_direction.should_paint(label, flags.top, flags.bottom) {
            return;
        }
        let Some(tile) = brush.terrain_tile(label) else {
            return;
        };

        let placement = ObjectPlacement::single(brush.tileset_index(), tile, layer, pos);
        session.pending_placements.push(LabeledPlacement {
            placement,
            label: Some(TileLabel::Terrain(label)),
        });
        session.existing_tiles.insert(key, tile);
        for observer in self.observers.iter_mut() {
            observer.on_place_object(&placement);
        }

        self.refresh_neighbors(pos);
    }

    /// Re-tile cells of this stroke around `pos` whose piece changed
    fn refresh_neighbors(&mut self, pos: Position) {
        let Some(brush) = &self.brush else {
            return;
        };
        let layer = self.config.layer;
        let session = &mut self.session;

        for (dx, dy) in neighbors::OFFSETS.iter().map(|(_, dx, dy)| (*dx, *dy)) {
            let neighbor = pos.offset(dx, dy);
            let Some(index) = session
                .pending_placements
                .iter()
                .position(|p| p.placement.origin() == neighbor)
            else {
                continue;
            };
            let Some((label, tile)) = auto_tile(neighbor, layer, brush, &session.existing_tiles)
            else {
                continue;
            };
            if session.pending_placements[index].placement.object_id == tile {
                continue;
            }

            let placement = ObjectPlacement::single(brush.tileset_index(), tile, layer, neighbor);
            session.pending_placements[index] = LabeledPlacement {
                placement,
                label: Some(TileLabel::Terrain(label)),
            };
            session.existing_tiles.insert(neighbor.on_layer(layer), tile);
            for observer in self.observers.iter_mut() {
                observer.on_place_object(&placement);
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use quickpaint_core::{SlopeCategory, SlopeSide, SlopeSize, TerrainLabel};
    use std::cell::RefCell;
    use std::rc::Rc;

    const SLOPE_TILE: TileId = 60;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn full_brush() -> Brush {
        let mut brush = Brush::new("Grass", vec!["Pa1_grass".to_string()]);
        for (i, label) in TerrainLabel::ALL.iter().enumerate() {
            brush.set_terrain_tile(*label, i as TileId + 1);
        }
        for (i, label) in SlopeLabel::ALL.iter().enumerate() {
            brush.set_slope_tile(*label, SLOPE_TILE + i as TileId);
        }
        brush
    }

    fn engine_with(brush: Brush) -> PaintingEngine {
        let mut engine = PaintingEngine::default();
        engine.set_brush(brush);
        engine
    }

    #[derive(Default)]
    struct Recorded {
        placed: Vec<ObjectPlacement>,
        outlines: usize,
        finished: Vec<Vec<ObjectPlacement>>,
    }

    struct Recorder(Rc<RefCell<Recorded>>);

    impl PaintObserver for Recorder {
        fn on_place_object(&mut self, placement: &ObjectPlacement) {
            self.0.borrow_mut().placed.push(*placement);
        }

        fn on_outline_updated(&mut self, _outline: &[Position]) {
            self.0.borrow_mut().outlines += 1;
        }

        fn on_painting_finished(&mut self, placements: &[ObjectPlacement]) {
            self.0.borrow_mut().finished.push(placements.to_vec());
        }
    }

    fn observe(engine: &mut PaintingEngine) -> Rc<RefCell<Recorded>> {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        engine.add_observer(Box::new(Recorder(recorded.clone())));
        recorded
    }

    fn tile(label: TerrainLabel) -> TileId {
        1 + label.index() as TileId
    }

    fn stroke(engine: &mut PaintingEngine, points: &[Position]) -> Vec<ObjectPlacement> {
        engine.start_painting(points[0]);
        for point in &points[1..] {
            engine.update_painting(*point);
        }
        engine.finish_painting(None)
    }

    /// Apply a finished stroke the way a host would: deletes first, then placements
    fn apply(engine: &mut PaintingEngine, placements: &[ObjectPlacement]) {
        let deletes: Vec<TileKey> = engine
            .pending_merge_deletes()
            .iter()
            .chain(engine.pending_terrain_deletes())
            .copied()
            .collect();
        for key in deletes {
            engine.remove_from_object_database(key);
        }
        for placement in placements {
            for cell in placement.cells() {
                engine.add_to_object_database(cell.on_layer(placement.layer), placement.object_id);
            }
        }
    }

    #[test]
    fn stroke_needs_a_brush() {
        let mut engine = PaintingEngine::default();
        assert!(!engine.start_painting(p(0, 0)));
        assert_eq!(engine.state(), PaintingState::Idle);
    }

    #[test]
    fn deferred_floor_becomes_one_object() {
        let mut brush = Brush::new("Grass", vec![]);
        brush.set_terrain_tile(TerrainLabel::Top, 5);
        let mut engine = engine_with(brush);
        let recorded = observe(&mut engine);

        assert!(engine.start_painting(p(0, 0)));
        assert_eq!(engine.state(), PaintingState::PaintingDeferred);
        engine.update_painting(p(2, 0));
        let placements = engine.finish_painting(None);

        assert_eq!(placements, vec![ObjectPlacement::new(0, 5, 1, p(0, 0), 3, 1)]);
        assert_eq!(engine.state(), PaintingState::Idle);

        let recorded = recorded.borrow();
        assert!(recorded.placed.is_empty(), "deferred strokes place nothing early");
        assert!(recorded.outlines >= 2);
        assert_eq!(recorded.finished, vec![placements]);
    }

    #[test]
    fn stroke_path_stays_connected_under_erratic_input() {
        let mut engine = engine_with(full_brush());
        engine.set_dampening_factor(0);
        engine.start_painting(p(0, 0));
        for target in [p(5, 3), p(2, 7), p(-4, 1), p(9, -6), p(3, 3)] {
            engine.update_painting(target);
        }

        let path = engine.path();
        let unique: HashSet<_> = path.iter().collect();
        assert_eq!(unique.len(), path.len(), "stroke revisits a cell");
        for pair in path.windows(2) {
            assert!(
                pair[0].is_adjacent(pair[1]),
                "gap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn turn_labels_outline_with_corner() {
        let mut engine = engine_with(full_brush());
        engine.set_dampening_factor(0);
        engine.start_painting(p(0, 0));
        engine.update_painting(p(2, 0));
        engine.update_painting(p(2, 2));

        let labels = engine.outline_with_types();
        assert!(labels.contains(&(p(2, 0), TileLabel::Terrain(TerrainLabel::TopRight))));
        assert!(labels.contains(&(p(2, 2), TileLabel::Terrain(TerrainLabel::Right))));
    }

    #[test]
    fn slope_mode_places_slope_and_reconnects() {
        let mut engine = engine_with(full_brush());
        let slope = SlopeLabel::new(SlopeCategory::Top, SlopeSize::TwoByOne, SlopeSide::Left);
        let slope_tile = engine.brush().and_then(|b| b.slope_tile(slope)).unwrap();

        engine.start_painting(p(8, 5));
        engine.update_painting(p(10, 5));
        assert!(engine.toggle_slope_mode());

        engine.update_painting(p(13, 3));
        let preview = engine.session().slope_mode.preview.unwrap();
        assert_eq!(preview.label, slope);
        assert_eq!(preview.origin, p(11, 4));
        assert_eq!(engine.path().len(), 3, "pointer moves in slope mode extended the stroke");

        assert!(engine.commit_slope());
        assert_eq!(engine.session().slope_mode.anchor, Some(p(12, 4)));
        assert!(!engine.toggle_slope_mode());
        assert_eq!(engine.path().last(), Some(&p(12, 4)));

        // Moving back against the slope exit is refused
        engine.update_painting(p(9, 4));
        assert_eq!(engine.path().last(), Some(&p(12, 4)));

        engine.update_painting(p(15, 4));
        assert_eq!(engine.path().last(), Some(&p(15, 4)));

        let placements = engine.finish_painting(None);
        let top = 1 + TerrainLabel::Top.index() as TileId;
        assert_eq!(placements.len(), 3, "{:?}", placements);
        assert!(placements.contains(&ObjectPlacement::new(0, slope_tile, 1, p(11, 4), 2, 2)));
        assert!(placements.contains(&ObjectPlacement::new(0, top, 1, p(8, 5), 3, 1)));
        assert!(placements.contains(&ObjectPlacement::new(0, top, 1, p(13, 4), 3, 1)));
    }

    #[test]
    fn vertical_travel_has_no_slope_preview() {
        let mut engine = engine_with(full_brush());
        engine.start_painting(p(0, 0));
        engine.update_painting(p(0, 3));
        assert!(engine.toggle_slope_mode());
        engine.update_painting(p(3, 1));
        assert_eq!(engine.session().slope_mode.preview, None);
        assert!(!engine.commit_slope());
    }

    #[test]
    fn cancel_discards_stroke() {
        let mut engine = engine_with(full_brush());
        let recorded = observe(&mut engine);
        engine.start_painting(p(0, 0));
        engine.update_painting(p(4, 0));
        engine.cancel_painting();

        assert_eq!(engine.state(), PaintingState::Idle);
        assert!(engine.path().is_empty());
        assert!(engine.finish_painting(None).is_empty());
        assert!(recorded.borrow().finished.is_empty());
    }

    #[test]
    fn immediate_mode_emits_and_retiles_as_stroke_grows() {
        let mut engine = engine_with(full_brush());
        engine.set_mode(PaintingMode::Immediate);
        let recorded = observe(&mut engine);

        engine.start_painting(p(0, 0));
        assert_eq!(engine.state(), PaintingState::PaintingImmediate);
        assert_eq!(recorded.borrow().placed.len(), 1);

        engine.update_painting(p(1, 0));
        // New cell plus the re-tiled first cell
        assert_eq!(recorded.borrow().placed.len(), 3);

        let placements = engine.finish_painting(None);
        assert_eq!(placements.len(), 2);
        let right = 1 + TerrainLabel::Right.index() as TileId;
        assert!(placements.contains(&ObjectPlacement::single(0, right, 1, p(0, 0))));
    }

    #[test]
    fn stroke_merges_with_existing_run() {
        let mut engine = engine_with(full_brush());
        let top = 1 + TerrainLabel::Top.index() as TileId;
        let database: TileSnapshot = (3..6).map(|x| (TileKey::new(x, 0, 1), top)).collect();
        engine.update_object_database(database);

        engine.start_painting(p(0, 0));
        engine.update_painting(p(2, 0));
        let placements = engine.finish_painting(None);

        assert_eq!(placements, vec![ObjectPlacement::new(0, top, 1, p(0, 0), 6, 1)]);
        assert_eq!(engine.pending_merge_deletes().len(), 3);
    }

    #[test]
    fn empty_slope_regions_stay_empty() {
        let mut engine = engine_with(full_brush());
        engine.set_empty_slope_regions([TileKey::new(1, 0, 1)].into_iter().collect());
        assert!(engine.is_in_empty_slope_region(TileKey::new(1, 0, 1)));

        engine.start_painting(p(0, 0));
        engine.update_painting(p(2, 0));
        let placements = engine.finish_painting(None);
        assert!(placements.iter().all(|placement| !placement.contains(p(1, 0))));
    }

    #[test]
    fn paint_slope_places_full_footprint() {
        let mut engine = engine_with(full_brush());
        let label =
            SlopeLabel::new(SlopeCategory::Bottom, SlopeSize::FourByOne, SlopeSide::Right);
        let placement = engine.paint_slope(p(2, 2), label).unwrap();
        assert_eq!((placement.width, placement.height), (4, 2));
        assert_eq!(engine.session().existing_tiles.len(), 8);
    }

    #[test]
    fn four_strokes_close_a_rectangle() {
        let mut engine = engine_with(full_brush());
        for points in [
            [p(0, 0), p(5, 0)],
            [p(5, 0), p(5, 4)],
            [p(5, 4), p(0, 4)],
            [p(0, 4), p(0, 0)],
        ] {
            let placements = stroke(&mut engine, &points);
            apply(&mut engine, &placements);
        }

        let at = |x, y| engine.session().existing_tiles.get(&TileKey::new(x, y, 1)).copied();
        assert_eq!(at(0, 0), Some(tile(TerrainLabel::TopLeft)));
        assert_eq!(at(5, 0), Some(tile(TerrainLabel::TopRight)));
        assert_eq!(at(5, 4), Some(tile(TerrainLabel::BottomRight)));
        assert_eq!(at(0, 4), Some(tile(TerrainLabel::BottomLeft)));
        assert_eq!(at(2, 0), Some(tile(TerrainLabel::Top)));
        assert_eq!(at(5, 2), Some(tile(TerrainLabel::Right)));
        assert_eq!(at(2, 4), Some(tile(TerrainLabel::Bottom)));
        assert_eq!(at(0, 2), Some(tile(TerrainLabel::Left)));
    }

    #[test]
    fn u_turn_stroke_closes_with_two_corners() {
        let mut engine = engine_with(full_brush());
        engine.set_dampening_factor(0);
        let placements = stroke(&mut engine, &[p(0, 0), p(3, 0), p(3, 1), p(0, 1)]);

        let expected = [
            ObjectPlacement::new(0, tile(TerrainLabel::Top), 1, p(1, 0), 2, 1),
            ObjectPlacement::single(0, tile(TerrainLabel::TopRight), 1, p(3, 0)),
            ObjectPlacement::single(0, tile(TerrainLabel::BottomRight), 1, p(3, 1)),
            ObjectPlacement::new(0, tile(TerrainLabel::Bottom), 1, p(1, 1), 2, 1),
            ObjectPlacement::single(0, tile(TerrainLabel::TopLeft), 1, p(0, 0)),
            ObjectPlacement::single(0, tile(TerrainLabel::BottomLeft), 1, p(0, 1)),
        ];
        assert_eq!(placements.len(), expected.len(), "{:?}", placements);
        for placement in expected {
            assert!(placements.contains(&placement), "missing {:?}", placement);
        }
    }

    #[test]
    fn shapes_are_auto_tiled_and_recorded() {
        let mut engine = engine_with(full_brush());
        let recorded = observe(&mut engine);

        let placements = engine.paint_shape(Shape::Rectangle, p(0, 0), p(2, 2));
        let covered: HashSet<Position> =
            placements.iter().flat_map(|placement| placement.cells()).collect();
        assert_eq!(covered.len(), 9);
        assert_eq!(engine.session().existing_tiles.len(), 9);
        assert_eq!(recorded.borrow().placed, placements);

        assert!(engine.paint_shape(Shape::Ellipse, p(0, 5), p(6, 5)).is_empty());
    }

    #[test]
    fn single_tile_follows_the_line() {
        let mut engine = engine_with(full_brush());
        let placements = engine.paint_single_tile(&[p(4, 0), p(4, 2)], 42);
        assert_eq!(placements, vec![ObjectPlacement::new(0, 42, 1, p(4, 0), 1, 3)]);
        assert!(PaintingEngine::default().paint_single_tile(&[p(0, 0)], 42).is_empty());
    }

    #[test]
    fn eraser_clears_the_database() {
        let mut engine = engine_with(full_brush());
        for x in 0..4 {
            engine.add_to_object_database(TileKey::new(x, 0, 1), 7);
        }

        let keys = engine.erase_stroke(&[p(0, 0), p(2, 0)]);
        assert_eq!(keys.len(), 3);
        let left: Vec<_> = engine.session().existing_tiles.keys().copied().collect();
        assert_eq!(left, vec![TileKey::new(3, 0, 1)]);

        let keys = engine.erase_shape(Shape::Rectangle, p(3, -1), p(3, 1));
        assert!(keys.contains(&TileKey::new(3, 0, 1)));
        assert!(engine.session().existing_tiles.is_empty());
    }

    #[test]
    fn settings_are_clamped() {
        let mut engine = PaintingEngine::default();
        engine.set_dampening_factor(9);
        engine.set_layer(12);
        assert_eq!(engine.dampening_factor(), 5);
        assert_eq!(engine.layer(), 2);
    }
}
