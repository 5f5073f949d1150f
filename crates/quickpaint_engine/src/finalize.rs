//! Stroke finalization
//!
//! Turns a labelled outline into host placements:
//!
//! 1. slopes are placed at full size and claim their footprint,
//! 2. terrain cells are merged into runs,
//! 3. terrain-aware fixes connect the stroke to itself and to terrain that
//!    was already in the level,
//! 4. edge runs that continue existing runs are pulled in and everything is
//!    merged once more.

use crate::direction::StrokeDirection;
use crate::outline::Outline;
use quickpaint_core::{
    merge_runs, Axis, Brush, ObjectPlacement, Position, TerrainLabel, TileId, TileKey, TileLabel,
    TileSnapshot,
};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

/// Brush and target of the stroke being finalized
#[derive(Debug, Clone, Copy)]
pub struct StrokeContext<'a> {
    pub brush: &'a Brush,
    pub tileset: u32,
    pub layer: u32,
}

impl StrokeContext<'_> {
    fn single(&self, label: TerrainLabel, pos: Position) -> Option<LabeledPlacement> {
        self.brush.terrain_tile(label).map(|tile| LabeledPlacement {
            placement: ObjectPlacement::single(self.tileset, tile, self.layer, pos),
            label: Some(TileLabel::Terrain(label)),
        })
    }

    /// Terrain piece stored at `pos` in a snapshot, if the brush knows its tile
    fn terrain_at(&self, snapshot: &TileSnapshot, pos: Position) -> Option<TerrainLabel> {
        snapshot
            .get(&pos.on_layer(self.layer))
            .and_then(|tile| self.brush.label_for_tile(*tile))
            .and_then(TileLabel::terrain)
    }
}

/// Placement together with the piece it depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledPlacement {
    pub placement: ObjectPlacement,
    /// `None` for objects the brush does not know
    pub label: Option<TileLabel>,
}

/// Placements and deletions produced by terrain-aware processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerrainEdits {
    pub placements: Vec<LabeledPlacement>,
    pub deletes: Vec<TileKey>,
}

// ─── Outline to placements ───────────────────────────────────────────────────

/// Place every outline cell.
///
/// Cells already placed this stroke and cells inside `empty_slope_regions`
/// are skipped. Every handled cell lands in `placed`, including cells whose
/// piece has no tile in the brush. Placed terrain is written into `existing`
/// so that later processing sees it.
pub fn finalize_outline(
    outline: &Outline,
    ctx: &StrokeContext<'_>,
    placed: &mut HashSet<TileKey>,
    existing: &mut TileSnapshot,
    empty_slope_regions: &HashSet<TileKey>,
) -> Vec<LabeledPlacement> {
    let mut placements = Vec::new();
    let mut cells: BTreeMap<Position, (TerrainLabel, TileId)> = BTreeMap::new();
    let mut skipped = 0usize;

    for (pos, label) in outline.iter() {
        let key = pos.on_layer(ctx.layer);
        if placed.contains(&key) {
            continue;
        }
        if empty_slope_regions.contains(&key) {
            skipped += 1;
            continue;
        }

        match label {
            TileLabel::Slope(slope) => {
                placed.extend(slope.covered_positions(pos).map(|cell| cell.on_layer(ctx.layer)));
                let Some(tile) = ctx.brush.slope_tile(slope) else {
                    continue;
                };
                let (width, height) = slope.footprint();
                let placement = ObjectPlacement::new(
                    ctx.tileset,
                    tile,
                    ctx.layer,
                    pos,
                    width as u32,
                    height as u32,
                );
                placements.push(LabeledPlacement {
                    placement,
                    label: Some(label),
                });
            }
            TileLabel::Terrain(terrain) => match ctx.brush.terrain_tile(terrain) {
                Some(tile) => {
                    cells.insert(pos, (terrain, tile));
                }
                None => {
                    placed.insert(key);
                }
            },
        }
    }

    if skipped > 0 {
        debug!(skipped, "outline cells inside empty slope regions skipped");
    }

    for placement in merge_runs(&cells, ctx.tileset, ctx.layer) {
        for cell in placement.cells() {
            let key = cell.on_layer(ctx.layer);
            placed.insert(key);
            existing.insert(key, placement.object_id);
        }
        placements.push(LabeledPlacement {
            placement,
            label: cells.get(&placement.origin()).map(|(label, _)| TileLabel::Terrain(*label)),
        });
    }

    placements
}

// ─── Terrain-aware processing ────────────────────────────────────────────────

/// Corner joining two perpendicular edges.
///
/// `outer` selects the convex piece; concave joins use the mirrored inner piece.
pub fn corner_between(a: TerrainLabel, b: TerrainLabel, outer: bool) -> Option<TerrainLabel> {
    use TerrainLabel::*;
    let has = |label: TerrainLabel| a == label || b == label;
    let corner = if has(Top) && has(Left) {
        if outer { TopLeft } else { InnerTopRight }
    } else if has(Top) && has(Right) {
        if outer { TopRight } else { InnerTopLeft }
    } else if has(Bottom) && has(Left) {
        if outer { BottomLeft } else { InnerBottomRight }
    } else if has(Bottom) && has(Right) {
        if outer { BottomRight } else { InnerBottomLeft }
    } else {
        return None;
    };
    Some(corner)
}

/// Corner closing `edge` against the `wall` of a 180° turn.
///
/// Unlike [`corner_between`], inner pieces here keep the wall's side for
/// floors and ceilings.
fn turn_corner(edge: TerrainLabel, wall: TerrainLabel, outer: bool) -> Option<TerrainLabel> {
    use TerrainLabel::*;
    if outer {
        return corner_between(edge, wall, true);
    }
    let corner = match (edge, wall) {
        (Top, Right) => InnerTopRight,
        (Top, Left) => InnerTopLeft,
        (Bottom, Right) => InnerBottomRight,
        (Bottom, Left) => InnerBottomLeft,
        (Right, Top) => InnerBottomLeft,
        (Right, Bottom) => InnerTopLeft,
        (Left, Top) => InnerBottomRight,
        (Left, Bottom) => InnerTopRight,
        _ => return None,
    };
    Some(corner)
}

/// Swap outer and inner as well as left and right
fn flip_corner(corner: TerrainLabel) -> Option<TerrainLabel> {
    use TerrainLabel::*;
    let flipped = match corner {
        TopLeft => InnerTopRight,
        TopRight => InnerTopLeft,
        BottomLeft => InnerBottomRight,
        BottomRight => InnerBottomLeft,
        InnerTopLeft => TopRight,
        InnerTopRight => TopLeft,
        InnerBottomLeft => BottomRight,
        InnerBottomRight => BottomLeft,
        _ => return None,
    };
    Some(flipped)
}

fn opposite(edge: TerrainLabel) -> TerrainLabel {
    use TerrainLabel::*;
    match edge {
        Top => Bottom,
        Bottom => Top,
        Left => Right,
        Right => Left,
        other => other,
    }
}

fn perpendicular(a: TerrainLabel, b: TerrainLabel) -> bool {
    matches!((a.edge_axis(), b.edge_axis()), (Some(x), Some(y)) if x != y)
}

fn parallel(a: TerrainLabel, b: TerrainLabel) -> bool {
    matches!((a.edge_axis(), b.edge_axis()), (Some(x), Some(y)) if x == y)
}

/// Cell where a horizontal and a vertical edge meet
fn corner_position(a: (Position, TerrainLabel), b: (Position, TerrainLabel)) -> Position {
    if a.1.edge_axis() == Some(Axis::Horizontal) {
        Position::new(b.0.x, a.0.y)
    } else {
        Position::new(a.0.x, b.0.y)
    }
}

/// Is `pos` on the solid side of the edge piece at `edge_pos`?
fn on_solid_side(edge: TerrainLabel, edge_pos: Position, pos: Position) -> bool {
    match edge {
        TerrainLabel::Top => pos.y > edge_pos.y,
        TerrainLabel::Bottom => pos.y < edge_pos.y,
        TerrainLabel::Left => pos.x > edge_pos.x,
        TerrainLabel::Right => pos.x < edge_pos.x,
        _ => false,
    }
}

/// Wall joining two parallel edges, on the negative or positive side of the
/// edge axis
fn wall_toward(horizontal: bool, sign: i32) -> Option<TerrainLabel> {
    match (horizontal, sign.signum()) {
        (true, -1) => Some(TerrainLabel::Left),
        (true, 1) => Some(TerrainLabel::Right),
        (false, -1) => Some(TerrainLabel::Top),
        (false, 1) => Some(TerrainLabel::Bottom),
        _ => None,
    }
}

/// Outer turn when the floor sits above the ceiling, or the left-facing wall
/// left of the right-facing one
fn u_turn_is_outer(a: (Position, TerrainLabel), b: (Position, TerrainLabel)) -> bool {
    let pick = |label: TerrainLabel| if a.1 == label { a.0 } else { b.0 };
    if a.1.edge_axis() == Some(Axis::Horizontal) {
        pick(TerrainLabel::Top).y < pick(TerrainLabel::Bottom).y
    } else {
        pick(TerrainLabel::Left).x < pick(TerrainLabel::Right).x
    }
}

/// Place `corner` at `pos`, relabelling the outline cell when asked
fn place_corner(
    outline: &mut Outline,
    pos: Position,
    corner: TerrainLabel,
    relabel: bool,
    ctx: &StrokeContext<'_>,
) -> Option<LabeledPlacement> {
    let placement = ctx.single(corner, pos)?;
    if relabel {
        outline.relabel(pos, TileLabel::Terrain(corner));
    }
    Some(placement)
}

/// Step between two path cells
fn step(from: Position, to: Position) -> (i32, i32) {
    (to.x - from.x, to.y - from.y)
}

/// Close a stroke that ends next to where it started.
///
/// Perpendicular end edges that touch (including diagonally) get one corner;
/// the turn sense of last segment into first segment picks outer or inner.
/// Parallel end edges one cell apart are a 180° turn and get a corner at
/// each end, see [`parallel_self_connection`]. Collinear ends are left
/// alone.
pub fn self_connection(
    outline: &mut Outline,
    path: &[Position],
    ctx: &StrokeContext<'_>,
) -> Vec<LabeledPlacement> {
    if outline.len() < 4 || path.len() < 2 {
        return Vec::new();
    }
    let (Some(first), Some(last)) = (outline.edges().next(), outline.edges().last()) else {
        return Vec::new();
    };
    if first.0 == last.0 || first.0.chebyshev_distance(last.0) > 1 {
        return Vec::new();
    }
    if parallel(first.1, last.1) {
        return parallel_self_connection(outline, first, last, path, ctx);
    }
    if !perpendicular(first.1, last.1) {
        return Vec::new();
    }

    let old = StrokeDirection::of_step(path[path.len() - 2], path[path.len() - 1]);
    let new = StrokeDirection::of_step(path[0], path[1]);
    let clockwise = matches!((old, new), (Some(old), Some(new)) if old.turns_clockwise_to(new));

    let pos = corner_position(first, last);
    let Some(corner) = corner_between(first.1, last.1, clockwise) else {
        return Vec::new();
    };
    debug!(corner = %corner, x = pos.x, y = pos.y, "stroke closes on itself");
    ctx.single(corner, pos).into_iter().collect()
}

/// 180° closure between the stroke's parallel end edges.
///
/// Opposite pieces side by side form a U-turn: both ends become the same
/// kind of corner. Anything else is an S-shape where the first end keeps the
/// standard corner and the last end gets the flipped one, or, when the last
/// end sits on the far side of the first, the last end is filled with
/// `center` instead.
pub fn parallel_self_connection(
    outline: &mut Outline,
    first: (Position, TerrainLabel),
    last: (Position, TerrainLabel),
    path: &[Position],
    ctx: &StrokeContext<'_>,
) -> Vec<LabeledPlacement> {
    let ((f, first_label), (l, last_label)) = (first, last);
    let (dx, dy) = ((f.x - l.x).abs(), (f.y - l.y).abs());
    if dx > 1 || dy > 1 || (dx == 0 && dy == 0) || path.len() < 2 {
        return Vec::new();
    }

    let horizontal = first_label.edge_axis() == Some(Axis::Horizontal);
    let same = first_label == last_label;
    if same && (if horizontal { f.y == l.y } else { f.x == l.x }) {
        return Vec::new();
    }

    let (sx, sy) = step(path[0], path[1]);
    let Some(wall) = wall_toward(horizontal, -(if horizontal { sx } else { sy })) else {
        return Vec::new();
    };

    let (first_corner, last_corner) = if !same && !(dx == 1 && dy == 1) {
        let outer = u_turn_is_outer(first, last);
        (turn_corner(first_label, wall, outer), turn_corner(last_label, wall, outer))
    } else {
        let (same_side, outer) = if same {
            let outer = match first_label {
                TerrainLabel::Top => f.y < l.y,
                TerrainLabel::Bottom => f.y > l.y,
                TerrainLabel::Left => f.x < l.x,
                _ => f.x > l.x,
            };
            (true, outer)
        } else {
            let same_side = match first_label {
                TerrainLabel::Top => l.y < f.y,
                TerrainLabel::Bottom => l.y > f.y,
                TerrainLabel::Left => l.x < f.x,
                _ => l.x > f.x,
            };
            let outer = matches!(first_label, TerrainLabel::Top | TerrainLabel::Left);
            (same_side, outer)
        };
        if same_side {
            (
                turn_corner(first_label, wall, outer),
                turn_corner(last_label, wall, outer).and_then(flip_corner),
            )
        } else {
            (None, Some(TerrainLabel::Center))
        }
    };

    debug!(?first_corner, ?last_corner, %wall, "stroke turns back on itself");
    [(f, first_corner), (l, last_corner)]
        .into_iter()
        .filter_map(|(pos, corner)| place_corner(outline, pos, corner?, true, ctx))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrokeEnd {
    First,
    Last,
}

/// Turn stroke ends that meet terrain from earlier strokes into corners.
///
/// `database` is the level as it was before the stroke. The first end edge
/// is checked, then the last one if it is a different cell. Each end takes
/// at most one connection:
///
/// 1. the end lies on a perpendicular edge: the end becomes a corner whose
///    sense follows the existing edge's extent and the stroke's direction,
/// 2. a perpendicular edge is a neighbor: a corner goes where the two meet,
/// 3. a parallel edge is a neighbor: U-turn or S-shape corners go on both.
///
/// Cardinal neighbors are tried before diagonal ones.
pub fn endpoint_connections(
    outline: &mut Outline,
    path: &[Position],
    database: &TileSnapshot,
    ctx: &StrokeContext<'_>,
) -> Vec<LabeledPlacement> {
    let mut placements = Vec::new();
    let first = outline.edges().next();
    if let Some(first) = first {
        placements.extend(endpoint_connection(
            outline,
            first,
            StrokeEnd::First,
            path,
            database,
            ctx,
        ));
    }
    let last = outline.edges().last();
    if let Some(last) = last.filter(|last| first.map(|first| first.0) != Some(last.0)) {
        placements.extend(endpoint_connection(outline, last, StrokeEnd::Last, path, database, ctx));
    }
    placements
}

const NEIGHBOR_ORDER: [(i32, i32); 8] =
    [(0, -1), (0, 1), (-1, 0), (1, 0), (-1, -1), (1, -1), (-1, 1), (1, 1)];

fn endpoint_connection(
    outline: &mut Outline,
    endpoint: (Position, TerrainLabel),
    end: StrokeEnd,
    path: &[Position],
    database: &TileSnapshot,
    ctx: &StrokeContext<'_>,
) -> Vec<LabeledPlacement> {
    let (pos, label) = endpoint;

    if let Some(existing) = ctx.terrain_at(database, pos).filter(|e| perpendicular(label, *e)) {
        let placed = overlap_corner(outline, pos, existing, database, ctx.layer)
            .and_then(|outer| corner_between(existing, label, outer))
            .and_then(|corner| place_corner(outline, pos, corner, true, ctx));
        if let Some(placed) = placed {
            debug!(x = pos.x, y = pos.y, existing = %existing, "stroke end overlaps existing edge");
            return vec![placed];
        }
    }

    for (dx, dy) in NEIGHBOR_ORDER {
        let other = pos.offset(dx, dy);
        if outline.contains(other) {
            continue;
        }
        let Some(existing) = ctx.terrain_at(database, other).filter(|e| e.is_edge()) else {
            continue;
        };

        if perpendicular(label, existing) {
            let corner_pos = corner_position(endpoint, (other, existing));
            let outer =
                on_solid_side(existing, other, pos) || on_solid_side(label, pos, other);
            let relabel = corner_pos == pos;
            let placed = corner_between(label, existing, outer)
                .and_then(|corner| place_corner(outline, corner_pos, corner, relabel, ctx));
            if let Some(placed) = placed {
                debug!(x = corner_pos.x, y = corner_pos.y, "stroke end meets existing edge");
                return vec![placed];
            }
        } else if parallel(label, existing) {
            let placed = parallel_endpoint(outline, endpoint, (other, existing), end, path, ctx);
            if !placed.is_empty() {
                return placed;
            }
        }
    }

    Vec::new()
}

/// Outer-corner flag for a stroke end lying on a perpendicular edge.
///
/// The existing edge's own travel direction is inferred from which side of
/// `pos` it continues on; a lone or interior cell counts as drawn rightwards
/// or downwards. A clockwise turn from it into the stroke is concave.
fn overlap_corner(
    outline: &Outline,
    pos: Position,
    existing: TerrainLabel,
    database: &TileSnapshot,
    layer: u32,
) -> Option<bool> {
    let positions = outline.positions();
    let index = positions.iter().position(|p| *p == pos)?;
    let new = match (positions.get(index + 1), index.checked_sub(1)) {
        (Some(next), _) => StrokeDirection::of_step(pos, *next),
        (None, Some(prev)) => StrokeDirection::of_step(positions[prev], pos),
        (None, None) => None,
    }?;

    let occupied = |dx: i32, dy: i32| database.contains_key(&pos.offset(dx, dy).on_layer(layer));
    let old = match existing.edge_axis()? {
        Axis::Horizontal if occupied(-1, 0) && !occupied(1, 0) => StrokeDirection::RightToLeft,
        Axis::Horizontal => StrokeDirection::LeftToRight,
        Axis::Vertical if occupied(0, -1) && !occupied(0, 1) => StrokeDirection::BottomToTop,
        Axis::Vertical => StrokeDirection::TopToBottom,
    };
    Some(!old.turns_clockwise_to(new))
}

/// Corners joining a stroke end to a parallel existing edge one cell away.
///
/// Opposite pieces make a U-turn with matching corners on both cells. The
/// same piece offset across the edge makes an S-shape: the tight cell takes
/// the standard corner and the open one the flipped corner.
fn parallel_endpoint(
    outline: &mut Outline,
    endpoint: (Position, TerrainLabel),
    existing: (Position, TerrainLabel),
    end: StrokeEnd,
    path: &[Position],
    ctx: &StrokeContext<'_>,
) -> Vec<LabeledPlacement> {
    let ((e, label), (n, other)) = (endpoint, existing);
    let horizontal = label.edge_axis() == Some(Axis::Horizontal);
    let s_shape = label == other;
    if s_shape && (if horizontal { e.y == n.y } else { e.x == n.x }) {
        return Vec::new();
    }

    let offset = if horizontal { n.x - e.x } else { n.y - e.y };
    let sign = if offset != 0 {
        offset
    } else {
        let (sx, sy) = match end {
            StrokeEnd::First if path.len() >= 2 => step(path[0], path[1]),
            StrokeEnd::Last if path.len() >= 2 => {
                let (sx, sy) = step(path[path.len() - 2], path[path.len() - 1]);
                (-sx, -sy)
            }
            _ => return Vec::new(),
        };
        -(if horizontal { sx } else { sy })
    };
    let Some(mut wall) = wall_toward(horizontal, sign) else {
        return Vec::new();
    };

    let (endpoint_corner, existing_corner) = if s_shape {
        let stacked = if horizontal { e.x == n.x && e.y > n.y } else { e.y == n.y && e.x > n.x };
        if stacked {
            wall = opposite(wall);
        }
        let open = if horizontal { e.y > n.y } else { e.x > n.x };
        let outer = matches!(label, TerrainLabel::Top | TerrainLabel::Left);
        let standard = |edge| turn_corner(edge, wall, outer);
        if open {
            (standard(label).and_then(flip_corner), standard(other))
        } else {
            (standard(label), standard(other).and_then(flip_corner))
        }
    } else {
        let outer = u_turn_is_outer(endpoint, existing);
        (turn_corner(label, wall, outer), turn_corner(other, wall, outer))
    };

    debug!(?endpoint_corner, ?existing_corner, %wall, "stroke end turns against parallel edge");
    let mut placements = Vec::new();
    placements.extend(endpoint_corner.and_then(|c| place_corner(outline, e, c, true, ctx)));
    placements.extend(existing_corner.and_then(|c| place_corner(outline, n, c, false, ctx)));
    placements
}

/// Fix up terrain that was in the level before the stroke.
///
/// A pre-existing piece facing the same way as a painted border is deleted
/// when it lies outside the border and replaced with `center` when it lies
/// inside. Identical straight edges are left alone, and `protected` cells are
/// never touched.
pub fn reconcile_existing(
    outline: &Outline,
    existing: &TileSnapshot,
    protected: &HashSet<Position>,
    ctx: &StrokeContext<'_>,
) -> TerrainEdits {
    let mut edits = TerrainEdits::default();
    let mut replaced: HashSet<Position> = HashSet::new();

    let untouchable = |pos: Position| outline.contains(pos) || protected.contains(&pos);

    for (pos, label) in outline.iter() {
        let Some(painted) = label.terrain() else {
            continue;
        };

        for &(bx, by) in painted.border_offsets() {
            let faces_same_way = |other: TerrainLabel| other.border_offsets().contains(&(bx, by));
            let coexists = |other: TerrainLabel| other.is_edge() && other == painted;

            let outside = pos.offset(bx, by);
            if !untouchable(outside) {
                let found = ctx.terrain_at(existing, outside).filter(|o| faces_same_way(*o));
                if let Some(other) = found {
                    let key = outside.on_layer(ctx.layer);
                    if !coexists(other) && !edits.deletes.contains(&key) {
                        debug!(
                            piece = %other,
                            x = outside.x,
                            y = outside.y,
                            "existing border outside stroke deleted"
                        );
                        edits.deletes.push(key);
                    }
                }
            }

            let inside = pos.offset(-bx, -by);
            if !untouchable(inside) && !replaced.contains(&inside) {
                let found = ctx.terrain_at(existing, inside).filter(|o| faces_same_way(*o));
                if let Some(other) = found {
                    if coexists(other) {
                        continue;
                    }
                    if let Some(center) = ctx.single(TerrainLabel::Center, inside) {
                        debug!(
                            piece = %other,
                            x = inside.x,
                            y = inside.y,
                            "existing border inside stroke filled"
                        );
                        edits.placements.push(center);
                        replaced.insert(inside);
                    }
                }
            }
        }
    }

    edits
}

/// Add outer corners between diagonally touching perpendicular edges of the stroke
pub fn corner_connections(outline: &Outline, ctx: &StrokeContext<'_>) -> Vec<LabeledPlacement> {
    let edges: BTreeMap<Position, TerrainLabel> = outline.edges().collect();
    let mut checked: HashSet<(Position, Position)> = HashSet::new();
    let mut placements = Vec::new();

    for (&pos, &label) in &edges {
        for (dx, dy) in [(-1, -1), (1, -1), (-1, 1), (1, 1)] {
            let other_pos = pos.offset(dx, dy);
            let Some(&other) = edges.get(&other_pos) else {
                continue;
            };
            let pair = (pos.min(other_pos), pos.max(other_pos));
            if !checked.insert(pair) || !perpendicular(label, other) {
                continue;
            }

            let corner_pos = corner_position((pos, label), (other_pos, other));
            if outline.contains(corner_pos) {
                continue;
            }
            let corner = corner_between(label, other, true);
            if let Some(placement) = corner.and_then(|c| ctx.single(c, corner_pos)) {
                placements.push(placement);
            }
        }
    }

    placements
}

/// Run all terrain-aware passes.
///
/// Self-connection runs first, then connections to terrain from earlier
/// strokes in `database`. Cells those two placed are protected from the
/// reconciliation with `existing`, and corner repair runs last. Stroke ends
/// that become corners are relabelled in `outline`.
pub fn terrain_aware_modifications(
    outline: &mut Outline,
    path: &[Position],
    existing: &TileSnapshot,
    database: &TileSnapshot,
    ctx: &StrokeContext<'_>,
) -> TerrainEdits {
    if outline.len() < 2 {
        return TerrainEdits::default();
    }

    let mut placements = self_connection(outline, path, ctx);
    placements.extend(endpoint_connections(outline, path, database, ctx));
    let protected: HashSet<Position> = placements.iter().map(|p| p.placement.origin()).collect();

    let reconciled = reconcile_existing(outline, existing, &protected, ctx);
    placements.extend(reconciled.placements);
    placements.extend(corner_connections(outline, ctx));
    TerrainEdits {
        placements,
        deletes: reconciled.deletes,
    }
}

// ─── Cross-stroke merge ──────────────────────────────────────────────────────

/// Pull in runs of existing edges that continue the stroke's edges.
///
/// Returns 1×1 placements for the pulled-in cells and the keys of the
/// existing objects to delete before the merged placements are created.
pub fn collect_adjacent_existing(
    placements: &[LabeledPlacement],
    database: &TileSnapshot,
    ctx: &StrokeContext<'_>,
) -> (Vec<LabeledPlacement>, Vec<TileKey>) {
    let current: HashSet<Position> =
        placements.iter().flat_map(|p| p.placement.cells()).collect();
    let mut processed: HashSet<Position> = HashSet::new();
    let mut adjacent = Vec::new();
    let mut deletes = Vec::new();

    for labeled in placements {
        let label = labeled.label.and_then(TileLabel::terrain).filter(|l| l.is_edge());
        let Some(label) = label else {
            continue;
        };
        let Some(axis) = label.merge_axis() else {
            continue;
        };

        for cell in labeled.placement.cells() {
            for sign in [1, -1] {
                let (sx, sy) = axis.step(sign);
                let neighbor = cell.offset(sx, sy);
                if current.contains(&neighbor) || processed.contains(&neighbor) {
                    continue;
                }
                if ctx.terrain_at(database, neighbor) != Some(label) {
                    continue;
                }

                let run = connected_run(neighbor, label, axis, database, &current, &processed, ctx);
                for pos in run {
                    processed.insert(pos);
                    deletes.push(pos.on_layer(ctx.layer));
                    adjacent.extend(ctx.single(label, pos));
                }
            }
        }
    }

    if !deletes.is_empty() {
        debug!(cells = deletes.len(), "existing edge runs merged into stroke");
    }
    (adjacent, deletes)
}

/// Cells of `label` reachable from `start` along `axis`
fn connected_run(
    start: Position,
    label: TerrainLabel,
    axis: Axis,
    database: &TileSnapshot,
    exclude: &HashSet<Position>,
    collected: &HashSet<Position>,
    ctx: &StrokeContext<'_>,
) -> Vec<Position> {
    let mut run = Vec::new();
    let mut checked: HashSet<Position> = HashSet::new();
    let mut queue = VecDeque::from([start]);

    while let Some(pos) = queue.pop_front() {
        if !checked.insert(pos) || exclude.contains(&pos) || collected.contains(&pos) {
            continue;
        }
        if ctx.terrain_at(database, pos) != Some(label) {
            continue;
        }
        run.push(pos);
        for sign in [1, -1] {
            let (sx, sy) = axis.step(sign);
            queue.push_back(pos.offset(sx, sy));
        }
    }

    run
}

/// Expand placements to cells and merge them again.
///
/// Later placements win where cells overlap. Slopes and unknown objects are
/// kept as they are.
pub fn remerge(
    placements: Vec<LabeledPlacement>,
    ctx: &StrokeContext<'_>,
) -> Vec<ObjectPlacement> {
    let mut kept = Vec::new();
    let mut cells: BTreeMap<Position, (TerrainLabel, TileId)> = BTreeMap::new();

    for labeled in placements {
        let placement = labeled.placement;
        match labeled.label {
            Some(TileLabel::Terrain(label)) if label.merge_axis().is_some() => {
                for cell in placement.cells() {
                    cells.insert(cell, (label, placement.object_id));
                }
            }
            Some(TileLabel::Terrain(label)) => {
                cells.insert(placement.origin(), (label, placement.object_id));
            }
            _ => kept.push(placement),
        }
    }

    kept.extend(merge_runs(&cells, ctx.tileset, ctx.layer));
    kept
}

// ─── Tests ───────────────────────────────────────────────────────────────────
