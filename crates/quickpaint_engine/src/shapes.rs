//! Shape, single-tile and eraser tools
//!
//! Besides smart strokes the engine offers plain tools that skip outline
//! resolution: filled rectangles and ellipses auto-tiled as a whole, one tile
//! object laid along a line, and an eraser over lines or shapes.

use crate::finalize::StrokeContext;
use quickpaint_autotile::{calculate_bitmask, classify};
use quickpaint_core::{
    merge_columns, merge_runs, ObjectPlacement, Position, TerrainLabel, TileId, TileKey,
    TileSnapshot,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Shape spanned by two corner cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Rectangle,
    Ellipse,
}

impl Shape {
    pub fn cells(self, start: Position, end: Position) -> BTreeSet<Position> {
        match self {
            Shape::Rectangle => rectangle(start, end),
            Shape::Ellipse => ellipse(start, end),
        }
    }
}

// ─── Rasterizing ─────────────────────────────────────────────────────────────

/// Bresenham line from `from` to `to`, both ends included
pub fn line(from: Position, to: Position) -> Vec<Position> {
    let (dx, dy) = ((to.x - from.x).abs(), (to.y - from.y).abs());
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let x_major = dx > dy;
    let (major, minor) = if x_major { (dx, dy) } else { (dy, dx) };

    // Error term kept doubled so it stays integral
    let mut err = major;
    let mut cursor = from;
    let mut points = Vec::with_capacity(major as usize + 1);
    for _ in 0..=major {
        points.push(cursor);
        err -= 2 * minor;
        if err < 0 {
            cursor = if x_major { cursor.offset(0, sy) } else { cursor.offset(sx, 0) };
            err += 2 * major;
        }
        cursor = if x_major { cursor.offset(sx, 0) } else { cursor.offset(0, sy) };
    }
    points
}

/// Join pointer samples with lines, listing shared ends once
pub fn interpolate(points: &[Position]) -> Vec<Position> {
    let mut cells: Vec<Position> = points.first().copied().into_iter().collect();
    for pair in points.windows(2) {
        cells.extend(line(pair[0], pair[1]).into_iter().skip(1));
    }
    cells
}

/// Every cell of the rectangle spanned by two corners, in any order
pub fn rectangle(start: Position, end: Position) -> BTreeSet<Position> {
    let (min_x, max_x) = (start.x.min(end.x), start.x.max(end.x));
    let (min_y, max_y) = (start.y.min(end.y), start.y.max(end.y));
    (min_x..=max_x)
        .flat_map(|x| (min_y..=max_y).map(move |y| Position::new(x, y)))
        .collect()
}

/// Filled ellipse inscribed in the box spanned by two corners.
///
/// The center is the floored midpoint and the radii are half the span,
/// rounded down. A box one cell thin has no ellipse.
pub fn ellipse(start: Position, end: Position) -> BTreeSet<Position> {
    let cx = (start.x + end.x).div_euclid(2);
    let cy = (start.y + end.y).div_euclid(2);
    let rx = i64::from((end.x - start.x).abs() / 2);
    let ry = i64::from((end.y - start.y).abs() / 2);
    if rx == 0 || ry == 0 {
        return BTreeSet::new();
    }

    let limit = rx * rx * ry * ry;
    let mut cells = BTreeSet::new();
    for dy in -ry..=ry {
        for dx in -rx..=rx {
            if dx * dx * ry * ry + dy * dy * rx * rx <= limit {
                // Offsets are bounded by the i32 radii
                cells.insert(Position::new(cx + dx as i32, cy + dy as i32));
            }
        }
    }
    cells
}

// ─── Tools ───────────────────────────────────────────────────────────────────

/// Auto-tile a whole shape at once.
///
/// Each cell is classified against the shape plus whatever `snapshot` already
/// holds on the layer, then runs are merged. Cells whose piece has no tile in
/// the brush are left out.
pub fn auto_tile_shape(
    cells: &BTreeSet<Position>,
    snapshot: &TileSnapshot,
    ctx: &StrokeContext<'_>,
) -> Vec<ObjectPlacement> {
    let occupied = |x: i32, y: i32| {
        let pos = Position::new(x, y);
        cells.contains(&pos) || snapshot.contains_key(&pos.on_layer(ctx.layer))
    };

    let tiles: BTreeMap<Position, (TerrainLabel, TileId)> = cells
        .iter()
        .filter_map(|pos| {
            let label = classify(calculate_bitmask(pos.x, pos.y, &occupied));
            ctx.brush.terrain_tile(label).map(|tile| (*pos, (label, tile)))
        })
        .collect();

    merge_runs(&tiles, ctx.tileset, ctx.layer)
}

/// One tile object over every cell, merged into columns
pub fn single_tile(
    cells: impl IntoIterator<Item = Position>,
    tile: TileId,
    tileset: u32,
    layer: u32,
) -> Vec<ObjectPlacement> {
    merge_columns(cells, tile, tileset, layer)
}

/// Keys the eraser clears, one per distinct cell
pub fn erase(cells: impl IntoIterator<Item = Position>, layer: u32) -> Vec<TileKey> {
    let cells: BTreeSet<Position> = cells.into_iter().collect();
    cells.into_iter().map(|cell| cell.on_layer(layer)).collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use quickpaint_core::Brush;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn full_brush() -> Brush {
        let mut brush = Brush::new("Rock", vec![]);
        for (i, label) in TerrainLabel::ALL.iter().enumerate() {
            brush.set_terrain_tile(*label, i as TileId + 1);
        }
        brush
    }

    #[test]
    fn line_covers_both_ends_without_gaps() {
        assert_eq!(line(p(0, 0), p(3, 1)), vec![p(0, 0), p(1, 0), p(2, 1), p(3, 1)]);
        assert_eq!(line(p(2, 2), p(2, 2)), vec![p(2, 2)]);

        let steep = line(p(0, 0), p(-2, -5));
        assert_eq!(steep.len(), 6);
        assert_eq!(steep.first(), Some(&p(0, 0)));
        assert_eq!(steep.last(), Some(&p(-2, -5)));
        for pair in steep.windows(2) {
            assert!(pair[0].chebyshev_distance(pair[1]) == 1);
        }
    }

    #[test]
    fn interpolation_lists_joints_once() {
        let cells = interpolate(&[p(0, 0), p(2, 0), p(2, 2)]);
        assert_eq!(cells, vec![p(0, 0), p(1, 0), p(2, 0), p(2, 1), p(2, 2)]);
        assert!(interpolate(&[]).is_empty());
    }

    #[test]
    fn rectangle_accepts_corners_in_any_order() {
        let cells = rectangle(p(3, 2), p(1, 0));
        assert_eq!(cells.len(), 9);
        assert_eq!(cells, rectangle(p(1, 0), p(3, 2)));
    }

    #[test]
    fn ellipse_is_filled_and_needs_two_radii() {
        let cells = ellipse(p(0, 0), p(4, 2));
        assert_eq!(cells.len(), 7);
        assert!(cells.contains(&p(2, 1)));
        assert!(cells.contains(&p(0, 1)) && cells.contains(&p(4, 1)));
        assert!(!cells.contains(&p(0, 0)));

        assert!(ellipse(p(0, 0), p(5, 1)).is_empty());
    }

    #[test]
    fn shape_auto_tiles_every_cell() {
        let brush = full_brush();
        let ctx = StrokeContext {
            brush: &brush,
            tileset: 0,
            layer: 1,
        };
        let cells = rectangle(p(0, 0), p(4, 3));
        let placements = auto_tile_shape(&cells, &TileSnapshot::new(), &ctx);

        let covered: BTreeSet<Position> =
            placements.iter().flat_map(|placement| placement.cells()).collect();
        assert_eq!(covered, cells);
        let center = brush.terrain_tile(TerrainLabel::Center).unwrap();
        let interior = placements
            .iter()
            .find(|placement| placement.contains(p(2, 1)))
            .unwrap();
        assert_eq!(interior.object_id, center);
    }

    #[test]
    fn shape_sees_existing_neighbors() {
        let brush = full_brush();
        let ctx = StrokeContext {
            brush: &brush,
            tileset: 0,
            layer: 1,
        };
        let cell: BTreeSet<Position> = [p(0, 0)].into_iter().collect();
        let alone = auto_tile_shape(&cell, &TileSnapshot::new(), &ctx);

        let mut snapshot = TileSnapshot::new();
        snapshot.insert(TileKey::new(0, -1, 1), 9);
        let below_something = auto_tile_shape(&cell, &snapshot, &ctx);

        let top = brush.terrain_tile(TerrainLabel::Top).unwrap();
        assert_eq!(below_something[0].object_id, top);
        assert_ne!(alone[0].object_id, below_something[0].object_id);
    }

    #[test]
    fn single_tile_merges_columns() {
        let placements = single_tile(interpolate(&[p(0, 0), p(0, 3)]), 12, 2, 0);
        assert_eq!(placements, vec![ObjectPlacement::new(2, 12, 0, p(0, 0), 1, 4)]);
    }

    #[test]
    fn eraser_lists_each_cell_once() {
        let keys = erase(interpolate(&[p(0, 0), p(2, 0), p(0, 0)]), 2);
        assert_eq!(
            keys,
            vec![TileKey::new(0, 0, 2), TileKey::new(1, 0, 2), TileKey::new(2, 0, 2)]
        );
    }
}
