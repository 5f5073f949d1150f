//! Object placements and run-length merging
//!
//! Painting produces one label per cell, but the host level stores tile
//! *objects* that may span several cells. Runs of identical edge or fill
//! cells are merged into a single stretched object before they are handed
//! to the host.

use crate::label::TerrainLabel;
use crate::position::{Axis, Position, TileId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A rectangular tile object to create in the host level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPlacement {
    /// Tileset slot index (0-3)
    pub tileset: u32,
    pub object_id: TileId,
    pub layer: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ObjectPlacement {
    pub fn new(
        tileset: u32,
        object_id: TileId,
        layer: u32,
        origin: Position,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            tileset,
            object_id,
            layer,
            x: origin.x,
            y: origin.y,
            width,
            height,
        }
    }

    /// A 1×1 placement
    pub fn single(tileset: u32, object_id: TileId, layer: u32, origin: Position) -> Self {
        Self::new(tileset, object_id, layer, origin, 1, 1)
    }

    pub const fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Every cell this object covers, row by row
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let origin = self.origin();
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |dy| (0..width).map(move |dx| origin.offset(dx, dy)))
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width as i32
            && pos.y < self.y + self.height as i32
    }
}

// ─── Merging ─────────────────────────────────────────────────────────────────

/// Merge labelled cells into stretched placements.
///
/// `top`, `bottom` and `center` cells merge horizontally, `left` and `right`
/// vertically; a run only continues while both label and tile id match.
/// Corner cells always produce 1×1 placements.
pub fn merge_runs(
    tiles: &BTreeMap<Position, (TerrainLabel, TileId)>,
    tileset: u32,
    layer: u32,
) -> Vec<ObjectPlacement> {
    let mut processed: HashSet<Position> = HashSet::new();
    let mut placements = Vec::new();

    for (&pos, &(label, object_id)) in tiles {
        if processed.contains(&pos) {
            continue;
        }

        let Some(axis) = label.merge_axis() else {
            processed.insert(pos);
            placements.push(ObjectPlacement::single(tileset, object_id, layer, pos));
            continue;
        };

        let (sx, sy) = axis.step(1);
        let same = |p: Position| tiles.get(&p) == Some(&(label, object_id));

        let mut start = pos;
        while same(start.offset(-sx, -sy)) {
            start = start.offset(-sx, -sy);
        }
        if processed.contains(&start) {
            processed.insert(pos);
            continue;
        }

        let mut length = 0u32;
        let mut cursor = start;
        while same(cursor) && !processed.contains(&cursor) {
            processed.insert(cursor);
            length += 1;
            cursor = cursor.offset(sx, sy);
        }

        let (width, height) = match axis {
            Axis::Horizontal => (length, 1),
            Axis::Vertical => (1, length),
        };
        placements.push(ObjectPlacement::new(tileset, object_id, layer, start, width, height));
    }

    placements
}

/// Merge a set of cells into vertical column runs of a single tile object
pub fn merge_columns<I>(
    positions: I,
    object_id: TileId,
    tileset: u32,
    layer: u32,
) -> Vec<ObjectPlacement>
where
    I: IntoIterator<Item = Position>,
{
    let mut columns: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
    for pos in positions {
        columns.entry(pos.x).or_default().insert(pos.y);
    }

    let mut placements = Vec::new();
    for (x, rows) in columns {
        let mut run: Option<(i32, u32)> = None;
        for y in rows {
            run = match run {
                Some((start, len)) if start + len as i32 == y => Some((start, len + 1)),
                Some((start, len)) => {
                    let origin = Position::new(x, start);
                    let placement = ObjectPlacement::new(tileset, object_id, layer, origin, 1, len);
                    placements.push(placement);
                    Some((y, 1))
                }
                None => Some((y, 1)),
            };
        }
        if let Some((start, len)) = run {
            let origin = Position::new(x, start);
            placements.push(ObjectPlacement::new(tileset, object_id, layer, origin, 1, len));
        }
    }

    placements
}

// ─── Tests ───────────────────────────────────────────────────────────────────
