//! Bitmask to terrain piece classification

use crate::bitmask::NeighborFlags;
use quickpaint_core::{Brush, Position, TerrainLabel, TileId, TileSnapshot};

/// Classify a neighbor bitmask into a terrain piece.
///
/// Total over all 256 masks: any pattern without a dedicated piece falls
/// back to [`TerrainLabel::Center`].
pub fn classify(mask: u8) -> TerrainLabel {
    match mask {
        0xFF => TerrainLabel::Center,
        0x02 => TerrainLabel::Top,
        0x40 => TerrainLabel::Bottom,
        0x08 => TerrainLabel::Left,
        0x10 => TerrainLabel::Right,
        0x07 | 0x0B => TerrainLabel::TopLeft,
        0x0E | 0x0D => TerrainLabel::TopRight,
        0x70 | 0x68 => TerrainLabel::BottomLeft,
        0xE0 | 0xD0 => TerrainLabel::BottomRight,
        0xFE => TerrainLabel::InnerTopLeft,
        0xFD => TerrainLabel::InnerTopRight,
        0xDF => TerrainLabel::InnerBottomLeft,
        0xBF => TerrainLabel::InnerBottomRight,
        _ => TerrainLabel::Center,
    }
}

pub fn classify_neighbors(flags: &NeighborFlags) -> TerrainLabel {
    classify(flags.bitmask())
}

/// Auto-tile the cell at `pos` from the snapshot and resolve it through the brush.
///
/// Returns `None` when the brush has no tile for the resulting piece.
pub fn auto_tile(
    pos: Position,
    layer: u32,
    brush: &Brush,
    snapshot: &TileSnapshot,
) -> Option<(TerrainLabel, TileId)> {
    let label = classify_neighbors(&NeighborFlags::from_snapshot(snapshot, pos, layer));
    brush.terrain_tile(label).map(|tile| (label, tile))
}
