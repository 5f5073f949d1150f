//! Neighbor bitmask calculation

use quickpaint_core::{Position, TileSnapshot};
use serde::{Deserialize, Serialize};

/// Neighbor direction flags for bitmask calculation
pub mod neighbors {
    pub const TOP_LEFT: u8 = 0b0000_0001;
    pub const TOP: u8 = 0b0000_0010;
    pub const TOP_RIGHT: u8 = 0b0000_0100;
    pub const LEFT: u8 = 0b0000_1000;
    pub const RIGHT: u8 = 0b0001_0000;
    pub const BOTTOM_LEFT: u8 = 0b0010_0000;
    pub const BOTTOM: u8 = 0b0100_0000;
    pub const BOTTOM_RIGHT: u8 = 0b1000_0000;

    /// Offsets of each flag, in bit order. `y - 1` is the top row.
    pub const OFFSETS: [(u8, i32, i32); 8] = [
        (TOP_LEFT, -1, -1),
        (TOP, 0, -1),
        (TOP_RIGHT, 1, -1),
        (LEFT, -1, 0),
        (RIGHT, 1, 0),
        (BOTTOM_LEFT, -1, 1),
        (BOTTOM, 0, 1),
        (BOTTOM_RIGHT, 1, 1),
    ];
}

/// Which of the eight surrounding cells hold terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NeighborFlags {
    pub top_left: bool,
    pub top: bool,
    pub top_right: bool,
    pub left: bool,
    pub right: bool,
    pub bottom_left: bool,
    pub bottom: bool,
    pub bottom_right: bool,
}

impl NeighborFlags {
    /// All eight neighbors present
    pub const SURROUNDED: NeighborFlags = NeighborFlags {
        top_left: true,
        top: true,
        top_right: true,
        left: true,
        right: true,
        bottom_left: true,
        bottom: true,
        bottom_right: true,
    };

    /// Unpack a bitmask
    pub fn from_bitmask(mask: u8) -> Self {
        use neighbors::*;
        Self {
            top_left: mask & TOP_LEFT != 0,
            top: mask & TOP != 0,
            top_right: mask & TOP_RIGHT != 0,
            left: mask & LEFT != 0,
            right: mask & RIGHT != 0,
            bottom_left: mask & BOTTOM_LEFT != 0,
            bottom: mask & BOTTOM != 0,
            bottom_right: mask & BOTTOM_RIGHT != 0,
        }
    }

    /// Look up the neighbors of `pos` on `layer` in an occupancy snapshot
    pub fn from_snapshot(snapshot: &TileSnapshot, pos: Position, layer: u32) -> Self {
        Self::from_bitmask(calculate_bitmask(pos.x, pos.y, |x, y| {
            snapshot.contains_key(&Position::new(x, y).on_layer(layer))
        }))
    }

    /// Pack into the 8-bit mask
    pub fn bitmask(&self) -> u8 {
        use neighbors::*;
        let flags = [
            (self.top_left, TOP_LEFT),
            (self.top, TOP),
            (self.top_right, TOP_RIGHT),
            (self.left, LEFT),
            (self.right, RIGHT),
            (self.bottom_left, BOTTOM_LEFT),
            (self.bottom, BOTTOM),
            (self.bottom_right, BOTTOM_RIGHT),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .fold(0, |mask, (_, bit)| mask | bit)
    }
}

/// Calculate the neighbor bitmask for a tile
pub fn calculate_bitmask<F>(x: i32, y: i32, is_occupied: F) -> u8
where
    F: Fn(i32, i32) -> bool,
{
    neighbors::OFFSETS
        .iter()
        .filter(|(_, dx, dy)| is_occupied(x + dx, y + dy))
        .fold(0u8, |mask, (bit, _, _)| mask | bit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickpaint_core::TileKey;

    #[test]
    fn bitmask_round_trips_through_flags() {
        for mask in 0..=u8::MAX {
            assert_eq!(NeighborFlags::from_bitmask(mask).bitmask(), mask);
        }
    }

    #[test]
    fn top_is_the_row_above() {
        let mask = calculate_bitmask(5, 5, |x, y| (x, y) == (5, 4));
        assert_eq!(mask, neighbors::TOP);
        let mask = calculate_bitmask(5, 5, |x, y| (x, y) == (6, 6));
        assert_eq!(mask, neighbors::BOTTOM_RIGHT);
    }

    #[test]
    fn snapshot_lookup_respects_layer() {
        let mut snapshot = TileSnapshot::new();
        snapshot.insert(TileKey::new(1, 0, 1), 3);
        snapshot.insert(TileKey::new(0, 1, 2), 3);

        let flags = NeighborFlags::from_snapshot(&snapshot, Position::new(1, 1), 1);
        assert!(flags.top);
        assert!(!flags.left, "tile on another layer must be ignored");
    }
}
