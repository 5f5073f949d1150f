//! Grid coordinates

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Integer tile coordinate.
///
/// Ordered by `x`, then `y`, so maps keyed by position iterate column by column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Key of this cell on the given layer
    pub const fn on_layer(self, layer: u32) -> TileKey {
        TileKey {
            x: self.x,
            y: self.y,
            layer,
        }
    }

    /// Max of the per-axis distances
    pub fn chebyshev_distance(self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// True when `other` shares an edge with this cell
    pub fn is_adjacent(self, other: Position) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Grid axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    pub const fn perpendicular(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Dominant axis of a displacement; ties favour horizontal
    pub fn dominant(dx: i32, dy: i32) -> Axis {
        if dx.abs() >= dy.abs() {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// Component of `(dx, dy)` along this axis
    pub const fn component(self, dx: i32, dy: i32) -> i32 {
        match self {
            Axis::Horizontal => dx,
            Axis::Vertical => dy,
        }
    }

    /// Unit step along this axis with the given sign
    pub const fn step(self, sign: i32) -> (i32, i32) {
        match self {
            Axis::Horizontal => (sign, 0),
            Axis::Vertical => (0, sign),
        }
    }
}

/// Highest layer index painting and filling can target
pub const MAX_LAYER: u32 = 2;

/// Cell on a specific layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    pub x: i32,
    pub y: i32,
    pub layer: u32,
}

impl TileKey {
    pub const fn new(x: i32, y: i32, layer: u32) -> Self {
        Self { x, y, layer }
    }

    pub const fn position(self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Tile object id as stored in a tileset (0-255)
pub type TileId = u32;

/// Occupancy snapshot: which tile object sits in each cell
pub type TileSnapshot = HashMap<TileKey, TileId>;
