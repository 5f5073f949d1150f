//! Terrain and slope labels
//!
//! Every painted cell carries one [`TileLabel`]: either one of the 13 terrain
//! pieces produced by auto-tiling and outline resolution, or one of the 12
//! slope pieces committed while the stroke is in slope mode.

use crate::position::{Axis, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Terrain ─────────────────────────────────────────────────────────────────

/// One of the 13 terrain pieces a brush maps to a tile object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerrainLabel {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    InnerTopLeft,
    InnerTopRight,
    InnerBottomLeft,
    InnerBottomRight,
}

impl TerrainLabel {
    /// All labels in persisted key order
    pub const ALL: [TerrainLabel; 13] = [
        TerrainLabel::Center,
        TerrainLabel::Top,
        TerrainLabel::Bottom,
        TerrainLabel::Left,
        TerrainLabel::Right,
        TerrainLabel::TopLeft,
        TerrainLabel::TopRight,
        TerrainLabel::BottomLeft,
        TerrainLabel::BottomRight,
        TerrainLabel::InnerTopLeft,
        TerrainLabel::InnerTopRight,
        TerrainLabel::InnerBottomLeft,
        TerrainLabel::InnerBottomRight,
    ];

    /// Slot of this label in [`Self::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Snake-case key used in brush documents
    pub const fn key(self) -> &'static str {
        match self {
            TerrainLabel::Center => "center",
            TerrainLabel::Top => "top",
            TerrainLabel::Bottom => "bottom",
            TerrainLabel::Left => "left",
            TerrainLabel::Right => "right",
            TerrainLabel::TopLeft => "top_left",
            TerrainLabel::TopRight => "top_right",
            TerrainLabel::BottomLeft => "bottom_left",
            TerrainLabel::BottomRight => "bottom_right",
            TerrainLabel::InnerTopLeft => "inner_top_left",
            TerrainLabel::InnerTopRight => "inner_top_right",
            TerrainLabel::InnerBottomLeft => "inner_bottom_left",
            TerrainLabel::InnerBottomRight => "inner_bottom_right",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.key() == key)
    }

    /// Axis along which consecutive cells of this label merge into one object.
    ///
    /// Corner pieces never merge.
    pub const fn merge_axis(self) -> Option<Axis> {
        match self {
            TerrainLabel::Top | TerrainLabel::Bottom | TerrainLabel::Center => {
                Some(Axis::Horizontal)
            }
            TerrainLabel::Left | TerrainLabel::Right => Some(Axis::Vertical),
            _ => None,
        }
    }

    /// True for the four straight edge pieces
    pub const fn is_edge(self) -> bool {
        matches!(
            self,
            TerrainLabel::Top | TerrainLabel::Bottom | TerrainLabel::Left | TerrainLabel::Right
        )
    }

    /// Axis the edge runs along (`top`/`bottom` are horizontal)
    pub const fn edge_axis(self) -> Option<Axis> {
        match self {
            TerrainLabel::Top | TerrainLabel::Bottom => Some(Axis::Horizontal),
            TerrainLabel::Left | TerrainLabel::Right => Some(Axis::Vertical),
            _ => None,
        }
    }

    /// Offsets pointing from this piece towards open air.
    ///
    /// Outer corners face two ways; center and inner corners have no border.
    pub const fn border_offsets(self) -> &'static [(i32, i32)] {
        match self {
            TerrainLabel::Top => &[(0, -1)],
            TerrainLabel::Bottom => &[(0, 1)],
            TerrainLabel::Left => &[(-1, 0)],
            TerrainLabel::Right => &[(1, 0)],
            TerrainLabel::TopLeft => &[(0, -1), (-1, 0)],
            TerrainLabel::TopRight => &[(0, -1), (1, 0)],
            TerrainLabel::BottomLeft => &[(0, 1), (-1, 0)],
            TerrainLabel::BottomRight => &[(0, 1), (1, 0)],
            _ => &[],
        }
    }
}

impl fmt::Display for TerrainLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ─── Slopes ──────────────────────────────────────────────────────────────────

/// Which surface a slope belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlopeCategory {
    /// Floor slopes, painted while moving left to right
    #[default]
    Top,
    /// Ceiling slopes, painted while moving right to left
    Bottom,
}

/// Horizontal extent of a slope piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum SlopeSize {
    #[default]
    #[serde(rename = "1x1")]
    OneByOne,
    #[serde(rename = "2x1")]
    TwoByOne,
    #[serde(rename = "4x1")]
    FourByOne,
}

impl SlopeSize {
    /// Smallest first
    pub const ALL: [SlopeSize; 3] =
        [SlopeSize::OneByOne, SlopeSize::TwoByOne, SlopeSize::FourByOne];

    pub const fn key(self) -> &'static str {
        match self {
            SlopeSize::OneByOne => "1x1",
            SlopeSize::TwoByOne => "2x1",
            SlopeSize::FourByOne => "4x1",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|size| size.key() == key)
    }

    /// Footprint width in tiles
    pub const fn width(self) -> i32 {
        match self {
            SlopeSize::OneByOne => 1,
            SlopeSize::TwoByOne => 2,
            SlopeSize::FourByOne => 4,
        }
    }
}

/// Which way the slope rises.
///
/// `Left` slopes ascend towards the stroke direction (the pointer moved up),
/// `Right` slopes descend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlopeSide {
    #[default]
    Left,
    Right,
}

/// Every slope piece is two tiles tall
pub const SLOPE_HEIGHT: i32 = 2;

/// One of the 12 slope pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlopeLabel {
    pub category: SlopeCategory,
    pub size: SlopeSize,
    pub side: SlopeSide,
}

impl SlopeLabel {
    /// All slopes in persisted key order (category, then size, then side)
    pub const ALL: [SlopeLabel; 12] = {
        use SlopeCategory::*;
        use SlopeSide::*;
        use SlopeSize::*;
        [
            SlopeLabel::new(Top, OneByOne, Left),
            SlopeLabel::new(Top, OneByOne, Right),
            SlopeLabel::new(Top, TwoByOne, Left),
            SlopeLabel::new(Top, TwoByOne, Right),
            SlopeLabel::new(Top, FourByOne, Left),
            SlopeLabel::new(Top, FourByOne, Right),
            SlopeLabel::new(Bottom, OneByOne, Left),
            SlopeLabel::new(Bottom, OneByOne, Right),
            SlopeLabel::new(Bottom, TwoByOne, Left),
            SlopeLabel::new(Bottom, TwoByOne, Right),
            SlopeLabel::new(Bottom, FourByOne, Left),
            SlopeLabel::new(Bottom, FourByOne, Right),
        ]
    };

    pub const fn new(category: SlopeCategory, size: SlopeSize, side: SlopeSide) -> Self {
        Self {
            category,
            size,
            side,
        }
    }

    /// Slot of this label in [`Self::ALL`]
    pub const fn index(self) -> usize {
        (self.category as usize) * 6 + (self.size as usize) * 2 + self.side as usize
    }

    /// Canonical key, e.g. `slope_top_2x1_left`
    pub fn key(self) -> String {
        let category = match self.category {
            SlopeCategory::Top => "top",
            SlopeCategory::Bottom => "bottom",
        };
        let side = match self.side {
            SlopeSide::Left => "left",
            SlopeSide::Right => "right",
        };
        format!("slope_{}_{}_{}", category, self.size.key(), side)
    }

    /// Parse a canonical key or a legacy `floor_up_2x1` style name.
    ///
    /// Legacy names map `floor` to top, `ceiling` to bottom, `up` to the
    /// ascending (left) side and `down` to the descending (right) side.
    pub fn from_key(key: &str) -> Option<Self> {
        let parts: Vec<&str> = key.split('_').collect();
        match parts.as_slice() {
            ["slope", category, size, side] => {
                let category = match *category {
                    "top" => SlopeCategory::Top,
                    "bottom" => SlopeCategory::Bottom,
                    _ => return None,
                };
                let side = match *side {
                    "left" => SlopeSide::Left,
                    "right" => SlopeSide::Right,
                    _ => return None,
                };
                Some(Self::new(category, SlopeSize::from_key(size)?, side))
            }
            [surface, rise, size] => {
                let category = match *surface {
                    "floor" => SlopeCategory::Top,
                    "ceiling" => SlopeCategory::Bottom,
                    _ => return None,
                };
                let side = match *rise {
                    "up" => SlopeSide::Left,
                    "down" => SlopeSide::Right,
                    _ => return None,
                };
                Some(Self::new(category, SlopeSize::from_key(size)?, side))
            }
            _ => None,
        }
    }

    /// Footprint as `(width, height)`
    pub const fn footprint(self) -> (i32, i32) {
        (self.size.width(), SLOPE_HEIGHT)
    }

    /// Every cell covered by this slope when placed at `origin`
    pub fn covered_positions(self, origin: Position) -> impl Iterator<Item = Position> {
        let (width, height) = self.footprint();
        (0..height).flat_map(move |dy| (0..width).map(move |dx| origin.offset(dx, dy)))
    }
}

impl fmt::Display for SlopeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<SlopeLabel> for String {
    fn from(label: SlopeLabel) -> Self {
        label.key()
    }
}

impl TryFrom<String> for SlopeLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SlopeLabel::from_key(&value).ok_or_else(|| format!("unknown slope key '{}'", value))
    }
}

// ─── Tile label ──────────────────────────────────────────────────────────────

/// Label attached to a painted cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileLabel {
    Terrain(TerrainLabel),
    Slope(SlopeLabel),
}

impl TileLabel {
    pub fn terrain(self) -> Option<TerrainLabel> {
        match self {
            TileLabel::Terrain(label) => Some(label),
            TileLabel::Slope(_) => None,
        }
    }

    pub fn slope(self) -> Option<SlopeLabel> {
        match self {
            TileLabel::Slope(label) => Some(label),
            TileLabel::Terrain(_) => None,
        }
    }
}

impl From<TerrainLabel> for TileLabel {
    fn from(label: TerrainLabel) -> Self {
        TileLabel::Terrain(label)
    }
}

impl From<SlopeLabel> for TileLabel {
    fn from(label: SlopeLabel) -> Self {
        TileLabel::Slope(label)
    }
}

impl fmt::Display for TileLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileLabel::Terrain(label) => label.fmt(f),
            TileLabel::Slope(label) => label.fmt(f),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
