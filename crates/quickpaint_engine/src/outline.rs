//! Outline and corner resolution
//!
//! Deferred strokes are labelled by walking the path: the first movement
//! picks the edge being drawn (moving right draws a floor `top`, moving
//! left a ceiling `bottom`, moving up a `left` wall, moving down a `right`
//! wall) and every 90° turn places a corner at the turning cell and switches
//! to the edge that continues in the new direction.

use crate::direction::StrokeDirection;
use crate::slope::SlopeSegment;
use quickpaint_core::{Position, TerrainLabel, TileLabel};
use std::collections::{HashMap, HashSet};

/// Edge currently being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Edge drawn by a stroke that starts moving in `direction`
    pub fn for_direction(direction: Option<StrokeDirection>) -> Edge {
        match direction {
            Some(StrokeDirection::RightToLeft) => Edge::Bottom,
            Some(StrokeDirection::BottomToTop) => Edge::Left,
            Some(StrokeDirection::TopToBottom) => Edge::Right,
            Some(StrokeDirection::LeftToRight) | None => Edge::Top,
        }
    }

    pub const fn label(self) -> TerrainLabel {
        match self {
            Edge::Top => TerrainLabel::Top,
            Edge::Bottom => TerrainLabel::Bottom,
            Edge::Left => TerrainLabel::Left,
            Edge::Right => TerrainLabel::Right,
        }
    }
}

/// Corner placed at the turning cell when the stroke turns from `old` to `new`
pub fn corner_for_turn(
    edge: Edge,
    old: StrokeDirection,
    new: StrokeDirection,
) -> Option<TerrainLabel> {
    use StrokeDirection::*;
    use TerrainLabel::*;
    let corner = match (edge, old, new) {
        (Edge::Top, LeftToRight, TopToBottom) => TopRight,
        (Edge::Top, LeftToRight, BottomToTop) => InnerTopRight,
        (Edge::Top, RightToLeft, TopToBottom) => TopLeft,
        (Edge::Top, RightToLeft, BottomToTop) => InnerTopLeft,

        (Edge::Bottom, LeftToRight, TopToBottom) => InnerBottomRight,
        (Edge::Bottom, LeftToRight, BottomToTop) => BottomRight,
        (Edge::Bottom, RightToLeft, TopToBottom) => InnerBottomLeft,
        (Edge::Bottom, RightToLeft, BottomToTop) => BottomLeft,

        (Edge::Left, BottomToTop, LeftToRight) => TopLeft,
        (Edge::Left, BottomToTop, RightToLeft) => InnerBottomRight,
        (Edge::Left, TopToBottom, LeftToRight) => InnerTopRight,
        (Edge::Left, TopToBottom, RightToLeft) => BottomLeft,

        (Edge::Right, BottomToTop, LeftToRight) => InnerBottomLeft,
        (Edge::Right, BottomToTop, RightToLeft) => TopRight,
        (Edge::Right, TopToBottom, LeftToRight) => InnerTopLeft,
        (Edge::Right, TopToBottom, RightToLeft) => BottomRight,

        _ => return None,
    };
    Some(corner)
}

/// Edge drawn after turning from `old` to `new`; unknown turns keep the edge
pub fn edge_after_turn(edge: Edge, old: StrokeDirection, new: StrokeDirection) -> Edge {
    use StrokeDirection::*;
    match (edge, old, new) {
        (Edge::Top, LeftToRight, TopToBottom) => Edge::Right,
        (Edge::Top, LeftToRight, BottomToTop) => Edge::Left,
        (Edge::Top, RightToLeft, TopToBottom) => Edge::Left,
        (Edge::Top, RightToLeft, BottomToTop) => Edge::Right,

        (Edge::Bottom, LeftToRight, TopToBottom) => Edge::Left,
        (Edge::Bottom, LeftToRight, BottomToTop) => Edge::Right,
        (Edge::Bottom, RightToLeft, TopToBottom) => Edge::Right,
        (Edge::Bottom, RightToLeft, BottomToTop) => Edge::Left,

        (Edge::Left, BottomToTop, LeftToRight) => Edge::Top,
        (Edge::Left, BottomToTop, RightToLeft) => Edge::Bottom,
        (Edge::Left, TopToBottom, LeftToRight) => Edge::Top,
        (Edge::Left, TopToBottom, RightToLeft) => Edge::Bottom,

        (Edge::Right, BottomToTop, LeftToRight) => Edge::Bottom,
        (Edge::Right, BottomToTop, RightToLeft) => Edge::Top,
        (Edge::Right, TopToBottom, LeftToRight) => Edge::Top,
        (Edge::Right, TopToBottom, RightToLeft) => Edge::Bottom,

        _ => edge,
    }
}

// ─── Outline ─────────────────────────────────────────────────────────────────

/// Ordered outline cells with their labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    positions: Vec<Position>,
    labels: HashMap<Position, TileLabel>,
}

impl Outline {
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn label_at(&self, pos: Position) -> Option<TileLabel> {
        self.labels.get(&pos).copied()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.labels.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Cells in outline order with their labels
    pub fn iter(&self) -> impl Iterator<Item = (Position, TileLabel)> + '_ {
        self.positions
            .iter()
            .filter_map(|pos| self.labels.get(pos).map(|label| (*pos, *label)))
    }

    /// Cells whose label is a straight edge, in outline order
    pub fn edges(&self) -> impl Iterator<Item = (Position, TerrainLabel)> + '_ {
        self.iter()
            .filter_map(|(pos, label)| label.terrain().filter(|l| l.is_edge()).map(|l| (pos, l)))
    }

    /// Add a cell; an already labelled cell keeps its label
    fn insert(&mut self, pos: Position, label: TileLabel) {
        if !self.labels.contains_key(&pos) {
            self.labels.insert(pos, label);
            self.positions.push(pos);
        }
    }

    /// Relabel a cell, listing it if needed
    pub(crate) fn relabel(&mut self, pos: Position, label: TileLabel) {
        if self.labels.insert(pos, label).is_none() {
            self.positions.push(pos);
        }
    }
}

impl FromIterator<(Position, TileLabel)> for Outline {
    fn from_iter<I: IntoIterator<Item = (Position, TileLabel)>>(iter: I) -> Self {
        let mut outline = Outline::default();
        for (pos, label) in iter {
            outline.insert(pos, label);
        }
        outline
    }
}

/// Label the stroke `path`.
///
/// Slope origins come first. Cells covered by a slope are skipped, and a
/// step out of a slope (or across a recorded slope-exit join) never counts
/// as a turn.
pub fn resolve_outline(
    path: &[Position],
    initial_direction: Option<StrokeDirection>,
    slopes: &[SlopeSegment],
    slope_joins: &HashSet<usize>,
) -> Outline {
    let mut outline = Outline::default();
    if path.is_empty() {
        return outline;
    }

    let covered: HashSet<Position> =
        slopes.iter().flat_map(|s| s.covered.iter().copied()).collect();

    for slope in slopes {
        outline.insert(slope.origin, TileLabel::Slope(slope.label));
    }
    if !slopes.is_empty() && path.iter().all(|pos| covered.contains(pos)) {
        return outline;
    }

    let mut edge = Edge::for_direction(initial_direction);
    let mut moving = initial_direction;

    for (i, &pos) in path.iter().enumerate() {
        if covered.contains(&pos) {
            continue;
        }

        if i > 0 {
            let prev = path[i - 1];
            let exiting_slope = covered.contains(&prev) || slope_joins.contains(&i);
            if !exiting_slope {
                if let Some(step) = StrokeDirection::of_step(prev, pos) {
                    if Some(step) != moving {
                        if let Some(old) = moving {
                            let is_slope =
                                matches!(outline.label_at(prev), Some(TileLabel::Slope(_)));
                            if let Some(corner) = corner_for_turn(edge, old, step) {
                                if !is_slope {
                                    outline.relabel(prev, TileLabel::Terrain(corner));
                                }
                            }
                            edge = edge_after_turn(edge, old, step);
                        }
                        moving = Some(step);
                    }
                }
            }
        }

        outline.insert(pos, TileLabel::Terrain(edge.label()));
    }

    outline
}

// ─── Tests ───────────────────────────────────────────────────────────────────
