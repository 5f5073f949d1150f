//! Zone-bounded flood fill and overpaint

use quickpaint_core::Position;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Rectangular fill zone in tiles; `x + width` and `y + height` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ZoneBounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Square box reaching `radius` tiles in every direction from `center`
    pub const fn around(center: Position, radius: i32) -> Self {
        Self::new(center.x - radius, center.y - radius, radius * 2, radius * 2)
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Rightmost column inside the zone
    pub const fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Bottom row inside the zone
    pub const fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub const fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.x < self.x + self.width
            && pos.y >= self.y
            && pos.y < self.y + self.height
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Cells reached by a flood fill
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloodOutcome {
    pub positions: BTreeSet<Position>,
    /// The limit was reached while fillable cells were still queued
    pub interrupted: bool,
}

/// 4-connected BFS from `start` over free cells inside `zone`.
///
/// With a `limit`, the fill stops at that many cells; it is only reported
/// as interrupted when another fillable cell was waiting.
pub fn flood_fill<F>(
    start: Position,
    zone: ZoneBounds,
    limit: Option<usize>,
    is_free: F,
) -> FloodOutcome
where
    F: Fn(Position) -> bool,
{
    let mut outcome = FloodOutcome::default();
    let mut visited: HashSet<Position> = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(pos) = queue.pop_front() {
        if !zone.contains(pos) || !is_free(pos) {
            continue;
        }
        if limit.is_some_and(|limit| outcome.positions.len() >= limit) {
            outcome.interrupted = true;
            break;
        }

        outcome.positions.insert(pos);
        for (dx, dy) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
            let next = pos.offset(dx, dy);
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    outcome
}

/// Extend a fill past the zone edges it touches.
///
/// Every fill cell on a zone edge gets a `depth`-deep band of cells outward
/// from that edge. A fill cell sitting exactly on a zone corner also gets a
/// `depth`×`depth` block diagonally outside the corner.
pub fn add_overpaint(
    positions: &BTreeSet<Position>,
    zone: ZoneBounds,
    depth: i32,
) -> BTreeSet<Position> {
    let mut result = positions.clone();
    if positions.is_empty() || depth <= 0 {
        return result;
    }

    let (left, right, top, bottom) = (zone.left(), zone.right(), zone.top(), zone.bottom());

    for pos in positions {
        for d in 1..=depth {
            if pos.x == left {
                result.insert(Position::new(left - d, pos.y));
            }
            if pos.x == right {
                result.insert(Position::new(right + d, pos.y));
            }
            if pos.y == top {
                result.insert(Position::new(pos.x, top - d));
            }
            if pos.y == bottom {
                result.insert(Position::new(pos.x, bottom + d));
            }
        }
    }

    let corners = [
        (Position::new(left, top), -1, -1),
        (Position::new(right, top), 1, -1),
        (Position::new(left, bottom), -1, 1),
        (Position::new(right, bottom), 1, 1),
    ];
    for (corner, sx, sy) in corners {
        if !positions.contains(&corner) {
            continue;
        }
        for dx in 1..=depth {
            for dy in 1..=depth {
                result.insert(corner.offset(sx * dx, sy * dy));
            }
        }
    }

    result
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn empty_zone_fills_completely() {
        let zone = ZoneBounds::new(0, 0, 12, 7);
        let outcome = flood_fill(p(5, 3), zone, Some(2048), |_| true);
        assert_eq!(outcome.positions.len(), 84);
        assert!(!outcome.interrupted);
        assert!(outcome.positions.iter().all(|pos| zone.contains(*pos)));
    }

    #[test]
    fn walls_stop_the_fill() {
        let zone = ZoneBounds::new(0, 0, 10, 10);
        let outcome = flood_fill(p(1, 1), zone, None, |pos| pos.x != 5);
        assert_eq!(outcome.positions.len(), 50);
        assert!(outcome.positions.iter().all(|pos| pos.x < 5));
    }

    #[test]
    fn limit_interrupts_large_regions() {
        let zone = ZoneBounds::new(0, 0, 64, 64);
        let outcome = flood_fill(p(10, 10), zone, Some(2048), |_| true);
        assert_eq!(outcome.positions.len(), 2048);
        assert!(outcome.interrupted);
    }

    #[test]
    fn region_of_exactly_the_limit_is_not_interrupted() {
        let zone = ZoneBounds::new(0, 0, 64, 32);
        let outcome = flood_fill(p(0, 0), zone, Some(2048), |_| true);
        assert_eq!(outcome.positions.len(), 2048);
        assert!(!outcome.interrupted, "nothing was left to fill");
    }

    #[test]
    fn overpaint_only_extends_touched_edges() {
        let zone = ZoneBounds::new(0, 0, 10, 10);
        let filled = flood_fill(p(1, 1), zone, None, |pos| pos.x != 5).positions;
        let painted = add_overpaint(&filled, zone, 4);

        assert!(painted.iter().all(|pos| pos.x <= zone.right()), "right edge was never touched");
        let left_band = painted.iter().filter(|pos| pos.x < 0 && (0..10).contains(&pos.y)).count();
        assert_eq!(left_band, 40);
        // 50 filled, 40 left, 20 top, 20 bottom, two 4x4 corner blocks
        assert_eq!(painted.len(), 162);
    }

    #[test]
    fn fill_away_from_edges_gets_no_overpaint() {
        let zone = ZoneBounds::new(0, 0, 10, 10);
        let filled: BTreeSet<Position> = [p(4, 4), p(4, 5)].into_iter().collect();
        assert_eq!(add_overpaint(&filled, zone, 4), filled);
    }

    #[test]
    fn zone_edges_are_inclusive_of_last_cell() {
        let zone = ZoneBounds::around(p(0, 0), 100);
        assert_eq!((zone.left(), zone.right()), (-100, 99));
        assert!(zone.contains(p(99, -100)));
        assert!(!zone.contains(p(100, 0)));
        assert_eq!(zone.area(), 40_000);
    }
}
