//! Stroke path construction
//!
//! Pointer positions arrive at arbitrary distances from the end of the
//! stroke. [`build_valid_path`] walks from the current end towards the
//! target one cell at a time and only emits moves that keep the stroke a
//! simple 4-connected path:
//!
//! - every step is to an orthogonal neighbor,
//! - no cell is visited twice and the walk never steps straight back,
//! - cells covered by slopes are never entered,
//! - the walk stops at the first cell with no legal move, so the stroke may
//!   lag behind the pointer.
//!
//! Dampening keeps the stroke on its axis while the pointer jitters: a
//! request whose dominant axis differs from the current axis only counts as
//! an attempt, and the turn goes through on the Nth consecutive attempt.

use crate::direction::StrokeDirection;
use quickpaint_core::{Axis, Position};
use std::collections::HashSet;
use tracing::debug;

/// Largest supported dampening factor
pub const MAX_DAMPENING: u8 = 5;

/// Default dampening factor
pub const DEFAULT_DAMPENING: u8 = 2;

/// Per-stroke state of the path builder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathState {
    /// Axis the stroke is locked to, fixed by the first movement
    pub primary_axis: Option<Axis>,
    /// Consecutive requests that asked to leave the primary axis
    pub pending_turns: u8,
    /// Horizontal direction the next move must take after leaving a slope
    pub exit_constraint: Option<StrokeDirection>,
}

impl PathState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Extend `path` towards `target`, returning only the new cells.
///
/// `blocked` holds cells that may not be entered (slope footprints).
/// An empty `path` yields just the target.
pub fn build_valid_path(
    path: &[Position],
    target: Position,
    state: &mut PathState,
    dampening: u8,
    blocked: &HashSet<Position>,
) -> Vec<Position> {
    let Some(&end) = path.last() else {
        return vec![target];
    };

    let (dx, dy) = (target.x - end.x, target.y - end.y);
    if dx == 0 && dy == 0 {
        return Vec::new();
    }

    if let Some(exit) = state.exit_constraint {
        let permitted = match exit {
            StrokeDirection::LeftToRight => dx > 0,
            StrokeDirection::RightToLeft => dx < 0,
            _ => true,
        };
        if !permitted {
            debug!(?exit, dx, "move against slope exit direction ignored");
            return Vec::new();
        }
    }

    let requested_axis = Axis::dominant(dx, dy);
    let locked_axis = apply_dampening(state, requested_axis, dampening.min(MAX_DAMPENING));

    let mut visited: HashSet<Position> = path.iter().copied().collect();
    let mut previous = path.len().checked_sub(2).map(|i| path[i]);
    let mut current = end;
    let mut added = Vec::new();

    while current != target {
        let (rx, ry) = (target.x - current.x, target.y - current.y);

        let steps: Vec<(i32, i32)> = match (state.exit_constraint, locked_axis) {
            (Some(exit), _) if added.is_empty() && exit.axis() == Axis::Horizontal => {
                vec![Axis::Horizontal.step(rx.signum())]
            }
            (_, Some(axis)) => {
                let component = axis.component(rx, ry);
                if component == 0 {
                    break;
                }
                vec![axis.step(component.signum())]
            }
            _ => [requested_axis, requested_axis.perpendicular()]
                .into_iter()
                .filter_map(|axis| {
                    let component = axis.component(rx, ry);
                    (component != 0).then(|| axis.step(component.signum()))
                })
                .collect(),
        };

        let next = steps
            .into_iter()
            .map(|(sx, sy)| current.offset(sx, sy))
            .find(|candidate| {
                !visited.contains(candidate)
                    && !blocked.contains(candidate)
                    && previous != Some(*candidate)
            });

        let Some(next) = next else {
            debug!(x = current.x, y = current.y, "path walk deadlocked");
            break;
        };

        visited.insert(next);
        added.push(next);
        previous = Some(current);
        current = next;
    }

    if !added.is_empty() {
        state.exit_constraint = None;
    }

    added
}

/// Update the turn counter and return the axis the walk is locked to, if any
fn apply_dampening(state: &mut PathState, requested: Axis, dampening: u8) -> Option<Axis> {
    if dampening == 0 {
        state.primary_axis = Some(requested);
        return None;
    }

    match state.primary_axis {
        None => {
            state.primary_axis = Some(requested);
            state.pending_turns = 0;
            None
        }
        Some(axis) if axis == requested => {
            state.pending_turns = 0;
            Some(axis)
        }
        Some(axis) => {
            state.pending_turns += 1;
            if state.pending_turns >= dampening {
                debug!(from = ?axis, to = ?requested, "dampened turn allowed");
                state.primary_axis = Some(requested);
                state.pending_turns = 0;
                None
            } else {
                Some(axis)
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn extend(path: &mut Vec<Position>, target: Position, state: &mut PathState, dampening: u8) {
        let added = build_valid_path(path, target, state, dampening, &HashSet::new());
        path.extend(added);
    }

    fn assert_simple_path(path: &[Position]) {
        let unique: HashSet<_> = path.iter().collect();
        assert_eq!(unique.len(), path.len(), "path revisits a cell: {:?}", path);
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "gap between {:?} and {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn empty_path_starts_at_target() {
        let mut state = PathState::default();
        let added = build_valid_path(&[], p(4, 4), &mut state, 2, &HashSet::new());
        assert_eq!(added, vec![p(4, 4)]);
    }

    #[test]
    fn diagonal_target_is_reached_with_orthogonal_steps() {
        let mut state = PathState::default();
        let mut path = vec![p(0, 0)];
        extend(&mut path, p(3, 2), &mut state, 0);
        assert_eq!(path.last(), Some(&p(3, 2)));
        assert_eq!(path.len(), 6);
        assert_simple_path(&path);
        // Dominant axis first
        assert_eq!(path[1], p(1, 0));
    }

    #[test]
    fn no_backtrack_onto_previous_cell() {
        let mut state = PathState::default();
        let path = vec![p(0, 0), p(1, 0), p(2, 0)];
        let added = build_valid_path(&path, p(0, 0), &mut state, 0, &HashSet::new());
        assert!(added.is_empty(), "walking back along the stroke must stop: {:?}", added);
    }

    #[test]
    fn visited_preferred_step_falls_back_to_other_axis() {
        let path = vec![p(0, 0), p(1, 0), p(1, 1)];
        let mut state = PathState::default();
        // Preferred move up is the previous cell, so the walk steps left,
        // then stops because (0, 0) is already part of the stroke
        let added = build_valid_path(&path, p(0, -1), &mut state, 0, &HashSet::new());
        assert_eq!(added, vec![p(0, 1)]);
    }

    #[test]
    fn blocked_cells_are_never_entered() {
        let blocked: HashSet<Position> = [p(2, 0)].into_iter().collect();
        let mut state = PathState::default();
        let added = build_valid_path(&[p(0, 0)], p(4, 0), &mut state, 0, &blocked);
        assert_eq!(added, vec![p(1, 0)]);
    }

    #[test]
    fn dampening_delays_turns_until_nth_attempt() {
        let mut state = PathState::default();
        let mut path = vec![p(0, 0)];
        extend(&mut path, p(4, 0), &mut state, 3);
        assert_eq!(state.primary_axis, Some(Axis::Horizontal));

        // First two requests to go down are swallowed
        extend(&mut path, p(4, 3), &mut state, 3);
        assert_eq!(path.last(), Some(&p(4, 0)));
        extend(&mut path, p(4, 4), &mut state, 3);
        assert_eq!(path.last(), Some(&p(4, 0)));

        // Third consecutive attempt turns
        extend(&mut path, p(4, 5), &mut state, 3);
        assert_eq!(path.last(), Some(&p(4, 5)));
        assert_eq!(state.primary_axis, Some(Axis::Vertical));
        assert_simple_path(&path);
    }

    #[test]
    fn straight_request_resets_turn_attempts() {
        let mut state = PathState::default();
        let mut path = vec![p(0, 0)];
        extend(&mut path, p(2, 0), &mut state, 2);
        extend(&mut path, p(2, 3), &mut state, 2);
        assert_eq!(state.pending_turns, 1);
        extend(&mut path, p(5, 1), &mut state, 2);
        assert_eq!(state.pending_turns, 0);
        assert_eq!(path.last(), Some(&p(5, 0)), "locked walk stays on its row");
    }

    #[test]
    fn zero_dampening_turns_immediately() {
        let mut state = PathState::default();
        let mut path = vec![p(0, 0)];
        extend(&mut path, p(3, 0), &mut state, 0);
        extend(&mut path, p(3, 2), &mut state, 0);
        assert_eq!(path.last(), Some(&p(3, 2)));
    }

    #[test]
    fn exit_constraint_rejects_wrong_direction_until_satisfied() {
        let mut state = PathState {
            exit_constraint: Some(StrokeDirection::LeftToRight),
            ..Default::default()
        };
        let path = vec![p(0, 0), p(1, 0)];
        let added = build_valid_path(&path, p(-3, 0), &mut state, 0, &HashSet::new());
        assert!(added.is_empty());
        assert!(state.exit_constraint.is_some(), "constraint survives a rejected move");

        let added = build_valid_path(&path, p(2, 3), &mut state, 0, &HashSet::new());
        assert_eq!(added.first(), Some(&p(2, 0)), "first move must follow the exit direction");
        assert_eq!(state.exit_constraint, None);
    }
}
