//! Slope placement
//!
//! Slopes are committed while the stroke is in slope mode: the pointer's
//! offset from the slope anchor selects a slope piece, committing it moves
//! the anchor to the slope's far end. Floor slopes (`top`) are laid while
//! moving left to right, ceiling slopes (`bottom`) while moving right to left.

use crate::direction::StrokeDirection;
use quickpaint_core::{Brush, Position, SlopeCategory, SlopeLabel, SlopeSide, SlopeSize};
use std::collections::HashSet;
use tracing::debug;

/// A slope laid down during the current stroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlopeSegment {
    pub label: SlopeLabel,
    /// Top-left cell of the slope footprint
    pub origin: Position,
    /// Stroke cells the slope stands in for
    pub covered: HashSet<Position>,
}

impl SlopeSegment {
    pub fn new(label: SlopeLabel, origin: Position) -> Self {
        Self {
            label,
            origin,
            covered: HashSet::new(),
        }
    }

    /// Every cell of the placed slope object
    pub fn footprint(&self) -> impl Iterator<Item = Position> {
        self.label.covered_positions(self.origin)
    }
}

/// Slope the pointer currently points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlopePreview {
    pub label: SlopeLabel,
    pub origin: Position,
}

impl SlopePreview {
    pub fn segment(&self) -> SlopeSegment {
        SlopeSegment::new(self.label, self.origin)
    }
}

/// Slope-mode state of a stroke
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlopeMode {
    pub active: bool,
    /// Cell the next slope attaches to
    pub anchor: Option<Position>,
    pub preview: Option<SlopePreview>,
    /// Stroke length when slope mode was entered
    pub entry_path_len: usize,
    /// Travel direction when slope mode was entered
    pub direction: Option<StrokeDirection>,
    /// Slopes committed since slope mode was entered
    pub committed: usize,
}

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Angle of a displacement above the horizontal, in degrees
pub fn slope_angle(dx: i32, dy: i32) -> f64 {
    if dx == 0 {
        90.0
    } else {
        f64::from(dy.abs()).atan2(f64::from(dx.abs())).to_degrees()
    }
}

/// Slope sizes to try for an angle, best match first
pub fn preferred_sizes(angle: f64) -> [SlopeSize; 3] {
    use SlopeSize::*;
    if angle >= 45.0 {
        [OneByOne, TwoByOne, FourByOne]
    } else if angle >= 20.0 {
        [TwoByOne, OneByOne, FourByOne]
    } else {
        [FourByOne, TwoByOne, OneByOne]
    }
}

/// Slope category for a travel direction; vertical travel has none
pub fn category_for(direction: StrokeDirection) -> Option<SlopeCategory> {
    match direction {
        StrokeDirection::LeftToRight => Some(SlopeCategory::Top),
        StrokeDirection::RightToLeft => Some(SlopeCategory::Bottom),
        _ => None,
    }
}

/// Rising pointer movement gives a left slope
pub fn side_for(dy: i32) -> SlopeSide {
    if dy < 0 {
        SlopeSide::Left
    } else {
        SlopeSide::Right
    }
}

/// Stroke direction that continues past a slope of the given category
pub fn exit_direction(category: SlopeCategory) -> StrokeDirection {
    match category {
        SlopeCategory::Top => StrokeDirection::LeftToRight,
        SlopeCategory::Bottom => StrokeDirection::RightToLeft,
    }
}

/// Footprint origin of a slope attached to `anchor`
pub fn slope_origin(anchor: Position, label: SlopeLabel) -> Position {
    let x = match label.category {
        SlopeCategory::Top => anchor.x + 1,
        SlopeCategory::Bottom => anchor.x - label.size.width(),
    };
    let y = match label.side {
        SlopeSide::Left => anchor.y - 1,
        SlopeSide::Right => anchor.y,
    };
    Position::new(x, y)
}

/// Anchor for whatever follows a slope placed at `origin`
pub fn exit_anchor(origin: Position, label: SlopeLabel) -> Position {
    let x = match label.category {
        SlopeCategory::Top => origin.x + label.size.width() - 1,
        SlopeCategory::Bottom => origin.x,
    };
    let y = match label.side {
        SlopeSide::Left => origin.y,
        SlopeSide::Right => origin.y + 1,
    };
    Position::new(x, y)
}

// ─── Slope mode ──────────────────────────────────────────────────────────────

/// Slope selected by the pointer at `target`, if any.
///
/// Floor slopes need the pointer right of the anchor, ceiling slopes left of
/// it. Sizes the brush does not enable are skipped in preference order.
pub fn preview_toward(
    anchor: Position,
    target: Position,
    direction: StrokeDirection,
    brush: &Brush,
) -> Option<SlopePreview> {
    let (dx, dy) = (target.x - anchor.x, target.y - anchor.y);
    if dx == 0 && dy == 0 {
        return None;
    }

    let Some(category) = category_for(direction) else {
        debug!(?direction, "no slopes while travelling vertically");
        return None;
    };
    let forward = match category {
        SlopeCategory::Top => dx > 0,
        SlopeCategory::Bottom => dx < 0,
    };
    if !forward {
        return None;
    }

    let side = side_for(dy);
    let label = preferred_sizes(slope_angle(dx, dy))
        .into_iter()
        .map(|size| SlopeLabel::new(category, size, side))
        .find(|label| brush.is_slope_enabled(*label))?;

    Some(SlopePreview {
        label,
        origin: slope_origin(anchor, label),
    })
}

/// Slope to show before the pointer has moved: ascending first, smallest first
pub fn suggest_default(
    anchor: Position,
    direction: StrokeDirection,
    brush: &Brush,
) -> Option<SlopePreview> {
    let category = category_for(direction)?;
    [SlopeSide::Left, SlopeSide::Right]
        .into_iter()
        .flat_map(|side| SlopeSize::ALL.map(|size| SlopeLabel::new(category, size, side)))
        .find(|label| brush.is_slope_enabled(*label))
        .map(|label| SlopePreview {
            label,
            origin: slope_origin(anchor, label),
        })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
