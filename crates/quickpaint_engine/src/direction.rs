//! Stroke directions and the painting-direction filter

use quickpaint_core::{Axis, Position, TerrainLabel};
use serde::{Deserialize, Serialize};

/// Direction of travel along the stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeDirection {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl StrokeDirection {
    /// Direction of the first movement of a stroke.
    ///
    /// Horizontal only when the horizontal displacement strictly dominates.
    pub fn initial(start: Position, pos: Position) -> Option<Self> {
        let (dx, dy) = (pos.x - start.x, pos.y - start.y);
        if dx == 0 && dy == 0 {
            return None;
        }
        Some(if dx.abs() > dy.abs() {
            if dx > 0 {
                StrokeDirection::LeftToRight
            } else {
                StrokeDirection::RightToLeft
            }
        } else if dy > 0 {
            StrokeDirection::TopToBottom
        } else {
            StrokeDirection::BottomToTop
        })
    }

    /// Direction of a single path step (`x` is checked first)
    pub fn of_step(from: Position, to: Position) -> Option<Self> {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        if dx > 0 {
            Some(StrokeDirection::LeftToRight)
        } else if dx < 0 {
            Some(StrokeDirection::RightToLeft)
        } else if dy > 0 {
            Some(StrokeDirection::TopToBottom)
        } else if dy < 0 {
            Some(StrokeDirection::BottomToTop)
        } else {
            None
        }
    }

    pub const fn axis(self) -> Axis {
        match self {
            StrokeDirection::LeftToRight | StrokeDirection::RightToLeft => Axis::Horizontal,
            StrokeDirection::TopToBottom | StrokeDirection::BottomToTop => Axis::Vertical,
        }
    }

    /// Does turning from `self` into `next` go clockwise?
    pub fn turns_clockwise_to(self, next: StrokeDirection) -> bool {
        use StrokeDirection::*;
        matches!(
            (self, next),
            (LeftToRight, TopToBottom)
                | (TopToBottom, RightToLeft)
                | (RightToLeft, BottomToTop)
                | (BottomToTop, LeftToRight)
        )
    }
}

/// Which side of the terrain the stroke paints, fixed by the first movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaintingDirection {
    /// No movement yet; everything is painted
    #[default]
    Auto,
    /// Ground surfaces and left walls
    GroundLeft,
    /// Ceilings and right walls
    CeilingRight,
}

impl PaintingDirection {
    pub fn for_stroke(direction: StrokeDirection) -> Self {
        match direction {
            StrokeDirection::LeftToRight | StrokeDirection::BottomToTop => {
                PaintingDirection::GroundLeft
            }
            StrokeDirection::RightToLeft | StrokeDirection::TopToBottom => {
                PaintingDirection::CeilingRight
            }
        }
    }

    /// Should an auto-tiled piece be painted for this direction?
    ///
    /// Ground strokes paint top and left pieces, plus bottom pieces when
    /// terrain sits above; ceiling strokes mirror that.
    pub fn should_paint(
        self,
        label: TerrainLabel,
        terrain_above: bool,
        terrain_below: bool,
    ) -> bool {
        use TerrainLabel::*;
        match self {
            PaintingDirection::Auto => true,
            PaintingDirection::GroundLeft => {
                matches!(label, Top | Left | TopLeft | TopRight)
                    || (terrain_above && matches!(label, Bottom | BottomLeft | BottomRight))
            }
            PaintingDirection::CeilingRight => {
                matches!(label, Bottom | Right | BottomLeft | BottomRight)
                    || (terrain_below && matches!(label, Top | TopLeft | TopRight))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_direction_needs_strict_horizontal_dominance() {
        let start = Position::new(0, 0);
        assert_eq!(
            StrokeDirection::initial(start, Position::new(3, 1)),
            Some(StrokeDirection::LeftToRight)
        );
        assert_eq!(
            StrokeDirection::initial(start, Position::new(-2, 2)),
            Some(StrokeDirection::TopToBottom),
            "ties are vertical"
        );
        assert_eq!(
            StrokeDirection::initial(start, Position::new(1, -4)),
            Some(StrokeDirection::BottomToTop)
        );
        assert_eq!(StrokeDirection::initial(start, start), None);
    }

    #[test]
    fn painting_direction_mapping() {
        assert_eq!(
            PaintingDirection::for_stroke(StrokeDirection::LeftToRight),
            PaintingDirection::GroundLeft
        );
        assert_eq!(
            PaintingDirection::for_stroke(StrokeDirection::BottomToTop),
            PaintingDirection::GroundLeft
        );
        assert_eq!(
            PaintingDirection::for_stroke(StrokeDirection::RightToLeft),
            PaintingDirection::CeilingRight
        );
        assert_eq!(
            PaintingDirection::for_stroke(StrokeDirection::TopToBottom),
            PaintingDirection::CeilingRight
        );
    }

    #[test]
    fn ground_filter_paints_bottom_only_under_terrain() {
        let ground = PaintingDirection::GroundLeft;
        assert!(ground.should_paint(TerrainLabel::Top, false, false));
        assert!(!ground.should_paint(TerrainLabel::Bottom, false, false));
        assert!(ground.should_paint(TerrainLabel::Bottom, true, false));
        assert!(!ground.should_paint(TerrainLabel::Right, true, true));

        let ceiling = PaintingDirection::CeilingRight;
        assert!(ceiling.should_paint(TerrainLabel::Right, false, false));
        assert!(ceiling.should_paint(TerrainLabel::TopLeft, false, true));
        assert!(!ceiling.should_paint(TerrainLabel::TopLeft, false, false));
        assert!(PaintingDirection::Auto.should_paint(TerrainLabel::Center, false, false));
    }

    #[test]
    fn clockwise_turns() {
        use StrokeDirection::*;
        assert!(LeftToRight.turns_clockwise_to(TopToBottom));
        assert!(BottomToTop.turns_clockwise_to(LeftToRight));
        assert!(!LeftToRight.turns_clockwise_to(BottomToTop));
    }
}
