//! Fill configuration

use serde::{Deserialize, Serialize};

/// Cells a fill may reach before it asks for confirmation
pub const MAX_FILL_AREA: usize = 2048;

/// Depth of the band painted outside touched zone edges
pub const OVERPAINT_SIZE: i32 = 4;

/// Half-size of the box used for fills that start outside every zone
pub const OUTSIDE_ZONE_RADIUS: i32 = 100;

/// Tunables of a [`FillEngine`](crate::FillEngine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    pub max_area: usize,
    pub overpaint_size: i32,
    pub outside_zone_radius: i32,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            max_area: MAX_FILL_AREA,
            overpaint_size: OVERPAINT_SIZE,
            outside_zone_radius: OUTSIDE_ZONE_RADIUS,
        }
    }
}

impl FillConfig {
    /// Clamp values that would make the fill degenerate
    pub fn clamped(self) -> Self {
        Self {
            max_area: self.max_area.max(1),
            overpaint_size: self.overpaint_size.max(0),
            outside_zone_radius: self.outside_zone_radius.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: FillConfig = serde_json::from_str(r#"{ "overpaint_size": 2 }"#).unwrap();
        assert_eq!(config.max_area, MAX_FILL_AREA);
        assert_eq!(config.overpaint_size, 2);
        assert_eq!(config.outside_zone_radius, OUTSIDE_ZONE_RADIUS);
    }

    #[test]
    fn negative_overpaint_is_clamped() {
        let config = FillConfig {
            overpaint_size: -3,
            max_area: 0,
            ..Default::default()
        }
        .clamped();
        assert_eq!(config.overpaint_size, 0);
        assert_eq!(config.max_area, 1);
    }
}
