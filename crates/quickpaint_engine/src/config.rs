//! Engine configuration

use crate::path::{DEFAULT_DAMPENING, MAX_DAMPENING};
pub use quickpaint_core::MAX_LAYER;
use serde::{Deserialize, Serialize};

/// Layer targeted when nothing else is configured
pub const DEFAULT_LAYER: u32 = 1;

/// When tiles are handed to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaintingMode {
    /// Auto-tile and emit every cell as the stroke grows
    Immediate,
    /// Collect the stroke and emit labelled, merged objects when it ends
    #[default]
    Deferred,
}

/// Engine state between and during strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaintingState {
    #[default]
    Idle,
    PaintingImmediate,
    PaintingDeferred,
}

/// Tunables of a [`PaintingEngine`](crate::PaintingEngine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consecutive off-axis requests needed before a stroke turns; 0 disables
    pub dampening_factor: u8,
    pub mode: PaintingMode,
    pub layer: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dampening_factor: DEFAULT_DAMPENING,
            mode: PaintingMode::default(),
            layer: DEFAULT_LAYER,
        }
    }
}

impl EngineConfig {
    /// Clamp out-of-range values into their valid ranges
    pub fn clamped(self) -> Self {
        Self {
            dampening_factor: self.dampening_factor.min(MAX_DAMPENING),
            layer: self.layer.min(MAX_LAYER),
            ..self
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_deferred_layer_one() {
        let config = EngineConfig::default();
        assert_eq!(config.dampening_factor, 2);
        assert_eq!(config.mode, PaintingMode::Deferred);
        assert_eq!(config.layer, 1);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "mode": "immediate", "layer": 7 }"#).unwrap();
        assert_eq!(config.mode, PaintingMode::Immediate);
        assert_eq!(config.dampening_factor, 2);

        let config = config.clamped();
        assert_eq!(config.layer, MAX_LAYER, "layer is clamped into 0..=2");
    }

    #[test]
    fn dampening_is_clamped_to_five() {
        let config = EngineConfig {
            dampening_factor: 40,
            ..Default::default()
        }
        .clamped();
        assert_eq!(config.dampening_factor, 5);
    }
}
