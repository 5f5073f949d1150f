//! Terrain brushes
//!
//! A [`Brush`] maps every terrain and slope label to a tile object of one
//! tileset family. Brushes are persisted as JSON documents:
//!
//! ```json
//! {
//!   "name": "Grassland",
//!   "tileset_names": ["Pa1_grass.*"],
//!   "category": "cat3",
//!   "painting_mode": "SmartPaint",
//!   "terrain": { "center": 0, "top": 5, "left": null },
//!   "slopes": { "slope_top_1x1_left": 20, "slope_top_2x1_left": 21, "slope_top_4x1_right": -1 },
//!   "disabled_slopes": ["slope_top_2x1_left"]
//! }
//! ```
//!
//! Terrain values are a tile id or `null`. Slope values are a tile id,
//! `null` (enabled but unassigned) or `-1` (disabled). A slope missing from
//! `slopes` is disabled. A slope listed in `disabled_slopes` keeps its tile
//! but is switched off.

use crate::label::{SlopeLabel, SlopeSize, TerrainLabel, TileLabel};
use crate::position::TileId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

/// Largest tile object id a tileset can hold
pub const MAX_TILE_ID: i64 = 255;

/// Slope value marking a disabled slope in brush documents
const DISABLED_SLOPE: i64 = -1;

/// Errors that can occur when loading a brush document
#[derive(Debug, Error)]
pub enum BrushError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid tile id {value} for '{key}'")]
    InvalidTileId { key: String, value: i64 },
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Which slope sizes a tileset family provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TilesetCategory {
    /// Flat terrain only
    Cat1,
    /// 4x1 slopes only
    Cat2,
    /// All slope sizes
    #[default]
    Cat3,
}

impl TilesetCategory {
    /// Parse a category key; anything unknown falls back to [`TilesetCategory::Cat3`]
    pub fn from_key(key: &str) -> Self {
        match key {
            "cat1" => TilesetCategory::Cat1,
            "cat2" => TilesetCategory::Cat2,
            _ => TilesetCategory::Cat3,
        }
    }

    pub fn allows_slope_size(self, size: SlopeSize) -> bool {
        match self {
            TilesetCategory::Cat1 => false,
            TilesetCategory::Cat2 => size == SlopeSize::FourByOne,
            TilesetCategory::Cat3 => true,
        }
    }
}

/// Tileset slot a brush paints into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TilesetSlot {
    #[default]
    Pa0,
    Pa1,
    Pa2,
    Pa3,
}

impl TilesetSlot {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Pa0" => Some(TilesetSlot::Pa0),
            "Pa1" => Some(TilesetSlot::Pa1),
            "Pa2" => Some(TilesetSlot::Pa2),
            "Pa3" => Some(TilesetSlot::Pa3),
            _ => None,
        }
    }

    /// Tileset index used in placements
    pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Tool the host switches to when the brush is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BrushMode {
    #[default]
    SmartPaint,
    SingleTile,
    ShapeCreator,
}

impl BrushMode {
    /// Parse a mode key; anything unknown falls back to [`BrushMode::SmartPaint`]
    pub fn from_key(key: &str) -> Self {
        match key {
            "SingleTile" => BrushMode::SingleTile,
            "ShapeCreator" => BrushMode::ShapeCreator,
            _ => BrushMode::SmartPaint,
        }
    }
}

// ─── Brush ───────────────────────────────────────────────────────────────────

/// Mapping from terrain and slope labels to tile objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brush {
    /// Unique brush name
    pub name: String,
    /// Tileset name patterns (regular expressions anchored at the start)
    pub tileset_names: Vec<String>,
    pub category: TilesetCategory,
    pub slot: TilesetSlot,
    pub painting_mode: BrushMode,
    priority: u8,
    terrain: [Option<TileId>; 13],
    slopes: [Option<TileId>; 12],
    disabled_slopes: [bool; 12],
}

impl Brush {
    pub fn new(name: impl Into<String>, tileset_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tileset_names,
            category: TilesetCategory::default(),
            slot: TilesetSlot::default(),
            painting_mode: BrushMode::default(),
            priority: 0,
            terrain: [None; 13],
            slopes: [None; 12],
            disabled_slopes: [false; 12],
        }
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Set the priority, clamped to 0-9
    pub fn set_priority(&mut self, priority: i64) {
        self.priority = priority.clamp(0, 9) as u8;
    }

    /// Tileset index emitted in placements
    pub fn tileset_index(&self) -> u32 {
        self.slot.index()
    }

    // Terrain

    pub fn terrain_tile(&self, label: TerrainLabel) -> Option<TileId> {
        self.terrain[label.index()]
    }

    pub fn set_terrain_tile(&mut self, label: TerrainLabel, tile: TileId) {
        self.terrain[label.index()] = Some(tile);
    }

    pub fn clear_terrain_tile(&mut self, label: TerrainLabel) {
        self.terrain[label.index()] = None;
    }

    /// True once a tile has been assigned, even if it is tile 0
    pub fn is_terrain_assigned(&self, label: TerrainLabel) -> bool {
        self.terrain[label.index()].is_some()
    }

    // Slopes

    pub fn slope_tile(&self, label: SlopeLabel) -> Option<TileId> {
        self.slopes[label.index()]
    }

    pub fn set_slope_tile(&mut self, label: SlopeLabel, tile: TileId) {
        self.slopes[label.index()] = Some(tile);
    }

    pub fn clear_slope_tile(&mut self, label: SlopeLabel) {
        self.slopes[label.index()] = None;
    }

    pub fn set_slope_enabled(&mut self, label: SlopeLabel, enabled: bool) {
        self.disabled_slopes[label.index()] = !enabled;
    }

    /// A slope can be painted when the category provides its size and it has
    /// not been switched off
    pub fn is_slope_enabled(&self, label: SlopeLabel) -> bool {
        self.category.allows_slope_size(label.size) && !self.disabled_slopes[label.index()]
    }

    /// Tile for any label
    pub fn tile_for(&self, label: TileLabel) -> Option<TileId> {
        match label {
            TileLabel::Terrain(label) => self.terrain_tile(label),
            TileLabel::Slope(label) => self.slope_tile(label),
        }
    }

    /// Reverse lookup: which label a tile id stands for (terrain first)
    pub fn label_for_tile(&self, tile: TileId) -> Option<TileLabel> {
        TerrainLabel::ALL
            .iter()
            .find(|label| self.terrain_tile(**label) == Some(tile))
            .map(|label| TileLabel::Terrain(*label))
            .or_else(|| {
                SlopeLabel::ALL
                    .iter()
                    .find(|label| self.slope_tile(**label) == Some(tile))
                    .map(|label| TileLabel::Slope(*label))
            })
    }

    /// Does this brush apply to the named tileset?
    ///
    /// Each pattern is tried as a regular expression anchored at the start of
    /// the name; a pattern that does not compile is compared literally.
    pub fn matches_tileset(&self, tileset_name: &str) -> bool {
        self.tileset_names
            .iter()
            .any(|pattern| match Regex::new(&format!("^(?:{})", pattern)) {
                Ok(regex) => regex.is_match(tileset_name),
                Err(_) => {
                    debug!(
                        pattern = %pattern,
                        "tileset pattern is not a valid regex, comparing literally"
                    );
                    pattern == tileset_name
                }
            })
    }

    // ─── JSON ────────────────────────────────────────────────────────────────

    /// Parse a brush document
    pub fn from_json_str(json: &str) -> Result<Self, BrushError> {
        let document: BrushDocument =
            serde_json::from_str(json).map_err(|e| BrushError::ParseError(e.to_string()))?;
        document.into_brush()
    }

    pub fn from_json_value(value: Value) -> Result<Self, BrushError> {
        let document: BrushDocument =
            serde_json::from_value(value).map_err(|e| BrushError::ParseError(e.to_string()))?;
        document.into_brush()
    }

    pub fn to_json_value(&self) -> Value {
        serde_json::json!(BrushDocument::from(self))
    }

    /// Pretty-printed brush document
    pub fn to_json_string(&self) -> String {
        // A document of strings and integers always serializes
        serde_json::to_string_pretty(&BrushDocument::from(self)).unwrap_or_default()
    }
}

/// On-disk layout of a brush
#[derive(Debug, Serialize, Deserialize)]
struct BrushDocument {
    name: String,
    #[serde(default)]
    tileset_names: Vec<String>,
    #[serde(default)]
    category: Option<Value>,
    #[serde(default)]
    slot: Option<Value>,
    #[serde(default)]
    painting_mode: Option<Value>,
    #[serde(default)]
    priority: i64,
    #[serde(default)]
    terrain: BTreeMap<String, Option<i64>>,
    #[serde(default)]
    slopes: BTreeMap<String, Option<i64>>,
    /// Slopes switched off that still carry a tile
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    disabled_slopes: Vec<String>,
}

fn validate_tile_id(key: &str, value: i64) -> Result<TileId, BrushError> {
    if (0..=MAX_TILE_ID).contains(&value) {
        Ok(value as TileId)
    } else {
        Err(BrushError::InvalidTileId {
            key: key.to_string(),
            value,
        })
    }
}

impl BrushDocument {
    fn into_brush(self) -> Result<Brush, BrushError> {
        let mut brush = Brush::new(self.name, self.tileset_names);
        brush.category = match &self.category {
            Some(Value::String(key)) => TilesetCategory::from_key(key),
            _ => TilesetCategory::default(),
        };
        brush.slot = match &self.slot {
            Some(Value::String(key)) => TilesetSlot::from_key(key).unwrap_or_default(),
            _ => TilesetSlot::default(),
        };
        brush.painting_mode = match &self.painting_mode {
            Some(Value::String(key)) => BrushMode::from_key(key),
            _ => BrushMode::default(),
        };
        brush.set_priority(self.priority);

        for (key, value) in &self.terrain {
            let Some(label) = TerrainLabel::from_key(key) else {
                debug!(key = %key, "ignoring unknown terrain key");
                continue;
            };
            if let Some(value) = value {
                brush.set_terrain_tile(label, validate_tile_id(key, *value)?);
            }
        }

        let switched_off: BTreeSet<SlopeLabel> = self
            .disabled_slopes
            .iter()
            .filter_map(|key| SlopeLabel::from_key(key))
            .collect();
        // Only slopes the document names can be enabled
        brush.disabled_slopes = [true; 12];
        for (key, value) in &self.slopes {
            let Some(label) = SlopeLabel::from_key(key) else {
                debug!(key = %key, "ignoring unknown slope key");
                continue;
            };
            match value {
                Some(DISABLED_SLOPE) => continue,
                Some(value) => brush.set_slope_tile(label, validate_tile_id(key, *value)?),
                None => {}
            }
            brush.set_slope_enabled(label, !switched_off.contains(&label));
        }

        Ok(brush)
    }
}

impl From<&Brush> for BrushDocument {
    fn from(brush: &Brush) -> Self {
        let terrain = TerrainLabel::ALL
            .iter()
            .map(|label| (label.key().to_string(), brush.terrain_tile(*label).map(i64::from)))
            .collect();
        let mut disabled_slopes = Vec::new();
        let slopes = SlopeLabel::ALL
            .iter()
            .map(|label| {
                let tile = brush.slope_tile(*label).map(i64::from);
                let value = match (brush.disabled_slopes[label.index()], tile) {
                    (false, tile) => tile,
                    (true, None) => Some(DISABLED_SLOPE),
                    (true, Some(tile)) => {
                        disabled_slopes.push(label.key());
                        Some(tile)
                    }
                };
                (label.key(), value)
            })
            .collect();

        Self {
            name: brush.name.clone(),
            tileset_names: brush.tileset_names.clone(),
            category: Some(serde_json::json!(brush.category)),
            slot: Some(serde_json::json!(brush.slot)),
            painting_mode: Some(serde_json::json!(brush.painting_mode)),
            priority: i64::from(brush.priority),
            terrain,
            slopes,
            disabled_slopes,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{SlopeCategory, SlopeSide};

    fn slope(size: SlopeSize, side: SlopeSide) -> SlopeLabel {
        SlopeLabel::new(SlopeCategory::Top, size, side)
    }

    #[test]
    fn tile_zero_counts_as_assigned() {
        let mut brush = Brush::new("Grass", vec![]);
        assert!(!brush.is_terrain_assigned(TerrainLabel::Center));
        brush.set_terrain_tile(TerrainLabel::Center, 0);
        assert!(brush.is_terrain_assigned(TerrainLabel::Center));
        assert_eq!(brush.terrain_tile(TerrainLabel::Center), Some(0));
    }

    #[test]
    fn category_restricts_slope_sizes() {
        let mut brush = Brush::new("Grass", vec![]);
        brush.category = TilesetCategory::Cat2;
        assert!(!brush.is_slope_enabled(slope(SlopeSize::OneByOne, SlopeSide::Left)));
        assert!(brush.is_slope_enabled(slope(SlopeSize::FourByOne, SlopeSide::Left)));

        brush.category = TilesetCategory::Cat1;
        assert!(SlopeLabel::ALL.iter().all(|label| !brush.is_slope_enabled(*label)));

        brush.category = TilesetCategory::Cat3;
        brush.set_slope_enabled(slope(SlopeSize::TwoByOne, SlopeSide::Right), false);
        assert!(!brush.is_slope_enabled(slope(SlopeSize::TwoByOne, SlopeSide::Right)));
        assert!(brush.is_slope_enabled(slope(SlopeSize::TwoByOne, SlopeSide::Left)));
    }

    #[test]
    fn reverse_lookup_prefers_terrain() {
        let mut brush = Brush::new("Grass", vec![]);
        brush.set_terrain_tile(TerrainLabel::Top, 5);
        brush.set_slope_tile(slope(SlopeSize::OneByOne, SlopeSide::Left), 5);
        brush.set_slope_tile(slope(SlopeSize::TwoByOne, SlopeSide::Left), 9);

        assert_eq!(brush.label_for_tile(5), Some(TileLabel::Terrain(TerrainLabel::Top)));
        assert_eq!(
            brush.label_for_tile(9),
            Some(TileLabel::Slope(slope(SlopeSize::TwoByOne, SlopeSide::Left)))
        );
        assert_eq!(brush.label_for_tile(42), None);
    }

    #[test]
    fn tileset_patterns_match_from_start() {
        let patterns = vec!["Pa1_grass.*".to_string(), "[broken".to_string()];
        let brush = Brush::new("Grass", patterns);
        assert!(brush.matches_tileset("Pa1_grassland"));
        assert!(!brush.matches_tileset("xPa1_grass"), "patterns are anchored");
        assert!(brush.matches_tileset("[broken"), "invalid regex falls back to equality");
        assert!(!brush.matches_tileset("Pa2_snow"));
        assert!(!Brush::new("Empty", vec![]).matches_tileset("Pa1_grass"));
    }

    #[test]
    fn json_round_trip_preserves_mappings() {
        let mut brush = Brush::new("Cave", vec!["Pa2_cave".to_string()]);
        brush.category = TilesetCategory::Cat2;
        brush.slot = TilesetSlot::Pa2;
        brush.painting_mode = BrushMode::SingleTile;
        brush.set_priority(4);
        brush.set_terrain_tile(TerrainLabel::Center, 0);
        brush.set_terrain_tile(TerrainLabel::InnerBottomRight, 17);
        brush.set_slope_tile(slope(SlopeSize::FourByOne, SlopeSide::Left), 40);
        brush.set_slope_enabled(slope(SlopeSize::FourByOne, SlopeSide::Right), false);

        let json = brush.to_json_string();
        let loaded = Brush::from_json_str(&json).unwrap();
        assert_eq!(loaded, brush);
    }

    #[test]
    fn json_slope_flags_are_decoded() {
        let json = r#"{
            "name": "Grass",
            "tileset_names": ["Pa1_grass"],
            "category": "cat3",
            "terrain": { "top": 5, "bottom": null, "sideways": 3 },
            "slopes": {
                "slope_top_1x1_left": 20,
                "slope_top_1x1_right": null,
                "slope_top_2x1_left": -1
            }
        }"#;
        let brush = Brush::from_json_str(json).unwrap();
        assert_eq!(brush.terrain_tile(TerrainLabel::Top), Some(5));
        assert!(!brush.is_terrain_assigned(TerrainLabel::Bottom));
        assert_eq!(brush.slope_tile(slope(SlopeSize::OneByOne, SlopeSide::Left)), Some(20));
        assert!(brush.is_slope_enabled(slope(SlopeSize::OneByOne, SlopeSide::Right)));
        assert_eq!(brush.slope_tile(slope(SlopeSize::OneByOne, SlopeSide::Right)), None);
        assert!(!brush.is_slope_enabled(slope(SlopeSize::TwoByOne, SlopeSide::Left)));
    }

    #[test]
    fn slopes_missing_from_the_document_are_disabled() {
        let json = r#"{ "name": "Flat", "slopes": { "slope_top_4x1_left": null } }"#;
        let brush = Brush::from_json_str(json).unwrap();
        assert!(brush.is_slope_enabled(slope(SlopeSize::FourByOne, SlopeSide::Left)));
        let enabled = SlopeLabel::ALL.iter().filter(|label| brush.is_slope_enabled(**label));
        assert_eq!(enabled.count(), 1);

        let brush = Brush::from_json_str(r#"{ "name": "Bare" }"#).unwrap();
        assert!(SlopeLabel::ALL.iter().all(|label| !brush.is_slope_enabled(*label)));
    }

    #[test]
    fn disabled_slope_keeps_its_tile_through_json() {
        let label = SlopeLabel::ALL[0];
        let mut brush = Brush::new("Cave", vec![]);
        brush.set_slope_tile(label, 42);
        brush.set_slope_enabled(label, false);

        let value = brush.to_json_value();
        assert_eq!(value["slopes"][label.key()], 42);
        assert_eq!(value["disabled_slopes"][0], label.key());

        let loaded = Brush::from_json_value(value).unwrap();
        assert_eq!(loaded, brush);
        assert_eq!(loaded.slope_tile(label), Some(42));
        assert!(!loaded.is_slope_enabled(label));
    }

    #[test]
    fn painting_mode_is_read_and_written() {
        let json = r#"{ "name": "Stamp", "painting_mode": "ShapeCreator" }"#;
        let brush = Brush::from_json_str(json).unwrap();
        assert_eq!(brush.painting_mode, BrushMode::ShapeCreator);
        assert_eq!(brush.to_json_value()["painting_mode"], "ShapeCreator");

        let json = r#"{ "name": "Odd", "painting_mode": "Spray" }"#;
        let brush = Brush::from_json_str(json).unwrap();
        assert_eq!(brush.painting_mode, BrushMode::SmartPaint);
    }

    #[test]
    fn unknown_or_missing_category_defaults_to_cat3() {
        let brush = Brush::from_json_str(r#"{ "name": "A", "category": "cat9" }"#).unwrap();
        assert_eq!(brush.category, TilesetCategory::Cat3);
        let brush = Brush::from_json_str(r#"{ "name": "B" }"#).unwrap();
        assert_eq!(brush.category, TilesetCategory::Cat3);
        let brush = Brush::from_json_str(r#"{ "name": "C", "category": 2 }"#).unwrap();
        assert_eq!(brush.category, TilesetCategory::Cat3);
    }

    #[test]
    fn legacy_slope_keys_are_accepted() {
        let json = r#"{ "name": "Old", "slopes": { "floor_down_4x1": 33 } }"#;
        let brush = Brush::from_json_str(json).unwrap();
        assert_eq!(brush.slope_tile(slope(SlopeSize::FourByOne, SlopeSide::Right)), Some(33));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(
            Brush::from_json_str(r#"{ "tileset_names": [] }"#),
            Err(BrushError::ParseError(_))
        ));
        assert!(matches!(
            Brush::from_json_str(r#"{ "name": "A", "terrain": { "top": 300 } }"#),
            Err(BrushError::InvalidTileId { value: 300, .. })
        ));
    }

    #[test]
    fn priority_is_clamped() {
        let brush = Brush::from_json_str(r#"{ "name": "A", "priority": 42 }"#).unwrap();
        assert_eq!(brush.priority(), 9);
        let mut brush = Brush::new("B", vec![]);
        brush.set_priority(-3);
        assert_eq!(brush.priority(), 0);
    }
}
