use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::zone::ZoneDefinition;

/// A named, ordered set of fractional zones.
///
/// Presets are immutable; editing one means building a replacement with the
/// same or a new id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneLayoutPreset {
    pub id: String,
    pub name: String,
    pub zones: Vec<ZoneDefinition>,
}

impl ZoneLayoutPreset {
    pub fn new(id: impl Into<String>, name: impl Into<String>, zones: Vec<ZoneDefinition>) -> Self {
        ZoneLayoutPreset {
            id: id.into(),
            name: name.into(),
            zones,
        }
    }

    pub fn with_zones(&self, zones: Vec<ZoneDefinition>) -> Self {
        ZoneLayoutPreset {
            id: self.id.clone(),
            name: self.name.clone(),
            zones,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.id.trim().is_empty() {
            issues.push(format!("preset '{}' has an empty id", self.name));
        }
        if self.zones.is_empty() {
            issues.push(format!("preset '{}' has no zones", self.id));
        }
        for (index, zone) in self.zones.iter().enumerate() {
            if !zone.is_within_unit_square() {
                issues.push(format!(
                    "preset '{}' zone {} is outside the unit square: {:?}",
                    self.id, index, zone
                ));
            }
        }
        issues
    }

    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string_pretty(self) }

    pub fn from_json(json: &str) -> serde_json::Result<Self> { serde_json::from_str(json) }
}

const THIRD: f64 = 1.0 / 3.0;
const TWO_THIRDS: f64 = 2.0 / 3.0;

/// Presets shipped with the application, addressed by their camelCase id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum BuiltinPreset {
    HalfLeftRight,
    HalfTopBottom,
    Thirds,
    TwoThirdsLeft,
    TwoThirdsRight,
    ThirdsVertical,
    Grid2x2,
    Grid3x2,
}

impl BuiltinPreset {
    pub fn id(&self) -> &'static str { self.into() }

    pub fn from_id(id: &str) -> Option<BuiltinPreset> { id.parse().ok() }

    pub fn all() -> impl Iterator<Item = BuiltinPreset> { Self::iter() }

    pub fn display_name(&self) -> &'static str {
        match self {
            BuiltinPreset::HalfLeftRight => "Halves (left/right)",
            BuiltinPreset::HalfTopBottom => "Halves (top/bottom)",
            BuiltinPreset::Thirds => "Thirds",
            BuiltinPreset::TwoThirdsLeft => "Two thirds + one third",
            BuiltinPreset::TwoThirdsRight => "One third + two thirds",
            BuiltinPreset::ThirdsVertical => "Thirds (stacked)",
            BuiltinPreset::Grid2x2 => "Grid 2×2",
            BuiltinPreset::Grid3x2 => "Grid 3×2",
        }
    }

    pub fn zones(&self) -> Vec<ZoneDefinition> {
        use ZoneDefinition as Z;
        match self {
            BuiltinPreset::HalfLeftRight => vec![Z::new(0.0, 0.0, 0.5, 1.0), Z::new(0.5, 0.0, 0.5, 1.0)],
            // Listed top first; y counts from the bottom.
            BuiltinPreset::HalfTopBottom => vec![Z::new(0.0, 0.5, 1.0, 0.5), Z::new(0.0, 0.0, 1.0, 0.5)],
            BuiltinPreset::Thirds => vec![
                Z::new(0.0, 0.0, THIRD, 1.0),
                Z::new(THIRD, 0.0, THIRD, 1.0),
                Z::new(TWO_THIRDS, 0.0, THIRD, 1.0),
            ],
            BuiltinPreset::TwoThirdsLeft => {
                vec![Z::new(0.0, 0.0, TWO_THIRDS, 1.0), Z::new(TWO_THIRDS, 0.0, THIRD, 1.0)]
            }
            BuiltinPreset::TwoThirdsRight => {
                vec![Z::new(0.0, 0.0, THIRD, 1.0), Z::new(THIRD, 0.0, TWO_THIRDS, 1.0)]
            }
            BuiltinPreset::ThirdsVertical => vec![
                Z::new(0.0, TWO_THIRDS, 1.0, THIRD),
                Z::new(0.0, THIRD, 1.0, THIRD),
                Z::new(0.0, 0.0, 1.0, THIRD),
            ],
            BuiltinPreset::Grid2x2 => vec![
                Z::new(0.0, 0.0, 0.5, 0.5),
                Z::new(0.5, 0.0, 0.5, 0.5),
                Z::new(0.0, 0.5, 0.5, 0.5),
                Z::new(0.5, 0.5, 0.5, 0.5),
            ],
            BuiltinPreset::Grid3x2 => {
                let mut zones = Vec::with_capacity(6);
                for y in [0.0, 0.5] {
                    for x in [0.0, THIRD, TWO_THIRDS] {
                        zones.push(Z::new(x, y, THIRD, 0.5));
                    }
                }
                zones
            }
        }
    }

    pub fn preset(&self) -> ZoneLayoutPreset {
        ZoneLayoutPreset::new(self.id(), self.display_name(), self.zones())
    }
}

/// Built-in presets plus the user's custom presets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetLibrary {
    custom: Vec<ZoneLayoutPreset>,
}

impl PresetLibrary {
    pub fn new(custom: Vec<ZoneLayoutPreset>) -> Self { PresetLibrary { custom } }

    pub fn builtin(&self, id: &str) -> Option<ZoneLayoutPreset> {
        BuiltinPreset::from_id(id).map(|p| p.preset())
    }

    pub fn custom(&self, id: &str) -> Option<&ZoneLayoutPreset> {
        self.custom.iter().find(|p| p.id == id)
    }

    /// Custom presets shadow built-ins with the same id.
    pub fn get(&self, id: &str) -> Option<ZoneLayoutPreset> {
        self.custom(id).cloned().or_else(|| self.builtin(id))
    }

    pub fn custom_presets(&self) -> &[ZoneLayoutPreset] { &self.custom }

    /// Replaces a custom preset wholesale, or appends it when the id is new.
    pub fn upsert(&mut self, preset: ZoneLayoutPreset) {
        match self.custom.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) => *existing = preset,
            None => self.custom.push(preset),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<ZoneLayoutPreset> {
        let index = self.custom.iter().position(|p| p.id == id)?;
        Some(self.custom.remove(index))
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.custom)
    }

    pub fn import_json(&mut self, json: &str) -> serde_json::Result<usize> {
        let presets: Vec<ZoneLayoutPreset> = serde_json::from_str(json)?;
        let count = presets.len();
        for preset in presets {
            self.upsert(preset);
        }
        Ok(count)
    }
}
