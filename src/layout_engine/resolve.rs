use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::trace;

use super::preset::{BuiltinPreset, PresetLibrary, ZoneLayoutPreset};
use crate::sys::event::ModifierFlags;
use crate::sys::screen::{ScreenId, ScreenInfo};

/// A secondary modifier combination bound to a preset.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModifierBinding {
    pub modifiers: ModifierFlags,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub custom_preset: Option<String>,
}

/// Per-screen preset selection. `preset`/`custom_preset` form the primary
/// slot used when only the snap modifier is held.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenBindings {
    pub id: ScreenId,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub custom_preset: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<ModifierBinding>,
}

impl ScreenBindings {
    pub fn new(id: impl Into<String>) -> Self {
        ScreenBindings {
            id: ScreenId::new(id),
            preset: None,
            custom_preset: None,
            bindings: Vec::new(),
        }
    }

    /// `(custom, built-in)` ids bound to exactly `modifiers`.
    fn slot(&self, modifiers: ModifierFlags, snap_modifier: ModifierFlags) -> (Option<&str>, Option<&str>) {
        if modifiers == snap_modifier {
            return (self.custom_preset.as_deref(), self.preset.as_deref());
        }
        self.bindings
            .iter()
            .find(|b| b.modifiers == modifiers)
            .map(|b| (b.custom_preset.as_deref(), b.preset.as_deref()))
            .unwrap_or((None, None))
    }
}

/// Picks the preset for a screen and modifier combination.
///
/// Order: custom preset bound to the exact combination, then the built-in
/// bound to it, then the portrait default on portrait screens, then the
/// default. Ids that don't resolve are skipped.
pub struct PresetResolver<'a> {
    pub library: &'a PresetLibrary,
    pub screens: &'a [ScreenBindings],
    pub snap_modifier: ModifierFlags,
    pub default_preset: &'a str,
    pub portrait_preset: Option<&'a str>,
}

impl PresetResolver<'_> {
    pub fn resolve(&self, screen: &ScreenInfo, modifiers: ModifierFlags) -> ZoneLayoutPreset {
        let (custom, builtin) = self
            .screens
            .iter()
            .find(|s| s.id == screen.id)
            .map(|s| s.slot(modifiers, self.snap_modifier))
            .unwrap_or((None, None));

        if let Some(preset) = custom.and_then(|id| self.library.custom(id)) {
            trace!(screen = %screen.id, %modifiers, preset = %preset.id, "bound custom preset");
            return preset.clone();
        }
        if let Some(preset) = builtin.and_then(|id| self.library.builtin(id)) {
            trace!(screen = %screen.id, %modifiers, preset = %preset.id, "bound preset");
            return preset;
        }
        if screen.frame.is_portrait() {
            if let Some(preset) = self.portrait_preset.and_then(|id| self.library.get(id)) {
                return preset;
            }
        }
        self.library
            .get(self.default_preset)
            .unwrap_or_else(|| BuiltinPreset::HalfLeftRight.preset())
    }
}
