use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::common::collections::HashSet;
use crate::layout_engine::{
    BuiltinPreset, MinimumSize, PresetLibrary, PresetResolver, ScreenBindings, ZoneLayoutPreset,
};
use crate::sys::event::ModifierFlags;

pub fn config_file() -> PathBuf { dirs::home_dir().unwrap_or_default().join(".zonesnap.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub settings: Settings,
    #[serde(default)]
    pub screens: Vec<ScreenBindings>,
    #[serde(default)]
    pub custom_presets: Vec<ZoneLayoutPreset>,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_snap_modifier")]
    pub snap_modifier: ModifierFlags,
    #[serde(default)]
    pub gap: f64,
    #[serde(default = "default_preset")]
    pub default_preset: String,
    #[serde(default)]
    pub portrait_preset: Option<String>,
    #[serde(default)]
    pub boundary: BoundarySettings,
    #[serde(default)]
    pub registry: RegistrySettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct BoundarySettings {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,
    #[serde(default = "default_min_width")]
    pub min_width: f64,
    #[serde(default = "default_min_height")]
    pub min_height: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct RegistrySettings {
    /// Distance a snapped window may drift before it is forgotten.
    #[serde(default = "default_unsnap_threshold")]
    pub unsnap_threshold: f64,
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            hit_tolerance: default_hit_tolerance(),
            min_width: default_min_width(),
            min_height: default_min_height(),
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            unsnap_threshold: default_unsnap_threshold(),
        }
    }
}

fn yes() -> bool { true }

fn default_snap_modifier() -> ModifierFlags { ModifierFlags::SHIFT }

fn default_preset() -> String { BuiltinPreset::HalfLeftRight.id().to_string() }

fn default_hit_tolerance() -> f64 { 4.0 }

fn default_min_width() -> f64 { 200.0 }

fn default_min_height() -> f64 { 100.0 }

fn default_unsnap_threshold() -> f64 { 50.0 }

impl BoundarySettings {
    pub fn min_size(&self) -> MinimumSize {
        MinimumSize {
            width: self.min_width,
            height: self.min_height,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(self.hit_tolerance >= 0.0) {
            issues.push(format!(
                "boundary.hit_tolerance must be non-negative, got {}",
                self.hit_tolerance
            ));
        }
        if !(self.min_width > 0.0) {
            issues.push(format!("boundary.min_width must be positive, got {}", self.min_width));
        }
        if !(self.min_height > 0.0) {
            issues.push(format!("boundary.min_height must be positive, got {}", self.min_height));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if !(self.hit_tolerance >= 0.0) {
            self.hit_tolerance = default_hit_tolerance();
            fixes += 1;
        }
        if !(self.min_width > 0.0) {
            self.min_width = default_min_width();
            fixes += 1;
        }
        if !(self.min_height > 0.0) {
            self.min_height = default_min_height();
            fixes += 1;
        }

        fixes
    }
}

impl RegistrySettings {
    pub fn validate(&self) -> Vec<String> {
        if self.unsnap_threshold > 0.0 {
            return Vec::new();
        }
        vec![format!(
            "registry.unsnap_threshold must be positive, got {}",
            self.unsnap_threshold
        )]
    }

    pub fn auto_fix_values(&mut self) -> usize {
        if self.unsnap_threshold > 0.0 {
            return 0;
        }
        self.unsnap_threshold = default_unsnap_threshold();
        1
    }
}

impl Settings {
    pub fn validate(&self, library: &PresetLibrary) -> Vec<String> {
        let mut issues = Vec::new();

        if self.snap_modifier.is_empty() {
            issues.push("snap_modifier must name at least one modifier".to_string());
        }
        if !(self.gap >= 0.0) || !self.gap.is_finite() {
            issues.push(format!("gap must be a non-negative number, got {}", self.gap));
        }
        if library.get(&self.default_preset).is_none() {
            issues.push(format!("default_preset '{}' does not exist", self.default_preset));
        }
        if let Some(id) = &self.portrait_preset {
            if library.get(id).is_none() {
                issues.push(format!("portrait_preset '{id}' does not exist"));
            }
        }

        issues.extend(self.boundary.validate());
        issues.extend(self.registry.validate());

        issues
    }

    pub fn auto_fix_values(&mut self, library: &PresetLibrary) -> usize {
        let mut fixes = 0;

        if self.snap_modifier.is_empty() {
            self.snap_modifier = default_snap_modifier();
            fixes += 1;
        }
        if !(self.gap >= 0.0) || !self.gap.is_finite() {
            self.gap = 0.0;
            fixes += 1;
        }
        if library.get(&self.default_preset).is_none() {
            self.default_preset = default_preset();
            fixes += 1;
        }
        if self.portrait_preset.as_deref().is_some_and(|id| library.get(id).is_none()) {
            self.portrait_preset = None;
            fixes += 1;
        }

        fixes += self.boundary.auto_fix_values();
        fixes += self.registry.auto_fix_values();

        fixes
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// The user's config if it exists, the built-in defaults otherwise.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() { Self::read(path) } else { Ok(Self::default()) }
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../zonesnap.default.toml"))
            .expect("embedded default config must parse")
    }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    pub fn preset_library(&self) -> PresetLibrary { PresetLibrary::new(self.custom_presets.clone()) }

    pub fn resolver<'a>(&'a self, library: &'a PresetLibrary) -> PresetResolver<'a> {
        PresetResolver {
            library,
            screens: &self.screens,
            snap_modifier: self.settings.snap_modifier,
            default_preset: &self.settings.default_preset,
            portrait_preset: self.settings.portrait_preset.as_deref(),
        }
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let library = self.preset_library();
        let mut issues = self.settings.validate(&library);

        let mut seen = HashSet::default();
        for preset in &self.custom_presets {
            if !seen.insert(preset.id.as_str()) {
                issues.push(format!("custom preset id '{}' is used more than once", preset.id));
            }
            issues.extend(preset.validate());
        }

        let snap = self.settings.snap_modifier;
        for screen in &self.screens {
            let slots = std::iter::once((snap, &screen.preset, &screen.custom_preset)).chain(
                screen.bindings.iter().map(|b| (b.modifiers, &b.preset, &b.custom_preset)),
            );
            for (modifiers, preset, custom) in slots {
                if let Some(id) = preset {
                    if library.builtin(id).is_none() {
                        issues.push(format!(
                            "screen '{}' binds unknown preset '{id}' to {modifiers}",
                            screen.id
                        ));
                    }
                }
                if let Some(id) = custom {
                    if library.custom(id).is_none() {
                        issues.push(format!(
                            "screen '{}' binds unknown custom preset '{id}' to {modifiers}",
                            screen.id
                        ));
                    }
                }
            }
            for binding in &screen.bindings {
                if !binding.modifiers.contains(snap) {
                    issues.push(format!(
                        "screen '{}' binding for {} never applies without the snap modifier {}",
                        screen.id,
                        binding.modifiers.to_config_string(),
                        snap.to_config_string()
                    ));
                }
            }
        }

        issues
    }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let library = self.preset_library();
        self.settings.auto_fix_values(&library)
    }

    fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }
}
