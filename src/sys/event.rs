use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Modifier keys held during a drag.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u8 {
        const SHIFT = 0b0001;
        const CONTROL = 0b0010;
        const OPTION = 0b0100;
        const COMMAND = 0b1000;
    }
}

/// Canonical order used by both the display string and the config encoding.
const CANONICAL: [(ModifierFlags, &str, &str); 4] = [
    (ModifierFlags::CONTROL, "⌃", "control"),
    (ModifierFlags::OPTION, "⌥", "option"),
    (ModifierFlags::COMMAND, "⌘", "command"),
    (ModifierFlags::SHIFT, "⇧", "shift"),
];

impl ModifierFlags {
    /// Names joined with `" + "`, e.g. `"control + shift"`. Empty flags encode
    /// as `"none"`.
    pub fn to_config_string(&self) -> String {
        let parts: Vec<&str> = CANONICAL
            .iter()
            .filter(|(flag, ..)| self.contains(*flag))
            .map(|(_, _, name)| *name)
            .collect();
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" + ")
        }
    }

    fn from_word(word: &str) -> Option<ModifierFlags> {
        match word.to_ascii_lowercase().as_str() {
            "shift" => Some(ModifierFlags::SHIFT),
            "ctrl" | "control" => Some(ModifierFlags::CONTROL),
            "alt" | "opt" | "option" => Some(ModifierFlags::OPTION),
            "cmd" | "command" | "meta" => Some(ModifierFlags::COMMAND),
            _ => None,
        }
    }

    fn from_symbol(ch: char) -> Option<ModifierFlags> {
        match ch {
            '⌃' => Some(ModifierFlags::CONTROL),
            '⌥' => Some(ModifierFlags::OPTION),
            '⌘' => Some(ModifierFlags::COMMAND),
            '⇧' => Some(ModifierFlags::SHIFT),
            _ => None,
        }
    }
}

impl fmt::Display for ModifierFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, symbol, _) in CANONICAL {
            if self.contains(flag) {
                f.write_str(symbol)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized modifier `{0}`")]
pub struct ParseModifierError(String);

impl FromStr for ModifierFlags {
    type Err = ParseModifierError;

    /// Accepts the symbol form (`"⌃⇧"`), the config form (`"control + shift"`)
    /// and `"none"`/`""`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(ModifierFlags::empty());
        }

        if trimmed.chars().all(|ch| Self::from_symbol(ch).is_some()) {
            return Ok(trimmed
                .chars()
                .filter_map(Self::from_symbol)
                .fold(ModifierFlags::empty(), |acc, flag| acc | flag));
        }

        let mut flags = ModifierFlags::empty();
        for word in trimmed.split('+').map(str::trim) {
            match Self::from_word(word) {
                Some(flag) => flags |= flag,
                None => return Err(ParseModifierError(word.to_string())),
            }
        }
        Ok(flags)
    }
}

impl Serialize for ModifierFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        serializer.serialize_str(&self.to_config_string())
    }
}

impl<'de> Deserialize<'de> for ModifierFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Cursor shapes requested from the overlay while boundary mode is enabled.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CursorShape {
    #[default]
    Arrow,
    ResizeLeftRight,
    ResizeUpDown,
}
