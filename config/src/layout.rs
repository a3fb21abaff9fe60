use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumString,
};

/// Storage key under which the durable layout preferences are kept.
pub const PREFERENCES_KEY: &str = "meetsolis_layout_preferences";

pub const MIN_TILES_VISIBLE: u32 = 1;
pub const MAX_TILES_VISIBLE: u32 = 25;
pub const DEFAULT_TILES_VISIBLE: u32 = MAX_TILES_VISIBLE;

/// Tile caps below this value are considered a corrupted state when a meeting is joined.
pub const USABLE_TILES_FLOOR: u32 = 9;

#[derive(Debug, Default, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LayoutMode {
    /// Picks tiled or spotlight depending on the roster.
    #[default]
    Auto,
    Tiled,
    Spotlight,
    Sidebar,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PreferencesError {
    #[error("max tiles visible must be within [1, 25], got {0}")]
    TilesOutOfRange(u32),
}

/// The durable subset of [`LayoutConfig`] that survives across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutPreferences {
    pub preferred_mode: LayoutMode,
    pub max_tiles_visible: u32,
    pub hide_no_video: bool,
}

impl Default for LayoutPreferences {
    fn default() -> Self {
        Self {
            preferred_mode: LayoutMode::Auto,
            max_tiles_visible: DEFAULT_TILES_VISIBLE,
            hide_no_video: false,
        }
    }
}

impl LayoutPreferences {
    pub fn validate(&self) -> Result<(), PreferencesError> {
        if !(MIN_TILES_VISIBLE..=MAX_TILES_VISIBLE).contains(&self.max_tiles_visible) {
            return Err(PreferencesError::TilesOutOfRange(self.max_tiles_visible));
        }
        Ok(())
    }
}

/// Live layout configuration of a single meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    pub max_tiles_visible: u32,
    pub hide_no_video: bool,
    /// Only consulted in [`LayoutMode::Spotlight`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotlight_participant_id: Option<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::from_preferences(&LayoutPreferences::default(), USABLE_TILES_FLOOR).0
    }
}

impl LayoutConfig {
    /// Derives the meeting config from stored preferences. A tile cap below `usable_floor` (or above the
    /// maximum) resets to the default; the returned flag tells the caller that a correction happened.
    pub fn from_preferences(prefs: &LayoutPreferences, usable_floor: u32) -> (Self, bool) {
        let usable_floor = usable_floor.clamp(MIN_TILES_VISIBLE, MAX_TILES_VISIBLE);
        let corrected = !(usable_floor..=MAX_TILES_VISIBLE).contains(&prefs.max_tiles_visible);
        let max_tiles_visible = if corrected {
            DEFAULT_TILES_VISIBLE
        } else {
            prefs.max_tiles_visible
        };

        let config = Self {
            mode: prefs.preferred_mode,
            max_tiles_visible,
            hide_no_video: prefs.hide_no_video,
            spotlight_participant_id: None,
        };
        (config, corrected)
    }

    pub fn preferences(&self) -> LayoutPreferences {
        LayoutPreferences {
            preferred_mode: self.mode,
            max_tiles_visible: self.max_tiles_visible.clamp(MIN_TILES_VISIBLE, MAX_TILES_VISIBLE),
            hide_no_video: self.hide_no_video,
        }
    }

    /// The tile cap forced into `[1, 25]` and whether clamping was necessary.
    pub fn clamped_max_tiles(&self) -> (u32, bool) {
        let clamped = self.max_tiles_visible.clamp(MIN_TILES_VISIBLE, MAX_TILES_VISIBLE);
        (clamped, clamped != self.max_tiles_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr as _;

    #[test]
    fn preferences_use_camel_case_keys() {
        let json = serde_json::to_string(&LayoutPreferences::default()).unwrap();
        assert_eq!(json, r#"{"preferredMode":"auto","maxTilesVisible":25,"hideNoVideo":false}"#);
    }

    #[test]
    fn missing_preference_fields_take_defaults() {
        let prefs: LayoutPreferences = serde_json::from_str(r#"{"preferredMode":"sidebar"}"#).unwrap();
        assert_eq!(
            prefs,
            LayoutPreferences {
                preferred_mode: LayoutMode::Sidebar,
                ..Default::default()
            }
        );
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(serde_json::from_str::<LayoutPreferences>(r#"{"preferredMode":"gallery"}"#).is_err());
        assert!(LayoutMode::from_str("gallery").is_err());
        assert_eq!(LayoutMode::from_str("spotlight").unwrap(), LayoutMode::Spotlight);
    }

    #[test]
    fn validate_tile_bounds() {
        let mut prefs = LayoutPreferences::default();
        assert_eq!(prefs.validate(), Ok(()));
        prefs.max_tiles_visible = 0;
        assert_eq!(prefs.validate(), Err(PreferencesError::TilesOutOfRange(0)));
        prefs.max_tiles_visible = 26;
        assert_eq!(prefs.validate(), Err(PreferencesError::TilesOutOfRange(26)));
        prefs.max_tiles_visible = 1;
        assert_eq!(prefs.validate(), Ok(()));
    }

    #[test]
    fn join_resets_tile_cap_below_usable_floor() {
        let prefs = LayoutPreferences {
            preferred_mode: LayoutMode::Tiled,
            max_tiles_visible: 4,
            hide_no_video: true,
        };
        let (config, corrected) = LayoutConfig::from_preferences(&prefs, USABLE_TILES_FLOOR);
        assert!(corrected);
        assert_eq!(config.max_tiles_visible, DEFAULT_TILES_VISIBLE);
        assert_eq!(config.mode, LayoutMode::Tiled);
        assert!(config.hide_no_video);

        let (config, corrected) = LayoutConfig::from_preferences(&prefs, 1);
        assert!(!corrected);
        assert_eq!(config.max_tiles_visible, 4);
    }

    #[test]
    fn clamp_reports_correction() {
        let mut config = LayoutConfig::default();
        assert_eq!(config.clamped_max_tiles(), (25, false));
        config.max_tiles_visible = 0;
        assert_eq!(config.clamped_max_tiles(), (1, true));
        config.max_tiles_visible = 999;
        assert_eq!(config.clamped_max_tiles(), (25, true));
        assert_eq!(config.preferences().max_tiles_visible, 25);
    }
}
