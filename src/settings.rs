//! Cabinet settings and preferences
//!
//! Persisted in LocalStorage, separate from the high score tables.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Game speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    Relaxed,
    #[default]
    Arcade,
    Turbo,
}

impl SpeedPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Relaxed => "Relaxed",
            SpeedPreset::Arcade => "Arcade",
            SpeedPreset::Turbo => "Turbo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "relaxed" | "slow" => Some(SpeedPreset::Relaxed),
            "arcade" | "normal" => Some(SpeedPreset::Arcade),
            "turbo" | "fast" => Some(SpeedPreset::Turbo),
            _ => None,
        }
    }

    /// Cycle order used by the speed shortcut
    pub fn next(&self) -> Self {
        match self {
            SpeedPreset::Relaxed => SpeedPreset::Arcade,
            SpeedPreset::Arcade => SpeedPreset::Turbo,
            SpeedPreset::Turbo => SpeedPreset::Relaxed,
        }
    }

    /// Multiplier applied to every game's tick interval
    pub fn tick_scale(&self) -> f64 {
        match self {
            SpeedPreset::Relaxed => 1.5,
            SpeedPreset::Arcade => 1.0,
            SpeedPreset::Turbo => 0.75,
        }
    }
}

/// Cabinet preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tick speed preset
    pub speed: SpeedPreset,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    /// Pause the running game when the tab is hidden or loses focus
    pub pause_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: SpeedPreset::Arcade,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,
            pause_on_blur: true,
        }
    }
}

impl Settings {
    /// Gain applied to sound effects (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "retro_arcade_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_preset_names() {
        for preset in [SpeedPreset::Relaxed, SpeedPreset::Arcade, SpeedPreset::Turbo] {
            assert_eq!(SpeedPreset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(SpeedPreset::from_str(" FAST "), Some(SpeedPreset::Turbo));
        assert_eq!(SpeedPreset::from_str("ludicrous"), None);
    }

    #[test]
    fn test_tick_scale_ordering() {
        assert!(SpeedPreset::Relaxed.tick_scale() > SpeedPreset::Arcade.tick_scale());
        assert!(SpeedPreset::Turbo.tick_scale() < SpeedPreset::Arcade.tick_scale());
        assert_eq!(SpeedPreset::default().tick_scale(), 1.0);
    }

    #[test]
    fn test_speed_cycle_visits_every_preset() {
        let mut preset = SpeedPreset::Arcade;
        let mut seen = Vec::new();
        for _ in 0..3 {
            preset = preset.next();
            seen.push(preset);
        }
        assert_eq!(
            seen,
            vec![SpeedPreset::Turbo, SpeedPreset::Relaxed, SpeedPreset::Arcade]
        );
    }

    #[test]
    fn test_effective_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_volume() - 0.8).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_json_fills_missing_fields() {
        let settings = Settings::from_json(r#"{"speed":"Turbo"}"#).unwrap();
        assert_eq!(settings.speed, SpeedPreset::Turbo);
        assert!(settings.pause_on_blur);

        let restored = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(restored, settings);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = Settings::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::error::ArcadeError::Config(_)));
    }
}
