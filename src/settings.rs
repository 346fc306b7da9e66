//! Player preferences
//!
//! Persisted in LocalStorage on the web. Only the mute toggle and the two
//! volume levels survive a reload; scores are never stored here.

use serde::{Deserialize, Serialize};

/// Audio preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Silences both music and effects
    pub muted: bool,
    /// Background loop level, 0..=1
    pub music_volume: f32,
    /// One-shot effect level, 0..=1
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            music_volume: 0.6,
            sfx_volume: 0.8,
        }
    }
}

impl Settings {
    /// Music volume after applying mute
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_volume.clamp(0.0, 1.0)
        }
    }

    /// Effect volume after applying mute
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "flappy_bara_settings";

    /// Parse stored settings, falling back to defaults on corrupt data
    pub fn from_json_or_default(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt settings ({}), using defaults", e);
            Self::default()
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// Read from LocalStorage; defaults when absent or unreadable
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        match Self::storage().and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten()) {
            Some(json) => {
                let settings = Self::from_json_or_default(&json);
                log::info!("Settings loaded (muted={})", settings.muted);
                settings
            }
            None => Self::default(),
        }
    }

    /// Write to LocalStorage. Failures (private mode, quota) are logged only.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::debug!("Settings saved (muted={})", self.muted),
                Err(e) => log::warn!("Failed to save settings: {:?}", e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }

    /// Nothing is persisted natively
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}
