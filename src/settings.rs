//! The three persisted user preferences.
//!
//! Native builds keep them as JSON in [`SETTINGS_FILE`], the browser build stores each
//! value under its own `localStorage` key. A missing or unreadable value falls back to
//! its default on its own, the other values are still taken from storage.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Countdown length used when no target is stored and when the countdown restarts.
pub const DEFAULT_COUNTDOWN_MS: i64 = 10 * 60 * 1000;
pub const DEFAULT_MOVE_SPEED: f32 = 1.0;
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 1.0;

#[cfg(not(target_arch = "wasm32"))]
pub const SETTINGS_FILE: &str = "settings.json";

const TIMEOUT_KEY: &str = "timeout";
const MOVE_SPEED_KEY: &str = "moveSpeed";
const MOUSE_SENSITIVITY_KEY: &str = "mouseSensitivity";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Countdown target as milliseconds since the Unix epoch.
    pub timeout: i64,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Settings {
    pub fn defaults(now_millis: i64) -> Self {
        Self {
            timeout: now_millis.saturating_add(DEFAULT_COUNTDOWN_MS),
            move_speed: DEFAULT_MOVE_SPEED,
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
        }
    }

    /// Reads whatever fields of `text` parse, defaulting the rest.
    pub fn from_json(text: &str, now_millis: i64) -> Self {
        let defaults = Self::defaults(now_millis);
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("settings are not valid json, using defaults: {e}");
                return defaults;
            }
        };
        Self {
            timeout: field(&value, TIMEOUT_KEY).unwrap_or(defaults.timeout),
            move_speed: field(&value, MOVE_SPEED_KEY).unwrap_or(defaults.move_speed),
            mouse_sensitivity: field(&value, MOUSE_SENSITIVITY_KEY)
                .unwrap_or(defaults.mouse_sensitivity),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(now_millis: i64) -> Self {
        Self::load_from(std::path::Path::new(SETTINGS_FILE), now_millis)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path, now_millis: i64) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text, now_millis),
            Err(e) => {
                log::debug!("no settings at {}: {e}", path.display());
                Self::defaults(now_millis)
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(std::path::Path::new(SETTINGS_FILE))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use anyhow::Context;

        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("writing settings to {}", path.display()))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load(now_millis: i64) -> Self {
        let defaults = Self::defaults(now_millis);
        let Some(storage) = local_storage() else {
            log::warn!("localStorage unavailable, using default settings");
            return defaults;
        };
        let read = |key: &str| storage.get_item(key).ok().flatten();
        Self {
            timeout: read(TIMEOUT_KEY)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout),
            move_speed: read(MOVE_SPEED_KEY)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.move_speed),
            mouse_sensitivity: read(MOUSE_SENSITIVITY_KEY)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.mouse_sensitivity),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> anyhow::Result<()> {
        use anyhow::Context;

        let storage = local_storage().context("localStorage unavailable")?;
        for (key, value) in [
            (TIMEOUT_KEY, self.timeout.to_string()),
            (MOVE_SPEED_KEY, self.move_speed.to_string()),
            (MOUSE_SENSITIVITY_KEY, self.mouse_sensitivity.to_string()),
        ] {
            storage
                .set_item(key, &value)
                .map_err(|_| anyhow::anyhow!("storing {key} failed"))?;
        }
        Ok(())
    }
}

fn field<T: DeserializeOwned>(value: &serde_json::Value, key: &str) -> Option<T> {
    let raw = value.get(key)?.clone();
    match serde_json::from_value(raw) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("ignoring stored {key}: {e}");
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as i64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn defaults_count_down_ten_minutes() {
        let settings = Settings::defaults(NOW);
        assert_eq!(settings.timeout, NOW + 600_000);
        assert_eq!(settings.move_speed, 1.0);
        assert_eq!(settings.mouse_sensitivity, 1.0);
    }

    #[test]
    fn each_field_falls_back_on_its_own() {
        let text = r#"{ "timeout": 42, "moveSpeed": "fast" }"#;
        let settings = Settings::from_json(text, NOW);
        assert_eq!(settings.timeout, 42);
        assert_eq!(settings.move_speed, DEFAULT_MOVE_SPEED);
        assert_eq!(settings.mouse_sensitivity, DEFAULT_MOUSE_SENSITIVITY);
    }

    #[test]
    fn garbage_yields_defaults() {
        assert_eq!(Settings::from_json("{{", NOW), Settings::defaults(NOW));
    }

    #[test]
    fn stored_keys_use_the_web_names() {
        let json = Settings {
            timeout: 5,
            move_speed: 2.5,
            mouse_sensitivity: 0.5,
        }
        .to_json()
        .unwrap();
        assert!(json.contains("\"moveSpeed\": 2.5"));
        assert!(json.contains("\"mouseSensitivity\": 0.5"));
        assert_eq!(Settings::from_json(&json, NOW).timeout, 5);
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("orbit-clock-settings-{}.json", std::process::id()));
        let settings = Settings {
            timeout: NOW,
            move_speed: 3.0,
            mouse_sensitivity: 2.0,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path, 0), settings);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(Settings::load_from(&path, 0), Settings::defaults(0));
    }

    #[test]
    fn clock_is_past_2020() {
        assert!(now_millis() > 1_577_836_800_000);
    }
}
