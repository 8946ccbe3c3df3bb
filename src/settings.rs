use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::timer::duration::parse_duration;

pub const DEFAULT_INPUT: &str = "00:01:00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub default_input: String,
    pub alert: AlertSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_input: DEFAULT_INPUT.to_string(),
            alert: AlertSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSettings {
    pub sound_enabled: bool,
    pub beep_count: u32,
    pub beep_interval_ms: u64,
    pub flash_cycles: u32,
    pub flash_interval_ms: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            beep_count: default_beep_count(),
            beep_interval_ms: default_beep_interval_ms(),
            flash_cycles: default_flash_cycles(),
            flash_interval_ms: default_flash_interval_ms(),
        }
    }
}

/// A missing file is not an error; the defaults are used instead.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        info!("no settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to read settings file {}", path.display()))?;
    parse_settings_text(&content)
}

pub fn parse_settings_text(content: &str) -> Result<Settings> {
    let raw = serde_json::from_str::<SettingsFile>(content).map_err(|err| {
        let line = err.line();
        let column = err.column();
        anyhow::anyhow!("invalid JSON at line {line}, column {column}: {err}")
    })?;

    if raw.version != 1 {
        bail!(
            "unsupported settings version {}; expected version 1",
            raw.version
        );
    }

    parse_duration(&raw.default_input)
        .with_context(|| format!("invalid default_input '{}'", raw.default_input))?;
    if raw.alert.flash_interval_ms == 0 {
        bail!("alert.flash_interval_ms must be greater than zero");
    }

    Ok(Settings {
        default_input: raw.default_input,
        alert: AlertSettings {
            sound_enabled: raw.alert.sound_enabled,
            beep_count: raw.alert.beep_count,
            beep_interval_ms: raw.alert.beep_interval_ms,
            flash_cycles: raw.alert.flash_cycles,
            flash_interval_ms: raw.alert.flash_interval_ms,
        },
    })
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let payload = SettingsFile {
        version: 1,
        default_input: settings.default_input.clone(),
        alert: AlertSettingsFile {
            sound_enabled: settings.alert.sound_enabled,
            beep_count: settings.alert.beep_count,
            beep_interval_ms: settings.alert.beep_interval_ms,
            flash_cycles: settings.alert.flash_cycles,
            flash_interval_ms: settings.alert.flash_interval_ms,
        },
    };
    let text = serde_json::to_string_pretty(&payload)?;
    fs::write(path, format!("{text}\n"))
        .with_context(|| format!("unable to write settings file {}", path.display()))?;
    info!("saved settings to {}", path.display());
    Ok(())
}

#[derive(Debug, Deserialize, Serialize)]
struct SettingsFile {
    version: u32,
    #[serde(default = "default_input")]
    default_input: String,
    #[serde(default)]
    alert: AlertSettingsFile,
}

#[derive(Debug, Deserialize, Serialize)]
struct AlertSettingsFile {
    #[serde(default = "default_sound_enabled")]
    sound_enabled: bool,
    #[serde(default = "default_beep_count")]
    beep_count: u32,
    #[serde(default = "default_beep_interval_ms")]
    beep_interval_ms: u64,
    #[serde(default = "default_flash_cycles")]
    flash_cycles: u32,
    #[serde(default = "default_flash_interval_ms")]
    flash_interval_ms: u64,
}

impl Default for AlertSettingsFile {
    fn default() -> Self {
        Self {
            sound_enabled: default_sound_enabled(),
            beep_count: default_beep_count(),
            beep_interval_ms: default_beep_interval_ms(),
            flash_cycles: default_flash_cycles(),
            flash_interval_ms: default_flash_interval_ms(),
        }
    }
}

fn default_input() -> String {
    DEFAULT_INPUT.to_string()
}

fn default_sound_enabled() -> bool {
    true
}

fn default_beep_count() -> u32 {
    3
}

fn default_beep_interval_ms() -> u64 {
    300
}

fn default_flash_cycles() -> u32 {
    4
}

fn default_flash_interval_ms() -> u64 {
    200
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn parses_full_settings() {
        let json = r#"
{
  "version": 1,
  "default_input": "05:00",
  "alert": {
    "sound_enabled": false,
    "beep_count": 5,
    "beep_interval_ms": 150,
    "flash_cycles": 2,
    "flash_interval_ms": 100
  }
}
"#;
        let settings = parse_settings_text(json).expect("valid settings");
        assert_eq!(settings.default_input, "05:00");
        assert!(!settings.alert.sound_enabled);
        assert_eq!(settings.alert.beep_count, 5);
        assert_eq!(settings.alert.beep_interval_ms, 150);
        assert_eq!(settings.alert.flash_cycles, 2);
        assert_eq!(settings.alert.flash_interval_ms, 100);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let settings = parse_settings_text(r#"{ "version": 1 }"#).expect("minimal settings");
        assert_eq!(settings, Settings::default());

        let partial = parse_settings_text(r#"{ "version": 1, "alert": { "beep_count": 1 } }"#)
            .expect("partial alert block");
        assert_eq!(partial.alert.beep_count, 1);
        assert_eq!(partial.alert.flash_cycles, 4);
        assert!(partial.alert.sound_enabled);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_settings_text("{ not-json").expect_err("malformed");
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = parse_settings_text(r#"{ "version": 2 }"#).expect_err("version 2");
        assert!(err.to_string().contains("unsupported settings version"));
    }

    #[test]
    fn rejects_unparseable_default_input() {
        let err = parse_settings_text(r#"{ "version": 1, "default_input": "soon" }"#)
            .expect_err("bad default input");
        assert!(err.to_string().contains("invalid default_input"));
    }

    #[test]
    fn rejects_zero_flash_interval() {
        let err = parse_settings_text(r#"{ "version": 1, "alert": { "flash_interval_ms": 0 } }"#)
            .expect_err("zero flash interval");
        assert!(err.to_string().contains("flash_interval_ms"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let settings = load_settings(&dir.path().join("absent.json")).expect("defaults");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("countdown.json");
        let mut settings = Settings::default();
        settings.default_input = "00:25:00".to_string();
        settings.alert.sound_enabled = false;

        save_settings(&path, &settings).expect("save");
        let loaded = load_settings(&path).expect("load");
        assert_eq!(loaded, settings);
    }
}
