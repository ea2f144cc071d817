//! Configuration system
//!
//! TOML settings for the bridge, plus the [`Profile`] view the desktop
//! painter reads its legacy keys through.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Keyboard map selection
    pub input: InputConfig,
    /// Desktop background profile keys
    pub desktop: DesktopConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(Self::find_config_file);

        match config_path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {:?}", path);
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;

                let config: Config = toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?;

                Ok(config)
            },
            Some(path) => {
                warn!("Config file not found at {:?}, using defaults", path);
                Ok(Self::default())
            },
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            },
        }
    }

    fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            dirs::config_dir().map(|p| p.join("xwinbridge/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/xwinbridge/config.toml")),
            Some(PathBuf::from("/etc/xwinbridge/config.toml")),
        ];

        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Generate default configuration as a string
    pub fn default_config_string() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

/// General settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// X display name, `$DISPLAY` when unset
    pub display: Option<String>,
    /// Top-level windows are positioned by a reparenting window manager
    pub managed: bool,
    /// Fallback directory searched for wallpaper files
    pub windows_dir: Option<PathBuf>,
}

/// Keyboard map names handed to the key symbol resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub xkb_rules: String,
    pub xkb_model: String,
    pub xkb_layout: String,
    pub xkb_variant: String,
    pub xkb_options: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            xkb_rules: String::new(),
            xkb_model: String::new(),
            xkb_layout: "us".to_string(),
            xkb_variant: String::new(),
            xkb_options: String::new(),
        }
    }
}

/// Desktop keys, spelled the way the legacy profile spells them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    #[serde(rename = "Pattern")]
    pub pattern: String,
    #[serde(rename = "WallPaper")]
    pub wallpaper: String,
    #[serde(rename = "TileWallPaper")]
    pub tile_wallpaper: i32,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            pattern: NO_VALUE.to_string(),
            wallpaper: NO_VALUE.to_string(),
            tile_wallpaper: 0,
        }
    }
}

/// Placeholder the profile uses for "not set".
pub const NO_VALUE: &str = "(None)";

/// INI-like settings store.
pub trait Profile {
    /// Value of `key` in `section`, or `default` when absent.
    fn profile_string(&self, section: &str, key: &str, default: &str) -> String;

    /// Integer value of `key` in `section`, or `default` when absent or
    /// not a number.
    fn profile_int(&self, section: &str, key: &str, default: i32) -> i32;
}

impl Profile for Config {
    fn profile_string(&self, section: &str, key: &str, default: &str) -> String {
        if !section.eq_ignore_ascii_case("desktop") {
            return default.to_string();
        }
        let value = if key.eq_ignore_ascii_case("Pattern") {
            &self.desktop.pattern
        } else if key.eq_ignore_ascii_case("WallPaper") {
            &self.desktop.wallpaper
        } else {
            return default.to_string();
        };
        value.clone()
    }

    fn profile_int(&self, section: &str, key: &str, default: i32) -> i32 {
        if section.eq_ignore_ascii_case("desktop") && key.eq_ignore_ascii_case("TileWallPaper") {
            self.desktop.tile_wallpaper
        } else {
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.desktop.pattern, "(None)");
        assert_eq!(config.desktop.tile_wallpaper, 0);
        assert!(!config.general.managed);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_desktop_keys_keep_legacy_spelling() {
        let config: Config = toml::from_str(
            "[desktop]\nPattern = \"170 85 170 85 170 85 170 85\"\nTileWallPaper = 1\n",
        )
        .unwrap();
        assert_eq!(
            config.profile_string("Desktop", "Pattern", "(None)"),
            "170 85 170 85 170 85 170 85"
        );
        assert_eq!(config.profile_string("desktop", "WallPaper", "x"), "(None)");
        assert_eq!(config.profile_int("desktop", "TileWallPaper", 0), 1);
        assert_eq!(config.profile_int("desktop", "Other", 7), 7);
        assert_eq!(config.profile_string("colors", "Pattern", "dflt"), "dflt");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general]\nmanaged = true\n").unwrap();
        let config = Config::load(path.to_str()).unwrap();
        assert!(config.general.managed);
        assert_eq!(config.input.xkb_layout, "us");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load(path.to_str()).unwrap();
        assert_eq!(config, Config::default());
    }
}
