//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Heat-map palette colors
//! - Notification enablement
//! - Hosted store / identity endpoint
//! - Last-used account
//!
//! Configuration is stored at `~/.config/habitloop/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::progress::{HeatmapPalette, Rgb};
use crate::session::SessionConfig;
use crate::store::data_dir;

/// Heat-map palette configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    #[serde(default = "default_zero_color")]
    pub zero_color: String,
    #[serde(default = "default_full_color")]
    pub full_color: String,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            zero_color: default_zero_color(),
            full_color: default_full_color(),
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Hosted store / identity endpoint. When `base_url` is unset the CLI
/// falls back to the local SQLite store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Last-used account details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub account: AccountConfig,
}

impl Config {
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/habitloop"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Palette with the legacy black fallback for malformed hex values.
    pub fn palette(&self) -> HeatmapPalette {
        HeatmapPalette {
            zero: Rgb::parse_hex_or_black(&self.heatmap.zero_color),
            full: Rgb::parse_hex_or_black(&self.heatmap.full_color),
        }
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            palette: self.palette(),
            notifications_enabled: self.notifications.enabled,
        }
    }
}

fn default_zero_color() -> String {
    "#f0f0f0".to_string()
}

fn default_full_color() -> String {
    "#48bb78".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_from_an_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.notifications.enabled);
        assert_eq!(config.heatmap.zero_color, "#f0f0f0");
        assert_eq!(config.remote.base_url, None);
    }

    #[test]
    fn palette_falls_back_to_black_on_bad_hex() {
        let config: Config = toml::from_str(
            "[heatmap]\nzero_color = \"oops\"\nfull_color = \"#48bb78\"\n",
        )
        .unwrap();
        let palette = config.palette();
        assert_eq!(palette.zero, Rgb::BLACK);
        assert_eq!(palette.full, Rgb::parse_hex("#48bb78").unwrap());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.remote.base_url = Some("https://api.example.com/".to_string());
        config.account.email = Some("a@example.com".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.remote.base_url, config.remote.base_url);
        assert_eq!(parsed.account.email, config.account.email);
    }
}
