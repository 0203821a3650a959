//! Daemon configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use volnote_core::{BackendKind, Rgb, StatusStyle};

/// Daemon configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Notification title.
    pub title: String,

    /// Icon edge length in pixels.
    /// Override: `VOLNOTE_ICON_EDGE`
    pub icon_edge: u32,

    /// Text height as a fraction of the icon edge.
    pub text_ratio: f32,

    /// Stroke width as a fraction of the icon edge.
    pub stroke_ratio: f32,

    /// Foreground color (`#RRGGBB`) when the volume is exactly zero.
    pub zero_color: String,

    /// Foreground color (`#RRGGBB`) for any non-zero volume.
    pub level_color: String,

    /// Mixer backend: `auto`, `wpctl` or `alsa`.
    /// Override: `VOLNOTE_BACKEND`
    pub backend: String,

    /// Watcher poll interval in milliseconds.
    /// Override: `VOLNOTE_POLL_INTERVAL_MS`
    pub poll_interval_ms: u64,

    /// wpctl object to watch.
    pub wpctl_target: String,

    /// ALSA device name (alsa backend only).
    pub alsa_device: String,

    /// ALSA simple control name (alsa backend only).
    pub alsa_control: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        let core = volnote_core::Config::default();
        Self {
            title: core.style.title,
            icon_edge: core.style.edge,
            text_ratio: core.style.text_ratio,
            stroke_ratio: core.style.stroke_ratio,
            zero_color: "#87CEEB".to_string(),
            level_color: "#FFB6C1".to_string(),
            backend: "auto".to_string(),
            poll_interval_ms: core.poll_interval_ms,
            wpctl_target: core.wpctl_target,
            alsa_device: core.alsa_device,
            alsa_control: core.alsa_control,
        }
    }
}

impl DaemonConfig {
    /// Loads configuration from a YAML file, then applies environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("VOLNOTE_ICON_EDGE") {
            if let Ok(edge) = val.parse() {
                self.icon_edge = edge;
            }
        }

        if let Ok(val) = std::env::var("VOLNOTE_POLL_INTERVAL_MS") {
            if let Ok(interval) = val.parse() {
                self.poll_interval_ms = interval;
            }
        }

        if let Ok(val) = std::env::var("VOLNOTE_BACKEND") {
            self.backend = val;
        }
    }

    /// Converts to volnote-core's Config type.
    pub fn to_core_config(&self) -> Result<volnote_core::Config> {
        let zero_color = Rgb::from_hex(&self.zero_color)
            .with_context(|| format!("Invalid zero_color: {}", self.zero_color))?;
        let level_color = Rgb::from_hex(&self.level_color)
            .with_context(|| format!("Invalid level_color: {}", self.level_color))?;

        let backend = match self.backend.as_str() {
            "auto" => BackendKind::Auto,
            "wpctl" => BackendKind::Wpctl,
            "alsa" => BackendKind::Alsa,
            other => bail!("Unknown backend: {other} (expected auto, wpctl or alsa)"),
        };

        Ok(volnote_core::Config {
            style: StatusStyle {
                title: self.title.clone(),
                edge: self.icon_edge,
                text_ratio: self.text_ratio,
                stroke_ratio: self.stroke_ratio,
                zero_color,
                level_color,
            },
            backend,
            poll_interval_ms: self.poll_interval_ms,
            wpctl_target: self.wpctl_target.clone(),
            alsa_device: self.alsa_device.clone(),
            alsa_control: self.alsa_control.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_core_library() {
        let config = DaemonConfig::default();
        assert_eq!(config.icon_edge, 128);
        assert_eq!(config.title, "Media Volume");
        assert_eq!(config.backend, "auto");
    }

    #[test]
    fn default_colors_convert_cleanly() {
        let core = DaemonConfig::default().to_core_config().unwrap();
        assert_eq!(core.style.zero_color, Rgb::new(135, 206, 235));
        assert_eq!(core.style.level_color, Rgb::new(255, 182, 193));
    }

    #[test]
    fn bad_color_is_rejected() {
        let config = DaemonConfig {
            zero_color: "#12345".to_string(),
            ..DaemonConfig::default()
        };
        assert!(config.to_core_config().is_err());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let config = DaemonConfig {
            backend: "jack".to_string(),
            ..DaemonConfig::default()
        };
        assert!(config.to_core_config().is_err());
    }

    #[test]
    fn yaml_fields_deserialize() {
        let config: DaemonConfig =
            serde_yaml::from_str("icon_edge: 64\nbackend: wpctl\n").unwrap();
        assert_eq!(config.icon_edge, 64);
        assert_eq!(config.backend, "wpctl");
        // Unspecified fields keep their defaults.
        assert_eq!(config.title, "Media Volume");
    }
}
