//! Configuration management for the overlay demo

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::coordinates::{TextMetrics, Viewport};
use crate::host::OverlayPlacement;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub families: FamilyToggles,
    #[serde(default)]
    pub label: Option<LabelConfig>,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverlayConfig {
    /// Subtracted from the visible content width for the bounding box
    #[serde(default = "default_box_margin")]
    pub box_margin: f32,
    /// Height of every per-line zone
    #[serde(default = "default_zone_height")]
    pub zone_height: f32,
    /// Defer content-change updates to the next frame
    #[serde(default = "default_true")]
    pub coalesce_content_changes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct FamilyToggles {
    #[serde(default = "default_true")]
    pub bounding_box: bool,
    #[serde(default = "default_true")]
    pub zones: bool,
    #[serde(default = "default_true")]
    pub glyphs: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LabelConfig {
    pub text: String,
    #[serde(default = "default_label_placement")]
    pub placement: OverlayPlacement,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditorConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_tab_stops")]
    pub tab_stops: u32,
    #[serde(default = "default_gutter_width")]
    pub gutter_width: f32,
    #[serde(default = "default_language")]
    pub language: String,
}

/// The part of the configuration the synchronizer consumes
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    pub overlay: OverlayConfig,
    pub families: FamilyToggles,
    pub label: Option<LabelConfig>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "Failed to read config: {}", err),
            ConfigError::Parse(err) => write!(f, "Failed to parse config: {}", err),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            box_margin: default_box_margin(),
            zone_height: default_zone_height(),
            coalesce_content_changes: true,
        }
    }
}

impl Default for FamilyToggles {
    fn default() -> Self {
        Self {
            bounding_box: true,
            zones: true,
            glyphs: true,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            scale_factor: default_scale_factor(),
            font_size: default_font_size(),
            tab_stops: default_tab_stops(),
            gutter_width: default_gutter_width(),
            language: default_language(),
        }
    }
}

// Default value functions
fn default_box_margin() -> f32 {
    20.0
}

fn default_zone_height() -> f32 {
    20.0
}

fn default_true() -> bool {
    true
}

fn default_label_placement() -> OverlayPlacement {
    OverlayPlacement::TopRight
}

fn default_width() -> f32 {
    800.0
}

fn default_height() -> f32 {
    600.0
}

fn default_scale_factor() -> f32 {
    1.0
}

fn default_font_size() -> f32 {
    16.0
}

fn default_tab_stops() -> u32 {
    4
}

fn default_gutter_width() -> f32 {
    50.0
}

fn default_language() -> String {
    "javascript".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.overlay.box_margin < 0.0 {
            return Err(ConfigError::Invalid("overlay.box_margin must not be negative".into()));
        }
        if self.overlay.zone_height < 0.0 {
            return Err(ConfigError::Invalid("overlay.zone_height must not be negative".into()));
        }
        let editor = &self.editor;
        if editor.width <= 0.0 || editor.height <= 0.0 {
            return Err(ConfigError::Invalid("editor size must be positive".into()));
        }
        if editor.font_size <= 0.0 || editor.scale_factor <= 0.0 {
            return Err(ConfigError::Invalid(
                "editor.font_size and editor.scale_factor must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            overlay: self.overlay.clone(),
            families: self.families,
            label: self.label.clone(),
        }
    }

    /// Viewport for the configured font and gutter, not yet laid out
    pub fn viewport(&self) -> Viewport {
        let editor = &self.editor;
        Viewport::new(editor.font_size, editor.scale_factor)
            .with_metrics(TextMetrics::new(editor.font_size).with_tab_stops(editor.tab_stops))
            .with_gutter(editor.gutter_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.overlay.box_margin, 20.0);
        assert_eq!(config.overlay.zone_height, 20.0);
        assert!(config.overlay.coalesce_content_changes);
        assert_eq!(config.families, FamilyToggles::default());
        assert!(config.label.is_none());
        assert_eq!(config.editor.language, "javascript");
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_toml_str(
            r#"
[overlay]
box_margin = 8.0
coalesce_content_changes = false

[families]
glyphs = false

[label]
text = "Overlay Widget Active"
placement = "bottom-right"

[editor]
font_size = 12.0
language = "rust"
"#,
        )
        .unwrap();

        assert_eq!(config.overlay.box_margin, 8.0);
        assert_eq!(config.overlay.zone_height, 20.0);
        assert!(!config.overlay.coalesce_content_changes);
        assert!(config.families.zones);
        assert!(!config.families.glyphs);
        assert_eq!(
            config.label,
            Some(LabelConfig {
                text: "Overlay Widget Active".into(),
                placement: OverlayPlacement::BottomRight,
            })
        );
        assert_eq!(config.editor.font_size, 12.0);
        assert_eq!(config.editor.width, 800.0);
    }

    #[test]
    fn test_label_placement_defaults_to_top_right() {
        let config = AppConfig::from_toml_str("[label]\ntext = \"hi\"\n").unwrap();
        assert_eq!(config.label.map(|l| l.placement), Some(OverlayPlacement::TopRight));
    }

    #[test]
    fn test_shipped_example_config_parses() {
        let config = AppConfig::from_toml_str(include_str!("../assets/overlays.toml")).unwrap();
        assert_eq!(config.editor.tab_stops, 4);
        assert_eq!(config.label.map(|l| l.text), Some("My Overlay Widget".to_string()));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            AppConfig::from_toml_str("[overlay]\nzone_height = -1.0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[editor]\nwidth = 0.0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[overlay\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
