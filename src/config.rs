use anyhow::Context;
use atrium_runtime::ViewerSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    pub houses_dir: PathBuf,
    pub model_scale: f32,
    pub spacing: f32,
    pub row_offset: f32,
}

impl Default for ViewerSection {
    fn default() -> Self {
        let d = ViewerSettings::default();
        Self {
            houses_dir: d.houses_dir,
            model_scale: d.model_scale,
            spacing: d.spacing,
            row_offset: d.row_offset,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CameraSection {
    pub move_step: f32,
    pub turn_step_deg: f32,
    pub eye_height: f32,
}

impl Default for CameraSection {
    fn default() -> Self {
        let d = ViewerSettings::default();
        Self {
            move_step: d.move_step,
            turn_step_deg: d.turn_step_deg,
            eye_height: d.eye_height,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub viewer: ViewerSection,
    pub camera: CameraSection,
}

impl ViewerConfig {
    /// Reads `atrium.toml` if present. A missing file means defaults; a
    /// file that exists but does not parse is a startup error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn into_settings(self) -> ViewerSettings {
        ViewerSettings {
            houses_dir: self.viewer.houses_dir,
            model_scale: self.viewer.model_scale,
            spacing: self.viewer.spacing,
            row_offset: self.viewer.row_offset,
            move_step: self.camera.move_step,
            turn_step_deg: self.camera.turn_step_deg,
            eye_height: self.camera.eye_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let cfg: ViewerConfig = toml::from_str(
            r#"
            [viewer]
            houses_dir = "models/houses"
            model_scale = 0.5
            spacing = 12.0
            row_offset = 20.0

            [camera]
            move_step = 2.0
            turn_step_deg = 30.0
            eye_height = 1.7
            "#,
        )
        .unwrap();
        assert_eq!(cfg.viewer.houses_dir, PathBuf::from("models/houses"));
        assert_eq!(cfg.viewer.spacing, 12.0);
        assert_eq!(cfg.camera.eye_height, 1.7);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg: ViewerConfig = toml::from_str(
            r#"
            [viewer]
            houses_dir = "elsewhere"
            "#,
        )
        .unwrap();
        let defaults = ViewerSettings::default();
        assert_eq!(cfg.viewer.houses_dir, PathBuf::from("elsewhere"));
        assert_eq!(cfg.viewer.model_scale, defaults.model_scale);
        assert_eq!(cfg.camera.move_step, defaults.move_step);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(toml::from_str::<ViewerConfig>("[viewer\nbroken").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = ViewerConfig::load_or_default(Path::new("definitely-not-here.toml")).unwrap();
        assert_eq!(cfg.viewer.houses_dir, ViewerSettings::default().houses_dir);
    }
}
