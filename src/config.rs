//! Configuration persistence for planmark settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::{DEFAULT_JPEG_QUALITY, ExportSettings};

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanmarkConfig {
    /// JPEG quality of exported images (1-100)
    pub jpeg_quality: u8,
    /// Prefix of the date-stamped export file name
    pub file_prefix: String,
    /// Where downloads go (None = XDG download directory)
    pub download_dir: Option<PathBuf>,
    /// Whether to try the desktop's native share before downloading
    pub native_share: bool,
    /// Device pixel ratio applied when none is given on the command line
    pub device_pixel_ratio: f32,
}

impl Default for PlanmarkConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            file_prefix: "Drawing".to_string(),
            download_dir: None,
            native_share: true,
            device_pixel_ratio: 1.0,
        }
    }
}

impl PlanmarkConfig {
    /// Configuration directory name
    pub const ID: &'static str = "planmark";

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.toml"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    /// Load from a specific file, or return defaults if unavailable
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                return Self::default();
            }
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("Could not determine config directory for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:#}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
            file_prefix: self.file_prefix.clone(),
        }
    }
}
