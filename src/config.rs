// SPDX-License-Identifier: GPL-3.0-only

//! Camera configuration and persisted booth settings

use crate::backends::camera::get_default_backend;
use crate::backends::camera::types::{CameraBackendType, StreamConstraints};
use crate::constants::{
    APP_DIR_NAME, DEFAULT_TIMER_SECONDS, DEVICE_OPEN_TIMEOUT, HD_RESOLUTION, SETTINGS_FILE_NAME,
    STANDARD_RESOLUTION, STICKER_LOAD_TIMEOUT, STICKER_SIZE,
};
use crate::errors::ConfigError;
use crate::pipelines::photo::{CollageLayout, FilterKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Requested stream resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionTier {
    /// 640x480
    Standard,
    /// 1280x720
    #[default]
    Hd,
}

impl ResolutionTier {
    pub const ALL: [ResolutionTier; 2] = [ResolutionTier::Standard, ResolutionTier::Hd];

    /// Requested (width, height) for this tier
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            ResolutionTier::Standard => STANDARD_RESOLUTION,
            ResolutionTier::Hd => HD_RESOLUTION,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ResolutionTier::Standard => "Standard (640×480)",
            ResolutionTier::Hd => "HD (1280×720)",
        }
    }
}

impl FromStr for ResolutionTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "sd" => Ok(ResolutionTier::Standard),
            "hd" => Ok(ResolutionTier::Hd),
            _ => Err(ConfigError::InvalidValue {
                field: "resolution",
                value: s.to_string(),
            }),
        }
    }
}

/// Which camera the stream should come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Front camera (selfie)
    #[default]
    User,
    /// Rear camera
    Environment,
}

impl Facing {
    /// The other camera, as the switch-camera button does
    pub fn flipped(self) -> Self {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }
}

impl FromStr for Facing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "front" => Ok(Facing::User),
            "environment" | "back" | "rear" => Ok(Facing::Environment),
            _ => Err(ConfigError::InvalidValue {
                field: "facing",
                value: s.to_string(),
            }),
        }
    }
}

/// Camera settings supplied by the settings panel
///
/// Read-only to the pipeline; a new value is delivered whenever the user
/// changes a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub resolution: ResolutionTier,
    pub timer_seconds: u32,
    pub flash_enabled: bool,
    pub grid_enabled: bool,
    pub facing: Facing,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            resolution: ResolutionTier::Hd,
            timer_seconds: DEFAULT_TIMER_SECONDS,
            flash_enabled: false,
            grid_enabled: false,
            facing: Facing::User,
        }
    }
}

impl CameraConfig {
    /// Stream constraints derived from this config
    pub fn constraints(&self) -> StreamConstraints {
        let (width, height) = self.resolution.dimensions();
        StreamConstraints {
            width,
            height,
            facing: self.facing,
        }
    }

    /// Whether moving from `self` to `next` needs the stream to be reopened
    ///
    /// Only resolution and facing affect the stream; timer, flash and grid
    /// are read at capture time.
    pub fn requires_reopen(&self, next: &CameraConfig) -> bool {
        self.resolution != next.resolution || self.facing != next.facing
    }
}

/// Persisted settings for the booth shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera settings
    pub camera: CameraConfig,
    /// Active filter
    pub filter: FilterKind,
    /// Active collage layout
    pub layout: CollageLayout,
    /// Camera backend to use
    pub backend: CameraBackendType,
    /// Bound on waiting for the camera to open, in milliseconds
    pub device_open_timeout_ms: u64,
    /// Bound on loading each sticker image, in milliseconds
    pub sticker_load_timeout_ms: u64,
    /// Sticker footprint in pixels
    pub sticker_size: u32,
    /// Font file for captions (default: first well-known system font found)
    pub caption_font: Option<PathBuf>,
    /// Where exported images go (default: ~/Pictures/photobooth)
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            filter: FilterKind::None,
            layout: CollageLayout::Single,
            backend: get_default_backend(),
            device_open_timeout_ms: DEVICE_OPEN_TIMEOUT.as_millis() as u64,
            sticker_load_timeout_ms: STICKER_LOAD_TIMEOUT.as_millis() as u64,
            sticker_size: STICKER_SIZE,
            caption_font: None,
            output_dir: None,
        }
    }
}

impl Config {
    /// Default location of the settings file
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Load settings from the default location, falling back to defaults
    ///
    /// A missing file is normal on first run; an unreadable or invalid one
    /// is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            debug!("No config directory available, using default settings");
            return Self::default();
        };

        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write settings to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, text).map_err(io_err)?;

        info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    pub fn device_open_timeout(&self) -> Duration {
        Duration::from_millis(self.device_open_timeout_ms)
    }

    pub fn sticker_load_timeout(&self) -> Duration {
        Duration::from_millis(self.sticker_load_timeout_ms)
    }

    /// Directory exported images are written to
    pub fn output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        dirs::picture_dir()
            .or_else(dirs::home_dir)
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
