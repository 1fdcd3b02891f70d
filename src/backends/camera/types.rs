// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use crate::config::Facing;
use crate::errors::DeviceError;
use crate::media::formats::PixelFormat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, DeviceError>;

/// Camera backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackendType {
    /// Synthetic camera (test pattern or still images), always available
    #[default]
    Virtual,
    /// Video4Linux devices under /dev/video*
    V4l2,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::Virtual => write!(f, "virtual"),
            CameraBackendType::V4l2 => write!(f, "V4L2"),
        }
    }
}

impl FromStr for CameraBackendType {
    type Err = crate::errors::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "virtual" => Ok(CameraBackendType::Virtual),
            "v4l2" | "v4l" => Ok(CameraBackendType::V4l2),
            _ => Err(crate::errors::ConfigError::InvalidValue {
                field: "backend",
                value: s.to_string(),
            }),
        }
    }
}

/// A camera the backend can open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// Backend-specific locator (device node, virtual id)
    pub path: String,
    /// Facing, when the backend knows it
    pub facing: Option<Facing>,
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.facing {
            Some(Facing::User) => write!(f, "{} ({}, front)", self.name, self.path),
            Some(Facing::Environment) => write!(f, "{} ({}, rear)", self.name, self.path),
            None => write!(f, "{} ({})", self.name, self.path),
        }
    }
}

/// What the pipeline asks of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: Facing,
}

impl std::fmt::Display for StreamConstraints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {:?}", self.width, self.height, self.facing)
    }
}

/// A single frame as delivered by a stream
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Raw bytes in `format` layout
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// When the frame was grabbed
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Wrap tightly packed RGBA bytes
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            format: PixelFormat::Rgba,
            captured_at: Instant::now(),
        }
    }
}

/// Observable state of device acquisition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceStatus {
    /// No stream and no open in flight
    #[default]
    NotReady,
    /// Waiting for the backend to grant or deny the stream
    Opening,
    /// Stream live; captures are allowed
    Ready,
    /// The last open failed; waits for an explicit retry
    Failed(DeviceError),
}

impl DeviceStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, DeviceStatus::Ready)
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceStatus::NotReady => write!(f, "not ready"),
            DeviceStatus::Opening => write!(f, "opening"),
            DeviceStatus::Ready => write!(f, "ready"),
            DeviceStatus::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}
