// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the photo booth pipeline
//!
//! Device and overlay errors are recovered at the pipeline boundary and
//! reported as status; only configuration and I/O surface to callers.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Camera acquisition errors
    #[error("Camera error: {0}")]
    Device(#[from] DeviceError),
    /// Sticker / image resource errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
    /// Photo capture and encoding errors
    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Storage/filesystem errors
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Camera acquisition errors
///
/// Cloneable so the last failure can be kept in the device status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The user (or platform policy) refused camera access
    #[error("Could not access camera. Please check permissions.")]
    PermissionDenied,
    /// No camera matches the requested constraints
    #[error("No camera found: {0}")]
    NotFound(String),
    /// Camera is busy or in use by another process
    #[error("Camera is busy")]
    Busy,
    /// The device did not answer within the open timeout
    #[error("Camera did not respond within {0} ms")]
    Timeout(u64),
    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Sticker image load errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the image source failed
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not a decodable image
    #[error("Failed to decode {origin}: {message}")]
    Decode { origin: String, message: String },
    /// The load did not finish within the sticker timeout
    #[error("Loading {origin} timed out after {millis} ms")]
    Timeout { origin: String, millis: u64 },
    /// The load task was cancelled or panicked
    #[error("Load task for {origin} failed: {message}")]
    Task { origin: String, message: String },
    /// No usable font for drawing captions
    #[error("No caption font available")]
    NoFont,
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoError {
    /// No frame available for capture
    #[error("No frame available for capture")]
    NoFrameAvailable,
    /// Frame could not be turned into a raster
    #[error("Capture failed: {0}")]
    CaptureFailed(String),
    /// Encoding failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
    /// Decoding a captured image failed
    #[error("Decoding failed: {0}")]
    DecodingFailed(String),
}

/// Settings file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read or written
    #[error("Settings I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Settings file is not valid JSON for the expected schema
    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A value could not be parsed (CLI flag or settings field)
    #[error("Invalid value {value:?} for {field}")]
    InvalidValue { field: &'static str, value: String },
}
