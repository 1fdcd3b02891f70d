// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  PhotoBooth context │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  DeviceAcquisition  │  ← Status, open timeout, exclusive stream ownership
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackend Trait │  ← Enumeration and stream opening
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//!   ┌───────┐  ┌───────┐
//!   │Virtual│  │ V4L2  │
//!   └───────┘  └───────┘
//! ```
//!
//! Backend calls are blocking; the acquisition layer runs them on the tokio
//! blocking pool.

pub mod manager;
pub mod types;
#[cfg(all(target_os = "linux", feature = "v4l2"))]
pub mod v4l2;

pub use manager::DeviceAcquisition;
pub use types::*;

use crate::backends::virtual_camera::VirtualCameraBackend;
use std::sync::Arc;

/// A camera backend
///
/// Implementations must be cheap to share; opening may block for as long as
/// the platform needs to grant access.
pub trait CameraBackend: Send + Sync {
    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Open a stream matching `constraints`
    ///
    /// # Returns
    /// * `Ok(stream)` - Stream is live
    /// * `Err(DeviceError::PermissionDenied)` - Access refused
    /// * `Err(DeviceError::NotFound)` - No camera satisfies the constraints
    fn open(&self, constraints: &StreamConstraints) -> BackendResult<Box<dyn CameraStream>>;

    /// Get the backend type identifier
    fn backend_type(&self) -> CameraBackendType;

    /// Check if this backend is usable on the current system
    fn is_available(&self) -> bool;
}

/// An open camera stream
///
/// Exclusively owned by [`DeviceAcquisition`] and lent to the frame capturer.
pub trait CameraStream: Send {
    /// Grab the current frame
    fn grab_frame(&mut self) -> BackendResult<CameraFrame>;

    /// Stop all tracks and release the device
    ///
    /// Idempotent; a stopped stream never delivers frames again.
    fn stop(&mut self);

    /// Negotiated frame size
    fn resolution(&self) -> (u32, u32);

    /// Whether the stream still delivers frames
    fn is_active(&self) -> bool;

    /// The device this stream reads from
    fn device(&self) -> &CameraDevice;
}

/// Get a backend instance for the given type
///
/// The V4L2 backend only exists in builds with the `v4l2` feature on Linux.
pub fn get_backend_for_type(
    backend_type: CameraBackendType,
) -> BackendResult<Arc<dyn CameraBackend>> {
    match backend_type {
        CameraBackendType::Virtual => Ok(Arc::new(VirtualCameraBackend::default())),
        #[cfg(all(target_os = "linux", feature = "v4l2"))]
        CameraBackendType::V4l2 => Ok(Arc::new(v4l2::V4l2Backend::new())),
        #[cfg(not(all(target_os = "linux", feature = "v4l2")))]
        CameraBackendType::V4l2 => Err(crate::errors::DeviceError::Backend(
            "built without V4L2 support (enable the `v4l2` feature)".to_string(),
        )),
    }
}

/// Get the default backend
pub fn get_default_backend() -> CameraBackendType {
    if cfg!(all(target_os = "linux", feature = "v4l2")) {
        CameraBackendType::V4l2
    } else {
        CameraBackendType::Virtual
    }
}
