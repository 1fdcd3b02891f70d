// SPDX-License-Identifier: GPL-3.0-only

//! Still capture from a live stream
//!
//! A still is grabbed at the stream's native resolution, converted to RGBA
//! and filtered before it leaves this module. Nothing downstream filters
//! again.

use super::filters::{self, FilterKind};
use crate::backends::camera::CameraStream;
use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use crate::media::Raster;
use crate::media::formats::conversions;
use tracing::{debug, error, info};

/// Photo capture handler
pub struct FrameCapturer;

impl FrameCapturer {
    /// Grab the current frame from `stream` and filter it
    ///
    /// # Returns
    /// * `Ok(Raster)` - Filtered still at native stream resolution
    /// * `Err(PhotoError::NoFrameAvailable)` - The stream delivered nothing
    /// * `Err(PhotoError::CaptureFailed)` - The frame could not be converted
    pub fn capture_still(
        stream: &mut dyn CameraStream,
        filter: FilterKind,
    ) -> Result<Raster, PhotoError> {
        info!(device = %stream.device(), %filter, "Capturing still");

        let frame = stream.grab_frame().map_err(|e| {
            error!(error = %e, "Failed to grab frame");
            PhotoError::NoFrameAvailable
        })?;

        let mut raster = Self::frame_to_raster(&frame)?;
        filters::apply(&mut raster, filter);
        Ok(raster)
    }

    /// Copy a camera frame into a new RGBA raster
    pub fn frame_to_raster(frame: &CameraFrame) -> Result<Raster, PhotoError> {
        debug!(
            width = frame.width,
            height = frame.height,
            format = %frame.format,
            "Converting frame"
        );

        if frame.data.is_empty() {
            return Err(PhotoError::NoFrameAvailable);
        }
        conversions::to_raster(frame.format, &frame.data, frame.width, frame.height)
            .map_err(PhotoError::CaptureFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::CameraBackend;
    use crate::backends::camera::types::StreamConstraints;
    use crate::backends::virtual_camera::VirtualCameraBackend;
    use crate::config::Facing;
    use crate::media::formats::PixelFormat;
    use std::sync::Arc;

    #[test]
    fn test_capture_applies_filter() {
        let backend = VirtualCameraBackend::from_image(Raster::filled(4, 3, [10, 20, 30, 255]));
        let mut stream = backend
            .open(&StreamConstraints {
                width: 640,
                height: 480,
                facing: Facing::User,
            })
            .unwrap();

        let still = FrameCapturer::capture_still(stream.as_mut(), FilterKind::Grayscale).unwrap();
        assert_eq!(still.dimensions(), (4, 3));
        assert_eq!(still.pixel(3, 2), [20, 20, 20, 255]);
    }

    #[test]
    fn test_stopped_stream_has_no_frame() {
        let backend = VirtualCameraBackend::default();
        let mut stream = backend
            .open(&StreamConstraints {
                width: 8,
                height: 8,
                facing: Facing::User,
            })
            .unwrap();
        stream.stop();

        assert_eq!(
            FrameCapturer::capture_still(stream.as_mut(), FilterKind::None),
            Err(PhotoError::NoFrameAvailable)
        );
    }

    #[test]
    fn test_yuyv_frame_converts() {
        let frame = CameraFrame {
            width: 2,
            height: 1,
            data: Arc::from(vec![255u8, 128, 255, 128]),
            format: PixelFormat::Yuyv,
            captured_at: std::time::Instant::now(),
        };
        let raster = FrameCapturer::frame_to_raster(&frame).unwrap();
        assert_eq!(raster.pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_truncated_frame_fails() {
        let frame = CameraFrame {
            width: 4,
            height: 4,
            data: Arc::from(vec![0u8; 10]),
            format: PixelFormat::Rgba,
            captured_at: std::time::Instant::now(),
        };
        assert!(matches!(
            FrameCapturer::frame_to_raster(&frame),
            Err(PhotoError::CaptureFailed(_))
        ));
    }
}
