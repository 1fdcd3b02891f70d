// SPDX-License-Identifier: GPL-3.0-only

//! Video4Linux capture backend
//!
//! Scans `/dev/video*` for capture devices and streams frames through
//! memory-mapped buffers. V4L2 has no notion of facing, so the first capture
//! device serves as the user-facing camera and the second, when present, as
//! the environment-facing one.

use super::types::*;
use super::{CameraBackend, CameraStream};
use crate::config::Facing;
use crate::errors::DeviceError;
use crate::media::formats::PixelFormat;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

/// Formats requested from the driver, in order of preference
const PREFERRED_FORMATS: [PixelFormat; 3] =
    [PixelFormat::Yuyv, PixelFormat::Mjpeg, PixelFormat::Rgb24];

const BUFFER_COUNT: u32 = 4;

/// V4L2 camera backend
#[derive(Debug, Default)]
pub struct V4l2Backend;

impl V4l2Backend {
    pub fn new() -> Self {
        Self
    }

    fn pick_device(&self, facing: Facing) -> BackendResult<CameraDevice> {
        let devices = self.enumerate_cameras();
        let index = match facing {
            Facing::User => 0,
            Facing::Environment => 1,
        };

        if let Some(device) = devices.get(index) {
            return Ok(device.clone());
        }
        match devices.into_iter().next() {
            Some(device) => {
                debug!(?facing, device = %device, "No camera for requested facing, using first");
                Ok(device)
            }
            None => Err(DeviceError::NotFound("no V4L2 capture device".to_string())),
        }
    }
}

fn map_io_error(path: &str, err: std::io::Error) -> DeviceError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => DeviceError::PermissionDenied,
        std::io::ErrorKind::NotFound => DeviceError::NotFound(path.to_string()),
        // EBUSY
        _ if err.raw_os_error() == Some(16) => DeviceError::Busy,
        _ => DeviceError::Backend(format!("{path}: {err}")),
    }
}

impl CameraBackend for V4l2Backend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        let Ok(entries) = std::fs::read_dir("/dev") else {
            return Vec::new();
        };

        // Sort to get consistent results across runs
        let mut paths: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("video"))
            .map(|e| e.path().to_string_lossy().into_owned())
            .collect();
        paths.sort_by_key(|p| {
            p.trim_start_matches("/dev/video")
                .parse::<u32>()
                .unwrap_or(u32::MAX)
        });

        let mut devices = Vec::new();
        for path in paths {
            let caps = match Device::with_path(&path).and_then(|dev| dev.query_caps()) {
                Ok(caps) => caps,
                Err(e) => {
                    debug!(path, error = %e, "Skipping unreadable video node");
                    continue;
                }
            };
            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                continue;
            }
            let facing = match devices.len() {
                0 => Some(Facing::User),
                1 => Some(Facing::Environment),
                _ => None,
            };
            devices.push(CameraDevice {
                name: caps.card,
                path,
                facing,
            });
        }
        devices
    }

    fn open(&self, constraints: &StreamConstraints) -> BackendResult<Box<dyn CameraStream>> {
        let device = self.pick_device(constraints.facing)?;
        info!(device = %device, %constraints, "Opening V4L2 device");

        let dev = Device::with_path(&device.path).map_err(|e| map_io_error(&device.path, e))?;

        let mut negotiated = None;
        for wanted in PREFERRED_FORMATS {
            let mut format = dev.format().map_err(|e| map_io_error(&device.path, e))?;
            format.width = constraints.width;
            format.height = constraints.height;
            format.fourcc = v4l::FourCC::new(&wanted.fourcc());

            match dev.set_format(&format) {
                Ok(f) => match PixelFormat::from_fourcc(&f.fourcc.repr) {
                    Some(pixel_format) => {
                        info!(
                            width = f.width,
                            height = f.height,
                            fourcc = %pixel_format,
                            "Set V4L2 format"
                        );
                        negotiated = Some((f.width, f.height, pixel_format));
                        break;
                    }
                    None => debug!(fourcc = ?f.fourcc, "Driver substituted unsupported format"),
                },
                Err(e) => warn!(error = %e, fourcc = %wanted, "Could not set format"),
            }
        }

        let Some((width, height, format)) = negotiated else {
            return Err(DeviceError::Backend(format!(
                "{} offers no supported pixel format",
                device.path
            )));
        };

        let stream = MmapStream::with_buffers(&dev, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|e| map_io_error(&device.path, e))?;

        Ok(Box::new(V4l2Stream {
            device,
            _dev: dev,
            stream: Some(stream),
            width,
            height,
            format,
        }))
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::V4l2
    }

    fn is_available(&self) -> bool {
        Path::new("/dev").exists() && !self.enumerate_cameras().is_empty()
    }
}

struct V4l2Stream {
    device: CameraDevice,
    _dev: Device,
    stream: Option<MmapStream<'static>>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl CameraStream for V4l2Stream {
    fn grab_frame(&mut self) -> BackendResult<CameraFrame> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(DeviceError::Backend("stream stopped".to_string()));
        };
        let (buf, meta) = stream
            .next()
            .map_err(|e| map_io_error(&self.device.path, e))?;
        debug!(sequence = meta.sequence, bytes = buf.len(), "Grabbed V4L2 frame");

        Ok(CameraFrame {
            width: self.width,
            height: self.height,
            data: Arc::from(buf),
            format: self.format,
            captured_at: Instant::now(),
        })
    }

    fn stop(&mut self) {
        // Dropping the mmap stream issues STREAMOFF and unmaps the buffers
        if self.stream.take().is_some() {
            info!(device = %self.device, "V4L2 stream stopped");
        }
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    fn device(&self) -> &CameraDevice {
        &self.device
    }
}
