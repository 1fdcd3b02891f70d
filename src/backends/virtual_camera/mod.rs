// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backend
//!
//! A synthetic camera that serves a test pattern, a solid color or a fixed
//! sequence of still images. It needs no hardware, so it backs the CLI's
//! `--virtual` mode and the test suite. It can also simulate an open that is
//! refused or slow, and it counts live streams so tests can verify that
//! reconfiguration never overlaps two of them. Clones share their open
//! behavior, so a refusal can be lifted while a booth holds the backend.

mod file_source;

pub use file_source::{load_image_source, raster_to_frame};

use crate::backends::camera::types::{
    BackendResult, CameraBackendType, CameraDevice, CameraFrame, StreamConstraints,
};
use crate::backends::camera::{CameraBackend, CameraStream};
use crate::config::Facing;
use crate::errors::DeviceError;
use crate::media::Raster;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// What the virtual camera shows
#[derive(Debug, Clone)]
pub enum FrameSource {
    /// Color bars at the requested resolution
    TestPattern,
    /// One color at the requested resolution
    Solid([u8; 4]),
    /// Still images at their own size, served in order and repeated
    Images(Vec<Raster>),
}

/// Stream bookkeeping shared by the backend and every stream it opens
#[derive(Debug, Default)]
pub struct StreamStats {
    open: AtomicUsize,
    max_concurrent: AtomicUsize,
    total_opened: AtomicUsize,
    frames: AtomicUsize,
}

impl StreamStats {
    /// Streams currently live
    pub fn open_streams(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live streams seen
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }

    /// Streams opened over the backend's lifetime
    pub fn total_opened(&self) -> usize {
        self.total_opened.load(Ordering::SeqCst)
    }

    /// Frames grabbed over the backend's lifetime
    pub fn frames_grabbed(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }

    fn opened(&self) {
        let now = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);
        self.total_opened.fetch_add(1, Ordering::SeqCst);
    }

    fn closed(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Synthetic camera backend
#[derive(Debug, Clone)]
pub struct VirtualCameraBackend {
    source: FrameSource,
    open_error: Arc<Mutex<Option<DeviceError>>>,
    open_delay: Duration,
    /// Opens left that still wait `open_delay`
    slow_opens: Arc<AtomicUsize>,
    stats: Arc<StreamStats>,
}

impl Default for VirtualCameraBackend {
    fn default() -> Self {
        Self::new(FrameSource::TestPattern)
    }
}

impl VirtualCameraBackend {
    pub fn new(source: FrameSource) -> Self {
        Self {
            source,
            open_error: Arc::new(Mutex::new(None)),
            open_delay: Duration::ZERO,
            slow_opens: Arc::new(AtomicUsize::new(0)),
            stats: Arc::new(StreamStats::default()),
        }
    }

    /// Serve a single still image
    pub fn from_image(raster: Raster) -> Self {
        Self::new(FrameSource::Images(vec![raster]))
    }

    /// Refuse every open with `error`
    pub fn with_open_error(self, error: DeviceError) -> Self {
        self.set_open_error(Some(error));
        self
    }

    /// Block for `delay` before answering an open
    pub fn with_open_delay(self, delay: Duration) -> Self {
        self.with_slow_opens(usize::MAX, delay)
    }

    /// Block for `delay` before answering only the next `count` opens
    pub fn with_slow_opens(mut self, count: usize, delay: Duration) -> Self {
        self.open_delay = delay;
        self.slow_opens.store(count, Ordering::SeqCst);
        self
    }

    /// Change how later opens answer; `None` lets them succeed
    pub fn set_open_error(&self, error: Option<DeviceError>) {
        *self.open_error.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }

    pub fn stats(&self) -> Arc<StreamStats> {
        Arc::clone(&self.stats)
    }

    fn device_for(facing: Facing) -> CameraDevice {
        match facing {
            Facing::User => CameraDevice {
                name: "Virtual Camera".to_string(),
                path: "virtual:0".to_string(),
                facing: Some(Facing::User),
            },
            Facing::Environment => CameraDevice {
                name: "Virtual Rear Camera".to_string(),
                path: "virtual:1".to_string(),
                facing: Some(Facing::Environment),
            },
        }
    }
}

impl CameraBackend for VirtualCameraBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        vec![
            Self::device_for(Facing::User),
            Self::device_for(Facing::Environment),
        ]
    }

    fn open(&self, constraints: &StreamConstraints) -> BackendResult<Box<dyn CameraStream>> {
        let slow = self
            .slow_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if slow && !self.open_delay.is_zero() {
            debug!(delay_ms = self.open_delay.as_millis() as u64, "Simulating slow open");
            std::thread::sleep(self.open_delay);
        }
        let refusal = self
            .open_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(err) = refusal {
            return Err(err);
        }
        if let FrameSource::Images(images) = &self.source
            && images.is_empty()
        {
            return Err(DeviceError::NotFound("virtual camera has no images".to_string()));
        }

        let device = Self::device_for(constraints.facing);
        info!(device = %device, %constraints, "Virtual camera stream opened");
        self.stats.opened();

        Ok(Box::new(VirtualStream {
            device,
            source: self.source.clone(),
            width: constraints.width,
            height: constraints.height,
            next_image: 0,
            active: true,
            stats: Arc::clone(&self.stats),
        }))
    }

    fn backend_type(&self) -> CameraBackendType {
        CameraBackendType::Virtual
    }

    fn is_available(&self) -> bool {
        true
    }
}

struct VirtualStream {
    device: CameraDevice,
    source: FrameSource,
    width: u32,
    height: u32,
    next_image: usize,
    active: bool,
    stats: Arc<StreamStats>,
}

impl CameraStream for VirtualStream {
    fn grab_frame(&mut self) -> BackendResult<CameraFrame> {
        if !self.active {
            return Err(DeviceError::Backend("stream stopped".to_string()));
        }
        self.stats.frames.fetch_add(1, Ordering::SeqCst);

        let frame = match &self.source {
            FrameSource::TestPattern => {
                raster_to_frame(&test_pattern(self.width, self.height))
            }
            FrameSource::Solid(color) => {
                raster_to_frame(&Raster::filled(self.width, self.height, *color))
            }
            FrameSource::Images(images) => {
                let frame = raster_to_frame(&images[self.next_image % images.len()]);
                self.next_image += 1;
                frame
            }
        };
        Ok(frame)
    }

    fn stop(&mut self) {
        if self.active {
            self.active = false;
            self.stats.closed();
            debug!(device = %self.device, "Virtual camera stream stopped");
        }
    }

    fn resolution(&self) -> (u32, u32) {
        match &self.source {
            FrameSource::Images(images) => images
                .get(self.next_image % images.len().max(1))
                .map(Raster::dimensions)
                .unwrap_or((self.width, self.height)),
            _ => (self.width, self.height),
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn device(&self) -> &CameraDevice {
        &self.device
    }
}

impl Drop for VirtualStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Eight vertical SMPTE-style color bars
fn test_pattern(width: u32, height: u32) -> Raster {
    const BARS: [[u8; 4]; 8] = [
        [255, 255, 255, 255],
        [255, 255, 0, 255],
        [0, 255, 255, 255],
        [0, 255, 0, 255],
        [255, 0, 255, 255],
        [255, 0, 0, 255],
        [0, 0, 255, 255],
        [0, 0, 0, 255],
    ];

    let mut raster = Raster::filled(width, height, [0, 0, 0, 255]);
    for x in 0..width {
        let bar = ((x as u64 * BARS.len() as u64) / width.max(1) as u64) as usize;
        for y in 0..height {
            raster.put_pixel(x, y, BARS[bar]);
        }
    }
    raster
}
