// SPDX-License-Identifier: GPL-3.0-only

//! Photo booth context
//!
//! [`PhotoBooth`] owns every pipeline component and reacts to [`Message`]s
//! one at a time. It never sleeps or spawns timers itself: delayed work such
//! as countdown ticks is returned as a [`Task`] for the driver to schedule
//! (see [`runtime`]).
//!
//! # Message flow
//!
//! ```text
//! Start ──► open camera ──► Ready
//! Capture ──► countdown ──► CountdownTick … ──► capture cycle
//!                                                 │
//!             filter ◄── still ◄──────────────────┘
//!               │
//!               ▼
//!         collage buffer ──(quota met)──► overlays ──► PNG ──► on_capture
//! ```

mod handlers;
pub mod runtime;
pub mod state;
mod update;

pub use runtime::{BoothClosed, BoothHandle, MessageSender, spawn};
pub use state::{BoothEvent, Message, Task};

use crate::backends::camera::types::DeviceStatus;
use crate::backends::camera::{CameraBackend, DeviceAcquisition};
use crate::config::{CameraConfig, Config};
use crate::pipelines::photo::{
    CapturedImage, CollageAssembler, CollageLayout, CountdownController, CountdownState,
    FilterKind, MessageOverlay, OutputEmitter, OverlayCompositor, StickerOverlay,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// Gallery callback, invoked once per finished composite
pub type CaptureCallback = Box<dyn FnMut(CapturedImage) + Send>;

/// The explicit pipeline context
pub struct PhotoBooth {
    config: CameraConfig,
    filter: FilterKind,
    stickers: Vec<StickerOverlay>,
    messages: Vec<MessageOverlay>,
    device: DeviceAcquisition,
    countdown: CountdownController,
    collage: CollageAssembler,
    compositor: OverlayCompositor,
    emitter: OutputEmitter,
    on_capture: CaptureCallback,
    events: Option<UnboundedSender<BoothEvent>>,
    started: bool,
    shut_down: bool,
}

impl PhotoBooth {
    /// Create a booth over `backend` using persisted `settings`
    ///
    /// The camera is not opened until [`Message::Start`].
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        settings: &Config,
        on_capture: impl FnMut(CapturedImage) + Send + 'static,
    ) -> Self {
        info!(
            backend = %backend.backend_type(),
            filter = %settings.filter,
            layout = %settings.layout,
            "Creating photo booth"
        );

        Self {
            config: settings.camera,
            filter: settings.filter,
            stickers: Vec::new(),
            messages: Vec::new(),
            device: DeviceAcquisition::new(backend, settings.device_open_timeout()),
            countdown: CountdownController::new(),
            collage: CollageAssembler::new(settings.layout),
            compositor: OverlayCompositor::new(
                settings.sticker_size,
                settings.sticker_load_timeout(),
            )
            .with_caption_font(settings.caption_font.clone()),
            emitter: OutputEmitter::new(),
            on_capture: Box::new(on_capture),
            events: None,
            started: false,
            shut_down: false,
        }
    }

    /// Report status events on `events`
    pub fn with_events(mut self, events: UnboundedSender<BoothEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn layout(&self) -> CollageLayout {
        self.collage.layout()
    }

    pub fn stickers(&self) -> &[StickerOverlay] {
        &self.stickers
    }

    pub fn messages(&self) -> &[MessageOverlay] {
        &self.messages
    }

    pub fn device_status(&self) -> &DeviceStatus {
        self.device.status()
    }

    pub fn countdown_state(&self) -> CountdownState {
        self.countdown.state()
    }

    /// Shots waiting for the current collage, and how many it needs
    pub fn collage_progress(&self) -> (usize, usize) {
        (self.collage.pending(), self.collage.required())
    }

    /// Whether the capture button is enabled
    pub fn can_capture(&self) -> bool {
        !self.shut_down && self.device.is_ready() && self.countdown.is_idle()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Cancel pending work and release the camera
    ///
    /// Idempotent; the stream is released at most once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        info!("Shutting down photo booth");
        self.countdown.cancel();
        self.collage.reset();
        self.device.close();
        self.shut_down = true;
        self.emit(BoothEvent::DeviceStatus(self.device.status().clone()));
    }

    fn emit(&self, event: BoothEvent) {
        if let Some(events) = &self.events {
            // Observers may have gone away; the booth keeps working without them
            let _ = events.send(event);
        }
    }

    fn emit_device_status(&self) {
        self.emit(BoothEvent::DeviceStatus(self.device.status().clone()));
    }
}

impl std::fmt::Debug for PhotoBooth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoBooth")
            .field("config", &self.config)
            .field("filter", &self.filter)
            .field("layout", &self.collage.layout())
            .field("device", &self.device)
            .field("countdown", &self.countdown.state())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}
