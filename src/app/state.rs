// SPDX-License-Identifier: GPL-3.0-only

//! Booth messages, tasks and status events

use crate::backends::camera::types::DeviceStatus;
use crate::config::CameraConfig;
use crate::errors::PhotoError;
use crate::pipelines::photo::{
    CapturedImage, CollageLayout, FilterKind, MessageOverlay, StickerOverlay,
};
use std::time::Duration;

/// Inputs to the booth context
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Lifecycle =====
    /// Open the camera with the current config
    Start,
    /// Reopen after a failure, with the current config
    Retry,
    /// Cancel timers, release the camera, ignore everything afterwards
    Shutdown,

    // ===== Capture =====
    /// The capture button was pressed
    Capture,
    /// A scheduled countdown tick
    CountdownTick { generation: u64 },

    // ===== Settings =====
    /// New camera settings from the settings panel
    UpdateConfig(CameraConfig),
    /// Select the filter applied to subsequent shots
    SetFilter(FilterKind),
    /// Select the collage layout; discards a partially filled collage
    SetLayout(CollageLayout),
    /// Replace the sticker list
    SetStickers(Vec<StickerOverlay>),
    /// Replace the caption list
    SetMessages(Vec<MessageOverlay>),
}

/// Follow-up work returned by `update`
#[derive(Debug, Clone)]
#[must_use]
pub enum Task {
    /// Nothing to schedule
    None,
    /// Deliver `message` back to the booth after `after`
    Delay { after: Duration, message: Message },
}

impl Task {
    pub fn none() -> Self {
        Task::None
    }

    /// Create a delayed task that sends a message after the given duration
    pub fn delay(after: Duration, message: Message) -> Self {
        Task::Delay { after, message }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Task::None)
    }
}

/// Status reported to observers (countdown display, capture button, toasts)
#[derive(Debug, Clone)]
pub enum BoothEvent {
    /// Device acquisition changed state
    DeviceStatus(DeviceStatus),
    /// Seconds left on the photo timer
    CountdownTick(u32),
    /// Flash overlay should be shown for this shot
    Flash,
    /// A shot entered the collage buffer; `index` is 1-based
    ShotCaptured { index: usize, required: usize },
    /// A composite was finished and handed to the gallery
    CompositeEmitted(CapturedImage),
    /// A sticker or caption was skipped: its image failed to load, or no
    /// caption font is available
    OverlayLoadFailed { overlay_id: String, error: String },
    /// A capture cycle was abandoned
    CaptureFailed(PhotoError),
}
