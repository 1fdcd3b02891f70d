// SPDX-License-Identifier: GPL-3.0-only

//! Camera lifecycle handlers

use crate::app::PhotoBooth;
use crate::app::state::{BoothEvent, Task};
use crate::backends::camera::types::{BackendResult, DeviceStatus};
use crate::config::CameraConfig;
use tracing::{debug, info, warn};

impl PhotoBooth {
    pub(crate) async fn handle_start(&mut self) -> Task {
        if self.started && self.device.is_ready() {
            debug!("Camera already started");
            return Task::none();
        }
        self.started = true;
        self.emit(BoothEvent::DeviceStatus(DeviceStatus::Opening));
        let result = self.device.open(self.config.constraints()).await;
        self.report_open(result);
        Task::none()
    }

    /// Explicit user retry after a failure; there is no automatic retry
    ///
    /// Reuses the constraints of the last request, or the current config
    /// when nothing has been requested yet.
    pub(crate) async fn handle_retry(&mut self) -> Task {
        info!(status = %self.device.status(), "Retrying camera");
        self.started = true;
        self.countdown.cancel();
        self.emit(BoothEvent::DeviceStatus(DeviceStatus::Opening));
        let result = if self.device.constraints().is_some() {
            self.device.retry().await
        } else {
            self.device.open(self.config.constraints()).await
        };
        self.report_open(result);
        Task::none()
    }

    pub(crate) async fn handle_update_config(&mut self, config: CameraConfig) -> Task {
        let reopen = self.config.requires_reopen(&config);
        info!(
            resolution = ?config.resolution,
            facing = ?config.facing,
            timer = config.timer_seconds,
            flash = config.flash_enabled,
            reopen,
            "Camera config changed"
        );
        self.config = config;

        if reopen && self.started {
            // The stream a running countdown would capture from is going away
            self.countdown.cancel();
            self.emit(BoothEvent::DeviceStatus(DeviceStatus::Opening));
            let result = self.device.reconfigure(self.config.constraints()).await;
            self.report_open(result);
        }
        Task::none()
    }

    fn report_open(&self, result: BackendResult<()>) {
        if let Err(err) = result {
            warn!(error = %err, "Camera unavailable; waiting for retry");
        }
        self.emit_device_status();
    }
}
