// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles capture requests, the photo timer and the capture cycle itself.

use crate::app::PhotoBooth;
use crate::app::state::{BoothEvent, Message, Task};
use crate::pipelines::photo::{CollageOutcome, CountdownStart, FrameCapturer, TickOutcome};
use tracing::{debug, error, info};

impl PhotoBooth {
    pub(crate) async fn handle_capture(&mut self) -> Task {
        if !self.device.is_ready() {
            debug!(status = %self.device.status(), "Capture ignored: camera not ready");
            return Task::none();
        }

        match self.countdown.request(self.config.timer_seconds) {
            CountdownStart::FireNow => {
                self.run_capture_cycle().await;
                Task::none()
            }
            CountdownStart::Scheduled {
                remaining,
                generation,
                after,
            } => {
                info!(seconds = remaining, "Starting photo timer countdown");
                self.emit(BoothEvent::CountdownTick(remaining));
                Task::delay(after, Message::CountdownTick { generation })
            }
            CountdownStart::Ignored => Task::none(),
        }
    }

    pub(crate) async fn handle_countdown_tick(&mut self, generation: u64) -> Task {
        match self.countdown.tick(generation) {
            TickOutcome::Stale => Task::none(),
            TickOutcome::Continue {
                remaining,
                generation,
                after,
            } => {
                self.emit(BoothEvent::CountdownTick(remaining));
                Task::delay(after, Message::CountdownTick { generation })
            }
            TickOutcome::Fire => {
                self.emit(BoothEvent::CountdownTick(0));
                if self.device.is_ready() {
                    self.run_capture_cycle().await;
                } else {
                    debug!("Countdown finished but camera is not ready");
                }
                Task::none()
            }
        }
    }

    /// Capture one still and, if it completes the collage, finish and emit it
    async fn run_capture_cycle(&mut self) {
        if self.config.flash_enabled {
            self.emit(BoothEvent::Flash);
        }

        let Some(stream) = self.device.stream_mut() else {
            debug!("No stream to capture from");
            return;
        };

        let shot = match FrameCapturer::capture_still(stream, self.filter) {
            Ok(shot) => shot,
            Err(err) => {
                error!(error = %err, "Capture failed");
                self.emit(BoothEvent::CaptureFailed(err));
                return;
            }
        };

        let layout = self.collage.layout();
        let composite = match self.collage.add_shot(shot, layout) {
            CollageOutcome::NotYet { pending, required } => {
                info!(shot = pending, of = required, "Shot captured");
                self.emit(BoothEvent::ShotCaptured {
                    index: pending,
                    required,
                });
                return;
            }
            CollageOutcome::Ready(composite) => composite,
        };

        let required = layout.required_count();
        self.emit(BoothEvent::ShotCaptured {
            index: required,
            required,
        });

        let composited = self
            .compositor
            .apply_overlays(composite, &self.stickers, &self.messages)
            .await;
        for failure in &composited.failures {
            self.emit(BoothEvent::OverlayLoadFailed {
                overlay_id: failure.overlay_id.clone(),
                error: failure.error.to_string(),
            });
        }

        match self.emitter.emit(composited.raster).await {
            Ok(image) => {
                info!(
                    id = %image.id,
                    width = image.width,
                    height = image.height,
                    "Composite ready"
                );
                self.emit(BoothEvent::CompositeEmitted(image.clone()));
                (self.on_capture)(image);
            }
            Err(err) => {
                error!(error = %err, "Failed to encode composite");
                self.emit(BoothEvent::CaptureFailed(err));
            }
        }
    }
}
