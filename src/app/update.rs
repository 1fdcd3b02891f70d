// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The `update()` function is a dispatcher; the handling code lives in the
//! `handlers` submodules:
//!
//! - `handlers::camera`: Start, retry, config changes, shutdown
//! - `handlers::capture`: Capture requests, countdown ticks, the capture cycle
//! - `handlers::overlays`: Filter, layout, sticker and caption lists

use super::PhotoBooth;
use super::state::{Message, Task};
use tracing::debug;

impl PhotoBooth {
    /// Handle one message and return any follow-up work
    pub async fn update(&mut self, message: Message) -> Task {
        if self.shut_down {
            debug!(?message, "Booth is shut down, ignoring message");
            return Task::none();
        }

        match message {
            // ===== Lifecycle =====
            Message::Start => self.handle_start().await,
            Message::Retry => self.handle_retry().await,
            Message::Shutdown => {
                self.shutdown();
                Task::none()
            }

            // ===== Capture =====
            Message::Capture => self.handle_capture().await,
            Message::CountdownTick { generation } => {
                self.handle_countdown_tick(generation).await
            }

            // ===== Settings =====
            Message::UpdateConfig(config) => self.handle_update_config(config).await,
            Message::SetFilter(filter) => self.handle_set_filter(filter),
            Message::SetLayout(layout) => self.handle_set_layout(layout),
            Message::SetStickers(stickers) => self.handle_set_stickers(stickers),
            Message::SetMessages(messages) => self.handle_set_messages(messages),
        }
    }
}
