// SPDX-License-Identifier: GPL-3.0-only

//! Filter, layout and overlay list handlers

use crate::app::PhotoBooth;
use crate::app::state::Task;
use crate::pipelines::photo::{CollageLayout, FilterKind, MessageOverlay, StickerOverlay};
use tracing::info;

impl PhotoBooth {
    /// Affects later shots only; buffered shots keep the filter they were taken with
    pub(crate) fn handle_set_filter(&mut self, filter: FilterKind) -> Task {
        info!(%filter, "Filter changed");
        self.filter = filter;
        Task::none()
    }

    pub(crate) fn handle_set_layout(&mut self, layout: CollageLayout) -> Task {
        self.collage.set_layout(layout);
        Task::none()
    }

    pub(crate) fn handle_set_stickers(&mut self, stickers: Vec<StickerOverlay>) -> Task {
        info!(count = stickers.len(), "Stickers updated");
        self.stickers = stickers;
        Task::none()
    }

    pub(crate) fn handle_set_messages(&mut self, messages: Vec<MessageOverlay>) -> Task {
        info!(count = messages.len(), "Messages updated");
        self.messages = messages;
        Task::none()
    }
}
