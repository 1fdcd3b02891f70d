// SPDX-License-Identifier: GPL-3.0-only

//! Photo booth - capture, filter and composite pipeline
//!
//! This library provides a camera-to-composite pipeline: device acquisition,
//! a photo timer, per-shot filters, vertical collages and sticker and caption
//! overlays, ending in an encoded PNG handed to a gallery callback.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: The [`PhotoBooth`] context, its messages and the async runtime driving it
//! - [`backends`]: Camera backend abstraction (virtual camera, V4L2)
//! - [`media`]: Rasters, pixel format conversion and the drawing canvas
//! - [`pipelines`]: The photo pipeline stages
//! - [`gallery`]: Captured image collection, export and grid collages
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```no_run
//! use photobooth::app::{self, Message, PhotoBooth};
//! use photobooth::backends::virtual_camera::VirtualCameraBackend;
//! use photobooth::Config;
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let booth = PhotoBooth::new(
//!     Arc::new(VirtualCameraBackend::default()),
//!     &Config::default(),
//!     |image| println!("captured {}", image.file_name()),
//! );
//! let handle = app::spawn(booth);
//! handle.send(Message::Start).ok();
//! handle.send(Message::Capture).ok();
//! # }
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gallery;
pub mod media;
pub mod pipelines;

// Re-export commonly used types
pub use app::{BoothEvent, Message, PhotoBooth};
pub use config::{CameraConfig, Config};
pub use gallery::{Gallery, GridTemplate};
pub use pipelines::photo::{CapturedImage, CollageLayout, FilterKind};
