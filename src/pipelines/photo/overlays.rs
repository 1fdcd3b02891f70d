// SPDX-License-Identifier: GPL-3.0-only

//! Sticker and caption overlays
//!
//! Overlays are placed by percentage of the final composite, so the same
//! overlay list works for every layout. Sticker images load concurrently and
//! the compositor waits for all of them before drawing anything; a sticker
//! that fails to load is skipped and reported, it never blocks the composite.
//! Captions need a font file, resolved once on first use; without one they
//! are skipped and reported the same way.

use crate::constants::{DEFAULT_FONT_SIZE, DEFAULT_MESSAGE_COLOR};
use crate::errors::LoadError;
use crate::media::color::parse_color_or_white;
use crate::media::{CaptionFont, Canvas2D, Raster, RasterCanvas};
use futures::future::join_all;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a sticker image comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// Image file on disk
    Path(PathBuf),
    /// Encoded image bytes already in memory
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    /// Short label for logs and errors
    pub fn origin(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(Arc::from(bytes.into_boxed_slice()))
    }
}

/// A sticker placed on the composite
#[derive(Debug, Clone, PartialEq)]
pub struct StickerOverlay {
    pub id: String,
    pub source: ImageSource,
    /// Horizontal position, percent of composite width
    pub x: f32,
    /// Vertical position, percent of composite height
    pub y: f32,
}

impl StickerOverlay {
    pub fn new(source: impl Into<ImageSource>, x: f32, y: f32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source: source.into(),
            x,
            y,
        }
    }
}

/// A caption placed on the composite
#[derive(Debug, Clone, PartialEq)]
pub struct MessageOverlay {
    pub id: String,
    pub text: String,
    /// Horizontal position of the text start, percent of composite width
    pub x: f32,
    /// Baseline position, percent of composite height
    pub y: f32,
    /// CSS-style color string
    pub color: String,
    /// Font size in pixels
    pub font_size: u32,
}

impl MessageOverlay {
    /// Caption with the message panel defaults (white, 24 px)
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            x,
            y,
            color: DEFAULT_MESSAGE_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }
}

/// Map a percentage position onto a `width`×`height` surface
///
/// Percentages outside 0..=100 are clamped.
pub fn to_pixels(x_percent: f32, y_percent: f32, width: u32, height: u32) -> (i64, i64) {
    let x = (x_percent.clamp(0.0, 100.0) as f64 / 100.0 * width as f64).floor();
    let y = (y_percent.clamp(0.0, 100.0) as f64 / 100.0 * height as f64).floor();
    (x as i64, y as i64)
}

/// A sticker or caption that could not be drawn
#[derive(Debug)]
pub struct OverlayFailure {
    /// Id of the sticker or message overlay
    pub overlay_id: String,
    pub error: LoadError,
}

/// Result of compositing overlays
#[derive(Debug)]
pub struct Composited {
    pub raster: Raster,
    /// Overlays skipped because they could not be drawn
    pub failures: Vec<OverlayFailure>,
}

/// Load and decode a sticker image, bounded by `timeout`
pub async fn load_sticker(source: ImageSource, timeout: Duration) -> Result<Raster, LoadError> {
    let origin = source.origin();
    debug!(%origin, "Loading sticker");

    let task_origin = origin.clone();
    let task = tokio::task::spawn_blocking(move || decode_source(&source, &task_origin));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(LoadError::Task {
            origin,
            message: join_err.to_string(),
        }),
        Err(_) => Err(LoadError::Timeout {
            origin,
            millis: timeout.as_millis() as u64,
        }),
    }
}

fn decode_source(source: &ImageSource, origin: &str) -> Result<Raster, LoadError> {
    let decoded = match source {
        ImageSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(|e| LoadError::Read {
                path: path.clone(),
                source: e,
            })?;
            image::load_from_memory(&bytes)
        }
        ImageSource::Bytes(bytes) => image::load_from_memory(bytes),
    };

    decoded
        .map(|img| Raster::from(img.to_rgba8()))
        .map_err(|e| LoadError::Decode {
            origin: origin.to_string(),
            message: e.to_string(),
        })
}

#[derive(Debug)]
enum FontSlot {
    /// Not looked up yet; holds the configured path, if any
    Unresolved(Option<PathBuf>),
    Ready(CaptionFont),
    Missing,
}

/// Draws stickers and captions on top of a finished composite
#[derive(Debug)]
pub struct OverlayCompositor {
    sticker_size: u32,
    load_timeout: Duration,
    cache: HashMap<ImageSource, Arc<Raster>>,
    font: FontSlot,
}

impl OverlayCompositor {
    /// # Arguments
    /// * `sticker_size` - Side of the square footprint stickers are drawn at
    /// * `load_timeout` - Upper bound on loading one sticker image
    pub fn new(sticker_size: u32, load_timeout: Duration) -> Self {
        Self {
            sticker_size,
            load_timeout,
            cache: HashMap::new(),
            font: FontSlot::Unresolved(None),
        }
    }

    /// Draw captions with the font file at `path` instead of a system font
    pub fn with_caption_font(mut self, path: Option<PathBuf>) -> Self {
        self.font = FontSlot::Unresolved(path);
        self
    }

    /// Draw captions with an already loaded font
    pub fn with_loaded_font(mut self, font: CaptionFont) -> Self {
        self.font = FontSlot::Ready(font);
        self
    }

    /// Number of decoded sticker images kept
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Draw `stickers` then `messages`, each in list order
    ///
    /// The returned raster has the same size as `composite`.
    pub async fn apply_overlays(
        &mut self,
        composite: Raster,
        stickers: &[StickerOverlay],
        messages: &[MessageOverlay],
    ) -> Composited {
        if stickers.is_empty() && messages.is_empty() {
            return Composited {
                raster: composite,
                failures: Vec::new(),
            };
        }

        let images = self.load_all(stickers).await;
        let font = if messages.is_empty() {
            None
        } else {
            self.caption_font().await
        };
        let (width, height) = composite.dimensions();
        let mut canvas = RasterCanvas::from_raster(composite);
        let mut failures = Vec::new();

        for (sticker, image) in stickers.iter().zip(images) {
            match image {
                Ok(image) => {
                    let (x, y) = to_pixels(sticker.x, sticker.y, width, height);
                    canvas.draw_raster_scaled(&image, x, y, self.sticker_size, self.sticker_size);
                }
                Err(error) => {
                    warn!(sticker = %sticker.id, error = %error, "Skipping sticker");
                    failures.push(OverlayFailure {
                        overlay_id: sticker.id.clone(),
                        error,
                    });
                }
            }
        }

        for message in messages {
            let Some(font) = &font else {
                warn!(message = %message.id, "Skipping caption without a font");
                failures.push(OverlayFailure {
                    overlay_id: message.id.clone(),
                    error: LoadError::NoFont,
                });
                continue;
            };
            let (x, y) = to_pixels(message.x, message.y, width, height);
            let color = parse_color_or_white(&message.color);
            canvas.draw_text(font, &message.text, x, y, color, message.font_size);
        }

        info!(
            overlays = stickers.len() + messages.len() - failures.len(),
            skipped = failures.len(),
            "Overlays applied"
        );

        Composited {
            raster: canvas.into_raster(),
            failures,
        }
    }

    /// The caption font, looked up on first call
    async fn caption_font(&mut self) -> Option<CaptionFont> {
        if let FontSlot::Unresolved(path) = &self.font {
            self.font = match CaptionFont::resolve(path.as_deref()).await {
                Some(font) => FontSlot::Ready(font),
                None => FontSlot::Missing,
            };
        }
        match &self.font {
            FontSlot::Ready(font) => Some(font.clone()),
            _ => None,
        }
    }

    /// Resolve every sticker image, loading uncached ones concurrently
    async fn load_all(&mut self, stickers: &[StickerOverlay]) -> Vec<Result<Arc<Raster>, LoadError>> {
        let timeout = self.load_timeout;
        let loads = stickers.iter().map(|sticker| {
            let cached = self.cache.get(&sticker.source).cloned();
            let source = sticker.source.clone();
            async move {
                match cached {
                    Some(image) => Ok(image),
                    None => load_sticker(source, timeout).await.map(Arc::new),
                }
            }
        });
        let results = join_all(loads).await;

        for (sticker, result) in stickers.iter().zip(&results) {
            if let Ok(image) = result {
                self.cache
                    .entry(sticker.source.clone())
                    .or_insert_with(|| Arc::clone(image));
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let mut out = Vec::new();
        image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn positions_map_to_composite_pixels() {
        assert_eq!(to_pixels(50.0, 50.0, 200, 200), (100, 100));
        assert_eq!(to_pixels(0.0, 100.0, 640, 480), (0, 480));
        assert_eq!(to_pixels(-5.0, 150.0, 100, 100), (0, 100));
    }

    #[tokio::test]
    async fn sticker_is_drawn_at_footprint() {
        let mut compositor = OverlayCompositor::new(10, Duration::from_secs(5));
        let sticker = StickerOverlay::new(png_bytes(2, 2, [255, 0, 0, 255]), 50.0, 50.0);

        let out = compositor
            .apply_overlays(Raster::filled(40, 40, [0, 0, 0, 255]), &[sticker], &[])
            .await;

        assert!(out.failures.is_empty());
        assert_eq!(out.raster.dimensions(), (40, 40));
        assert_eq!(out.raster.pixel(20, 20), [255, 0, 0, 255]);
        assert_eq!(out.raster.pixel(29, 29), [255, 0, 0, 255]);
        assert_eq!(out.raster.pixel(30, 30), [0, 0, 0, 255]);
        assert_eq!(out.raster.pixel(19, 19), [0, 0, 0, 255]);
    }

    #[tokio::test]
    async fn broken_sticker_is_skipped() {
        let mut compositor = OverlayCompositor::new(4, Duration::from_secs(5));
        let broken = StickerOverlay::new(b"not an image".to_vec(), 0.0, 0.0);
        let good = StickerOverlay::new(png_bytes(1, 1, [0, 255, 0, 255]), 50.0, 0.0);

        let out = compositor
            .apply_overlays(
                Raster::filled(8, 8, [0, 0, 0, 255]),
                &[broken.clone(), good],
                &[],
            )
            .await;

        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].overlay_id, broken.id);
        assert!(matches!(out.failures[0].error, LoadError::Decode { .. }));
        assert_eq!(out.raster.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(out.raster.pixel(4, 0), [0, 255, 0, 255]);
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = load_sticker(
            ImageSource::Path(PathBuf::from("/nonexistent/sticker.png")),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[tokio::test]
    async fn loaded_stickers_are_cached() {
        let mut compositor = OverlayCompositor::new(2, Duration::from_secs(5));
        let sticker = StickerOverlay::new(png_bytes(1, 1, [1, 2, 3, 255]), 0.0, 0.0);
        let stickers = [sticker.clone(), sticker];

        compositor
            .apply_overlays(Raster::filled(4, 4, [0, 0, 0, 255]), &stickers, &[])
            .await;
        assert_eq!(compositor.cached(), 1);
    }

    #[tokio::test]
    async fn messages_draw_over_stickers() {
        let Some(font) = CaptionFont::resolve(None).await else {
            eprintln!("no system font installed; skipping");
            return;
        };
        let mut compositor =
            OverlayCompositor::new(40, Duration::from_secs(5)).with_loaded_font(font);
        let sticker = StickerOverlay::new(png_bytes(1, 1, [0, 0, 255, 255]), 0.0, 0.0);
        // Left stem of a 200 px "H" starts about a tenth of an em in
        let message = MessageOverlay::new("H", 0.0, 100.0)
            .with_color("#ff0000")
            .with_font_size(200);

        let out = compositor
            .apply_overlays(Raster::filled(40, 40, [0, 0, 0, 255]), &[sticker], &[message])
            .await;

        assert!(out.failures.is_empty());
        assert_eq!(out.raster.pixel(5, 20), [0, 0, 255, 255]);
        assert_eq!(out.raster.pixel(28, 20), [255, 0, 0, 255]);
    }

    #[tokio::test]
    async fn captions_without_a_font_are_reported() {
        let mut compositor = OverlayCompositor::new(4, Duration::from_secs(5));
        compositor.font = FontSlot::Missing;
        let message = MessageOverlay::new("hello", 10.0, 50.0);

        let out = compositor
            .apply_overlays(Raster::filled(8, 8, [0, 0, 0, 255]), &[], &[message.clone()])
            .await;

        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].overlay_id, message.id);
        assert!(matches!(out.failures[0].error, LoadError::NoFont));
        assert_eq!(out.raster, Raster::filled(8, 8, [0, 0, 0, 255]));
    }
}
