// SPDX-License-Identifier: GPL-3.0-only

//! Drawing capability used by collage assembly and overlays

use super::color::Rgba;
use super::raster::Raster;
use super::text::CaptionFont;
use image::imageops;

/// Minimal 2D drawing surface
///
/// Coordinates are signed so callers can place content partially off-canvas;
/// anything outside the surface is clipped.
pub trait Canvas2D {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Fill the whole surface with one color
    fn fill(&mut self, color: Rgba);

    /// Draw `raster` at its natural size with its top-left corner at (x, y)
    fn draw_sub_raster(&mut self, raster: &Raster, x: i64, y: i64);

    /// Draw `raster` scaled to `width`×`height` at (x, y)
    fn draw_raster_scaled(&mut self, raster: &Raster, x: i64, y: i64, width: u32, height: u32);

    /// Draw text in `font` whose first baseline starts at (x, baseline)
    fn draw_text(
        &mut self,
        font: &CaptionFont,
        text: &str,
        x: i64,
        baseline: i64,
        color: Rgba,
        font_px: u32,
    );

    /// Finish drawing and take the pixels
    fn into_raster(self) -> Raster;
}

/// Software canvas over an owned [`Raster`]
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    target: Raster,
}

impl RasterCanvas {
    /// Blank canvas filled with `background`
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            target: Raster::filled(width, height, background),
        }
    }

    /// Canvas that draws on top of an existing raster
    pub fn from_raster(raster: Raster) -> Self {
        Self { target: raster }
    }

    pub fn raster(&self) -> &Raster {
        &self.target
    }
}

impl Canvas2D for RasterCanvas {
    fn width(&self) -> u32 {
        self.target.width()
    }

    fn height(&self) -> u32 {
        self.target.height()
    }

    fn fill(&mut self, color: Rgba) {
        for pixel in self.target.as_image_mut().pixels_mut() {
            *pixel = image::Rgba(color);
        }
    }

    fn draw_sub_raster(&mut self, raster: &Raster, x: i64, y: i64) {
        imageops::overlay(self.target.as_image_mut(), raster.as_image(), x, y);
    }

    fn draw_raster_scaled(&mut self, raster: &Raster, x: i64, y: i64, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let scaled = raster.resized(width, height);
        self.draw_sub_raster(&scaled, x, y);
    }

    fn draw_text(
        &mut self,
        font: &CaptionFont,
        text: &str,
        x: i64,
        baseline: i64,
        color: Rgba,
        font_px: u32,
    ) {
        let (width, height) = self.target.dimensions();
        if let Some(patch) = font.rasterize(text, font_px, color, x, baseline, width, height) {
            self.draw_sub_raster(&patch.raster, patch.x, patch.y);
        }
    }

    fn into_raster(self) -> Raster {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];
    const BLACK: Rgba = [0, 0, 0, 255];

    #[test]
    fn sub_raster_is_clipped_at_edges() {
        let mut canvas = RasterCanvas::new(4, 4, BLACK);
        canvas.draw_sub_raster(&Raster::filled(3, 3, RED), -1, 2);
        let out = canvas.into_raster();
        assert_eq!(out.pixel(0, 2), RED);
        assert_eq!(out.pixel(1, 3), RED);
        assert_eq!(out.pixel(2, 2), BLACK);
        assert_eq!(out.pixel(0, 1), BLACK);
    }

    #[test]
    fn translucent_sub_raster_blends() {
        let mut canvas = RasterCanvas::new(1, 1, BLACK);
        canvas.draw_sub_raster(&Raster::filled(1, 1, [255, 255, 255, 0]), 0, 0);
        assert_eq!(canvas.raster().pixel(0, 0), BLACK);
    }

    #[test]
    fn scaled_raster_covers_target_rect() {
        let mut canvas = RasterCanvas::new(10, 10, BLACK);
        canvas.draw_raster_scaled(&Raster::filled(2, 2, RED), 5, 5, 5, 5);
        let out = canvas.into_raster();
        assert_eq!(out.pixel(5, 5), RED);
        assert_eq!(out.pixel(9, 9), RED);
        assert_eq!(out.pixel(4, 4), BLACK);
    }

    #[tokio::test]
    async fn text_is_blended_and_clipped() {
        let Some(font) = CaptionFont::resolve(None).await else {
            eprintln!("no system font installed; skipping");
            return;
        };
        // At 400 px the left stem of "H" is wider than the whole canvas
        let mut canvas = RasterCanvas::new(30, 30, BLACK);
        canvas.draw_text(&font, "H", -50, 25, RED, 400);
        let out = canvas.into_raster();
        assert_eq!(out.dimensions(), (30, 30));
        assert_eq!(out.pixel(5, 5), RED);
        assert_eq!(out.pixel(5, 29), BLACK);
    }
}
