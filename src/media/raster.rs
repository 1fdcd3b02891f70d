// SPDX-License-Identifier: GPL-3.0-only

//! RGBA raster shared by every pipeline stage

use image::{Rgba, RgbaImage, imageops};

/// A width×height grid of RGBA samples, one byte per channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Raster filled with a single color
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(color)),
        }
    }

    /// Wrap tightly packed RGBA bytes
    ///
    /// Returns `None` when `data` is shorter than `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, data).map(|image| Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// RGBA sample at (x, y)
    ///
    /// # Panics
    /// If the coordinate is outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        self.image.put_pixel(x, y, Rgba(rgba));
    }

    /// All samples, row-major RGBA
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Mutable samples, row-major RGBA
    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Copy scaled to exactly `width`×`height`
    pub fn resized(&self, width: u32, height: u32) -> Raster {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        Raster {
            image: imageops::resize(&self.image, width, height, imageops::FilterType::Triangle),
        }
    }
}

impl From<RgbaImage> for Raster {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}
