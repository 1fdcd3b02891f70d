// SPDX-License-Identifier: GPL-3.0-only

//! Camera pixel formats and their conversion to RGBA
//!
//! Camera backends hand over frames in whatever layout the device negotiated.
//! Everything downstream of capture works on RGBA rasters, so this module
//! provides the conversions from the formats webcams commonly produce.

pub mod conversions;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel layout of a raw camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA, 4 bytes per pixel
    Rgba,
    /// 8-bit RGB, 3 bytes per pixel
    Rgb24,
    /// YUV 4:2:2, Y0 U Y1 V
    Yuyv,
    /// YUV 4:2:2, U Y0 V Y1
    Uyvy,
    /// Motion JPEG, one JPEG image per frame
    Mjpeg,
}

impl PixelFormat {
    /// V4L2 FourCC code for this format
    pub fn fourcc(self) -> [u8; 4] {
        match self {
            PixelFormat::Rgba => *b"AB24",
            PixelFormat::Rgb24 => *b"RGB3",
            PixelFormat::Yuyv => *b"YUYV",
            PixelFormat::Uyvy => *b"UYVY",
            PixelFormat::Mjpeg => *b"MJPG",
        }
    }

    /// Format for a V4L2 FourCC code, if supported
    pub fn from_fourcc(code: &[u8; 4]) -> Option<Self> {
        match code {
            b"AB24" | b"RGBA" => Some(PixelFormat::Rgba),
            b"RGB3" => Some(PixelFormat::Rgb24),
            b"YUYV" | b"YUY2" => Some(PixelFormat::Yuyv),
            b"UYVY" => Some(PixelFormat::Uyvy),
            b"MJPG" => Some(PixelFormat::Mjpeg),
            _ => None,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.fourcc();
        write!(f, "{}", String::from_utf8_lossy(&code))
    }
}
