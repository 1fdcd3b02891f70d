// SPDX-License-Identifier: GPL-3.0-only

//! Raw frame to RGBA conversion
//!
//! YUV formats use BT.601 coefficients.

use super::PixelFormat;
use crate::media::Raster;

/// Convert a raw frame into an RGBA raster
///
/// Returns a description of the problem when the buffer does not hold a
/// complete frame of the stated format.
pub fn to_raster(
    format: PixelFormat,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<Raster, String> {
    let rgba = match format {
        PixelFormat::Rgba => {
            expect_len(data, width, height, 4)?;
            data[..(width * height * 4) as usize].to_vec()
        }
        PixelFormat::Rgb24 => {
            expect_len(data, width, height, 3)?;
            rgb_to_rgba(&data[..(width * height * 3) as usize])
        }
        PixelFormat::Yuyv => {
            expect_len(data, width, height, 2)?;
            yuyv_to_rgba(data, width, height)
        }
        PixelFormat::Uyvy => {
            expect_len(data, width, height, 2)?;
            uyvy_to_rgba(data, width, height)
        }
        PixelFormat::Mjpeg => return decode_mjpeg(data),
    };

    Raster::from_rgba(width, height, rgba)
        .ok_or_else(|| format!("{format} frame does not fill {width}x{height}"))
}

fn expect_len(data: &[u8], width: u32, height: u32, bytes_per_pixel: u32) -> Result<(), String> {
    let needed = (width as usize) * (height as usize) * (bytes_per_pixel as usize);
    if data.len() < needed {
        return Err(format!(
            "frame holds {} bytes, {width}x{height} needs {needed}",
            data.len()
        ));
    }
    Ok(())
}

#[inline]
fn yuv_to_rgb(y: f32, u: f32, v: f32) -> [u8; 3] {
    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
    [r, g, b]
}

/// Convert packed 4:2:2 samples to RGBA
///
/// `order` gives the byte offsets of (Y0, U, Y1, V) inside each 4-byte group.
fn packed_422_to_rgba(data: &[u8], width: u32, height: u32, order: [usize; 4]) -> Vec<u8> {
    let pixel_count = (width * height) as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);

    for chunk in data.chunks_exact(4) {
        let y0 = chunk[order[0]] as f32;
        let u = chunk[order[1]] as f32 - 128.0;
        let y1 = chunk[order[2]] as f32;
        let v = chunk[order[3]] as f32 - 128.0;

        for y in [y0, y1] {
            if rgba.len() >= pixel_count * 4 {
                return rgba;
            }
            let [r, g, b] = yuv_to_rgb(y, u, v);
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }

    rgba
}

/// Convert YUYV (Y0 U Y1 V) to RGBA
pub fn yuyv_to_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    packed_422_to_rgba(data, width, height, [0, 1, 2, 3])
}

/// Convert UYVY (U Y0 V Y1) to RGBA
pub fn uyvy_to_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    packed_422_to_rgba(data, width, height, [1, 0, 3, 2])
}

/// Convert RGB to RGBA by adding alpha=255
pub fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for chunk in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
    }
    rgba
}

/// Decode a single MJPEG frame
pub fn decode_mjpeg(data: &[u8]) -> Result<Raster, String> {
    image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
        .map(|img| Raster::from(img.to_rgba8()))
        .map_err(|e| format!("MJPEG decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_white_and_black() {
        // Y=255 then Y=0 with neutral chroma
        let yuyv = vec![255u8, 128, 0, 128];
        let rgba = yuyv_to_rgba(&yuyv, 2, 1);
        assert_eq!(rgba, vec![255, 255, 255, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_uyvy_matches_yuyv_reordered() {
        let yuyv = vec![80u8, 90, 200, 160];
        let uyvy = vec![90u8, 80, 160, 200];
        assert_eq!(yuyv_to_rgba(&yuyv, 2, 1), uyvy_to_rgba(&uyvy, 2, 1));
    }

    #[test]
    fn test_rgb_to_rgba() {
        let rgba = rgb_to_rgba(&[255, 128, 64, 0, 0, 0]);
        assert_eq!(rgba, vec![255, 128, 64, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_short_frame_is_rejected() {
        let err = to_raster(PixelFormat::Rgb24, &[0; 5], 2, 1).unwrap_err();
        assert!(err.contains("needs 6"));
    }

    #[test]
    fn test_mjpeg_round_trip() {
        let source = image::RgbImage::from_pixel(8, 8, image::Rgb([40, 200, 40]));
        let mut jpeg = Vec::new();
        image::DynamicImage::ImageRgb8(source)
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let raster = to_raster(PixelFormat::Mjpeg, &jpeg, 8, 8).unwrap();
        assert_eq!(raster.dimensions(), (8, 8));
        let [r, g, b, a] = raster.pixel(4, 4);
        assert!(r < 80 && g > 160 && b < 80);
        assert_eq!(a, 255);
    }
}
