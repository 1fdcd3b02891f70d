// SPDX-License-Identifier: GPL-3.0-only

//! Still-image sources for the virtual camera

use crate::backends::camera::types::{BackendResult, CameraFrame};
use crate::errors::DeviceError;
use crate::media::Raster;
use std::path::Path;
use tracing::info;

/// Load an image file as a raster the virtual camera can serve
///
/// Supports the formats the `image` crate decodes by default (PNG, JPEG, GIF,
/// BMP, WebP and others).
pub fn load_image_source(path: &Path) -> BackendResult<Raster> {
    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        DeviceError::Backend(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let raster = Raster::from(img.to_rgba8());
    info!(
        width = raster.width(),
        height = raster.height(),
        "Image loaded successfully"
    );
    Ok(raster)
}

/// Turn a raster into an RGBA camera frame
pub fn raster_to_frame(raster: &Raster) -> CameraFrame {
    CameraFrame::rgba(raster.width(), raster.height(), raster.as_raw().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_backend_error() {
        let err = load_image_source(Path::new("/nonexistent/photo.png")).unwrap_err();
        assert!(matches!(err, DeviceError::Backend(_)));
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let raster = load_image_source(&path).unwrap();
        assert_eq!(raster.dimensions(), (3, 2));
        let frame = raster_to_frame(&raster);
        assert_eq!(frame.data.len(), 3 * 2 * 4);
    }
}
