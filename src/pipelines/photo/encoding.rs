// SPDX-License-Identifier: GPL-3.0-only

//! PNG encoding of finished composites
//!
//! The emitter turns a composite raster into an immutable [`CapturedImage`]
//! handle. Encoding runs on the blocking pool since it is CPU-bound.

use crate::constants::EXPORT_FILE_PREFIX;
use crate::errors::PhotoError;
use crate::media::Raster;
use chrono::{DateTime, Utc};
use image::ImageFormat;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Encoded composite handed to the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub id: Uuid,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
    /// PNG bytes
    pub data: Arc<[u8]>,
}

impl CapturedImage {
    /// Suggested file name, `photobooth-<unix millis>.png`
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.png",
            EXPORT_FILE_PREFIX,
            self.captured_at.timestamp_millis()
        )
    }

    /// Decode back to a raster
    pub fn decode(&self) -> Result<Raster, PhotoError> {
        image::load_from_memory_with_format(&self.data, ImageFormat::Png)
            .map(|img| Raster::from(img.to_rgba8()))
            .map_err(|e| PhotoError::DecodingFailed(e.to_string()))
    }

    /// Size of the encoded data in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Encode a raster as PNG
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, PhotoError> {
    let mut buffer = Vec::new();
    raster
        .as_image()
        .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| PhotoError::EncodingFailed(format!("PNG encoding failed: {e}")))?;
    Ok(buffer)
}

/// Serializes composites into [`CapturedImage`] handles
#[derive(Debug, Default, Clone, Copy)]
pub struct OutputEmitter;

impl OutputEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Encode `raster` into a new handle stamped with the current time
    pub async fn emit(&self, raster: Raster) -> Result<CapturedImage, PhotoError> {
        let (width, height) = raster.dimensions();
        info!(width, height, "Encoding composite");

        let data = tokio::task::spawn_blocking(move || encode_png(&raster))
            .await
            .map_err(|e| PhotoError::EncodingFailed(format!("Encoding task error: {e}")))??;

        debug!(size = data.len(), "Encoding complete");

        Ok(CapturedImage {
            id: Uuid::new_v4(),
            width,
            height,
            captured_at: Utc::now(),
            data: Arc::from(data.into_boxed_slice()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn emitted_image_decodes_losslessly() {
        let mut raster = Raster::filled(3, 2, [10, 20, 30, 255]);
        raster.put_pixel(2, 1, [200, 100, 50, 128]);

        let image = OutputEmitter::new().emit(raster.clone()).await.unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert!(image.data.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(image.decode().unwrap(), raster);
    }

    #[tokio::test]
    async fn every_emit_gets_a_fresh_id() {
        let emitter = OutputEmitter::new();
        let a = emitter.emit(Raster::filled(1, 1, [0; 4])).await.unwrap();
        let b = emitter.emit(Raster::filled(1, 1, [0; 4])).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn file_name_uses_unix_millis() {
        let image = CapturedImage {
            id: Uuid::nil(),
            width: 1,
            height: 1,
            captured_at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            data: Arc::from(Vec::new().into_boxed_slice()),
        };
        assert_eq!(image.file_name(), "photobooth-1700000000123.png");
        assert!(image.decode().is_err());
    }
}
