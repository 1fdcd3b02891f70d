// SPDX-License-Identifier: GPL-3.0-only

//! In-memory gallery of finished composites
//!
//! The gallery is the `on_capture` collaborator of the booth. It keeps
//! captured images in order, exports them to disk on request and builds grid
//! collages out of them.

use crate::constants::{GALLERY_BACKGROUND, GALLERY_CELL_SIZE};
use crate::errors::{AppResult, PhotoError};
use crate::media::{Canvas2D, Raster, RasterCanvas};
use crate::pipelines::photo::{CapturedImage, OutputEmitter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Grid arrangement for gallery collages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridTemplate {
    #[serde(rename = "1x2")]
    OneByTwo,
    #[serde(rename = "2x2")]
    TwoByTwo,
    #[serde(rename = "3x3")]
    ThreeByThree,
    /// One column of three
    #[serde(rename = "vertical")]
    VerticalStrip,
    /// One row of three
    #[serde(rename = "horizontal")]
    HorizontalStrip,
}

impl GridTemplate {
    pub const ALL: [GridTemplate; 5] = [
        GridTemplate::OneByTwo,
        GridTemplate::TwoByTwo,
        GridTemplate::ThreeByThree,
        GridTemplate::VerticalStrip,
        GridTemplate::HorizontalStrip,
    ];

    /// (columns, rows)
    pub fn grid(self) -> (u32, u32) {
        match self {
            GridTemplate::OneByTwo => (1, 2),
            GridTemplate::TwoByTwo => (2, 2),
            GridTemplate::ThreeByThree => (3, 3),
            GridTemplate::VerticalStrip => (1, 3),
            GridTemplate::HorizontalStrip => (3, 1),
        }
    }

    /// Number of cells; extra images are left out
    pub fn capacity(self) -> usize {
        let (cols, rows) = self.grid();
        (cols * rows) as usize
    }

    pub fn id(self) -> &'static str {
        match self {
            GridTemplate::OneByTwo => "1x2",
            GridTemplate::TwoByTwo => "2x2",
            GridTemplate::ThreeByThree => "3x3",
            GridTemplate::VerticalStrip => "vertical",
            GridTemplate::HorizontalStrip => "horizontal",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GridTemplate::OneByTwo => "1×2 Grid",
            GridTemplate::TwoByTwo => "2×2 Grid",
            GridTemplate::ThreeByThree => "3×3 Grid",
            GridTemplate::VerticalStrip => "Vertical Strip",
            GridTemplate::HorizontalStrip => "Horizontal Strip",
        }
    }
}

impl std::fmt::Display for GridTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GridTemplate {
    type Err = crate::errors::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        GridTemplate::ALL
            .into_iter()
            .find(|t| t.id() == wanted)
            .ok_or_else(|| crate::errors::ConfigError::InvalidValue {
                field: "template",
                value: s.to_string(),
            })
    }
}

/// Lay `images` out on a grid of square cells
///
/// Each image is scaled to fit its cell with its aspect ratio preserved and
/// centered in the cell. Images beyond the template's capacity are ignored.
pub fn grid_collage(images: &[Raster], template: GridTemplate) -> Raster {
    let (cols, rows) = template.grid();
    let cell = GALLERY_CELL_SIZE;
    let mut canvas = RasterCanvas::new(cell * cols, cell * rows, GALLERY_BACKGROUND);

    for (index, image) in images.iter().take(template.capacity()).enumerate() {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            continue;
        }
        let row = index as u32 / cols;
        let col = index as u32 % cols;

        let scale = (cell as f64 / w as f64).min(cell as f64 / h as f64);
        let fit_w = ((w as f64 * scale).round() as u32).clamp(1, cell);
        let fit_h = ((h as f64 * scale).round() as u32).clamp(1, cell);
        let x = (col * cell + (cell - fit_w) / 2) as i64;
        let y = (row * cell + (cell - fit_h) / 2) as i64;

        debug!(index, x, y, fit_w, fit_h, "Placing gallery image");
        canvas.draw_raster_scaled(image, x, y, fit_w, fit_h);
    }

    canvas.into_raster()
}

/// Write `image` into `dir` under its suggested file name
///
/// A numeric suffix is added when the name is already taken.
pub async fn export_image(image: &CapturedImage, dir: &Path) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let file_name = image.file_name();
    let mut path = dir.join(&file_name);
    let stem = file_name.trim_end_matches(".png").to_string();
    let mut attempt = 1;
    while tokio::fs::try_exists(&path).await? {
        path = dir.join(format!("{stem}-{attempt}.png"));
        attempt += 1;
    }

    tokio::fs::write(&path, &image.data[..]).await?;
    info!(path = %path.display(), "Image exported");
    Ok(path)
}

/// Read an image file into a gallery handle (re-encoded as PNG)
pub async fn import_image(path: &Path) -> AppResult<CapturedImage> {
    let bytes = tokio::fs::read(path).await?;
    let origin = path.display().to_string();

    let raster = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes)
            .map(|img| Raster::from(img.to_rgba8()))
            .map_err(|e| PhotoError::DecodingFailed(format!("{origin}: {e}")))
    })
    .await
    .map_err(|e| PhotoError::DecodingFailed(format!("Decode task error: {e}")))??;

    Ok(OutputEmitter::new().emit(raster).await?)
}

/// Captured images, oldest first
#[derive(Debug, Default, Clone)]
pub struct Gallery {
    images: Vec<CapturedImage>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive a finished composite
    pub fn on_capture(&mut self, image: CapturedImage) {
        info!(id = %image.id, total = self.images.len() + 1, "Image added to gallery");
        self.images.push(image);
    }

    pub fn images(&self) -> &[CapturedImage] {
        &self.images
    }

    pub fn get(&self, id: Uuid) -> Option<&CapturedImage> {
        self.images.iter().find(|image| image.id == id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<CapturedImage> {
        let index = self.images.iter().position(|image| image.id == id)?;
        Some(self.images.remove(index))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Export one image into `dir`
    pub async fn export(&self, id: Uuid, dir: &Path) -> AppResult<Option<PathBuf>> {
        match self.get(id) {
            Some(image) => export_image(image, dir).await.map(Some),
            None => Ok(None),
        }
    }

    /// Grid collage of the gallery's images in order
    pub async fn collage(&self, template: GridTemplate) -> Result<CapturedImage, PhotoError> {
        let rasters = self
            .images
            .iter()
            .take(template.capacity())
            .map(CapturedImage::decode)
            .collect::<Result<Vec<_>, _>>()?;

        info!(%template, images = rasters.len(), "Building gallery collage");
        let collage = grid_collage(&rasters, template);
        OutputEmitter::new().emit(collage).await
    }
}
