// SPDX-License-Identifier: GPL-3.0-only

//! Caption text: font loading, shaping and rasterization
//!
//! Text is shaped with `parley` from the bytes of a single font file and
//! rasterized with `vello_cpu`. Only the part of the text that lands on the
//! target surface is rendered, so a huge font size on a small composite
//! costs no more than the composite itself.

use super::color::Rgba;
use super::raster::Raster;
use crate::constants::SYSTEM_FONT_PATHS;
use crate::errors::LoadError;
use parley::layout::PositionedLayoutItem;
use parley::style::{FontStack, StyleProperty};
use parley::{FontContext, Layout, LayoutContext};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use vello_cpu::kurbo::Affine;
use vello_cpu::peniko::{Blob, Color, FontData};
use vello_cpu::{Glyph, Pixmap, RenderContext};

/// Brush carried through the layout; parley needs a `Default` brush type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CaptionBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl From<Rgba> for CaptionBrush {
    fn from([r, g, b, a]: Rgba) -> Self {
        Self { r, g, b, a }
    }
}

/// A font file that captions are drawn with
#[derive(Clone)]
pub struct CaptionFont {
    bytes: Arc<Vec<u8>>,
    family: String,
    origin: String,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("family", &self.family)
            .field("origin", &self.origin)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Rendered pixels of a caption and where they go on the surface
#[derive(Debug, Clone)]
pub struct TextPatch {
    pub raster: Raster,
    pub x: i64,
    pub y: i64,
}

impl CaptionFont {
    /// Use in-memory TrueType/OpenType bytes
    pub fn from_bytes(bytes: Vec<u8>, origin: impl Into<String>) -> Result<Self, LoadError> {
        let origin = origin.into();
        let mut fonts = FontContext::default();
        let family = register(&mut fonts, &bytes).ok_or_else(|| LoadError::Decode {
            origin: origin.clone(),
            message: "no font family in file".to_string(),
        })?;
        debug!(%origin, %family, "Caption font loaded");
        Ok(Self {
            bytes: Arc::new(bytes),
            family,
            origin,
        })
    }

    /// Read a font file
    pub async fn load(path: &Path) -> Result<Self, LoadError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes, path.display().to_string())
    }

    /// Load `preferred` if given, falling back to well-known system fonts
    pub async fn resolve(preferred: Option<&Path>) -> Option<Self> {
        if let Some(path) = preferred {
            match Self::load(path).await {
                Ok(font) => return Some(font),
                Err(err) => warn!(error = %err, "Configured caption font unusable"),
            }
        }
        for candidate in SYSTEM_FONT_PATHS.into_iter().map(PathBuf::from) {
            if let Ok(font) = Self::load(&candidate).await {
                info!(path = %candidate.display(), family = %font.family, "Using system caption font");
                return Some(font);
            }
        }
        warn!("No caption font found");
        None
    }

    /// Family name the font registered under
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Rasterize one caption whose first baseline starts at (x, baseline)
    ///
    /// The result covers only the part of the text inside a
    /// `clip_width`×`clip_height` surface; `None` when nothing is visible.
    #[allow(clippy::too_many_arguments)]
    pub fn rasterize(
        &self,
        text: &str,
        font_px: u32,
        color: Rgba,
        x: i64,
        baseline: i64,
        clip_width: u32,
        clip_height: u32,
    ) -> Option<TextPatch> {
        if text.trim().is_empty() || font_px == 0 || color[3] == 0 {
            return None;
        }
        let size = font_px as f32;
        let mut fonts = FontContext::default();
        let layout = self.layout(&mut fonts, text, size, color.into())?;
        let first_baseline = f64::from(layout.lines().next()?.metrics().baseline);

        // Layout box in surface coordinates, padded for glyph overhang
        let pad = f64::from(size) / 2.0;
        let left = x as f64;
        let top = baseline as f64 - first_baseline;
        let x0 = ((left - pad).floor() as i64).max(0);
        let y0 = ((top - pad).floor() as i64).max(0);
        let x1 = ((left + f64::from(layout.width()) + pad).ceil() as i64).min(clip_width as i64);
        let y1 = ((top + f64::from(layout.height()) + pad).ceil() as i64).min(clip_height as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let width = u16::try_from(x1 - x0).ok()?;
        let height = u16::try_from(y1 - y0).ok()?;

        let font = FontData::new(Blob::from(self.bytes.as_ref().clone()), 0);
        let mut ctx = RenderContext::new(width, height);
        ctx.set_transform(Affine::translate((left - x0 as f64, top - y0 as f64)));
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(Color::from_rgba8(brush.r, brush.g, brush.b, brush.a));
                let glyphs = run.positioned_glyphs().map(|g| Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();

        let mut pixmap = Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        let raster = unpremultiply(pixmap.data_as_u8_slice(), u32::from(width), u32::from(height))?;
        Some(TextPatch {
            raster,
            x: x0,
            y: y0,
        })
    }

    fn layout(
        &self,
        fonts: &mut FontContext,
        text: &str,
        size_px: f32,
        brush: CaptionBrush,
    ) -> Option<Layout<CaptionBrush>> {
        let family = register(fonts, &self.bytes)?;
        let mut layout_ctx: LayoutContext<CaptionBrush> = LayoutContext::new();
        let mut builder = layout_ctx.ranged_builder(fonts, text, 1.0, true);
        builder.push_default(StyleProperty::FontStack(FontStack::Source(Cow::Owned(family))));
        builder.push_default(StyleProperty::FontSize(size_px));
        builder.push_default(StyleProperty::Brush(brush));

        let mut layout: Layout<CaptionBrush> = builder.build(text);
        layout.break_all_lines(None);
        Some(layout)
    }
}

/// Register font bytes and return the first family's name
fn register(fonts: &mut FontContext, bytes: &[u8]) -> Option<String> {
    let families = fonts
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
    let family_id = families.first().map(|(id, _)| *id)?;
    fonts
        .collection
        .family_name(family_id)
        .map(str::to_string)
}

/// Convert premultiplied RGBA8 into a straight-alpha raster
fn unpremultiply(data: &[u8], width: u32, height: u32) -> Option<Raster> {
    let mut out = Vec::with_capacity(data.len());
    for px in data.chunks_exact(4) {
        let a = px[3] as u32;
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for &c in &px[..3] {
            out.push(((c as u32 * 255 + a / 2) / a).min(255) as u8);
        }
        out.push(px[3]);
    }
    image::RgbaImage::from_raw(width, height, out).map(Raster::from)
}
