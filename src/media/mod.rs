// SPDX-License-Identifier: GPL-3.0-only

//! Pixel containers and software drawing used by the photo pipeline
//!
//! # Rasters
//!
//! Every still travels through the pipeline as a [`Raster`]: an RGBA8 grid
//! backed by [`image::RgbaImage`]. Filters mutate it in place, the collage
//! assembler stacks several of them, and the overlay compositor draws on top.
//!
//! # Drawing
//!
//! Composition goes through the small [`Canvas2D`] capability so the collage
//! and overlay logic never depends on a real rendering surface. [`RasterCanvas`]
//! is the software implementation. Captions are shaped with `parley` and
//! rasterized with `vello_cpu` from a TrueType/OpenType font file.
//!
//! # Modules
//!
//! - [`raster`]: The RGBA raster type
//! - [`canvas`]: Canvas capability and its software implementation
//! - [`color`]: CSS-style color strings
//! - [`text`]: Caption font loading and text rasterization
//! - [`formats`]: Camera pixel format to RGBA conversion

pub mod canvas;
pub mod color;
pub mod formats;
pub mod raster;
pub mod text;

// Re-export commonly used types
pub use canvas::{Canvas2D, RasterCanvas};
pub use color::parse_color;
pub use raster::Raster;
pub use text::CaptionFont;
