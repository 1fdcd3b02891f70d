// SPDX-License-Identifier: GPL-3.0-only

//! Per-pixel color filters
//!
//! Every filter is a pure function of a pixel's RGB channels; alpha and
//! dimensions are never touched. Channels are computed in `f64` and stored
//! the way a clamped byte buffer stores them: clamped to `0..=255` and
//! rounded to nearest with ties to even.

use crate::media::Raster;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Filter applied to every captured still
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    None,
    Grayscale,
    Sepia,
    Invert,
    Vintage,
}

impl FilterKind {
    /// All filters in the order the filter panel lists them
    pub const ALL: [FilterKind; 5] = [
        FilterKind::None,
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::Invert,
        FilterKind::Vintage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Invert => "invert",
            FilterKind::Vintage => "vintage",
        }
    }

    /// Transform one RGB triple
    pub fn apply_rgb(self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
        match self {
            FilterKind::None => [r, g, b],
            FilterKind::Grayscale => {
                let avg = store((rf + gf + bf) / 3.0);
                [avg, avg, avg]
            }
            FilterKind::Sepia => [
                store(rf * 0.393 + gf * 0.769 + bf * 0.189),
                store(rf * 0.349 + gf * 0.686 + bf * 0.168),
                store(rf * 0.272 + gf * 0.534 + bf * 0.131),
            ],
            FilterKind::Invert => [255 - r, 255 - g, 255 - b],
            FilterKind::Vintage => [store(rf * 1.2), store(gf * 0.9), store(bf * 0.8)],
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = crate::errors::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| crate::errors::ConfigError::InvalidValue {
                field: "filter",
                value: s.to_string(),
            })
    }
}

#[inline]
fn store(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Apply `kind` to every pixel of `raster` in place
pub fn apply(raster: &mut Raster, kind: FilterKind) {
    if kind == FilterKind::None {
        return;
    }
    for px in raster.samples_mut().chunks_exact_mut(4) {
        let [r, g, b] = kind.apply_rgb([px[0], px[1], px[2]]);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
}
