// SPDX-License-Identifier: GPL-3.0-only

//! Multi-shot collage assembly
//!
//! Filtered stills accumulate in capture order until the layout's quota is
//! met; they are then stacked top to bottom on a black canvas and the buffer
//! starts over.

use crate::constants::COMPOSITE_BACKGROUND;
use crate::media::{Canvas2D, Raster, RasterCanvas};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

/// How many shots make one composite, stacked vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollageLayout {
    #[default]
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "vertical-2")]
    Vertical2,
    #[serde(rename = "vertical-3")]
    Vertical3,
}

impl CollageLayout {
    pub const ALL: [CollageLayout; 3] = [
        CollageLayout::Single,
        CollageLayout::Vertical2,
        CollageLayout::Vertical3,
    ];

    /// Shots per composite, also the height multiplier
    pub fn required_count(self) -> usize {
        match self {
            CollageLayout::Single => 1,
            CollageLayout::Vertical2 => 2,
            CollageLayout::Vertical3 => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CollageLayout::Single => "single",
            CollageLayout::Vertical2 => "vertical-2",
            CollageLayout::Vertical3 => "vertical-3",
        }
    }
}

impl std::fmt::Display for CollageLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CollageLayout {
    type Err = crate::errors::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "1" => Ok(CollageLayout::Single),
            "vertical-2" | "vertical2" | "2" => Ok(CollageLayout::Vertical2),
            "vertical-3" | "vertical3" | "3" => Ok(CollageLayout::Vertical3),
            _ => Err(crate::errors::ConfigError::InvalidValue {
                field: "layout",
                value: s.to_string(),
            }),
        }
    }
}

/// Result of adding a shot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollageOutcome {
    /// More shots are needed; the buffer holds `pending` of `required`
    NotYet { pending: usize, required: usize },
    /// The quota was met; the buffer is empty again
    Ready(Raster),
}

/// Collage buffer and assembler
#[derive(Debug, Default)]
pub struct CollageAssembler {
    layout: CollageLayout,
    shots: Vec<Raster>,
}

impl CollageAssembler {
    pub fn new(layout: CollageLayout) -> Self {
        Self {
            layout,
            shots: Vec::with_capacity(layout.required_count()),
        }
    }

    pub fn layout(&self) -> CollageLayout {
        self.layout
    }

    /// Shots waiting in the buffer
    pub fn pending(&self) -> usize {
        self.shots.len()
    }

    pub fn required(&self) -> usize {
        self.layout.required_count()
    }

    /// Switch layout, discarding any partially filled buffer
    pub fn set_layout(&mut self, layout: CollageLayout) {
        if layout != self.layout {
            info!(from = %self.layout, to = %layout, "Collage layout changed");
            self.layout = layout;
            self.reset();
        }
    }

    /// Drop buffered shots
    pub fn reset(&mut self) {
        if !self.shots.is_empty() {
            debug!(discarded = self.shots.len(), "Collage buffer reset");
        }
        self.shots.clear();
    }

    /// Append a filtered still; assemble when the quota is met
    pub fn add_shot(&mut self, shot: Raster, layout: CollageLayout) -> CollageOutcome {
        self.set_layout(layout);
        self.shots.push(shot);

        let required = self.required();
        if self.shots.len() < required {
            debug!(pending = self.shots.len(), required, "Shot buffered");
            return CollageOutcome::NotYet {
                pending: self.shots.len(),
                required,
            };
        }

        let shots = std::mem::take(&mut self.shots);
        CollageOutcome::Ready(Self::assemble(shots))
    }

    fn assemble(mut shots: Vec<Raster>) -> Raster {
        if shots.len() == 1 {
            return shots.remove(0);
        }

        let (width, height) = shots[0].dimensions();
        let count = shots.len() as u32;
        info!(width, height = height * count, shots = count, "Assembling collage");

        let mut canvas = RasterCanvas::new(width, height * count, COMPOSITE_BACKGROUND);
        for (i, shot) in shots.iter().enumerate() {
            let y = i as i64 * height as i64;
            if shot.dimensions() == (width, height) {
                canvas.draw_sub_raster(shot, 0, y);
            } else {
                debug!(
                    index = i,
                    from = ?shot.dimensions(),
                    to = ?(width, height),
                    "Scaling mismatched shot"
                );
                canvas.draw_raster_scaled(shot, 0, y, width, height);
            }
        }
        canvas.into_raster()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];

    #[test]
    fn single_layout_returns_the_shot() {
        let mut assembler = CollageAssembler::new(CollageLayout::Single);
        let shot = Raster::filled(5, 4, RED);
        assert_eq!(
            assembler.add_shot(shot.clone(), CollageLayout::Single),
            CollageOutcome::Ready(shot)
        );
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn vertical_three_stacks_in_capture_order() {
        let mut assembler = CollageAssembler::new(CollageLayout::Vertical3);
        let layout = CollageLayout::Vertical3;

        assert_eq!(
            assembler.add_shot(Raster::filled(10, 10, RED), layout),
            CollageOutcome::NotYet { pending: 1, required: 3 }
        );
        assert_eq!(
            assembler.add_shot(Raster::filled(10, 10, BLUE), layout),
            CollageOutcome::NotYet { pending: 2, required: 3 }
        );
        let CollageOutcome::Ready(composite) =
            assembler.add_shot(Raster::filled(10, 10, GREEN), layout)
        else {
            panic!("third shot should complete the collage");
        };

        assert_eq!(composite.dimensions(), (10, 30));
        assert_eq!(composite.pixel(5, 0), RED);
        assert_eq!(composite.pixel(5, 15), BLUE);
        assert_eq!(composite.pixel(5, 29), GREEN);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn mismatched_shot_is_scaled_to_first() {
        let mut assembler = CollageAssembler::new(CollageLayout::Vertical2);
        assembler.add_shot(Raster::filled(8, 6, RED), CollageLayout::Vertical2);
        let CollageOutcome::Ready(composite) =
            assembler.add_shot(Raster::filled(16, 12, BLUE), CollageLayout::Vertical2)
        else {
            panic!("second shot should complete the collage");
        };
        assert_eq!(composite.dimensions(), (8, 12));
        assert_eq!(composite.pixel(7, 11), BLUE);
    }

    #[test]
    fn layout_change_discards_partial_buffer() {
        let mut assembler = CollageAssembler::new(CollageLayout::Vertical3);
        assembler.add_shot(Raster::filled(4, 4, RED), CollageLayout::Vertical3);
        assert_eq!(assembler.pending(), 1);

        assert_eq!(
            assembler.add_shot(Raster::filled(4, 4, BLUE), CollageLayout::Vertical2),
            CollageOutcome::NotYet { pending: 1, required: 2 }
        );
    }

    #[test]
    fn layout_names_round_trip() {
        for layout in CollageLayout::ALL {
            assert_eq!(layout.name().parse::<CollageLayout>().unwrap(), layout);
            let json = serde_json::to_string(&layout).unwrap();
            assert_eq!(json, format!("\"{}\"", layout.name()));
        }
    }
}
