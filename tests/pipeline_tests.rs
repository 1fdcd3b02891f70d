// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the photo pipeline stages

use photobooth::media::{CaptionFont, Raster};
use photobooth::pipelines::photo::filters::apply;
use photobooth::pipelines::photo::overlays::to_pixels;
use photobooth::pipelines::photo::{
    CollageAssembler, CollageLayout, CollageOutcome, FilterKind, MessageOverlay,
    OverlayCompositor,
};
use std::time::Duration;

fn sample() -> Raster {
    let mut raster = Raster::filled(3, 2, [0, 0, 0, 0]);
    let pixels = [
        [10, 20, 30, 255],
        [200, 100, 50, 128],
        [255, 255, 255, 0],
        [0, 0, 0, 255],
        [1, 2, 3, 4],
        [90, 180, 45, 200],
    ];
    for (i, px) in pixels.into_iter().enumerate() {
        raster.put_pixel(i as u32 % 3, i as u32 / 3, px);
    }
    raster
}

#[test]
fn filters_keep_alpha_and_dimensions() {
    let original = sample();
    for kind in FilterKind::ALL {
        let mut filtered = original.clone();
        apply(&mut filtered, kind);
        assert_eq!(filtered.dimensions(), original.dimensions(), "{kind}");
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(filtered.pixel(x, y)[3], original.pixel(x, y)[3], "{kind}");
            }
        }
    }
}

#[test]
fn none_filter_is_identity() {
    let mut filtered = sample();
    apply(&mut filtered, FilterKind::None);
    assert_eq!(filtered, sample());
}

#[test]
fn collage_completes_on_the_required_shot() {
    for layout in CollageLayout::ALL {
        let mut assembler = CollageAssembler::new(layout);
        let required = layout.required_count();
        for shot in 1..required {
            assert_eq!(
                assembler.add_shot(Raster::filled(4, 4, [shot as u8, 0, 0, 255]), layout),
                CollageOutcome::NotYet {
                    pending: shot,
                    required
                }
            );
        }
        match assembler.add_shot(Raster::filled(4, 4, [9, 9, 9, 255]), layout) {
            CollageOutcome::Ready(composite) => {
                assert_eq!(composite.dimensions(), (4, 4 * required as u32));
            }
            other => panic!("{layout}: expected a composite, got {other:?}"),
        }
        assert_eq!(assembler.pending(), 0);
    }
}

#[test]
fn overlay_positions_are_percentages_of_the_composite() {
    assert_eq!(to_pixels(50.0, 50.0, 200, 200), (100, 100));
    assert_eq!(to_pixels(0.0, 100.0, 640, 960), (0, 960));
    assert_eq!(to_pixels(-5.0, 150.0, 100, 100), (0, 100));
    assert_eq!(to_pixels(33.3, 66.6, 100, 100), (33, 66));
}

#[tokio::test]
async fn captions_draw_inside_the_composite() {
    if CaptionFont::resolve(None).await.is_none() {
        eprintln!("no system font installed; skipping");
        return;
    }
    let mut compositor = OverlayCompositor::new(100, Duration::from_secs(1));
    let black = [0, 0, 0, 255];
    let caption = MessageOverlay::new("HI", 10.0, 50.0).with_color("#ff0000");

    let composited = compositor
        .apply_overlays(Raster::filled(100, 100, black), &[], &[caption])
        .await;
    assert!(composited.failures.is_empty());

    let raster = composited.raster;
    assert_eq!(raster.dimensions(), (100, 100));
    let red = (0..100)
        .flat_map(|y| (0..100).map(move |x| (x, y)))
        .filter(|&(x, y)| raster.pixel(x, y) == [255, 0, 0, 255])
        .count();
    assert!(red > 0);
    // Nothing is drawn below the baseline
    assert!((51..100).all(|y| (0..100).all(|x| raster.pixel(x, y) == black)));
}

#[tokio::test]
async fn descenders_hang_below_the_baseline() {
    let Some(font) = CaptionFont::resolve(None).await else {
        eprintln!("no system font installed; skipping");
        return;
    };
    let mut compositor = OverlayCompositor::new(100, Duration::from_secs(1)).with_loaded_font(font);
    let black = [0, 0, 0, 255];
    let caption = MessageOverlay::new("gjpqy", 5.0, 50.0)
        .with_color("#ffffff")
        .with_font_size(32);

    let raster = compositor
        .apply_overlays(Raster::filled(100, 100, black), &[], &[caption])
        .await
        .raster;
    assert!((52..100).any(|y| (0..100).any(|x| raster.pixel(x, y) != black)));
}
