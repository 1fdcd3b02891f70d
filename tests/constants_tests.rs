// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use photobooth::config::ResolutionTier;
use photobooth::constants::*;

#[test]
fn test_resolution_tiers() {
    assert_eq!(ResolutionTier::Hd.dimensions(), HD_RESOLUTION);
    assert_eq!(ResolutionTier::Standard.dimensions(), STANDARD_RESOLUTION);
    assert_eq!(HD_RESOLUTION, (1280, 720));
    assert_eq!(STANDARD_RESOLUTION, (640, 480));
}

#[test]
fn test_timer_options_are_ascending() {
    assert_eq!(TIMER_OPTIONS[0], 0, "Timer 0 must be offered for instant capture");
    assert!(TIMER_OPTIONS.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_message_palette_is_parseable() {
    for color in MESSAGE_COLORS {
        assert!(
            photobooth::media::parse_color(color).is_ok(),
            "Palette color {color} does not parse"
        );
    }
}

#[test]
fn test_timeouts_are_bounded() {
    assert!(!DEVICE_OPEN_TIMEOUT.is_zero());
    assert!(STICKER_LOAD_TIMEOUT < DEVICE_OPEN_TIMEOUT);
}
