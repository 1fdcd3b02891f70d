// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Resolution requested for the HD tier (width, height)
pub const HD_RESOLUTION: (u32, u32) = (1280, 720);

/// Resolution requested for the Standard tier (width, height)
pub const STANDARD_RESOLUTION: (u32, u32) = (640, 480);

/// Timer values offered by the settings panel, in seconds
pub const TIMER_OPTIONS: [u32; 4] = [0, 3, 5, 10];

/// Default photo timer in seconds
pub const DEFAULT_TIMER_SECONDS: u32 = 3;

/// Interval between countdown ticks
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Side length of the square footprint a sticker is drawn at, in pixels
pub const STICKER_SIZE: u32 = 100;

/// Default caption font size in pixels
pub const DEFAULT_FONT_SIZE: u32 = 24;

/// Caption font sizes offered by the message panel (S, M, L, XL)
pub const FONT_SIZES: [u32; 4] = [16, 24, 32, 40];

/// Font files tried, in order, when no caption font is configured
pub const SYSTEM_FONT_PATHS: [&str; 11] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Default caption color
pub const DEFAULT_MESSAGE_COLOR: &str = "#ffffff";

/// Caption palette offered by the message panel
pub const MESSAGE_COLORS: [&str; 8] = [
    "#ffffff", // white
    "#f87171", // red
    "#fb923c", // orange
    "#facc15", // yellow
    "#4ade80", // green
    "#38bdf8", // blue
    "#a78bfa", // purple
    "#f9a8d4", // pink
];

/// Upper bound on waiting for a camera to grant or deny access
pub const DEVICE_OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on loading a single sticker image
pub const STICKER_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Background behind stacked collage shots
pub const COMPOSITE_BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Cell size of gallery grid collages, in pixels
pub const GALLERY_CELL_SIZE: u32 = 400;

/// Background of gallery grid collages (#1f2937)
pub const GALLERY_BACKGROUND: [u8; 4] = [0x1f, 0x29, 0x37, 255];

/// Prefix of exported image file names
pub const EXPORT_FILE_PREFIX: &str = "photobooth";

/// Directory name used under the user config and pictures directories
pub const APP_DIR_NAME: &str = "photobooth";

/// Settings file name inside the config directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
