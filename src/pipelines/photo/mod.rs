// SPDX-License-Identifier: GPL-3.0-only

//! Capture-and-composite pipeline
//!
//! ```text
//! Camera stream → Capture → Filter → Collage buffer → Overlays → PNG
//!                    ↑                     │
//!                 Countdown          (quota not met: wait for next shot)
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Countdown**: Optional delay before each capture ([`countdown`])
//! 2. **Capture**: Grab a still at native resolution ([`capture`])
//! 3. **Filter**: Per-pixel color transform, applied once per still ([`filters`])
//! 4. **Collage**: Stack shots until the layout's quota is met ([`collage`])
//! 5. **Overlays**: Stickers then captions on the finished composite ([`overlays`])
//! 6. **Encoding**: PNG handle for the gallery ([`encoding`])

pub mod capture;
pub mod collage;
pub mod countdown;
pub mod encoding;
pub mod filters;
pub mod overlays;

pub use capture::FrameCapturer;
pub use collage::{CollageAssembler, CollageLayout, CollageOutcome};
pub use countdown::{CountdownController, CountdownStart, CountdownState, TickOutcome};
pub use encoding::{CapturedImage, OutputEmitter};
pub use filters::FilterKind;
pub use overlays::{
    Composited, ImageSource, MessageOverlay, OverlayCompositor, OverlayFailure, StickerOverlay,
};
