// SPDX-License-Identifier: GPL-3.0-only

//! CSS-style color strings used by caption overlays

/// RGBA color, straight (non-premultiplied) alpha
pub type Rgba = [u8; 4];

pub const WHITE: Rgba = [255, 255, 255, 255];

/// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or a basic color name
///
/// The leading `#` is optional for hex forms.
pub fn parse_color(s: &str) -> Result<Rgba, String> {
    let s = s.trim();
    if let Some(named) = named_color(s) {
        return Ok(named);
    }

    let hex = s.strip_prefix('#').unwrap_or(s);
    if !hex.is_ascii() {
        return Err(format!("invalid color \"{s}\""));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    // Short forms repeat each digit: #f80 == #ff8800
    fn hex_nibble(digit: &str) -> Result<u8, String> {
        hex_byte(digit).map(|v| v * 17)
    }

    match hex.len() {
        3 => Ok([
            hex_nibble(&hex[0..1])?,
            hex_nibble(&hex[1..2])?,
            hex_nibble(&hex[2..3])?,
            255,
        ]),
        4 => Ok([
            hex_nibble(&hex[0..1])?,
            hex_nibble(&hex[1..2])?,
            hex_nibble(&hex[2..3])?,
            hex_nibble(&hex[3..4])?,
        ]),
        6 => Ok([
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
            255,
        ]),
        8 => Ok([
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
            hex_byte(&hex[6..8])?,
        ]),
        _ => Err(format!(
            "color must be #RGB, #RGBA, #RRGGBB, #RRGGBBAA or a name, got \"{s}\""
        )),
    }
}

/// Parse a caption color, falling back to white when it is not understood
pub fn parse_color_or_white(s: &str) -> Rgba {
    parse_color(s).unwrap_or_else(|err| {
        tracing::warn!(color = s, error = %err, "Unrecognized caption color, using white");
        WHITE
    })
}

fn named_color(name: &str) -> Option<Rgba> {
    let rgba = match name.to_ascii_lowercase().as_str() {
        "white" => WHITE,
        "black" => [0, 0, 0, 255],
        "red" => [255, 0, 0, 255],
        "green" => [0, 128, 0, 255],
        "blue" => [0, 0, 255, 255],
        "yellow" => [255, 255, 0, 255],
        "orange" => [255, 165, 0, 255],
        "purple" => [128, 0, 128, 255],
        "pink" => [255, 192, 203, 255],
        "transparent" => [0, 0, 0, 0],
        _ => return None,
    };
    Some(rgba)
}
