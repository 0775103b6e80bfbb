// File: src/color_utils.rs

/// Parses a `#rrggbb` color (case-insensitive) into an (r, g, b) tuple.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Lowercased `#rrggbb`, or None if the input is not a valid color.
pub fn normalize_hex(color: &str) -> Option<String> {
    let (r, g, b) = parse_hex(color)?;
    Some(format!("#{:02x}{:02x}{:02x}", r, g, b))
}

/// Determines if text on top of this color should be white rather than black.
pub fn is_dark(r: u8, g: u8, b: u8) -> bool {
    let brightness = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    brightness < 128.0
}
