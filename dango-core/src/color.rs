//! Cell colors
//!
//! Supports the default color, the 16 named ANSI colors (normal and bright),
//! the 256-color palette, and 24-bit RGB, plus parsing and formatting of
//! X11-style color specifications used by the OSC dynamic-color sequences.

use serde::{Deserialize, Serialize};

/// A 24-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A cell color in any of the terminal color modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// The terminal's default foreground or background.
    #[default]
    Default,
    /// Palette color 0-255 (SGR 30-37, 38;5;n).
    Indexed(u8),
    /// Bright ANSI color 0-7 (SGR 90-97 / 100-107).
    Bright(u8),
    /// True color (SGR 38;2;r;g;b).
    Rgb(Rgb),
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(Rgb::new(r, g, b))
    }

    /// Resolve to RGB via the standard xterm palette. `Default` resolves to
    /// the given fallback; embedders with a theme resolve it themselves.
    pub fn to_rgb(self, default: Rgb) -> Rgb {
        match self {
            Color::Default => default,
            Color::Indexed(index) => palette_rgb(index),
            Color::Bright(index) => palette_rgb(index.min(7) + 8),
            Color::Rgb(rgb) => rgb,
        }
    }
}

/// The standard xterm 256-color palette.
pub fn palette_rgb(index: u8) -> Rgb {
    match index {
        0 => Rgb::new(0, 0, 0),
        1 => Rgb::new(205, 0, 0),
        2 => Rgb::new(0, 205, 0),
        3 => Rgb::new(205, 205, 0),
        4 => Rgb::new(0, 0, 238),
        5 => Rgb::new(205, 0, 205),
        6 => Rgb::new(0, 205, 205),
        7 => Rgb::new(229, 229, 229),
        8 => Rgb::new(127, 127, 127),
        9 => Rgb::new(255, 0, 0),
        10 => Rgb::new(0, 255, 0),
        11 => Rgb::new(255, 255, 0),
        12 => Rgb::new(92, 92, 255),
        13 => Rgb::new(255, 0, 255),
        14 => Rgb::new(0, 255, 255),
        15 => Rgb::new(255, 255, 255),
        16..=231 => {
            // 6x6x6 color cube.
            let index = index - 16;
            let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            Rgb::new(level(index / 36), level((index % 36) / 6), level(index % 6))
        }
        232..=255 => {
            let gray = 8 + (index - 232) * 10;
            Rgb::new(gray, gray, gray)
        }
    }
}

/// Parse an X11 color specification: `rgb:RR/GG/BB` with 1-4 hex digits per
/// channel, or `#RRGGBB` / `#RGB`.
pub fn parse_color_spec(spec: &str) -> Option<Rgb> {
    if let Some(rest) = spec.strip_prefix("rgb:") {
        let mut channels = rest.split('/');
        let r = scale_channel(channels.next()?)?;
        let g = scale_channel(channels.next()?)?;
        let b = scale_channel(channels.next()?)?;
        if channels.next().is_some() {
            return None;
        }
        return Some(Rgb::new(r, g, b));
    }
    if let Some(hex) = spec.strip_prefix('#') {
        return match hex.len() {
            3 => {
                let n = u16::from_str_radix(hex, 16).ok()?;
                let nibble = |v: u16| (v as u8) * 17;
                Some(Rgb::new(
                    nibble((n >> 8) & 0xF),
                    nibble((n >> 4) & 0xF),
                    nibble(n & 0xF),
                ))
            }
            6 => {
                let n = u32::from_str_radix(hex, 16).ok()?;
                Some(Rgb::new((n >> 16) as u8, (n >> 8) as u8, n as u8))
            }
            _ => None,
        };
    }
    None
}

/// Scale a 1-4 digit hex channel to 8 bits.
fn scale_channel(digits: &str) -> Option<u8> {
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let max = (1u32 << (4 * digits.len() as u32)) - 1;
    Some(((value * 255 + max / 2) / max) as u8)
}

/// Format as `rgb:rrrr/gggg/bbbb`, the form xterm uses for query replies.
pub fn format_color_spec(rgb: Rgb) -> String {
    let wide = |v: u8| u16::from(v) * 0x101;
    format!(
        "rgb:{:04x}/{:04x}/{:04x}",
        wide(rgb.r),
        wide(rgb.g),
        wide(rgb.b)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_color() {
        assert_eq!(Color::default(), Color::Default);
    }

    #[test]
    fn palette_standard_colors() {
        assert_eq!(palette_rgb(0), Rgb::new(0, 0, 0));
        assert_eq!(palette_rgb(1), Rgb::new(205, 0, 0));
        assert_eq!(palette_rgb(15), Rgb::new(255, 255, 255));
    }

    #[test]
    fn palette_color_cube() {
        assert_eq!(palette_rgb(16), Rgb::new(0, 0, 0));
        assert_eq!(palette_rgb(196), Rgb::new(255, 0, 0));
    }

    #[test]
    fn palette_grayscale() {
        assert_eq!(palette_rgb(232), Rgb::new(8, 8, 8));
        assert_eq!(palette_rgb(255), Rgb::new(238, 238, 238));
    }

    #[test]
    fn bright_resolves_to_upper_palette() {
        let fallback = Rgb::new(0, 0, 0);
        assert_eq!(Color::Bright(1).to_rgb(fallback), palette_rgb(9));
    }

    #[test]
    fn parse_rgb_spec() {
        assert_eq!(
            parse_color_spec("rgb:ff/80/00"),
            Some(Rgb::new(255, 128, 0))
        );
        assert_eq!(
            parse_color_spec("rgb:ffff/8080/0000"),
            Some(Rgb::new(255, 128, 0))
        );
        assert_eq!(parse_color_spec("rgb:f/8/0"), Some(Rgb::new(255, 136, 0)));
    }

    #[test]
    fn parse_hash_spec() {
        assert_eq!(parse_color_spec("#ff8000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(parse_color_spec("#f80"), Some(Rgb::new(255, 136, 0)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_color_spec("red"), None);
        assert_eq!(parse_color_spec("rgb:ff/80"), None);
        assert_eq!(parse_color_spec("#ff80"), None);
    }

    #[test]
    fn format_round_trips() {
        let rgb = Rgb::new(255, 128, 0);
        assert_eq!(parse_color_spec(&format_color_spec(rgb)), Some(rgb));
    }
}
