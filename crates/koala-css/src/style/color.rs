//! CSS Color values and parsing
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

use serde::Serialize;

use crate::error::ValueError;

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColorValue {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

impl ColorValue {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Fully transparent black, the initial `background-color`.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque colour from channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        // "The three-digit RGB notation (#RGB) is converted into six-digit form (#RRGGBB)
        // by replicating digits, not by adding zeros."
        let short = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self {
                r: long(0)?,
                g: long(2)?,
                b: long(4)?,
                a: long(6)?,
            }),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    ///
    /// The sixteen HTML colours plus the handful of extended keywords that
    /// show up in UA and test stylesheets.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "aqua" | "cyan" => Self::rgb(0, 255, 255),
            "fuchsia" | "magenta" => Self::rgb(255, 0, 255),
            "lime" => Self::rgb(0, 255, 0),
            "maroon" => Self::rgb(128, 0, 0),
            "navy" => Self::rgb(0, 0, 128),
            "olive" => Self::rgb(128, 128, 0),
            "purple" => Self::rgb(128, 0, 128),
            "silver" => Self::rgb(192, 192, 192),
            "teal" => Self::rgb(0, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            "lightgray" | "lightgrey" => Self::rgb(211, 211, 211),
            "darkgray" | "darkgrey" => Self::rgb(169, 169, 169),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        };
        Some(color)
    }

    /// Convert to hex string notation (#RRGGBB or #RRGGBBAA if alpha != 255)
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// One `rgb()` channel: `0..=255` or a percentage.
fn parse_channel(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    let value = if let Some(pct) = raw.strip_suffix('%') {
        pct.trim().parse::<f32>().ok()? * 255.0 / 100.0
    } else {
        raw.parse::<f32>().ok()?
    };
    Some(value.round().clamp(0.0, 255.0) as u8)
}

/// Alpha: a `0..=1` number or a percentage.
fn parse_alpha(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    let value = if let Some(pct) = raw.strip_suffix('%') {
        pct.trim().parse::<f32>().ok()? / 100.0
    } else {
        raw.parse::<f32>().ok()?
    };
    Some((value.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// [§ 5.1 The RGB functions](https://www.w3.org/TR/css-color-4/#rgb-functions)
///
/// Accepts the legacy comma form and the modern space form with `/ alpha`.
fn parse_rgb_function(args: &str) -> Option<ColorValue> {
    let (channels, alpha) = match args.split_once('/') {
        Some((channels, alpha)) => (channels, Some(alpha)),
        None => (args, None),
    };
    let parts: Vec<&str> = if channels.contains(',') {
        channels.split(',').map(str::trim).collect()
    } else {
        channels.split_ascii_whitespace().collect()
    };

    let (rgb, alpha) = match (parts.as_slice(), alpha) {
        ([r, g, b], alpha) => ([*r, *g, *b], alpha),
        ([r, g, b, a], None) => ([*r, *g, *b], Some(*a)),
        _ => return None,
    };

    Some(ColorValue {
        r: parse_channel(rgb[0])?,
        g: parse_channel(rgb[1])?,
        b: parse_channel(rgb[2])?,
        a: alpha.map_or(Some(255), parse_alpha)?,
    })
}

/// Parse any supported colour syntax.
///
/// # Errors
///
/// [`ValueError::UnknownColor`] if `raw` is not a hex colour, a known
/// keyword, or a well-formed `rgb()`/`rgba()` call.
pub fn parse_color(raw: &str) -> Result<ColorValue, ValueError> {
    let value = raw.trim();
    let lower = value.to_ascii_lowercase();

    let parsed = if value.starts_with('#') {
        ColorValue::from_hex(value)
    } else if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
    {
        args.strip_suffix(')').and_then(parse_rgb_function)
    } else {
        ColorValue::from_named(&lower)
    };

    parsed.ok_or_else(|| ValueError::UnknownColor(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(ColorValue::from_hex("#333"), Some(ColorValue::rgb(0x33, 0x33, 0x33)));
        assert_eq!(
            ColorValue::from_hex("#ff000080"),
            Some(ColorValue {
                r: 255,
                g: 0,
                b: 0,
                a: 128
            })
        );
        assert_eq!(ColorValue::from_hex("#12345"), None);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(parse_color("rgb(255, 0, 0)"), Ok(ColorValue::rgb(255, 0, 0)));
        assert_eq!(parse_color("RGB(0 128 0)"), Ok(ColorValue::rgb(0, 128, 0)));
        assert_eq!(
            parse_color("rgba(0, 0, 0, 0.5)").map(|c| c.a),
            Ok(128)
        );
        assert_eq!(parse_color("rgb(100%, 0%, 0% / 0)").map(|c| (c.r, c.a)), Ok((255, 0)));
    }

    #[test]
    fn test_unknown_color() {
        assert_eq!(
            parse_color("blurple"),
            Err(ValueError::UnknownColor("blurple".to_string()))
        );
        assert!(parse_color("rgb(1, 2)").is_err());
    }

    #[test]
    fn test_to_hex_string() {
        assert_eq!(ColorValue::rgb(255, 0, 16).to_hex_string(), "#ff0010");
        assert_eq!(ColorValue::TRANSPARENT.to_hex_string(), "#00000000");
    }
}
