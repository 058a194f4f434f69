//! CSS Length values and parsing
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)

use serde::Serialize;

use crate::error::ValueError;

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// "Lengths refer to distance measurements and are denoted by `<length>` in the
/// property definitions."
///
/// After the cascade's computed-value step only `Px` and `Percent` remain;
/// the relative units are resolved against font sizes and the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Length {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    Px(f32),
    /// "Equal to the computed value of the font-size property of the element"
    Em(f32),
    /// "Equal to the computed value of the font-size property of the root element."
    Rem(f32),
    /// "1vw = 1% of viewport width"
    Vw(f32),
    /// "1vh = 1% of viewport height"
    Vh(f32),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    Percent(f32),
}

/// What relative lengths resolve against during the computed-value step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    /// Font size used for `em`.
    pub font_size: f32,
    /// Root element font size used for `rem`.
    pub root_font_size: f32,
    /// Viewport width for `vw`.
    pub viewport_width: f32,
    /// Viewport height for `vh`.
    pub viewport_height: f32,
}

impl Length {
    /// Zero pixels.
    pub const ZERO: Self = Self::Px(0.0);

    /// Resolve every unit except percentages to pixels.
    #[must_use]
    pub fn absolutize(self, ctx: &LengthContext) -> Self {
        match self {
            Self::Px(_) | Self::Percent(_) => self,
            Self::Em(em) => Self::Px(em * ctx.font_size),
            Self::Rem(rem) => Self::Px(rem * ctx.root_font_size),
            Self::Vw(vw) => Self::Px(vw * ctx.viewport_width / 100.0),
            Self::Vh(vh) => Self::Px(vh * ctx.viewport_height / 100.0),
        }
    }

    /// Pixel value, resolving percentages against `basis`. `None` when this
    /// is a percentage and there is no definite basis.
    ///
    /// Relative units that escaped the computed-value step are treated as
    /// pixels-per-unit of the default font size.
    #[must_use]
    pub fn resolve(self, basis: Option<f32>) -> Option<f32> {
        match self {
            Self::Px(px) => Some(px),
            Self::Percent(pct) => basis.map(|b| b * pct / 100.0),
            Self::Em(v) | Self::Rem(v) => Some(v * DEFAULT_FONT_SIZE_PX),
            Self::Vw(_) | Self::Vh(_) => None,
        }
    }

    /// Like [`Length::resolve`] with a missing basis treated as zero.
    #[must_use]
    pub fn resolve_or_zero(self, basis: Option<f32>) -> f32 {
        self.resolve(basis).unwrap_or(0.0)
    }

    /// Whether this is a percentage.
    #[must_use]
    pub const fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }

    const fn is_negative(self) -> bool {
        match self {
            Self::Px(v) | Self::Em(v) | Self::Rem(v) | Self::Vw(v) | Self::Vh(v) | Self::Percent(v) => {
                v < 0.0
            }
        }
    }
}

/// Split a dimension like `12.5px` into its number and unit.
fn split_dimension(raw: &str) -> Option<(f32, &str)> {
    let end = raw
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0))
        })
        .map_or(raw.len(), |(i, _)| i);
    let number = raw[..end].parse::<f32>().ok()?;
    Some((number, &raw[end..]))
}

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Parse a single length or percentage: `12px`, `1.5em`, `50%`, `0`.
///
/// # Errors
///
/// [`ValueError::UnknownUnit`] for unit suffixes outside px/em/rem/%/vw/vh/pt/pc/in/cm/mm,
/// [`ValueError::InvalidValue`] for anything that is not a number, and for
/// unitless non-zero numbers.
pub fn parse_length(property: &str, raw: &str) -> Result<Length, ValueError> {
    let value = raw.trim().to_ascii_lowercase();
    let Some((number, unit)) = split_dimension(&value) else {
        return Err(ValueError::invalid(property, raw));
    };

    // [§ 6.1](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    // "1in = 2.54cm = 96px", "1pt = 1/72th of 1in", "1pc = 1/6th of 1in"
    let length = match unit {
        "px" => Length::Px(number),
        "em" => Length::Em(number),
        "rem" => Length::Rem(number),
        "%" => Length::Percent(number),
        "vw" => Length::Vw(number),
        "vh" => Length::Vh(number),
        "pt" => Length::Px(number * 96.0 / 72.0),
        "pc" => Length::Px(number * 16.0),
        "in" => Length::Px(number * 96.0),
        "cm" => Length::Px(number * 96.0 / 2.54),
        "mm" => Length::Px(number * 96.0 / 25.4),
        // "0" is the only unitless length.
        "" if number == 0.0 => Length::ZERO,
        "" => return Err(ValueError::invalid(property, raw)),
        other => {
            return Err(ValueError::UnknownUnit {
                unit: other.to_string(),
                value: raw.trim().to_string(),
            });
        }
    };
    Ok(length)
}

/// [`parse_length`] restricted to non-negative values (widths, padding).
///
/// # Errors
///
/// As [`parse_length`], plus [`ValueError::InvalidValue`] for negatives.
pub fn parse_non_negative_length(property: &str, raw: &str) -> Result<Length, ValueError> {
    let length = parse_length(property, raw)?;
    if length.is_negative() {
        return Err(ValueError::invalid(property, raw));
    }
    Ok(length)
}

/// Parse a bare number such as a `line-height` multiplier.
///
/// # Errors
///
/// [`ValueError::InvalidValue`] if `raw` is not a finite number.
pub fn parse_number(property: &str, raw: &str) -> Result<f32, ValueError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValueError::invalid(property, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_length("width", "12px"), Ok(Length::Px(12.0)));
        assert_eq!(parse_length("width", "1.5EM"), Ok(Length::Em(1.5)));
        assert_eq!(parse_length("width", "50%"), Ok(Length::Percent(50.0)));
        assert_eq!(parse_length("width", "0"), Ok(Length::ZERO));
        assert_eq!(parse_length("margin-left", "-4px"), Ok(Length::Px(-4.0)));
        assert_eq!(parse_length("width", "12pt"), Ok(Length::Px(16.0)));
    }

    #[test]
    fn test_parse_rejects_unknown_unit() {
        assert_eq!(
            parse_length("width", "3furlongs"),
            Err(ValueError::UnknownUnit {
                unit: "furlongs".to_string(),
                value: "3furlongs".to_string(),
            })
        );
        assert!(parse_length("width", "12").is_err());
        assert!(parse_length("width", "wide").is_err());
        assert!(parse_non_negative_length("width", "-1px").is_err());
    }

    #[test]
    fn test_absolutize() {
        let ctx = LengthContext {
            font_size: 20.0,
            root_font_size: 10.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
        };
        assert_eq!(Length::Em(2.0).absolutize(&ctx), Length::Px(40.0));
        assert_eq!(Length::Rem(2.0).absolutize(&ctx), Length::Px(20.0));
        assert_eq!(Length::Vw(50.0).absolutize(&ctx), Length::Px(400.0));
        assert_eq!(Length::Vh(10.0).absolutize(&ctx), Length::Px(60.0));
        assert_eq!(Length::Percent(5.0).absolutize(&ctx), Length::Percent(5.0));
    }

    #[test]
    fn test_resolve_percent_needs_basis() {
        assert_eq!(Length::Percent(50.0).resolve(Some(210.0)), Some(105.0));
        assert_eq!(Length::Percent(50.0).resolve(None), None);
        assert!((Length::Px(7.0).resolve_or_zero(None) - 7.0).abs() < f32::EPSILON);
    }
}
