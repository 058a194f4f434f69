//! The property table.
//!
//! Every longhand the engine understands is a [`Property`] variant. Parsing,
//! initial values and inheritance are exhaustive `match`es over the enum, so
//! adding a property without deciding all three is a compile error.

use serde::Serialize;
use strum_macros::{EnumCount, EnumIter, EnumString, IntoStaticStr};

use super::color::parse_color;
use super::display::{DisplayValue, parse_display};
use super::keywords::{
    BorderCollapse, BorderStyle, FontStyle, Side, TextAlign, VerticalAlign, Visibility, WhiteSpace,
};
use super::length::{
    DEFAULT_FONT_SIZE_PX, Length, parse_length, parse_non_negative_length, parse_number,
};
use super::value::Value;
use crate::error::ValueError;

/// A CSS longhand property.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    EnumString,
    IntoStaticStr,
    EnumIter,
    EnumCount,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Property {
    Display,
    Color,
    BackgroundColor,
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    LineHeight,
    TextAlign,
    VerticalAlign,
    WhiteSpace,
    Visibility,
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    BorderTopStyle,
    BorderRightStyle,
    BorderBottomStyle,
    BorderLeftStyle,
    BorderTopColor,
    BorderRightColor,
    BorderBottomColor,
    BorderLeftColor,
    BorderSpacing,
    BorderCollapse,
}

impl Property {
    /// CSS spelling, e.g. `"margin-top"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// [§ 7.1 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inherited-property)
    ///
    /// "Some properties are inherited from an ancestor element to its
    /// descendants." This is the fixed allow-list; everything else starts
    /// from its initial value.
    #[must_use]
    pub const fn is_inherited(self) -> bool {
        matches!(
            self,
            Self::Color
                | Self::FontFamily
                | Self::FontSize
                | Self::FontWeight
                | Self::FontStyle
                | Self::LineHeight
                | Self::TextAlign
                | Self::WhiteSpace
                | Self::Visibility
                | Self::BorderSpacing
                | Self::BorderCollapse
        )
    }

    /// [§ 7.1 Initial Values](https://www.w3.org/TR/css-cascade-4/#initial-values)
    #[must_use]
    pub fn initial_value(self) -> Value {
        match self {
            Self::Display => Value::Display(Some(DisplayValue::inline())),
            Self::Color => Value::Color(super::ColorValue::BLACK),
            Self::BackgroundColor => Value::Color(super::ColorValue::TRANSPARENT),
            Self::FontFamily => Value::FontFamily("sans-serif".to_string()),
            Self::FontSize => Value::Length(Length::Px(DEFAULT_FONT_SIZE_PX)),
            Self::FontWeight => Value::FontWeight(400),
            Self::FontStyle => Value::FontStyle(FontStyle::Normal),
            Self::LineHeight => Value::Normal,
            Self::TextAlign => Value::TextAlign(TextAlign::Left),
            Self::VerticalAlign => Value::VerticalAlign(VerticalAlign::Baseline),
            Self::WhiteSpace => Value::WhiteSpace(WhiteSpace::Normal),
            Self::Visibility => Value::Visibility(Visibility::Visible),
            Self::Width | Self::Height => Value::Auto,
            Self::MaxWidth | Self::MaxHeight => Value::None,
            Self::MinWidth
            | Self::MinHeight
            | Self::MarginTop
            | Self::MarginRight
            | Self::MarginBottom
            | Self::MarginLeft
            | Self::PaddingTop
            | Self::PaddingRight
            | Self::PaddingBottom
            | Self::PaddingLeft => Value::Length(Length::ZERO),
            // "medium"; the used width is 0 while the style is `none`.
            Self::BorderTopWidth
            | Self::BorderRightWidth
            | Self::BorderBottomWidth
            | Self::BorderLeftWidth => Value::Length(Length::Px(3.0)),
            Self::BorderTopStyle
            | Self::BorderRightStyle
            | Self::BorderBottomStyle
            | Self::BorderLeftStyle => Value::BorderStyle(BorderStyle::None),
            Self::BorderTopColor
            | Self::BorderRightColor
            | Self::BorderBottomColor
            | Self::BorderLeftColor => Value::CurrentColor,
            Self::BorderSpacing => Value::Spacing(Length::ZERO, Length::ZERO),
            Self::BorderCollapse => Value::BorderCollapse(BorderCollapse::Separate),
        }
    }

    /// Parse a raw declaration value for this property.
    ///
    /// `inherit`/`initial`/`unset` are handled by the caller; `!important`
    /// must already be stripped.
    ///
    /// # Errors
    ///
    /// A [`ValueError`] describing why the value is not valid here.
    pub fn parse_value(self, raw: &str) -> Result<Value, ValueError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValueError::Empty(self.name().to_string()));
        }
        let keyword = raw.to_ascii_lowercase();
        let name = self.name();

        let value = match self {
            Self::Display => Value::Display(parse_display(raw)?),
            Self::Color | Self::BackgroundColor => parse_color_value(raw)?,
            Self::BorderTopColor
            | Self::BorderRightColor
            | Self::BorderBottomColor
            | Self::BorderLeftColor => parse_color_value(raw)?,
            Self::FontFamily => Value::FontFamily(raw.to_string()),
            Self::FontSize => Value::Length(parse_font_size(raw)?),
            Self::FontWeight => Value::FontWeight(parse_font_weight(raw)?),
            Self::FontStyle => Value::FontStyle(parse_keyword(name, raw)?),
            Self::TextAlign => Value::TextAlign(parse_keyword(name, raw)?),
            Self::VerticalAlign => Value::VerticalAlign(parse_keyword(name, raw)?),
            Self::WhiteSpace => Value::WhiteSpace(parse_keyword(name, raw)?),
            Self::Visibility => Value::Visibility(parse_keyword(name, raw)?),
            Self::BorderCollapse => Value::BorderCollapse(parse_keyword(name, raw)?),
            Self::BorderTopStyle
            | Self::BorderRightStyle
            | Self::BorderBottomStyle
            | Self::BorderLeftStyle => Value::BorderStyle(parse_keyword(name, raw)?),
            Self::LineHeight => match keyword.as_str() {
                "normal" => Value::Normal,
                _ => parse_number(name, raw).map_or_else(
                    |_| parse_non_negative_length(name, raw).map(Value::Length),
                    |n| Ok(Value::Number(n)),
                )?,
            },
            Self::Width | Self::Height => match keyword.as_str() {
                "auto" => Value::Auto,
                _ => Value::Length(parse_non_negative_length(name, raw)?),
            },
            Self::MinWidth | Self::MinHeight => match keyword.as_str() {
                "auto" => Value::Length(Length::ZERO),
                _ => Value::Length(parse_non_negative_length(name, raw)?),
            },
            Self::MaxWidth | Self::MaxHeight => match keyword.as_str() {
                "none" => Value::None,
                _ => Value::Length(parse_non_negative_length(name, raw)?),
            },
            Self::MarginTop | Self::MarginRight | Self::MarginBottom | Self::MarginLeft => {
                match keyword.as_str() {
                    "auto" => Value::Auto,
                    _ => Value::Length(parse_length(name, raw)?),
                }
            }
            Self::PaddingTop | Self::PaddingRight | Self::PaddingBottom | Self::PaddingLeft => {
                Value::Length(parse_non_negative_length(name, raw)?)
            }
            Self::BorderTopWidth
            | Self::BorderRightWidth
            | Self::BorderBottomWidth
            | Self::BorderLeftWidth => Value::Length(parse_border_width(name, raw)?),
            Self::BorderSpacing => {
                let parts: Vec<&str> = raw.split_ascii_whitespace().collect();
                match parts.as_slice() {
                    [both] => {
                        let length = parse_non_negative_length(name, both)?;
                        Value::Spacing(length, length)
                    }
                    [h, v] => Value::Spacing(
                        parse_non_negative_length(name, h)?,
                        parse_non_negative_length(name, v)?,
                    ),
                    _ => return Err(ValueError::invalid(name, raw)),
                }
            }
        };
        Ok(value)
    }

    /// `margin-<side>`
    #[must_use]
    pub const fn margin(side: Side) -> Self {
        match side {
            Side::Top => Self::MarginTop,
            Side::Right => Self::MarginRight,
            Side::Bottom => Self::MarginBottom,
            Side::Left => Self::MarginLeft,
        }
    }

    /// `padding-<side>`
    #[must_use]
    pub const fn padding(side: Side) -> Self {
        match side {
            Side::Top => Self::PaddingTop,
            Side::Right => Self::PaddingRight,
            Side::Bottom => Self::PaddingBottom,
            Side::Left => Self::PaddingLeft,
        }
    }

    /// `border-<side>-width`
    #[must_use]
    pub const fn border_width(side: Side) -> Self {
        match side {
            Side::Top => Self::BorderTopWidth,
            Side::Right => Self::BorderRightWidth,
            Side::Bottom => Self::BorderBottomWidth,
            Side::Left => Self::BorderLeftWidth,
        }
    }

    /// `border-<side>-style`
    #[must_use]
    pub const fn border_style(side: Side) -> Self {
        match side {
            Side::Top => Self::BorderTopStyle,
            Side::Right => Self::BorderRightStyle,
            Side::Bottom => Self::BorderBottomStyle,
            Side::Left => Self::BorderLeftStyle,
        }
    }

    /// `border-<side>-color`
    #[must_use]
    pub const fn border_color(side: Side) -> Self {
        match side {
            Side::Top => Self::BorderTopColor,
            Side::Right => Self::BorderRightColor,
            Side::Bottom => Self::BorderBottomColor,
            Side::Left => Self::BorderLeftColor,
        }
    }
}

fn parse_keyword<T: std::str::FromStr>(property: &str, raw: &str) -> Result<T, ValueError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ValueError::invalid(property, raw))
}

fn parse_color_value(raw: &str) -> Result<Value, ValueError> {
    if raw.eq_ignore_ascii_case("currentcolor") {
        return Ok(Value::CurrentColor);
    }
    parse_color(raw).map(Value::Color)
}

/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// Absolute keywords map to the CSS Fonts scaling table around the 16px
/// `medium`; `smaller`/`larger` become parent-relative `em` factors.
pub(crate) fn parse_font_size(raw: &str) -> Result<Length, ValueError> {
    let keyword = raw.trim().to_ascii_lowercase();
    let px = match keyword.as_str() {
        "xx-small" => 9.0,
        "x-small" => 10.0,
        "small" => 13.0,
        "medium" => DEFAULT_FONT_SIZE_PX,
        "large" => 18.0,
        "x-large" => 24.0,
        "xx-large" => 32.0,
        "xxx-large" => 48.0,
        "smaller" => return Ok(Length::Em(0.833)),
        "larger" => return Ok(Length::Em(1.2)),
        _ => return parse_non_negative_length("font-size", raw),
    };
    Ok(Length::Px(px))
}

/// [§ 3.2 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
///
/// `bolder`/`lighter` are approximated as absolute `bold`/`300`.
pub(crate) fn parse_font_weight(raw: &str) -> Result<u16, ValueError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "normal" => Ok(400),
        "bold" | "bolder" => Ok(700),
        "lighter" => Ok(300),
        other => other
            .parse::<u16>()
            .ok()
            .filter(|w| (1..=1000).contains(w))
            .ok_or_else(|| ValueError::invalid("font-weight", raw)),
    }
}

/// `thin`/`medium`/`thick` or a non-negative length.
pub(crate) fn parse_border_width(property: &str, raw: &str) -> Result<Length, ValueError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "thin" => Ok(Length::Px(1.0)),
        "medium" => Ok(Length::Px(3.0)),
        "thick" => Ok(Length::Px(5.0)),
        _ => parse_non_negative_length(property, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn test_property_names_round_trip() {
        for property in Property::iter() {
            assert_eq!(property.name().parse::<Property>(), Ok(property));
        }
        assert_eq!("Margin-Top".parse::<Property>(), Ok(Property::MarginTop));
        assert_eq!(Property::COUNT, Property::iter().count());
    }

    #[test]
    fn test_every_initial_value_is_parseable_kind() {
        // Inheritable properties must have an initial value that a child can
        // receive verbatim.
        for property in Property::iter().filter(|p| p.is_inherited()) {
            assert_ne!(property.initial_value(), Value::Auto, "{}", property.name());
        }
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(
            Property::Width.parse_value("auto"),
            Ok(Value::Auto)
        );
        assert_eq!(
            Property::MaxWidth.parse_value("none"),
            Ok(Value::None)
        );
        assert_eq!(
            Property::LineHeight.parse_value("1.5"),
            Ok(Value::Number(1.5))
        );
        assert_eq!(
            Property::LineHeight.parse_value("20px"),
            Ok(Value::Length(Length::Px(20.0)))
        );
        assert_eq!(
            Property::FontSize.parse_value("large"),
            Ok(Value::Length(Length::Px(18.0)))
        );
        assert_eq!(
            Property::BorderSpacing.parse_value("2px 4px"),
            Ok(Value::Spacing(Length::Px(2.0), Length::Px(4.0)))
        );
        assert_eq!(
            Property::BorderTopColor.parse_value("currentColor"),
            Ok(Value::CurrentColor)
        );
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(Property::Width.parse_value("-3px").is_err());
        assert!(Property::PaddingLeft.parse_value("-1px").is_err());
        assert!(Property::FontWeight.parse_value("heavy").is_err());
        assert!(Property::TextAlign.parse_value("middle").is_err());
        assert!(matches!(
            Property::Color.parse_value(""),
            Err(ValueError::Empty(_))
        ));
        assert!(Property::MarginLeft.parse_value("-3px").is_ok());
    }
}
