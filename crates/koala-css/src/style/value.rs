//! The value stored for one property of one element.

use serde::Serialize;

use super::color::ColorValue;
use super::display::DisplayValue;
use super::keywords::{
    BorderCollapse, BorderStyle, FontStyle, TextAlign, VerticalAlign, Visibility, WhiteSpace,
};
use super::length::{Length, LengthContext};

/// A specified or computed property value.
///
/// Which variants a property accepts is decided by
/// [`Property::parse_value`](super::Property::parse_value); the typed
/// accessors on [`ComputedStyle`](super::ComputedStyle) rely on that pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Value {
    /// `auto` for sizes and margins.
    Auto,
    /// `normal` for `line-height`.
    Normal,
    /// `none` for `max-width`/`max-height`.
    None,
    /// A length or percentage.
    Length(Length),
    /// A unitless number (`line-height: 1.5`).
    Number(f32),
    /// A resolved colour.
    Color(ColorValue),
    /// `currentcolor`: resolves to the element's `color`.
    CurrentColor,
    /// `display`; `None` is `display: none`.
    Display(Option<DisplayValue>),
    /// The raw `font-family` list.
    FontFamily(String),
    /// Numeric weight, 1..=1000.
    FontWeight(u16),
    /// `font-style`
    FontStyle(FontStyle),
    /// `text-align`
    TextAlign(TextAlign),
    /// `vertical-align`
    VerticalAlign(VerticalAlign),
    /// `white-space`
    WhiteSpace(WhiteSpace),
    /// `visibility`
    Visibility(Visibility),
    /// `border-*-style`
    BorderStyle(BorderStyle),
    /// `border-collapse`
    BorderCollapse(BorderCollapse),
    /// `border-spacing`: horizontal, vertical.
    Spacing(Length, Length),
}

impl Value {
    /// Resolve relative length units inside this value.
    #[must_use]
    pub fn absolutize(self, ctx: &LengthContext) -> Self {
        match self {
            Self::Length(length) => Self::Length(length.absolutize(ctx)),
            Self::Spacing(h, v) => Self::Spacing(h.absolutize(ctx), v.absolutize(ctx)),
            other => other,
        }
    }

    /// The length inside, if any.
    #[must_use]
    pub const fn as_length(&self) -> Option<Length> {
        match self {
            Self::Length(length) => Some(*length),
            _ => None,
        }
    }
}
