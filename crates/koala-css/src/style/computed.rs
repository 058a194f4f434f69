//! CSS Computed Style
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value..."

use std::collections::BTreeMap;

use serde::Serialize;
use strum::IntoEnumIterator;

use super::color::ColorValue;
use super::display::DisplayValue;
use super::keywords::{
    BorderCollapse, BorderStyle, FontStyle, Side, TextAlign, VerticalAlign, Visibility, WhiteSpace,
};
use super::length::{DEFAULT_FONT_SIZE_PX, Length};
use super::property::Property;
use super::value::Value;
use crate::selector::Specificity;

/// Where a property's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSource {
    /// A matching declaration (or an explicit `inherit`/`initial`).
    Declared,
    /// Copied from the parent because nothing on this node set it.
    Inherited,
    /// The property's initial value.
    Initial,
}

/// One property slot: the value plus the precedence that put it there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleEntry {
    /// The computed value.
    pub value: Value,
    /// Specificity of the winning declaration; zero for inherited/initial.
    pub specificity: Specificity,
    /// Whether the winning declaration was `!important`.
    pub important: bool,
    /// Where the value came from.
    pub source: ValueSource,
}

impl StyleEntry {
    const fn initial(value: Value) -> Self {
        Self {
            value,
            specificity: Specificity::ZERO,
            important: false,
            source: ValueSource::Initial,
        }
    }
}

/// Computed styles for an element.
///
/// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// Every [`Property`] always has an entry: a fresh style holds initial
/// values, and the cascade overwrites them. Lengths are absolute pixels or
/// percentages; percentages are resolved during layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedStyle {
    entries: BTreeMap<Property, StyleEntry>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            entries: Property::iter()
                .map(|p| (p, StyleEntry::initial(p.initial_value())))
                .collect(),
        }
    }
}

impl ComputedStyle {
    /// A style with every property at its initial value.
    #[must_use]
    pub fn initial() -> Self {
        Self::default()
    }

    /// [§ 7.2 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// Inherited properties copied from `parent`, the rest initial. Used for
    /// text runs and anonymous boxes, which have no declarations of their own.
    #[must_use]
    pub fn inherit_from(parent: &Self) -> Self {
        let mut style = Self::default();
        for (property, entry) in &parent.entries {
            if property.is_inherited() {
                let _ = style.entries.insert(
                    *property,
                    StyleEntry {
                        value: entry.value.clone(),
                        specificity: Specificity::ZERO,
                        important: false,
                        source: ValueSource::Inherited,
                    },
                );
            }
        }
        style
    }

    /// The full entry for `property`.
    #[must_use]
    pub fn entry(&self, property: Property) -> Option<&StyleEntry> {
        self.entries.get(&property)
    }

    /// The value of `property`.
    #[must_use]
    pub fn value(&self, property: Property) -> Option<&Value> {
        self.entries.get(&property).map(|e| &e.value)
    }

    /// Iterate over all entries in property order.
    pub fn entries(&self) -> impl Iterator<Item = (Property, &StyleEntry)> {
        self.entries.iter().map(|(p, e)| (*p, e))
    }

    /// Replace the entry for `property`.
    pub fn insert(&mut self, property: Property, entry: StyleEntry) {
        let _ = self.entries.insert(property, entry);
    }

    /// Set `property` as if declared with zero specificity.
    pub fn set(&mut self, property: Property, value: Value) {
        self.insert(
            property,
            StyleEntry {
                value,
                specificity: Specificity::ZERO,
                important: false,
                source: ValueSource::Declared,
            },
        );
    }

    fn length(&self, property: Property) -> Option<Length> {
        self.value(property).and_then(Value::as_length)
    }

    /// The `display` value; `None` is `display: none`.
    #[must_use]
    pub fn display(&self) -> Option<DisplayValue> {
        match self.value(Property::Display) {
            Some(Value::Display(display)) => *display,
            _ => Some(DisplayValue::inline()),
        }
    }

    /// [§ 2.6 display: none](https://www.w3.org/TR/css-display-3/#valdef-display-none)
    ///
    /// "The element and its descendants generate no boxes or text runs."
    #[must_use]
    pub fn is_display_none(&self) -> bool {
        self.display().is_none()
    }

    /// `width`; `None` is `auto`.
    #[must_use]
    pub fn width(&self) -> Option<Length> {
        self.length(Property::Width)
    }

    /// `height`; `None` is `auto`.
    #[must_use]
    pub fn height(&self) -> Option<Length> {
        self.length(Property::Height)
    }

    /// `min-width`
    #[must_use]
    pub fn min_width(&self) -> Length {
        self.length(Property::MinWidth).unwrap_or(Length::ZERO)
    }

    /// `min-height`
    #[must_use]
    pub fn min_height(&self) -> Length {
        self.length(Property::MinHeight).unwrap_or(Length::ZERO)
    }

    /// `max-width`; `None` is `none`.
    #[must_use]
    pub fn max_width(&self) -> Option<Length> {
        self.length(Property::MaxWidth)
    }

    /// `max-height`; `None` is `none`.
    #[must_use]
    pub fn max_height(&self) -> Option<Length> {
        self.length(Property::MaxHeight)
    }

    /// `margin-<side>`; `None` is `auto`.
    #[must_use]
    pub fn margin(&self, side: Side) -> Option<Length> {
        self.length(Property::margin(side))
    }

    /// `padding-<side>`
    #[must_use]
    pub fn padding(&self, side: Side) -> Length {
        self.length(Property::padding(side)).unwrap_or(Length::ZERO)
    }

    /// `border-<side>-style`
    #[must_use]
    pub fn border_style(&self, side: Side) -> BorderStyle {
        match self.value(Property::border_style(side)) {
            Some(Value::BorderStyle(style)) => *style,
            _ => BorderStyle::None,
        }
    }

    /// [§ 4.3 border-width](https://www.w3.org/TR/css-backgrounds-3/#border-width)
    ///
    /// The used width: "computed value: absolute length, snapped as a border
    /// width; zero if the border style is none or hidden".
    #[must_use]
    pub fn border_width(&self, side: Side) -> f32 {
        if !self.border_style(side).has_width() {
            return 0.0;
        }
        self.length(Property::border_width(side))
            .map_or(0.0, |l| l.resolve_or_zero(None))
    }

    /// `border-<side>-color` with `currentcolor` resolved.
    #[must_use]
    pub fn border_color(&self, side: Side) -> ColorValue {
        match self.value(Property::border_color(side)) {
            Some(Value::Color(color)) => *color,
            _ => self.color(),
        }
    }

    /// `color`
    #[must_use]
    pub fn color(&self) -> ColorValue {
        match self.value(Property::Color) {
            Some(Value::Color(color)) => *color,
            _ => ColorValue::BLACK,
        }
    }

    /// `background-color`
    #[must_use]
    pub fn background_color(&self) -> ColorValue {
        match self.value(Property::BackgroundColor) {
            Some(Value::Color(color)) => *color,
            Some(Value::CurrentColor) => self.color(),
            _ => ColorValue::TRANSPARENT,
        }
    }

    /// Font size in pixels.
    #[must_use]
    pub fn font_size_px(&self) -> f32 {
        self.length(Property::FontSize)
            .and_then(|l| l.resolve(Some(DEFAULT_FONT_SIZE_PX)))
            .unwrap_or(DEFAULT_FONT_SIZE_PX)
    }

    /// Numeric `font-weight`.
    #[must_use]
    pub fn font_weight(&self) -> u16 {
        match self.value(Property::FontWeight) {
            Some(Value::FontWeight(weight)) => *weight,
            _ => 400,
        }
    }

    /// `font-style`
    #[must_use]
    pub fn font_style(&self) -> FontStyle {
        match self.value(Property::FontStyle) {
            Some(Value::FontStyle(style)) => *style,
            _ => FontStyle::Normal,
        }
    }

    /// The first family in `font-family`, unquoted.
    #[must_use]
    pub fn font_family(&self) -> &str {
        match self.value(Property::FontFamily) {
            Some(Value::FontFamily(list)) => list
                .split(',')
                .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
                .find(|f| !f.is_empty())
                .unwrap_or("sans-serif"),
            _ => "sans-serif",
        }
    }

    /// [§ 10.8 line-height](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
    ///
    /// Used line height in pixels; `None` for `normal`, where the font's own
    /// metrics decide.
    #[must_use]
    pub fn line_height(&self) -> Option<f32> {
        match self.value(Property::LineHeight) {
            Some(Value::Number(factor)) => Some(factor * self.font_size_px()),
            Some(Value::Length(length)) => length.resolve(Some(self.font_size_px())),
            _ => None,
        }
    }

    /// `text-align`
    #[must_use]
    pub fn text_align(&self) -> TextAlign {
        match self.value(Property::TextAlign) {
            Some(Value::TextAlign(align)) => *align,
            _ => TextAlign::Left,
        }
    }

    /// `vertical-align`
    #[must_use]
    pub fn vertical_align(&self) -> VerticalAlign {
        match self.value(Property::VerticalAlign) {
            Some(Value::VerticalAlign(align)) => *align,
            _ => VerticalAlign::Baseline,
        }
    }

    /// `white-space`
    #[must_use]
    pub fn white_space(&self) -> WhiteSpace {
        match self.value(Property::WhiteSpace) {
            Some(Value::WhiteSpace(ws)) => *ws,
            _ => WhiteSpace::Normal,
        }
    }

    /// `visibility`
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        match self.value(Property::Visibility) {
            Some(Value::Visibility(v)) => *v,
            _ => Visibility::Visible,
        }
    }

    /// `border-spacing` as (horizontal, vertical) pixels. Zero under
    /// `border-collapse: collapse`.
    #[must_use]
    pub fn border_spacing(&self) -> (f32, f32) {
        if self.border_collapse() == BorderCollapse::Collapse {
            return (0.0, 0.0);
        }
        match self.value(Property::BorderSpacing) {
            Some(Value::Spacing(h, v)) => (h.resolve_or_zero(None), v.resolve_or_zero(None)),
            _ => (0.0, 0.0),
        }
    }

    /// `border-collapse`
    #[must_use]
    pub fn border_collapse(&self) -> BorderCollapse {
        match self.value(Property::BorderCollapse) {
            Some(Value::BorderCollapse(c)) => *c,
            _ => BorderCollapse::Separate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_style_is_complete() {
        let style = ComputedStyle::initial();
        for property in Property::iter() {
            let entry = style.entry(property).unwrap();
            assert_eq!(entry.source, ValueSource::Initial);
            assert_eq!(entry.value, property.initial_value());
        }
        assert_eq!(style.display(), Some(DisplayValue::inline()));
        assert!(style.width().is_none());
        assert!(style.max_width().is_none());
        assert!((style.font_size_px() - 16.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_border_width_needs_style() {
        let mut style = ComputedStyle::initial();
        style.set(Property::BorderTopWidth, Value::Length(Length::Px(4.0)));
        assert!(style.border_width(Side::Top).abs() < f32::EPSILON);
        style.set(
            Property::BorderTopStyle,
            Value::BorderStyle(BorderStyle::Solid),
        );
        assert!((style.border_width(Side::Top) - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_border_color_defaults_to_color() {
        let mut style = ComputedStyle::initial();
        style.set(Property::Color, Value::Color(ColorValue::rgb(1, 2, 3)));
        assert_eq!(style.border_color(Side::Left), ColorValue::rgb(1, 2, 3));
    }

    #[test]
    fn test_inherit_from_copies_only_inherited() {
        let mut parent = ComputedStyle::initial();
        parent.set(Property::Color, Value::Color(ColorValue::WHITE));
        parent.set(Property::Width, Value::Length(Length::Px(50.0)));
        let child = ComputedStyle::inherit_from(&parent);
        assert_eq!(child.color(), ColorValue::WHITE);
        assert_eq!(
            child.entry(Property::Color).map(|e| e.source),
            Some(ValueSource::Inherited)
        );
        assert!(child.width().is_none());
    }

    #[test]
    fn test_font_family_first_unquoted() {
        let mut style = ComputedStyle::initial();
        style.set(
            Property::FontFamily,
            Value::FontFamily("'Noto Sans', serif".to_string()),
        );
        assert_eq!(style.font_family(), "Noto Sans");
    }

    #[test]
    fn test_line_height_number_scales_with_font() {
        let mut style = ComputedStyle::initial();
        style.set(Property::FontSize, Value::Length(Length::Px(10.0)));
        style.set(Property::LineHeight, Value::Number(1.5));
        assert_eq!(style.line_height(), Some(15.0));
    }
}
