//! Declarations: one `property: value` pair, with shorthands expanded.
//!
//! [§ 3 Shorthand Properties](https://www.w3.org/TR/css-cascade-4/#shorthand)
//! "When a shorthand property is declared, it sets all of its longhand
//! sub-properties." Expansion happens here so the cascade only ever sees
//! longhands.

use std::str::FromStr;

use strum_macros::EnumString;

use super::color::parse_color;
use super::keywords::{BorderStyle, FontStyle, Side};
use super::property::{Property, parse_border_width, parse_font_size, parse_font_weight};
use super::value::Value;
use crate::error::ValueError;

/// The value half of a declaration after CSS-wide keywords are recognised.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredValue {
    /// An ordinary value, already parsed for its property.
    Value(Value),
    /// [§ 7.3.3 inherit](https://www.w3.org/TR/css-cascade-4/#inherit)
    /// "the cascaded value of the property on the element is the computed
    /// value of the property on the element's parent"
    Inherit,
    /// [§ 7.3.1 initial](https://www.w3.org/TR/css-cascade-4/#initial)
    Initial,
}

/// A single longhand declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The longhand it sets.
    pub property: Property,
    /// What it sets it to.
    pub value: DeclaredValue,
    /// Whether `!important` was present.
    pub important: bool,
}

/// Shorthands that expand into several longhands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
enum Shorthand {
    Margin,
    Padding,
    Border,
    BorderTop,
    BorderRight,
    BorderBottom,
    BorderLeft,
    BorderWidth,
    BorderStyle,
    BorderColor,
    Background,
    Font,
    MarginBlockStart,
    MarginBlockEnd,
    MarginInlineStart,
    MarginInlineEnd,
    PaddingBlockStart,
    PaddingBlockEnd,
    PaddingInlineStart,
    PaddingInlineEnd,
}

/// Strip a trailing `!important`, tolerating whitespace before and after `!`.
#[must_use]
pub fn strip_important(raw: &str) -> (&str, bool) {
    let trimmed = raw.trim_end();
    if let Some(bang) = trimmed.rfind('!') {
        let keyword = trimmed[bang + 1..].trim();
        if keyword.eq_ignore_ascii_case("important") {
            return (trimmed[..bang].trim_end(), true);
        }
    }
    (trimmed, false)
}

/// Split a value into whitespace-separated components, keeping anything
/// inside parentheses together so `rgb(1, 2, 3)` stays one component.
#[must_use]
pub fn split_components(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, c) in raw.char_indices() {
        match c {
            '(' => {
                depth += 1;
                if start.is_none() {
                    start = Some(i);
                }
            }
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&raw[s..i]);
                }
            }
            _ if start.is_none() => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        parts.push(&raw[s..]);
    }
    parts
}

/// [§ 8.3 margin](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// The 1-4 value box shorthand pattern: "If there is only one component
/// value, it applies to all sides. If there are two values, the top and
/// bottom are set to the first value and the right and left are set to the
/// second..."
fn expand_box_sides<'a>(parts: &[&'a str]) -> Option<[&'a str; 4]> {
    match *parts {
        [all] => Some([all, all, all, all]),
        [tb, rl] => Some([tb, rl, tb, rl]),
        [t, rl, b] => Some([t, rl, b, rl]),
        [t, r, b, l] => Some([t, r, b, l]),
        _ => None,
    }
}

/// Parse one `name: value` pair into longhand declarations.
///
/// CSS-wide keywords (`inherit`, `initial`, `unset`) apply to every
/// longhand the name expands to. `unset` becomes `inherit` for inherited
/// properties and `initial` otherwise.
///
/// # Errors
///
/// [`ValueError::UnknownProperty`] for names that are neither longhands nor
/// supported shorthands; otherwise whatever the value parser reports.
pub fn parse_declaration(name: &str, raw: &str) -> Result<Vec<Declaration>, ValueError> {
    let name = name.trim();
    let (value, important) = strip_important(raw);
    if value.is_empty() {
        return Err(ValueError::Empty(name.to_string()));
    }

    let longhands = longhands_of(name)?;
    if let Some(keyword) = css_wide_keyword(value) {
        return Ok(longhands
            .into_iter()
            .map(|property| Declaration {
                property,
                value: match keyword {
                    CssWide::Unset if property.is_inherited() => DeclaredValue::Inherit,
                    CssWide::Unset | CssWide::Initial => DeclaredValue::Initial,
                    CssWide::Inherit => DeclaredValue::Inherit,
                },
                important,
            })
            .collect());
    }

    let pairs = match Property::from_str(name) {
        Ok(property) => vec![(property, property.parse_value(value)?)],
        Err(_) => {
            let shorthand = Shorthand::from_str(name)
                .map_err(|_| ValueError::UnknownProperty(name.to_string()))?;
            expand_shorthand(shorthand, name, value)?
        }
    };

    Ok(pairs
        .into_iter()
        .map(|(property, value)| Declaration {
            property,
            value: DeclaredValue::Value(value),
            important,
        })
        .collect())
}

#[derive(Clone, Copy)]
enum CssWide {
    Inherit,
    Initial,
    Unset,
}

fn css_wide_keyword(value: &str) -> Option<CssWide> {
    match value.trim().to_ascii_lowercase().as_str() {
        "inherit" => Some(CssWide::Inherit),
        "initial" => Some(CssWide::Initial),
        "unset" => Some(CssWide::Unset),
        _ => None,
    }
}

/// The longhands a property name covers.
fn longhands_of(name: &str) -> Result<Vec<Property>, ValueError> {
    if let Ok(property) = Property::from_str(name) {
        return Ok(vec![property]);
    }
    let shorthand =
        Shorthand::from_str(name).map_err(|_| ValueError::UnknownProperty(name.to_string()))?;
    let per_side = |f: fn(Side) -> Property| Side::ALL.iter().map(|&s| f(s)).collect::<Vec<_>>();
    let border_side = |side: Side| {
        vec![
            Property::border_width(side),
            Property::border_style(side),
            Property::border_color(side),
        ]
    };
    Ok(match shorthand {
        Shorthand::Margin => per_side(Property::margin),
        Shorthand::Padding => per_side(Property::padding),
        Shorthand::BorderWidth => per_side(Property::border_width),
        Shorthand::BorderStyle => per_side(Property::border_style),
        Shorthand::BorderColor => per_side(Property::border_color),
        Shorthand::Border => Side::ALL.iter().flat_map(|&s| border_side(s)).collect(),
        Shorthand::BorderTop => border_side(Side::Top),
        Shorthand::BorderRight => border_side(Side::Right),
        Shorthand::BorderBottom => border_side(Side::Bottom),
        Shorthand::BorderLeft => border_side(Side::Left),
        Shorthand::Background => vec![Property::BackgroundColor],
        Shorthand::Font => vec![
            Property::FontStyle,
            Property::FontWeight,
            Property::FontSize,
            Property::LineHeight,
            Property::FontFamily,
        ],
        Shorthand::MarginBlockStart => vec![Property::MarginTop],
        Shorthand::MarginBlockEnd => vec![Property::MarginBottom],
        Shorthand::MarginInlineStart => vec![Property::MarginLeft],
        Shorthand::MarginInlineEnd => vec![Property::MarginRight],
        Shorthand::PaddingBlockStart => vec![Property::PaddingTop],
        Shorthand::PaddingBlockEnd => vec![Property::PaddingBottom],
        Shorthand::PaddingInlineStart => vec![Property::PaddingLeft],
        Shorthand::PaddingInlineEnd => vec![Property::PaddingRight],
    })
}

fn expand_shorthand(
    shorthand: Shorthand,
    name: &str,
    value: &str,
) -> Result<Vec<(Property, Value)>, ValueError> {
    let parts = split_components(value);

    let four_sides = |f: fn(Side) -> Property| -> Result<Vec<(Property, Value)>, ValueError> {
        let sides = expand_box_sides(&parts).ok_or_else(|| ValueError::invalid(name, value))?;
        Side::ALL
            .iter()
            .zip(sides)
            .map(|(&side, raw)| {
                let property = f(side);
                property.parse_value(raw).map(|v| (property, v))
            })
            .collect()
    };

    // [§ 3.1 writing modes](https://www.w3.org/TR/css-writing-modes-4/)
    // Horizontal-tb, left-to-right: block-start is top, inline-start is left.
    let single = |property: Property| -> Result<Vec<(Property, Value)>, ValueError> {
        Ok(vec![(property, property.parse_value(value)?)])
    };

    match shorthand {
        Shorthand::Margin => four_sides(Property::margin),
        Shorthand::Padding => four_sides(Property::padding),
        Shorthand::BorderWidth => four_sides(Property::border_width),
        Shorthand::BorderStyle => four_sides(Property::border_style),
        Shorthand::BorderColor => four_sides(Property::border_color),
        Shorthand::Border => expand_border(&Side::ALL, name, &parts),
        Shorthand::BorderTop => expand_border(&[Side::Top], name, &parts),
        Shorthand::BorderRight => expand_border(&[Side::Right], name, &parts),
        Shorthand::BorderBottom => expand_border(&[Side::Bottom], name, &parts),
        Shorthand::BorderLeft => expand_border(&[Side::Left], name, &parts),
        Shorthand::Background => expand_background(&parts),
        Shorthand::Font => expand_font(name, value, &parts),
        Shorthand::MarginBlockStart => single(Property::MarginTop),
        Shorthand::MarginBlockEnd => single(Property::MarginBottom),
        Shorthand::MarginInlineStart => single(Property::MarginLeft),
        Shorthand::MarginInlineEnd => single(Property::MarginRight),
        Shorthand::PaddingBlockStart => single(Property::PaddingTop),
        Shorthand::PaddingBlockEnd => single(Property::PaddingBottom),
        Shorthand::PaddingInlineStart => single(Property::PaddingLeft),
        Shorthand::PaddingInlineEnd => single(Property::PaddingRight),
    }
}

/// [§ 4.4 border](https://www.w3.org/TR/css-backgrounds-3/#border-shorthands)
///
/// "`<line-width> || <line-style> || <color>`": components in any order,
/// each at most once. Omitted parts reset to their initial values.
fn expand_border(
    sides: &[Side],
    name: &str,
    parts: &[&str],
) -> Result<Vec<(Property, Value)>, ValueError> {
    let mut width = None;
    let mut style = None;
    let mut color = None;

    for part in parts {
        if style.is_none() {
            if let Ok(parsed) = part.parse::<BorderStyle>() {
                style = Some(Value::BorderStyle(parsed));
                continue;
            }
        }
        if width.is_none() {
            if let Ok(length) = parse_border_width(name, part) {
                width = Some(Value::Length(length));
                continue;
            }
        }
        if color.is_none() {
            if part.eq_ignore_ascii_case("currentcolor") {
                color = Some(Value::CurrentColor);
                continue;
            }
            if let Ok(parsed) = parse_color(part) {
                color = Some(Value::Color(parsed));
                continue;
            }
        }
        return Err(ValueError::invalid(name, part));
    }

    let mut out = Vec::with_capacity(sides.len() * 3);
    for &side in sides {
        let w = Property::border_width(side);
        let s = Property::border_style(side);
        let c = Property::border_color(side);
        out.push((w, width.clone().unwrap_or_else(|| w.initial_value())));
        out.push((s, style.clone().unwrap_or_else(|| s.initial_value())));
        out.push((c, color.clone().unwrap_or_else(|| c.initial_value())));
    }
    Ok(out)
}

/// [§ 3.10 background](https://www.w3.org/TR/css-backgrounds-3/#background)
///
/// Only the colour layer is kept; images and positions are ignored.
fn expand_background(parts: &[&str]) -> Result<Vec<(Property, Value)>, ValueError> {
    let color = parts
        .iter()
        .rev()
        .find_map(|part| Property::BackgroundColor.parse_value(part).ok())
        .unwrap_or_else(|| Property::BackgroundColor.initial_value());
    Ok(vec![(Property::BackgroundColor, color)])
}

/// [§ 3.7 font](https://www.w3.org/TR/css-fonts-4/#font-prop)
///
/// "`[ <font-style> || <font-weight> ]? <font-size> [ / <line-height> ]? <font-family>`"
/// Small-caps and stretch keywords are accepted and dropped.
fn expand_font(name: &str, value: &str, parts: &[&str]) -> Result<Vec<(Property, Value)>, ValueError> {
    let mut style = None;
    let mut weight = None;
    let mut index = 0;

    while index < parts.len() {
        let part = parts[index];
        if part.eq_ignore_ascii_case("normal") || part.eq_ignore_ascii_case("small-caps") {
            index += 1;
        } else if let Some(parsed) = style
            .is_none()
            .then(|| part.parse::<FontStyle>().ok())
            .flatten()
        {
            style = Some(Value::FontStyle(parsed));
            index += 1;
        } else if let Some(parsed) = weight
            .is_none()
            .then(|| parse_font_weight(part).ok())
            .flatten()
        {
            weight = Some(Value::FontWeight(parsed));
            index += 1;
        } else {
            break;
        }
    }

    let Some(size_part) = parts.get(index) else {
        return Err(ValueError::invalid(name, value));
    };
    let (size_raw, line_height_raw) = match size_part.split_once('/') {
        Some((size, lh)) => (size, Some(lh)),
        None => (*size_part, None),
    };
    let size = parse_font_size(size_raw)?;
    let line_height = line_height_raw
        .filter(|lh| !lh.is_empty())
        .map(|lh| Property::LineHeight.parse_value(lh))
        .transpose()?
        .unwrap_or(Value::Normal);

    let family = parts[index + 1..].join(" ");
    if family.is_empty() {
        return Err(ValueError::invalid(name, value));
    }

    Ok(vec![
        (
            Property::FontStyle,
            style.unwrap_or_else(|| Property::FontStyle.initial_value()),
        ),
        (
            Property::FontWeight,
            weight.unwrap_or_else(|| Property::FontWeight.initial_value()),
        ),
        (Property::FontSize, Value::Length(size)),
        (Property::LineHeight, line_height),
        (Property::FontFamily, Value::FontFamily(family)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::length::Length;

    fn values(decls: &[Declaration]) -> Vec<(Property, DeclaredValue)> {
        decls
            .iter()
            .map(|d| (d.property, d.value.clone()))
            .collect()
    }

    #[test]
    fn test_strip_important() {
        assert_eq!(strip_important("red !important"), ("red", true));
        assert_eq!(strip_important("red ! IMPORTANT "), ("red", true));
        assert_eq!(strip_important("red"), ("red", false));
        assert_eq!(strip_important("red !imp"), ("red !imp", false));
    }

    #[test]
    fn test_split_components_keeps_functions() {
        assert_eq!(
            split_components("1px  solid rgb(1, 2, 3)"),
            vec!["1px", "solid", "rgb(1, 2, 3)"]
        );
    }

    #[test]
    fn test_margin_shorthand_three_values() {
        let decls = parse_declaration("margin", "1px 2px 3px").unwrap();
        let px = |v| DeclaredValue::Value(Value::Length(Length::Px(v)));
        assert_eq!(
            values(&decls),
            vec![
                (Property::MarginTop, px(1.0)),
                (Property::MarginRight, px(2.0)),
                (Property::MarginBottom, px(3.0)),
                (Property::MarginLeft, px(2.0)),
            ]
        );
    }

    #[test]
    fn test_border_shorthand_any_order() {
        let decls = parse_declaration("border-left", "red 2px dashed").unwrap();
        assert_eq!(decls.len(), 3);
        assert!(decls.iter().all(|d| !d.important));
        assert_eq!(
            decls[0].value,
            DeclaredValue::Value(Value::Length(Length::Px(2.0)))
        );
        assert_eq!(
            decls[1].value,
            DeclaredValue::Value(Value::BorderStyle(BorderStyle::Dashed))
        );
    }

    #[test]
    fn test_font_shorthand() {
        let decls = parse_declaration("font", "italic bold 12px/1.5 \"Times New\", serif").unwrap();
        let got = values(&decls);
        assert!(got.contains(&(
            Property::FontSize,
            DeclaredValue::Value(Value::Length(Length::Px(12.0)))
        )));
        assert!(got.contains(&(
            Property::LineHeight,
            DeclaredValue::Value(Value::Number(1.5))
        )));
        assert!(got.contains(&(
            Property::FontWeight,
            DeclaredValue::Value(Value::FontWeight(700))
        )));
        assert!(got.contains(&(
            Property::FontFamily,
            DeclaredValue::Value(Value::FontFamily("\"Times New\", serif".to_string()))
        )));
    }

    #[test]
    fn test_css_wide_keywords() {
        let decls = parse_declaration("padding", "inherit !important").unwrap();
        assert_eq!(decls.len(), 4);
        assert!(decls.iter().all(|d| d.important && d.value == DeclaredValue::Inherit));

        let unset = parse_declaration("color", "unset").unwrap();
        assert_eq!(unset[0].value, DeclaredValue::Inherit);
        let unset = parse_declaration("width", "unset").unwrap();
        assert_eq!(unset[0].value, DeclaredValue::Initial);
    }

    #[test]
    fn test_logical_margins() {
        let decls = parse_declaration("margin-inline-start", "4px").unwrap();
        assert_eq!(decls[0].property, Property::MarginLeft);
    }

    #[test]
    fn test_unknown_property() {
        assert_eq!(
            parse_declaration("float", "left"),
            Err(ValueError::UnknownProperty("float".to_string()))
        );
        assert!(matches!(
            parse_declaration("color", "  "),
            Err(ValueError::Empty(_))
        ));
    }
}
