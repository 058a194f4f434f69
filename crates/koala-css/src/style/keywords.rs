//! Keyword-valued properties.
//!
//! Each enum parses from its CSS spelling via `strum`'s `EnumString`, so
//! `"text-top".parse::<VerticalAlign>()` works case-insensitively.

use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// [§ 6.1 text-align](https://www.w3.org/TR/css-text-3/#text-align-property)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextAlign {
    /// Lines start at the left edge (`start` in horizontal LTR text).
    #[default]
    #[strum(serialize = "left", serialize = "start")]
    Left,
    /// Lines end at the right edge.
    #[strum(serialize = "right", serialize = "end")]
    Right,
    /// Lines are centred.
    Center,
    /// Treated as `left`: inter-word justification is not implemented.
    Justify,
}

/// [§ 10.8 vertical-align](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
///
/// Inline boxes are top-aligned within their line; in table cells `top`,
/// `middle` and `bottom` position the content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum VerticalAlign {
    /// `baseline`
    #[default]
    Baseline,
    /// `top`
    Top,
    /// `middle`
    Middle,
    /// `bottom`
    Bottom,
    /// `sub`
    Sub,
    /// `super`
    Super,
    /// `text-top`
    TextTop,
    /// `text-bottom`
    TextBottom,
}

/// [§ 3 white-space](https://www.w3.org/TR/css-text-3/#white-space-property)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum WhiteSpace {
    /// Collapse and wrap.
    #[default]
    Normal,
    /// Collapse, never wrap.
    Nowrap,
    /// Preserve, never wrap.
    Pre,
    /// Preserve, wrap.
    PreWrap,
    /// Collapse spaces, preserve newlines, wrap.
    PreLine,
}

impl WhiteSpace {
    /// Whether lines may break at soft wrap opportunities.
    #[must_use]
    pub const fn wraps(self) -> bool {
        !matches!(self, Self::Nowrap | Self::Pre)
    }
}

/// [§ 3.2 font-style](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FontStyle {
    /// `normal`
    #[default]
    Normal,
    /// `italic`
    Italic,
    /// `oblique`
    Oblique,
}

/// [§ 3.2 border-style](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderStyle {
    /// "No border. Color and width are ignored"
    #[default]
    None,
    /// Same as `none` except in collapsed-border conflict resolution.
    Hidden,
    /// `solid`
    Solid,
    /// `dotted`
    Dotted,
    /// `dashed`
    Dashed,
    /// `double`
    Double,
    /// `groove`
    Groove,
    /// `ridge`
    Ridge,
    /// `inset`
    Inset,
    /// `outset`
    Outset,
}

impl BorderStyle {
    /// "the used width is 0" for `none` and `hidden`.
    #[must_use]
    pub const fn has_width(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

/// [§ 11.2 visibility](https://www.w3.org/TR/CSS2/visufx.html#visibility)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Visibility {
    /// `visible`
    #[default]
    Visible,
    /// Laid out but not painted.
    Hidden,
    /// `collapse`
    Collapse,
}

/// [§ 17.6 border-collapse](https://www.w3.org/TR/CSS2/tables.html#borders)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderCollapse {
    /// Separated borders with `border-spacing` between cells.
    #[default]
    Separate,
    /// Collapsed borders: spacing is ignored.
    Collapse,
}

/// Physical box side, used to address the four margin/padding/border longhands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

impl Side {
    /// All four sides in CSS shorthand order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_parse_case_insensitively() {
        assert_eq!("CENTER".parse::<TextAlign>(), Ok(TextAlign::Center));
        assert_eq!("start".parse::<TextAlign>(), Ok(TextAlign::Left));
        assert_eq!("text-top".parse::<VerticalAlign>(), Ok(VerticalAlign::TextTop));
        assert_eq!("pre-wrap".parse::<WhiteSpace>(), Ok(WhiteSpace::PreWrap));
        assert!("sideways".parse::<FontStyle>().is_err());
    }

    #[test]
    fn test_border_style_width() {
        assert!(!BorderStyle::None.has_width());
        assert!(!BorderStyle::Hidden.has_width());
        assert!(BorderStyle::Dashed.has_width());
        assert!(!WhiteSpace::Nowrap.wraps());
    }
}
