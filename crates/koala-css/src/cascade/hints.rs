//! [HTML § 15.3 Presentational hints](https://html.spec.whatwg.org/multipage/rendering.html#presentational-hints)
//!
//! Legacy attributes that map to CSS. They enter the cascade after inline
//! style with zero specificity.

use koala_dom::{DomTree, ElementData, NodeId};

use crate::style::{
    BorderStyle, Declaration, DeclaredValue, Length, Property, Side, TextAlign, Value,
    VerticalAlign, parse_color,
};

/// [§ 2.3.4.4 Parsing dimension values](https://html.spec.whatwg.org/multipage/common-microsyntaxes.html#rules-for-parsing-dimension-values)
///
/// `"120"` is pixels, `"50%"` a percentage; trailing junk after the digits
/// is ignored.
fn parse_dimension(raw: &str) -> Option<Length> {
    let raw = raw.trim();
    let end = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let number = raw[..end].parse::<f32>().ok()?;
    if raw[end..].starts_with('%') {
        Some(Length::Percent(number))
    } else {
        Some(Length::Px(number))
    }
}

fn hint(property: Property, value: Value) -> Declaration {
    Declaration {
        property,
        value: DeclaredValue::Value(value),
        important: false,
    }
}

fn nearest_table<'a>(tree: &'a DomTree, id: NodeId) -> Option<&'a ElementData> {
    tree.ancestors(id)
        .skip(1)
        .filter_map(|a| tree.as_element(a))
        .find(|e| e.is("table"))
}

/// The declarations implied by `element`'s attributes.
pub(super) fn presentational_hints(
    tree: &DomTree,
    id: NodeId,
    element: &ElementData,
) -> Vec<Declaration> {
    let mut out = Vec::new();
    let tag = element.tag_name.as_str();

    // "maps to the dimension property"
    if matches!(
        tag,
        "img" | "table" | "td" | "th" | "col" | "iframe" | "embed" | "object" | "video" | "canvas"
    ) {
        for (attr, property) in [("width", Property::Width), ("height", Property::Height)] {
            if let Some(length) = element.attr(attr).and_then(parse_dimension) {
                out.push(hint(property, Value::Length(length)));
            }
        }
    }

    if matches!(tag, "body" | "table" | "thead" | "tbody" | "tfoot" | "tr" | "td" | "th") {
        if let Some(color) = element.attr("bgcolor").and_then(|c| parse_color(c).ok()) {
            out.push(hint(Property::BackgroundColor, Value::Color(color)));
        }
    }

    if matches!(
        tag,
        "div" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "caption" | "td" | "th" | "tr"
            | "thead" | "tbody" | "tfoot"
    ) {
        let align = element
            .attr("align")
            .and_then(|a| a.trim().parse::<TextAlign>().ok());
        if let Some(align) = align {
            out.push(hint(Property::TextAlign, Value::TextAlign(align)));
        }
    }

    if matches!(tag, "td" | "th" | "tr" | "thead" | "tbody" | "tfoot") {
        let valign = element
            .attr("valign")
            .and_then(|a| a.trim().parse::<VerticalAlign>().ok());
        if let Some(valign) = valign {
            out.push(hint(Property::VerticalAlign, Value::VerticalAlign(valign)));
        }
    }

    if tag == "font" {
        if let Some(color) = element.attr("color").and_then(|c| parse_color(c).ok()) {
            out.push(hint(Property::Color, Value::Color(color)));
        }
    }

    if tag == "table" {
        // [§ 15.3.10 Tables](https://html.spec.whatwg.org/multipage/rendering.html#tables-2)
        // "the border attribute ... maps to the border-*-width properties
        // ... border-*-style properties to outset"
        if let Some(border) = element.attr("border") {
            let width = parse_dimension(border).unwrap_or(Length::Px(1.0));
            for side in Side::ALL {
                out.push(hint(Property::border_width(side), Value::Length(width)));
                out.push(hint(
                    Property::border_style(side),
                    Value::BorderStyle(BorderStyle::Outset),
                ));
            }
        }
        if let Some(spacing) = element.attr("cellspacing").and_then(parse_dimension) {
            out.push(hint(Property::BorderSpacing, Value::Spacing(spacing, spacing)));
        }
        if element
            .attr("align")
            .is_some_and(|a| a.trim().eq_ignore_ascii_case("center"))
        {
            out.push(hint(Property::MarginLeft, Value::Auto));
            out.push(hint(Property::MarginRight, Value::Auto));
        }
    }

    if matches!(tag, "td" | "th") {
        if let Some(table) = nearest_table(tree, id) {
            // "td and th elements inside a table with a border attribute
            // greater than zero get a 1px inset border"
            let bordered = table
                .attr("border")
                .and_then(parse_dimension)
                .is_some_and(|w| w.resolve_or_zero(None) > 0.0);
            if bordered {
                for side in Side::ALL {
                    out.push(hint(
                        Property::border_width(side),
                        Value::Length(Length::Px(1.0)),
                    ));
                    out.push(hint(
                        Property::border_style(side),
                        Value::BorderStyle(BorderStyle::Inset),
                    ));
                }
            }
            if let Some(padding) = table.attr("cellpadding").and_then(parse_dimension) {
                for side in Side::ALL {
                    out.push(hint(Property::padding(side), Value::Length(padding)));
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("120"), Some(Length::Px(120.0)));
        assert_eq!(parse_dimension(" 50% "), Some(Length::Percent(50.0)));
        assert_eq!(parse_dimension("40px"), Some(Length::Px(40.0)));
        assert_eq!(parse_dimension("wide"), None);
    }

    #[test]
    fn test_cell_hints_from_table() {
        let mut tree = DomTree::new();
        let table = tree.append_element(
            NodeId::ROOT,
            ElementData::new("table")
                .with_attr("border", Some("2"))
                .with_attr("cellpadding", Some("4")),
        );
        let tr = tree.append_element(table, ElementData::new("tr"));
        let td = tree.append_element(tr, ElementData::new("td").with_attr("width", Some("30")));
        let element = tree.as_element(td).unwrap().clone();

        let hints = presentational_hints(&tree, td, &element);
        assert!(hints.contains(&hint(Property::Width, Value::Length(Length::Px(30.0)))));
        assert!(hints.contains(&hint(
            Property::PaddingLeft,
            Value::Length(Length::Px(4.0))
        )));
        assert!(hints.contains(&hint(
            Property::BorderTopStyle,
            Value::BorderStyle(BorderStyle::Inset)
        )));
    }
}
