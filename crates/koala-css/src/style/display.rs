//! CSS Display property types and parsing
//!
//! [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)

use serde::Serialize;

use crate::error::ValueError;

// "The display property defines an element's display type, which consists of
// the two basic qualities of how an element generates boxes:
//   - the inner display type, which defines the kind of formatting context
//     it generates, dictating how its descendant boxes are laid out.
//   - the outer display type, which dictates how the principal box itself
//     participates in flow layout."

/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OuterDisplayType {
    /// "The element generates a block-level box when placed in flow layout."
    Block,
    /// "The element generates an inline-level box when placed in flow layout."
    Inline,
}

/// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
///
/// The table-internal roles from [§ 2.4 Layout-Internal Display Types](https://www.w3.org/TR/css-display-3/#layout-specific-display)
/// are folded in here: for box generation and layout they behave as distinct
/// inner types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InnerDisplayType {
    /// "The element lays out its contents using flow layout (block-and-inline layout)."
    Flow,
    /// Flow layout that always establishes a new block formatting context.
    FlowRoot,
    /// "The element lays out its contents using table layout."
    Table,
    /// `table-row-group`, `table-header-group`, `table-footer-group`
    TableRowGroup,
    /// `table-row`
    TableRow,
    /// `table-cell`
    TableCell,
    /// `table-caption`
    TableCaption,
    /// `table-column` and `table-column-group`; these generate no boxes.
    TableColumn,
}

impl InnerDisplayType {
    /// Row groups, rows, cells and columns: the roles that only make sense
    /// inside a table.
    #[must_use]
    pub const fn is_table_internal(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup | Self::TableRow | Self::TableCell | Self::TableColumn
        )
    }
}

/// Combined display value
/// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DisplayValue {
    /// "The outer display type, which dictates how the box participates in flow layout."
    pub outer: OuterDisplayType,
    /// "The inner display type, which dictates how its descendant boxes are laid out."
    pub inner: InnerDisplayType,
}

impl DisplayValue {
    const fn new(outer: OuterDisplayType, inner: InnerDisplayType) -> Self {
        Self { outer, inner }
    }

    /// `display: block` - block outer, flow inner
    #[must_use]
    pub const fn block() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::Flow)
    }

    /// `display: inline` - inline outer, flow inner
    #[must_use]
    pub const fn inline() -> Self {
        Self::new(OuterDisplayType::Inline, InnerDisplayType::Flow)
    }

    /// `display: inline-block` - inline outer, flow-root inner
    #[must_use]
    pub const fn inline_block() -> Self {
        Self::new(OuterDisplayType::Inline, InnerDisplayType::FlowRoot)
    }

    /// `display: flow-root` - block outer, flow-root inner
    #[must_use]
    pub const fn flow_root() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::FlowRoot)
    }

    /// `display: table`
    #[must_use]
    pub const fn table() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::Table)
    }

    /// `display: table-row-group`
    #[must_use]
    pub const fn table_row_group() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::TableRowGroup)
    }

    /// `display: table-row`
    #[must_use]
    pub const fn table_row() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::TableRow)
    }

    /// `display: table-cell`
    #[must_use]
    pub const fn table_cell() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::TableCell)
    }

    /// `display: table-caption`
    #[must_use]
    pub const fn table_caption() -> Self {
        Self::new(OuterDisplayType::Block, InnerDisplayType::TableCaption)
    }

    /// Whether the box participates in an inline formatting context.
    #[must_use]
    pub fn is_inline_level(self) -> bool {
        self.outer == OuterDisplayType::Inline
    }

    /// Inline-level boxes laid out as an opaque rectangle (`inline-block`,
    /// `inline-table`).
    #[must_use]
    pub fn is_atomic_inline(self) -> bool {
        self.is_inline_level() && self.inner != InnerDisplayType::Flow
    }
}

/// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// Parse a `display` keyword. `Ok(None)` is `display: none`.
///
/// # Errors
///
/// [`ValueError::Unsupported`] for flex/grid/ruby and friends, which this
/// engine does not lay out; [`ValueError::InvalidValue`] for anything else.
pub fn parse_display(raw: &str) -> Result<Option<DisplayValue>, ValueError> {
    let keyword = raw.trim().to_ascii_lowercase();
    let display = match keyword.as_str() {
        "none" => return Ok(None),
        "block" | "list-item" => DisplayValue::block(),
        "inline" => DisplayValue::inline(),
        "inline-block" => DisplayValue::inline_block(),
        "flow-root" => DisplayValue::flow_root(),
        "table" => DisplayValue::table(),
        "inline-table" => DisplayValue::new(OuterDisplayType::Inline, InnerDisplayType::Table),
        "table-row-group" | "table-header-group" | "table-footer-group" => {
            DisplayValue::table_row_group()
        }
        "table-row" => DisplayValue::table_row(),
        "table-cell" => DisplayValue::table_cell(),
        "table-caption" => DisplayValue::table_caption(),
        "table-column" | "table-column-group" => {
            DisplayValue::new(OuterDisplayType::Block, InnerDisplayType::TableColumn)
        }
        "flex" | "inline-flex" | "grid" | "inline-grid" | "contents" | "ruby" | "run-in" => {
            return Err(ValueError::Unsupported {
                property: "display".to_string(),
                value: keyword,
            });
        }
        _ => return Err(ValueError::invalid("display", raw)),
    };
    Ok(Some(display))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_keywords() {
        assert_eq!(parse_display("block"), Ok(Some(DisplayValue::block())));
        assert_eq!(parse_display("LIST-ITEM"), Ok(Some(DisplayValue::block())));
        assert_eq!(parse_display("none"), Ok(None));
        assert_eq!(
            parse_display("table-header-group"),
            Ok(Some(DisplayValue::table_row_group()))
        );
        assert!(parse_display("inline-table").unwrap().unwrap().is_atomic_inline());
    }

    #[test]
    fn test_parse_display_unsupported() {
        assert!(matches!(
            parse_display("flex"),
            Err(ValueError::Unsupported { .. })
        ));
        assert!(matches!(
            parse_display("sideways"),
            Err(ValueError::InvalidValue { .. })
        ));
    }
}
