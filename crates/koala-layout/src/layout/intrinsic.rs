//! Intrinsic widths by trial layout.
//!
//! [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
//!
//! "Calculation of the shrink-to-fit width is similar to calculating the
//! width of a table cell using the automatic table layout algorithm.
//! Roughly: calculate the preferred width by formatting the content
//! without breaking lines other than where explicit line breaks occur, and
//! also calculate the preferred minimum width, e.g., by trying all possible
//! line breaks."
//!
//! Both widths come from laying out a scratch copy of the subtree, once
//! with an effectively unbounded width and once with zero width, and
//! measuring how far right the content reaches.

use koala_css::{InnerDisplayType, OuterDisplayType};

use crate::box_tree::{BoxContent, BoxId, BoxTree};

use super::box_model::Rect;
use super::{ContainingBlock, LayoutSession};

/// Content widths of a box: narrowest without overflow, and widest with
/// no optional line breaks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PreferredWidths {
    pub min: f32,
    pub max: f32,
}

impl LayoutSession {
    /// Preferred minimum and maximum content widths of `id`.
    pub(crate) fn preferred_widths(
        &mut self,
        tree: &BoxTree,
        id: BoxId,
        cb: &ContainingBlock,
    ) -> PreferredWidths {
        let max = self.trial_width(tree, id, self.config.unbounded_width, cb);
        let min = self.trial_width(tree, id, 0.0, cb);
        PreferredWidths {
            min,
            max: max.max(min),
        }
    }

    /// "min(max(preferred minimum width, available width), preferred
    /// width)", with the minimum winning when the two conflict.
    pub(crate) fn shrink_to_fit(
        &mut self,
        tree: &BoxTree,
        id: BoxId,
        available: f32,
        cb: &ContainingBlock,
    ) -> f32 {
        let PreferredWidths { min, max } = self.preferred_widths(tree, id, cb);
        available.min(max).max(min)
    }

    /// Lay out a copy of `id` with content width `width` and return how
    /// wide its content turned out to be.
    fn trial_width(&mut self, tree: &BoxTree, id: BoxId, width: f32, cb: &ContainingBlock) -> f32 {
        let mut scratch = BoxTree::new();
        let copy = tree.copy_subtree_into(id, &mut scratch);
        scratch.set_root(copy);
        let trial_cb = ContainingBlock {
            rect: Rect::new(0.0, 0.0, width, 0.0),
            ..*cb
        };
        self.layout_block_level(&mut scratch, copy, &trial_cb, 0.0, 0.0, Some(width));

        let content = scratch[copy].dimensions.content;
        let reach = scratch[copy]
            .children
            .iter()
            .map(|&child| preferred_right(&scratch, child))
            .fold(content.x, f32::max);

        #[cfg(feature = "layout-trace")]
        log::trace!("[INTRINSIC] {:?} at {width} reaches {}", id, reach - content.x);

        reach - content.x
    }
}

/// How far right a laid-out box needs to reach.
///
/// An auto-width block stretches to whatever it was given, so its own
/// right edge says nothing; its children decide, plus its right edges.
/// Everything else (text, inline boxes, atomic inlines, fixed-width
/// blocks, tables) counts with its margin box.
fn preferred_right(tree: &BoxTree, id: BoxId) -> f32 {
    let node = &tree[id];
    let dims = &node.dimensions;
    let stretches = node.display.outer == OuterDisplayType::Block
        && node.display.inner != InnerDisplayType::Table
        && matches!(node.content, BoxContent::Children)
        && node.style.width().is_none();
    if !stretches {
        return dims.margin_box().right();
    }
    let inner = node
        .children
        .iter()
        .map(|&child| preferred_right(tree, child))
        .fold(dims.content.x, f32::max);
    inner + dims.padding.right + dims.border.right + dims.margin.right
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use koala_css::{ComputedStyle, DisplayValue, Length, Property, Value};

    use super::*;
    use crate::box_tree::{BoxNode, TextRun};
    use crate::config::LayoutConfig;

    #[test]
    fn test_preferred_widths_of_text() {
        let mut style = ComputedStyle::initial();
        style.set(Property::FontSize, Value::Length(Length::Px(10.0)));
        let style = Arc::new(style);

        let mut tree = BoxTree::new();
        let block = tree.alloc(BoxNode::new(
            DisplayValue::inline_block(),
            Arc::clone(&style),
            BoxContent::Children,
        ));
        let source: Arc<str> = Arc::from("aa bbbb c");
        let text = tree.alloc(BoxNode::new(
            DisplayValue::inline(),
            style,
            BoxContent::Text(TextRun {
                range: 0..source.len(),
                source,
            }),
        ));
        tree.append_child(block, text);

        let mut session = LayoutSession::with_approximate_metrics(LayoutConfig::default());
        let cb = ContainingBlock::initial(session.config());
        let widths = session.preferred_widths(&tree, block, &cb);
        // Longest word is 4 characters at 6px; the whole run is 9.
        assert_eq!(widths, PreferredWidths { min: 24.0, max: 54.0 });
        assert_eq!(session.shrink_to_fit(&tree, block, 40.0, &cb), 40.0);
        assert_eq!(session.shrink_to_fit(&tree, block, 10.0, &cb), 24.0);
        // The real tree was not touched.
        assert_eq!(tree[text].dimensions.content.width, 0.0);
    }
}
