//! Block formatting context.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block."
//!
//! Vertical margins do not collapse: each box starts at the bottom of the
//! previous sibling's margin box.

use crate::box_tree::{BoxId, BoxTree, FormattingContextId};

use super::{ContainingBlock, LayoutSession};

/// Stacks the block-level children of one container.
#[derive(Debug)]
pub(super) struct BlockFormattingContext {
    id: FormattingContextId,
    container: BoxId,
    cb: ContainingBlock,
    last_placed: Option<BoxId>,
    bottom: f32,
}

impl BlockFormattingContext {
    pub(super) fn new(
        session: &mut LayoutSession,
        tree: &mut BoxTree,
        container: BoxId,
        cb: &ContainingBlock,
    ) -> Self {
        let id = session.next_context_id();
        tree[container].establishes = Some(id);
        Self {
            id,
            container,
            cb: *cb,
            last_placed: None,
            bottom: cb.rect.y,
        }
    }

    /// Place every child and return the height from the container's
    /// content top to the furthest child margin edge.
    pub(super) fn layout(mut self, session: &mut LayoutSession, tree: &mut BoxTree) -> f32 {
        let children = tree[self.container].children.clone();
        for child in children {
            self.place(session, tree, child);
        }
        self.bottom - self.cb.rect.y
    }

    /// "Each box's left outer edge touches the left edge of the containing
    /// block". The top follows the last placed sibling.
    fn place(&mut self, session: &mut LayoutSession, tree: &mut BoxTree, child: BoxId) {
        tree[child].context = Some(self.id);
        let y = self
            .last_placed
            .map_or(self.cb.rect.y, |prev| tree[prev].dimensions.margin_box().bottom());
        session.layout_block_level(tree, child, &self.cb, self.cb.rect.x, y, None);
        self.last_placed = Some(child);
        self.bottom = self.bottom.max(tree[child].dimensions.margin_box().bottom());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use koala_css::{ComputedStyle, DisplayValue, Length, Property, Value};

    use crate::box_tree::{BoxContent, BoxNode};
    use crate::config::LayoutConfig;

    use super::*;

    fn sized_block(height: f32, margin: f32) -> BoxNode {
        let mut style = ComputedStyle::initial();
        style.set(Property::Display, Value::Display(Some(DisplayValue::block())));
        style.set(Property::Height, Value::Length(Length::Px(height)));
        style.set(Property::MarginTop, Value::Length(Length::Px(margin)));
        style.set(Property::MarginBottom, Value::Length(Length::Px(margin)));
        BoxNode::new(DisplayValue::block(), Arc::new(style), BoxContent::Children)
    }

    #[test]
    fn test_siblings_stack_without_margin_collapse() {
        let mut tree = BoxTree::new();
        let root = tree.alloc(sized_block(0.0, 0.0));
        tree[root].style = Arc::new(ComputedStyle::initial());
        let a = tree.alloc(sized_block(20.0, 5.0));
        let b = tree.alloc(sized_block(10.0, 5.0));
        tree.set_root(root);
        tree.append_child(root, a);
        tree.append_child(root, b);

        let mut session = LayoutSession::with_approximate_metrics(LayoutConfig::default());
        session.layout(&mut tree);

        assert_eq!(tree[a].dimensions.content.y, 5.0);
        // a's margin box ends at 30; b's margin starts there.
        assert_eq!(tree[b].dimensions.content.y, 35.0);
        assert_eq!(tree[root].dimensions.content.height, 50.0);
        assert_eq!(tree[a].context, tree[root].establishes);
    }
}
