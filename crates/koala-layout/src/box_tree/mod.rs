//! The box tree.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! Boxes live in an arena and refer to each other by [`BoxId`]. `children`
//! vectors are the only ownership path; `parent` is a plain back-link.
//! Render nodes map 1:1 onto boxes, and [`generate_box_tree`] adds the anonymous
//! boxes CSS requires. Layout then writes geometry into
//! [`BoxNode::dimensions`].
//!
//! Trial layouts run on a scratch copy made with
//! [`BoxTree::copy_subtree_into`], so the real tree never sees their
//! geometry.

mod generate;
mod partition;

use std::ops::{Index, IndexMut, Range};
use std::sync::Arc;

use koala_css::{ComputedStyle, DisplayValue, InnerDisplayType, Property, Value};
use serde::Serialize;

use crate::layout::box_model::{BoxDimensions, Rect};
use crate::render_tree::RenderId;

pub use generate::{generate_box_tree, normalize};
pub use partition::{partition_before, split_text_box};

/// Index of a box in a [`BoxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BoxId(pub usize);

/// Identifies one formatting context created during a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FormattingContextId(pub usize);

/// A slice of a text node's normalized text.
#[derive(Debug, Clone, Serialize)]
pub struct TextRun {
    /// The whole text of the render node.
    #[serde(skip)]
    pub source: Arc<str>,
    /// Byte range of this fragment inside `source`.
    pub range: Range<usize>,
}

impl TextRun {
    /// The fragment's text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source[self.range.clone()]
    }
}

/// What a box draws, apart from its children.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxContent {
    /// A container; content comes from children.
    Children,
    /// A text fragment.
    Text(TextRun),
    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// An element whose content is outside CSS, with its intrinsic size.
    Replaced {
        /// Intrinsic width.
        width: f32,
        /// Intrinsic height.
        height: f32,
    },
    /// `<br>`: ends the current line.
    LineBreak,
}

/// One box.
#[derive(Debug, Clone, Serialize)]
pub struct BoxNode {
    /// Position in the arena.
    pub id: BoxId,
    /// Non-owning back-link.
    pub parent: Option<BoxId>,
    /// Owned children, in order.
    pub children: Vec<BoxId>,
    /// Outer and inner display type.
    pub display: DisplayValue,
    /// Synthesized by box generation rather than generated by an element.
    pub anonymous: bool,
    /// The render node that generated this box; `None` for anonymous boxes.
    pub render_node: Option<RenderId>,
    /// Text, replaced content, line break, or nothing.
    pub content: BoxContent,
    /// Geometry, in absolute coordinates, written by layout.
    pub dimensions: BoxDimensions,
    /// Continuation fragment of a box split across lines: no left edge.
    pub skip_left_edge: bool,
    /// Fragment followed by a continuation: no right edge.
    pub skip_right_edge: bool,
    /// Whitespace separated this box from its previous sibling in the source.
    pub adjacent_whitespace: bool,
    /// Columns spanned by a table cell.
    pub colspan: usize,
    /// Rows spanned by a table cell.
    pub rowspan: usize,
    /// The formatting context this box establishes for its children.
    pub establishes: Option<FormattingContextId>,
    /// The formatting context this box is laid out in.
    pub context: Option<FormattingContextId>,
    /// Computed style; shared with the render node.
    #[serde(skip)]
    pub style: Arc<ComputedStyle>,
}

impl BoxNode {
    /// A box generated by an element or text node.
    #[must_use]
    pub fn new(display: DisplayValue, style: Arc<ComputedStyle>, content: BoxContent) -> Self {
        Self {
            id: BoxId(0),
            parent: None,
            children: Vec::new(),
            display,
            anonymous: false,
            render_node: None,
            content,
            dimensions: BoxDimensions::default(),
            skip_left_edge: false,
            skip_right_edge: false,
            adjacent_whitespace: false,
            colspan: 1,
            rowspan: 1,
            establishes: None,
            context: None,
            style,
        }
    }

    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "The properties of anonymous boxes are inherited from the enclosing
    /// non-anonymous box ... Non-inherited properties have their initial
    /// value."
    #[must_use]
    pub fn anonymous(display: DisplayValue, parent_style: &ComputedStyle) -> Self {
        let mut style = ComputedStyle::inherit_from(parent_style);
        style.set(Property::Display, Value::Display(Some(display)));
        Self {
            anonymous: true,
            ..Self::new(display, Arc::new(style), BoxContent::Children)
        }
    }

    /// Text fragment, if this is a text box.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            BoxContent::Text(run) => Some(run.as_str()),
            _ => None,
        }
    }

    /// Whether this box holds text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.content, BoxContent::Text(_))
    }

    /// Whether this box is a forced line break.
    #[must_use]
    pub const fn is_line_break(&self) -> bool {
        matches!(self.content, BoxContent::LineBreak)
    }

    /// Intrinsic size of a replaced box.
    #[must_use]
    pub const fn replaced_size(&self) -> Option<(f32, f32)> {
        match self.content {
            BoxContent::Replaced { width, height } => Some((width, height)),
            _ => None,
        }
    }

    /// Inline-level.
    #[must_use]
    pub fn is_inline_level(&self) -> bool {
        self.display.is_inline_level()
    }

    /// An inline box whose contents take part in the surrounding line
    /// layout: not text, not replaced, not atomic.
    #[must_use]
    pub fn is_inline_container(&self) -> bool {
        self.is_inline_level()
            && self.display.inner == InnerDisplayType::Flow
            && matches!(self.content, BoxContent::Children)
    }

    /// Laid out as one opaque rectangle on a line: `inline-block`,
    /// `inline-table`, or an inline replaced element.
    #[must_use]
    pub fn is_atomic_inline(&self) -> bool {
        self.display.is_atomic_inline()
            || (self.is_inline_level() && self.replaced_size().is_some())
    }

    /// [§ 9.2.1 Block-level elements and block boxes](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    ///
    /// "a block container box either contains only block-level boxes or
    /// establishes an inline formatting context and thus contains only
    /// inline-level boxes."
    #[must_use]
    pub fn is_block_container(&self) -> bool {
        if !matches!(self.content, BoxContent::Children) {
            return false;
        }
        match self.display.inner {
            InnerDisplayType::Flow => !self.is_inline_level(),
            InnerDisplayType::FlowRoot
            | InnerDisplayType::TableCell
            | InnerDisplayType::TableCaption => true,
            InnerDisplayType::Table
            | InnerDisplayType::TableRowGroup
            | InnerDisplayType::TableRow
            | InnerDisplayType::TableColumn => false,
        }
    }

    /// Border box in absolute coordinates.
    #[must_use]
    pub fn border_box(&self) -> Rect {
        self.dimensions.border_box()
    }
}

/// Arena of [`BoxNode`]s.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BoxTree {
    nodes: Vec<BoxNode>,
    root: Option<BoxId>,
}

impl Index<BoxId> for BoxTree {
    type Output = BoxNode;

    fn index(&self, id: BoxId) -> &BoxNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<BoxId> for BoxTree {
    fn index_mut(&mut self, id: BoxId) -> &mut BoxNode {
        &mut self.nodes[id.0]
    }
}

impl BoxTree {
    /// An empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The root box.
    #[must_use]
    pub const fn root(&self) -> Option<BoxId> {
        self.root
    }

    /// Make `id` the root.
    pub fn set_root(&mut self, id: BoxId) {
        self.root = Some(id);
    }

    /// Box by id.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&BoxNode> {
        self.nodes.get(id.0)
    }

    /// Number of boxes ever allocated, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing was allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Store a box and return its id. The box starts detached.
    pub fn alloc(&mut self, mut node: BoxNode) -> BoxId {
        let id = BoxId(self.nodes.len());
        node.id = id;
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        id
    }

    /// Append `child` to `parent`'s children.
    pub fn append_child(&mut self, parent: BoxId, child: BoxId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` at `index` among `parent`'s children.
    pub fn insert_child(&mut self, parent: BoxId, index: usize, child: BoxId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
    }

    /// Replace `parent`'s children, re-pointing each child's back-link.
    pub fn set_children(&mut self, parent: BoxId, children: Vec<BoxId>) {
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children = children;
    }

    /// Position of `id` among its parent's children.
    #[must_use]
    pub fn index_in_parent(&self, id: BoxId) -> Option<usize> {
        let parent = self.nodes[id.0].parent?;
        self.nodes[parent.0].children.iter().position(|&c| c == id)
    }

    /// `id` and its descendants, parents before children.
    #[must_use]
    pub fn preorder(&self, id: BoxId) -> Vec<BoxId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev());
        }
        out
    }

    /// Boxes reachable from the root, in tree order.
    #[must_use]
    pub fn attached(&self) -> Vec<BoxId> {
        self.root.map(|root| self.preorder(root)).unwrap_or_default()
    }

    /// A detached copy of `id` without children: same style, display,
    /// content and source node; fresh geometry.
    pub fn duplicate(&mut self, id: BoxId) -> BoxId {
        let mut copy = self.nodes[id.0].clone();
        copy.dimensions = BoxDimensions::default();
        copy.establishes = None;
        copy.context = None;
        self.alloc(copy)
    }

    /// Deep-copy the subtree at `id` into `target`, returning the new root.
    /// Styles are shared, ids are `target`'s.
    pub fn copy_subtree_into(&self, id: BoxId, target: &mut Self) -> BoxId {
        let copy = target.alloc(self.nodes[id.0].clone());
        for &child in &self.nodes[id.0].children {
            let child_copy = self.copy_subtree_into(child, target);
            target.append_child(copy, child_copy);
        }
        copy
    }

    /// Move `id` and every descendant by `(dx, dy)`.
    pub fn shift_subtree(&mut self, id: BoxId, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        for node in self.preorder(id) {
            self.nodes[node.0].dimensions.content.translate(dx, dy);
        }
    }

    /// Text fragments under `id`, in order.
    #[must_use]
    pub fn text_fragments(&self, id: BoxId) -> Vec<&TextRun> {
        self.preorder(id)
            .into_iter()
            .filter_map(|b| match &self.nodes[b.0].content {
                BoxContent::Text(run) => Some(run),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> BoxNode {
        BoxNode::new(
            DisplayValue::block(),
            Arc::new(ComputedStyle::initial()),
            BoxContent::Children,
        )
    }

    #[test]
    fn test_arena_links() {
        let mut tree = BoxTree::new();
        let root = tree.alloc(block());
        let a = tree.alloc(block());
        let b = tree.alloc(block());
        tree.set_root(root);
        tree.append_child(root, b);
        tree.insert_child(root, 0, a);
        assert_eq!(tree[root].children, vec![a, b]);
        assert_eq!(tree[b].parent, Some(root));
        assert_eq!(tree.index_in_parent(b), Some(1));
        assert_eq!(tree.attached(), vec![root, a, b]);
    }

    #[test]
    fn test_copy_subtree_into_scratch() {
        let mut tree = BoxTree::new();
        let root = tree.alloc(block());
        let child = tree.alloc(block());
        tree.append_child(root, child);
        tree[child].dimensions.content = Rect::new(1.0, 2.0, 3.0, 4.0);

        let mut scratch = BoxTree::new();
        let copy = tree.copy_subtree_into(root, &mut scratch);
        assert_eq!(scratch.len(), 2);
        let copied_child = scratch[copy].children[0];
        scratch.shift_subtree(copy, 10.0, 0.0);
        assert_eq!(scratch[copied_child].dimensions.content.x, 11.0);
        assert_eq!(tree[child].dimensions.content.x, 1.0);
    }

    #[test]
    fn test_anonymous_box_inherits() {
        let mut parent = ComputedStyle::initial();
        parent.set(Property::TextAlign, Value::TextAlign(koala_css::TextAlign::Center));
        parent.set(Property::Width, Value::Length(koala_css::Length::Px(10.0)));
        let anon = BoxNode::anonymous(DisplayValue::table_row(), &parent);
        assert!(anon.anonymous);
        assert_eq!(anon.style.text_align(), koala_css::TextAlign::Center);
        assert!(anon.style.width().is_none());
        assert_eq!(anon.style.display(), Some(DisplayValue::table_row()));
    }
}
