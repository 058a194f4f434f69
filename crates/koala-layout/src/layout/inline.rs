//! Inline formatting context.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! The leaves of the inline subtree (text runs, line breaks, atomic
//! inlines, empty inline boxes) are placed left to right. When a leaf does
//! not fit, text is split at a word boundary, and the remainder starts the
//! next line after its inline ancestors are partitioned so every fragment
//! lives on one line. Inline boxes are sized afterwards from the fragments
//! they contain.
//!
//! Lines are top-aligned: each leaf's top is its line's top, and a line is
//! as tall as its tallest leaf.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use koala_css::{ComputedStyle, InnerDisplayType, TextAlign};

use crate::box_tree::{BoxId, BoxTree, FormattingContextId, partition_before, split_text_box};
use crate::text::split_point;

use super::box_model::Rect;
use super::{ContainingBlock, LayoutSession, resolve_edges};

/// Tolerance for float noise when testing whether a leaf fits.
const FIT_EPSILON: f32 = 0.01;

/// Horizontal space owed around one leaf: the margins, borders and
/// padding of inline ancestors that open or close at it, and whether
/// collapsed source whitespace precedes it.
#[derive(Debug, Clone, Copy, Default)]
struct Spacing {
    left: f32,
    right: f32,
    gap: bool,
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    id: BoxId,
    x: f32,
    width: f32,
    height: f32,
}

/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
/// "The rectangular area that contains the boxes that form a line is
/// called a line box."
#[derive(Debug, Default)]
struct LineBox {
    top: f32,
    height: f32,
    right: f32,
    placements: Vec<Placement>,
}

/// Places the inline-level descendants of one block container.
#[derive(Debug)]
pub(super) struct InlineFormattingContext {
    id: FormattingContextId,
    root: BoxId,
    cb: ContainingBlock,
    start_x: f32,
    end_x: f32,
    text_align: TextAlign,
    spacing: HashMap<BoxId, Spacing>,
    leaves: Vec<BoxId>,
    finished: Vec<LineBox>,
    current: LineBox,
    break_pending: bool,
}

impl InlineFormattingContext {
    /// Collect the leaves under `root` and build the spacing table.
    pub(super) fn new(
        session: &mut LayoutSession,
        tree: &mut BoxTree,
        root: BoxId,
        cb: &ContainingBlock,
    ) -> Self {
        let id = session.next_context_id();
        tree[root].establishes = Some(id);
        let mut ctx = Self {
            id,
            root,
            cb: *cb,
            start_x: cb.rect.x,
            end_x: cb.rect.x + cb.rect.width,
            text_align: tree[root].style.text_align(),
            spacing: HashMap::new(),
            leaves: Vec::new(),
            finished: Vec::new(),
            current: LineBox {
                top: cb.rect.y,
                ..LineBox::default()
            },
            break_pending: false,
        };
        let mut pending = Spacing::default();
        let mut last_leaf = None;
        for child in tree[root].children.clone() {
            ctx.collect(tree, child, &mut pending, &mut last_leaf);
        }
        ctx
    }

    fn collect(
        &mut self,
        tree: &mut BoxTree,
        id: BoxId,
        pending: &mut Spacing,
        last_leaf: &mut Option<BoxId>,
    ) {
        tree[id].context = Some(self.id);
        pending.gap |= tree[id].adjacent_whitespace;
        if !tree[id].is_inline_container() {
            self.push_leaf(id, pending, last_leaf);
            return;
        }

        let edges = resolve_edges(&tree[id], self.cb.percent_width).dims;
        pending.left += edges.margin.left + edges.border.left + edges.padding.left;
        let children = tree[id].children.clone();
        if children.is_empty() {
            self.push_leaf(id, pending, last_leaf);
        }
        for child in children {
            self.collect(tree, child, pending, last_leaf);
        }
        if let Some(leaf) = *last_leaf {
            self.spacing.entry(leaf).or_default().right +=
                edges.margin.right + edges.border.right + edges.padding.right;
        }
    }

    fn push_leaf(&mut self, id: BoxId, pending: &mut Spacing, last_leaf: &mut Option<BoxId>) {
        let _ = self.spacing.insert(
            id,
            Spacing {
                right: 0.0,
                ..*pending
            },
        );
        *pending = Spacing::default();
        self.leaves.push(id);
        *last_leaf = Some(id);
    }

    /// Place every leaf, then size the inline boxes. Returns the total
    /// height of the line boxes.
    pub(super) fn layout(mut self, session: &mut LayoutSession, tree: &mut BoxTree) -> f32 {
        let mut queue: VecDeque<BoxId> = std::mem::take(&mut self.leaves).into();
        while let Some(leaf) = queue.pop_front() {
            if self.break_pending {
                self.break_pending = false;
                self.start_line(tree, leaf);
            }
            if let Some(rest) = self.place(session, tree, leaf) {
                queue.push_front(rest);
            }
        }
        self.finish(tree)
    }

    fn cursor(&self) -> f32 {
        if self.current.placements.is_empty() {
            self.start_x
        } else {
            self.current.right
        }
    }

    /// Close the current line and open one below it. The inline ancestors
    /// of `next` are split so that nothing on the new line shares a box
    /// with the old one.
    fn start_line(&mut self, tree: &mut BoxTree, next: BoxId) {
        let top = self.current.top + self.current.height;
        let done = std::mem::replace(
            &mut self.current,
            LineBox {
                top,
                ..LineBox::default()
            },
        );
        self.finished.push(done);
        let _ = partition_before(tree, next, self.root);

        #[cfg(feature = "layout-trace")]
        log::trace!("[INLINE] line {} at y={top}", self.finished.len());
    }

    fn push(&mut self, placement: Placement, right_spacing: f32) {
        self.current.right = placement.x + placement.width + right_spacing;
        self.current.height = self.current.height.max(placement.height);
        self.current.placements.push(placement);
    }

    /// Place one leaf on the current line, or on a new one. Returns the
    /// remainder of a text leaf that was split.
    fn place(&mut self, session: &mut LayoutSession, tree: &mut BoxTree, leaf: BoxId) -> Option<BoxId> {
        let spacing = self.spacing.get(&leaf).copied().unwrap_or_default();
        let style = Arc::clone(&tree[leaf].style);

        // [§ 4.1.2 Segment Breaks](https://www.w3.org/TR/css-text-3/#line-break-transform)
        // `<br>` ends the line after itself.
        if tree[leaf].is_line_break() {
            let (_, height) = session.measure_text(&style, "");
            let x = self.cursor() + spacing.left;
            self.push(
                Placement {
                    id: leaf,
                    x,
                    width: 0.0,
                    height,
                },
                spacing.right,
            );
            self.break_pending = true;
            return None;
        }

        let (width, height) = self.measure_leaf(session, tree, leaf);
        loop {
            let line_empty = self.current.placements.is_empty();
            let gap = if spacing.gap && !line_empty {
                session.measure_text(&style, " ").0
            } else {
                0.0
            };
            let x = self.cursor() + gap + spacing.left;

            // STEP 1: The whole leaf fits.
            if x + width + spacing.right <= self.end_x + FIT_EPSILON {
                self.push(
                    Placement {
                        id: leaf,
                        x,
                        width,
                        height,
                    },
                    spacing.right,
                );
                return None;
            }

            // STEP 2: Text splits at a word boundary.
            if let Some(rest) = self.split(session, tree, leaf, &style, x, spacing, line_empty) {
                return Some(rest);
            }

            // STEP 3: Retry on a fresh line.
            if !line_empty {
                self.start_line(tree, leaf);
                continue;
            }

            // STEP 4: Nothing fits on an empty line; overflow.
            self.push(
                Placement {
                    id: leaf,
                    x,
                    width,
                    height,
                },
                spacing.right,
            );
            return None;
        }
    }

    /// [§ 5 Line Breaking](https://www.w3.org/TR/css-text-3/#line-breaking)
    ///
    /// Cut a text leaf so that its head ends this line. On a non-empty line
    /// the head must fit; on an empty one the first word is taken even if
    /// it overflows. Trailing whitespace of the head hangs past the line
    /// end and is not counted.
    #[allow(clippy::too_many_arguments)]
    fn split(
        &mut self,
        session: &mut LayoutSession,
        tree: &mut BoxTree,
        leaf: BoxId,
        style: &ComputedStyle,
        x: f32,
        spacing: Spacing,
        line_empty: bool,
    ) -> Option<BoxId> {
        if !style.white_space().wraps() {
            return None;
        }
        let text = tree[leaf].text()?.to_string();
        let available = self.end_x - x;
        let at = split_point(&text, available, |s| session.measure_text(style, s).0)?;
        let (head_width, height) = session.measure_text(style, text[..at].trim_end());
        if head_width > available + FIT_EPSILON && !line_empty {
            return None;
        }

        let rest = split_text_box(tree, leaf, at)?;
        let _ = self.spacing.insert(
            rest,
            Spacing {
                left: 0.0,
                right: spacing.right,
                gap: false,
            },
        );
        let _ = self.spacing.insert(
            leaf,
            Spacing {
                right: 0.0,
                ..spacing
            },
        );
        self.push(
            Placement {
                id: leaf,
                x,
                width: head_width,
                height,
            },
            0.0,
        );
        self.break_pending = true;
        Some(rest)
    }

    /// `(width, height)` a leaf occupies on a line. Atomic inlines are laid
    /// out here, at the origin, and moved into place by [`Self::finish`].
    fn measure_leaf(&self, session: &mut LayoutSession, tree: &mut BoxTree, leaf: BoxId) -> (f32, f32) {
        let style = Arc::clone(&tree[leaf].style);
        if let Some(text) = tree[leaf].text() {
            let text = text.to_string();
            return session.measure_text(&style, &text);
        }
        if !tree[leaf].is_atomic_inline() {
            // Empty inline box: a strut of the font's line height.
            return (0.0, session.measure_text(&style, "").1);
        }

        // [§ 10.3.9 'Inline-block', non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width)
        // "If 'width' is 'auto', the used value is the shrink-to-fit width"
        let available = self.end_x - self.start_x;
        let cb = ContainingBlock {
            rect: Rect::new(0.0, 0.0, available, 0.0),
            percent_width: self.cb.percent_width,
            percent_height: self.cb.percent_height,
        };
        let node = &tree[leaf];
        let shrinks = node.style.width().and_then(|w| w.resolve(cb.percent_width)).is_none()
            && node.replaced_size().is_none()
            && node.display.inner == InnerDisplayType::FlowRoot;
        let width_override = if shrinks {
            let outer = resolve_edges(node, cb.percent_width).outer_horizontal();
            Some(session.shrink_to_fit(tree, leaf, (available - outer).max(0.0), &cb))
        } else {
            None
        };
        session.layout_block_level(tree, leaf, &cb, 0.0, 0.0, width_override);
        let margin_box = tree[leaf].dimensions.margin_box();
        (margin_box.width, margin_box.height)
    }

    /// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    ///
    /// Write final positions: shift each line by its alignment slack, move
    /// atomic inlines into place, then size inline boxes around their
    /// fragments. Returns the height of all lines.
    fn finish(mut self, tree: &mut BoxTree) -> f32 {
        let last = std::mem::take(&mut self.current);
        self.finished.push(last);

        let mut bottom = self.cb.rect.y;
        for line in &self.finished {
            let slack = (self.end_x - line.right).max(0.0);
            let dx = match self.text_align {
                TextAlign::Right => slack,
                TextAlign::Center => slack / 2.0,
                TextAlign::Left | TextAlign::Justify => 0.0,
            };
            for p in &line.placements {
                let x = p.x + dx;
                if tree[p.id].is_atomic_inline() {
                    let margin_box = tree[p.id].dimensions.margin_box();
                    tree.shift_subtree(p.id, x - margin_box.x, line.top - margin_box.y);
                } else {
                    tree[p.id].dimensions.content = Rect::new(x, line.top, p.width, p.height);
                }
            }
            if !line.placements.is_empty() {
                bottom = bottom.max(line.top + line.height);
            }
        }

        for child in tree[self.root].children.clone() {
            self.size_inline_box(tree, child);
        }
        bottom - self.cb.rect.y
    }

    /// An inline box's content area spans the fragments it contains; its
    /// edges come from its style, minus the sides it gave up when split.
    fn size_inline_box(&self, tree: &mut BoxTree, id: BoxId) {
        if !tree[id].is_inline_container() {
            return;
        }
        let children = tree[id].children.clone();
        for &child in &children {
            self.size_inline_box(tree, child);
        }
        let edges = resolve_edges(&tree[id], self.cb.percent_width).dims;
        let content = children
            .iter()
            .map(|&c| tree[c].dimensions.margin_box())
            .reduce(|a, b| a.union(&b));
        let dims = &mut tree[id].dimensions;
        if let Some(content) = content {
            dims.content = content;
        }
        dims.padding = edges.padding;
        dims.border = edges.border;
        dims.margin = edges.margin;
    }
}
