//! Layout: sizes and positions for every box.
//!
//! [CSS 2.1 § 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//! [CSS 2.1 § 10 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html)
//!
//! A [`LayoutSession`] owns the per-document state: configuration, the
//! text measurer and its font cache, and warnings. Layout walks the box
//! tree top-down. Each block container runs either a block formatting
//! pass ([`block`]) or an inline formatting pass ([`inline`]) over its
//! children; tables run [`table`]. Shrink-to-fit widths come from trial
//! layouts on scratch copies ([`intrinsic`]).
//!
//! All coordinates are absolute; a box placed at `(x, y)` receives its
//! margin-box top-left corner there.

pub mod box_model;

mod block;
mod inline;
mod intrinsic;
mod table;

use std::sync::Arc;

use koala_common::warning::Diagnostics;
use koala_css::{
    ComputedStyle, InnerDisplayType, Length, Origin, Side, StyleMap, StyleResolver, StyleRule,
    Stylesheet,
};
use koala_dom::DomTree;

use crate::box_tree::{BoxContent, BoxId, BoxNode, BoxTree, FormattingContextId, generate_box_tree};
use crate::config::LayoutConfig;
use crate::render_tree::RenderTree;
use crate::text::{ApproximateFontMetrics, DimensionCalculator, FontMetrics};

use block::BlockFormattingContext;
use box_model::{BoxDimensions, EdgeSizes, Rect};
use inline::InlineFormattingContext;

/// The area a box is sized and positioned against.
///
/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// `rect` is the available space. The percentage bases are the nearest
/// ancestor sizes that are definite, which may be further out than `rect`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ContainingBlock {
    pub rect: Rect,
    pub percent_width: Option<f32>,
    pub percent_height: Option<f32>,
}

impl ContainingBlock {
    /// [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    /// "The containing block in which the root element lives is a rectangle
    /// called the initial containing block. For continuous media, it has
    /// the dimensions of the viewport"
    fn initial(config: &LayoutConfig) -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, config.viewport_width, config.viewport_height),
            percent_width: Some(config.viewport_width),
            percent_height: Some(config.viewport_height),
        }
    }
}

/// Resolved padding, border and margin of a box, with auto margins as zero.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedEdges {
    pub dims: BoxDimensions,
    pub auto_left: bool,
    pub auto_right: bool,
}

impl ResolvedEdges {
    /// Padding and border, left plus right.
    pub fn inner_horizontal(&self) -> f32 {
        self.dims.padding.horizontal() + self.dims.border.horizontal()
    }

    /// Padding, border and margin, left plus right.
    pub fn outer_horizontal(&self) -> f32 {
        self.inner_horizontal() + self.dims.margin.horizontal()
    }
}

/// [§ 8 Box model](https://www.w3.org/TR/CSS2/box.html)
///
/// "The percentage is calculated with respect to the width of the generated
/// box's containing block." This holds for vertical margins and padding
/// too. Percentages with no definite basis resolve to zero. Edges a split
/// inline fragment gave up stay zero.
pub(crate) fn resolve_edges(node: &BoxNode, basis: Option<f32>) -> ResolvedEdges {
    let style = &node.style;
    let sides = |f: &dyn Fn(Side) -> f32| EdgeSizes {
        top: f(Side::Top),
        right: f(Side::Right),
        bottom: f(Side::Bottom),
        left: f(Side::Left),
    };
    let mut dims = BoxDimensions {
        padding: sides(&|s| style.padding(s).resolve_or_zero(basis)),
        border: sides(&|s| style.border_width(s)),
        margin: sides(&|s| style.margin(s).map_or(0.0, |m| m.resolve_or_zero(basis))),
        ..BoxDimensions::default()
    };
    if node.skip_left_edge {
        dims.padding.left = 0.0;
        dims.border.left = 0.0;
        dims.margin.left = 0.0;
    }
    if node.skip_right_edge {
        dims.padding.right = 0.0;
        dims.border.right = 0.0;
        dims.margin.right = 0.0;
    }
    ResolvedEdges {
        dims,
        auto_left: style.margin(Side::Left).is_none(),
        auto_right: style.margin(Side::Right).is_none(),
    }
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// Apply `max` then `min`, so `min` wins a conflict.
fn clamp_size(value: f32, min: Length, max: Option<Length>, basis: Option<f32>) -> f32 {
    let max = max.and_then(|m| m.resolve(basis)).unwrap_or(f32::INFINITY);
    value.min(max).max(min.resolve_or_zero(basis))
}

/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
///
/// Used size of a replaced box: specified sizes win, a single specified
/// size scales the other by the intrinsic ratio.
fn replaced_size(
    style: &ComputedStyle,
    (intrinsic_width, intrinsic_height): (f32, f32),
    cb: &ContainingBlock,
) -> (f32, f32) {
    let width = style.width().and_then(|w| w.resolve(cb.percent_width));
    let height = style.height().and_then(|h| h.resolve(cb.percent_height));
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) if intrinsic_width > 0.0 => (w, intrinsic_height * w / intrinsic_width),
        (Some(w), None) => (w, intrinsic_height),
        (None, Some(h)) if intrinsic_height > 0.0 => (intrinsic_width * h / intrinsic_height, h),
        (None, Some(h)) => (intrinsic_width, h),
        (None, None) => (intrinsic_width, intrinsic_height),
    }
}

/// Everything layout produced for one document.
#[derive(Debug)]
pub struct LaidOutDocument {
    /// Computed styles by document node.
    pub styles: StyleMap,
    /// The styled tree boxes were generated from.
    pub render_tree: RenderTree,
    /// Boxes with their final geometry.
    pub box_tree: BoxTree,
}

/// Per-document layout state.
///
/// Owns the text measurer, so font caches live as long as the session.
/// Sessions are independent; nothing is global.
#[derive(Debug)]
pub struct LayoutSession {
    config: LayoutConfig,
    resolver: StyleResolver,
    dimensions: DimensionCalculator,
    diagnostics: Diagnostics,
    next_context: usize,
}

impl LayoutSession {
    /// A session measuring text with `metrics`.
    #[must_use]
    pub fn new(config: LayoutConfig, metrics: Box<dyn FontMetrics>) -> Self {
        Self {
            resolver: StyleResolver::new(config.cascade_options()),
            config,
            dimensions: DimensionCalculator::new(metrics),
            diagnostics: Diagnostics::new(),
            next_context: 0,
        }
    }

    /// A session using [`ApproximateFontMetrics`].
    #[must_use]
    pub fn with_approximate_metrics(config: LayoutConfig) -> Self {
        Self::new(config, Box::new(ApproximateFontMetrics))
    }

    /// The session's configuration.
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The text measurer.
    pub fn dimension_calculator(&mut self) -> &mut DimensionCalculator {
        &mut self.dimensions
    }

    /// Warnings from box generation and layout.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Warnings from the cascade.
    #[must_use]
    pub const fn style_diagnostics(&self) -> &Diagnostics {
        self.resolver.diagnostics()
    }

    /// Style, build the render tree, generate boxes and lay them out.
    ///
    /// The configured default font applies to the root element below every
    /// author rule.
    pub fn render(&mut self, dom: &DomTree, sheets: &[Stylesheet]) -> LaidOutDocument {
        let font_size = format!("{}px", self.config.default_font_size);
        let defaults = Stylesheet::new(Origin::UserAgent).with_rule(StyleRule::new(
            "html",
            &[
                ("font-family", self.config.default_font_family.as_str()),
                ("font-size", font_size.as_str()),
            ],
        ));
        let mut all_sheets = Vec::with_capacity(sheets.len() + 1);
        all_sheets.push(defaults);
        all_sheets.extend_from_slice(sheets);

        let styles = self.resolver.resolve(dom, &all_sheets);
        let render_tree = RenderTree::build(dom, &styles);
        let mut box_tree = generate_box_tree(&render_tree, &mut self.diagnostics);
        self.layout(&mut box_tree);
        LaidOutDocument {
            styles,
            render_tree,
            box_tree,
        }
    }

    /// Lay out `tree` in the viewport. The root's margin box starts at the
    /// origin.
    pub fn layout(&mut self, tree: &mut BoxTree) {
        let Some(root) = tree.root() else {
            return;
        };
        let icb = ContainingBlock::initial(&self.config);
        self.layout_block_level(tree, root, &icb, 0.0, 0.0, None);

        #[cfg(feature = "layout-trace")]
        log::trace!(
            "[LAYOUT] root {:?} -> {:?}",
            root,
            tree[root].dimensions.margin_box()
        );
    }

    fn next_context_id(&mut self) -> FormattingContextId {
        let id = FormattingContextId(self.next_context);
        self.next_context += 1;
        id
    }

    /// `(width, height)` of `text` in `style`'s font.
    pub(crate) fn measure_text(&mut self, style: &ComputedStyle, text: &str) -> (f32, f32) {
        self.dimensions.measure(style, text)
    }

    /// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    ///
    /// Size and place the block-level (or atomic inline) box `id` with its
    /// margin box starting at `(x, y)`, then lay out its contents.
    ///
    /// `width_override` replaces the used content width, for
    /// shrink-to-fit, table cells and trial layouts. Without it the width
    /// is the specified width, the replaced width, or whatever fills
    /// `cb`.
    pub(crate) fn layout_block_level(
        &mut self,
        tree: &mut BoxTree,
        id: BoxId,
        cb: &ContainingBlock,
        x: f32,
        y: f32,
        width_override: Option<f32>,
    ) {
        if tree[id].display.inner == InnerDisplayType::Table {
            table::layout_table(self, tree, id, cb, (x, y), width_override);
            return;
        }
        let style = Arc::clone(&tree[id].style);
        let edges = resolve_edges(&tree[id], cb.percent_width);
        let mut dims = edges.dims;
        let replaced = tree[id]
            .replaced_size()
            .map(|intrinsic| replaced_size(&style, intrinsic, cb));

        // STEP 1: Width.
        // "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
        // 'padding-right' + 'border-right-width' + 'margin-right' = width
        // of containing block"
        let specified_width = style.width().and_then(|w| w.resolve(cb.percent_width));
        let width = width_override
            .or(specified_width)
            .or(replaced.map(|(w, _)| w))
            .unwrap_or_else(|| (cb.rect.width - edges.outer_horizontal()).max(0.0));
        let width = clamp_size(width, style.min_width(), style.max_width(), cb.percent_width);

        // STEP 2: Auto horizontal margins.
        // "If both 'margin-left' and 'margin-right' are 'auto', their used
        // values are equal. This horizontally centers the element with
        // respect to the edges of the containing block."
        let has_width = specified_width.is_some() || replaced.is_some();
        if edges.auto_left && edges.auto_right && has_width && width_override.is_none() {
            let free = cb.rect.width - width - edges.inner_horizontal();
            if free > 0.0 {
                dims.margin.left = free / 2.0;
                dims.margin.right = free / 2.0;
            }
        }

        // STEP 3: Position the content box.
        dims.content = Rect::new(
            x + dims.margin.left + dims.border.left + dims.padding.left,
            y + dims.margin.top + dims.border.top + dims.padding.top,
            width,
            0.0,
        );
        tree[id].dimensions = dims;

        // STEP 4: Lay out children against this box.
        let specified_height = style.height().and_then(|h| h.resolve(cb.percent_height));
        let definite_width = width_override.is_none()
            || specified_width.is_some()
            || tree[id].display.inner == InnerDisplayType::TableCell;
        let inner_cb = ContainingBlock {
            rect: Rect::new(dims.content.x, dims.content.y, width, 0.0),
            percent_width: if definite_width {
                Some(width)
            } else {
                cb.percent_width
            },
            percent_height: specified_height
                .or(replaced.map(|(_, h)| h))
                .or(cb.percent_height),
        };
        let content_height = self.layout_contents(tree, id, &inner_cb);

        // STEP 5: Height.
        // [§ 10.6.3](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
        // "If 'height' is 'auto', the height depends on ... the bottom edge
        // of the bottom (possibly anonymous) inline box ... or the bottom
        // border edge of the last in-flow child"
        let height = specified_height
            .or(replaced.map(|(_, h)| h))
            .unwrap_or(content_height);
        tree[id].dimensions.content.height =
            clamp_size(height, style.min_height(), style.max_height(), cb.percent_height);

        #[cfg(feature = "layout-trace")]
        log::trace!(
            "[BLOCK] {:?} content {:?}",
            id,
            tree[id].dimensions.content
        );
    }

    /// Lay out the children of `id` and return the height they occupy.
    fn layout_contents(&mut self, tree: &mut BoxTree, id: BoxId, cb: &ContainingBlock) -> f32 {
        let node = &tree[id];
        if !matches!(node.content, BoxContent::Children) || node.children.is_empty() {
            return 0.0;
        }
        if node.children.iter().all(|&c| tree[c].is_inline_level()) {
            InlineFormattingContext::new(self, tree, id, cb).layout(self, tree)
        } else {
            BlockFormattingContext::new(self, tree, id, cb).layout(self, tree)
        }
    }
}
