//! Render tree, box generation, and layout for the Koala renderer.
//!
//! # Pipeline
//!
//! ```text
//! DomTree + StyleMap ──► RenderTree ──► BoxTree ──► laid-out BoxTree
//!                        (styled)      (anonymous   (BoxDimensions on
//!                                       boxes)       every box)
//! ```
//!
//! - **Render tree** ([`render_tree`]): the rendered elements and
//!   normalized text of a document, each with its computed style
//! - **Box tree** ([`box_tree`]): one box per rendered node plus the
//!   anonymous boxes CSS 2.1 § 9.2.1.1 and § 17.2.1 require
//! - **Layout** ([`layout`]): block, inline and table formatting contexts,
//!   shrink-to-fit by trial layout
//! - **Text** ([`text`]): font metrics, a per-font measurement cache, and
//!   word-boundary line splitting
//!
//! [`LayoutSession::render`] runs the whole pipeline, from DOM and
//! stylesheets to geometry.
//!
//! # Not Yet Implemented
//!
//! - Floats, positioning, flex and grid
//! - Margin collapsing
//! - Baseline alignment (lines and cells align to the top)
//! - `border-collapse: collapse` borders (spacing is dropped, borders are not merged)

/// Boxes, anonymous box generation, and inline partitioning.
pub mod box_tree;
/// Session-wide layout settings.
pub mod config;
/// Formatting contexts and box geometry.
pub mod layout;
/// The styled render tree.
pub mod render_tree;
/// Text measurement and splitting.
pub mod text;

pub use box_tree::{
    BoxContent, BoxId, BoxNode, BoxTree, FormattingContextId, TextRun, generate_box_tree,
    normalize, partition_before, split_text_box,
};
pub use config::{ConfigError, LayoutConfig};
pub use layout::box_model::{BoxDimensions, EdgeSizes, Rect};
pub use layout::{LaidOutDocument, LayoutSession};
pub use render_tree::{RenderId, RenderKind, RenderNode, RenderTree};
pub use text::{ApproximateFontMetrics, DimensionCalculator, FontKey, FontMetrics, split_point, split_text};
