//! The render tree: the styled, rendering-eligible part of the document.
//!
//! [HTML § 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements)
//!
//! Built once per document or style change from a [`DomTree`] and the
//! cascade's [`StyleMap`]. Metadata elements are dropped, comments are
//! dropped, and text is whitespace-normalized here so that later stages
//! can slice it with byte ranges that never change.

use std::sync::Arc;

use koala_css::{ComputedStyle, StyleMap, WhiteSpace};
use koala_dom::{AttributesMap, DomTree, NodeId, NodeType};
use serde::Serialize;

/// Index of a node in a [`RenderTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RenderId(pub usize);

/// "The following elements must have their display set to none"
///
/// These never reach the render tree, whatever the stylesheet says.
const HIDDEN_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "datalist", "head", "link", "meta", "noembed", "noframes",
    "param", "rp", "script", "style", "template", "title",
];

/// What a render node holds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderKind {
    /// An element with its tag name and attributes.
    Element {
        /// Lowercase local name.
        tag_name: String,
        /// Attribute map; boolean attributes map to `None`.
        attrs: AttributesMap,
    },
    /// Normalized text.
    Text(Arc<str>),
}

/// One styled node.
#[derive(Debug, Clone, Serialize)]
pub struct RenderNode {
    /// Position in the arena; ids are handed out in document order.
    pub id: RenderId,
    /// Element or text.
    pub kind: RenderKind,
    /// Non-owning back-link.
    pub parent: Option<RenderId>,
    /// Owned children, in order.
    pub children: Vec<RenderId>,
    /// The document node this was copied from.
    #[serde(skip)]
    pub dom_node: NodeId,
    /// Whether whitespace separated this node from the previous rendered
    /// sibling in the source.
    pub adjacent_whitespace: bool,
    /// Computed style; text nodes share their parent's.
    #[serde(skip)]
    pub style: Arc<ComputedStyle>,
}

impl RenderNode {
    /// Tag name for elements.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            RenderKind::Element { tag_name, .. } => Some(tag_name),
            RenderKind::Text(_) => None,
        }
    }

    /// Attribute value for elements; boolean attributes read as `""`.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        match &self.kind {
            RenderKind::Element { attrs, .. } => {
                attrs.get(name).map(|v| v.as_deref().unwrap_or(""))
            }
            RenderKind::Text(_) => None,
        }
    }

    /// Text content for text nodes.
    #[must_use]
    pub fn text(&self) -> Option<&Arc<str>> {
        match &self.kind {
            RenderKind::Text(text) => Some(text),
            RenderKind::Element { .. } => None,
        }
    }
}

/// Arena of [`RenderNode`]s rooted at the document element.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderTree {
    nodes: Vec<RenderNode>,
    root: Option<RenderId>,
}

/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
///
/// "any sequence of collapsible spaces and tabs immediately preceding or
/// following a segment break is removed ... every collapsible tab is
/// converted to a space ... any collapsible space immediately following
/// another collapsible space ... is collapsed"
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

impl RenderTree {
    /// Copy the rendered part of `dom` and attach styles from `styles`.
    ///
    /// Elements missing from `styles` get initial values. Returns an empty
    /// tree when the document has no element.
    #[must_use]
    pub fn build(dom: &DomTree, styles: &StyleMap) -> Self {
        let mut tree = Self::default();
        if let Some(root) = dom.document_element() {
            tree.root = tree.copy_node(dom, styles, root, None, None);
        }
        tree
    }

    /// The document element's render node.
    #[must_use]
    pub const fn root(&self) -> Option<RenderId> {
        self.root
    }

    /// Node by id.
    #[must_use]
    pub fn get(&self, id: RenderId) -> Option<&RenderNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in id (document) order.
    pub fn nodes(&self) -> impl Iterator<Item = &RenderNode> {
        self.nodes.iter()
    }

    /// The render node for a document node, if it was rendered.
    #[must_use]
    pub fn find_dom(&self, dom_node: NodeId) -> Option<RenderId> {
        self.nodes
            .iter()
            .find(|n| n.dom_node == dom_node)
            .map(|n| n.id)
    }

    fn push(&mut self, mut node: RenderNode) -> RenderId {
        let id = RenderId(self.nodes.len());
        node.id = id;
        if let Some(parent) = node.parent {
            self.nodes[parent.0].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    fn copy_node(
        &mut self,
        dom: &DomTree,
        styles: &StyleMap,
        id: NodeId,
        parent: Option<RenderId>,
        parent_style: Option<&Arc<ComputedStyle>>,
    ) -> Option<RenderId> {
        let node = dom.get(id)?;
        let NodeType::Element(element) = &node.node_type else {
            return None;
        };
        if HIDDEN_ELEMENTS.contains(&element.tag_name.as_str()) {
            return None;
        }

        let style = Arc::new(styles.get(&id).cloned().unwrap_or_else(|| {
            parent_style.map_or_else(ComputedStyle::initial, |p| ComputedStyle::inherit_from(p))
        }));
        let render_id = self.push(RenderNode {
            id: RenderId(0),
            kind: RenderKind::Element {
                tag_name: element.tag_name.clone(),
                attrs: element.attrs.clone(),
            },
            parent,
            children: Vec::new(),
            dom_node: id,
            adjacent_whitespace: node.adjacent_whitespace,
            style: Arc::clone(&style),
        });

        // Whitespace dropped since the last rendered child; reinstated on
        // the next one as `adjacent_whitespace`.
        let mut pending_space = false;
        for &child in dom.children(id) {
            match dom.get(child).map(|n| &n.node_type) {
                Some(NodeType::Text(raw)) => {
                    let preserve =
                        matches!(style.white_space(), WhiteSpace::Pre | WhiteSpace::PreWrap);
                    let text = if preserve {
                        raw.clone()
                    } else {
                        collapse_whitespace(raw)
                    };
                    if !preserve && text.trim().is_empty() {
                        pending_space = pending_space || !text.is_empty();
                        continue;
                    }
                    let _ = self.push(RenderNode {
                        id: RenderId(0),
                        kind: RenderKind::Text(Arc::from(text)),
                        parent: Some(render_id),
                        children: Vec::new(),
                        dom_node: child,
                        adjacent_whitespace: pending_space || dom.adjacent_whitespace(child),
                        style: Arc::clone(&style),
                    });
                    pending_space = false;
                }
                Some(NodeType::Element(_)) => {
                    if let Some(copied) =
                        self.copy_node(dom, styles, child, Some(render_id), Some(&style))
                    {
                        if pending_space {
                            self.nodes[copied.0].adjacent_whitespace = true;
                        }
                        pending_space = false;
                    }
                }
                _ => {}
            }
        }
        Some(render_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koala_dom::ElementData;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), " a b ");
    }

    #[test]
    fn test_hidden_elements_and_whitespace_runs_are_dropped() {
        let mut dom = DomTree::new();
        let html = dom.append_element(NodeId::ROOT, ElementData::new("html"));
        let head = dom.append_element(html, ElementData::new("head"));
        let _ = dom.append_element(head, ElementData::new("title"));
        let body = dom.append_element(html, ElementData::new("body"));
        let _ = dom.append_element(body, ElementData::new("b"));
        let _ = dom.append_text(body, "   \n  ");
        let i = dom.append_element(body, ElementData::new("i"));
        let _ = dom.append_text(i, "x");

        let tree = RenderTree::build(&dom, &StyleMap::new());
        let names: Vec<_> = tree.nodes().map(|n| n.tag_name().unwrap_or("#text")).collect();
        assert_eq!(names, ["html", "body", "b", "i", "#text"]);

        let i_node = tree.get(RenderId(3)).unwrap();
        assert!(i_node.adjacent_whitespace);
        assert_eq!(i_node.parent, Some(RenderId(1)));
        assert_eq!(tree.find_dom(i), Some(RenderId(3)));
    }

    #[test]
    fn test_text_shares_parent_style() {
        let mut dom = DomTree::new();
        let html = dom.append_element(NodeId::ROOT, ElementData::new("html"));
        let _ = dom.append_text(html, "hello   world");
        let tree = RenderTree::build(&dom, &StyleMap::new());
        let text = tree.get(RenderId(1)).unwrap();
        assert_eq!(text.text().map(|t| &**t), Some("hello world"));
        assert!(Arc::ptr_eq(&text.style, &tree.get(RenderId(0)).unwrap().style));
    }

    #[test]
    fn test_render_tree_serializes_text() {
        let mut dom = DomTree::new();
        let html = dom.append_element(NodeId::ROOT, ElementData::new("html"));
        let _ = dom.append_text(html, "hello   world");
        let tree = RenderTree::build(&dom, &StyleMap::new());

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["nodes"][0]["kind"]["element"]["tag_name"], "html");
        assert_eq!(json["nodes"][1]["kind"]["text"], "hello world");
        assert_eq!(json["nodes"][1]["parent"], 0);
    }
}
