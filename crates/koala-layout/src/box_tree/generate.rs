//! Box generation and anonymous box fixup.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//! [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)

use std::sync::Arc;

use koala_common::warning::Diagnostics;
use koala_css::{DisplayValue, InnerDisplayType, OuterDisplayType};

use super::{BoxContent, BoxId, BoxNode, BoxTree, TextRun};
use crate::render_tree::{RenderId, RenderKind, RenderNode, RenderTree};

/// HTML caps on `colspan` and `rowspan`.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// Build the box tree for `render` and normalize it.
///
/// Every rendered element with a `display` other than `none` (and other
/// than `table-column`) gets one box; every text node gets an inline box.
/// Malformed `colspan`/`rowspan` values are reported to `diagnostics`.
#[must_use]
pub fn generate_box_tree(render: &RenderTree, diagnostics: &mut Diagnostics) -> BoxTree {
    let mut tree = BoxTree::new();
    let Some(root) = render.root() else {
        return tree;
    };
    if let Some(id) = build_box(render, root, &mut tree, diagnostics, true) {
        tree.set_root(id);
        normalize(&mut tree);
    }

    #[cfg(feature = "layout-trace")]
    log::trace!("[BOX TREE] {} boxes", tree.attached().len());

    tree
}

fn build_box(
    render: &RenderTree,
    id: RenderId,
    tree: &mut BoxTree,
    diagnostics: &mut Diagnostics,
    is_root: bool,
) -> Option<BoxId> {
    let node = render.get(id)?;
    let (display, content) = match &node.kind {
        RenderKind::Text(text) => (
            DisplayValue::inline(),
            BoxContent::Text(TextRun {
                source: Arc::clone(text),
                range: 0..text.len(),
            }),
        ),
        RenderKind::Element { tag_name, .. } => {
            let mut display = node.style.display()?;
            if display.inner == InnerDisplayType::TableColumn {
                return None;
            }
            // [§ 2.7 Automatic Box Type Transformations](https://www.w3.org/TR/css-display-3/#transformations)
            // "The root element's display type is always blockified."
            if is_root {
                display.outer = OuterDisplayType::Block;
            }
            let content = match tag_name.as_str() {
                "br" => BoxContent::LineBreak,
                "img" => BoxContent::Replaced {
                    width: dimension_attr(node, "width"),
                    height: dimension_attr(node, "height"),
                },
                _ => BoxContent::Children,
            };
            (display, content)
        }
    };

    let mut new_box = BoxNode::new(display, Arc::clone(&node.style), content);
    new_box.render_node = Some(id);
    new_box.adjacent_whitespace = node.adjacent_whitespace;
    if display.inner == InnerDisplayType::TableCell {
        new_box.colspan = span_attr(node, "colspan", MAX_COLSPAN, diagnostics);
        new_box.rowspan = span_attr(node, "rowspan", MAX_ROWSPAN, diagnostics);
    }
    let has_children = matches!(new_box.content, BoxContent::Children);
    let box_id = tree.alloc(new_box);

    if has_children {
        for &child in &node.children {
            if let Some(child_box) = build_box(render, child, tree, diagnostics, false) {
                tree.append_child(box_id, child_box);
            }
        }
    }
    Some(box_id)
}

/// Intrinsic image size from the `width`/`height` attributes; zero when
/// absent. There is no image decoding here.
fn dimension_attr(node: &RenderNode, name: &str) -> f32 {
    node.attr(name)
        .and_then(|v| v.trim().trim_end_matches("px").parse::<f32>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// [HTML § 4.9.11 Processing model](https://html.spec.whatwg.org/multipage/tables.html#attr-tdth-colspan)
///
/// "If parsing that value failed, or returned zero, or if the attribute is
/// absent, then let colspan be 1, instead."
///
/// `rowspan="0"` ("span to the end of the row group") is also treated as 1.
fn span_attr(node: &RenderNode, name: &str, max: usize, diagnostics: &mut Diagnostics) -> usize {
    let Some(raw) = node.attr(name) else {
        return 1;
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => 1,
        Ok(n) => n.min(max),
        Err(_) => {
            let _ = diagnostics.warn_once("BOX", &format!("ignoring {name}=\"{raw}\""));
            1
        }
    }
}

/// Apply the anonymous box rules to every box under the root, children
/// before parents.
///
/// Running it on an already normalized tree changes nothing.
pub fn normalize(tree: &mut BoxTree) {
    for id in tree.attached().into_iter().rev() {
        normalize_box(tree, id);
    }
}

/// Fix up the children of one box. Wrappers created here are normalized
/// before returning, so the subtree at `id` is fully normalized afterwards
/// as long as its original children were.
fn normalize_box(tree: &mut BoxTree, id: BoxId) {
    fix_table_structure(tree, id);
    promote_block_descendants(tree, id);
    wrap_inline_runs(tree, id);
}

fn inner(tree: &BoxTree, id: BoxId) -> InnerDisplayType {
    tree[id].display.inner
}

/// Replace each maximal run of `children` matching `in_run` with one
/// anonymous `display` box holding the run. Returns the wrappers.
fn wrap_runs(
    tree: &mut BoxTree,
    parent: BoxId,
    display: DisplayValue,
    in_run: impl Fn(&BoxNode) -> bool,
) -> Vec<BoxId> {
    let children = tree[parent].children.clone();
    if !children.iter().any(|&c| in_run(&tree[c])) {
        return Vec::new();
    }
    let parent_style = Arc::clone(&tree[parent].style);
    let mut rebuilt = Vec::with_capacity(children.len());
    let mut wrappers = Vec::new();
    let mut run: Vec<BoxId> = Vec::new();

    let mut flush = |tree: &mut BoxTree, run: &mut Vec<BoxId>, rebuilt: &mut Vec<BoxId>| {
        if run.is_empty() {
            return;
        }
        let wrapper = tree.alloc(BoxNode::anonymous(display, &parent_style));
        tree[wrapper].adjacent_whitespace = tree[run[0]].adjacent_whitespace;
        tree.set_children(wrapper, std::mem::take(run));
        rebuilt.push(wrapper);
        wrappers.push(wrapper);
    };

    for child in children {
        if in_run(&tree[child]) {
            run.push(child);
        } else {
            flush(tree, &mut run, &mut rebuilt);
            rebuilt.push(child);
        }
    }
    flush(tree, &mut run, &mut rebuilt);
    tree.set_children(parent, rebuilt);
    wrappers
}

/// [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
///
/// STEP 1: "Generate missing child wrappers" for rows, row groups and
/// tables. STEP 2: "Generate missing parents" for stray cells, rows and row
/// groups.
fn fix_table_structure(tree: &mut BoxTree, id: BoxId) {
    use InnerDisplayType::{Table, TableCaption, TableCell, TableRow, TableRowGroup};

    match inner(tree, id) {
        // "If a child C of a 'table-row' box is not a 'table-cell', then
        // generate an anonymous 'table-cell' box around C and all
        // consecutive siblings of C that are not 'table-cell' boxes."
        TableRow => {
            for cell in wrap_runs(tree, id, DisplayValue::table_cell(), |b| {
                b.display.inner != TableCell
            }) {
                normalize_box(tree, cell);
            }
        }
        // "If a child C of a row group box is not a 'table-row' box, then
        // generate an anonymous 'table-row' box around C and all
        // consecutive siblings of C that are not 'table-row' boxes."
        TableRowGroup => {
            for row in wrap_runs(tree, id, DisplayValue::table_row(), |b| {
                b.display.inner != TableRow
            }) {
                normalize_box(tree, row);
            }
        }
        // "If a child C of a 'table' box is not a proper table child, then
        // generate an anonymous 'table-row' box around C and all
        // consecutive siblings of C that are not proper table children."
        Table => {
            for row in wrap_runs(tree, id, DisplayValue::table_row(), |b| {
                !matches!(b.display.inner, TableRowGroup | TableRow | TableCaption)
            }) {
                normalize_box(tree, row);
            }
        }
        _ => {
            // "For each 'table-cell' box C in a sequence of consecutive
            // internal table and 'table-caption' siblings, if C's parent is
            // not a 'table-row' then generate an anonymous 'table-row' box
            // around C and all consecutive siblings of C that are
            // 'table-cell' boxes."
            let _ = wrap_runs(tree, id, DisplayValue::table_row(), |b| {
                b.display.inner == TableCell
            });
            // "For each proper table child C, if C is misparented then
            // generate an anonymous 'table' or 'inline-table' box T around C
            // and all consecutive siblings of C that are proper table
            // children."
            for table in wrap_runs(tree, id, DisplayValue::table(), |b| {
                matches!(b.display.inner, TableRow | TableRowGroup)
            }) {
                normalize_box(tree, table);
            }
        }
    }
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// "When an inline box contains an in-flow block-level box, the inline box
/// (and its inline ancestors within the same line box) are broken around
/// the block-level box"
///
/// Each child inline box with a block-level descendant is replaced by an
/// anonymous block holding its children. Children were normalized first,
/// so the block-level boxes it holds are now direct children of the
/// wrapper.
fn promote_block_descendants(tree: &mut BoxTree, id: BoxId) {
    let children = tree[id].children.clone();
    let mut changed = false;
    let mut rebuilt = Vec::with_capacity(children.len());

    for child in children {
        if tree[child].is_inline_container() && has_block_descendant(tree, child) {
            let style = Arc::clone(&tree[child].style);
            let wrapper = tree.alloc(BoxNode::anonymous(DisplayValue::block(), &style));
            tree[wrapper].adjacent_whitespace = tree[child].adjacent_whitespace;
            let grandchildren = std::mem::take(&mut tree[child].children);
            tree.set_children(wrapper, grandchildren);
            tree[child].parent = None;
            wrap_inline_runs(tree, wrapper);
            rebuilt.push(wrapper);
            changed = true;
        } else {
            rebuilt.push(child);
        }
    }
    if changed {
        tree.set_children(id, rebuilt);
    }
}

/// Block-level boxes reachable through non-atomic inline boxes.
fn has_block_descendant(tree: &BoxTree, id: BoxId) -> bool {
    tree[id].children.iter().any(|&child| {
        let node = &tree[child];
        !node.is_inline_level() || (node.is_inline_container() && has_block_descendant(tree, child))
    })
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// "if a block container box has a block-level box inside it, then we
/// force it to have only block-level boxes inside it."
fn wrap_inline_runs(tree: &mut BoxTree, id: BoxId) {
    if !tree[id].is_block_container() {
        return;
    }
    let children = &tree[id].children;
    let has_inline = children.iter().any(|&c| tree[c].is_inline_level());
    let has_block = children.iter().any(|&c| !tree[c].is_inline_level());
    if has_inline && has_block {
        let _ = wrap_runs(tree, id, DisplayValue::block(), BoxNode::is_inline_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koala_css::{ComputedStyle, StyleMap};
    use koala_dom::{DomTree, ElementData, NodeId};

    fn styled(displays: &[(NodeId, DisplayValue)]) -> StyleMap {
        let mut styles = StyleMap::new();
        for &(id, display) in displays {
            let mut style = ComputedStyle::initial();
            style.set(koala_css::Property::Display, koala_css::Value::Display(Some(display)));
            let _ = styles.insert(id, style);
        }
        styles
    }

    fn shape(tree: &BoxTree, id: BoxId) -> String {
        let node = &tree[id];
        let name = match (node.text(), node.display.inner, node.display.outer) {
            (Some(text), _, _) => format!("'{text}'"),
            (None, InnerDisplayType::Table, _) => "table".to_string(),
            (None, InnerDisplayType::TableRow, _) => "row".to_string(),
            (None, InnerDisplayType::TableCell, _) => "cell".to_string(),
            (None, _, OuterDisplayType::Block) => "block".to_string(),
            (None, _, OuterDisplayType::Inline) => "inline".to_string(),
        };
        let name = if node.anonymous { format!("anon-{name}") } else { name };
        if node.children.is_empty() {
            name
        } else {
            let inner: Vec<_> = node.children.iter().map(|&c| shape(tree, c)).collect();
            format!("{name}[{}]", inner.join(" "))
        }
    }

    #[test]
    fn test_inline_runs_are_wrapped_next_to_blocks() {
        let mut dom = DomTree::new();
        let html = dom.append_element(NodeId::ROOT, ElementData::new("html"));
        let _ = dom.append_text(html, "a");
        let div = dom.append_element(html, ElementData::new("div"));
        let _ = dom.append_text(div, "b");
        let _ = dom.append_text(html, "c");
        let styles = styled(&[(html, DisplayValue::block()), (div, DisplayValue::block())]);
        let render = RenderTree::build(&dom, &styles);

        let tree = generate_box_tree(&render, &mut Diagnostics::new());
        let root = tree.root().unwrap();
        assert_eq!(shape(&tree, root), "block[anon-block['a'] block['b'] anon-block['c']]");
    }

    #[test]
    fn test_block_inside_inline_is_promoted() {
        let mut dom = DomTree::new();
        let html = dom.append_element(NodeId::ROOT, ElementData::new("html"));
        let span = dom.append_element(html, ElementData::new("span"));
        let _ = dom.append_text(span, "x");
        let div = dom.append_element(span, ElementData::new("div"));
        let _ = dom.append_text(div, "y");
        let styles = styled(&[(html, DisplayValue::block()), (div, DisplayValue::block())]);
        let render = RenderTree::build(&dom, &styles);

        let tree = generate_box_tree(&render, &mut Diagnostics::new());
        let root = tree.root().unwrap();
        assert_eq!(shape(&tree, root), "block[anon-block[anon-block['x'] block['y']]]");
    }

    #[test]
    fn test_stray_cell_gets_row_and_table() {
        let mut dom = DomTree::new();
        let html = dom.append_element(NodeId::ROOT, ElementData::new("html"));
        let td = dom.append_element(html, ElementData::new("td"));
        let _ = dom.append_text(td, "z");
        let styles =
            styled(&[(html, DisplayValue::block()), (td, DisplayValue::table_cell())]);
        let render = RenderTree::build(&dom, &styles);

        let tree = generate_box_tree(&render, &mut Diagnostics::new());
        let root = tree.root().unwrap();
        assert_eq!(shape(&tree, root), "block[anon-table[anon-row[cell['z']]]]");
    }

    #[test]
    fn test_bad_colspan_warns_once() {
        let mut dom = DomTree::new();
        let html = dom.append_element(NodeId::ROOT, ElementData::new("html"));
        let row = dom.append_element(html, ElementData::new("tr"));
        let a = dom.append_element(row, ElementData::new("td").with_attr("colspan", Some("x")));
        let b = dom.append_element(row, ElementData::new("td").with_attr("colspan", Some("3")));
        let styles = styled(
            &[
                (html, DisplayValue::table()),
                (row, DisplayValue::table_row()),
                (a, DisplayValue::table_cell()),
                (b, DisplayValue::table_cell()),
            ],
        );
        let render = RenderTree::build(&dom, &styles);
        let mut diagnostics = Diagnostics::new();
        let tree = generate_box_tree(&render, &mut diagnostics);

        let spans: Vec<_> = tree
            .attached()
            .into_iter()
            .filter(|&b| tree[b].display.inner == InnerDisplayType::TableCell)
            .map(|b| tree[b].colspan)
            .collect();
        assert_eq!(spans, [1, 3]);
        assert_eq!(diagnostics.len(), 1);
    }
}
