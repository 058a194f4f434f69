//! End-to-end layout tests: DOM and CSS in, box geometry out.

use koala_common::warning::Diagnostics;
use koala_css::{InnerDisplayType, Origin, Stylesheet};
use koala_dom::{DomTree, ElementData, NodeId};
use koala_layout::{
    BoxId, BoxTree, LaidOutDocument, LayoutConfig, LayoutSession, Rect, TextRun,
    generate_box_tree, normalize,
};
use quickcheck_macros::quickcheck;

/// Display rules for the tags these tests use; the HTML default sheet is
/// off so that nothing else sneaks in.
const BASE_CSS: &str = "
    div { display: block }
    span { display: inline }
    em { display: inline-block }
    table { display: table }
    tr { display: table-row }
    td { display: table-cell }
";

fn config() -> LayoutConfig {
    LayoutConfig {
        user_agent_stylesheet: false,
        ..LayoutConfig::default()
    }
}

fn render(dom: &DomTree, css: &str) -> LaidOutDocument {
    let _ = env_logger::builder().is_test(true).try_init();
    let sheet = Stylesheet::parse(Origin::Embedded, &format!("{BASE_CSS}\n{css}"));
    LayoutSession::with_approximate_metrics(config()).render(dom, &[sheet])
}

fn el(dom: &mut DomTree, parent: NodeId, tag: &str, style: &str) -> NodeId {
    let mut element = ElementData::new(tag);
    if !style.is_empty() {
        element = element.with_attr("style", Some(style));
    }
    dom.append_element(parent, element)
}

fn html(dom: &mut DomTree) -> NodeId {
    el(dom, NodeId::ROOT, "html", "")
}

/// The box generated by a document node.
fn box_for(doc: &LaidOutDocument, node: NodeId) -> BoxId {
    let render = doc.render_tree.find_dom(node).expect("node was rendered");
    doc.box_tree
        .attached()
        .into_iter()
        .find(|&b| doc.box_tree[b].render_node == Some(render))
        .expect("node has a box")
}

fn margin_box(doc: &LaidOutDocument, node: NodeId) -> Rect {
    doc.box_tree[box_for(doc, node)].dimensions.margin_box()
}

fn content(doc: &LaidOutDocument, node: NodeId) -> Rect {
    doc.box_tree[box_for(doc, node)].dimensions.content
}

#[test]
fn test_inline_blocks_wrap_in_narrow_container() {
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let container = el(&mut dom, root, "div", "width: 100px");
    let items: Vec<_> = (0..5)
        .map(|_| el(&mut dom, container, "em", "width: 40px; height: 10px"))
        .collect();

    let doc = render(&dom, "");
    let origins: Vec<_> = items
        .iter()
        .map(|&item| {
            let r = margin_box(&doc, item);
            (r.x, r.y)
        })
        .collect();
    assert_eq!(
        origins,
        [(0.0, 0.0), (40.0, 0.0), (0.0, 10.0), (40.0, 10.0), (0.0, 20.0)]
    );
    assert_eq!(content(&doc, container).height, 30.0);
}

#[test]
fn test_nested_percent_widths() {
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let a = el(&mut dom, root, "div", "width: 210px");
    let b = el(&mut dom, a, "div", "width: 50%");
    let c = el(&mut dom, b, "div", "width: 20%");

    let doc = render(&dom, "");
    assert_eq!(content(&doc, b).width, 105.0);
    assert_eq!(content(&doc, c).width, 21.0);
}

fn table_with(dom: &mut DomTree, rows: &[&[(usize, f32)]]) -> (NodeId, Vec<Vec<NodeId>>) {
    let root = html(dom);
    let table = el(dom, root, "table", "");
    let cells = rows
        .iter()
        .map(|row| {
            let tr = el(dom, table, "tr", "");
            row.iter()
                .map(|&(colspan, width)| {
                    let mut td = ElementData::new("td");
                    if colspan > 1 {
                        td = td.with_attr("colspan", Some(&colspan.to_string()));
                    }
                    let td = dom.append_element(tr, td);
                    let _ = el(dom, td, "em", &format!("width: {width}px; height: 5px"));
                    td
                })
                .collect()
        })
        .collect();
    (table, cells)
}

#[test]
fn test_auto_table_columns_take_widest_cell() {
    let mut dom = DomTree::new();
    let (table, cells) = table_with(&mut dom, &[&[(1, 10.0), (1, 15.0)], &[(1, 15.0), (1, 12.0)]]);

    let doc = render(&dom, "");
    assert_eq!(content(&doc, table).width, 30.0);
    let widths: Vec<_> = cells[0].iter().map(|&td| margin_box(&doc, td).width).collect();
    assert_eq!(widths, [15.0, 15.0]);
    assert_eq!(margin_box(&doc, cells[1][1]).x, 15.0);
    assert_eq!(margin_box(&doc, cells[1][0]).y, 5.0);
    assert_eq!(content(&doc, table).height, 10.0);
}

#[test]
fn test_colspan_shortfall_splits_evenly() {
    let mut dom = DomTree::new();
    let (table, cells) = table_with(&mut dom, &[&[(1, 10.0), (1, 10.0)], &[(2, 56.0)]]);

    let doc = render(&dom, "");
    let widths: Vec<_> = cells[0].iter().map(|&td| margin_box(&doc, td).width).collect();
    assert_eq!(widths, [28.0, 28.0]);
    assert_eq!(margin_box(&doc, cells[1][0]).width, 56.0);
    assert_eq!(content(&doc, table).width, 56.0);
}

#[test]
fn test_border_spacing_and_vertical_align() {
    let mut dom = DomTree::new();
    let (table, cells) = table_with(&mut dom, &[&[(1, 10.0), (1, 10.0)]]);
    let doc = render(
        &dom,
        "table { border-spacing: 3px } tr { height: 20px } td { vertical-align: bottom }",
    );

    assert_eq!(content(&doc, table).width, 29.0);
    assert_eq!(content(&doc, table).height, 26.0);
    let second = margin_box(&doc, cells[0][1]);
    assert_eq!((second.x, second.y), (16.0, 3.0));

    // The 5px-high content sits at the bottom of the 20px row.
    let td = box_for(&doc, cells[0][1]);
    let item = doc.box_tree[td].children[0];
    assert_eq!(doc.box_tree[item].dimensions.margin_box().y, 18.0);
}

#[test]
fn test_empty_table_and_its_caption_have_no_size() {
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let _ = el(&mut dom, root, "div", "height: 50px");
    let table = el(&mut dom, root, "table", "");
    let caption = el(&mut dom, table, "caption", "height: 10px");
    let _ = dom.append_text(caption, "title");

    let doc = render(&dom, "caption { display: table-caption }");
    assert_eq!(content(&doc, table), Rect::new(0.0, 50.0, 0.0, 0.0));
    assert_eq!(margin_box(&doc, caption), Rect::new(0.0, 50.0, 0.0, 0.0));
    let caption_box = box_for(&doc, caption);
    assert!(
        doc.box_tree
            .preorder(caption_box)
            .into_iter()
            .all(|b| doc.box_tree[b].dimensions.margin_box() == Rect::new(0.0, 50.0, 0.0, 0.0))
    );
}

#[test]
fn test_rowspan_height_is_shared_by_spanned_rows() {
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let table = el(&mut dom, root, "table", "");
    let first = el(&mut dom, table, "tr", "");
    let tall = dom.append_element(first, ElementData::new("td").with_attr("rowspan", Some("2")));
    let _ = el(&mut dom, tall, "em", "width: 10px; height: 30px");
    let top = el(&mut dom, first, "td", "");
    let _ = el(&mut dom, top, "em", "width: 10px; height: 5px");
    let second = el(&mut dom, table, "tr", "");
    let bottom = el(&mut dom, second, "td", "");
    let _ = el(&mut dom, bottom, "em", "width: 10px; height: 5px");

    let doc = render(&dom, "");
    assert_eq!(content(&doc, table).height, 30.0);
    assert_eq!(margin_box(&doc, first).height, 15.0);
    assert_eq!(margin_box(&doc, second), Rect::new(0.0, 15.0, 20.0, 15.0));
    let below = margin_box(&doc, bottom);
    assert_eq!((below.x, below.y), (10.0, 15.0));
    assert_eq!(margin_box(&doc, tall).height, 30.0);
}

#[test]
fn test_shrink_to_fit_inline_block() {
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let container = el(&mut dom, root, "div", "width: 300px; font-size: 10px");
    let shrink = el(&mut dom, container, "em", "");
    let _ = dom.append_text(shrink, "aaaa bb");

    let doc = render(&dom, "");
    // 7 characters at 6px.
    assert_eq!(content(&doc, shrink).width, 42.0);
}

#[test]
fn test_text_align_right_in_full_pipeline() {
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let container = el(&mut dom, root, "div", "width: 100px; font-size: 10px; text-align: right");
    let text = dom.append_text(container, "abc");

    let doc = render(&dom, "");
    let fragment = box_for(&doc, text);
    assert_eq!(doc.box_tree[fragment].dimensions.content.x, 82.0);
}

#[test]
fn test_display_none_and_hidden_elements_generate_no_boxes() {
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let head = el(&mut dom, root, "head", "");
    let _ = el(&mut dom, head, "style", "");
    let gone = el(&mut dom, root, "div", "display: none");
    let _ = dom.append_text(gone, "invisible");

    let doc = render(&dom, "");
    assert!(doc.render_tree.find_dom(head).is_none());
    assert_eq!(doc.box_tree.attached().len(), 1);
}

#[test]
fn test_box_tree_serializes_to_json() {
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let _ = el(&mut dom, root, "div", "height: 12px");

    let doc = render(&dom, "");
    let json = serde_json::to_value(&doc.box_tree).expect("box tree serializes");
    assert_eq!(json["root"], 0);
    let child = &json["nodes"][1];
    assert_eq!(child["display"]["outer"], "Block");
    assert_eq!(child["dimensions"]["content"]["height"], 12.0);
    assert_eq!(child["anonymous"], false);
}

/// Build a random document from `(parent, kind)` instructions.
fn random_dom(ops: &[(u8, u8)]) -> DomTree {
    const TAGS: [&str; 7] = ["div", "span", "em", "table", "tr", "td", "#text"];
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let mut elements = vec![root];
    for &(parent, kind) in ops {
        let parent = elements[usize::from(parent) % elements.len()];
        match TAGS[usize::from(kind) % TAGS.len()] {
            "#text" => {
                let _ = dom.append_text(parent, "word word");
            }
            tag => elements.push(el(&mut dom, parent, tag, "")),
        }
    }
    dom
}

fn child_displays(tree: &BoxTree, id: BoxId) -> Vec<InnerDisplayType> {
    tree[id].children.iter().map(|&c| tree[c].display.inner).collect()
}

/// Normalizing a generated box tree again changes nothing, and the
/// anonymous box rules hold everywhere.
#[quickcheck]
fn prop_box_generation_is_idempotent(ops: Vec<(u8, u8)>) -> bool {
    let ops: Vec<_> = ops.into_iter().take(40).collect();
    let dom = random_dom(&ops);
    let doc = render(&dom, "");
    let mut diagnostics = Diagnostics::new();
    let generated = generate_box_tree(&doc.render_tree, &mut diagnostics);
    let mut again = generated.clone();
    normalize(&mut again);

    let unchanged = serde_json::to_value(&generated).ok() == serde_json::to_value(&again).ok();
    let tree = &generated;
    let well_formed = tree.attached().into_iter().all(|id| {
        let node = &tree[id];
        let kinds = child_displays(tree, id);
        let inline_children = node.children.iter().filter(|&&c| tree[c].is_inline_level()).count();
        let mixed = inline_children > 0 && inline_children < node.children.len();
        let rows_hold_cells = node.display.inner != InnerDisplayType::TableRow
            || kinds.iter().all(|&k| k == InnerDisplayType::TableCell);
        let cells_in_rows = node.display.inner == InnerDisplayType::TableRow
            || kinds.iter().all(|&k| k != InnerDisplayType::TableCell);
        !(node.is_block_container() && mixed) && rows_hold_cells && cells_in_rows
    });
    unchanged && well_formed
}

/// Text fragments reassemble the source text, and a fragment only sticks
/// out of its line when it holds a single word.
#[quickcheck]
fn prop_text_fragments_fit_and_concatenate(words: Vec<u8>, width: u8) -> bool {
    let text = words
        .iter()
        .take(30)
        .map(|w| "m".repeat(usize::from(w % 8) + 1))
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return true;
    }
    let width = f32::from(width) + 1.0;
    let mut dom = DomTree::new();
    let root = html(&mut dom);
    let container = el(&mut dom, root, "div", &format!("width: {width}px; font-size: 10px"));
    let _ = dom.append_text(container, &text);

    let doc = render(&dom, "");
    let tree = &doc.box_tree;
    let block = box_for(&doc, container);
    let fragments = tree.text_fragments(block);
    let joined: String = fragments.into_iter().map(TextRun::as_str).collect();

    let right_edge = tree[block].dimensions.content.right() + 0.01;
    let fits = tree.attached().into_iter().filter(|&b| tree[b].is_text()).all(|b| {
        let node = &tree[b];
        node.dimensions.content.right() <= right_edge
            || node.text().is_some_and(|t| t.split_whitespace().count() == 1)
    });
    joined == text && fits
}
