//! Splitting inline boxes across lines.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "When an inline box exceeds the width of a line box, it is split into
//! several boxes and these boxes are distributed across several line
//! boxes."

use super::{BoxContent, BoxId, BoxTree};

/// Split the inline ancestors of `split` so that `split` starts a fresh
/// fragment of each of them, up to (not including) `context_root`.
///
/// At each level the parent keeps the children before the split point and
/// a shallow copy of it, inserted right after it, takes the rest. The
/// original loses its right edge and the copy its left edge. A box that is
/// already its parent's first child needs no copy at that level.
///
/// Returns the continuation boxes created, innermost first.
pub fn partition_before(tree: &mut BoxTree, split: BoxId, context_root: BoxId) -> Vec<BoxId> {
    let mut created = Vec::new();
    let mut current = split;
    while let Some(parent) = tree[current].parent {
        if parent == context_root {
            break;
        }
        let Some(index) = tree.index_in_parent(current) else {
            break;
        };
        if index == 0 {
            current = parent;
            continue;
        }
        let Some(grandparent) = tree[parent].parent else {
            break;
        };
        let Some(parent_index) = tree.index_in_parent(parent) else {
            break;
        };

        let continuation = tree.duplicate(parent);
        let moved = tree[parent].children.split_off(index);
        tree.set_children(continuation, moved);
        tree.insert_child(grandparent, parent_index + 1, continuation);

        tree[continuation].skip_left_edge = true;
        tree[continuation].adjacent_whitespace = false;
        tree[parent].skip_right_edge = true;

        #[cfg(feature = "layout-trace")]
        log::trace!("[PARTITION] {:?} continues as {:?}", parent, continuation);

        created.push(continuation);
        current = continuation;
    }
    created
}

/// Cut the text box `id` at byte offset `at` of its fragment. The tail
/// becomes a new sibling right after `id`, which is returned. The tail
/// carries the right edge; the head keeps the left one.
///
/// Returns `None` when `id` is not an attached text box or `at` is not an
/// interior character boundary.
pub fn split_text_box(tree: &mut BoxTree, id: BoxId, at: usize) -> Option<BoxId> {
    let BoxContent::Text(run) = &tree[id].content else {
        return None;
    };
    let text = run.as_str();
    if at == 0 || at >= text.len() || !text.is_char_boundary(at) {
        return None;
    }
    let parent = tree[id].parent?;
    let index = tree.index_in_parent(id)?;
    let cut = run.range.start + at;
    let end = run.range.end;

    let tail = tree.duplicate(id);
    if let BoxContent::Text(head) = &mut tree[id].content {
        head.range.end = cut;
    }
    if let BoxContent::Text(rest) = &mut tree[tail].content {
        rest.range = cut..end;
    }
    tree[tail].adjacent_whitespace = false;
    tree[tail].skip_left_edge = true;
    tree[id].skip_right_edge = true;
    tree.insert_child(parent, index + 1, tail);
    Some(tail)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use koala_css::{ComputedStyle, DisplayValue};

    use super::*;
    use crate::box_tree::{BoxNode, TextRun};

    fn inline(tree: &mut BoxTree, parent: Option<BoxId>) -> BoxId {
        let id = tree.alloc(BoxNode::new(
            DisplayValue::inline(),
            Arc::new(ComputedStyle::initial()),
            BoxContent::Children,
        ));
        if let Some(parent) = parent {
            tree.append_child(parent, id);
        }
        id
    }

    fn text(tree: &mut BoxTree, parent: BoxId, value: &str) -> BoxId {
        let id = tree.alloc(BoxNode::new(
            DisplayValue::inline(),
            Arc::new(ComputedStyle::initial()),
            BoxContent::Text(TextRun {
                source: Arc::from(value),
                range: 0..value.len(),
            }),
        ));
        tree.append_child(parent, id);
        id
    }

    #[test]
    fn test_partition_splits_every_inline_ancestor() {
        // root > span > em > [a, b]
        let mut tree = BoxTree::new();
        let root = tree.alloc(BoxNode::new(
            DisplayValue::block(),
            Arc::new(ComputedStyle::initial()),
            BoxContent::Children,
        ));
        tree.set_root(root);
        let span = inline(&mut tree, Some(root));
        let em = inline(&mut tree, Some(span));
        let a = text(&mut tree, em, "a");
        let b = text(&mut tree, em, "b");

        let created = partition_before(&mut tree, b, root);
        assert_eq!(created.len(), 2);
        let (em2, span2) = (created[0], created[1]);

        assert_eq!(tree[root].children, vec![span, span2]);
        assert_eq!(tree[span].children, vec![em]);
        assert_eq!(tree[span2].children, vec![em2]);
        assert_eq!(tree[em].children, vec![a]);
        assert_eq!(tree[em2].children, vec![b]);
        assert!(tree[span].skip_right_edge && tree[span2].skip_left_edge);
        assert!(!tree[span].skip_left_edge && !tree[span2].skip_right_edge);
    }

    #[test]
    fn test_partition_at_first_child_is_a_no_op() {
        let mut tree = BoxTree::new();
        let root = inline(&mut tree, None);
        tree.set_root(root);
        let span = inline(&mut tree, Some(root));
        let a = text(&mut tree, span, "a");
        assert!(partition_before(&mut tree, a, root).is_empty());
        assert_eq!(tree[root].children, vec![span]);
    }

    #[test]
    fn test_split_text_box() {
        let mut tree = BoxTree::new();
        let root = inline(&mut tree, None);
        let t = text(&mut tree, root, "hello world");
        let tail = split_text_box(&mut tree, t, 6).unwrap();
        assert_eq!(tree[t].text(), Some("hello "));
        assert_eq!(tree[tail].text(), Some("world"));
        assert_eq!(tree[root].children, vec![t, tail]);
        assert!(split_text_box(&mut tree, tail, 0).is_none());
    }
}
