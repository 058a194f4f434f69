//! Table layout.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! Automatic table layout with separated borders:
//!
//! 1. Cells are placed on a slot grid honouring `colspan`/`rowspan`.
//! 2. Column tracks are sized from each cell's preferred widths.
//! 3. Cells are laid out at their column widths; row tracks are sized from
//!    the resulting heights with the same algorithm on the transposed grid.
//! 4. Rows, row groups and cells are positioned, and cell content is
//!    aligned vertically inside the cell.
//!
//! `border-spacing` separates every track from its neighbours and from the
//! table edge.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use koala_css::{InnerDisplayType, VerticalAlign};

use crate::box_tree::{BoxId, BoxTree};

use super::box_model::{BoxDimensions, Rect};
use super::{ContainingBlock, LayoutSession, resolve_edges};

/// One position in the table grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// No cell covers this slot.
    Empty,
    /// The top-left slot of a cell.
    Cell(BoxId),
    /// Covered by a spanning cell that starts elsewhere.
    Spanned {
        origin: BoxId,
        is_spanned_x: bool,
        is_spanned_y: bool,
    },
}

/// A cell and the slots it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GridCell {
    pub id: BoxId,
    pub row: usize,
    pub column: usize,
    pub rowspan: usize,
    pub colspan: usize,
}

impl GridCell {
    fn columns(&self) -> Range<usize> {
        self.column..self.column + self.colspan
    }

    fn rows(&self) -> Range<usize> {
        self.row..self.row + self.rowspan
    }
}

/// [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
///
/// "each row box occupies one row of grid cells ... cells may span
/// several rows or columns."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CellGrid {
    pub rows: usize,
    pub columns: usize,
    pub slots: Vec<Vec<Slot>>,
    pub cells: Vec<GridCell>,
}

impl CellGrid {
    /// Place the cells of `rows`, in order. Each cell takes the first free
    /// slot in its row. Row spans stop at the last row; overlapping spans
    /// keep the slot of whichever cell claimed it first.
    pub(crate) fn build(tree: &BoxTree, rows: &[BoxId]) -> Self {
        let mut slots: Vec<Vec<Slot>> = vec![Vec::new(); rows.len()];
        let mut cells = Vec::new();

        for (r, &row) in rows.iter().enumerate() {
            let mut column = 0;
            for &cell in &tree[row].children {
                if tree[cell].display.inner != InnerDisplayType::TableCell {
                    continue;
                }
                while slots[r].get(column).is_some_and(|slot| *slot != Slot::Empty) {
                    column += 1;
                }
                let colspan = tree[cell].colspan.max(1);
                let rowspan = tree[cell].rowspan.max(1).min(rows.len() - r);

                for dr in 0..rowspan {
                    let line = &mut slots[r + dr];
                    if line.len() < column + colspan {
                        line.resize(column + colspan, Slot::Empty);
                    }
                    for dc in 0..colspan {
                        if line[column + dc] != Slot::Empty {
                            continue;
                        }
                        line[column + dc] = if dr == 0 && dc == 0 {
                            Slot::Cell(cell)
                        } else {
                            Slot::Spanned {
                                origin: cell,
                                is_spanned_x: dc > 0,
                                is_spanned_y: dr > 0,
                            }
                        };
                    }
                }
                cells.push(GridCell {
                    id: cell,
                    row: r,
                    column,
                    rowspan,
                    colspan,
                });
                column += colspan;
            }
        }

        let columns = slots.iter().map(Vec::len).max().unwrap_or(0);
        for line in &mut slots {
            line.resize(columns, Slot::Empty);
        }
        Self {
            rows: rows.len(),
            columns,
            slots,
            cells,
        }
    }

    /// Rows become columns.
    pub(crate) fn transposed(&self) -> Self {
        let mut slots = vec![vec![Slot::Empty; self.rows]; self.columns];
        for (r, line) in self.slots.iter().enumerate() {
            for (c, slot) in line.iter().enumerate() {
                slots[c][r] = match *slot {
                    Slot::Spanned {
                        origin,
                        is_spanned_x,
                        is_spanned_y,
                    } => Slot::Spanned {
                        origin,
                        is_spanned_x: is_spanned_y,
                        is_spanned_y: is_spanned_x,
                    },
                    other => other,
                };
            }
        }
        let cells = self
            .cells
            .iter()
            .map(|cell| GridCell {
                id: cell.id,
                row: cell.column,
                column: cell.row,
                rowspan: cell.colspan,
                colspan: cell.rowspan,
            })
            .collect();
        Self {
            rows: self.columns,
            columns: self.rows,
            slots,
            cells,
        }
    }
}

/// Size bounds of one column (or row).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Track {
    pub min: f32,
    pub max: f32,
    pub fixed: bool,
}

/// What one cell asks of the tracks it spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SpanRequirement {
    pub start: usize,
    pub span: usize,
    pub min: f32,
    pub max: f32,
    pub fixed: Option<f32>,
}

/// One requirement per cell along the grid's columns. Pass a
/// [`CellGrid::transposed`] grid to get row requirements.
fn requirements(
    grid: &CellGrid,
    mut size_of: impl FnMut(&GridCell) -> (f32, f32, Option<f32>),
) -> Vec<SpanRequirement> {
    grid.cells
        .iter()
        .map(|cell| {
            let (min, max, fixed) = size_of(cell);
            SpanRequirement {
                start: cell.column,
                span: cell.colspan,
                min,
                max,
                fixed,
            }
        })
        .collect()
}

/// [§ 17.5.2.2 Automatic table layout](https://www.w3.org/TR/CSS2/tables.html#auto-table-layout)
///
/// STEP 1: "Calculate the minimum content width (MCW) of each cell ... For
/// each column, determine a maximum and minimum column width from the cells
/// that span only that column."
///
/// STEP 2: "For each cell that spans more than one column, increase the
/// minimum widths of the columns it spans so that together, they are at
/// least as wide as the cell." Shortfalls go evenly to the spanned tracks
/// that are not fixed, or to all of them if every one is. Narrower spans
/// are resolved first.
pub(crate) fn size_tracks(count: usize, reqs: &[SpanRequirement], spacing: f32) -> Vec<Track> {
    let mut tracks = vec![Track::default(); count];
    let mut fixed: Vec<Option<f32>> = vec![None; count];

    for req in reqs.iter().filter(|r| r.span == 1) {
        let Some(track) = tracks.get_mut(req.start) else {
            continue;
        };
        track.min = track.min.max(req.min);
        track.max = track.max.max(req.max);
        if let Some(width) = req.fixed {
            fixed[req.start] = Some(fixed[req.start].map_or(width, |w| w.max(width)));
        }
    }
    for (track, width) in tracks.iter_mut().zip(&fixed) {
        if let Some(width) = *width {
            track.fixed = true;
            track.min = track.min.max(width);
            track.max = track.min;
        }
    }

    let mut spanning: Vec<&SpanRequirement> = reqs.iter().filter(|r| r.span > 1).collect();
    spanning.sort_by_key(|r| r.span);
    for req in spanning {
        let range = req.start..(req.start + req.span).min(count);
        if range.is_empty() {
            continue;
        }
        let gaps = spacing * (range.len() - 1) as f32;
        let flexible: Vec<usize> = range.clone().filter(|&i| !tracks[i].fixed).collect();
        let targets: Vec<usize> = if flexible.is_empty() {
            range.clone().collect()
        } else {
            flexible
        };
        let share = |total: f32, current: f32| (total - current) / targets.len() as f32;

        let sum_min: f32 = tracks[range.clone()].iter().map(|t| t.min).sum::<f32>() + gaps;
        if req.min > sum_min {
            let extra = share(req.min, sum_min);
            for &i in &targets {
                tracks[i].min += extra;
            }
        }
        let sum_max: f32 = tracks[range].iter().map(|t| t.max).sum::<f32>() + gaps;
        if req.max > sum_max {
            let extra = share(req.max, sum_max);
            for &i in &targets {
                tracks[i].max += extra;
            }
        }
    }

    for track in &mut tracks {
        track.max = track.max.max(track.min);
    }
    tracks
}

/// Grow tracks from their minimums to fill `target`. Extra space goes
/// evenly to tracks that are not fixed, or to all if every track is.
pub(crate) fn distribute(tracks: &[Track], target: f32) -> Vec<f32> {
    let mut sizes: Vec<f32> = tracks.iter().map(|t| t.min).collect();
    let extra = target - sizes.iter().sum::<f32>();
    if extra <= 0.0 || tracks.is_empty() {
        return sizes;
    }
    let flexible: Vec<usize> = (0..tracks.len()).filter(|&i| !tracks[i].fixed).collect();
    let targets: Vec<usize> = if flexible.is_empty() {
        (0..tracks.len()).collect()
    } else {
        flexible
    };
    let share = extra / targets.len() as f32;
    for i in targets {
        sizes[i] += share;
    }
    sizes
}

/// Total spacing around `count` tracks: one gap before each and one after
/// the last.
fn outer_spacing(count: usize, spacing: f32) -> f32 {
    if count == 0 {
        0.0
    } else {
        spacing * (count + 1) as f32
    }
}

/// Sum of `sizes[range]` plus the spacing between them.
fn span_size(sizes: &[f32], range: Range<usize>, spacing: f32) -> f32 {
    let gaps = spacing * range.len().saturating_sub(1) as f32;
    sizes[range].iter().sum::<f32>() + gaps
}

/// Offsets of each track's start, beginning one spacing past `origin`.
fn track_offsets(sizes: &[f32], origin: f32, spacing: f32) -> Vec<f32> {
    let mut offset = origin + spacing;
    sizes
        .iter()
        .map(|size| {
            let start = offset;
            offset += size + spacing;
            start
        })
        .collect()
}

/// [§ 17.5.3 Table height algorithms](https://www.w3.org/TR/CSS2/tables.html#height-layout)
///
/// "The 'vertical-align' property of each table cell determines its
/// alignment within the row." Baseline alignment is approximated by top.
fn alignment_factor(align: VerticalAlign) -> f32 {
    match align {
        VerticalAlign::Middle => 0.5,
        VerticalAlign::Bottom => 1.0,
        VerticalAlign::Baseline
        | VerticalAlign::Top
        | VerticalAlign::Sub
        | VerticalAlign::Super
        | VerticalAlign::TextTop
        | VerticalAlign::TextBottom => 0.0,
    }
}

/// Lay out the table `table` with its margin box at `origin`.
pub(crate) fn layout_table(
    session: &mut LayoutSession,
    tree: &mut BoxTree,
    table: BoxId,
    cb: &ContainingBlock,
    (x, y): (f32, f32),
    width_override: Option<f32>,
) {
    let style = Arc::clone(&tree[table].style);
    let edges = resolve_edges(&tree[table], cb.percent_width);
    let mut dims = edges.dims;
    let (spacing_x, spacing_y) = style.border_spacing();
    let context = session.next_context_id();
    tree[table].establishes = Some(context);

    // STEP 1: Structure.
    let mut captions = Vec::new();
    let mut groups = Vec::new();
    let mut rows = Vec::new();
    for child in tree[table].children.clone() {
        tree[child].context = Some(context);
        match tree[child].display.inner {
            InnerDisplayType::TableCaption => captions.push(child),
            InnerDisplayType::TableRowGroup => {
                groups.push(child);
                rows.extend(tree[child].children.iter().copied());
            }
            InnerDisplayType::TableRow => rows.push(child),
            _ => {}
        }
    }
    let grid = CellGrid::build(tree, &rows);
    for cell in &grid.cells {
        tree[cell.id].context = Some(context);
    }

    let place_content = |dims: &mut BoxDimensions, width: f32| {
        dims.content = Rect::new(
            x + dims.margin.left + dims.border.left + dims.padding.left,
            y + dims.margin.top + dims.border.top + dims.padding.top,
            width,
            0.0,
        );
    };

    // "a table with zero rows or zero columns" has no size. Its captions
    // collapse onto its origin with it.
    if grid.rows == 0 || grid.columns == 0 {
        place_content(&mut dims, 0.0);
        tree[table].dimensions = dims;
        let origin = Rect::new(dims.content.x, dims.content.y, 0.0, 0.0);
        for &caption in &captions {
            for id in tree.preorder(caption) {
                tree[id].dimensions = BoxDimensions {
                    content: origin,
                    ..BoxDimensions::default()
                };
            }
        }
        return;
    }

    // STEP 2: Column widths.
    // An override is the space on offer, not a specified width.
    let available =
        width_override.unwrap_or_else(|| (cb.rect.width - edges.outer_horizontal()).max(0.0));
    let specified_width = style.width().and_then(|w| w.resolve(cb.percent_width));
    let cell_cb = ContainingBlock {
        rect: Rect::new(0.0, 0.0, available, 0.0),
        percent_width: specified_width,
        percent_height: None,
    };
    let view: &BoxTree = tree;
    let column_reqs = requirements(&grid, |cell| {
        let node = &view[cell.id];
        let inner = resolve_edges(node, None).inner_horizontal();
        let fixed = node
            .style
            .width()
            .and_then(|w| w.resolve(None))
            .map(|w| w + inner);
        let widths = session.preferred_widths(view, cell.id, &cell_cb);
        let min = widths.min + inner;
        let max = widths.max + inner;
        match fixed {
            Some(width) => (width.max(min), width.max(min), Some(width)),
            None => (min, max, None),
        }
    });
    let column_tracks = size_tracks(grid.columns, &column_reqs, spacing_x);
    let column_spacing = outer_spacing(grid.columns, spacing_x);
    let sum_min = column_tracks.iter().map(|t| t.min).sum::<f32>() + column_spacing;
    let sum_max = column_tracks.iter().map(|t| t.max).sum::<f32>() + column_spacing;
    let width = specified_width.map_or_else(
        || available.min(sum_max).max(sum_min),
        |w| w.max(sum_min),
    );
    let column_widths = distribute(&column_tracks, width - column_spacing);

    if edges.auto_left && edges.auto_right && specified_width.is_some() {
        let free = cb.rect.width - width - edges.inner_horizontal();
        if free > 0.0 {
            dims.margin.left = free / 2.0;
            dims.margin.right = free / 2.0;
        }
    }
    place_content(&mut dims, width);

    // STEP 3: Captions, above the grid at the table's width.
    // "the caption boxes ... are formatted as if they were block boxes"
    let mut cursor = dims.content.y;
    for &caption in &captions {
        let caption_cb = ContainingBlock {
            rect: Rect::new(dims.content.x, cursor, width, 0.0),
            percent_width: Some(width),
            percent_height: None,
        };
        session.layout_block_level(tree, caption, &caption_cb, dims.content.x, cursor, None);
        cursor = tree[caption].dimensions.margin_box().bottom();
    }
    let grid_top = cursor;

    // STEP 4: Cells at their column widths; row heights from the results.
    let mut cell_heights = HashMap::new();
    for cell in &grid.cells {
        let border_width = span_size(&column_widths, cell.columns(), spacing_x);
        let inner = resolve_edges(&tree[cell.id], None).inner_horizontal();
        let content_width = (border_width - inner).max(0.0);
        let cb = ContainingBlock {
            rect: Rect::new(0.0, 0.0, border_width, 0.0),
            percent_width: Some(content_width),
            percent_height: None,
        };
        session.layout_block_level(tree, cell.id, &cb, 0.0, 0.0, Some(content_width));
        let _ = cell_heights.insert(cell.id, tree[cell.id].border_box().height);
    }
    let mut row_reqs = requirements(&grid.transposed(), |cell| {
        let height = cell_heights.get(&cell.id).copied().unwrap_or(0.0);
        (height, height, None)
    });
    for (r, &row) in rows.iter().enumerate() {
        if let Some(height) = tree[row].style.height().and_then(|h| h.resolve(None)) {
            row_reqs.push(SpanRequirement {
                start: r,
                span: 1,
                min: height,
                max: height,
                fixed: Some(height),
            });
        }
    }
    let row_tracks = size_tracks(grid.rows, &row_reqs, spacing_y);
    let row_spacing = outer_spacing(grid.rows, spacing_y);
    let rows_min = row_tracks.iter().map(|t| t.min).sum::<f32>() + row_spacing;
    let grid_height = style
        .height()
        .and_then(|h| h.resolve(cb.percent_height))
        .map_or(rows_min, |h| (h - (grid_top - dims.content.y)).max(rows_min));
    let row_heights = distribute(&row_tracks, grid_height - row_spacing);

    // STEP 5: Position rows, row groups and cells.
    let column_x = track_offsets(&column_widths, dims.content.x, spacing_x);
    let row_y = track_offsets(&row_heights, grid_top, spacing_y);
    for (r, &row) in rows.iter().enumerate() {
        tree[row].context = Some(context);
        tree[row].dimensions = BoxDimensions {
            content: Rect::new(
                dims.content.x + spacing_x,
                row_y[r],
                (width - 2.0 * spacing_x).max(0.0),
                row_heights[r],
            ),
            ..BoxDimensions::default()
        };
    }
    for &group in &groups {
        let content = tree[group]
            .children
            .iter()
            .map(|&row| tree[row].dimensions.content)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| Rect::new(dims.content.x, grid_top, width, 0.0));
        tree[group].dimensions = BoxDimensions {
            content,
            ..BoxDimensions::default()
        };
    }
    for cell in &grid.cells {
        let target = Rect::new(
            column_x[cell.column],
            row_y[cell.row],
            span_size(&column_widths, cell.columns(), spacing_x),
            span_size(&row_heights, cell.rows(), spacing_y),
        );
        align_cell(tree, cell.id, target);
    }

    dims.content.height = (grid_top - dims.content.y) + grid_height;
    tree[table].dimensions = dims;

    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[TABLE] {:?} columns {:?} rows {:?}",
        table,
        column_widths,
        row_heights
    );
}

/// Move a laid-out cell so its border box is `target`, stretch it to the
/// row height, and offset its content by `vertical-align`.
fn align_cell(tree: &mut BoxTree, cell: BoxId, target: Rect) {
    let border_box = tree[cell].border_box();
    tree.shift_subtree(cell, target.x - border_box.x, target.y - border_box.y);

    let dims = tree[cell].dimensions;
    let used = dims.content.height;
    let stretched = (target.height - dims.padding.vertical() - dims.border.vertical()).max(used);
    let offset = (stretched - used) * alignment_factor(tree[cell].style.vertical_align());
    for child in tree[cell].children.clone() {
        tree.shift_subtree(child, 0.0, offset);
    }
    tree[cell].dimensions.content.height = stretched;
}

#[cfg(test)]
mod tests {
    use koala_css::{ComputedStyle, DisplayValue};
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::box_tree::{BoxContent, BoxNode};

    fn node(display: DisplayValue) -> BoxNode {
        BoxNode::new(display, Arc::new(ComputedStyle::initial()), BoxContent::Children)
    }

    fn req(start: usize, span: usize, min: f32) -> SpanRequirement {
        SpanRequirement {
            start,
            span,
            min,
            max: min,
            fixed: None,
        }
    }

    #[test]
    fn test_grid_with_spans() {
        // | a (colspan 2) | b |
        // | c (rowspan 2) | d | e |
        // |               | f |
        let mut tree = BoxTree::new();
        let rows: Vec<BoxId> = (0..3).map(|_| tree.alloc(node(DisplayValue::table_row()))).collect();
        let cell = |tree: &mut BoxTree, row: BoxId, colspan: usize, rowspan: usize| {
            let mut n = node(DisplayValue::table_cell());
            n.colspan = colspan;
            n.rowspan = rowspan;
            let id = tree.alloc(n);
            tree.append_child(row, id);
            id
        };
        let a = cell(&mut tree, rows[0], 2, 1);
        let b = cell(&mut tree, rows[0], 1, 1);
        let c = cell(&mut tree, rows[1], 1, 2);
        let _d = cell(&mut tree, rows[1], 1, 1);
        let _e = cell(&mut tree, rows[1], 1, 1);
        let f = cell(&mut tree, rows[2], 1, 1);

        let grid = CellGrid::build(&tree, &rows);
        assert_eq!((grid.rows, grid.columns), (3, 3));
        assert_eq!(grid.slots[0][0], Slot::Cell(a));
        assert_eq!(
            grid.slots[0][1],
            Slot::Spanned {
                origin: a,
                is_spanned_x: true,
                is_spanned_y: false
            }
        );
        assert_eq!(grid.slots[0][2], Slot::Cell(b));
        assert_eq!(
            grid.slots[2][0],
            Slot::Spanned {
                origin: c,
                is_spanned_x: false,
                is_spanned_y: true
            }
        );
        assert_eq!(grid.slots[2][1], Slot::Cell(f));
        assert_eq!(grid.slots[2][2], Slot::Empty);

        let transposed = grid.transposed();
        assert_eq!((transposed.rows, transposed.columns), (3, 3));
        assert_eq!(
            transposed.slots[1][0],
            Slot::Spanned {
                origin: a,
                is_spanned_x: false,
                is_spanned_y: true
            }
        );
        assert_eq!(transposed.transposed(), grid);
    }

    #[test]
    fn test_spanning_shortfall_is_split_evenly() {
        let tracks = size_tracks(2, &[req(0, 1, 10.0), req(1, 1, 10.0), req(0, 2, 56.0)], 0.0);
        assert_eq!(tracks[0].min, 28.0);
        assert_eq!(tracks[1].min, 28.0);
    }

    #[test]
    fn test_spanning_shortfall_skips_fixed_tracks() {
        let fixed = SpanRequirement {
            fixed: Some(20.0),
            ..req(0, 1, 5.0)
        };
        let tracks = size_tracks(2, &[fixed, req(1, 1, 10.0), req(0, 2, 60.0)], 2.0);
        assert!(tracks[0].fixed);
        assert_eq!(tracks[0].min, 20.0);
        // 60 - (20 + 10 + 2) = 28 goes to the flexible column only.
        assert_eq!(tracks[1].min, 38.0);
    }

    #[test]
    fn test_distribute_extra_to_flexible_tracks() {
        let tracks = [
            Track {
                min: 10.0,
                max: 10.0,
                fixed: true,
            },
            Track {
                min: 10.0,
                max: 40.0,
                fixed: false,
            },
            Track {
                min: 20.0,
                max: 20.0,
                fixed: false,
            },
        ];
        assert_eq!(distribute(&tracks, 60.0), [10.0, 20.0, 30.0]);
        assert_eq!(distribute(&tracks, 10.0), [10.0, 10.0, 20.0]);
    }

    /// Every cell fits the tracks it spans, and distributing never shrinks
    /// a track below its minimum.
    #[quickcheck]
    fn prop_tracks_cover_every_span(cells: Vec<(u8, u8, u8)>, spacing: u8, extra: u8) -> bool {
        const COLUMNS: usize = 6;
        let spacing = f32::from(spacing % 5);
        let reqs: Vec<_> = cells
            .iter()
            .take(20)
            .map(|&(start, span, min)| {
                let start = usize::from(start) % COLUMNS;
                let span = (usize::from(span) % (COLUMNS - start)) + 1;
                req(start, span, f32::from(min))
            })
            .collect();
        let tracks = size_tracks(COLUMNS, &reqs, spacing);
        let covered = reqs.iter().all(|r| {
            let range = r.start..r.start + r.span;
            let mins: Vec<f32> = tracks.iter().map(|t| t.min).collect();
            span_size(&mins, range, spacing) + 0.01 >= r.min
        });
        let sum_min: f32 = tracks.iter().map(|t| t.min).sum();
        let sizes = distribute(&tracks, sum_min + f32::from(extra));
        let grown = sizes.iter().zip(&tracks).all(|(size, t)| *size >= t.min);
        covered && grown && sizes.iter().sum::<f32>() + 0.01 >= sum_min
    }

    #[test]
    fn test_track_offsets() {
        assert_eq!(track_offsets(&[10.0, 20.0], 100.0, 2.0), [102.0, 114.0]);
        assert_eq!(span_size(&[10.0, 20.0, 5.0], 0..2, 2.0), 32.0);
        assert_eq!(outer_spacing(2, 2.0), 6.0);
        assert_eq!(outer_spacing(0, 2.0), 0.0);
    }

    #[test]
    fn test_alignment_factor() {
        assert_eq!(alignment_factor(VerticalAlign::Middle), 0.5);
        assert_eq!(alignment_factor(VerticalAlign::Bottom), 1.0);
        // Only middle and bottom move cell content off the top edge.
        for align in [
            VerticalAlign::Baseline,
            VerticalAlign::Top,
            VerticalAlign::Sub,
            VerticalAlign::Super,
            VerticalAlign::TextTop,
            VerticalAlign::TextBottom,
        ] {
            assert_eq!(alignment_factor(align), 0.0, "{align:?}");
        }
    }
}
