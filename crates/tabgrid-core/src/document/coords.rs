//! Grid coordinates for table cells.
//!
//! Every cell gets `data-row`/`data-col` attributes naming the top-left
//! grid slot it occupies, with row and column spans blocking the slots
//! they cover, so the coordinates reproduce the rendered layout. The
//! numeric view of a table is rebuilt from those attributes before each
//! calculation pass.
//!
//! All walkers here treat a nested table as opaque: its rows and cells
//! belong to the inner table only, which is addressed as a table of its
//! own.

use std::sync::OnceLock;

use regex::Regex;

use crate::markup::{Element, Node, for_each_element};
use tabgrid_engine::{CellAddr, Grid};

/// Rendering engines cap spans; mirror that so a stray attribute cannot
/// blow up the occupancy matrix.
const MAX_ROWSPAN: usize = 65_534;
const MAX_COLSPAN: usize = 1_000;

fn number_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?")
            .expect("number prefix regex must compile")
    })
}

pub(crate) fn attr_usize(el: &Element, name: &str) -> Option<usize> {
    el.attr(name)?.trim().parse::<usize>().ok()
}

fn span_attr(cell: &Element, name: &str, max: usize) -> usize {
    cell.attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .map(|span| span.clamp(1, max))
        .unwrap_or(1)
}

/// Effective (rowspan, colspan) of a cell, both at least 1.
pub(crate) fn cell_spans(cell: &Element) -> (usize, usize) {
    (
        span_attr(cell, "rowspan", MAX_ROWSPAN),
        span_attr(cell, "colspan", MAX_COLSPAN),
    )
}

/// Parses the number a cell's text starts with, the lenient way a
/// spreadsheet import would: `"12 pts"` is 12, `"abc"` is nothing.
pub(crate) fn leading_number(text: &str) -> Option<f64> {
    let matched = number_prefix_re().find(text)?;
    matched.as_str().parse::<f64>().ok()
}

/// Visits every table in the forest in document order, outer tables
/// before the tables nested inside them.
pub(crate) fn for_each_table_mut(nodes: &mut [Node], f: &mut impl FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.is_tag("table") {
                f(el);
            }
            for_each_table_mut(&mut el.children, f);
        }
    }
}

pub(crate) fn table_count(nodes: &[Node]) -> usize {
    let mut count = 0;
    for_each_element(nodes, &mut |el| {
        if el.is_tag("table") {
            count += 1;
        }
    });
    count
}

pub(crate) fn table_mut(nodes: &mut [Node], index: usize) -> Option<&mut Element> {
    fn walk<'a>(nodes: &'a mut [Node], remaining: &mut usize) -> Option<&'a mut Element> {
        for node in nodes {
            if let Node::Element(el) = node {
                if el.is_tag("table") {
                    if *remaining == 0 {
                        return Some(el);
                    }
                    *remaining -= 1;
                }
                if let Some(found) = walk(&mut el.children, remaining) {
                    return Some(found);
                }
            }
        }
        None
    }
    let mut remaining = index;
    walk(nodes, &mut remaining)
}

pub(crate) fn table_ref(nodes: &[Node], index: usize) -> Option<&Element> {
    fn walk<'a>(nodes: &'a [Node], remaining: &mut usize) -> Option<&'a Element> {
        for node in nodes {
            if let Node::Element(el) = node {
                if el.is_tag("table") {
                    if *remaining == 0 {
                        return Some(el);
                    }
                    *remaining -= 1;
                }
                if let Some(found) = walk(&el.children, remaining) {
                    return Some(found);
                }
            }
        }
        None
    }
    let mut remaining = index;
    walk(nodes, &mut remaining)
}

/// Visits the table's rows in document order, head and body sections
/// included, without crossing into nested tables.
pub(crate) fn for_each_row_mut(table: &mut Element, f: &mut impl FnMut(&mut Element)) {
    fn walk(nodes: &mut [Node], f: &mut impl FnMut(&mut Element)) {
        for node in nodes {
            if let Node::Element(el) = node {
                if el.is_tag("table") {
                    continue;
                }
                if el.is_tag("tr") {
                    f(el);
                    continue;
                }
                walk(&mut el.children, f);
            }
        }
    }
    walk(&mut table.children, f);
}

/// Visits the direct cells of one row.
pub(crate) fn for_each_cell_of_row_mut(row: &mut Element, f: &mut impl FnMut(&mut Element)) {
    for node in &mut row.children {
        if let Node::Element(el) = node {
            if el.is_tag("td") || el.is_tag("th") {
                f(el);
            }
        }
    }
}

/// Visits the table's data cells in document order. Header cells are
/// included only when asked for; nested tables are skipped.
pub(crate) fn for_each_cell_mut(
    table: &mut Element,
    include_headers: bool,
    f: &mut impl FnMut(&mut Element),
) {
    fn walk(nodes: &mut [Node], include_headers: bool, f: &mut impl FnMut(&mut Element)) {
        for node in nodes {
            if let Node::Element(el) = node {
                if el.is_tag("table") {
                    continue;
                }
                if el.is_tag("td") || el.is_tag("th") {
                    if el.is_tag("td") || include_headers {
                        f(el);
                    }
                    continue;
                }
                walk(&mut el.children, include_headers, f);
            }
        }
    }
    walk(&mut table.children, include_headers, f);
}

/// Read-only variant of [`for_each_cell_mut`].
pub(crate) fn for_each_cell(table: &Element, include_headers: bool, f: &mut impl FnMut(&Element)) {
    fn walk(nodes: &[Node], include_headers: bool, f: &mut impl FnMut(&Element)) {
        for node in nodes {
            if let Node::Element(el) = node {
                if el.is_tag("table") {
                    continue;
                }
                if el.is_tag("td") || el.is_tag("th") {
                    if el.is_tag("td") || include_headers {
                        f(el);
                    }
                    continue;
                }
                walk(&el.children, include_headers, f);
            }
        }
    }
    walk(&table.children, include_headers, f);
}

/// The data cell at the given start coordinates, if any.
pub(crate) fn find_cell_mut(nodes: &mut [Node], row: usize, col: usize) -> Option<&mut Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.is_tag("table") {
                continue;
            }
            if el.is_tag("td") {
                if attr_usize(el, "data-row") == Some(row) && attr_usize(el, "data-col") == Some(col)
                {
                    return Some(el);
                }
                continue;
            }
            if let Some(found) = find_cell_mut(&mut el.children, row, col) {
                return Some(found);
            }
        }
    }
    None
}

/// The row element holding the cell at the given start coordinates.
pub(crate) fn row_of_cell_mut(table: &mut Element, row: usize, col: usize) -> Option<&mut Element> {
    fn walk<'a>(nodes: &'a mut [Node], row: usize, col: usize) -> Option<&'a mut Element> {
        for node in nodes {
            if let Node::Element(el) = node {
                if el.is_tag("table") {
                    continue;
                }
                if el.is_tag("tr") {
                    let holds = el.children.iter().any(|child| {
                        matches!(child, Node::Element(cell)
                            if (cell.is_tag("td") || cell.is_tag("th"))
                                && attr_usize(cell, "data-row") == Some(row)
                                && attr_usize(cell, "data-col") == Some(col))
                    });
                    if holds {
                        return Some(el);
                    }
                    continue;
                }
                if let Some(found) = walk(&mut el.children, row, col) {
                    return Some(found);
                }
            }
        }
        None
    }
    walk(&mut table.children, row, col)
}

/// The n-th `<col>` of the table's first `<colgroup>`, counted the way
/// column coordinates are.
pub(crate) fn colgroup_col_mut(table: &mut Element, index: usize) -> Option<&mut Element> {
    fn walk<'a>(nodes: &'a mut [Node], remaining: &mut usize) -> Option<&'a mut Element> {
        for node in nodes {
            if let Node::Element(el) = node {
                if el.is_tag("col") {
                    if *remaining == 0 {
                        return Some(el);
                    }
                    *remaining -= 1;
                    continue;
                }
                if let Some(found) = walk(&mut el.children, remaining) {
                    return Some(found);
                }
            }
        }
        None
    }
    let colgroup = table.find_descendant_mut("colgroup")?;
    let mut remaining = index;
    walk(&mut colgroup.children, &mut remaining)
}

/// Assigns `data-row`/`data-col` start coordinates to every cell of the
/// table, walking an occupancy matrix so that row and column spans push
/// later cells to the next free slot, exactly as the rendered layout
/// does.
pub(crate) fn assign_coordinates(table: &mut Element) {
    let mut matrix: Vec<Vec<bool>> = Vec::new();
    let mut row_index = 0usize;
    for_each_row_mut(table, &mut |row| {
        if matrix.len() <= row_index {
            matrix.resize(row_index + 1, Vec::new());
        }
        let mut col = 0usize;
        for_each_cell_of_row_mut(row, &mut |cell| {
            while matrix[row_index].get(col).copied().unwrap_or(false) {
                col += 1;
            }
            cell.set_attr("data-row", &row_index.to_string());
            cell.set_attr("data-col", &col.to_string());
            let rowspan = span_attr(cell, "rowspan", MAX_ROWSPAN);
            let colspan = span_attr(cell, "colspan", MAX_COLSPAN);
            for r in 0..rowspan {
                if matrix.len() <= row_index + r {
                    matrix.resize(row_index + r + 1, Vec::new());
                }
                let slots = &mut matrix[row_index + r];
                if slots.len() <= col + colspan - 1 {
                    slots.resize(col + colspan, false);
                }
                for slot in slots.iter_mut().skip(col).take(colspan) {
                    *slot = true;
                }
            }
            col += colspan;
        });
        row_index += 1;
    });
}

/// Builds the numeric grid for one table from its data cells, stamping
/// each cell with its `data-addr` name on the way. Cell text is read
/// with thousands separators stripped; anything that does not start
/// with a number counts as zero.
pub(crate) fn build_grid(table: &mut Element) -> Grid {
    let mut grid = Grid::new();
    for_each_cell_mut(table, false, &mut |td| {
        let (Some(row), Some(col)) = (attr_usize(td, "data-row"), attr_usize(td, "data-col"))
        else {
            return;
        };
        let addr = CellAddr::new(col, row);
        let text = td.inner_text().replace(',', "");
        let text = text.trim();
        let value = if text.is_empty() {
            0.0
        } else {
            leading_number(text).unwrap_or(0.0)
        };
        grid.set(addr, value);
        td.set_attr("data-addr", &addr.to_string());
    });
    grid
}
