//! Recalculation sweeps and tooltip annotation.

use std::collections::HashMap;

use crate::document::coords::{
    assign_coordinates, attr_usize, build_grid, for_each_cell_mut, for_each_cell_of_row_mut,
    for_each_row_mut, for_each_table_mut,
};
use crate::markup::{Element, Node};
use tabgrid_engine::{CellAddr, evaluate_formula, format_display};

/// Attribute naming a cell's formula. Set by authoring tooling; the
/// editor only reads it.
pub(crate) const FORMULA_ATTR: &str = "data-dze-formula";

/// Attribute opting a formula cell into thousands grouping.
pub(crate) const SEPARATOR_ATTR: &str = "dze_format_separator";

/// Replaces a cell's visible text, writing through to the cell's first
/// paragraph when it has one so surrounding markup survives.
pub(crate) fn write_cell_text(cell: &mut Element, text: &str) {
    match cell.find_descendant_mut("p") {
        Some(p) => p.set_text(text),
        None => cell.set_text(text),
    }
}

/// One evaluation sweep over a table: rebuild the numeric grid from the
/// current display text, then evaluate each formula cell in document
/// order. Results are written back into the sweep's grid immediately,
/// so cells later in the order already see them. A formula that fails
/// to evaluate leaves its cell untouched.
pub(crate) fn run_calculation_pass(table: &mut Element) {
    let mut grid = build_grid(table);
    for_each_cell_mut(table, true, &mut |cell| {
        let Some(formula) = cell.attr(FORMULA_ATTR).map(str::to_string) else {
            return;
        };
        let Ok(value) = evaluate_formula(&formula, &grid) else {
            return;
        };
        let thousands = cell.attr(SEPARATOR_ATTR) == Some(",");
        write_cell_text(cell, &format_display(value, thousands));
        if let Some(addr) = cell.attr("data-addr").and_then(CellAddr::from_str) {
            grid.set(addr, value);
        }
    });
}

/// Full recalculation: two sweeps over every table, then tooltips. The
/// second sweep lets a formula that reads another formula cell pick up
/// the value the first sweep produced; deeper chains stay one sweep
/// behind.
pub(crate) fn calculate_all(nodes: &mut [Node]) {
    for_each_table_mut(nodes, &mut run_calculation_pass);
    for_each_table_mut(nodes, &mut run_calculation_pass);
    for_each_table_mut(nodes, &mut refresh_tooltips);
}

/// Reassigns coordinates and tooltips without recalculating, as after a
/// snapshot restore.
pub(crate) fn annotate(nodes: &mut [Node]) {
    for_each_table_mut(nodes, &mut assign_coordinates);
    for_each_table_mut(nodes, &mut refresh_tooltips);
}

/// Rebuilds the hover text of every data cell below the header row:
/// the column's header label, a preserved title, and the formula text,
/// one line each. Cells with none of these lose any tooltip they had.
pub(crate) fn refresh_tooltips(table: &mut Element) {
    let mut headers: HashMap<usize, String> = HashMap::new();
    let mut first = true;
    for_each_row_mut(table, &mut |row| {
        if !first {
            return;
        }
        first = false;
        for_each_cell_of_row_mut(row, &mut |cell| {
            if let Some(col) = attr_usize(cell, "data-col") {
                headers.insert(col, cell.inner_text().trim().to_string());
            }
        });
    });

    for_each_cell_mut(table, false, &mut |td| {
        if attr_usize(td, "data-row") == Some(0) {
            return;
        }
        let header = attr_usize(td, "data-col")
            .and_then(|col| headers.get(&col))
            .filter(|text| !text.is_empty())
            .cloned();
        let title = td
            .attr("data-org-title")
            .filter(|text| !text.is_empty())
            .or_else(|| td.attr("title").filter(|text| !text.is_empty()))
            .map(str::to_string);
        let formula = td
            .attr(FORMULA_ATTR)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        let mut lines = Vec::new();
        if let Some(header) = header {
            lines.push(format!("[{header}]"));
        }
        if let Some(title) = title {
            lines.push(format!("Title: {title}"));
        }
        if let Some(formula) = formula {
            lines.push(format!("\u{1d453}\u{1d465}  {formula}"));
        }

        if lines.is_empty() {
            td.remove_attr("data-tooltip");
        } else {
            td.set_attr("data-tooltip", &lines.join("\n"));
            // The original title moves aside so the tooltip owns the
            // hover slot; the clean export puts it back.
            if let Some(original) = td.attr("title").map(str::to_string) {
                td.set_attr("data-org-title", &original);
                td.remove_attr("title");
            }
        }
    });
}
