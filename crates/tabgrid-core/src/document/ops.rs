//! Session operations: loading, pointer interaction, editing, deletion
//! and the undo/redo surface.

use crate::document::coords::{
    assign_coordinates, attr_usize, cell_spans, colgroup_col_mut, find_cell_mut, for_each_cell,
    for_each_cell_mut, for_each_table_mut, row_of_cell_mut, table_mut, table_ref,
};
use crate::document::recalc::{FORMULA_ATTR, annotate, calculate_all, write_cell_text};
use crate::document::state::{CellLoc, PointerState, PointerTarget, ResizeCapture, Session};
use crate::error::{Result, TabgridError};
use crate::markup::{clean_html, for_each_element_mut, parse_fragment, write_nodes};

impl Session {
    /// Replaces the session's document with a freshly parsed fragment,
    /// assigns coordinates, recalculates, and restarts history with the
    /// computed state as its baseline. A blank source clears the
    /// document.
    pub fn load(&mut self, source: &str) -> Result<()> {
        let roots = if source.trim().is_empty() {
            Vec::new()
        } else {
            parse_fragment(source)?
        };
        self.state = PointerState::Idle;
        self.roots = roots;
        for_each_table_mut(&mut self.roots, &mut assign_coordinates);
        calculate_all(&mut self.roots);
        self.history.reset();
        self.record_snapshot();
        Ok(())
    }

    /// A pointer press on a cell. Within the edge threshold of the
    /// cell's right or bottom border this starts a column or row
    /// resize, the right border winning in the corner; anywhere else it
    /// clears the selection and anchors a new one. An edit in progress
    /// on another cell is committed first.
    pub fn pointer_press(&mut self, target: PointerTarget, x: f64, y: f64) -> Result<()> {
        if let PointerState::Editing { cell } = self.state {
            if cell == target.loc {
                return Ok(());
            }
            self.commit_edit();
        }

        let (percent_width, percent_height) = {
            let cell = self.cell_mut(target.loc)?;
            (
                cell.style_property("width").is_some_and(|w| w.contains('%')),
                cell.style_property("height").is_some_and(|h| h.contains('%')),
            )
        };

        if (target.cell.right() - x).abs() <= self.options.edge_threshold {
            self.state = PointerState::ResizingColumn(ResizeCapture {
                loc: target.loc,
                start_pos: x,
                start_size: target.cell.width,
                percent: percent_width,
                parent_size: target.table.width,
            });
            return Ok(());
        }
        if (target.cell.bottom() - y).abs() <= self.options.edge_threshold {
            self.state = PointerState::ResizingRow(ResizeCapture {
                loc: target.loc,
                start_pos: y,
                start_size: target.cell.height,
                percent: percent_height,
                parent_size: target.table.height,
            });
            return Ok(());
        }

        self.clear_selection();
        self.cell_mut(target.loc)?.add_class("selected-cell");
        self.state = PointerState::RangeSelecting { anchor: target.loc };
        Ok(())
    }

    /// Pointer movement with the button held. During a resize this
    /// applies the new size to the document immediately.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        match self.state {
            PointerState::ResizingColumn(capture) => self.apply_resize(capture, x, true),
            PointerState::ResizingRow(capture) => self.apply_resize(capture, y, false),
            _ => {}
        }
    }

    /// The pointer entering a cell while a range selection is active
    /// re-marks the rectangle spanned by the anchor and that cell.
    /// Cells of other tables are ignored.
    pub fn pointer_over(&mut self, loc: CellLoc) {
        let PointerState::RangeSelecting { anchor } = self.state else {
            return;
        };
        if loc.table != anchor.table {
            return;
        }
        self.select_range(anchor, loc);
    }

    /// Pointer release. Ends a resize with one history snapshot; ends a
    /// range selection leaving its markers in place.
    pub fn pointer_release(&mut self) {
        match self.state {
            PointerState::ResizingColumn(_) | PointerState::ResizingRow(_) => {
                self.state = PointerState::Idle;
                annotate(&mut self.roots);
                self.record_snapshot();
            }
            PointerState::RangeSelecting { .. } => {
                self.state = PointerState::Idle;
            }
            _ => {}
        }
    }

    /// Starts editing a cell. Formula cells reject activation; an edit
    /// open on another cell is committed first and a pending resize is
    /// resolved as a release.
    pub fn begin_edit(&mut self, loc: CellLoc) -> Result<()> {
        if matches!(
            self.state,
            PointerState::ResizingColumn(_) | PointerState::ResizingRow(_)
        ) {
            self.pointer_release();
        }
        if let PointerState::Editing { cell } = self.state {
            if cell == loc {
                return Ok(());
            }
            self.commit_edit();
        }

        let cell = self.cell_mut(loc)?;
        if cell.attr(FORMULA_ATTR).is_some() {
            return Err(TabgridError::FormulaCellReadOnly);
        }
        cell.remove_class("selected-cell");
        cell.add_class("editing-cell");
        cell.set_attr("contenteditable", "true");
        cell.set_attr("spellcheck", "false");
        self.state = PointerState::Editing { cell: loc };
        Ok(())
    }

    /// Replaces the text of the cell being edited.
    pub fn set_edit_text(&mut self, text: &str) -> Result<()> {
        let PointerState::Editing { cell } = self.state else {
            return Err(TabgridError::NoActiveEdit);
        };
        let element = self.cell_mut(cell)?;
        write_cell_text(element, text);
        Ok(())
    }

    /// Commits the edit in progress: recalculates every table and
    /// records one history snapshot. Without an active edit this does
    /// nothing.
    pub fn commit_edit(&mut self) {
        let PointerState::Editing { cell } = self.state else {
            return;
        };
        if let Ok(element) = self.cell_mut(cell) {
            element.remove_class("editing-cell");
            element.set_attr("contenteditable", "false");
        }
        self.state = PointerState::Idle;
        calculate_all(&mut self.roots);
        self.record_snapshot();
    }

    /// Activates, rewrites and commits one cell in a single call.
    pub fn edit_cell(&mut self, loc: CellLoc, text: &str) -> Result<()> {
        self.begin_edit(loc)?;
        self.set_edit_text(text)?;
        self.commit_edit();
        Ok(())
    }

    /// Clears the text of every selected cell that is not a formula
    /// cell, then recalculates and snapshots once. Returns whether any
    /// cell was selected at all.
    pub fn delete_selection(&mut self) -> bool {
        let mut any = false;
        for_each_table_mut(&mut self.roots, &mut |table| {
            for_each_cell_mut(table, false, &mut |td| {
                if !td.has_class("selected-cell") {
                    return;
                }
                any = true;
                if td.attr(FORMULA_ATTR).is_none() {
                    write_cell_text(td, "");
                }
            });
        });
        if any {
            calculate_all(&mut self.roots);
            self.record_snapshot();
        }
        any
    }

    /// Steps back one history position and restores that snapshot as
    /// the live document. An edit in progress is committed first, so
    /// undo right after typing returns to the state before the edit.
    /// Returns false at the oldest position.
    pub fn undo(&mut self) -> Result<bool> {
        self.commit_edit();
        let Some(snapshot) = self.history.undo().map(str::to_string) else {
            return Ok(false);
        };
        self.restore(&snapshot)?;
        Ok(true)
    }

    /// Steps forward again after an undo. Returns false at the newest
    /// position.
    pub fn redo(&mut self) -> Result<bool> {
        self.commit_edit();
        let Some(snapshot) = self.history.redo().map(str::to_string) else {
            return Ok(false);
        };
        self.restore(&snapshot)?;
        Ok(true)
    }

    /// Serializes the live document, interaction markers included.
    pub fn live_html(&self) -> String {
        write_nodes(&self.roots)
    }

    /// Serializes an export-ready copy with every interaction artifact
    /// stripped and preserved titles restored.
    pub fn clean_html(&self) -> String {
        clean_html(&self.roots)
    }

    /// Visible text of the data cell at a location.
    pub fn cell_text(&self, loc: CellLoc) -> Result<String> {
        let table =
            table_ref(&self.roots, loc.table).ok_or(TabgridError::UnknownTable(loc.table))?;
        let mut found = None;
        for_each_cell(table, false, &mut |td| {
            if found.is_none()
                && attr_usize(td, "data-row") == Some(loc.row)
                && attr_usize(td, "data-col") == Some(loc.col)
            {
                found = Some(td.inner_text());
            }
        });
        found.ok_or(TabgridError::NoSuchCell)
    }

    /// Locations of all currently selected cells, in document order.
    pub fn selected_cells(&self) -> Vec<CellLoc> {
        let mut cells = Vec::new();
        for table_index in 0..self.table_count() {
            let Some(table) = table_ref(&self.roots, table_index) else {
                continue;
            };
            for_each_cell(table, false, &mut |td| {
                if !td.has_class("selected-cell") {
                    return;
                }
                let (Some(row), Some(col)) = (attr_usize(td, "data-row"), attr_usize(td, "data-col"))
                else {
                    return;
                };
                cells.push(CellLoc::new(table_index, row, col));
            });
        }
        cells
    }

    /// The trimmed text of one table as a rectangular matrix, spanned
    /// slots left empty past their start coordinates. Header cells are
    /// included.
    pub fn table_matrix(&self, table: usize) -> Result<Vec<Vec<String>>> {
        let table = table_ref(&self.roots, table).ok_or(TabgridError::UnknownTable(table))?;
        let mut matrix: Vec<Vec<String>> = Vec::new();
        let mut width = 0usize;
        for_each_cell(table, true, &mut |cell| {
            let (Some(row), Some(col)) = (attr_usize(cell, "data-row"), attr_usize(cell, "data-col"))
            else {
                return;
            };
            let (rowspan, colspan) = cell_spans(cell);
            width = width.max(col + colspan);
            if matrix.len() < row + rowspan {
                matrix.resize(row + rowspan, Vec::new());
            }
            let line = &mut matrix[row];
            if line.len() <= col {
                line.resize(col + 1, String::new());
            }
            line[col] = cell.inner_text().trim().to_string();
        });
        for line in &mut matrix {
            line.resize(width, String::new());
        }
        Ok(matrix)
    }

    fn cell_mut(&mut self, loc: CellLoc) -> Result<&mut crate::markup::Element> {
        let table = table_mut(&mut self.roots, loc.table)
            .ok_or(TabgridError::UnknownTable(loc.table))?;
        find_cell_mut(&mut table.children, loc.row, loc.col).ok_or(TabgridError::NoSuchCell)
    }

    fn clear_selection(&mut self) {
        for_each_element_mut(&mut self.roots, &mut |el| {
            el.remove_class("selected-cell");
        });
    }

    fn select_range(&mut self, anchor: CellLoc, cursor: CellLoc) {
        self.clear_selection();
        let row_lo = anchor.row.min(cursor.row);
        let row_hi = anchor.row.max(cursor.row);
        let col_lo = anchor.col.min(cursor.col);
        let col_hi = anchor.col.max(cursor.col);
        let Some(table) = table_mut(&mut self.roots, anchor.table) else {
            return;
        };
        for_each_cell_mut(table, false, &mut |td| {
            let (Some(row), Some(col)) = (attr_usize(td, "data-row"), attr_usize(td, "data-col"))
            else {
                return;
            };
            if (row_lo..=row_hi).contains(&row) && (col_lo..=col_hi).contains(&col) {
                td.add_class("selected-cell");
            }
        });
    }

    /// Applies the size a resize gesture implies at the current pointer
    /// position. Column sizes are written to the cell and its shared
    /// `<col>`, row sizes to the cell and its row; a cell sized in
    /// percent keeps its unit, converted against the owning table's
    /// rendered size.
    fn apply_resize(&mut self, capture: ResizeCapture, pos: f64, column: bool) {
        let new_px = (capture.start_size + (pos - capture.start_pos)).max(self.options.resize_min);
        let value = if capture.percent {
            format!("{:.2}%", new_px / capture.parent_size * 100.0)
        } else {
            format!("{new_px}px")
        };

        let Some(table) = table_mut(&mut self.roots, capture.loc.table) else {
            return;
        };
        if column {
            if let Some(cell) = find_cell_mut(&mut table.children, capture.loc.row, capture.loc.col)
            {
                cell.set_style_property("width", &value);
                cell.set_attr("width", &value);
            }
            if let Some(col) = colgroup_col_mut(table, capture.loc.col) {
                col.set_style_property("width", &value);
                col.set_attr("width", &value);
            }
        } else {
            if let Some(cell) = find_cell_mut(&mut table.children, capture.loc.row, capture.loc.col)
            {
                cell.set_style_property("height", &value);
                cell.set_attr("height", &value);
            }
            if let Some(row) = row_of_cell_mut(table, capture.loc.row, capture.loc.col) {
                row.set_style_property("height", &value);
            }
        }
    }

    fn record_snapshot(&mut self) {
        let snapshot = write_nodes(&self.roots);
        self.history.record(&snapshot);
    }

    fn restore(&mut self, snapshot: &str) -> Result<()> {
        let roots = parse_fragment(snapshot)?;
        self.history.begin_restore();
        self.state = PointerState::Idle;
        self.roots = roots;
        annotate(&mut self.roots);
        self.history.end_restore();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::state::{Rect, SessionOptions};

    const SHEET: &str = concat!(
        "<table>",
        "<tr><th>Item</th><th>Qty</th></tr>",
        "<tr><td>apples</td><td>3</td></tr>",
        "<tr><td>pears</td><td>4</td></tr>",
        "<tr><td>total</td><td data-dze-formula=\"=SUM(B2:B3)\">0</td></tr>",
        "</table>"
    );

    fn session_with(html: &str) -> Session {
        let mut session = Session::new();
        session.load(html).expect("load");
        session
    }

    // Cell spans 100..180 horizontally and 100..124 vertically inside
    // a 400x200 table.
    fn target(loc: CellLoc) -> PointerTarget {
        PointerTarget {
            loc,
            cell: Rect::new(100.0, 100.0, 80.0, 24.0),
            table: Rect::new(0.0, 0.0, 400.0, 200.0),
        }
    }

    fn text(session: &Session, row: usize, col: usize) -> String {
        session.cell_text(CellLoc::new(0, row, col)).expect("cell")
    }

    #[test]
    fn load_recalculates_and_records_a_baseline() {
        let session = session_with(SHEET);
        assert_eq!(session.table_count(), 1);
        assert_eq!(text(&session, 3, 1), "7");
        assert_eq!(session.history_len(), 1);
        assert_eq!(session.pointer_state(), PointerState::Idle);
    }

    #[test]
    fn blank_load_clears_the_document() {
        let mut session = session_with(SHEET);
        session.load("   ").expect("load");
        assert_eq!(session.table_count(), 0);
        assert_eq!(session.live_html(), "");
        assert_eq!(session.history_len(), 1);
        assert!(!session.undo().expect("undo"));
    }

    #[test]
    fn press_in_the_body_anchors_a_selection() {
        let mut session = session_with(SHEET);
        let loc = CellLoc::new(0, 1, 0);
        session.pointer_press(target(loc), 120.0, 110.0).expect("press");
        assert_eq!(session.pointer_state(), PointerState::RangeSelecting { anchor: loc });
        assert_eq!(session.selected_cells(), vec![loc]);
    }

    #[test]
    fn press_near_the_right_edge_starts_a_column_resize() {
        let mut session = session_with(SHEET);
        let loc = CellLoc::new(0, 1, 0);
        session.pointer_press(target(loc), 178.0, 110.0).expect("press");
        assert!(matches!(session.pointer_state(), PointerState::ResizingColumn(_)));
        assert!(session.selected_cells().is_empty());
    }

    #[test]
    fn press_near_the_bottom_edge_starts_a_row_resize() {
        let mut session = session_with(SHEET);
        let loc = CellLoc::new(0, 1, 0);
        session.pointer_press(target(loc), 120.0, 122.0).expect("press");
        assert!(matches!(session.pointer_state(), PointerState::ResizingRow(_)));
    }

    #[test]
    fn corner_press_prefers_the_column_resize() {
        let mut session = session_with(SHEET);
        let loc = CellLoc::new(0, 1, 0);
        session.pointer_press(target(loc), 178.0, 123.0).expect("press");
        assert!(matches!(session.pointer_state(), PointerState::ResizingColumn(_)));
    }

    #[test]
    fn press_on_a_header_cell_is_rejected() {
        let mut session = session_with(SHEET);
        let err = session
            .pointer_press(target(CellLoc::new(0, 0, 0)), 120.0, 110.0)
            .unwrap_err();
        assert!(matches!(err, TabgridError::NoSuchCell));
    }

    #[test]
    fn drag_marks_the_rectangle_between_anchor_and_cursor() {
        let mut session = session_with(SHEET);
        session
            .pointer_press(target(CellLoc::new(0, 1, 1)), 120.0, 110.0)
            .expect("press");
        session.pointer_over(CellLoc::new(0, 3, 0));
        assert_eq!(
            session.selected_cells(),
            vec![
                CellLoc::new(0, 1, 0),
                CellLoc::new(0, 1, 1),
                CellLoc::new(0, 2, 0),
                CellLoc::new(0, 2, 1),
                CellLoc::new(0, 3, 0),
                CellLoc::new(0, 3, 1),
            ]
        );

        // dragging back shrinks the rectangle again
        session.pointer_over(CellLoc::new(0, 1, 1));
        assert_eq!(session.selected_cells(), vec![CellLoc::new(0, 1, 1)]);

        // release keeps the markers but ends the gesture
        session.pointer_release();
        assert_eq!(session.pointer_state(), PointerState::Idle);
        assert_eq!(session.selected_cells(), vec![CellLoc::new(0, 1, 1)]);
    }

    #[test]
    fn drag_ignores_cells_of_other_tables() {
        let mut session = session_with(concat!(
            "<table><tr><td>a</td></tr></table>",
            "<table><tr><td>b</td></tr></table>"
        ));
        session
            .pointer_press(target(CellLoc::new(0, 0, 0)), 120.0, 110.0)
            .expect("press");
        session.pointer_over(CellLoc::new(1, 0, 0));
        assert_eq!(session.selected_cells(), vec![CellLoc::new(0, 0, 0)]);
    }

    #[test]
    fn percent_column_resize_updates_cell_and_col() {
        let mut session = session_with(concat!(
            "<table><colgroup><col><col></colgroup>",
            "<tr><td style=\"width: 50%\">a</td><td>b</td></tr></table>"
        ));
        session
            .pointer_press(target(CellLoc::new(0, 0, 0)), 178.0, 110.0)
            .expect("press");
        session.pointer_move(218.0, 110.0);
        session.pointer_release();

        let html = session.live_html();
        // cell and shared col carry the new width, as style and attribute
        assert_eq!(html.matches("width=\"30.00%\"").count(), 2);
        assert_eq!(html.matches("style=\"width: 30.00%;\"").count(), 2);
        assert_eq!(session.pointer_state(), PointerState::Idle);
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn pixel_resize_clamps_at_the_minimum_size() {
        let mut session = session_with("<table><tr><td>a</td></tr></table>");
        session
            .pointer_press(target(CellLoc::new(0, 0, 0)), 178.0, 110.0)
            .expect("press");
        session.pointer_move(103.0, 110.0);
        session.pointer_release();
        let html = session.live_html();
        assert!(html.contains("width=\"10px\""));
        assert!(html.contains("style=\"width: 10px;\""));
    }

    #[test]
    fn row_resize_sets_cell_and_row_heights() {
        let mut session = session_with("<table><tr><td>a</td></tr></table>");
        session
            .pointer_press(target(CellLoc::new(0, 0, 0)), 120.0, 122.0)
            .expect("press");
        session.pointer_move(120.0, 148.0);
        session.pointer_release();
        let html = session.live_html();
        assert!(html.contains("height=\"50px\""));
        assert!(html.contains("<tr style=\"height: 50px;\">"));
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn editing_rewrites_text_and_recalculates() {
        let mut session = session_with(SHEET);
        session
            .edit_cell(CellLoc::new(0, 1, 1), "10")
            .expect("edit");
        assert_eq!(text(&session, 1, 1), "10");
        assert_eq!(text(&session, 3, 1), "14");
        assert_eq!(session.history_len(), 2);
        assert_eq!(session.pointer_state(), PointerState::Idle);
    }

    #[test]
    fn formula_cells_reject_edit_activation() {
        let mut session = session_with(SHEET);
        let err = session.begin_edit(CellLoc::new(0, 3, 1)).unwrap_err();
        assert!(matches!(err, TabgridError::FormulaCellReadOnly));
        assert_eq!(session.pointer_state(), PointerState::Idle);
    }

    #[test]
    fn set_edit_text_requires_an_active_edit() {
        let mut session = session_with(SHEET);
        let err = session.set_edit_text("x").unwrap_err();
        assert!(matches!(err, TabgridError::NoActiveEdit));
    }

    #[test]
    fn press_elsewhere_commits_the_open_edit() {
        let mut session = session_with(SHEET);
        session.begin_edit(CellLoc::new(0, 1, 0)).expect("begin");
        session.set_edit_text("grapes").expect("set");
        session
            .pointer_press(target(CellLoc::new(0, 2, 0)), 120.0, 110.0)
            .expect("press");
        assert_eq!(text(&session, 1, 0), "grapes");
        assert_eq!(session.history_len(), 2);
        assert!(matches!(
            session.pointer_state(),
            PointerState::RangeSelecting { .. }
        ));
    }

    #[test]
    fn edit_activation_resolves_a_pending_resize() {
        let mut session = session_with(SHEET);
        session
            .pointer_press(target(CellLoc::new(0, 1, 0)), 178.0, 110.0)
            .expect("press");
        session.begin_edit(CellLoc::new(0, 1, 0)).expect("begin");
        assert!(matches!(session.pointer_state(), PointerState::Editing { .. }));
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn delete_clears_literals_and_skips_formulas() {
        let mut session = session_with(SHEET);
        session
            .pointer_press(target(CellLoc::new(0, 1, 1)), 120.0, 110.0)
            .expect("press");
        session.pointer_over(CellLoc::new(0, 3, 1));
        session.pointer_release();

        assert!(session.delete_selection());
        assert_eq!(text(&session, 1, 1), "");
        assert_eq!(text(&session, 2, 1), "");
        // the formula cell kept its formula and recalculated over the
        // now-empty inputs
        assert_eq!(text(&session, 3, 1), "0");
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn delete_without_selection_is_inert() {
        let mut session = session_with(SHEET);
        assert!(!session.delete_selection());
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn undo_and_redo_walk_the_snapshots() {
        let mut session = session_with(SHEET);
        session.edit_cell(CellLoc::new(0, 1, 1), "10").expect("edit");
        session.edit_cell(CellLoc::new(0, 2, 1), "20").expect("edit");
        assert_eq!(text(&session, 3, 1), "30");

        assert!(session.undo().expect("undo"));
        assert_eq!(text(&session, 2, 1), "4");
        assert_eq!(text(&session, 3, 1), "14");

        assert!(session.undo().expect("undo"));
        assert_eq!(text(&session, 1, 1), "3");
        assert_eq!(text(&session, 3, 1), "7");
        assert!(!session.undo().expect("undo"));

        assert!(session.redo().expect("redo"));
        assert!(session.redo().expect("redo"));
        assert_eq!(text(&session, 3, 1), "30");
        assert!(!session.redo().expect("redo"));
    }

    #[test]
    fn a_new_edit_after_undo_discards_the_redo_branch() {
        let mut session = session_with(SHEET);
        session.edit_cell(CellLoc::new(0, 1, 1), "10").expect("edit");
        session.edit_cell(CellLoc::new(0, 1, 1), "11").expect("edit");
        assert!(session.undo().expect("undo"));
        session.edit_cell(CellLoc::new(0, 1, 1), "12").expect("edit");

        assert!(!session.redo().expect("redo"));
        assert_eq!(text(&session, 1, 1), "12");
        assert!(session.undo().expect("undo"));
        assert_eq!(text(&session, 1, 1), "10");
    }

    #[test]
    fn undo_commits_an_open_edit_first() {
        let mut session = session_with(SHEET);
        session.begin_edit(CellLoc::new(0, 1, 0)).expect("begin");
        session.set_edit_text("temp").expect("set");

        assert!(session.undo().expect("undo"));
        assert_eq!(text(&session, 1, 0), "apples");
        assert_eq!(session.history_len(), 2);

        assert!(session.redo().expect("redo"));
        assert_eq!(text(&session, 1, 0), "temp");
    }

    #[test]
    fn history_capacity_drops_the_oldest_snapshot() {
        let mut session = Session::with_options(SessionOptions {
            history_limit: 3,
            ..SessionOptions::default()
        });
        session.load(SHEET).expect("load");
        for value in ["v1", "v2", "v3"] {
            session.edit_cell(CellLoc::new(0, 1, 0), value).expect("edit");
        }
        assert_eq!(session.history_len(), 3);

        assert!(session.undo().expect("undo"));
        assert!(session.undo().expect("undo"));
        assert_eq!(text(&session, 1, 0), "v1");
        // the load-time baseline was evicted
        assert!(!session.undo().expect("undo"));
    }

    #[test]
    fn restored_snapshots_keep_their_annotations() {
        let mut session = session_with(SHEET);
        session.edit_cell(CellLoc::new(0, 1, 1), "10").expect("edit");
        session.undo().expect("undo");
        // coordinates were re-assigned on restore, so cell addressing
        // still works
        session.edit_cell(CellLoc::new(0, 2, 1), "8").expect("edit");
        assert_eq!(text(&session, 3, 1), "11");
    }

    #[test]
    fn clean_export_strips_markers_and_restores_titles() {
        let mut session = session_with(concat!(
            "<table>",
            "<tr><th>Item</th></tr>",
            "<tr><td title=\"note\">apples</td></tr>",
            "</table>"
        ));
        session
            .pointer_press(target(CellLoc::new(0, 1, 0)), 120.0, 110.0)
            .expect("press");

        let live = session.live_html();
        assert!(live.contains("selected-cell"));
        assert!(live.contains("data-org-title=\"note\""));

        let clean = session.clean_html();
        assert!(!clean.contains("selected-cell"));
        assert!(!clean.contains("data-row"));
        assert!(!clean.contains("data-tooltip"));
        assert!(!clean.contains("data-org-title"));
        assert!(clean.contains("title=\"note\""));
    }

    #[test]
    fn nested_table_cells_are_addressed_by_their_own_table() {
        let mut session = session_with(concat!(
            "<table><tr><td>outer</td><td>",
            "<table><tr><td>5</td></tr></table>",
            "</td></tr></table>"
        ));
        session.edit_cell(CellLoc::new(1, 0, 0), "9").expect("edit");
        assert_eq!(
            session.cell_text(CellLoc::new(1, 0, 0)).expect("cell"),
            "9"
        );
        assert_eq!(text(&session, 0, 0), "outer");
    }

    #[test]
    fn table_matrix_reflects_spans_and_headers() {
        let session = session_with(concat!(
            "<table>",
            "<tr><th>Item</th><th>Qty</th></tr>",
            "<tr><td colspan=\"2\">wide</td></tr>",
            "</table>"
        ));
        let matrix = session.table_matrix(0).expect("matrix");
        assert_eq!(
            matrix,
            vec![
                vec!["Item".to_string(), "Qty".to_string()],
                vec!["wide".to_string(), String::new()],
            ]
        );
        assert!(matches!(
            session.table_matrix(5),
            Err(TabgridError::UnknownTable(5))
        ));
    }
}
