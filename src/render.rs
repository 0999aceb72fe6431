//! Markdown rendering of a session's tables.

use std::io::Write;

use tabgrid_core::Session;
use tabgrid_engine::CellAddr;

/// Write every table of the session as a markdown table, column
/// letters across the top and 1-based row numbers down the side.
pub fn write_markdown<W: Write>(w: &mut W, session: &Session) -> std::io::Result<()> {
    if session.table_count() == 0 {
        writeln!(w, "*No tables*")?;
        return Ok(());
    }

    for index in 0..session.table_count() {
        let matrix = session.table_matrix(index).unwrap_or_default();
        if index > 0 {
            writeln!(w)?;
        }
        writeln!(w, "# Table {}", index + 1)?;
        writeln!(w)?;

        let width = matrix.first().map_or(0, |line| line.len());
        if width == 0 {
            writeln!(w, "*Empty table*")?;
            continue;
        }

        write!(w, "|   |")?;
        for col in 0..width {
            write!(w, " {} |", CellAddr::col_to_letters(col))?;
        }
        writeln!(w)?;

        write!(w, "|---|")?;
        for _ in 0..width {
            write!(w, "---|")?;
        }
        writeln!(w)?;

        for (row, line) in matrix.iter().enumerate() {
            write!(w, "| {} |", row + 1)?;
            for cell in line {
                write!(w, " {} |", escape_markdown(cell))?;
            }
            writeln!(w)?;
        }
    }

    Ok(())
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
