//! Session state: the live document tree plus interaction bookkeeping.

use super::coords;
use super::history::History;
use crate::markup::Node;

/// Position of a cell: the owning table's index in document order plus
/// the cell's start coordinates inside that table's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellLoc {
    pub table: usize,
    pub row: usize,
    pub col: usize,
}

impl CellLoc {
    pub fn new(table: usize, row: usize, col: usize) -> CellLoc {
        CellLoc { table, row, col }
    }
}

/// Axis-aligned rectangle in presentation pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// What a pointer press landed on, as measured by the presentation
/// layer: the cell, its rendered rectangle, and the rectangle of the
/// table that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTarget {
    pub loc: CellLoc,
    pub cell: Rect,
    pub table: Rect,
}

/// Captured at the press that starts a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeCapture {
    pub(crate) loc: CellLoc,
    /// Pointer x (column) or y (row) at the press.
    pub(crate) start_pos: f64,
    /// Rendered size of the cell at the press, in pixels.
    pub(crate) start_size: f64,
    /// Whether the new size is written as a percentage of the table.
    pub(crate) percent: bool,
    /// Table size along the resize axis, for percentage conversion.
    pub(crate) parent_size: f64,
}

/// Interaction state machine. Every transition happens synchronously
/// inside a pointer or edit call; there is never more than one
/// in-progress gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerState {
    Idle,
    RangeSelecting { anchor: CellLoc },
    Editing { cell: CellLoc },
    ResizingColumn(ResizeCapture),
    ResizingRow(ResizeCapture),
}

/// Tunables for the interaction layer.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Distance from a cell's right or bottom border, in pixels, within
    /// which a press starts a resize instead of a selection.
    pub edge_threshold: f64,
    /// Smallest size a resize can produce, in pixels, before any
    /// percentage conversion.
    pub resize_min: f64,
    /// Bound on retained undo snapshots.
    pub history_limit: usize,
}

impl Default for SessionOptions {
    fn default() -> SessionOptions {
        SessionOptions {
            edge_threshold: 5.0,
            resize_min: 10.0,
            history_limit: 50,
        }
    }
}

/// An editing session over one loaded fragment.
#[derive(Debug)]
pub struct Session {
    pub(crate) roots: Vec<Node>,
    pub(crate) state: PointerState,
    pub(crate) history: History,
    pub(crate) options: SessionOptions,
}

impl Session {
    pub fn new() -> Session {
        Session::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Session {
        Session {
            roots: Vec::new(),
            state: PointerState::Idle,
            history: History::new(options.history_limit),
            options,
        }
    }

    /// Current interaction state.
    pub fn pointer_state(&self) -> PointerState {
        self.state
    }

    /// Number of tables in the document, nested tables included.
    pub fn table_count(&self) -> usize {
        coords::table_count(&self.roots)
    }

    /// Number of retained history snapshots.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for Session {
    fn default() -> Session {
        Session::new()
    }
}
