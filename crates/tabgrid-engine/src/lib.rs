//! tabgrid-engine - formula evaluation for table documents.
//!
//! Pure computation, independent of any markup: cell addresses, the
//! per-table value grid, and the formula resolution pipeline.

pub mod engine;

pub use engine::{CellAddr, FormulaError, Grid, evaluate_formula, format_display};
