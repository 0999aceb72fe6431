//! Formula engine API.
//!
//! The computation side of tabgrid:
//!
//! - [`CellAddr`] - address parsing (A1 notation ↔ row/col indices)
//! - [`Grid`] - per-table address → value map, rebuilt every pass
//! - [`evaluate_formula`] - the full formula resolution pipeline
//! - [`evaluate_expr`] - arithmetic evaluation of fully-substituted text
//! - [`format_display`] - rounding and thousands grouping for display

mod addr;
mod expr;
mod format;
mod formula;
mod grid;

pub use addr::CellAddr;
pub use expr::{ExprError, evaluate_expr};
pub use format::{format_display, group_thousands};
pub use formula::{FormulaError, evaluate_formula};
pub use grid::Grid;
