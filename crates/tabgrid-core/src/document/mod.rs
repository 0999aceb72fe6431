//! Document model: coordinates, recalculation, interaction state and
//! the edit session driving them.

mod coords;
mod history;
mod ops;
mod recalc;
mod state;

pub use state::{CellLoc, PointerState, PointerTarget, Rect, ResizeCapture, Session, SessionOptions};
