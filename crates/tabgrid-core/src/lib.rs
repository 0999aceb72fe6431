//! tabgrid-core - UI-agnostic document model + edit session.

pub mod document;
pub mod error;
pub mod markup;

pub use document::{CellLoc, PointerState, PointerTarget, Rect, Session, SessionOptions};
pub use error::{Result, TabgridError};

pub use tabgrid_engine::engine::CellAddr;
