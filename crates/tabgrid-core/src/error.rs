//! Error types for Tabgrid core.

use thiserror::Error;

/// Errors that can occur while loading or editing a document
#[derive(Error, Debug)]
pub enum TabgridError {
    #[error("Markup error at byte {offset}: {message}")]
    Markup { offset: usize, message: String },

    #[error("No table at index {0}")]
    UnknownTable(usize),

    #[error("No cell at that position")]
    NoSuchCell,

    #[error("Formula cells cannot be edited directly")]
    FormulaCellReadOnly,

    #[error("No edit in progress")]
    NoActiveEdit,
}

pub type Result<T> = std::result::Result<T, TabgridError>;
