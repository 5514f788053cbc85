//! Error types for Cellgraph core.

use thiserror::Error;

use cellgraph_engine::engine::{CycleError, FormulaError};

/// Errors that can occur while editing, loading or saving a spreadsheet.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Invalid cell name: {0:?}")]
    InvalidName(String),

    #[error("Number is not finite: {0}")]
    NonFiniteNumber(f64),

    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    CircularDependency(#[from] CycleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Version mismatch: expected {expected:?}, found {found:?}")]
    VersionMismatch { expected: String, found: String },

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, SpreadsheetError>;
