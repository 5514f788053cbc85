//! Spreadsheet engine API.
//!
//! This module provides the computation engine for the spreadsheet:
//!
//! - [`Formula`], [`Token`] - Formula parsing, validation and canonical form
//! - [`EvalError`] - Evaluation failures carried as values
//! - [`DependencyGraph`] - "is referenced by" relation between cells
//! - [`recalc_order`] - Topological recalculation order with cycle detection
//! - [`Cell`], [`CellContents`], [`CellValue`] - Cell storage types
//! - [`format_number`] - Format values for display

mod cell;
mod cycle;
mod deps;
mod eval;
mod format;
mod formula;
mod name;

pub use cell::{Cell, CellContents, CellValue};
pub use cycle::{CycleError, recalc_order};
pub use deps::DependencyGraph;
pub use eval::EvalError;
pub use format::format_number;
pub use formula::{Formula, FormulaError, Op, Token};
pub use name::{accept_all, identity, is_valid_name, uppercase};
