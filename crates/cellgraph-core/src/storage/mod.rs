//! `.cgs` text storage.
//!
//! ```text
//! # comment
//! @version: default
//! A1: 42
//! B1: "label"
//! C1: =A1*2
//! ```

mod parser;
mod writer;

pub use parser::{Entry, SheetFile, parse_cgs, parse_cgs_content};
pub use writer::{write_cgs, write_cgs_content};
