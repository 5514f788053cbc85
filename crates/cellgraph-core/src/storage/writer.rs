//! Writer for .cgs file format

use super::parser::VERSION_DIRECTIVE;
use crate::document::Spreadsheet;
use crate::error::Result;
use cellgraph_engine::engine::CellContents;
use std::fs;
use std::path::Path;

/// Write a Spreadsheet to a .cgs file
pub fn write_cgs(path: &Path, sheet: &Spreadsheet) -> Result<()> {
    let content = write_cgs_content(sheet);
    fs::write(path, content)?;
    Ok(())
}

/// Write a Spreadsheet to a .cgs format string
///
/// Cells come out in creation order, so replaying the file in order never
/// meets a cell before the cells created ahead of it.
pub fn write_cgs_content(sheet: &Spreadsheet) -> String {
    let mut lines = vec![
        "# Cellgraph Spreadsheet".to_string(),
        format!("{} {}", VERSION_DIRECTIVE, sheet.version()),
    ];

    for (name, cell) in sheet.cells() {
        let value_str = match cell.contents() {
            CellContents::Text(s) if s.is_empty() => continue,
            CellContents::Number(n) => n.to_string(),
            CellContents::Text(s) => format!("\"{}\"", escape_cgs_text(s)),
            CellContents::Formula(f) => format!("={}", f),
        };

        lines.push(format!("{}: {}", name, value_str));
    }

    lines.join("\n") + "\n"
}

fn escape_cgs_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}
