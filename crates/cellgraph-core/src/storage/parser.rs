//! Parser for .cgs file format

use crate::error::{Result, SpreadsheetError};
use cellgraph_engine::engine::{CellContents, Formula};
use std::fs;
use std::path::Path;

/// Directive carrying the format version tag.
pub(crate) const VERSION_DIRECTIVE: &str = "@version:";

/// One `NAME: VALUE` line.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// 1-based line number, for error reporting
    pub line: usize,
    pub name: String,
    pub contents: CellContents,
}

/// Parsed file: version tag plus cell entries in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetFile {
    pub version: Option<String>,
    pub entries: Vec<Entry>,
}

/// Parse a .cgs file
pub fn parse_cgs(path: &Path) -> Result<SheetFile> {
    let content = fs::read_to_string(path)?;
    parse_cgs_content(&content)
}

/// Parse .cgs content from a string
pub fn parse_cgs_content(content: &str) -> Result<SheetFile> {
    let mut file = SheetFile::default();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(version) = line.strip_prefix(VERSION_DIRECTIVE) {
            if file.version.is_some() {
                return Err(SpreadsheetError::Parse {
                    line: line_num,
                    message: "Duplicate version directive".to_string(),
                });
            }
            file.version = Some(version.trim().to_string());
            continue;
        }

        // Parse "NAME: VALUE" format
        let Some((name, value)) = line.split_once(':') else {
            return Err(SpreadsheetError::Parse {
                line: line_num,
                message: "Expected 'NAME: VALUE' format".to_string(),
            });
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(SpreadsheetError::Parse {
                line: line_num,
                message: "Missing cell name".to_string(),
            });
        }

        file.entries.push(Entry {
            line: line_num,
            name: name.to_string(),
            contents: parse_cell_value(value, line_num)?,
        });
    }

    Ok(file)
}

/// Parse a cell value string into cell contents
fn parse_cell_value(value: &str, line_num: usize) -> Result<CellContents> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(CellContents::default());
    }

    // Formula: starts with '='
    if let Some(formula) = value.strip_prefix('=') {
        return formula
            .parse::<Formula>()
            .map(CellContents::Formula)
            .map_err(|e| SpreadsheetError::Parse {
                line: line_num,
                message: e.to_string(),
            });
    }

    // Quoted string: starts and ends with '"'
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let text = &value[1..value.len() - 1];
        return Ok(CellContents::Text(unescape_cgs_text(text)));
    }

    // Try to parse as number
    if let Ok(n) = value.parse::<f64>()
        && n.is_finite()
    {
        return Ok(CellContents::Number(n));
    }

    Err(SpreadsheetError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", value),
    })
}

fn unescape_cgs_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(content: &str) -> CellContents {
        let file = parse_cgs_content(content).unwrap();
        assert_eq!(file.entries.len(), 1);
        file.entries[0].contents.clone()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(single("A1: 42"), CellContents::Number(42.0));
        assert_eq!(single("A1: -0.5"), CellContents::Number(-0.5));
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(single(r#"A1: "Hello""#), CellContents::Text("Hello".into()));
        assert_eq!(single(r#"A1: "42""#), CellContents::Text("42".into()));
        assert_eq!(single(r#"A1: "=A2""#), CellContents::Text("=A2".into()));
    }

    #[test]
    fn test_parse_text_escapes() {
        assert_eq!(
            single(r#"A1: "He said \"hi\"\nbye \\ ok""#),
            CellContents::Text("He said \"hi\"\nbye \\ ok".into())
        );
    }

    #[test]
    fn test_parse_text_with_colon() {
        assert_eq!(single(r#"A1: "a: b""#), CellContents::Text("a: b".into()));
    }

    #[test]
    fn test_parse_formula() {
        assert_eq!(
            single("A1: =B1 + C1"),
            CellContents::Formula(Formula::new("B1+C1").unwrap())
        );
    }

    #[test]
    fn test_parse_bad_formula() {
        let err = parse_cgs_content("A1: 1\nB1: =1 +").unwrap_err();
        assert!(matches!(err, SpreadsheetError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_unquoted_text_rejected() {
        let err = parse_cgs_content("A1: hello").unwrap_err();
        assert!(matches!(err, SpreadsheetError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_missing_separator() {
        assert!(parse_cgs_content("A1 42").is_err());
        assert!(parse_cgs_content(": 42").is_err());
    }

    #[test]
    fn test_version_and_order() {
        let content = r#"
# Test spreadsheet
@version: v3
A2: 200
A1: 100
A3: "Total"
B3: =A1 + A2
"#;
        let file = parse_cgs_content(content).unwrap();
        assert_eq!(file.version.as_deref(), Some("v3"));
        let names: Vec<_> = file.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["A2", "A1", "A3", "B3"]);
        assert_eq!(file.entries[0].line, 4);
    }

    #[test]
    fn test_duplicate_version_rejected() {
        assert!(parse_cgs_content("@version: a\n@version: b\n").is_err());
    }

    #[test]
    fn test_skip_comments_and_empty_lines() {
        let content = r#"
# This is a comment
A1: 42

# Another comment

B1: 100
"#;
        let file = parse_cgs_content(content).unwrap();
        assert_eq!(file.entries.len(), 2);
        assert!(file.version.is_none());
    }
}
