//! Cell data structures.
//!
//! - [`CellContents`] - what the user entered (number, text or formula)
//! - [`CellValue`] - what the cell evaluates to
//! - [`Cell`] - contents plus the last computed value

use serde::{Deserialize, Serialize};
use std::fmt;

use super::eval::EvalError;
use super::format::format_number;
use super::formula::{Formula, FormulaError};

/// Raw contents of a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellContents {
    Number(f64),
    Text(String),
    Formula(Formula),
}

impl CellContents {
    /// Parse user input.
    /// - Starts with '=' -> Formula (without the '='), parsed with the given rules
    /// - Valid finite number (surrounding whitespace allowed) -> Number
    /// - Otherwise -> Text, verbatim
    pub fn parse<N, V>(input: &str, normalize: N, is_valid: V) -> Result<CellContents, FormulaError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        if let Some(formula) = input.strip_prefix('=') {
            return Formula::with_rules(formula, normalize, is_valid).map(CellContents::Formula);
        }

        if let Ok(n) = input.trim().parse::<f64>()
            && n.is_finite()
        {
            return Ok(CellContents::Number(n));
        }

        Ok(CellContents::Text(input.to_string()))
    }

    /// Empty text is the "no contents" state.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContents::Text(s) if s.is_empty())
    }

    pub fn as_formula(&self) -> Option<&Formula> {
        match self {
            CellContents::Formula(f) => Some(f),
            _ => None,
        }
    }

    /// Re-parseable input string: `=` + canonical formula, the number, or the text.
    pub fn to_input_string(&self) -> String {
        match self {
            CellContents::Number(n) => n.to_string(),
            CellContents::Text(s) => s.clone(),
            CellContents::Formula(f) => format!("={}", f),
        }
    }
}

impl Default for CellContents {
    fn default() -> Self {
        CellContents::Text(String::new())
    }
}

/// Computed value of a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(EvalError),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(e) => write!(f, "#ERROR: {}", e),
        }
    }
}

/// A cell in the spreadsheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    contents: CellContents,
    value: CellValue,
}

impl Cell {
    /// Create a cell and compute its value against `lookup`.
    pub fn new<F>(contents: CellContents, lookup: F) -> Cell
    where
        F: Fn(&str) -> Option<f64>,
    {
        let value = Self::evaluate(&contents, lookup);
        Cell { contents, value }
    }

    fn evaluate<F>(contents: &CellContents, lookup: F) -> CellValue
    where
        F: Fn(&str) -> Option<f64>,
    {
        match contents {
            CellContents::Number(n) => CellValue::Number(*n),
            CellContents::Text(s) => CellValue::Text(s.clone()),
            CellContents::Formula(f) => match f.evaluate(lookup) {
                Ok(n) => CellValue::Number(n),
                Err(e) => CellValue::Error(e),
            },
        }
    }

    /// Compute what this cell's value would be against `lookup`.
    pub fn compute<F>(&self, lookup: F) -> CellValue
    where
        F: Fn(&str) -> Option<f64>,
    {
        Self::evaluate(&self.contents, lookup)
    }

    /// Store a freshly computed value.
    pub fn set_value(&mut self, value: CellValue) {
        self.value = value;
    }

    pub fn contents(&self) -> &CellContents {
        &self.contents
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }
}
