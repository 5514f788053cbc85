use crate::error::{Result, SpreadsheetError};
use cellgraph_engine::engine::{Cell, DependencyGraph, accept_all, identity, is_valid_name};
use indexmap::IndexMap;
use std::path::PathBuf;
use std::rc::Rc;

/// Version tag used when the caller does not pick one.
pub const DEFAULT_VERSION: &str = "default";

pub(crate) type Normalizer = Rc<dyn Fn(&str) -> String>;
pub(crate) type Validator = Rc<dyn Fn(&str) -> bool>;

/// UI-agnostic spreadsheet document.
///
/// Owns the cell store and the dependency graph. Every edit goes through
/// [`Spreadsheet::set_contents`] or [`Spreadsheet::set_cell_contents`], which
/// either commit fully or leave the document untouched.
pub struct Spreadsheet {
    /// Stored cells, in creation order
    pub(crate) cells: IndexMap<String, Cell>,
    /// "is referenced by" edges between cell names
    pub(crate) graph: DependencyGraph,
    /// Applied to every cell name and formula variable
    pub(crate) normalize: Normalizer,
    /// Extra rule every normalized name must satisfy
    pub(crate) is_valid: Validator,
    /// Format version tag written to and expected from files
    pub(crate) version: String,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the sheet changed since it was last saved or loaded
    pub modified: bool,
}

impl Spreadsheet {
    /// Create an empty spreadsheet with identity normalization, no extra
    /// name validation, and the default version tag.
    pub fn new() -> Self {
        Self::with_rules(identity, accept_all, DEFAULT_VERSION)
    }

    /// Create an empty spreadsheet with custom name rules.
    pub fn with_rules<N, V>(normalize: N, is_valid: V, version: impl Into<String>) -> Self
    where
        N: Fn(&str) -> String + 'static,
        V: Fn(&str) -> bool + 'static,
    {
        Spreadsheet {
            cells: IndexMap::new(),
            graph: DependencyGraph::new(),
            normalize: Rc::new(normalize),
            is_valid: Rc::new(is_valid),
            version: version.into(),
            file_path: None,
            modified: false,
        }
    }

    /// An empty sheet sharing this sheet's rules and version.
    pub(crate) fn empty_like(&self) -> Self {
        Spreadsheet {
            cells: IndexMap::new(),
            graph: DependencyGraph::new(),
            normalize: Rc::clone(&self.normalize),
            is_valid: Rc::clone(&self.is_valid),
            version: self.version.clone(),
            file_path: None,
            modified: false,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Read-only view of the dependency graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Normalize `name` and check it against the identifier pattern and the
    /// caller's validator.
    pub(crate) fn checked_name(&self, name: &str) -> Result<String> {
        let normalized = (self.normalize)(name);
        if is_valid_name(&normalized) && (self.is_valid)(&normalized) {
            Ok(normalized)
        } else {
            Err(SpreadsheetError::InvalidName(name.to_string()))
        }
    }

    /// Numeric value of another cell, as seen by formula evaluation.
    /// Absent, textual and errored cells are undefined.
    pub(crate) fn lookup(&self, name: &str) -> Option<f64> {
        let name = (self.normalize)(name);
        self.cells.get(&name)?.value().as_number()
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}
