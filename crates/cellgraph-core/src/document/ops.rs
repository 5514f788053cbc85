use super::Spreadsheet;
use crate::error::{Result, SpreadsheetError};
use cellgraph_engine::engine::{Cell, CellContents, CellValue, Formula, recalc_order};
use log::{debug, warn};
use std::collections::BTreeSet;

impl Spreadsheet {
    /// Set a cell from raw input.
    ///
    /// Input starting with `=` is a formula, input that parses as a number is
    /// a number, anything else is literal text. Empty text clears the cell.
    ///
    /// Returns the cell and every cell that transitively depends on it, in the
    /// order their values were recomputed.
    pub fn set_contents(&mut self, name: &str, input: &str) -> Result<Vec<String>> {
        let name = self.checked_name(name)?;
        let contents = CellContents::parse(input, &*self.normalize, &*self.is_valid)?;
        self.commit(name, contents)
    }

    /// Set a cell from already-typed contents.
    ///
    /// A formula is re-read under this sheet's normalizer and validator so its
    /// variables line up with the sheet's cell names. Numbers must be finite.
    pub fn set_cell_contents(
        &mut self,
        name: &str,
        contents: CellContents,
    ) -> Result<Vec<String>> {
        let name = self.checked_name(name)?;
        let contents = match contents {
            CellContents::Formula(f) => CellContents::Formula(Formula::with_rules(
                f.as_str(),
                &*self.normalize,
                &*self.is_valid,
            )?),
            CellContents::Number(n) if !n.is_finite() => {
                return Err(SpreadsheetError::NonFiniteNumber(n));
            }
            other => other,
        };
        self.commit(name, contents)
    }

    /// Install `contents` in cell `name` and recompute everything downstream.
    ///
    /// The recalculation order is computed against the graph as it will look
    /// after the edit, without touching the real graph or the cell store. Only
    /// an acyclic edit is committed.
    fn commit(&mut self, name: String, contents: CellContents) -> Result<Vec<String>> {
        let new_vars: Vec<String> = contents
            .as_formula()
            .map(|f| f.variables().to_vec())
            .unwrap_or_default();

        let order = recalc_order(&name, |cell| {
            let mut next: Vec<String> = self
                .graph
                .dependents(cell)
                .filter(|dependent| *dependent != name)
                .map(str::to_string)
                .collect();
            if new_vars.iter().any(|v| v == cell) {
                next.push(name.clone());
            }
            next
        });
        let order = match order {
            Ok(order) => order,
            Err(cycle) => {
                warn!("rejected edit of {}: {}", name, cycle);
                return Err(cycle.into());
            }
        };

        self.graph.replace_dependees(&name, &new_vars);
        if contents.is_empty() {
            self.cells.shift_remove(&name);
        } else {
            let cell = Cell::new(contents, |v| self.lookup(v));
            self.cells.insert(name.clone(), cell);
        }

        for dependent in order.iter().skip(1) {
            let Some(value) = self
                .cells
                .get(dependent)
                .map(|cell| cell.compute(|v| self.lookup(v)))
            else {
                continue;
            };
            if let Some(cell) = self.cells.get_mut(dependent) {
                cell.set_value(value);
            }
        }

        self.modified = true;
        debug!("set {}: {} cell(s) recomputed", name, order.len());
        Ok(order)
    }

    /// Raw contents of a cell; empty text if the cell does not exist.
    pub fn get_contents(&self, name: &str) -> Result<CellContents> {
        let name = self.checked_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.contents().clone())
            .unwrap_or_default())
    }

    /// Computed value of a cell; empty text if the cell does not exist.
    pub fn get_value(&self, name: &str) -> Result<CellValue> {
        let name = self.checked_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.value().clone())
            .unwrap_or_default())
    }

    /// Names of all cells whose contents are not empty text.
    pub fn nonempty_cell_names(&self) -> BTreeSet<String> {
        self.cells()
            .filter(|(_, cell)| !cell.contents().is_empty())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Cells whose formulas reference `name` directly.
    pub fn direct_dependents(&self, name: &str) -> Result<Vec<String>> {
        let name = self.checked_name(name)?;
        Ok(self.graph.dependents(&name).map(str::to_string).collect())
    }

    /// Stored cells in creation order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(name, cell)| (name.as_str(), cell))
    }
}
