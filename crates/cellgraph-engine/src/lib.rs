//! cellgraph_engine - Formula parsing, evaluation and dependency tracking.

pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use std::collections::HashMap;

    /// Recompute a small sheet held in a plain map, the way a document does:
    /// register edges, compute the order, then evaluate in that order.
    fn recompute(
        cells: &mut HashMap<String, Cell>,
        graph: &DependencyGraph,
        start: &str,
    ) -> Vec<String> {
        let order = recalc_order(start, |name| {
            graph.dependents(name).map(str::to_string).collect()
        })
        .unwrap();
        for name in &order {
            let value = match cells.get(name) {
                Some(cell) => cell.compute(|v| cells.get(v).and_then(|c| c.value().as_number())),
                None => continue,
            };
            if let Some(cell) = cells.get_mut(name) {
                cell.set_value(value);
            }
        }
        order
    }

    fn formula_cell(text: &str) -> Cell {
        Cell::new(CellContents::Formula(Formula::new(text).unwrap()), |_| None)
    }

    #[test]
    fn test_formula_variables_feed_graph() {
        let f = Formula::new("B1 + C1 * B1").unwrap();
        let mut graph = DependencyGraph::new();
        graph.replace_dependees("A1", f.variables());
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.dependents("B1").collect::<Vec<_>>(), ["A1"]);
        assert_eq!(graph.dependents("C1").collect::<Vec<_>>(), ["A1"]);
    }

    #[test]
    fn test_values_flow_through_order() {
        let mut cells = HashMap::new();
        let mut graph = DependencyGraph::new();

        cells.insert("A1".to_string(), Cell::new(CellContents::Number(2.0), |_| None));
        cells.insert("B1".to_string(), formula_cell("A1 * 10"));
        cells.insert("C1".to_string(), formula_cell("B1 + A1"));
        graph.add_dependency("A1", "B1");
        graph.add_dependency("B1", "C1");
        graph.add_dependency("A1", "C1");

        let order = recompute(&mut cells, &graph, "A1");
        assert_eq!(order, ["A1", "B1", "C1"]);
        assert_eq!(cells["C1"].value(), &CellValue::Number(22.0));
    }

    #[test]
    fn test_error_propagates_as_undefined() {
        let mut cells = HashMap::new();
        let mut graph = DependencyGraph::new();

        cells.insert("A1".to_string(), formula_cell("1/0"));
        cells.insert("B1".to_string(), formula_cell("A1 + 1"));
        graph.add_dependency("A1", "B1");

        recompute(&mut cells, &graph, "A1");
        assert_eq!(cells["A1"].value(), &CellValue::Error(EvalError::DivideByZero));
        assert_eq!(
            cells["B1"].value(),
            &CellValue::Error(EvalError::UndefinedVariable("A1".to_string()))
        );
    }
}
