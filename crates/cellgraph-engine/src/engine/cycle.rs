//! Recalculation order and circular dependency detection.
//!
//! When a cell changes, it and every cell that transitively depends on it
//! must be recomputed, each one only after everything it reads. This module
//! walks the "is referenced by" edges depth-first from the changed cell and
//! emits the visited cells in reverse post-order, which is a topological
//! order. A cell reached again while it is still on the current path means
//! the edit closes a cycle; reaching a cell that has already been finished
//! (a diamond) is fine and the cell is not visited twice.

use std::collections::HashSet;
use std::vec;
use thiserror::Error;

/// A dependency cycle, listed from the first repeated cell back to itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Circular dependency: {}", .path.join(" -> "))]
pub struct CycleError {
    pub path: Vec<String>,
}

/// Compute the recalculation order for `start`.
///
/// `dependents` returns the direct dependents of a cell in a stable order.
/// On success the result begins with `start`, contains each reachable cell
/// exactly once, and lists every cell after all the cells it depends on.
pub fn recalc_order<F>(start: &str, dependents: F) -> Result<Vec<String>, CycleError>
where
    F: Fn(&str) -> Vec<String>,
{
    let mut on_path: HashSet<String> = HashSet::new();
    let mut closed: HashSet<String> = HashSet::new();
    let mut stack: Vec<(String, vec::IntoIter<String>)> = Vec::new();
    let mut finished: Vec<String> = Vec::new();

    on_path.insert(start.to_string());
    stack.push((start.to_string(), dependents(start).into_iter()));

    loop {
        let next = match stack.last_mut() {
            Some((_, children)) => children.next(),
            None => break,
        };

        match next {
            Some(child) => {
                if on_path.contains(&child) {
                    let from = stack
                        .iter()
                        .position(|(node, _)| *node == child)
                        .unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[from..].iter().map(|(node, _)| node.clone()).collect();
                    path.push(child);
                    return Err(CycleError { path });
                }
                if closed.contains(&child) {
                    continue;
                }
                on_path.insert(child.clone());
                let grandchildren = dependents(&child).into_iter();
                stack.push((child, grandchildren));
            }
            None => {
                if let Some((node, _)) = stack.pop() {
                    on_path.remove(&node);
                    closed.insert(node.clone());
                    finished.push(node);
                }
            }
        }
    }

    finished.reverse();
    Ok(finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DependencyGraph;

    fn order(graph: &DependencyGraph, start: &str) -> Result<Vec<String>, CycleError> {
        recalc_order(start, |cell| {
            graph.dependents(cell).map(str::to_string).collect()
        })
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_isolated_cell() {
        let g = DependencyGraph::new();
        assert_eq!(order(&g, "A1").unwrap(), ["A1"]);
    }

    #[test]
    fn test_chain() {
        // A1 = A2 + A3, A3 = A2 + A4, A4 = A2 + A5
        let mut g = DependencyGraph::new();
        g.add_dependency("A2", "A1");
        g.add_dependency("A3", "A1");
        g.add_dependency("A2", "A3");
        g.add_dependency("A4", "A3");
        g.add_dependency("A2", "A4");
        g.add_dependency("A5", "A4");
        assert_eq!(order(&g, "A5").unwrap(), ["A5", "A4", "A3", "A1"]);

        let from_a2 = order(&g, "A2").unwrap();
        assert_eq!(from_a2[0], "A2");
        assert_eq!(from_a2.len(), 4);
        assert!(position(&from_a2, "A4") < position(&from_a2, "A3"));
        assert!(position(&from_a2, "A3") < position(&from_a2, "A1"));
    }

    #[test]
    fn test_diamond_visited_once() {
        // A1 = A3, A2 = A3, A4 = A1 + A2
        let mut g = DependencyGraph::new();
        g.add_dependency("A3", "A1");
        g.add_dependency("A3", "A2");
        g.add_dependency("A1", "A4");
        g.add_dependency("A2", "A4");

        let result = order(&g, "A3").unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result[0], "A3");
        assert!(position(&result, "A4") > position(&result, "A1"));
        assert!(position(&result, "A4") > position(&result, "A2"));
    }

    #[test]
    fn test_self_reference() {
        let mut g = DependencyGraph::new();
        g.add_dependency("A1", "A1");
        let err = order(&g, "A1").unwrap_err();
        assert_eq!(err.path, ["A1", "A1"]);
    }

    #[test]
    fn test_direct_cycle() {
        let mut g = DependencyGraph::new();
        g.add_dependency("A1", "B1");
        g.add_dependency("B1", "A1");
        assert!(order(&g, "A1").is_err());
        assert!(order(&g, "B1").is_err());
    }

    #[test]
    fn test_indirect_cycle_reports_path() {
        let mut g = DependencyGraph::new();
        g.add_dependency("A1", "B1");
        g.add_dependency("B1", "C1");
        g.add_dependency("C1", "A1");
        let err = order(&g, "A1").unwrap_err();
        assert_eq!(err.path, ["A1", "B1", "C1", "A1"]);
        assert_eq!(err.to_string(), "Circular dependency: A1 -> B1 -> C1 -> A1");
    }

    #[test]
    fn test_cycle_downstream_of_start() {
        let mut g = DependencyGraph::new();
        g.add_dependency("X", "B1");
        g.add_dependency("B1", "C1");
        g.add_dependency("C1", "B1");
        let err = order(&g, "X").unwrap_err();
        assert_eq!(err.path, ["B1", "C1", "B1"]);
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let mut g = DependencyGraph::new();
        for i in 0..50_000 {
            g.add_dependency(&format!("A{}", i), &format!("A{}", i + 1));
        }
        let result = order(&g, "A0").unwrap();
        assert_eq!(result.len(), 50_001);
        assert_eq!(result.last().map(String::as_str), Some("A50000"));
    }
}
