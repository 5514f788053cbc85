//! Dependency graph between named cells.
//!
//! # Edge Direction
//!
//! ```text
//! s → t  means  "t's formula references s"  (s is evaluated before t)
//! ```
//!
//! `dependents(s)` answers "what needs recomputing if s changes", which is
//! the direction recalculation walks. `dependees(t)` answers "what does t
//! read".
//!
//! # Invariants
//!
//! 1. **Bidirectional consistency:** t ∈ dependents[s] iff s ∈ dependees[t].
//! 2. **No dangling entries:** empty sets are removed, not stored.
//! 3. **No duplicate edges:** set semantics.
//! 4. **Deterministic order:** sets iterate in insertion order.

use indexmap::{IndexMap, IndexSet};
use log::trace;

type EdgeMap = IndexMap<String, IndexSet<String>>;

/// Bidirectional many-to-many relation between cell names.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    /// s -> {t : t references s}
    dependents: EdgeMap,
    /// t -> {s : t references s}
    dependees: EdgeMap,
    /// Number of (s, t) pairs.
    size: usize,
}

fn members<'a>(map: &'a EdgeMap, key: &str) -> impl Iterator<Item = &'a str> + use<'a> {
    map.get(key)
        .into_iter()
        .flat_map(|set| set.iter().map(String::as_str))
}

/// Remove `value` from `map[key]`, dropping the entry once it is empty.
fn detach(map: &mut EdgeMap, key: &str, value: &str) -> bool {
    let Some(set) = map.get_mut(key) else {
        return false;
    };
    let removed = set.shift_remove(value);
    if set.is_empty() {
        map.shift_remove(key);
    }
    removed
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of edges.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Cells whose formulas reference `s`.
    pub fn dependents<'a>(&'a self, s: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        members(&self.dependents, s)
    }

    /// Cells that `t`'s formula references.
    pub fn dependees<'a>(&'a self, t: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        members(&self.dependees, t)
    }

    pub fn has_dependents(&self, s: &str) -> bool {
        self.dependents.contains_key(s)
    }

    pub fn has_dependees(&self, t: &str) -> bool {
        self.dependees.contains_key(t)
    }

    pub fn num_dependees(&self, t: &str) -> usize {
        self.dependees.get(t).map_or(0, IndexSet::len)
    }

    /// Add the edge s → t. Adding an existing edge does nothing.
    pub fn add_dependency(&mut self, s: &str, t: &str) {
        let inserted = self
            .dependents
            .entry(s.to_string())
            .or_default()
            .insert(t.to_string());
        if inserted {
            self.dependees
                .entry(t.to_string())
                .or_default()
                .insert(s.to_string());
            self.size += 1;
            trace!("add dependency {} -> {}", s, t);
        }
    }

    /// Remove the edge s → t if present.
    pub fn remove_dependency(&mut self, s: &str, t: &str) {
        if detach(&mut self.dependents, s, t) {
            detach(&mut self.dependees, t, s);
            self.size -= 1;
            trace!("remove dependency {} -> {}", s, t);
        }
    }

    /// Replace every edge s → * with s → t for each t in `new_dependents`.
    pub fn replace_dependents<I, S>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let old: Vec<String> = self.dependents(s).map(str::to_string).collect();
        for t in old {
            self.remove_dependency(s, &t);
        }
        for t in new_dependents {
            self.add_dependency(s, t.as_ref());
        }
    }

    /// Replace every edge * → t with s → t for each s in `new_dependees`.
    pub fn replace_dependees<I, S>(&mut self, t: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let old: Vec<String> = self.dependees(t).map(str::to_string).collect();
        for s in old {
            self.remove_dependency(&s, t);
        }
        for s in new_dependees {
            self.add_dependency(s.as_ref(), t);
        }
    }
}
