//! Concept forest reconstruction from flat ancestry rows.
//!
//! The concept listing query yields one row per (concept, ancestor) pair.
//! Each row attaches the concept below its parent and the ancestor below
//! its own parent, or at the top when it has none. Folding all rows into
//! one index rebuilds the forest regardless of row order.

use std::collections::{BTreeSet, HashMap};

use ledq_core::{Hierarchy, HierarchyEntry, HierarchyNode};
use tracing::{debug, warn};

/// Identifier → node index, local to one resolution.
#[derive(Default)]
struct Arena {
    index: HashMap<String, usize>,
    ids: Vec<String>,
    children: Vec<BTreeSet<usize>>,
    roots: BTreeSet<usize>,
}

impl Arena {
    fn get_or_create(&mut self, id: &str) -> usize {
        if let Some(&slot) = self.index.get(id) {
            return slot;
        }
        let slot = self.ids.len();
        self.index.insert(id.to_string(), slot);
        self.ids.push(id.to_string());
        self.children.push(BTreeSet::new());
        slot
    }

    fn register(&mut self, entry: &HierarchyEntry) {
        let concept = self.get_or_create(&entry.concept);

        if let Some(parent) = entry.parent.as_deref() {
            let parent = self.get_or_create(parent);
            self.children[parent].insert(concept);
        }

        match entry.ancestor.as_deref() {
            Some(ancestor) => {
                let ancestor = self.get_or_create(ancestor);
                match entry.grandparent.as_deref() {
                    Some(grandparent) => {
                        let grandparent = self.get_or_create(grandparent);
                        self.children[grandparent].insert(ancestor);
                    }
                    None => {
                        self.roots.insert(ancestor);
                    }
                }
            }
            None if entry.parent.is_none() => {
                self.roots.insert(concept);
            }
            None => {}
        }
    }

    /// Build the subtree below `slot`, skipping edges back into `path`.
    fn materialize(
        &self,
        slot: usize,
        path: &mut Vec<usize>,
        visited: &mut BTreeSet<usize>,
    ) -> HierarchyNode {
        visited.insert(slot);
        path.push(slot);
        let mut node = HierarchyNode::default();
        for &child in &self.children[slot] {
            if path.contains(&child) {
                debug!(
                    concept = %self.ids[child],
                    parent = %self.ids[slot],
                    "Cut cyclic narrower edge"
                );
                continue;
            }
            node.children.insert(
                self.ids[child].clone(),
                self.materialize(child, path, visited),
            );
        }
        path.pop();
        node
    }
}

/// Rebuild the concept forest described by `entries`.
///
/// Concepts that never become reachable from a root, for instance below a
/// parent whose own ancestry is missing, are left out and reported.
pub fn resolve_hierarchy<'a, I>(entries: I) -> Hierarchy
where
    I: IntoIterator<Item = &'a HierarchyEntry>,
{
    let mut arena = Arena::default();
    for entry in entries {
        arena.register(entry);
    }

    let mut forest = Hierarchy::new();
    let mut visited = BTreeSet::new();
    let mut path = Vec::new();
    for &root in &arena.roots {
        let node = arena.materialize(root, &mut path, &mut visited);
        forest.insert(arena.ids[root].clone(), node);
    }

    if visited.len() < arena.ids.len() {
        let dropped: BTreeSet<&str> = (0..arena.ids.len())
            .filter(|slot| !visited.contains(slot))
            .map(|slot| arena.ids[slot].as_str())
            .collect();
        warn!(
            subsystem = "query",
            component = "hierarchy",
            dropped_count = dropped.len(),
            dropped = ?dropped,
            "Dropped concepts without a path to a root"
        );
    }

    forest
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(grandparent: Option<&str>, ancestor: &str, parent: &str, concept: &str) -> HierarchyEntry {
        HierarchyEntry::new(grandparent, ancestor, parent, concept)
    }

    fn as_json(forest: &Hierarchy) -> serde_json::Value {
        serde_json::to_value(forest).unwrap()
    }

    #[test]
    fn test_flat_siblings_under_one_root() {
        let entries = vec![
            entry(None, "de", "de", "berlin"),
            entry(None, "de", "de", "hamburg"),
        ];
        let forest = resolve_hierarchy(&entries);
        assert_eq!(as_json(&forest), json!({ "de": { "berlin": {}, "hamburg": {} } }));
    }

    #[test]
    fn test_missing_intermediate_ancestry_is_dropped() {
        let entries = vec![
            entry(None, "de", "de", "berlin"),
            entry(None, "de", "de", "hamburg"),
            entry(None, "de", "sl", "saarbruecken"),
        ];
        let forest = resolve_hierarchy(&entries);
        assert_eq!(as_json(&forest), json!({ "de": { "berlin": {}, "hamburg": {} } }));
    }

    #[test]
    fn test_three_levels() {
        let entries = vec![
            entry(None, "de", "de", "sl"),
            entry(Some("de"), "sl", "sl", "saarbruecken"),
            entry(None, "de", "sl", "saarbruecken"),
        ];
        let forest = resolve_hierarchy(&entries);
        assert_eq!(as_json(&forest), json!({ "de": { "sl": { "saarbruecken": {} } } }));
    }

    #[test]
    fn test_root_entry_without_ancestry() {
        let entries = vec![HierarchyEntry::root("water"), entry(None, "de", "de", "berlin")];
        let forest = resolve_hierarchy(&entries);
        assert_eq!(as_json(&forest), json!({ "de": { "berlin": {} }, "water": {} }));
    }

    #[test]
    fn test_every_permutation_gives_same_forest() {
        let entries = vec![
            entry(None, "de", "de", "sl"),
            entry(None, "de", "de", "be"),
            entry(Some("de"), "sl", "sl", "saarbruecken"),
            entry(None, "de", "sl", "saarbruecken"),
            entry(None, "fr", "fr", "paris"),
        ];
        let expected = resolve_hierarchy(&entries);

        // Heap's algorithm over all 120 orderings
        let mut order: Vec<usize> = (0..entries.len()).collect();
        let n = order.len();
        let mut c = vec![0; n];
        let mut i = 0;
        while i < n {
            if c[i] < i {
                if i % 2 == 0 {
                    order.swap(0, i);
                } else {
                    order.swap(c[i], i);
                }
                let permuted: Vec<&HierarchyEntry> = order.iter().map(|&k| &entries[k]).collect();
                assert_eq!(resolve_hierarchy(permuted), expected);
                c[i] += 1;
                i = 0;
            } else {
                c[i] = 0;
                i += 1;
            }
        }
    }

    #[test]
    fn test_resolving_twice_is_idempotent() {
        let entries = vec![
            entry(None, "de", "de", "berlin"),
            entry(None, "de", "de", "berlin"),
        ];
        let once = resolve_hierarchy(&entries);
        let doubled: Vec<HierarchyEntry> = entries.iter().chain(entries.iter()).cloned().collect();
        assert_eq!(resolve_hierarchy(&doubled), once);
        assert_eq!(once["de"].descendant_count(), 1);
    }

    #[test]
    fn test_cycle_terminates() {
        let entries = vec![
            entry(Some("a"), "b", "a", "b"),
            entry(Some("b"), "a", "b", "a"),
        ];
        let forest = resolve_hierarchy(&entries);
        // Nothing is a root, so the whole cycle is dropped
        assert!(forest.is_empty());

        let with_root = vec![
            entry(None, "a", "a", "b"),
            entry(None, "a", "b", "a"),
        ];
        let forest = resolve_hierarchy(&with_root);
        assert_eq!(as_json(&forest), json!({ "a": { "b": {} } }));
    }

    #[test]
    fn test_empty_input() {
        let entries: Vec<HierarchyEntry> = Vec::new();
        assert!(resolve_hierarchy(&entries).is_empty());
    }
}
