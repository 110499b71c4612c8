//! FamilyGraph - parent/child relationships as a directed graph.
//!
//! Edges point from parent to child and carry the [`ParentRole`] of the
//! parent. Only references that resolve to a person in the input become
//! edges; dangling references are left out, so every query here answers in
//! terms of persons that actually exist.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{Bfs, EdgeRef, Reversed};
use petgraph::{Directed, Direction};

use crate::model::{Lineage, ParentRole};

/// Directed family graph built from a person collection.
pub struct FamilyGraph {
    /// Node weights are person ids, edge weights the parent's role.
    graph: StableGraph<String, ParentRole, Directed>,

    /// Map from person id to petgraph NodeIndex
    index: HashMap<String, NodeIndex>,
}

impl FamilyGraph {
    /// Build the graph from `persons`.
    ///
    /// Nodes are inserted in input order; when an id repeats, the first
    /// record wins and later copies are ignored.
    pub fn from_persons<T: Lineage>(persons: &[T]) -> Self {
        let mut graph = StableGraph::with_capacity(persons.len(), persons.len() * 2);
        let mut index = HashMap::with_capacity(persons.len());
        let mut canonical = Vec::with_capacity(persons.len());

        for person in persons {
            if index.contains_key(person.id()) {
                continue;
            }
            let node = graph.add_node(person.id().to_string());
            index.insert(person.id().to_string(), node);
            canonical.push((node, person));
        }

        for (child, person) in canonical {
            for (role, parent_id) in person.parents() {
                if let Some(&parent) = index.get(parent_id) {
                    graph.add_edge(parent, child, role);
                }
            }
        }

        Self { graph, index }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of distinct persons.
    pub fn person_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of resolved parent links.
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Resolved parents of `id`, father first.
    pub fn parents(&self, id: &str) -> Vec<(ParentRole, &str)> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut parents: Vec<(ParentRole, &str)> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| (*edge.weight(), self.graph[edge.source()].as_str()))
            .collect();
        parents.sort_by_key(|&(role, _)| role == ParentRole::Mother);
        parents
    }

    /// Children of `id`, in input order.
    pub fn children(&self, id: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        // neighbors come back newest-first; node indices follow input order
        children.sort();
        children.dedup();
        children.into_iter().map(|n| self.graph[n].as_str()).collect()
    }

    /// Every ancestor of `id`, nearest generations first.
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, node);
        let mut found = Vec::new();
        while let Some(n) = bfs.next(reversed) {
            if n != node {
                found.push(self.graph[n].as_str());
            }
        }
        found
    }

    /// Every descendant of `id`, nearest generations first.
    pub fn descendants(&self, id: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut bfs = Bfs::new(&self.graph, node);
        let mut found = Vec::new();
        while let Some(n) = bfs.next(&self.graph) {
            if n != node {
                found.push(self.graph[n].as_str());
            }
        }
        found
    }

    /// Whether making `parent` a parent of `child` would close a loop.
    ///
    /// True when `parent` is `child` itself or already descends from it.
    pub fn would_create_cycle(&self, child: &str, parent: &str) -> bool {
        if child == parent {
            return true;
        }
        let (Some(&from), Some(&to)) = (self.index.get(child), self.index.get(parent)) else {
            return false;
        };
        let mut bfs = Bfs::new(&self.graph, from);
        while let Some(n) = bfs.next(&self.graph) {
            if n == to {
                return true;
            }
        }
        false
    }
}
