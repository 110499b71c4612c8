//! Generational family tree layout.
//!
//! Places every person on a horizontal rank determined by their generation
//! and connects each child to the parents it names.
//!
//! # Layout Rules
//!
//! 1. **Ranks:** persons are grouped by generation and the groups are sorted
//!    ascending, so founders end up on the top rank. With [`RankMode::Dense`]
//!    the ranks are numbered 0, 1, 2, … over the generations actually present;
//!    with [`RankMode::Generation`] the raw generation number is the rank.
//! 2. **Slots:** inside a rank persons keep their input order and are centered
//!    on `origin_x`: slot `i` of `n` sits at `(i - n / 2) * sibling_spacing`.
//! 3. **Edges:** one per present father/mother reference, father first, in
//!    input order. Under [`EdgePolicy::PassThrough`] an edge is emitted even
//!    when its parent has no node; the renderer decides what to do with it.
//!
//! The computation is a pure function of its input: the same persons in the
//! same order always produce identical nodes, edges and coordinates.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::generation::resolve_generations;
use crate::model::{Lineage, ParentRole};

/// How generations map to vertical ranks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RankMode {
    /// Ranks are renumbered densely over the generations present.
    #[default]
    Dense,
    /// The generation number is used directly as the rank.
    Generation,
}

/// What to do with edges whose parent is not among the laid-out persons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgePolicy {
    /// Emit the edge anyway; its source simply has no node.
    #[default]
    PassThrough,
    /// Omit edges whose source has no node.
    DropDangling,
}

/// Configuration for the generational layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Vertical distance between consecutive ranks.
    pub level_spacing: f32,
    /// Horizontal distance between neighbours on a rank.
    pub sibling_spacing: f32,
    /// Horizontal center of every rank.
    pub origin_x: f32,
    /// Rank numbering.
    pub rank_mode: RankMode,
    /// Dangling edge handling.
    pub edge_policy: EdgePolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            level_spacing: 200.0,
            sibling_spacing: 250.0,
            origin_x: 400.0,
            rank_mode: RankMode::Dense,
            edge_policy: EdgePolicy::PassThrough,
        }
    }
}

/// A positioned person.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode<P> {
    pub id: String,
    pub generation: u32,
    pub rank: u32,
    pub x: f32,
    pub y: f32,
    pub payload: P,
}

/// A parent → child connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    /// `"<parent>-<child>"`.
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: ParentRole,
}

impl LayoutEdge {
    fn new(parent: &str, child: &str, kind: ParentRole) -> Self {
        Self {
            id: format!("{parent}-{child}"),
            source: parent.to_string(),
            target: child.to_string(),
            kind,
        }
    }
}

/// Axis-aligned extent of the laid-out nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

/// Result of a layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout<P> {
    pub nodes: Vec<LayoutNode<P>>,
    pub edges: Vec<LayoutEdge>,
    /// Number of distinct ranks used.
    pub rank_count: u32,
}

impl<P> TreeLayout<P> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by person id.
    pub fn node(&self, id: &str) -> Option<&LayoutNode<P>> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Bounding box of all nodes, or None if there are none.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.nodes.first()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(self.nodes.iter().fold(init, |b, node| Bounds {
            min_x: b.min_x.min(node.x),
            min_y: b.min_y.min(node.y),
            max_x: b.max_x.max(node.x),
            max_y: b.max_y.max(node.y),
        }))
    }

    /// Positions interleaved as `[x0, y0, x1, y1, ...]` in node order.
    pub fn positions(&self) -> Vec<f32> {
        let mut positions = Vec::with_capacity(self.nodes.len() * 2);
        for node in &self.nodes {
            positions.push(node.x);
            positions.push(node.y);
        }
        positions
    }

    /// Replace every payload, keeping ids, ranks and coordinates.
    pub fn map_payload<Q>(self, mut f: impl FnMut(P) -> Q) -> TreeLayout<Q> {
        TreeLayout {
            nodes: self
                .nodes
                .into_iter()
                .map(|node| LayoutNode {
                    id: node.id,
                    generation: node.generation,
                    rank: node.rank,
                    x: node.x,
                    y: node.y,
                    payload: f(node.payload),
                })
                .collect(),
            edges: self.edges,
            rank_count: self.rank_count,
        }
    }
}

/// The generational layout engine.
pub struct GenerationalLayout {
    config: LayoutConfig,
}

impl GenerationalLayout {
    /// Create a layout engine with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout engine with default spacing.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `persons`, attaching a reference to each record as payload.
    pub fn compute<'a, T: Lineage>(&self, persons: &'a [T]) -> TreeLayout<&'a T> {
        self.compute_with(persons, |person| person)
    }

    /// Lay out `persons`, building each node's payload with `payload`.
    pub fn compute_with<'a, T, P>(
        &self,
        persons: &'a [T],
        mut payload: impl FnMut(&'a T) -> P,
    ) -> TreeLayout<P>
    where
        T: Lineage,
    {
        if persons.is_empty() {
            return TreeLayout {
                nodes: Vec::new(),
                edges: Vec::new(),
                rank_count: 0,
            };
        }

        let generations = resolve_generations(persons);

        // generation -> record indices, input order preserved within a group
        let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (index, &generation) in generations.per_record().iter().enumerate() {
            groups.entry(generation).or_default().push(index);
        }

        let mut nodes = Vec::with_capacity(persons.len());
        for (rank, (&generation, members)) in groups.iter().enumerate() {
            let rank = rank as u32;
            let level = match self.config.rank_mode {
                RankMode::Dense => rank,
                RankMode::Generation => generation,
            };
            let y = level as f32 * self.config.level_spacing;
            let half = members.len() as f32 / 2.0;

            for (slot, &index) in members.iter().enumerate() {
                let person = &persons[index];
                let x = (slot as f32 - half) * self.config.sibling_spacing + self.config.origin_x;
                nodes.push(LayoutNode {
                    id: person.id().to_string(),
                    generation,
                    rank,
                    x,
                    y,
                    payload: payload(person),
                });
            }
        }

        let edges = self.build_edges(persons);

        debug!(
            "generational layout: {} node(s), {} edge(s), {} rank(s)",
            nodes.len(),
            edges.len(),
            groups.len()
        );

        TreeLayout {
            nodes,
            edges,
            rank_count: groups.len() as u32,
        }
    }

    fn build_edges<T: Lineage>(&self, persons: &[T]) -> Vec<LayoutEdge> {
        let known: HashSet<&str> = match self.config.edge_policy {
            EdgePolicy::PassThrough => HashSet::new(),
            EdgePolicy::DropDangling => persons.iter().map(|p| p.id()).collect(),
        };

        let mut edges = Vec::new();
        let mut dropped = 0;
        for person in persons {
            for (role, parent) in person.parents() {
                if self.config.edge_policy == EdgePolicy::DropDangling && !known.contains(parent) {
                    dropped += 1;
                    continue;
                }
                edges.push(LayoutEdge::new(parent, person.id(), role));
            }
        }

        if dropped > 0 {
            debug!("dropped {dropped} edge(s) with no source node");
        }
        edges
    }
}

impl Default for GenerationalLayout {
    fn default() -> Self {
        Self::with_defaults()
    }
}
