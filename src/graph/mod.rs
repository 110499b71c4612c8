//! Family relationship graph.
//!
//! Wraps petgraph's StableGraph to answer parent/child, ancestor and
//! descendant queries over a person collection, and to check whether a new
//! parent link would make someone their own ancestor.

mod family;

pub use family::FamilyGraph;
