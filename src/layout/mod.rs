//! Layout algorithms for the family tree view.
//!
//! The layout is computed CPU-side from the full person collection on every
//! refresh: generations are resolved first, then each generation becomes a
//! rank of evenly spaced nodes joined by parent -> child edges.

pub mod generation;
pub mod generational;

pub use generation::{Generations, resolve_generations};
pub use generational::{
    Bounds, EdgePolicy, GenerationalLayout, LayoutConfig, LayoutEdge, LayoutNode, RankMode,
    TreeLayout,
};
