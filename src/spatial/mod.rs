//! Spatial indexing for O(log n) hit testing.
//!
//! The rendering layer reports pointer positions in layout space; this
//! index turns them back into the person under the pointer.

mod rtree;

pub use rtree::{PersonPoint, SpatialIndex};
