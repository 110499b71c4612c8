//! R-tree based hit testing over laid-out persons, using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Nearest person to a pointer position
//! - Persons inside a selection rectangle or radius

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::layout::TreeLayout;

/// A laid-out person's position in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonPoint {
    /// Person identifier.
    pub id: String,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl PersonPoint {
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Self {
        Self { id: id.into(), x, y }
    }
}

impl RTreeObject for PersonPoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for PersonPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        (self.x - point[0]).abs() < f32::EPSILON && (self.y - point[1]).abs() < f32::EPSILON
    }
}

/// Spatial index over the nodes of the current layout.
///
/// Uses an R*-tree for efficient spatial queries.
pub struct SpatialIndex {
    tree: RTree<PersonPoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load every node of a layout.
    pub fn from_layout<P>(layout: &TreeLayout<P>) -> Self {
        Self::from_points(
            layout
                .nodes
                .iter()
                .map(|node| PersonPoint::new(node.id.clone(), node.x, node.y))
                .collect(),
        )
    }

    fn from_points(points: Vec<PersonPoint>) -> Self {
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Find the nearest person within a maximum distance.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<&str> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.id.as_str())
    }

    /// Find all persons within a rectangle.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&str> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id.as_str())
            .collect()
    }

    /// Find all persons within a radius of a point.
    pub fn in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<&str> {
        let radius_sq = radius * radius;
        self.tree
            .locate_within_distance([x, y], radius_sq)
            .map(|point| point.id.as_str())
            .collect()
    }

    /// Get the number of persons in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GenerationalLayout;
    use crate::model::{Gender, Person};

    fn index_of(points: &[(&str, f32, f32)]) -> SpatialIndex {
        SpatialIndex::from_points(
            points
                .iter()
                .map(|&(id, x, y)| PersonPoint::new(id, x, y))
                .collect(),
        )
    }

    #[test]
    fn test_nearest_within() {
        let index = index_of(&[("a", 0.0, 0.0), ("b", 10.0, 10.0)]);

        assert_eq!(index.nearest_within(0.0, 0.0, 5.0), Some("a"));
        assert_eq!(index.nearest_within(11.0, 11.0, 5.0), Some("b"));

        // Nothing within 1 of (5, 5)
        assert_eq!(index.nearest_within(5.0, 5.0, 1.0), None);

        // "a" is ~7.07 from (5, 5), so within 8 should find it
        assert_eq!(index.nearest_within(5.0, 5.0, 8.0), Some("a"));
    }

    #[test]
    fn test_in_rect_and_radius() {
        let index = index_of(&[("a", 0.0, 0.0), ("b", 3.0, 0.0), ("c", 10.0, 10.0)]);

        let in_rect = index.in_rect(-1.0, -1.0, 6.0, 6.0);
        assert_eq!(in_rect.len(), 2);
        assert!(in_rect.contains(&"a"));
        assert!(in_rect.contains(&"b"));

        let in_radius = index.in_radius(0.0, 0.0, 5.0);
        assert_eq!(in_radius.len(), 2);
        assert!(!in_radius.contains(&"c"));
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.nearest_within(0.0, 0.0, 1000.0), None);
        assert!(index.in_radius(0.0, 0.0, 1000.0).is_empty());
    }

    #[test]
    fn test_from_layout() {
        let persons = vec![
            Person::new("p1", "Ana", "Ruiz", Gender::Female),
            Person::new("p2", "Luis", "Ruiz", Gender::Male),
            Person::new("c1", "Eva", "Ruiz", Gender::Female)
                .with_mother("p1")
                .with_father("p2"),
        ];
        let layout = GenerationalLayout::with_defaults().compute(&persons);
        let index = SpatialIndex::from_layout(&layout);

        assert_eq!(index.len(), 3);
        let child = layout.node("c1").expect("c1 laid out");
        assert_eq!(index.nearest_within(child.x + 3.0, child.y - 3.0, 10.0), Some("c1"));
        assert_eq!(index.nearest_within(child.x, child.y + 90.0, 10.0), None);
    }
}
