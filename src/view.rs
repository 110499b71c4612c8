//! TreeView - the most recent layout and its hit-test index.
//!
//! The renderer draws whatever the last layout produced and reports pointer
//! positions in the same coordinate space. Keeping the layout and the R-tree
//! built from it side by side means a click always resolves against the
//! nodes actually on screen, even if the store has moved on since.

use crate::layout::{Bounds, GenerationalLayout, LayoutConfig, TreeLayout};
use crate::model::PersonCard;
use crate::spatial::SpatialIndex;
use crate::store::Snapshot;

pub struct TreeView {
    /// Store persons revision the layout was computed from.
    persons_revision: u64,
    layout: TreeLayout<PersonCard>,
    spatial: SpatialIndex,
}

impl TreeView {
    /// A view with no nodes, matching an empty store.
    pub fn empty() -> Self {
        Self {
            persons_revision: 0,
            layout: TreeLayout {
                nodes: Vec::new(),
                edges: Vec::new(),
                rank_count: 0,
            },
            spatial: SpatialIndex::new(),
        }
    }

    /// Lay out every person in `snapshot`.
    pub fn compute(snapshot: &Snapshot, config: &LayoutConfig) -> Self {
        let engine = GenerationalLayout::new(config.clone());
        let layout = engine.compute_with(snapshot.persons(), PersonCard::from);
        let spatial = SpatialIndex::from_layout(&layout);
        Self {
            persons_revision: snapshot.persons_revision(),
            layout,
            spatial,
        }
    }

    pub fn persons_revision(&self) -> u64 {
        self.persons_revision
    }

    /// Whether the view still reflects the persons at `persons_revision`.
    pub fn is_current(&self, persons_revision: u64) -> bool {
        self.persons_revision == persons_revision
    }

    pub fn layout(&self) -> &TreeLayout<PersonCard> {
        &self.layout
    }

    /// Node positions as `[x0, y0, x1, y1, ...]`.
    pub fn positions(&self) -> Vec<f32> {
        self.layout.positions()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.layout.bounds()
    }

    /// The person drawn nearest to (x, y), if within `max_distance`.
    pub fn person_at(&self, x: f32, y: f32, max_distance: f32) -> Option<&str> {
        self.spatial.nearest_within(x, y, max_distance)
    }

    /// Every person drawn inside the rectangle.
    pub fn persons_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&str> {
        self.spatial.in_rect(min_x, min_y, max_x, max_y)
    }

    /// Every person drawn within `radius` of (x, y).
    pub fn persons_in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<&str> {
        self.spatial.in_radius(x, y, radius)
    }
}

impl Default for TreeView {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, Person};
    use crate::store::FamilyStore;

    #[test]
    fn test_empty_view() {
        let view = TreeView::empty();
        assert!(view.layout().is_empty());
        assert!(view.positions().is_empty());
        assert_eq!(view.bounds(), None);
        assert_eq!(view.person_at(0.0, 0.0, 1000.0), None);
        assert!(view.is_current(FamilyStore::new().persons_revision()));
    }

    #[test]
    fn test_view_tracks_revision() {
        let mut store = FamilyStore::new();
        let snapshot = store.load(vec![Person::new("a", "Ana", "Ruiz", Gender::Female)]);
        let view = TreeView::compute(&snapshot, &LayoutConfig::default());
        assert!(view.is_current(store.persons_revision()));
        assert_eq!(view.layout().nodes.len(), 1);

        store.select("a").expect("a exists");
        assert!(view.is_current(store.persons_revision()), "selection moves no node");

        store
            .add_person(Person::new("b", "Beto", "Ruiz", Gender::Male))
            .expect("valid person");
        assert!(!view.is_current(store.persons_revision()));
    }

    #[test]
    fn test_persons_in_rect() {
        let mut store = FamilyStore::new();
        let snapshot = store.load(vec![
            Person::new("a", "Ana", "Ruiz", Gender::Female),
            Person::new("b", "Beto", "Ruiz", Gender::Male),
            Person::new("c", "Caro", "Ruiz", Gender::Female).with_mother("a"),
        ]);
        let view = TreeView::compute(&snapshot, &LayoutConfig::default());

        // Top rank only
        let mut top = view.persons_in_rect(-1000.0, -10.0, 1000.0, 10.0);
        top.sort();
        assert_eq!(top, vec!["a", "b"]);
    }
}
