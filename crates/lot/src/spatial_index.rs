//! R*-tree index over oriented rectangles.
//!
//! Broad phase for conflict-graph construction: the index returns every
//! rectangle whose axis-aligned box, expanded by a margin, touches the query
//! box. The exact test runs afterwards on the returned handful.

use rstar::{RTree, RTreeObject, AABB};
use yardplan_core::geometry::OrientedRect;

/// An entry in the spatial index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Index of the rectangle in the caller's list
    pub index: usize,
    /// Axis-aligned bounding box (min_x, min_y, max_x, max_y)
    pub aabb: [f64; 4],
}

impl SpatialEntry {
    /// Creates a new entry from a precomputed box.
    pub fn new(index: usize, aabb: [f64; 4]) -> Self {
        Self { index, aabb }
    }

    /// Creates an entry from an oriented rectangle.
    pub fn from_rect(index: usize, rect: &OrientedRect) -> Self {
        Self::new(index, rect.aabb())
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.aabb[0], self.aabb[1]], [self.aabb[2], self.aabb[3]])
    }
}

/// R*-tree over rectangle bounding boxes.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    /// Creates a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-loads the given entries.
    pub fn with_entries(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Bulk-loads one entry per rectangle, indexed by position.
    pub fn from_rects<'a>(rects: impl IntoIterator<Item = &'a OrientedRect>) -> Self {
        Self::with_entries(
            rects
                .into_iter()
                .enumerate()
                .map(|(i, r)| SpatialEntry::from_rect(i, r))
                .collect(),
        )
    }

    /// Inserts a new entry.
    pub fn insert(&mut self, entry: SpatialEntry) {
        self.tree.insert(entry);
    }

    /// Returns the number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Finds all entries whose boxes intersect the given box (closed).
    pub fn query_aabb(&self, min: [f64; 2], max: [f64; 2]) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners(min, max);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Finds all entries within `margin` of the rectangle's bounding box.
    pub fn query_with_margin(&self, rect: &OrientedRect, margin: f64) -> Vec<&SpatialEntry> {
        let aabb = rect.aabb();
        self.query_aabb(
            [aabb[0] - margin, aabb[1] - margin],
            [aabb[2] + margin, aabb[3] + margin],
        )
    }

    /// Returns the indices of rectangles that may lie within `margin` of `rect`.
    pub fn potential_neighbors(&self, rect: &OrientedRect, margin: f64) -> Vec<usize> {
        self.query_with_margin(rect, margin)
            .iter()
            .map(|entry| entry.index)
            .collect()
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

    #[test]
    fn test_spatial_index_new() {
        let index = SpatialIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_spatial_index_query_aabb() {
        let mut index = SpatialIndex::new();
        index.insert(SpatialEntry::new(0, [0.0, 0.0, 10.0, 10.0]));
        index.insert(SpatialEntry::new(1, [20.0, 0.0, 30.0, 10.0]));
        index.insert(SpatialEntry::new(2, [0.0, 20.0, 10.0, 30.0]));

        let results = index.query_aabb([5.0, 5.0], [15.0, 15.0]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);

        let results = index.query_aabb([5.0, 0.0], [25.0, 10.0]);
        assert_eq!(results.len(), 2);

        assert!(index.query_aabb([50.0, 50.0], [60.0, 60.0]).is_empty());
        assert_eq!(index.query_aabb([-10.0, -10.0], [40.0, 40.0]).len(), 3);
    }

    #[test]
    fn test_rotated_rect_envelope() {
        let rect = OrientedRect::new(0.0, 0.0, 10.0, 10.0).with_rotation(45.0);
        let index = SpatialIndex::from_rects([&rect]);
        // Rotation about the center widens the box to the half diagonal
        let half_diag = 5.0 * std::f64::consts::SQRT_2;
        assert_eq!(index.query_aabb([5.0 + half_diag - 0.01, 5.0], [20.0, 6.0]).len(), 1);
        assert!(index.query_aabb([5.0 + half_diag + 0.01, 5.0], [20.0, 6.0]).is_empty());
    }

    #[test]
    fn test_query_with_margin() {
        let a = OrientedRect::new(0.0, 0.0, 10.0, 3.0);
        let b = OrientedRect::new(11.5, 0.0, 10.0, 3.0);
        let index = SpatialIndex::from_rects([&a, &b]);

        let query = OrientedRect::new(0.0, 4.0, 10.0, 3.0);
        assert_eq!(index.potential_neighbors(&query, 0.0), Vec::<usize>::new());
        let mut near = index.potential_neighbors(&query, 1.0);
        near.sort_unstable();
        assert_eq!(near, vec![0]);
        let mut near = index.potential_neighbors(&query, 2.0);
        near.sort_unstable();
        assert_eq!(near, vec![0, 1]);
    }
}
