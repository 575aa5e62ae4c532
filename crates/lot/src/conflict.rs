//! Conflict graph over candidate placements.
//!
//! Two candidates conflict when their footprints, each grown by half the
//! minimum spacing, intersect. That is the same as the footprints lying within
//! the minimum spacing of each other, which is what [`in_conflict`] tests.

use std::time::Instant;

use yardplan_core::geometry::OrientedRect;

use crate::candidate::Candidate;
use crate::kernel::{self, EPS};
use crate::spatial_index::SpatialIndex;

/// Returns true if two footprints are closer than `min_spacing` (touching
/// at exactly `min_spacing` counts).
#[inline]
pub fn in_conflict(a: &OrientedRect, b: &OrientedRect, min_spacing: f64) -> bool {
    kernel::rect_distance(a, b) <= min_spacing + EPS
}

/// Undirected graph of mutually exclusive candidates.
///
/// Stored in compressed rows: the neighbors of node `i` are
/// `targets[offsets[i]..offsets[i + 1]]`, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictGraph {
    offsets: Vec<usize>,
    targets: Vec<u32>,
}

/// Neighbors of each node that have a larger index, row by row.
struct UpperRows {
    offsets: Vec<usize>,
    targets: Vec<u32>,
}

impl UpperRows {
    fn with_capacity(nodes: usize) -> Self {
        let mut offsets = Vec::with_capacity(nodes + 1);
        offsets.push(0);
        Self {
            offsets,
            targets: Vec::new(),
        }
    }

    /// Appends the next row; `row` must hold indices above the row's node.
    fn push_row(&mut self, row: &mut Vec<u32>) {
        row.sort_unstable();
        row.dedup();
        self.targets.extend_from_slice(row);
        self.offsets.push(self.targets.len());
        row.clear();
    }

    fn edge_count(&self) -> usize {
        self.targets.len()
    }
}

impl ConflictGraph {
    /// Builds the graph with an R*-tree broad phase.
    pub fn build(candidates: &[Candidate], min_spacing: f64) -> Self {
        Self::build_bounded(candidates, min_spacing, None, usize::MAX)
            .unwrap_or_else(|| Self::empty(candidates.len()))
    }

    /// Builds the graph unless `deadline` passes or more than `max_edges`
    /// edges are found, in which case `None` is returned.
    pub fn build_within(
        candidates: &[Candidate],
        min_spacing: f64,
        deadline: Instant,
        max_edges: usize,
    ) -> Option<Self> {
        Self::build_bounded(candidates, min_spacing, Some(deadline), max_edges)
    }

    fn build_bounded(
        candidates: &[Candidate],
        min_spacing: f64,
        deadline: Option<Instant>,
        max_edges: usize,
    ) -> Option<Self> {
        if u32::try_from(candidates.len()).is_err() {
            log::warn!("Too many candidates for a conflict graph: {}", candidates.len());
            return None;
        }
        let rects: Vec<OrientedRect> = candidates.iter().map(|c| c.rect).collect();
        let index = SpatialIndex::from_rects(&rects);
        let margin = min_spacing + EPS;

        let mut upper = UpperRows::with_capacity(rects.len());
        let mut row = Vec::new();
        for (i, rect) in rects.iter().enumerate() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                log::warn!(
                    "Conflict graph stopped at the deadline after {} of {} candidates",
                    i,
                    rects.len()
                );
                return None;
            }
            for j in index.potential_neighbors(rect, margin) {
                if j > i && in_conflict(rect, &rects[j], min_spacing) {
                    row.push(j as u32);
                }
            }
            upper.push_row(&mut row);
            if upper.edge_count() > max_edges {
                log::warn!(
                    "Conflict graph stopped at {} edges after {} of {} candidates",
                    upper.edge_count(),
                    i + 1,
                    rects.len()
                );
                return None;
            }
        }

        let graph = Self::from_upper(upper);
        log::info!(
            "Conflict graph: {} candidates, {} edges",
            graph.len(),
            graph.edge_count()
        );
        Some(graph)
    }

    /// Builds the graph by testing every pair.
    pub fn build_exhaustive(candidates: &[Candidate], min_spacing: f64) -> Self {
        let mut upper = UpperRows::with_capacity(candidates.len());
        let mut row = Vec::new();
        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                if in_conflict(&candidates[i].rect, &candidates[j].rect, min_spacing) {
                    row.push(j as u32);
                }
            }
            upper.push_row(&mut row);
        }
        Self::from_upper(upper)
    }

    /// Builds a graph from an explicit edge list.
    ///
    /// Self loops, duplicates and out-of-range endpoints are dropped.
    pub fn from_edges(nodes: usize, edges: &[(usize, usize)]) -> Self {
        let mut pairs: Vec<(usize, usize)> = edges
            .iter()
            .filter(|&&(a, b)| a != b && a < nodes && b < nodes)
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        pairs.sort_unstable();

        let mut upper = UpperRows::with_capacity(nodes);
        let mut row = Vec::new();
        let mut next = pairs.iter().peekable();
        for i in 0..nodes {
            while let Some(&&(a, b)) = next.peek() {
                if a != i {
                    break;
                }
                row.push(b as u32);
                next.next();
            }
            upper.push_row(&mut row);
        }
        Self::from_upper(upper)
    }

    fn empty(nodes: usize) -> Self {
        Self {
            offsets: vec![0; nodes + 1],
            targets: Vec::new(),
        }
    }

    /// Mirrors the upper rows into symmetric rows.
    ///
    /// Node `v` first receives its lower neighbors while earlier rows are
    /// walked, then its own upper row, so every row comes out ascending.
    fn from_upper(upper: UpperRows) -> Self {
        let nodes = upper.offsets.len().saturating_sub(1);
        let mut degree = vec![0usize; nodes];
        for i in 0..nodes {
            let row = &upper.targets[upper.offsets[i]..upper.offsets[i + 1]];
            degree[i] += row.len();
            for &j in row {
                degree[j as usize] += 1;
            }
        }

        let mut offsets = Vec::with_capacity(nodes + 1);
        offsets.push(0);
        for d in &degree {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + d);
        }

        let mut cursor: Vec<usize> = offsets[..nodes].to_vec();
        let mut targets = vec![0u32; upper.edge_count() * 2];
        for i in 0..nodes {
            for &j in &upper.targets[upper.offsets[i]..upper.offsets[i + 1]] {
                targets[cursor[i]] = j;
                cursor[i] += 1;
                let j = j as usize;
                targets[cursor[j]] = i as u32;
                cursor[j] += 1;
            }
        }
        Self { offsets, targets }
    }

    fn row(&self, node: usize) -> &[u32] {
        match (self.offsets.get(node), self.offsets.get(node + 1)) {
            (Some(&lo), Some(&hi)) => &self.targets[lo..hi],
            _ => &[],
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2
    }

    /// Neighbors of `node`, ascending.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(node).iter().map(|&j| j as usize)
    }

    /// Degree of `node`.
    pub fn degree(&self, node: usize) -> usize {
        self.row(node).len()
    }

    /// Returns true if `a` and `b` conflict.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        u32::try_from(b).map_or(false, |b| self.row(a).binary_search(&b).is_ok())
    }

    /// Edges `(i, j)` with `i < j`, in lexicographic order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.len()).flat_map(move |i| {
            self.neighbors(i)
                .filter(move |&j| j > i)
                .map(move |j| (i, j))
        })
    }

    /// Returns true if no two of `selected` share an edge.
    pub fn is_independent(&self, selected: &[usize]) -> bool {
        let mut sorted = selected.to_vec();
        sorted.sort_unstable();
        selected.iter().all(|&i| {
            self.neighbors(i)
                .all(|j| sorted.binary_search(&j).is_err())
        })
    }
}

impl Default for ConflictGraph {
    fn default() -> Self {
        Self::empty(0)
    }
}
