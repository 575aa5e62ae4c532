//! Deterministic greedy selection.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use yardplan_core::goal::OptimizationGoal;
use yardplan_core::status::SolveStatus;

use super::{BackendOutcome, VehicleMix};
use crate::candidate::Candidate;
use crate::conflict::{in_conflict, ConflictGraph};
use crate::kernel::EPS;
use crate::spatial_index::{SpatialEntry, SpatialIndex};

/// One-pass greedy selector.
///
/// Candidates are visited by descending weight (ties by descending revenue
/// under the priority goal, by generation order otherwise). Each visited
/// candidate is taken unless a taken neighbor excludes it or its type has
/// reached the mix maximum. Minimum counts are only checked afterwards.
#[derive(Debug, Clone, Copy)]
pub struct GreedySelector {
    goal: OptimizationGoal,
}

impl GreedySelector {
    /// Creates a selector for `goal`.
    pub fn new(goal: OptimizationGoal) -> Self {
        Self { goal }
    }

    /// Visiting order of the candidates.
    pub fn order(&self, candidates: &[Candidate], weights: &[f64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            weights[b].total_cmp(&weights[a]).then_with(|| match self.goal {
                OptimizationGoal::MaximizeTrucks => {
                    candidates[b].revenue.total_cmp(&candidates[a].revenue)
                }
                _ => Ordering::Equal,
            })
        });
        order
    }

    /// Runs the greedy pass.
    ///
    /// Returns [`SolveStatus::Feasible`], or [`SolveStatus::Infeasible`] with
    /// an empty selection when a minimum count is missed.
    pub fn select(
        &self,
        candidates: &[Candidate],
        weights: &[f64],
        conflicts: &ConflictGraph,
        mix: Option<&VehicleMix>,
    ) -> BackendOutcome {
        let mut excluded = vec![false; candidates.len()];
        self.pass(candidates, weights, mix, |i| {
            if excluded[i] {
                return false;
            }
            excluded[i] = true;
            for j in conflicts.neighbors(i) {
                excluded[j] = true;
            }
            true
        })
    }

    /// Runs the greedy pass without a conflict graph.
    ///
    /// Each visited candidate is tested against the spaces already taken,
    /// found through an R*-tree, so memory stays linear in the candidates.
    /// Selects exactly what [`GreedySelector::select`] selects on the graph
    /// built with the same `min_spacing`.
    pub fn select_spaced(
        &self,
        candidates: &[Candidate],
        weights: &[f64],
        min_spacing: f64,
        mix: Option<&VehicleMix>,
    ) -> BackendOutcome {
        let margin = min_spacing + EPS;
        let mut taken = SpatialIndex::new();
        self.pass(candidates, weights, mix, |i| {
            let rect = &candidates[i].rect;
            let blocked = taken
                .potential_neighbors(rect, margin)
                .into_iter()
                .any(|j| in_conflict(rect, &candidates[j].rect, min_spacing));
            if blocked {
                return false;
            }
            taken.insert(SpatialEntry::from_rect(i, rect));
            true
        })
    }

    /// Visits candidates in order; `take` accepts a candidate and records it.
    fn pass(
        &self,
        candidates: &[Candidate],
        weights: &[f64],
        mix: Option<&VehicleMix>,
        mut take: impl FnMut(usize) -> bool,
    ) -> BackendOutcome {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        let mut selected = Vec::new();

        for i in self.order(candidates, weights) {
            let ty = candidates[i].space_type.as_str();
            let count = counts.get(ty).copied().unwrap_or(0);
            if let Some(&(_, max)) = mix.and_then(|m| m.get(ty)) {
                if count >= max {
                    continue;
                }
            }
            if !take(i) {
                continue;
            }
            selected.push(i);
            counts.insert(ty, count + 1);
        }

        if let Some(mix) = mix {
            for (ty, &(min, _)) in mix {
                let count = counts.get(ty.as_str()).copied().unwrap_or(0);
                if count < min {
                    log::info!(
                        "Greedy selection placed {} {} spaces, {} required",
                        count,
                        ty,
                        min
                    );
                    return BackendOutcome::empty(SolveStatus::Infeasible);
                }
            }
        }

        selected.sort_unstable();
        let objective = selected.iter().map(|&i| weights[i]).sum();
        BackendOutcome {
            selected,
            status: SolveStatus::Feasible,
            objective,
        }
    }
}
