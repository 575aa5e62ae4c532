//! Constrained candidate selection.
//!
//! Selection is a maximum-weight independent set over the conflict graph with
//! per-type count bounds. It is expressed as a [`BinaryProgram`] (one boolean
//! variable per candidate, linear `<=` constraints, linear objective) and
//! handed to a [`ConstraintSolver`] backend:
//!
//! - [`BranchAndBoundSolver`]: built-in depth-first branch and bound
//! - `MilpSolver`: HiGHS through `good_lp` (with the `milp` feature)
//!
//! [`GreedySelector`] implements the same contract without the program
//! abstraction and never backtracks.

mod bnb;
mod greedy;
#[cfg(feature = "milp")]
mod milp;

pub use bnb::BranchAndBoundSolver;
pub use greedy::GreedySelector;
#[cfg(feature = "milp")]
pub use milp::MilpSolver;

use std::collections::BTreeMap;
use std::time::Duration;

use yardplan_core::config::SolverBackend;
use yardplan_core::goal::OptimizationGoal;
use yardplan_core::progress::{ProgressEvent, ProgressSink};
use yardplan_core::status::SolveStatus;
use yardplan_core::vehicle::VehicleCatalog;

use crate::candidate::Candidate;
use crate::conflict::ConflictGraph;

/// Per-type `(min, max)` count bounds.
pub type VehicleMix = BTreeMap<String, (u32, u32)>;

/// Checks a vehicle mix against the catalog.
///
/// Returns one message per problem; an empty list means the mix is valid.
pub fn validate_mix(mix: &VehicleMix, catalog: &VehicleCatalog) -> Vec<String> {
    let mut errors = Vec::new();
    for (key, &(min, max)) in mix {
        if !catalog.contains(key) {
            errors.push(format!("Unknown vehicle type in mix: {}", key));
        }
        if min > max {
            errors.push(format!(
                "Vehicle mix for {} has min > max ({} > {})",
                key, min, max
            ));
        }
    }
    errors
}

/// `Σ coef · x ≤ upper` over boolean variables.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// `(variable, coefficient)` pairs.
    pub terms: Vec<(usize, f64)>,
    /// Right-hand side.
    pub upper: f64,
    /// Name used in logs.
    pub label: String,
}

impl LinearConstraint {
    /// Creates a constraint.
    pub fn new(terms: Vec<(usize, f64)>, upper: f64, label: impl Into<String>) -> Self {
        Self {
            terms,
            upper,
            label: label.into(),
        }
    }

    /// Left-hand side for a selection given as a membership mask.
    pub fn activity(&self, selected: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| selected.get(*v).copied().unwrap_or(false))
            .map(|(_, c)| c)
            .sum()
    }
}

/// Boolean maximization problem over candidates.
///
/// Conflict edges are kept as a graph rather than expanded into pairwise
/// constraints; every edge `(i, j)` means `x_i + x_j ≤ 1`.
#[derive(Debug, Clone)]
pub struct BinaryProgram<'g> {
    /// Objective coefficient per variable.
    pub weights: Vec<f64>,
    /// Pairwise exclusions.
    pub conflicts: &'g ConflictGraph,
    /// Additional linear constraints.
    pub constraints: Vec<LinearConstraint>,
}

impl<'g> BinaryProgram<'g> {
    /// Creates a program with no side constraints.
    pub fn new(weights: Vec<f64>, conflicts: &'g ConflictGraph) -> Self {
        Self {
            weights,
            conflicts,
            constraints: Vec::new(),
        }
    }

    /// Adds a constraint.
    pub fn with_constraint(mut self, constraint: LinearConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds `min ≤ count(type) ≤ max` for each type of the mix.
    pub fn with_mix(mut self, candidates: &[Candidate], mix: &VehicleMix) -> Self {
        for (key, &(min, max)) in mix {
            let vars: Vec<usize> = candidates
                .iter()
                .filter(|c| &c.space_type == key)
                .map(|c| c.id)
                .collect();
            if min > 0 {
                self.constraints.push(LinearConstraint::new(
                    vars.iter().map(|&v| (v, -1.0)).collect(),
                    -f64::from(min),
                    format!("min_{}", key),
                ));
            }
            if (max as usize) < vars.len() {
                self.constraints.push(LinearConstraint::new(
                    vars.iter().map(|&v| (v, 1.0)).collect(),
                    f64::from(max),
                    format!("max_{}", key),
                ));
            }
        }
        self
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns true if there are no variables.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Objective value of a selection.
    pub fn objective(&self, selected: &[usize]) -> f64 {
        selected.iter().filter_map(|&v| self.weights.get(v)).sum()
    }

    /// Returns true if the selection satisfies every conflict and constraint.
    pub fn is_feasible(&self, selected: &[usize]) -> bool {
        if !self.conflicts.is_independent(selected) {
            return false;
        }
        let mut mask = vec![false; self.len()];
        for &v in selected {
            match mask.get_mut(v) {
                Some(slot) => *slot = true,
                None => return false,
            }
        }
        self.constraints
            .iter()
            .all(|c| c.activity(&mask) <= c.upper + 1e-9)
    }
}

/// Raw outcome of a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendOutcome {
    /// Selected variables, ascending.
    pub selected: Vec<usize>,
    /// Canonical status.
    pub status: SolveStatus,
    /// Objective value of the selection.
    pub objective: f64,
}

impl BackendOutcome {
    /// Outcome with nothing selected.
    pub fn empty(status: SolveStatus) -> Self {
        Self {
            selected: Vec::new(),
            status,
            objective: 0.0,
        }
    }
}

/// A solver for [`BinaryProgram`]s.
pub trait ConstraintSolver {
    /// Short backend name for logs and results.
    fn name(&self) -> &'static str;

    /// Solves within `time_limit`.
    ///
    /// `on_incumbent` receives the selected count of every improving
    /// solution, in the order they are found.
    fn solve(
        &self,
        program: &BinaryProgram<'_>,
        time_limit: Duration,
        on_incumbent: &mut dyn FnMut(usize),
    ) -> BackendOutcome;
}

/// Final selection handed back to the optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Selected candidate ids, ascending.
    pub selected: Vec<usize>,
    /// Canonical status.
    pub status: SolveStatus,
    /// Backend that produced the selection.
    pub backend: &'static str,
    /// Objective value.
    pub objective: f64,
    /// Notes about the solve, in order.
    pub warnings: Vec<String>,
}

/// Front end that dispatches to the configured backend.
#[derive(Debug, Clone, Copy)]
pub struct SelectionSolver {
    goal: OptimizationGoal,
    backend: SolverBackend,
}

impl SelectionSolver {
    /// Creates a solver for `goal` using `backend`.
    pub fn new(goal: OptimizationGoal, backend: SolverBackend) -> Self {
        Self { goal, backend }
    }

    /// Objective weight of every candidate.
    pub fn weights(&self, candidates: &[Candidate], catalog: &VehicleCatalog) -> Vec<f64> {
        candidates
            .iter()
            .map(|c| {
                catalog
                    .get(&c.space_type)
                    .map_or(c.revenue, |spec| self.goal.weight(spec, c.revenue))
            })
            .collect()
    }

    /// Selects a conflict-free subset of `candidates` honoring `mix`.
    pub fn select(
        &self,
        candidates: &[Candidate],
        conflicts: &ConflictGraph,
        catalog: &VehicleCatalog,
        mix: Option<&VehicleMix>,
        time_limit: Duration,
        progress: &mut dyn ProgressSink,
    ) -> Selection {
        if let Some(rejected) = precheck(candidates, mix) {
            return rejected;
        }

        let mut warnings = Vec::new();
        let weights = self.weights(candidates, catalog);
        let mut on_incumbent = |selected: usize| {
            progress.report(&ProgressEvent::IncumbentFound { selected });
        };

        let (backend, mut outcome) = match self.resolve_backend(&mut warnings) {
            SolverBackend::Greedy => {
                let greedy = GreedySelector::new(self.goal);
                let outcome = greedy.select(candidates, &weights, conflicts, mix);
                if outcome.status.is_success() {
                    on_incumbent(outcome.selected.len());
                }
                ("greedy", outcome)
            }
            backend => {
                let mut program = BinaryProgram::new(weights, conflicts);
                if let Some(mix) = mix {
                    program = program.with_mix(candidates, mix);
                }
                let solver = constraint_solver(backend);
                log::info!(
                    "Solving {} variables, {} conflicts, {} side constraints with {}",
                    program.len(),
                    conflicts.edge_count(),
                    program.constraints.len(),
                    solver.name()
                );
                (
                    solver.name(),
                    solver.solve(&program, time_limit, &mut on_incumbent),
                )
            }
        };

        outcome.selected.sort_unstable();
        log::info!(
            "Selection by {}: {} with {} spaces (objective {:.2})",
            backend,
            outcome.status,
            outcome.selected.len(),
            outcome.objective
        );
        Selection {
            selected: outcome.selected,
            status: outcome.status,
            backend,
            objective: outcome.objective,
            warnings,
        }
    }

    /// Greedy selection that checks spacing directly instead of through a
    /// conflict graph.
    ///
    /// Used when the graph is too large to build within the time budget.
    pub fn select_spaced(
        &self,
        candidates: &[Candidate],
        min_spacing: f64,
        catalog: &VehicleCatalog,
        mix: Option<&VehicleMix>,
        progress: &mut dyn ProgressSink,
    ) -> Selection {
        if let Some(rejected) = precheck(candidates, mix) {
            return rejected;
        }
        let weights = self.weights(candidates, catalog);
        let mut outcome =
            GreedySelector::new(self.goal).select_spaced(candidates, &weights, min_spacing, mix);
        if outcome.status.is_success() {
            progress.report(&ProgressEvent::IncumbentFound {
                selected: outcome.selected.len(),
            });
        }
        outcome.selected.sort_unstable();
        log::info!(
            "Selection by spaced greedy: {} with {} spaces (objective {:.2})",
            outcome.status,
            outcome.selected.len(),
            outcome.objective
        );
        Selection {
            selected: outcome.selected,
            status: outcome.status,
            backend: "greedy",
            objective: outcome.objective,
            warnings: Vec::new(),
        }
    }

    fn resolve_backend(&self, warnings: &mut Vec<String>) -> SolverBackend {
        match self.backend {
            SolverBackend::Auto if cfg!(feature = "milp") => SolverBackend::Milp,
            SolverBackend::Auto => SolverBackend::BranchAndBound,
            SolverBackend::Milp if !cfg!(feature = "milp") => {
                log::warn!("MILP solver not available (compile with 'milp' feature)");
                warnings.push(
                    "MILP solver not available, fell back to greedy selection".to_string(),
                );
                SolverBackend::Greedy
            }
            other => other,
        }
    }
}

/// Rejects a mix whose minimum names a type without candidates.
fn precheck(candidates: &[Candidate], mix: Option<&VehicleMix>) -> Option<Selection> {
    let mix = mix?;
    let mut warnings = Vec::new();
    for (key, &(min, _)) in mix {
        if min > 0 && !candidates.iter().any(|c| &c.space_type == key) {
            warnings.push(format!(
                "No candidates for vehicle type {} (minimum {} required)",
                key, min
            ));
        }
    }
    if warnings.is_empty() {
        return None;
    }
    Some(Selection {
        selected: Vec::new(),
        status: SolveStatus::Infeasible,
        backend: "precheck",
        objective: 0.0,
        warnings,
    })
}

fn constraint_solver(backend: SolverBackend) -> Box<dyn ConstraintSolver> {
    match backend {
        #[cfg(feature = "milp")]
        SolverBackend::Milp => Box::new(MilpSolver::new()),
        _ => Box::new(BranchAndBoundSolver::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yardplan_core::geometry::OrientedRect;
    use yardplan_core::progress::NoProgress;

    pub(super) fn row(types: &[&str]) -> Vec<Candidate> {
        // Upright footprints 2.0 apart: each conflicts with the next two
        types
            .iter()
            .enumerate()
            .map(|(i, t)| Candidate {
                id: i,
                space_type: t.to_string(),
                type_index: 0,
                rect: OrientedRect::new(i as f64 * 2.0, 0.0, 7.0, 3.0).with_rotation(90.0),
                revenue: if *t == "truck" { 100.0 } else { 10.0 },
            })
            .collect()
    }

    #[test]
    fn test_validate_mix() {
        let catalog = VehicleCatalog::default();
        let mut mix = VehicleMix::new();
        mix.insert("truck".to_string(), (5, 3));
        mix.insert("hovercraft".to_string(), (0, 1));
        let errors = validate_mix(&mix, &catalog);
        assert_eq!(
            errors,
            vec![
                "Unknown vehicle type in mix: hovercraft".to_string(),
                "Vehicle mix for truck has min > max (5 > 3)".to_string(),
            ]
        );

        let mut ok = VehicleMix::new();
        ok.insert("van".to_string(), (0, 4));
        assert!(validate_mix(&ok, &catalog).is_empty());
    }

    #[test]
    fn test_program_mix_constraints() {
        let candidates = row(&["van", "truck", "van", "truck"]);
        let graph = ConflictGraph::from_edges(4, &[]);
        let mut mix = VehicleMix::new();
        mix.insert("truck".to_string(), (1, 1));
        mix.insert("van".to_string(), (0, 5));

        let program = BinaryProgram::new(vec![1.0; 4], &graph).with_mix(&candidates, &mix);
        // van max is slack, so only the two truck bounds remain
        assert_eq!(program.constraints.len(), 2);
        assert!(program.is_feasible(&[0, 1, 2]));
        assert!(!program.is_feasible(&[0, 2]));
        assert!(!program.is_feasible(&[1, 3]));
        assert_eq!(program.objective(&[0, 1]), 2.0);
    }

    #[test]
    fn test_precheck_missing_type() {
        let candidates = row(&["van", "van"]);
        let graph = ConflictGraph::build(&candidates, 1.0);
        let mut mix = VehicleMix::new();
        mix.insert("truck".to_string(), (1, 3));

        let selection = SelectionSolver::new(OptimizationGoal::MaximizeCount, SolverBackend::Auto)
            .select(
                &candidates,
                &graph,
                &VehicleCatalog::default(),
                Some(&mix),
                Duration::from_secs(1),
                &mut NoProgress,
            );
        assert_eq!(selection.status, SolveStatus::Infeasible);
        assert!(selection.selected.is_empty());
        assert_eq!(selection.warnings.len(), 1);
    }

    #[test]
    fn test_backends_agree_on_small_row() {
        let candidates = row(&["van"; 7]);
        let graph = ConflictGraph::build(&candidates, 1.0);
        let catalog = VehicleCatalog::default();

        for backend in [SolverBackend::Greedy, SolverBackend::BranchAndBound] {
            let mut incumbents = Vec::new();
            let mut sink = |e: &ProgressEvent| {
                if let ProgressEvent::IncumbentFound { selected } = e {
                    incumbents.push(*selected);
                }
            };
            let selection = SelectionSolver::new(OptimizationGoal::MaximizeCount, backend).select(
                &candidates,
                &graph,
                &catalog,
                None,
                Duration::from_secs(5),
                &mut sink,
            );
            assert!(selection.status.is_success());
            assert!(graph.is_independent(&selection.selected));
            assert!(!incumbents.is_empty());
            assert_eq!(*incumbents.last().unwrap(), selection.selected.len());
        }
    }

    #[test]
    fn test_trucks_goal_weights() {
        let candidates = row(&["van", "truck", "ev"]);
        let solver = SelectionSolver::new(OptimizationGoal::MaximizeTrucks, SolverBackend::Greedy);
        assert_eq!(
            solver.weights(&candidates, &VehicleCatalog::default()),
            vec![2.0, 10.0, 9.0]
        );
    }
}
