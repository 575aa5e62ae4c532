//! Depth-first branch and bound for binary programs.
//!
//! Variables are branched in descending weight order, include-branch first,
//! so the first dive is the greedy solution. A node is cut when
//!
//! - its weight plus the positive weight of every still-available variable
//!   cannot beat the incumbent, or
//! - some side constraint cannot be satisfied even if every available
//!   variable with a negative coefficient were still selected.
//!
//! Including a variable blocks its conflict neighbors; blocked variables are
//! skipped rather than branched on. All state changes are undone on the way
//! back up, so the search runs in a single mutable state without copying.

use std::time::{Duration, Instant};

use yardplan_core::status::SolveStatus;

use super::{BackendOutcome, BinaryProgram, ConstraintSolver};

/// Nodes visited between clock checks.
const CLOCK_INTERVAL: u64 = 1024;

const TOLERANCE: f64 = 1e-9;

/// Built-in exact solver; single search worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintSolver for BranchAndBoundSolver {
    fn name(&self) -> &'static str {
        "branch_and_bound"
    }

    fn solve(
        &self,
        program: &BinaryProgram<'_>,
        time_limit: Duration,
        on_incumbent: &mut dyn FnMut(usize),
    ) -> BackendOutcome {
        let start = Instant::now();
        let mut search = Search::new(program);
        let exhausted = search.run(start, time_limit, on_incumbent);

        log::debug!(
            "Branch and bound visited {} nodes in {:.2}s (exhausted: {})",
            search.nodes,
            start.elapsed().as_secs_f64(),
            exhausted
        );

        match (search.best, exhausted) {
            (Some((objective, mut selected)), exhausted) => {
                selected.sort_unstable();
                BackendOutcome {
                    selected,
                    status: if exhausted {
                        SolveStatus::Optimal
                    } else {
                        SolveStatus::Feasible
                    },
                    objective,
                }
            }
            (None, true) => BackendOutcome::empty(SolveStatus::Infeasible),
            (None, false) => BackendOutcome::empty(SolveStatus::Timeout),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Enter,
    Include,
    Exclude,
    Done,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    pos: usize,
    stage: Stage,
}

impl Frame {
    fn enter(pos: usize) -> Self {
        Self {
            pos,
            stage: Stage::Enter,
        }
    }
}

struct Search<'p, 'g> {
    program: &'p BinaryProgram<'g>,
    order: Vec<usize>,
    /// Constraint memberships per variable.
    var_terms: Vec<Vec<(usize, f64)>>,
    decided: Vec<bool>,
    /// Included neighbors per variable.
    blocked: Vec<u32>,
    included: Vec<usize>,
    weight: f64,
    /// Positive weight of the available variables.
    free_weight: f64,
    activity: Vec<f64>,
    /// Sum of negative coefficients over available variables, per constraint.
    neg_potential: Vec<f64>,
    best: Option<(f64, Vec<usize>)>,
    nodes: u64,
}

impl<'p, 'g> Search<'p, 'g> {
    fn new(program: &'p BinaryProgram<'g>) -> Self {
        let n = program.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            program.weights[b]
                .total_cmp(&program.weights[a])
                .then(a.cmp(&b))
        });

        let mut var_terms = vec![Vec::new(); n];
        let mut neg_potential = vec![0.0; program.constraints.len()];
        for (c, constraint) in program.constraints.iter().enumerate() {
            for &(v, coef) in &constraint.terms {
                if v < n {
                    var_terms[v].push((c, coef));
                    if coef < 0.0 {
                        neg_potential[c] += coef;
                    }
                }
            }
        }

        Self {
            program,
            order,
            var_terms,
            decided: vec![false; n],
            blocked: vec![0; n],
            included: Vec::new(),
            weight: 0.0,
            free_weight: program.weights.iter().map(|w| w.max(0.0)).sum(),
            activity: vec![0.0; program.constraints.len()],
            neg_potential,
            best: None,
            nodes: 0,
        }
    }

    fn is_available(&self, v: usize) -> bool {
        !self.decided[v] && self.blocked[v] == 0
    }

    fn set_available(&mut self, v: usize, available: bool) {
        let sign = if available { 1.0 } else { -1.0 };
        self.free_weight += sign * self.program.weights[v].max(0.0);
        for &(c, coef) in &self.var_terms[v] {
            if coef < 0.0 {
                self.neg_potential[c] += sign * coef;
            }
        }
    }

    fn include(&mut self, v: usize) {
        self.set_available(v, false);
        self.decided[v] = true;
        self.weight += self.program.weights[v];
        for &(c, coef) in &self.var_terms[v] {
            self.activity[c] += coef;
        }
        let program = self.program;
        for u in program.conflicts.neighbors(v) {
            if self.is_available(u) {
                self.set_available(u, false);
            }
            self.blocked[u] += 1;
        }
        self.included.push(v);
    }

    fn undo_include(&mut self, v: usize) {
        self.included.pop();
        let program = self.program;
        for u in program.conflicts.neighbors(v) {
            self.blocked[u] -= 1;
            if self.is_available(u) {
                self.set_available(u, true);
            }
        }
        for &(c, coef) in &self.var_terms[v] {
            self.activity[c] -= coef;
        }
        self.weight -= self.program.weights[v];
        self.decided[v] = false;
        self.set_available(v, true);
    }

    fn exclude(&mut self, v: usize) {
        self.set_available(v, false);
        self.decided[v] = true;
    }

    fn undo_exclude(&mut self, v: usize) {
        self.decided[v] = false;
        self.set_available(v, true);
    }

    fn next_available(&self, from: usize) -> Option<usize> {
        (from..self.order.len()).find(|&p| self.is_available(self.order[p]))
    }

    fn can_improve(&self) -> bool {
        match &self.best {
            Some((best, _)) => self.weight + self.free_weight > best + TOLERANCE,
            None => true,
        }
    }

    fn can_satisfy(&self) -> bool {
        self.program
            .constraints
            .iter()
            .enumerate()
            .all(|(c, constraint)| {
                self.activity[c] + self.neg_potential[c] <= constraint.upper + TOLERANCE
            })
    }

    fn at_leaf(&mut self, on_incumbent: &mut dyn FnMut(usize)) {
        let feasible = self
            .program
            .constraints
            .iter()
            .enumerate()
            .all(|(c, constraint)| self.activity[c] <= constraint.upper + TOLERANCE);
        let improves = self
            .best
            .as_ref()
            .map_or(true, |(best, _)| self.weight > best + TOLERANCE);
        if feasible && improves {
            self.best = Some((self.weight, self.included.clone()));
            on_incumbent(self.included.len());
        }
    }

    /// Runs the search; returns true if the tree was exhausted.
    fn run(
        &mut self,
        start: Instant,
        limit: Duration,
        on_incumbent: &mut dyn FnMut(usize),
    ) -> bool {
        let mut stack = vec![Frame::enter(0)];
        while let Some(&Frame { pos, stage }) = stack.last() {
            let top = stack.len() - 1;
            match stage {
                Stage::Enter => {
                    self.nodes += 1;
                    if self.nodes % CLOCK_INTERVAL == 0 && start.elapsed() >= limit {
                        return false;
                    }
                    if !self.can_improve() || !self.can_satisfy() {
                        stack.pop();
                        continue;
                    }
                    match self.next_available(pos) {
                        Some(p) => {
                            stack[top] = Frame {
                                pos: p,
                                stage: Stage::Include,
                            };
                        }
                        None => {
                            self.at_leaf(on_incumbent);
                            stack.pop();
                        }
                    }
                }
                Stage::Include => {
                    self.include(self.order[pos]);
                    stack[top].stage = Stage::Exclude;
                    stack.push(Frame::enter(pos + 1));
                }
                Stage::Exclude => {
                    let v = self.order[pos];
                    self.undo_include(v);
                    self.exclude(v);
                    stack[top].stage = Stage::Done;
                    stack.push(Frame::enter(pos + 1));
                }
                Stage::Done => {
                    self.undo_exclude(self.order[pos]);
                    stack.pop();
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictGraph;
    use crate::selection::{LinearConstraint, VehicleMix};
    use crate::selection::tests::row;

    fn solve(program: &BinaryProgram<'_>) -> (BackendOutcome, Vec<usize>) {
        let mut incumbents = Vec::new();
        let outcome = BranchAndBoundSolver::new().solve(program, Duration::from_secs(10), &mut |n| {
            incumbents.push(n)
        });
        (outcome, incumbents)
    }

    #[test]
    fn test_path_graph_optimum() {
        // Path 0-1-2-3: the heaviest vertex 1 is not in the optimum {0, 2}
        let graph = ConflictGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let program = BinaryProgram::new(vec![3.0, 4.0, 3.0, 1.0], &graph);
        let (outcome, incumbents) = solve(&program);

        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.selected, vec![0, 2]);
        assert_eq!(outcome.objective, 6.0);
        assert!(!incumbents.is_empty());
    }

    #[test]
    fn test_beats_greedy() {
        // Star: the heavy center blocks three leaves that together weigh more
        let graph = ConflictGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]);
        let program = BinaryProgram::new(vec![5.0, 2.0, 2.0, 2.0], &graph);
        let (outcome, incumbents) = solve(&program);

        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.selected, vec![1, 2, 3]);
        assert_eq!(incumbents, vec![1, 3]);
    }

    #[test]
    fn test_minimum_count_forces_low_weight() {
        let candidates = row(&["van", "truck", "van", "van"]);
        let graph = ConflictGraph::build(&candidates, 1.0);
        let weights = vec![1.0, 0.5, 1.0, 1.0];
        let mut mix = VehicleMix::new();
        mix.insert("truck".to_string(), (1, 1));
        let program = BinaryProgram::new(weights, &graph).with_mix(&candidates, &mix);

        let (outcome, _) = solve(&program);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert!(outcome.selected.contains(&1));
        assert!(program.is_feasible(&outcome.selected));
    }

    #[test]
    fn test_infeasible_program() {
        let graph = ConflictGraph::from_edges(2, &[(0, 1)]);
        let program = BinaryProgram::new(vec![1.0, 1.0], &graph).with_constraint(
            LinearConstraint::new(vec![(0, -1.0), (1, -1.0)], -2.0, "both"),
        );
        let (outcome, incumbents) = solve(&program);
        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert!(outcome.selected.is_empty());
        assert!(incumbents.is_empty());
    }

    #[test]
    fn test_empty_program() {
        let graph = ConflictGraph::default();
        let program = BinaryProgram::new(Vec::new(), &graph);
        let (outcome, _) = solve(&program);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert!(outcome.selected.is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        let candidates = row(&["van"; 12]);
        let graph = ConflictGraph::build(&candidates, 1.0);
        let weights: Vec<f64> = (0..12).map(|i| 1.0 + ((i * 7) % 5) as f64).collect();
        let program = BinaryProgram::new(weights.clone(), &graph);

        let mut best = 0.0_f64;
        for mask in 0u32..(1 << 12) {
            let set: Vec<usize> = (0..12).filter(|i| mask & (1 << i) != 0).collect();
            if graph.is_independent(&set) {
                best = best.max(program.objective(&set));
            }
        }
        let (outcome, _) = solve(&program);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert!((outcome.objective - best).abs() < 1e-9);
    }
}
