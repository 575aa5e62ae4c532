//! HiGHS backend via `good_lp`.
//!
//! Every candidate becomes a binary variable, every conflict edge the
//! constraint `x_i + x_j <= 1`, and every side constraint is copied as is.
//! HiGHS runs single-threaded under the given time limit.

use std::time::{Duration, Instant};

use good_lp::{
    constraint, highs, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use yardplan_core::status::SolveStatus;

use super::{BackendOutcome, BinaryProgram, ConstraintSolver};

/// Mixed-integer backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilpSolver;

impl MilpSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintSolver for MilpSolver {
    fn name(&self) -> &'static str {
        "milp"
    }

    fn solve(
        &self,
        program: &BinaryProgram<'_>,
        time_limit: Duration,
        on_incumbent: &mut dyn FnMut(usize),
    ) -> BackendOutcome {
        let start = Instant::now();
        let limit = time_limit.as_secs_f64().max(1.0);

        let mut vars = ProblemVariables::new();
        let x: Vec<Variable> = (0..program.len())
            .map(|i| vars.add(variable().binary().name(format!("x_{}", i))))
            .collect();

        let objective: Expression = program
            .weights
            .iter()
            .zip(&x)
            .map(|(&w, &v)| w * v)
            .sum();

        let mut problem = vars
            .maximise(objective)
            .using(highs)
            .set_option("time_limit", limit)
            .set_option("threads", 1);

        for (i, j) in program.conflicts.edges() {
            problem = problem.with(constraint!(x[i] + x[j] <= 1.0));
        }
        for c in &program.constraints {
            let lhs: Expression = c
                .terms
                .iter()
                .filter(|(v, _)| *v < x.len())
                .map(|&(v, coef)| coef * x[v])
                .sum();
            let upper = c.upper;
            problem = problem.with(constraint!(lhs <= upper));
        }

        log::info!(
            "Solving MILP with {} variables, {} conflicts, {} side constraints",
            x.len(),
            program.conflicts.edge_count(),
            program.constraints.len()
        );

        let timed_out = |start: Instant| start.elapsed().as_secs_f64() >= limit * 0.99;
        match problem.solve() {
            Ok(solution) => {
                let selected: Vec<usize> = x
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| solution.value(**v) > 0.5)
                    .map(|(i, _)| i)
                    .collect();
                // A time-limited run hands back its best incumbent
                let status = if timed_out(start) {
                    SolveStatus::Feasible
                } else {
                    SolveStatus::Optimal
                };
                if !program.is_feasible(&selected) {
                    log::error!("MILP returned a selection that violates the model");
                    return BackendOutcome::empty(SolveStatus::Invalid);
                }
                on_incumbent(selected.len());
                BackendOutcome {
                    objective: program.objective(&selected),
                    selected,
                    status,
                }
            }
            Err(ResolutionError::Infeasible) => BackendOutcome::empty(SolveStatus::Infeasible),
            Err(e) => {
                if timed_out(start) {
                    log::warn!("MILP stopped at the time limit without a solution: {:?}", e);
                    BackendOutcome::empty(SolveStatus::Timeout)
                } else {
                    log::error!("MILP solver error: {:?}", e);
                    BackendOutcome::empty(SolveStatus::Invalid)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictGraph;

    #[test]
    fn test_milp_star() {
        let graph = ConflictGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]);
        let program = BinaryProgram::new(vec![5.0, 2.0, 2.0, 2.0], &graph);
        let mut seen = Vec::new();
        let outcome =
            MilpSolver::new().solve(&program, Duration::from_secs(5), &mut |n| seen.push(n));

        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.selected, vec![1, 2, 3]);
        assert_eq!(seen, vec![3]);
    }
}
