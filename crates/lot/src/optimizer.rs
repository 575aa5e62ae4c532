//! Layout optimization entry point.
//!
//! [`LotOptimizer`] runs the full pipeline for one [`OptimizationRequest`]:
//!
//! 1. validate the boundary, entry/exit points and vehicle mix
//! 2. carve the access lane and collect parking zones
//! 3. generate candidate placements
//! 4. build the conflict graph
//! 5. select a conflict-free subset within the remaining time budget
//! 6. materialize the selection as a [`Layout`]
//!
//! Only call-contract violations (fewer than three boundary points,
//! non-finite coordinates) are returned as errors. Everything else ends up in
//! the status and warnings of the [`OptimizationResult`].
//!
//! # Example
//!
//! ```rust,no_run
//! use yardplan_core::{OptimizationGoal, PlannerConfig};
//! use yardplan_lot::optimizer::{LotOptimizer, OptimizationRequest};
//!
//! let request = OptimizationRequest::new(
//!     vec![(0.0, 0.0), (50.0, 0.0), (50.0, 100.0), (0.0, 100.0)],
//!     (25.0, 0.0),
//! )
//! .with_exit((25.0, 100.0))
//! .with_goal(OptimizationGoal::MaximizeCount)
//! .with_time_limit(5.0);
//!
//! let result = LotOptimizer::new(PlannerConfig::default()).optimize(&request).unwrap();
//! println!("{}: {} spaces", result.status, result.space_count());
//! ```

use std::time::{Duration, Instant};

use yardplan_core::config::PlannerConfig;
use yardplan_core::geometry::Point;
use yardplan_core::goal::OptimizationGoal;
use yardplan_core::layout::{LaneType, Layout};
use yardplan_core::progress::{NoProgress, ProgressEvent, ProgressSink};
use yardplan_core::result::{OptimizationResult, OptimizationStats};
use yardplan_core::status::SolveStatus;
use yardplan_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::boundary::LotBoundary;
use crate::candidate::{CandidateGenerator, DEFAULT_ROTATIONS};
use crate::conflict::ConflictGraph;
use crate::lane::{LaneCarveResult, LaneCarver, LaneConfig};
use crate::selection::{validate_mix, SelectionSolver, VehicleMix};

/// Default wall-clock budget in seconds.
pub const DEFAULT_TIME_LIMIT: f64 = 60.0;

/// Floor of the solver budget after upstream stages, in seconds.
const MIN_SOLVER_SECONDS: f64 = 1.0;

const MAX_SOLVER_SECONDS: f64 = 86_400.0;

/// Share of the time limit by which candidate generation must stop.
const GENERATION_SHARE: f64 = 0.4;

/// Share of the time limit by which the conflict graph must be complete.
const CONFLICT_SHARE: f64 = 0.6;

/// How the access lane is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LaneStrategy {
    /// A single lane from entry to exit.
    #[default]
    Direct,
    /// A lane ring along the inside of the boundary.
    Perimeter,
}

/// Input of one optimization call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizationRequest {
    /// Name of the produced layout.
    #[cfg_attr(feature = "serde", serde(default = "default_name"))]
    pub name: String,
    /// Lot boundary ring.
    pub boundary: Vec<Point>,
    /// Lane entry point.
    pub entry: Point,
    /// Lane exit point; derived on the far side of the lot when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub exit: Option<Point>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub goal: OptimizationGoal,
    #[cfg_attr(feature = "serde", serde(default))]
    pub lane_type: LaneType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub lane_strategy: LaneStrategy,
    /// Allowed rotations in degrees.
    #[cfg_attr(feature = "serde", serde(default = "default_rotations"))]
    pub rotations: Vec<f64>,
    /// Wall-clock budget in seconds.
    #[cfg_attr(feature = "serde", serde(default = "default_time_limit"))]
    pub time_limit: f64,
    /// Per-type count bounds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vehicle_mix: Option<VehicleMix>,
}

#[cfg(feature = "serde")]
fn default_name() -> String {
    "Optimized Layout".to_string()
}

#[cfg(feature = "serde")]
fn default_rotations() -> Vec<f64> {
    DEFAULT_ROTATIONS.to_vec()
}

#[cfg(feature = "serde")]
fn default_time_limit() -> f64 {
    DEFAULT_TIME_LIMIT
}

impl OptimizationRequest {
    /// Creates a request with default goal, lane and budget.
    pub fn new(boundary: Vec<Point>, entry: Point) -> Self {
        Self {
            name: "Optimized Layout".to_string(),
            boundary,
            entry,
            exit: None,
            goal: OptimizationGoal::default(),
            lane_type: LaneType::default(),
            lane_strategy: LaneStrategy::default(),
            rotations: DEFAULT_ROTATIONS.to_vec(),
            time_limit: DEFAULT_TIME_LIMIT,
            vehicle_mix: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_exit(mut self, exit: Point) -> Self {
        self.exit = Some(exit);
        self
    }

    pub fn with_goal(mut self, goal: OptimizationGoal) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_lane_type(mut self, lane_type: LaneType) -> Self {
        self.lane_type = lane_type;
        self
    }

    pub fn with_lane_strategy(mut self, strategy: LaneStrategy) -> Self {
        self.lane_strategy = strategy;
        self
    }

    pub fn with_rotations(mut self, rotations: Vec<f64>) -> Self {
        self.rotations = rotations;
        self
    }

    /// Sets the wall-clock budget in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = seconds;
        self
    }

    pub fn with_vehicle_mix(mut self, mix: VehicleMix) -> Self {
        self.vehicle_mix = Some(mix);
        self
    }

    /// Adds a `(min, max)` bound for one type.
    pub fn with_mix_bound(mut self, space_type: impl Into<String>, min: u32, max: u32) -> Self {
        self.vehicle_mix
            .get_or_insert_with(VehicleMix::new)
            .insert(space_type.into(), (min, max));
        self
    }

    /// Parses a request from JSON.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Runs the placement pipeline.
#[derive(Debug, Clone, Default)]
pub struct LotOptimizer {
    config: PlannerConfig,
}

impl LotOptimizer {
    /// Creates an optimizer with `config`.
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Optimizes without progress reporting.
    pub fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResult> {
        self.optimize_with_progress(request, &mut NoProgress)
    }

    /// Optimizes, reporting milestones to `progress`.
    pub fn optimize_with_progress(
        &self,
        request: &OptimizationRequest,
        progress: &mut dyn ProgressSink,
    ) -> Result<OptimizationResult> {
        let start = Instant::now();
        let boundary = validate_request(request)?;
        let config = &self.config;

        if let Some(mix) = &request.vehicle_mix {
            let errors = validate_mix(mix, &config.catalog);
            if !errors.is_empty() {
                log::warn!("Rejected vehicle mix: {}", errors.join("; "));
                let mut result = OptimizationResult::new(
                    Layout::new(request.name.as_str()),
                    SolveStatus::Invalid,
                );
                result.warnings = errors;
                return Ok(result);
            }
        }

        let mut layout =
            Layout::new(request.name.as_str()).with_boundary(boundary.points().to_vec());
        let mut stats = OptimizationStats {
            lot_area: boundary.area(),
            ..OptimizationStats::default()
        };

        progress.report(&ProgressEvent::LaneGenerationStarted);
        let carved = self.carve(&boundary, request);
        if !carved.success {
            let mut result = OptimizationResult::new(layout, SolveStatus::Infeasible)
                .with_warning(format!(
                    "Failed to generate lanes: {}",
                    carved.warnings.join("; ")
                ));
            result.stats = stats;
            result.solve_time = start.elapsed().as_secs_f64();
            return Ok(result);
        }
        stats.lane_area = carved.lane_area();
        stats.parking_area = carved.parking_area();
        if let Some(lane) = &carved.lane {
            layout.lanes.push(lane.clone());
        }
        let mut warnings = carved.warnings.clone();

        let generator =
            CandidateGenerator::new(config, &request.rotations, request.vehicle_mix.as_ref());
        let (candidates, complete) = generator.generate_until(
            &carved.parking_zones,
            carved.lane_path(),
            &boundary,
            Some(start + stage_budget(request.time_limit, GENERATION_SHARE)),
        );
        if !complete {
            warnings.push(
                "Candidate generation reached its time budget; the grid was only partly scanned"
                    .to_string(),
            );
        }
        stats.candidate_count = candidates.len();
        progress.report(&ProgressEvent::CandidatesGenerated {
            count: candidates.len(),
        });
        if candidates.is_empty() {
            warnings.push("No valid candidate placements found".to_string());
            let mut result = OptimizationResult::new(layout, SolveStatus::Infeasible);
            result.warnings = warnings;
            result.stats = stats;
            result.solve_time = start.elapsed().as_secs_f64();
            return Ok(result);
        }

        let min_spacing = config.compliance.min_vehicle_spacing;
        let solver = SelectionSolver::new(request.goal, config.backend);
        let built = ConflictGraph::build_within(
            &candidates,
            min_spacing,
            start + stage_budget(request.time_limit, CONFLICT_SHARE),
            config.max_conflict_edges,
        );
        let selection = match built {
            Some(conflicts) => {
                stats.conflict_count = conflicts.edge_count();
                progress.report(&ProgressEvent::ConflictsBuilt {
                    count: conflicts.edge_count(),
                });
                let budget = solver_budget(request.time_limit, start.elapsed());
                solver.select(
                    &candidates,
                    &conflicts,
                    &config.catalog,
                    request.vehicle_mix.as_ref(),
                    budget,
                    progress,
                )
            }
            None => {
                progress.report(&ProgressEvent::ConflictsBuilt { count: 0 });
                warnings.push(
                    "Conflict graph exceeded its time or memory budget; spaces were selected greedily"
                        .to_string(),
                );
                solver.select_spaced(
                    &candidates,
                    min_spacing,
                    &config.catalog,
                    request.vehicle_mix.as_ref(),
                    progress,
                )
            }
        };
        warnings.extend(selection.warnings.iter().cloned());

        for (k, &i) in selection.selected.iter().enumerate() {
            let candidate = &candidates[i];
            let prefix = config.catalog.label_prefix(&candidate.space_type);
            layout.add_space(candidate.to_space(k as u32 + 1, prefix));
        }
        layout.renumber(&config.catalog);

        stats.selected_count = selection.selected.len();
        stats.total_revenue = selection.selected.iter().map(|&i| candidates[i].revenue).sum();
        stats.space_counts = layout.count_by_type();

        let mut result = OptimizationResult::new(layout, selection.status);
        result.warnings = warnings;
        result.stats = stats;
        result.solve_time = start.elapsed().as_secs_f64();
        log::info!(
            "Optimization of {} finished: {} with {} spaces in {:.2}s",
            request.name,
            result.status,
            result.space_count(),
            result.solve_time
        );
        Ok(result)
    }

    fn carve(&self, boundary: &LotBoundary, request: &OptimizationRequest) -> LaneCarveResult {
        let carver = LaneCarver::new(&self.config);
        let lane_config = LaneConfig::new(request.lane_type, &self.config.compliance);
        match request.lane_strategy {
            LaneStrategy::Direct => carver.carve(boundary, request.entry, request.exit, &lane_config),
            LaneStrategy::Perimeter => {
                carver.carve_perimeter(boundary, request.entry, request.exit, &lane_config)
            }
        }
    }
}

/// Checks the call contract and builds the boundary.
fn validate_request(request: &OptimizationRequest) -> Result<LotBoundary> {
    if request.boundary.len() < 3 {
        return Err(Error::InvalidBoundary(format!(
            "boundary must contain at least 3 points, got {}",
            request.boundary.len()
        )));
    }
    if !is_finite(request.entry) {
        return Err(Error::InvalidEntryPoint(format!(
            "entry must have finite coordinates, got ({}, {})",
            request.entry.0, request.entry.1
        )));
    }
    if let Some(exit) = request.exit {
        if !is_finite(exit) {
            return Err(Error::InvalidEntryPoint(format!(
                "exit must have finite coordinates, got ({}, {})",
                exit.0, exit.1
            )));
        }
    }
    LotBoundary::new(request.boundary.clone())
}

fn is_finite(p: Point) -> bool {
    p.0.is_finite() && p.1.is_finite()
}

/// Offset from the start by which a stage owning `share` of the limit ends.
fn stage_budget(time_limit: f64, share: f64) -> Duration {
    Duration::from_secs_f64((time_limit * share).max(0.0).min(MAX_SOLVER_SECONDS))
}

/// Time left for selection, never below [`MIN_SOLVER_SECONDS`].
fn solver_budget(time_limit: f64, elapsed: Duration) -> Duration {
    let remaining = (time_limit - elapsed.as_secs_f64())
        .max(MIN_SOLVER_SECONDS)
        .min(MAX_SOLVER_SECONDS);
    Duration::from_secs_f64(remaining)
}

/// Optimizes `request` with `config`.
pub fn optimize_layout(
    request: &OptimizationRequest,
    config: &PlannerConfig,
) -> Result<OptimizationResult> {
    LotOptimizer::new(config.clone()).optimize(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yardplan_core::config::SolverBackend;

    fn rect_lot(width: f64, length: f64) -> Vec<Point> {
        vec![(0.0, 0.0), (width, 0.0), (width, length), (0.0, length)]
    }

    fn fast_config() -> PlannerConfig {
        PlannerConfig::default()
            .with_grid_spacing(2.0)
            .with_backend(SolverBackend::Greedy)
    }

    #[test]
    fn test_rejects_short_boundary() {
        let request = OptimizationRequest::new(vec![(0.0, 0.0), (10.0, 0.0)], (0.0, 0.0));
        let err = LotOptimizer::default().optimize(&request).unwrap_err();
        assert!(matches!(err, Error::InvalidBoundary(_)));
    }

    #[test]
    fn test_rejects_non_finite_entry() {
        let request = OptimizationRequest::new(rect_lot(50.0, 100.0), (f64::NAN, 0.0));
        let err = LotOptimizer::default().optimize(&request).unwrap_err();
        assert!(matches!(err, Error::InvalidEntryPoint(_)));
    }

    #[test]
    fn test_invalid_mix() {
        let request = OptimizationRequest::new(rect_lot(50.0, 100.0), (25.0, 0.0))
            .with_mix_bound("truck", 5, 3)
            .with_mix_bound("bus", 0, 1);
        let mut events = Vec::new();
        let mut sink = |e: &ProgressEvent| events.push(*e);
        let result = LotOptimizer::default()
            .optimize_with_progress(&request, &mut sink)
            .unwrap();

        assert_eq!(result.status, SolveStatus::Invalid);
        assert_eq!(result.solve_time, 0.0);
        assert_eq!(result.space_count(), 0);
        assert_eq!(result.stats.candidate_count, 0);
        assert_eq!(
            result.warnings,
            vec![
                "Unknown vehicle type in mix: bus".to_string(),
                "Vehicle mix for truck has min > max (5 > 3)".to_string(),
            ]
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_small_lot_infeasible() {
        let request = OptimizationRequest::new(rect_lot(5.0, 5.0), (2.5, 0.0));
        let result = LotOptimizer::default().optimize(&request).unwrap();
        assert_eq!(result.status, SolveStatus::Infeasible);
        assert_eq!(result.space_count(), 0);
        assert_eq!(
            result.warnings,
            vec!["Failed to generate lanes: Boundary polygon is too small or invalid".to_string()]
        );
        assert_eq!(result.layout.lot_width, 5.0);
    }

    #[test]
    fn test_greedy_pipeline_and_progress() {
        let request = OptimizationRequest::new(rect_lot(30.0, 40.0), (15.0, 0.0))
            .with_exit((15.0, 40.0))
            .with_goal(OptimizationGoal::MaximizeCount)
            .with_mix_bound("van", 0, 100);
        let mut events = Vec::new();
        let mut sink = |e: &ProgressEvent| events.push(*e);
        let result = LotOptimizer::new(fast_config())
            .optimize_with_progress(&request, &mut sink)
            .unwrap();

        assert_eq!(result.status, SolveStatus::Feasible);
        assert!(result.space_count() > 0);
        assert_eq!(result.stats.selected_count, result.space_count());
        assert_eq!(result.layout.lanes.len(), 1);
        assert!(result.layout.spaces.iter().all(|s| s.space_type == "van"));
        assert_eq!(result.layout.spaces[0].id, 1);
        assert_eq!(result.layout.spaces[0].label, "V-1");

        assert_eq!(events[0], ProgressEvent::LaneGenerationStarted);
        assert_eq!(
            events[1],
            ProgressEvent::CandidatesGenerated {
                count: result.stats.candidate_count
            }
        );
        assert_eq!(
            events[2],
            ProgressEvent::ConflictsBuilt {
                count: result.stats.conflict_count
            }
        );
        assert_eq!(
            events[3],
            ProgressEvent::IncumbentFound {
                selected: result.space_count()
            }
        );
    }

    #[test]
    fn test_solver_budget_floor() {
        assert_eq!(solver_budget(10.0, Duration::from_secs(4)), Duration::from_secs(6));
        assert_eq!(solver_budget(2.0, Duration::from_secs(5)), Duration::from_secs(1));
        assert_eq!(solver_budget(f64::NAN, Duration::ZERO), Duration::from_secs(1));
    }

    #[test]
    fn test_edge_limit_falls_back_to_spaced_greedy() {
        let request = OptimizationRequest::new(rect_lot(30.0, 40.0), (15.0, 0.0))
            .with_exit((15.0, 40.0))
            .with_goal(OptimizationGoal::MaximizeRevenue);
        let with_graph = LotOptimizer::new(fast_config()).optimize(&request).unwrap();
        let limited = LotOptimizer::new(fast_config().with_max_conflict_edges(0))
            .optimize(&request)
            .unwrap();

        assert_eq!(limited.status, SolveStatus::Feasible);
        assert_eq!(limited.stats.conflict_count, 0);
        assert!(limited
            .warnings
            .iter()
            .any(|w| w.starts_with("Conflict graph exceeded")));
        assert!(with_graph.stats.conflict_count > 0);
        assert_eq!(limited.layout.spaces, with_graph.layout.spaces);
    }

    #[test]
    fn test_stage_budget() {
        assert_eq!(stage_budget(10.0, GENERATION_SHARE), Duration::from_secs(4));
        assert_eq!(stage_budget(10.0, CONFLICT_SHARE), Duration::from_secs(6));
        assert_eq!(stage_budget(f64::NAN, CONFLICT_SHARE), Duration::ZERO);
        assert_eq!(
            stage_budget(f64::INFINITY, CONFLICT_SHARE),
            Duration::from_secs_f64(MAX_SOLVER_SECONDS)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_request_from_json() {
        let request = OptimizationRequest::from_json(
            r#"{
                "boundary": [[0, 0], [50, 0], [50, 100], [0, 100]],
                "entry": [25, 0],
                "goal": "maximize_trucks",
                "lane_type": "twoway",
                "vehicle_mix": {"truck": [2, 10]}
            }"#,
        )
        .unwrap();
        assert_eq!(request.name, "Optimized Layout");
        assert_eq!(request.exit, None);
        assert_eq!(request.goal, OptimizationGoal::MaximizeTrucks);
        assert_eq!(request.lane_type, LaneType::TwoWay);
        assert_eq!(request.rotations, vec![0.0, 90.0]);
        assert_eq!(request.time_limit, DEFAULT_TIME_LIMIT);
        assert_eq!(request.vehicle_mix.unwrap()["truck"], (2, 10));
    }
}
