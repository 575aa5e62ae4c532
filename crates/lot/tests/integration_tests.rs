//! Integration tests for yardplan-lot.

use yardplan_core::{
    ComplianceRules, LaneType, Layout, OptimizationGoal, PlannerConfig, ProgressEvent,
    SolveStatus, SolverBackend, VehicleCatalog,
};
use yardplan_lot::compliance::RuleCategory;
use yardplan_lot::kernel::PreparedPolygon;
use yardplan_lot::{
    CandidateGenerator, ComplianceChecker, ConflictGraph, GreedySelector, LaneCarver, LaneConfig,
    LaneStrategy, LotBoundary, LotOptimizer, OptimizationRequest, SelectionSolver,
    DEFAULT_ROTATIONS,
};

fn rect_lot(width: f64, length: f64) -> Vec<(f64, f64)> {
    vec![(0.0, 0.0), (width, 0.0), (width, length), (0.0, length)]
}

fn trapezoid_lot() -> Vec<(f64, f64)> {
    vec![(0.0, 0.0), (27.0, 0.0), (74.0, 145.0), (0.0, 145.0)]
}

fn coarse_config() -> PlannerConfig {
    PlannerConfig::default().with_grid_spacing(2.0)
}

mod lane_tests {
    use super::*;

    #[test]
    fn test_trapezoid_lot_carves() {
        let config = PlannerConfig::default();
        let lot = LotBoundary::new(trapezoid_lot()).unwrap();
        let lane = LaneConfig::new(LaneType::OneWay, &config.compliance);

        let carved =
            LaneCarver::new(&config).carve(&lot, (13.0, 0.0), Some((37.0, 145.0)), &lane);
        assert!(carved.success);
        assert!(!carved.parking_zones.is_empty());
        assert!(carved.parking_area() > 0.0);
        assert!(carved.parking_area() < lot.area());
    }

    #[test]
    fn test_lane_consumes_area() {
        let config = PlannerConfig::default();
        for boundary in [rect_lot(50.0, 100.0), rect_lot(30.0, 30.0), trapezoid_lot()] {
            let lot = LotBoundary::new(boundary).unwrap();
            let lane = LaneConfig::new(LaneType::TwoWay, &config.compliance);
            let carved = LaneCarver::new(&config).carve(&lot, lot.points()[0], None, &lane);
            assert!(carved.success);
            assert!(carved.lane_area() > 0.0);
            assert!(carved.parking_area() < lot.area());
        }
    }

    #[test]
    fn test_small_lot_fails() {
        let config = PlannerConfig::default();
        let lot = LotBoundary::rectangle(6.0, 6.0).unwrap();
        let lane = LaneConfig::new(LaneType::OneWay, &config.compliance);

        let carved = LaneCarver::new(&config).carve(&lot, (3.0, 0.0), None, &lane);
        assert!(!carved.success);
        assert!(carved.parking_zones.is_empty());
    }
}

mod candidate_tests {
    use super::*;

    #[test]
    fn test_candidates_inside_their_zone() {
        let config = coarse_config();
        let lot = LotBoundary::new(trapezoid_lot()).unwrap();
        let lane = LaneConfig::new(LaneType::OneWay, &config.compliance);
        let carved =
            LaneCarver::new(&config).carve(&lot, (13.0, 0.0), Some((37.0, 145.0)), &lane);

        let generator = CandidateGenerator::new(&config, &DEFAULT_ROTATIONS, None);
        let zones: Vec<PreparedPolygon> =
            carved.parking_zones.iter().map(PreparedPolygon::new).collect();
        for (z, zone) in carved.parking_zones.iter().enumerate() {
            let candidates =
                generator.generate(std::slice::from_ref(zone), carved.lane_path(), &lot);
            assert!(!candidates.is_empty());
            for c in &candidates {
                assert!(zones[z].contains_rect(&c.rect), "candidate {} leaks", c.id);
                assert!(lot.contains_rect(&c.rect));
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = coarse_config();
        let lot = LotBoundary::rectangle(40.0, 60.0).unwrap();
        let lane = LaneConfig::new(LaneType::OneWay, &config.compliance);
        let carved = LaneCarver::new(&config).carve(&lot, (20.0, 0.0), None, &lane);
        let generator = CandidateGenerator::new(&config, &DEFAULT_ROTATIONS, None);

        let first = generator.generate(&carved.parking_zones, carved.lane_path(), &lot);
        let second = generator.generate(&carved.parking_zones, carved.lane_path(), &lot);
        assert_eq!(first, second);
    }
}

mod selection_tests {
    use super::*;

    #[test]
    fn test_index_matches_exhaustive_on_real_candidates() {
        let config = coarse_config();
        let lot = LotBoundary::rectangle(30.0, 40.0).unwrap();
        let lane = LaneConfig::new(LaneType::OneWay, &config.compliance);
        let carved = LaneCarver::new(&config).carve(&lot, (15.0, 0.0), None, &lane);
        let candidates = CandidateGenerator::new(&config, &DEFAULT_ROTATIONS, None).generate(
            &carved.parking_zones,
            carved.lane_path(),
            &lot,
        );

        let indexed = ConflictGraph::build(&candidates, 1.0);
        let exhaustive = ConflictGraph::build_exhaustive(&candidates, 1.0);
        assert_eq!(indexed, exhaustive);
    }

    #[test]
    fn test_greedy_is_conflict_free() {
        let config = coarse_config();
        let lot = LotBoundary::new(trapezoid_lot()).unwrap();
        let lane = LaneConfig::new(LaneType::OneWay, &config.compliance);
        let carved =
            LaneCarver::new(&config).carve(&lot, (13.0, 0.0), Some((37.0, 145.0)), &lane);
        let candidates = CandidateGenerator::new(&config, &DEFAULT_ROTATIONS, None).generate(
            &carved.parking_zones,
            carved.lane_path(),
            &lot,
        );
        let graph = ConflictGraph::build(&candidates, 1.0);

        for goal in [
            OptimizationGoal::MaximizeRevenue,
            OptimizationGoal::MaximizeCount,
            OptimizationGoal::MaximizeTrucks,
        ] {
            let weights = SelectionSolver::new(goal, SolverBackend::Greedy)
                .weights(&candidates, &config.catalog);
            let outcome = GreedySelector::new(goal).select(&candidates, &weights, &graph, None);
            assert_eq!(outcome.status, SolveStatus::Feasible);
            assert!(!outcome.selected.is_empty());
            assert!(graph.is_independent(&outcome.selected));
        }
    }
}

mod optimizer_tests {
    use super::*;

    fn assert_clean(layout: &Layout, config: &PlannerConfig) {
        let report = ComplianceChecker::new(&config.catalog, &config.compliance).check(layout);
        assert_eq!(report.error_count, 0, "{:?}", report.violations);
        assert_eq!(report.by_category(RuleCategory::Spacing).count(), 0);
        assert_eq!(report.by_category(RuleCategory::Boundary).count(), 0);
    }

    #[test]
    fn test_rectangular_lot_count() {
        let config = coarse_config();
        let request = OptimizationRequest::new(rect_lot(50.0, 100.0), (25.0, 0.0))
            .with_exit((25.0, 100.0))
            .with_lane_type(LaneType::OneWay)
            .with_goal(OptimizationGoal::MaximizeCount)
            .with_time_limit(5.0);

        let result = LotOptimizer::new(config.clone()).optimize(&request).unwrap();
        assert!(matches!(
            result.status,
            SolveStatus::Optimal | SolveStatus::Feasible | SolveStatus::Timeout
        ));
        if result.is_success() {
            assert!(result.space_count() > 0);
            assert_clean(&result.layout, &config);
        }
        assert!(result.stats.candidate_count > 0);
        assert!(result.stats.conflict_count > 0);
    }

    #[test]
    fn test_time_limit_bounds_default_grid() {
        // Default 0.5 m grid: tens of thousands of candidates and far more
        // conflict pairs than fit the budget
        let config = PlannerConfig::default();
        let time_limit = 4.0;
        let request = OptimizationRequest::new(rect_lot(50.0, 100.0), (25.0, 0.0))
            .with_exit((25.0, 100.0))
            .with_goal(OptimizationGoal::MaximizeCount)
            .with_time_limit(time_limit);

        let started = std::time::Instant::now();
        let result = LotOptimizer::new(config.clone()).optimize(&request).unwrap();
        let wall = started.elapsed().as_secs_f64();

        // One extra second is the solver floor; the rest covers lane carving
        assert!(wall < time_limit + 4.0, "took {:.2}s", wall);
        assert!(result.solve_time <= wall);
        assert!(result.is_success(), "{:?}", result.warnings);
        assert!(result.space_count() > 0);
        assert_clean(&result.layout, &config);
    }

    #[test]
    fn test_min_greater_than_max_is_invalid() {
        let request = OptimizationRequest::new(trapezoid_lot(), (13.0, 0.0))
            .with_mix_bound("truck", 5, 3);
        let result = LotOptimizer::default().optimize(&request).unwrap();

        assert_eq!(result.status, SolveStatus::Invalid);
        assert_eq!(result.space_count(), 0);
        assert_eq!(result.stats.candidate_count, 0);
        assert_eq!(result.solve_time, 0.0);
    }

    #[test]
    fn test_tiny_lot_is_infeasible() {
        let request = OptimizationRequest::new(rect_lot(6.0, 6.0), (3.0, 0.0));
        let result = LotOptimizer::default().optimize(&request).unwrap();

        assert_eq!(result.status, SolveStatus::Infeasible);
        assert_eq!(result.space_count(), 0);
        assert!(result.warnings[0].starts_with("Failed to generate lanes: "));
    }

    #[test]
    fn test_greedy_layout_is_compliant() {
        let config = coarse_config().with_backend(SolverBackend::Greedy);
        let request = OptimizationRequest::new(trapezoid_lot(), (13.0, 0.0))
            .with_exit((37.0, 145.0))
            .with_goal(OptimizationGoal::MaximizeRevenue);

        let result = LotOptimizer::new(config.clone()).optimize(&request).unwrap();
        assert_eq!(result.status, SolveStatus::Feasible);
        assert!(result.space_count() > 0);
        assert_clean(&result.layout, &config);
        assert_eq!(result.stats.selected_count, result.space_count());
        assert!(result.stats.total_revenue > 0.0);
    }

    #[test]
    fn test_mix_bounds_hold() {
        let config = coarse_config().with_backend(SolverBackend::BranchAndBound);
        let request = OptimizationRequest::new(rect_lot(30.0, 40.0), (15.0, 0.0))
            .with_exit((15.0, 40.0))
            .with_goal(OptimizationGoal::MaximizeRevenue)
            .with_mix_bound("truck", 2, 3)
            .with_mix_bound("van", 1, 50)
            .with_time_limit(3.0);

        let mut incumbents = 0;
        let mut sink = |event: &ProgressEvent| {
            if matches!(event, ProgressEvent::IncumbentFound { .. }) {
                incumbents += 1;
            }
        };
        let result = LotOptimizer::new(config.clone())
            .optimize_with_progress(&request, &mut sink)
            .unwrap();

        assert!(result.is_success(), "status {}", result.status);
        assert!(incumbents >= 1);
        let trucks = result.layout.count_of("truck");
        let vans = result.layout.count_of("van");
        assert!((2..=3).contains(&trucks), "{} trucks", trucks);
        assert!((1..=50).contains(&vans), "{} vans", vans);
        assert_eq!(trucks + vans, result.space_count());
        assert_clean(&result.layout, &config);
    }

    #[test]
    fn test_missing_type_minimum_is_infeasible() {
        // Trucks cannot fit a 12m wide lot
        let config = coarse_config();
        let request = OptimizationRequest::new(rect_lot(12.0, 12.0), (6.0, 0.0))
            .with_mix_bound("truck", 1, 5);
        let result = LotOptimizer::new(config).optimize(&request).unwrap();
        assert_eq!(result.status, SolveStatus::Infeasible);
        assert_eq!(result.space_count(), 0);
    }

    #[test]
    fn test_perimeter_strategy() {
        let config = coarse_config().with_backend(SolverBackend::Greedy);
        let request = OptimizationRequest::new(rect_lot(60.0, 80.0), (30.0, 0.0))
            .with_lane_strategy(LaneStrategy::Perimeter)
            .with_goal(OptimizationGoal::MaximizeCount);

        let result = LotOptimizer::new(config.clone()).optimize(&request).unwrap();
        assert!(result.is_success());
        assert_eq!(result.layout.lanes[0].id, "perimeter");
        assert!(result.space_count() > 0);
        assert_clean(&result.layout, &config);
    }
}

mod layout_tests {
    use super::*;
    use yardplan_core::{breakeven_occupancy, project_revenue};

    #[test]
    fn test_layout_round_trip() {
        let config = coarse_config().with_backend(SolverBackend::Greedy);
        let request = OptimizationRequest::new(rect_lot(30.0, 40.0), (15.0, 0.0))
            .with_exit((15.0, 40.0))
            .with_name("Round trip");
        let result = LotOptimizer::new(config).optimize(&request).unwrap();

        let json = result.layout.to_json().unwrap();
        let restored = Layout::from_json(&json).unwrap();
        assert_eq!(restored, result.layout);
        assert_eq!(restored.spaces.len(), result.space_count());
        assert_eq!(restored.lanes[0].path, result.layout.lanes[0].path);
    }

    #[test]
    fn test_revenue_of_optimized_layout() {
        let config = coarse_config().with_backend(SolverBackend::Greedy);
        let request = OptimizationRequest::new(rect_lot(30.0, 40.0), (15.0, 0.0))
            .with_exit((15.0, 40.0));
        let result = LotOptimizer::new(config.clone()).optimize(&request).unwrap();

        let projection =
            project_revenue(&result.layout, &config.catalog, &config.pricing, 0.75);
        assert!((projection.annual - result.stats.total_revenue).abs() < 0.01);

        let breakeven = breakeven_occupancy(&result.layout, &config.catalog, &config.pricing);
        assert!(breakeven > 0.0 && breakeven <= 1.0);
    }

    #[test]
    fn test_edited_layout_is_rechecked() {
        let catalog = VehicleCatalog::default();
        let rules = ComplianceRules::default();
        let config = coarse_config().with_backend(SolverBackend::Greedy);
        let request = OptimizationRequest::new(rect_lot(30.0, 40.0), (15.0, 0.0))
            .with_exit((15.0, 40.0));
        let mut layout = LotOptimizer::new(config).optimize(&request).unwrap().layout;

        let mut moved = layout.spaces[0].clone();
        moved.id = layout.next_id();
        layout.add_space(moved);

        let report = ComplianceChecker::new(&catalog, &rules).check(&layout);
        assert!(report.error_count >= 1);
        assert!(!report.is_compliant());
    }
}
