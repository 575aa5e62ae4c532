//! # yardplan lot
//!
//! Parking lot layout optimization for the yardplan planner.
//!
//! This crate places vehicle parking spaces and an access lane inside an
//! arbitrary simple polygon while honoring containment, spacing, fire access
//! and vehicle-mix constraints.
//!
//! ## Pipeline
//!
//! - [`LaneCarver`]: lane centerline and footprint, remaining parking zones
//! - [`CandidateGenerator`]: grid-discretized placements per zone, type and rotation
//! - [`ConflictGraph`]: pairs of candidates closer than the minimum spacing
//! - [`SelectionSolver`]: constrained selection (branch and bound, greedy, MILP)
//! - [`ComplianceChecker`]: standalone validation of any layout
//!
//! [`LotOptimizer`] chains the stages for one [`OptimizationRequest`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use yardplan_lot::{LotOptimizer, OptimizationRequest};
//! use yardplan_core::{LaneType, OptimizationGoal, PlannerConfig};
//!
//! let request = OptimizationRequest::new(
//!     vec![(0.0, 0.0), (50.0, 0.0), (50.0, 100.0), (0.0, 100.0)],
//!     (25.0, 0.0),
//! )
//! .with_exit((25.0, 100.0))
//! .with_lane_type(LaneType::OneWay)
//! .with_goal(OptimizationGoal::MaximizeRevenue)
//! .with_mix_bound("truck", 4, 20);
//!
//! let optimizer = LotOptimizer::new(PlannerConfig::default().with_grid_spacing(1.0));
//! let result = optimizer.optimize(&request).unwrap();
//!
//! println!(
//!     "{}: {} spaces, {:.0} revenue",
//!     result.status,
//!     result.space_count(),
//!     result.stats.total_revenue
//! );
//! ```
//!
//! ## Lane Carving
//!
//! ```rust
//! use yardplan_core::{LaneType, PlannerConfig};
//! use yardplan_lot::{LaneCarver, LaneConfig, LotBoundary};
//!
//! let config = PlannerConfig::default();
//! let lot = LotBoundary::rectangle(50.0, 100.0).unwrap();
//! let lane = LaneConfig::new(LaneType::OneWay, &config.compliance);
//!
//! let carved = LaneCarver::new(&config).carve(&lot, (25.0, 0.0), Some((25.0, 100.0)), &lane);
//! assert!(carved.success);
//! assert_eq!(carved.parking_zones.len(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): JSON requests and reports
//! - `milp`: HiGHS selection backend through `good_lp`

pub mod boundary;
pub mod candidate;
pub mod compliance;
pub mod conflict;
pub mod estimate;
pub mod kernel;
pub mod lane;
pub mod optimizer;
pub mod selection;
pub mod spatial_index;

// Re-exports
pub use boundary::LotBoundary;
pub use candidate::{Candidate, CandidateGenerator, DEFAULT_ROTATIONS};
pub use compliance::{ComplianceChecker, ComplianceReport, ComplianceStatus, Violation};
pub use conflict::ConflictGraph;
pub use estimate::{quick_estimate, QuickEstimate};
pub use lane::{
    estimate_lane_requirements, preferred_lane_direction, LaneCarveResult, LaneCarver,
    LaneConfig, LaneRequirements,
};
pub use optimizer::{optimize_layout, LaneStrategy, LotOptimizer, OptimizationRequest};
pub use selection::{
    BranchAndBoundSolver, ConstraintSolver, GreedySelector, SelectionSolver, VehicleMix,
};
pub use spatial_index::{SpatialEntry, SpatialIndex};
pub use yardplan_core::{Error, Result};
