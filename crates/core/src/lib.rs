//! # yardplan core
//!
//! Shared data model for the yardplan parking layout optimizer.
//!
//! This crate holds everything the lot planner and its callers exchange:
//! vehicle type specifications, planner configuration, oriented rectangles,
//! layouts and their persisted JSON form, solve status, progress events,
//! result statistics and revenue arithmetic. The placement pipeline itself
//! lives in `yardplan-lot`.
//!
//! ## Core Components
//!
//! - **Vehicles**: [`VehicleTypeSpec`], [`VehicleCatalog`]
//! - **Configuration**: [`PlannerConfig`], [`ComplianceRules`], [`PricingConfig`], [`SolverBackend`]
//! - **Geometry**: [`OrientedRect`], robust predicates in [`robust`]
//! - **Layouts**: [`Layout`], [`ParkingSpace`], [`Lane`], [`Scenario`]
//! - **Results**: [`OptimizationResult`], [`OptimizationStats`], [`SolveStatus`]
//! - **Revenue**: [`project_revenue`], [`breakeven_occupancy`], [`compare_scenarios`]
//!
//! ## Configuration
//!
//! ```rust
//! use yardplan_core::{PlannerConfig, PricingConfig};
//!
//! let config = PlannerConfig::new()
//!     .with_grid_spacing(1.0)
//!     .with_pricing(PricingConfig::default().with_assumed_occupancy(0.8));
//! assert_eq!(config.catalog.len(), 5);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): JSON (de)serialization of layouts, scenarios and configuration

pub mod config;
pub mod error;
pub mod geometry;
pub mod goal;
pub mod layout;
pub mod progress;
pub mod result;
pub mod revenue;
pub mod robust;
pub mod status;
pub mod vehicle;

// Re-exports
pub use config::{ComplianceRules, PlannerConfig, PricingConfig, SolverBackend};
pub use error::{Error, Result};
pub use geometry::{OrientedRect, Point};
pub use goal::OptimizationGoal;
pub use layout::{Lane, LaneType, Layout, ParkingSpace, Scenario};
pub use progress::{NoProgress, ProgressEvent, ProgressSink};
pub use result::{OptimizationResult, OptimizationStats};
pub use revenue::{
    breakeven_occupancy, compare_scenarios, project_revenue, space_revenue, RevenueProjection,
    ScenarioSummary,
};
pub use status::SolveStatus;
pub use vehicle::{VehicleCatalog, VehicleTypeSpec};
