//! Planner configuration.
//!
//! Every tunable constant of the pipeline lives in an explicit, immutable
//! [`PlannerConfig`] passed into each call. Defaults reproduce the standard
//! site rules; `with_*` builders override individual values.
//!
//! # Example
//!
//! ```rust
//! use yardplan_core::config::{ComplianceRules, PlannerConfig, SolverBackend};
//!
//! let config = PlannerConfig::new()
//!     .with_grid_spacing(1.0)
//!     .with_backend(SolverBackend::Greedy)
//!     .with_compliance(ComplianceRules::default().with_min_vehicle_spacing(1.5));
//!
//! assert_eq!(config.compliance.min_vehicle_spacing, 1.5);
//! assert_eq!(config.compliance.fire_access_max_distance, 10.0);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::vehicle::VehicleCatalog;

/// Site safety and circulation rules.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComplianceRules {
    /// Minimum clearance between two spaces.
    pub min_vehicle_spacing: f64,
    /// Maximum distance from a space center to the lot edge or a lane.
    pub fire_access_max_distance: f64,
    /// Nominal width of a one-way lane.
    pub lane_width_oneway: f64,
    /// Nominal width of a two-way lane.
    pub lane_width_twoway: f64,
}

impl Default for ComplianceRules {
    fn default() -> Self {
        Self {
            min_vehicle_spacing: 1.0,
            fire_access_max_distance: 10.0,
            lane_width_oneway: 6.0,
            lane_width_twoway: 8.0,
        }
    }
}

impl ComplianceRules {
    /// Sets the minimum clearance between spaces.
    pub fn with_min_vehicle_spacing(mut self, spacing: f64) -> Self {
        self.min_vehicle_spacing = spacing.max(0.0);
        self
    }

    /// Sets the fire access distance.
    pub fn with_fire_access_max_distance(mut self, distance: f64) -> Self {
        self.fire_access_max_distance = distance.max(0.0);
        self
    }

    /// Sets both nominal lane widths.
    pub fn with_lane_widths(mut self, oneway: f64, twoway: f64) -> Self {
        self.lane_width_oneway = oneway;
        self.lane_width_twoway = twoway;
        self
    }
}

/// Rental pricing used for revenue weights and projections.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PricingConfig {
    /// Annual price of a multiplier-1.0 space at full occupancy.
    pub annual_base_price: f64,
    /// Occupancy assumed when weighting candidates.
    pub assumed_occupancy: f64,
    /// Annual revenue target of the site.
    pub revenue_target: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            annual_base_price: 2433.60,
            assumed_occupancy: 0.75,
            revenue_target: 200_000.0,
        }
    }
}

impl PricingConfig {
    /// Sets the annual base price.
    pub fn with_annual_base_price(mut self, price: f64) -> Self {
        self.annual_base_price = price;
        self
    }

    /// Sets the assumed occupancy, clamped to `[0, 1]`.
    pub fn with_assumed_occupancy(mut self, occupancy: f64) -> Self {
        self.assumed_occupancy = occupancy.clamp(0.0, 1.0);
        self
    }

    /// Sets the revenue target.
    pub fn with_revenue_target(mut self, target: f64) -> Self {
        self.revenue_target = target;
        self
    }
}

/// Which selection backend the optimizer binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolverBackend {
    /// MILP when compiled in, branch and bound otherwise.
    #[default]
    Auto,
    /// Built-in depth-first branch and bound.
    BranchAndBound,
    /// HiGHS through `good_lp` (requires the `milp` feature).
    Milp,
    /// Deterministic greedy heuristic.
    Greedy,
}

/// Aggregate configuration for one optimization call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlannerConfig {
    /// Vehicle type specifications.
    pub catalog: VehicleCatalog,
    /// Safety and circulation rules.
    pub compliance: ComplianceRules,
    /// Pricing.
    pub pricing: PricingConfig,
    /// Candidate grid step.
    pub grid_spacing: f64,
    /// Inward tolerance applied to zones before containment tests.
    pub containment_tolerance: f64,
    /// Entry/exit points farther than this from the boundary are snapped onto it.
    pub snap_tolerance: f64,
    /// Lots below this area are rejected.
    pub min_boundary_area: f64,
    /// Parking zones below this area are discarded.
    pub min_zone_area: f64,
    /// Lane insets below this area fall back to the direct path.
    pub min_inset_area: f64,
    /// Selection backend.
    pub backend: SolverBackend,
    /// Conflict edges held in memory before selection switches to the
    /// graph-free greedy pass.
    pub max_conflict_edges: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            catalog: VehicleCatalog::default(),
            compliance: ComplianceRules::default(),
            pricing: PricingConfig::default(),
            grid_spacing: 0.5,
            containment_tolerance: 0.01,
            snap_tolerance: 5.0,
            min_boundary_area: 50.0,
            min_zone_area: 30.0,
            min_inset_area: 10.0,
            backend: SolverBackend::Auto,
            max_conflict_edges: 10_000_000,
        }
    }
}

impl PlannerConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the vehicle catalog.
    pub fn with_catalog(mut self, catalog: VehicleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the compliance rules.
    pub fn with_compliance(mut self, compliance: ComplianceRules) -> Self {
        self.compliance = compliance;
        self
    }

    /// Sets the pricing.
    pub fn with_pricing(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }

    /// Sets the candidate grid step.
    pub fn with_grid_spacing(mut self, spacing: f64) -> Self {
        self.grid_spacing = spacing.max(0.05);
        self
    }

    /// Sets the containment tolerance.
    pub fn with_containment_tolerance(mut self, tolerance: f64) -> Self {
        self.containment_tolerance = tolerance.max(0.0);
        self
    }

    /// Sets the entry/exit snap tolerance.
    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_tolerance = tolerance.max(0.0);
        self
    }

    /// Sets the minimum zone area.
    pub fn with_min_zone_area(mut self, area: f64) -> Self {
        self.min_zone_area = area.max(0.0);
        self
    }

    /// Sets the selection backend.
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the conflict edge limit.
    pub fn with_max_conflict_edges(mut self, edges: usize) -> Self {
        self.max_conflict_edges = edges;
        self
    }

    /// Loads a site specification document on top of the defaults.
    ///
    /// The document has optional `space_types`, `compliance`, `pricing` and
    /// `site` sections. Known space types are patched field by field; unknown
    /// ones must give at least `default_length` and `default_width`.
    #[cfg(feature = "serde")]
    pub fn from_specs_json(json: &str) -> crate::Result<Self> {
        let doc: specs::SpecsDocument = serde_json::from_str(json)?;
        let mut config = Self::default();
        doc.apply(&mut config)?;
        Ok(config)
    }
}

#[cfg(feature = "serde")]
mod specs {
    use super::PlannerConfig;
    use crate::error::{Error, Result};
    use crate::vehicle::VehicleTypeSpec;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct SpecsDocument {
        space_types: BTreeMap<String, SpaceTypeEntry>,
        compliance: ComplianceEntry,
        pricing: PricingEntry,
        site: SiteEntry,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct SpaceTypeEntry {
        name: Option<String>,
        default_length: Option<f64>,
        default_width: Option<f64>,
        min_length: Option<f64>,
        min_width: Option<f64>,
        turning_radius: Option<f64>,
        revenue_multiplier: Option<f64>,
        priority_weight: Option<f64>,
        label_prefix: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct ComplianceEntry {
        min_vehicle_spacing: Option<f64>,
        fire_access_max_distance: Option<f64>,
        lane_width_recommended_oneway: Option<f64>,
        lane_width_recommended_twoway: Option<f64>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct PricingEntry {
        annual: Option<f64>,
        occupancy: Option<f64>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct SiteEntry {
        revenue_target: Option<f64>,
    }

    impl SpecsDocument {
        pub(super) fn apply(self, config: &mut PlannerConfig) -> Result<()> {
            for (key, entry) in self.space_types {
                let mut spec = match config.catalog.get(&key) {
                    Some(existing) => existing.clone(),
                    None => {
                        let (Some(length), Some(width)) =
                            (entry.default_length, entry.default_width)
                        else {
                            return Err(Error::UnknownVehicleType(format!(
                                "{} (new space types need default_length and default_width)",
                                key
                            )));
                        };
                        VehicleTypeSpec::new(key.clone(), length, width)
                    }
                };
                entry.patch(&mut spec);
                config.catalog.insert(spec);
            }

            let c = &mut config.compliance;
            patch(&mut c.min_vehicle_spacing, self.compliance.min_vehicle_spacing);
            patch(
                &mut c.fire_access_max_distance,
                self.compliance.fire_access_max_distance,
            );
            patch(
                &mut c.lane_width_oneway,
                self.compliance.lane_width_recommended_oneway,
            );
            patch(
                &mut c.lane_width_twoway,
                self.compliance.lane_width_recommended_twoway,
            );

            let p = &mut config.pricing;
            patch(&mut p.annual_base_price, self.pricing.annual);
            patch(&mut p.assumed_occupancy, self.pricing.occupancy);
            patch(&mut p.revenue_target, self.site.revenue_target);
            Ok(())
        }
    }

    impl SpaceTypeEntry {
        fn patch(self, spec: &mut VehicleTypeSpec) {
            if let Some(name) = self.name {
                spec.name = name;
            }
            if let Some(prefix) = self.label_prefix {
                spec.label_prefix = prefix;
            }
            patch(&mut spec.default_length, self.default_length);
            patch(&mut spec.default_width, self.default_width);
            patch(&mut spec.min_length, self.min_length);
            patch(&mut spec.min_width, self.min_width);
            patch(&mut spec.turning_radius, self.turning_radius);
            patch(&mut spec.revenue_multiplier, self.revenue_multiplier);
            patch(&mut spec.priority_weight, self.priority_weight);
        }
    }

    fn patch(slot: &mut f64, value: Option<f64>) {
        if let Some(v) = value {
            *slot = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.grid_spacing, 0.5);
        assert_eq!(config.snap_tolerance, 5.0);
        assert_eq!(config.min_boundary_area, 50.0);
        assert_eq!(config.min_zone_area, 30.0);
        assert_eq!(config.compliance.lane_width_twoway, 8.0);
        assert_eq!(config.pricing.annual_base_price, 2433.60);
        assert_eq!(config.backend, SolverBackend::Auto);
    }

    #[test]
    fn test_builder_clamps() {
        let config = PlannerConfig::new()
            .with_grid_spacing(0.0)
            .with_pricing(PricingConfig::default().with_assumed_occupancy(1.5));
        assert_eq!(config.grid_spacing, 0.05);
        assert_eq!(config.pricing.assumed_occupancy, 1.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_specs_json() {
        let json = r##"{
            "space_types": {
                "truck": {"name": "LZV", "min_length": 17.0, "color": "#3498db"},
                "bus": {"default_length": 12.0, "default_width": 3.0, "label_prefix": "B"}
            },
            "compliance": {"min_vehicle_spacing": 1.5, "lane_width_recommended_twoway": 7.5},
            "pricing": {"annual": 3000.0},
            "site": {"revenue_target": 150000}
        }"##;
        let config = PlannerConfig::from_specs_json(json).unwrap();
        let truck = config.catalog.get("truck").unwrap();
        assert_eq!(truck.name, "LZV");
        assert_eq!(truck.min_length, 17.0);
        assert_eq!(truck.default_length, 18.5);
        assert_eq!(config.catalog.label_prefix("bus"), "B");
        assert_eq!(config.compliance.min_vehicle_spacing, 1.5);
        assert_eq!(config.compliance.lane_width_twoway, 7.5);
        assert_eq!(config.compliance.lane_width_oneway, 6.0);
        assert_eq!(config.pricing.annual_base_price, 3000.0);
        assert_eq!(config.pricing.revenue_target, 150000.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_specs_json_rejects_incomplete_new_type() {
        let json = r#"{"space_types": {"bus": {"default_length": 12.0}}}"#;
        assert!(PlannerConfig::from_specs_json(json).is_err());
    }
}
