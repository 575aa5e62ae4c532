//! Revenue arithmetic.
//!
//! A space earns `annual_base_price * revenue_multiplier * occupancy` per
//! year. The same figure at the assumed occupancy is the candidate weight under
//! the revenue objective.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::layout::{Layout, Scenario};
use crate::vehicle::{VehicleCatalog, VehicleTypeSpec};

/// Annual revenue of one space of type `spec` at `occupancy`.
#[inline]
pub fn space_revenue(spec: &VehicleTypeSpec, pricing: &PricingConfig, occupancy: f64) -> f64 {
    pricing.annual_base_price * spec.revenue_multiplier * occupancy
}

/// Revenue projection of a layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RevenueProjection {
    /// Revenue per day.
    pub daily: f64,
    /// Revenue per week.
    pub weekly: f64,
    /// Revenue per month.
    pub monthly: f64,
    /// Revenue per year.
    pub annual: f64,
    /// Annual revenue target.
    pub target: f64,
    /// Annual revenue as a percentage of the target.
    pub target_percentage: f64,
    /// Annual revenue per space type.
    pub breakdown_by_type: BTreeMap<String, f64>,
}

impl RevenueProjection {
    /// Returns true if annual revenue reaches the target.
    pub fn meets_target(&self) -> bool {
        self.annual >= self.target
    }

    /// Short status line relative to the target.
    pub fn status(&self) -> String {
        if self.target_percentage >= 100.0 {
            format!("Exceeds target by {:.1}%", self.target_percentage - 100.0)
        } else {
            format!("{:.1}% below target", 100.0 - self.target_percentage)
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn annual_by_type(
    layout: &Layout,
    catalog: &VehicleCatalog,
    pricing: &PricingConfig,
    occupancy: f64,
) -> BTreeMap<String, f64> {
    layout
        .count_by_type()
        .into_iter()
        .map(|(key, count)| {
            let multiplier = catalog.get(&key).map_or(1.0, |s| s.revenue_multiplier);
            let annual = count as f64 * pricing.annual_base_price * multiplier * occupancy;
            (key, annual)
        })
        .collect()
}

/// Projects revenue for a layout at the given occupancy.
///
/// Unknown space types earn at multiplier 1.0.
pub fn project_revenue(
    layout: &Layout,
    catalog: &VehicleCatalog,
    pricing: &PricingConfig,
    occupancy: f64,
) -> RevenueProjection {
    let breakdown = annual_by_type(layout, catalog, pricing, occupancy);
    let annual: f64 = breakdown.values().sum();
    let target = pricing.revenue_target;
    let target_percentage = if target > 0.0 {
        annual / target * 100.0
    } else {
        0.0
    };

    RevenueProjection {
        daily: round_to(annual / 365.0, 2),
        weekly: round_to(annual / 52.0, 2),
        monthly: round_to(annual / 12.0, 2),
        annual: round_to(annual, 2),
        target,
        target_percentage: round_to(target_percentage, 1),
        breakdown_by_type: breakdown,
    }
}

/// Occupancy needed for the layout to reach the revenue target, capped at 1.0.
///
/// Returns 0.0 for a layout that earns nothing.
pub fn breakeven_occupancy(
    layout: &Layout,
    catalog: &VehicleCatalog,
    pricing: &PricingConfig,
) -> f64 {
    let full: f64 = annual_by_type(layout, catalog, pricing, 1.0).values().sum();
    if full <= 0.0 {
        return 0.0;
    }
    (pricing.revenue_target / full).min(1.0)
}

/// One row of a scenario comparison.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScenarioSummary {
    /// Scenario name.
    pub name: String,
    /// Number of spaces.
    pub spaces: usize,
    /// Occupancy in percent.
    pub occupancy: f64,
    /// Projected annual revenue.
    pub annual_revenue: f64,
    /// Annual revenue as a percentage of the target.
    pub target_pct: f64,
    /// Whether the target is met.
    pub meets_target: bool,
}

/// Summarizes scenarios side by side, in input order.
pub fn compare_scenarios(
    scenarios: &[Scenario],
    catalog: &VehicleCatalog,
    pricing: &PricingConfig,
) -> Vec<ScenarioSummary> {
    scenarios
        .iter()
        .map(|s| {
            let projection = project_revenue(&s.layout, catalog, pricing, s.occupancy_rate);
            ScenarioSummary {
                name: s.name.clone(),
                spaces: s.layout.spaces.len(),
                occupancy: s.occupancy_rate * 100.0,
                annual_revenue: projection.annual,
                target_pct: projection.target_percentage,
                meets_target: projection.meets_target(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::OrientedRect;
    use crate::layout::ParkingSpace;
    use approx::assert_relative_eq;

    fn layout_with(types: &[&str]) -> Layout {
        let mut layout = Layout::new("rev");
        for (i, t) in types.iter().enumerate() {
            let id = i as u32 + 1;
            layout.add_space(ParkingSpace::new(id, *t, OrientedRect::new(0.0, 0.0, 1.0, 1.0), "S"));
        }
        layout
    }

    #[test]
    fn test_space_revenue() {
        let catalog = VehicleCatalog::default();
        let pricing = PricingConfig::default();
        let ev = catalog.get("ev").unwrap();
        assert_relative_eq!(
            space_revenue(ev, &pricing, 0.75),
            2433.60 * 1.3 * 0.75,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_projection() {
        let catalog = VehicleCatalog::default();
        let pricing = PricingConfig::default();
        let layout = layout_with(&["truck", "truck", "van"]);
        let p = project_revenue(&layout, &catalog, &pricing, 0.75);
        let expected = 2433.60 * 0.75 * 2.5;
        assert_relative_eq!(p.annual, (expected * 100.0_f64).round() / 100.0, epsilon = 1e-9);
        assert_relative_eq!(p.monthly, (expected / 12.0 * 100.0).round() / 100.0, epsilon = 1e-9);
        assert_eq!(p.breakdown_by_type.len(), 2);
        assert!(!p.meets_target());
        assert!(p.status().ends_with("below target"));
    }

    #[test]
    fn test_breakeven() {
        let catalog = VehicleCatalog::default();
        let pricing = PricingConfig::default();
        assert_eq!(breakeven_occupancy(&Layout::new("e"), &catalog, &pricing), 0.0);

        let small = layout_with(&["truck"; 10]);
        assert_eq!(breakeven_occupancy(&small, &catalog, &pricing), 1.0);

        let large = layout_with(&["truck"; 164]);
        let b = breakeven_occupancy(&large, &catalog, &pricing);
        assert_relative_eq!(b, 200_000.0 / (164.0 * 2433.60), epsilon = 1e-12);
    }

    #[test]
    fn test_compare_scenarios() {
        let catalog = VehicleCatalog::default();
        let pricing = PricingConfig::default();
        let scenarios = vec![
            Scenario::new("low", layout_with(&["van"])).with_occupancy(0.5),
            Scenario::new("high", layout_with(&["ev"; 120])).with_occupancy(1.0),
        ];
        let rows = compare_scenarios(&scenarios, &catalog, &pricing);
        assert_eq!(rows[0].name, "low");
        assert_eq!(rows[0].occupancy, 50.0);
        assert!(!rows[0].meets_target);
        assert_eq!(rows[1].spaces, 120);
        assert!(rows[1].meets_target);
    }
}
