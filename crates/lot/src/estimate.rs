//! Area-based capacity estimate.
//!
//! A rough upper bound on what a lot can hold, computed from its area alone.
//! No lane is carved and nothing is placed.

use yardplan_core::config::PricingConfig;
use yardplan_core::layout::LaneType;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::boundary::LotBoundary;

/// Fraction of usable parking area left after spacing and maneuvering.
pub const EFFICIENCY_FACTOR: f64 = 0.6;

const TRUCK_FOOTPRINT: f64 = 18.5 * 3.5;
const TRACTOR_FOOTPRINT: f64 = 8.5 * 3.5;
const ESTIMATE_OCCUPANCY: f64 = 0.75;

/// Share of the lot taken by lanes.
pub fn lane_share(lane_type: LaneType) -> f64 {
    match lane_type {
        LaneType::OneWay => 0.17,
        LaneType::TwoWay => 0.22,
    }
}

/// Capacity estimate for a lot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuickEstimate {
    pub total_area: f64,
    /// Area left for parking after the lane share.
    pub estimated_parking_area: f64,
    /// Spaces if the lot held trucks only.
    pub max_truck_spaces: u32,
    /// Spaces if the lot held tractors only.
    pub max_tractor_spaces: u32,
    /// Revenue of a truck-only lot at 75% occupancy.
    pub estimated_annual_revenue: f64,
    pub efficiency_factor: f64,
}

/// Estimates capacity with default pricing.
pub fn quick_estimate(boundary: &LotBoundary, lane_type: LaneType) -> QuickEstimate {
    quick_estimate_with(boundary, lane_type, &PricingConfig::default())
}

/// Estimates capacity with `pricing`.
pub fn quick_estimate_with(
    boundary: &LotBoundary,
    lane_type: LaneType,
    pricing: &PricingConfig,
) -> QuickEstimate {
    let total_area = boundary.area();
    let parking_area = total_area * (1.0 - lane_share(lane_type));
    let effective = parking_area * EFFICIENCY_FACTOR;

    let max_trucks = (effective / TRUCK_FOOTPRINT).floor() as u32;
    let max_tractors = (effective / TRACTOR_FOOTPRINT).floor() as u32;

    QuickEstimate {
        total_area,
        estimated_parking_area: parking_area,
        max_truck_spaces: max_trucks,
        max_tractor_spaces: max_tractors,
        estimated_annual_revenue: max_trucks as f64
            * pricing.annual_base_price
            * ESTIMATE_OCCUPANCY,
        efficiency_factor: EFFICIENCY_FACTOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangular_estimate() {
        let lot = LotBoundary::rectangle(50.0, 100.0).unwrap();
        let estimate = quick_estimate(&lot, LaneType::OneWay);
        assert_relative_eq!(estimate.total_area, 5000.0, epsilon = 1e-9);
        assert_relative_eq!(estimate.estimated_parking_area, 4150.0, epsilon = 1e-9);
        assert_eq!(estimate.max_truck_spaces, 38);
        assert_eq!(estimate.max_tractor_spaces, 83);
        assert_relative_eq!(estimate.estimated_annual_revenue, 69357.6, epsilon = 1e-6);
    }

    #[test]
    fn test_twoway_holds_fewer() {
        let lot = LotBoundary::rectangle(50.0, 100.0).unwrap();
        let oneway = quick_estimate(&lot, LaneType::OneWay);
        let twoway = quick_estimate(&lot, LaneType::TwoWay);
        assert_eq!(twoway.max_truck_spaces, 36);
        assert!(oneway.max_truck_spaces >= twoway.max_truck_spaces);
    }

    #[test]
    fn test_triangular_lot() {
        let lot =
            LotBoundary::new(vec![(0.0, 0.0), (27.0, 0.0), (74.0, 145.0), (0.0, 145.0)]).unwrap();
        let estimate = quick_estimate(&lot, LaneType::OneWay);
        assert!(estimate.total_area > 0.0);
        assert!(estimate.max_truck_spaces > 0);
    }

    #[test]
    fn test_custom_pricing() {
        let lot = LotBoundary::rectangle(50.0, 100.0).unwrap();
        let pricing = PricingConfig::default().with_annual_base_price(1000.0);
        let estimate = quick_estimate_with(&lot, LaneType::OneWay, &pricing);
        assert_relative_eq!(estimate.estimated_annual_revenue, 38.0 * 750.0, epsilon = 1e-9);
    }
}
