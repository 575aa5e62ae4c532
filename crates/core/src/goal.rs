//! Optimization objectives.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::vehicle::VehicleTypeSpec;

/// What the selection step maximizes.
///
/// The goal only changes the objective weight of each candidate; the
/// constraint set is the same for every goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OptimizationGoal {
    /// Maximize total annual revenue.
    #[default]
    MaximizeRevenue,
    /// Maximize the number of spaces.
    MaximizeCount,
    /// Maximize the priority-weighted vehicle count.
    MaximizeTrucks,
}

impl OptimizationGoal {
    /// Objective weight of one candidate of type `spec` with the given revenue weight.
    #[inline]
    pub fn weight(self, spec: &VehicleTypeSpec, revenue_weight: f64) -> f64 {
        match self {
            Self::MaximizeRevenue => revenue_weight,
            Self::MaximizeCount => 1.0,
            Self::MaximizeTrucks => spec.priority_weight,
        }
    }

    /// Canonical snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MaximizeRevenue => "maximize_revenue",
            Self::MaximizeCount => "maximize_count",
            Self::MaximizeTrucks => "maximize_trucks",
        }
    }
}

impl std::fmt::Display for OptimizationGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OptimizationGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maximize_revenue" | "revenue" => Ok(Self::MaximizeRevenue),
            "maximize_count" | "count" => Ok(Self::MaximizeCount),
            "maximize_trucks" | "trucks" => Ok(Self::MaximizeTrucks),
            other => Err(format!("unknown optimization goal: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleCatalog;

    #[test]
    fn test_weights() {
        let catalog = VehicleCatalog::default();
        let van = catalog.get("van").unwrap();
        assert_eq!(OptimizationGoal::MaximizeRevenue.weight(van, 912.6), 912.6);
        assert_eq!(OptimizationGoal::MaximizeCount.weight(van, 912.6), 1.0);
        assert_eq!(OptimizationGoal::MaximizeTrucks.weight(van, 912.6), 2.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "maximize_trucks".parse::<OptimizationGoal>().unwrap(),
            OptimizationGoal::MaximizeTrucks
        );
        assert!("fastest".parse::<OptimizationGoal>().is_err());
    }
}
