//! Optimization result types.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::status::SolveStatus;

/// Aggregate statistics of one optimization call.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizationStats {
    /// Candidates generated.
    pub candidate_count: usize,
    /// Conflict edges found.
    pub conflict_count: usize,
    /// Candidates selected.
    pub selected_count: usize,
    /// Sum of revenue weights of the selection.
    pub total_revenue: f64,
    /// Selected spaces per type.
    pub space_counts: BTreeMap<String, usize>,
    /// Area of the lot boundary.
    pub lot_area: f64,
    /// Area of the carved lane inside the lot.
    pub lane_area: f64,
    /// Total area of the usable parking zones.
    pub parking_area: f64,
}

/// Result of one optimization call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizationResult {
    /// Produced layout (empty unless the status is a success).
    pub layout: Layout,
    /// Canonical outcome.
    pub status: SolveStatus,
    /// Wall-clock seconds spent in the call.
    pub solve_time: f64,
    /// Ordered warnings.
    pub warnings: Vec<String>,
    /// Aggregate statistics.
    pub stats: OptimizationStats,
}

impl OptimizationResult {
    /// Creates an empty result with the given status.
    pub fn new(layout: Layout, status: SolveStatus) -> Self {
        Self {
            layout,
            status,
            solve_time: 0.0,
            warnings: Vec::new(),
            stats: OptimizationStats::default(),
        }
    }

    /// Appends a warning.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Returns true if the layout is a valid selection.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Number of placed spaces.
    pub fn space_count(&self) -> usize {
        self.layout.spaces.len()
    }
}
