//! Canonical solve status.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of an optimization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SolveStatus {
    /// Proven optimal selection over the candidate set.
    Optimal,
    /// Valid selection, optimality not proven.
    Feasible,
    /// No valid selection exists, or the lot has no usable parking area.
    Infeasible,
    /// The request or model was rejected before solving.
    Invalid,
    /// Time budget exhausted before any valid selection was found.
    Timeout,
    /// Outcome not known.
    #[default]
    Unknown,
}

impl SolveStatus {
    /// Returns true for statuses that carry a usable layout.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }

    /// Lowercase canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Feasible => "feasible",
            Self::Infeasible => "infeasible",
            Self::Invalid => "invalid",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_statuses() {
        assert!(SolveStatus::Optimal.is_success());
        assert!(SolveStatus::Feasible.is_success());
        assert!(!SolveStatus::Timeout.is_success());
        assert!(!SolveStatus::Invalid.is_success());
        assert_eq!(SolveStatus::default(), SolveStatus::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(SolveStatus::Infeasible.to_string(), "infeasible");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SolveStatus::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
        let back: SolveStatus = serde_json::from_str("\"feasible\"").unwrap();
        assert_eq!(back, SolveStatus::Feasible);
    }
}
