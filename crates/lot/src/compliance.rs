//! Layout compliance checking.
//!
//! [`ComplianceChecker`] re-validates any [`Layout`], whether produced by the
//! optimizer or edited by hand, against four rule families: minimum space
//! dimensions, containment in the lot boundary, pairwise spacing, and fire
//! access distance.
//!
//! # Example
//!
//! ```rust
//! use yardplan_core::{ComplianceRules, Layout, OrientedRect, ParkingSpace, VehicleCatalog};
//! use yardplan_lot::compliance::{ComplianceChecker, ComplianceStatus};
//!
//! let mut layout = Layout::new("demo")
//!     .with_boundary(vec![(0.0, 0.0), (20.0, 0.0), (20.0, 10.0), (0.0, 10.0)]);
//! layout.add_space(ParkingSpace::new(1, "van", OrientedRect::new(1.0, 1.0, 7.0, 3.0), "V"));
//!
//! let catalog = VehicleCatalog::default();
//! let report = ComplianceChecker::new(&catalog, &ComplianceRules::default()).check(&layout);
//! assert_eq!(report.status(), ComplianceStatus::FullyCompliant);
//! ```

use std::fmt;

use yardplan_core::config::ComplianceRules;
use yardplan_core::geometry::Point;
use yardplan_core::layout::Layout;
use yardplan_core::vehicle::VehicleCatalog;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::boundary::LotBoundary;
use crate::kernel::{self, EPS};
use crate::spatial_index::SpatialIndex;

/// Violation severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Error,
    Warning,
}

/// Rule family a violation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RuleCategory {
    Dimensions,
    Spacing,
    Boundary,
    Fire,
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Violation {
    pub severity: Severity,
    pub category: RuleCategory,
    /// Ids of the offending spaces.
    pub space_ids: Vec<u32>,
    pub message: String,
    /// Where to look, usually a space center.
    pub location: Option<Point>,
}

/// Overall verdict of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceStatus {
    NonCompliant,
    CompliantWithWarnings,
    FullyCompliant,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NonCompliant => "Non-Compliant",
            Self::CompliantWithWarnings => "Compliant with Warnings",
            Self::FullyCompliant => "Fully Compliant",
        })
    }
}

/// Result of a compliance check.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComplianceReport {
    /// Violations in rule order.
    pub violations: Vec<Violation>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl ComplianceReport {
    fn push(&mut self, violation: Violation) {
        match violation.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        self.violations.push(violation);
    }

    /// Overall verdict.
    pub fn status(&self) -> ComplianceStatus {
        if self.error_count > 0 {
            ComplianceStatus::NonCompliant
        } else if self.warning_count > 0 {
            ComplianceStatus::CompliantWithWarnings
        } else {
            ComplianceStatus::FullyCompliant
        }
    }

    /// Returns true if there are no errors.
    pub fn is_compliant(&self) -> bool {
        self.error_count == 0
    }

    /// Violations of one category.
    pub fn by_category(&self, category: RuleCategory) -> impl Iterator<Item = &Violation> + '_ {
        self.violations.iter().filter(move |v| v.category == category)
    }
}

/// Checks layouts against dimension, boundary, spacing and fire rules.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceChecker<'a> {
    catalog: &'a VehicleCatalog,
    rules: &'a ComplianceRules,
}

impl<'a> ComplianceChecker<'a> {
    /// Creates a checker.
    pub fn new(catalog: &'a VehicleCatalog, rules: &'a ComplianceRules) -> Self {
        Self { catalog, rules }
    }

    /// Runs every rule over `layout`.
    pub fn check(&self, layout: &Layout) -> ComplianceReport {
        let mut report = ComplianceReport::default();
        self.check_dimensions(layout, &mut report);
        self.check_boundary(layout, &mut report);
        self.check_spacing(layout, &mut report);
        self.check_fire_access(layout, &mut report);
        log::info!(
            "Compliance check of {}: {} ({} errors, {} warnings)",
            layout.name,
            report.status(),
            report.error_count,
            report.warning_count
        );
        report
    }

    fn check_dimensions(&self, layout: &Layout, report: &mut ComplianceReport) {
        for space in &layout.spaces {
            let Some(spec) = self.catalog.get(&space.space_type) else {
                report.push(Violation {
                    severity: Severity::Warning,
                    category: RuleCategory::Dimensions,
                    space_ids: vec![space.id],
                    message: format!(
                        "Space {}: unknown vehicle type {}",
                        space.label, space.space_type
                    ),
                    location: Some(space.center()),
                });
                continue;
            };
            if space.length < spec.min_length - EPS {
                report.push(Violation {
                    severity: Severity::Error,
                    category: RuleCategory::Dimensions,
                    space_ids: vec![space.id],
                    message: format!(
                        "Space {}: Length {}m is below minimum {}m for {}",
                        space.label, space.length, spec.min_length, space.space_type
                    ),
                    location: Some(space.center()),
                });
            }
            if space.width < spec.min_width - EPS {
                report.push(Violation {
                    severity: Severity::Error,
                    category: RuleCategory::Dimensions,
                    space_ids: vec![space.id],
                    message: format!(
                        "Space {}: Width {}m is below minimum {}m for {}",
                        space.label, space.width, spec.min_width, space.space_type
                    ),
                    location: Some(space.center()),
                });
            }
        }
    }

    fn check_boundary(&self, layout: &Layout, report: &mut ComplianceReport) {
        let Some(lot) = lot_boundary(layout) else {
            log::warn!("Layout {} has no usable lot outline", layout.name);
            return;
        };
        for space in &layout.spaces {
            if !lot.contains_rect(&space.rect()) {
                report.push(Violation {
                    severity: Severity::Error,
                    category: RuleCategory::Boundary,
                    space_ids: vec![space.id],
                    message: format!("Space {} extends beyond lot boundary", space.label),
                    location: Some(space.center()),
                });
            }
        }
    }

    fn check_spacing(&self, layout: &Layout, report: &mut ComplianceReport) {
        let spacing = self.rules.min_vehicle_spacing;
        let rects: Vec<_> = layout.spaces.iter().map(|s| s.rect()).collect();
        let index = SpatialIndex::from_rects(&rects);

        for (i, rect) in rects.iter().enumerate() {
            for j in index.potential_neighbors(rect, spacing) {
                if j <= i {
                    continue;
                }
                let (a, b) = (&layout.spaces[i], &layout.spaces[j]);
                if kernel::rects_intersect(rect, &rects[j]) {
                    report.push(Violation {
                        severity: Severity::Error,
                        category: RuleCategory::Spacing,
                        space_ids: vec![a.id, b.id],
                        message: format!("Spaces {} and {} overlap", a.label, b.label),
                        location: Some(a.center()),
                    });
                } else if kernel::rect_distance(rect, &rects[j]) < spacing - EPS {
                    report.push(Violation {
                        severity: Severity::Warning,
                        category: RuleCategory::Spacing,
                        space_ids: vec![a.id, b.id],
                        message: format!(
                            "Spaces {} and {} have less than {}m spacing",
                            a.label, b.label, spacing
                        ),
                        location: Some(a.center()),
                    });
                }
            }
        }
    }

    fn check_fire_access(&self, layout: &Layout, report: &mut ComplianceReport) {
        let max = self.rules.fire_access_max_distance;
        let lot = lot_boundary(layout);

        for space in &layout.spaces {
            let center = space.center();
            let to_boundary = lot
                .as_ref()
                .map_or(f64::INFINITY, |lot| lot.distance_to_edge(center));
            let to_lane = layout
                .lanes
                .iter()
                .filter(|lane| !lane.path.is_empty())
                .map(|lane| kernel::point_polyline_distance(center, &lane.path))
                .fold(f64::INFINITY, f64::min);
            let nearest = to_boundary.min(to_lane);
            if nearest > max + EPS {
                report.push(Violation {
                    severity: Severity::Warning,
                    category: RuleCategory::Fire,
                    space_ids: vec![space.id],
                    message: format!(
                        "Space {} is {:.1}m from nearest access (max recommended: {}m)",
                        space.label, nearest, max
                    ),
                    location: Some(center),
                });
            }
        }
    }
}

/// The lot outline: the stored boundary, or the lot rectangle when the
/// layout carries none.
fn lot_boundary(layout: &Layout) -> Option<LotBoundary> {
    if layout.boundary.len() >= 3 {
        LotBoundary::new(layout.boundary.clone()).ok()
    } else if layout.lot_width > 0.0 && layout.lot_length > 0.0 {
        LotBoundary::rectangle(layout.lot_width, layout.lot_length).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yardplan_core::geometry::OrientedRect;
    use yardplan_core::layout::{Lane, LaneType, ParkingSpace};

    fn lot(width: f64, length: f64) -> Layout {
        Layout::new("test").with_boundary(vec![
            (0.0, 0.0),
            (width, 0.0),
            (width, length),
            (0.0, length),
        ])
    }

    fn van(id: u32, x: f64, y: f64) -> ParkingSpace {
        ParkingSpace::new(id, "van", OrientedRect::new(x, y, 7.0, 3.0), "V")
    }

    fn check(layout: &Layout) -> ComplianceReport {
        let catalog = VehicleCatalog::default();
        let rules = ComplianceRules::default();
        ComplianceChecker::new(&catalog, &rules).check(layout)
    }

    #[test]
    fn test_clean_layout() {
        let mut layout = lot(20.0, 10.0);
        layout.add_space(van(1, 1.0, 1.0));
        layout.add_space(van(2, 1.0, 5.0));
        let report = check(&layout);
        assert_eq!(report.status(), ComplianceStatus::FullyCompliant);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_dimension_violation() {
        let mut layout = lot(20.0, 10.0);
        layout.add_space(ParkingSpace::new(
            1,
            "van",
            OrientedRect::new(1.0, 1.0, 5.0, 3.0),
            "V",
        ));
        let report = check(&layout);
        assert_eq!(report.error_count, 1);
        assert_eq!(
            report.violations[0].message,
            "Space V-1: Length 5m is below minimum 6m for van"
        );
        assert_eq!(report.status(), ComplianceStatus::NonCompliant);
    }

    #[test]
    fn test_boundary_uses_polygon() {
        // Inside the bounding box of the triangle but outside the triangle
        let mut layout =
            Layout::new("tri").with_boundary(vec![(0.0, 0.0), (30.0, 0.0), (0.0, 30.0)]);
        layout.add_space(van(1, 1.0, 1.0));
        layout.add_space(van(2, 20.0, 20.0));
        let report = check(&layout);
        let boundary: Vec<_> = report.by_category(RuleCategory::Boundary).collect();
        assert_eq!(boundary.len(), 1);
        assert_eq!(boundary[0].space_ids, vec![2]);
    }

    #[test]
    fn test_falls_back_to_lot_rectangle() {
        let mut layout = Layout::new("rect");
        layout.lot_width = 10.0;
        layout.lot_length = 10.0;
        layout.add_space(van(1, 5.0, 1.0));
        let report = check(&layout);
        assert_eq!(report.by_category(RuleCategory::Boundary).count(), 1);
    }

    #[test]
    fn test_overlap_and_too_close() {
        let mut layout = lot(40.0, 30.0);
        layout.add_space(van(1, 1.0, 1.0));
        layout.add_space(van(2, 5.0, 2.0));
        layout.add_space(van(3, 1.0, 14.0));
        layout.add_space(van(4, 1.0, 17.5));
        let report = check(&layout);
        let spacing: Vec<_> = report.by_category(RuleCategory::Spacing).collect();
        assert_eq!(spacing.len(), 2);
        assert_eq!(spacing[0].severity, Severity::Error);
        assert_eq!(spacing[0].space_ids, vec![1, 2]);
        assert_eq!(spacing[1].severity, Severity::Warning);
        assert_eq!(spacing[1].message, "Spaces V-3 and V-4 have less than 1m spacing");
    }

    #[test]
    fn test_rotated_overlap_detected() {
        // Axis-aligned boxes overlap, rotated footprints do not
        let mut layout = lot(60.0, 60.0);
        layout.add_space(ParkingSpace::new(
            1,
            "van",
            OrientedRect::new(20.0, 20.0, 7.0, 3.0).with_rotation(45.0),
            "V",
        ));
        layout.add_space(ParkingSpace::new(
            2,
            "van",
            OrientedRect::new(24.5, 15.5, 7.0, 3.0).with_rotation(45.0),
            "V",
        ));
        let report = check(&layout);
        assert_eq!(report.by_category(RuleCategory::Spacing).count(), 0);
    }

    #[test]
    fn test_fire_access() {
        let mut layout = lot(60.0, 60.0);
        layout.add_space(van(1, 26.5, 28.5));
        let report = check(&layout);
        let fire: Vec<_> = report.by_category(RuleCategory::Fire).collect();
        assert_eq!(fire.len(), 1);
        assert_eq!(
            fire[0].message,
            "Space V-1 is 30.0m from nearest access (max recommended: 10m)"
        );
        assert_eq!(report.status(), ComplianceStatus::CompliantWithWarnings);

        layout.lanes.push(Lane::new(
            "main",
            LaneType::OneWay,
            6.0,
            vec![(30.0, 0.0), (30.0, 60.0)],
        ));
        assert_eq!(check(&layout).by_category(RuleCategory::Fire).count(), 0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ComplianceStatus::NonCompliant.to_string(), "Non-Compliant");
        assert_eq!(
            ComplianceStatus::CompliantWithWarnings.to_string(),
            "Compliant with Warnings"
        );
        assert_eq!(ComplianceStatus::FullyCompliant.to_string(), "Fully Compliant");
    }
}
