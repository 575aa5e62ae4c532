//! Candidate placement generation.
//!
//! Each parking zone is scanned on a regular grid anchored at the zone's
//! lower-left bound. At every grid point each allowed vehicle type is tried at
//! each allowed rotation, and the footprint is kept when it lies inside the
//! zone, can be reached from the lane, and has fire access.
//!
//! The scan order is fixed (zone, x, y, type, rotation), so the same inputs
//! always produce the same candidate sequence.

use std::time::Instant;

use geo::Polygon;
use yardplan_core::config::PlannerConfig;
use yardplan_core::geometry::{OrientedRect, Point};
use yardplan_core::layout::ParkingSpace;
use yardplan_core::revenue::space_revenue;
use yardplan_core::vehicle::VehicleTypeSpec;

use crate::boundary::LotBoundary;
use crate::kernel::{self, PreparedPolygon};
use crate::selection::VehicleMix;

/// Rotations tried when the request names none.
pub const DEFAULT_ROTATIONS: [f64; 2] = [0.0, 90.0];

/// A feasible but unconfirmed space placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Position in the generated sequence.
    pub id: usize,
    /// Vehicle type key.
    pub space_type: String,
    /// Index of the type in the catalog.
    pub type_index: usize,
    /// Footprint.
    pub rect: OrientedRect,
    /// Expected annual revenue of the space.
    pub revenue: f64,
}

impl Candidate {
    /// Converts the placement into a layout space.
    pub fn to_space(&self, id: u32, label_prefix: &str) -> ParkingSpace {
        ParkingSpace::new(id, self.space_type.clone(), self.rect, label_prefix)
    }
}

/// Sorts and deduplicates rotation angles, falling back to [`DEFAULT_ROTATIONS`].
pub fn normalize_rotations(rotations: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = rotations.iter().copied().filter(|r| r.is_finite()).collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    if out.is_empty() {
        DEFAULT_ROTATIONS.to_vec()
    } else {
        out
    }
}

/// Enumerates candidate placements over parking zones.
#[derive(Debug, Clone)]
pub struct CandidateGenerator<'a> {
    config: &'a PlannerConfig,
    types: Vec<(usize, &'a VehicleTypeSpec)>,
    rotations: Vec<f64>,
}

impl<'a> CandidateGenerator<'a> {
    /// Creates a generator.
    ///
    /// When a vehicle mix is supplied only the types it names are placed.
    pub fn new(config: &'a PlannerConfig, rotations: &[f64], mix: Option<&VehicleMix>) -> Self {
        let types = config
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, spec)| mix.map_or(true, |m| m.contains_key(&spec.key)))
            .collect();
        Self {
            config,
            types,
            rotations: normalize_rotations(rotations),
        }
    }

    /// Vehicle types that will be placed.
    pub fn types(&self) -> impl Iterator<Item = &VehicleTypeSpec> + '_ {
        self.types.iter().map(|(_, spec)| *spec)
    }

    /// Rotations that will be tried.
    pub fn rotations(&self) -> &[f64] {
        &self.rotations
    }

    /// Generates every accepted placement.
    pub fn generate(
        &self,
        zones: &[Polygon<f64>],
        lane_path: &[Point],
        boundary: &LotBoundary,
    ) -> Vec<Candidate> {
        self.generate_until(zones, lane_path, boundary, None).0
    }

    /// Generates placements until `deadline` passes.
    ///
    /// The clock is read once per grid column; the columns scanned before the
    /// deadline are kept in full. The flag is false when the deadline cut the
    /// scan short.
    pub fn generate_until(
        &self,
        zones: &[Polygon<f64>],
        lane_path: &[Point],
        boundary: &LotBoundary,
        deadline: Option<Instant>,
    ) -> (Vec<Candidate>, bool) {
        let step = self.config.grid_spacing;
        let fire = self.config.compliance.fire_access_max_distance;
        let pricing = &self.config.pricing;
        let revenues: Vec<f64> = self
            .types
            .iter()
            .map(|(_, spec)| space_revenue(spec, pricing, pricing.assumed_occupancy))
            .collect();

        let mut candidates = Vec::new();
        for zone in zones {
            let Some(b) = kernel::polygon_bounds(zone) else {
                continue;
            };
            let inset = kernel::buffer_polygon(zone, -self.config.containment_tolerance);
            if inset.0.is_empty() {
                continue;
            }
            let region = PreparedPolygon::from_multi(&inset);

            let nx = grid_steps(b[0], b[2], step);
            let ny = grid_steps(b[1], b[3], step);
            for i in 0..=nx {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    log::warn!(
                        "Candidate generation stopped at the deadline with {} candidates",
                        candidates.len()
                    );
                    return (candidates, false);
                }
                let x = b[0] + i as f64 * step;
                for j in 0..=ny {
                    let y = b[1] + j as f64 * step;
                    for (k, &(type_index, spec)) in self.types.iter().enumerate() {
                        for &rotation in &self.rotations {
                            let rect = OrientedRect::new(x, y, spec.default_length, spec.default_width)
                                .with_rotation(rotation);
                            if !region.contains_rect(&rect) {
                                continue;
                            }
                            let center = rect.center();
                            let to_lane = kernel::point_polyline_distance(center, lane_path);
                            if to_lane > spec.reach() {
                                continue;
                            }
                            if boundary.distance_to_edge(center) > fire && to_lane > fire {
                                continue;
                            }
                            candidates.push(Candidate {
                                id: candidates.len(),
                                space_type: spec.key.clone(),
                                type_index,
                                rect,
                                revenue: revenues[k],
                            });
                        }
                    }
                }
            }
        }

        log::info!(
            "Generated {} candidates over {} zones ({} types, {} rotations)",
            candidates.len(),
            zones.len(),
            self.types.len(),
            self.rotations.len()
        );
        (candidates, true)
    }
}

/// Number of whole grid steps from `min` that stay within `max`.
fn grid_steps(min: f64, max: f64, step: f64) -> usize {
    if step <= 0.0 || max < min {
        return 0;
    }
    ((max - min) / step + 1e-9).floor() as usize
}
