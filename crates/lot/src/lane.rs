//! Lane carving.
//!
//! A lane is a centerline path from an entry point to an exit point on the
//! lot boundary, widened to the configured lane width plus a maneuvering
//! buffer. Whatever is left of the lot once the lane polygon is removed is
//! split into parking zones.
//!
//! Path selection prefers the straight entry-exit segment. When that segment
//! leaves the lot, the carver routes through the lot centroid, and failing
//! that through a point between the entry and exit projected onto a shrunken
//! copy of the lot.

use geo::{MultiPolygon, Polygon};
use yardplan_core::config::{ComplianceRules, PlannerConfig};
use yardplan_core::geometry::{distance, Point};
use yardplan_core::layout::{Lane, LaneType};

use crate::boundary::LotBoundary;
use crate::kernel::{self, PreparedPolygon};

/// Extra inset beyond half the lane width when probing for room.
const INSET_MARGIN: f64 = 0.5;

/// Radius of the probe around the direct entry-exit segment.
const PROBE_RADIUS: f64 = 0.1;

/// Inward offset used to find routing points for the last-resort path.
const ROUTING_SHRINK: f64 = 2.0;

/// Leak tolerance for polygon containment checks.
const CONTAINMENT_SLACK: f64 = 1e-3;

/// Geometry of the lane being carved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneConfig {
    /// Lane direction type.
    pub lane_type: LaneType,
    /// Nominal lane width.
    pub width: f64,
    /// Extra maneuvering width on top of the nominal width.
    pub buffer: f64,
}

impl LaneConfig {
    /// Lane of the given type with the site's nominal width.
    ///
    /// One-way lanes carry a buffer of 1.0, two-way lanes 2.0.
    pub fn new(lane_type: LaneType, rules: &ComplianceRules) -> Self {
        let (width, buffer) = match lane_type {
            LaneType::OneWay => (rules.lane_width_oneway, 1.0),
            LaneType::TwoWay => (rules.lane_width_twoway, 2.0),
        };
        Self {
            lane_type,
            width,
            buffer,
        }
    }

    /// Overrides the nominal width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Overrides the maneuvering buffer.
    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer;
        self
    }

    /// Width plus buffer.
    #[inline]
    pub fn total_width(&self) -> f64 {
        self.width + self.buffer
    }
}

/// Outcome of lane carving.
#[derive(Debug, Clone)]
pub struct LaneCarveResult {
    /// The carved lane; `None` when carving stopped before a path was chosen.
    pub lane: Option<Lane>,
    /// Lane footprint clipped to the lot.
    pub lane_polygon: MultiPolygon<f64>,
    /// Usable parking regions, largest first.
    pub parking_zones: Vec<Polygon<f64>>,
    /// Ordered, human-readable notes about adjustments and failures.
    pub warnings: Vec<String>,
    /// False when no usable parking zone could be produced.
    pub success: bool,
}

impl LaneCarveResult {
    fn failed(warning: impl Into<String>) -> Self {
        Self {
            lane: None,
            lane_polygon: MultiPolygon::new(Vec::new()),
            parking_zones: Vec::new(),
            warnings: vec![warning.into()],
            success: false,
        }
    }

    /// Total area of the parking zones.
    pub fn parking_area(&self) -> f64 {
        self.parking_zones.iter().map(kernel::polygon_area).sum()
    }

    /// Area of the lane footprint.
    pub fn lane_area(&self) -> f64 {
        kernel::area(&self.lane_polygon)
    }

    /// Lane centerline, empty when there is no lane.
    pub fn lane_path(&self) -> &[Point] {
        match &self.lane {
            Some(lane) => &lane.path,
            None => &[],
        }
    }
}

/// Carves lanes out of a lot boundary.
#[derive(Debug, Clone)]
pub struct LaneCarver {
    snap_tolerance: f64,
    min_boundary_area: f64,
    min_zone_area: f64,
    min_inset_area: f64,
}

impl LaneCarver {
    /// Creates a carver with the thresholds of `config`.
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            snap_tolerance: config.snap_tolerance,
            min_boundary_area: config.min_boundary_area,
            min_zone_area: config.min_zone_area,
            min_inset_area: config.min_inset_area,
        }
    }

    /// Carves a lane from `entry` to `exit` and returns the parking zones.
    ///
    /// A missing exit is derived on the far side of the lot.
    pub fn carve(
        &self,
        boundary: &LotBoundary,
        entry: Point,
        exit: Option<Point>,
        config: &LaneConfig,
    ) -> LaneCarveResult {
        if boundary.area() < self.min_boundary_area {
            log::warn!(
                "Lot area {:.1} is below the minimum of {:.1}",
                boundary.area(),
                self.min_boundary_area
            );
            return LaneCarveResult::failed("Boundary polygon is too small or invalid");
        }

        let mut warnings = Vec::new();
        let (entry, exit) = self.resolve_endpoints(boundary, entry, exit, &mut warnings);
        let path = self.lane_path(boundary, entry, exit, config);
        let lot = boundary.to_multi();

        let lane_polygon =
            kernel::intersection(&kernel::buffer_polyline(&path, config.total_width() / 2.0), &lot);
        let mut parking_zones = self.usable_zones(&lot, &lane_polygon);

        if parking_zones.is_empty() {
            warnings.push("No usable parking zones after lane generation".to_string());
            let narrow = kernel::buffer_polyline(&path, config.width / 2.0);
            parking_zones = self.usable_zones(&lot, &narrow);
        }

        let lane = Lane::new("main", config.lane_type, config.width, path);
        let result = LaneCarveResult {
            lane: Some(lane),
            success: !parking_zones.is_empty(),
            lane_polygon,
            parking_zones,
            warnings,
        };

        log::info!(
            "Area distribution: total={:.0}, lanes={:.0}, parking={:.0}, zones={}",
            boundary.area(),
            result.lane_area(),
            result.parking_area(),
            result.parking_zones.len()
        );
        result
    }

    /// Carves a lane ring around the inside of the lot.
    ///
    /// The inner region left after offsetting the boundary inward by the total
    /// lane width is the single parking zone. The ring passes every boundary
    /// point, so entry and exit are only checked against the snap tolerance.
    pub fn carve_perimeter(
        &self,
        boundary: &LotBoundary,
        entry: Point,
        exit: Option<Point>,
        config: &LaneConfig,
    ) -> LaneCarveResult {
        let mut warnings = Vec::new();
        self.snap("Entry", boundary, entry, &mut warnings);
        if let Some(exit) = exit {
            self.snap("Exit", boundary, exit, &mut warnings);
        }

        let lot = boundary.to_multi();
        let inner = kernel::buffer(&lot, -config.total_width());
        if inner.0.is_empty() || kernel::area(&inner) < self.min_boundary_area {
            log::warn!("Lot too small for a {:.1} wide perimeter lane", config.total_width());
            return LaneCarveResult::failed("Lot too small for perimeter lanes");
        }

        let lane_polygon = kernel::difference(&lot, &inner);
        let lane = Lane::new(
            "perimeter",
            config.lane_type,
            config.width,
            boundary.points().to_vec(),
        );
        LaneCarveResult {
            lane: Some(lane),
            lane_polygon,
            parking_zones: kernel::parts(inner),
            warnings,
            success: true,
        }
    }

    /// Snaps far-away points onto the boundary and derives a missing exit.
    fn resolve_endpoints(
        &self,
        boundary: &LotBoundary,
        entry: Point,
        exit: Option<Point>,
        warnings: &mut Vec<String>,
    ) -> (Point, Point) {
        let entry = self.snap("Entry", boundary, entry, warnings);
        let exit = match exit {
            Some(exit) => self.snap("Exit", boundary, exit, warnings),
            None => {
                let exit = opposite_point(boundary, entry);
                log::warn!("No exit given, using {}", fmt_point(exit));
                warnings.push(format!(
                    "Exit point auto-generated at opposite side: {}",
                    fmt_point(exit)
                ));
                exit
            }
        };
        (entry, exit)
    }

    fn snap(&self, which: &str, boundary: &LotBoundary, p: Point, warnings: &mut Vec<String>) -> Point {
        if boundary.distance_to_edge(p) <= self.snap_tolerance {
            return p;
        }
        let snapped = boundary.nearest_edge_point(p);
        log::warn!("{} point {} is off the boundary", which, fmt_point(p));
        warnings.push(format!(
            "{} point snapped to boundary: {} → {}",
            which,
            fmt_point(p),
            fmt_point(snapped)
        ));
        snapped
    }

    /// Chooses the lane centerline.
    fn lane_path(&self, boundary: &LotBoundary, entry: Point, exit: Point, config: &LaneConfig) -> Vec<Point> {
        let half = config.total_width() / 2.0;
        let lot = boundary.to_multi();

        let inset = kernel::buffer(&lot, -(half + INSET_MARGIN));
        if inset.0.is_empty() || kernel::area(&inset) < self.min_inset_area {
            return vec![entry, exit];
        }

        if distance(entry, exit) > 1.0 {
            // The ends sit on the boundary, so only the stretch between them matters
            let probe = kernel::difference(
                &kernel::to_multi(&kernel::capsule(entry, exit, PROBE_RADIUS)),
                &MultiPolygon::new(vec![kernel::disk(entry, half), kernel::disk(exit, half)]),
            );
            if probe.0.is_empty() || kernel::contains(&lot, &probe, CONTAINMENT_SLACK) {
                return vec![entry, exit];
            }
        }

        let path = routed_path(boundary, entry, exit, self.min_inset_area);
        if path.len() > 3 {
            smooth_path(&path, &lot, half)
        } else {
            path
        }
    }

    fn usable_zones(&self, lot: &MultiPolygon<f64>, lane: &MultiPolygon<f64>) -> Vec<Polygon<f64>> {
        kernel::parts(kernel::difference(lot, lane))
            .into_iter()
            .filter(|zone| kernel::polygon_area(zone) >= self.min_zone_area)
            .collect()
    }
}

/// Direct, via-centroid, or via-midpoint path from `entry` to `exit`.
fn routed_path(boundary: &LotBoundary, entry: Point, exit: Point, min_area: f64) -> Vec<Point> {
    let prepared = boundary.prepared();
    let tol = kernel::EPS * 1e3;
    if prepared.contains_segment(entry, exit, tol) {
        return vec![entry, exit];
    }

    let centroid = boundary.centroid();
    if prepared.contains_segment(entry, centroid, tol) && prepared.contains_segment(centroid, exit, tol) {
        return vec![entry, centroid, exit];
    }

    let shrunk = kernel::parts(kernel::buffer(&boundary.to_multi(), -ROUTING_SHRINK))
        .into_iter()
        .next()
        .filter(|p| kernel::polygon_area(p) >= min_area);
    let ring = match &shrunk {
        Some(polygon) => PreparedPolygon::new(&kernel::polygon_from_points(&kernel::exterior_points(polygon))),
        None => boundary.prepared().clone(),
    };
    let a = ring.nearest_edge_point(entry).unwrap_or(entry);
    let b = ring.nearest_edge_point(exit).unwrap_or(exit);
    vec![entry, ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0), exit]
}

/// Drops waypoints wherever a straight stretch of the given half-width stays
/// inside the lot.
fn smooth_path(path: &[Point], lot: &MultiPolygon<f64>, half_width: f64) -> Vec<Point> {
    if path.len() <= 2 {
        return path.to_vec();
    }
    let mut smoothed = vec![path[0]];
    let mut i = 0;
    while i < path.len() - 1 {
        let mut j = path.len() - 1;
        while j > i + 1 {
            let stretch = kernel::to_multi(&kernel::capsule(path[i], path[j], half_width));
            if kernel::contains(lot, &stretch, CONTAINMENT_SLACK) {
                break;
            }
            j -= 1;
        }
        smoothed.push(path[j]);
        i = j;
    }
    smoothed
}

/// Boundary point reached by extending the entry-to-centroid vector.
///
/// The ray starts at the centroid and stops at the first edge it crosses, so
/// on a lot with a slot the exit lands on the near side of the slot. Without
/// a crossing the boundary point nearest `centroid + (centroid - entry)` is
/// used.
fn opposite_point(boundary: &LotBoundary, entry: Point) -> Point {
    let c = boundary.centroid();
    let dir = (c.0 - entry.0, c.1 - entry.1);
    if dir.0.hypot(dir.1) > kernel::EPS {
        if let Some(hit) = boundary.prepared().ray_hit(c, dir) {
            return hit;
        }
    }
    boundary.nearest_edge_point((c.0 + dir.0, c.1 + dir.1))
}

fn fmt_point(p: Point) -> String {
    format!("({:.2}, {:.2})", p.0, p.1)
}

/// Angle in degrees of the long side of the lot's minimum bounding rectangle.
pub fn preferred_lane_direction(boundary: &LotBoundary) -> f64 {
    let mbr = boundary.minimum_bounding_rectangle();
    if mbr.length >= mbr.width {
        mbr.rotation
    } else {
        mbr.rotation + 90.0
    }
}

/// Rough lane and row counts for a lot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneRequirements {
    /// Recommended lane width.
    pub recommended_lane_width: f64,
    /// Parking rows that fit across the short side.
    pub possible_rows: u32,
    /// Short side of the minimum bounding rectangle.
    pub lot_width: f64,
    /// Long side of the minimum bounding rectangle.
    pub lot_length: f64,
    /// Preferred lane direction in degrees.
    pub optimal_angle: f64,
}

/// Estimates lane requirements from the minimum bounding rectangle.
///
/// Every row takes one space width plus half a lane; one full lane is
/// reserved for circulation. At least one row is always reported.
pub fn estimate_lane_requirements(boundary: &LotBoundary) -> LaneRequirements {
    const LANE_WIDTH: f64 = 6.0;
    const SPACE_WIDTH: f64 = 3.5;

    let mbr = boundary.minimum_bounding_rectangle();
    let short = mbr.length.min(mbr.width);
    let row_width = SPACE_WIDTH + LANE_WIDTH / 2.0;
    let rows = ((short - LANE_WIDTH) / row_width).floor().max(1.0) as u32;

    LaneRequirements {
        recommended_lane_width: LANE_WIDTH,
        possible_rows: rows,
        lot_width: short,
        lot_length: mbr.length.max(mbr.width),
        optimal_angle: preferred_lane_direction(boundary),
    }
}
