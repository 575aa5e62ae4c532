//! Lot boundary.

use geo::{MultiPolygon, Polygon};
use yardplan_core::geometry::{bounds, OrientedRect, Point};
use yardplan_core::{Error, Result};

use crate::kernel::{self, PreparedPolygon};

/// A validated lot boundary polygon.
///
/// Self-intersections are not detected; callers must supply a simple polygon.
#[derive(Debug, Clone)]
pub struct LotBoundary {
    points: Vec<Point>,
    polygon: Polygon<f64>,
    prepared: PreparedPolygon,
    area: f64,
}

impl LotBoundary {
    /// Creates a boundary from an open or closed point ring.
    ///
    /// Fails with [`Error::InvalidBoundary`] for fewer than three distinct
    /// points or non-finite coordinates.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.iter().any(|p| !p.0.is_finite() || !p.1.is_finite()) {
            return Err(Error::InvalidBoundary(
                "boundary coordinates must be finite".to_string(),
            ));
        }
        let mut points = points;
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return Err(Error::InvalidBoundary(format!(
                "boundary must contain at least 3 points, got {}",
                points.len()
            )));
        }

        let polygon = kernel::polygon_from_points(&points);
        let prepared = PreparedPolygon::new(&polygon);
        let area = kernel::polygon_area(&polygon);
        Ok(Self {
            points,
            polygon,
            prepared,
            area,
        })
    }

    /// Axis-aligned rectangular lot with a corner at the origin.
    pub fn rectangle(width: f64, length: f64) -> Result<Self> {
        Self::new(vec![(0.0, 0.0), (width, 0.0), (width, length), (0.0, length)])
    }

    /// Boundary points (open ring).
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Polygon form.
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Polygon form as a multipolygon, for boolean operations.
    pub fn to_multi(&self) -> MultiPolygon<f64> {
        kernel::to_multi(&self.polygon)
    }

    /// Prepared edge list.
    pub fn prepared(&self) -> &PreparedPolygon {
        &self.prepared
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Area centroid, falling back to the vertex mean for degenerate rings.
    pub fn centroid(&self) -> Point {
        kernel::centroid(&self.polygon).unwrap_or_else(|| {
            let n = self.points.len() as f64;
            let (sx, sy) = self
                .points
                .iter()
                .fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1));
            (sx / n, sy / n)
        })
    }

    /// Bounds `[min_x, min_y, max_x, max_y]`.
    pub fn bounds(&self) -> [f64; 4] {
        bounds(&self.points).unwrap_or([0.0; 4])
    }

    /// Horizontal and vertical extents `(width, length)`.
    pub fn extents(&self) -> (f64, f64) {
        let b = self.bounds();
        (b[2] - b[0], b[3] - b[1])
    }

    /// Distance from `p` to the boundary ring.
    pub fn distance_to_edge(&self, p: Point) -> f64 {
        self.prepared.distance_to_edges(p)
    }

    /// Nearest point of the boundary ring.
    pub fn nearest_edge_point(&self, p: Point) -> Point {
        self.prepared.nearest_edge_point(p).unwrap_or(p)
    }

    /// Closed containment of an oriented rectangle.
    pub fn contains_rect(&self, rect: &OrientedRect) -> bool {
        self.prepared.contains_rect(rect)
    }

    /// Minimum-area oriented bounding rectangle.
    pub fn minimum_bounding_rectangle(&self) -> OrientedRect {
        kernel::minimum_bounding_rectangle(&self.points)
    }
}
