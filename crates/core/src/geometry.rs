//! Oriented rectangle primitive shared by spaces and candidates.
//!
//! A rectangle is described by its reference corner `(x, y)` before rotation,
//! its `length` along the local x axis, its `width` along the local y axis, and
//! a counter-clockwise `rotation` in degrees applied about its own center.
//!
//! # Example
//!
//! ```rust
//! use yardplan_core::geometry::OrientedRect;
//!
//! let rect = OrientedRect::new(0.0, 0.0, 18.5, 3.5).with_rotation(90.0);
//! let (cx, cy) = rect.center();
//! assert!((cx - 9.25).abs() < 1e-9);
//! assert!((cy - 1.75).abs() < 1e-9);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D point `(x, y)`.
pub type Point = (f64, f64);

/// Rectangle with a rotation about its own center.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrientedRect {
    /// Reference corner x before rotation.
    pub x: f64,
    /// Reference corner y before rotation.
    pub y: f64,
    /// Extent along the local x axis.
    pub length: f64,
    /// Extent along the local y axis.
    pub width: f64,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f64,
}

impl OrientedRect {
    /// Creates an unrotated rectangle.
    pub fn new(x: f64, y: f64, length: f64, width: f64) -> Self {
        Self {
            x,
            y,
            length,
            width,
            rotation: 0.0,
        }
    }

    /// Sets the rotation in degrees.
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Rotation center, which is also the centroid.
    #[inline]
    pub fn center(&self) -> Point {
        (self.x + self.length / 2.0, self.y + self.width / 2.0)
    }

    /// Area of the footprint.
    #[inline]
    pub fn area(&self) -> f64 {
        self.length * self.width
    }

    /// Unit vectors of the local axes `(along length, along width)`.
    pub fn axes(&self) -> (Point, Point) {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        ((cos, sin), (-sin, cos))
    }

    /// Corners in counter-clockwise order, starting from the rotated reference corner.
    pub fn corners(&self) -> [Point; 4] {
        let (cx, cy) = self.center();
        let hl = self.length / 2.0;
        let hw = self.width / 2.0;
        let ((ux, uy), (vx, vy)) = self.axes();
        let at = |a: f64, b: f64| (cx + a * ux + b * vx, cy + a * uy + b * vy);
        [at(-hl, -hw), at(hl, -hw), at(hl, hw), at(-hl, hw)]
    }

    /// Closed polygon ring (first corner repeated at the end).
    pub fn ring(&self) -> Vec<Point> {
        let c = self.corners();
        vec![c[0], c[1], c[2], c[3], c[0]]
    }

    /// Axis-aligned bounding box as `[min_x, min_y, max_x, max_y]`.
    pub fn aabb(&self) -> [f64; 4] {
        self.corners().iter().fold(
            [
                f64::INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::NEG_INFINITY,
            ],
            |acc, &(x, y)| [acc[0].min(x), acc[1].min(y), acc[2].max(x), acc[3].max(y)],
        )
    }

    /// Returns true if all fields are finite and both extents are positive.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.length, self.width, self.rotation]
            .iter()
            .all(|v| v.is_finite())
            && self.length > 0.0
            && self.width > 0.0
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Axis-aligned extents `[min_x, min_y, max_x, max_y]` of a point set.
///
/// Returns `None` for an empty slice.
pub fn bounds(points: &[Point]) -> Option<[f64; 4]> {
    let first = points.first()?;
    Some(points.iter().fold(
        [first.0, first.1, first.0, first.1],
        |acc, &(x, y)| [acc[0].min(x), acc[1].min(y), acc[2].max(x), acc[3].max(y)],
    ))
}
