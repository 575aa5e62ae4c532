//! Robust orientation predicates.
//!
//! Thin wrappers over Shewchuk's adaptive-precision `orient2d` from the
//! `robust` crate, plus the segment and ring predicates built on it. The lot
//! kernel uses these for ring orientation and exact segment intersection tests
//! where a plain floating-point cross product can flip sign on nearly
//! collinear input.
//!
//! ## Example
//!
//! ```rust
//! use yardplan_core::robust::{orient2d, Orientation};
//!
//! assert_eq!(
//!     orient2d((0.0, 0.0), (1.0, 0.0), (0.5, 1.0)),
//!     Orientation::CounterClockwise
//! );
//! ```

use crate::geometry::Point;
use robust::{orient2d as robust_orient2d, Coord};

/// Result of an orientation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left turn.
    CounterClockwise,
    /// Right turn.
    Clockwise,
    /// Straight.
    Collinear,
}

impl Orientation {
    /// Returns true if the orientation is counter-clockwise.
    #[inline]
    pub fn is_ccw(self) -> bool {
        matches!(self, Orientation::CounterClockwise)
    }

    /// Returns true if the points are collinear.
    #[inline]
    pub fn is_collinear(self) -> bool {
        matches!(self, Orientation::Collinear)
    }
}

/// Orientation of `pc` relative to the directed line `pa -> pb`.
#[inline]
pub fn orient2d(pa: Point, pb: Point, pc: Point) -> Orientation {
    let det = orient2d_raw(pa, pb, pc);
    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Signed determinant, twice the signed triangle area.
#[inline]
pub fn orient2d_raw(pa: Point, pb: Point, pc: Point) -> f64 {
    robust_orient2d(
        Coord { x: pa.0, y: pa.1 },
        Coord { x: pb.0, y: pb.1 },
        Coord { x: pc.0, y: pc.1 },
    )
}

/// Returns true if `p` lies on the closed segment `a-b`.
pub fn point_on_segment(p: Point, a: Point, b: Point) -> bool {
    orient2d(a, b, p).is_collinear()
        && p.0 >= a.0.min(b.0)
        && p.0 <= a.0.max(b.0)
        && p.1 >= a.1.min(b.1)
        && p.1 <= a.1.max(b.1)
}

/// Returns true if closed segments `a-b` and `c-d` share at least one point.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orient2d(a, b, c);
    let o2 = orient2d(a, b, d);
    let o3 = orient2d(c, d, a);
    let o4 = orient2d(c, d, b);

    if o1 != o2 && o3 != o4 && !o1.is_collinear() && !o2.is_collinear()
        && !o3.is_collinear() && !o4.is_collinear()
    {
        return true;
    }

    point_on_segment(c, a, b)
        || point_on_segment(d, a, b)
        || point_on_segment(a, c, d)
        || point_on_segment(b, c, d)
}

/// Signed area of a ring (positive for counter-clockwise).
///
/// Accepts open or closed rings.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let n = ring.len();
    let mut twice = 0.0;
    for i in 0..n {
        let (x1, y1) = ring[i];
        let (x2, y2) = ring[(i + 1) % n];
        twice += x1 * y2 - x2 * y1;
    }
    twice / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orient2d_basic() {
        assert!(orient2d((0.0, 0.0), (1.0, 0.0), (0.5, 1.0)).is_ccw());
        assert_eq!(
            orient2d((0.0, 0.0), (1.0, 0.0), (0.5, -1.0)),
            Orientation::Clockwise
        );
        assert!(orient2d((0.0, 0.0), (1.0, 1.0), (2.0, 2.0)).is_collinear());
    }

    #[test]
    fn test_orient2d_near_collinear() {
        let a = (0.0, 0.0);
        let b = (1e10, 1e10);
        let c = (5e9, 5e9 + 1e-6);
        assert!(orient2d(a, b, c).is_ccw());
    }

    #[test]
    fn test_segments_intersect() {
        assert!(segments_intersect((0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0)));
        // Touching at an endpoint counts
        assert!(segments_intersect((0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0)));
        assert!(!segments_intersect((0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)));
        // Collinear overlap
        assert!(segments_intersect((0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (3.0, 0.0)));
    }

    #[test]
    fn test_signed_area() {
        let square = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)];
        assert!((signed_area(&square) - 4.0).abs() < 1e-12);
        let reversed: Vec<_> = square.iter().rev().copied().collect();
        assert!((signed_area(&reversed) + 4.0).abs() < 1e-12);
        assert_eq!(signed_area(&square[..2]), 0.0);
    }
}
