//! Polygon and oriented-rectangle primitives.
//!
//! Everything here is a pure function over immutable geometry values. Polygon
//! values are `geo` polygons; boolean operations go through `i_overlay` with a
//! non-zero fill rule, so every ring is normalized (outer rings
//! counter-clockwise, holes clockwise) before it is handed over.
//!
//! Buffers are Minkowski offsets built from edge capsules: a positive buffer is
//! the union of the polygon with a capsule around every edge, a negative buffer
//! is the polygon minus those capsules. Arcs are approximated with
//! [`ARC_SEGMENTS_PER_QUARTER`] segments per quarter circle.

use geo::{Area, Centroid, ConvexHull, Coord, LineString, MultiPoint, MultiPolygon, Polygon};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use yardplan_core::geometry::{distance, OrientedRect, Point};
use yardplan_core::robust::{segments_intersect, signed_area};

/// Segments used to approximate a quarter circle in buffers.
pub const ARC_SEGMENTS_PER_QUARTER: usize = 8;

/// Contours below this area are dropped from overlay output.
const AREA_EPS: f64 = 1e-9;

/// Distance slack for closed predicates.
pub const EPS: f64 = 1e-9;

// ============================================================================
// Conversions
// ============================================================================

/// Builds a polygon from an open or closed point ring.
pub fn polygon_from_points(points: &[Point]) -> Polygon<f64> {
    Polygon::new(LineString::from(open_ring(points)), Vec::new())
}

/// Polygon form of an oriented rectangle.
pub fn to_polygon(rect: &OrientedRect) -> Polygon<f64> {
    polygon_from_points(&rect.corners())
}

/// Exterior ring of a polygon as open points.
pub fn exterior_points(polygon: &Polygon<f64>) -> Vec<Point> {
    ring_points(polygon.exterior())
}

fn ring_points(ring: &LineString<f64>) -> Vec<Point> {
    let pts: Vec<Point> = ring.coords().map(|c| (c.x, c.y)).collect();
    open_ring(&pts)
}

fn open_ring(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts
}

/// All rings (exterior and holes) of a polygon as open point lists.
pub fn rings(polygon: &Polygon<f64>) -> Vec<Vec<Point>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors().iter())
        .map(ring_points)
        .filter(|r| r.len() >= 2)
        .collect()
}

fn multi(polygon: Polygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon])
}

fn to_contours(mp: &MultiPolygon<f64>) -> Vec<Vec<[f64; 2]>> {
    let mut contours = Vec::new();
    for polygon in &mp.0 {
        push_contour(&mut contours, polygon.exterior(), true);
        for hole in polygon.interiors() {
            push_contour(&mut contours, hole, false);
        }
    }
    contours
}

fn push_contour(out: &mut Vec<Vec<[f64; 2]>>, ring: &LineString<f64>, ccw: bool) {
    let pts = ring_points(ring);
    if pts.len() < 3 {
        return;
    }
    let area = signed_area(&pts);
    if area.abs() < AREA_EPS {
        return;
    }
    let mut contour: Vec<[f64; 2]> = pts.into_iter().map(|(x, y)| [x, y]).collect();
    if (area > 0.0) != ccw {
        contour.reverse();
    }
    out.push(contour);
}

fn contour_ring(contour: Vec<[f64; 2]>) -> LineString<f64> {
    LineString::from(
        contour
            .into_iter()
            .map(|[x, y]| Coord { x, y })
            .collect::<Vec<_>>(),
    )
}

fn from_shapes(shapes: Vec<Vec<Vec<[f64; 2]>>>) -> MultiPolygon<f64> {
    shapes
        .into_iter()
        .filter_map(|shape| {
            let mut contours = shape.into_iter().filter(|c| c.len() >= 3);
            let outer = contours.next()?;
            let outer_pts: Vec<Point> = outer.iter().map(|p| (p[0], p[1])).collect();
            if signed_area(&outer_pts).abs() < AREA_EPS {
                return None;
            }
            let holes = contours.map(contour_ring).collect();
            Some(Polygon::new(contour_ring(outer), holes))
        })
        .collect()
}

fn overlay(subject: &MultiPolygon<f64>, clip: &MultiPolygon<f64>, rule: OverlayRule) -> MultiPolygon<f64> {
    let subject_contours = to_contours(subject);
    let clip_contours = to_contours(clip);

    if subject_contours.is_empty() || clip_contours.is_empty() {
        return match rule {
            OverlayRule::Union if subject_contours.is_empty() => clip.clone(),
            OverlayRule::Union | OverlayRule::Difference if clip_contours.is_empty() => {
                subject.clone()
            }
            _ => MultiPolygon::new(Vec::new()),
        };
    }

    let shapes = subject_contours.overlay(&clip_contours, rule, FillRule::NonZero);
    from_shapes(shapes)
}

// ============================================================================
// Measures
// ============================================================================

/// Area of a polygon (holes subtracted).
#[inline]
pub fn polygon_area(polygon: &Polygon<f64>) -> f64 {
    polygon.unsigned_area()
}

/// Total area of a multipolygon.
#[inline]
pub fn area(mp: &MultiPolygon<f64>) -> f64 {
    mp.unsigned_area()
}

/// Total ring length of a multipolygon.
pub fn perimeter(mp: &MultiPolygon<f64>) -> f64 {
    mp.0.iter()
        .flat_map(rings)
        .map(|ring| {
            let n = ring.len();
            (0..n).map(|i| distance(ring[i], ring[(i + 1) % n])).sum::<f64>()
        })
        .sum()
}

/// Area centroid, `None` for an empty polygon.
pub fn centroid(polygon: &Polygon<f64>) -> Option<Point> {
    polygon.centroid().map(|p| (p.x(), p.y()))
}

/// Axis-aligned bounds `[min_x, min_y, max_x, max_y]` of a polygon.
pub fn polygon_bounds(polygon: &Polygon<f64>) -> Option<[f64; 4]> {
    yardplan_core::geometry::bounds(&exterior_points(polygon))
}

/// Splits a multipolygon into its disjoint parts, largest first.
pub fn parts(mp: MultiPolygon<f64>) -> Vec<Polygon<f64>> {
    let mut parts = mp.0;
    parts.sort_by(|a, b| polygon_area(b).total_cmp(&polygon_area(a)));
    parts
}

// ============================================================================
// Boolean operations and buffers
// ============================================================================

/// `a ∪ b`.
pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    overlay(a, b, OverlayRule::Union)
}

/// `a \ b`. May yield several disjoint parts.
pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    overlay(a, b, OverlayRule::Difference)
}

/// `a ∩ b`.
pub fn intersection(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    overlay(a, b, OverlayRule::Intersect)
}

/// Closed disk approximated as a regular polygon.
pub fn disk(center: Point, radius: f64) -> Polygon<f64> {
    let n = ARC_SEGMENTS_PER_QUARTER * 4;
    let pts: Vec<Point> = (0..n)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            (center.0 + radius * a.cos(), center.1 + radius * a.sin())
        })
        .collect();
    polygon_from_points(&pts)
}

/// Stadium around segment `a-b` (all points within `radius` of the segment).
pub fn capsule(a: Point, b: Point, radius: f64) -> Polygon<f64> {
    let len = distance(a, b);
    if len < EPS {
        return disk(a, radius);
    }
    let theta = (b.1 - a.1).atan2(b.0 - a.0);
    let half = ARC_SEGMENTS_PER_QUARTER * 2;
    let mut pts = Vec::with_capacity(2 * (half + 1));
    for (center, start) in [(b, theta - std::f64::consts::FRAC_PI_2), (a, theta + std::f64::consts::FRAC_PI_2)] {
        for i in 0..=half {
            let ang = start + std::f64::consts::PI * i as f64 / half as f64;
            pts.push((center.0 + radius * ang.cos(), center.1 + radius * ang.sin()));
        }
    }
    polygon_from_points(&pts)
}

/// Rectangle of half-width `radius` around segment `a-b`, with flat ends.
fn flat_segment(a: Point, b: Point, radius: f64) -> Option<Polygon<f64>> {
    let len = distance(a, b);
    if len < EPS {
        return None;
    }
    let (nx, ny) = (-(b.1 - a.1) / len * radius, (b.0 - a.0) / len * radius);
    Some(polygon_from_points(&[
        (a.0 - nx, a.1 - ny),
        (b.0 - nx, b.1 - ny),
        (b.0 + nx, b.1 + ny),
        (a.0 + nx, a.1 + ny),
    ]))
}

/// Minkowski offset of a region.
///
/// Positive `distance` expands, negative shrinks. Shrinking past the region's
/// extent yields an empty multipolygon.
pub fn buffer(mp: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    if distance.abs() < EPS || mp.0.is_empty() {
        return mp.clone();
    }
    let radius = distance.abs();
    let capsules: MultiPolygon<f64> = mp
        .0
        .iter()
        .flat_map(rings)
        .flat_map(|ring| {
            let n = ring.len();
            (0..n)
                .map(|i| capsule(ring[i], ring[(i + 1) % n], radius))
                .collect::<Vec<_>>()
        })
        .collect();

    if distance > 0.0 {
        union(mp, &capsules)
    } else {
        difference(mp, &capsules)
    }
}

/// Buffers a single polygon.
pub fn buffer_polygon(polygon: &Polygon<f64>, distance: f64) -> MultiPolygon<f64> {
    buffer(&multi(polygon.clone()), distance)
}

/// Buffers a polyline with flat end caps and round joins.
pub fn buffer_polyline(path: &[Point], radius: f64) -> MultiPolygon<f64> {
    if path.len() < 2 || radius <= 0.0 {
        return MultiPolygon::new(Vec::new());
    }
    let mut pieces: Vec<Polygon<f64>> = path
        .windows(2)
        .filter_map(|w| flat_segment(w[0], w[1], radius))
        .collect();
    pieces.extend(path[1..path.len() - 1].iter().map(|&p| disk(p, radius)));
    if pieces.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    let first = multi(pieces.remove(0));
    union(&first, &MultiPolygon::new(pieces))
}

/// Returns true if `b` lies inside `a`, allowing a leak of at most `tolerance`
/// thickness along `b`'s outline.
pub fn contains(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, tolerance: f64) -> bool {
    let b_area = area(b);
    if b_area < AREA_EPS {
        return true;
    }
    let leak = area(&difference(b, a));
    leak <= tolerance.max(EPS) * perimeter(b).max(1.0)
}

// ============================================================================
// Distances and rectangle predicates
// ============================================================================

/// Distance from `p` to the closed segment `a-b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    distance(p, closest_point_on_segment(p, a, b))
}

/// Point of segment `a-b` closest to `p`.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 < EPS * EPS {
        return a;
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
    (a.0 + t * dx, a.1 + t * dy)
}

/// Distance between closed segments `a-b` and `c-d`.
pub fn segment_distance(a: Point, b: Point, c: Point, d: Point) -> f64 {
    if segments_intersect(a, b, c, d) {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}

/// Distance from `p` to a polyline; infinite for an empty path.
pub fn point_polyline_distance(p: Point, path: &[Point]) -> f64 {
    match path {
        [] => f64::INFINITY,
        [q] => distance(p, *q),
        _ => path
            .windows(2)
            .map(|w| point_segment_distance(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Closed separating-axis test for two oriented rectangles; touching counts.
pub fn rects_intersect(a: &OrientedRect, b: &OrientedRect) -> bool {
    let ca = a.corners();
    let cb = b.corners();
    let (a_u, a_v) = a.axes();
    let (b_u, b_v) = b.axes();
    for axis in [a_u, a_v, b_u, b_v] {
        let (min_a, max_a) = project(&ca, axis);
        let (min_b, max_b) = project(&cb, axis);
        if max_a < min_b - EPS || max_b < min_a - EPS {
            return false;
        }
    }
    true
}

fn project(corners: &[Point; 4], axis: Point) -> (f64, f64) {
    corners.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let d = p.0 * axis.0 + p.1 * axis.1;
        (lo.min(d), hi.max(d))
    })
}

/// Euclidean distance between two oriented rectangles (0 when they intersect).
pub fn rect_distance(a: &OrientedRect, b: &OrientedRect) -> f64 {
    if rects_intersect(a, b) {
        return 0.0;
    }
    let ca = a.corners();
    let cb = b.corners();
    let mut best = f64::INFINITY;
    for i in 0..4 {
        for j in 0..4 {
            best = best.min(segment_distance(ca[i], ca[(i + 1) % 4], cb[j], cb[(j + 1) % 4]));
        }
    }
    best
}

/// Minimum-area oriented bounding rectangle via rotating calipers over the
/// convex hull.
///
/// The result's `length` runs along the winning hull edge direction and its
/// `rotation` is that direction in degrees. Fewer than three distinct hull
/// points give a zero-area rectangle.
pub fn minimum_bounding_rectangle(points: &[Point]) -> OrientedRect {
    let Some(&first) = points.first() else {
        return OrientedRect::new(0.0, 0.0, 0.0, 0.0);
    };
    let hull = MultiPoint::from(points.to_vec()).convex_hull();
    let mut hull_pts = exterior_points(&hull);
    hull_pts.dedup_by(|a, b| distance(*a, *b) < EPS);
    if hull_pts.len() < 3 || polygon_area(&hull) < AREA_EPS {
        return OrientedRect::new(first.0, first.1, 0.0, 0.0);
    }

    let n = hull_pts.len();
    let mut best: Option<(f64, OrientedRect)> = None;
    for i in 0..n {
        let (p, q) = (hull_pts[i], hull_pts[(i + 1) % n]);
        let len = distance(p, q);
        if len < EPS {
            continue;
        }
        let u = ((q.0 - p.0) / len, (q.1 - p.1) / len);
        let v = (-u.1, u.0);
        let (mut min_u, mut max_u, mut min_v, mut max_v) =
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for h in &hull_pts {
            let pu = h.0 * u.0 + h.1 * u.1;
            let pv = h.0 * v.0 + h.1 * v.1;
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }
        let (length, width) = (max_u - min_u, max_v - min_v);
        let rect_area = length * width;
        if best.as_ref().map_or(true, |(a, _)| rect_area < *a - EPS) {
            let (cu, cv) = ((min_u + max_u) / 2.0, (min_v + max_v) / 2.0);
            let center = (cu * u.0 + cv * v.0, cu * u.1 + cv * v.1);
            let rect = OrientedRect::new(center.0 - length / 2.0, center.1 - width / 2.0, length, width)
                .with_rotation(u.1.atan2(u.0).to_degrees());
            best = Some((rect_area, rect));
        }
    }
    best.map_or(OrientedRect::new(first.0, first.1, 0.0, 0.0), |(_, r)| r)
}

// ============================================================================
// Prepared polygons
// ============================================================================

/// Edge list of a region with bounding boxes, for repeated point, segment and
/// rectangle queries against the same region.
#[derive(Debug, Clone)]
pub struct PreparedPolygon {
    edges: Vec<(Point, Point)>,
    edge_boxes: Vec<[f64; 4]>,
    bounds: [f64; 4],
}

impl PreparedPolygon {
    /// Prepares a single polygon.
    pub fn new(polygon: &Polygon<f64>) -> Self {
        Self::from_rings(rings(polygon))
    }

    /// Prepares every part of a multipolygon.
    pub fn from_multi(mp: &MultiPolygon<f64>) -> Self {
        Self::from_rings(mp.0.iter().flat_map(rings).collect())
    }

    fn from_rings(rings: Vec<Vec<Point>>) -> Self {
        let mut edges = Vec::new();
        for ring in &rings {
            let n = ring.len();
            for i in 0..n {
                let (a, b) = (ring[i], ring[(i + 1) % n]);
                if distance(a, b) > 0.0 {
                    edges.push((a, b));
                }
            }
        }
        let edge_boxes: Vec<[f64; 4]> = edges
            .iter()
            .map(|(a, b)| [a.0.min(b.0), a.1.min(b.1), a.0.max(b.0), a.1.max(b.1)])
            .collect();
        let bounds = edge_boxes.iter().fold(
            [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
            |acc, b| [acc[0].min(b[0]), acc[1].min(b[1]), acc[2].max(b[2]), acc[3].max(b[3])],
        );
        Self {
            edges,
            edge_boxes,
            bounds,
        }
    }

    /// Returns true if the region has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Bounds `[min_x, min_y, max_x, max_y]`.
    pub fn bounds(&self) -> [f64; 4] {
        self.bounds
    }

    /// Even-odd point test. Points exactly on an edge may go either way.
    pub fn contains_point(&self, p: Point) -> bool {
        let mut inside = false;
        for &(a, b) in &self.edges {
            if (a.1 > p.1) != (b.1 > p.1) {
                let x = a.0 + (p.1 - a.1) * (b.0 - a.0) / (b.1 - a.1);
                if p.0 < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Distance from `p` to the nearest edge.
    pub fn distance_to_edges(&self, p: Point) -> f64 {
        self.edges
            .iter()
            .map(|&(a, b)| point_segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Nearest point on any edge.
    pub fn nearest_edge_point(&self, p: Point) -> Option<Point> {
        self.edges
            .iter()
            .map(|&(a, b)| closest_point_on_segment(p, a, b))
            .min_by(|x, y| distance(p, *x).total_cmp(&distance(p, *y)))
    }

    /// Returns true if `p` is inside or within `tolerance` of an edge.
    pub fn covers_point(&self, p: Point, tolerance: f64) -> bool {
        self.contains_point(p) || self.distance_to_edges(p) <= tolerance
    }

    /// Closed containment of an oriented rectangle.
    ///
    /// The rectangle is inside when no edge of the region enters its interior
    /// and its center lies inside the region.
    pub fn contains_rect(&self, rect: &OrientedRect) -> bool {
        let bb = rect.aabb();
        if bb[0] < self.bounds[0] - EPS
            || bb[1] < self.bounds[1] - EPS
            || bb[2] > self.bounds[2] + EPS
            || bb[3] > self.bounds[3] + EPS
        {
            return false;
        }
        let corners = rect.corners();
        for (i, &(a, b)) in self.edges.iter().enumerate() {
            let eb = &self.edge_boxes[i];
            if eb[2] < bb[0] || eb[0] > bb[2] || eb[3] < bb[1] || eb[1] > bb[3] {
                continue;
            }
            if segment_enters_convex(a, b, &corners) {
                return false;
            }
        }
        self.contains_point(rect.center())
    }

    /// Closed containment of segment `a-b`, with `tolerance` slack at the edges.
    pub fn contains_segment(&self, a: Point, b: Point, tolerance: f64) -> bool {
        if !self.covers_point(a, tolerance) || !self.covers_point(b, tolerance) {
            return false;
        }
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len2 = dx * dx + dy * dy;
        if len2 < EPS * EPS {
            return true;
        }

        let mut ts = vec![0.0, 1.0];
        for &(c, d) in &self.edges {
            let (ex, ey) = (d.0 - c.0, d.1 - c.1);
            let denom = dx * ey - dy * ex;
            let (wx, wy) = (c.0 - a.0, c.1 - a.1);
            if denom.abs() > 1e-15 {
                let t = (wx * ey - wy * ex) / denom;
                let u = (wx * dy - wy * dx) / denom;
                if (0.0..=1.0).contains(&t) && (-1e-12..=1.0 + 1e-12).contains(&u) {
                    ts.push(t);
                }
            } else {
                for q in [c, d] {
                    let t = ((q.0 - a.0) * dx + (q.1 - a.1) * dy) / len2;
                    if (0.0..=1.0).contains(&t) {
                        ts.push(t);
                    }
                }
            }
        }
        ts.sort_by(f64::total_cmp);
        ts.windows(2).filter(|w| w[1] - w[0] > 1e-12).all(|w| {
            let t = (w[0] + w[1]) / 2.0;
            self.covers_point((a.0 + t * dx, a.1 + t * dy), tolerance)
        })
    }

    /// Closed containment of a polyline.
    pub fn contains_polyline(&self, path: &[Point], tolerance: f64) -> bool {
        match path {
            [] => true,
            [p] => self.covers_point(*p, tolerance),
            _ => path
                .windows(2)
                .all(|w| self.contains_segment(w[0], w[1], tolerance)),
        }
    }

    /// First edge crossing of the ray `origin + t * dir`, `t > 0`.
    pub fn ray_hit(&self, origin: Point, dir: Point) -> Option<Point> {
        let mut best: Option<f64> = None;
        for &(c, d) in &self.edges {
            let (ex, ey) = (d.0 - c.0, d.1 - c.1);
            let denom = dir.0 * ey - dir.1 * ex;
            if denom.abs() < 1e-15 {
                continue;
            }
            let (wx, wy) = (c.0 - origin.0, c.1 - origin.1);
            let t = (wx * ey - wy * ex) / denom;
            let u = (wx * dir.1 - wy * dir.0) / denom;
            if t > EPS && (0.0..=1.0).contains(&u) && best.map_or(true, |b| t < b) {
                best = Some(t);
            }
        }
        best.map(|t| (origin.0 + t * dir.0, origin.1 + t * dir.1))
    }
}

/// Returns true if segment `a-b` meets the interior of the convex CCW quad.
///
/// Cyrus-Beck clip against the quad shrunk by [`EPS`]: segments that only run
/// along or touch the outline do not count.
fn segment_enters_convex(a: Point, b: Point, corners: &[Point; 4]) -> bool {
    let d = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for i in 0..4 {
        let c = corners[i];
        let e = (corners[(i + 1) % 4].0 - c.0, corners[(i + 1) % 4].1 - c.1);
        let len = e.0.hypot(e.1);
        if len < EPS {
            continue;
        }
        // Outward normal of a CCW edge
        let n = (e.1 / len, -e.0 / len);
        let num = n.0 * (a.0 - c.0) + n.1 * (a.1 - c.1) + EPS;
        let den = n.0 * d.0 + n.1 * d.1;
        if den.abs() < 1e-15 {
            if num >= 0.0 {
                return false;
            }
        } else if den > 0.0 {
            t1 = t1.min(-num / den);
        } else {
            t0 = t0.max(-num / den);
        }
        if t0 >= t1 {
            return false;
        }
    }
    t0 < t1
}

/// Wraps a polygon in a multipolygon.
pub fn to_multi(polygon: &Polygon<f64>) -> MultiPolygon<f64> {
    multi(polygon.clone())
}
