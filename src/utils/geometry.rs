// src/utils/geometry.rs
//! Pure 2D primitives shared by the BSP reconstruction passes.
//!
//! Nothing in here panics or returns errors. Degenerate input yields an
//! empty result or `None` and the caller decides what that means.

use serde::Serialize;
use std::ops::{Add, Mul, Sub};

use crate::utils::util::{clamp, nearly_equal};

/// Below this magnitude a ray direction component counts as parallel to a slab.
pub const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3D cross product.
    pub fn cross(self, other: Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(self, other: Point2D) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalized(self) -> Point2D {
        let len = self.length();
        if len == 0.0 {
            self
        } else {
            Point2D::new(self.x / len, self.y / len)
        }
    }

    pub fn is_nan(self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }

    pub fn approx_eq(self, other: Point2D, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl Add for Point2D {
    type Output = Point2D;
    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Point2D;
    fn mul(self, rhs: f64) -> Point2D {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned box kept in both center/extent and min/max form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub center: Point2D,
    pub extent: Point2D,
    pub min: Point2D,
    pub max: Point2D,
}

impl Aabb {
    pub fn from_corners(min: Point2D, max: Point2D) -> Self {
        let center = Point2D::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
        Aabb {
            center,
            extent: max - center,
            min,
            max,
        }
    }

    /// Tightest box around a segment, whatever its direction.
    pub fn around_segment(a: Point2D, b: Point2D) -> Self {
        Aabb::from_corners(
            Point2D::new(a.x.min(b.x), a.y.min(b.y)),
            Point2D::new(a.x.max(b.x), a.y.max(b.y)),
        )
    }

    /// Pushes every side outwards by `amount`.
    pub fn grow(&mut self, amount: f64) {
        self.extent = self.extent + Point2D::new(amount, amount);
        self.min = self.min - Point2D::new(amount, amount);
        self.max = self.max + Point2D::new(amount, amount);
    }

    pub fn contains_point(&self, p: Point2D) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when either endpoint lies in the box or the segment crosses it.
    pub fn segment_inside(&self, a: Point2D, b: Point2D) -> bool {
        if self.contains_point(a) || self.contains_point(b) {
            return true;
        }
        !ray_aabb_intersect(a, b - a, self, 0.0, 1.0).is_empty()
    }
}

/// A point expressed in the frame of a segment: `along` runs from the
/// segment start towards its end, `perp` is positive on the left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    pub along: f64,
    pub perp: f64,
}

/// Twice the signed area of the triangle `abc`.
///
/// Positive when `c` lies counter-clockwise of `a -> b`, negative when
/// clockwise and zero when the three points are collinear.
pub fn signed_area2(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    (a.x - c.x) * (b.y - c.y) - (a.y - c.y) * (b.x - c.x)
}

/// Intersection point of `ab` and `cd` when they properly cross.
///
/// Touching, collinear and overlapping configurations all return `None`;
/// see [`segments_close_or_intersect`] for the tolerant variant.
pub fn segment_intersect(a: Point2D, b: Point2D, c: Point2D, d: Point2D) -> Option<Point2D> {
    let a1 = signed_area2(a, b, d);
    let a2 = signed_area2(a, b, c);
    if a1 * a2 < 0.0 {
        let a3 = signed_area2(c, d, a);
        let a4 = a3 + a2 - a1;
        if a3 * a4 < 0.0 {
            let t = a3 / (a3 - a4);
            return Some(a + (b - a) * t);
        }
    }
    None
}

/// Proper intersection of `ab` and `cd`, or else the first endpoint lying
/// within `threshold` of the other segment.
///
/// Endpoints are tried in the order `c`, `d`, `a`, `b`. Results depend on
/// that order when several endpoints qualify.
pub fn segments_close_or_intersect(
    a: Point2D,
    b: Point2D,
    c: Point2D,
    d: Point2D,
    threshold: f64,
) -> Option<Point2D> {
    if let Some(p) = segment_intersect(a, b, c, d) {
        return Some(p);
    }
    if point_segment_distance(a, b, c) <= threshold {
        Some(c)
    } else if point_segment_distance(a, b, d) <= threshold {
        Some(d)
    } else if point_segment_distance(c, d, a) <= threshold {
        Some(a)
    } else if point_segment_distance(c, d, b) <= threshold {
        Some(b)
    } else {
        None
    }
}

/// Distance from `c` to the closed segment `ab`.
///
/// Inside the segment span this uses the cross-product form rather than the
/// square root of a squared distance, which loses precision for points that
/// are nearly on the line.
pub fn point_segment_distance(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let e = ac.dot(ab);
    if e <= 0.0 {
        return ac.length();
    }
    let f = ab.dot(ab);
    if e >= f {
        return (c - b).length();
    }
    ((b.x - a.x) * (a.y - c.y) - (a.x - c.x) * (b.y - a.y)).abs() / ab.length()
}

/// Clips the ray `origin + t * dir`, `t` in `[tmin, tmax]`, against `aabb`
/// using the slab method.
///
/// Returns no point when the ray misses, one when it only grazes a corner or
/// collapses to a single parameter, and otherwise the entry and exit points
/// in ray order. Pass `0.0, 1.0` for a segment and `-f64::MAX, f64::MAX` for
/// an infinite line.
pub fn ray_aabb_intersect(
    origin: Point2D,
    dir: Point2D,
    aabb: &Aabb,
    tmin: f64,
    tmax: f64,
) -> Vec<Point2D> {
    let mut tmin = tmin;
    let mut tmax = tmax;
    let slabs = [
        (origin.x, dir.x, aabb.min.x, aabb.max.x),
        (origin.y, dir.y, aabb.min.y, aabb.max.y),
    ];

    for (o, d, lo, hi) in slabs {
        if d.abs() < EPSILON {
            if o < lo || o > hi {
                return Vec::new();
            }
        } else {
            let ood = 1.0 / d;
            let mut t1 = (lo - o) * ood;
            let mut t2 = (hi - o) * ood;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax {
                return Vec::new();
            }
        }
    }

    let mut points = vec![origin + dir * tmin];
    if !nearly_equal(tmin, tmax, EPSILON) {
        points.push(origin + dir * tmax);
    }
    points
}

/// Expresses `p` in the frame whose origin is `start` and whose x axis
/// points towards `end`.
pub fn project_onto_reference_frame(start: Point2D, end: Point2D, p: Point2D) -> ReferenceFrame {
    let axis = (end - start).normalized();
    let rel = p - start;
    ReferenceFrame {
        along: rel.dot(axis),
        perp: axis.cross(rel),
    }
}

/// Angle in radians between two direction vectors, in `[0, PI]`.
pub fn vector_angle(u: Point2D, v: Point2D) -> f64 {
    clamp(u.normalized().dot(v.normalized()), -1.0, 1.0).acos()
}

/// Angle at `origin` between the rays towards `a` and `b`.
pub fn angle_between(origin: Point2D, a: Point2D, b: Point2D) -> f64 {
    vector_angle(a - origin, b - origin)
}
