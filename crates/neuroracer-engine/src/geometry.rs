//! 2D vector and segment primitives backing track geometry and kinematics.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Cross products smaller than this are treated as exactly parallel.
pub(crate) const GEOMETRY_EPSILON: f32 = 1e-6;

/// A 2D point or direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `radians` (counter-clockwise from +x).
    #[must_use]
    pub fn from_angle(radians: f32) -> Self {
        Self {
            x: radians.cos(),
            y: radians.sin(),
        }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross product).
    #[must_use]
    pub fn perp_dot(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (other - self).length()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    #[must_use]
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn direction(self) -> Vec2 {
        self.end - self.start
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.direction().length()
    }

    /// Distance along a ray from `origin` in direction `dir` (unit length) to
    /// this segment, if the ray hits it within `max_range`.
    ///
    /// A ray parallel to the segment returns `None`, even when collinear, so
    /// grazing rays resolve deterministically instead of as an unstable
    /// near-miss.
    #[must_use]
    pub fn intersect_ray(self, origin: Vec2, dir: Vec2, max_range: f32) -> Option<f32> {
        let seg = self.direction();
        let denom = dir.perp_dot(seg);
        if denom.abs() < GEOMETRY_EPSILON {
            return None;
        }
        let to_start = self.start - origin;
        let t = to_start.perp_dot(seg) / denom;
        let u = to_start.perp_dot(dir) / denom;
        if t >= 0.0 && t <= max_range && (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }

    /// Shortest distance from `point` to any point on this segment.
    #[must_use]
    pub fn distance_to_point(self, point: Vec2) -> f32 {
        let seg = self.direction();
        let len_sq = seg.length_squared();
        if len_sq < GEOMETRY_EPSILON {
            return self.start.distance_to(point);
        }
        let t = ((point - self.start).dot(seg) / len_sq).clamp(0.0, 1.0);
        (self.start + seg * t).distance_to(point)
    }
}

/// Even-odd point-in-polygon test over a closed loop of vertices.
///
/// The loop is implicitly closed (last vertex connects back to the first).
/// Points exactly on an edge are not reliably classified; callers that care
/// about boundary contact must check edge distance separately.
#[must_use]
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_at = pi.x + (point.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if point.x < x_at {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
