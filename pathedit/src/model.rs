use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::geometry::tolerance::{EPS_LEN, EPS_POS};

/// A 2D point or vector in document coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn length_sq(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn dot(self, o: Vec2) -> f64 {
        self.x * o.x + self.y * o.y
    }

    pub fn cross(self, o: Vec2) -> f64 {
        self.x * o.y - self.y * o.x
    }

    pub fn distance(self, o: Vec2) -> f64 {
        (self - o).length()
    }

    pub fn lerp(self, o: Vec2, t: f64) -> Vec2 {
        self + (o - self) * t
    }

    /// Unit vector in the same direction, or zero for a degenerate vector.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len > EPS_LEN {
            self / len
        } else {
            Vec2::ZERO
        }
    }

    /// Same direction, given length. A negative length flips the direction.
    /// Zero vectors stay zero.
    pub fn with_length(self, length: f64) -> Vec2 {
        self.normalized() * length
    }

    /// Signed angle from `self` to `o`, in radians within `(-π, π]`.
    pub fn angle_to(self, o: Vec2) -> f64 {
        self.cross(o).atan2(self.dot(o))
    }

    pub fn is_zero(self) -> bool {
        self.length() <= EPS_LEN
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn approx_eq(self, o: Vec2) -> bool {
        (self - o).length() <= EPS_POS
    }

    pub fn min(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x.min(o.x), self.y.min(o.y))
    }

    pub fn max(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x.max(o.x), self.y.max(o.y))
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, o: Vec2) {
        self.x += o.x;
        self.y += o.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, o: Vec2) {
        self.x -= o.x;
        self.y -= o.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f64) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, s: f64) -> Vec2 {
        Vec2::new(self.x / s, self.y / s)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_point(p: Vec2) -> Self {
        Self { min: p, max: p }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Rect::from_point(first), |r, p| r.including(p)))
    }

    pub fn including(self, p: Vec2) -> Rect {
        Rect {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn union(self, o: Rect) -> Rect {
        Rect {
            min: self.min.min(o.min),
            max: self.max.max(o.max),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn inflated(self, d: f64) -> Rect {
        Rect {
            min: self.min - Vec2::new(d, d),
            max: self.max + Vec2::new(d, d),
        }
    }
}

/// One vertex of a path plus its two handle offsets, relative to `position`.
/// A zero offset means no handle on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub position: Vec2,
    #[serde(rename = "in", default)]
    pub control_in: Vec2,
    #[serde(rename = "out", default)]
    pub control_out: Vec2,
}

impl PathNode {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            control_in: Vec2::ZERO,
            control_out: Vec2::ZERO,
        }
    }

    pub fn with_controls(position: Vec2, control_in: Vec2, control_out: Vec2) -> Self {
        Self {
            position,
            control_in,
            control_out,
        }
    }

    pub fn control_in_position(&self) -> Vec2 {
        self.position + self.control_in
    }

    pub fn control_out_position(&self) -> Vec2 {
        self.position + self.control_out
    }

    /// The same node walked in the opposite direction.
    pub fn reversed(&self) -> PathNode {
        PathNode {
            position: self.position,
            control_in: self.control_out,
            control_out: self.control_in,
        }
    }

    pub fn translated(&self, offset: Vec2) -> PathNode {
        PathNode {
            position: self.position + offset,
            ..*self
        }
    }
}

/// Handle offsets of one segment: the from-node's `control_out` and the
/// to-node's `control_in`. Both zero means a straight line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathEdge {
    pub control_out: Vec2,
    pub control_in: Vec2,
}

impl PathEdge {
    pub const LINE: PathEdge = PathEdge {
        control_out: Vec2::ZERO,
        control_in: Vec2::ZERO,
    };

    pub fn is_line(&self) -> bool {
        self.control_out.is_zero() && self.control_in.is_zero()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Corner,
    Locked,
    Mirrored,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Line,
    Cubic,
    Quadratic,
    #[default]
    Auto,
}
