//! Cubic Bézier curves in control-point form.
//!
//! `PathSegment` stores handles as offsets; this type is its absolute
//! counterpart and carries the subdivision math.

use super::math::{cubic_point, solve_quadratic};
use super::tolerance::clamp01;
use crate::model::{Rect, Vec2};

/// Control points of a cubic Bézier curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec2, // Start point
    pub p1: Vec2, // First control point
    pub p2: Vec2, // Second control point
    pub p3: Vec2, // End point
}

impl CubicBezier {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Degree elevation of the quadratic `p0, q, p2`.
    pub fn from_quadratic(p0: Vec2, q: Vec2, p2: Vec2) -> Self {
        Self::new(p0, p0 + (q - p0) * (2.0 / 3.0), p2 + (q - p2) * (2.0 / 3.0), p2)
    }

    /// Evaluate the curve at parameter t, clamped to [0, 1].
    pub fn eval(&self, t: f64) -> Vec2 {
        cubic_point(clamp01(t), self.p0, self.p1, self.p2, self.p3)
    }

    /// Evaluate the tangent (derivative) at parameter t.
    pub fn tangent(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * mt * mt)
            + (self.p2 - self.p1) * (6.0 * mt * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Split the curve at parameter t using de Casteljau subdivision.
    ///
    /// Returns two cubic curves: the first from 0..t, the second from t..1.
    pub fn split_at(&self, t: f64) -> (CubicBezier, CubicBezier) {
        let t = clamp01(t);
        let p01 = self.p0.lerp(self.p1, t);
        let p12 = self.p1.lerp(self.p2, t);
        let p23 = self.p2.lerp(self.p3, t);

        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);

        let p0123 = p012.lerp(p123, t); // The split point

        (
            CubicBezier::new(self.p0, p01, p012, p0123),
            CubicBezier::new(p0123, p123, p23, self.p3),
        )
    }

    /// Extract a portion of the curve from t0 to t1.
    pub fn subcurve(&self, t0: f64, t1: f64) -> CubicBezier {
        let (t0, t1) = (clamp01(t0), clamp01(t1));
        if t0 >= t1 {
            let p = self.eval(t0);
            return CubicBezier::new(p, p, p, p);
        }
        let (curve_to_t1, _) = self.split_at(t1);
        if t0 == 0.0 {
            return curve_to_t1;
        }
        let (_, result) = curve_to_t1.split_at(t0 / t1);
        result
    }

    /// Approximate arc length using adaptive subdivision.
    pub fn arc_length(&self, tolerance: f64) -> f64 {
        arc_length_recursive(self, tolerance, 0)
    }

    /// Parameters in (0, 1) where either coordinate of the derivative vanishes.
    pub fn extrema(&self) -> Vec<f64> {
        // B'(t)/3 = a·t² + b·t + c per axis
        let a = self.p3 - self.p2 * 3.0 + self.p1 * 3.0 - self.p0;
        let b = (self.p2 - self.p1 * 2.0 + self.p0) * 2.0;
        let c = self.p1 - self.p0;
        let mut ts = solve_quadratic(a.x, b.x, c.x);
        ts.extend(solve_quadratic(a.y, b.y, c.y));
        ts.retain(|t| *t > 0.0 && *t < 1.0);
        ts
    }

    /// Exact bounding box of the curve.
    pub fn bounds(&self) -> Rect {
        self.extrema()
            .into_iter()
            .fold(Rect::from_point(self.p0).including(self.p3), |r, t| r.including(self.eval(t)))
    }

    pub fn reversed(&self) -> CubicBezier {
        CubicBezier::new(self.p3, self.p2, self.p1, self.p0)
    }
}

/// Recursive arc length computation with adaptive subdivision.
fn arc_length_recursive(c: &CubicBezier, tolerance: f64, depth: u32) -> f64 {
    const MAX_DEPTH: u32 = 16;

    let chord = c.p0.distance(c.p3);
    let poly_len = c.p0.distance(c.p1) + c.p1.distance(c.p2) + c.p2.distance(c.p3);

    // Flat enough or max depth reached: average of chord and polygon
    if depth >= MAX_DEPTH || (poly_len - chord).abs() < tolerance {
        return (chord + poly_len) * 0.5;
    }

    let (a, b) = c.split_at(0.5);
    arc_length_recursive(&a, tolerance, depth + 1) + arc_length_recursive(&b, tolerance, depth + 1)
}
