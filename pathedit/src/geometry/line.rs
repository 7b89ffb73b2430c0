//! Infinite lines and bounded line segments.
//!
//! A [`Line`] is stored in one of two closed forms so that vertical lines do
//! not need an infinite slope.

use super::tolerance::{clamp, clamp01, near_zero, EPS_DENOM};
use crate::model::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Line {
    /// `y = m·x + b`
    SlopeIntercept { m: f64, b: f64 },
    /// `x = const`
    Vertical { x: f64 },
}

impl Line {
    /// The line through `p0` and `p1`. Equal x coordinates give a vertical line.
    pub fn through(p0: Vec2, p1: Vec2) -> Self {
        if p0.x == p1.x {
            Line::Vertical { x: p0.x }
        } else {
            let m = (p1.y - p0.y) / (p1.x - p0.x);
            Line::SlopeIntercept { m, b: p0.y - m * p0.x }
        }
    }

    /// Orthogonal projection of `point` onto the line.
    pub fn projected(&self, point: Vec2) -> Vec2 {
        match *self {
            Line::SlopeIntercept { m, b } => {
                let x = (m * (point.y - b) + point.x) / (m * m + 1.0);
                Vec2::new(x, m * x + b)
            }
            Line::Vertical { x } => Vec2::new(x, point.y),
        }
    }

    /// The line with the same direction passing through `point`.
    pub fn parallel(&self, point: Vec2) -> Line {
        match *self {
            Line::SlopeIntercept { m, .. } => Line::SlopeIntercept { m, b: point.y - m * point.x },
            Line::Vertical { .. } => Line::Vertical { x: point.x },
        }
    }

    /// Intersection point, or `None` when the lines are parallel.
    pub fn intersection(&self, other: &Line) -> Option<Vec2> {
        match (*self, *other) {
            (Line::SlopeIntercept { m: m0, b: b0 }, Line::SlopeIntercept { m: m1, b: b1 }) => {
                if near_zero(m0 - m1, EPS_DENOM) {
                    return None;
                }
                let x = (b1 - b0) / (m0 - m1);
                Some(Vec2::new(x, m0 * x + b0))
            }
            (Line::SlopeIntercept { m, b }, Line::Vertical { x })
            | (Line::Vertical { x }, Line::SlopeIntercept { m, b }) => Some(Vec2::new(x, m * x + b)),
            (Line::Vertical { .. }, Line::Vertical { .. }) => None,
        }
    }

    pub fn distance(&self, point: Vec2) -> f64 {
        self.projected(point).distance(point)
    }

    /// Intersection with a bounded segment, if it falls inside the segment.
    pub fn intersection_with_segment(&self, segment: &LineSegment) -> Option<Vec2> {
        let p = self.intersection(&segment.line())?;
        let (lo, hi, v) = match segment.line() {
            Line::SlopeIntercept { .. } => (segment.start.x, segment.end.x, p.x),
            Line::Vertical { .. } => (segment.start.y, segment.end.y, p.y),
        };
        (v >= lo.min(hi) && v <= lo.max(hi)).then_some(p)
    }
}

/// A line restricted to the span between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    pub start: Vec2,
    pub end: Vec2,
}

impl LineSegment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn line(&self) -> Line {
        Line::through(self.start, self.end)
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn position(&self, param_t: f64) -> Vec2 {
        self.start.lerp(self.end, clamp01(param_t))
    }

    /// Parameter of the closest point on the segment and its distance to `point`.
    pub fn param_t(&self, point: Vec2) -> (f64, f64) {
        let projected = self.line().projected(point);
        let (t, closest) = match self.line() {
            Line::SlopeIntercept { m, b } => {
                let (x0, x1) = (self.start.x, self.end.x);
                let x = clamp(projected.x, x0.min(x1), x0.max(x1));
                let t = if x1 != x0 { (x - x0) / (x1 - x0) } else { 0.0 };
                (t, Vec2::new(x, m * x + b))
            }
            Line::Vertical { x } => {
                let (y0, y1) = (self.start.y, self.end.y);
                let y = clamp(projected.y, y0.min(y1), y0.max(y1));
                let t = if y1 != y0 { (y - y0) / (y1 - y0) } else { 0.0 };
                (t, Vec2::new(x, y))
            }
        };
        (t, closest.distance(point))
    }
}
