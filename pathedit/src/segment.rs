//! Read-only geometry of one path segment.

use crate::geometry::cubic::CubicBezier;
use crate::geometry::polyline::Polyline;
use crate::geometry::tolerance::clamp01;
use crate::model::{PathEdge, PathNode, Rect, Vec2};
use crate::svg::write_number;

pub const DEFAULT_TESSELLATION_STEPS: usize = 64;

/// The edge between two consecutive nodes, materialized on demand.
/// Handle offsets in `edge` are relative to `from` and `to` respectively.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSegment {
    pub from: Vec2,
    pub to: Vec2,
    pub edge: PathEdge,
}

impl PathSegment {
    pub fn new(from: Vec2, to: Vec2, edge: PathEdge) -> Self {
        Self { from, to, edge }
    }

    pub fn line(from: Vec2, to: Vec2) -> Self {
        Self::new(from, to, PathEdge::LINE)
    }

    pub fn between(from: &PathNode, to: &PathNode) -> Self {
        Self::new(
            from.position,
            to.position,
            PathEdge { control_out: from.control_out, control_in: to.control_in },
        )
    }

    /// Degree-elevated quadratic with control point `q`.
    pub fn from_quadratic(from: Vec2, q: Vec2, to: Vec2) -> Self {
        Self::new(
            from,
            to,
            PathEdge { control_out: (q - from) * (2.0 / 3.0), control_in: (q - to) * (2.0 / 3.0) },
        )
    }

    pub fn from_cubic(c: &CubicBezier) -> Self {
        Self::new(c.p0, c.p3, PathEdge { control_out: c.p1 - c.p0, control_in: c.p2 - c.p3 })
    }

    pub fn from_out(&self) -> Vec2 {
        self.from + self.edge.control_out
    }

    pub fn to_in(&self) -> Vec2 {
        self.to + self.edge.control_in
    }

    pub fn edge(&self) -> PathEdge {
        self.edge
    }

    pub fn is_line(&self) -> bool {
        self.edge.is_line()
    }

    pub fn cubic(&self) -> CubicBezier {
        CubicBezier::new(self.from, self.from_out(), self.to_in(), self.to)
    }

    pub fn position(&self, param_t: f64) -> Vec2 {
        self.cubic().eval(param_t)
    }

    /// The quadratic control point, when this cubic is an exact elevation of one.
    pub fn quadratic(&self) -> Option<Vec2> {
        let q0 = self.from + self.edge.control_out * 1.5;
        let q1 = self.to + self.edge.control_in * 1.5;
        q0.approx_eq(q1).then_some(q0)
    }

    /// Closest quadratic: both handles are aimed at the midpoint of their
    /// implied quadratic control points.
    pub fn to_quadratic(&self) -> PathSegment {
        let q0 = self.from + self.edge.control_out * 1.5;
        let q1 = self.to + self.edge.control_in * 1.5;
        Self::from_quadratic(self.from, q0.lerp(q1, 0.5), self.to)
    }

    /// De Casteljau split. Line segments split linearly and stay lines.
    pub fn split(&self, param_t: f64) -> (PathSegment, PathSegment) {
        let t = clamp01(param_t);
        if self.is_line() {
            let mid = self.from.lerp(self.to, t);
            return (PathSegment::line(self.from, mid), PathSegment::line(mid, self.to));
        }
        let (a, b) = self.cubic().split_at(t);
        (PathSegment::from_cubic(&a), PathSegment::from_cubic(&b))
    }

    pub fn subsegment(&self, from_t: f64, to_t: f64) -> PathSegment {
        let (from_t, to_t) = (clamp01(from_t), clamp01(to_t));
        if self.is_line() {
            return PathSegment::line(self.from.lerp(self.to, from_t), self.from.lerp(self.to, to_t));
        }
        PathSegment::from_cubic(&self.cubic().subcurve(from_t, to_t))
    }

    /// `count + 1` samples at uniform parameter steps.
    pub fn tessellated(&self, count: usize) -> Polyline {
        let count = count.max(1);
        Polyline::new((0..=count).map(|i| self.position(i as f64 / count as f64)).collect())
    }

    /// Approximate curve parameter and distance of the closest point, found
    /// on the default tessellation.
    pub fn param_t(&self, point: Vec2) -> (f64, f64) {
        self.tessellated(DEFAULT_TESSELLATION_STEPS)
            .approx_path_param_t(point)
            .unwrap_or((0.0, self.from.distance(point)))
    }

    pub fn bounds(&self) -> Rect {
        if self.is_line() {
            return Rect::from_point(self.from).including(self.to);
        }
        self.cubic().bounds()
    }

    pub fn reversed(&self) -> PathSegment {
        PathSegment::new(
            self.to,
            self.from,
            PathEdge { control_out: self.edge.control_in, control_in: self.edge.control_out },
        )
    }

    /// Emit path data for this segment, starting a subpath if `out` is empty.
    pub fn append_svg(&self, out: &mut String) {
        if out.is_empty() {
            out.push('M');
            write_point(out, self.from);
        }
        if self.is_line() {
            out.push_str(" L");
        } else {
            out.push_str(" C");
            write_point(out, self.from_out());
            out.push(' ');
            write_point(out, self.to_in());
            out.push(' ');
        }
        write_point(out, self.to);
    }
}

pub(crate) fn write_point(out: &mut String, p: Vec2) {
    write_number(out, p.x);
    out.push(',');
    write_number(out, p.y);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> PathSegment {
        PathSegment::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            PathEdge { control_out: Vec2::new(2.0, 6.0), control_in: Vec2::new(-3.0, 6.0) },
        )
    }

    #[test]
    fn split_halves_match_original() {
        let s = curve();
        let (a, b) = s.split(0.4);
        for i in 0..=20 {
            let u = i as f64 / 20.0;
            assert!((a.position(u) - s.position(u * 0.4)).length() < 1e-9);
            assert!((b.position(u) - s.position(0.4 + u * 0.6)).length() < 1e-9);
        }
    }

    #[test]
    fn line_split_stays_line() {
        let s = PathSegment::line(Vec2::ZERO, Vec2::new(4.0, 0.0));
        let (a, b) = s.split(0.25);
        assert!(a.is_line() && b.is_line());
        assert_eq!(a.to, Vec2::new(1.0, 0.0));
        assert_eq!(b.from, Vec2::new(1.0, 0.0));
        let sub = s.subsegment(0.0, 0.5);
        assert_eq!(sub.to, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn subsegment_from_zero() {
        let s = curve();
        let sub = s.subsegment(0.0, 0.5);
        assert_eq!(sub, s.split(0.5).0);
    }

    #[test]
    fn quadratic_detection() {
        let q = PathSegment::from_quadratic(Vec2::ZERO, Vec2::new(5.0, 5.0), Vec2::new(10.0, 0.0));
        let c = q.quadratic().unwrap();
        assert!((c - Vec2::new(5.0, 5.0)).length() < 1e-9);
        assert!(curve().quadratic().is_none());
        let forced = curve().to_quadratic();
        assert!(forced.quadratic().is_some());
    }

    #[test]
    fn param_t_near_middle() {
        let s = PathSegment::line(Vec2::ZERO, Vec2::new(100.0, 0.0));
        let (t, d) = s.param_t(Vec2::new(50.0, 3.0));
        assert!((t - 0.5).abs() < 1e-9);
        assert!((d - 3.0).abs() < 1e-9);
    }

    #[test]
    fn svg_emission() {
        let mut out = String::new();
        PathSegment::line(Vec2::ZERO, Vec2::new(1.5, 2.0)).append_svg(&mut out);
        assert_eq!(out, "M0,0 L1.5,2");
        let mut out = String::new();
        curve().append_svg(&mut out);
        assert_eq!(out, "M0,0 C2,6 7,6 10,0");
    }
}
