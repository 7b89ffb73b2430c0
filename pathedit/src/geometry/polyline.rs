//! Piecewise-linear curves with arclength parametrization.
//!
//! Tessellated path segments become polylines, which are then the only
//! way curves are inverse-parametrized or hit-tested.

use super::line::LineSegment;
use super::tolerance::clamp01;
use crate::model::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    points: Vec<Vec2>,
    segments: Vec<LineSegment>,
    length: f64,
}

/// A position expressed as a segment index and a parameter local to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentParam {
    pub index: usize,
    pub t: f64,
}

impl Polyline {
    pub fn new(points: Vec<Vec2>) -> Self {
        let segments: Vec<LineSegment> =
            points.windows(2).map(|w| LineSegment::new(w[0], w[1])).collect();
        let length = segments.iter().map(LineSegment::length).sum();
        Self { points, segments, length }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maps a global arclength parameter onto a segment, scanning forward for
    /// the first segment whose cumulative length passes the target.
    pub fn segment_param(&self, param_t: f64) -> SegmentParam {
        let last = self.segments.len().saturating_sub(1);
        let t = clamp01(param_t);
        if t == 0.0 {
            return SegmentParam { index: 0, t: 0.0 };
        }
        if t == 1.0 {
            return SegmentParam { index: last, t: 1.0 };
        }
        let target = self.length * t;
        let mut cumulated = 0.0;
        for (index, s) in self.segments.iter().enumerate() {
            let len = s.length();
            let curr = cumulated + len;
            if curr > target {
                let t = if len != 0.0 { (target - cumulated) / len } else { 0.0 };
                return SegmentParam { index, t };
            }
            cumulated = curr;
        }
        SegmentParam { index: last, t: 1.0 }
    }

    pub fn position_at(&self, param: SegmentParam) -> Vec2 {
        match self.segments.get(param.index) {
            Some(s) => s.position(param.t),
            None => self.points.first().copied().unwrap_or(Vec2::ZERO),
        }
    }

    pub fn position(&self, param_t: f64) -> Vec2 {
        self.position_at(self.segment_param(param_t))
    }

    /// Closest segment to `point` and the distance to it. The first segment
    /// wins ties. `None` for polylines with fewer than two points.
    pub fn closest_segment(&self, point: Vec2) -> Option<(SegmentParam, f64)> {
        let mut best: Option<(SegmentParam, f64)> = None;
        for (index, s) in self.segments.iter().enumerate() {
            let (t, distance) = s.param_t(point);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((SegmentParam { index, t }, distance));
            }
        }
        best
    }

    /// Arclength parameter of a segment position.
    pub fn param_t_of(&self, param: SegmentParam) -> f64 {
        if self.length == 0.0 {
            return 0.0;
        }
        let before: f64 = self.segments.iter().take(param.index).map(LineSegment::length).sum();
        let within = self
            .segments
            .get(param.index)
            .map_or(0.0, |s| s.position(param.t).distance(s.start));
        clamp01((before + within) / self.length)
    }

    /// Arclength-correct inverse: `(t, distance)` of the closest point.
    pub fn param_t(&self, point: Vec2) -> Option<(f64, f64)> {
        let (param, distance) = self.closest_segment(point)?;
        Some((self.param_t_of(param), distance))
    }

    /// `(index + local_t) / segment_count`. This is not arclength-correct;
    /// for a tessellated curve sampled at uniform parameter steps it maps
    /// back onto the curve parameter, which is what handle placement needs.
    pub fn approx_path_param_t_of(&self, param: SegmentParam) -> f64 {
        if self.segments.is_empty() || self.length == 0.0 {
            return 0.0;
        }
        let s = &self.segments[param.index.min(self.segments.len() - 1)];
        let len = s.length();
        let local = if len != 0.0 { s.position(param.t).distance(s.start) / len } else { 0.0 };
        clamp01((param.index as f64 + local) / self.segments.len() as f64)
    }

    pub fn approx_path_param_t(&self, point: Vec2) -> Option<(f64, f64)> {
        let (param, distance) = self.closest_segment(point)?;
        Some((self.approx_path_param_t_of(param), distance))
    }

    /// Distance from `point` to the nearest point on the polyline.
    pub fn distance(&self, point: Vec2) -> Option<f64> {
        match self.points.as_slice() {
            [] => None,
            [only] => Some(only.distance(point)),
            _ => self.closest_segment(point).map(|(_, d)| d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ell() -> Polyline {
        Polyline::new(vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 30.0)])
    }

    #[test]
    fn arclength_position() {
        let p = ell();
        assert!((p.length() - 40.0).abs() < 1e-12);
        let mid = p.position(0.5);
        assert!((mid.x - 10.0).abs() < 1e-12 && (mid.y - 10.0).abs() < 1e-12);
        assert_eq!(p.position(1.0), Vec2::new(10.0, 30.0));
        assert_eq!(p.position(-1.0), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn exact_and_approx_inverse_differ() {
        let p = ell();
        let (t, d) = p.param_t(Vec2::new(12.0, 10.0)).unwrap();
        assert!((t - 0.5).abs() < 1e-12);
        assert!((d - 2.0).abs() < 1e-12);
        let (approx, _) = p.approx_path_param_t(Vec2::new(12.0, 10.0)).unwrap();
        assert!((approx - (1.0 + 1.0 / 3.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn ties_go_to_first_segment() {
        let p = ell();
        let (param, _) = p.closest_segment(Vec2::new(10.0, 0.0)).unwrap();
        assert_eq!(param.index, 0);
    }

    #[test]
    fn empty_polyline_is_safe() {
        let p = Polyline::new(vec![]);
        assert!(p.param_t(Vec2::ZERO).is_none());
        assert_eq!(p.position(0.5), Vec2::ZERO);
        assert!(p.distance(Vec2::ZERO).is_none());
    }
}
