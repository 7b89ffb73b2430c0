//! Least-squares cubic fitting of digitized points (Schneider).
//!
//! The error budget is a distance: a fitted segment is accepted when every
//! sample lies within `error` of the curve at its assigned parameter.

use crate::geometry::limits::MAX_FIT_POINTS;
use crate::geometry::math::bezier_point;
use crate::geometry::tolerance::{EPS_DENOM, EPS_FIT};
use crate::model::{PathEdge, PathNode, Vec2};
use crate::segment::PathSegment;

pub const DEFAULT_MAX_ITERATIONS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fitter {
    pub error: f64,
    pub max_iterations: usize,
}

impl Default for Fitter {
    fn default() -> Self {
        Self { error: 1.0, max_iterations: DEFAULT_MAX_ITERATIONS }
    }
}

/// Fit with the default iteration count.
pub fn fit(points: &[Vec2], error: f64) -> Vec<PathNode> {
    Fitter { error, ..Fitter::default() }.fit(points)
}

impl Fitter {
    /// Nodes of a cubic chain through the first and last point.
    /// Consecutive duplicates are collapsed first; an empty input or one over
    /// the ingestion limit yields no nodes.
    pub fn fit(&self, points: &[Vec2]) -> Vec<PathNode> {
        if points.len() > MAX_FIT_POINTS {
            log::warn!("fit input of {} points exceeds limit {}", points.len(), MAX_FIT_POINTS);
            return Vec::new();
        }
        let mut pts: Vec<Vec2> = Vec::with_capacity(points.len());
        for p in points {
            if pts.last().map_or(true, |last: &Vec2| !last.approx_eq(*p)) {
                pts.push(*p);
            }
        }
        let Some(first) = pts.first() else { return Vec::new() };
        let mut nodes = vec![PathNode::new(*first)];
        if pts.len() > 1 {
            let last = pts.len() - 1;
            let tan1 = end_tangent(pts[0], pts[1], pts.get(2).copied());
            let tan2 = end_tangent(pts[last], pts[last - 1], last.checked_sub(2).map(|i| pts[i]));
            let run = FitRun { points: &pts, error: self.error.abs(), max_iterations: self.max_iterations };
            run.fit_cubic(&mut nodes, 0, last, tan1, tan2);
        }
        nodes
    }
}

/// Outward tangent at an end sample, second order in the chord spacing
/// when a third sample is available.
fn end_tangent(p0: Vec2, p1: Vec2, p2: Option<Vec2>) -> Vec2 {
    let secant = p1 - p0;
    let Some(p2) = p2 else { return secant };
    let a = secant.length();
    let b = p1.distance(p2);
    if a < EPS_DENOM || b < EPS_DENOM {
        return secant;
    }
    let t = p0 * (-(2.0 * a + b) / (a * (a + b))) + p1 * ((a + b) / (a * b)) - p2 * (a / ((a + b) * b));
    if t.is_zero() || t.dot(secant) <= 0.0 {
        secant
    } else {
        t
    }
}

#[derive(Debug)]
enum Attempt {
    Fitted(PathSegment),
    Split { at: usize, reparameterized: usize },
}

struct FitRun<'a> {
    points: &'a [Vec2],
    error: f64,
    max_iterations: usize,
}

impl FitRun<'_> {
    fn fit_cubic(&self, nodes: &mut Vec<PathNode>, first: usize, last: usize, tan1: Vec2, tan2: Vec2) {
        let pt1 = self.points[first];
        let pt2 = self.points[last];
        if last - first == 1 {
            let dist = pt1.distance(pt2) / 3.0;
            add_segment(nodes, PathSegment::new(pt1, pt2, PathEdge {
                control_out: tan1.with_length(dist),
                control_in: tan2.with_length(dist),
            }));
            return;
        }

        let split = match self.attempt(first, last, tan1, tan2) {
            Attempt::Fitted(segment) => {
                add_segment(nodes, segment);
                return;
            }
            Attempt::Split { at, reparameterized } => {
                log::trace!("fit [{first}, {last}] split at {at} after {reparameterized} reparameterizations");
                at
            }
        };

        let center = self.points[split - 1] - self.points[split + 1];
        let center = if center.is_zero() { self.points[split - 1] - self.points[split] } else { center };
        self.fit_cubic(nodes, first, split, tan1, center);
        self.fit_cubic(nodes, split, last, -center, tan2);
    }

    /// Fit one cubic over `[first, last]`. Newton passes only run while the
    /// max error stays below twice the budget and keeps shrinking.
    fn attempt(&self, first: usize, last: usize, tan1: Vec2, tan2: Vec2) -> Attempt {
        let budget = self.error * self.error;
        let mut u = self.chord_length_parameterize(first, last);
        let mut iteration_error = 4.0 * budget;
        let mut in_order = true;
        let mut split = (first + last) / 2;
        let mut reparameterized = 0;

        for _ in 0..=self.max_iterations {
            let segment = self.generate_bezier(first, last, &u, tan1, tan2);
            let (max_error, index) = self.find_max_error(first, last, &segment, &u);
            if max_error < budget && in_order {
                log::trace!("fit [{first}, {last}] accepted after {reparameterized} reparameterizations");
                return Attempt::Fitted(segment);
            }
            split = index;
            if max_error >= iteration_error || reparameterized == self.max_iterations {
                break;
            }
            in_order = reparameterize(self.points, first, &mut u, &segment);
            reparameterized += 1;
            iteration_error = max_error;
        }
        Attempt::Split { at: split, reparameterized }
    }

    fn chord_length_parameterize(&self, first: usize, last: usize) -> Vec<f64> {
        let mut u = vec![0.0; last - first + 1];
        for i in first + 1..=last {
            u[i - first] = u[i - first - 1] + self.points[i].distance(self.points[i - 1]);
        }
        let total = u[last - first];
        if total > EPS_DENOM {
            for v in u.iter_mut().skip(1) {
                *v /= total;
            }
        }
        u
    }

    /// Least squares for the two handle magnitudes along fixed tangents.
    fn generate_bezier(&self, first: usize, last: usize, u: &[f64], tan1: Vec2, tan2: Vec2) -> PathSegment {
        let pt1 = self.points[first];
        let pt2 = self.points[last];
        let mut c = [[0.0f64; 2]; 2];
        let mut x = [0.0f64; 2];

        for (i, &ui) in u.iter().enumerate() {
            let t = 1.0 - ui;
            let b = 3.0 * ui * t;
            let b0 = t * t * t;
            let b1 = b * t;
            let b2 = b * ui;
            let b3 = ui * ui * ui;
            let a1 = tan1.with_length(b1);
            let a2 = tan2.with_length(b2);
            let tmp = self.points[first + i] - pt1 * (b0 + b1) - pt2 * (b2 + b3);
            c[0][0] += a1.dot(a1);
            c[0][1] += a1.dot(a2);
            c[1][1] += a2.dot(a2);
            x[0] += a1.dot(tmp);
            x[1] += a2.dot(tmp);
        }
        c[1][0] = c[0][1];

        let seg_length = pt1.distance(pt2);
        let eps = EPS_FIT * seg_length.max(1.0);
        let det_c0_c1 = c[0][0] * c[1][1] - c[1][0] * c[0][1];
        let (mut alpha1, mut alpha2) = if det_c0_c1.abs() > eps * eps {
            let det_c0_x = c[0][0] * x[1] - c[1][0] * x[0];
            let det_x_c1 = x[0] * c[1][1] - x[1] * c[0][1];
            (det_x_c1 / det_c0_c1, det_c0_x / det_c0_c1)
        } else {
            let c0 = c[0][0] + c[0][1];
            let c1 = c[1][0] + c[1][1];
            let alpha = if c0.abs() > eps {
                x[0] / c0
            } else if c1.abs() > eps {
                x[1] / c1
            } else {
                0.0
            };
            (alpha, alpha)
        };

        // Wu/Barsky fallback for degenerate or crossing handles.
        let fallback = seg_length / 3.0;
        if alpha1 < eps || alpha2 < eps {
            alpha1 = fallback;
            alpha2 = fallback;
        } else {
            let chord = pt2 - pt1;
            let h1 = tan1.with_length(alpha1);
            let h2 = tan2.with_length(alpha2);
            if h1.dot(chord) - h2.dot(chord) > seg_length * seg_length {
                alpha1 = fallback;
                alpha2 = fallback;
            }
        }

        PathSegment::new(pt1, pt2, PathEdge {
            control_out: tan1.with_length(alpha1),
            control_in: tan2.with_length(alpha2),
        })
    }

    /// Largest squared deviation over the interior samples and its index.
    fn find_max_error(&self, first: usize, last: usize, segment: &PathSegment, u: &[f64]) -> (f64, usize) {
        let control = control_points(segment);
        let mut index = (first + last) / 2;
        let mut max = 0.0;
        for i in first + 1..last {
            let d = (bezier_point(&control, u[i - first]) - self.points[i]).length_sq();
            if d >= max {
                max = d;
                index = i;
            }
        }
        (max, index)
    }
}

fn control_points(segment: &PathSegment) -> [Vec2; 4] {
    [segment.from, segment.from_out(), segment.to_in(), segment.to]
}

fn add_segment(nodes: &mut Vec<PathNode>, segment: PathSegment) {
    match nodes.last_mut() {
        Some(last) => last.control_out = segment.edge.control_out,
        None => nodes.push(PathNode::with_controls(segment.from, Vec2::ZERO, segment.edge.control_out)),
    }
    nodes.push(PathNode::with_controls(segment.to, segment.edge.control_in, Vec2::ZERO));
}

/// Newton steps for every parameter; false when the result is no longer
/// strictly increasing.
fn reparameterize(points: &[Vec2], first: usize, u: &mut [f64], segment: &PathSegment) -> bool {
    let control = control_points(segment);
    for (i, ui) in u.iter_mut().enumerate() {
        *ui = find_root(&control, points[first + i], *ui);
    }
    u.windows(2).all(|w| w[1] > w[0])
}

fn find_root(q: &[Vec2; 4], point: Vec2, u: f64) -> f64 {
    let q1 = [(q[1] - q[0]) * 3.0, (q[2] - q[1]) * 3.0, (q[3] - q[2]) * 3.0];
    let q2 = [(q1[1] - q1[0]) * 2.0, (q1[2] - q1[1]) * 2.0];
    let p = bezier_point(q, u);
    let d1 = bezier_point(&q1, u);
    let d2 = bezier_point(&q2, u);
    let diff = p - point;
    let df = d1.dot(d1) + diff.dot(d2);
    if df.abs() <= EPS_DENOM {
        u
    } else {
        u - diff.dot(d1) / df
    }
}
