use super::tolerance::{near_zero, EPS_DENOM};
use crate::model::Vec2;

/// Squared distance from `p` to segment `a..b`, and the clamped parameter of
/// the closest point.
pub fn seg_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> (f64, f64) {
    let v = b - a;
    let w = p - a;
    let vv = v.length_sq();
    let mut t = if vv > 0.0 { w.dot(v) / vv } else { 0.0 };
    if t < 0.0 { t = 0.0; } else if t > 1.0 { t = 1.0; }
    let proj = a + v * t;
    ((p - proj).length_sq(), t)
}

pub fn cubic_point(t: f64, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Vec2 {
    let u = 1.0 - t;
    let tt = t*t; let uu = u*u;
    let uuu = uu*u; let ttt = tt*t;
    p0 * uuu + p1 * (3.0*uu*t) + p2 * (3.0*u*tt) + p3 * ttt
}

/// De Casteljau evaluation of a Bézier curve of any degree.
/// `points` holds the control polygon; an empty slice evaluates to the origin.
pub fn bezier_point(points: &[Vec2], t: f64) -> Vec2 {
    let mut tmp: Vec<Vec2> = points.to_vec();
    let n = tmp.len();
    for level in 1..n {
        for i in 0..(n - level) {
            tmp[i] = tmp[i].lerp(tmp[i + 1], t);
        }
    }
    tmp.first().copied().unwrap_or(Vec2::ZERO)
}

/// Real roots of `a·t² + b·t + c = 0`, degrading to the linear case.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if near_zero(a, EPS_DENOM) {
        if near_zero(b, EPS_DENOM) { return Vec::new(); }
        return vec![-c / b];
    }
    let disc = b*b - 4.0*a*c;
    if disc < 0.0 { return Vec::new(); }
    if near_zero(disc, EPS_DENOM) { return vec![-b / (2.0*a)]; }
    let sq = disc.sqrt();
    vec![(-b + sq) / (2.0*a), (-b - sq) / (2.0*a)]
}

/// Normalize an angle to `[0, 2π)`.
pub fn normalize_angle(a: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let r = a % tau;
    if r < 0.0 { r + tau } else { r }
}
