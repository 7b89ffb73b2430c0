//! Elliptical arcs in the two SVG parameterizations.
//!
//! Endpoint form is what path data carries; center form is what evaluation
//! and cubic approximation need. Conversion follows the SVG 1.1
//! implementation notes, appendix F.6.

use super::cubic::CubicBezier;
use super::tolerance::EPS_ANG;
use crate::error::ArcError;
use crate::model::Vec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Endpoint parameterization, as written in an SVG `A` command.
/// `rotation` is the x-axis rotation in radians; `radius` holds `(rx, ry)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArcEndpointParams {
    pub from: Vec2,
    pub to: Vec2,
    pub radius: Vec2,
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

/// Center parameterization. Angles are in radians; a negative
/// `delta_angle` runs clockwise in y-up terms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArcCenterParams {
    pub center: Vec2,
    pub radius: Vec2,
    pub rotation: f64,
    pub start_angle: f64,
    pub delta_angle: f64,
}

/// Rotate `v` by the angle whose sine and cosine are given.
fn rotate(v: Vec2, sin_phi: f64, cos_phi: f64) -> Vec2 {
    Vec2::new(cos_phi * v.x - sin_phi * v.y, sin_phi * v.x + cos_phi * v.y)
}

impl ArcEndpointParams {
    /// Center form, or the reason the arc is degenerate.
    pub fn try_center_params(&self) -> Result<ArcCenterParams, ArcError> {
        let (sin_phi, cos_phi) = self.rotation.sin_cos();

        let mut rx = self.radius.x.abs();
        let mut ry = self.radius.y.abs();
        if rx == 0.0 || ry == 0.0 {
            return Err(ArcError::ZeroRadius);
        }

        // F.6.5.1
        let half = (self.from - self.to) / 2.0;
        let p1 = rotate(half, -sin_phi, cos_phi);
        let (x1p, y1p) = (p1.x, p1.y);

        // F.6.6 out-of-range radii
        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            rx *= lambda.sqrt();
            ry *= lambda.sqrt();
        }

        // F.6.5.2
        let sum_of_square = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
        if sum_of_square == 0.0 {
            return Err(ArcError::CoincidentEndpoints);
        }
        let sign = if self.large_arc == self.sweep { -1.0 } else { 1.0 };
        let coefficient = sign * ((rx * rx * ry * ry - sum_of_square) / sum_of_square).abs().sqrt();
        let c_prime = Vec2::new(rx * y1p / ry, -ry * x1p / rx) * coefficient;

        // F.6.5.3
        let center = rotate(c_prime, sin_phi, cos_phi) + (self.from + self.to) / 2.0;

        // F.6.5.5
        let u = Vec2::new(1.0, 0.0);
        let v = Vec2::new((x1p - c_prime.x) / rx, (y1p - c_prime.y) / ry);
        let w = Vec2::new((-x1p - c_prime.x) / rx, (-y1p - c_prime.y) / ry);
        let start_angle = u.angle_to(v);

        // F.6.5.6
        let mut delta_angle = v.angle_to(w) % TAU;
        if !self.sweep && delta_angle > 0.0 {
            delta_angle -= TAU;
        } else if self.sweep && delta_angle < 0.0 {
            delta_angle += TAU;
        }

        Ok(ArcCenterParams {
            center,
            radius: Vec2::new(rx, ry),
            rotation: self.rotation,
            start_angle,
            delta_angle,
        })
    }

    /// Center form. Degenerate arcs are logged and collapse to a zero-radius
    /// arc centered on `from`.
    pub fn center_params(&self) -> ArcCenterParams {
        self.try_center_params().unwrap_or_else(|err| {
            log::warn!("degenerate arc from {:?} to {:?}: {}", self.from, self.to, err);
            ArcCenterParams {
                center: self.from,
                radius: Vec2::ZERO,
                rotation: self.rotation,
                start_angle: 0.0,
                delta_angle: 0.0,
            }
        })
    }
}

impl ArcCenterParams {
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.delta_angle
    }

    pub fn clockwise(&self) -> bool {
        self.delta_angle < 0.0
    }

    fn point_at_angle(&self, theta: f64) -> Vec2 {
        let (sin_phi, cos_phi) = self.rotation.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();
        self.center + rotate(Vec2::new(self.radius.x * cos_theta, self.radius.y * sin_theta), sin_phi, cos_phi)
    }

    pub fn position(&self, param_t: f64) -> Vec2 {
        let t = param_t.clamp(0.0, 1.0);
        self.point_at_angle(self.start_angle + self.delta_angle * t)
    }

    pub fn endpoint_params(&self) -> ArcEndpointParams {
        ArcEndpointParams {
            from: self.point_at_angle(self.start_angle),
            to: self.point_at_angle(self.end_angle()),
            radius: self.radius,
            rotation: self.rotation,
            large_arc: self.delta_angle.abs() > PI,
            sweep: self.delta_angle > 0.0,
        }
    }

    /// Approximate the arc with cubic pieces spanning at most a quarter turn
    /// each. Zero-radius or zero-sweep arcs yield no pieces.
    pub fn to_cubics(&self) -> Vec<CubicBezier> {
        if self.radius.x == 0.0 || self.radius.y == 0.0 || self.delta_angle == 0.0 {
            return Vec::new();
        }
        let count = (self.delta_angle.abs() / FRAC_PI_2 - EPS_ANG).ceil().max(1.0) as usize;
        let step = self.delta_angle / count as f64;
        let (sin_phi, cos_phi) = self.rotation.sin_cos();
        let (rx, ry) = (self.radius.x, self.radius.y);

        (0..count)
            .map(|i| {
                let th0 = self.start_angle + step * i as f64;
                let th1 = th0 + step;
                let (sin_th0, cos_th0) = th0.sin_cos();
                let (sin_th1, cos_th1) = th1.sin_cos();
                let th_half = 0.5 * (th1 - th0);
                let k = (8.0 / 3.0) * (th_half * 0.5).sin().powi(2) / th_half.sin();
                let local = |x: f64, y: f64| self.center + rotate(Vec2::new(x, y), sin_phi, cos_phi);
                CubicBezier::new(
                    local(rx * cos_th0, ry * sin_th0),
                    local(rx * (cos_th0 - k * sin_th0), ry * (sin_th0 + k * cos_th0)),
                    local(rx * (cos_th1 + k * sin_th1), ry * (sin_th1 - k * cos_th1)),
                    local(rx * cos_th1, ry * sin_th1),
                )
            })
            .collect()
    }
}
