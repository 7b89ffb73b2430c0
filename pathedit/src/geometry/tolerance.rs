// Centralized tolerances and helpers for robust geometry

pub const EPS_POS: f64 = 1e-9;            // point coincidence threshold
pub const EPS_LEN: f64 = 1e-12;           // zero-length vector threshold
pub const EPS_DENOM: f64 = 1e-12;         // denominator guard for LS/ratios
pub const EPS_FIT: f64 = 1e-12;           // curve fitter: handle length slack, scaled by chord
pub const EPS_ANG: f64 = 1e-9;            // angle compare slack (radians)

#[inline] pub fn clamp01(x: f64) -> f64 { x.max(0.0).min(1.0) }
#[inline] pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 { x.max(lo).min(hi) }
#[inline] pub fn near_zero(x: f64, eps: f64) -> bool { x.abs() <= eps }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_and_compares() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp(5.0, -1.0, 2.0), 2.0);
        assert!(near_zero(1e-13, EPS_DENOM));
    }
}
