//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::geometry::limits::MAX_TESSELLATION_STEPS;
use crate::grid::Grid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Subdivisions per segment for hit testing and inverse parametrization.
    pub tessellation_steps: usize,
    /// Coarser subdivisions used while a preview is showing.
    pub preview_tessellation_steps: usize,
    /// Stroke width used by `hit_test` when the caller gives none.
    pub hit_threshold: f64,
    /// Default error budget for curve fitting.
    pub fit_error: f64,
    pub grid: Option<Grid>,
    /// Newton reparametrization passes before the fitter splits.
    pub max_fit_iterations: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tessellation_steps: 64,
            preview_tessellation_steps: 16,
            hit_threshold: 24.0,
            fit_error: 1.0,
            grid: None,
            max_fit_iterations: 4,
        }
    }
}

impl EditorConfig {
    pub fn from_json(s: &str) -> Result<Self, DocumentError> {
        let mut cfg: EditorConfig = serde_json::from_str(s)?;
        cfg.tessellation_steps = cfg.tessellation_steps.clamp(1, MAX_TESSELLATION_STEPS);
        cfg.preview_tessellation_steps = cfg.preview_tessellation_steps.clamp(1, MAX_TESSELLATION_STEPS);
        Ok(cfg)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let cfg = EditorConfig::from_json(r#"{ "hit_threshold": 10.0 }"#).unwrap();
        assert_eq!(cfg.hit_threshold, 10.0);
        assert_eq!(cfg.tessellation_steps, 64);
        assert_eq!(cfg.max_fit_iterations, 4);
        assert!(cfg.grid.is_none());
    }

    #[test]
    fn grid_and_clamping() {
        let cfg = EditorConfig::from_json(
            r#"{ "grid": { "kind": "cartesian", "cell_size": 4.0 }, "tessellation_steps": 0 }"#,
        )
        .unwrap();
        assert_eq!(cfg.grid, Some(Grid::Cartesian { cell_size: 4.0 }));
        assert_eq!(cfg.tessellation_steps, 1);
        assert!(EditorConfig::from_json("{").is_err());
    }

    #[test]
    fn json_round_trip() {
        let cfg = EditorConfig::default();
        assert_eq!(EditorConfig::from_json(&cfg.to_json()).unwrap(), cfg);
    }
}
