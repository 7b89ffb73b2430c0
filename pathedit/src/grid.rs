//! Snapping collaborators.

use serde::{Deserialize, Serialize};

use crate::model::Vec2;

/// Anything that can quantize a document-space point.
pub trait Snap {
    fn snap(&self, point: Vec2) -> Vec2;

    fn is_snapped(&self, point: Vec2) -> bool {
        self.snap(point) == point
    }
}

/// Identity snapping, used when no grid is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSnap;

impl Snap for NoSnap {
    fn snap(&self, point: Vec2) -> Vec2 {
        point
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Grid {
    Cartesian { cell_size: f64 },
}

impl Snap for Grid {
    fn snap(&self, point: Vec2) -> Vec2 {
        match *self {
            Grid::Cartesian { cell_size } if cell_size > 0.0 && cell_size.is_finite() => Vec2::new(
                (point.x / cell_size).round() * cell_size,
                (point.y / cell_size).round() * cell_size,
            ),
            Grid::Cartesian { .. } => point,
        }
    }
}

impl Snap for Option<Grid> {
    fn snap(&self, point: Vec2) -> Vec2 {
        match self {
            Some(g) => g.snap(point),
            None => point,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_rounds_to_cells() {
        let g = Grid::Cartesian { cell_size: 8.0 };
        assert_eq!(g.snap(Vec2::new(11.0, -5.0)), Vec2::new(8.0, -8.0));
        assert!(g.is_snapped(Vec2::new(16.0, 0.0)));
        assert!(!g.is_snapped(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn bad_cell_size_is_identity() {
        let g = Grid::Cartesian { cell_size: 0.0 };
        assert_eq!(g.snap(Vec2::new(1.5, 2.5)), Vec2::new(1.5, 2.5));
        assert_eq!(None::<Grid>.snap(Vec2::new(1.5, 2.5)), Vec2::new(1.5, 2.5));
    }
}
