// Centralized ingestion limits to harden against untrusted input (JSON/SVG)

// Document caps
pub const MAX_EVENTS: usize = 1_000_000;
pub const MAX_PATHS: usize = 100_000;
pub const MAX_NODES_PER_PATH: usize = 200_000;

// SVG caps
pub const MAX_SVG_TOKENS: usize = 8 * 1024 * 1024; // 8 MB worth of characters in the 'd' string
pub const MAX_SVG_COMMANDS: usize = 200_000;
pub const MAX_SVG_SUBPATHS: usize = 10_000;

// Tessellation / fitting caps
pub const MAX_TESSELLATION_STEPS: usize = 4_096;
pub const MAX_FIT_POINTS: usize = 100_000;

// Numeric bounds
pub const COORD_MIN: f64 = -10_000_000.0;
pub const COORD_MAX: f64 =  10_000_000.0;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

#[inline]
pub fn point_in_bounds(p: crate::model::Vec2) -> bool { in_coord_bounds(p.x) && in_coord_bounds(p.y) }
