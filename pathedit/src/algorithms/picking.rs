use serde::Serialize;

use crate::id::{NodeId, PathId};
use crate::model::Vec2;
use crate::store::Snapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleEnd {
    In,
    Out,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pick {
    Node { path_id: PathId, node_id: NodeId, dist: f64 },
    Handle { path_id: PathId, node_id: NodeId, end: HandleEnd, dist: f64 },
    Segment { path_id: PathId, from_node_id: NodeId, param_t: f64, dist: f64 },
}

/// First path, in map order, whose stroke of width `threshold` covers `pos`.
/// The stroke has round caps and joins, so this is a distance test against
/// the tessellated outline.
pub fn hit_test(paths: &Snapshot, pos: Vec2, threshold: f64, steps: usize) -> Option<PathId> {
    let half = threshold.abs() / 2.0;
    paths.paths().find_map(|path| {
        let bounds = path.bounds()?.inflated(half);
        if !bounds.contains(pos) {
            return None;
        }
        path.tessellated(steps)
            .iter()
            .filter_map(|poly| poly.distance(pos))
            .any(|d| d <= half)
            .then(|| path.id())
    })
}

/// Nearest editable element within `tol`. Nodes win over handles, and
/// handles over segments.
pub fn pick(paths: &Snapshot, pos: Vec2, tol: f64, steps: usize) -> Option<Pick> {
    let tol = tol.abs();

    let mut best_node: Option<(PathId, NodeId, f64)> = None;
    for path in paths.paths() {
        for (id, node) in path.nodes() {
            let d = node.position.distance(pos);
            if d <= tol && best_node.map_or(true, |(_, _, bd)| d < bd) {
                best_node = Some((path.id(), id, d));
            }
        }
    }
    if let Some((path_id, node_id, dist)) = best_node {
        return Some(Pick::Node { path_id, node_id, dist });
    }

    let mut best_handle: Option<(PathId, NodeId, HandleEnd, f64)> = None;
    for path in paths.paths() {
        for (id, node) in path.nodes() {
            for (end, control, at) in [
                (HandleEnd::In, node.control_in, node.control_in_position()),
                (HandleEnd::Out, node.control_out, node.control_out_position()),
            ] {
                if control.is_zero() {
                    continue;
                }
                let d = at.distance(pos);
                if d <= tol && best_handle.map_or(true, |(_, _, _, bd)| d < bd) {
                    best_handle = Some((path.id(), id, end, d));
                }
            }
        }
    }
    if let Some((path_id, node_id, end, dist)) = best_handle {
        return Some(Pick::Handle { path_id, node_id, end, dist });
    }

    let mut best_segment: Option<(PathId, NodeId, f64, f64)> = None;
    for path in paths.paths() {
        for id in path.node_ids() {
            let Some(segment) = path.segment(id) else { continue };
            if !segment.bounds().inflated(tol).contains(pos) {
                continue;
            }
            let Some((t, d)) = segment.tessellated(steps).approx_path_param_t(pos) else { continue };
            if d <= tol && best_segment.map_or(true, |(_, _, _, bd)| d < bd) {
                best_segment = Some((path.id(), id, t, d));
            }
        }
    }
    best_segment.map(|(path_id, from_node_id, param_t, dist)| Pick::Segment { path_id, from_node_id, param_t, dist })
}
