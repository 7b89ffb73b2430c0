//! Turns user intents into path events.
//!
//! Actions are resolved against the current snapshot, with positions
//! quantized through a [`Snap`] collaborator. An action whose preconditions
//! do not hold, or whose snapped offset is zero, resolves to no events at
//! all; that is the debouncing the editor relies on, not an error.

use crate::event::{DocumentAction, DocumentEvent, PathActionKind, PathEvent, PathUpdate};
use crate::grid::Snap;
use crate::id::{NodeId, PathId};
use crate::model::{PathEdge, PathNode, Vec2};
use crate::store::Snapshot;

pub struct DocumentUpdater<'a, S: Snap + ?Sized> {
    paths: &'a Snapshot,
    grid: &'a S,
}

impl<'a, S: Snap + ?Sized> DocumentUpdater<'a, S> {
    pub fn new(paths: &'a Snapshot, grid: &'a S) -> Self {
        Self { paths, grid }
    }

    /// Resolve an action into a revision, or `None` when it yields no events.
    pub fn resolve(&self, action: DocumentAction) -> Option<DocumentEvent> {
        let events = self.collect_events(&action);
        log::debug!("{:?} resolved to {} event(s)", action, events.len());
        DocumentEvent::from_events(events, action)
    }

    fn snapped_offset(&self, from: Vec2, offset: Vec2) -> Vec2 {
        self.grid.snap(from + offset) - from
    }

    pub fn collect_events(&self, action: &DocumentAction) -> Vec<PathEvent> {
        let mut events = Vec::new();
        match action {
            DocumentAction::Load { paths } => {
                events.extend(paths.iter().map(|p| PathEvent::Create { path: p.clone() }));
            }
            DocumentAction::Create { path } => {
                if !path.is_degenerate() && self.paths.path(path.id()).is_none() {
                    events.push(PathEvent::Create { path: path.clone() });
                }
            }
            DocumentAction::Delete { path_ids } => {
                for id in path_ids.iter().filter(|id| self.paths.path(**id).is_some()) {
                    events.push(PathEvent::Delete { path_id: *id });
                }
            }
            DocumentAction::Move { path_ids, offset } => {
                if !offset.is_zero() {
                    for id in path_ids.iter().filter(|id| self.paths.path(**id).is_some()) {
                        events.push(PathEvent::update(*id, PathUpdate::Move { offset: *offset }));
                    }
                }
            }
            DocumentAction::Update { path_id, kind } => self.collect_update(&mut events, *path_id, kind),
            DocumentAction::Merge { path_id, ending_node_id, merged_path_id, merged_ending_node_id } => {
                let (Some(path), Some(merged)) = (self.paths.path(*path_id), self.paths.path(*merged_path_id)) else {
                    return events;
                };
                if ending_node_id != merged_ending_node_id
                    && path.is_ending_node(*ending_node_id)
                    && merged.is_ending_node(*merged_ending_node_id)
                {
                    events.push(PathEvent::Merge {
                        path_id: *path_id,
                        ending_node_id: *ending_node_id,
                        merged_path_id: *merged_path_id,
                        merged_ending_node_id: *merged_ending_node_id,
                    });
                }
            }
            DocumentAction::BreakAtNode { path_id, node_id, new_node_id, new_path_id } => {
                if self.paths.path(*path_id).is_some_and(|p| p.contains_node(*node_id)) {
                    events.push(PathEvent::BreakAtNode {
                        path_id: *path_id,
                        node_id: *node_id,
                        new_node_id: *new_node_id,
                        new_path_id: *new_path_id,
                    });
                }
            }
            DocumentAction::BreakAtEdge { path_id, from_node_id, new_path_id } => {
                if self.paths.path(*path_id).is_some_and(|p| p.segment(*from_node_id).is_some()) {
                    events.push(PathEvent::BreakAtEdge {
                        path_id: *path_id,
                        from_node_id: *from_node_id,
                        new_path_id: *new_path_id,
                    });
                }
            }
        }
        events
    }

    fn collect_update(&self, events: &mut Vec<PathEvent>, path_id: PathId, kind: &PathActionKind) {
        let Some(path) = self.paths.path(path_id) else { return };
        let mut push = |kind: PathUpdate| events.push(PathEvent::update(path_id, kind));

        match kind {
            PathActionKind::DeleteNode { node_id } => {
                if !path.contains_node(*node_id) {
                    return;
                }
                if path.len() - 1 < 2 {
                    events.push(PathEvent::Delete { path_id });
                } else {
                    push(PathUpdate::NodeDelete { node_id: *node_id });
                }
            }
            PathActionKind::SetNodePosition { node_id, position } => {
                if let Some(node) = path.node(*node_id) {
                    push(PathUpdate::NodeUpdate { node_id: *node_id, node: PathNode { position: *position, ..*node } });
                }
            }
            PathActionKind::SetEdge { from_node_id, edge } => {
                if path.segment(*from_node_id).is_some() {
                    push(PathUpdate::EdgeUpdate { from_node_id: *from_node_id, edge: *edge });
                }
            }
            PathActionKind::AddEndingNode { ending_node_id, new_node_id, offset } => {
                let Some(ending) = path.node(*ending_node_id) else { return };
                let prev_node_id = if path.is_first_ending_node(*ending_node_id) {
                    None
                } else if path.is_last_ending_node(*ending_node_id) {
                    Some(*ending_node_id)
                } else {
                    return;
                };
                let snapped = self.snapped_offset(ending.position, *offset);
                if snapped.is_zero() || path.contains_node(*new_node_id) {
                    return;
                }
                push(PathUpdate::NodeCreate {
                    prev_node_id,
                    node_id: *new_node_id,
                    node: PathNode::new(ending.position + snapped),
                });
            }
            PathActionKind::SplitSegment { from_node_id, param_t, new_node_id, offset } => {
                let Some(segment) = path.segment(*from_node_id) else { return };
                if path.contains_node(*new_node_id) {
                    return;
                }
                let position = segment.position(*param_t);
                let (before, after) = segment.split(*param_t);
                let snapped = self.snapped_offset(position, *offset);
                push(PathUpdate::NodeCreate {
                    prev_node_id: Some(*from_node_id),
                    node_id: *new_node_id,
                    node: PathNode::new(position + snapped),
                });
                push(PathUpdate::EdgeUpdate { from_node_id: *from_node_id, edge: before.edge });
                push(PathUpdate::EdgeUpdate { from_node_id: *new_node_id, edge: after.edge });
            }
            PathActionKind::MoveNodes { node_ids, offset } => {
                let nodes: Vec<(NodeId, &PathNode)> =
                    node_ids.iter().filter_map(|id| path.node(*id).map(|n| (*id, n))).collect();
                let Some((_, anchor)) = nodes.first() else { return };
                let snapped = self.snapped_offset(anchor.position, *offset);
                if snapped.is_zero() {
                    return;
                }
                for (id, node) in nodes {
                    push(PathUpdate::NodeUpdate { node_id: id, node: node.translated(snapped) });
                }
            }
            PathActionKind::MoveEdge { from_node_id, offset } => {
                let Some(curr) = path.node(*from_node_id) else { return };
                let snapped = self.snapped_offset(curr.position, *offset);
                if snapped.is_zero() {
                    return;
                }
                push(PathUpdate::NodeUpdate { node_id: *from_node_id, node: curr.translated(snapped) });
                if let Some((next_id, next)) = path.node_after(*from_node_id) {
                    push(PathUpdate::NodeUpdate { node_id: next_id, node: next.translated(snapped) });
                }
            }
            PathActionKind::MoveEdgeControl { from_node_id, offset_out, offset_in } => {
                let Some(segment) = path.segment(*from_node_id) else { return };
                let snapped_out = if offset_out.is_zero() {
                    Vec2::ZERO
                } else {
                    self.snapped_offset(segment.from_out(), *offset_out)
                };
                let snapped_in = if offset_in.is_zero() {
                    Vec2::ZERO
                } else {
                    self.snapped_offset(segment.to_in(), *offset_in)
                };
                if snapped_out.is_zero() && snapped_in.is_zero() {
                    return;
                }
                push(PathUpdate::EdgeUpdate {
                    from_node_id: *from_node_id,
                    edge: PathEdge {
                        control_out: segment.edge.control_out + snapped_out,
                        control_in: segment.edge.control_in + snapped_in,
                    },
                });
            }
            PathActionKind::MovePath { offset } => {
                let Some(bounds) = path.bounds() else { return };
                let snapped = self.snapped_offset(bounds.min, *offset);
                if !snapped.is_zero() {
                    push(PathUpdate::Move { offset: snapped });
                }
            }
            PathActionKind::SetNodeType { node_ids, node_type } => {
                push(PathUpdate::SetNodeType { node_ids: node_ids.clone(), node_type: *node_type });
            }
            PathActionKind::SetSegmentType { from_node_ids, segment_type } => {
                push(PathUpdate::SetSegmentType { from_node_ids: from_node_ids.clone(), segment_type: *segment_type });
            }
            PathActionKind::SetName { name } => push(PathUpdate::SetName { name: name.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, NoSnap};
    use crate::path::Path;

    fn snapshot_with(path: &Path) -> Snapshot {
        let mut s = Snapshot::new();
        s.apply(&PathEvent::Create { path: path.clone() }).unwrap();
        s
    }

    fn three() -> Path {
        Path::from_nodes(
            [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)].into_iter().map(|(x, y)| PathNode::new(Vec2::new(x, y))),
            false,
        )
    }

    fn update(path: &Path, kind: PathActionKind) -> DocumentAction {
        DocumentAction::Update { path_id: path.id(), kind }
    }

    #[test]
    fn zero_snapped_offset_emits_nothing() {
        let p = three();
        let s = snapshot_with(&p);
        let grid = Grid::Cartesian { cell_size: 10.0 };
        let u = DocumentUpdater::new(&s, &grid);
        let first = p.first_node().unwrap().0;
        let action = update(&p, PathActionKind::MoveNodes { node_ids: vec![first], offset: Vec2::new(3.0, 2.0) });
        assert!(u.resolve(action).is_none());

        let action = update(&p, PathActionKind::MoveNodes { node_ids: vec![first], offset: Vec2::new(6.0, 2.0) });
        let event = u.resolve(action).unwrap();
        match &event.events()[0] {
            PathEvent::Update { kind: PathUpdate::NodeUpdate { node, .. }, .. } => {
                assert_eq!(node.position, Vec2::new(10.0, 0.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn add_ending_node_direction() {
        let p = three();
        let s = snapshot_with(&p);
        let u = DocumentUpdater::new(&s, &NoSnap);
        let first = p.first_node().unwrap().0;
        let middle = p.node_at(1).unwrap().0;
        let new_id = NodeId::next();
        let events = u.collect_events(&update(
            &p,
            PathActionKind::AddEndingNode { ending_node_id: first, new_node_id: new_id, offset: Vec2::new(-5.0, 0.0) },
        ));
        assert!(matches!(
            &events[..],
            [PathEvent::Update { kind: PathUpdate::NodeCreate { prev_node_id: None, .. }, .. }]
        ));
        let events = u.collect_events(&update(
            &p,
            PathActionKind::AddEndingNode { ending_node_id: middle, new_node_id: new_id, offset: Vec2::new(-5.0, 0.0) },
        ));
        assert!(events.is_empty());
    }

    #[test]
    fn split_segment_is_compound() {
        let p = three();
        let s = snapshot_with(&p);
        let u = DocumentUpdater::new(&s, &NoSnap);
        let first = p.first_node().unwrap().0;
        let event = u
            .resolve(update(
                &p,
                PathActionKind::SplitSegment {
                    from_node_id: first,
                    param_t: 0.5,
                    new_node_id: NodeId::next(),
                    offset: Vec2::ZERO,
                },
            ))
            .unwrap();
        assert!(event.is_compound());
        assert_eq!(event.events().len(), 3);
    }

    #[test]
    fn deleting_below_two_nodes_deletes_path() {
        let p = Path::from_nodes([PathNode::new(Vec2::ZERO), PathNode::new(Vec2::new(1.0, 0.0))], false);
        let s = snapshot_with(&p);
        let u = DocumentUpdater::new(&s, &NoSnap);
        let first = p.first_node().unwrap().0;
        let events = u.collect_events(&update(&p, PathActionKind::DeleteNode { node_id: first }));
        assert_eq!(events, vec![PathEvent::Delete { path_id: p.id() }]);
    }

    #[test]
    fn move_edge_moves_both_ends() {
        let p = three();
        let s = snapshot_with(&p);
        let u = DocumentUpdater::new(&s, &NoSnap);
        let first = p.first_node().unwrap().0;
        let events =
            u.collect_events(&update(&p, PathActionKind::MoveEdge { from_node_id: first, offset: Vec2::new(0.0, 4.0) }));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn missing_path_emits_nothing() {
        let s = Snapshot::new();
        let u = DocumentUpdater::new(&s, &NoSnap);
        let action = DocumentAction::Update {
            path_id: PathId::next(),
            kind: PathActionKind::MovePath { offset: Vec2::new(1.0, 1.0) },
        };
        assert!(u.resolve(action).is_none());
    }
}
