//! Committed and pending path state.
//!
//! A [`Snapshot`] is a full path map. The store keeps the committed
//! snapshot plus, while a gesture is in progress, one preview overlay built
//! by cloning the committed snapshot and applying the pending event to it.
//! Paths are held behind `Arc`, so the clone is shallow and only paths the
//! pending event touches are copied.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::error::ApplyError;
use crate::event::{DocumentEvent, PathEvent, PathUpdate};
use crate::id::PathId;
use crate::path::Path;
use crate::property::PathProperty;

/// Which paths an applied event touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppliedChange {
    pub created: Vec<PathId>,
    pub updated: Vec<PathId>,
    pub removed: Vec<PathId>,
}

impl AppliedChange {
    fn created(id: PathId) -> Self {
        Self { created: vec![id], ..Default::default() }
    }

    fn updated(id: PathId) -> Self {
        Self { updated: vec![id], ..Default::default() }
    }

    fn removed(id: PathId) -> Self {
        Self { removed: vec![id], ..Default::default() }
    }

    pub fn extend(&mut self, other: AppliedChange) {
        self.created.extend(other.created);
        self.updated.extend(other.updated);
        self.removed.extend(other.removed);
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    paths: IndexMap<PathId, Arc<Path>>,
    properties: IndexMap<PathId, Arc<PathProperty>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.get(&id).map(Arc::as_ref)
    }

    pub fn property(&self, id: PathId) -> Option<&PathProperty> {
        self.properties.get(&id).map(Arc::as_ref)
    }

    /// Paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.paths.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn require(&self, id: PathId) -> Result<&Path, ApplyError> {
        self.path(id).ok_or(ApplyError::MissingPath(id))
    }

    fn require_absent(&self, id: PathId) -> Result<(), ApplyError> {
        if self.paths.contains_key(&id) {
            Err(ApplyError::DuplicatePath(id))
        } else {
            Ok(())
        }
    }

    fn property_mut(&mut self, id: PathId) -> &mut PathProperty {
        Arc::make_mut(self.properties.entry(id).or_insert_with(|| Arc::new(PathProperty::new(id))))
    }

    fn insert(&mut self, path: Path) {
        let id = path.id();
        self.paths.insert(id, Arc::new(path));
        self.properties.entry(id).or_insert_with(|| Arc::new(PathProperty::new(id)));
    }

    fn remove(&mut self, id: PathId) -> Option<PathProperty> {
        self.paths.shift_remove(&id);
        self.properties.shift_remove(&id).map(Arc::unwrap_or_clone)
    }

    /// Store `path` under its id, or drop it when it has become degenerate.
    fn settle(&mut self, path: Path, change: &mut AppliedChange) {
        let id = path.id();
        if path.is_degenerate() {
            log::debug!("removing {} with {} node(s)", id, path.len());
            self.remove(id);
            change.removed.push(id);
            return;
        }
        if let Some(prop) = self.properties.get_mut(&id) {
            Arc::make_mut(prop).retain_nodes(|n| path.contains_node(n));
        }
        self.paths.insert(id, Arc::new(path));
    }

    /// Apply one event. On `Err` the snapshot is unchanged.
    pub fn apply(&mut self, event: &PathEvent) -> Result<AppliedChange, ApplyError> {
        match event {
            PathEvent::Create { path } => {
                self.require_absent(path.id())?;
                if path.is_degenerate() {
                    return Err(ApplyError::Degenerate(path.id()));
                }
                self.insert(path.clone());
                Ok(AppliedChange::created(path.id()))
            }
            PathEvent::Delete { path_id } => {
                self.require(*path_id)?;
                self.remove(*path_id);
                Ok(AppliedChange::removed(*path_id))
            }
            PathEvent::Update { path_id, kind } => self.apply_update(*path_id, kind),
            PathEvent::Merge { path_id, ending_node_id, merged_path_id, merged_ending_node_id } => {
                let mut path = self.require(*path_id)?.clone();
                let mut change = AppliedChange::updated(*path_id);
                if path_id == merged_path_id {
                    path.merge_self(*ending_node_id, *merged_ending_node_id)?;
                } else {
                    let merged = self.require(*merged_path_id)?;
                    path.merge_with(*ending_node_id, merged, *merged_ending_node_id)?;
                    if let Some(prop) = self.remove(*merged_path_id) {
                        self.property_mut(*path_id).absorb(prop);
                    }
                    change.removed.push(*merged_path_id);
                }
                self.settle(path, &mut change);
                Ok(change)
            }
            PathEvent::BreakAtNode { path_id, node_id, new_node_id, new_path_id } => {
                let mut path = self.require(*path_id)?.clone();
                if !path.is_closed() {
                    self.require_absent(*new_path_id)?;
                }
                let spilled = path.break_at_node(*node_id, *new_node_id, *new_path_id)?;
                Ok(self.settle_break(path, spilled))
            }
            PathEvent::BreakAtEdge { path_id, from_node_id, new_path_id } => {
                let mut path = self.require(*path_id)?.clone();
                if !path.is_closed() {
                    self.require_absent(*new_path_id)?;
                }
                let spilled = path.break_at_edge(*from_node_id, *new_path_id)?;
                Ok(self.settle_break(path, spilled))
            }
        }
    }

    fn settle_break(&mut self, path: Path, spilled: Option<Path>) -> AppliedChange {
        let id = path.id();
        let mut change = AppliedChange::updated(id);
        if let Some(tail) = spilled {
            if tail.is_degenerate() {
                log::debug!("dropping degenerate tail of {}", id);
            } else {
                let mut prop = self.property(id).cloned().unwrap_or_else(|| PathProperty::new(id)).with_id(tail.id());
                prop.name = None;
                prop.retain_nodes(|n| tail.contains_node(n));
                let tail_id = tail.id();
                self.paths.insert(tail_id, Arc::new(tail));
                self.properties.insert(tail_id, Arc::new(prop));
                change.created.push(tail_id);
            }
        }
        self.settle(path, &mut change);
        change
    }

    fn apply_update(&mut self, path_id: PathId, kind: &PathUpdate) -> Result<AppliedChange, ApplyError> {
        let mut path = self.require(path_id)?.clone();
        path.update(kind)?;
        match kind {
            PathUpdate::SetName { name } => self.property_mut(path_id).name = name.clone(),
            PathUpdate::SetNodeType { node_ids, node_type } => {
                let ids: Vec<_> = node_ids.iter().copied().filter(|n| path.contains_node(*n)).collect();
                self.property_mut(path_id).set_node_type(&ids, *node_type);
            }
            PathUpdate::SetSegmentType { from_node_ids, segment_type } => {
                let ids: Vec<_> = from_node_ids.iter().copied().filter(|n| path.segment(*n).is_some()).collect();
                self.property_mut(path_id).set_segment_type(&ids, *segment_type);
            }
            _ => {}
        }
        let mut change = AppliedChange::updated(path_id);
        self.settle(path, &mut change);
        Ok(change)
    }

    /// Apply every event of a revision in order. Failing sub-events are
    /// logged and skipped.
    pub fn apply_document_event(&mut self, event: &DocumentEvent) -> AppliedChange {
        let mut change = AppliedChange::default();
        for e in event.events() {
            match self.apply(e) {
                Ok(c) => change.extend(c),
                Err(err) => log::debug!("skipping {:?}: {}", e, err),
            }
        }
        change
    }
}

/// Committed state, or committed state plus a speculative overlay.
#[derive(Clone, Debug, Default)]
pub enum StoreState {
    #[default]
    Committed,
    Previewing {
        overlay: Snapshot,
        event: DocumentEvent,
    },
}

#[derive(Clone, Debug, Default)]
pub struct PathStore {
    committed: Snapshot,
    state: StoreState,
}

impl PathStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> &Snapshot {
        &self.committed
    }

    /// What the UI should show: the overlay while previewing.
    pub fn current(&self) -> &Snapshot {
        match &self.state {
            StoreState::Committed => &self.committed,
            StoreState::Previewing { overlay, .. } => overlay,
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn pending_event(&self) -> Option<&DocumentEvent> {
        match &self.state {
            StoreState::Committed => None,
            StoreState::Previewing { event, .. } => Some(event),
        }
    }

    pub fn is_previewing(&self) -> bool {
        matches!(self.state, StoreState::Previewing { .. })
    }

    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.current().path(id)
    }

    pub fn property(&self, id: PathId) -> Option<&PathProperty> {
        self.current().property(id)
    }

    /// Apply one event to the committed state, discarding any preview.
    pub fn apply(&mut self, event: &PathEvent) -> Result<AppliedChange, ApplyError> {
        self.state = StoreState::Committed;
        let change = self.committed.apply(event)?;
        log::debug!("applied {:?}", event);
        Ok(change)
    }

    /// Commit a whole revision, discarding any preview.
    pub fn commit(&mut self, event: &DocumentEvent) -> AppliedChange {
        self.state = StoreState::Committed;
        self.committed.apply_document_event(event)
    }

    /// Replace the preview with `event` applied over the committed state.
    pub fn preview(&mut self, event: DocumentEvent) -> AppliedChange {
        let mut overlay = self.committed.clone();
        let change = overlay.apply_document_event(&event);
        self.state = StoreState::Previewing { overlay, event };
        change
    }

    /// Promote the overlay to committed state, returning the pending event.
    pub fn commit_preview(&mut self) -> Option<DocumentEvent> {
        match std::mem::take(&mut self.state) {
            StoreState::Committed => None,
            StoreState::Previewing { overlay, event } => {
                self.committed = overlay;
                Some(event)
            }
        }
    }

    /// Throw the overlay away. Returns whether there was one.
    pub fn cancel_preview(&mut self) -> bool {
        !matches!(std::mem::take(&mut self.state), StoreState::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DocumentAction, DocumentEventKind};
    use crate::id::NodeId;
    use crate::model::{PathNode, Vec2};

    fn line(x0: f64, x1: f64) -> Path {
        Path::from_nodes([PathNode::new(Vec2::new(x0, 0.0)), PathNode::new(Vec2::new(x1, 0.0))], false)
    }

    fn doc(events: Vec<PathEvent>) -> DocumentEvent {
        DocumentEvent { kind: DocumentEventKind::Compound(events), action: DocumentAction::Delete { path_ids: vec![] } }
    }

    #[test]
    fn create_and_delete() {
        let mut store = PathStore::new();
        let p = line(0.0, 10.0);
        let id = p.id();
        assert_eq!(store.apply(&PathEvent::Create { path: p.clone() }).unwrap().created, vec![id]);
        assert_eq!(store.apply(&PathEvent::Create { path: p }), Err(ApplyError::DuplicatePath(id)));
        assert!(store.property(id).is_some());
        store.apply(&PathEvent::Delete { path_id: id }).unwrap();
        assert!(store.path(id).is_none());
        assert!(store.property(id).is_none());
    }

    #[test]
    fn degenerate_paths_are_rejected_or_removed() {
        let mut store = PathStore::new();
        let single = Path::from_nodes([PathNode::new(Vec2::ZERO)], false);
        assert!(store.apply(&PathEvent::Create { path: single }).is_err());

        let p = line(0.0, 10.0);
        let id = p.id();
        let first = p.first_node().unwrap().0;
        store.apply(&PathEvent::Create { path: p }).unwrap();
        let change = store.apply(&PathEvent::update(id, PathUpdate::NodeDelete { node_id: first })).unwrap();
        assert_eq!(change.removed, vec![id]);
        assert!(store.path(id).is_none());
    }

    #[test]
    fn failed_event_leaves_state() {
        let mut store = PathStore::new();
        let p = line(0.0, 10.0);
        let id = p.id();
        store.apply(&PathEvent::Create { path: p.clone() }).unwrap();
        let bad = PathEvent::update(id, PathUpdate::NodeDelete { node_id: NodeId::next() });
        assert!(store.apply(&bad).is_err());
        assert_eq!(store.path(id), Some(&p));
    }

    #[test]
    fn preview_is_isolated_until_commit() {
        let mut store = PathStore::new();
        let p = line(0.0, 10.0);
        let id = p.id();
        store.apply(&PathEvent::Create { path: p }).unwrap();

        let mv = |dx| doc(vec![PathEvent::update(id, PathUpdate::Move { offset: Vec2::new(dx, 0.0) })]);
        store.preview(mv(5.0));
        store.preview(mv(7.0));
        assert_eq!(store.path(id).unwrap().first_node().unwrap().1.position.x, 7.0);
        assert_eq!(store.committed().path(id).unwrap().first_node().unwrap().1.position.x, 0.0);

        assert!(store.cancel_preview());
        assert!(!store.cancel_preview());
        assert_eq!(store.path(id).unwrap().first_node().unwrap().1.position.x, 0.0);

        store.preview(mv(3.0));
        let committed = store.commit_preview().unwrap();
        assert_eq!(committed, mv(3.0));
        assert!(!store.is_previewing());
        assert_eq!(store.path(id).unwrap().first_node().unwrap().1.position.x, 3.0);
    }

    #[test]
    fn cross_path_merge_moves_properties() {
        let mut store = PathStore::new();
        let a = line(0.0, 10.0);
        let b = line(10.0, 20.0);
        let (a_id, b_id) = (a.id(), b.id());
        let a_last = a.last_node().unwrap().0;
        let b_first = b.first_node().unwrap().0;
        let b_last = b.last_node().unwrap().0;
        store.apply(&PathEvent::Create { path: a }).unwrap();
        store.apply(&PathEvent::Create { path: b }).unwrap();
        store
            .apply(&PathEvent::update(
                b_id,
                PathUpdate::SetNodeType { node_ids: vec![b_last], node_type: crate::model::NodeType::Mirrored },
            ))
            .unwrap();

        let change = store
            .apply(&PathEvent::Merge {
                path_id: a_id,
                ending_node_id: a_last,
                merged_path_id: b_id,
                merged_ending_node_id: b_first,
            })
            .unwrap();
        assert_eq!(change.removed, vec![b_id]);
        let merged = store.path(a_id).unwrap();
        assert_eq!(merged.len(), 3);
        assert!(store.path(b_id).is_none());
        assert_eq!(store.property(a_id).unwrap().node_type(b_last), crate::model::NodeType::Mirrored);
    }

    #[test]
    fn break_open_creates_second_path() {
        let mut store = PathStore::new();
        let p = Path::from_nodes((0..4).map(|i| PathNode::new(Vec2::new(i as f64, 0.0))), false);
        let id = p.id();
        let ids: Vec<NodeId> = p.node_ids().collect();
        store.apply(&PathEvent::Create { path: p }).unwrap();
        let new_path_id = PathId::next();
        let change = store
            .apply(&PathEvent::BreakAtEdge { path_id: id, from_node_id: ids[1], new_path_id })
            .unwrap();
        assert_eq!(change.created, vec![new_path_id]);
        assert_eq!(store.path(new_path_id).unwrap().len(), 2);
        assert_eq!(store.committed().paths().count(), 2);
    }

    #[test]
    fn compound_skips_failures() {
        let mut store = PathStore::new();
        let p = line(0.0, 10.0);
        let id = p.id();
        let change = store.commit(&doc(vec![
            PathEvent::Create { path: p },
            PathEvent::Delete { path_id: PathId::next() },
            PathEvent::update(id, PathUpdate::Move { offset: Vec2::new(1.0, 1.0) }),
        ]));
        assert_eq!(change.created, vec![id]);
        assert_eq!(change.updated, vec![id]);
    }
}
