//! Mutation vocabulary.
//!
//! A [`PathEvent`] describes one intended change; it is the only way path
//! state is mutated. [`DocumentEvent`] is what the document log records:
//! one event or a compound batch, together with the action it came from.

use serde::{Deserialize, Serialize};

use crate::id::{NodeId, PathId};
use crate::model::{NodeType, PathEdge, PathNode, SegmentType, Vec2};
use crate::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PathEvent {
    Create {
        path: Path,
    },
    Delete {
        path_id: PathId,
    },
    Update {
        path_id: PathId,
        kind: PathUpdate,
    },
    /// Join two ending nodes, of the same path (closing it) or of two paths.
    Merge {
        path_id: PathId,
        ending_node_id: NodeId,
        merged_path_id: PathId,
        merged_ending_node_id: NodeId,
    },
    /// Cut at a node. `new_node_id` duplicates the cut node so both sides
    /// keep an editable end. Open paths spill their tail into `new_path_id`.
    BreakAtNode {
        path_id: PathId,
        node_id: NodeId,
        new_node_id: Option<NodeId>,
        new_path_id: PathId,
    },
    /// Cut the segment starting at `from_node_id`.
    BreakAtEdge {
        path_id: PathId,
        from_node_id: NodeId,
        new_path_id: PathId,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PathUpdate {
    Move {
        offset: Vec2,
    },
    /// Insert after `prev_node_id`, or at the front when it is `None`.
    NodeCreate {
        prev_node_id: Option<NodeId>,
        node_id: NodeId,
        node: PathNode,
    },
    NodeUpdate {
        node_id: NodeId,
        node: PathNode,
    },
    NodeDelete {
        node_id: NodeId,
    },
    EdgeUpdate {
        from_node_id: NodeId,
        edge: PathEdge,
    },
    SetNodeType {
        node_ids: Vec<NodeId>,
        node_type: NodeType,
    },
    SetSegmentType {
        from_node_ids: Vec<NodeId>,
        segment_type: SegmentType,
    },
    SetName {
        name: Option<String>,
    },
}

impl PathEvent {
    pub fn update(path_id: PathId, kind: PathUpdate) -> Self {
        PathEvent::Update { path_id, kind }
    }

    /// The path the event is addressed to.
    pub fn path_id(&self) -> PathId {
        match self {
            PathEvent::Create { path } => path.id(),
            PathEvent::Delete { path_id }
            | PathEvent::Update { path_id, .. }
            | PathEvent::Merge { path_id, .. }
            | PathEvent::BreakAtNode { path_id, .. }
            | PathEvent::BreakAtEdge { path_id, .. } => *path_id,
        }
    }
}

/// Per-path intents that still need resolving against current geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PathActionKind {
    DeleteNode { node_id: NodeId },
    SetNodePosition { node_id: NodeId, position: Vec2 },
    SetEdge { from_node_id: NodeId, edge: PathEdge },
    AddEndingNode { ending_node_id: NodeId, new_node_id: NodeId, offset: Vec2 },
    SplitSegment { from_node_id: NodeId, param_t: f64, new_node_id: NodeId, offset: Vec2 },
    MoveNodes { node_ids: Vec<NodeId>, offset: Vec2 },
    MoveEdge { from_node_id: NodeId, offset: Vec2 },
    MoveEdgeControl { from_node_id: NodeId, offset_out: Vec2, offset_in: Vec2 },
    MovePath { offset: Vec2 },
    SetNodeType { node_ids: Vec<NodeId>, node_type: NodeType },
    SetSegmentType { from_node_ids: Vec<NodeId>, segment_type: SegmentType },
    SetName { name: Option<String> },
}

/// A recorded user intent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentAction {
    Load {
        paths: Vec<Path>,
    },
    Create {
        path: Path,
    },
    Delete {
        path_ids: Vec<PathId>,
    },
    Move {
        path_ids: Vec<PathId>,
        offset: Vec2,
    },
    Update {
        path_id: PathId,
        kind: PathActionKind,
    },
    Merge {
        path_id: PathId,
        ending_node_id: NodeId,
        merged_path_id: PathId,
        merged_ending_node_id: NodeId,
    },
    BreakAtNode {
        path_id: PathId,
        node_id: NodeId,
        new_node_id: Option<NodeId>,
        new_path_id: PathId,
    },
    BreakAtEdge {
        path_id: PathId,
        from_node_id: NodeId,
        new_path_id: PathId,
    },
}

impl DocumentAction {
    pub fn is_load(&self) -> bool {
        matches!(self, DocumentAction::Load { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "events", rename_all = "camelCase")]
pub enum DocumentEventKind {
    Single(PathEvent),
    Compound(Vec<PathEvent>),
}

/// One revision of the document log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentEvent {
    pub kind: DocumentEventKind,
    pub action: DocumentAction,
}

impl DocumentEvent {
    /// Wrap a batch: nothing for an empty batch, a single event for one,
    /// a compound event otherwise.
    pub fn from_events(mut events: Vec<PathEvent>, action: DocumentAction) -> Option<Self> {
        let kind = match events.len() {
            0 => return None,
            1 => DocumentEventKind::Single(events.remove(0)),
            _ => DocumentEventKind::Compound(events),
        };
        Some(Self { kind, action })
    }

    /// Flattened view of the path events, in application order.
    pub fn events(&self) -> &[PathEvent] {
        match &self.kind {
            DocumentEventKind::Single(e) => std::slice::from_ref(e),
            DocumentEventKind::Compound(es) => es,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.kind, DocumentEventKind::Compound(_))
    }
}
