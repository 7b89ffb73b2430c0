//! The path entity: an ordered run of nodes, optionally closed.
//!
//! Node order is topological order. Segment `i` always runs from node `i`
//! to node `i + 1`, wrapping to node 0 when the path is closed. Every
//! mutation validates first and only then touches the node map, so an
//! `Err` leaves the path exactly as it was.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

use crate::error::ApplyError;
use crate::event::PathUpdate;
use crate::geometry::polyline::Polyline;
use crate::id::{NodeId, PathId};
use crate::model::{NodeType, PathEdge, PathNode, Rect, SegmentType, Vec2};
use crate::segment::PathSegment;

#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    id: PathId,
    nodes: IndexMap<NodeId, PathNode>,
    closed: bool,
}

impl Path {
    /// Build from explicit ids. Later duplicates of an id replace the
    /// earlier node in place.
    pub fn new(id: PathId, nodes: impl IntoIterator<Item = (NodeId, PathNode)>, closed: bool) -> Self {
        Self { id, nodes: nodes.into_iter().collect(), closed }
    }

    /// Build with freshly allocated path and node ids.
    pub fn from_nodes(nodes: impl IntoIterator<Item = PathNode>, closed: bool) -> Self {
        Self::new(PathId::next(), nodes.into_iter().map(|n| (NodeId::next(), n)), closed)
    }

    pub fn id(&self) -> PathId {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fewer than two nodes: such a path must not stay in a document.
    pub fn is_degenerate(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PathNode)> + '_ {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    pub fn node(&self, id: NodeId) -> Option<&PathNode> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    pub fn node_at(&self, i: usize) -> Option<(NodeId, &PathNode)> {
        self.nodes.get_index(i).map(|(id, n)| (*id, n))
    }

    pub fn first_node(&self) -> Option<(NodeId, &PathNode)> {
        self.node_at(0)
    }

    pub fn last_node(&self) -> Option<(NodeId, &PathNode)> {
        self.nodes.len().checked_sub(1).and_then(|i| self.node_at(i))
    }

    fn index_before(&self, i: usize) -> Option<usize> {
        match i {
            0 if self.closed => self.nodes.len().checked_sub(1),
            0 => None,
            _ => Some(i - 1),
        }
    }

    fn index_after(&self, i: usize) -> Option<usize> {
        if i + 1 < self.nodes.len() {
            Some(i + 1)
        } else if self.closed {
            Some(0)
        } else {
            None
        }
    }

    /// The neighbor before `id`, wrapping on closed paths.
    pub fn node_before(&self, id: NodeId) -> Option<(NodeId, &PathNode)> {
        let i = self.index_before(self.node_index(id)?)?;
        self.node_at(i)
    }

    /// The neighbor after `id`, wrapping on closed paths.
    pub fn node_after(&self, id: NodeId) -> Option<(NodeId, &PathNode)> {
        let i = self.index_after(self.node_index(id)?)?;
        self.node_at(i)
    }

    pub fn node_id_before(&self, id: NodeId) -> Option<NodeId> {
        self.node_before(id).map(|(id, _)| id)
    }

    pub fn node_id_after(&self, id: NodeId) -> Option<NodeId> {
        self.node_after(id).map(|(id, _)| id)
    }

    pub fn is_first_ending_node(&self, id: NodeId) -> bool {
        !self.closed && self.first_node().is_some_and(|(first, _)| first == id)
    }

    pub fn is_last_ending_node(&self, id: NodeId) -> bool {
        !self.closed && self.last_node().is_some_and(|(last, _)| last == id)
    }

    pub fn is_ending_node(&self, id: NodeId) -> bool {
        self.is_first_ending_node(id) || self.is_last_ending_node(id)
    }

    /// The opposite ending node, when it sits exactly on top of `id`.
    pub fn mergeable_node(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        let other = if self.is_first_ending_node(id) {
            self.last_node()
        } else if self.is_last_ending_node(id) {
            self.first_node()
        } else {
            None
        }?;
        (other.0 != id && other.1.position == node.position).then_some(other.0)
    }

    /// Segment starting at `from`; `None` for the last node of an open path.
    pub fn segment(&self, from: NodeId) -> Option<PathSegment> {
        let (_, next) = self.node_after(from)?;
        Some(PathSegment::between(self.node(from)?, next))
    }

    pub fn edge(&self, from: NodeId) -> Option<PathEdge> {
        self.segment(from).map(|s| s.edge)
    }

    pub fn segments(&self) -> Vec<PathSegment> {
        self.nodes.keys().filter_map(|id| self.segment(*id)).collect()
    }

    /// Walk forward from `i` to `j` inclusive, wrapping on closed paths and
    /// stopping at the end of an open one.
    pub fn indices(&self, i: usize, j: usize) -> Vec<usize> {
        let n = self.nodes.len();
        if i >= n || j >= n {
            return Vec::new();
        }
        let mut out = vec![i];
        let mut curr = i;
        while curr != j {
            match self.index_after(curr) {
                Some(next) if next != i => {
                    out.push(next);
                    curr = next;
                }
                _ => break,
            }
        }
        out
    }

    /// The nodes between two indices as a path of their own. Covering every
    /// node yields a closed subpath.
    pub fn subpath(&self, i: usize, j: usize) -> Option<Path> {
        let indices = self.indices(i, j);
        if indices.is_empty() {
            return None;
        }
        let closed = indices.len() == self.nodes.len();
        let nodes = indices.iter().filter_map(|&k| self.node_at(k).map(|(id, n)| (id, *n)));
        Some(Path::new(self.id, nodes, closed))
    }

    /// Maximal runs of consecutive nodes from `ids`, as `(start, end)`
    /// index pairs. On a closed path a run may wrap, giving `end < start`.
    pub fn continuous_node_index_pairs(&self, ids: &HashSet<NodeId>) -> Vec<(usize, usize)> {
        let n = self.nodes.len();
        let in_set = |k: usize| self.node_at(k).is_some_and(|(id, _)| ids.contains(&id));
        let start = if self.closed { (0..n).find(|&k| !in_set(k)).unwrap_or(0) } else { 0 };

        let mut pairs = Vec::new();
        let mut run: Option<(usize, usize)> = None;
        for step in 0..n {
            let k = (start + step) % n;
            if in_set(k) {
                run = Some(match run {
                    Some((s, _)) => (s, k),
                    None => (k, k),
                });
            } else if let Some(r) = run.take() {
                pairs.push(r);
            }
        }
        pairs.extend(run);
        pairs
    }

    pub fn bounds(&self) -> Option<Rect> {
        let mut rect = Rect::from_points(self.nodes.values().map(|n| n.position))?;
        for s in self.segments() {
            rect = rect.union(s.bounds());
        }
        Some(rect)
    }

    /// One polyline per segment, each with `steps` subdivisions.
    pub fn tessellated(&self, steps: usize) -> Vec<Polyline> {
        self.segments().iter().map(|s| s.tessellated(steps)).collect()
    }

    /// Same path walked backwards.
    pub fn reversed(&self) -> Path {
        Path {
            id: self.id,
            nodes: self.nodes.iter().rev().map(|(id, n)| (*id, n.reversed())).collect(),
            closed: self.closed,
        }
    }

    pub fn with_id(mut self, id: PathId) -> Path {
        self.id = id;
        self
    }

    // -------- mutation --------

    fn require(&self, id: NodeId) -> Result<usize, ApplyError> {
        self.node_index(id).ok_or(ApplyError::MissingNode { path: self.id, node: id })
    }

    fn require_absent(&self, id: NodeId) -> Result<(), ApplyError> {
        if self.contains_node(id) {
            Err(ApplyError::DuplicateNode { path: self.id, node: id })
        } else {
            Ok(())
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        for n in self.nodes.values_mut() {
            n.position += offset;
        }
    }

    /// Apply one single-path update.
    pub fn update(&mut self, kind: &PathUpdate) -> Result<(), ApplyError> {
        match kind {
            PathUpdate::Move { offset } => {
                self.translate(*offset);
                Ok(())
            }
            PathUpdate::NodeCreate { prev_node_id, node_id, node } => {
                self.require_absent(*node_id)?;
                let at = match prev_node_id {
                    Some(prev) => self.require(*prev)? + 1,
                    None => 0,
                };
                self.nodes.shift_insert(at, *node_id, *node);
                Ok(())
            }
            PathUpdate::NodeUpdate { node_id, node } => {
                let i = self.require(*node_id)?;
                self.nodes[i] = *node;
                Ok(())
            }
            PathUpdate::NodeDelete { node_id } => {
                self.require(*node_id)?;
                self.nodes.shift_remove(node_id);
                Ok(())
            }
            PathUpdate::EdgeUpdate { from_node_id, edge } => {
                let i = self.require(*from_node_id)?;
                let j = self
                    .index_after(i)
                    .ok_or(ApplyError::MissingNode { path: self.id, node: *from_node_id })?;
                self.nodes[i].control_out = edge.control_out;
                self.nodes[j].control_in = edge.control_in;
                Ok(())
            }
            PathUpdate::SetNodeType { node_ids, node_type } => {
                self.set_node_type(node_ids, *node_type);
                Ok(())
            }
            PathUpdate::SetSegmentType { from_node_ids, segment_type } => {
                self.set_segment_type(from_node_ids, *segment_type);
                Ok(())
            }
            PathUpdate::SetName { .. } => Ok(()),
        }
    }

    /// One-time handle recomputation. Missing ids are skipped.
    fn set_node_type(&mut self, node_ids: &[NodeId], node_type: NodeType) {
        for id in node_ids {
            let Some(node) = self.nodes.get_mut(id) else { continue };
            match node_type {
                NodeType::Locked if !node.control_in.is_zero() => {
                    node.control_out = node.control_in.with_length(-node.control_in.length());
                }
                NodeType::Mirrored => node.control_out = -node.control_in,
                _ => {}
            }
        }
    }

    /// Reshape segments to their new type. Missing or trailing ids are skipped.
    fn set_segment_type(&mut self, from_node_ids: &[NodeId], segment_type: SegmentType) {
        for id in from_node_ids {
            let Some(segment) = self.segment(*id) else { continue };
            let edge = match segment_type {
                SegmentType::Quadratic => segment.to_quadratic().edge,
                SegmentType::Line => PathEdge::LINE,
                SegmentType::Cubic | SegmentType::Auto => continue,
            };
            if let (Some(i), Some(j)) = (self.node_index(*id), self.node_id_after(*id).and_then(|n| self.node_index(n))) {
                self.nodes[i].control_out = edge.control_out;
                self.nodes[j].control_in = edge.control_in;
            }
        }
    }

    /// Close the path by joining its two ending nodes. Coinciding ending
    /// nodes collapse: the last node goes and its incoming handle moves to
    /// the first.
    pub fn merge_self(&mut self, ending_node_id: NodeId, other_ending_node_id: NodeId) -> Result<(), ApplyError> {
        let (a, b) = (ending_node_id, other_ending_node_id);
        self.require(a)?;
        self.require(b)?;
        if a == b {
            return Err(ApplyError::IllegalMerge(self.id, "cannot merge a node with itself"));
        }
        for id in [a, b] {
            if !self.is_ending_node(id) {
                return Err(ApplyError::NotEndingNode(id));
            }
        }
        let coincide = self.node(a).map(|n| n.position) == self.node(b).map(|n| n.position);
        if coincide {
            if let Some((_, last)) = self.nodes.pop() {
                if let Some(first) = self.nodes.get_index_mut(0) {
                    first.1.control_in = last.control_in;
                }
            }
        }
        self.closed = true;
        Ok(())
    }

    /// Append or prepend `other`'s chain at `ending_node_id`, oriented so
    /// `other_ending_node_id` is the node that touches ours.
    pub fn merge_with(
        &mut self,
        ending_node_id: NodeId,
        other: &Path,
        other_ending_node_id: NodeId,
    ) -> Result<(), ApplyError> {
        self.require(ending_node_id)?;
        other.require(other_ending_node_id)?;
        if !self.is_ending_node(ending_node_id) {
            return Err(ApplyError::NotEndingNode(ending_node_id));
        }
        if !other.is_ending_node(other_ending_node_id) {
            return Err(ApplyError::NotEndingNode(other_ending_node_id));
        }
        if let Some(dup) = other.node_ids().find(|id| self.contains_node(*id)) {
            return Err(ApplyError::DuplicateNode { path: self.id, node: dup });
        }

        let append = self.is_last_ending_node(ending_node_id);
        // appended chains start at the touching node, prepended chains end at it
        let needs_reverse = if append {
            !other.is_first_ending_node(other_ending_node_id)
        } else {
            !other.is_last_ending_node(other_ending_node_id)
        };
        let chain = if needs_reverse { other.reversed() } else { other.clone() };

        let ours = self.node(ending_node_id).map(|n| n.position);
        let theirs = chain.node(other_ending_node_id).map(|n| n.position);
        let drop_touching = ours == theirs;

        let mut joined: IndexMap<NodeId, PathNode> = IndexMap::with_capacity(self.len() + chain.len());
        if append {
            joined.extend(self.nodes.iter().map(|(k, v)| (*k, *v)));
            for (id, node) in chain.nodes() {
                if drop_touching && id == other_ending_node_id {
                    if let Some(last) = joined.get_mut(&ending_node_id) {
                        last.control_out = node.control_out;
                    }
                    continue;
                }
                joined.insert(id, *node);
            }
        } else {
            let mut carried_in = None;
            for (id, node) in chain.nodes() {
                if drop_touching && id == other_ending_node_id {
                    carried_in = Some(node.control_in);
                    continue;
                }
                joined.insert(id, *node);
            }
            joined.extend(self.nodes.iter().map(|(k, v)| (*k, *v)));
            if let (Some(control_in), Some(first)) = (carried_in, joined.get_mut(&ending_node_id)) {
                first.control_in = control_in;
            }
        }
        self.nodes = joined;
        Ok(())
    }

    /// Cut at a node. Closed paths rotate so the cut node leads and open up;
    /// with `new_node_id` a duplicate of the cut node ends the path and keeps
    /// the closing segment. Open paths keep `[0..=i]` and return the tail,
    /// led by the duplicate when one is requested.
    pub fn break_at_node(
        &mut self,
        node_id: NodeId,
        new_node_id: Option<NodeId>,
        new_path_id: PathId,
    ) -> Result<Option<Path>, ApplyError> {
        let i = self.require(node_id)?;
        if let Some(new_id) = new_node_id {
            self.require_absent(new_id)?;
        }
        let cut = self.nodes[i];
        let entries: Vec<(NodeId, PathNode)> = self.nodes.iter().map(|(k, v)| (*k, *v)).collect();

        if self.closed {
            let mut rotated: IndexMap<NodeId, PathNode> =
                entries[i..].iter().chain(entries[..i].iter()).copied().collect();
            if let Some(new_id) = new_node_id {
                rotated.insert(new_id, PathNode::with_controls(cut.position, cut.control_in, Vec2::ZERO));
            }
            self.nodes = rotated;
            self.closed = false;
            return Ok(None);
        }

        let head: IndexMap<NodeId, PathNode> = entries[..=i].iter().copied().collect();
        let mut tail: IndexMap<NodeId, PathNode> = IndexMap::with_capacity(entries.len() - i);
        if let Some(new_id) = new_node_id {
            tail.insert(new_id, PathNode::with_controls(cut.position, Vec2::ZERO, cut.control_out));
        }
        tail.extend(entries[i + 1..].iter().copied());
        self.nodes = head;
        Ok(Some(Path { id: new_path_id, nodes: tail, closed: false }))
    }

    /// Cut the segment leaving `from_node_id`. Closed paths rotate so that
    /// node ends the path; open paths split in two.
    pub fn break_at_edge(&mut self, from_node_id: NodeId, new_path_id: PathId) -> Result<Option<Path>, ApplyError> {
        let i = self.require(from_node_id)?;
        let entries: Vec<(NodeId, PathNode)> = self.nodes.iter().map(|(k, v)| (*k, *v)).collect();
        if self.closed {
            self.nodes = entries[i + 1..].iter().chain(entries[..=i].iter()).copied().collect();
            self.closed = false;
            return Ok(None);
        }
        if i + 1 == entries.len() {
            return Err(ApplyError::MissingNode { path: self.id, node: from_node_id });
        }
        self.nodes = entries[..=i].iter().copied().collect();
        Ok(Some(Path {
            id: new_path_id,
            nodes: entries[i + 1..].iter().copied().collect(),
            closed: false,
        }))
    }
}

#[derive(Serialize, Deserialize)]
struct NodeSer {
    id: NodeId,
    x: f64,
    y: f64,
    #[serde(rename = "in", default)]
    control_in: Vec2,
    #[serde(rename = "out", default)]
    control_out: Vec2,
}

#[derive(Serialize, Deserialize)]
struct PathSer {
    id: PathId,
    #[serde(default)]
    closed: bool,
    nodes: Vec<NodeSer>,
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PathSer {
            id: self.id,
            closed: self.closed,
            nodes: self
                .nodes
                .iter()
                .map(|(id, n)| NodeSer {
                    id: *id,
                    x: n.position.x,
                    y: n.position.y,
                    control_in: n.control_in,
                    control_out: n.control_out,
                })
                .collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ser = PathSer::deserialize(deserializer)?;
        let mut nodes = IndexMap::with_capacity(ser.nodes.len());
        for n in ser.nodes {
            let node = PathNode::with_controls(Vec2::new(n.x, n.y), n.control_in, n.control_out);
            if nodes.insert(n.id, node).is_some() {
                return Err(serde::de::Error::custom(format!("duplicate node id {}", n.id.raw())));
            }
        }
        Ok(Path { id: ser.id, nodes, closed: ser.closed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(closed: bool) -> (Path, Vec<NodeId>) {
        let p = Path::from_nodes(
            [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
                .into_iter()
                .map(|(x, y)| PathNode::new(Vec2::new(x, y))),
            closed,
        );
        let ids = p.node_ids().collect();
        (p, ids)
    }

    #[test]
    fn neighbors_wrap_only_when_closed() {
        let (open, ids) = square(false);
        assert!(open.node_before(ids[0]).is_none());
        assert!(open.node_after(ids[3]).is_none());
        assert!(open.segment(ids[3]).is_none());
        assert_eq!(open.segments().len(), 3);

        let (closed, ids) = square(true);
        assert_eq!(closed.node_id_before(ids[0]), Some(ids[3]));
        assert_eq!(closed.node_id_after(ids[3]), Some(ids[0]));
        assert_eq!(closed.segments().len(), 4);
        assert!(!closed.is_ending_node(ids[0]));
    }

    #[test]
    fn indices_and_subpath() {
        let (closed, _) = square(true);
        assert_eq!(closed.indices(2, 1), vec![2, 3, 0, 1]);
        assert!(closed.subpath(2, 1).unwrap().is_closed());
        let (open, _) = square(false);
        assert_eq!(open.indices(2, 1), vec![2, 3]);
        let sub = open.subpath(1, 2).unwrap();
        assert_eq!(sub.len(), 2);
        assert!(!sub.is_closed());
        assert!(open.subpath(9, 1).is_none());
    }

    #[test]
    fn continuous_runs_wrap_on_closed() {
        let (closed, ids) = square(true);
        let set: HashSet<NodeId> = [ids[3], ids[0], ids[2]].into_iter().collect();
        assert_eq!(closed.continuous_node_index_pairs(&set), vec![(2, 0)]);

        let (open, ids) = square(false);
        let set: HashSet<NodeId> = [ids[3], ids[0]].into_iter().collect();
        assert_eq!(open.continuous_node_index_pairs(&set), vec![(0, 0), (3, 3)]);
    }

    #[test]
    fn node_create_inserts_after_prev() {
        let (mut p, ids) = square(false);
        let new_id = NodeId::next();
        let node = PathNode::new(Vec2::new(5.0, 0.0));
        p.update(&PathUpdate::NodeCreate { prev_node_id: Some(ids[0]), node_id: new_id, node }).unwrap();
        assert_eq!(p.node_index(new_id), Some(1));
        let front = NodeId::next();
        p.update(&PathUpdate::NodeCreate { prev_node_id: None, node_id: front, node }).unwrap();
        assert_eq!(p.node_index(front), Some(0));

        let before = p.clone();
        let err = p.update(&PathUpdate::NodeCreate { prev_node_id: Some(NodeId::next()), node_id: NodeId::next(), node });
        assert!(err.is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn edge_update_writes_both_nodes() {
        let (mut p, ids) = square(false);
        let edge = PathEdge { control_out: Vec2::new(1.0, 1.0), control_in: Vec2::new(-1.0, 1.0) };
        p.update(&PathUpdate::EdgeUpdate { from_node_id: ids[1], edge }).unwrap();
        assert_eq!(p.edge(ids[1]), Some(edge));
        assert!(p.update(&PathUpdate::EdgeUpdate { from_node_id: ids[3], edge }).is_err());
    }

    #[test]
    fn node_types_recompute_out_handle() {
        let (mut p, ids) = square(false);
        let node = PathNode::with_controls(Vec2::new(10.0, 0.0), Vec2::new(-3.0, 0.0), Vec2::new(0.0, 5.0));
        p.update(&PathUpdate::NodeUpdate { node_id: ids[1], node }).unwrap();

        p.update(&PathUpdate::SetNodeType { node_ids: vec![ids[1]], node_type: NodeType::Locked }).unwrap();
        let out = p.node(ids[1]).unwrap().control_out;
        assert!((out - Vec2::new(3.0, 0.0)).length() < 1e-12);

        p.update(&PathUpdate::SetNodeType { node_ids: vec![ids[1]], node_type: NodeType::Mirrored }).unwrap();
        assert_eq!(p.node(ids[1]).unwrap().control_out, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn locked_takes_incoming_length() {
        let (mut p, ids) = square(false);
        let node = PathNode::with_controls(Vec2::new(10.0, 0.0), Vec2::new(0.0, -8.0), Vec2::new(2.0, 0.0));
        p.update(&PathUpdate::NodeUpdate { node_id: ids[2], node }).unwrap();
        p.update(&PathUpdate::SetNodeType { node_ids: vec![ids[2]], node_type: NodeType::Locked }).unwrap();
        let n = p.node(ids[2]).unwrap();
        assert!((n.control_out - Vec2::new(0.0, 8.0)).length() < 1e-12);
        assert_eq!(n.control_in, Vec2::new(0.0, -8.0));
    }

    #[test]
    fn segment_types_reshape_handles() {
        let (mut p, ids) = square(false);
        let edge = PathEdge { control_out: Vec2::new(2.0, 4.0), control_in: Vec2::new(-4.0, 2.0) };
        p.update(&PathUpdate::EdgeUpdate { from_node_id: ids[0], edge }).unwrap();
        p.update(&PathUpdate::SetSegmentType { from_node_ids: vec![ids[0]], segment_type: SegmentType::Quadratic })
            .unwrap();
        assert!(p.segment(ids[0]).unwrap().quadratic().is_some());
        p.update(&PathUpdate::SetSegmentType { from_node_ids: vec![ids[0]], segment_type: SegmentType::Line })
            .unwrap();
        assert!(p.segment(ids[0]).unwrap().is_line());
    }

    #[test]
    fn self_merge_drops_duplicate_last() {
        let mut p = Path::from_nodes(
            [(0.0, 0.0), (5.0, 5.0), (0.0, 0.0)].into_iter().map(|(x, y)| PathNode::new(Vec2::new(x, y))),
            false,
        );
        let ids: Vec<NodeId> = p.node_ids().collect();
        assert_eq!(p.mergeable_node(ids[2]), Some(ids[0]));
        p.merge_self(ids[2], ids[0]).unwrap();
        assert!(p.is_closed());
        assert_eq!(p.node_ids().collect::<Vec<_>>(), vec![ids[0], ids[1]]);
    }

    #[test]
    fn merge_requires_ending_nodes() {
        let (mut p, ids) = square(false);
        assert_eq!(p.merge_self(ids[1], ids[0]), Err(ApplyError::NotEndingNode(ids[1])));
        assert!(!p.is_closed());
    }

    #[test]
    fn cross_merge_appends_and_reverses() {
        let (mut a, a_ids) = square(false);
        // b runs away from a's last node, but is addressed by its last node
        let mut b = Path::from_nodes(
            [(-10.0, 20.0), (0.0, 10.0)].into_iter().map(|(x, y)| PathNode::new(Vec2::new(x, y))),
            false,
        );
        let b_ids: Vec<NodeId> = b.node_ids().collect();
        let tail = PathNode::with_controls(Vec2::new(0.0, 10.0), Vec2::new(-1.0, 1.0), Vec2::new(2.0, 0.0));
        b.update(&PathUpdate::NodeUpdate { node_id: b_ids[1], node: tail }).unwrap();

        a.merge_with(a_ids[3], &b, b_ids[1]).unwrap();
        assert_eq!(a.node_ids().collect::<Vec<_>>(), vec![a_ids[0], a_ids[1], a_ids[2], a_ids[3], b_ids[0]]);
        // reversed: the dropped node's outward handle was its original control_in
        assert_eq!(a.node(a_ids[3]).unwrap().control_out, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn cross_merge_prepends_without_drop() {
        let (mut a, a_ids) = square(false);
        let b = Path::from_nodes(
            [(-5.0, 0.0), (-20.0, 0.0)].into_iter().map(|(x, y)| PathNode::new(Vec2::new(x, y))),
            false,
        );
        let b_ids: Vec<NodeId> = b.node_ids().collect();
        a.merge_with(a_ids[0], &b, b_ids[0]).unwrap();
        let order: Vec<NodeId> = a.node_ids().collect();
        assert_eq!(order[..2], [b_ids[1], b_ids[0]]);
        assert_eq!(order.len(), 6);
    }

    #[test]
    fn break_closed_rotates() {
        let (mut p, ids) = square(true);
        assert!(p.break_at_node(ids[2], None, PathId::next()).unwrap().is_none());
        assert!(!p.is_closed());
        assert_eq!(p.node_ids().collect::<Vec<_>>(), vec![ids[2], ids[3], ids[0], ids[1]]);
    }

    #[test]
    fn break_closed_with_duplicate_keeps_closing_segment() {
        let (mut p, ids) = square(true);
        let dup = NodeId::next();
        p.break_at_node(ids[2], Some(dup), PathId::next()).unwrap();
        assert_eq!(p.len(), 5);
        assert_eq!(p.last_node().unwrap().0, dup);
        assert_eq!(p.node(dup).unwrap().position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn break_open_spills_tail() {
        let (mut p, ids) = square(false);
        let dup = NodeId::next();
        let new_path = PathId::next();
        let tail = p.break_at_node(ids[1], Some(dup), new_path).unwrap().unwrap();
        assert_eq!(p.node_ids().collect::<Vec<_>>(), vec![ids[0], ids[1]]);
        assert_eq!(tail.id(), new_path);
        assert_eq!(tail.node_ids().collect::<Vec<_>>(), vec![dup, ids[2], ids[3]]);
    }

    #[test]
    fn break_at_edge_variants() {
        let (mut closed, ids) = square(true);
        assert!(closed.break_at_edge(ids[1], PathId::next()).unwrap().is_none());
        assert_eq!(closed.node_ids().collect::<Vec<_>>(), vec![ids[2], ids[3], ids[0], ids[1]]);

        let (mut open, ids) = square(false);
        let tail = open.break_at_edge(ids[1], PathId::next()).unwrap().unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(tail.node_ids().collect::<Vec<_>>(), vec![ids[2], ids[3]]);
        assert!(open.break_at_edge(ids[1], PathId::next()).is_err());
    }

    #[test]
    fn reversed_swaps_handles() {
        let (mut p, ids) = square(false);
        let edge = PathEdge { control_out: Vec2::new(1.0, 2.0), control_in: Vec2::new(3.0, 4.0) };
        p.update(&PathUpdate::EdgeUpdate { from_node_id: ids[0], edge }).unwrap();
        let r = p.reversed();
        assert_eq!(r.first_node().unwrap().0, ids[3]);
        assert_eq!(r.edge(ids[1]), Some(PathEdge { control_out: edge.control_in, control_in: edge.control_out }));
        assert_eq!(r.reversed(), p);
    }

    #[test]
    fn json_keeps_order() {
        let (p, _) = square(true);
        let s = serde_json::to_string(&p).unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["closed"], true);
        assert_eq!(v["nodes"][1]["x"], 10.0);
        let back: Path = serde_json::from_str(&s).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn bounds_cover_curves() {
        let (mut p, ids) = square(false);
        let edge = PathEdge { control_out: Vec2::new(0.0, -8.0), control_in: Vec2::new(0.0, -8.0) };
        p.update(&PathUpdate::EdgeUpdate { from_node_id: ids[0], edge }).unwrap();
        let b = p.bounds().unwrap();
        assert!((b.min.y + 6.0).abs() < 1e-9);
    }
}
