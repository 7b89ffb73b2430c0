//! Per-path classification side table.
//!
//! Purely advisory: the types recorded here only drive the one-time handle
//! recomputation done when a type is set (see [`crate::path::Path::update`]).

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::id::{NodeId, PathId};
use crate::model::{NodeType, SegmentType};

#[derive(Clone, Debug, PartialEq)]
pub struct PathProperty {
    pub id: PathId,
    pub name: Option<String>,
    node_types: IndexMap<NodeId, NodeType>,
    segment_types: IndexMap<NodeId, SegmentType>,
}

impl PathProperty {
    pub fn new(id: PathId) -> Self {
        Self {
            id,
            name: None,
            node_types: IndexMap::new(),
            segment_types: IndexMap::new(),
        }
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node_types.get(&id).copied().unwrap_or_default()
    }

    pub fn segment_type(&self, from: NodeId) -> SegmentType {
        self.segment_types.get(&from).copied().unwrap_or_default()
    }

    /// Defaults are not stored.
    pub fn set_node_type(&mut self, ids: &[NodeId], node_type: NodeType) {
        for id in ids {
            if node_type == NodeType::default() {
                self.node_types.shift_remove(id);
            } else {
                self.node_types.insert(*id, node_type);
            }
        }
    }

    pub fn set_segment_type(&mut self, from_ids: &[NodeId], segment_type: SegmentType) {
        for id in from_ids {
            if segment_type == SegmentType::default() {
                self.segment_types.shift_remove(id);
            } else {
                self.segment_types.insert(*id, segment_type);
            }
        }
    }

    /// Drop entries for nodes the path no longer has.
    pub fn retain_nodes(&mut self, mut exists: impl FnMut(NodeId) -> bool) {
        self.node_types.retain(|id, _| exists(*id));
        self.segment_types.retain(|id, _| exists(*id));
    }

    /// Take over another path's entries, keeping our name.
    pub fn absorb(&mut self, other: PathProperty) {
        self.node_types.extend(other.node_types);
        self.segment_types.extend(other.segment_types);
        if self.name.is_none() {
            self.name = other.name;
        }
    }

    pub fn with_id(mut self, id: PathId) -> Self {
        self.id = id;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.node_types.is_empty() && self.segment_types.is_empty()
    }
}

impl Serialize for PathProperty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct NodeTypeSer {
            id: NodeId,
            #[serde(rename = "type")]
            node_type: NodeType,
        }
        #[derive(Serialize)]
        struct SegmentTypeSer {
            from: NodeId,
            #[serde(rename = "type")]
            segment_type: SegmentType,
        }
        #[derive(Serialize)]
        struct PropertySer<'a> {
            id: PathId,
            name: &'a Option<String>,
            node_types: Vec<NodeTypeSer>,
            segment_types: Vec<SegmentTypeSer>,
        }
        PropertySer {
            id: self.id,
            name: &self.name,
            node_types: self.node_types.iter().map(|(id, t)| NodeTypeSer { id: *id, node_type: *t }).collect(),
            segment_types: self
                .segment_types
                .iter()
                .map(|(from, t)| SegmentTypeSer { from: *from, segment_type: *t })
                .collect(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let mut p = PathProperty::new(PathId::next());
        let n = NodeId::next();
        assert_eq!(p.node_type(n), NodeType::Corner);
        assert_eq!(p.segment_type(n), SegmentType::Auto);

        p.set_node_type(&[n], NodeType::Mirrored);
        p.set_segment_type(&[n], SegmentType::Line);
        assert_eq!(p.node_type(n), NodeType::Mirrored);
        assert_eq!(p.segment_type(n), SegmentType::Line);

        p.set_node_type(&[n], NodeType::Corner);
        assert_eq!(p.node_type(n), NodeType::Corner);
        assert!(!p.is_empty());
        p.retain_nodes(|_| false);
        assert!(p.is_empty());
    }

    #[test]
    fn absorb_keeps_own_name() {
        let mut a = PathProperty::new(PathId::next());
        a.name = Some("a".into());
        let mut b = PathProperty::new(PathId::next());
        b.name = Some("b".into());
        let n = NodeId::next();
        b.set_node_type(&[n], NodeType::Locked);
        a.absorb(b);
        assert_eq!(a.name.as_deref(), Some("a"));
        assert_eq!(a.node_type(n), NodeType::Locked);
    }
}
