use pathedit::{
    Document, DocumentAction, DocumentError, DocumentUpdater, Grid, NodeId, NoSnap, Path, PathActionKind, PathNode,
    PathStore, SegmentType, NodeType, Vec2,
};
use serde_json::json;

fn square() -> Path {
    Path::from_nodes(
        [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)].into_iter().map(|(x, y)| PathNode::new(Vec2::new(x, y))),
        true,
    )
}

/// Resolve against the current committed state and record the result.
fn record(doc: &mut Document, store: &mut PathStore, action: DocumentAction) -> bool {
    let resolved = DocumentUpdater::new(store.committed(), &NoSnap).resolve(action);
    match resolved {
        Some(event) => {
            store.commit(&event);
            doc.push(event).unwrap();
            true
        }
        None => false,
    }
}

#[test]
fn replay_reproduces_live_state() {
    let mut doc = Document::new();
    let mut live = PathStore::new();
    let p = square();
    let id = p.id();
    let ids: Vec<NodeId> = p.node_ids().collect();

    assert!(record(&mut doc, &mut live, DocumentAction::Load { paths: vec![p] }));
    assert!(record(&mut doc, &mut live, DocumentAction::Update {
        path_id: id,
        kind: PathActionKind::SplitSegment { from_node_id: ids[0], param_t: 0.5, new_node_id: NodeId::next(), offset: Vec2::ZERO },
    }));
    assert!(record(&mut doc, &mut live, DocumentAction::Update {
        path_id: id,
        kind: PathActionKind::SetSegmentType { from_node_ids: vec![ids[1]], segment_type: SegmentType::Line },
    }));
    assert!(record(&mut doc, &mut live, DocumentAction::Update {
        path_id: id,
        kind: PathActionKind::SetNodeType { node_ids: vec![ids[2]], node_type: NodeType::Mirrored },
    }));
    assert!(record(&mut doc, &mut live, DocumentAction::Update {
        path_id: id,
        kind: PathActionKind::SetName { name: Some("frame".into()) },
    }));
    assert!(!record(&mut doc, &mut live, DocumentAction::Update {
        path_id: id,
        kind: PathActionKind::DeleteNode { node_id: NodeId::next() },
    }));

    let json = doc.to_json().unwrap();
    let restored = Document::from_json(&json).unwrap();
    let replayed = restored.replay();
    assert_eq!(replayed.path(id), live.path(id));
    assert_eq!(replayed.property(id), live.property(id));
    assert_eq!(replayed.path(id).unwrap().len(), 5);
    assert_eq!(replayed.property(id).unwrap().name.as_deref(), Some("frame"));
    assert_eq!(replayed.property(id).unwrap().node_type(ids[2]), NodeType::Mirrored);
}

#[test]
fn grid_snaps_moves() {
    let mut doc = Document::new();
    let mut store = PathStore::new();
    let p = square();
    let id = p.id();
    record(&mut doc, &mut store, DocumentAction::Create { path: p });

    let grid = Some(Grid::Cartesian { cell_size: 8.0 });
    let action = DocumentAction::Update { path_id: id, kind: PathActionKind::MovePath { offset: Vec2::new(5.0, 2.0) } };
    let event = DocumentUpdater::new(store.committed(), &grid).resolve(action).unwrap();
    store.commit(&event);
    let bounds = store.path(id).unwrap().bounds().unwrap();
    assert_eq!(bounds.min, Vec2::new(8.0, 0.0));
}

#[test]
fn persisted_ids_are_not_reissued() {
    let doc = json!({
        "version": 1,
        "events": [{
            "kind": { "type": "single", "events": {
                "type": "create",
                "path": { "id": 900000001, "closed": false, "nodes": [
                    { "id": 900000002, "x": 0.0, "y": 0.0 },
                    { "id": 900000003, "x": 5.0, "y": 0.0 }
                ] }
            } },
            "action": { "type": "delete", "path_ids": [] }
        }]
    });
    let restored = Document::from_json(&doc.to_string()).unwrap();
    assert!(restored.replay().committed().len() == 1);
    assert!(NodeId::next().raw() > 900000003);
}

#[test]
fn oversized_paths_are_rejected() {
    let nodes: Vec<_> = (0..200_001u64).map(|i| json!({ "id": 1_000_000_000u64 + i, "x": 0.0, "y": 0.0 })).collect();
    let doc = json!({
        "version": 1,
        "events": [{
            "kind": { "type": "single", "events": { "type": "create", "path": { "id": 1, "nodes": nodes } } },
            "action": { "type": "delete", "path_ids": [] }
        }]
    });
    assert!(matches!(Document::from_json(&doc.to_string()), Err(DocumentError::LimitExceeded { .. })));

    let far = json!({
        "version": 1,
        "events": [{
            "kind": { "type": "single", "events": { "type": "create", "path": { "id": 2, "nodes": [
                { "id": 3, "x": 1.0e38, "y": 0.0 }, { "id": 4, "x": 0.0, "y": 0.0 }
            ] } } },
            "action": { "type": "delete", "path_ids": [] }
        }]
    });
    assert!(Document::from_json(&far.to_string()).is_err());
}
