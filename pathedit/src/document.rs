//! The persisted event log.

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::event::{DocumentAction, DocumentEvent, PathEvent};
use crate::geometry::limits::{self, MAX_EVENTS, MAX_NODES_PER_PATH, MAX_PATHS};
use crate::path::Path;
use crate::store::PathStore;

pub const DOCUMENT_VERSION: u32 = 1;

/// Append-only list of revisions. Path state is derived by replay.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    events: Vec<DocumentEvent>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DocumentEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn push(&mut self, event: DocumentEvent) -> Result<(), DocumentError> {
        if self.events.len() >= MAX_EVENTS {
            return Err(DocumentError::LimitExceeded { what: "events", limit: MAX_EVENTS });
        }
        self.events.push(event);
        Ok(())
    }

    /// Drop the last revision unless it is a load. Returns the dropped one.
    pub fn undo(&mut self) -> Option<DocumentEvent> {
        if self.events.last()?.action.is_load() {
            return None;
        }
        self.events.pop()
    }

    /// A fresh store with every revision applied in order.
    pub fn replay(&self) -> PathStore {
        let mut store = PathStore::new();
        for event in &self.events {
            store.commit(event);
        }
        store
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        #[derive(Serialize)]
        struct DocumentSer<'a> {
            version: u32,
            events: &'a [DocumentEvent],
        }
        Ok(serde_json::to_string(&DocumentSer { version: DOCUMENT_VERSION, events: &self.events })?)
    }

    pub fn from_json(s: &str) -> Result<Self, DocumentError> {
        #[derive(Deserialize)]
        struct DocumentDe {
            version: u32,
            events: Vec<DocumentEvent>,
        }
        let doc: DocumentDe = serde_json::from_str(s)?;
        if doc.version != DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion(doc.version));
        }
        if doc.events.len() > MAX_EVENTS {
            return Err(DocumentError::LimitExceeded { what: "events", limit: MAX_EVENTS });
        }
        for event in &doc.events {
            validate_event(event)?;
        }
        Ok(Self { events: doc.events })
    }
}

fn validate_path(path: &Path) -> Result<(), DocumentError> {
    if path.len() > MAX_NODES_PER_PATH {
        return Err(DocumentError::LimitExceeded { what: "nodes per path", limit: MAX_NODES_PER_PATH });
    }
    let in_bounds = path.nodes().all(|(_, n)| {
        limits::point_in_bounds(n.position)
            && limits::point_in_bounds(n.control_in)
            && limits::point_in_bounds(n.control_out)
    });
    if !in_bounds {
        return Err(DocumentError::LimitExceeded { what: "coordinate bounds", limit: limits::COORD_MAX as usize });
    }
    Ok(())
}

fn validate_event(event: &DocumentEvent) -> Result<(), DocumentError> {
    for e in event.events() {
        if let PathEvent::Create { path } = e {
            validate_path(path)?;
        }
    }
    if let DocumentAction::Load { paths } = &event.action {
        if paths.len() > MAX_PATHS {
            return Err(DocumentError::LimitExceeded { what: "paths", limit: MAX_PATHS });
        }
        for path in paths {
            validate_path(path)?;
        }
    }
    Ok(())
}
