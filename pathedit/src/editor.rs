//! Editing façade: document log, committed/pending store and notifications.

use crate::algorithms::fit::Fitter;
use crate::algorithms::picking::{self, Pick};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::DocumentError;
use crate::event::{DocumentAction, DocumentEvent};
use crate::grid::Grid;
use crate::id::PathId;
use crate::model::Vec2;
use crate::path::Path;
use crate::property::PathProperty;
use crate::store::PathStore;
use crate::svg;
use crate::updater::DocumentUpdater;

/// What changed, delivered to subscribers after the store is updated.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorNotice {
    Committed(DocumentEvent),
    /// The preview now shows this event, or nothing.
    Pending(Option<DocumentEvent>),
    /// State was rebuilt from the log (undo or load).
    Replayed,
}

pub type SubscriptionId = usize;

type Listener = Box<dyn FnMut(&EditorNotice)>;

#[derive(Default)]
pub struct Editor {
    document: Document,
    store: PathStore,
    config: EditorConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("events", &self.document.len())
            .field("paths", &self.store.current().len())
            .field("previewing", &self.store.is_previewing())
            .finish()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_grid(&mut self, grid: Option<Grid>) {
        self.config.grid = grid;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &PathStore {
        &self.store
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&EditorNotice) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, notice: EditorNotice) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&notice);
        }
    }

    fn resolve(&self, action: DocumentAction) -> Option<DocumentEvent> {
        DocumentUpdater::new(self.store.committed(), &self.config.grid).resolve(action)
    }

    /// Resolve and commit. Returns whether anything was recorded; any
    /// preview is discarded either way.
    pub fn send(&mut self, action: DocumentAction) -> Result<bool, DocumentError> {
        self.cancel_pending();
        let Some(event) = self.resolve(action) else { return Ok(false) };
        self.document.push(event.clone())?;
        let change = self.store.commit(&event);
        log::debug!("committed revision {}: {:?}", self.document.len(), change);
        self.notify(EditorNotice::Committed(event));
        Ok(true)
    }

    /// Show `action` over the committed state, replacing any earlier
    /// preview. An action that resolves to nothing clears the preview.
    pub fn preview(&mut self, action: DocumentAction) -> bool {
        match self.resolve(action) {
            Some(event) => {
                self.store.preview(event.clone());
                self.notify(EditorNotice::Pending(Some(event)));
                true
            }
            None => {
                self.cancel_pending();
                false
            }
        }
    }

    /// Record the previewed event. Returns whether there was one.
    pub fn commit_pending(&mut self) -> Result<bool, DocumentError> {
        let Some(event) = self.store.pending_event().cloned() else { return Ok(false) };
        self.document.push(event.clone())?;
        self.store.commit_preview();
        self.notify(EditorNotice::Pending(None));
        self.notify(EditorNotice::Committed(event));
        Ok(true)
    }

    pub fn cancel_pending(&mut self) -> bool {
        let cancelled = self.store.cancel_preview();
        if cancelled {
            self.notify(EditorNotice::Pending(None));
        }
        cancelled
    }

    /// Drop the last committed revision and rebuild. Loads are not undone.
    pub fn undo(&mut self) -> bool {
        self.cancel_pending();
        if self.document.undo().is_none() {
            return false;
        }
        self.store = self.document.replay();
        self.notify(EditorNotice::Replayed);
        true
    }

    pub fn load_document(&mut self, json: &str) -> Result<(), DocumentError> {
        let document = Document::from_json(json)?;
        self.store = document.replay();
        self.document = document;
        self.notify(EditorNotice::Replayed);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        self.document.to_json()
    }

    /// Replace the document with the subpaths of `d`, recorded as one load.
    /// Subpaths with fewer than two nodes are skipped.
    pub fn load_svg(&mut self, d: &str) -> Result<Vec<PathId>, DocumentError> {
        let paths: Vec<Path> = svg::parse_path_data(d)
            .inspect_err(|e| log::warn!("rejected path data: {}", e))?
            .iter()
            .map(Path::from_svg)
            .filter(|p| !p.is_degenerate())
            .collect();
        let ids = paths.iter().map(Path::id).collect();
        self.document = Document::new();
        self.store = PathStore::new();
        if !paths.is_empty() {
            let action = DocumentAction::Load { paths };
            if let Some(event) = self.resolve(action) {
                self.document.push(event.clone())?;
                self.store.commit(&event);
            }
        }
        self.notify(EditorNotice::Replayed);
        Ok(ids)
    }

    /// Fit a freehand stroke and commit it as a new path.
    pub fn draw(&mut self, points: &[Vec2]) -> Result<Option<PathId>, DocumentError> {
        let fitter = Fitter { error: self.config.fit_error, max_iterations: self.config.max_fit_iterations };
        let path = Path::from_nodes(fitter.fit(points), false);
        if path.is_degenerate() {
            return Ok(None);
        }
        let id = path.id();
        Ok(self.send(DocumentAction::Create { path })?.then_some(id))
    }

    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.store.path(id)
    }

    pub fn property(&self, id: PathId) -> Option<&PathProperty> {
        self.store.property(id)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.store.current().paths()
    }

    fn steps(&self) -> usize {
        if self.store.is_previewing() {
            self.config.preview_tessellation_steps
        } else {
            self.config.tessellation_steps
        }
    }

    /// Topmost path under `pos`, stroked at `threshold` or the configured width.
    pub fn hit_test(&self, pos: Vec2, threshold: Option<f64>) -> Option<PathId> {
        let threshold = threshold.unwrap_or(self.config.hit_threshold);
        picking::hit_test(self.store.current(), pos, threshold, self.steps())
    }

    pub fn pick(&self, pos: Vec2, tol: f64) -> Option<Pick> {
        picking::pick(self.store.current(), pos, tol, self.steps())
    }
}
