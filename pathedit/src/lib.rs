pub mod id;
pub mod model;
pub mod error;
pub mod geometry {
    pub mod arc;
    pub mod cubic;
    pub mod limits;
    pub mod line;
    pub mod math;
    pub mod polyline;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod fit;
    pub mod picking;
}
pub mod segment;
pub mod path;
pub mod property;
pub mod event;
pub mod store;
pub mod grid;
pub mod config;
pub mod svg;
pub mod updater;
pub mod document;
pub mod editor;

pub use algorithms::picking::{HandleEnd, Pick};
pub use config::EditorConfig;
pub use document::Document;
pub use editor::{Editor, EditorNotice, SubscriptionId};
pub use error::{ApplyError, ArcError, DocumentError, SvgParseError};
pub use event::{DocumentAction, DocumentEvent, DocumentEventKind, PathActionKind, PathEvent, PathUpdate};
pub use grid::{Grid, NoSnap, Snap};
pub use id::{NodeId, PathId};
pub use model::{NodeType, PathEdge, PathNode, Rect, SegmentType, Vec2};
pub use path::Path;
pub use property::PathProperty;
pub use segment::PathSegment;
pub use store::{AppliedChange, PathStore, Snapshot, StoreState};
pub use updater::DocumentUpdater;
